use crate::core::bus::Interrupt;

/// The single capability set a user-supplied memory or I/O endpoint must
/// satisfy (`spec.md` §6, "Controller contract"). Memory and I/O
/// controllers share this exact shape: a memory controller typically
/// ignores its `peer` parameter, while an I/O controller uses it to reach
/// back into memory (the CP/M BDOS emulation in `original_source` reads
/// string arguments straight out of RAM from inside `Write`).
///
/// This trait is deliberately the engine's only extension point — it is
/// "user code" per `spec.md` §1 and the engine never assumes anything about
/// its implementation beyond this contract.
pub trait Controller: Send {
    /// Read a byte at `addr` (a memory address, or an I/O port zero-extended
    /// into the same integer). `peer` is the other attached controller.
    fn read(&mut self, addr: u16, peer: Option<&mut dyn Controller>) -> u8;

    /// Write `data` to `addr`. Memory controllers decide for themselves
    /// whether a given address is ROM (and so silently drops the write) —
    /// the engine does not enforce that at the bus level (`spec.md` §3).
    fn write(&mut self, addr: u16, data: u8, peer: Option<&mut dyn Controller>);

    /// Called by `Machine` at the cadence `isrFreq` dictates. `current_ns`
    /// is wall-clock elapsed time since `Run` began; `cycles` is the
    /// cumulative T-state count. Returning anything other than
    /// `Interrupt::NoInterrupt` may trigger CPU interrupt dispatch or a
    /// Machine-level Load/Save/Quit, depending on the variant.
    fn generate_interrupt(
        &mut self,
        current_ns: u64,
        cycles: u64,
        peer: Option<&mut dyn Controller>,
    ) -> Interrupt {
        let _ = (current_ns, cycles, peer);
        Interrupt::NoInterrupt
    }

    /// 16-byte identifier for this controller's concrete type. Used by the
    /// state codec to refuse loading a snapshot into an incompatible engine
    /// (`spec.md` §4.4).
    fn uuid(&self) -> [u8; 16];
}
