use crate::core::bus::{Interrupt, RstVector, SystemBus};

pub mod state;
pub use state::{CpuStateTrait, I8080State};

pub mod i8080;
pub use i8080::I8080;

/// Generic CPU interface (`spec.md` §4.1). A single implementation
/// (`I8080`) exists today; the trait is kept separate from the concrete
/// type so `Machine` is written against the contract rather than against
/// `I8080` directly, the way `spec.md` §9 anticipates future CPU families.
pub trait Cpu: CpuStateTrait {
    /// 128-bit UUID identifying this CPU family (stable per family).
    fn cpu_uuid(&self) -> [u8; 16];

    /// Execute exactly one instruction. Returns its T-state cost.
    fn step(&mut self, bus: &mut SystemBus) -> u64;

    /// Offer an interrupt vector to the CPU. Returns whether it was
    /// honored — ignored when interrupts are disabled (INTE=0). Clears the
    /// halted state on acceptance (HLT is broken by any accepted
    /// interrupt). Needs bus access because acceptance pushes PC to the
    /// stack exactly as `CALL` would.
    fn interrupt(&mut self, vector: RstVector, bus: &mut SystemBus) -> bool;

    /// Reset to power-on state: PC=0, INTE=0, halted=false. Tick count is
    /// NOT reset here — `spec.md` §3 says the tick counter "never
    /// decreases"; callers that want a fresh tick count construct a new CPU.
    fn reset(&mut self);

    /// True if the CPU is halted (via `HLT`) and has not yet received an
    /// interrupt to resume it.
    fn halted(&self) -> bool;

    /// Cumulative T-states executed since construction or last `reset`.
    fn ticks(&self) -> u64;
}

/// Dispatch a Machine-observed interrupt to the CPU side of the protocol.
/// `Load`/`Save`/`Quit` are intercepted by `Machine` itself and never reach
/// here — see `spec.md` §9 "Interrupt capture".
pub fn deliver_cpu_interrupt<C: Cpu + ?Sized>(
    cpu: &mut C,
    interrupt: Interrupt,
    bus: &mut SystemBus,
) -> bool {
    match interrupt {
        Interrupt::Rst(vector) => cpu.interrupt(vector, bus),
        _ => false,
    }
}
