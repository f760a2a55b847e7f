//! CPU state snapshot types and traits.

/// Trait for CPU types that can provide/restore a register snapshot.
/// Mirrors the teacher's per-CPU `XxxState` structs, collapsed to a single
/// snapshot type since this engine supports exactly one CPU family.
pub trait CpuStateTrait {
    type Snapshot;
    fn snapshot(&self) -> Self::Snapshot;
    fn restore(&mut self, snapshot: &Self::Snapshot);
}

/// i8080 register snapshot: the seven 8-bit general registers, PC, SP, the
/// packed status byte (S/Z/AC/P/CY), and the interrupt-enable flip-flop.
///
/// `status` does not include INTE — INTE is restored separately because it
/// is not part of the byte `PUSH PSW` exposes to a running program
/// (`spec.md` §3, "an 8-bit flag/status byte S... the interrupt-enable flag
/// INTE" are listed as siblings, not packed together).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct I8080State {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub status: u8,
    pub pc: u16,
    pub sp: u16,
    pub inte: bool,
    pub halted: bool,
    pub ticks: u64,
}
