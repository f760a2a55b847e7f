//! Test-vector generation and fixture types for validating the i8080
//! opcode table against randomized register/memory states, in the style
//! of the teacher workspace's `phosphor-cpu-validation` crate. Not part of
//! `meen-core`'s public contract.

use meen_core::core::Controller;

/// Flat 64 KiB address space with no ROM/RAM distinction, used only to
/// drive the CPU through single-instruction fixtures. Reads/writes never
/// fail and the controller never raises interrupts.
pub struct FlatMemory {
    pub bytes: Box<[u8; 0x10000]>,
}

impl FlatMemory {
    pub fn new() -> Self {
        Self {
            bytes: Box::new([0; 0x10000]),
        }
    }
}

impl Default for FlatMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for FlatMemory {
    fn read(&mut self, addr: u16, _peer: Option<&mut dyn Controller>) -> u8 {
        self.bytes[addr as usize]
    }

    fn write(&mut self, addr: u16, data: u8, _peer: Option<&mut dyn Controller>) {
        self.bytes[addr as usize] = data;
    }

    fn uuid(&self) -> [u8; 16] {
        [0xFF; 16]
    }
}

use serde::{Deserialize, Serialize};

/// One single-step fixture: an initial register/memory state, the opcode
/// placed at `initial.pc`, and the resulting state plus T-state cost after
/// executing exactly one instruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct I8080TestCase {
    pub name: String,
    pub initial: I8080CpuState,
    #[serde(rename = "final")]
    pub final_state: I8080CpuState,
    pub ticks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct I8080CpuState {
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
    /// Sparse list of `(address, byte)` pairs that differ from the
    /// initial full-memory fill, rather than the whole 64 KiB image.
    pub ram: Vec<(u16, u8)>,
}

/// Addresses whose contents differ between two full memory images.
pub fn diff_ram(before: &[u8; 0x10000], after: &[u8; 0x10000]) -> Vec<(u16, u8)> {
    before
        .iter()
        .zip(after.iter())
        .enumerate()
        .filter(|(_, (b, a))| b != a)
        .map(|(addr, (_, a))| (addr as u16, *a))
        .collect()
}
