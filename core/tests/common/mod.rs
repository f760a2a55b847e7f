use meen_core::core::bus::SystemBus;
use meen_core::core::Controller;
use meen_core::cpu::{Cpu, I8080};

/// Flat 64 KiB controller-test-double: no ROM/RAM distinction, no
/// interrupt source. Used for both the memory and I/O slots in tests that
/// don't care about I/O ports.
pub struct TestMemory {
    pub bytes: Box<[u8; 0x10000]>,
}

impl TestMemory {
    pub fn new() -> Self {
        Self {
            bytes: Box::new([0; 0x10000]),
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.bytes[start..start + data.len()].copy_from_slice(data);
    }
}

impl Default for TestMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for TestMemory {
    fn read(&mut self, addr: u16, _peer: Option<&mut dyn Controller>) -> u8 {
        self.bytes[addr as usize]
    }

    fn write(&mut self, addr: u16, data: u8, _peer: Option<&mut dyn Controller>) {
        self.bytes[addr as usize] = data;
    }

    fn uuid(&self) -> [u8; 16] {
        [0; 16]
    }
}

/// A CPU plus a memory-only bus (I/O slot is a second blank `TestMemory`),
/// ready to load a byte string at address 0 and single-step through it.
pub struct Fixture {
    pub cpu: I8080,
    pub bus: SystemBus,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            cpu: I8080::new(),
            bus: SystemBus::new(Box::new(TestMemory::new()), Box::new(TestMemory::new())),
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        for (i, byte) in data.iter().enumerate() {
            self.bus.write(addr.wrapping_add(i as u16), *byte);
        }
    }

    /// Run exactly one instruction, returning its T-state cost.
    pub fn step(&mut self) -> u64 {
        self.cpu.step(&mut self.bus)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
