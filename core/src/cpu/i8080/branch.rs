use crate::core::bus::SystemBus;
use crate::cpu::i8080::I8080;

impl I8080 {
    pub(crate) fn op_jmp(&mut self, bus: &mut SystemBus) -> u64 {
        let addr = self.fetch16(bus);
        self.pc = addr;
        10
    }

    pub(crate) fn op_jcc(&mut self, op: u8, bus: &mut SystemBus) -> u64 {
        let ccc = (op >> 3) & 0x07;
        let addr = self.fetch16(bus);
        if self.test_cond(ccc) {
            self.pc = addr;
        }
        10
    }

    pub(crate) fn op_pchl(&mut self) -> u64 {
        self.pc = self.get_hl();
        5
    }

    pub(crate) fn op_call(&mut self, bus: &mut SystemBus) -> u64 {
        let addr = self.fetch16(bus);
        self.push16(bus, self.pc);
        self.pc = addr;
        17
    }

    pub(crate) fn op_ccc(&mut self, op: u8, bus: &mut SystemBus) -> u64 {
        let ccc = (op >> 3) & 0x07;
        let addr = self.fetch16(bus);
        if self.test_cond(ccc) {
            self.push16(bus, self.pc);
            self.pc = addr;
            17
        } else {
            11
        }
    }

    pub(crate) fn op_ret(&mut self, bus: &mut SystemBus) -> u64 {
        self.pc = self.pop16(bus);
        10
    }

    pub(crate) fn op_rcc(&mut self, op: u8, bus: &mut SystemBus) -> u64 {
        let ccc = (op >> 3) & 0x07;
        if self.test_cond(ccc) {
            self.pc = self.pop16(bus);
            11
        } else {
            5
        }
    }

    pub(crate) fn op_rst(&mut self, op: u8, bus: &mut SystemBus) -> u64 {
        let n = (op >> 3) & 0x07;
        self.push16(bus, self.pc);
        self.pc = (n as u16) * 8;
        11
    }
}
