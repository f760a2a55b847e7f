use crate::core::bus::SystemBus;
use crate::cpu::i8080::I8080;

impl I8080 {
    pub(crate) fn op_lxi(&mut self, op: u8, bus: &mut SystemBus) -> u64 {
        let rp = (op >> 4) & 0x03;
        let val = self.fetch16(bus);
        self.set_rp(rp, val);
        10
    }

    pub(crate) fn op_stax_b(&mut self, bus: &mut SystemBus) -> u64 {
        bus.write(self.get_bc(), self.a);
        7
    }

    pub(crate) fn op_stax_d(&mut self, bus: &mut SystemBus) -> u64 {
        bus.write(self.get_de(), self.a);
        7
    }

    pub(crate) fn op_ldax_b(&mut self, bus: &mut SystemBus) -> u64 {
        self.a = bus.read(self.get_bc());
        7
    }

    pub(crate) fn op_ldax_d(&mut self, bus: &mut SystemBus) -> u64 {
        self.a = bus.read(self.get_de());
        7
    }

    pub(crate) fn op_shld(&mut self, bus: &mut SystemBus) -> u64 {
        let addr = self.fetch16(bus);
        bus.write(addr, self.l);
        bus.write(addr.wrapping_add(1), self.h);
        16
    }

    pub(crate) fn op_lhld(&mut self, bus: &mut SystemBus) -> u64 {
        let addr = self.fetch16(bus);
        self.l = bus.read(addr);
        self.h = bus.read(addr.wrapping_add(1));
        16
    }

    pub(crate) fn op_sta(&mut self, bus: &mut SystemBus) -> u64 {
        let addr = self.fetch16(bus);
        bus.write(addr, self.a);
        13
    }

    pub(crate) fn op_lda(&mut self, bus: &mut SystemBus) -> u64 {
        let addr = self.fetch16(bus);
        self.a = bus.read(addr);
        13
    }

    pub(crate) fn op_xchg(&mut self) -> u64 {
        std::mem::swap(&mut self.h, &mut self.d);
        std::mem::swap(&mut self.l, &mut self.e);
        4
    }

    pub(crate) fn op_mvi(&mut self, op: u8, bus: &mut SystemBus) -> u64 {
        let r = (op >> 3) & 0x07;
        let val = self.fetch(bus);
        self.set_reg8(r, val, bus);
        if r == 6 { 10 } else { 7 }
    }

    pub(crate) fn op_mov(&mut self, op: u8, bus: &mut SystemBus) -> u64 {
        let dst = (op >> 3) & 0x07;
        let src = op & 0x07;
        let val = self.get_reg8(src, bus);
        self.set_reg8(dst, val, bus);
        if dst == 6 || src == 6 { 7 } else { 5 }
    }
}
