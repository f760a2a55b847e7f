use crate::core::bus::SystemBus;
use crate::cpu::i8080::I8080;

impl I8080 {
    pub(crate) fn op_in(&mut self, bus: &mut SystemBus) -> u64 {
        let port = self.fetch(bus);
        self.a = bus.io_read(port);
        10
    }

    pub(crate) fn op_out(&mut self, bus: &mut SystemBus) -> u64 {
        let port = self.fetch(bus);
        bus.io_write(port, self.a);
        10
    }
}
