use crate::core::controller::Controller;

/// One of the seven maskable restart vectors an I/O controller can request.
/// `NoInterrupt` doubles as "RST 0" at the protocol level, so only 1..=7 are
/// representable here — matching how arcade-era 8080 boards wire the seven
/// maskable interrupt lines and leave RST 0 to the reset circuit.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RstVector {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
}

impl RstVector {
    /// The CALL target this vector pushes PC to: RST n -> 0x0000 + n*8.
    pub fn address(self) -> u16 {
        (self as u16) * 8
    }
}

/// Tagged value returned by `IoController::generate_interrupt`.
///
/// `Load`/`Save`/`Quit` overload the same channel as the numeric restart
/// vectors but are handled entirely by `Machine` before (and instead of)
/// being dispatched to the CPU — see `spec.md` §9 "Interrupt capture".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    NoInterrupt,
    Rst(RstVector),
    Load,
    Save,
    Quit,
}

/// Address/data path connecting the CPU to the attached controllers.
///
/// Memory reads/writes and I/O port reads/writes are dispatched to separate
/// controllers (the 8080 has a distinct I/O address space), with each
/// controller given a reference to its peer so that, e.g., a CP/M BDOS
/// emulation living in the I/O controller can read program memory directly
/// (`spec.md` §6, "the `peerController` argument").
pub struct SystemBus {
    memory: Box<dyn Controller>,
    io: Box<dyn Controller>,
}

impl SystemBus {
    pub fn new(memory: Box<dyn Controller>, io: Box<dyn Controller>) -> Self {
        Self { memory, io }
    }

    pub fn read(&mut self, addr: u16) -> u8 {
        let Self { memory, io } = self;
        memory.read(addr, Some(io.as_mut()))
    }

    pub fn write(&mut self, addr: u16, data: u8) {
        let Self { memory, io } = self;
        memory.write(addr, data, Some(io.as_mut()));
    }

    pub fn io_read(&mut self, port: u8) -> u8 {
        let Self { memory, io } = self;
        io.read(port as u16, Some(memory.as_mut()))
    }

    pub fn io_write(&mut self, port: u8, data: u8) {
        let Self { memory, io } = self;
        io.write(port as u16, data, Some(memory.as_mut()));
    }

    /// Poll the I/O controller for a pending interrupt. Called by `Machine`
    /// at the cadence `isrFreq` dictates, never by the CPU itself.
    pub fn generate_interrupt(&mut self, current_ns: u64, cycles: u64) -> Interrupt {
        let Self { memory, io } = self;
        io.generate_interrupt(current_ns, cycles, Some(memory.as_mut()))
    }

    pub fn memory_uuid(&self) -> [u8; 16] {
        self.memory.uuid()
    }

    pub fn io_uuid(&self) -> [u8; 16] {
        self.io.uuid()
    }

    pub fn memory_mut(&mut self) -> &mut dyn Controller {
        self.memory.as_mut()
    }

    pub fn replace_memory(&mut self, memory: Box<dyn Controller>) {
        self.memory = memory;
    }

    pub fn replace_io(&mut self, io: Box<dyn Controller>) {
        self.io = io;
    }
}
