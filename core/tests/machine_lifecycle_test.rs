use meen_core::core::bus::Interrupt;
use meen_core::core::error::ErrorCode;
use meen_core::core::{Controller, Machine};

/// 64 KiB of zeroed memory (all NOPs), quitting after `quit_after` polls of
/// `generate_interrupt`.
struct NopUntilQuit {
    bytes: Box<[u8; 0x10000]>,
    polls: u32,
    quit_after: u32,
}

impl NopUntilQuit {
    fn new(quit_after: u32) -> Self {
        Self {
            bytes: Box::new([0; 0x10000]),
            polls: 0,
            quit_after,
        }
    }
}

impl Controller for NopUntilQuit {
    fn read(&mut self, addr: u16, _peer: Option<&mut dyn Controller>) -> u8 {
        self.bytes[addr as usize]
    }
    fn write(&mut self, addr: u16, data: u8, _peer: Option<&mut dyn Controller>) {
        self.bytes[addr as usize] = data;
    }
    fn generate_interrupt(
        &mut self,
        _current_ns: u64,
        _cycles: u64,
        _peer: Option<&mut dyn Controller>,
    ) -> Interrupt {
        self.polls += 1;
        if self.polls >= self.quit_after {
            Interrupt::Quit
        } else {
            Interrupt::NoInterrupt
        }
    }
    fn uuid(&self) -> [u8; 16] {
        [0x11; 16]
    }
}

struct BlankIo;
impl Controller for BlankIo {
    fn read(&mut self, _addr: u16, _peer: Option<&mut dyn Controller>) -> u8 {
        0
    }
    fn write(&mut self, _addr: u16, _data: u8, _peer: Option<&mut dyn Controller>) {}
    fn uuid(&self) -> [u8; 16] {
        [0; 16]
    }
}

#[test]
fn unknown_cpu_family_is_rejected() {
    assert_eq!(Machine::new("z80").unwrap_err(), ErrorCode::InvalidArgument);
}

#[test]
fn attach_none_controller_is_rejected() {
    let mut m = Machine::new("i8080").unwrap();
    assert_eq!(
        m.attach_memory_controller(None).unwrap_err(),
        ErrorCode::InvalidArgument
    );
}

#[test]
fn set_options_rejects_negative_isr_freq() {
    let mut m = Machine::new("i8080").unwrap();
    assert_eq!(
        m.set_options(r#"{"isrFreq":-5.0}"#).unwrap_err(),
        ErrorCode::JsonConfig
    );
}

#[test]
fn set_options_rejects_cpu_key_after_construction() {
    let mut m = Machine::new("i8080").unwrap();
    assert_eq!(
        m.set_options(r#"{"cpu":"z80"}"#).unwrap_err(),
        ErrorCode::JsonConfig
    );
}

#[test]
fn run_to_quit_returns_idle_and_reports_elapsed_time() {
    let mut m = Machine::new("i8080").unwrap();
    m.attach_memory_controller(Some(Box::new(NopUntilQuit::new(100))))
        .unwrap();
    m.attach_io_controller(Some(Box::new(BlankIo))).unwrap();
    m.set_options(r#"{"isrFreq":0}"#).unwrap();

    let elapsed = m.run(Some(0)).unwrap();
    // No pacing configured (clockResolution defaults to "disabled"), so the
    // loop burns through 100 NOPs essentially instantly.
    assert!(elapsed < 1_000_000_000);

    // A second run is accepted once the first completed and returned to Idle.
    assert!(m.set_options(r#"{"isrFreq":1.0}"#).is_ok());
}

#[test]
fn mutators_are_rejected_while_running_async() {
    let mut m = Machine::new("i8080").unwrap();
    m.attach_memory_controller(Some(Box::new(NopUntilQuit::new(5_000_000))))
        .unwrap();
    m.attach_io_controller(Some(Box::new(BlankIo))).unwrap();
    m.set_options(r#"{"isrFreq":0,"runAsync":true}"#).unwrap();

    let started = m.run(Some(0)).unwrap();
    assert_eq!(started, 0, "runAsync returns immediately");

    assert_eq!(
        m.attach_memory_controller(Some(Box::new(NopUntilQuit::new(1))))
            .unwrap_err(),
        ErrorCode::Busy
    );

    m.wait_for_completion();
}
