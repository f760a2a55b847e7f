use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::core::bus::{Interrupt, SystemBus};
use crate::core::clock::CpuClock;
use crate::core::codec;
use crate::core::controller::Controller;
use crate::core::error::ErrorCode;
use crate::core::options::MachineOptions;
use crate::cpu::{deliver_cpu_interrupt, Cpu, CpuStateTrait, I8080};

type SaveCallback = Box<dyn FnMut(String) -> ErrorCode + Send>;
type LoadCallback = Box<dyn FnMut() -> String + Send>;
type ErrorCallback = Box<dyn FnMut(ErrorCode, ErrorContext) + Send>;
type InitCallback = Box<dyn FnMut() + Send>;
type IdleCallback = Box<dyn FnMut() + Send>;

/// Context passed to a registered `onError` callback (`spec.md` §6,
/// `onError(code, file, func, line, col, ioc)`). `ioc` names the
/// controller involved, if the error can be attributed to one.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub file: &'static str,
    pub func: &'static str,
    pub line: u32,
    pub col: u32,
    pub ioc: Option<String>,
}

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const STOPPING: u8 = 2;

/// Everything that a running loop iteration touches. Lives inside `Machine`
/// while Idle; handed wholesale to the worker thread (and handed back via
/// the result channel) while Running, so no locking is needed around the
/// CPU or bus (`spec.md` §5, "no locking required inside the engine").
struct EngineState {
    cpu: I8080,
    bus: SystemBus,
    clock: CpuClock,
    on_save: Arc<Mutex<Option<SaveCallback>>>,
    on_load: Option<LoadCallback>,
    on_error: Option<ErrorCallback>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            cpu: I8080::new(),
            bus: SystemBus::new(Box::new(NullController), Box::new(NullController)),
            clock: CpuClock::new(-1, 60.0),
            on_save: Arc::new(Mutex::new(None)),
            on_load: None,
            on_error: None,
        }
    }
}

/// Placeholder controller occupying the bus before a real one is attached.
/// Reads as all-zero memory/ports and never raises interrupts.
struct NullController;

impl Controller for NullController {
    fn read(&mut self, _addr: u16, _peer: Option<&mut dyn Controller>) -> u8 {
        0
    }
    fn write(&mut self, _addr: u16, _data: u8, _peer: Option<&mut dyn Controller>) {}
    fn uuid(&self) -> [u8; 16] {
        [0; 16]
    }
}

/// Top-level engine handle (`spec.md` §4.3). Owns the CPU, bus, clock, and
/// the save/load/error/init/idle callbacks; drives the main loop either on
/// the caller's thread or a background worker.
pub struct Machine {
    state: Arc<AtomicU8>,
    engine: Option<EngineState>,
    options: MachineOptions,
    on_init: Option<InitCallback>,
    on_idle: Option<IdleCallback>,
    worker: Option<JoinHandle<()>>,
    result_rx: Option<mpsc::Receiver<RunOutcome>>,
    last_elapsed_ns: u64,
}

struct RunOutcome {
    engine: EngineState,
    elapsed_ns: u64,
}

impl Machine {
    /// Construct a Machine for the named CPU family. Only `"i8080"` is
    /// recognized today; the family is fixed for the Machine's lifetime
    /// (`spec.md` §3, "write-once at construction").
    pub fn new(cpu_family: &str) -> Result<Self, ErrorCode> {
        if cpu_family != "i8080" {
            return Err(ErrorCode::InvalidArgument);
        }
        let mut options = MachineOptions::default();
        options.cpu = Some(cpu_family.to_string());
        Ok(Self {
            state: Arc::new(AtomicU8::new(IDLE)),
            engine: Some(EngineState::new()),
            options,
            on_init: None,
            on_idle: None,
            worker: None,
            result_rx: None,
            last_elapsed_ns: 0,
        })
    }

    fn require_idle(&self) -> Result<(), ErrorCode> {
        if self.state.load(Ordering::SeqCst) == IDLE {
            Ok(())
        } else {
            Err(ErrorCode::Busy)
        }
    }

    pub fn attach_memory_controller(
        &mut self,
        controller: Option<Box<dyn Controller>>,
    ) -> Result<(), ErrorCode> {
        self.require_idle()?;
        let controller = controller.ok_or(ErrorCode::InvalidArgument)?;
        self.engine.as_mut().unwrap().bus.replace_memory(controller);
        Ok(())
    }

    pub fn attach_io_controller(
        &mut self,
        controller: Option<Box<dyn Controller>>,
    ) -> Result<(), ErrorCode> {
        self.require_idle()?;
        let controller = controller.ok_or(ErrorCode::InvalidArgument)?;
        self.engine.as_mut().unwrap().bus.replace_io(controller);
        Ok(())
    }

    /// Merge a JSON options document (`spec.md` §3 `MachineOptions`). The
    /// `cpu` key, once set by `new`, can never be changed again.
    pub fn set_options(&mut self, json: &str) -> Result<(), ErrorCode> {
        self.require_idle()?;
        self.options.merge_json(json, true)?;
        if let Some(engine) = self.engine.as_mut() {
            engine.clock = CpuClock::new(self.options.clock_resolution, self.options.clock_sampling_freq);
        }
        Ok(())
    }

    pub fn on_save<F>(&mut self, cb: F) -> Result<(), ErrorCode>
    where
        F: FnMut(String) -> ErrorCode + Send + 'static,
    {
        self.require_idle()?;
        *self.engine.as_mut().unwrap().on_save.lock().unwrap() = Some(Box::new(cb));
        Ok(())
    }

    pub fn on_load<F>(&mut self, cb: F) -> Result<(), ErrorCode>
    where
        F: FnMut() -> String + Send + 'static,
    {
        self.require_idle()?;
        self.engine.as_mut().unwrap().on_load = Some(Box::new(cb));
        Ok(())
    }

    pub fn on_error<F>(&mut self, cb: F) -> Result<(), ErrorCode>
    where
        F: FnMut(ErrorCode, ErrorContext) + Send + 'static,
    {
        self.require_idle()?;
        self.engine.as_mut().unwrap().on_error = Some(Box::new(cb));
        Ok(())
    }

    pub fn on_init<F>(&mut self, cb: F) -> Result<(), ErrorCode>
    where
        F: FnMut() + Send + 'static,
    {
        self.require_idle()?;
        self.on_init = Some(Box::new(cb));
        Ok(())
    }

    pub fn on_idle<F>(&mut self, cb: F) -> Result<(), ErrorCode>
    where
        F: FnMut() + Send + 'static,
    {
        self.require_idle()?;
        self.on_idle = Some(Box::new(cb));
        Ok(())
    }

    /// Run to completion (`Quit`) synchronously, or hand the loop to a
    /// worker and return `0` immediately when `runAsync` is set
    /// (`spec.md` §4.3).
    pub fn run(&mut self, start_pc: Option<u16>) -> Result<u64, ErrorCode> {
        self.require_idle()?;
        let mut engine = self.engine.take().ok_or(ErrorCode::Unknown)?;

        if let Some(pc) = start_pc {
            engine.cpu.pc = pc;
        }
        engine.clock.reset();

        if let Some(on_init) = self.on_init.as_mut() {
            on_init();
        }

        self.state.store(RUNNING, Ordering::SeqCst);
        let options = self.options.clone();

        if self.options.run_async {
            let state = Arc::clone(&self.state);
            let (tx, rx) = mpsc::channel();
            let handle = thread::spawn(move || {
                let outcome = run_loop(engine, &options);
                state.store(STOPPING, Ordering::SeqCst);
                let _ = tx.send(outcome);
            });
            self.worker = Some(handle);
            self.result_rx = Some(rx);
            Ok(0)
        } else {
            let outcome = run_loop(engine, &options);
            self.last_elapsed_ns = outcome.elapsed_ns;
            self.engine = Some(outcome.engine);
            self.state.store(IDLE, Ordering::SeqCst);
            if let Some(on_idle) = self.on_idle.as_mut() {
                on_idle();
            }
            Ok(self.last_elapsed_ns)
        }
    }

    /// Join the background worker started by an async `run`, returning the
    /// elapsed nanoseconds. A no-op returning the last known elapsed time if
    /// the previous `run` was synchronous or already joined.
    pub fn wait_for_completion(&mut self) -> u64 {
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
            if let Some(rx) = self.result_rx.take() {
                if let Ok(outcome) = rx.recv() {
                    self.last_elapsed_ns = outcome.elapsed_ns;
                    self.engine = Some(outcome.engine);
                }
            }
            self.state.store(IDLE, Ordering::SeqCst);
            if let Some(on_idle) = self.on_idle.as_mut() {
                on_idle();
            }
        }
        self.last_elapsed_ns
    }
}

fn run_loop(mut engine: EngineState, options: &MachineOptions) -> RunOutcome {
    let isr_granularity = options.isr_granularity_ticks();
    let mut ticks_since_isr: u64 = 0;

    loop {
        let cost = engine.cpu.step(&mut engine.bus);
        ticks_since_isr += cost;
        engine.clock.pace(engine.cpu.ticks());

        if ticks_since_isr < isr_granularity {
            continue;
        }
        ticks_since_isr = 0;

        let now_ns = engine.clock.elapsed_ns();
        let ticks = engine.cpu.ticks();
        // `Interrupt` is a single tagged value, so an IoController can only
        // ever report one of {Load, Save, Quit, Rst(_)} per poll — the
        // Load-before-Save-before-Quit precedence `spec.md` §4.3 and §9
        // describe is therefore the *controller's* responsibility to
        // encode, not something `Machine` arbitrates here.
        match engine.bus.generate_interrupt(now_ns, ticks) {
            Interrupt::NoInterrupt => {}
            rst @ Interrupt::Rst(_) => {
                deliver_cpu_interrupt(&mut engine.cpu, rst, &mut engine.bus);
            }
            Interrupt::Save => handle_save(&mut engine, options),
            Interrupt::Load => handle_load(&mut engine, options),
            Interrupt::Quit => break,
        }
    }

    RunOutcome {
        elapsed_ns: engine.clock.elapsed_ns(),
        engine,
    }
}

fn dump_region(bus: &mut SystemBus, offset: u16, size: usize) -> Vec<u8> {
    (0..size as u32)
        .map(|i| bus.read(offset.wrapping_add(i as u16)))
        .collect()
}

fn build_save_json(engine: &mut EngineState, options: &MachineOptions) -> Result<String, ErrorCode> {
    let rom = dump_region(&mut engine.bus, options.rom_offset, options.rom_size);
    let ram = dump_region(&mut engine.bus, options.ram_offset, options.ram_size);
    let state = engine.cpu.snapshot();
    codec::encode_snapshot(
        engine.cpu.cpu_uuid(),
        &state,
        engine.bus.memory_uuid(),
        &rom,
        &ram,
    )
}

fn handle_save(engine: &mut EngineState, options: &MachineOptions) {
    let json = match build_save_json(engine, options) {
        Ok(j) => j,
        Err(e) => {
            report_error(engine, e, "handle_save");
            return;
        }
    };

    let slot = Arc::clone(&engine.on_save);
    if options.save_async {
        // Transient worker per Save, not a persistent pool — matches the
        // at-most-once-per-interrupt traffic pattern (`SPEC_FULL.md` §4.3).
        thread::spawn(move || {
            if let Some(cb) = slot.lock().unwrap().as_mut() {
                cb(json);
            }
        });
    } else if let Some(cb) = slot.lock().unwrap().as_mut() {
        cb(json);
    }
}

fn handle_load(engine: &mut EngineState, options: &MachineOptions) {
    if engine.on_load.is_none() {
        return;
    }
    let load_async = options.load_async;
    let json = {
        let cb = engine.on_load.as_mut().unwrap();
        if load_async {
            // The loop blocks on Load either way (`spec.md` §5,
            // "loadAsync=true means run the load callback on another thread
            // while the CPU pauses") — only the thread the callback itself
            // runs on changes.
            thread::scope(|scope| scope.spawn(|| cb()).join().unwrap_or_default())
        } else {
            cb()
        }
    };
    apply_load(engine, &json, options);
}

fn apply_load(engine: &mut EngineState, json: &str, options: &MachineOptions) {
    let decoded = match codec::decode_snapshot(json) {
        Ok(d) => d,
        Err(e) => {
            report_error(engine, e, "apply_load");
            return;
        }
    };

    if decoded.cpu_uuid != engine.cpu.cpu_uuid() || decoded.memory_uuid != engine.bus.memory_uuid() {
        report_error(engine, ErrorCode::JsonConfig, "apply_load");
        return;
    }

    let rom = dump_region(&mut engine.bus, options.rom_offset, options.rom_size);
    if md5::compute(&rom).0 != decoded.rom_md5 {
        report_error(engine, ErrorCode::JsonConfig, "apply_load");
        return;
    }

    if decoded.ram.len() != options.ram_size {
        report_error(engine, ErrorCode::JsonConfig, "apply_load");
        return;
    }
    for (i, byte) in decoded.ram.iter().enumerate() {
        engine.bus.write(options.ram_offset.wrapping_add(i as u16), *byte);
    }

    // PC/SP/registers apply atomically at this instruction boundary; INTE,
    // halted, and the tick counter are not part of the envelope and are
    // left as-is (`spec.md` §3, "tick counter never decreases").
    let mut state = engine.cpu.snapshot();
    state.a = decoded.registers.a;
    state.b = decoded.registers.b;
    state.c = decoded.registers.c;
    state.d = decoded.registers.d;
    state.e = decoded.registers.e;
    state.h = decoded.registers.h;
    state.l = decoded.registers.l;
    state.status = decoded.registers.status;
    state.pc = decoded.registers.pc;
    state.sp = decoded.registers.sp;
    engine.cpu.restore(&state);
}

#[track_caller]
fn report_error(engine: &mut EngineState, code: ErrorCode, func: &'static str) {
    let loc = std::panic::Location::caller();
    log::warn!("{code} in {func} at {}:{}", loc.file(), loc.line());
    if let Some(cb) = engine.on_error.as_mut() {
        cb(
            code,
            ErrorContext {
                file: loc.file(),
                func,
                line: loc.line(),
                col: loc.column(),
                ioc: None,
            },
        );
    }
}
