use serde::Deserialize;

use crate::core::error::ErrorCode;

/// Parsed, validated configuration for a `Machine`.
///
/// Constructed via [`MachineOptions::merge_json`], which accepts partial
/// JSON documents and only overwrites the keys present in them — absent
/// keys keep whatever value was already set (`spec.md` §3, "Absent fields
/// ... inherit current state" applies to options the same way it applies to
/// load snapshots).
#[derive(Debug, Clone)]
pub struct MachineOptions {
    pub cpu: Option<String>,
    pub isr_freq: f64,
    /// Nanoseconds per T-state. Negative disables clock pacing.
    pub clock_resolution: i64,
    pub clock_sampling_freq: f64,
    pub run_async: bool,
    pub load_async: bool,
    pub save_async: bool,
    pub rom_offset: u16,
    pub rom_size: usize,
    pub ram_offset: u16,
    pub ram_size: usize,
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self {
            cpu: None,
            isr_freq: 0.0,
            clock_resolution: -1,
            clock_sampling_freq: 60.0,
            run_async: false,
            load_async: false,
            save_async: false,
            rom_offset: 0,
            rom_size: 0,
            ram_offset: 0,
            ram_size: 0x10000,
        }
    }
}

/// Clock rate assumed for the `isrFreq` → tick-granularity conversion when
/// `clockResolution` hasn't pinned one down. 2 MHz is the 8080's common
/// arcade-board speed and matches `original_source`'s default test fixtures.
const DEFAULT_CPU_HZ: f64 = 2_000_000.0;

/// The Machine's fixed internal interrupt-servicing rate (`spec.md` §3,
/// "isrHz is chosen by the Machine (typically 60)"). This is distinct from
/// `clockSamplingFreq`, which only controls how often `CpuClock` compares
/// ticks against wall time — raising one must not change the other.
const ISR_HZ: f64 = 60.0;

impl MachineOptions {
    /// Instruction-tick granularity at which `Machine::run` polls
    /// `generate_interrupt` (`spec.md` §4.3 step 3).
    ///
    /// `isrFreq == 0` means "every instruction" (Open Question (b), resolved
    /// in `SPEC_FULL.md` in favor of the spec's stated default). Otherwise
    /// `ceil(cpuHz / (isrHz * isrFreq))`, where `isrHz` is the machine's
    /// fixed 60 Hz polling target (`ISR_HZ`, not `clockSamplingFreq`) and
    /// `cpuHz` derives from `clockResolution` when pacing is enabled, or the
    /// 2 MHz default otherwise.
    pub fn isr_granularity_ticks(&self) -> u64 {
        if self.isr_freq == 0.0 {
            return 1;
        }
        let cpu_hz = if self.clock_resolution > 0 {
            1_000_000_000.0 / self.clock_resolution as f64
        } else {
            DEFAULT_CPU_HZ
        };
        let granularity = (cpu_hz / (ISR_HZ * self.isr_freq)).ceil();
        granularity.max(1.0) as u64
    }

    /// Merge a JSON options document into `self`, validating as it goes.
    /// `cpu_locked` should be `true` once the Machine has already had its
    /// CPU family fixed by an earlier call (`spec.md` §3, "fixed at
    /// construction, rejected if re-set after construction").
    pub fn merge_json(&mut self, json: &str, cpu_locked: bool) -> Result<(), ErrorCode> {
        let raw: RawOptions = serde_json::from_str(json).map_err(|_| ErrorCode::JsonConfig)?;

        if let Some(cpu) = raw.cpu {
            if cpu_locked {
                return Err(ErrorCode::JsonConfig);
            }
            self.cpu = Some(cpu);
        }

        if let Some(isr_freq) = raw.isr_freq {
            if isr_freq < 0.0 {
                return Err(ErrorCode::JsonConfig);
            }
            self.isr_freq = isr_freq;
        }

        if let Some(clock_resolution) = raw.clock_resolution {
            self.clock_resolution = clock_resolution;
        }

        if let Some(clock_sampling_freq) = raw.clock_sampling_freq {
            if clock_sampling_freq <= 0.0 {
                return Err(ErrorCode::ClockResolution);
            }
            self.clock_sampling_freq = clock_sampling_freq;
        }

        if let Some(run_async) = raw.run_async {
            self.run_async = run_async;
        }
        if let Some(load_async) = raw.load_async {
            self.load_async = load_async;
        }
        if let Some(save_async) = raw.save_async {
            self.save_async = save_async;
        }

        if let Some(rom_offset) = raw.rom_offset {
            self.rom_offset = rom_offset;
        }
        if let Some(rom_size) = raw.rom_size {
            self.rom_size = rom_size;
        }
        if let Some(ram_offset) = raw.ram_offset {
            self.ram_offset = ram_offset;
        }
        if let Some(ram_size) = raw.ram_size {
            self.ram_size = ram_size;
        }

        // Nested `rom.file[]` / `ram.block[]` shape, carried over from
        // `original_source`'s test fixtures (`SPEC_FULL.md` §6). Only the
        // first region of each list is honored; multi-region banking is out
        // of scope.
        if let Some(rom) = raw.rom {
            if let Some(region) = rom.file.and_then(|v| v.into_iter().next()) {
                self.rom_offset = region.offset;
                self.rom_size = region.size;
            }
        }
        if let Some(ram) = raw.ram {
            if let Some(region) = ram.block.and_then(|v| v.into_iter().next()) {
                self.ram_offset = region.offset;
                self.ram_size = region.size;
            }
        }

        Ok(())
    }
}

#[derive(Deserialize, Default)]
struct RawOptions {
    cpu: Option<String>,
    #[serde(rename = "isrFreq")]
    isr_freq: Option<f64>,
    #[serde(rename = "clockResolution")]
    clock_resolution: Option<i64>,
    #[serde(rename = "clockSamplingFreq")]
    clock_sampling_freq: Option<f64>,
    #[serde(rename = "runAsync")]
    run_async: Option<bool>,
    #[serde(rename = "loadAsync")]
    load_async: Option<bool>,
    #[serde(rename = "saveAsync")]
    save_async: Option<bool>,
    #[serde(rename = "romOffset")]
    rom_offset: Option<u16>,
    #[serde(rename = "romSize")]
    rom_size: Option<usize>,
    #[serde(rename = "ramOffset")]
    ram_offset: Option<u16>,
    #[serde(rename = "ramSize")]
    ram_size: Option<usize>,
    rom: Option<RomBlockSpec>,
    ram: Option<RamBlockSpec>,
}

#[derive(Deserialize)]
struct RomBlockSpec {
    file: Option<Vec<BlockRegion>>,
}

#[derive(Deserialize)]
struct RamBlockSpec {
    block: Option<Vec<BlockRegion>>,
}

#[derive(Deserialize)]
struct BlockRegion {
    offset: u16,
    size: usize,
}
