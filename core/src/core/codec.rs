use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::core::error::ErrorCode;
use crate::cpu::state::I8080State;

/// On-the-wire snapshot envelope (`spec.md` §4.4), field-for-field
/// compatible with `original_source`'s reference JSON (confirmed against
/// `test_Machine.py`'s literal save-state assertions). ROM is represented
/// only by its MD5 digest; RAM is zlib-then-base64 encoded.
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub cpu: CpuSection,
    pub memory: MemorySection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CpuSection {
    pub uuid: String,
    pub registers: RegistersSection,
    pub pc: u16,
    pub sp: u16,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegistersSection {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub s: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MemorySection {
    pub uuid: String,
    pub rom: String,
    pub ram: RamSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RamSection {
    pub encoder: String,
    pub compressor: String,
    pub size: usize,
    pub bytes: String,
}

/// Encode a full machine snapshot. `rom` is hashed, never embedded; `ram` is
/// compressed then base64-encoded whole (`spec.md` §4.4 "Encode").
pub fn encode_snapshot(
    cpu_uuid: [u8; 16],
    state: &I8080State,
    memory_uuid: [u8; 16],
    rom: &[u8],
    ram: &[u8],
) -> Result<String, ErrorCode> {
    let rom_digest = md5::compute(rom);

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(ram).map_err(|_| ErrorCode::Unknown)?;
    let compressed = encoder.finish().map_err(|_| ErrorCode::Unknown)?;

    let envelope = SaveEnvelope {
        cpu: CpuSection {
            uuid: BASE64.encode(cpu_uuid),
            registers: RegistersSection {
                a: state.a,
                b: state.b,
                c: state.c,
                d: state.d,
                e: state.e,
                h: state.h,
                l: state.l,
                s: state.status,
            },
            pc: state.pc,
            sp: state.sp,
        },
        memory: MemorySection {
            uuid: BASE64.encode(memory_uuid),
            rom: BASE64.encode(rom_digest.0),
            ram: RamSection {
                encoder: "base64".to_string(),
                compressor: "zlib".to_string(),
                size: ram.len(),
                bytes: BASE64.encode(compressed),
            },
        },
    };

    serde_json::to_string(&envelope).map_err(|_| ErrorCode::Unknown)
}

/// A snapshot parsed from JSON and fully resolved: RAM has been
/// decompressed, but integrity checks (CPU/memory UUID, ROM MD5) are left
/// to the caller, which is the only side that knows the currently attached
/// CPU and memory controller (`spec.md` §4.4 "Decode").
pub struct DecodedSnapshot {
    pub cpu_uuid: [u8; 16],
    pub registers: I8080State,
    pub memory_uuid: [u8; 16],
    pub rom_md5: [u8; 16],
    pub ram: Vec<u8>,
}

pub fn decode_snapshot(json: &str) -> Result<DecodedSnapshot, ErrorCode> {
    let envelope: SaveEnvelope = serde_json::from_str(json.trim_end_matches('\0'))
        .map_err(|_| ErrorCode::JsonConfig)?;

    let cpu_uuid = decode_uuid(&envelope.cpu.uuid)?;
    let memory_uuid = decode_uuid(&envelope.memory.uuid)?;
    let rom_md5 = decode_uuid(&envelope.memory.rom)?;

    if envelope.memory.ram.compressor != "zlib" || envelope.memory.ram.encoder != "base64" {
        return Err(ErrorCode::JsonConfig);
    }

    let compressed = BASE64
        .decode(envelope.memory.ram.bytes.as_bytes())
        .map_err(|_| ErrorCode::JsonConfig)?;
    let mut ram = Vec::with_capacity(envelope.memory.ram.size);
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut ram)
        .map_err(|_| ErrorCode::JsonConfig)?;

    if ram.len() != envelope.memory.ram.size {
        return Err(ErrorCode::JsonConfig);
    }

    Ok(DecodedSnapshot {
        cpu_uuid,
        registers: I8080State {
            a: envelope.cpu.registers.a,
            b: envelope.cpu.registers.b,
            c: envelope.cpu.registers.c,
            d: envelope.cpu.registers.d,
            e: envelope.cpu.registers.e,
            h: envelope.cpu.registers.h,
            l: envelope.cpu.registers.l,
            status: envelope.cpu.registers.s,
            pc: envelope.cpu.pc,
            sp: envelope.cpu.sp,
            inte: false,
            halted: false,
            ticks: 0,
        },
        memory_uuid,
        rom_md5,
        ram,
    })
}

fn decode_uuid(field: &str) -> Result<[u8; 16], ErrorCode> {
    let bytes = BASE64.decode(field.as_bytes()).map_err(|_| ErrorCode::JsonConfig)?;
    bytes.try_into().map_err(|_| ErrorCode::JsonConfig)
}

/// Resolve the convenience URI forms `spec.md` §6 documents for ROM/RAM
/// block data in load JSON. Minimal by design (`SPEC_FULL.md` §4.4): no
/// sandboxing beyond what `std::fs::read` gives for free.
pub fn resolve_uri(uri: &str) -> Result<Vec<u8>, ErrorCode> {
    if let Some(rest) = uri.strip_prefix("base64://zlib://") {
        let compressed = BASE64.decode(rest.as_bytes()).map_err(|_| ErrorCode::JsonConfig)?;
        let mut out = Vec::new();
        ZlibDecoder::new(compressed.as_slice())
            .read_to_end(&mut out)
            .map_err(|_| ErrorCode::JsonConfig)?;
        Ok(out)
    } else if let Some(rest) = uri.strip_prefix("base64://md5://") {
        // `md5://` is a tag, not a transform: the wrapped bytes already are
        // the digest, used for integrity comparison rather than recomputed.
        BASE64.decode(rest.as_bytes()).map_err(|_| ErrorCode::JsonConfig)
    } else if let Some(rest) = uri.strip_prefix("base64://") {
        BASE64.decode(rest.as_bytes()).map_err(|_| ErrorCode::JsonConfig)
    } else if let Some(path) = uri.strip_prefix("file://") {
        let (path, _size) = match path.split_once('?') {
            Some((p, query)) => (p, query.strip_prefix("size=").and_then(|s| s.parse::<usize>().ok())),
            None => (path, None),
        };
        std::fs::read(path).map_err(|_| ErrorCode::JsonConfig)
    } else {
        Err(ErrorCode::JsonConfig)
    }
}
