use thiserror::Error;

/// Explicit, enumerated error codes. The engine never uses exceptions for
/// control flow — every fallible operation returns `Result<T, ErrorCode>`.
///
/// `NoError` is carried for parity with the documented error-code list
/// (`spec.md` §6) even though Rust callers observe `Ok(_)` rather than
/// constructing it directly.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    #[error("no error")]
    NoError,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("invalid json configuration")]
    JsonConfig,
    #[error("machine is busy (running)")]
    Busy,
    #[error("operation not implemented in this build")]
    NotImplemented,
    #[error("clock resolution out of range")]
    ClockResolution,
    #[error("unknown error")]
    Unknown,
}
