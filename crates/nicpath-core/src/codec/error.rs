use thiserror::Error;

/// Errors returned by frame packing and unpacking.
///
/// # Examples
/// ```
/// use nicpath_core::CodecError;
///
/// let err = nicpath_core::pack("zz:00:00:00:00:01", "00:00:00:00:00:02",
///     "10.0.0.1", "10.0.0.2", 1, 2, b"").unwrap_err();
/// assert!(matches!(err, CodecError::Format { .. }));
/// assert!(err.to_string().contains("invalid source MAC"));
/// ```
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid {field} '{input}': {reason}")]
    Format {
        field: &'static str,
        input: String,
        reason: String,
    },
    #[error("frame checksum mismatch: expected {expected:08x}, got {actual:08x}")]
    Checksum { expected: u32, actual: u32 },
    #[error("frame too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("payload too large: {len} bytes exceeds the {max}-byte UDP limit")]
    PayloadTooLarge { len: usize, max: usize },
}

impl CodecError {
    pub(crate) fn format(field: &'static str, input: &str, reason: impl Into<String>) -> Self {
        CodecError::Format {
            field,
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
