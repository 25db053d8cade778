use thiserror::Error;

use crate::line::DecoderPhase;

/// Errors returned by field extraction.
///
/// An unsupported ethertype or protocol is not an error; see
/// [`Extraction::Skipped`](super::Extraction::Skipped).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("decoder has not completed a frame (phase: {phase:?})")]
    NotComplete { phase: DecoderPhase },
    #[error("decoded {bits} bits, not a whole number of bytes")]
    UnalignedLength { bits: usize },
    #[error("decoded frame too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
}
