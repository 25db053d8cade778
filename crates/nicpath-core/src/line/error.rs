use thiserror::Error;

/// Errors raised by the line layer.
///
/// `InvalidCode` and `CapacityExceeded` end a decode session; the decoder
/// answers `SessionFailed` until it is reset.
///
/// # Examples
/// ```
/// use nicpath_core::line::{LineDecoder, LineError, Symbol};
///
/// let mut decoder = LineDecoder::default();
/// decoder.feed(Symbol::High)?;
/// let err = decoder.feed(Symbol::High).unwrap_err();
/// assert!(matches!(err, LineError::InvalidCode { symbol_index: 1 }));
/// assert!(err.to_string().contains("invalid line code"));
/// # Ok::<(), LineError>(())
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error("invalid line code (1,1) ending at symbol {symbol_index}")]
    InvalidCode { symbol_index: usize },
    #[error("decoded bit buffer full: capacity is {capacity} bits")]
    CapacityExceeded { capacity: usize },
    #[error("decode session failed; reset before feeding more symbols")]
    SessionFailed,
    #[error("invalid symbol character {character:?} at position {position}")]
    InvalidSymbolText { character: char, position: usize },
}
