//! Manchester line coding.
//!
//! Each data bit occupies two symbols with a mid-bit transition, so the
//! receiver can recover the clock from the data itself. A pair without a
//! transition is either the end-of-frame marker (0,0) or a line error (1,1).
//!
//! The transmit side is [`encode`], a lazy MSB-first symbol iterator; the
//! receive side is [`LineDecoder`], a state machine fed one symbol per tick.

pub mod decoder;
pub mod error;
pub mod manchester;

pub use decoder::{DecoderConfig, DecoderPhase, LineDecoder, MAX_FRAME_BITS, Step};
pub use error::LineError;
pub use manchester::{
    Convention, END_OF_FRAME, Symbol, Symbols, encode, format_symbols, parse_symbols,
};
