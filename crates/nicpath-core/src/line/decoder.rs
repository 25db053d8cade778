use bitvec::prelude::*;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::error::LineError;
use super::manchester::{Convention, Symbol};

/// Largest Ethernet II frame (header, 1500-byte payload, FCS) in bits.
pub const MAX_FRAME_BITS: usize = 1518 * 8;

/// Position of a decode session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecoderPhase {
    /// Waiting for the first half of a bit period.
    AwaitFirstHalf,
    /// First half latched, waiting for the second.
    AwaitSecondHalf,
    /// End-of-frame pair seen; the buffer holds a complete frame.
    Done,
    /// Invalid code or overflow; only `reset` leaves this state.
    Failed,
}

/// Decoder settings fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Capacity of the decoded bit buffer.
    pub capacity_bits: usize,
    /// Must match the convention the transmitter encoded with.
    pub convention: Convention,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            capacity_bits: MAX_FRAME_BITS,
            convention: Convention::Standard,
        }
    }
}

/// Outcome of feeding one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// First half of a pair stored.
    Latched,
    /// A data bit was appended to the buffer.
    Bit(bool),
    /// The (0,0) pair ended the frame.
    EndOfFrame,
    /// The decoder is `Done`; the symbol was not consumed.
    Ignored,
}

/// Manchester line decoder for one frame at a time.
///
/// Symbols are fed strictly in transmission order, one per clock tick. Pairs
/// are formed from consecutive symbols starting at the first one fed after
/// construction or [`reset`](LineDecoder::reset):
///
/// | pair  | effect                                   |
/// |-------|------------------------------------------|
/// | (0,0) | end of frame, `Done`                     |
/// | (1,1) | `Failed`, [`LineError::InvalidCode`]     |
/// | (0,1) / (1,0) | data bit per the [`Convention`]  |
///
/// Bits are appended at increasing index into a fixed-capacity buffer.
///
/// # Examples
/// ```
/// use nicpath_core::line::{Convention, DecoderPhase, LineDecoder, encode};
///
/// let mut decoder = LineDecoder::default();
/// let phase = decoder.feed_all(encode(&[0xA5], Convention::Standard).terminated())?;
/// assert_eq!(phase, DecoderPhase::Done);
/// assert_eq!(decoder.decoded_bytes(), Some(&[0xA5][..]));
/// # Ok::<(), nicpath_core::line::LineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LineDecoder {
    config: DecoderConfig,
    phase: DecoderPhase,
    last_half: Symbol,
    symbols_consumed: usize,
    bits: BitVec<u8, Msb0>,
    complete: bool,
    failed: bool,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}

impl LineDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            phase: DecoderPhase::AwaitFirstHalf,
            last_half: Symbol::Low,
            symbols_consumed: 0,
            bits: BitVec::with_capacity(config.capacity_bits),
            complete: false,
            failed: false,
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Clear every register and the buffer to start a new frame.
    pub fn reset(&mut self) {
        self.phase = DecoderPhase::AwaitFirstHalf;
        self.last_half = Symbol::Low;
        self.symbols_consumed = 0;
        self.bits.clear();
        self.complete = false;
        self.failed = false;
    }

    /// Advance the state machine by one symbol.
    ///
    /// # Errors
    /// `InvalidCode` on a (1,1) pair and `CapacityExceeded` when a data bit
    /// would overflow the buffer; both move the decoder to `Failed`. A failed
    /// decoder answers `SessionFailed` until reset.
    pub fn feed(&mut self, symbol: Symbol) -> Result<Step, LineError> {
        match self.phase {
            DecoderPhase::Done => Ok(Step::Ignored),
            DecoderPhase::Failed => Err(LineError::SessionFailed),
            DecoderPhase::AwaitFirstHalf => {
                self.last_half = symbol;
                self.symbols_consumed += 1;
                self.phase = DecoderPhase::AwaitSecondHalf;
                Ok(Step::Latched)
            }
            DecoderPhase::AwaitSecondHalf => {
                let symbol_index = self.symbols_consumed;
                self.symbols_consumed += 1;
                self.complete_pair(self.last_half, symbol, symbol_index)
            }
        }
    }

    /// Feed symbols until the sequence ends or a terminal phase is reached.
    ///
    /// Symbols after `Done` are left unconsumed.
    pub fn feed_all<I>(&mut self, symbols: I) -> Result<DecoderPhase, LineError>
    where
        I: IntoIterator<Item = Symbol>,
    {
        for symbol in symbols {
            if self.phase == DecoderPhase::Done {
                break;
            }
            self.feed(symbol)?;
        }
        Ok(self.phase)
    }

    fn complete_pair(
        &mut self,
        first: Symbol,
        second: Symbol,
        symbol_index: usize,
    ) -> Result<Step, LineError> {
        match (first, second) {
            (Symbol::Low, Symbol::Low) => {
                self.phase = DecoderPhase::Done;
                self.complete = true;
                debug!(
                    "end of frame after {} symbols, {} bits decoded",
                    self.symbols_consumed,
                    self.bits.len()
                );
                Ok(Step::EndOfFrame)
            }
            (Symbol::High, Symbol::High) => {
                self.fail();
                debug!("invalid line code (1,1) ending at symbol {symbol_index}");
                Err(LineError::InvalidCode { symbol_index })
            }
            _ => {
                if self.bits.len() >= self.config.capacity_bits {
                    self.fail();
                    debug!(
                        "decoded bit buffer full at {} bits",
                        self.config.capacity_bits
                    );
                    return Err(LineError::CapacityExceeded {
                        capacity: self.config.capacity_bits,
                    });
                }
                let bit = self.config.convention.bit_for_transition(first);
                self.bits.push(bit);
                self.phase = DecoderPhase::AwaitFirstHalf;
                trace!("bit {} = {}", self.bits.len() - 1, bit as u8);
                Ok(Step::Bit(bit))
            }
        }
    }

    fn fail(&mut self) {
        self.phase = DecoderPhase::Failed;
        self.failed = true;
    }

    pub fn phase(&self) -> DecoderPhase {
        self.phase
    }

    /// Completion flag, set on the end-of-frame pair.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Error flag, set on an invalid code or overflow.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn symbols_consumed(&self) -> usize {
        self.symbols_consumed
    }

    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }

    /// Decoded bits in arrival order.
    pub fn bits(&self) -> &BitSlice<u8, Msb0> {
        &self.bits
    }

    /// Decoded bits packed MSB-first, or `None` if the bit count is not a
    /// whole number of bytes.
    pub fn decoded_bytes(&self) -> Option<&[u8]> {
        if self.bits.len() % 8 != 0 {
            return None;
        }
        Some(self.bits.as_raw_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::{DecoderConfig, DecoderPhase, LineDecoder, Step};
    use crate::line::error::LineError;
    use crate::line::manchester::{
        Convention, END_OF_FRAME, Symbol, encode, parse_symbols,
    };

    fn symbols(text: &str) -> Vec<Symbol> {
        parse_symbols(text).unwrap()
    }

    fn reverse_decoder() -> LineDecoder {
        LineDecoder::new(DecoderConfig {
            convention: Convention::Reverse,
            ..DecoderConfig::default()
        })
    }

    #[test]
    fn first_half_is_latched() {
        let mut decoder = LineDecoder::default();
        assert_eq!(decoder.feed(Symbol::High).unwrap(), Step::Latched);
        assert_eq!(decoder.phase(), DecoderPhase::AwaitSecondHalf);
        assert_eq!(decoder.bit_len(), 0);
    }

    #[test]
    fn reverse_convention_pair_table() {
        let mut decoder = reverse_decoder();
        decoder.feed(Symbol::High).unwrap();
        assert_eq!(decoder.feed(Symbol::Low).unwrap(), Step::Bit(true));
        decoder.feed(Symbol::Low).unwrap();
        assert_eq!(decoder.feed(Symbol::High).unwrap(), Step::Bit(false));
        assert_eq!(decoder.phase(), DecoderPhase::AwaitFirstHalf);
    }

    #[test]
    fn standard_convention_pair_table() {
        let mut decoder = LineDecoder::default();
        decoder.feed(Symbol::Low).unwrap();
        assert_eq!(decoder.feed(Symbol::High).unwrap(), Step::Bit(true));
        decoder.feed(Symbol::High).unwrap();
        assert_eq!(decoder.feed(Symbol::Low).unwrap(), Step::Bit(false));
    }

    #[test]
    fn end_of_frame_sets_completion() {
        let mut decoder = LineDecoder::default();
        let phase = decoder.feed_all(symbols("0110 00")).unwrap();
        assert_eq!(phase, DecoderPhase::Done);
        assert!(decoder.is_complete());
        assert!(!decoder.is_failed());
        assert_eq!(decoder.bit_len(), 2);
    }

    #[test]
    fn symbols_after_done_are_ignored() {
        let mut decoder = LineDecoder::default();
        decoder.feed_all(END_OF_FRAME).unwrap();
        assert_eq!(decoder.feed(Symbol::High).unwrap(), Step::Ignored);
        assert_eq!(decoder.feed(Symbol::High).unwrap(), Step::Ignored);
        assert_eq!(decoder.symbols_consumed(), 2);
        assert_eq!(decoder.phase(), DecoderPhase::Done);
    }

    #[test]
    fn feed_all_stops_at_done() {
        let mut decoder = LineDecoder::default();
        let phase = decoder.feed_all(symbols("01 00 11 11")).unwrap();
        assert_eq!(phase, DecoderPhase::Done);
        assert_eq!(decoder.symbols_consumed(), 4);
    }

    #[test]
    fn invalid_code_fails_session() {
        let mut decoder = LineDecoder::default();
        let err = decoder.feed_all(symbols("01 10 11 01")).unwrap_err();
        assert_eq!(err, LineError::InvalidCode { symbol_index: 5 });
        assert_eq!(decoder.phase(), DecoderPhase::Failed);
        assert!(decoder.is_failed());
        assert!(!decoder.is_complete());
        assert_eq!(decoder.feed(Symbol::Low), Err(LineError::SessionFailed));
    }

    #[test]
    fn invalid_code_detected_at_every_aligned_position() {
        let clean: Vec<Symbol> = encode(b"ab", Convention::Standard).collect();
        for pair in 0..clean.len() / 2 {
            let mut corrupted = clean.clone();
            corrupted[2 * pair] = Symbol::High;
            corrupted[2 * pair + 1] = Symbol::High;
            let mut decoder = LineDecoder::default();
            let err = decoder.feed_all(corrupted).unwrap_err();
            assert_eq!(
                err,
                LineError::InvalidCode {
                    symbol_index: 2 * pair + 1
                }
            );
            assert_eq!(decoder.phase(), DecoderPhase::Failed);
        }
    }

    #[test]
    fn reset_clears_failed_session() {
        let mut decoder = LineDecoder::default();
        decoder.feed_all(symbols("01 11")).unwrap_err();
        decoder.reset();
        assert_eq!(decoder.phase(), DecoderPhase::AwaitFirstHalf);
        assert_eq!(decoder.bit_len(), 0);
        assert_eq!(decoder.symbols_consumed(), 0);
        assert!(!decoder.is_failed());

        let phase = decoder
            .feed_all(encode(&[0x3c], Convention::Standard).terminated())
            .unwrap();
        assert_eq!(phase, DecoderPhase::Done);
        assert_eq!(decoder.decoded_bytes(), Some(&[0x3c][..]));
    }

    #[test]
    fn capacity_overflow_fails_session() {
        let mut decoder = LineDecoder::new(DecoderConfig {
            capacity_bits: 8,
            ..DecoderConfig::default()
        });
        let err = decoder
            .feed_all(encode(&[0xff, 0x00], Convention::Standard))
            .unwrap_err();
        assert_eq!(err, LineError::CapacityExceeded { capacity: 8 });
        assert_eq!(decoder.bit_len(), 8);
        assert!(decoder.is_failed());
    }

    #[test]
    fn decoded_bytes_requires_whole_bytes() {
        let mut decoder = LineDecoder::default();
        decoder.feed_all(symbols("01 10 01 00")).unwrap();
        assert_eq!(decoder.bit_len(), 3);
        assert_eq!(decoder.decoded_bytes(), None);
        assert!(decoder.bits()[0]);
        assert!(!decoder.bits()[1]);
    }

    #[test]
    fn round_trip_both_conventions() {
        let data = b"\x00\x01\x7f\x80\xff line";
        for convention in [Convention::Standard, Convention::Reverse] {
            let mut decoder = LineDecoder::new(DecoderConfig {
                convention,
                ..DecoderConfig::default()
            });
            let phase = decoder
                .feed_all(encode(data, convention).terminated())
                .unwrap();
            assert_eq!(phase, DecoderPhase::Done);
            assert_eq!(decoder.decoded_bytes(), Some(&data[..]));
        }
    }

    #[test]
    fn mismatched_convention_inverts_bits() {
        let mut decoder = reverse_decoder();
        decoder
            .feed_all(encode(&[0x0f], Convention::Standard).terminated())
            .unwrap();
        assert_eq!(decoder.decoded_bytes(), Some(&[0xf0][..]));
    }
}
