use std::iter::{Chain, FusedIterator};

use serde::{Deserialize, Serialize};

use super::error::LineError;

/// A single line symbol (one half of a bit period).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Low,
    High,
}

impl Symbol {
    pub fn is_high(self) -> bool {
        self == Symbol::High
    }

    pub fn as_char(self) -> char {
        match self {
            Symbol::Low => '0',
            Symbol::High => '1',
        }
    }
}

impl From<bool> for Symbol {
    fn from(value: bool) -> Self {
        if value { Symbol::High } else { Symbol::Low }
    }
}

/// The idle pair a transmitter sends after the last data bit.
pub const END_OF_FRAME: [Symbol; 2] = [Symbol::Low, Symbol::Low];

/// Which symbol pair stands for a `1` bit.
///
/// Encoder and decoder of one link must agree; a mismatch is not detected and
/// yields inverted bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Convention {
    /// `1` → (0,1), `0` → (1,0).
    #[default]
    Standard,
    /// `1` → (1,0), `0` → (0,1).
    Reverse,
}

impl Convention {
    pub fn from_reverse_flag(reverse: bool) -> Self {
        if reverse {
            Convention::Reverse
        } else {
            Convention::Standard
        }
    }

    /// Symbol pair transmitted for `bit`.
    pub fn pair(self, bit: bool) -> [Symbol; 2] {
        let one_first = match self {
            Convention::Standard => Symbol::Low,
            Convention::Reverse => Symbol::High,
        };
        let first = if bit {
            one_first
        } else {
            Symbol::from(!one_first.is_high())
        };
        [first, Symbol::from(!first.is_high())]
    }

    /// Bit carried by a transition pair. Only meaningful for (0,1) and (1,0).
    pub(crate) fn bit_for_transition(self, first: Symbol) -> bool {
        match self {
            Convention::Standard => first == Symbol::Low,
            Convention::Reverse => first == Symbol::High,
        }
    }
}

/// Manchester-encode `bytes`, most-significant bit first.
///
/// The returned iterator is cheap to clone, so the same sequence can be
/// replayed.
///
/// # Examples
/// ```
/// use nicpath_core::line::{Convention, encode, format_symbols};
///
/// let symbols = encode(&[0xA5], Convention::Standard);
/// assert_eq!(symbols.len(), 16);
/// assert_eq!(format_symbols(symbols), "0110011010011001");
/// ```
pub fn encode(bytes: &[u8], convention: Convention) -> Symbols<'_> {
    Symbols {
        bytes,
        convention,
        next: 0,
        end: bytes.len() * 16,
    }
}

/// Symbol sequence produced by [`encode`].
#[derive(Debug, Clone)]
pub struct Symbols<'a> {
    bytes: &'a [u8],
    convention: Convention,
    next: usize,
    end: usize,
}

impl Symbols<'_> {
    /// Append the end-of-frame pair after the last data symbol.
    pub fn terminated(self) -> Chain<Self, std::array::IntoIter<Symbol, 2>> {
        self.chain(END_OF_FRAME)
    }
}

impl Iterator for Symbols<'_> {
    type Item = Symbol;

    fn next(&mut self) -> Option<Symbol> {
        if self.next >= self.end {
            return None;
        }
        let bit_index = self.next / 2;
        let byte = self.bytes[bit_index / 8];
        let bit = (byte >> (7 - bit_index % 8)) & 1 == 1;
        let symbol = self.convention.pair(bit)[self.next % 2];
        self.next += 1;
        Some(symbol)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Symbols<'_> {}

impl FusedIterator for Symbols<'_> {}

/// Render symbols as a `0`/`1` string.
pub fn format_symbols<I: IntoIterator<Item = Symbol>>(symbols: I) -> String {
    symbols.into_iter().map(Symbol::as_char).collect()
}

/// Parse `0`/`1` text into symbols. ASCII whitespace and `_` are ignored so
/// long sequences can be grouped.
pub fn parse_symbols(text: &str) -> Result<Vec<Symbol>, LineError> {
    text.chars()
        .enumerate()
        .filter(|(_, c)| !c.is_ascii_whitespace() && *c != '_')
        .map(|(position, character)| match character {
            '0' => Ok(Symbol::Low),
            '1' => Ok(Symbol::High),
            _ => Err(LineError::InvalidSymbolText {
                character,
                position,
            }),
        })
        .collect()
}
