use std::net::Ipv4Addr;
use std::ops::Range;

use super::address::MacAddr;
use super::error::CodecError;

/// Bounds-checked big-endian reads over a frame or one of its layers.
pub struct FrameReader<'a> {
    bytes: &'a [u8],
}

impl<'a> FrameReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), CodecError> {
        if self.bytes.len() < needed {
            return Err(CodecError::TooShort {
                needed,
                actual: self.bytes.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, CodecError> {
        self.bytes
            .get(offset)
            .copied()
            .ok_or(CodecError::TooShort {
                needed: offset + 1,
                actual: self.bytes.len(),
            })
    }

    pub fn read_u16_be(&self, range: Range<usize>) -> Result<u16, CodecError> {
        let [hi, lo] = self.read_array::<2>(range)?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    pub fn read_mac(&self, range: Range<usize>) -> Result<MacAddr, CodecError> {
        self.read_array(range).map(MacAddr::new)
    }

    pub fn read_ipv4(&self, range: Range<usize>) -> Result<Ipv4Addr, CodecError> {
        self.read_array::<4>(range).map(Ipv4Addr::from)
    }

    pub fn read_array<const N: usize>(&self, range: Range<usize>) -> Result<[u8; N], CodecError> {
        let bytes = self.read_slice(range)?;
        bytes.try_into().map_err(|_| CodecError::TooShort {
            needed: N,
            actual: bytes.len(),
        })
    }

    pub fn read_slice(&self, range: Range<usize>) -> Result<&'a [u8], CodecError> {
        self.bytes.get(range.clone()).ok_or(CodecError::TooShort {
            needed: range.end,
            actual: self.bytes.len(),
        })
    }

    /// Split off a trailer of `len` bytes, returning `(body, trailer)`.
    pub fn split_trailer(&self, len: usize) -> Result<(&'a [u8], &'a [u8]), CodecError> {
        self.require_len(len)?;
        Ok(self.bytes.split_at(self.bytes.len() - len))
    }
}
