use std::ops::Range;

use crate::codec::layout as wire;

// Frame positions of the fields the extractor reads, counted from the first
// received byte. The decoder only learns the frame length at end of frame, so
// the payload end is resolved per frame by `FieldIndex::resolve`.
pub const DST_MAC_RANGE: Range<usize> = wire::ETH_DST_RANGE;
pub const SRC_MAC_RANGE: Range<usize> = wire::ETH_SRC_RANGE;
pub const ETHERTYPE_RANGE: Range<usize> = wire::ETH_TYPE_RANGE;
pub const PROTOCOL_OFFSET: usize = wire::FRAME_IPV4_OFFSET + wire::IPV4_PROTOCOL_OFFSET;
pub const SRC_IP_RANGE: Range<usize> = shift(wire::IPV4_SRC_RANGE, wire::FRAME_IPV4_OFFSET);
pub const DST_IP_RANGE: Range<usize> = shift(wire::IPV4_DST_RANGE, wire::FRAME_IPV4_OFFSET);
pub const SRC_PORT_RANGE: Range<usize> = shift(wire::UDP_SRC_PORT_RANGE, wire::FRAME_UDP_OFFSET);
pub const DST_PORT_RANGE: Range<usize> = shift(wire::UDP_DST_PORT_RANGE, wire::FRAME_UDP_OFFSET);
pub const PAYLOAD_OFFSET: usize = wire::FRAME_PAYLOAD_OFFSET;

pub const MIN_FRAME_LEN: usize = wire::MIN_FRAME_LEN;

const fn shift(range: Range<usize>, by: usize) -> Range<usize> {
    range.start + by..range.end + by
}

/// Byte positions of one decoded frame, fixed once its length is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIndex {
    pub frame_len: usize,
    pub payload: Range<usize>,
    pub fcs: Range<usize>,
}

impl FieldIndex {
    /// Resolve the length-relative positions for a frame of `frame_len`
    /// bytes. Returns `None` below the minimum frame size.
    pub fn resolve(frame_len: usize) -> Option<Self> {
        if frame_len < MIN_FRAME_LEN {
            return None;
        }
        let fcs_start = frame_len - wire::FCS_LEN;
        Some(Self {
            frame_len,
            payload: PAYLOAD_OFFSET..fcs_start,
            fcs: fcs_start..frame_len,
        })
    }

    /// Distance in bits from the last received bit back to the first bit of
    /// the byte at `offset`.
    pub fn bits_from_end(&self, offset: usize) -> usize {
        (self.frame_len - offset) * 8
    }
}

#[cfg(test)]
mod tests {
    use super::{DST_IP_RANGE, DST_PORT_RANGE, FieldIndex, SRC_IP_RANGE, SRC_PORT_RANGE};
    use crate::codec::layout as wire;

    #[test]
    fn address_ranges_follow_ipv4_header() {
        assert_eq!(SRC_IP_RANGE.start, wire::FRAME_IPV4_OFFSET + wire::IPV4_SRC_RANGE.start);
        assert_eq!(DST_IP_RANGE.end, wire::FRAME_UDP_OFFSET);
        assert_eq!(SRC_IP_RANGE, 26..30);
        assert_eq!(SRC_PORT_RANGE, 34..36);
        assert_eq!(DST_PORT_RANGE, 36..38);
    }

    #[test]
    fn resolve_minimum_frame() {
        let index = FieldIndex::resolve(46).unwrap();
        assert!(index.payload.is_empty());
        assert_eq!(index.fcs, 42..46);
        assert_eq!(index.bits_from_end(42), 32);
    }

    #[test]
    fn resolve_rejects_short_frame() {
        assert_eq!(FieldIndex::resolve(45), None);
    }
}
