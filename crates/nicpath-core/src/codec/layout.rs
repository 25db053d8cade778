use std::ops::Range;

pub const MAC_LEN: usize = 6;
pub const IPV4_ADDR_LEN: usize = 4;

pub const ETH_DST_RANGE: Range<usize> = 0..6;
pub const ETH_SRC_RANGE: Range<usize> = 6..12;
pub const ETH_TYPE_RANGE: Range<usize> = 12..14;
pub const ETH_HEADER_LEN: usize = 14;
pub const FCS_LEN: usize = 4;

pub const ETHERTYPE_IPV4: u16 = 0x0800;

pub const IPV4_VERSION_IHL_OFFSET: usize = 0;
pub const IPV4_TOS_OFFSET: usize = 1;
pub const IPV4_TOTAL_LEN_RANGE: Range<usize> = 2..4;
pub const IPV4_IDENT_RANGE: Range<usize> = 4..6;
pub const IPV4_FLAGS_FRAG_RANGE: Range<usize> = 6..8;
pub const IPV4_TTL_OFFSET: usize = 8;
pub const IPV4_PROTOCOL_OFFSET: usize = 9;
pub const IPV4_CHECKSUM_RANGE: Range<usize> = 10..12;
pub const IPV4_SRC_RANGE: Range<usize> = 12..16;
pub const IPV4_DST_RANGE: Range<usize> = 16..20;
pub const IPV4_HEADER_LEN: usize = 20;

pub const IPV4_VERSION_IHL: u8 = 0x45;
pub const IPV4_TOS: u8 = 0x00;
pub const IPV4_IDENT: u16 = 0;
pub const IPV4_FLAGS_DONT_FRAGMENT: u16 = 0x4000;
pub const IPV4_TTL: u8 = 0x40;
pub const IPV4_MAX_TOTAL_LEN: usize = u16::MAX as usize;

pub const IP_PROTOCOL_UDP: u8 = 0x11;

pub const UDP_SRC_PORT_RANGE: Range<usize> = 0..2;
pub const UDP_DST_PORT_RANGE: Range<usize> = 2..4;
pub const UDP_LENGTH_RANGE: Range<usize> = 4..6;
pub const UDP_CHECKSUM_RANGE: Range<usize> = 6..8;
pub const UDP_HEADER_LEN: usize = 8;

/// Offset of the IPv4 header within an Ethernet frame.
pub const FRAME_IPV4_OFFSET: usize = ETH_HEADER_LEN;
/// Offset of the UDP header within an Ethernet frame.
pub const FRAME_UDP_OFFSET: usize = FRAME_IPV4_OFFSET + IPV4_HEADER_LEN;
/// Offset of the UDP payload within an Ethernet frame.
pub const FRAME_PAYLOAD_OFFSET: usize = FRAME_UDP_OFFSET + UDP_HEADER_LEN;
/// Smallest frame `unpack` accepts: all headers plus the FCS, empty payload.
pub const MIN_FRAME_LEN: usize = FRAME_PAYLOAD_OFFSET + FCS_LEN;
