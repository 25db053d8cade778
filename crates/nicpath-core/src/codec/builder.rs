use std::net::Ipv4Addr;

use log::debug;

use super::address::{MacAddr, parse_ipv4};
use super::error::CodecError;
use super::layout;
use crate::checksum::{frame_checksum, header_checksum};

/// Largest UDP payload that still fits the 16-bit IPv4 total length.
pub const MAX_PAYLOAD_LEN: usize =
    layout::IPV4_MAX_TOTAL_LEN - layout::IPV4_HEADER_LEN - layout::UDP_HEADER_LEN;

/// Build a complete Ethernet II / IPv4 / UDP frame, FCS included.
///
/// MAC strings are six colon-separated two-digit hex octets, IP strings four
/// dot-separated decimal octets.
///
/// # Examples
/// ```
/// use nicpath_core::{checksum::frame_checksum, pack};
///
/// let frame = pack(
///     "00:00:00:00:00:01",
///     "00:00:00:00:00:02",
///     "192.168.1.2",
///     "192.168.1.3",
///     8000,
///     8001,
///     b"Hello World!",
/// )?;
/// assert_eq!(frame.len(), 58);
/// assert_eq!(frame[54..], frame_checksum(&frame[..54]));
/// # Ok::<(), nicpath_core::CodecError>(())
/// ```
///
/// # Errors
/// Returns `CodecError::Format` for malformed addresses and
/// `CodecError::PayloadTooLarge` when the payload exceeds [`MAX_PAYLOAD_LEN`].
pub fn pack(
    src_mac: &str,
    dst_mac: &str,
    src_ip: &str,
    dst_ip: &str,
    src_port: u16,
    dst_port: u16,
    payload: &[u8],
) -> Result<Vec<u8>, CodecError> {
    let src_mac = MacAddr::parse_field("source MAC", src_mac)?;
    let dst_mac = MacAddr::parse_field("destination MAC", dst_mac)?;
    let src_ip = parse_ipv4("source IP", src_ip)?;
    let dst_ip = parse_ipv4("destination IP", dst_ip)?;

    build_frame(src_mac, dst_mac, src_ip, dst_ip, src_port, dst_port, payload)
}

/// Typed counterpart of [`pack`] for callers that already hold addresses.
pub fn build_frame(
    src_mac: MacAddr,
    dst_mac: MacAddr,
    src_ip: Ipv4Addr,
    dst_ip: Ipv4Addr,
    src_port: u16,
    dst_port: u16,
    payload: &[u8],
) -> Result<Vec<u8>, CodecError> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(CodecError::PayloadTooLarge {
            len: payload.len(),
            max: MAX_PAYLOAD_LEN,
        });
    }

    let udp = pack_udp(src_port, dst_port, payload);
    let ip = pack_ipv4(src_ip, dst_ip, layout::IP_PROTOCOL_UDP, &udp);
    let frame = pack_ethernet(src_mac, dst_mac, &ip);
    debug!(
        "packed {} -> {} ({}:{} -> {}:{}), {} payload bytes, {} frame bytes",
        src_mac,
        dst_mac,
        src_ip,
        src_port,
        dst_ip,
        dst_port,
        payload.len(),
        frame.len()
    );
    Ok(frame)
}

/// UDP header plus payload; the checksum field is left at zero.
pub fn pack_udp(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let mut datagram = vec![0u8; layout::UDP_HEADER_LEN];
    let length = (layout::UDP_HEADER_LEN + payload.len()) as u16;
    datagram[layout::UDP_SRC_PORT_RANGE].copy_from_slice(&src_port.to_be_bytes());
    datagram[layout::UDP_DST_PORT_RANGE].copy_from_slice(&dst_port.to_be_bytes());
    datagram[layout::UDP_LENGTH_RANGE].copy_from_slice(&length.to_be_bytes());
    datagram[layout::UDP_CHECKSUM_RANGE].copy_from_slice(&0u16.to_be_bytes());
    datagram.extend_from_slice(payload);
    datagram
}

/// Option-less IPv4 header (don't-fragment, TTL 64) plus payload, with the
/// header checksum embedded.
pub fn pack_ipv4(src_ip: Ipv4Addr, dst_ip: Ipv4Addr, protocol: u8, payload: &[u8]) -> Vec<u8> {
    let mut header = [0u8; layout::IPV4_HEADER_LEN];
    let total_len = (layout::IPV4_HEADER_LEN + payload.len()) as u16;
    header[layout::IPV4_VERSION_IHL_OFFSET] = layout::IPV4_VERSION_IHL;
    header[layout::IPV4_TOS_OFFSET] = layout::IPV4_TOS;
    header[layout::IPV4_TOTAL_LEN_RANGE].copy_from_slice(&total_len.to_be_bytes());
    header[layout::IPV4_IDENT_RANGE].copy_from_slice(&layout::IPV4_IDENT.to_be_bytes());
    header[layout::IPV4_FLAGS_FRAG_RANGE]
        .copy_from_slice(&layout::IPV4_FLAGS_DONT_FRAGMENT.to_be_bytes());
    header[layout::IPV4_TTL_OFFSET] = layout::IPV4_TTL;
    header[layout::IPV4_PROTOCOL_OFFSET] = protocol;
    header[layout::IPV4_SRC_RANGE].copy_from_slice(&src_ip.octets());
    header[layout::IPV4_DST_RANGE].copy_from_slice(&dst_ip.octets());
    let checksum = header_checksum(&header);
    header[layout::IPV4_CHECKSUM_RANGE].copy_from_slice(&checksum);

    let mut datagram = Vec::with_capacity(header.len() + payload.len());
    datagram.extend_from_slice(&header);
    datagram.extend_from_slice(payload);
    datagram
}

/// Ethernet II header (IPv4 ethertype) plus payload, FCS appended.
pub fn pack_ethernet(src_mac: MacAddr, dst_mac: MacAddr, payload: &[u8]) -> Vec<u8> {
    let mut frame =
        Vec::with_capacity(layout::ETH_HEADER_LEN + payload.len() + layout::FCS_LEN);
    frame.extend_from_slice(&dst_mac.octets());
    frame.extend_from_slice(&src_mac.octets());
    frame.extend_from_slice(&layout::ETHERTYPE_IPV4.to_be_bytes());
    frame.extend_from_slice(payload);
    let fcs = frame_checksum(&frame);
    frame.extend_from_slice(&fcs);
    frame
}
