use log::debug;
use serde::{Deserialize, Serialize};

use super::error::CodecError;
use super::layout;
use super::reader::FrameReader;
use crate::checksum::frame_checksum;

/// Fields recovered from an Ethernet II / IPv4 / UDP frame.
///
/// Addresses are rendered as `xx:xx:xx:xx:xx:xx` and `d.d.d.d`; the payload is
/// serialized as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedPacket {
    pub src_mac: String,
    pub dst_mac: String,
    pub src_ip: String,
    pub dst_ip: String,
    /// IPv4 protocol byte as found in the frame (not validated).
    pub protocol: u8,
    pub src_port: u16,
    pub dst_port: u16,
    #[serde(with = "payload_hex")]
    pub payload: Vec<u8>,
}

/// Verify the trailing FCS and parse the frame at fixed offsets.
///
/// The IPv4 header is assumed to be 20 bytes; a header carrying options
/// (IHL other than 5) is read at the wrong offsets.
///
/// # Examples
/// ```
/// use nicpath_core::{pack, unpack};
///
/// let frame = pack("00:00:00:00:00:01", "00:00:00:00:00:02",
///     "192.168.1.2", "192.168.1.3", 8000, 8001, b"Hello World!")?;
/// let packet = unpack(&frame)?;
/// assert_eq!(packet.src_port, 8000);
/// assert_eq!(packet.payload, b"Hello World!");
/// # Ok::<(), nicpath_core::CodecError>(())
/// ```
///
/// # Errors
/// `CodecError::TooShort` below the 46-byte minimum, `CodecError::Checksum`
/// when the recomputed FCS differs from the trailing four bytes.
pub fn unpack(bytes: &[u8]) -> Result<ParsedPacket, CodecError> {
    let reader = FrameReader::new(bytes);
    reader.require_len(layout::MIN_FRAME_LEN)?;
    let body = verify_frame_checksum(bytes)?;
    parse_body(body)
}

/// Parse a frame whose FCS was stripped by the link layer (typical of
/// captures). No integrity check is performed.
pub fn unpack_without_fcs(bytes: &[u8]) -> Result<ParsedPacket, CodecError> {
    let reader = FrameReader::new(bytes);
    reader.require_len(layout::FRAME_PAYLOAD_OFFSET)?;
    parse_body(bytes)
}

/// Check the trailing FCS against the rest of the frame and return the
/// frame without it.
pub fn verify_frame_checksum(bytes: &[u8]) -> Result<&[u8], CodecError> {
    let (body, trailer) = FrameReader::new(bytes).split_trailer(layout::FCS_LEN)?;
    let expected = u32::from_be_bytes(frame_checksum(body));
    let actual = FrameReader::new(trailer).read_array::<4>(0..layout::FCS_LEN)?;
    let actual = u32::from_be_bytes(actual);
    if expected != actual {
        debug!("FCS mismatch over {} bytes: {expected:08x} != {actual:08x}", body.len());
        return Err(CodecError::Checksum { expected, actual });
    }
    Ok(body)
}

fn parse_body(body: &[u8]) -> Result<ParsedPacket, CodecError> {
    let eth = FrameReader::new(body);
    let dst_mac = eth.read_mac(layout::ETH_DST_RANGE)?;
    let src_mac = eth.read_mac(layout::ETH_SRC_RANGE)?;
    let ip_bytes = eth.read_slice(layout::FRAME_IPV4_OFFSET..body.len())?;

    let ip = FrameReader::new(ip_bytes);
    let src_ip = ip.read_ipv4(layout::IPV4_SRC_RANGE)?;
    let dst_ip = ip.read_ipv4(layout::IPV4_DST_RANGE)?;
    let protocol = ip.read_u8(layout::IPV4_PROTOCOL_OFFSET)?;
    let udp_bytes = ip.read_slice(layout::IPV4_HEADER_LEN..ip_bytes.len())?;

    let udp = FrameReader::new(udp_bytes);
    let src_port = udp.read_u16_be(layout::UDP_SRC_PORT_RANGE)?;
    let dst_port = udp.read_u16_be(layout::UDP_DST_PORT_RANGE)?;
    let payload = udp.read_slice(layout::UDP_HEADER_LEN..udp_bytes.len())?;

    Ok(ParsedPacket {
        src_mac: src_mac.to_string(),
        dst_mac: dst_mac.to_string(),
        src_ip: src_ip.to_string(),
        dst_ip: dst_ip.to_string(),
        protocol,
        src_port,
        dst_port,
        payload: payload.to_vec(),
    })
}

pub(crate) mod payload_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(payload: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(payload))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex::decode(text).map_err(serde::de::Error::custom)
    }
}
