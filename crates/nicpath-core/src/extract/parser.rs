use std::net::Ipv4Addr;
use std::ops::Range;

use log::debug;
use serde::Serialize;

use super::error::ExtractError;
use super::layout::{self, FieldIndex};
use crate::checksum::frame_checksum;
use crate::codec::MacAddr;
use crate::codec::layout as wire;
use crate::line::{DecoderPhase, LineDecoder};

/// Fields recovered from a decoded frame.
///
/// The caller owns the value and passes it to [`extract_fields`] by mutable
/// reference; a skipped frame leaves every field as it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedFields {
    pub dst_mac: MacAddr,
    pub src_mac: MacAddr,
    pub src_ip: Ipv4Addr,
    pub dst_ip: Ipv4Addr,
    pub src_port: u16,
    pub dst_port: u16,
    #[serde(serialize_with = "crate::codec::parser::payload_hex::serialize")]
    pub payload: Vec<u8>,
    /// Whether the trailing FCS matched the rest of the frame.
    pub fcs_valid: bool,
}

impl Default for ExtractedFields {
    fn default() -> Self {
        Self {
            dst_mac: MacAddr::default(),
            src_mac: MacAddr::default(),
            src_ip: Ipv4Addr::UNSPECIFIED,
            dst_ip: Ipv4Addr::UNSPECIFIED,
            src_port: 0,
            dst_port: 0,
            payload: Vec::new(),
            fcs_valid: false,
        }
    }
}

/// Result of a successful extraction call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Extraction {
    /// Outputs were overwritten with the frame's fields.
    Extracted,
    /// Not IPv4/UDP; outputs were left untouched. `protocol` is the byte at
    /// the IPv4 protocol position, absent when the frame ends before it.
    Skipped {
        ethertype: u16,
        protocol: Option<u8>,
    },
}

/// Read Ethernet, IPv4 and UDP fields from a decoder that reached `Done`.
///
/// Extraction only happens for ethertype 0x0800 carrying protocol 17. Any
/// other combination returns [`Extraction::Skipped`] and `out` is unchanged.
/// The FCS is checked and reported in `out.fcs_valid` but does not gate
/// extraction.
///
/// # Examples
/// ```
/// use nicpath_core::extract::{ExtractedFields, Extraction, extract_fields};
/// use nicpath_core::line::{Convention, LineDecoder, encode};
///
/// let frame = nicpath_core::pack("02:00:00:00:00:01", "02:00:00:00:00:02",
///     "10.0.0.1", "10.0.0.2", 5000, 5001, b"ping")?;
/// let mut decoder = LineDecoder::default();
/// decoder.feed_all(encode(&frame, Convention::Standard).terminated())?;
///
/// let mut fields = ExtractedFields::default();
/// assert_eq!(extract_fields(&decoder, &mut fields)?, Extraction::Extracted);
/// assert_eq!(fields.dst_port, 5001);
/// assert_eq!(fields.payload, b"ping");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
/// `NotComplete` unless the decoder is `Done` and `UnalignedLength` when the
/// bit count is not a multiple of eight. `TooShort` when the frame ends before
/// the ethertype, or is an IPv4/UDP frame below the 46-byte minimum.
pub fn extract_fields(
    decoder: &LineDecoder,
    out: &mut ExtractedFields,
) -> Result<Extraction, ExtractError> {
    let phase = decoder.phase();
    if phase != DecoderPhase::Done {
        return Err(ExtractError::NotComplete { phase });
    }
    let frame = decoder.decoded_bytes().ok_or(ExtractError::UnalignedLength {
        bits: decoder.bit_len(),
    })?;
    extract_from_frame(frame, out)
}

/// Byte-level counterpart of [`extract_fields`] for an already assembled
/// frame, FCS included.
pub fn extract_from_frame(
    frame: &[u8],
    out: &mut ExtractedFields,
) -> Result<Extraction, ExtractError> {
    let ethertype = u16::from_be_bytes(read_array(frame, layout::ETHERTYPE_RANGE)?);
    if ethertype != wire::ETHERTYPE_IPV4 {
        debug!("skipping frame: ethertype {ethertype:#06x}");
        return Ok(Extraction::Skipped {
            ethertype,
            protocol: frame.get(layout::PROTOCOL_OFFSET).copied(),
        });
    }
    let [protocol] = read_array(frame, layout::PROTOCOL_OFFSET..layout::PROTOCOL_OFFSET + 1)?;
    if protocol != wire::IP_PROTOCOL_UDP {
        debug!("skipping IPv4 frame: protocol {protocol}");
        return Ok(Extraction::Skipped {
            ethertype,
            protocol: Some(protocol),
        });
    }

    let index = FieldIndex::resolve(frame.len()).ok_or(ExtractError::TooShort {
        needed: layout::MIN_FRAME_LEN,
        actual: frame.len(),
    })?;

    let fcs = read_array::<4>(frame, index.fcs.clone())?;
    let body = read_slice(frame, 0..index.fcs.start)?;
    let fields = ExtractedFields {
        dst_mac: MacAddr::new(read_array(frame, layout::DST_MAC_RANGE)?),
        src_mac: MacAddr::new(read_array(frame, layout::SRC_MAC_RANGE)?),
        src_ip: Ipv4Addr::from(read_array::<4>(frame, layout::SRC_IP_RANGE)?),
        dst_ip: Ipv4Addr::from(read_array::<4>(frame, layout::DST_IP_RANGE)?),
        src_port: u16::from_be_bytes(read_array(frame, layout::SRC_PORT_RANGE)?),
        dst_port: u16::from_be_bytes(read_array(frame, layout::DST_PORT_RANGE)?),
        payload: read_slice(frame, index.payload.clone())?.to_vec(),
        fcs_valid: frame_checksum(body) == fcs,
    };
    debug!(
        "extracted {}:{} -> {}:{}, {} payload bytes starting {} bits from the end",
        fields.src_ip,
        fields.src_port,
        fields.dst_ip,
        fields.dst_port,
        fields.payload.len(),
        index.bits_from_end(layout::PAYLOAD_OFFSET)
    );
    *out = fields;
    Ok(Extraction::Extracted)
}

fn read_slice(frame: &[u8], range: Range<usize>) -> Result<&[u8], ExtractError> {
    frame.get(range.clone()).ok_or(ExtractError::TooShort {
        needed: range.end,
        actual: frame.len(),
    })
}

fn read_array<const N: usize>(frame: &[u8], range: Range<usize>) -> Result<[u8; N], ExtractError> {
    let bytes = read_slice(frame, range)?;
    bytes.try_into().map_err(|_| ExtractError::TooShort {
        needed: N,
        actual: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::{ExtractedFields, Extraction, extract_fields, extract_from_frame};
    use crate::codec::{MacAddr, layout as wire, pack};
    use crate::extract::error::ExtractError;
    use crate::line::{Convention, DecoderPhase, LineDecoder, Symbol, encode};

    fn hello_frame() -> Vec<u8> {
        pack(
            "00:00:00:00:00:01",
            "00:00:00:00:00:02",
            "192.168.1.2",
            "192.168.1.3",
            8000,
            8001,
            b"Hello World!",
        )
        .unwrap()
    }

    fn decoded(frame: &[u8]) -> LineDecoder {
        let mut decoder = LineDecoder::default();
        decoder
            .feed_all(encode(frame, Convention::Standard).terminated())
            .unwrap();
        decoder
    }

    #[test]
    fn extracts_hello_world_fields() {
        let decoder = decoded(&hello_frame());
        let mut fields = ExtractedFields::default();
        let outcome = extract_fields(&decoder, &mut fields).unwrap();
        assert_eq!(outcome, Extraction::Extracted);
        assert_eq!(fields.src_mac, MacAddr::new([0, 0, 0, 0, 0, 1]));
        assert_eq!(fields.dst_mac, MacAddr::new([0, 0, 0, 0, 0, 2]));
        assert_eq!(fields.src_ip, Ipv4Addr::new(192, 168, 1, 2));
        assert_eq!(fields.dst_ip, Ipv4Addr::new(192, 168, 1, 3));
        assert_eq!(fields.src_port, 8000);
        assert_eq!(fields.dst_port, 8001);
        assert_eq!(fields.payload, b"Hello World!");
        assert!(fields.fcs_valid);
    }

    #[test]
    fn non_ipv4_ethertype_is_skipped() {
        let mut frame = hello_frame();
        frame[wire::ETH_TYPE_RANGE].copy_from_slice(&0x86ddu16.to_be_bytes());
        let mut fields = ExtractedFields {
            src_port: 1234,
            ..ExtractedFields::default()
        };
        let before = fields.clone();
        let outcome = extract_from_frame(&frame, &mut fields).unwrap();
        assert_eq!(
            outcome,
            Extraction::Skipped {
                ethertype: 0x86dd,
                protocol: Some(wire::IP_PROTOCOL_UDP)
            }
        );
        assert_eq!(fields, before);
    }

    #[test]
    fn non_udp_protocol_is_skipped() {
        let mut frame = hello_frame();
        frame[wire::FRAME_IPV4_OFFSET + wire::IPV4_PROTOCOL_OFFSET] = 6;
        let mut fields = ExtractedFields::default();
        let outcome = extract_from_frame(&frame, &mut fields).unwrap();
        assert!(matches!(outcome, Extraction::Skipped {
                protocol: Some(6),
                ..
            }));
        assert_eq!(fields, ExtractedFields::default());
    }

    #[test]
    fn corrupted_fcs_is_reported_not_rejected() {
        let mut frame = hello_frame();
        let last = frame.len() - 1;
        frame[last] ^= 0x01;
        let mut fields = ExtractedFields::default();
        extract_from_frame(&frame, &mut fields).unwrap();
        assert!(!fields.fcs_valid);
        assert_eq!(fields.payload, b"Hello World!");
    }

    #[test]
    fn decoder_must_be_done() {
        let mut decoder = LineDecoder::default();
        decoder.feed(Symbol::Low).unwrap();
        let err = extract_fields(&decoder, &mut ExtractedFields::default()).unwrap_err();
        assert_eq!(
            err,
            ExtractError::NotComplete {
                phase: DecoderPhase::AwaitSecondHalf
            }
        );
    }

    #[test]
    fn failed_decoder_is_not_complete() {
        let mut decoder = LineDecoder::default();
        decoder.feed_all([Symbol::High, Symbol::High]).unwrap_err();
        let err = extract_fields(&decoder, &mut ExtractedFields::default()).unwrap_err();
        assert!(matches!(err, ExtractError::NotComplete { .. }));
    }

    #[test]
    fn unaligned_bit_count_is_rejected() {
        let mut decoder = LineDecoder::default();
        decoder
            .feed_all([Symbol::Low, Symbol::High, Symbol::Low, Symbol::Low])
            .unwrap();
        let err = extract_fields(&decoder, &mut ExtractedFields::default()).unwrap_err();
        assert_eq!(err, ExtractError::UnalignedLength { bits: 1 });
    }

    #[test]
    fn short_non_ipv4_frame_is_skipped() {
        let mut frame = vec![0u8; 20];
        frame[wire::ETH_TYPE_RANGE].copy_from_slice(&0x0806u16.to_be_bytes());
        let decoder = decoded(&frame);
        let mut fields = ExtractedFields {
            dst_port: 9,
            ..ExtractedFields::default()
        };
        let before = fields.clone();
        let outcome = extract_fields(&decoder, &mut fields).unwrap();
        assert_eq!(
            outcome,
            Extraction::Skipped {
                ethertype: 0x0806,
                protocol: None
            }
        );
        assert_eq!(fields, before);
        assert_eq!(extract_from_frame(&frame, &mut fields), Ok(outcome));
    }

    #[test]
    fn short_ipv4_non_udp_frame_is_skipped() {
        let mut frame = hello_frame();
        frame[wire::FRAME_IPV4_OFFSET + wire::IPV4_PROTOCOL_OFFSET] = 1;
        frame.truncate(30);
        let mut fields = ExtractedFields::default();
        let outcome = extract_from_frame(&frame, &mut fields).unwrap();
        assert_eq!(
            outcome,
            Extraction::Skipped {
                ethertype: wire::ETHERTYPE_IPV4,
                protocol: Some(1)
            }
        );
    }

    #[test]
    fn frame_ending_inside_ethernet_header_is_rejected() {
        let err = extract_from_frame(&[0u8; 10], &mut ExtractedFields::default()).unwrap_err();
        assert_eq!(
            err,
            ExtractError::TooShort {
                needed: 14,
                actual: 10
            }
        );
    }

    #[test]
    fn short_frame_is_rejected() {
        let frame = hello_frame();
        let decoder = decoded(&frame[..20]);
        let err = extract_fields(&decoder, &mut ExtractedFields::default()).unwrap_err();
        assert_eq!(
            err,
            ExtractError::TooShort {
                needed: 46,
                actual: 20
            }
        );
    }

    #[test]
    fn fields_serialize_as_text() {
        let mut fields = ExtractedFields::default();
        extract_from_frame(&hello_frame(), &mut fields).unwrap();
        let value = serde_json::to_value(&fields).unwrap();
        assert_eq!(value["src_mac"], "00:00:00:00:00:01");
        assert_eq!(value["dst_ip"], "192.168.1.3");
        assert_eq!(value["payload"], "48656c6c6f20576f726c6421");
    }
}
