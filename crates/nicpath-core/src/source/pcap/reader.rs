use std::io::{Read, Seek, SeekFrom};

use pcap_parser::Linktype;

use super::layout;
use crate::source::SourceError;

/// Read the magic bytes and rewind the reader to the start.
///
/// # Errors
/// Returns `SourceError::Io` when the reader cannot be read or rewound,
/// including files shorter than four bytes.
pub fn read_magic_and_rewind<R: Read + Seek>(reader: &mut R) -> Result<[u8; 4], SourceError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(magic)
}

pub fn is_pcapng_magic(magic: &[u8; 4]) -> bool {
    magic == &layout::PCAPNG_MAGIC
}

/// Linktype of interface `if_id`, Ethernet when the id is unknown.
pub fn linktype_for_interface(linktypes: &[Linktype], if_id: u32) -> Linktype {
    linktypes
        .get(if_id as usize)
        .copied()
        .unwrap_or(Linktype::ETHERNET)
}

/// Join the two halves of a PCAPNG timestamp. Interfaces are assumed to use
/// the default microsecond resolution.
pub fn pcapng_ts_to_micros(ts_high: u32, ts_low: u32) -> u64 {
    ((ts_high as u64) << 32) | (ts_low as u64)
}

pub fn legacy_ts_to_micros(ts_sec: u32, ts_usec: u32) -> u64 {
    ts_sec as u64 * layout::MICROS_PER_SECOND + ts_usec as u64
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use pcap_parser::Linktype;

    use super::{
        is_pcapng_magic, legacy_ts_to_micros, linktype_for_interface, pcapng_ts_to_micros,
        read_magic_and_rewind,
    };
    use crate::source::SourceError;
    use crate::source::pcap::layout;

    #[test]
    fn detect_pcapng_magic() {
        assert!(is_pcapng_magic(&layout::PCAPNG_MAGIC));
        assert!(!is_pcapng_magic(&[0xd4, 0xc3, 0xb2, 0xa1]));
    }

    #[test]
    fn read_magic_rewinds() {
        let mut cursor = Cursor::new([0x0a, 0x0d, 0x0d, 0x0a, 0x01]);
        let magic = read_magic_and_rewind(&mut cursor).unwrap();
        assert_eq!(magic, layout::PCAPNG_MAGIC);
        let mut buf = [0u8; 1];
        cursor.read_exact(&mut buf).unwrap();
        assert_eq!(buf[0], 0x0a);
    }

    #[test]
    fn read_magic_too_short() {
        let mut cursor = Cursor::new([0x0a, 0x0d, 0x0d]);
        let err = read_magic_and_rewind(&mut cursor).unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }

    #[test]
    fn unknown_interface_defaults_to_ethernet() {
        let linktypes = [Linktype::RAW];
        assert_eq!(linktype_for_interface(&linktypes, 0), Linktype::RAW);
        assert_eq!(linktype_for_interface(&linktypes, 3), Linktype::ETHERNET);
    }

    #[test]
    fn timestamps_in_microseconds() {
        assert_eq!(pcapng_ts_to_micros(1, 5), (1u64 << 32) + 5);
        assert_eq!(legacy_ts_to_micros(2, 250_000), 2_250_000);
    }
}
