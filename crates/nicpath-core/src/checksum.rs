//! Integrity checks for the Ethernet/IPv4 data path.
//!
//! `frame_checksum` is the CRC-32/BZIP2 frame check sequence appended to every
//! Ethernet frame; `header_checksum` is the RFC 1071 one's-complement sum used
//! by the IPv4 header. Both are pure and return big-endian byte arrays so the
//! results can be spliced straight into a frame.

/// CRC-32 generator polynomial (normal, MSB-first form).
pub const CRC32_POLY: u32 = 0x04C1_1DB7;
/// Initial CRC register value.
pub const CRC32_INIT: u32 = 0xFFFF_FFFF;
/// Final XOR applied to the CRC register.
pub const CRC32_XOR_OUT: u32 = 0xFFFF_FFFF;

/// Compute the CRC-32/BZIP2 frame check sequence.
///
/// Each byte is shifted into the top of the register and processed
/// most-significant bit first.
///
/// # Examples
/// ```
/// use nicpath_core::checksum::frame_checksum;
///
/// assert_eq!(frame_checksum(b"123456789"), 0xFC89_1918u32.to_be_bytes());
/// ```
pub fn frame_checksum(bytes: &[u8]) -> [u8; 4] {
    let mut crc = CRC32_INIT;
    for &byte in bytes {
        crc ^= (byte as u32) << 24;
        for _ in 0..8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ CRC32_POLY
            } else {
                crc << 1
            };
        }
    }
    (crc ^ CRC32_XOR_OUT).to_be_bytes()
}

/// Compute the IPv4 header checksum.
///
/// The caller must zero the checksum field before calling. An odd trailing
/// byte is treated as the high half of a final word.
///
/// # Examples
/// ```
/// use nicpath_core::checksum::header_checksum;
///
/// let header = [
///     0x45, 0x00, 0x00, 0x73, 0x00, 0x00, 0x40, 0x00, 0x40, 0x11,
///     0x00, 0x00, 0xc0, 0xa8, 0x00, 0x01, 0xc0, 0xa8, 0x00, 0xc7,
/// ];
/// assert_eq!(header_checksum(&header), [0xb8, 0x61]);
/// ```
pub fn header_checksum(bytes: &[u8]) -> [u8; 2] {
    let mut sum: u16 = 0;

    let mut words = bytes.chunks_exact(2);
    for word in &mut words {
        sum = ones_complement_add(sum, u16::from_be_bytes([word[0], word[1]]));
    }
    if let Some(&byte) = words.remainder().first() {
        sum = ones_complement_add(sum, u16::from_be_bytes([byte, 0]));
    }

    (!sum).to_be_bytes()
}

// One's-complement addition with end-around carry.
fn ones_complement_add(sum: u16, word: u16) -> u16 {
    let (folded, carry) = sum.overflowing_add(word);
    folded + u16::from(carry)
}

/// Check an IPv4 header whose checksum field is embedded at bytes 10..12.
///
/// Returns `false` for headers too short to carry the field.
pub fn header_checksum_valid(header: &[u8]) -> bool {
    let Some(stored) = header.get(10..12) else {
        return false;
    };
    let stored = [stored[0], stored[1]];
    let mut zeroed = header.to_vec();
    zeroed[10..12].fill(0);
    header_checksum(&zeroed) == stored
}
