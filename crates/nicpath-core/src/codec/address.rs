use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use super::error::CodecError;
use super::layout;

/// Ethernet hardware address.
///
/// # Examples
/// ```
/// use nicpath_core::MacAddr;
///
/// let mac: MacAddr = "00:1a:2B:3c:4d:5e".parse()?;
/// assert_eq!(mac.octets(), [0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e]);
/// assert_eq!(mac.to_string(), "00:1a:2b:3c:4d:5e");
/// # Ok::<(), nicpath_core::CodecError>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MacAddr(pub [u8; layout::MAC_LEN]);

impl MacAddr {
    pub const fn new(octets: [u8; layout::MAC_LEN]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; layout::MAC_LEN] {
        self.0
    }

    /// Parse a `xx:xx:xx:xx:xx:xx` string, naming `field` in the error.
    pub fn parse_field(field: &'static str, input: &str) -> Result<Self, CodecError> {
        let parts: Vec<&str> = input.split(':').collect();
        if parts.len() != layout::MAC_LEN {
            return Err(CodecError::format(
                field,
                input,
                format!("expected {} octets, got {}", layout::MAC_LEN, parts.len()),
            ));
        }

        let mut octets = [0u8; layout::MAC_LEN];
        for (slot, part) in octets.iter_mut().zip(parts) {
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(CodecError::format(
                    field,
                    input,
                    format!("octet '{part}' is not two hex digits"),
                ));
            }
            *slot = u8::from_str_radix(part, 16)
                .map_err(|e| CodecError::format(field, input, e.to_string()))?;
        }
        Ok(Self(octets))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for MacAddr {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_field("MAC address", s)
    }
}

/// Parse a dotted-decimal IPv4 address, naming `field` in the error.
///
/// Each octet is one to three decimal digits in `0..=255`; leading zeros are
/// accepted.
pub fn parse_ipv4(field: &'static str, input: &str) -> Result<Ipv4Addr, CodecError> {
    let parts: Vec<&str> = input.split('.').collect();
    if parts.len() != layout::IPV4_ADDR_LEN {
        return Err(CodecError::format(
            field,
            input,
            format!(
                "expected {} octets, got {}",
                layout::IPV4_ADDR_LEN,
                parts.len()
            ),
        ));
    }

    let mut octets = [0u8; layout::IPV4_ADDR_LEN];
    for (slot, part) in octets.iter_mut().zip(parts) {
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecError::format(
                field,
                input,
                format!("octet '{part}' is not a decimal number"),
            ));
        }
        let value: u16 = part
            .parse()
            .map_err(|_| CodecError::format(field, input, format!("octet '{part}' is invalid")))?;
        *slot = u8::try_from(value).map_err(|_| {
            CodecError::format(field, input, format!("octet {value} is out of range 0-255"))
        })?;
    }
    Ok(Ipv4Addr::from(octets))
}
