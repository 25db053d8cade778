//! Software model of a minimal NIC data path.
//!
//! Transmit side: [`pack`] assembles an Ethernet II / IPv4 / UDP frame with
//! its IPv4 header checksum and trailing FCS, and [`line::encode`] turns the
//! bytes into Manchester symbols. Receive side: a [`line::LineDecoder`] is fed
//! one symbol per tick until the end-of-frame pair, then
//! [`extract::extract_fields`] reads the protocol fields back out of the
//! decoded buffer. [`unpack`] is the byte-level receive path that skips the
//! line layer.
//!
//! All of the above is pure and synchronous. File I/O is confined to
//! `source` (PCAP/PCAPNG input), `sink` (PCAPNG output) and
//! [`unpack_capture`], which runs a whole capture through the codec and
//! reports per-frame outcomes.
//!
//! # Examples
//! ```
//! use nicpath_core::extract::{ExtractedFields, extract_fields};
//! use nicpath_core::line::{Convention, LineDecoder, encode};
//!
//! let frame = nicpath_core::pack("00:00:00:00:00:01", "00:00:00:00:00:02",
//!     "192.168.1.2", "192.168.1.3", 8000, 8001, b"Hello World!")?;
//!
//! let mut decoder = LineDecoder::default();
//! decoder.feed_all(encode(&frame, Convention::Standard).terminated())?;
//!
//! let mut fields = ExtractedFields::default();
//! extract_fields(&decoder, &mut fields)?;
//! assert_eq!(fields.payload, b"Hello World!");
//! assert_eq!(nicpath_core::unpack(&frame)?.payload, fields.payload);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

pub mod checksum;
pub mod codec;
pub mod extract;
pub mod line;

mod capture;
mod sink;
mod source;

pub use capture::{
    CaptureError, CaptureOptions, CaptureReport, CaptureSummary, FrameOutcome, FrameRecord,
    unpack_capture, unpack_source,
};
pub use codec::{CodecError, MacAddr, ParsedPacket, pack, unpack, unpack_without_fcs};
pub use sink::{CapturedFrame, PcapngWriter, SinkError, write_pcapng};
pub use source::{FrameListSource, PacketEvent, PacketSource, PcapFileSource, SourceError};

/// Current capture report schema version.
pub const REPORT_VERSION: u32 = 1;
/// `generated_at` value for captures without timestamps.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    /// Library version (semver), not the report schema version.
    pub version: String,
}

impl ToolInfo {
    pub fn current() -> Self {
        Self {
            name: "nicpath".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Input capture metadata embedded in reports.
///
/// # Examples
/// ```
/// use nicpath_core::InputInfo;
///
/// let input = InputInfo {
///     path: "capture.pcapng".to_string(),
///     bytes: 1024,
/// };
/// assert_eq!(input.bytes, 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided by the caller.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}
