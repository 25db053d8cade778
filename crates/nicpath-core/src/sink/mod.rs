//! Capture sinks.
//!
//! Packed frames can be written to a PCAPNG file so they open in standard
//! capture tools and can be fed back through [`crate::unpack_capture`].

pub mod pcapng;

use thiserror::Error;

pub use pcapng::{PcapngWriter, write_pcapng};

/// A frame with its capture time, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    /// Microseconds since the Unix epoch.
    pub ts_us: u64,
    pub data: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame of {len} bytes exceeds the {max}-byte block limit")]
    FrameTooLarge { len: usize, max: usize },
}
