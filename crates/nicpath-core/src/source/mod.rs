//! Captured-frame sources.
//!
//! A [`PacketSource`] yields raw link-layer frames one at a time. The file
//! backed implementation reads PCAP and PCAPNG; [`FrameListSource`] replays
//! frames already in memory.

mod pcap;

use std::collections::VecDeque;

pub use pcap::PcapFileSource;

use pcap_parser::Linktype;
use thiserror::Error;

/// One captured frame as read from a source.
#[derive(Debug, Clone)]
pub struct PacketEvent {
    /// Capture time in microseconds since the Unix epoch, when known.
    pub ts_us: Option<u64>,
    pub linktype: Linktype,
    pub data: Vec<u8>,
}

pub trait PacketSource {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Container parse failure, prefixed with the reader stage.
    #[error("PCAP parse error: {0}")]
    Pcap(String),
}

/// In-memory source of Ethernet frames, yielded in insertion order.
#[derive(Debug, Default)]
pub struct FrameListSource {
    frames: VecDeque<PacketEvent>,
}

impl FrameListSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ts_us: Option<u64>, data: Vec<u8>) {
        self.frames.push_back(PacketEvent {
            ts_us,
            linktype: Linktype::ETHERNET,
            data,
        });
    }
}

impl PacketSource for FrameListSource {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError> {
        Ok(self.frames.pop_front())
    }
}
