//! PCAP/PCAPNG file source.
//!
//! The container format is picked from the leading magic bytes. Timestamps are
//! normalized to microseconds and every frame carries the linktype of the
//! interface it was captured on.

pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::PcapFileSource;
