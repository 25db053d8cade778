//! Field extraction from a decoded bit stream.
//!
//! The line decoder accumulates bits without knowing how long the frame will
//! be, so field positions can only be fixed once the end-of-frame pair has
//! been seen. At that point the frame length is known and `layout` resolves a
//! bytes-from-start table; the parser then reads Ethernet, IPv4 and UDP fields
//! the same way the codec does, but without rejecting on a bad FCS.

pub mod error;
pub mod layout;
pub mod parser;

pub use error::ExtractError;
pub use parser::{ExtractedFields, Extraction, extract_fields, extract_from_frame};
