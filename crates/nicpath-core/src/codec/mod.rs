//! Ethernet II / IPv4 / UDP frame codec.
//!
//! `pack` assembles the three layers innermost first (UDP, then IPv4 with its
//! header checksum, then Ethernet with the trailing FCS). `unpack` verifies the
//! FCS and reads every field at a fixed offset: the IPv4 header is always
//! taken to be 20 bytes, so option-carrying datagrams are not supported.
//!
//! Wire offsets live in `layout`, bounds-checked access in `reader`.

pub mod address;
pub mod builder;
pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use address::{MacAddr, parse_ipv4};
pub use builder::{MAX_PAYLOAD_LEN, build_frame, pack};
pub use error::CodecError;
pub use parser::{ParsedPacket, unpack, unpack_without_fcs, verify_frame_checksum};
