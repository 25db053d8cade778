use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;

use super::{CapturedFrame, SinkError};

const BLOCK_SECTION_HEADER: u32 = 0x0A0D_0D0A;
const BLOCK_INTERFACE_DESCRIPTION: u32 = 0x0000_0001;
const BLOCK_ENHANCED_PACKET: u32 = 0x0000_0006;
const BYTE_ORDER_MAGIC: u32 = 0x1A2B_3C4D;
const LINKTYPE_ETHERNET: u16 = 1;
const SNAPLEN: u32 = 65535;
/// Block type, length, and trailing length.
const BLOCK_OVERHEAD: usize = 12;

/// Streaming PCAPNG writer with a single Ethernet interface.
///
/// Blocks are written big-endian; readers detect the byte order from the
/// section header.
pub struct PcapngWriter<W: Write> {
    out: W,
    frames: usize,
}

impl<W: Write> PcapngWriter<W> {
    /// Write the section header and interface description.
    pub fn new(mut out: W) -> Result<Self, SinkError> {
        out.write_all(&block(BLOCK_SECTION_HEADER, &section_header_body()))?;
        out.write_all(&block(BLOCK_INTERFACE_DESCRIPTION, &interface_desc_body()))?;
        Ok(Self { out, frames: 0 })
    }

    pub fn write_frame(&mut self, frame: &CapturedFrame) -> Result<(), SinkError> {
        if frame.data.len() > SNAPLEN as usize {
            return Err(SinkError::FrameTooLarge {
                len: frame.data.len(),
                max: SNAPLEN as usize,
            });
        }
        let body = enhanced_packet_body(frame.ts_us, &frame.data);
        self.out.write_all(&block(BLOCK_ENHANCED_PACKET, &body))?;
        self.frames += 1;
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W, SinkError> {
        self.out.flush()?;
        Ok(self.out)
    }

    pub fn frames_written(&self) -> usize {
        self.frames
    }
}

/// Write `frames` to a new PCAPNG file at `path`, replacing any existing
/// file.
///
/// # Errors
/// Returns `SinkError::Io` on filesystem failures and
/// `SinkError::FrameTooLarge` for frames over the 65535-byte snap length.
pub fn write_pcapng(path: &Path, frames: &[CapturedFrame]) -> Result<(), SinkError> {
    let file = File::create(path)?;
    let mut writer = PcapngWriter::new(BufWriter::new(file))?;
    for frame in frames {
        writer.write_frame(frame)?;
    }
    debug!("wrote {} frames to {}", writer.frames_written(), path.display());
    writer.finish()?;
    Ok(())
}

fn block(block_type: u32, body: &[u8]) -> Vec<u8> {
    let total_len = (BLOCK_OVERHEAD + body.len()) as u32;
    let mut block = Vec::with_capacity(total_len as usize);
    block.extend_from_slice(&block_type.to_be_bytes());
    block.extend_from_slice(&total_len.to_be_bytes());
    block.extend_from_slice(body);
    block.extend_from_slice(&total_len.to_be_bytes());
    block
}

fn section_header_body() -> Vec<u8> {
    let mut body = Vec::with_capacity(16);
    body.extend_from_slice(&BYTE_ORDER_MAGIC.to_be_bytes());
    body.extend_from_slice(&1u16.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    // Section length unknown.
    body.extend_from_slice(&(-1i64).to_be_bytes());
    body
}

fn interface_desc_body() -> Vec<u8> {
    let mut body = Vec::with_capacity(8);
    body.extend_from_slice(&LINKTYPE_ETHERNET.to_be_bytes());
    body.extend_from_slice(&0u16.to_be_bytes());
    body.extend_from_slice(&SNAPLEN.to_be_bytes());
    body
}

fn enhanced_packet_body(ts_us: u64, data: &[u8]) -> Vec<u8> {
    let ts_high = (ts_us >> 32) as u32;
    let ts_low = ts_us as u32;
    let cap_len = data.len() as u32;
    let pad_len = (4 - data.len() % 4) % 4;
    let mut body = Vec::with_capacity(20 + data.len() + pad_len);
    body.extend_from_slice(&0u32.to_be_bytes());
    body.extend_from_slice(&ts_high.to_be_bytes());
    body.extend_from_slice(&ts_low.to_be_bytes());
    body.extend_from_slice(&cap_len.to_be_bytes());
    body.extend_from_slice(&cap_len.to_be_bytes());
    body.extend_from_slice(data);
    body.resize(body.len() + pad_len, 0);
    body
}
