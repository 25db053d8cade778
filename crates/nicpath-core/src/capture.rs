use std::path::Path;

use etherparse::{NetSlice, SlicedPacket, TransportSlice};
use log::{debug, warn};
use pcap_parser::Linktype;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::checksum::header_checksum_valid;
use crate::codec::{ParsedPacket, layout, unpack, unpack_without_fcs};
use crate::source::{PacketEvent, PacketSource, PcapFileSource, SourceError};
use crate::{DEFAULT_GENERATED_AT, InputInfo, REPORT_VERSION, ToolInfo};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// How captured frames are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Frames end with a 4-byte FCS that must be verified. Most capture
    /// drivers strip it, so this is off by default.
    pub fcs_present: bool,
}

/// Result of running a capture through the software receive path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureReport {
    pub report_version: u32,
    pub tool: ToolInfo,
    /// Timestamp of the last frame, so identical captures give identical
    /// reports.
    pub generated_at: String,
    pub input: InputInfo,
    pub summary: CaptureSummary,
    /// One record per frame, in capture order.
    pub frames: Vec<FrameRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureSummary {
    pub frames_total: u64,
    pub unpacked: u64,
    pub skipped: u64,
    pub failed: u64,
    /// Unpacked frames whose IPv4 header checksum did not verify.
    pub bad_header_checksum: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Zero-based position in the capture.
    pub index: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    pub len: usize,
    #[serde(flatten)]
    pub outcome: FrameOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FrameOutcome {
    Unpacked {
        packet: ParsedPacket,
        header_checksum_valid: bool,
    },
    Skipped {
        reason: String,
    },
    Failed {
        error: String,
    },
}

/// Unpack every frame of a PCAP/PCAPNG file.
///
/// # Examples
/// ```no_run
/// use std::path::Path;
///
/// use nicpath_core::{CaptureOptions, unpack_capture};
///
/// let report = unpack_capture(Path::new("capture.pcapng"), &CaptureOptions::default())?;
/// println!("{} of {} frames unpacked", report.summary.unpacked, report.summary.frames_total);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
/// Fails only when the file cannot be opened or read as a capture; frames
/// that do not unpack are recorded in the report.
pub fn unpack_capture(path: &Path, options: &CaptureOptions) -> Result<CaptureReport, CaptureError> {
    let source = PcapFileSource::open(path)?;
    let input = InputInfo {
        path: path.display().to_string(),
        bytes: path.metadata()?.len(),
    };
    unpack_source(input, source, options)
}

/// Unpack every frame produced by `source`.
pub fn unpack_source<S: PacketSource>(
    input: InputInfo,
    mut source: S,
    options: &CaptureOptions,
) -> Result<CaptureReport, CaptureError> {
    let mut summary = CaptureSummary::default();
    let mut frames = Vec::new();
    let mut first_ts = None;
    let mut last_ts = None;

    while let Some(PacketEvent {
        ts_us,
        linktype,
        data,
    }) = source.next_packet()?
    {
        let index = summary.frames_total;
        summary.frames_total += 1;
        if ts_us.is_some() {
            first_ts = first_ts.or(ts_us);
            last_ts = ts_us;
        }

        let outcome = process_frame(linktype, &data, options);
        match &outcome {
            FrameOutcome::Unpacked {
                header_checksum_valid,
                ..
            } => {
                summary.unpacked += 1;
                if !header_checksum_valid {
                    summary.bad_header_checksum += 1;
                }
            }
            FrameOutcome::Skipped { reason } => {
                debug!("frame {index}: skipped ({reason})");
                summary.skipped += 1;
            }
            FrameOutcome::Failed { error } => {
                warn!("frame {index}: {error}");
                summary.failed += 1;
            }
        }

        frames.push(FrameRecord {
            index,
            ts: ts_us.and_then(ts_to_rfc3339),
            len: data.len(),
            outcome,
        });
    }

    summary.time_start = first_ts.and_then(ts_to_rfc3339);
    summary.time_end = last_ts.and_then(ts_to_rfc3339);
    let generated_at = summary
        .time_end
        .clone()
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());

    Ok(CaptureReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo::current(),
        generated_at,
        input,
        summary,
        frames,
    })
}

fn process_frame(linktype: Linktype, data: &[u8], options: &CaptureOptions) -> FrameOutcome {
    if let Err(reason) = classify_frame(linktype, data) {
        return FrameOutcome::Skipped { reason };
    }

    let parsed = if options.fcs_present {
        unpack(data)
    } else {
        unpack_without_fcs(data)
    };
    match parsed {
        Ok(packet) => FrameOutcome::Unpacked {
            packet,
            header_checksum_valid: data
                .get(layout::FRAME_IPV4_OFFSET..layout::FRAME_UDP_OFFSET)
                .is_some_and(header_checksum_valid),
        },
        Err(err) => FrameOutcome::Failed {
            error: err.to_string(),
        },
    }
}

/// Accept only frames the fixed-offset codec can read: untagged Ethernet II,
/// option-less IPv4, UDP.
fn classify_frame(linktype: Linktype, data: &[u8]) -> Result<(), String> {
    if linktype != Linktype::ETHERNET {
        return Err(format!("unsupported linktype {}", linktype.0));
    }
    let ethertype = data
        .get(layout::ETH_TYPE_RANGE)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .ok_or_else(|| format!("truncated Ethernet header ({} bytes)", data.len()))?;
    if ethertype != layout::ETHERTYPE_IPV4 {
        return Err(format!("ethertype {ethertype:#06x} is not IPv4"));
    }

    let sliced = SlicedPacket::from_ethernet(data).map_err(|e| format!("malformed: {e}"))?;
    let ihl = match sliced.net {
        Some(NetSlice::Ipv4(ref ipv4)) => ipv4.header().ihl(),
        _ => return Err("missing IPv4 header".to_string()),
    };
    if usize::from(ihl) * 4 != layout::IPV4_HEADER_LEN {
        return Err(format!("IPv4 header carries options (IHL {ihl})"));
    }
    match sliced.transport {
        Some(TransportSlice::Udp(_)) => Ok(()),
        _ => {
            let protocol = data
                .get(layout::FRAME_IPV4_OFFSET + layout::IPV4_PROTOCOL_OFFSET)
                .copied()
                .unwrap_or_default();
            Err(format!("IP protocol {protocol} is not UDP"))
        }
    }
}

fn ts_to_rfc3339(ts_us: u64) -> Option<String> {
    let nanos = i128::from(ts_us) * 1_000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}
