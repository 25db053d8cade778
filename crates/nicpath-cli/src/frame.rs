use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Args;
use log::info;
use nicpath_core::{CapturedFrame, CodecError, pack, unpack, unpack_without_fcs, write_pcapng};

use crate::CliError;
use crate::input::{bytes_from_hex_or_file, parse_hex, serialize_json, write_output};

#[derive(Args, Debug)]
pub struct PackArgs {
    /// Source MAC address (xx:xx:xx:xx:xx:xx)
    #[arg(long)]
    src_mac: String,
    /// Destination MAC address (xx:xx:xx:xx:xx:xx)
    #[arg(long)]
    dst_mac: String,
    /// Source IPv4 address (d.d.d.d)
    #[arg(long)]
    src_ip: String,
    /// Destination IPv4 address (d.d.d.d)
    #[arg(long)]
    dst_ip: String,
    #[arg(long)]
    src_port: u16,
    #[arg(long)]
    dst_port: u16,
    /// UDP payload as UTF-8 text
    #[arg(long, conflicts_with = "payload_hex")]
    payload: Option<String>,
    /// UDP payload as hex bytes
    #[arg(long)]
    payload_hex: Option<String>,
    /// Write the raw frame bytes to a file instead of printing hex
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
    /// Also write the frame as a one-packet PCAPNG capture
    #[arg(long)]
    pcapng: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct UnpackArgs {
    /// Frame as hex bytes, FCS included
    #[arg(required_unless_present = "input")]
    frame: Option<String>,
    /// Read the raw frame from a file
    #[arg(long, conflicts_with = "frame")]
    input: Option<PathBuf>,
    /// The frame has no trailing FCS; skip verification
    #[arg(long)]
    no_fcs: bool,
    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

pub fn cmd_pack(args: PackArgs) -> Result<(), CliError> {
    let payload = match (&args.payload, &args.payload_hex) {
        (Some(text), _) => text.as_bytes().to_vec(),
        (None, Some(hex)) => parse_hex("payload", hex)?,
        (None, None) => Vec::new(),
    };

    let frame = pack(
        &args.src_mac,
        &args.dst_mac,
        &args.src_ip,
        &args.dst_ip,
        args.src_port,
        args.dst_port,
        &payload,
    )
    .map_err(codec_error)?;
    info!("packed {} byte frame", frame.len());

    if let Some(path) = args.pcapng.as_ref() {
        let captured = CapturedFrame {
            ts_us: now_micros(),
            data: frame.clone(),
        };
        write_pcapng(path, &[captured]).map_err(|err| {
            CliError::new(
                format!("failed to write {}: {err}", path.display()),
                None,
            )
        })?;
        eprintln!("OK: capture written -> {}", path.display());
    }

    match args.output.as_ref() {
        Some(path) => {
            write_output(path, &frame)?;
            eprintln!("OK: frame written -> {}", path.display());
        }
        None => println!("{}", hex::encode(&frame)),
    }
    Ok(())
}

pub fn cmd_unpack(args: UnpackArgs) -> Result<(), CliError> {
    let bytes = bytes_from_hex_or_file(args.frame.as_deref(), args.input.as_deref())?;
    let packet = if args.no_fcs {
        unpack_without_fcs(&bytes)
    } else {
        unpack(&bytes)
    }
    .map_err(codec_error)?;
    println!("{}", serialize_json(&packet, args.pretty)?);
    Ok(())
}

fn codec_error(err: CodecError) -> CliError {
    let hint = match err {
        CodecError::Format { .. } => {
            "MAC addresses are six hex octets (00:1a:2b:3c:4d:5e), IPv4 addresses four decimal octets (192.168.1.2)"
        }
        CodecError::Checksum { .. } => {
            "the last 4 bytes must be the CRC-32 of the frame; use --no-fcs if the FCS was stripped"
        }
        CodecError::TooShort { .. } => {
            "an Ethernet/IPv4/UDP frame is at least 42 bytes, plus 4 for the FCS"
        }
        CodecError::PayloadTooLarge { .. } => "split the payload across several datagrams",
    };
    CliError::new(err.to_string(), Some(hint))
}

fn now_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_micros() as u64)
        .unwrap_or(0)
}
