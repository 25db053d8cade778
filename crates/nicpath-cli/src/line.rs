use std::path::PathBuf;

use clap::Args;
use log::debug;
use nicpath_core::extract::{ExtractedFields, Extraction, extract_fields};
use nicpath_core::line::{
    Convention, DecoderConfig, DecoderPhase, LineDecoder, LineError, MAX_FRAME_BITS, encode,
    format_symbols, parse_symbols,
};
use serde::Serialize;

use crate::CliError;
use crate::input::{bytes_from_hex_or_file, serialize_json, text_from_arg_or_file};

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Bytes to encode, as hex
    #[arg(required_unless_present = "input")]
    bytes: Option<String>,
    /// Read raw bytes from a file
    #[arg(long, conflicts_with = "bytes")]
    input: Option<PathBuf>,
    /// Use the reverse convention (1 -> 10, 0 -> 01)
    #[arg(long)]
    reverse: bool,
    /// Append the 00 end-of-frame pair
    #[arg(long)]
    terminate: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Symbols as 0/1 text; whitespace and '_' are ignored
    #[arg(required_unless_present = "input")]
    symbols: Option<String>,
    /// Read symbol text from a file
    #[arg(long, conflicts_with = "symbols")]
    input: Option<PathBuf>,
    /// Use the reverse convention (10 -> 1, 01 -> 0)
    #[arg(long)]
    reverse: bool,
    /// Decoded bit buffer capacity
    #[arg(long, default_value_t = MAX_FRAME_BITS)]
    capacity: usize,
    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

/// Decoder outcome printed by `nicpath decode`.
#[derive(Debug, Serialize)]
struct DecodeReport {
    phase: DecoderPhase,
    convention: Convention,
    symbols_consumed: usize,
    bits: usize,
    /// Decoded bytes as hex, when the bit count is a whole number of bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extraction: Option<Extraction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<ExtractedFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extract_error: Option<String>,
}

pub fn cmd_encode(args: EncodeArgs) -> Result<(), CliError> {
    let bytes = bytes_from_hex_or_file(args.bytes.as_deref(), args.input.as_deref())?;
    let symbols = encode(&bytes, Convention::from_reverse_flag(args.reverse));
    let text = if args.terminate {
        format_symbols(symbols.terminated())
    } else {
        format_symbols(symbols)
    };
    println!("{text}");
    Ok(())
}

pub fn cmd_decode(args: DecodeArgs) -> Result<(), CliError> {
    let text = text_from_arg_or_file(args.symbols, args.input.as_deref())?;
    let symbols = parse_symbols(&text).map_err(|err| {
        CliError::new(
            err.to_string(),
            Some("symbols are '0' and '1'; whitespace and '_' may be used as separators"),
        )
    })?;

    let convention = Convention::from_reverse_flag(args.reverse);
    let mut decoder = LineDecoder::new(DecoderConfig {
        capacity_bits: args.capacity,
        convention,
    });
    if let Err(err) = decoder.feed_all(symbols) {
        return Err(line_error(err));
    }
    debug!(
        "decoder stopped in {:?} after {} symbols",
        decoder.phase(),
        decoder.symbols_consumed()
    );

    let mut report = DecodeReport {
        phase: decoder.phase(),
        convention,
        symbols_consumed: decoder.symbols_consumed(),
        bits: decoder.bit_len(),
        bytes: decoder.decoded_bytes().map(hex::encode),
        extraction: None,
        fields: None,
        extract_error: None,
    };
    if decoder.phase() == DecoderPhase::Done {
        let mut fields = ExtractedFields::default();
        match extract_fields(&decoder, &mut fields) {
            Ok(extraction) => {
                if extraction == Extraction::Extracted {
                    report.fields = Some(fields);
                }
                report.extraction = Some(extraction);
            }
            Err(err) => report.extract_error = Some(err.to_string()),
        }
    }

    println!("{}", serialize_json(&report, args.pretty)?);
    Ok(())
}

fn line_error(err: LineError) -> CliError {
    let hint = match err {
        LineError::InvalidCode { .. } => {
            Some("every bit is a 01 or 10 pair and 00 ends the frame; check --reverse and symbol alignment")
        }
        LineError::CapacityExceeded { .. } => Some("raise --capacity or end the frame with 00"),
        _ => None,
    };
    CliError::new(format!("decode failed: {err}"), hint)
}
