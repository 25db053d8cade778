use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use nicpath_core::{CaptureOptions, CaptureReport, unpack_capture};

use crate::CliError;
use crate::input::{resolve_input_path, serialize_json, validate_capture_file, write_output};

#[derive(Args, Debug)]
pub struct UnpackCaptureArgs {
    /// Path to a .pcap or .pcapng file (a glob matching exactly one file is accepted)
    input: PathBuf,

    /// Output report path (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    output: Option<PathBuf>,

    /// Write JSON report to stdout
    #[arg(long, conflicts_with = "output")]
    stdout: bool,

    /// Captured frames still carry their 4-byte FCS; verify it
    #[arg(long)]
    fcs: bool,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code if any frame failed to unpack
    #[arg(long)]
    strict: bool,
}

pub fn cmd_pcap_unpack(args: UnpackCaptureArgs) -> Result<(), CliError> {
    let input = resolve_input_path(&args.input)?;
    validate_capture_file(&input)?;
    let meta = fs::metadata(&input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    if !meta.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .pcap or .pcapng file"),
        ));
    }

    let output = if args.stdout {
        None
    } else {
        let output = args
            .output
            .ok_or_else(|| CliError::new("missing output path", Some("use -o/--output or --stdout")))?;
        ensure_distinct(&input, &output)?;
        Some(output)
    };

    let options = CaptureOptions {
        fcs_present: args.fcs,
    };
    let report = unpack_capture(&input, &options).context("PCAP/PCAPNG unpacking failed")?;
    let json = serialize_json(&report, args.pretty && !args.compact)?;

    match output {
        None => print!("{json}"),
        Some(path) => {
            write_output(&path, json.as_bytes())?;
            if !args.quiet {
                eprintln!(
                    "OK: {} of {} frames unpacked, report written -> {}",
                    report.summary.unpacked,
                    report.summary.frames_total,
                    path.display()
                );
            }
        }
    }

    if args.strict {
        check_strict(&report)?;
    }
    Ok(())
}

/// Refuse to overwrite the capture with its own report.
fn ensure_distinct(input: &Path, output: &Path) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // A parent that does not exist yet cannot contain the input.
    let Ok(parent_abs) = fs::canonicalize(parent) else {
        return Ok(());
    };
    let Some(name) = output.file_name() else {
        return Err(CliError::new(
            format!("invalid output path: {}", output.display()),
            Some("name a file, not a directory"),
        ));
    };
    if parent_abs.join(name) == input_abs {
        return Err(CliError::new(
            format!("report path must differ from input: {}", output.display()),
            Some("choose a different output path"),
        ));
    }
    Ok(())
}

fn check_strict(report: &CaptureReport) -> Result<(), CliError> {
    if report.summary.failed == 0 {
        return Ok(());
    }
    Err(CliError::with_hint(
        format!("{} frame(s) failed to unpack", report.summary.failed),
        "inspect frames with \"status\": \"failed\" in the report".to_string(),
    ))
}
