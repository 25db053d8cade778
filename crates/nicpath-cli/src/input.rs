use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use glob::glob;
use serde::Serialize;

use crate::CliError;

/// Bytes from `--input FILE` when given, otherwise from the hex argument.
pub fn bytes_from_hex_or_file(hex_arg: Option<&str>, file: Option<&Path>) -> Result<Vec<u8>, CliError> {
    if let Some(path) = file {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?;
        return Ok(bytes);
    }
    let text = hex_arg.ok_or_else(|| {
        CliError::new("missing input", Some("pass hex bytes or --input FILE"))
    })?;
    parse_hex("input", text)
}

/// Text from `--input FILE` when given, otherwise the positional argument.
pub fn text_from_arg_or_file(arg: Option<String>, file: Option<&Path>) -> Result<String, CliError> {
    if let Some(path) = file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?;
        return Ok(text);
    }
    arg.ok_or_else(|| CliError::new("missing input", Some("pass symbols or --input FILE")))
}

/// Decode hex, ignoring ASCII whitespace.
pub fn parse_hex(what: &str, text: &str) -> Result<Vec<u8>, CliError> {
    let cleaned: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    hex::decode(&cleaned).map_err(|err| {
        CliError::new(
            format!("invalid hex {what}: {err}"),
            Some("expected an even number of hex digits, e.g. 0a1b2c"),
        )
    })
}

pub fn serialize_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    Ok(json.context("JSON serialization failed")?)
}

/// Write `bytes` to `path`, creating missing parent directories.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(path, bytes).with_context(|| format!("Failed to write output: {}", path.display()))?;
    Ok(())
}

pub fn validate_capture_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .pcap or .pcapng file"),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "pcap" && ext != "pcapng" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .pcap or .pcapng file"),
        ));
    }
    Ok(())
}

/// Expand a glob pattern that must name exactly one capture file. Plain
/// paths are returned unchanged.
pub fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::with_hint(
            format!("invalid input pattern '{pattern}'"),
            format!("pattern error: {}", err.msg),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::with_hint(
                format!("invalid input pattern '{pattern}'"),
                format!("pattern error: {err}"),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{pattern}'"),
            Some("check the path or quote the pattern; expected .pcap or .pcapng"),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let mut listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            if count > 3 {
                listed.push_str(", ...");
            }
            Err(CliError::new(
                format!("multiple files match pattern '{pattern}' ({count} matches); matches: {listed}"),
                Some("pass a single capture file, or run once per file"),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}

#[cfg(test)]
mod tests {
    use super::{is_glob_pattern, parse_hex};

    #[test]
    fn hex_ignores_whitespace() {
        assert_eq!(parse_hex("frame", "0a 0b\n0c").unwrap(), vec![0x0a, 0x0b, 0x0c]);
    }

    #[test]
    fn odd_hex_is_rejected() {
        let err = parse_hex("frame", "abc").unwrap_err();
        assert!(err.to_string().contains("invalid hex frame"));
    }

    #[test]
    fn glob_detection() {
        assert!(is_glob_pattern("captures/*.pcapng"));
        assert!(!is_glob_pattern("capture.pcapng"));
    }
}
