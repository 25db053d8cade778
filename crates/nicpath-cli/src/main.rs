use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod frame;
mod input;
mod line;
mod pcap;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("NICPATH_BUILD_COMMIT"),
    " ",
    env!("NICPATH_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "nicpath")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Software NIC data path: Ethernet/IPv4/UDP framing, CRC-32 and Manchester line coding.",
    long_about = None,
    after_help = "Examples:\n  nicpath pack --src-mac 00:00:00:00:00:01 --dst-mac 00:00:00:00:00:02 \\\n      --src-ip 192.168.1.2 --dst-ip 192.168.1.3 --src-port 8000 --dst-port 8001 --payload 'Hello World!'\n  nicpath unpack <HEX>\n  nicpath encode a5 --terminate\n  nicpath pcap unpack capture.pcapng -o report.json"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build an Ethernet/IPv4/UDP frame with header checksum and FCS.
    Pack(frame::PackArgs),
    /// Verify a frame's FCS and print its fields as JSON.
    Unpack(frame::UnpackArgs),
    /// Manchester-encode bytes into a 0/1 symbol string.
    Encode(line::EncodeArgs),
    /// Run a 0/1 symbol string through the line decoder and extract fields.
    Decode(line::DecodeArgs),
    /// Operations on PCAP/PCAPNG inputs.
    Pcap {
        #[command(subcommand)]
        command: PcapCommands,
    },
}

#[derive(Subcommand, Debug)]
enum PcapCommands {
    /// Unpack every frame of a capture and write a JSON report.
    #[command(
        after_help = "Examples:\n  nicpath pcap unpack capture.pcapng -o report.json\n  nicpath pcap unpack frames.pcapng --fcs --stdout --pretty"
    )]
    Unpack(pcap::UnpackCaptureArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Pack(args) => frame::cmd_pack(args),
        Commands::Unpack(args) => frame::cmd_unpack(args),
        Commands::Encode(args) => line::cmd_encode(args),
        Commands::Decode(args) => line::cmd_decode(args),
        Commands::Pcap { command } => match command {
            PcapCommands::Unpack(args) => pcap::cmd_pcap_unpack(args),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    pub(crate) fn new(message: impl Into<String>, hint: Option<&str>) -> Self {
        Self {
            message: message.into(),
            hint: hint.map(str::to_string),
        }
    }

    pub(crate) fn with_hint(message: impl Into<String>, hint: String) -> Self {
        Self {
            message: message.into(),
            hint: Some(hint),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}
