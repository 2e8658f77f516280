//! I2C Sniffer CLI Application
//!
//! Command-line front end for the i2c-sniff-decoder library:
//! - `decode` turns a recorded GPIO edge capture into a transaction log
//! - `compare` diffs two transaction logs and sets the exit status
//!
//! Live GPIO subscription is deliberately not here: captures come from an
//! external edge-dump tool, which keeps the decoder testable on any
//! machine without bus hardware.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod edges;
mod report;

/// I2C Sniffer - decode and compare passive bus captures
#[derive(Parser, Debug)]
#[command(name = "i2c-sniff-cli")]
#[command(about = "Decode I2C edge captures and compare transaction logs", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a recorded edge capture into a transaction log
    Decode {
        /// Edge capture file: one "<micros> <gpio> <level>" per line
        #[arg(value_name = "FILE")]
        edges: PathBuf,

        /// Output transaction log (default: config logfile, else stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Path to capture configuration (config.toml)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// GPIO number carrying SDA (overrides config)
        #[arg(long, value_name = "GPIO")]
        sda_pin: Option<u8>,

        /// GPIO number carrying SCL (overrides config)
        #[arg(long, value_name = "GPIO")]
        scl_pin: Option<u8>,

        /// Only log transactions for this 7-bit address (repeatable)
        #[arg(long = "address", value_name = "ADDR", value_parser = parse_address)]
        addresses: Vec<u8>,

        /// Omit inline decode-error records from the log
        #[arg(long)]
        no_errors: bool,
    },

    /// Compare two transaction logs; exit 0 iff they are equivalent
    Compare {
        /// Left transaction log
        #[arg(value_name = "FILE")]
        left: PathBuf,

        /// Right transaction log
        #[arg(value_name = "FILE")]
        right: PathBuf,

        /// Emit the diff report as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    log::info!("I2C Sniffer CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", i2c_sniff_decoder::VERSION);

    match args.command {
        Command::Decode {
            edges,
            output,
            config,
            sda_pin,
            scl_pin,
            addresses,
            no_errors,
        } => decode_capture(
            &edges, output, config, sda_pin, scl_pin, addresses, no_errors,
        ),
        Command::Compare { left, right, json } => compare_logs(&left, &right, json),
    }
}

/// Decode an edge capture file into a transaction log
#[allow(clippy::too_many_arguments)]
fn decode_capture(
    edges_path: &PathBuf,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
    sda_pin: Option<u8>,
    scl_pin: Option<u8>,
    addresses: Vec<u8>,
    no_errors: bool,
) -> Result<()> {
    use i2c_sniff_decoder::{logfmt, BusDecoder, DecoderConfig, DecodingIterator, DecoderOutput};
    use std::io::Write;

    // Resolve capture settings: flags override the config file
    let capture_config = match &config_path {
        Some(path) => config::load_config(path)?,
        None => config::CaptureConfig::default(),
    };
    let pins = edges::PinMap {
        sda_gpio: sda_pin.unwrap_or(capture_config.pins.sda),
        scl_gpio: scl_pin.unwrap_or(capture_config.pins.scl),
    };
    log::info!("Pin map: SDA=GPIO{} SCL=GPIO{}", pins.sda_gpio, pins.scl_gpio);

    // Only a config file pins the default log file name; without one the
    // log goes to stdout.
    let output = output.or_else(|| config_path.as_ref().map(|_| capture_config.logfile.clone()));
    let mut sink: Box<dyn Write> = match &output {
        Some(path) => {
            log::info!("Writing transaction log: {:?}", path);
            Box::new(std::io::BufWriter::new(
                std::fs::File::create(path)
                    .with_context(|| format!("Failed to create log file: {:?}", path))?,
            ))
        }
        None => Box::new(std::io::stdout().lock()),
    };

    let mut decoder_config = DecoderConfig::new().with_error_emission(!no_errors);
    if !addresses.is_empty() {
        decoder_config = decoder_config.with_address_filter(addresses);
    }

    writeln!(
        sink,
        "# i2c-sniff capture decoded {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(sink, "# source: {}", edges_path.display())?;

    let reader = edges::EdgeFileReader::open(edges_path, pins)?;
    let mut transactions = 0usize;
    let mut decode_errors = 0usize;
    let mut skipped = 0usize;

    for item in DecodingIterator::new(reader, BusDecoder::new(decoder_config)) {
        match item {
            Ok(record) => {
                match record {
                    DecoderOutput::Transaction(_) => transactions += 1,
                    DecoderOutput::Error(_) => decode_errors += 1,
                }
                writeln!(sink, "{}", logfmt::render_output(&record))?;
            }
            Err(e) => {
                // A bad capture line loses one edge, not the session
                log::warn!("skipping edge: {}", e);
                skipped += 1;
            }
        }
    }
    sink.flush()?;

    log::info!(
        "Decoded {} transaction(s), {} decode error(s), {} skipped edge line(s)",
        transactions,
        decode_errors,
        skipped
    );
    Ok(())
}

/// Compare two transaction logs and report their differences
fn compare_logs(left: &PathBuf, right: &PathBuf, json: bool) -> Result<()> {
    use i2c_sniff_decoder::{compare, logfmt};

    let left_log = logfmt::parse_file(left)
        .with_context(|| format!("Failed to read left log: {:?}", left))?;
    let right_log = logfmt::parse_file(right)
        .with_context(|| format!("Failed to read right log: {:?}", right))?;

    for warning in left_log.warnings.iter().chain(&right_log.warnings) {
        log::warn!("parse warning: {}", warning);
    }

    let diff = compare(&left_log.transactions, &right_log.transactions);

    if json {
        println!("{}", report::render_json(&diff)?);
    } else {
        print!("{}", report::render_text(&diff, left, right));
    }

    if diff.is_empty() {
        Ok(())
    } else {
        // Non-zero exit distinguishes "different" from "failed to read"
        std::process::exit(1);
    }
}

/// Parse a 7-bit address flag value (decimal or 0x-prefixed hex)
fn parse_address(s: &str) -> std::result::Result<u8, String> {
    let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16).map_err(|_| format!("bad hex address '{}'", s))?
    } else {
        s.parse().map_err(|_| format!("bad address '{}'", s))?
    };
    if value > 0x7F {
        return Err(format!("address 0x{:02X} does not fit in 7 bits", value));
    }
    Ok(value)
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
