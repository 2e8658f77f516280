//! Transaction log text format - renderer and parser
//!
//! One line per record, structurally invertible: rendering a transaction
//! and parsing the line back reproduces an equal transaction. Lines
//! starting with `#` are session comments and blank lines are padding;
//! both are skipped. Anything else that fails to parse is skipped too and
//! reported as a [`ParseWarning`] - a corrupt line never aborts parsing
//! of the rest of the file.
//!
//! ```text
//! [0000001205] addr=0x50 dir=WRITE ack=ACK data=0xAB:ACK,0x10:NACK stop=0000001410 status=COMPLETE
//! [0000001600] decode-error reason=PHASE_VIOLATION
//! ```

use crate::types::{
    AckBit, DataByte, DecodeError, DecodeErrorReason, DecoderOutput, Direction, Micros,
    ParseWarning, Result, Transaction, TransactionStatus,
};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Placeholder for an absent optional field
const ABSENT: &str = "--";

/// One parsed log record
#[derive(Debug, Clone, PartialEq)]
pub enum LogRecord {
    Transaction(Transaction),
    DecodeError(DecodeError),
}

/// Everything recovered from one log file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLog {
    pub transactions: Vec<Transaction>,
    pub decode_errors: Vec<DecodeError>,
    pub warnings: Vec<ParseWarning>,
}

/// Render a transaction as one log line
pub fn render_transaction(tx: &Transaction) -> String {
    let addr = match tx.address {
        Some(a) => format!("0x{:02X}", a),
        None => ABSENT.to_string(),
    };
    let dir = match tx.direction {
        Some(d) => d.to_string(),
        None => ABSENT.to_string(),
    };
    let ack = match tx.address_ack {
        Some(a) => a.to_string(),
        None => ABSENT.to_string(),
    };
    let data = if tx.data.is_empty() {
        ABSENT.to_string()
    } else {
        tx.data
            .iter()
            .map(|b| format!("0x{:02X}:{}", b.value, b.ack))
            .collect::<Vec<_>>()
            .join(",")
    };
    let stop = match tx.stop_us {
        Some(ts) => format!("{:010}", ts),
        None => ABSENT.to_string(),
    };
    format!(
        "[{:010}] addr={} dir={} ack={} data={} stop={} status={}",
        tx.start_us, addr, dir, ack, data, stop, tx.status
    )
}

/// Render a decode-error notice as one log line
pub fn render_decode_error(err: &DecodeError) -> String {
    format!(
        "[{:010}] decode-error reason={}",
        err.timestamp_us, err.reason
    )
}

/// Render either kind of decoder output
pub fn render_output(output: &DecoderOutput) -> String {
    match output {
        DecoderOutput::Transaction(tx) => render_transaction(tx),
        DecoderOutput::Error(err) => render_decode_error(err),
    }
}

/// Parse one log line
///
/// Returns `Ok(None)` for comment and blank lines, `Ok(Some(record))` for
/// a recognized record, and `Err(message)` for a malformed line the
/// caller should report as a warning.
pub fn parse_line(line: &str) -> std::result::Result<Option<LogRecord>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let rest = line
        .strip_prefix('[')
        .ok_or_else(|| "missing timestamp bracket".to_string())?;
    let (ts_str, rest) = rest
        .split_once(']')
        .ok_or_else(|| "unterminated timestamp bracket".to_string())?;
    let timestamp_us: Micros = ts_str
        .trim()
        .parse()
        .map_err(|_| format!("bad timestamp '{}'", ts_str))?;

    let mut fields = rest.split_whitespace().peekable();
    if fields.peek() == Some(&"decode-error") {
        fields.next();
        let reason_field = fields
            .next()
            .ok_or_else(|| "decode-error line missing reason".to_string())?;
        let tag = reason_field
            .strip_prefix("reason=")
            .ok_or_else(|| format!("unexpected field '{}'", reason_field))?;
        let reason = DecodeErrorReason::from_tag(tag)
            .ok_or_else(|| format!("unknown decode-error reason '{}'", tag))?;
        return Ok(Some(LogRecord::DecodeError(DecodeError {
            timestamp_us,
            reason,
        })));
    }

    let mut address = None;
    let mut direction = None;
    let mut address_ack = None;
    let mut data = Vec::new();
    let mut stop_us = None;
    let mut status = None;

    for field in fields {
        let (key, value) = field
            .split_once('=')
            .ok_or_else(|| format!("field '{}' is not key=value", field))?;
        match key {
            "addr" => {
                if value != ABSENT {
                    address = Some(parse_hex_byte(value)?);
                }
            }
            "dir" => {
                direction = match value {
                    ABSENT => None,
                    "READ" => Some(Direction::Read),
                    "WRITE" => Some(Direction::Write),
                    _ => return Err(format!("bad direction '{}'", value)),
                };
            }
            "ack" => {
                address_ack = match value {
                    ABSENT => None,
                    _ => Some(parse_ack(value)?),
                };
            }
            "data" => {
                if value != ABSENT {
                    for pair in value.split(',') {
                        let (byte_str, ack_str) = pair
                            .split_once(':')
                            .ok_or_else(|| format!("bad data pair '{}'", pair))?;
                        data.push(DataByte {
                            value: parse_hex_byte(byte_str)?,
                            ack: parse_ack(ack_str)?,
                        });
                    }
                }
            }
            "stop" => {
                if value != ABSENT {
                    stop_us = Some(
                        value
                            .parse()
                            .map_err(|_| format!("bad stop timestamp '{}'", value))?,
                    );
                }
            }
            "status" => {
                status = Some(match value {
                    "COMPLETE" => TransactionStatus::Complete,
                    "TRUNCATED" => TransactionStatus::Truncated,
                    "MALFORMED" => TransactionStatus::Malformed,
                    _ => return Err(format!("unknown status '{}'", value)),
                });
            }
            _ => return Err(format!("unknown field '{}'", key)),
        }
    }

    let status = status.ok_or_else(|| "transaction line missing status".to_string())?;
    Ok(Some(LogRecord::Transaction(Transaction {
        start_us: timestamp_us,
        address,
        direction,
        address_ack,
        data,
        stop_us,
        status,
    })))
}

fn parse_hex_byte(s: &str) -> std::result::Result<u8, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| format!("byte '{}' missing 0x prefix", s))?;
    u8::from_str_radix(digits, 16).map_err(|_| format!("bad byte value '{}'", s))
}

fn parse_ack(s: &str) -> std::result::Result<AckBit, String> {
    match s {
        "ACK" => Ok(AckBit::Ack),
        "NACK" => Ok(AckBit::Nack),
        _ => Err(format!("bad ack '{}'", s)),
    }
}

/// Parse a whole transaction log from a reader
///
/// Malformed lines are skipped and collected as warnings (also reported
/// via `log::warn!` with their line numbers). Only an IO failure aborts.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<ParsedLog> {
    let mut parsed = ParsedLog::default();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        match parse_line(&line) {
            Ok(Some(LogRecord::Transaction(tx))) => parsed.transactions.push(tx),
            Ok(Some(LogRecord::DecodeError(err))) => parsed.decode_errors.push(err),
            Ok(None) => {}
            Err(message) => {
                let warning = ParseWarning {
                    line_number: idx + 1,
                    message,
                };
                log::warn!("skipping malformed log line: {}", warning);
                parsed.warnings.push(warning);
            }
        }
    }
    log::debug!(
        "parsed log: {} transactions, {} decode errors, {} warnings",
        parsed.transactions.len(),
        parsed.decode_errors.len(),
        parsed.warnings.len()
    );
    Ok(parsed)
}

/// Parse a transaction log file from disk
pub fn parse_file(path: &Path) -> Result<ParsedLog> {
    log::info!("Parsing transaction log: {:?}", path);
    let file = File::open(path)?;
    parse_reader(BufReader::new(file))
}
