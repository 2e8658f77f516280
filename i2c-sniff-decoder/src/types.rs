//! Core types for the I2C sniffer decoder library
//!
//! This module defines all the fundamental types that flow through the
//! decoder: raw edge events on the two monitored lines, the decoded
//! transaction records, and the recoverable decode-error notices. The
//! decoder only reconstructs traffic - it never drives the bus.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for sniffer operations
pub type Result<T> = std::result::Result<T, SnifferError>;

/// Monotonic timestamp in microseconds, as delivered by the edge source
pub type Micros = u64;

/// One of the two monitored bus lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Line {
    /// Serial clock (SCL)
    Scl,
    /// Serial data (SDA)
    Sda,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Scl => write!(f, "SCL"),
            Line::Sda => write!(f, "SDA"),
        }
    }
}

/// A single timestamped level change on one monitored line
///
/// Produced externally (GPIO edge capture), consumed exactly once by the
/// decoder. The source must deliver events in non-decreasing timestamp
/// order; ties are broken by arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEvent {
    /// Which line changed
    pub line: Line,
    /// New level after the edge (0 or 1)
    pub level: u8,
    /// Monotonic timestamp in microseconds
    pub timestamp_us: Micros,
}

impl EdgeEvent {
    /// Create an edge event, clamping the level to 0/1
    pub fn new(line: Line, level: u8, timestamp_us: Micros) -> Self {
        Self {
            line,
            level: if level != 0 { 1 } else { 0 },
            timestamp_us,
        }
    }

    /// True if this edge leaves the line high
    pub fn is_high(&self) -> bool {
        self.level != 0
    }
}

/// Transfer direction encoded in the R/W bit of the address byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// R/W bit = 1: master reads from the slave
    Read,
    /// R/W bit = 0: master writes to the slave
    Write,
}

impl Direction {
    /// Decode the R/W bit (low bit of the first byte after START)
    pub fn from_rw_bit(bit: u8) -> Self {
        if bit & 1 != 0 {
            Direction::Read
        } else {
            Direction::Write
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Read => write!(f, "READ"),
            Direction::Write => write!(f, "WRITE"),
        }
    }
}

/// Acknowledgement bit driven by the receiver on the 9th clock pulse
///
/// SDA low while SCL is high means ACK; high means NACK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AckBit {
    Ack,
    Nack,
}

impl AckBit {
    /// Derive the ack bit from the SDA level sampled on the 9th clock pulse
    pub fn from_sda_level(level: u8) -> Self {
        if level == 0 {
            AckBit::Ack
        } else {
            AckBit::Nack
        }
    }
}

impl fmt::Display for AckBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AckBit::Ack => write!(f, "ACK"),
            AckBit::Nack => write!(f, "NACK"),
        }
    }
}

/// A data byte together with the acknowledgement it received
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataByte {
    pub value: u8,
    pub ack: AckBit,
}

/// Completion status of a decoded transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// STOP observed after a well-formed byte sequence
    Complete,
    /// Cut short by a new START, a mid-byte STOP, or capture shutdown
    Truncated,
    /// A decode error interrupted the transaction; partial fields kept
    Malformed,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Complete => write!(f, "COMPLETE"),
            TransactionStatus::Truncated => write!(f, "TRUNCATED"),
            TransactionStatus::Malformed => write!(f, "MALFORMED"),
        }
    }
}

/// One decoded bus exchange, from START to STOP (or interruption)
///
/// Invariant: `data` is non-empty only when `address_ack == Some(Ack)` -
/// a slave that NACKed its address cannot have transferred payload bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Timestamp of the START condition
    pub start_us: Micros,
    /// 7-bit slave address, if the address byte completed
    pub address: Option<u8>,
    /// Transfer direction from the R/W bit, if the address byte completed
    pub direction: Option<Direction>,
    /// Acknowledgement of the address byte, if sampled
    pub address_ack: Option<AckBit>,
    /// Payload bytes in transfer order, each with its sampled ack
    pub data: Vec<DataByte>,
    /// Timestamp of the STOP condition, absent when interrupted
    pub stop_us: Option<Micros>,
    /// How the transaction ended
    pub status: TransactionStatus,
}

impl Transaction {
    /// True if a STOP condition closed this transaction cleanly
    pub fn is_complete(&self) -> bool {
        self.status == TransactionStatus::Complete
    }
}

/// Reason for a recoverable decode error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodeErrorReason {
    /// An event reported a level the line already held (non-transition)
    UnexpectedEdge,
    /// The bit accumulator was asked to hold more than 8 bits
    BitCountOverflow,
    /// An edge that no legal bus sequence produces in the current phase
    PhaseViolation,
}

impl fmt::Display for DecodeErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeErrorReason::UnexpectedEdge => write!(f, "UNEXPECTED_EDGE"),
            DecodeErrorReason::BitCountOverflow => write!(f, "BIT_COUNT_OVERFLOW"),
            DecodeErrorReason::PhaseViolation => write!(f, "PHASE_VIOLATION"),
        }
    }
}

impl DecodeErrorReason {
    /// Parse the log-format spelling of a reason tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "UNEXPECTED_EDGE" => Some(DecodeErrorReason::UnexpectedEdge),
            "BIT_COUNT_OVERFLOW" => Some(DecodeErrorReason::BitCountOverflow),
            "PHASE_VIOLATION" => Some(DecodeErrorReason::PhaseViolation),
            _ => None,
        }
    }
}

/// A recoverable decode anomaly
///
/// Emitted inline with the transaction stream, never raised as a fatal
/// condition: the decoder resets and resumes at the next START.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeError {
    /// Timestamp of the offending edge
    pub timestamp_us: Micros,
    pub reason: DecodeErrorReason,
}

/// Output item of the decoder - a transaction or an inline error notice
#[derive(Debug, Clone, PartialEq)]
pub enum DecoderOutput {
    Transaction(Transaction),
    Error(DecodeError),
}

impl DecoderOutput {
    /// Timestamp of this output item
    pub fn timestamp_us(&self) -> Micros {
        match self {
            DecoderOutput::Transaction(t) => t.start_us,
            DecoderOutput::Error(e) => e.timestamp_us,
        }
    }
}

/// Errors that can occur in the sniffer library
#[derive(Debug, thiserror::Error)]
pub enum SnifferError {
    #[error("Failed to parse transaction log: {0}")]
    LogParse(String),

    #[error("Failed to parse edge capture: {0}")]
    EdgeParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A malformed log line, skipped during parsing
///
/// Reported alongside the parsed records so noise in a log file is
/// distinguishable from legitimate TRUNCATED/MALFORMED transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based line number in the input
    pub line_number: usize,
    pub message: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line_number, self.message)
    }
}
