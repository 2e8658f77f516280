//! I2C Sniffer Decoder Library
//!
//! A passive-observation library that reconstructs I2C transactions from
//! raw SCL/SDA edge events, renders them as a round-trippable text log,
//! and diffs two captured logs for verification.
//!
//! # Architecture
//!
//! The library is deliberately narrow:
//! - [`BusDecoder`] turns timestamped level changes into transaction
//!   records and inline decode-error notices
//! - [`logfmt`] renders records to text and parses them back
//! - [`compare`] aligns two parsed logs and reports differences
//!
//! The library does NOT:
//! - Talk to GPIO hardware or subscribe to edge notifications
//! - Drive the bus (no mastering, no replay)
//! - Filter glitches - any anomaly is a decode error, never corrected
//!
//! Obtaining edge events and persisting log files is the application
//! layer's job (i2c-sniff-cli).
//!
//! # Example Usage
//!
//! ```
//! use i2c_sniff_decoder::{BusDecoder, DecoderConfig, EdgeEvent, Line};
//!
//! let mut decoder = BusDecoder::new(DecoderConfig::new());
//!
//! // Feed timestamped edges; each call may complete zero or more records
//! for output in decoder.feed(EdgeEvent::new(Line::Scl, 0, 100)) {
//!     println!("{}", i2c_sniff_decoder::logfmt::render_output(&output));
//! }
//!
//! // At end of capture, flush a transaction still in flight
//! if let Some(tail) = decoder.flush() {
//!     println!("{}", i2c_sniff_decoder::logfmt::render_transaction(&tail));
//! }
//! ```

// Public modules
pub mod compare;
pub mod config;
pub mod decoder;
pub mod logfmt;
pub mod types;

// Re-export main types for convenience
pub use compare::{compare, DiffReport, FieldDiff, TransactionField};
pub use config::DecoderConfig;
pub use decoder::{BusDecoder, DecodingIterator};
pub use logfmt::{LogRecord, ParsedLog};
pub use types::{
    AckBit, DataByte, DecodeError, DecodeErrorReason, DecoderOutput, Direction, EdgeEvent, Line,
    Micros, ParseWarning, Result, SnifferError, Transaction, TransactionStatus,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
