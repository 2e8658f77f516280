//! Decoder configuration types
//!
//! The decoder itself is intentionally simple; configuration only covers
//! what to emit, not how to decode. Pin assignment and file handling live
//! in the application layer.

use serde::{Deserialize, Serialize};

/// Configuration for the bus decoder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Whether decode-error notices are included in the output stream
    #[serde(default = "default_true")]
    pub emit_errors: bool,

    /// Optional: only emit transactions addressed to these 7-bit addresses
    ///
    /// Transactions whose address byte never completed are always emitted,
    /// since there is nothing to filter on.
    #[serde(default)]
    pub address_filter: Option<Vec<u8>>,
}

fn default_true() -> bool {
    true
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            emit_errors: true,
            address_filter: None,
        }
    }
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: enable or disable inline decode-error emission
    pub fn with_error_emission(mut self, enabled: bool) -> Self {
        self.emit_errors = enabled;
        self
    }

    /// Builder method: set the address allow-list
    pub fn with_address_filter(mut self, addresses: Vec<u8>) -> Self {
        self.address_filter = Some(addresses);
        self
    }

    /// Check if a transaction with this decoded address should be emitted
    pub fn should_emit_address(&self, address: Option<u8>) -> bool {
        match (&self.address_filter, address) {
            (Some(allowed), Some(addr)) => allowed.contains(&addr),
            // No filter, or nothing decoded to filter on
            _ => true,
        }
    }
}
