//! Edge capture file reader
//!
//! Reads the text dumps produced by an external GPIO capture tool: one
//! `<micros> <gpio> <level>` triple per line, in timestamp order. A pin
//! map assigns GPIO numbers to their bus roles (SDA/SCL) so the decoder
//! only ever sees logical lines.

use anyhow::{Context, Result};
use i2c_sniff_decoder::{EdgeEvent, Line, SnifferError};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// GPIO-number to bus-role assignment
#[derive(Debug, Clone, Copy)]
pub struct PinMap {
    pub sda_gpio: u8,
    pub scl_gpio: u8,
}

impl PinMap {
    /// Resolve a GPIO number to its monitored line, if it is one of ours
    pub fn line_for(&self, gpio: u8) -> Option<Line> {
        if gpio == self.sda_gpio {
            Some(Line::Sda)
        } else if gpio == self.scl_gpio {
            Some(Line::Scl)
        } else {
            None
        }
    }
}

/// Iterator over edge events in a capture file
///
/// Comment (`#`) and blank lines are skipped. Malformed lines and edges
/// on unmapped GPIOs yield `EdgeParse` errors; the caller decides whether
/// to skip or abort.
pub struct EdgeFileReader<R: BufRead> {
    lines: Lines<R>,
    pins: PinMap,
    line_number: usize,
}

impl EdgeFileReader<BufReader<File>> {
    /// Open a capture file from disk
    pub fn open(path: &Path, pins: PinMap) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open edge capture file: {:?}", path))?;
        log::info!("Reading edge capture: {:?}", path);
        Ok(Self::new(BufReader::new(file), pins))
    }
}

impl<R: BufRead> EdgeFileReader<R> {
    pub fn new(reader: R, pins: PinMap) -> Self {
        Self {
            lines: reader.lines(),
            pins,
            line_number: 0,
        }
    }

    fn parse(&self, line: &str) -> std::result::Result<Option<EdgeEvent>, String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut parts = line.split_whitespace();
        let (Some(ts), Some(gpio), Some(level), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(format!("expected '<micros> <gpio> <level>', got '{}'", line));
        };

        let timestamp_us = ts
            .parse()
            .map_err(|_| format!("bad timestamp '{}'", ts))?;
        let gpio: u8 = gpio
            .parse()
            .map_err(|_| format!("bad GPIO number '{}'", gpio))?;
        let level: u8 = match level {
            "0" => 0,
            "1" => 1,
            _ => return Err(format!("bad level '{}'", level)),
        };
        let line = self
            .pins
            .line_for(gpio)
            .ok_or_else(|| format!("GPIO {} is not a monitored pin", gpio))?;

        Ok(Some(EdgeEvent::new(line, level, timestamp_us)))
    }
}

impl<R: BufRead> Iterator for EdgeFileReader<R> {
    type Item = i2c_sniff_decoder::Result<EdgeEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(SnifferError::Io(e))),
            };
            self.line_number += 1;
            match self.parse(&line) {
                Ok(Some(event)) => return Some(Ok(event)),
                Ok(None) => continue,
                Err(message) => {
                    return Some(Err(SnifferError::EdgeParse(format!(
                        "line {}: {}",
                        self.line_number, message
                    ))))
                }
            }
        }
    }
}
