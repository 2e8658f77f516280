//! Transaction log comparison
//!
//! Aligns two parsed transaction sequences positionally (transaction `i`
//! on the left against transaction `i` on the right) and reports
//! field-level content differences plus unmatched tail entries. Two
//! captures of the same traffic never agree on timestamps, so timestamps
//! are excluded from equality; only structural fields are compared.

use crate::types::Transaction;
use serde::Serialize;
use std::fmt;

/// A structural field of a transaction, for diff reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransactionField {
    Address,
    Direction,
    AddressAck,
    DataBytes,
    Status,
}

impl fmt::Display for TransactionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionField::Address => write!(f, "address"),
            TransactionField::Direction => write!(f, "direction"),
            TransactionField::AddressAck => write!(f, "address-ack"),
            TransactionField::DataBytes => write!(f, "data"),
            TransactionField::Status => write!(f, "status"),
        }
    }
}

/// One field-level mismatch between two aligned transactions
///
/// Values are pre-rendered to text: the differing fields are of mixed
/// types and the report's only consumers are humans and JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDiff {
    /// Position of the aligned pair in both sequences
    pub index: usize,
    pub field: TransactionField,
    pub left: String,
    pub right: String,
}

/// Result of comparing two transaction sequences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    /// Content mismatches between aligned pairs, in index order
    pub field_diffs: Vec<FieldDiff>,
    /// Left-side indices with no right-side counterpart
    pub unmatched_left: Vec<usize>,
    /// Right-side indices with no left-side counterpart
    pub unmatched_right: Vec<usize>,
}

impl DiffReport {
    /// True when the two captures are logically equivalent
    pub fn is_empty(&self) -> bool {
        self.field_diffs.is_empty()
            && self.unmatched_left.is_empty()
            && self.unmatched_right.is_empty()
    }
}

/// Compare two transaction sequences positionally
pub fn compare(left: &[Transaction], right: &[Transaction]) -> DiffReport {
    let mut report = DiffReport::default();

    for (index, (l, r)) in left.iter().zip(right.iter()).enumerate() {
        diff_pair(index, l, r, &mut report.field_diffs);
    }

    let aligned = left.len().min(right.len());
    report.unmatched_left.extend(aligned..left.len());
    report.unmatched_right.extend(aligned..right.len());

    log::debug!(
        "compared {} aligned pairs: {} field diffs, {}/{} unmatched",
        aligned,
        report.field_diffs.len(),
        report.unmatched_left.len(),
        report.unmatched_right.len()
    );
    report
}

/// Field-by-field structural comparison of one aligned pair
fn diff_pair(index: usize, left: &Transaction, right: &Transaction, out: &mut Vec<FieldDiff>) {
    if left.address != right.address {
        out.push(FieldDiff {
            index,
            field: TransactionField::Address,
            left: render_opt_byte(left.address),
            right: render_opt_byte(right.address),
        });
    }
    if left.direction != right.direction {
        out.push(FieldDiff {
            index,
            field: TransactionField::Direction,
            left: render_opt(left.direction),
            right: render_opt(right.direction),
        });
    }
    if left.address_ack != right.address_ack {
        out.push(FieldDiff {
            index,
            field: TransactionField::AddressAck,
            left: render_opt(left.address_ack),
            right: render_opt(right.address_ack),
        });
    }
    // The payload is compared as one sequence: a single altered byte is
    // one diff, not a per-byte cascade.
    if left.data != right.data {
        out.push(FieldDiff {
            index,
            field: TransactionField::DataBytes,
            left: render_data(left),
            right: render_data(right),
        });
    }
    if left.status != right.status {
        out.push(FieldDiff {
            index,
            field: TransactionField::Status,
            left: left.status.to_string(),
            right: right.status.to_string(),
        });
    }
}

fn render_opt_byte(value: Option<u8>) -> String {
    match value {
        Some(v) => format!("0x{:02X}", v),
        None => "--".to_string(),
    }
}

fn render_opt<T: fmt::Display>(value: Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "--".to_string(),
    }
}

fn render_data(tx: &Transaction) -> String {
    if tx.data.is_empty() {
        return "--".to_string();
    }
    tx.data
        .iter()
        .map(|b| format!("0x{:02X}:{}", b.value, b.ack))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AckBit, DataByte, Direction, TransactionStatus};

    fn tx(address: u8, data: &[u8]) -> Transaction {
        Transaction {
            start_us: 100,
            address: Some(address),
            direction: Some(Direction::Write),
            address_ack: Some(AckBit::Ack),
            data: data
                .iter()
                .map(|&value| DataByte {
                    value,
                    ack: AckBit::Ack,
                })
                .collect(),
            stop_us: Some(200),
            status: TransactionStatus::Complete,
        }
    }

    #[test]
    fn test_self_comparison_is_empty() {
        let seq = vec![tx(0x50, &[0xAB]), tx(0x68, &[0x01, 0x02])];
        let report = compare(&seq, &seq);
        assert!(report.is_empty());
    }

    #[test]
    fn test_timestamps_excluded_from_equality() {
        let left = vec![tx(0x50, &[0xAB])];
        let mut right = left.clone();
        right[0].start_us = 9999;
        right[0].stop_us = Some(12345);
        assert!(compare(&left, &right).is_empty());
    }

    #[test]
    fn test_single_altered_data_byte() {
        let left = vec![tx(0x50, &[0xAB]), tx(0x68, &[0x01, 0x02])];
        let mut right = left.clone();
        right[1].data[0].value = 0x7F;

        let report = compare(&left, &right);
        assert_eq!(report.field_diffs.len(), 1);
        let diff = &report.field_diffs[0];
        assert_eq!(diff.index, 1);
        assert_eq!(diff.field, TransactionField::DataBytes);
        assert_eq!(diff.left, "0x01:ACK,0x02:ACK");
        assert_eq!(diff.right, "0x7F:ACK,0x02:ACK");
        assert!(report.unmatched_left.is_empty());
        assert!(report.unmatched_right.is_empty());
    }

    #[test]
    fn test_length_mismatch() {
        let left = vec![tx(0x50, &[0xAB])];
        let right = vec![tx(0x50, &[0xAB]), tx(0x68, &[])];

        let report = compare(&left, &right);
        assert!(report.field_diffs.is_empty());
        assert!(report.unmatched_left.is_empty());
        assert_eq!(report.unmatched_right, vec![1]);
    }

    #[test]
    fn test_multiple_field_diffs_on_one_pair() {
        let left = vec![tx(0x50, &[0xAB])];
        let mut right = left.clone();
        right[0].address = Some(0x51);
        right[0].status = TransactionStatus::Truncated;

        let report = compare(&left, &right);
        assert_eq!(report.field_diffs.len(), 2);
        assert_eq!(report.field_diffs[0].field, TransactionField::Address);
        assert_eq!(report.field_diffs[1].field, TransactionField::Status);
    }

    #[test]
    fn test_empty_sequences_are_equivalent() {
        assert!(compare(&[], &[]).is_empty());
    }
}
