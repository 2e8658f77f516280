//! Edge-to-transaction bus decoder
//!
//! This module implements the state machine that turns a time-ordered
//! stream of SCL/SDA level changes into decoded bus transactions. One
//! decoder instance owns one bus: it keeps shadow copies of both line
//! levels (needed to tell START/STOP apart from data bits), an MSB-first
//! bit accumulator, and the transaction currently being assembled.
//!
//! Bits are sampled on the rising SCL edge but committed on the falling
//! edge: a passive observer cannot distinguish a bit cell from the
//! preamble of a START or STOP until it sees whether SDA moves while the
//! clock is high.
//!
//! Decoding never aborts on malformed traffic. Every anomaly degrades to
//! an inline [`DecodeError`] notice plus a state reset, and the decoder
//! re-synchronizes at the next START condition.

use crate::config::DecoderConfig;
use crate::types::{
    AckBit, DataByte, DecodeError, DecodeErrorReason, DecoderOutput, Direction, EdgeEvent, Line,
    Micros, Result, Transaction, TransactionStatus,
};
use std::collections::VecDeque;

/// Decoder phase within one transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// No transaction open; waiting for a START condition
    Idle,
    /// Accumulating the 8 bits of the address byte
    AddressBits,
    /// Address byte complete; next rising SCL edge carries its ack
    AddressAck,
    /// Accumulating the 8 bits of a data byte
    DataBits,
    /// Data byte complete; next rising SCL edge carries its ack
    DataAck,
}

/// The transaction currently being assembled
#[derive(Debug)]
struct PendingTransaction {
    start_us: Micros,
    address: Option<u8>,
    direction: Option<Direction>,
    address_ack: Option<AckBit>,
    data: Vec<DataByte>,
    /// Completed data byte whose ack has not been sampled yet
    unacked_value: Option<u8>,
}

impl PendingTransaction {
    fn new(start_us: Micros) -> Self {
        Self {
            start_us,
            address: None,
            direction: None,
            address_ack: None,
            data: Vec::new(),
            unacked_value: None,
        }
    }

    /// Finalize into an immutable record. A data byte without a sampled
    /// ack is dropped: every recorded byte carries a real ack bit.
    fn finish(self, stop_us: Option<Micros>, status: TransactionStatus) -> Transaction {
        Transaction {
            start_us: self.start_us,
            address: self.address,
            direction: self.direction,
            address_ack: self.address_ack,
            data: self.data,
            stop_us,
            status,
        }
    }
}

/// The bus decoder - one instance per monitored bus
///
/// Feed it [`EdgeEvent`]s in non-decreasing timestamp order via
/// [`feed`](Self::feed); each call returns zero or more output records
/// (a START can flush the previous transaction in the same call that
/// opens the next one). Call [`flush`](Self::flush) at end of capture to
/// finalize an in-progress transaction as TRUNCATED.
#[derive(Debug)]
pub struct BusDecoder {
    config: DecoderConfig,
    /// Shadow level of SCL (starts high: idle bus)
    scl: u8,
    /// Shadow level of SDA (starts high: idle bus)
    sda: u8,
    phase: Phase,
    /// MSB-first bit accumulator for the byte in flight
    acc_value: u8,
    acc_count: u8,
    /// SDA level captured on the last rising SCL edge, not yet committed
    ///
    /// A high clock phase only proves itself a bit cell when the clock
    /// falls again with SDA unchanged; until then the same shape could be
    /// the preamble of a START or STOP. Sampling happens on the rising
    /// edge, commitment on the falling edge, and an SDA transition in
    /// between cancels the sample.
    sampled: Option<u8>,
    current: Option<PendingTransaction>,
}

impl BusDecoder {
    /// Create a decoder with the given configuration
    ///
    /// Both line shadows start high, matching a released (idle) bus.
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            scl: 1,
            sda: 1,
            phase: Phase::Idle,
            acc_value: 0,
            acc_count: 0,
            sampled: None,
            current: None,
        }
    }

    /// Process one edge event, returning everything it caused to complete
    ///
    /// Precondition: events arrive in non-decreasing timestamp order. The
    /// decoder does not verify this; out-of-order delivery is the
    /// caller's bug to prevent.
    pub fn feed(&mut self, event: EdgeEvent) -> Vec<DecoderOutput> {
        let mut out = Vec::new();
        log::trace!(
            "edge: {} -> {} at {}us (phase {:?})",
            event.line,
            event.level,
            event.timestamp_us,
            self.phase
        );

        // An event reporting the level the line already holds is not an
        // edge. Mid-transaction that means the source dropped or
        // duplicated something; on an idle bus it is not worth reporting.
        let shadow = match event.line {
            Line::Scl => self.scl,
            Line::Sda => self.sda,
        };
        if event.level == shadow {
            if self.current.is_some() {
                self.fail(event.timestamp_us, DecodeErrorReason::UnexpectedEdge, &mut out);
            }
            return out;
        }

        match event.line {
            Line::Sda => self.on_sda_edge(event, &mut out),
            Line::Scl => self.on_scl_edge(event, &mut out),
        }
        out
    }

    /// Finalize an in-progress transaction at end of capture
    ///
    /// Returns the TRUNCATED tail transaction, if one was open and passes
    /// the address filter.
    pub fn flush(&mut self) -> Option<Transaction> {
        let pending = self.current.take()?;
        self.reset_to_idle();
        let tx = pending.finish(None, TransactionStatus::Truncated);
        log::debug!("flush: truncating open transaction from {}us", tx.start_us);
        if self.config.should_emit_address(tx.address) {
            Some(tx)
        } else {
            None
        }
    }

    /// Handle a level change on the data line
    fn on_sda_edge(&mut self, event: EdgeEvent, out: &mut Vec<DecoderOutput>) {
        self.sda = event.level;

        // SDA moving while SCL is low is ordinary bit setup. Only
        // transitions under a high clock carry START/STOP meaning.
        if self.scl != 1 {
            return;
        }

        // The high phase turned out to be a START/STOP preamble, not a
        // bit cell: whatever the rising edge captured was no data.
        self.sampled = None;

        if event.level == 0 {
            self.on_start(event.timestamp_us, out);
        } else {
            self.on_stop(event.timestamp_us, out);
        }
    }

    /// START: SDA falls while SCL is high
    fn on_start(&mut self, timestamp_us: Micros, out: &mut Vec<DecoderOutput>) {
        if let Some(pending) = self.current.take() {
            log::debug!(
                "repeated START at {}us truncates transaction from {}us",
                timestamp_us,
                pending.start_us
            );
            let tx = pending.finish(None, TransactionStatus::Truncated);
            self.push_transaction(tx, out);
        } else {
            log::debug!("START at {}us", timestamp_us);
        }
        self.reset_accumulator();
        self.current = Some(PendingTransaction::new(timestamp_us));
        self.phase = Phase::AddressBits;
    }

    /// STOP: SDA rises while SCL is high
    fn on_stop(&mut self, timestamp_us: Micros, out: &mut Vec<DecoderOutput>) {
        let Some(pending) = self.current.take() else {
            // No transaction open: spurious STOP, tolerated silently
            log::trace!("spurious STOP at {}us ignored", timestamp_us);
            return;
        };

        // Complete only when the bus stopped at a byte boundary: no
        // partial bits accumulated and no byte still awaiting its ack.
        let at_boundary = self.acc_count == 0
            && matches!(self.phase, Phase::AddressBits | Phase::DataBits)
            && pending.unacked_value.is_none();
        let status = if at_boundary {
            TransactionStatus::Complete
        } else {
            TransactionStatus::Truncated
        };

        log::debug!("STOP at {}us ({})", timestamp_us, status);
        let tx = pending.finish(Some(timestamp_us), status);
        self.push_transaction(tx, out);
        self.reset_to_idle();
    }

    /// Handle a level change on the clock line
    fn on_scl_edge(&mut self, event: EdgeEvent, out: &mut Vec<DecoderOutput>) {
        self.scl = event.level;
        if event.level == 1 {
            // Capture SDA now; it only becomes a bit or an ack if the
            // clock completes its pulse without an SDA transition.
            if self.phase != Phase::Idle {
                self.sampled = Some(self.sda);
            }
        } else if let Some(level) = self.sampled.take() {
            self.commit_sample(level, event.timestamp_us, out);
        }
    }

    /// The clock pulse completed: apply the level sampled on its rising edge
    fn commit_sample(&mut self, level: u8, timestamp_us: Micros, out: &mut Vec<DecoderOutput>) {
        match self.phase {
            // Clock activity with no transaction open carries no data
            Phase::Idle => {}

            Phase::AddressBits => {
                if self.push_bit(level, timestamp_us, out) && self.acc_count == 8 {
                    let raw = self.acc_value;
                    let Some(current) = self.current.as_mut() else {
                        return;
                    };
                    current.address = Some(raw >> 1);
                    current.direction = Some(Direction::from_rw_bit(raw));
                    log::debug!(
                        "address byte 0x{:02X} -> 0x{:02X} {}",
                        raw,
                        raw >> 1,
                        Direction::from_rw_bit(raw)
                    );
                    self.reset_accumulator();
                    self.phase = Phase::AddressAck;
                }
            }

            Phase::AddressAck => {
                let ack = AckBit::from_sda_level(level);
                let Some(current) = self.current.as_mut() else {
                    return;
                };
                current.address_ack = Some(ack);
                log::debug!("address ack: {}", ack);
                self.phase = Phase::DataBits;
            }

            Phase::DataBits => {
                // Payload bits may not follow a NACKed address; the only
                // legal continuations there are STOP or a repeated START.
                let nacked = self
                    .current
                    .as_ref()
                    .map(|c| c.address_ack == Some(AckBit::Nack))
                    .unwrap_or(false);
                if nacked {
                    self.fail(timestamp_us, DecodeErrorReason::PhaseViolation, out);
                    return;
                }
                if self.push_bit(level, timestamp_us, out) && self.acc_count == 8 {
                    let value = self.acc_value;
                    let Some(current) = self.current.as_mut() else {
                        return;
                    };
                    current.unacked_value = Some(value);
                    self.reset_accumulator();
                    self.phase = Phase::DataAck;
                }
            }

            Phase::DataAck => {
                let ack = AckBit::from_sda_level(level);
                let Some(current) = self.current.as_mut() else {
                    return;
                };
                if let Some(value) = current.unacked_value.take() {
                    log::debug!("data byte 0x{:02X} {}", value, ack);
                    current.data.push(DataByte { value, ack });
                }
                self.phase = Phase::DataBits;
            }
        }
    }

    /// Append a committed bit to the accumulator
    ///
    /// Returns false if the accumulator was already full (the decoder has
    /// failed and reset in that case).
    fn push_bit(&mut self, level: u8, timestamp_us: Micros, out: &mut Vec<DecoderOutput>) -> bool {
        if self.acc_count >= 8 {
            self.fail(timestamp_us, DecodeErrorReason::BitCountOverflow, out);
            return false;
        }
        self.acc_value = (self.acc_value << 1) | level;
        self.acc_count += 1;
        true
    }

    /// Emit a decode error, salvage the open transaction as MALFORMED,
    /// and reset to IDLE
    ///
    /// A passive sniffer never silently drops observed traffic, so the
    /// partial transaction goes out ahead of the error notice.
    fn fail(&mut self, timestamp_us: Micros, reason: DecodeErrorReason, out: &mut Vec<DecoderOutput>) {
        log::warn!("decode error at {}us: {}", timestamp_us, reason);
        if let Some(pending) = self.current.take() {
            let tx = pending.finish(None, TransactionStatus::Malformed);
            self.push_transaction(tx, out);
        }
        if self.config.emit_errors {
            out.push(DecoderOutput::Error(DecodeError {
                timestamp_us,
                reason,
            }));
        }
        self.reset_to_idle();
    }

    /// Emit a finalized transaction unless the address filter drops it
    fn push_transaction(&self, tx: Transaction, out: &mut Vec<DecoderOutput>) {
        if self.config.should_emit_address(tx.address) {
            out.push(DecoderOutput::Transaction(tx));
        } else {
            log::debug!(
                "address filter suppressed transaction to {:?}",
                tx.address
            );
        }
    }

    fn reset_accumulator(&mut self) {
        self.acc_value = 0;
        self.acc_count = 0;
    }

    fn reset_to_idle(&mut self) {
        self.reset_accumulator();
        self.sampled = None;
        self.current = None;
        self.phase = Phase::Idle;
    }
}

impl Default for BusDecoder {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}

/// Lazy adapter from an edge-event source to decoder outputs
///
/// Wraps any fallible edge iterator and yields decoder outputs as they
/// complete, queueing multi-record emissions (a repeated START produces
/// the truncated predecessor and later its successor). When the source
/// runs dry, a transaction still in flight is flushed as TRUNCATED.
pub struct DecodingIterator<I>
where
    I: Iterator<Item = Result<EdgeEvent>>,
{
    edges: I,
    decoder: BusDecoder,
    pending: VecDeque<DecoderOutput>,
    flushed: bool,
}

impl<I> DecodingIterator<I>
where
    I: Iterator<Item = Result<EdgeEvent>>,
{
    pub fn new(edges: I, decoder: BusDecoder) -> Self {
        Self {
            edges,
            decoder,
            pending: VecDeque::new(),
            flushed: false,
        }
    }
}

impl<I> Iterator for DecodingIterator<I>
where
    I: Iterator<Item = Result<EdgeEvent>>,
{
    type Item = Result<DecoderOutput>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(Ok(item));
            }
            match self.edges.next() {
                Some(Ok(event)) => {
                    self.pending.extend(self.decoder.feed(event));
                }
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    if self.flushed {
                        return None;
                    }
                    self.flushed = true;
                    if let Some(tx) = self.decoder.flush() {
                        return Some(Ok(DecoderOutput::Transaction(tx)));
                    }
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds edge sequences the way a real bus produces them: a line
    /// event is only emitted when the level actually changes.
    struct EdgeScript {
        t: Micros,
        scl: u8,
        sda: u8,
        events: Vec<EdgeEvent>,
    }

    impl EdgeScript {
        fn new() -> Self {
            // Idle bus: both lines high, matching the decoder's initial
            // shadow state.
            Self {
                t: 0,
                scl: 1,
                sda: 1,
                events: Vec::new(),
            }
        }

        fn set(&mut self, line: Line, level: u8) {
            let shadow = match line {
                Line::Scl => &mut self.scl,
                Line::Sda => &mut self.sda,
            };
            if *shadow == level {
                return;
            }
            *shadow = level;
            self.t += 5;
            self.events.push(EdgeEvent::new(line, level, self.t));
        }

        fn start(&mut self) {
            self.set(Line::Scl, 1);
            self.set(Line::Sda, 1);
            self.set(Line::Sda, 0); // SDA falls under a high clock
            self.set(Line::Scl, 0);
        }

        fn bit(&mut self, level: u8) {
            self.set(Line::Sda, level); // setup while clock low
            self.set(Line::Scl, 1); // sampled here
            self.set(Line::Scl, 0);
        }

        fn byte(&mut self, value: u8, ack: AckBit) {
            for i in (0..8).rev() {
                self.bit((value >> i) & 1);
            }
            self.bit(match ack {
                AckBit::Ack => 0,
                AckBit::Nack => 1,
            });
        }

        fn stop(&mut self) {
            self.set(Line::Sda, 0);
            self.set(Line::Scl, 1);
            self.set(Line::Sda, 1); // SDA rises under a high clock
        }
    }

    fn run(decoder: &mut BusDecoder, events: &[EdgeEvent]) -> Vec<DecoderOutput> {
        events.iter().flat_map(|e| decoder.feed(*e)).collect()
    }

    fn transactions(outputs: &[DecoderOutput]) -> Vec<Transaction> {
        outputs
            .iter()
            .filter_map(|o| match o {
                DecoderOutput::Transaction(t) => Some(t.clone()),
                DecoderOutput::Error(_) => None,
            })
            .collect()
    }

    fn errors(outputs: &[DecoderOutput]) -> Vec<DecodeError> {
        outputs
            .iter()
            .filter_map(|o| match o {
                DecoderOutput::Error(e) => Some(*e),
                DecoderOutput::Transaction(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_frame_completeness() {
        // START, address 0x50 WRITE, ACK, data 0xAB, ACK, STOP
        let mut script = EdgeScript::new();
        script.start();
        script.byte(0x50 << 1, AckBit::Ack);
        script.byte(0xAB, AckBit::Ack);
        script.stop();

        let mut decoder = BusDecoder::default();
        let out = run(&mut decoder, &script.events);

        assert!(errors(&out).is_empty());
        let txs = transactions(&out);
        assert_eq!(txs.len(), 1);
        let tx = &txs[0];
        assert_eq!(tx.address, Some(0x50));
        assert_eq!(tx.direction, Some(Direction::Write));
        assert_eq!(tx.address_ack, Some(AckBit::Ack));
        assert_eq!(
            tx.data,
            vec![DataByte {
                value: 0xAB,
                ack: AckBit::Ack
            }]
        );
        assert_eq!(tx.status, TransactionStatus::Complete);
        assert!(tx.stop_us.is_some());
    }

    #[test]
    fn test_read_direction() {
        let mut script = EdgeScript::new();
        script.start();
        script.byte((0x50 << 1) | 1, AckBit::Ack);
        script.stop();

        let mut decoder = BusDecoder::default();
        let txs = transactions(&run(&mut decoder, &script.events));
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].address, Some(0x50));
        assert_eq!(txs[0].direction, Some(Direction::Read));
    }

    #[test]
    fn test_spurious_stop_is_ignored() {
        // A STOP shape with no prior START: clock low, SDA low, clock
        // high, SDA rises. Nothing to finalize, nothing to report.
        let mut script = EdgeScript::new();
        script.set(Line::Scl, 0);
        script.set(Line::Sda, 0);
        script.set(Line::Scl, 1);
        script.set(Line::Sda, 1);

        let mut decoder = BusDecoder::default();
        let out = run(&mut decoder, &script.events);
        assert!(out.is_empty());
    }

    #[test]
    fn test_truncation_on_repeated_start_mid_byte() {
        let mut script = EdgeScript::new();
        script.start();
        // Four bits of an address byte, then a new START interrupts
        for level in [1, 0, 1, 0] {
            script.bit(level);
        }
        script.set(Line::Sda, 1);
        script.start();
        script.byte(0x50 << 1, AckBit::Ack);
        script.stop();

        let mut decoder = BusDecoder::default();
        let out = run(&mut decoder, &script.events);

        assert!(errors(&out).is_empty());
        let txs = transactions(&out);
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].status, TransactionStatus::Truncated);
        assert_eq!(txs[0].address, None);
        assert!(txs[0].stop_us.is_none());
        assert_eq!(txs[1].status, TransactionStatus::Complete);
        assert_eq!(txs[1].address, Some(0x50));
    }

    #[test]
    fn test_stop_mid_byte_truncates() {
        let mut script = EdgeScript::new();
        script.start();
        script.bit(1);
        script.bit(0);
        script.stop();

        let mut decoder = BusDecoder::default();
        let txs = transactions(&run(&mut decoder, &script.events));
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].status, TransactionStatus::Truncated);
        assert!(txs[0].stop_us.is_some());
    }

    #[test]
    fn test_nacked_address_then_stop_is_complete() {
        let mut script = EdgeScript::new();
        script.start();
        script.byte(0x68 << 1, AckBit::Nack);
        script.stop();

        let mut decoder = BusDecoder::default();
        let out = run(&mut decoder, &script.events);
        assert!(errors(&out).is_empty());
        let txs = transactions(&out);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].address_ack, Some(AckBit::Nack));
        assert!(txs[0].data.is_empty());
        assert_eq!(txs[0].status, TransactionStatus::Complete);
    }

    #[test]
    fn test_data_after_nacked_address_is_phase_violation() {
        let mut script = EdgeScript::new();
        script.start();
        script.byte(0x68 << 1, AckBit::Nack);
        // Master clocks a data bit anyway
        script.bit(1);

        let mut decoder = BusDecoder::default();
        let out = run(&mut decoder, &script.events);

        let errs = errors(&out);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].reason, DecodeErrorReason::PhaseViolation);
        // The partial observation is salvaged, not dropped
        let txs = transactions(&out);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].status, TransactionStatus::Malformed);
        assert_eq!(txs[0].address, Some(0x68));
    }

    #[test]
    fn test_duplicate_edge_mid_transaction() {
        let mut script = EdgeScript::new();
        script.start();
        script.bit(1);
        let mut events = script.events.clone();
        // Re-deliver the last edge: same level, same line
        let dup = *events.last().unwrap();
        events.push(dup);

        let mut decoder = BusDecoder::default();
        let out = run(&mut decoder, &events);
        let errs = errors(&out);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].reason, DecodeErrorReason::UnexpectedEdge);
        assert_eq!(transactions(&out)[0].status, TransactionStatus::Malformed);
    }

    #[test]
    fn test_error_self_heal() {
        // A phase violation, then a fully valid frame: no residue
        let mut script = EdgeScript::new();
        script.start();
        script.byte(0x68 << 1, AckBit::Nack);
        script.bit(1); // violation, decoder resets
        script.set(Line::Scl, 0);
        script.set(Line::Sda, 1);
        script.set(Line::Scl, 1);
        script.start();
        script.byte(0x50 << 1, AckBit::Ack);
        script.byte(0xAB, AckBit::Ack);
        script.stop();

        let mut decoder = BusDecoder::default();
        let out = run(&mut decoder, &script.events);
        let txs = transactions(&out);
        assert_eq!(txs.len(), 2);
        let tx = &txs[1];
        assert_eq!(tx.status, TransactionStatus::Complete);
        assert_eq!(tx.address, Some(0x50));
        assert_eq!(tx.data.len(), 1);
        assert_eq!(tx.data[0].value, 0xAB);
    }

    #[test]
    fn test_flush_truncates_open_transaction() {
        let mut script = EdgeScript::new();
        script.start();
        script.byte(0x50 << 1, AckBit::Ack);

        let mut decoder = BusDecoder::default();
        let out = run(&mut decoder, &script.events);
        assert!(out.is_empty());

        let tx = decoder.flush().expect("open transaction flushed");
        assert_eq!(tx.status, TransactionStatus::Truncated);
        assert_eq!(tx.address, Some(0x50));
        assert!(tx.stop_us.is_none());
        // Second flush has nothing left
        assert!(decoder.flush().is_none());
    }

    #[test]
    fn test_unacked_byte_dropped_on_truncation() {
        // Full data byte captured but STOP lands before its ack
        let mut script = EdgeScript::new();
        script.start();
        script.byte(0x50 << 1, AckBit::Ack);
        for i in (0..8).rev() {
            script.bit((0xAB >> i) & 1);
        }
        script.stop();

        let mut decoder = BusDecoder::default();
        let txs = transactions(&run(&mut decoder, &script.events));
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].status, TransactionStatus::Truncated);
        assert!(txs[0].data.is_empty());
    }

    #[test]
    fn test_address_filter_suppresses_transaction() {
        let mut script = EdgeScript::new();
        script.start();
        script.byte(0x68 << 1, AckBit::Ack);
        script.stop();
        script.start();
        script.byte(0x50 << 1, AckBit::Ack);
        script.stop();

        let config = DecoderConfig::new().with_address_filter(vec![0x50]);
        let mut decoder = BusDecoder::new(config);
        let txs = transactions(&run(&mut decoder, &script.events));
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].address, Some(0x50));
    }

    #[test]
    fn test_multi_byte_write() {
        let mut script = EdgeScript::new();
        script.start();
        script.byte(0x03 << 1, AckBit::Ack);
        script.byte(0x02, AckBit::Ack);
        script.byte(0x21, AckBit::Nack);
        script.stop();

        let mut decoder = BusDecoder::default();
        let txs = transactions(&run(&mut decoder, &script.events));
        assert_eq!(txs.len(), 1);
        let tx = &txs[0];
        assert_eq!(tx.address, Some(0x03));
        assert_eq!(
            tx.data,
            vec![
                DataByte {
                    value: 0x02,
                    ack: AckBit::Ack
                },
                DataByte {
                    value: 0x21,
                    ack: AckBit::Nack
                },
            ]
        );
        assert_eq!(tx.status, TransactionStatus::Complete);
    }

    #[test]
    fn test_decoding_iterator_flushes_tail() {
        let mut script = EdgeScript::new();
        script.start();
        script.byte(0x50 << 1, AckBit::Ack);
        script.byte(0x11, AckBit::Ack);
        script.stop();
        script.start();
        script.byte(0x50 << 1, AckBit::Ack);
        // Capture ends mid-transaction

        let edges = script.events.into_iter().map(Ok);
        let iter = DecodingIterator::new(edges, BusDecoder::default());
        let outputs: Vec<DecoderOutput> = iter.map(|r| r.unwrap()).collect();

        let txs = transactions(&outputs);
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].status, TransactionStatus::Complete);
        assert_eq!(txs[1].status, TransactionStatus::Truncated);
    }
}
