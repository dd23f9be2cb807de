//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module defines the trade record emitted per match and the sink the book publishes
// trades into. The default sink is an append-only in-memory log queryable from the tail,
// which downstream analytics consume.
//
// | Component     | Description                                                               |
// |---------------|---------------------------------------------------------------------------|
// | TradeParty    | One side of a match (maker or taker view)                                 |
// | TradeRecord   | A single partial or full fill                                             |
// | TradeSink     | Write-only interface the book emits trades through                        |
// | TradeLog      | Default sink: ordered append-only log with tail read-back                 |
//--------------------------------------------------------------------------------------------------

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Side;

/// One party of a trade.
///
/// The maker (party1) is the resting order; the taker (party2) is the aggressor.
/// `new_book_quantity` is the maker's residual quantity after the match, `None` when the
/// maker was fully consumed. For the taker it is always `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeParty {
    /// External identifier of the order.
    pub trade_id: String,
    /// Side of the order.
    pub side: Side,
    /// Book-assigned order id.
    pub order_id: u64,
    /// Residual quantity left on the book, if any.
    pub new_book_quantity: Option<Decimal>,
    /// Opaque tag carried through unmodified.
    pub wage: Option<String>,
}

/// A single match between a resting order and an aggressor.
///
/// All trades produced by one submission share the same `timestamp`. The `time` field
/// duplicates `timestamp` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Book clock at the match.
    pub timestamp: u64,
    /// Equal to `timestamp`.
    pub time: u64,
    /// Execution price: the resting order's price.
    pub price: Decimal,
    /// Quantity crossed in this match. Strictly positive.
    pub quantity: Decimal,
    /// The resting (maker) order.
    pub party1: TradeParty,
    /// The aggressing (taker) order.
    pub party2: TradeParty,
}

impl TradeRecord {
    /// Creates a record for one match; `time` mirrors `timestamp`.
    pub fn new(
        timestamp: u64,
        price: Decimal,
        quantity: Decimal,
        party1: TradeParty,
        party2: TradeParty,
    ) -> Self {
        Self {
            timestamp,
            time: timestamp,
            price,
            quantity,
            party1,
            party2,
        }
    }
}

/// Write-only interface the book publishes executed trades through.
///
/// Implementations must preserve emission order and must never drop or coalesce records:
/// the order of appends is the order of matches within a submission and the order of
/// submissions across time.
pub trait TradeSink {
    /// Appends one executed trade.
    fn append(&mut self, trade: TradeRecord);
}

/// Default sink: an append-only ordered log of every executed trade.
///
/// Starts empty. Downstream analytics read from the tail.
#[derive(Debug, Default)]
pub struct TradeLog {
    records: Vec<TradeRecord>,
}

impl TradeLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded trades.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no trade has been recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The most recent `n` trades in emission order.
    pub fn tail(&self, n: usize) -> &[TradeRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }

    /// The most recently recorded trade.
    pub fn last(&self) -> Option<&TradeRecord> {
        self.records.last()
    }

    /// Iterates all recorded trades in emission order.
    pub fn iter(&self) -> impl Iterator<Item = &TradeRecord> {
        self.records.iter()
    }
}

impl TradeSink for TradeLog {
    fn append(&mut self, trade: TradeRecord) {
        self.records.push(trade);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn party(order_id: u64, side: Side, remaining: Option<Decimal>) -> TradeParty {
        TradeParty {
            trade_id: order_id.to_string(),
            side,
            order_id,
            new_book_quantity: remaining,
            wage: None,
        }
    }

    fn record(timestamp: u64, price: Decimal, quantity: Decimal) -> TradeRecord {
        TradeRecord::new(
            timestamp,
            price,
            quantity,
            party(1, Side::Bid, Some(dec!(3))),
            party(2, Side::Ask, None),
        )
    }

    #[test]
    fn test_record_mirrors_time() {
        let trade = record(5, dec!(100), dec!(2));
        assert_eq!(trade.time, trade.timestamp);
        assert_eq!(trade.time, 5);
    }

    #[test]
    fn test_record_wire_shape() {
        let trade = record(3, dec!(100.5), dec!(2));
        let json = serde_json::to_value(&trade).unwrap();

        assert_eq!(json["timestamp"], 3);
        assert_eq!(json["time"], 3);
        assert_eq!(json["price"], "100.5");
        assert_eq!(json["quantity"], "2");
        assert_eq!(json["party1"]["side"], "bid");
        assert_eq!(json["party1"]["order_id"], 1);
        assert_eq!(json["party1"]["new_book_quantity"], "3");
        assert_eq!(json["party2"]["side"], "ask");
        assert_eq!(json["party2"]["new_book_quantity"], serde_json::Value::Null);
        assert_eq!(json["party2"]["wage"], serde_json::Value::Null);
    }

    #[test]
    fn test_log_starts_empty() {
        let log = TradeLog::new();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
        assert!(log.tail(10).is_empty());
        assert!(log.last().is_none());
    }

    #[test]
    fn test_log_preserves_append_order() {
        let mut log = TradeLog::new();
        for i in 1..=4 {
            log.append(record(i, dec!(100), dec!(1)));
        }

        assert_eq!(log.len(), 4);
        let times: Vec<u64> = log.iter().map(|t| t.timestamp).collect();
        assert_eq!(times, vec![1, 2, 3, 4]);
        assert_eq!(log.last().unwrap().timestamp, 4);
    }

    #[test]
    fn test_log_tail() {
        let mut log = TradeLog::new();
        for i in 1..=5 {
            log.append(record(i, dec!(100), dec!(1)));
        }

        let tail = log.tail(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].timestamp, 4);
        assert_eq!(tail[1].timestamp, 5);

        // Asking for more than recorded returns everything
        assert_eq!(log.tail(100).len(), 5);
    }
}
