//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name                 | Description                               | Key Methods         |
// |----------------------|-------------------------------------------|---------------------|
// | CreateOrderRequest   | Request to submit an order                | into_new_order      |
// | ModifyOrderRequest   | Partial update of a resting order         |                     |
// | SubmitResponse       | Trades plus the resting residual          | from                |
// | SummaryResponse      | Aggregated book state with a wall clock   | from                |
// | TradesQuery          | Query parameters for trade read-back      |                     |
//--------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::book::{SubmitResult, Summary};
use crate::trade::TradeRecord;
use crate::types::{NewOrder, OrderType, OrderView, Side};

/// Request to submit a new order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    /// Side of the order (bid or ask)
    pub side: Side,
    /// Type of the order (limit or market)
    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Requested quantity
    pub quantity: Decimal,
    /// Limit price; required for limit orders
    pub price: Option<Decimal>,
    /// Optional client-supplied external identifier
    pub trade_id: Option<String>,
    /// Opaque client tag
    pub wage: Option<String>,
}

impl CreateOrderRequest {
    /// Converts the request into the book's submission parameters
    pub fn into_new_order(self) -> NewOrder {
        NewOrder {
            side: self.side,
            order_type: self.order_type,
            quantity: self.quantity,
            price: self.price,
            trade_id: self.trade_id,
            wage: self.wage,
        }
    }
}

/// Partial update of a resting order. Absent fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifyOrderRequest {
    /// New quantity, if changing
    pub quantity: Option<Decimal>,
    /// New limit price, if changing
    pub price: Option<Decimal>,
}

/// Response for a submission: the trades it produced and the resting residual
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Trades generated by the matching loop, in match order
    pub trades: Vec<TradeRecord>,
    /// The resting residual order, if any
    pub order: Option<OrderView>,
}

impl From<SubmitResult> for SubmitResponse {
    fn from(result: SubmitResult) -> Self {
        Self {
            trades: result.trades,
            order: result.order,
        }
    }
}

/// Response for the book summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// Highest resting bid price, if any
    pub best_bid: Option<Decimal>,
    /// Lowest resting ask price, if any
    pub best_ask: Option<Decimal>,
    /// Sum of resting bid quantities
    pub bid_volume: Decimal,
    /// Sum of resting ask quantities
    pub ask_volume: Decimal,
    /// Count of resting bids
    pub num_bids: usize,
    /// Count of resting asks
    pub num_asks: usize,
    /// Book clock at the snapshot
    pub time: u64,
    /// Wall-clock timestamp of the snapshot
    pub timestamp: DateTime<Utc>,
}

impl From<Summary> for SummaryResponse {
    fn from(summary: Summary) -> Self {
        Self {
            best_bid: summary.best_bid,
            best_ask: summary.best_ask,
            bid_volume: summary.bid_volume,
            ask_volume: summary.ask_volume,
            num_bids: summary.num_bids,
            num_asks: summary.num_asks,
            time: summary.time,
            timestamp: Utc::now(),
        }
    }
}

/// Query parameters for trade read-back
#[derive(Debug, Clone, Deserialize)]
pub struct TradesQuery {
    /// Number of most recent trades to return (default 20)
    pub limit: Option<usize>,
}
