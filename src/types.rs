//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module defines the core data types shared across the order book: the side and order-type
// enums, the resting order record, and the read-only order view returned across the boundary.
//
// | Section            | Description                                                      |
// |--------------------|------------------------------------------------------------------|
// | ENUMS              | Discrete value sets (Side, OrderType).                           |
// | STRUCTS            | Order, NewOrder and OrderView records.                           |
// | TESTS              | Unit tests for the defined types.                                |
//--------------------------------------------------------------------------------------------------

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

//--------------------------------------------------------------------------------------------------
//  ENUMS
//--------------------------------------------------------------------------------------------------
// | Name          | Description                                 |
// |---------------|---------------------------------------------|
// | Side          | Side of an order (bid/ask).                 |
// | OrderType     | Matching behavior of an order (limit/market)|
//--------------------------------------------------------------------------------------------------

/// Represents the side of an order.
///
/// Serialized in lowercase (`"bid"` / `"ask"`) to match the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// A buy order.
    Bid,
    /// A sell order.
    Ask,
}

impl Side {
    /// Returns the side an incoming order matches against.
    #[inline]
    pub fn opposite(&self) -> Side {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => write!(f, "bid"),
            Side::Ask => write!(f, "ask"),
        }
    }
}

/// Represents the type of an order, influencing its matching behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// An order that executes at a specific price or better and may rest in the book.
    Limit,
    /// An order that executes immediately against the best available prices and never rests.
    Market,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Limit => write!(f, "limit"),
            OrderType::Market => write!(f, "market"),
        }
    }
}

//--------------------------------------------------------------------------------------------------
//  STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name          | Description                                       |
// |---------------|---------------------------------------------------|
// | NewOrder      | Parameters of an order submission.                |
// | Order         | A resting order owned by one side of the book.    |
// | OrderView     | Read-only snapshot of an order.                   |
//--------------------------------------------------------------------------------------------------

/// Parameters of an order submission, before the book assigns an id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    /// Side of the order (bid or ask).
    pub side: Side,
    /// Type of the order (limit or market).
    pub order_type: OrderType,
    /// Requested quantity. Must be strictly positive.
    pub quantity: Decimal,
    /// Limit price. Required for limit orders, forbidden for market orders.
    pub price: Option<Decimal>,
    /// Optional client-supplied external identifier.
    pub trade_id: Option<String>,
    /// Opaque client tag, carried through unmodified.
    pub wage: Option<String>,
}

/// A resting order. The node of a per-price FIFO queue.
///
/// `(side, order_id)` uniquely identifies an order within the book for its entire
/// resting lifetime; the id never changes. Quantity, price and timestamp are mutated
/// only by the containing side structures.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    /// Identifier assigned by the book at admission. Immutable.
    pub order_id: u64,
    /// Side of the order.
    pub side: Side,
    /// Remaining quantity. Strictly positive while resting.
    pub quantity: Decimal,
    /// Resting limit price.
    pub price: Decimal,
    /// Book clock at admission, repricing or quantity increase.
    pub timestamp: u64,
    /// External identifier: client-supplied, or the order id rendered as a string.
    pub trade_id: String,
    /// Opaque client tag.
    pub wage: Option<String>,
}

/// Read-only snapshot of an order as exposed across the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    /// Identifier assigned by the book.
    pub order_id: u64,
    /// Side of the order.
    pub side: Side,
    /// Remaining quantity.
    pub quantity: Decimal,
    /// Resting limit price.
    pub price: Decimal,
    /// Book clock at admission or last priority-losing update.
    pub timestamp: u64,
    /// External identifier.
    pub trade_id: String,
    /// Opaque client tag.
    pub wage: Option<String>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id,
            side: order.side,
            quantity: order.quantity,
            price: order.price,
            timestamp: order.timestamp,
            trade_id: order.trade_id.clone(),
            wage: order.wage.clone(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
//  TESTS
//--------------------------------------------------------------------------------------------------
// | Name                       | Description                                      |
// |----------------------------|--------------------------------------------------|
// | test_side_serde            | Sides serialize lowercase and round-trip.        |
// | test_order_type_serde      | Order types serialize lowercase and round-trip.  |
// | test_side_opposite         | Opposite side resolution.                        |
// | test_order_view_from_order | View reflects the order fields.                  |
//--------------------------------------------------------------------------------------------------
