//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements the order book orchestrator: it owns both sides, the logical clock
// and the order id allocator, runs the matching loop for incoming orders, and publishes every
// executed trade to the configured sink.
//
// | Component     | Description                                                               |
// |---------------|---------------------------------------------------------------------------|
// | OrderBook     | Bid and ask trees + clock + id allocator + trade sink                     |
// | SubmitResult  | Trades produced by a submission plus the resting residual, if any         |
// | Summary       | Aggregated top-of-book view                                               |
// | BookError     | Validation and lookup failures                                            |
//
//--------------------------------------------------------------------------------------------------
// FUNCTIONS
//--------------------------------------------------------------------------------------------------
// | Name                  | Description                                | Return Type             |
// |-----------------------|--------------------------------------------|-------------------------|
// | submit                | Match an incoming order, rest the residual | BookResult<SubmitResult>|
// | modify                | Change quantity and/or price of an order   | BookResult<OrderView>   |
// | cancel                | Remove a resting order                     | BookResult<()>          |
// | get                   | Look up one order                          | BookResult<OrderView>   |
// | list                  | All orders of a side in priority order     | Vec<OrderView>          |
// | summary               | Aggregated book state                      | Summary                 |
//--------------------------------------------------------------------------------------------------

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::orderbook::OrderTree;
use crate::trade::{TradeLog, TradeParty, TradeRecord, TradeSink};
use crate::types::{NewOrder, Order, OrderType, OrderView, Side};

const DEFAULT_MARKET: &str = "UNKNOWN/PAIR";

/// Errors surfaced by book operations.
///
/// Every failure is detected before the clock is advanced or any structure is touched,
/// so a failed operation has no side effect.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookError {
    /// The quantity is missing, non-positive or otherwise invalid.
    #[error("order quantity must be positive, got {0}")]
    Quantity(Decimal),

    /// The side/type combination is malformed: a limit order without a positive price,
    /// or a market order carrying one.
    #[error("{0}")]
    OrderType(String),

    /// No order with this id currently rests on the named side.
    #[error("order with id {order_id} and side {side} not found")]
    OrderNotFound { side: Side, order_id: u64 },
}

/// Type alias for Result with BookError
pub type BookResult<T> = Result<T, BookError>;

/// The outcome of a submission: the trades it produced, in match order, and a view of
/// the residual resting order (`None` for market orders and fully filled limits).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitResult {
    /// Trades generated by the matching loop.
    pub trades: Vec<TradeRecord>,
    /// The resting residual, if any.
    pub order: Option<OrderView>,
}

/// Aggregated top-of-book state, served from maintained aggregates without a scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Highest resting bid price, if any.
    pub best_bid: Option<Decimal>,
    /// Lowest resting ask price, if any.
    pub best_ask: Option<Decimal>,
    /// Sum of resting bid quantities.
    pub bid_volume: Decimal,
    /// Sum of resting ask quantities.
    pub ask_volume: Decimal,
    /// Count of resting bids.
    pub num_bids: usize,
    /// Count of resting asks.
    pub num_asks: usize,
    /// Current book clock.
    pub time: u64,
}

/// A limit order book for a single instrument.
///
/// All mutation enters through `submit`, `modify` and `cancel`. Each successful
/// operation advances the logical clock by exactly one, so every admitted order and
/// every trade carries a well-defined monotonic timestamp. Order ids strictly increase
/// across the book's lifetime and are never reused, even across sides.
#[derive(Debug)]
pub struct OrderBook<S: TradeSink = TradeLog> {
    /// Resting buy orders.
    bids: OrderTree,
    /// Resting sell orders.
    asks: OrderTree,
    /// Logical clock, advanced once per successful operation.
    time: u64,
    /// Last allocated order id.
    next_order_id: u64,
    /// Market label, e.g. "BTC/USD".
    market: String,
    /// Destination of every executed trade.
    sink: S,
}

impl OrderBook {
    /// Creates an empty book with the default trade log.
    pub fn new() -> Self {
        Self::with_sink(DEFAULT_MARKET, TradeLog::new())
    }

    /// Creates an empty book for a named market with the default trade log.
    pub fn with_market(market: impl Into<String>) -> Self {
        Self::with_sink(market, TradeLog::new())
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TradeSink> OrderBook<S> {
    /// Creates an empty book emitting trades into the given sink.
    pub fn with_sink(market: impl Into<String>, sink: S) -> Self {
        Self {
            bids: OrderTree::new(Side::Bid),
            asks: OrderTree::new(Side::Ask),
            time: 0,
            next_order_id: 0,
            market: market.into(),
            sink,
        }
    }

    /// The market label this book trades.
    pub fn market(&self) -> &str {
        &self.market
    }

    /// Current value of the logical clock.
    pub fn time(&self) -> u64 {
        self.time
    }

    /// The bid side.
    pub fn bids(&self) -> &OrderTree {
        &self.bids
    }

    /// The ask side.
    pub fn asks(&self) -> &OrderTree {
        &self.asks
    }

    /// The trade sink, for read-back on sinks that support it.
    pub fn trades(&self) -> &S {
        &self.sink
    }

    /// Submits an order: matches it against the opposite side, emits the resulting
    /// trades to the sink, and rests any limit residual on the order's own side.
    ///
    /// A market order submitted against an empty opposite side produces no trades and
    /// no residual; this is not an error. A market residual that outlives the opposite
    /// side's depth is discarded.
    pub fn submit(&mut self, new_order: NewOrder) -> BookResult<SubmitResult> {
        let NewOrder {
            side,
            order_type,
            quantity,
            price,
            trade_id,
            wage,
        } = new_order;

        if quantity <= Decimal::ZERO {
            return Err(BookError::Quantity(quantity));
        }
        let limit_price = match order_type {
            OrderType::Limit => match price {
                Some(limit) if limit > Decimal::ZERO => Some(limit),
                Some(limit) => {
                    return Err(BookError::OrderType(format!(
                        "limit price must be positive, got {limit}"
                    )))
                }
                None => {
                    return Err(BookError::OrderType(
                        "price is required for limit orders".to_string(),
                    ))
                }
            },
            OrderType::Market => {
                if price.is_some() {
                    return Err(BookError::OrderType(
                        "market orders must not carry a price".to_string(),
                    ));
                }
                None
            }
        };

        // Validation passed: tick the clock and admit the order.
        self.time += 1;
        self.next_order_id += 1;
        let order_id = self.next_order_id;
        let timestamp = self.time;
        let trade_id = trade_id.unwrap_or_else(|| order_id.to_string());

        let mut remaining = quantity;
        let mut trades = Vec::new();

        while remaining > Decimal::ZERO {
            let opposite = match side {
                Side::Bid => &mut self.asks,
                Side::Ask => &mut self.bids,
            };
            let Some(best) = opposite.best_price() else {
                break;
            };
            if let Some(limit) = limit_price {
                let crosses = match side {
                    Side::Bid => limit >= best,
                    Side::Ask => limit <= best,
                };
                if !crosses {
                    break;
                }
            }
            let Some(fill) = opposite.fill_best(remaining) else {
                break;
            };

            remaining -= fill.quantity;
            let trade = TradeRecord::new(
                timestamp,
                fill.price,
                fill.quantity,
                TradeParty {
                    trade_id: fill.trade_id,
                    side: side.opposite(),
                    order_id: fill.order_id,
                    new_book_quantity: fill.remaining,
                    wage: fill.wage,
                },
                TradeParty {
                    trade_id: trade_id.clone(),
                    side,
                    order_id,
                    new_book_quantity: None,
                    wage: wage.clone(),
                },
            );
            debug!(
                market = %self.market,
                price = %trade.price,
                quantity = %trade.quantity,
                maker = trade.party1.order_id,
                taker = order_id,
                "trade executed"
            );
            self.sink.append(trade.clone());
            trades.push(trade);
        }

        let order = match limit_price {
            Some(limit) if remaining > Decimal::ZERO => {
                let order = Order {
                    order_id,
                    side,
                    quantity: remaining,
                    price: limit,
                    timestamp,
                    trade_id,
                    wage,
                };
                let view = OrderView::from(&order);
                self.tree_mut(side).insert(order);
                Some(view)
            }
            _ => {
                // Market residual never rests; whatever the depth could not fill is dropped.
                if remaining > Decimal::ZERO && order_type == OrderType::Market {
                    debug!(market = %self.market, %remaining, "market order residual discarded");
                }
                None
            }
        };

        Ok(SubmitResult { trades, order })
    }

    /// Modifies a resting order's quantity and/or price.
    ///
    /// A price change or quantity increase sends the order to the tail of its
    /// (possibly new) price level with a fresh timestamp; a quantity decrease keeps
    /// position and timestamp. A modify never crosses the book: cancel and resubmit
    /// to change aggression.
    pub fn modify(
        &mut self,
        side: Side,
        order_id: u64,
        new_quantity: Option<Decimal>,
        new_price: Option<Decimal>,
    ) -> BookResult<OrderView> {
        if let Some(quantity) = new_quantity {
            if quantity <= Decimal::ZERO {
                return Err(BookError::Quantity(quantity));
            }
        }
        if let Some(price) = new_price {
            if price <= Decimal::ZERO {
                return Err(BookError::OrderType(format!(
                    "limit price must be positive, got {price}"
                )));
            }
        }
        if !self.tree(side).contains(order_id) {
            return Err(BookError::OrderNotFound { side, order_id });
        }

        self.time += 1;
        let timestamp = self.time;
        let order = self
            .tree_mut(side)
            .update(order_id, new_quantity, new_price, timestamp)
            .expect("a just-checked order must be updatable");
        Ok(OrderView::from(order))
    }

    /// Removes a resting order. No trade is emitted.
    pub fn cancel(&mut self, side: Side, order_id: u64) -> BookResult<()> {
        if !self.tree(side).contains(order_id) {
            return Err(BookError::OrderNotFound { side, order_id });
        }

        self.time += 1;
        self.tree_mut(side).remove_by_id(order_id);
        debug!(market = %self.market, %side, order_id, "order cancelled");
        Ok(())
    }

    /// Looks up one resting order.
    pub fn get(&self, side: Side, order_id: u64) -> BookResult<OrderView> {
        self.tree(side)
            .get(order_id)
            .map(OrderView::from)
            .ok_or(BookError::OrderNotFound { side, order_id })
    }

    /// All resting orders of a side in priority order: best price first, FIFO within
    /// each price level.
    pub fn list(&self, side: Side) -> Vec<OrderView> {
        self.tree(side).iter().map(OrderView::from).collect()
    }

    /// Aggregated book state.
    pub fn summary(&self) -> Summary {
        Summary {
            best_bid: self.bids.best_price(),
            best_ask: self.asks.best_price(),
            bid_volume: self.bids.volume(),
            ask_volume: self.asks.volume(),
            num_bids: self.bids.num_orders(),
            num_asks: self.asks.num_orders(),
            time: self.time,
        }
    }

    fn tree(&self, side: Side) -> &OrderTree {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    fn tree_mut(&mut self, side: Side) -> &mut OrderTree {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// TESTS
//--------------------------------------------------------------------------------------------------
// | Name                                   | Description                                         |
// |----------------------------------------|-----------------------------------------------------|
// | test_pure_rest                         | Non-crossing limits rest on their sides             |
// | test_immediate_cross_partial_maker     | Crossing ask partially consumes the resting bid     |
// | test_market_sweep_levels               | Market order walks levels best-price-first          |
// | test_fifo_within_level                 | Earlier admission fills first at equal price        |
// | test_modify_up_loses_priority          | Quantity increase moves behind the level peers      |
// | test_modify_price_moves_level          | Reprice collapses the old level                     |
// | test_cancel_unknown                    | Missing id fails without touching book or clock     |
// | test_validation_failures               | Bad submissions fail with no side effect            |
// | test_market_on_empty_book              | No liquidity means no trades and no error           |
// | test_order_ids_increase_across_sides   | Id allocator is global to the book                  |
// | test_trades_share_submit_timestamp     | One submission stamps all its trades alike          |
// | test_custom_sink_receives_trades       | Trades flow through a caller-provided sink          |
// | test_taker_identity_passthrough        | trade_id defaults and wage carries through          |
//--------------------------------------------------------------------------------------------------
