//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements one side of a limit order book for a single trading instrument.
// Orders are held in price-time priority: a sorted price map yields the best price level in
// logarithmic time, and a FIFO queue at each level yields the oldest order first.
//
// | Component     | Description                                                               |
// |---------------|---------------------------------------------------------------------------|
// | OrderNode     | Arena slot wrapping an Order with doubly-linked queue pointers            |
// | OrderList     | FIFO queue of orders at one price level                                   |
// | OrderTree     | One side of the book: price map + id index + aggregates                   |
//
// Orders live in a slab arena owned by the OrderTree; the queues link slab keys rather than
// pointers, so removal anywhere in a queue is O(1) once the id index resolves the key.
//
//--------------------------------------------------------------------------------------------------
// STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name          | Description                                        | Key Methods              |
// |---------------|----------------------------------------------------|--------------------------|
// | OrderNode     | Arena slot with prev/next links                    | new                      |
// | OrderList     | Orders at a specific price, FIFO                   | push_back                |
// |               |                                                    | remove                   |
// |               |                                                    | move_to_tail             |
// | OrderTree     | One side of the book                               | insert                   |
// |               |                                                    | remove_by_id             |
// |               |                                                    | fill_best                |
// |               |                                                    | update                   |
// |               |                                                    | best_price, iter         |
//--------------------------------------------------------------------------------------------------

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use slab::Slab;

use crate::types::{Order, Side};

/// An arena slot holding an order plus the linked-list pointers of its price level queue.
///
/// The pointers are slab keys, not references; `None` marks the head (`prev`) or the
/// tail (`next`) of the queue.
#[derive(Debug, Clone)]
pub struct OrderNode {
    /// The order data.
    pub order: Order,
    /// Next (newer) order in the price level queue.
    pub next: Option<usize>,
    /// Previous (older) order in the price level queue.
    pub prev: Option<usize>,
}

impl OrderNode {
    /// Creates an unlinked node.
    #[inline]
    fn new(order: Order) -> Self {
        Self {
            order,
            next: None,
            prev: None,
        }
    }
}

/// The portion of a resting order consumed by one match.
///
/// `remaining` is the maker's residual quantity still on the book, or `None` when the
/// maker was fully consumed and removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    /// Id of the resting (maker) order.
    pub order_id: u64,
    /// External identifier of the maker.
    pub trade_id: String,
    /// Opaque tag of the maker.
    pub wage: Option<String>,
    /// Price of the maker's level; the price the trade executes at.
    pub price: Decimal,
    /// Quantity crossed in this match. Strictly positive.
    pub quantity: Decimal,
    /// Maker residual after the match, `None` if fully consumed.
    pub remaining: Option<Decimal>,
}

/// A FIFO queue of orders at one price level.
///
/// Every member has the same price. The head is the oldest still-resting order and is
/// consumed first when the level is matched. An empty OrderList must not remain inside
/// an OrderTree: removing the last member removes the price level.
#[derive(Debug, Clone)]
pub struct OrderList {
    /// The price shared by every member.
    pub price: Decimal,
    /// Sum of member quantities.
    pub volume: Decimal,
    /// Number of members.
    pub length: usize,
    /// Oldest order (slab key). Matched first.
    head: Option<usize>,
    /// Newest order (slab key). Appends attach here.
    tail: Option<usize>,
}

impl OrderList {
    /// Creates an empty price level.
    fn new(price: Decimal) -> Self {
        Self {
            price,
            volume: Decimal::ZERO,
            length: 0,
            head: None,
            tail: None,
        }
    }

    /// Returns true if this price level has no orders.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the slab key of the oldest order, if any.
    #[inline]
    pub fn head(&self) -> Option<usize> {
        self.head
    }

    /// Attaches an order at the tail of the queue and updates the aggregates.
    ///
    /// The node must already live in the slab and must not be linked anywhere.
    fn push_back(&mut self, key: usize, slab: &mut Slab<OrderNode>) {
        debug_assert_eq!(slab[key].order.price, self.price);
        let quantity = slab[key].order.quantity;
        self.attach_tail(key, slab);
        self.length += 1;
        self.volume += quantity;
    }

    /// Unlinks an order from the queue and updates the aggregates.
    ///
    /// The key must refer to a current member; anything else is a programming error.
    fn remove(&mut self, key: usize, slab: &mut Slab<OrderNode>) {
        let quantity = slab[key].order.quantity;
        self.unlink(key, slab);
        self.length -= 1;
        self.volume -= quantity;
    }

    /// Unlinks an order and re-appends it at the tail, losing its time priority.
    ///
    /// Volume and length are unchanged.
    fn move_to_tail(&mut self, key: usize, slab: &mut Slab<OrderNode>) {
        if self.tail == Some(key) {
            return;
        }
        self.unlink(key, slab);
        self.attach_tail(key, slab);
    }

    /// Links a node at the tail without touching the aggregates.
    fn attach_tail(&mut self, key: usize, slab: &mut Slab<OrderNode>) {
        slab[key].prev = self.tail;
        slab[key].next = None;

        match self.tail {
            Some(tail_key) => slab[tail_key].next = Some(key),
            None => self.head = Some(key),
        }
        self.tail = Some(key);
    }

    /// Relinks the neighbors around a node and clears its pointers, without touching
    /// the aggregates.
    fn unlink(&mut self, key: usize, slab: &mut Slab<OrderNode>) {
        let prev = slab[key].prev;
        let next = slab[key].next;

        match prev {
            Some(prev_key) => slab[prev_key].next = next,
            None => self.head = next,
        }
        match next {
            Some(next_key) => slab[next_key].prev = prev,
            None => self.tail = prev,
        }

        slab[key].prev = None;
        slab[key].next = None;
    }
}

/// One side of the book: a price-sorted map of FIFO levels plus an id index.
///
/// Two associations are kept in agreement: price -> OrderList for matching in price
/// order, and order id -> slab key for constant-time lookup and removal. The `volume`
/// and `num_orders` aggregates always equal the sums over every resting order.
#[derive(Debug)]
pub struct OrderTree {
    /// The side every member of this tree belongs to.
    side: Side,
    /// Arena holding every resting order of this side.
    slab: Slab<OrderNode>,
    /// Price levels in ascending key order.
    price_map: BTreeMap<Decimal, OrderList>,
    /// Order id to slab key.
    id_index: HashMap<u64, usize>,
    /// Sum of all resting quantities on this side.
    volume: Decimal,
    /// Count of resting orders on this side.
    num_orders: usize,
}

impl OrderTree {
    /// Creates an empty side.
    pub fn new(side: Side) -> Self {
        Self {
            side,
            slab: Slab::new(),
            price_map: BTreeMap::new(),
            id_index: HashMap::new(),
            volume: Decimal::ZERO,
            num_orders: 0,
        }
    }

    /// The side this tree holds.
    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Sum of all resting quantities.
    #[inline]
    pub fn volume(&self) -> Decimal {
        self.volume
    }

    /// Number of resting orders.
    #[inline]
    pub fn num_orders(&self) -> usize {
        self.num_orders
    }

    /// Number of occupied price levels.
    #[inline]
    pub fn depth(&self) -> usize {
        self.price_map.len()
    }

    /// Returns true if no orders rest on this side.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_orders == 0
    }

    /// Returns true if the given order id currently rests on this side.
    #[inline]
    pub fn contains(&self, order_id: u64) -> bool {
        self.id_index.contains_key(&order_id)
    }

    /// Looks up an order by id in constant time.
    pub fn get(&self, order_id: u64) -> Option<&Order> {
        let key = *self.id_index.get(&order_id)?;
        Some(&self.slab[key].order)
    }

    /// The best resting price: the maximum for bids, the minimum for asks.
    pub fn best_price(&self) -> Option<Decimal> {
        match self.side {
            Side::Bid => self.price_map.keys().next_back().copied(),
            Side::Ask => self.price_map.keys().next().copied(),
        }
    }

    /// Total volume resting at a specific price, if the level exists.
    pub fn volume_at_price(&self, price: Decimal) -> Option<Decimal> {
        self.price_map.get(&price).map(|level| level.volume)
    }

    /// Number of orders resting at a specific price.
    pub fn order_count_at_price(&self, price: Decimal) -> usize {
        self.price_map.get(&price).map_or(0, |level| level.length)
    }

    /// Inserts an order: locates or creates its price level, appends at the tail and
    /// updates the id index and aggregates.
    pub fn insert(&mut self, order: Order) {
        debug_assert_eq!(order.side, self.side);
        debug_assert!(
            !self.id_index.contains_key(&order.order_id),
            "order id {} already rests on this side",
            order.order_id
        );

        let price = order.price;
        let order_id = order.order_id;
        let quantity = order.quantity;

        let key = self.slab.insert(OrderNode::new(order));
        let level = self
            .price_map
            .entry(price)
            .or_insert_with(|| OrderList::new(price));
        level.push_back(key, &mut self.slab);

        self.id_index.insert(order_id, key);
        self.num_orders += 1;
        self.volume += quantity;
    }

    /// Removes an order by id, collapsing its price level if it becomes empty.
    ///
    /// Returns the removed order, or `None` if the id does not rest here.
    pub fn remove_by_id(&mut self, order_id: u64) -> Option<Order> {
        let key = *self.id_index.get(&order_id)?;
        Some(self.remove_key(key))
    }

    /// Consumes up to `take` from the head order at the best price.
    ///
    /// A partial fill reduces the head quantity in place; a full fill removes the head
    /// and, if it was the last member, its price level. Aggregates are adjusted by the
    /// crossed amount. Returns `None` when the side is empty.
    pub fn fill_best(&mut self, take: Decimal) -> Option<Fill> {
        let price = self.best_price()?;
        let level = self
            .price_map
            .get(&price)
            .expect("best price must have a level");
        let head_key = level.head.expect("price level in the map must be non-empty");

        let available = self.slab[head_key].order.quantity;
        if take < available {
            let node = &mut self.slab[head_key];
            node.order.quantity -= take;
            let fill = Fill {
                order_id: node.order.order_id,
                trade_id: node.order.trade_id.clone(),
                wage: node.order.wage.clone(),
                price,
                quantity: take,
                remaining: Some(node.order.quantity),
            };

            let level = self
                .price_map
                .get_mut(&price)
                .expect("best price must have a level");
            level.volume -= take;
            self.volume -= take;
            Some(fill)
        } else {
            let order = self.remove_key(head_key);
            Some(Fill {
                order_id: order.order_id,
                trade_id: order.trade_id,
                wage: order.wage,
                price,
                quantity: available,
                remaining: None,
            })
        }
    }

    /// Applies a modification to a resting order.
    ///
    /// A price change removes and reinserts the order at the tail of its new level with
    /// the given timestamp. A quantity increase re-stamps the order and moves it to the
    /// tail of its level. A quantity decrease adjusts the aggregates in place, keeping
    /// both position and timestamp. Returns the updated order, or `None` if the id does
    /// not rest here.
    pub fn update(
        &mut self,
        order_id: u64,
        new_quantity: Option<Decimal>,
        new_price: Option<Decimal>,
        timestamp: u64,
    ) -> Option<&Order> {
        let key = *self.id_index.get(&order_id)?;
        let current_price = self.slab[key].order.price;

        match new_price {
            Some(price) if price != current_price => {
                let mut order = self.remove_key(key);
                order.price = price;
                if let Some(quantity) = new_quantity {
                    order.quantity = quantity;
                }
                order.timestamp = timestamp;
                self.insert(order);

                let key = self.id_index[&order_id];
                Some(&self.slab[key].order)
            }
            _ => {
                if let Some(quantity) = new_quantity {
                    let current = self.slab[key].order.quantity;
                    if quantity > current {
                        let delta = quantity - current;
                        {
                            let node = &mut self.slab[key];
                            node.order.quantity = quantity;
                            node.order.timestamp = timestamp;
                        }
                        let level = self
                            .price_map
                            .get_mut(&current_price)
                            .expect("indexed order must have a price level");
                        level.volume += delta;
                        level.move_to_tail(key, &mut self.slab);
                        self.volume += delta;
                    } else if quantity < current {
                        let delta = current - quantity;
                        self.slab[key].order.quantity = quantity;
                        let level = self
                            .price_map
                            .get_mut(&current_price)
                            .expect("indexed order must have a price level");
                        level.volume -= delta;
                        self.volume -= delta;
                    }
                }
                Some(&self.slab[key].order)
            }
        }
    }

    /// Iterates every resting order in priority order: best price level first
    /// (descending prices for bids, ascending for asks), FIFO within each level.
    pub fn iter(&self) -> TreeIter<'_> {
        let levels: Vec<&OrderList> = match self.side {
            Side::Bid => self.price_map.values().rev().collect(),
            Side::Ask => self.price_map.values().collect(),
        };
        TreeIter {
            slab: &self.slab,
            levels: levels.into_iter(),
            current: None,
        }
    }

    /// Removes an order by slab key and collapses its price level if emptied.
    fn remove_key(&mut self, key: usize) -> Order {
        let price = self.slab[key].order.price;
        let level = self
            .price_map
            .get_mut(&price)
            .expect("indexed order must have a price level");
        level.remove(key, &mut self.slab);
        if level.is_empty() {
            self.price_map.remove(&price);
        }

        let node = self.slab.remove(key);
        self.id_index.remove(&node.order.order_id);
        self.num_orders -= 1;
        self.volume -= node.order.quantity;
        node.order
    }
}

/// Iterator over one side of the book in priority order.
pub struct TreeIter<'a> {
    slab: &'a Slab<OrderNode>,
    levels: std::vec::IntoIter<&'a OrderList>,
    current: Option<usize>,
}

impl<'a> Iterator for TreeIter<'a> {
    type Item = &'a Order;

    fn next(&mut self) -> Option<&'a Order> {
        loop {
            if let Some(key) = self.current {
                let node = &self.slab[key];
                self.current = node.next;
                return Some(&node.order);
            }
            self.current = self.levels.next()?.head;
        }
    }
}

//--------------------------------------------------------------------------------------------------
// TESTS
//--------------------------------------------------------------------------------------------------
// | Name                              | Description                                              |
// |-----------------------------------|----------------------------------------------------------|
// | test_empty_tree                   | Verifies initial empty state                             |
// | test_insert_single                | Single order insertion and aggregates                    |
// | test_insert_same_price_fifo       | FIFO chain at one price level                            |
// | test_best_price_per_side          | Max for bids, min for asks                               |
// | test_remove_by_id                 | Removal updates aggregates and collapses levels          |
// | test_remove_middle_keeps_links    | Queue stays linked after removing a middle member        |
// | test_fill_best_partial            | Partial fill reduces the head in place                   |
// | test_fill_best_consumes_levels    | Full fills walk heads and levels in priority order       |
// | test_update_quantity_down         | Decrease keeps position and timestamp                    |
// | test_update_quantity_up           | Increase moves to tail and re-stamps                     |
// | test_update_price                 | Reprice moves the order to a new level                   |
// | test_iter_priority_order          | Iteration order per side                                 |
//--------------------------------------------------------------------------------------------------
