use crate::types::*;
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, trace, warn};

/// Single-instrument limit order book with midpoint matching
/// - Bids kept best-first (descending price), asks best-first (ascending)
/// - Equal prices keep arrival order (price-time priority)
/// - `place` only rests orders; crossing is resolved by `match_orders`
#[derive(Debug, Clone)]
pub struct OrderBook {
    bids: VecDeque<Order>,
    asks: VecDeque<Order>,

    /// Last fair price, moved only by a match that produced trades
    reference_price: Price,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::with_reference_price(DEFAULT_REFERENCE_PRICE)
    }

    pub fn with_reference_price(reference_price: Price) -> Self {
        Self {
            bids: VecDeque::new(),
            asks: VecDeque::new(),
            reference_price,
        }
    }

    /// Rest an order on its side of the book. Never trades.
    ///
    /// Orders with a non-finite price, or a size that is not a finite
    /// positive number, are discarded.
    pub fn place(&mut self, order: Order) {
        if !order.price.is_finite() {
            warn!(price = order.price, size = order.size, side = %order.side, "ignoring order with non-finite price");
            return;
        }
        if !(order.size.is_finite() && order.size > 0.0) {
            warn!(price = order.price, size = order.size, side = %order.side, "ignoring order with non-positive size");
            return;
        }

        trace!(price = order.price, size = order.size, side = %order.side, "place");
        match order.side {
            Side::Buy => self.add_to_bids(order),
            Side::Sell => self.add_to_asks(order),
        }
    }

    /// Match crossing orders until the book is no longer crossed.
    ///
    /// Each trade prints at the midpoint of the two crossing prices for the
    /// smaller of the two sizes. When at least one trade happens the
    /// reference price becomes the mean trade price of this call.
    pub fn match_orders(&mut self) -> Vec<Trade> {
        let mut trades = Vec::new();

        while let (Some(bid), Some(ask)) = (self.bids.front_mut(), self.asks.front_mut()) {
            if bid.price < ask.price {
                break;
            }

            let trade = Trade {
                price: (bid.price + ask.price) / 2.0,
                size: bid.size.min(ask.size),
            };
            bid.size -= trade.size;
            ask.size -= trade.size;
            trace!(price = trade.price, size = trade.size, "trade");

            // The smaller side always lands on exactly 0.0
            let bid_filled = bid.is_filled();
            let ask_filled = ask.is_filled();
            if bid_filled {
                self.bids.pop_front();
            }
            if ask_filled {
                self.asks.pop_front();
            }

            trades.push(trade);
        }

        if !trades.is_empty() {
            let total: Price = trades.iter().map(|t| t.price).sum();
            self.reference_price = total / trades.len() as f64;
            debug!(trades = trades.len(), reference_price = self.reference_price, "reference price updated");
        }

        trades
    }

    #[inline]
    pub fn reference_price(&self) -> Price {
        self.reference_price
    }

    #[inline]
    pub fn best_bid(&self) -> Option<&Order> {
        self.bids.front()
    }

    #[inline]
    pub fn best_ask(&self) -> Option<&Order> {
        self.asks.front()
    }

    /// Resting bids, best first
    pub fn bids(&self) -> impl Iterator<Item = &Order> {
        self.bids.iter()
    }

    /// Resting asks, best first
    pub fn asks(&self) -> impl Iterator<Item = &Order> {
        self.asks.iter()
    }

    pub fn bid_depth(&self) -> usize {
        self.bids.len()
    }

    pub fn ask_depth(&self) -> usize {
        self.asks.len()
    }

    /// Best ask minus best bid, if both sides have orders
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.price - bid.price),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    // === Private methods ===

    fn add_to_bids(&mut self, order: Order) {
        // Insert after every bid at the same or a better price (descending)
        let pos = self
            .bids
            .iter()
            .position(|o| o.price < order.price)
            .unwrap_or(self.bids.len());
        self.bids.insert(pos, order);
    }

    fn add_to_asks(&mut self, order: Order) {
        // Insert after every ask at the same or a better price (ascending)
        let pos = self
            .asks
            .iter()
            .position(|o| o.price > order.price)
            .unwrap_or(self.asks.len());
        self.asks.insert(pos, order);
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<OrderBook reference_price={} bids=[", self.reference_price)?;
        write_side(f, &self.bids)?;
        write!(f, "] asks=[")?;
        write_side(f, &self.asks)?;
        write!(f, "]>")
    }
}

fn write_side(f: &mut fmt::Formatter<'_>, orders: &VecDeque<Order>) -> fmt::Result {
    for (i, order) in orders.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", order)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn prices<'a>(orders: impl Iterator<Item = &'a Order>) -> Vec<Price> {
        orders.map(|o| o.price).collect()
    }

    fn total_size(book: &OrderBook) -> Size {
        book.bids().chain(book.asks()).map(|o| o.size).sum()
    }

    fn assert_sorted(book: &OrderBook) {
        let bids = prices(book.bids());
        let asks = prices(book.asks());
        assert!(bids.windows(2).all(|w| w[0] >= w[1]), "bids out of order: {:?}", bids);
        assert!(asks.windows(2).all(|w| w[0] <= w[1]), "asks out of order: {:?}", asks);
    }

    fn assert_not_crossed(book: &OrderBook) {
        if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
            assert!(bid.price < ask.price, "crossed at rest: {} >= {}", bid.price, ask.price);
        }
    }

    #[test]
    fn test_empty_orderbook() {
        let mut book = OrderBook::new();
        assert!(book.is_empty());
        assert!(book.best_bid().is_none());
        assert!(book.best_ask().is_none());
        assert_eq!(book.spread(), None);
        assert_eq!(book.reference_price(), 100.0);
        assert!(book.match_orders().is_empty());
        assert_eq!(book.reference_price(), 100.0);
    }

    #[test]
    fn test_add_buy_order() {
        let mut book = OrderBook::new();
        book.place(Order::new(99.5, 10.0, Side::Buy));

        assert_eq!(book.best_bid(), Some(&Order::new(99.5, 10.0, Side::Buy)));
        assert!(book.best_ask().is_none());
        assert_eq!(book.bid_depth(), 1);
    }

    #[test]
    fn test_add_sell_order() {
        let mut book = OrderBook::new();
        book.place(Order::new(100.5, 10.0, Side::Sell));

        assert!(book.best_bid().is_none());
        assert_eq!(book.best_ask().map(|o| o.price), Some(100.5));
        assert_eq!(book.ask_depth(), 1);
    }

    #[test]
    fn test_bids_resorted_on_place() {
        let mut book = OrderBook::new();
        book.place(Order::new(100.0, 5.0, Side::Buy));
        book.place(Order::new(102.0, 5.0, Side::Buy));

        assert_eq!(prices(book.bids()), vec![102.0, 100.0]);
    }

    #[test]
    fn test_best_ask_is_lowest() {
        let mut book = OrderBook::new();
        book.place(Order::new(102.0, 1.0, Side::Sell));
        book.place(Order::new(101.0, 1.0, Side::Sell));
        book.place(Order::new(103.0, 1.0, Side::Sell));

        assert_eq!(prices(book.asks()), vec![101.0, 102.0, 103.0]);
        assert_eq!(book.spread(), None);
    }

    #[test]
    fn test_same_price_keeps_arrival_order() {
        let mut book = OrderBook::new();
        book.place(Order::new(100.0, 1.0, Side::Buy));
        book.place(Order::new(100.0, 2.0, Side::Buy));
        book.place(Order::new(101.0, 3.0, Side::Buy));
        book.place(Order::new(100.0, 4.0, Side::Buy));

        let sizes: Vec<Size> = book.bids().map(|o| o.size).collect();
        assert_eq!(sizes, vec![3.0, 1.0, 2.0, 4.0]);

        book.place(Order::new(105.0, 1.0, Side::Sell));
        book.place(Order::new(105.0, 2.0, Side::Sell));
        let sizes: Vec<Size> = book.asks().map(|o| o.size).collect();
        assert_eq!(sizes, vec![1.0, 2.0]);
    }

    #[test]
    fn test_place_ignores_non_positive_size() {
        let mut book = OrderBook::new();
        book.place(Order::new(101.0, 0.0, Side::Buy));
        book.place(Order::new(99.0, -5.0, Side::Sell));
        book.place(Order::new(99.0, f64::NAN, Side::Sell));

        assert!(book.is_empty());
        assert!(book.match_orders().is_empty());
    }

    #[test]
    fn test_place_ignores_non_finite_price() {
        let mut book = OrderBook::new();
        book.place(Order::new(f64::NAN, 5.0, Side::Buy));
        book.place(Order::new(f64::INFINITY, 5.0, Side::Buy));
        book.place(Order::new(f64::NEG_INFINITY, 5.0, Side::Sell));
        assert!(book.is_empty());

        book.place(Order::new(101.0, 5.0, Side::Sell));
        assert!(book.match_orders().is_empty());
        assert_eq!(book.reference_price(), 100.0);
        assert_eq!(book.ask_depth(), 1);
    }

    #[test]
    fn test_full_cross() {
        let mut book = OrderBook::new();
        book.place(Order::new(101.0, 5.0, Side::Buy));
        book.place(Order::new(99.0, 5.0, Side::Sell));

        let trades = book.match_orders();
        assert_eq!(trades, vec![Trade { price: 100.0, size: 5.0 }]);
        assert!(book.is_empty());
        assert_eq!(book.reference_price(), 100.0);
    }

    #[test]
    fn test_partial_fill_leaves_residual() {
        let mut book = OrderBook::new();
        book.place(Order::new(101.0, 5.0, Side::Buy));
        book.place(Order::new(99.0, 8.0, Side::Sell));

        let trades = book.match_orders();
        assert_eq!(trades, vec![Trade { price: 100.0, size: 5.0 }]);
        assert_eq!(book.bid_depth(), 0);
        let asks: Vec<&Order> = book.asks().collect();
        assert_eq!(asks, vec![&Order::new(99.0, 3.0, Side::Sell)]);
        assert_eq!(book.reference_price(), 100.0);
    }

    #[test]
    fn test_no_cross_leaves_book_untouched() {
        let mut book = OrderBook::with_reference_price(87.25);
        book.place(Order::new(99.0, 5.0, Side::Buy));
        book.place(Order::new(101.0, 5.0, Side::Sell));
        let before = book.clone();

        assert!(book.match_orders().is_empty());
        assert_eq!(book.reference_price(), 87.25);
        assert_eq!(prices(book.bids()), prices(before.bids()));
        assert_eq!(book.bids().collect::<Vec<_>>(), before.bids().collect::<Vec<_>>());
        assert_eq!(book.asks().collect::<Vec<_>>(), before.asks().collect::<Vec<_>>());
        assert_eq!(book.spread(), Some(2.0));
    }

    #[test]
    fn test_equal_prices_cross() {
        let mut book = OrderBook::new();
        book.place(Order::new(100.0, 2.0, Side::Buy));
        book.place(Order::new(100.0, 2.0, Side::Sell));

        assert_eq!(book.match_orders(), vec![Trade { price: 100.0, size: 2.0 }]);
        assert!(book.is_empty());
    }

    #[test]
    fn test_sweep_multiple_levels() {
        let mut book = OrderBook::new();
        book.place(Order::new(104.0, 10.0, Side::Buy));
        book.place(Order::new(98.0, 3.0, Side::Sell));
        book.place(Order::new(100.0, 4.0, Side::Sell));
        book.place(Order::new(106.0, 4.0, Side::Sell));

        let trades = book.match_orders();
        assert_eq!(
            trades,
            vec![
                Trade { price: 101.0, size: 3.0 },
                Trade { price: 102.0, size: 4.0 },
            ]
        );
        // Mean of this call's trade prices, not size-weighted
        assert_eq!(book.reference_price(), 101.5);
        assert_eq!(book.best_bid(), Some(&Order::new(104.0, 3.0, Side::Buy)));
        assert_eq!(book.best_ask().map(|o| o.price), Some(106.0));
    }

    #[test]
    fn test_reference_price_ignores_history() {
        let mut book = OrderBook::new();
        book.place(Order::new(110.0, 1.0, Side::Buy));
        book.place(Order::new(110.0, 1.0, Side::Sell));
        book.match_orders();
        assert_eq!(book.reference_price(), 110.0);

        book.place(Order::new(90.0, 1.0, Side::Buy));
        book.place(Order::new(80.0, 1.0, Side::Sell));
        book.match_orders();
        assert_eq!(book.reference_price(), 85.0);
    }

    #[test]
    fn test_fractional_sizes_never_go_negative() {
        let mut book = OrderBook::new();
        book.place(Order::new(101.0, 0.1, Side::Buy));
        book.place(Order::new(101.0, 0.2, Side::Buy));
        book.place(Order::new(99.0, 0.3, Side::Sell));

        let trades = book.match_orders();
        assert_eq!(trades.len(), 2);
        assert_relative_eq!(trades.iter().map(|t| t.size).sum::<f64>(), 0.3, epsilon = 1e-12);
        assert!(book.bids().all(|o| o.size > 0.0));
        assert!(book.asks().all(|o| o.size > 0.0));
    }

    #[test]
    fn test_display() {
        let mut book = OrderBook::new();
        book.place(Order::new(99.0, 1.0, Side::Buy));
        book.place(Order::new(101.0, 2.0, Side::Sell));

        assert_eq!(
            book.to_string(),
            "<OrderBook reference_price=100 bids=[buy 1 @ 99] asks=[sell 2 @ 101]>"
        );
    }

    #[test]
    fn test_random_sequences_hold_invariants() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut book = OrderBook::new();

        for _ in 0..500 {
            for _ in 0..rng.gen_range(1..=6) {
                let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
                let price = book.reference_price() * (1.0 + rng.gen_range(-0.02..=0.02_f64));
                let size = rng.gen_range(0.5..=20.0);
                book.place(Order::new(price, size, side));
                assert_sorted(&book);
            }

            let reference_before = book.reference_price();
            let size_before = total_size(&book);
            let best_bid = book.best_bid().map(|o| o.size);
            let best_ask = book.best_ask().map(|o| o.size);

            let trades = book.match_orders();

            assert_sorted(&book);
            assert_not_crossed(&book);
            assert!(book.bids().chain(book.asks()).all(|o| o.size > 0.0));

            let traded: Size = trades.iter().map(|t| t.size).sum();
            assert_relative_eq!(size_before - total_size(&book), 2.0 * traded, epsilon = 1e-6);

            if trades.is_empty() {
                assert_eq!(book.reference_price(), reference_before);
            } else {
                let first = trades[0].size;
                assert_eq!(first, best_bid.unwrap().min(best_ask.unwrap()));
                let mean = trades.iter().map(|t| t.price).sum::<f64>() / trades.len() as f64;
                assert_eq!(book.reference_price(), mean);
            }
        }
    }
}
