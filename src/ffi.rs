//! FFI (Foreign Function Interface) bindings for the market simulator
//!
//! This module provides C-compatible functions for driving an order book
//! from C/C++ code.

use crate::orderbook::OrderBook;
use crate::types::*;
use libc::{c_char, size_t};

/// Opaque OrderBook handle for C FFI
pub struct MarketSimOrderBook {
    inner: OrderBook,
}

/// Side enum for C FFI (matches C API)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketSimSide {
    Buy = 0,
    Sell = 1,
}

impl From<MarketSimSide> for Side {
    fn from(s: MarketSimSide) -> Self {
        match s {
            MarketSimSide::Buy => Side::Buy,
            MarketSimSide::Sell => Side::Sell,
        }
    }
}

impl From<Side> for MarketSimSide {
    fn from(s: Side) -> Self {
        match s {
            Side::Buy => MarketSimSide::Buy,
            Side::Sell => MarketSimSide::Sell,
        }
    }
}

/// Trade structure for C FFI
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketSimTrade {
    pub price: f64,
    pub size: f64,
}

impl From<Trade> for MarketSimTrade {
    fn from(t: Trade) -> Self {
        Self { price: t.price, size: t.size }
    }
}

// ============================================
// OrderBook FFI Functions
// ============================================

/// Create a new order book starting at `initial_price`
///
/// # Safety
/// Returns a raw pointer that must be freed with `market_sim_orderbook_destroy`
#[no_mangle]
pub extern "C" fn market_sim_orderbook_create(initial_price: f64) -> *mut MarketSimOrderBook {
    let book = Box::new(MarketSimOrderBook {
        inner: OrderBook::with_reference_price(initial_price),
    });
    Box::into_raw(book)
}

/// Destroy an order book
///
/// # Safety
/// The pointer must be valid and must have been created by `market_sim_orderbook_create`
#[no_mangle]
pub unsafe extern "C" fn market_sim_orderbook_destroy(book: *mut MarketSimOrderBook) {
    if !book.is_null() {
        drop(Box::from_raw(book));
    }
}

/// Rest an order in the book. Returns false if the book is null or the
/// order was discarded for a non-finite price or non-positive size.
///
/// # Safety
/// The book pointer must be valid
#[no_mangle]
pub unsafe extern "C" fn market_sim_orderbook_place(
    book: *mut MarketSimOrderBook,
    side: MarketSimSide,
    price: f64,
    size: f64,
) -> bool {
    if book.is_null() {
        return false;
    }

    let book = &mut *book;
    let side = Side::from(side);
    let before = match side {
        Side::Buy => book.inner.bid_depth(),
        Side::Sell => book.inner.ask_depth(),
    };
    book.inner.place(Order::new(price, size, side));
    let after = match side {
        Side::Buy => book.inner.bid_depth(),
        Side::Sell => book.inner.ask_depth(),
    };
    after > before
}

/// Match crossing orders.
///
/// Writes at most `capacity` trades to `out` and returns the total number
/// of trades produced, which may exceed `capacity`.
///
/// # Safety
/// The book pointer must be valid; `out` must point to `capacity` writable
/// trades or be null when `capacity` is zero
#[no_mangle]
pub unsafe extern "C" fn market_sim_orderbook_match(
    book: *mut MarketSimOrderBook,
    out: *mut MarketSimTrade,
    capacity: size_t,
) -> size_t {
    if book.is_null() {
        return 0;
    }

    let book = &mut *book;
    let trades = book.inner.match_orders();
    if !out.is_null() {
        for (i, trade) in trades.iter().take(capacity).enumerate() {
            *out.add(i) = MarketSimTrade::from(*trade);
        }
    }
    trades.len()
}

/// Get the current reference price, NaN for a null book
///
/// # Safety
/// The book pointer must be valid
#[no_mangle]
pub unsafe extern "C" fn market_sim_orderbook_reference_price(
    book: *const MarketSimOrderBook,
) -> f64 {
    if book.is_null() {
        return f64::NAN;
    }

    let book = &*book;
    book.inner.reference_price()
}

/// Get best bid price, NaN when there are no bids
///
/// # Safety
/// The book pointer must be valid
#[no_mangle]
pub unsafe extern "C" fn market_sim_orderbook_best_bid(book: *const MarketSimOrderBook) -> f64 {
    if book.is_null() {
        return f64::NAN;
    }

    let book = &*book;
    book.inner.best_bid().map_or(f64::NAN, |o| o.price)
}

/// Get best ask price, NaN when there are no asks
///
/// # Safety
/// The book pointer must be valid
#[no_mangle]
pub unsafe extern "C" fn market_sim_orderbook_best_ask(book: *const MarketSimOrderBook) -> f64 {
    if book.is_null() {
        return f64::NAN;
    }

    let book = &*book;
    book.inner.best_ask().map_or(f64::NAN, |o| o.price)
}

/// Number of resting bids
///
/// # Safety
/// The book pointer must be valid
#[no_mangle]
pub unsafe extern "C" fn market_sim_orderbook_bid_depth(book: *const MarketSimOrderBook) -> size_t {
    if book.is_null() {
        return 0;
    }

    let book = &*book;
    book.inner.bid_depth()
}

/// Number of resting asks
///
/// # Safety
/// The book pointer must be valid
#[no_mangle]
pub unsafe extern "C" fn market_sim_orderbook_ask_depth(book: *const MarketSimOrderBook) -> size_t {
    if book.is_null() {
        return 0;
    }

    let book = &*book;
    book.inner.ask_depth()
}

// ============================================
// Utility Functions
// ============================================

/// Get library version
#[no_mangle]
pub extern "C" fn market_sim_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}
