use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Price as a real number. Any finite value is accepted.
pub type Price = f64;
pub type Size = f64;

/// Reference price a fresh book starts from
pub const DEFAULT_REFERENCE_PRICE: Price = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

impl FromStr for Side {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("buy") {
            Ok(Side::Buy)
        } else if s.eq_ignore_ascii_case("sell") {
            Ok(Side::Sell)
        } else {
            Err(OrderError::InvalidOrderSide(s.to_string()))
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OrderError {
    #[error("side must be 'buy' or 'sell', got '{0}'")]
    InvalidOrderSide(String),

    #[error("order size must be a finite positive number, got {0}")]
    InvalidOrderSize(Size),
}

/// A resting or incoming limit order. Only `size` changes once placed.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub price: Price,
    pub size: Size,
    pub side: Side,
}

impl Order {
    pub fn new(price: Price, size: Size, side: Side) -> Self {
        Self { price, size, side }
    }

    /// Like [`Order::new`] but rejects sizes that are not finite and positive.
    pub fn try_new(price: Price, size: Size, side: Side) -> Result<Self, OrderError> {
        if !(size.is_finite() && size > 0.0) {
            return Err(OrderError::InvalidOrderSize(size));
        }
        Ok(Self::new(price, size, side))
    }

    /// Build an order from a textual side such as `"buy"` or `"SELL"`.
    pub fn parse(price: Price, size: Size, side: &str) -> Result<Self, OrderError> {
        Self::try_new(price, size, side.parse()?)
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        self.size <= 0.0
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} @ {}", self.side, self.size, self.price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trade {
    pub price: Price,
    pub size: Size,
}

impl Trade {
    pub fn notional(&self) -> f64 {
        self.price * self.size
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} @ {:.2}", self.size, self.price)
    }
}
