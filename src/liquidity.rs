use crate::config::MarketConfig;
use crate::orderbook::OrderBook;
use crate::types::*;
use tracing::debug;

/// Two-sided quote posted by the liquidity provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub bid_price: Price,
    pub ask_price: Price,
    pub bid_size: Size,
    pub ask_size: Size,
}

/// Posts a symmetric quote around the book's reference price every time it
/// is asked to. It never looks at resting orders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiquidityProvider {
    spread: Price,
    size: Size,
}

impl LiquidityProvider {
    pub fn new(spread: Price, size: Size) -> Self {
        Self { spread, size }
    }

    pub fn from_config(config: &MarketConfig) -> Self {
        Self::new(config.spread, config.quote_size)
    }

    pub fn spread(&self) -> Price {
        self.spread
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn quote(&self, reference_price: Price) -> Quote {
        let half = self.spread / 2.0;
        Quote {
            bid_price: reference_price - half,
            ask_price: reference_price + half,
            bid_size: self.size,
            ask_size: self.size,
        }
    }

    /// Place a fresh bid and ask around the current reference price.
    pub fn provide_liquidity(&self, book: &mut OrderBook) -> Quote {
        let quote = self.quote(book.reference_price());
        debug!(bid = quote.bid_price, ask = quote.ask_price, size = self.size, "quoting");

        book.place(Order::new(quote.bid_price, quote.bid_size, Side::Buy));
        book.place(Order::new(quote.ask_price, quote.ask_size, Side::Sell));
        quote
    }
}

impl Default for LiquidityProvider {
    fn default() -> Self {
        Self::from_config(&MarketConfig::default())
    }
}
