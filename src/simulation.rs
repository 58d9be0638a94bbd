//! Day-by-day market driver
//!
//! Each day the liquidity provider quotes around the reference price, a
//! random batch of external orders arrives, and the book is matched once.

use crate::config::{ConfigError, OrderFlowConfig, SimulationConfig};
use crate::liquidity::{LiquidityProvider, Quote};
use crate::orderbook::OrderBook;
use crate::types::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use tracing::{debug, info};

/// Random external order generator
///
/// Side is a fair coin, price is the reference price scaled by a uniform
/// factor in `[1 - dev, 1 + dev]`, size is uniform in `[min_size, max_size]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderFlow {
    config: OrderFlowConfig,
}

impl OrderFlow {
    pub fn new(config: OrderFlowConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn generate<R: Rng>(&self, reference_price: Price, rng: &mut R) -> Vec<Order> {
        let c = &self.config;
        let count = rng.gen_range(c.min_orders..=c.max_orders);

        (0..count)
            .map(|_| {
                let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
                let factor = 1.0 + rng.gen_range(-c.max_price_deviation..=c.max_price_deviation);
                let size = rng.gen_range(c.min_size..=c.max_size);
                Order::new(reference_price * factor, size, side)
            })
            .collect()
    }
}

/// Outcome of one simulated day
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    /// 1-based
    pub day: usize,
    pub quote: Quote,
    pub external_orders: Vec<Order>,
    pub trades: Vec<Trade>,
    /// Reference price after matching
    pub reference_price: Price,
}

impl RoundReport {
    pub fn volume(&self) -> Size {
        self.trades.iter().map(|t| t.size).sum()
    }
}

impl fmt::Display for RoundReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Day {:2} | Mid Price: {:.2} | Trades: {} | ",
            self.day,
            self.reference_price,
            self.trades.len()
        )?;
        if self.trades.is_empty() {
            return write!(f, "No trades");
        }
        for (i, trade) in self.trades.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", trade)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationReport {
    pub rounds: Vec<RoundReport>,
}

impl SimulationReport {
    /// Post-match reference price of every day, in order
    pub fn price_history(&self) -> Vec<Price> {
        self.rounds.iter().map(|r| r.reference_price).collect()
    }

    pub fn trade_count(&self) -> usize {
        self.rounds.iter().map(|r| r.trades.len()).sum()
    }

    pub fn total_volume(&self) -> Size {
        self.rounds.iter().map(RoundReport::volume).sum()
    }
}

/// One market: a book, its liquidity provider and the external order flow,
/// driven by an injected random source.
pub struct Simulation<R: Rng> {
    config: SimulationConfig,
    book: OrderBook,
    provider: LiquidityProvider,
    flow: OrderFlow,
    rng: R,
    day: usize,
}

impl Simulation<StdRng> {
    /// Seeded from `config.seed`, or from OS entropy when unset.
    pub fn from_config(config: SimulationConfig) -> Result<Self, ConfigError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(config, rng)
    }

    pub fn seeded(config: SimulationConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(config.with_seed(seed), StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Simulation<R> {
    pub fn new(config: SimulationConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            book: OrderBook::with_reference_price(config.market.initial_reference_price),
            provider: LiquidityProvider::from_config(&config.market),
            flow: OrderFlow::new(config.flow)?,
            config,
            rng,
            day: 0,
        })
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Days simulated so far
    pub fn day(&self) -> usize {
        self.day
    }

    /// Run a single day: quote, inject external orders, match once.
    pub fn step(&mut self) -> RoundReport {
        self.day += 1;

        let quote = self.provider.provide_liquidity(&mut self.book);
        let external_orders = self.flow.generate(self.book.reference_price(), &mut self.rng);
        for order in &external_orders {
            self.book.place(order.clone());
        }

        let trades = self.book.match_orders();
        let report = RoundReport {
            day: self.day,
            quote,
            external_orders,
            trades,
            reference_price: self.book.reference_price(),
        };
        debug!(
            day = report.day,
            trades = report.trades.len(),
            reference_price = report.reference_price,
            bids = self.book.bid_depth(),
            asks = self.book.ask_depth(),
            "day complete"
        );
        report
    }

    /// Run the configured number of days.
    pub fn run(&mut self) -> SimulationReport {
        info!(days = self.config.days, seed = ?self.config.seed, "starting simulation");
        let rounds = (0..self.config.days).map(|_| self.step()).collect();
        let report = SimulationReport { rounds };
        info!(
            trades = report.trade_count(),
            volume = report.total_volume(),
            reference_price = self.book.reference_price(),
            "simulation finished"
        );
        report
    }
}
