//! Simulation parameters
//!
//! Every constant the market needs is an explicit field here with the
//! classic defaults: reference price 100.0, spread 1.0, quote size 10.0,
//! one to five external orders a day within ±2% of the reference price.

use crate::types::{Price, Size, DEFAULT_REFERENCE_PRICE};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("initial reference price must be finite and positive, got {0}")]
    InvalidReferencePrice(Price),

    #[error("spread must be finite and non-negative, got {0}")]
    InvalidSpread(Price),

    #[error("quote size must be finite and non-negative, got {0}")]
    InvalidQuoteSize(Size),

    #[error("order count range is empty: {min}..={max}")]
    InvalidOrderCount { min: usize, max: usize },

    #[error("max price deviation must be in [0, 1), got {0}")]
    InvalidPriceDeviation(f64),

    #[error("order size range must be positive and non-empty: {min}..={max}")]
    InvalidSizeRange { min: Size, max: Size },

    #[error("simulation needs at least one day")]
    NoDays,
}

/// Book and liquidity provider parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketConfig {
    pub initial_reference_price: Price,
    /// Distance between the provider's bid and ask
    pub spread: Price,
    /// Size of each side of the provider's quote
    pub quote_size: Size,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            initial_reference_price: DEFAULT_REFERENCE_PRICE,
            spread: 1.0,
            quote_size: 10.0,
        }
    }
}

impl MarketConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = self.initial_reference_price;
        if !(p.is_finite() && p > 0.0) {
            return Err(ConfigError::InvalidReferencePrice(p));
        }
        if !(self.spread.is_finite() && self.spread >= 0.0) {
            return Err(ConfigError::InvalidSpread(self.spread));
        }
        if !(self.quote_size.is_finite() && self.quote_size >= 0.0) {
            return Err(ConfigError::InvalidQuoteSize(self.quote_size));
        }
        Ok(())
    }
}

/// Shape of the random external order flow injected each day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderFlowConfig {
    pub min_orders: usize,
    pub max_orders: usize,
    /// Relative price perturbation in `[0, 1)`, e.g. 0.02 for ±2% around the reference
    pub max_price_deviation: f64,
    pub min_size: Size,
    pub max_size: Size,
}

impl Default for OrderFlowConfig {
    fn default() -> Self {
        Self {
            min_orders: 1,
            max_orders: 5,
            max_price_deviation: 0.02,
            min_size: 5.0,
            max_size: 20.0,
        }
    }
}

impl OrderFlowConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_orders > self.max_orders {
            return Err(ConfigError::InvalidOrderCount {
                min: self.min_orders,
                max: self.max_orders,
            });
        }
        let dev = self.max_price_deviation;
        // Below 1.0 so perturbed prices stay positive
        if !(0.0..1.0).contains(&dev) {
            return Err(ConfigError::InvalidPriceDeviation(dev));
        }
        let (min, max) = (self.min_size, self.max_size);
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            return Err(ConfigError::InvalidSizeRange { min, max });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub market: MarketConfig,
    pub flow: OrderFlowConfig,
    pub days: usize,
    /// Fixed seed for reproducible runs; entropy when `None`
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            market: MarketConfig::default(),
            flow: OrderFlowConfig::default(),
            days: 10,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn with_days(mut self, days: usize) -> Self {
        self.days = days;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_market(mut self, market: MarketConfig) -> Self {
        self.market = market;
        self
    }

    pub fn with_flow(mut self, flow: OrderFlowConfig) -> Self {
        self.flow = flow;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.market.validate()?;
        self.flow.validate()?;
        if self.days == 0 {
            return Err(ConfigError::NoDays);
        }
        Ok(())
    }
}
