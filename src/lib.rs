pub mod types;
pub mod config;
pub mod orderbook;
pub mod liquidity;
pub mod simulation;
pub mod ffi;

pub use types::*;
pub use config::{ConfigError, MarketConfig, OrderFlowConfig, SimulationConfig};
pub use orderbook::OrderBook;
pub use liquidity::{LiquidityProvider, Quote};
pub use simulation::{OrderFlow, RoundReport, Simulation, SimulationReport};
