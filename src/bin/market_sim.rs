//! Market maker simulation
//!
//! Runs the day-by-day driver and prints one line per day followed by the
//! reference price history.

use anyhow::{Context, Result};
use clap::Parser;
use market_sim::{MarketConfig, OrderFlowConfig, Simulation, SimulationConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "market_sim")]
#[command(about = "Simulate a liquidity provider quoting into a limit order book", long_about = None)]
struct Cli {
    /// Number of days to simulate
    #[arg(short, long, default_value = "20")]
    days: usize,

    /// Seed for reproducible runs
    #[arg(short, long)]
    seed: Option<u64>,

    /// Starting reference price
    #[arg(long, default_value = "100.0")]
    initial_price: f64,

    /// Distance between the provider's bid and ask
    #[arg(long, default_value = "1.0")]
    spread: f64,

    /// Size of each side of the provider's quote
    #[arg(long, default_value = "10.0")]
    quote_size: f64,

    /// Fewest external orders per day
    #[arg(long, default_value = "1")]
    min_orders: usize,

    /// Most external orders per day
    #[arg(long, default_value = "5")]
    max_orders: usize,

    /// Relative price perturbation of external orders, below 1.0
    #[arg(long, default_value = "0.02")]
    max_deviation: f64,

    /// Smallest external order size
    #[arg(long, default_value = "5.0")]
    min_size: f64,

    /// Largest external order size
    #[arg(long, default_value = "20.0")]
    max_size: f64,

    /// Log filter used when RUST_LOG is unset
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn config(&self) -> SimulationConfig {
        let mut config = SimulationConfig::default()
            .with_days(self.days)
            .with_market(MarketConfig {
                initial_reference_price: self.initial_price,
                spread: self.spread,
                quote_size: self.quote_size,
            })
            .with_flow(OrderFlowConfig {
                min_orders: self.min_orders,
                max_orders: self.max_orders,
                max_price_deviation: self.max_deviation,
                min_size: self.min_size,
                max_size: self.max_size,
            });
        config.seed = self.seed;
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut sim = Simulation::from_config(cli.config()).context("invalid simulation parameters")?;

    println!("=== Market Maker Simulation Demo ===");
    let report = sim.run();
    for round in &report.rounds {
        println!("{}", round);
    }

    println!("\nFinal mid-price history:");
    let history: Vec<String> = report
        .price_history()
        .iter()
        .map(|p| format!("{:.2}", p))
        .collect();
    println!("{}", history.join(" "));

    Ok(())
}
