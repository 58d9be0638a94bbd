use market_sim::{LiquidityProvider, Order, OrderBook, Side};
use std::time::Instant;

const WARMUP_OPS: usize = 1_000;
const BENCH_OPS: usize = 100_000;

fn main() {
    println!("=== Rust Order Book Benchmark ===\n");

    bench_place_order();
    bench_match_crossing();
    bench_match_no_cross();
    bench_quote_and_match();

    println!("=== Benchmark Complete ===");
}

fn price_at(i: usize) -> f64 {
    95.0 + (i % 1000) as f64 * 0.01
}

fn bench_place_order() {
    let mut book = OrderBook::new();

    // Warmup
    for i in 0..WARMUP_OPS {
        let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
        book.place(Order::new(price_at(i), 10.0, side));
    }

    // Reset
    book = OrderBook::new();

    // Bids below 100, asks above, so nothing would cross
    let start = Instant::now();
    for i in 0..BENCH_OPS {
        let offset = (i % 500) as f64 * 0.01;
        let order = if i % 2 == 0 {
            Order::new(99.0 - offset, 10.0, Side::Buy)
        } else {
            Order::new(101.0 + offset, 10.0, Side::Sell)
        };
        book.place(order);
    }
    let elapsed = start.elapsed();

    let ns_per_op = elapsed.as_nanos() as f64 / BENCH_OPS as f64;
    println!("Place Order:");
    println!("  Count: {} ops", BENCH_OPS);
    println!("  Resting: {} bids / {} asks", book.bid_depth(), book.ask_depth());
    println!("  Mean:  {:.1} ns/op\n", ns_per_op);
}

fn bench_match_crossing() {
    const PAIRS: usize = 10_000;
    let mut book = OrderBook::new();

    // Pre-fill a fully crossed book
    for i in 0..PAIRS {
        book.place(Order::new(100.0 + price_at(i) * 0.01, 5.0, Side::Buy));
        book.place(Order::new(100.0 - price_at(i) * 0.01, 5.0, Side::Sell));
    }

    let start = Instant::now();
    let trades = book.match_orders();
    let elapsed = start.elapsed();

    let ns_per_trade = elapsed.as_nanos() as f64 / trades.len().max(1) as f64;
    println!("Match (Crossed Book):");
    println!("  Trades: {}", trades.len());
    println!("  Reference price: {:.4}", book.reference_price());
    println!("  Mean:  {:.1} ns/trade\n", ns_per_trade);
}

fn bench_match_no_cross() {
    let mut book = OrderBook::new();

    // Pre-fill
    for i in 0..10_000 {
        let offset = (i % 100) as f64 * 0.01;
        book.place(Order::new(99.0 - offset, 10.0, Side::Buy));
        book.place(Order::new(101.0 + offset, 10.0, Side::Sell));
    }

    let start = Instant::now();
    let mut trades = 0usize;
    for _ in 0..BENCH_OPS {
        trades += book.match_orders().len();
    }
    let elapsed = start.elapsed();

    // Prevent optimization
    std::hint::black_box(trades);

    let ns_per_op = elapsed.as_nanos() as f64 / BENCH_OPS as f64;
    println!("Match (No Cross):");
    println!("  Count: {} ops", BENCH_OPS);
    println!("  Mean:  {:.1} ns/op\n", ns_per_op);
}

fn bench_quote_and_match() {
    const ROUNDS: usize = 10_000;
    let mut book = OrderBook::new();
    let provider = LiquidityProvider::new(1.0, 10.0);

    let start = Instant::now();
    for i in 0..ROUNDS {
        provider.provide_liquidity(&mut book);

        // Alternate aggressive flow through the quote
        let reference = book.reference_price();
        let order = if i % 2 == 0 {
            Order::new(reference + 1.0, 12.0, Side::Buy)
        } else {
            Order::new(reference - 1.0, 12.0, Side::Sell)
        };
        book.place(order);
        book.match_orders();
    }
    let elapsed = start.elapsed();

    let rounds_per_sec = ROUNDS as f64 / elapsed.as_secs_f64();
    let ns_per_round = elapsed.as_nanos() as f64 / ROUNDS as f64;

    println!("Throughput (quote + flow + match):");
    println!("  {:.2} million rounds/sec", rounds_per_sec / 1_000_000.0);
    println!("  {:.2} ns/round average", ns_per_round);
    println!("  Resting: {} bids / {} asks\n", book.bid_depth(), book.ask_depth());
}
