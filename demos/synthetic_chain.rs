//! Example: GEX analysis of a synthetic SPX-like chain
//!
//! Run with: cargo run --example synthetic_chain

use chrono::NaiveDate;
use gex_engine::prelude::*;

fn main() {
    let as_of = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
    let spot = 4763.54;

    // Weekly, monthly and quarterly expirations
    let expirations = [
        NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 19).unwrap(),
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
    ];

    let mut snapshot = ChainSnapshot::new("SPX", spot, as_of);
    for (i, &exp) in expirations.iter().enumerate() {
        let time = years_to_expiry(as_of, exp, TRADING_DAYS_PER_YEAR);
        for k in 0..41 {
            let strike = 4500.0 + 12.5 * k as f64;
            let moneyness = (strike / spot).ln();
            // Put skew: vol rises as strikes fall
            let vol = 0.13 - 0.6 * moneyness + 0.02 * i as f64;

            // Puts concentrated below spot, calls above
            let call_oi = 500.0 + 4000.0 * (moneyness.max(0.0) * 40.0).min(1.0);
            let put_oi = 800.0 + 6000.0 * ((-moneyness).max(0.0) * 40.0).min(1.0);

            let gamma = bs_gamma(spot, strike, 0.0, 0.0, vol, time, OptionType::Call);
            snapshot.add_contract(OptionContract::new(exp, strike, OptionType::Call, vol, call_oi, gamma));
            snapshot.add_contract(OptionContract::new(exp, strike, OptionType::Put, vol, put_oi, gamma));
        }
    }

    println!("=== Synthetic Chain ===\n");
    println!("Underlying:  {}", snapshot.underlying);
    println!("Spot:        {:.2}", snapshot.spot);
    println!("Contracts:   {}", snapshot.contracts.len());
    println!("Expirations: {}\n", snapshot.expirations().len());

    let report = match GexAnalyzer::new().analyze(&snapshot) {
        Ok(report) => report,
        Err(e) => {
            println!("Analysis failed: {}", e);
            return;
        }
    };

    println!("=== Gamma Exposure ===\n");
    println!("Total gamma: ${:.3} Bn per 1% move", report.total_gamma_bn());
    match report.zero_gamma {
        Some(flip) => println!("Gamma flip:  {:.2}", flip),
        None => println!("Gamma flip:  none in range"),
    }

    println!("\n=== Profile (Bn) ===\n");
    println!("{:>10} {:>10} {:>10} {:>10}", "Level", "All", "Ex-Next", "Ex-Mthly");
    for point in report.profile.points.iter().step_by(3) {
        println!(
            "{:>10.1} {:>10.3} {:>10.3} {:>10.3}",
            point.spot_level,
            point.total_gamma_all_expiries,
            point.total_gamma_ex_next_expiry,
            point.total_gamma_ex_next_monthly
        );
    }

    if let Some(window) = &report.window {
        println!("\n=== Window ±{:.0} ===\n", window.width);
        println!("Max GEX strike: {:.1}", window.max_gex.strike);
        println!("Min GEX strike: {:.1}", window.min_gex.strike);
        println!("Zone width:     {:.1}", window.zone_width());
        println!("Spot is {}", window.status.label());
        println!("High OI strikes: {:?}", window.high_oi.iter().map(|r| r.strike).collect::<Vec<_>>());
    }
}
