//! Stage 1: Strike Aggregation
//!
//! Exposure at the actual spot using the vendor-supplied gamma, summed per
//! strike across every expiration.

use std::collections::BTreeMap;

use crate::core::{strike_key, ChainSnapshot, GexResult, OptionContract, StrikePair};
use crate::models::CONTRACT_MULTIPLIER;

use super::{PerStrikeAggregate, StrikeTable};

/// Fixed multiplier for the raw net-GEX unit system
pub const NET_GEX_MULTIPLIER: f64 = 100.0 * 100.0;

/// Scale from dollars to billions of dollars
pub const BILLION: f64 = 1e9;

#[derive(Debug, Default)]
struct StrikeAccumulator {
    strike: f64,
    call_gex: f64,
    put_gex: f64,
    total_gamma: f64,
    call_oi: f64,
    put_oi: f64,
}

/// Spot-scaled dollar gamma per 1% move for one leg, signed by dealer side
fn dollar_gamma(leg: &OptionContract, spot: f64) -> f64 {
    let unsigned = leg.gamma * leg.open_interest * CONTRACT_MULTIPLIER * spot * spot * 0.01;
    leg.option_type.phi() * unsigned
}

/// Aggregate paired contracts per strike at the snapshot spot.
///
/// Non-finite vendor values propagate into the affected strike rather than
/// being rejected; consumers filter before computing statistics.
pub fn aggregate_by_strike(pairs: &[StrikePair], spot: f64) -> StrikeTable {
    let mut by_strike: BTreeMap<i64, StrikeAccumulator> = BTreeMap::new();

    for pair in pairs {
        let acc = by_strike
            .entry(strike_key(pair.strike))
            .or_insert_with(|| StrikeAccumulator {
                strike: pair.strike,
                ..Default::default()
            });

        let (call, put) = (&pair.call, &pair.put);

        acc.total_gamma += dollar_gamma(call, spot) + dollar_gamma(put, spot);
        acc.call_gex += call.gamma * call.open_interest * NET_GEX_MULTIPLIER;
        acc.put_gex += put.gamma * put.open_interest * NET_GEX_MULTIPLIER;
        acc.call_oi += call.open_interest;
        acc.put_oi += put.open_interest;
    }

    let rows = by_strike
        .into_values()
        .map(|acc| PerStrikeAggregate {
            strike: acc.strike,
            call_gex: acc.call_gex,
            put_gex: acc.put_gex,
            total_gamma_bn: acc.total_gamma / BILLION,
            net_gex: acc.call_gex - acc.put_gex,
            call_open_interest: acc.call_oi,
            put_open_interest: acc.put_oi,
            total_open_interest: acc.call_oi + acc.put_oi,
        })
        .collect();

    StrikeTable { spot, rows }
}

/// Pair and aggregate a snapshot; a pairing failure yields no table
pub fn aggregate_snapshot(snapshot: &ChainSnapshot) -> GexResult<StrikeTable> {
    let pairs = snapshot.paired()?;
    Ok(aggregate_by_strike(&pairs, snapshot.spot))
}
