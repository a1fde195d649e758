//! Chain snapshot and call/put pairing

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{GexError, GexResult};
use super::option::{OptionContract, OptionType};

/// A single snapshot of an underlying's full option chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSnapshot {
    /// Underlying ticker (e.g. "SPX")
    pub underlying: String,
    /// Spot price at snapshot time
    pub spot: f64,
    /// Analysis date, used as "today" for day counts
    pub as_of: NaiveDate,
    /// Every listed contract, calls and puts mixed
    pub contracts: Vec<OptionContract>,
}

impl ChainSnapshot {
    pub fn new(underlying: impl Into<String>, spot: f64, as_of: NaiveDate) -> Self {
        Self {
            underlying: underlying.into(),
            spot,
            as_of,
            contracts: Vec::new(),
        }
    }

    pub fn add_contract(&mut self, contract: OptionContract) {
        self.contracts.push(contract);
    }

    /// Distinct expirations, ascending
    pub fn expirations(&self) -> Vec<NaiveDate> {
        let mut exps: Vec<NaiveDate> = self.contracts.iter().map(|c| c.expiration).collect();
        exps.sort();
        exps.dedup();
        exps
    }

    /// Pair every call with its put; see [`pair_contracts`]
    pub fn paired(&self) -> GexResult<Vec<StrikePair>> {
        if !(self.spot.is_finite() && self.spot > 0.0) {
            return Err(GexError::invalid_input(format!(
                "Spot must be positive, got {}",
                self.spot
            )));
        }
        pair_contracts(&self.contracts)
    }
}

/// Call and put legs sharing one (expiration, strike)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrikePair {
    pub expiration: NaiveDate,
    pub strike: f64,
    pub call: OptionContract,
    pub put: OptionContract,
}

/// Strike in thousandths, the resolution of contract symbols
pub fn strike_key(strike: f64) -> i64 {
    (strike * 1000.0).round() as i64
}

/// Pair calls and puts by (expiration, strike).
///
/// Every combination must carry exactly one call and exactly one put;
/// anything else rejects the whole chain. Output is ordered by expiration,
/// then strike.
pub fn pair_contracts(contracts: &[OptionContract]) -> GexResult<Vec<StrikePair>> {
    let mut legs: BTreeMap<(NaiveDate, i64), (Option<&OptionContract>, Option<&OptionContract>)> =
        BTreeMap::new();

    for contract in contracts {
        if !contract.strike.is_finite() {
            return Err(GexError::input_mismatch(format!(
                "Contract {:?} has non-finite strike",
                contract.symbol
            )));
        }
        let slot = legs
            .entry((contract.expiration, strike_key(contract.strike)))
            .or_insert((None, None));
        let leg = match contract.option_type {
            OptionType::Call => &mut slot.0,
            OptionType::Put => &mut slot.1,
        };
        if leg.is_some() {
            return Err(GexError::input_mismatch(format!(
                "Duplicate {} at {} strike {}",
                contract.option_type.label(),
                contract.expiration,
                contract.strike
            )));
        }
        *leg = Some(contract);
    }

    legs.into_iter()
        .map(|((expiration, _), pair)| match pair {
            (Some(call), Some(put)) => Ok(StrikePair {
                expiration,
                strike: call.strike,
                call: call.clone(),
                put: put.clone(),
            }),
            (Some(call), None) => Err(GexError::input_mismatch(format!(
                "Call at {} strike {} has no matching put",
                expiration, call.strike
            ))),
            (None, Some(put)) => Err(GexError::input_mismatch(format!(
                "Put at {} strike {} has no matching call",
                expiration, put.strike
            ))),
            (None, None) => unreachable!("every entry holds at least one leg"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exp() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 19).unwrap()
    }

    fn leg(strike: f64, option_type: OptionType) -> OptionContract {
        OptionContract::new(exp(), strike, option_type, 0.15, 100.0, 0.001)
    }

    #[test]
    fn test_pairing_success() {
        let contracts = vec![
            leg(4900.0, OptionType::Call),
            leg(5000.0, OptionType::Put),
            leg(4900.0, OptionType::Put),
            leg(5000.0, OptionType::Call),
        ];
        let pairs = pair_contracts(&contracts).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].strike, 4900.0);
        assert_eq!(pairs[1].strike, 5000.0);
        assert!(pairs[0].call.is_call());
        assert!(!pairs[0].put.is_call());
    }

    #[test]
    fn test_unmatched_put_rejected() {
        let contracts = vec![
            leg(4900.0, OptionType::Call),
            leg(4900.0, OptionType::Put),
            leg(5100.0, OptionType::Put),
        ];
        let err = pair_contracts(&contracts).unwrap_err();
        assert!(matches!(err, GexError::InputMismatch(_)));
    }

    #[test]
    fn test_duplicate_leg_rejected() {
        let contracts = vec![
            leg(4900.0, OptionType::Call),
            leg(4900.0, OptionType::Call),
            leg(4900.0, OptionType::Put),
        ];
        assert!(matches!(
            pair_contracts(&contracts),
            Err(GexError::InputMismatch(_))
        ));
    }

    #[test]
    fn test_same_strike_different_expiry_not_paired() {
        let other = NaiveDate::from_ymd_opt(2024, 2, 16).unwrap();
        let mut put = leg(4900.0, OptionType::Put);
        put.expiration = other;
        let contracts = vec![leg(4900.0, OptionType::Call), put];
        assert!(pair_contracts(&contracts).is_err());
    }

    #[test]
    fn test_snapshot_rejects_bad_spot() {
        let snapshot = ChainSnapshot::new("SPX", 0.0, exp());
        assert!(matches!(snapshot.paired(), Err(GexError::InvalidInput(_))));
    }
}
