//! Option contract definitions
//!
//! One record per listed contract as delivered by the data vendor, plus
//! decoding of the vendor's fixed-layout contract symbol.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{GexError, GexResult};

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Dealer exposure sign: +1 for call, -1 for put
    pub fn phi(&self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    /// Decode the single-character type flag used in contract symbols
    pub fn from_flag(flag: char) -> Option<Self> {
        match flag {
            'C' => Some(OptionType::Call),
            'P' => Some(OptionType::Put),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }
}

/// A single listed option contract from one chain snapshot.
///
/// Numeric fields the vendor did not supply hold `f64::NAN`; statistics
/// downstream filter non-finite values before reducing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionContract {
    /// Vendor contract symbol (e.g. "SPXW240119C04500000")
    #[serde(default)]
    pub symbol: String,
    /// Expiration date
    pub expiration: NaiveDate,
    /// Strike price
    pub strike: f64,
    /// Option type (Call/Put)
    pub option_type: OptionType,
    /// Implied volatility (decimal, 0.15 = 15%)
    #[serde(with = "missing", default = "missing::value")]
    pub implied_vol: f64,
    /// Open interest (contracts)
    #[serde(with = "missing", default = "missing::value")]
    pub open_interest: f64,
    /// Vendor-supplied gamma at the snapshot spot
    #[serde(with = "missing", default = "missing::value")]
    pub gamma: f64,
    #[serde(with = "missing", default = "missing::value")]
    pub delta: f64,
    #[serde(with = "missing", default = "missing::value")]
    pub last: f64,
    #[serde(with = "missing", default = "missing::value")]
    pub bid: f64,
    #[serde(with = "missing", default = "missing::value")]
    pub ask: f64,
    #[serde(with = "missing", default = "missing::value")]
    pub volume: f64,
}

/// Missing numeric fields: `NaN` in memory, `null` on the wire
mod missing {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn value() -> f64 {
        f64::NAN
    }

    pub fn serialize<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
        if v.is_finite() {
            s.serialize_some(v)
        } else {
            s.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
    }
}

impl OptionContract {
    /// Contract with the fields the engine needs; quote fields left missing
    pub fn new(
        expiration: NaiveDate,
        strike: f64,
        option_type: OptionType,
        implied_vol: f64,
        open_interest: f64,
        gamma: f64,
    ) -> Self {
        Self {
            symbol: String::new(),
            expiration,
            strike,
            option_type,
            implied_vol,
            open_interest,
            gamma,
            delta: f64::NAN,
            last: f64::NAN,
            bid: f64::NAN,
            ask: f64::NAN,
            volume: f64::NAN,
        }
    }

    pub fn is_call(&self) -> bool {
        self.option_type == OptionType::Call
    }
}

/// Expiration, type and strike decoded from a contract symbol
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedSymbol {
    pub expiration: NaiveDate,
    pub option_type: OptionType,
    pub strike: f64,
}

/// Decode a fixed-layout contract symbol.
///
/// Layout, counted from the end: `[-15, -9)` expiration as `YYMMDD`,
/// `[-9, -8)` type flag, `[-8, -3)` strike integer part (zero padded),
/// `[-3, end)` strike thousandths. The root in front is free length.
pub fn parse_option_symbol(symbol: &str) -> GexResult<ParsedSymbol> {
    let symbol = symbol.trim();
    if !symbol.is_ascii() || symbol.len() < 15 {
        return Err(GexError::data(format!("Malformed option symbol: {symbol:?}")));
    }
    let n = symbol.len();

    let expiry_str = &symbol[n - 15..n - 9];
    let expiration = NaiveDate::parse_from_str(expiry_str, "%y%m%d")
        .map_err(|e| GexError::data(format!("Bad expiration in {symbol:?}: {e}")))?;

    let flag = symbol.as_bytes()[n - 9] as char;
    let option_type = OptionType::from_flag(flag)
        .ok_or_else(|| GexError::data(format!("Bad type flag {flag:?} in {symbol:?}")))?;

    let whole = &symbol[n - 8..n - 3];
    let frac = &symbol[n - 3..];
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GexError::data(format!("Bad strike digits in {symbol:?}")));
    }
    let whole = whole.trim_start_matches('0');
    let whole: f64 = if whole.is_empty() {
        0.0
    } else {
        whole
            .parse()
            .map_err(|e| GexError::data(format!("Bad strike in {symbol:?}: {e}")))?
    };
    let frac: f64 = frac
        .parse::<u32>()
        .map_err(|e| GexError::data(format!("Bad strike in {symbol:?}: {e}")))? as f64
        / 1000.0;

    Ok(ParsedSymbol {
        expiration,
        option_type,
        strike: whole + frac,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_type() {
        assert_eq!(OptionType::Call.phi(), 1.0);
        assert_eq!(OptionType::Put.phi(), -1.0);
        assert_eq!(OptionType::from_flag('C'), Some(OptionType::Call));
        assert_eq!(OptionType::from_flag('P'), Some(OptionType::Put));
        assert_eq!(OptionType::from_flag('X'), None);
    }

    #[test]
    fn test_parse_index_symbol() {
        let parsed = parse_option_symbol("SPXW240119C04500000").unwrap();
        assert_eq!(parsed.expiration, NaiveDate::from_ymd_opt(2024, 1, 19).unwrap());
        assert_eq!(parsed.option_type, OptionType::Call);
        assert_eq!(parsed.strike, 4500.0);

        let put = parse_option_symbol("SPX241220P05125000").unwrap();
        assert_eq!(put.option_type, OptionType::Put);
        assert_eq!(put.strike, 5125.0);
    }

    #[test]
    fn test_parse_fractional_strike() {
        let parsed = parse_option_symbol("VIX240117C00017500").unwrap();
        assert!((parsed.strike - 17.5).abs() < 1e-12);
    }

    #[test]
    fn test_missing_fields_survive_json() {
        let exp = NaiveDate::from_ymd_opt(2024, 1, 19).unwrap();
        let contract = OptionContract::new(exp, 4500.0, OptionType::Put, 0.2, f64::NAN, 0.001);

        let json = serde_json::to_string(&contract).unwrap();
        assert!(json.contains("\"open_interest\":null"));

        let back: OptionContract = serde_json::from_str(&json).unwrap();
        assert!(back.open_interest.is_nan());
        assert!(back.bid.is_nan());
        assert_eq!(back.gamma, 0.001);
        assert_eq!(back.implied_vol, 0.2);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_option_symbol("SPX").is_err());
        assert!(parse_option_symbol("SPXW241319C04500000").is_err()); // month 13
        assert!(parse_option_symbol("SPXW240119X04500000").is_err());
        assert!(parse_option_symbol("SPXW240119C045A0000").is_err());
    }
}
