//! CBOE delayed-quotes fetcher
//!
//! Fetches the full option chain for an index (SPX, NDX, RUT, VIX, ...)
//! from CBOE's public delayed-quotes CDN. Quotes are delayed ~15 minutes.

use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::core::{parse_option_symbol, ChainSnapshot, GexError, GexResult, OptionContract};

/// CBOE delayed-quotes API client
pub struct CboeClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl CboeClient {
    pub fn new() -> GexResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| GexError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: "https://cdn.cboe.com/api/global/delayed_quotes/options".to_string(),
        })
    }

    /// Point the client at a different host (mirrors, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn chain_url(&self, ticker: &str) -> String {
        format!("{}/_{}.json", self.base_url, ticker.to_uppercase())
    }

    /// Fetch the full chain for `ticker`, dated by the feed timestamp
    pub fn get_chain(&self, ticker: &str) -> GexResult<ChainSnapshot> {
        let url = self.chain_url(ticker);
        tracing::info!("Fetching {} chain from {}", ticker, url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| GexError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GexError::network(format!(
                "Download for {ticker} failed with status {status}"
            )));
        }

        let body = response
            .text()
            .map_err(|e| GexError::network(e.to_string()))?;

        parse_chain_response(ticker, &body)
    }
}

/// Convert a delayed-quotes JSON body into a snapshot.
///
/// The snapshot is dated by the body's `timestamp` (quote time, US market
/// date) so saved responses replay with their original day counts; the
/// local date is used only when the timestamp is absent or unreadable.
/// Records whose symbol cannot be decoded are skipped with a warning;
/// missing numeric fields become `NaN`.
pub fn parse_chain_response(ticker: &str, body: &str) -> GexResult<ChainSnapshot> {
    let response: CboeResponse = serde_json::from_str(body)
        .map_err(|e| GexError::data(format!("Failed to parse chain: {e}")))?;

    let spot = response
        .data
        .close
        .ok_or_else(|| GexError::data("Chain has no close price"))?;

    let as_of = match response.timestamp.as_deref().and_then(timestamp_date) {
        Some(date) => date,
        None => {
            tracing::warn!("Chain has no usable timestamp, dating it today");
            Local::now().date_naive()
        }
    };

    let mut snapshot = ChainSnapshot::new(ticker.to_uppercase(), spot, as_of);
    let mut skipped = 0usize;

    for record in &response.data.options {
        match convert_option(record) {
            Ok(contract) => snapshot.add_contract(contract),
            Err(e) => {
                skipped += 1;
                tracing::warn!("Skipping {}: {}", record.option, e);
            }
        }
    }

    tracing::info!(
        "Parsed {} contracts for {} (spot {:.2}, {} skipped)",
        snapshot.contracts.len(),
        snapshot.underlying,
        spot,
        skipped
    );
    Ok(snapshot)
}

/// Date part of a feed timestamp such as "2024-01-08 16:15:00"
fn timestamp_date(timestamp: &str) -> Option<NaiveDate> {
    let date = timestamp.trim().get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn convert_option(data: &CboeOptionData) -> GexResult<OptionContract> {
    let parsed = parse_option_symbol(&data.option)?;
    let field = |v: Option<f64>| v.unwrap_or(f64::NAN);

    Ok(OptionContract {
        symbol: data.option.clone(),
        expiration: parsed.expiration,
        strike: parsed.strike,
        option_type: parsed.option_type,
        implied_vol: field(data.iv),
        open_interest: field(data.open_interest),
        gamma: field(data.gamma),
        delta: field(data.delta),
        last: field(data.last_trade_price),
        bid: field(data.bid),
        ask: field(data.ask),
        volume: field(data.volume),
    })
}

// CBOE API response structures

#[derive(Debug, Deserialize)]
struct CboeResponse {
    timestamp: Option<String>,
    data: CboeChainData,
}

#[derive(Debug, Deserialize)]
struct CboeChainData {
    close: Option<f64>,
    #[serde(default)]
    options: Vec<CboeOptionData>,
}

#[derive(Debug, Deserialize)]
struct CboeOptionData {
    option: String,
    last_trade_price: Option<f64>,
    bid: Option<f64>,
    ask: Option<f64>,
    volume: Option<f64>,
    iv: Option<f64>,
    delta: Option<f64>,
    gamma: Option<f64>,
    open_interest: Option<f64>,
}

/// Convenience function to fetch the SPX chain
pub fn fetch_spx_chain() -> GexResult<ChainSnapshot> {
    CboeClient::new()?.get_chain("SPX")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{years_to_expiry, OptionType, TRADING_DAYS_PER_YEAR};

    const SAMPLE: &str = r#"{
        "timestamp": "2024-01-08 16:15:00",
        "data": {
            "symbol": "_SPX",
            "close": 4763.54,
            "options": [
                {"option": "SPXW240112C04750000", "last_trade_price": 40.1, "change": 1.2,
                 "bid": 39.8, "ask": 40.4, "volume": 1520, "iv": 0.1234, "delta": 0.55,
                 "gamma": 0.0051, "open_interest": 3021},
                {"option": "SPXW240112P04750000", "last_trade_price": 25.0, "change": -2.0,
                 "bid": 24.7, "ask": 25.3, "volume": 980, "iv": 0.1301, "delta": -0.45,
                 "gamma": 0.0049, "open_interest": null},
                {"option": "BROKEN", "iv": 0.2}
            ]
        }
    }"#;

    #[test]
    fn test_parse_chain_response() {
        let snapshot = parse_chain_response("spx", SAMPLE).unwrap();
        assert_eq!(snapshot.underlying, "SPX");
        assert_eq!(snapshot.spot, 4763.54);
        assert_eq!(snapshot.contracts.len(), 2);

        let call = &snapshot.contracts[0];
        assert_eq!(call.option_type, OptionType::Call);
        assert_eq!(call.strike, 4750.0);
        assert_eq!(call.open_interest, 3021.0);
        assert_eq!(call.gamma, 0.0051);

        let put = &snapshot.contracts[1];
        assert_eq!(put.option_type, OptionType::Put);
        assert!(put.open_interest.is_nan());

        assert_eq!(snapshot.paired().unwrap().len(), 1);
    }

    #[test]
    fn test_snapshot_dated_by_feed_timestamp() {
        let snapshot = parse_chain_response("SPX", SAMPLE).unwrap();
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        assert_eq!(snapshot.as_of, as_of);

        // Day counts follow the capture date, not the day of analysis
        let weekly = NaiveDate::from_ymd_opt(2024, 1, 12).unwrap();
        let quarterly = NaiveDate::from_ymd_opt(2024, 2, 16).unwrap();
        let years = |exp| years_to_expiry(snapshot.as_of, exp, TRADING_DAYS_PER_YEAR);
        assert!((years(weekly) - 4.0 / 262.0).abs() < 1e-15);
        assert!((years(quarterly) - 29.0 / 262.0).abs() < 1e-15);
    }

    #[test]
    fn test_timestamp_date() {
        let jan8 = NaiveDate::from_ymd_opt(2024, 1, 8);
        assert_eq!(timestamp_date("2024-01-08 16:15:00"), jan8);
        assert_eq!(timestamp_date("2024-01-08T16:15:00Z"), jan8);
        assert_eq!(timestamp_date("yesterday"), None);
        assert_eq!(timestamp_date(""), None);
    }

    #[test]
    fn test_missing_close_is_error() {
        let body = r#"{"data": {"options": []}}"#;
        assert!(matches!(
            parse_chain_response("SPX", body),
            Err(GexError::Data(_))
        ));
    }

    #[test]
    fn test_chain_url() {
        let client = CboeClient::new().unwrap().with_base_url("http://localhost");
        assert_eq!(client.chain_url("spx"), "http://localhost/_SPX.json");
    }

    #[test]
    #[ignore] // Requires network
    fn test_get_chain() {
        let snapshot = fetch_spx_chain().unwrap();
        assert!(snapshot.spot > 0.0);
        assert!(!snapshot.contracts.is_empty());
        println!(
            "SPX spot {} with {} contracts",
            snapshot.spot,
            snapshot.contracts.len()
        );
    }
}
