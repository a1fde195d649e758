//! Local snapshot caching
//!
//! Caches chain snapshots on disk so repeated runs within the vendor's
//! delay window reuse the same download and offline analysis is possible.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};

use crate::core::{ChainSnapshot, GexError, GexResult};

use super::cboe::CboeClient;

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Cache directory
    pub cache_dir: PathBuf,
    /// Maximum age before refresh (in minutes)
    pub max_age_minutes: i64,
    /// Whether to use cache
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./data/cache"),
            max_age_minutes: 15,
            enabled: true,
        }
    }
}

/// Snapshot cache manager
pub struct SnapshotCache {
    config: CacheConfig,
}

impl SnapshotCache {
    pub fn new(config: CacheConfig) -> GexResult<Self> {
        if config.enabled && !config.cache_dir.exists() {
            fs::create_dir_all(&config.cache_dir)?;
        }

        Ok(Self { config })
    }

    fn cache_path(&self, ticker: &str) -> PathBuf {
        self.config
            .cache_dir
            .join(format!("{}_snapshot.json", ticker.to_uppercase()))
    }

    /// Check if cache is valid (exists and not expired)
    pub fn is_valid(&self, ticker: &str) -> bool {
        if !self.config.enabled {
            return false;
        }

        let path = self.cache_path(ticker);
        let Ok(modified) = fs::metadata(&path).and_then(|m| m.modified()) else {
            return false;
        };
        let modified: DateTime<Utc> = modified.into();
        Utc::now() - modified < Duration::minutes(self.config.max_age_minutes)
    }

    pub fn save(&self, snapshot: &ChainSnapshot) -> GexResult<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let path = self.cache_path(&snapshot.underlying);
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| GexError::Serialization(e.to_string()))?;
        fs::write(&path, json)?;

        tracing::info!("Cached {} snapshot at {:?}", snapshot.underlying, path);
        Ok(())
    }

    /// Load a fresh cached snapshot, `None` if absent or stale
    pub fn load(&self, ticker: &str) -> GexResult<Option<ChainSnapshot>> {
        if !self.is_valid(ticker) {
            return Ok(None);
        }

        let json = fs::read_to_string(self.cache_path(ticker))?;
        let snapshot: ChainSnapshot =
            serde_json::from_str(&json).map_err(|e| GexError::Serialization(e.to_string()))?;

        tracing::info!("Loaded {} snapshot from cache", ticker);
        Ok(Some(snapshot))
    }

    pub fn clear(&self, ticker: &str) -> GexResult<()> {
        let path = self.cache_path(ticker);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// List cached tickers
    pub fn list_cached(&self) -> GexResult<Vec<String>> {
        let mut tickers = Vec::new();
        if !self.config.cache_dir.exists() {
            return Ok(tickers);
        }

        for entry in fs::read_dir(&self.config.cache_dir)? {
            let file_name = entry?.file_name().to_string_lossy().to_string();
            if let Some(ticker) = file_name.strip_suffix("_snapshot.json") {
                tickers.push(ticker.to_string());
            }
        }
        tickers.sort();
        Ok(tickers)
    }
}

/// Cached data fetcher - combines cache with live fetching
pub struct CachedFetcher {
    cache: SnapshotCache,
    client: CboeClient,
}

impl CachedFetcher {
    pub fn new(config: CacheConfig) -> GexResult<Self> {
        Ok(Self {
            cache: SnapshotCache::new(config)?,
            client: CboeClient::new()?,
        })
    }

    /// Get snapshot (from cache or fetch)
    pub fn get_chain(&self, ticker: &str) -> GexResult<ChainSnapshot> {
        if let Some(snapshot) = self.cache.load(ticker)? {
            return Ok(snapshot);
        }

        tracing::info!("Fetching fresh data for {}", ticker);
        let snapshot = self.client.get_chain(ticker)?;
        self.cache.save(&snapshot)?;

        Ok(snapshot)
    }

    /// Force refresh (bypass cache)
    pub fn refresh_chain(&self, ticker: &str) -> GexResult<ChainSnapshot> {
        self.cache.clear(ticker)?;
        self.get_chain(ticker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{OptionContract, OptionType};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn config(dir: &std::path::Path) -> CacheConfig {
        CacheConfig {
            cache_dir: dir.to_path_buf(),
            max_age_minutes: 15,
            enabled: true,
        }
    }

    #[test]
    fn test_cache_operations() {
        let temp_dir = tempdir().unwrap();
        let cache = SnapshotCache::new(config(temp_dir.path())).unwrap();

        let exp = NaiveDate::from_ymd_opt(2024, 1, 19).unwrap();
        let mut snapshot = ChainSnapshot::new("SPX", 4763.54, exp);
        snapshot.add_contract(OptionContract::new(exp, 4750.0, OptionType::Call, 0.12, 10.0, f64::NAN));

        cache.save(&snapshot).unwrap();
        assert!(cache.is_valid("SPX"));
        assert!(cache.is_valid("spx"));
        assert_eq!(cache.list_cached().unwrap(), vec!["SPX".to_string()]);

        let loaded = cache.load("SPX").unwrap().unwrap();
        assert_eq!(loaded.underlying, "SPX");
        assert_eq!(loaded.contracts.len(), 1);
        assert_eq!(loaded.contracts[0].strike, 4750.0);

        cache.clear("SPX").unwrap();
        assert!(!cache.is_valid("SPX"));
        assert!(cache.load("SPX").unwrap().is_none());
    }

    /// Fetcher whose live source is unreachable, so only the cache can answer
    fn offline_fetcher(dir: &std::path::Path) -> CachedFetcher {
        CachedFetcher {
            cache: SnapshotCache::new(config(dir)).unwrap(),
            client: CboeClient::new().unwrap().with_base_url("http://127.0.0.1:9"),
        }
    }

    fn seed(dir: &std::path::Path) {
        let exp = NaiveDate::from_ymd_opt(2024, 1, 19).unwrap();
        let mut snapshot = ChainSnapshot::new("SPX", 4763.54, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        snapshot.add_contract(OptionContract::new(exp, 4750.0, OptionType::Call, 0.12, 10.0, 0.004));
        snapshot.add_contract(OptionContract::new(exp, 4750.0, OptionType::Put, 0.13, 12.0, 0.004));
        SnapshotCache::new(config(dir)).unwrap().save(&snapshot).unwrap();
    }

    #[test]
    fn test_fetcher_serves_fresh_cache() {
        let temp_dir = tempdir().unwrap();
        seed(temp_dir.path());

        let snapshot = offline_fetcher(temp_dir.path()).get_chain("SPX").unwrap();
        assert_eq!(snapshot.as_of, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert_eq!(snapshot.contracts.len(), 2);
        assert!(snapshot.contracts[0].bid.is_nan());
    }

    #[test]
    fn test_fetcher_misses_go_to_network() {
        let temp_dir = tempdir().unwrap();
        let fetcher = offline_fetcher(temp_dir.path());
        assert!(matches!(fetcher.get_chain("SPX"), Err(GexError::Network(_))));
    }

    #[test]
    fn test_refresh_drops_cached_snapshot() {
        let temp_dir = tempdir().unwrap();
        seed(temp_dir.path());
        let fetcher = offline_fetcher(temp_dir.path());

        assert!(matches!(fetcher.refresh_chain("SPX"), Err(GexError::Network(_))));
        assert!(!fetcher.cache.is_valid("SPX"));
        assert!(fetcher.cache.list_cached().unwrap().is_empty());
    }

    #[test]
    fn test_disabled_cache() {
        let temp_dir = tempdir().unwrap();
        let cache = SnapshotCache::new(CacheConfig {
            enabled: false,
            ..config(temp_dir.path())
        })
        .unwrap();

        let snapshot = ChainSnapshot::new("SPX", 4763.54, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        cache.save(&snapshot).unwrap();
        assert!(cache.load("SPX").unwrap().is_none());
    }
}
