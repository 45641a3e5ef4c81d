use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use analysis_core::{AnalysisError, Bar, Fundamentals, MarketDataSource};
use async_trait::async_trait;
use chrono::Duration;

/// Ticker key used everywhere: trimmed and uppercased.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Bars stamped within `days_back` days of the latest bar.
pub fn within_history(bars: &[Bar], days_back: i64) -> Vec<Bar> {
    let Some(last) = bars.last() else {
        return Vec::new();
    };
    let cutoff = last.timestamp - Duration::days(days_back);
    bars.iter().filter(|b| b.timestamp >= cutoff).cloned().collect()
}

/// Market data preloaded in memory, keyed by symbol.
#[derive(Debug, Default)]
pub struct InMemorySource {
    bars: HashMap<String, Vec<Bar>>,
    fundamentals: HashMap<String, Fundamentals>,
    requests: AtomicUsize,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.bars.insert(normalize_symbol(symbol), bars);
        self
    }

    pub fn with_fundamentals(mut self, symbol: &str, fundamentals: Fundamentals) -> Self {
        self.fundamentals.insert(normalize_symbol(symbol), fundamentals);
        self
    }

    /// Number of fetches served so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl MarketDataSource for InMemorySource {
    /// Bars within `days_back` days of the latest stored bar.
    async fn fetch_bars(&self, symbol: &str, days_back: i64) -> Result<Vec<Bar>, AnalysisError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let bars = self
            .bars
            .get(&normalize_symbol(symbol))
            .filter(|bars| !bars.is_empty())
            .ok_or_else(|| AnalysisError::InsufficientData(format!("No bars for {}", symbol)))?;

        Ok(within_history(bars, days_back))
    }

    async fn fetch_fundamentals(&self, symbol: &str) -> Result<Fundamentals, AnalysisError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.fundamentals
            .get(&normalize_symbol(symbol))
            .cloned()
            .ok_or_else(|| AnalysisError::ApiError(format!("No fundamentals for {}", symbol)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn daily_bars(n: i64) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| Bar {
                timestamp: start + Duration::days(i),
                open: 10.0,
                high: 11.0,
                low: 9.0,
                close: 10.0,
                volume: 100.0,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_bars_limits_history() {
        let source = InMemorySource::new().with_bars("aapl", daily_bars(30));
        let bars = source.fetch_bars("AAPL", 9).await.unwrap();
        assert_eq!(bars.len(), 10);
        assert_eq!(source.request_count(), 1);
    }

    #[tokio::test]
    async fn test_symbol_is_trimmed_on_insert_and_lookup() {
        let source = InMemorySource::new()
            .with_bars(" nvda ", daily_bars(5))
            .with_fundamentals("nvda\n", Fundamentals::for_sector("Technology"));
        assert_eq!(source.fetch_bars("NVDA", 30).await.unwrap().len(), 5);
        assert!(source.fetch_bars(" Nvda", 30).await.is_ok());
        assert!(source.fetch_fundamentals("NVDA").await.is_ok());
    }

    #[test]
    fn test_within_history() {
        let bars = daily_bars(30);
        assert_eq!(within_history(&bars, 9).len(), 10);
        assert_eq!(within_history(&bars, 1_000).len(), 30);
        assert!(within_history(&[], 9).is_empty());
    }

    #[tokio::test]
    async fn test_unknown_symbol() {
        let source = InMemorySource::new();
        assert!(matches!(
            source.fetch_bars("MSFT", 30).await,
            Err(AnalysisError::InsufficientData(_))
        ));
        assert!(matches!(
            source.fetch_fundamentals("MSFT").await,
            Err(AnalysisError::ApiError(_))
        ));
    }
}
