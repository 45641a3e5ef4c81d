use async_trait::async_trait;
use crate::{AnalysisError, Bar, Fundamentals};

/// Source of price history and fundamentals (HTTP providers live outside this workspace)
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch_bars(&self, symbol: &str, days_back: i64) -> Result<Vec<Bar>, AnalysisError>;

    async fn fetch_fundamentals(&self, symbol: &str) -> Result<Fundamentals, AnalysisError>;
}

/// Keyed cache collaborator. Freshness policy belongs to the implementation.
pub trait AnalysisCache<V>: Send + Sync {
    fn get(&self, key: &str) -> Option<V>;

    fn put(&self, key: &str, value: V);
}
