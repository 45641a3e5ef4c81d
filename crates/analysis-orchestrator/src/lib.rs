use analysis_core::{
    AnalysisCache, AnalysisError, AnalysisResult, Bar, Fundamentals, IndicatorSeries, MarketDataSource,
    OhlcvSeries, PerformanceFigures,
};
use chrono::{DateTime, Utc};
use fundamental_analysis::SectorScorer;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use technical_analysis::{trade_signals, IndicatorEngine, TradeSignals};

pub mod cache;
pub mod config;
pub mod source;

pub use cache::{cache_key, get_or_fetch, TtlCache};
pub use config::OrchestratorConfig;
pub use source::{normalize_symbol, within_history, InMemorySource};

/// Everything produced for one ticker
#[derive(Debug, Clone, Serialize)]
pub struct StockReport {
    pub symbol: String,
    pub generated_at: DateTime<Utc>,
    pub indicators: IndicatorSeries,
    pub performance: PerformanceFigures,
    pub signals: TradeSignals,
    pub analysis: AnalysisResult,
}

/// Already-fetched market data for one ticker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefetchedInput {
    pub symbol: String,
    pub bars: Vec<Bar>,
    #[serde(default)]
    pub fundamentals: Fundamentals,
}

pub struct AnalysisOrchestrator<S> {
    source: S,
    config: OrchestratorConfig,
    indicator_engine: IndicatorEngine,
    scorer: SectorScorer,
    /// Cache bars per (symbol, days)
    bars_cache: Box<dyn AnalysisCache<Vec<Bar>>>,
    /// Cache fundamentals per symbol
    fundamentals_cache: Box<dyn AnalysisCache<Fundamentals>>,
}

impl<S: MarketDataSource> AnalysisOrchestrator<S> {
    pub fn new(source: S, config: OrchestratorConfig) -> Result<Self, AnalysisError> {
        let indicator_engine = IndicatorEngine::with_config(config.indicators.clone())?;
        let ttl = config.cache_ttl_secs;

        Ok(Self {
            source,
            config,
            indicator_engine,
            scorer: SectorScorer::new(),
            bars_cache: Box::new(TtlCache::new(ttl)),
            fundamentals_cache: Box::new(TtlCache::new(ttl)),
        })
    }

    pub fn with_bars_cache(mut self, cache: impl AnalysisCache<Vec<Bar>> + 'static) -> Self {
        self.bars_cache = Box::new(cache);
        self
    }

    pub fn with_fundamentals_cache(mut self, cache: impl AnalysisCache<Fundamentals> + 'static) -> Self {
        self.fundamentals_cache = Box::new(cache);
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch (through the caches) and analyze one ticker.
    ///
    /// Missing price history fails the call; missing fundamentals only leave
    /// the scorer with less to work with.
    pub async fn analyze(&self, symbol: &str) -> Result<StockReport, AnalysisError> {
        let symbol = normalize_symbol(symbol);
        let days = self.config.history_days;
        tracing::info!("Starting analysis for {} ({} days of history)", symbol, days);

        let bars_key = cache_key("bars", &[("symbol", symbol.clone()), ("days", days.to_string())]);
        let bars = get_or_fetch(self.bars_cache.as_ref(), &bars_key, || {
            self.source.fetch_bars(&symbol, days)
        })
        .await
        .map_err(|e| {
            tracing::warn!("Price history unavailable for {}: {}", symbol, e);
            e
        })?;

        let fundamentals_key = cache_key("fundamentals", &[("symbol", symbol.clone())]);
        let fundamentals = match get_or_fetch(self.fundamentals_cache.as_ref(), &fundamentals_key, || {
            self.source.fetch_fundamentals(&symbol)
        })
        .await
        {
            Ok(fundamentals) => fundamentals,
            Err(e) => {
                tracing::warn!("Fundamentals unavailable for {}: {}", symbol, e);
                Fundamentals::default()
            }
        };

        let report = self.build_report(&symbol, &bars, fundamentals)?;
        tracing::info!(
            "Analysis complete for {}: {} ({:.1})",
            symbol,
            report.analysis.recommendation.to_label(),
            report.analysis.overall_score
        );
        Ok(report)
    }

    /// Analyze many tickers whose data is already in hand, in parallel.
    ///
    /// Bars older than the configured history window are dropped, as they
    /// would be on a fetch. Results come back in input order.
    pub fn analyze_prefetched(&self, inputs: &[PrefetchedInput]) -> Vec<Result<StockReport, AnalysisError>> {
        tracing::info!("Analyzing {} prefetched tickers", inputs.len());
        inputs
            .par_iter()
            .map(|input| {
                self.build_report(&normalize_symbol(&input.symbol), &input.bars, input.fundamentals.clone())
            })
            .collect()
    }

    fn build_report(
        &self,
        symbol: &str,
        bars: &[Bar],
        fundamentals: Fundamentals,
    ) -> Result<StockReport, AnalysisError> {
        // prefetched bars get the same history window as a fetch
        let bars = within_history(bars, self.config.history_days);
        let series = OhlcvSeries::from_bars(&bars)?;
        let indicators = self.indicator_engine.compute(&series, self.config.indicator_set)?;

        // provider figures win over ones derived from the bars
        let derived = PerformanceFigures::from_closes(series.closes());
        let reported = fundamentals.performance;
        let performance = PerformanceFigures {
            one_day: reported.one_day.or(derived.one_day),
            one_week: reported.one_week.or(derived.one_week),
            one_month: reported.one_month.or(derived.one_month),
            three_month: reported.three_month.or(derived.three_month),
        };

        let fundamentals = fundamentals.with_indicator_snapshot(&indicators);
        let analysis = self.scorer.analyze(&fundamentals, None, None, Some(&performance));
        let signals = trade_signals(&indicators, self.indicator_engine.config().rsi_period);

        Ok(StockReport {
            symbol: symbol.to_string(),
            generated_at: Utc::now(),
            indicators,
            performance,
            signals,
            analysis,
        })
    }
}
