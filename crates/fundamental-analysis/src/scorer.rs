use analysis_core::{AnalysisResult, CategoryScores, Fundamentals, PerformanceFigures, Recommendation};

use crate::benchmarks::{benchmark_for, is_known_sector};
use crate::insights::{catalysts, red_flags, sector_comparison, strengths_and_weaknesses};
use crate::scoring::{
    financial_health_score, growth_score, momentum_score, sentiment_score, valuation_score, Metrics,
};

const UNKNOWN: &str = "Unknown";

/// Scores a company against its sector's benchmark levels.
///
/// Stateless and deterministic; one scorer can be shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectorScorer;

impl SectorScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score one fundamentals snapshot.
    ///
    /// `sector`, `current_price` and `performance` override the snapshot's
    /// own values when given. Missing data never fails the analysis.
    pub fn analyze(
        &self,
        fundamentals: &Fundamentals,
        sector: Option<&str>,
        current_price: Option<f64>,
        performance: Option<&PerformanceFigures>,
    ) -> AnalysisResult {
        let sector = sector
            .or(fundamentals.sector.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string();
        let industry = fundamentals
            .industry
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(UNKNOWN)
            .to_string();

        if !is_known_sector(&sector) {
            tracing::debug!("No benchmark for sector '{}', using default", sector);
        }
        let benchmark = benchmark_for(&sector);
        let metrics = Metrics::resolve(fundamentals, current_price, performance);

        let scores = CategoryScores {
            valuation: valuation_score(&metrics, benchmark),
            financial_health: financial_health_score(&metrics, benchmark),
            growth: growth_score(&metrics, benchmark),
            momentum: momentum_score(&metrics),
            sentiment: sentiment_score(&metrics),
        };
        let overall_score = scores.overall();
        let recommendation = Recommendation::from_score(overall_score);

        tracing::debug!(
            "{} scores: valuation={:.1} health={:.1} growth={:.1} momentum={:.1} sentiment={:.1} overall={:.1}",
            sector,
            scores.valuation,
            scores.financial_health,
            scores.growth,
            scores.momentum,
            scores.sentiment,
            overall_score
        );

        let (strengths, weaknesses) = strengths_and_weaknesses(&metrics, benchmark);

        AnalysisResult {
            overall_score,
            recommendation,
            summary: summary(&sector, overall_score),
            industry,
            scores,
            strengths,
            weaknesses,
            red_flags: red_flags(&metrics, benchmark),
            catalysts: catalysts(&metrics),
            sector_comparison: sector_comparison(&metrics, benchmark),
            sector,
        }
    }
}

/// One sentence with the tone and suggested action for the score bucket.
fn summary(sector: &str, score: f64) -> String {
    let (tone, action) = match Recommendation::from_score(score) {
        Recommendation::StrongBuy => ("very attractive", "Strong case for buying"),
        Recommendation::Buy => ("attractive", "Worth considering a position"),
        Recommendation::Hold => ("neutral", "Hold or wait for a better entry"),
        Recommendation::Sell => ("weak", "Consider reducing the position"),
        Recommendation::StrongSell => ("very weak", "Strong case for selling"),
    };
    format!(
        "Relative to the {} sector, the stock looks {} with a score of {:.0}/100. {}.",
        sector, tone, score, action
    )
}
