use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// OHLCV bar data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Raw price/volume columns an indicator may depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriceColumn {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl fmt::Display for PriceColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PriceColumn::Open => "Open",
            PriceColumn::High => "High",
            PriceColumn::Low => "Low",
            PriceColumn::Close => "Close",
            PriceColumn::Volume => "Volume",
        };
        f.write_str(name)
    }
}

/// Discrete recommendation derived from the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Recommendation {
    /// Thresholds are inclusive at the lower bound.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 75.0 => Recommendation::StrongBuy,
            s if s >= 60.0 => Recommendation::Buy,
            s if s >= 40.0 => Recommendation::Hold,
            s if s >= 25.0 => Recommendation::Sell,
            _ => Recommendation::StrongSell,
        }
    }

    /// Human-readable label for the recommendation
    pub fn to_label(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "Strong Buy",
            Recommendation::Buy => "Buy",
            Recommendation::Hold => "Hold",
            Recommendation::Sell => "Sell",
            Recommendation::StrongSell => "Strong Sell",
        }
    }
}

/// Per-category scores, each on a 0-100 scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub valuation: f64,
    pub financial_health: f64,
    pub growth: f64,
    pub momentum: f64,
    pub sentiment: f64,
}

impl CategoryScores {
    pub const VALUATION_WEIGHT: f64 = 0.25;
    pub const HEALTH_WEIGHT: f64 = 0.20;
    pub const GROWTH_WEIGHT: f64 = 0.25;
    pub const MOMENTUM_WEIGHT: f64 = 0.15;
    pub const SENTIMENT_WEIGHT: f64 = 0.15;

    /// Every category at the neutral midpoint
    pub fn neutral() -> Self {
        Self {
            valuation: 50.0,
            financial_health: 50.0,
            growth: 50.0,
            momentum: 50.0,
            sentiment: 50.0,
        }
    }

    /// Weighted composite score
    pub fn overall(&self) -> f64 {
        self.valuation * Self::VALUATION_WEIGHT
            + self.financial_health * Self::HEALTH_WEIGHT
            + self.growth * Self::GROWTH_WEIGHT
            + self.momentum * Self::MOMENTUM_WEIGHT
            + self.sentiment * Self::SENTIMENT_WEIGHT
    }
}

/// Sector-relative analysis of a single company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub overall_score: f64, // 0.0 to 100.0
    pub recommendation: Recommendation,
    pub sector: String,
    pub industry: String,
    pub scores: CategoryScores,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub red_flags: Vec<String>,
    pub catalysts: Vec<String>,
    /// Metric name -> comparison against the sector average
    pub sector_comparison: BTreeMap<String, String>,
    pub summary: String,
}
