use serde::{Deserialize, Deserializer, Serialize};

use crate::IndicatorSeries;

/// Analyst consensus key as reported by the data provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKey {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
    /// Anything the provider sends that is not one of the five levels
    Unknown,
}

impl RecommendationKey {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strong_buy" => RecommendationKey::StrongBuy,
            "buy" => RecommendationKey::Buy,
            "hold" => RecommendationKey::Hold,
            "sell" => RecommendationKey::Sell,
            "strong_sell" => RecommendationKey::StrongSell,
            _ => RecommendationKey::Unknown,
        }
    }

    /// Sentiment points for the consensus; unrecognised keys are neutral.
    pub fn points(&self) -> f64 {
        match self {
            RecommendationKey::StrongBuy => 95.0,
            RecommendationKey::Buy => 75.0,
            RecommendationKey::Hold => 50.0,
            RecommendationKey::Sell => 25.0,
            RecommendationKey::StrongSell => 5.0,
            RecommendationKey::Unknown => 50.0,
        }
    }
}

fn recommendation_from_str<'de, D>(deserializer: D) -> Result<Option<RecommendationKey>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .map(|s| RecommendationKey::parse(&s)))
}

/// Short-horizon price change in percent (5.0 == +5%)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceFigures {
    #[serde(rename = "performance_1d", default)]
    pub one_day: Option<f64>,
    #[serde(rename = "performance_1w", default)]
    pub one_week: Option<f64>,
    #[serde(rename = "performance_1m", default)]
    pub one_month: Option<f64>,
    #[serde(rename = "performance_3m", default)]
    pub three_month: Option<f64>,
}

impl PerformanceFigures {
    pub const ONE_DAY_BARS: usize = 1;
    pub const ONE_WEEK_BARS: usize = 4;
    pub const ONE_MONTH_BARS: usize = 21;
    pub const THREE_MONTH_BARS: usize = 63;

    /// Percent change of the last close against the close `lookback` bars earlier.
    pub fn from_closes(closes: &[f64]) -> Self {
        let change = |lookback: usize| -> Option<f64> {
            let last = *closes.last()?;
            let idx = closes.len().checked_sub(lookback + 1)?;
            let base = closes[idx];
            let pct = (last - base) / base * 100.0;
            pct.is_finite().then_some(pct)
        };

        Self {
            one_day: change(Self::ONE_DAY_BARS),
            one_week: change(Self::ONE_WEEK_BARS),
            one_month: change(Self::ONE_MONTH_BARS),
            three_month: change(Self::THREE_MONTH_BARS),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.one_day.is_none() && self.one_week.is_none() && self.one_month.is_none() && self.three_month.is_none()
    }
}

/// Point-in-time company snapshot keyed by the provider's metric names.
///
/// Every metric is optional: an absent metric is "not reported", which is not
/// the same thing as a reported zero. Ratios such as margins and growth are
/// 0-1 fractions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Fundamentals {
    pub sector: Option<String>,
    pub industry: Option<String>,
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub price_to_book: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub return_on_assets: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub profit_margins: Option<f64>,
    pub gross_margins: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub free_cashflow: Option<f64>,
    #[serde(deserialize_with = "recommendation_from_str")]
    pub recommendation_key: Option<RecommendationKey>,
    pub target_mean_price: Option<f64>,
    pub held_percent_institutions: Option<f64>,
    pub held_percent_insiders: Option<f64>,
    pub short_percent_of_float: Option<f64>,
    pub fifty_day_average: Option<f64>,
    pub two_hundred_day_average: Option<f64>,
    pub current_price: Option<f64>,
    #[serde(flatten)]
    pub performance: PerformanceFigures,
}

impl Fundamentals {
    pub fn for_sector(sector: impl Into<String>) -> Self {
        Self {
            sector: Some(sector.into()),
            ..Self::default()
        }
    }

    /// Fill price levels the provider did not report from the latest indicator row.
    ///
    /// Existing values win; undefined indicator values are never merged.
    pub fn with_indicator_snapshot(mut self, indicators: &IndicatorSeries) -> Self {
        if self.current_price.is_none() {
            self.current_price = indicators.base().last_close().filter(|v| v.is_finite());
        }
        if self.fifty_day_average.is_none() {
            self.fifty_day_average = indicators.latest("SMA_50");
        }
        if self.two_hundred_day_average.is_none() {
            self.two_hundred_day_average = indicators.latest("SMA_200");
        }
        self
    }
}
