//! Category scores.
//!
//! Each category collects zero or more points from the metrics it can see and
//! averages them. Missing metrics add nothing; a category with no points sits
//! at the neutral 50.

use analysis_core::{Fundamentals, PerformanceFigures, RecommendationKey};

use crate::benchmarks::SectorBenchmark;

pub const NEUTRAL_SCORE: f64 = 50.0;

/// 1-week, 1-month and 3-month performance weights
pub const MOMENTUM_WEIGHTS: [f64; 3] = [1.2, 1.0, 0.8];

/// Fraction to whole percent, rounded to 1e-9 so that 0.30 compares as 30.
pub fn as_percent(fraction: f64) -> f64 {
    (fraction * 100.0 * 1e9).round() / 1e9
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// The metrics the scorer reads, with non-finite values dropped and the
/// caller's price and performance overrides applied.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    pub trailing_pe: Option<f64>,
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
    pub recommendation: Option<RecommendationKey>,
    pub target_mean_price: Option<f64>,
    pub held_percent_institutions: Option<f64>,
    pub short_percent_of_float: Option<f64>,
    pub fifty_day_average: Option<f64>,
    pub two_hundred_day_average: Option<f64>,
    pub current_price: Option<f64>,
    pub performance: PerformanceFigures,
}

impl Metrics {
    /// An explicit price or performance argument wins over the snapshot's own.
    pub fn resolve(
        fundamentals: &Fundamentals,
        current_price: Option<f64>,
        performance: Option<&PerformanceFigures>,
    ) -> Self {
        let perf = performance.copied().unwrap_or(fundamentals.performance);
        Self {
            trailing_pe: finite(fundamentals.trailing_pe),
            forward_pe: finite(fundamentals.forward_pe),
            peg_ratio: finite(fundamentals.peg_ratio),
            price_to_book: finite(fundamentals.price_to_book),
            return_on_equity: finite(fundamentals.return_on_equity),
            return_on_assets: finite(fundamentals.return_on_assets),
            debt_to_equity: finite(fundamentals.debt_to_equity),
            profit_margins: finite(fundamentals.profit_margins),
            gross_margins: finite(fundamentals.gross_margins),
            revenue_growth: finite(fundamentals.revenue_growth),
            earnings_growth: finite(fundamentals.earnings_growth),
            free_cashflow: finite(fundamentals.free_cashflow),
            recommendation: fundamentals.recommendation_key,
            target_mean_price: finite(fundamentals.target_mean_price),
            held_percent_institutions: finite(fundamentals.held_percent_institutions),
            short_percent_of_float: finite(fundamentals.short_percent_of_float),
            fifty_day_average: finite(fundamentals.fifty_day_average),
            two_hundred_day_average: finite(fundamentals.two_hundred_day_average),
            current_price: finite(current_price.or(fundamentals.current_price)),
            performance: PerformanceFigures {
                one_day: finite(perf.one_day),
                one_week: finite(perf.one_week),
                one_month: finite(perf.one_month),
                three_month: finite(perf.three_month),
            },
        }
    }

    /// Percent upside of the analyst mean target over the current price
    pub fn analyst_upside(&self) -> Option<f64> {
        let target = self.target_mean_price?;
        let current = self.current_price?;
        let upside = (target - current) / current * 100.0;
        upside.is_finite().then_some(upside)
    }
}

#[derive(Debug, Default)]
struct Points(Vec<f64>);

impl Points {
    fn push(&mut self, point: f64) {
        self.0.push(point);
    }

    fn score(&self) -> f64 {
        if self.0.is_empty() {
            NEUTRAL_SCORE
        } else {
            self.0.iter().sum::<f64>() / self.0.len() as f64
        }
    }
}

pub fn valuation_score(m: &Metrics, b: &SectorBenchmark) -> f64 {
    let mut points = Points::default();

    if let Some(pe) = m.trailing_pe {
        points.push(if pe < b.pe_good {
            80.0
        } else if pe < b.pe_avg {
            60.0
        } else if pe < b.pe_bad {
            40.0
        } else {
            20.0
        });
    }

    if let Some(pb) = m.price_to_book {
        points.push(if pb < b.pb_avg * 0.5 {
            80.0
        } else if pb < b.pb_avg {
            60.0
        } else if pb < b.pb_avg * 1.5 {
            40.0
        } else {
            20.0
        });
    }

    if let Some(peg) = m.peg_ratio {
        points.push(if peg < 1.0 {
            90.0
        } else if peg < 1.5 {
            70.0
        } else if peg < 2.0 {
            50.0
        } else {
            30.0
        });
    }

    // forward P/E only means something next to a trailing one
    if let (Some(forward), Some(pe)) = (m.forward_pe, m.trailing_pe) {
        points.push(if forward < pe * 0.9 {
            70.0
        } else if forward < pe {
            60.0
        } else {
            40.0
        });
    }

    points.score()
}

pub fn financial_health_score(m: &Metrics, b: &SectorBenchmark) -> f64 {
    let mut points = Points::default();

    if let Some(roe) = m.return_on_equity.map(as_percent) {
        points.push(relative_quality(roe, b.roe_avg));
    }

    if let Some(roa) = m.return_on_assets {
        points.push(if roa > 0.15 {
            85.0
        } else if roa > 0.10 {
            70.0
        } else if roa > 0.05 {
            50.0
        } else {
            30.0
        });
    }

    if let Some(de) = m.debt_to_equity {
        let ok = b.debt_equity_ok;
        points.push(if de < ok * 0.5 {
            90.0
        } else if de < ok {
            70.0
        } else if de < ok * 1.5 {
            40.0
        } else {
            20.0
        });
    }

    if let Some(margin) = m.profit_margins.map(as_percent) {
        points.push(relative_quality(margin, b.margin_avg));
    }

    if let Some(fcf) = m.free_cashflow {
        points.push(if fcf > 0.0 { 70.0 } else { 20.0 });
    }

    points.score()
}

/// ROE and profit margin against the sector average
fn relative_quality(pct: f64, avg: f64) -> f64 {
    if pct > avg * 1.3 {
        90.0
    } else if pct > avg {
        70.0
    } else if pct > avg * 0.7 {
        50.0
    } else {
        30.0
    }
}

pub fn growth_score(m: &Metrics, b: &SectorBenchmark) -> f64 {
    let mut points = Points::default();

    if let Some(growth) = m.revenue_growth.map(as_percent) {
        let avg = b.growth_avg;
        points.push(if growth > avg * 2.0 {
            95.0
        } else if growth > avg * 1.3 {
            80.0
        } else if growth > avg {
            65.0
        } else if growth > 0.0 {
            45.0
        } else {
            20.0
        });
    }

    if let Some(eg) = m.earnings_growth.map(as_percent) {
        points.push(if eg > 25.0 {
            90.0
        } else if eg > 15.0 {
            75.0
        } else if eg > 5.0 {
            55.0
        } else if eg > 0.0 {
            40.0
        } else {
            25.0
        });
    }

    if let Some(gm) = m.gross_margins.map(as_percent) {
        points.push(if gm > 50.0 {
            85.0
        } else if gm > 30.0 {
            70.0
        } else if gm > 20.0 {
            50.0
        } else {
            30.0
        });
    }

    points.score()
}

/// Weighted performance points plus the moving-average position, capped at 100.
pub fn momentum_score(m: &Metrics) -> f64 {
    let mut points = Points::default();
    let perf = &m.performance;

    for (change, weight) in [perf.one_week, perf.one_month, perf.three_month]
        .into_iter()
        .zip(MOMENTUM_WEIGHTS)
    {
        let Some(change) = change else { continue };
        let base = if change > 10.0 {
            90.0
        } else if change > 5.0 {
            75.0
        } else if change > 0.0 {
            60.0
        } else if change > -5.0 {
            40.0
        } else {
            20.0
        };
        points.push(base * weight);
    }

    if let (Some(ma50), Some(ma200), Some(price)) =
        (m.fifty_day_average, m.two_hundred_day_average, m.current_price)
    {
        points.push(if price > ma50 && ma50 > ma200 {
            85.0
        } else if price > ma50 {
            70.0
        } else if price > ma200 {
            55.0
        } else {
            30.0
        });
    }

    points.score().min(100.0)
}

pub fn sentiment_score(m: &Metrics) -> f64 {
    let mut points = Points::default();

    if let Some(key) = m.recommendation {
        points.push(key.points());
    }

    if let Some(upside) = m.analyst_upside() {
        points.push(if upside > 30.0 {
            95.0
        } else if upside > 15.0 {
            80.0
        } else if upside > 5.0 {
            65.0
        } else if upside > -5.0 {
            45.0
        } else {
            25.0
        });
    }

    if let Some(inst) = m.held_percent_institutions {
        points.push(if inst > 0.7 {
            70.0
        } else if inst > 0.5 {
            60.0
        } else {
            45.0
        });
    }

    if let Some(short) = m.short_percent_of_float {
        points.push(if short < 0.05 {
            75.0
        } else if short < 0.10 {
            60.0
        } else if short > 0.20 {
            30.0
        } else {
            50.0
        });
    }

    points.score()
}
