use std::collections::BTreeMap;

use analysis_core::RecommendationKey;

use crate::benchmarks::SectorBenchmark;
use crate::scoring::{as_percent, Metrics};

pub const MAX_STRENGTHS: usize = 3;
pub const MAX_WEAKNESSES: usize = 3;
pub const MAX_RED_FLAGS: usize = 4;
pub const MAX_CATALYSTS: usize = 4;

/// Relative gap inside which a metric counts as in line with its sector
const IN_LINE_PCT: f64 = 10.0;

pub fn strengths_and_weaknesses(m: &Metrics, b: &SectorBenchmark) -> (Vec<String>, Vec<String>) {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    if let Some(pe) = m.trailing_pe {
        if pe < b.pe_good {
            strengths.push(format!("Undervalued P/E: {:.1} (sector avg: {})", pe, b.pe_avg));
        } else if pe > b.pe_bad {
            weaknesses.push(format!("High P/E: {:.1} (sector avg: {})", pe, b.pe_avg));
        }
    }

    if let Some(growth) = m.revenue_growth.map(as_percent) {
        if growth > b.growth_avg * 1.5 {
            strengths.push(format!(
                "Strong Revenue Growth: {:.1}% (sector avg: {}%)",
                growth, b.growth_avg
            ));
        } else if growth < b.growth_avg * 0.5 {
            weaknesses.push(format!(
                "Weak Revenue Growth: {:.1}% (sector avg: {}%)",
                growth, b.growth_avg
            ));
        }
    }

    if let Some(margin) = m.profit_margins.map(as_percent) {
        if margin > b.margin_avg * 1.3 {
            strengths.push(format!("Excellent Margins: {:.1}% (sector avg: {}%)", margin, b.margin_avg));
        } else if margin < b.margin_avg * 0.7 {
            weaknesses.push(format!("Low Margins: {:.1}% (sector avg: {}%)", margin, b.margin_avg));
        }
    }

    if let Some(roe) = m.return_on_equity.map(as_percent) {
        if roe > b.roe_avg * 1.3 {
            strengths.push(format!("Strong ROE: {:.1}% (sector avg: {}%)", roe, b.roe_avg));
        } else if roe < b.roe_avg * 0.7 {
            weaknesses.push(format!("Weak ROE: {:.1}% (sector avg: {}%)", roe, b.roe_avg));
        }
    }

    if let Some(peg) = m.peg_ratio.filter(|&peg| peg < 1.0) {
        strengths.push(format!("Low PEG Ratio: {:.2} (growth at a reasonable price)", peg));
    }

    strengths.truncate(MAX_STRENGTHS);
    weaknesses.truncate(MAX_WEAKNESSES);
    (strengths, weaknesses)
}

pub fn red_flags(m: &Metrics, b: &SectorBenchmark) -> Vec<String> {
    let mut flags = Vec::new();

    if let Some(de) = m.debt_to_equity.filter(|&de| de > b.debt_equity_ok * 2.0) {
        flags.push(format!("High Debt: D/E = {:.1} (sector ok: {})", de, b.debt_equity_ok));
    }

    if let Some(fcf) = m.free_cashflow.filter(|&fcf| fcf < 0.0) {
        flags.push(format!("Negative Free Cash Flow: ${:.2}B", fcf / 1e9));
    }

    if let Some(short) = m.short_percent_of_float.filter(|&s| s > 0.15) {
        flags.push(format!("High Short Interest: {:.1}% of float", as_percent(short)));
    }

    if let Some(growth) = m.revenue_growth.filter(|&g| g < -0.05) {
        flags.push(format!("Revenue Declining: {:.1}%", as_percent(growth)));
    }

    if let (Some(ma200), Some(price)) = (m.two_hundred_day_average, m.current_price) {
        if price < ma200 * 0.9 {
            let below = (1.0 - price / ma200) * 100.0;
            flags.push(format!("Price {:.1}% below 200-day MA (bearish trend)", below));
        }
    }

    flags.truncate(MAX_RED_FLAGS);
    flags
}

pub fn catalysts(m: &Metrics) -> Vec<String> {
    let mut catalysts = Vec::new();

    if let Some(perf) = m.performance.three_month.filter(|&p| p > 15.0) {
        catalysts.push(format!("Strong 3M Momentum: +{:.1}%", perf));
    }

    if let (Some(upside), Some(target)) = (m.analyst_upside(), m.target_mean_price) {
        if upside > 20.0 {
            catalysts.push(format!("Analyst Upside: {:.1}% (target: ${:.2})", upside, target));
        }
    }

    if let (Some(peg), Some(growth)) = (m.peg_ratio, m.revenue_growth) {
        if peg < 1.2 && growth > 0.10 {
            catalysts.push(format!(
                "Growth at Value: PEG {:.2} with {:.0}% growth",
                peg,
                as_percent(growth)
            ));
        }
    }

    if let Some(gm) = m.gross_margins.filter(|&gm| gm > 0.4) {
        catalysts.push(format!("High Gross Margins: {:.1}% (pricing power)", as_percent(gm)));
    }

    if m.recommendation == Some(RecommendationKey::StrongBuy) {
        catalysts.push("Analyst Consensus: STRONG BUY".to_string());
    }

    catalysts.truncate(MAX_CATALYSTS);
    catalysts
}

enum Standing {
    InLine,
    Above,
    Below,
}

fn standing(value: f64, avg: f64) -> Standing {
    let gap = (value - avg) / avg * 100.0;
    if gap.abs() < IN_LINE_PCT {
        Standing::InLine
    } else if value > avg {
        Standing::Above
    } else {
        Standing::Below
    }
}

/// P/E, margin and revenue growth next to the sector averages.
///
/// Metrics the snapshot does not report are left out of the map.
pub fn sector_comparison(m: &Metrics, b: &SectorBenchmark) -> BTreeMap<String, String> {
    let mut comparison = BTreeMap::new();

    if let Some(pe) = m.trailing_pe {
        let text = match standing(pe, b.pe_avg) {
            Standing::InLine => format!("{:.1} ≈ sector avg ({})", pe, b.pe_avg),
            Standing::Below => format!("{:.1} < sector avg ({}) CHEAPER", pe, b.pe_avg),
            Standing::Above => format!("{:.1} > sector avg ({}) PRICIER", pe, b.pe_avg),
        };
        comparison.insert("P/E".to_string(), text);
    }

    if let Some(margin) = m.profit_margins.map(as_percent) {
        let text = match standing(margin, b.margin_avg) {
            Standing::InLine => format!("{:.1}% ≈ sector avg ({}%)", margin, b.margin_avg),
            Standing::Above => format!("{:.1}% > sector avg ({}%) BETTER", margin, b.margin_avg),
            Standing::Below => format!("{:.1}% < sector avg ({}%) WEAKER", margin, b.margin_avg),
        };
        comparison.insert("Margins".to_string(), text);
    }

    if let Some(growth) = m.revenue_growth.map(as_percent) {
        let text = match standing(growth, b.growth_avg) {
            Standing::InLine => format!("{:.1}% ≈ sector avg ({}%)", growth, b.growth_avg),
            Standing::Above => format!("{:.1}% > sector avg ({}%) FASTER", growth, b.growth_avg),
            Standing::Below => format!("{:.1}% < sector avg ({}%) SLOWER", growth, b.growth_avg),
        };
        comparison.insert("Growth".to_string(), text);
    }

    comparison
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmarks::benchmark_for;

    #[test]
    fn test_red_flags_capped_in_order() {
        let m = Metrics {
            debt_to_equity: Some(5.0),
            free_cashflow: Some(-1.5e9),
            short_percent_of_float: Some(0.25),
            revenue_growth: Some(-0.10),
            two_hundred_day_average: Some(100.0),
            current_price: Some(80.0),
            ..Metrics::default()
        };
        let flags = red_flags(&m, benchmark_for("Technology"));
        assert_eq!(
            flags,
            vec![
                "High Debt: D/E = 5.0 (sector ok: 1.5)",
                "Negative Free Cash Flow: $-1.50B",
                "High Short Interest: 25.0% of float",
                "Revenue Declining: -10.0%",
            ]
        );
    }

    #[test]
    fn test_price_below_long_average_flag() {
        let m = Metrics {
            two_hundred_day_average: Some(100.0),
            current_price: Some(80.0),
            ..Metrics::default()
        };
        let flags = red_flags(&m, benchmark_for("Energy"));
        assert_eq!(flags, vec!["Price 20.0% below 200-day MA (bearish trend)"]);
    }

    #[test]
    fn test_weaknesses() {
        let m = Metrics {
            trailing_pe: Some(70.0),
            revenue_growth: Some(0.02),
            profit_margins: Some(0.05),
            return_on_equity: Some(0.05),
            ..Metrics::default()
        };
        let (strengths, weaknesses) = strengths_and_weaknesses(&m, benchmark_for("Technology"));
        assert!(strengths.is_empty());
        assert_eq!(weaknesses.len(), MAX_WEAKNESSES);
        assert_eq!(weaknesses[0], "High P/E: 70.0 (sector avg: 35)");
        assert_eq!(weaknesses[1], "Weak Revenue Growth: 2.0% (sector avg: 15%)");
        assert_eq!(weaknesses[2], "Low Margins: 5.0% (sector avg: 25%)");
    }

    #[test]
    fn test_catalysts() {
        let m = Metrics {
            performance: analysis_core::PerformanceFigures {
                three_month: Some(18.0),
                ..Default::default()
            },
            gross_margins: Some(0.55),
            ..Metrics::default()
        };
        assert_eq!(
            catalysts(&m),
            vec!["Strong 3M Momentum: +18.0%", "High Gross Margins: 55.0% (pricing power)"]
        );
    }

    #[test]
    fn test_comparison_in_line_bucket() {
        let m = Metrics {
            trailing_pe: Some(33.0),
            profit_margins: Some(0.20),
            ..Metrics::default()
        };
        let comparison = sector_comparison(&m, benchmark_for("Technology"));
        assert_eq!(comparison["P/E"], "33.0 ≈ sector avg (35)");
        assert_eq!(comparison["Margins"], "20.0% < sector avg (25%) WEAKER");
        assert!(!comparison.contains_key("Growth"));
    }
}
