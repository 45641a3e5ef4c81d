use serde::Serialize;

/// Typical valuation and quality levels for one sector.
///
/// Percent-like levels (`roe_avg`, `margin_avg`, `growth_avg`) are whole
/// percentages, ratios are plain multiples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectorBenchmark {
    pub pe_avg: f64,
    pub pe_good: f64,
    pub pe_bad: f64,
    pub pb_avg: f64,
    pub roe_avg: f64,
    pub margin_avg: f64,
    pub growth_avg: f64,
    pub debt_equity_ok: f64,
}

#[allow(clippy::too_many_arguments)]
const fn row(
    pe_avg: f64,
    pe_good: f64,
    pe_bad: f64,
    pb_avg: f64,
    roe_avg: f64,
    margin_avg: f64,
    growth_avg: f64,
    debt_equity_ok: f64,
) -> SectorBenchmark {
    SectorBenchmark {
        pe_avg,
        pe_good,
        pe_bad,
        pb_avg,
        roe_avg,
        margin_avg,
        growth_avg,
        debt_equity_ok,
    }
}

pub static SECTOR_BENCHMARKS: [(&str, SectorBenchmark); 12] = [
    ("Technology", row(35.0, 25.0, 60.0, 8.0, 20.0, 25.0, 15.0, 1.5)),
    ("Software", row(45.0, 30.0, 80.0, 15.0, 25.0, 30.0, 25.0, 1.0)),
    // banks run with high leverage
    ("Finance", row(12.0, 10.0, 18.0, 1.2, 12.0, 35.0, 8.0, 3.0)),
    ("Consumer Cyclical", row(20.0, 15.0, 30.0, 4.0, 18.0, 10.0, 10.0, 1.2)),
    ("Healthcare", row(22.0, 18.0, 35.0, 5.0, 15.0, 18.0, 12.0, 0.8)),
    ("Energy", row(15.0, 10.0, 25.0, 1.5, 10.0, 8.0, 5.0, 1.0)),
    ("Industrials", row(18.0, 15.0, 25.0, 3.0, 14.0, 12.0, 8.0, 1.0)),
    ("Consumer Defensive", row(22.0, 18.0, 30.0, 4.0, 16.0, 8.0, 5.0, 0.8)),
    ("Communication Services", row(25.0, 18.0, 40.0, 3.0, 15.0, 20.0, 12.0, 1.2)),
    ("Utilities", row(18.0, 15.0, 25.0, 1.8, 10.0, 12.0, 3.0, 1.5)),
    ("Real Estate", row(30.0, 20.0, 50.0, 2.0, 8.0, 15.0, 5.0, 2.0)),
    ("Basic Materials", row(16.0, 12.0, 25.0, 2.0, 12.0, 10.0, 6.0, 0.8)),
];

/// Used for any sector not in the table
pub static DEFAULT_BENCHMARK: SectorBenchmark = row(25.0, 18.0, 40.0, 4.0, 15.0, 15.0, 10.0, 1.0);

/// Exact-name lookup; unknown sectors get [`DEFAULT_BENCHMARK`].
pub fn benchmark_for(sector: &str) -> &'static SectorBenchmark {
    SECTOR_BENCHMARKS
        .iter()
        .find(|(name, _)| *name == sector)
        .map(|(_, benchmark)| benchmark)
        .unwrap_or(&DEFAULT_BENCHMARK)
}

pub fn is_known_sector(sector: &str) -> bool {
    SECTOR_BENCHMARKS.iter().any(|(name, _)| *name == sector)
}
