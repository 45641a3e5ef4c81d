use analysis_core::{AnalysisError, IndicatorSeries, OhlcvSeries, PriceColumn};
use serde::{Deserialize, Serialize};

use crate::indicators::*;

/// Column names produced by the engine.
pub mod columns {
    pub const MACD: &str = "MACD";
    pub const MACD_SIGNAL: &str = "MACD_Signal";
    pub const MACD_HISTOGRAM: &str = "MACD_Histogram";
    pub const BB_MIDDLE: &str = "BB_Middle";
    pub const BB_UPPER: &str = "BB_Upper";
    pub const BB_LOWER: &str = "BB_Lower";
    pub const BB_WIDTH: &str = "BB_Width";
    pub const BB_PERCENT: &str = "BB_Percent";
    pub const STOCH_K: &str = "Stoch_K";
    pub const STOCH_D: &str = "Stoch_D";
    pub const WILLIAMS_R: &str = "Williams_R";
    pub const CCI: &str = "CCI";
    pub const MFI: &str = "MFI";
    pub const KDJ_K: &str = "KDJ_K";
    pub const KDJ_D: &str = "KDJ_D";
    pub const KDJ_J: &str = "KDJ_J";
    pub const OBV: &str = "OBV";
    pub const VWAP: &str = "VWAP";
    pub const PIVOT: &str = "Pivot";
    pub const R1: &str = "R1";
    pub const R2: &str = "R2";
    pub const R3: &str = "R3";
    pub const S1: &str = "S1";
    pub const S2: &str = "S2";
    pub const S3: &str = "S3";
    pub const SUPPORT: &str = "Support";
    pub const RESISTANCE: &str = "Resistance";
    pub const VOLUME_RATIO: &str = "Volume_Ratio";
    pub const VOLUME_ROC: &str = "Volume_ROC";

    pub fn sma(period: usize) -> String {
        format!("SMA_{}", period)
    }

    pub fn ema(span: usize) -> String {
        format!("EMA_{}", span)
    }

    pub fn rsi(period: usize) -> String {
        format!("RSI_{}", period)
    }

    pub fn atr(period: usize) -> String {
        format!("ATR_{}", period)
    }

    pub fn volume_sma(period: usize) -> String {
        format!("Volume_SMA_{}", period)
    }
}

/// Window parameters for every indicator group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub sma_periods: Vec<usize>,
    pub ema_spans: Vec<usize>,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_k: f64,
    pub atr_period: usize,
    pub stochastic_k: usize,
    pub stochastic_d: usize,
    pub williams_period: usize,
    pub cci_period: usize,
    pub mfi_period: usize,
    pub kdj_period: usize,
    pub kdj_smoothing: usize,
    pub volume_sma_periods: Vec<usize>,
    pub volume_ratio_period: usize,
    pub volume_roc_period: usize,
    pub channel_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_periods: vec![5, 10, 20, 50, 200],
            ema_spans: vec![12, 26, 50],
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_k: 2.0,
            atr_period: 14,
            stochastic_k: 14,
            stochastic_d: 3,
            williams_period: 14,
            cci_period: 20,
            mfi_period: 14,
            kdj_period: 9,
            kdj_smoothing: 3,
            volume_sma_periods: vec![20, 50],
            volume_ratio_period: 20,
            volume_roc_period: 10,
            channel_period: 20,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let windows = [
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("bollinger_period", self.bollinger_period),
            ("atr_period", self.atr_period),
            ("stochastic_k", self.stochastic_k),
            ("stochastic_d", self.stochastic_d),
            ("williams_period", self.williams_period),
            ("cci_period", self.cci_period),
            ("mfi_period", self.mfi_period),
            ("kdj_period", self.kdj_period),
            ("kdj_smoothing", self.kdj_smoothing),
            ("volume_ratio_period", self.volume_ratio_period),
            ("volume_roc_period", self.volume_roc_period),
            ("channel_period", self.channel_period),
        ];
        if let Some((name, _)) = windows.iter().find(|(_, w)| *w == 0) {
            return Err(AnalysisError::InvalidConfig(format!("{} must be positive", name)));
        }

        let lists = [
            ("sma_periods", &self.sma_periods),
            ("ema_spans", &self.ema_spans),
            ("volume_sma_periods", &self.volume_sma_periods),
        ];
        if let Some((name, _)) = lists.iter().find(|(_, periods)| periods.contains(&0)) {
            return Err(AnalysisError::InvalidConfig(format!("{} contains a zero window", name)));
        }

        if self.macd_fast >= self.macd_slow {
            return Err(AnalysisError::InvalidConfig(format!(
                "macd_fast ({}) must be shorter than macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        if !self.bollinger_k.is_finite() || self.bollinger_k <= 0.0 {
            return Err(AnalysisError::InvalidConfig("bollinger_k must be positive".to_string()));
        }
        Ok(())
    }
}

/// Independently computable indicator groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Indicator {
    MovingAverages,
    Rsi,
    Macd,
    Bollinger,
    VolumeMeasures,
    Obv,
    Vwap,
    PivotPoints,
    PriceChannel,
    Kdj,
    Atr,
    Stochastic,
    WilliamsR,
    Cci,
    Mfi,
}

impl Indicator {
    const BASIC: [Indicator; 9] = [
        Indicator::MovingAverages,
        Indicator::Rsi,
        Indicator::Macd,
        Indicator::Bollinger,
        Indicator::VolumeMeasures,
        Indicator::Obv,
        Indicator::Vwap,
        Indicator::PivotPoints,
        Indicator::PriceChannel,
    ];

    const ADVANCED: [Indicator; 6] = [
        Indicator::Kdj,
        Indicator::Atr,
        Indicator::Stochastic,
        Indicator::WilliamsR,
        Indicator::Cci,
        Indicator::Mfi,
    ];

    /// Raw columns this group reads
    pub fn required_columns(&self) -> &'static [PriceColumn] {
        use PriceColumn::*;
        match self {
            Indicator::MovingAverages | Indicator::Rsi | Indicator::Macd | Indicator::Bollinger => &[Close],
            Indicator::VolumeMeasures => &[Volume],
            Indicator::Obv => &[Close, Volume],
            Indicator::PriceChannel => &[High, Low],
            Indicator::PivotPoints
            | Indicator::Kdj
            | Indicator::Atr
            | Indicator::Stochastic
            | Indicator::WilliamsR
            | Indicator::Cci => &[High, Low, Close],
            Indicator::Vwap | Indicator::Mfi => &[High, Low, Close, Volume],
        }
    }
}

/// Which indicators `IndicatorEngine::compute` produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorSet {
    Basic,
    #[default]
    Extended,
}

impl IndicatorSet {
    pub fn indicators(&self) -> Vec<Indicator> {
        match self {
            IndicatorSet::Basic => Indicator::BASIC.to_vec(),
            IndicatorSet::Extended => Indicator::BASIC.iter().chain(Indicator::ADVANCED.iter()).copied().collect(),
        }
    }
}

/// Turns an OHLCV series into an indicator series. Holds no state besides its config.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: IndicatorConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Compute a whole indicator set.
    pub fn compute(&self, series: &OhlcvSeries, set: IndicatorSet) -> Result<IndicatorSeries, AnalysisError> {
        self.compute_only(series, &set.indicators())
    }

    /// Compute just the requested groups, in order.
    ///
    /// Every requested group's columns are checked up front so a missing
    /// column fails the call before any work is done.
    pub fn compute_only(&self, series: &OhlcvSeries, indicators: &[Indicator]) -> Result<IndicatorSeries, AnalysisError> {
        for indicator in indicators {
            for column in indicator.required_columns() {
                if !series.has_column(*column) {
                    tracing::warn!("{:?} requested on a series without {}", indicator, column);
                    return Err(AnalysisError::MissingColumn(*column));
                }
            }
        }

        let mut out = IndicatorSeries::new(series.clone());
        for indicator in indicators {
            self.append(&mut out, series, *indicator)?;
        }

        tracing::debug!(
            "Computed {} indicator columns over {} bars",
            out.column_count(),
            out.len()
        );
        Ok(out)
    }

    fn append(&self, out: &mut IndicatorSeries, series: &OhlcvSeries, indicator: Indicator) -> Result<(), AnalysisError> {
        let cfg = &self.config;
        let close = series.closes();

        match indicator {
            Indicator::MovingAverages => {
                for &period in &cfg.sma_periods {
                    out.insert(columns::sma(period), sma(close, period))?;
                }
                for &span in &cfg.ema_spans {
                    out.insert(columns::ema(span), ema(close, span))?;
                }
            }
            Indicator::Rsi => {
                out.insert(columns::rsi(cfg.rsi_period), rsi(close, cfg.rsi_period))?;
            }
            Indicator::Macd => {
                let result = macd(close, cfg.macd_fast, cfg.macd_slow, cfg.macd_signal);
                out.insert(columns::MACD, result.macd_line)?;
                out.insert(columns::MACD_SIGNAL, result.signal_line)?;
                out.insert(columns::MACD_HISTOGRAM, result.histogram)?;
            }
            Indicator::Bollinger => {
                let bb = bollinger_bands(close, cfg.bollinger_period, cfg.bollinger_k);
                out.insert(columns::BB_MIDDLE, bb.middle)?;
                out.insert(columns::BB_UPPER, bb.upper)?;
                out.insert(columns::BB_LOWER, bb.lower)?;
                out.insert(columns::BB_WIDTH, bb.width)?;
                out.insert(columns::BB_PERCENT, bb.percent_b)?;
            }
            Indicator::VolumeMeasures => {
                let volume = series.column(PriceColumn::Volume)?;
                for &period in &cfg.volume_sma_periods {
                    out.insert(columns::volume_sma(period), sma(volume, period))?;
                }
                out.insert(columns::VOLUME_RATIO, volume_ratio(volume, cfg.volume_ratio_period))?;
                out.insert(columns::VOLUME_ROC, volume_roc(volume, cfg.volume_roc_period))?;
            }
            Indicator::Obv => {
                let volume = series.column(PriceColumn::Volume)?;
                out.insert(columns::OBV, obv(close, volume))?;
            }
            Indicator::Vwap => {
                let (high, low) = high_low(series)?;
                let volume = series.column(PriceColumn::Volume)?;
                out.insert(columns::VWAP, vwap(high, low, close, volume))?;
            }
            Indicator::PivotPoints => {
                let (high, low) = high_low(series)?;
                let levels = pivot_points(high, low, close);
                out.insert(columns::PIVOT, levels.pivot)?;
                out.insert(columns::R1, levels.r1)?;
                out.insert(columns::R2, levels.r2)?;
                out.insert(columns::R3, levels.r3)?;
                out.insert(columns::S1, levels.s1)?;
                out.insert(columns::S2, levels.s2)?;
                out.insert(columns::S3, levels.s3)?;
            }
            Indicator::PriceChannel => {
                let (high, low) = high_low(series)?;
                let channel = price_channel(high, low, cfg.channel_period);
                out.insert(columns::SUPPORT, channel.support)?;
                out.insert(columns::RESISTANCE, channel.resistance)?;
            }
            Indicator::Kdj => {
                let (high, low) = high_low(series)?;
                let result = kdj(high, low, close, cfg.kdj_period, cfg.kdj_smoothing);
                out.insert(columns::KDJ_K, result.k)?;
                out.insert(columns::KDJ_D, result.d)?;
                out.insert(columns::KDJ_J, result.j)?;
            }
            Indicator::Atr => {
                let (high, low) = high_low(series)?;
                out.insert(columns::atr(cfg.atr_period), atr(high, low, close, cfg.atr_period))?;
            }
            Indicator::Stochastic => {
                let (high, low) = high_low(series)?;
                let result = stochastic(high, low, close, cfg.stochastic_k, cfg.stochastic_d);
                out.insert(columns::STOCH_K, result.k)?;
                out.insert(columns::STOCH_D, result.d)?;
            }
            Indicator::WilliamsR => {
                let (high, low) = high_low(series)?;
                out.insert(columns::WILLIAMS_R, williams_r(high, low, close, cfg.williams_period))?;
            }
            Indicator::Cci => {
                let (high, low) = high_low(series)?;
                out.insert(columns::CCI, cci(high, low, close, cfg.cci_period))?;
            }
            Indicator::Mfi => {
                let (high, low) = high_low(series)?;
                let volume = series.column(PriceColumn::Volume)?;
                out.insert(columns::MFI, mfi(high, low, close, volume, cfg.mfi_period))?;
            }
        }
        Ok(())
    }
}

fn high_low(series: &OhlcvSeries) -> Result<(&[f64], &[f64]), AnalysisError> {
    Ok((series.column(PriceColumn::High)?, series.column(PriceColumn::Low)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::Bar;
    use chrono::{Duration, TimeZone, Utc};

    fn bars(n: usize) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.1;
                Bar {
                    timestamp: start + Duration::days(i as i64),
                    open: close - 0.5,
                    high: close + 1.5,
                    low: close - 1.5,
                    close,
                    volume: 1_000_000.0 + (i % 7) as f64 * 50_000.0,
                }
            })
            .collect()
    }

    #[test]
    fn test_extended_set_produces_all_columns() {
        let series = OhlcvSeries::from_bars(&bars(250)).unwrap();
        let out = IndicatorEngine::new().compute(&series, IndicatorSet::Extended).unwrap();

        for name in [
            "SMA_5", "SMA_10", "SMA_20", "SMA_50", "SMA_200", "EMA_12", "EMA_26", "EMA_50", "RSI_14",
            "MACD", "MACD_Signal", "MACD_Histogram", "BB_Middle", "BB_Upper", "BB_Lower", "ATR_14",
            "Stoch_K", "Stoch_D", "Williams_R", "CCI", "MFI", "KDJ_K", "KDJ_D", "KDJ_J", "OBV", "VWAP",
            "Pivot", "R1", "R2", "R3", "S1", "S2", "S3", "Volume_SMA_20", "Volume_Ratio",
        ] {
            let column = out.column(name).unwrap_or_else(|| panic!("missing {}", name));
            assert_eq!(column.len(), 250, "{}", name);
            assert!(column[249].is_finite(), "{} undefined at last bar", name);
        }
    }

    #[test]
    fn test_basic_set_skips_oscillators() {
        let series = OhlcvSeries::from_bars(&bars(60)).unwrap();
        let out = IndicatorEngine::new().compute(&series, IndicatorSet::Basic).unwrap();
        assert!(out.column("MACD").is_some());
        assert!(out.column("KDJ_K").is_none());
        assert!(out.column("ATR_14").is_none());
    }

    #[test]
    fn test_missing_volume_is_reported() {
        let full = OhlcvSeries::from_bars(&bars(30)).unwrap();
        let closes = OhlcvSeries::from_closes(full.timestamps().to_vec(), full.closes().to_vec()).unwrap();
        let series = closes
            .with_column(PriceColumn::High, full.column(PriceColumn::High).unwrap().to_vec())
            .unwrap()
            .with_column(PriceColumn::Low, full.column(PriceColumn::Low).unwrap().to_vec())
            .unwrap();

        let err = IndicatorEngine::new().compute_only(&series, &[Indicator::Mfi]).unwrap_err();
        assert_eq!(err, AnalysisError::MissingColumn(PriceColumn::Volume));
        assert_eq!(err.to_string(), "Missing column: Volume");

        // close-only indicators still work
        let out = IndicatorEngine::new().compute_only(&series, &[Indicator::Rsi, Indicator::Atr]).unwrap();
        assert!(out.column("RSI_14").is_some());
    }

    #[test]
    fn test_missing_high_fails_before_any_work() {
        let full = OhlcvSeries::from_bars(&bars(10)).unwrap();
        let closes = OhlcvSeries::from_closes(full.timestamps().to_vec(), full.closes().to_vec()).unwrap();
        let err = IndicatorEngine::new().compute(&closes, IndicatorSet::Basic).unwrap_err();
        assert_eq!(err, AnalysisError::MissingColumn(PriceColumn::Volume));

        let err = IndicatorEngine::new()
            .compute_only(&closes, &[Indicator::Macd, Indicator::Kdj])
            .unwrap_err();
        assert_eq!(err, AnalysisError::MissingColumn(PriceColumn::High));
    }

    #[test]
    fn test_empty_series_gives_empty_output() {
        let series = OhlcvSeries::from_bars(&[]).unwrap();
        let out = IndicatorEngine::new().compute(&series, IndicatorSet::Extended).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.column("OBV").map(|c| c.len()), Some(0));
        assert_eq!(out.column("SMA_200").map(|c| c.len()), Some(0));
    }

    #[test]
    fn test_short_series_leaves_long_windows_undefined() {
        let series = OhlcvSeries::from_bars(&bars(30)).unwrap();
        let out = IndicatorEngine::new().compute(&series, IndicatorSet::Extended).unwrap();
        assert!(out.column("SMA_50").unwrap().iter().all(|v| v.is_nan()));
        assert!(out.column("SMA_200").unwrap().iter().all(|v| v.is_nan()));
        assert!(out.column("SMA_20").unwrap()[19].is_finite());
    }

    #[test]
    fn test_custom_windows_rename_columns() {
        let config = IndicatorConfig {
            sma_periods: vec![3],
            ema_spans: vec![4],
            rsi_period: 7,
            atr_period: 5,
            ..IndicatorConfig::default()
        };
        let engine = IndicatorEngine::with_config(config).unwrap();
        let series = OhlcvSeries::from_bars(&bars(20)).unwrap();
        let out = engine.compute(&series, IndicatorSet::Extended).unwrap();
        assert!(out.column("SMA_3").is_some());
        assert!(out.column("EMA_4").is_some());
        assert!(out.column("RSI_7").is_some());
        assert!(out.column("ATR_5").is_some());
        assert!(out.column("SMA_200").is_none());
    }

    #[test]
    fn test_volume_ratio_window_ignores_sma_list_order() {
        let series = OhlcvSeries::from_bars(&bars(60)).unwrap();
        let default_out = IndicatorEngine::new()
            .compute_only(&series, &[Indicator::VolumeMeasures])
            .unwrap();
        let reordered = IndicatorConfig {
            volume_sma_periods: vec![50, 20],
            ..IndicatorConfig::default()
        };
        let reordered_out = IndicatorEngine::with_config(reordered)
            .unwrap()
            .compute_only(&series, &[Indicator::VolumeMeasures])
            .unwrap();

        let ratio = default_out.column("Volume_Ratio").unwrap();
        assert_eq!(ratio[59], reordered_out.column("Volume_Ratio").unwrap()[59]);
        assert!(ratio[18].is_nan());
        assert!(ratio[19].is_finite());

        let volume = series.column(PriceColumn::Volume).unwrap();
        let expected = volume[59] / (volume[40..60].iter().sum::<f64>() / 20.0);
        assert!((ratio[59] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let zero = IndicatorConfig { rsi_period: 0, ..IndicatorConfig::default() };
        assert!(matches!(IndicatorEngine::with_config(zero), Err(AnalysisError::InvalidConfig(_))));

        let inverted = IndicatorConfig { macd_fast: 26, macd_slow: 12, ..IndicatorConfig::default() };
        assert!(IndicatorEngine::with_config(inverted).is_err());

        let zero_sma = IndicatorConfig { sma_periods: vec![5, 0], ..IndicatorConfig::default() };
        assert!(IndicatorEngine::with_config(zero_sma).is_err());

        let zero_ratio = IndicatorConfig { volume_ratio_period: 0, ..IndicatorConfig::default() };
        assert!(IndicatorEngine::with_config(zero_ratio).is_err());
    }

    #[test]
    fn test_compute_is_deterministic() {
        let series = OhlcvSeries::from_bars(&bars(80)).unwrap();
        let engine = IndicatorEngine::new();
        let a = engine.compute(&series, IndicatorSet::Extended).unwrap();
        let b = engine.compute(&series, IndicatorSet::Extended).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_input_rows_preserved() {
        let series = OhlcvSeries::from_bars(&bars(40)).unwrap();
        let out = IndicatorEngine::new().compute(&series, IndicatorSet::Extended).unwrap();
        assert_eq!(out.base(), &series);
    }
}
