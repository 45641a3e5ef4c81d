use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{AnalysisError, Bar, PriceColumn};

/// Columnar OHLCV history ordered by strictly increasing timestamp.
///
/// Only `Close` is mandatory. Indicators that need `High`, `Low` or `Volume`
/// fail with [`AnalysisError::MissingColumn`] when the column was never supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvSeries {
    timestamps: Vec<DateTime<Utc>>,
    close: Vec<f64>,
    open: Option<Vec<f64>>,
    high: Option<Vec<f64>>,
    low: Option<Vec<f64>>,
    volume: Option<Vec<f64>>,
}

impl OhlcvSeries {
    /// Build a full series from bars, checking ordering and the OHLC invariant.
    pub fn from_bars(bars: &[Bar]) -> Result<Self, AnalysisError> {
        for (i, bar) in bars.iter().enumerate() {
            for (name, price) in [("open", bar.open), ("high", bar.high), ("low", bar.low), ("close", bar.close)] {
                if !price.is_finite() || price <= 0.0 {
                    return Err(AnalysisError::InvalidData(format!(
                        "bar {} has non-positive or non-finite {}: {}",
                        i, name, price
                    )));
                }
            }
            if !bar.volume.is_finite() || bar.volume < 0.0 {
                return Err(AnalysisError::InvalidData(format!(
                    "bar {} has invalid volume: {}",
                    i, bar.volume
                )));
            }
            if bar.high < bar.open.max(bar.close).max(bar.low) || bar.low > bar.open.min(bar.close).min(bar.high) {
                return Err(AnalysisError::InvalidData(format!(
                    "bar {} violates high/low bounds (o={}, h={}, l={}, c={})",
                    i, bar.open, bar.high, bar.low, bar.close
                )));
            }
        }

        let timestamps: Vec<DateTime<Utc>> = bars.iter().map(|b| b.timestamp).collect();
        check_increasing(&timestamps)?;

        Ok(Self {
            timestamps,
            close: bars.iter().map(|b| b.close).collect(),
            open: Some(bars.iter().map(|b| b.open).collect()),
            high: Some(bars.iter().map(|b| b.high).collect()),
            low: Some(bars.iter().map(|b| b.low).collect()),
            volume: Some(bars.iter().map(|b| b.volume).collect()),
        })
    }

    /// Close-only series; other columns can be attached with [`OhlcvSeries::with_column`].
    pub fn from_closes(timestamps: Vec<DateTime<Utc>>, closes: Vec<f64>) -> Result<Self, AnalysisError> {
        if timestamps.len() != closes.len() {
            return Err(AnalysisError::InvalidData(format!(
                "{} timestamps for {} closes",
                timestamps.len(),
                closes.len()
            )));
        }
        check_increasing(&timestamps)?;
        if let Some(bad) = closes.iter().find(|c| !c.is_finite() || **c <= 0.0) {
            return Err(AnalysisError::InvalidData(format!("invalid close: {}", bad)));
        }

        Ok(Self {
            timestamps,
            close: closes,
            open: None,
            high: None,
            low: None,
            volume: None,
        })
    }

    /// Attach (or replace) a raw column. Length must match the series.
    pub fn with_column(mut self, column: PriceColumn, values: Vec<f64>) -> Result<Self, AnalysisError> {
        if values.len() != self.len() {
            return Err(AnalysisError::InvalidData(format!(
                "{} column has {} values, series has {}",
                column,
                values.len(),
                self.len()
            )));
        }
        match column {
            PriceColumn::Open => self.open = Some(values),
            PriceColumn::High => self.high = Some(values),
            PriceColumn::Low => self.low = Some(values),
            PriceColumn::Close => self.close = values,
            PriceColumn::Volume => self.volume = Some(values),
        }
        Ok(self)
    }

    pub fn column(&self, column: PriceColumn) -> Result<&[f64], AnalysisError> {
        let values = match column {
            PriceColumn::Open => self.open.as_deref(),
            PriceColumn::High => self.high.as_deref(),
            PriceColumn::Low => self.low.as_deref(),
            PriceColumn::Close => Some(self.close.as_slice()),
            PriceColumn::Volume => self.volume.as_deref(),
        };
        values.ok_or(AnalysisError::MissingColumn(column))
    }

    pub fn has_column(&self, column: PriceColumn) -> bool {
        self.column(column).is_ok()
    }

    pub fn closes(&self) -> &[f64] {
        &self.close
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn last_close(&self) -> Option<f64> {
        self.close.last().copied()
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }
}

fn check_increasing(timestamps: &[DateTime<Utc>]) -> Result<(), AnalysisError> {
    match timestamps.windows(2).position(|w| w[1] <= w[0]) {
        Some(i) => Err(AnalysisError::InvalidData(format!(
            "timestamps not strictly increasing at index {}",
            i + 1
        ))),
        None => Ok(()),
    }
}

/// OHLCV series plus named derived columns, one value per bar.
///
/// Values before an indicator has enough history are `NaN`, never zero.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSeries {
    base: OhlcvSeries,
    columns: BTreeMap<String, Vec<f64>>,
}

impl IndicatorSeries {
    pub fn new(base: OhlcvSeries) -> Self {
        Self {
            base,
            columns: BTreeMap::new(),
        }
    }

    /// Add or overwrite a derived column.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), AnalysisError> {
        let name = name.into();
        if values.len() != self.base.len() {
            return Err(AnalysisError::InvalidData(format!(
                "column {} has {} values, series has {}",
                name,
                values.len(),
                self.base.len()
            )));
        }
        self.columns.insert(name, values);
        Ok(())
    }

    pub fn base(&self) -> &OhlcvSeries {
        &self.base
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Last value of a column, if defined (finite).
    pub fn latest(&self, name: &str) -> Option<f64> {
        self.column(name)?.last().copied().filter(|v| v.is_finite())
    }

    /// Value one bar before the last, if defined (finite).
    pub fn previous(&self, name: &str) -> Option<f64> {
        let values = self.column(name)?;
        values.len().checked_sub(2).map(|i| values[i]).filter(|v| v.is_finite())
    }

    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ts(n: usize) -> Vec<DateTime<Utc>> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        (0..n).map(|i| start + Duration::days(i as i64)).collect()
    }

    #[test]
    fn test_close_only_series_reports_missing_columns() {
        let series = OhlcvSeries::from_closes(ts(3), vec![10.0, 11.0, 12.0]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(
            series.column(PriceColumn::High),
            Err(AnalysisError::MissingColumn(PriceColumn::High))
        );
        assert!(series.has_column(PriceColumn::Close));
    }

    #[test]
    fn test_rejects_unordered_timestamps() {
        let mut stamps = ts(3);
        stamps.swap(1, 2);
        let err = OhlcvSeries::from_closes(stamps, vec![1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidData(_)));
    }

    #[test]
    fn test_from_bars_rejects_broken_high_low() {
        let bars = vec![Bar {
            timestamp: ts(1)[0],
            open: 10.0,
            high: 9.0,
            low: 8.0,
            close: 9.5,
            volume: 100.0,
        }];
        assert!(OhlcvSeries::from_bars(&bars).is_err());
    }

    #[test]
    fn test_with_column_length_mismatch() {
        let series = OhlcvSeries::from_closes(ts(2), vec![1.0, 2.0]).unwrap();
        assert!(series.with_column(PriceColumn::Volume, vec![1.0]).is_err());
    }

    #[test]
    fn test_indicator_series_latest_skips_nan() {
        let base = OhlcvSeries::from_closes(ts(2), vec![1.0, 2.0]).unwrap();
        let mut series = IndicatorSeries::new(base);
        series.insert("A", vec![1.0, f64::NAN]).unwrap();
        series.insert("B", vec![1.0, 3.0]).unwrap();
        assert_eq!(series.latest("A"), None);
        assert_eq!(series.latest("B"), Some(3.0));
        assert_eq!(series.previous("B"), Some(1.0));
        assert!(series.insert("C", vec![1.0]).is_err());
    }
}
