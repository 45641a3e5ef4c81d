use analysis_core::IndicatorSeries;
use serde::{Deserialize, Serialize};

use crate::engine::columns;

/// Direction a technical reading points to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalBias {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSignal {
    pub name: String,
    pub bias: SignalBias,
}

impl TradeSignal {
    fn new(name: &str, bias: SignalBias) -> Self {
        Self { name: name.to_string(), bias }
    }
}

/// Latest-bar reading of the main indicators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSignals {
    pub overall: SignalBias,
    pub signals: Vec<TradeSignal>,
}

impl TradeSignals {
    pub fn bullish_count(&self) -> usize {
        self.signals.iter().filter(|s| s.bias == SignalBias::Bullish).count()
    }

    pub fn bearish_count(&self) -> usize {
        self.signals.iter().filter(|s| s.bias == SignalBias::Bearish).count()
    }
}

/// Summarise RSI, MACD, moving-average and Bollinger readings at the last bar.
///
/// A reading whose inputs are undefined is left out; the overall bias is the
/// majority direction, neutral on a tie.
pub fn trade_signals(series: &IndicatorSeries, rsi_period: usize) -> TradeSignals {
    let mut signals = Vec::new();
    let current_price = series.base().last_close();

    if let Some(rsi) = series.latest(&columns::rsi(rsi_period)) {
        let (name, bias) = if rsi < 30.0 {
            ("RSI Oversold", SignalBias::Bullish)
        } else if rsi > 70.0 {
            ("RSI Overbought", SignalBias::Bearish)
        } else {
            ("RSI Neutral", SignalBias::Neutral)
        };
        signals.push(TradeSignal::new(name, bias));
    }

    if let (Some(macd), Some(signal)) = (series.latest(columns::MACD), series.latest(columns::MACD_SIGNAL)) {
        if macd > signal {
            signals.push(TradeSignal::new("MACD Bullish Cross", SignalBias::Bullish));
        } else {
            signals.push(TradeSignal::new("MACD Bearish Cross", SignalBias::Bearish));
        }
    }

    if let (Some(sma50), Some(sma200), Some(price)) =
        (series.latest("SMA_50"), series.latest("SMA_200"), current_price)
    {
        if sma50 > sma200 && price > sma50 {
            signals.push(TradeSignal::new("Golden Cross + Price Above", SignalBias::Bullish));
        } else if sma50 < sma200 && price < sma50 {
            signals.push(TradeSignal::new("Death Cross + Price Below", SignalBias::Bearish));
        }
    }

    if let (Some(upper), Some(lower), Some(price)) =
        (series.latest(columns::BB_UPPER), series.latest(columns::BB_LOWER), current_price)
    {
        if price > upper {
            signals.push(TradeSignal::new("Above Bollinger Upper", SignalBias::Bearish));
        } else if price < lower {
            signals.push(TradeSignal::new("Below Bollinger Lower", SignalBias::Bullish));
        }
    }

    let mut summary = TradeSignals { overall: SignalBias::Neutral, signals };
    let (bullish, bearish) = (summary.bullish_count(), summary.bearish_count());
    summary.overall = if bullish > bearish {
        SignalBias::Bullish
    } else if bearish > bullish {
        SignalBias::Bearish
    } else {
        SignalBias::Neutral
    };

    tracing::debug!("Trade signals: {} bullish, {} bearish", bullish, bearish);
    summary
}
