use crate::rolling::*;

/// Simple Moving Average
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    rolling_mean(data, period)
}

/// Exponential Moving Average (span-parameterised, adjusted start-up)
pub fn ema(data: &[f64], span: usize) -> Vec<f64> {
    if span == 0 {
        return vec![f64::NAN; data.len()];
    }
    ewm_mean(data, span_alpha(span))
}

/// Relative Strength Index
///
/// Simple rolling means of gains and losses. A window with no losses gives
/// an infinite RS and therefore 100; a flat window gives `NaN`.
pub fn rsi(data: &[f64], period: usize) -> Vec<f64> {
    let delta = diff(data);
    // the undefined first diff counts as neither gain nor loss
    let gains: Vec<f64> = delta.iter().map(|&d| if d > 0.0 { d } else { 0.0 }).collect();
    let losses: Vec<f64> = delta.iter().map(|&d| if d < 0.0 { -d } else { 0.0 }).collect();

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(g, l)| {
            let rs = g / l;
            100.0 - (100.0 / (1.0 + rs))
        })
        .collect()
}

/// MACD (Moving Average Convergence Divergence)
pub struct MacdResult {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(data: &[f64], fast_period: usize, slow_period: usize, signal_period: usize) -> MacdResult {
    let ema_fast = ema(data, fast_period);
    let ema_slow = ema(data, slow_period);

    let macd_line: Vec<f64> = ema_fast.iter().zip(&ema_slow).map(|(f, s)| f - s).collect();
    let signal_line = ema(&macd_line, signal_period);
    let histogram = macd_line.iter().zip(&signal_line).map(|(m, s)| m - s).collect();

    MacdResult {
        macd_line,
        signal_line,
        histogram,
    }
}

/// Bollinger Bands
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
    /// upper - lower
    pub width: Vec<f64>,
    /// position of the close inside the band, 0 at lower and 1 at upper
    pub percent_b: Vec<f64>,
}

pub fn bollinger_bands(data: &[f64], period: usize, std_dev: f64) -> BollingerBands {
    let middle = sma(data, period);
    let std = rolling_std(data, period);

    let upper: Vec<f64> = middle.iter().zip(&std).map(|(m, s)| m + s * std_dev).collect();
    let lower: Vec<f64> = middle.iter().zip(&std).map(|(m, s)| m - s * std_dev).collect();
    let width: Vec<f64> = upper.iter().zip(&lower).map(|(u, l)| u - l).collect();
    let percent_b = data
        .iter()
        .zip(&lower)
        .zip(&width)
        .map(|((c, l), w)| (c - l) / w)
        .collect();

    BollingerBands {
        upper,
        middle,
        lower,
        width,
        percent_b,
    }
}

/// Average True Range (simple mean of true range)
pub fn atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    rolling_mean(&true_range(high, low, close), period)
}

/// 100 * (close - lowest low) / (highest high - lowest low) over `period` bars.
fn range_position(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let highest = rolling_max(high, period);
    let lowest = rolling_min(low, period);
    close
        .iter()
        .zip(highest.iter().zip(&lowest))
        .map(|(c, (h, l))| 100.0 * (c - l) / (h - l))
        .collect()
}

/// Stochastic Oscillator
pub struct StochasticResult {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

pub fn stochastic(high: &[f64], low: &[f64], close: &[f64], k_period: usize, d_period: usize) -> StochasticResult {
    let k = range_position(high, low, close, k_period);
    let d = sma(&k, d_period);
    StochasticResult { k, d }
}

/// Williams %R, in [-100, 0]
pub fn williams_r(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let highest = rolling_max(high, period);
    let lowest = rolling_min(low, period);
    close
        .iter()
        .zip(highest.iter().zip(&lowest))
        .map(|(c, (h, l))| -100.0 * (h - c) / (h - l))
        .collect()
}

/// Commodity Channel Index
pub fn cci(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let tp = typical_price(high, low, close);
    let tp_sma = rolling_mean(&tp, period);
    let mad = rolling_mean_abs_dev(&tp, period);

    tp.iter()
        .zip(tp_sma.iter().zip(&mad))
        .map(|(t, (s, m))| (t - s) / (0.015 * m))
        .collect()
}

/// Money Flow Index
///
/// Flow counts as positive when the typical price rises bar-over-bar and
/// negative when it falls; the first bar contributes to neither side.
pub fn mfi(high: &[f64], low: &[f64], close: &[f64], volume: &[f64], period: usize) -> Vec<f64> {
    let tp = typical_price(high, low, close);
    let mut positive = vec![0.0; tp.len()];
    let mut negative = vec![0.0; tp.len()];

    for i in 1..tp.len() {
        let flow = tp[i] * volume[i];
        if tp[i] > tp[i - 1] {
            positive[i] = flow;
        } else if tp[i] < tp[i - 1] {
            negative[i] = flow;
        }
    }

    let positive_sum = rolling_sum(&positive, period);
    let negative_sum = rolling_sum(&negative, period);

    positive_sum
        .iter()
        .zip(&negative_sum)
        .map(|(p, n)| {
            let money_ratio = p / n;
            100.0 - (100.0 / (1.0 + money_ratio))
        })
        .collect()
}

/// KDJ (stochastic RSV smoothed twice with alpha = 1/smoothing)
pub struct KdjResult {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
    pub j: Vec<f64>,
}

pub fn kdj(high: &[f64], low: &[f64], close: &[f64], period: usize, smoothing: usize) -> KdjResult {
    let rsv = range_position(high, low, close, period);
    if smoothing == 0 {
        let nan = vec![f64::NAN; close.len()];
        return KdjResult { k: nan.clone(), d: nan.clone(), j: nan };
    }

    let alpha = 1.0 / smoothing as f64;
    let k = ewm_mean(&rsv, alpha);
    let d = ewm_mean(&k, alpha);
    let j = k.iter().zip(&d).map(|(k, d)| 3.0 * k - 2.0 * d).collect();

    KdjResult { k, d, j }
}

/// On-Balance Volume, seeded with the first bar's own volume
pub fn obv(close: &[f64], volume: &[f64]) -> Vec<f64> {
    if close.is_empty() {
        return vec![];
    }

    let mut obv_values = Vec::with_capacity(close.len());
    obv_values.push(volume[0]);

    for i in 1..close.len() {
        let prev_obv = obv_values[i - 1];
        let new_obv = if close[i] > close[i - 1] {
            prev_obv + volume[i]
        } else if close[i] < close[i - 1] {
            prev_obv - volume[i]
        } else {
            prev_obv
        };
        obv_values.push(new_obv);
    }

    obv_values
}

/// Volume-Weighted Average Price (cumulative from the first bar)
pub fn vwap(high: &[f64], low: &[f64], close: &[f64], volume: &[f64]) -> Vec<f64> {
    let tp = typical_price(high, low, close);
    let mut vwap_values = Vec::with_capacity(tp.len());
    let mut cumulative_tpv = 0.0;
    let mut cumulative_volume = 0.0;

    for (typical, vol) in tp.iter().zip(volume) {
        cumulative_tpv += typical * vol;
        cumulative_volume += vol;
        vwap_values.push(cumulative_tpv / cumulative_volume);
    }

    vwap_values
}

/// Classic floor-trader pivots from the previous bar's high/low/close
pub struct PivotPoints {
    pub pivot: Vec<f64>,
    pub r1: Vec<f64>,
    pub r2: Vec<f64>,
    pub r3: Vec<f64>,
    pub s1: Vec<f64>,
    pub s2: Vec<f64>,
    pub s3: Vec<f64>,
}

pub fn pivot_points(high: &[f64], low: &[f64], close: &[f64]) -> PivotPoints {
    let prev_high = shift(high, 1);
    let prev_low = shift(low, 1);
    let prev_close = shift(close, 1);

    let n = close.len();
    let mut levels = PivotPoints {
        pivot: Vec::with_capacity(n),
        r1: Vec::with_capacity(n),
        r2: Vec::with_capacity(n),
        r3: Vec::with_capacity(n),
        s1: Vec::with_capacity(n),
        s2: Vec::with_capacity(n),
        s3: Vec::with_capacity(n),
    };

    for i in 0..n {
        let (h, l, c) = (prev_high[i], prev_low[i], prev_close[i]);
        let pivot = (h + l + c) / 3.0;
        levels.pivot.push(pivot);
        levels.r1.push(2.0 * pivot - l);
        levels.r2.push(pivot + (h - l));
        levels.r3.push(h + 2.0 * (pivot - l));
        levels.s1.push(2.0 * pivot - h);
        levels.s2.push(pivot - (h - l));
        levels.s3.push(l - 2.0 * (h - pivot));
    }

    levels
}

/// Rolling price channel: lowest low (support) and highest high (resistance)
pub struct PriceChannel {
    pub support: Vec<f64>,
    pub resistance: Vec<f64>,
}

pub fn price_channel(high: &[f64], low: &[f64], period: usize) -> PriceChannel {
    PriceChannel {
        support: rolling_min(low, period),
        resistance: rolling_max(high, period),
    }
}

/// volume / SMA(volume, period)
pub fn volume_ratio(volume: &[f64], period: usize) -> Vec<f64> {
    volume
        .iter()
        .zip(sma(volume, period))
        .map(|(v, avg)| v / avg)
        .collect()
}

/// Percent change of volume against `period` bars earlier
pub fn volume_roc(volume: &[f64], period: usize) -> Vec<f64> {
    volume
        .iter()
        .zip(shift(volume, period))
        .map(|(v, prev)| (v / prev - 1.0) * 100.0)
        .collect()
}
