//! Simple Moving Average.
//!
//! SMA(n)[i] = sum(x[i-n+1..=i]) / n
//! Warmup: first (n-1) values are undefined.

pub fn calculate_sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                let window = &values[i + 1 - period..=i];
                Some(window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect()
}

/// `series[i] - series[i - lag]`, undefined when either side is.
pub fn calculate_change(series: &[Option<f64>], lag: usize) -> Vec<Option<f64>> {
    (0..series.len())
        .map(|i| {
            if i < lag {
                return None;
            }
            match (series[i], series[i - lag]) {
                (Some(curr), Some(prev)) => Some(curr - prev),
                _ => None,
            }
        })
        .collect()
}
