//! Exponential Moving Average.
//!
//! EMA[i] = a*x[i] + (1-a)*EMA[i-1], seeded with the first defined input.
//! Undefined inputs produce undefined outputs and leave the running state
//! untouched, so the next defined input continues from the last value.

/// Smoothing constant for a span: a = 2/(span+1).
pub fn span_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Smoothing constant for a center of mass: a = 1/(com+1).
pub fn com_alpha(com: f64) -> f64 {
    1.0 / (com + 1.0)
}

pub fn calculate_ema(values: &[Option<f64>], alpha: f64) -> Vec<Option<f64>> {
    let mut state: Option<f64> = None;

    values
        .iter()
        .map(|value| {
            let x = (*value)?;
            let next = match state {
                None => x,
                Some(prev) => alpha * x + (1.0 - alpha) * prev,
            };
            state = Some(next);
            Some(next)
        })
        .collect()
}

/// EMA over a fully defined input series.
pub fn calculate_ema_span(values: &[f64], span: usize) -> Vec<Option<f64>> {
    let defined: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
    calculate_ema(&defined, span_alpha(span))
}
