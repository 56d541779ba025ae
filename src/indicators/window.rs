//! Column primitives shared by every indicator.
//!
//! A column is positionally aligned with the candle series; `None` marks a
//! position where the lookback window is not yet satisfied or where the
//! arithmetic produced a non-finite value (zero-width band, 0/0 ratio).

pub type Column = Vec<Option<f64>>;

pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

pub fn from_values(values: &[f64]) -> Column {
    values.iter().map(|&v| finite(v)).collect()
}

/// Applies `f` to every full trailing window. A window containing an
/// undefined value stays undefined.
fn rolling<F>(values: &[Option<f64>], window: usize, f: F) -> Column
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    let mut buf = Vec::with_capacity(window);
    for end in window..=values.len() {
        let slice = &values[end - window..end];
        if slice.iter().all(Option::is_some) {
            buf.clear();
            buf.extend(slice.iter().flatten());
            out[end - 1] = finite(f(&buf));
        }
    }
    out
}

pub fn rolling_sum(values: &[Option<f64>], window: usize) -> Column {
    rolling(values, window, |w| w.iter().sum())
}

pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Column {
    rolling(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Population standard deviation over the window.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Column {
    rolling(values, window, |w| {
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        (w.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
    })
}

pub fn rolling_min(values: &[Option<f64>], window: usize) -> Column {
    rolling(values, window, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

pub fn rolling_max(values: &[Option<f64>], window: usize) -> Column {
    rolling(values, window, |w| w.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

/// Recursive EMA with `alpha = 2 / (span + 1)`, seeded from the first
/// defined value with no bias adjustment. Undefined inputs carry the
/// previous average forward.
pub fn ema(values: &[Option<f64>], span: usize) -> Column {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev: Option<f64> = None;
    values
        .iter()
        .map(|value| {
            if let Some(x) = *value {
                prev = Some(match prev {
                    Some(p) => alpha * x + (1.0 - alpha) * p,
                    None => x,
                });
            }
            prev
        })
        .collect()
}

pub fn zip_with<F>(a: &[Option<f64>], b: &[Option<f64>], f: F) -> Column
where
    F: Fn(f64, f64) -> f64,
{
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => finite(f(*x, *y)),
            _ => None,
        })
        .collect()
}

pub fn zip3_with<F>(a: &[Option<f64>], b: &[Option<f64>], c: &[Option<f64>], f: F) -> Column
where
    F: Fn(f64, f64, f64) -> f64,
{
    a.iter()
        .zip(b)
        .zip(c)
        .map(|((x, y), z)| match (x, y, z) {
            (Some(x), Some(y), Some(z)) => finite(f(*x, *y, *z)),
            _ => None,
        })
        .collect()
}

/// Position of `value` inside `[lower, upper]`; undefined for a zero-width band.
pub fn band_position(value: &[Option<f64>], lower: &[Option<f64>], upper: &[Option<f64>]) -> Column {
    zip3_with(value, lower, upper, |v, lo, up| (v - lo) / (up - lo))
}
