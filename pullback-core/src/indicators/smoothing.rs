//! Seeded exponential smoothing shared by EMA, ATR and RSI.

/// EMA weight for `period`.
pub fn ema_alpha(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Wilder's weight for `period`.
pub fn wilder_alpha(period: usize) -> f64 {
    1.0 / period as f64
}

/// Exponentially smooth `values` from index `start` on.
///
/// The first output sits at `start + period - 1` and is the mean of the
/// `period` inputs ending there. Everything before it is NaN, as is
/// everything from the first non-finite input after the seed.
pub fn seeded_smooth(values: &[f64], period: usize, start: usize, alpha: f64) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    let seed_end = start + period;
    if period == 0 || values.len() < seed_end {
        return out;
    }

    let seed = &values[start..seed_end];
    if seed.iter().any(|v| !v.is_finite()) {
        return out;
    }
    let mut level = seed.iter().sum::<f64>() / period as f64;
    out[seed_end - 1] = level;

    for (slot, &x) in out[seed_end..].iter_mut().zip(&values[seed_end..]) {
        if !x.is_finite() {
            break;
        }
        level = alpha * x + (1.0 - alpha) * level;
        *slot = level;
    }
    out
}
