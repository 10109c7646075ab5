//! Rolling-window helpers over a price history ordered oldest first.

/// The last `len` values, or `None` if the history is shorter.
pub fn trailing(values: &[f64], len: usize) -> Option<&[f64]> {
    values.len().checked_sub(len).map(|start| &values[start..])
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by `n`).
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let variance = values
        .iter()
        .map(|value| (value - mean) * (value - mean))
        .sum::<f64>()
        / values.len() as f64;
    Some(variance.sqrt())
}

pub fn high_low(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(values.iter().fold((first, first), |(high, low), value| {
        (high.max(*value), low.min(*value))
    }))
}

/// Relative change from `values[len - lookback]` to the last value.
///
/// `None` when the history is too short or the base price is zero.
pub fn change_over(values: &[f64], lookback: usize) -> Option<f64> {
    if lookback == 0 {
        return None;
    }
    let base = *values.get(values.len().checked_sub(lookback)?)?;
    let last = *values.last()?;
    if base == 0.0 {
        return None;
    }
    Some((last - base) / base)
}
