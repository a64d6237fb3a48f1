//! Robust statistics over observation lists.
//!
//! Empty input is a normal outcome and yields `None`.

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// The `p`-quantile of `values`, taken as the element at `floor(n * p)`
/// of the sorted list (clamped to the last element).
pub fn quantile(values: &[f64], p: f64) -> Option<f64> {
    let sorted = sorted(values);
    if sorted.is_empty() {
        return None;
    }
    let index = ((sorted.len() as f64 * p).floor().max(0.0) as usize).min(sorted.len() - 1);
    Some(sorted[index])
}

/// The 0.5 quantile.
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Mean of the middle half of `values`.
///
/// Uses indices `floor(n/4) - 1 ..= ceil(3n/4) - 1` of the sorted list;
/// very short lists are averaged whole.
pub fn mean50(values: &[f64]) -> Option<f64> {
    let sorted = sorted(values);
    if sorted.is_empty() {
        return None;
    }
    let n = sorted.len();
    let lo = (n / 4).saturating_sub(1);
    let hi = ((3 * n + 3) / 4).saturating_sub(1).max(lo);
    let middle = &sorted[lo..=hi];
    Some(middle.iter().sum::<f64>() / middle.len() as f64)
}
