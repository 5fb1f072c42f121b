use std::cmp::Ordering;

/// Compares two labels, ordering numeric labels by value and all others lexically.
///
/// Numeric labels sort before non-numeric ones so that the comparison stays a total order
/// even for mixed label sets.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    match (parse_numeric(a), parse_numeric(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Returns the permutation of indices that puts `labels` in ascending label order.
pub fn label_order<S: AsRef<str>>(labels: &[S]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.sort_by(|&i, &j| compare_labels(labels[i].as_ref(), labels[j].as_ref()));
    order
}

/// Returns the permutation of indices that puts `temperatures` in ascending order.
pub fn temperature_order(temperatures: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..temperatures.len()).collect();
    order.sort_by(|&i, &j| temperatures[i].total_cmp(&temperatures[j]));
    order
}

fn parse_numeric(label: &str) -> Option<f64> {
    label.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
