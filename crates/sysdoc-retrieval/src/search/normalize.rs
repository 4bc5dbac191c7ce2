/// Min-max normalize into `[0, 1]`. A degenerate range maps every score
/// to 1.0.
pub fn min_max(scores: &[f64]) -> Vec<f64> {
    let Some(min) = scores.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let max = scores.iter().copied().fold(min, f64::max);
    let range = max - min;
    if range <= f64::EPSILON {
        return vec![1.0; scores.len()];
    }
    scores.iter().map(|s| (s - min) / range).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spreads_to_unit_range() {
        assert_eq!(min_max(&[2.0, 4.0, 3.0]), vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn degenerate_range_is_one() {
        assert_eq!(min_max(&[0.3, 0.3]), vec![1.0, 1.0]);
        assert_eq!(min_max(&[7.0]), vec![1.0]);
        assert!(min_max(&[]).is_empty());
    }
}
