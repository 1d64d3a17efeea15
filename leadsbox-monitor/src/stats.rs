//! Window statistics.

/// Nearest-rank percentile: the element at rank `ceil(q * n) - 1` of the
/// sorted values, clamped to valid indices. `None` for no values.
pub fn percentile<I>(values: I, q: f64) -> Option<u64>
where
    I: IntoIterator<Item = u64>,
{
    let mut sorted: Vec<u64> = values.into_iter().collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_unstable();

    let rank = (q * sorted.len() as f64).ceil();
    let index = if rank.is_finite() && rank >= 1.0 {
        (rank as usize - 1).min(sorted.len() - 1)
    } else {
        0
    };
    Some(sorted[index])
}

/// 95th percentile of the values.
pub fn p95<I>(values: I) -> Option<u64>
where
    I: IntoIterator<Item = u64>,
{
    percentile(values, 0.95)
}

/// Arithmetic mean. `None` for no values.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0_f64, 0_usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Mean of a 0/1 outcome window, zero when empty.
pub(crate) fn failure_rate<'a, I>(outcomes: I) -> f64
where
    I: IntoIterator<Item = &'a u8>,
{
    mean(outcomes.into_iter().map(|&o| f64::from(o))).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn p95_picks_last_of_eight() {
        let values = [100, 100, 100, 100, 100, 100, 100, 5000];
        assert_eq!(p95(values), Some(5000));
    }

    #[test]
    fn p95_ignores_input_order() {
        let values = [5000, 100, 100, 100, 100, 100, 100, 100];
        assert_eq!(p95(values), Some(5000));
    }

    #[test]
    fn p95_of_twenty_is_nineteenth() {
        let values: Vec<u64> = (1..=20).collect();
        assert_eq!(p95(values), Some(19));
    }

    #[test]
    fn percentile_edges() {
        assert_eq!(percentile(Vec::<u64>::new(), 0.95), None);
        assert_eq!(percentile([7], 0.95), Some(7));
        assert_eq!(percentile([1, 2, 3], 0.0), Some(1));
        assert_eq!(percentile([1, 2, 3], 1.5), Some(3));
    }

    #[test]
    fn mean_of_values() {
        assert_eq!(mean([100.0, 200.0, 300.0]), Some(200.0));
        assert_eq!(mean(Vec::<f64>::new()), None);
    }

    #[test]
    fn failure_rate_of_outcomes() {
        let outcomes = [0_u8, 1, 0, 1];
        assert_eq!(failure_rate(&outcomes), 0.5);
        assert_eq!(failure_rate(&[] as &[u8]), 0.0);
    }
}
