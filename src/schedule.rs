//! Geometric checkpoint schedules.
//!
//! Studies measure sketch state at a geometric progression of true distinct
//! counts so that report rows are evenly spaced on a log axis. The schedule
//! is generated by walking down from the maximum: each step divides by
//! `1 + relative_increment` (rounding up) but moves at least one count, which
//! keeps every integer near 1 in the schedule and guarantees termination.

use crate::counter::WideCounter;

/// All checkpoint targets from 1 to `ceil(max)` with consecutive ratio at
/// most `1 + relative_increment`, ascending.
///
/// # Panics
///
/// Panics if `max < 1` or `relative_increment <= 0`.
pub fn target_counts(max: f64, relative_increment: f64) -> Vec<WideCounter> {
    assert!(max >= 1.0, "max must be at least 1, got {max}");
    assert!(
        relative_increment > 0.0,
        "relative increment must be positive, got {relative_increment}"
    );
    let mut targets = Vec::new();
    let mut current = WideCounter::ceil(max);
    while current.is_positive() {
        targets.push(current);
        let value = current.as_f64();
        current.decrement();
        current = current.min(WideCounter::ceil(value / (1.0 + relative_increment)));
    }
    targets.reverse();
    targets
}

/// Native-integer variant of [`target_counts`] for maxima that fit a `u64`.
///
/// # Panics
///
/// Panics if `max < 1` or `relative_increment <= 0`.
pub fn target_counts_u64(max: u64, relative_increment: f64) -> Vec<u64> {
    assert!(max >= 1, "max must be at least 1, got {max}");
    assert!(
        relative_increment > 0.0,
        "relative increment must be positive, got {relative_increment}"
    );
    let mut targets = Vec::new();
    let mut current = max;
    while current > 0 {
        targets.push(current);
        current = (current - 1).min((current as f64 / (1.0 + relative_increment)).ceil() as u64);
    }
    targets.reverse();
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_schedule_for_half_steps() {
        let targets: Vec<u128> = target_counts(1000.0, 0.5)
            .iter()
            .map(WideCounter::as_u128)
            .collect();
        assert_eq!(
            targets,
            [1, 2, 3, 4, 6, 8, 12, 18, 27, 40, 59, 88, 132, 198, 297, 445, 667, 1000]
        );
    }

    #[test]
    fn u64_variant_agrees_with_wide_variant() {
        let wide: Vec<u128> = target_counts(1_000_000.0, 0.05)
            .iter()
            .map(WideCounter::as_u128)
            .collect();
        let native: Vec<u128> = target_counts_u64(1_000_000, 0.05)
            .iter()
            .map(|&v| u128::from(v))
            .collect();
        assert_eq!(wide, native);
    }

    #[test]
    fn schedule_spans_full_range() {
        let targets = target_counts(1e21, 0.05);
        assert_eq!(targets[0], WideCounter::from_u64(1));
        assert_eq!(*targets.last().unwrap(), WideCounter::ceil(1e21));
        assert!(targets.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn steps_respect_the_ratio_bound() {
        let targets = target_counts(1e6, 0.05);
        for pair in targets.windows(2) {
            let prev = pair[0].as_f64();
            let next = pair[1].as_f64();
            // Either the geometric bound holds or the walk moved by a single
            // count, which happens near the low end of the schedule.
            assert!(next <= (prev * 1.05).ceil() || next == prev + 1.0);
        }
    }

    #[test]
    fn fractional_max_rounds_up() {
        let targets = target_counts(10.4, 0.5);
        assert_eq!(targets.last().unwrap().as_u128(), 11);
    }

    #[test]
    #[should_panic(expected = "at least 1")]
    fn rejects_max_below_one() {
        target_counts(0.5, 0.05);
    }

    #[test]
    #[should_panic(expected = "must be positive")]
    fn rejects_non_positive_increment() {
        target_counts_u64(1000, 0.0);
    }
}
