//! Exponential moving average for journal sentiment.

/// Weight kept by the running average on each update; the new
/// sample gets the remaining `1 / SMOOTHING_DIVISOR`.
const HISTORY_WEIGHT: f64 = 4.0;
const SMOOTHING_DIVISOR: f64 = 5.0;

/// Fold one sentiment sample into the running average.
///
/// `None` leaves the average unchanged. No clamping happens here: samples
/// are validated to `[-1, 1]` where they enter the system.
pub fn smooth_sentiment(previous: f64, sample: Option<f64>) -> f64 {
    match sample {
        Some(sample) => (previous * HISTORY_WEIGHT + sample) / SMOOTHING_DIVISOR,
        None => previous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_gets_one_fifth_weight() {
        assert!((smooth_sentiment(0.0, Some(1.0)) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn absent_sample_is_noop() {
        assert_eq!(smooth_sentiment(0.37, None), 0.37);
    }

    #[test]
    fn value_is_a_fixed_point() {
        for x in [-1.0, -0.25, 0.0, 0.6, 1.0] {
            assert!((smooth_sentiment(x, Some(x)) - x).abs() < 1e-12);
        }
    }

    #[test]
    fn repeated_samples_converge() {
        let mut avg = -1.0;
        for _ in 0..200 {
            avg = smooth_sentiment(avg, Some(0.5));
        }
        assert!((avg - 0.5).abs() < 1e-9);
    }

    #[test]
    fn stays_in_range_for_in_range_samples() {
        let mut avg = 0.0;
        for sample in [1.0, 1.0, -1.0, 1.0, -1.0, -1.0, 1.0] {
            avg = smooth_sentiment(avg, Some(sample));
            assert!((-1.0..=1.0).contains(&avg));
        }
    }
}
