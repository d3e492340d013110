use serde::Deserialize;

/// One datapoint of a monitoring time-series, decoded from the wire shape
/// `[value, timestamp]` where `value` is a float or null. The service
/// emits null placeholders for sampling gaps at either end of the window.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "(Option<f64>, i64)")]
pub struct TimeSeriesSample {
    pub value: Option<f64>,
    pub timestamp: i64,
}

impl From<(Option<f64>, i64)> for TimeSeriesSample {
    fn from((value, timestamp): (Option<f64>, i64)) -> Self {
        Self { value, timestamp }
    }
}

impl TimeSeriesSample {
    pub fn new(value: f64, timestamp: i64) -> Self {
        Self {
            value: Some(value),
            timestamp,
        }
    }

    /// A sample counts only when its value is an actual finite number.
    pub fn is_valid(&self) -> bool {
        self.value.is_some_and(f64::is_finite)
    }
}

/// First valid sample, scanning forward. The final index is off limits:
/// the newest datapoint is usually still accumulating, and a window that
/// could only start there would have nothing after it to diff against.
pub fn first_valid(samples: &[TimeSeriesSample]) -> Option<(usize, TimeSeriesSample)> {
    let end = samples.len().checked_sub(1)?;
    samples[..end]
        .iter()
        .enumerate()
        .find(|(_, s)| s.is_valid())
        .map(|(i, s)| (i, *s))
}

/// Last valid sample, scanning backward from the end.
pub fn last_valid(samples: &[TimeSeriesSample]) -> Option<(usize, TimeSeriesSample)> {
    samples
        .iter()
        .enumerate()
        .rev()
        .find(|(_, s)| s.is_valid())
        .map(|(i, s)| (i, *s))
}

/// The usable (first, last) window of a series, or None when the series
/// is empty, entirely placeholder, or collapses to a single sample.
pub fn valid_window(
    samples: &[TimeSeriesSample],
) -> Option<(TimeSeriesSample, TimeSeriesSample)> {
    let (first_idx, first) = first_valid(samples)?;
    let (last_idx, last) = last_valid(samples)?;
    if first_idx < last_idx {
        Some((first, last))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gap(timestamp: i64) -> TimeSeriesSample {
        TimeSeriesSample {
            value: None,
            timestamp,
        }
    }

    #[test]
    fn test_decode_from_wire_pairs() {
        let series: Vec<TimeSeriesSample> =
            serde_json::from_str("[[null,0],[5.0,10],[7.0,20],[null,30]]").unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series[1], TimeSeriesSample::new(5.0, 10));
        assert!(!series[0].is_valid());
        assert!(series[2].is_valid());
    }

    #[test]
    fn test_window_skips_placeholder_ends() {
        let series = [
            gap(0),
            TimeSeriesSample::new(5.0, 10),
            TimeSeriesSample::new(7.0, 20),
            gap(30),
        ];
        let (first, last) = valid_window(&series).unwrap();
        assert_eq!(first, TimeSeriesSample::new(5.0, 10));
        assert_eq!(last, TimeSeriesSample::new(7.0, 20));
    }

    #[test]
    fn test_first_valid_never_takes_final_index() {
        let series = [gap(0), gap(10), TimeSeriesSample::new(9.0, 20)];
        assert!(first_valid(&series).is_none());
        assert_eq!(last_valid(&series).unwrap().0, 2);
    }

    #[test]
    fn test_empty_and_all_placeholder_series() {
        assert!(valid_window(&[]).is_none());
        assert!(valid_window(&[gap(0), gap(10), gap(20)]).is_none());
    }

    #[test]
    fn test_single_sample_window_is_no_data() {
        // Only one valid sample: first and last collapse to the same index
        let series = [gap(0), TimeSeriesSample::new(4.0, 10), gap(20)];
        assert!(valid_window(&series).is_none());
    }

    #[test]
    fn test_nan_value_is_not_valid() {
        let series = [
            TimeSeriesSample::new(f64::NAN, 0),
            TimeSeriesSample::new(5.0, 10),
            TimeSeriesSample::new(7.0, 20),
            TimeSeriesSample::new(f64::NAN, 30),
        ];
        let (first, last) = valid_window(&series).unwrap();
        assert_eq!(first.value, Some(5.0));
        assert_eq!(last.value, Some(7.0));
    }
}
