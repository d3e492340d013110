use crate::sample::TimeSeriesSample;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Per-node disk counters derived from the first and last valid samples
/// of the used/free monitoring series. Previous values are never later
/// in time than current values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskState {
    pub current_free: f64,
    pub current_used: f64,
    pub previous_free: f64,
    pub previous_used: f64,
    pub elapsed_seconds: i64,
}

impl DiskState {
    /// Build from the valid (first, last) windows of the two series.
    /// The elapsed window is measured on the free series, matching the
    /// report's sampling-window semantics.
    pub fn from_windows(
        used: (TimeSeriesSample, TimeSeriesSample),
        free: (TimeSeriesSample, TimeSeriesSample),
    ) -> Self {
        debug_assert!(used.0.timestamp <= used.1.timestamp);
        debug_assert!(free.0.timestamp <= free.1.timestamp);
        Self {
            current_free: free.1.value.unwrap_or(0.0),
            current_used: used.1.value.unwrap_or(0.0),
            previous_free: free.0.value.unwrap_or(0.0),
            previous_used: used.0.value.unwrap_or(0.0),
            elapsed_seconds: free.1.timestamp - free.0.timestamp,
        }
    }

    pub fn delta(&self) -> DiskDelta {
        let change_bytes = self.current_used - self.previous_used;
        let percent_change = if self.previous_used == 0.0 {
            None
        } else {
            Some(round1(change_bytes / self.previous_used * 100.0))
        };
        let capacity = self.current_used + self.current_free;
        let percent_full = if capacity == 0.0 {
            0.0
        } else {
            round1(self.current_used / capacity * 100.0)
        };
        DiskDelta {
            change_mb: (change_bytes / BYTES_PER_MB) as i64,
            percent_change,
            percent_full,
            elapsed_minutes: self.elapsed_seconds / 60,
        }
    }
}

/// Signed growth figures for one node.
///
/// `percent_change` is None when the baseline was zero bytes: there is no
/// change ratio to report, and dividing anyway is exactly the crash the
/// report must not have.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskDelta {
    pub change_mb: i64,
    pub percent_change: Option<f64>,
    pub percent_full: f64,
    pub elapsed_minutes: i64,
}

/// One rendered line of the disk report, keyed and sorted by node name.
#[derive(Debug, Clone)]
pub struct DiskRow {
    pub node: String,
    pub gb_used: u64,
    pub delta: DiskDelta,
}

impl DiskRow {
    pub fn new(node: String, state: &DiskState) -> Self {
        Self {
            node,
            gb_used: (state.current_used / BYTES_PER_GB).round() as u64,
            delta: state.delta(),
        }
    }

    /// Nodes past 90 % full get flagged in the report.
    pub fn full_tag(&self) -> char {
        if self.delta.percent_full > 90.0 { '*' } else { ' ' }
    }
}

/// Aggregate accumulator for the TOTAL row. Byte counters are summed as
/// whole GB and percentages derived from the sums; the elapsed column is
/// averaged instead, since it is a sampling window rather than a quantity.
#[derive(Debug, Default)]
pub struct DiskTotals {
    gb_used: u64,
    gb_free: u64,
    gb_previous: u64,
    windows_minutes: Vec<i64>,
}

/// The derived TOTAL line of the disk report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TotalsRow {
    pub gb_used: u64,
    pub percent_full: f64,
    pub change_gb: i64,
    pub percent_change: Option<f64>,
    pub elapsed_minutes: i64,
}

impl DiskTotals {
    pub fn add(&mut self, state: &DiskState) {
        self.gb_used += (state.current_used / BYTES_PER_GB).round() as u64;
        self.gb_free += (state.current_free / BYTES_PER_GB).round() as u64;
        self.gb_previous += (state.previous_used / BYTES_PER_GB).round() as u64;
        self.windows_minutes.push(state.elapsed_seconds / 60);
    }

    pub fn summarize(&self) -> TotalsRow {
        let change_gb = self.gb_used as i64 - self.gb_previous as i64;
        let percent_change = if self.gb_previous == 0 {
            None
        } else {
            Some(round1(
                change_gb as f64 / self.gb_previous as f64 * 100.0,
            ))
        };
        let capacity = self.gb_used + self.gb_free;
        let percent_full = if capacity == 0 {
            0.0
        } else {
            round1(self.gb_used as f64 / capacity as f64 * 100.0)
        };
        let elapsed_minutes = if self.windows_minutes.is_empty() {
            0
        } else {
            let sum: i64 = self.windows_minutes.iter().sum();
            (sum as f64 / self.windows_minutes.len() as f64).round() as i64
        };
        TotalsRow {
            gb_used: self.gb_used,
            percent_full,
            change_gb,
            percent_change,
            elapsed_minutes,
        }
    }
}

/// Sign prefix for signed report figures; magnitudes print unsigned.
pub fn sign_prefix(v: i64) -> char {
    match v.cmp(&0) {
        std::cmp::Ordering::Greater => '+',
        std::cmp::Ordering::Less => '-',
        std::cmp::Ordering::Equal => ' ',
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(used: (f64, f64), free: (f64, f64), elapsed: i64) -> DiskState {
        DiskState {
            previous_used: used.0,
            current_used: used.1,
            previous_free: free.0,
            current_free: free.1,
            elapsed_seconds: elapsed,
        }
    }

    #[test]
    fn test_delta_growth() {
        let s = state(
            (100.0 * BYTES_PER_GB, 110.0 * BYTES_PER_GB),
            (900.0 * BYTES_PER_GB, 890.0 * BYTES_PER_GB),
            600,
        );
        let d = s.delta();
        assert_eq!(d.change_mb, 10 * 1024);
        assert_eq!(d.percent_change, Some(10.0));
        assert_eq!(d.percent_full, 11.0);
        assert_eq!(d.elapsed_minutes, 10);
    }

    #[test]
    fn test_delta_shrink_keeps_sign() {
        let s = state((200.0 * BYTES_PER_MB, 100.0 * BYTES_PER_MB), (0.0, 0.0), 60);
        let d = s.delta();
        assert_eq!(d.change_mb, -100);
        assert_eq!(d.percent_change, Some(-50.0));
        assert_eq!(sign_prefix(d.change_mb), '-');
    }

    #[test]
    fn test_zero_baseline_has_no_percent_change() {
        let s = state((0.0, 5.0 * BYTES_PER_GB), (10.0 * BYTES_PER_GB, 5.0 * BYTES_PER_GB), 60);
        let d = s.delta();
        assert_eq!(d.percent_change, None);
        assert_eq!(d.change_mb, 5 * 1024);
    }

    #[test]
    fn test_from_windows_measures_elapsed_on_free_series() {
        let used = (
            TimeSeriesSample::new(1.0, 100),
            TimeSeriesSample::new(2.0, 700),
        );
        let free = (
            TimeSeriesSample::new(9.0, 90),
            TimeSeriesSample::new(8.0, 690),
        );
        let s = DiskState::from_windows(used, free);
        assert_eq!(s.elapsed_seconds, 600);
        assert_eq!(s.current_used, 2.0);
        assert_eq!(s.previous_free, 9.0);
    }

    #[test]
    fn test_full_tag_threshold() {
        let over = state((0.0, 95.0 * BYTES_PER_GB), (0.0, 5.0 * BYTES_PER_GB), 60);
        let under = state((0.0, 50.0 * BYTES_PER_GB), (0.0, 50.0 * BYTES_PER_GB), 60);
        assert_eq!(DiskRow::new("db1".into(), &over).full_tag(), '*');
        assert_eq!(DiskRow::new("db2".into(), &under).full_tag(), ' ');
    }

    #[test]
    fn test_totals_sum_raw_counters_not_percentages() {
        // Three synthetic nodes; the aggregate must come from summed GB,
        // not from averaging per-row percentages.
        let rows = [
            state((10.0 * BYTES_PER_GB, 20.0 * BYTES_PER_GB), (80.0 * BYTES_PER_GB, 70.0 * BYTES_PER_GB), 600),
            state((30.0 * BYTES_PER_GB, 30.0 * BYTES_PER_GB), (70.0 * BYTES_PER_GB, 70.0 * BYTES_PER_GB), 600),
            state((5.0 * BYTES_PER_GB, 40.0 * BYTES_PER_GB), (60.0 * BYTES_PER_GB, 25.0 * BYTES_PER_GB), 1200),
        ];
        let mut totals = DiskTotals::default();
        for s in &rows {
            totals.add(s);
        }
        let t = totals.summarize();
        assert_eq!(t.gb_used, 90);
        assert_eq!(t.change_gb, 90 - 45);
        assert_eq!(t.percent_change, Some(100.0));
        // 90 used / (90 + 165) free+used
        assert_eq!(t.percent_full, round1(90.0 / 255.0 * 100.0));
        // Time windows average: (10 + 10 + 20) / 3
        assert_eq!(t.elapsed_minutes, 13);
    }

    #[test]
    fn test_sign_prefix() {
        assert_eq!(sign_prefix(5), '+');
        assert_eq!(sign_prefix(-5), '-');
        assert_eq!(sign_prefix(0), ' ');
    }
}
