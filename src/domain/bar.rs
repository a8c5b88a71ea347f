//! Price/volume bar and intraday tick snapshot representations.

use chrono::{NaiveDate, NaiveTime};

/// A single price/volume bar. Daily bars carry `time = None`; fine-interval
/// (5-minute) bars carry the bar-end time of day.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub open: f64,
    pub close: f64,
    pub volume: i64,
}

impl Bar {
    /// Record validity rule: prices finite and strictly positive, volume
    /// non-negative. Criteria treat anything else as abnormal data.
    pub fn is_valid(&self) -> bool {
        self.open.is_finite()
            && self.close.is_finite()
            && self.open > 0.0
            && self.close > 0.0
            && self.volume >= 0
    }

    /// (close - open) / open
    pub fn intraday_gain(&self) -> f64 {
        (self.close - self.open) / self.open
    }
}

/// Cumulative session volume observed at one instant of a trading day.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSnapshot {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub cum_volume: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_bar() -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
            time: None,
            open: 10.0,
            close: 10.5,
            volume: 120_000,
        }
    }

    #[test]
    fn valid_daily_bar() {
        assert!(sample_bar().is_valid());
    }

    #[test]
    fn zero_volume_is_valid() {
        let mut bar = sample_bar();
        bar.volume = 0;
        assert!(bar.is_valid());
    }

    #[test]
    fn non_positive_price_is_invalid() {
        let mut bar = sample_bar();
        bar.open = 0.0;
        assert!(!bar.is_valid());

        let mut bar = sample_bar();
        bar.close = -1.0;
        assert!(!bar.is_valid());
    }

    #[test]
    fn nan_price_is_invalid() {
        let mut bar = sample_bar();
        bar.close = f64::NAN;
        assert!(!bar.is_valid());
    }

    #[test]
    fn negative_volume_is_invalid() {
        let mut bar = sample_bar();
        bar.volume = -1;
        assert!(!bar.is_valid());
    }

    #[test]
    fn intraday_gain() {
        let bar = sample_bar();
        // (10.5 - 10.0) / 10.0 = 0.05
        assert_relative_eq!(bar.intraday_gain(), 0.05);
    }
}
