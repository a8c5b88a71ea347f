//! Volume health criterion.
//!
//! Detects a consecutive-rise close pattern on selectively expanding volume
//! over the recent daily bars, then checks that the open of the most recent
//! strong bullish bar still holds as price support.
//!
//! The volume admission ladder depends on the rise length: brackets are
//! evaluated in descending rise-length order and the largest applicable
//! bracket's rule applies, overriding the two-day baseline.

use crate::domain::bar::Bar;
use crate::domain::context::EvaluationContext;
use crate::domain::criterion::{Criterion, CriterionResult};
use crate::domain::error::TickgateError;

/// Daily bars inspected, newest last.
const WINDOW: usize = 5;
/// Bars required before the pattern is worth evaluating at all.
const MIN_BARS: usize = 3;
/// Intraday gain qualifying a bar as "strong bullish".
const STRONG_GAIN: f64 = 0.04;

pub struct VolumeHealthCriterion;

impl VolumeHealthCriterion {
    fn check(&self, ctx: &EvaluationContext) -> Result<CriterionResult, TickgateError> {
        let bars = ctx.data.recent_daily_bars(&ctx.code, WINDOW)?;
        if bars.len() < MIN_BARS {
            return Ok(CriterionResult::fail("insufficient data")
                .with_metric("vol_summary", "insufficient data"));
        }
        if bars.iter().any(|b| !b.is_valid()) {
            return Ok(
                CriterionResult::fail("data abnormal").with_metric("vol_summary", "data abnormal")
            );
        }

        let rise_len = consecutive_rise_len(&bars);
        if rise_len < 2 {
            let reason = format!("consecutive rise too short: rise_len={rise_len}");
            return Ok(CriterionResult::fail(reason.clone())
                .with_metric("rise_len", rise_len)
                .with_metric("vol_summary", reason));
        }

        let (vol_inc, vol_dec) = volume_changes(&bars[bars.len() - rise_len..]);
        let summary = format!("rise_len={rise_len}, vol up {vol_inc} days, down {vol_dec} days");

        if !bracket_admits(rise_len, vol_inc, vol_dec) {
            return Ok(
                CriterionResult::fail(format!("volume pattern unhealthy: {summary}"))
                    .with_metric("rise_len", rise_len)
                    .with_metric("vol_inc", vol_inc)
                    .with_metric("vol_dec", vol_dec)
                    .with_metric("vol_summary", summary),
            );
        }

        let support = support_floor(&bars);
        let newest_close = bars[bars.len() - 1].close;
        let support_ok = match support {
            Some(floor) => newest_close >= floor,
            None => true,
        };

        if !support_ok {
            let summary = format!("{summary}; support: invalid");
            return Ok(
                CriterionResult::fail(format!("volume pattern unhealthy: {summary}"))
                    .with_metric("rise_len", rise_len)
                    .with_metric("vol_inc", vol_inc)
                    .with_metric("vol_dec", vol_dec)
                    .with_metric("support_ok", false)
                    .with_metric("vol_summary", summary),
            );
        }

        let summary = format!(
            "{summary}; support: {}",
            if support.is_some() { "valid" } else { "none" }
        );
        Ok(
            CriterionResult::pass(format!("volume pattern healthy: {summary}"))
                .with_metric("rise_len", rise_len)
                .with_metric("vol_inc", vol_inc)
                .with_metric("vol_dec", vol_dec)
                .with_metric("support_ok", true)
                .with_metric("vol_summary", summary),
        )
    }
}

/// Count of consecutive bars with strictly increasing close, counted backward
/// from the newest bar. At least 1 for a non-empty slice.
fn consecutive_rise_len(bars: &[Bar]) -> usize {
    let mut rise_len = 1;
    for i in (1..bars.len()).rev() {
        if bars[i].close > bars[i - 1].close {
            rise_len += 1;
        } else {
            break;
        }
    }
    rise_len
}

/// Pairwise volume increases and decreases across adjacent bars.
fn volume_changes(bars: &[Bar]) -> (usize, usize) {
    let mut inc = 0;
    let mut dec = 0;
    for pair in bars.windows(2) {
        if pair[1].volume > pair[0].volume {
            inc += 1;
        } else if pair[1].volume < pair[0].volume {
            dec += 1;
        }
    }
    (inc, dec)
}

/// Admission ladder, largest applicable bracket first.
fn bracket_admits(rise_len: usize, inc: usize, dec: usize) -> bool {
    if rise_len >= 5 {
        inc >= 3 && dec <= 2
    } else if rise_len == 4 {
        inc >= 3 && dec <= 1
    } else if rise_len == 3 {
        inc >= 2 && dec <= 1
    } else {
        // rise_len == 2 baseline
        inc >= 2 && dec == 0
    }
}

/// Open price of the nearest strong bullish bar, scanning backward from the
/// newest bar. `None` when no bar in the window qualifies.
fn support_floor(bars: &[Bar]) -> Option<f64> {
    bars.iter()
        .rev()
        .find(|b| b.intraday_gain() >= STRONG_GAIN)
        .map(|b| b.open)
}

impl Criterion for VolumeHealthCriterion {
    fn name(&self) -> &'static str {
        "volume_health"
    }

    fn evaluate(&self, ctx: &EvaluationContext) -> CriterionResult {
        match self.check(ctx) {
            Ok(result) => result,
            Err(e) => {
                eprintln!(
                    "warning: {} for {} ({}): {}",
                    self.name(),
                    ctx.code,
                    ctx.name,
                    e
                );
                CriterionResult::fail("computation error")
                    .with_metric("vol_summary", "computation error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::criteria::fixtures::{at, daily_bar, date, FixturePort};
    use crate::domain::criterion::MetricValue;
    use chrono::Duration;

    /// Bars from (open, close, volume) triples, one per weekday-ish date.
    fn bars(rows: &[(f64, f64, i64)]) -> Vec<Bar> {
        let start = date(2024, 3, 4);
        rows.iter()
            .enumerate()
            .map(|(i, (open, close, volume))| {
                daily_bar(start + Duration::days(i as i64), *open, *close, *volume)
            })
            .collect()
    }

    fn evaluate(rows: &[(f64, f64, i64)]) -> CriterionResult {
        let port = FixturePort {
            daily: bars(rows),
            ..Default::default()
        };
        let ctx = EvaluationContext::new("600519", "Test Stock", at(2024, 3, 12, 10, 0), &port);
        VolumeHealthCriterion.evaluate(&ctx)
    }

    fn int_metric(result: &CriterionResult, key: &str) -> i64 {
        match result.metrics.get(key) {
            Some(MetricValue::Int(v)) => *v,
            other => panic!("expected {key} metric, got {other:?}"),
        }
    }

    #[test]
    fn fewer_than_three_bars_is_insufficient() {
        let result = evaluate(&[(10.0, 10.5, 100), (10.5, 11.0, 110)]);
        assert!(!result.passed);
        assert_eq!(result.reason, "insufficient data");
    }

    #[test]
    fn invalid_bar_is_abnormal() {
        let result = evaluate(&[(10.0, 10.5, 100), (0.0, 11.0, 110), (11.0, 11.5, 120)]);
        assert!(!result.passed);
        assert_eq!(result.reason, "data abnormal");
    }

    #[test]
    fn no_rise_fails_with_rise_len() {
        // Newest close below its predecessor: rise_len stays 1.
        let result = evaluate(&[(10.0, 11.0, 100), (11.0, 12.0, 110), (12.0, 11.5, 120)]);
        assert!(!result.passed);
        assert_eq!(result.reason, "consecutive rise too short: rise_len=1");
        assert_eq!(int_metric(&result, "rise_len"), 1);
    }

    #[test]
    fn rise_of_two_cannot_meet_its_bracket() {
        // One adjacent pair in the sub-window can never yield two increases.
        let result = evaluate(&[
            (10.0, 10.8, 100),
            (10.8, 11.5, 120),
            (11.5, 11.6, 90),
            (11.6, 11.0, 130),
            (11.0, 11.2, 150),
        ]);
        assert!(!result.passed);
        assert_eq!(int_metric(&result, "rise_len"), 2);
        assert_eq!(int_metric(&result, "vol_inc"), 1);
        assert_eq!(int_metric(&result, "vol_dec"), 0);
        assert!(result.reason.contains("unhealthy"));
    }

    #[test]
    fn rise_of_three_passes_on_two_increases() {
        let result = evaluate(&[
            (10.0, 10.5, 100),
            (10.5, 11.0, 90),
            (11.0, 10.5, 80),
            (10.5, 11.2, 100),
            (11.2, 11.6, 120),
        ]);
        assert!(result.passed);
        assert_eq!(int_metric(&result, "rise_len"), 3);
        assert_eq!(int_metric(&result, "vol_inc"), 2);
        assert_eq!(int_metric(&result, "vol_dec"), 0);
        assert!(result.reason.contains("healthy"));
    }

    #[test]
    fn rise_of_three_fails_on_two_decreases() {
        let result = evaluate(&[
            (10.0, 10.5, 100),
            (10.5, 11.0, 90),
            (11.0, 10.5, 100),
            (10.5, 11.2, 80),
            (11.2, 11.6, 70),
        ]);
        assert!(!result.passed);
        assert_eq!(int_metric(&result, "vol_dec"), 2);
    }

    #[test]
    fn rise_of_four_needs_three_increases() {
        // inc=3, dec=0 over the last four bars: passes.
        let passing = evaluate(&[
            (11.0, 10.6, 100),
            (10.0, 10.5, 50),
            (10.5, 11.0, 60),
            (11.0, 11.5, 70),
            (11.5, 12.0, 80),
        ]);
        assert!(passing.passed);
        assert_eq!(int_metric(&passing, "rise_len"), 4);
        assert_eq!(int_metric(&passing, "vol_inc"), 3);

        // inc=2, dec=1: one increase short of the bracket.
        let failing = evaluate(&[
            (11.0, 10.6, 100),
            (10.0, 10.5, 50),
            (10.5, 11.0, 60),
            (11.0, 11.5, 70),
            (11.5, 12.0, 65),
        ]);
        assert!(!failing.passed);
        assert_eq!(int_metric(&failing, "vol_inc"), 2);
    }

    #[test]
    fn rise_of_five_allows_up_to_two_decreases() {
        let result = evaluate(&[
            (10.0, 10.5, 100),
            (10.5, 11.0, 110),
            (11.0, 11.5, 105),
            (11.5, 12.0, 120),
            (12.0, 12.5, 130),
        ]);
        assert!(result.passed);
        assert_eq!(int_metric(&result, "rise_len"), 5);
        assert_eq!(int_metric(&result, "vol_inc"), 3);
        assert_eq!(int_metric(&result, "vol_dec"), 1);
    }

    #[test]
    fn rise_of_five_fails_below_three_increases() {
        let result = evaluate(&[
            (10.0, 10.5, 100),
            (10.5, 11.0, 110),
            (11.0, 11.5, 90),
            (11.5, 12.0, 80),
            (12.0, 12.5, 150),
        ]);
        assert!(!result.passed);
        assert_eq!(int_metric(&result, "vol_inc"), 2);
        assert_eq!(int_metric(&result, "vol_dec"), 2);
    }

    #[test]
    fn support_holds_at_exact_boundary() {
        // Bar 0 gains exactly 4% from an open of 10.0; the newest close sits
        // exactly on that floor.
        let result = evaluate(&[
            (10.0, 10.4, 100),
            (10.4, 9.8, 90),
            (9.8, 9.9, 100),
            (9.9, 10.0, 110),
        ]);
        assert!(result.passed);
        assert_eq!(result.metrics.get("support_ok"), Some(&MetricValue::Bool(true)));
        assert!(result.reason.contains("support: valid"));
    }

    #[test]
    fn close_below_support_fails() {
        let result = evaluate(&[
            (10.0, 10.4, 100),
            (10.4, 9.7, 90),
            (9.7, 9.8, 100),
            (9.8, 9.99, 110),
        ]);
        assert!(!result.passed);
        assert_eq!(
            result.metrics.get("support_ok"),
            Some(&MetricValue::Bool(false))
        );
        assert!(result.reason.contains("support: invalid"));
    }

    #[test]
    fn no_strong_bar_satisfies_support_trivially() {
        let result = evaluate(&[
            (10.0, 10.1, 100),
            (10.1, 10.2, 110),
            (10.2, 10.3, 120),
        ]);
        assert!(result.passed);
        assert_eq!(result.metrics.get("support_ok"), Some(&MetricValue::Bool(true)));
        assert!(result.reason.contains("support: none"));
    }

    #[test]
    fn accessor_error_fails_closed() {
        let port = FixturePort {
            fail_with: Some("disk error".into()),
            ..Default::default()
        };
        let ctx = EvaluationContext::new("600519", "Test Stock", at(2024, 3, 12, 10, 0), &port);
        let result = VolumeHealthCriterion.evaluate(&ctx);

        assert!(!result.passed);
        assert_eq!(result.reason, "computation error");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Same context, same verdict: evaluation is a pure function of
            // the backing data.
            #[test]
            fn evaluation_is_idempotent(
                rows in prop::collection::vec((1.0f64..100.0, 1.0f64..100.0, 0i64..1_000_000), 0..8)
            ) {
                let port = FixturePort {
                    daily: bars(&rows),
                    ..Default::default()
                };
                let ctx = EvaluationContext::new(
                    "600519",
                    "Test Stock",
                    at(2024, 3, 12, 10, 0),
                    &port,
                );
                let first = VolumeHealthCriterion.evaluate(&ctx);
                let second = VolumeHealthCriterion.evaluate(&ctx);
                prop_assert_eq!(&first, &second);
                prop_assert!(!first.reason.is_empty());
            }

            // A passing verdict always implies the pattern preconditions.
            #[test]
            fn pass_implies_rise_and_bracket(
                rows in prop::collection::vec((1.0f64..100.0, 1.0f64..100.0, 0i64..1_000_000), 3..6)
            ) {
                let result = evaluate(&rows);
                if result.passed {
                    match result.metrics.get("rise_len") {
                        Some(MetricValue::Int(v)) => prop_assert!(*v >= 2),
                        other => prop_assert!(false, "rise_len missing: {:?}", other),
                    }
                }
            }
        }
    }
}
