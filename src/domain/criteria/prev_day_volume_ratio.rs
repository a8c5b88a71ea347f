//! Previous-day volume ratio criterion.
//!
//! Decides whether today's early cumulative intraday volume already matches
//! or exceeds what the prior trading day had accumulated by the equivalent
//! wall-clock point, a proxy for abnormal early interest. Tick snapshots
//! carry cumulative session volume; the prior day is sampled from 5-minute
//! bars, aligned at the first bar time at or after the snapshot time (or the
//! day's last bar when the snapshot falls after the final bar).

use crate::domain::context::EvaluationContext;
use crate::domain::criterion::{Criterion, CriterionResult};
use crate::domain::error::TickgateError;
use chrono::NaiveTime;

/// Only ticks at or before this time of day are considered.
fn snapshot_cutoff() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 15, 0).unwrap()
}

pub struct PrevDayVolumeRatioCriterion;

impl PrevDayVolumeRatioCriterion {
    fn check(&self, ctx: &EvaluationContext) -> Result<CriterionResult, TickgateError> {
        let Some(as_of) = ctx.data.latest_trading_date(ctx.now)? else {
            return Ok(CriterionResult::fail("intraday data missing").with_metric("ratio", 0.0));
        };

        let Some(snapshot) = ctx
            .data
            .tick_at_or_before(&ctx.code, as_of, snapshot_cutoff())?
        else {
            return Ok(CriterionResult::fail("intraday data missing").with_metric("ratio", 0.0));
        };

        let Some(prev_date) = ctx.data.latest_finer_bar_date_before(&ctx.code, as_of)? else {
            return Ok(CriterionResult::fail("previous day data missing").with_metric("ratio", 0.0));
        };

        // Align at the first prior-day bar covering the snapshot time; when
        // the snapshot falls after the final bar, use the day's last bar.
        let alignment_time = match ctx.data.earliest_finer_bar_time_at_or_after(
            &ctx.code,
            prev_date,
            snapshot.time,
        )? {
            Some(t) => t,
            None => ctx
                .data
                .latest_finer_bar_time(&ctx.code, prev_date)?
                .unwrap_or(snapshot.time),
        };

        let prev_cum_volume = ctx
            .data
            .sum_finer_volume_up_to(&ctx.code, prev_date, alignment_time)?;
        if prev_cum_volume <= 0.0 {
            return Ok(CriterionResult::fail("previous day volume abnormal")
                .with_metric("ratio", 0.0)
                .with_metric("trade_date", as_of));
        }

        let ratio = snapshot.cum_volume / prev_cum_volume;
        let verdict = ratio >= 1.0;
        let reason = format!(
            "prev-day volume ratio {}: {:.2} ({} -> {})",
            if verdict { "sufficient" } else { "insufficient" },
            ratio,
            snapshot.time,
            alignment_time,
        );

        let result = if verdict {
            CriterionResult::pass(reason)
        } else {
            CriterionResult::fail(reason)
        };
        Ok(result
            .with_metric("ratio", ratio)
            .with_metric("trade_date", as_of))
    }
}

impl Criterion for PrevDayVolumeRatioCriterion {
    fn name(&self) -> &'static str {
        "prev_day_volume_ratio"
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
                CriterionResult::fail("ratio computation error").with_metric("ratio", 0.0)
            }
        }
    }
}
