//! Market data access port trait.
//!
//! Read-only query surface over the trading calendar, intraday tick
//! snapshots, fine-interval (5-minute) historical bars and daily bars.
//! Criteria consume this contract; concrete backends live in `adapters`.

use crate::domain::bar::{Bar, TickSnapshot};
use crate::domain::error::TickgateError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

pub trait MarketDataPort {
    /// Resolve the trading date an evaluation at `now` refers to: the current
    /// calendar date when the session has started (at/after 09:00 local) and
    /// the calendar marks it open, otherwise the most recent trading date
    /// strictly before today. `None` when no trading date can be resolved.
    fn latest_trading_date(
        &self,
        now: NaiveDateTime,
    ) -> Result<Option<NaiveDate>, TickgateError>;

    /// Latest tick snapshot on `date` with time <= `cutoff`, if any.
    fn tick_at_or_before(
        &self,
        code: &str,
        date: NaiveDate,
        cutoff: NaiveTime,
    ) -> Result<Option<TickSnapshot>, TickgateError>;

    /// Most recent date strictly earlier than `date` with fine-interval bars.
    fn latest_finer_bar_date_before(
        &self,
        code: &str,
        date: NaiveDate,
    ) -> Result<Option<NaiveDate>, TickgateError>;

    /// Earliest fine-interval bar time >= `time` on `date`. Callers fall back
    /// to [`latest_finer_bar_time`](Self::latest_finer_bar_time) when `None`.
    fn earliest_finer_bar_time_at_or_after(
        &self,
        code: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Option<NaiveTime>, TickgateError>;

    /// Latest fine-interval bar time on `date`, if any bars exist.
    fn latest_finer_bar_time(
        &self,
        code: &str,
        date: NaiveDate,
    ) -> Result<Option<NaiveTime>, TickgateError>;

    /// Sum of fine-interval bar volumes on `date` with time <= `time`.
    fn sum_finer_volume_up_to(
        &self,
        code: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<f64, TickgateError>;

    /// The most recent `n` daily bars, ordered ascending by date.
    fn recent_daily_bars(&self, code: &str, n: usize) -> Result<Vec<Bar>, TickgateError>;
}
