#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
pub use tickgate::domain::bar::{Bar, TickSnapshot};
use tickgate::domain::error::TickgateError;
use tickgate::ports::market_data_port::MarketDataPort;

pub struct MockMarketDataPort {
    pub trading_date: Option<NaiveDate>,
    pub ticks: Vec<TickSnapshot>,
    pub prev_date: Option<NaiveDate>,
    pub prev_bars: Vec<(NaiveTime, f64)>,
    pub daily: Vec<Bar>,
    pub error: Option<String>,
}

impl MockMarketDataPort {
    pub fn new() -> Self {
        Self {
            trading_date: None,
            ticks: Vec::new(),
            prev_date: None,
            prev_bars: Vec::new(),
            daily: Vec::new(),
            error: None,
        }
    }

    pub fn with_trading_date(mut self, date: NaiveDate) -> Self {
        self.trading_date = Some(date);
        self
    }

    pub fn with_tick(mut self, tick: TickSnapshot) -> Self {
        self.ticks.push(tick);
        self
    }

    pub fn with_prev_day(mut self, date: NaiveDate, bars: Vec<(NaiveTime, f64)>) -> Self {
        self.prev_date = Some(date);
        self.prev_bars = bars;
        self
    }

    pub fn with_daily_bars(mut self, bars: Vec<Bar>) -> Self {
        self.daily = bars;
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }

    fn guard(&self) -> Result<(), TickgateError> {
        match &self.error {
            Some(reason) => Err(TickgateError::Database {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl MarketDataPort for MockMarketDataPort {
    fn latest_trading_date(&self, _now: NaiveDateTime) -> Result<Option<NaiveDate>, TickgateError> {
        self.guard()?;
        Ok(self.trading_date)
    }

    fn tick_at_or_before(
        &self,
        _code: &str,
        date: NaiveDate,
        cutoff: NaiveTime,
    ) -> Result<Option<TickSnapshot>, TickgateError> {
        self.guard()?;
        Ok(self
            .ticks
            .iter()
            .filter(|t| t.date == date && t.time <= cutoff)
            .max_by_key(|t| t.time)
            .cloned())
    }

    fn latest_finer_bar_date_before(
        &self,
        _code: &str,
        _date: NaiveDate,
    ) -> Result<Option<NaiveDate>, TickgateError> {
        self.guard()?;
        Ok(self.prev_date)
    }

    fn earliest_finer_bar_time_at_or_after(
        &self,
        _code: &str,
        _date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Option<NaiveTime>, TickgateError> {
        self.guard()?;
        Ok(self
            .prev_bars
            .iter()
            .map(|(t, _)| *t)
            .filter(|t| *t >= time)
            .min())
    }

    fn latest_finer_bar_time(
        &self,
        _code: &str,
        _date: NaiveDate,
    ) -> Result<Option<NaiveTime>, TickgateError> {
        self.guard()?;
        Ok(self.prev_bars.iter().map(|(t, _)| *t).max())
    }

    fn sum_finer_volume_up_to(
        &self,
        _code: &str,
        _date: NaiveDate,
        time: NaiveTime,
    ) -> Result<f64, TickgateError> {
        self.guard()?;
        Ok(self
            .prev_bars
            .iter()
            .filter(|(t, _)| *t <= time)
            .map(|(_, v)| *v)
            .sum())
    }

    fn recent_daily_bars(&self, _code: &str, n: usize) -> Result<Vec<Bar>, TickgateError> {
        self.guard()?;
        let skip = self.daily.len().saturating_sub(n);
        Ok(self.daily[skip..].to_vec())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
    date(y, mo, d).and_time(time(h, mi))
}

pub fn daily_bar(date: NaiveDate, open: f64, close: f64, volume: i64) -> Bar {
    Bar {
        date,
        time: None,
        open,
        close,
        volume,
    }
}

pub fn tick(date: NaiveDate, time: NaiveTime, cum_volume: f64) -> TickSnapshot {
    TickSnapshot {
        date,
        time,
        cum_volume,
    }
}

/// Daily bars whose close pattern and volumes satisfy the volume health
/// criterion: rise of three on expanding volume, support floor held.
pub fn healthy_daily_bars(start: NaiveDate) -> Vec<Bar> {
    let rows: [(f64, f64, i64); 5] = [
        (10.0, 10.5, 100),
        (10.5, 11.0, 90),
        (11.0, 10.5, 80),
        (10.5, 11.2, 100),
        (11.2, 11.6, 120),
    ];
    rows.iter()
        .enumerate()
        .map(|(i, (open, close, volume))| {
            daily_bar(start + chrono::Duration::days(i as i64), *open, *close, *volume)
        })
        .collect()
}
