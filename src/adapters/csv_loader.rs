//! CSV bulk loaders.
//!
//! Each loader reads one flat CSV file (header row expected) and writes the
//! rows into the SQLite store, grouped per code so inserts stay transactional
//! per stock. Returns the number of rows loaded.

use crate::adapters::sqlite_adapter::SqliteAdapter;
use crate::domain::bar::{Bar, TickSnapshot};
use crate::domain::error::TickgateError;
use chrono::{NaiveDate, NaiveTime};
use std::collections::BTreeMap;
use std::path::Path;

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, TickgateError> {
    csv::Reader::from_path(path).map_err(|e| TickgateError::DataInvalid {
        reason: format!("failed to open {}: {}", path.display(), e),
    })
}

fn field<'r>(record: &'r csv::StringRecord, idx: usize, name: &str) -> Result<&'r str, TickgateError> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| TickgateError::DataInvalid {
            reason: format!("missing {name} column"),
        })
}

fn parse_date(s: &str) -> Result<NaiveDate, TickgateError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| TickgateError::DataInvalid {
        reason: format!("invalid date {s:?}: {e}"),
    })
}

fn parse_time(s: &str) -> Result<NaiveTime, TickgateError> {
    NaiveTime::parse_from_str(s, "%H:%M:%S").map_err(|e| TickgateError::DataInvalid {
        reason: format!("invalid time {s:?}: {e}"),
    })
}

fn parse_num<T: std::str::FromStr>(s: &str, name: &str) -> Result<T, TickgateError>
where
    T::Err: std::fmt::Display,
{
    s.parse().map_err(|e| TickgateError::DataInvalid {
        reason: format!("invalid {name} value {s:?}: {e}"),
    })
}

/// Loads daily bars from `code,date,open,close,volume`.
pub fn load_daily(adapter: &SqliteAdapter, path: &Path) -> Result<usize, TickgateError> {
    let mut rdr = open_reader(path)?;
    let mut by_code: BTreeMap<String, Vec<Bar>> = BTreeMap::new();

    for result in rdr.records() {
        let record = result.map_err(|e| TickgateError::DataInvalid {
            reason: format!("CSV parse error: {e}"),
        })?;
        let code = field(&record, 0, "code")?.to_string();
        by_code.entry(code).or_default().push(Bar {
            date: parse_date(field(&record, 1, "date")?)?,
            time: None,
            open: parse_num(field(&record, 2, "open")?, "open")?,
            close: parse_num(field(&record, 3, "close")?, "close")?,
            volume: parse_num(field(&record, 4, "volume")?, "volume")?,
        });
    }

    let mut loaded = 0;
    for (code, bars) in &by_code {
        adapter.insert_daily_bars(code, bars)?;
        loaded += bars.len();
    }
    Ok(loaded)
}

/// Loads 5-minute bars from `code,date,time,open,close,volume`.
pub fn load_intraday(adapter: &SqliteAdapter, path: &Path) -> Result<usize, TickgateError> {
    let mut rdr = open_reader(path)?;
    let mut by_code: BTreeMap<String, Vec<Bar>> = BTreeMap::new();

    for result in rdr.records() {
        let record = result.map_err(|e| TickgateError::DataInvalid {
            reason: format!("CSV parse error: {e}"),
        })?;
        let code = field(&record, 0, "code")?.to_string();
        by_code.entry(code).or_default().push(Bar {
            date: parse_date(field(&record, 1, "date")?)?,
            time: Some(parse_time(field(&record, 2, "time")?)?),
            open: parse_num(field(&record, 3, "open")?, "open")?,
            close: parse_num(field(&record, 4, "close")?, "close")?,
            volume: parse_num(field(&record, 5, "volume")?, "volume")?,
        });
    }

    let mut loaded = 0;
    for (code, bars) in &by_code {
        adapter.insert_intraday_bars(code, bars)?;
        loaded += bars.len();
    }
    Ok(loaded)
}

/// Loads cumulative tick snapshots from `code,date,time,cum_volume`.
pub fn load_ticks(adapter: &SqliteAdapter, path: &Path) -> Result<usize, TickgateError> {
    let mut rdr = open_reader(path)?;
    let mut by_code: BTreeMap<String, Vec<TickSnapshot>> = BTreeMap::new();

    for result in rdr.records() {
        let record = result.map_err(|e| TickgateError::DataInvalid {
            reason: format!("CSV parse error: {e}"),
        })?;
        let code = field(&record, 0, "code")?.to_string();
        by_code.entry(code).or_default().push(TickSnapshot {
            date: parse_date(field(&record, 1, "date")?)?,
            time: parse_time(field(&record, 2, "time")?)?,
            cum_volume: parse_num(field(&record, 3, "cum_volume")?, "cum_volume")?,
        });
    }

    let mut loaded = 0;
    for (code, ticks) in &by_code {
        adapter.insert_ticks(code, ticks)?;
        loaded += ticks.len();
    }
    Ok(loaded)
}

/// Loads the trading calendar from `date,is_open` (is_open as 0/1).
pub fn load_calendar(adapter: &SqliteAdapter, path: &Path) -> Result<usize, TickgateError> {
    let mut rdr = open_reader(path)?;
    let mut days = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| TickgateError::DataInvalid {
            reason: format!("CSV parse error: {e}"),
        })?;
        let date = parse_date(field(&record, 0, "date")?)?;
        let is_open: i64 = parse_num(field(&record, 1, "is_open")?, "is_open")?;
        days.push((date, is_open != 0));
    }

    adapter.insert_calendar(&days)?;
    Ok(days.len())
}
