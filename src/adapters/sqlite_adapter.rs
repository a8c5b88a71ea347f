//! SQLite market data adapter.
//!
//! Backs [`MarketDataPort`] with four tables: `calendar` (trading days),
//! `daily_bars`, `bars_5min` and `ticks` (cumulative session volume
//! snapshots). Dates are stored as `YYYY-MM-DD` text and times as `HH:MM:SS`
//! text, so SQLite's lexicographic ordering matches chronological ordering.

use crate::domain::bar::{Bar, TickSnapshot};
use crate::domain::error::TickgateError;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

const DATE_FMT: &str = "%Y-%m-%d";
const TIME_FMT: &str = "%H:%M:%S";

/// Sessions open at 09:00; before that, "today" is never a trading date.
fn session_open() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap()
}

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn parse_date(s: &str) -> Result<NaiveDate, TickgateError> {
    NaiveDate::parse_from_str(s, DATE_FMT).map_err(|e| TickgateError::DataInvalid {
        reason: format!("bad date {s:?}: {e}"),
    })
}

fn parse_time(s: &str) -> Result<NaiveTime, TickgateError> {
    NaiveTime::parse_from_str(s, TIME_FMT).map_err(|e| TickgateError::DataInvalid {
        reason: format!("bad time {s:?}: {e}"),
    })
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TickgateError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| TickgateError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| TickgateError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, TickgateError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| TickgateError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    fn conn(
        &self,
    ) -> Result<r2d2::PooledConnection<SqliteConnectionManager>, TickgateError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| TickgateError::Database {
                reason: e.to_string(),
            })
    }

    pub fn initialize_schema(&self) -> Result<(), TickgateError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS calendar (
                date TEXT NOT NULL PRIMARY KEY,
                is_open INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS daily_bars (
                code TEXT NOT NULL,
                date TEXT NOT NULL,
                open REAL NOT NULL,
                close REAL NOT NULL,
                volume INTEGER NOT NULL,
                PRIMARY KEY (code, date)
            );
            CREATE TABLE IF NOT EXISTS bars_5min (
                code TEXT NOT NULL,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                open REAL NOT NULL,
                close REAL NOT NULL,
                volume INTEGER NOT NULL,
                PRIMARY KEY (code, date, time)
            );
            CREATE TABLE IF NOT EXISTS ticks (
                code TEXT NOT NULL,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                cum_volume REAL NOT NULL,
                PRIMARY KEY (code, date, time)
            );
            CREATE INDEX IF NOT EXISTS idx_daily_bars_code ON daily_bars(code);
            CREATE INDEX IF NOT EXISTS idx_bars_5min_code_date ON bars_5min(code, date);
            CREATE INDEX IF NOT EXISTS idx_ticks_code_date ON ticks(code, date);",
        )
        .map_err(|e: rusqlite::Error| TickgateError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }

    pub fn insert_calendar(&self, days: &[(NaiveDate, bool)]) -> Result<(), TickgateError> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e: rusqlite::Error| TickgateError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        for (date, is_open) in days {
            tx.execute(
                "INSERT OR REPLACE INTO calendar (date, is_open) VALUES (?1, ?2)",
                params![date.format(DATE_FMT).to_string(), *is_open as i64],
            )
            .map_err(|e: rusqlite::Error| TickgateError::DatabaseQuery {
                reason: e.to_string(),
            })?;
        }

        tx.commit()
            .map_err(|e: rusqlite::Error| TickgateError::DatabaseQuery {
                reason: e.to_string(),
            })
    }

    pub fn insert_daily_bars(&self, code: &str, bars: &[Bar]) -> Result<(), TickgateError> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e: rusqlite::Error| TickgateError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        for bar in bars {
            tx.execute(
                "INSERT OR REPLACE INTO daily_bars (code, date, open, close, volume)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    code,
                    bar.date.format(DATE_FMT).to_string(),
                    bar.open,
                    bar.close,
                    bar.volume
                ],
            )
            .map_err(|e: rusqlite::Error| TickgateError::DatabaseQuery {
                reason: e.to_string(),
            })?;
        }

        tx.commit()
            .map_err(|e: rusqlite::Error| TickgateError::DatabaseQuery {
                reason: e.to_string(),
            })
    }

    /// Inserts 5-minute bars; every bar must carry a time of day.
    pub fn insert_intraday_bars(&self, code: &str, bars: &[Bar]) -> Result<(), TickgateError> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e: rusqlite::Error| TickgateError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        for bar in bars {
            let time = bar.time.ok_or_else(|| TickgateError::DataInvalid {
                reason: format!("intraday bar for {} on {} has no time", code, bar.date),
            })?;
            tx.execute(
                "INSERT OR REPLACE INTO bars_5min (code, date, time, open, close, volume)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    code,
                    bar.date.format(DATE_FMT).to_string(),
                    time.format(TIME_FMT).to_string(),
                    bar.open,
                    bar.close,
                    bar.volume
                ],
            )
            .map_err(|e: rusqlite::Error| TickgateError::DatabaseQuery {
                reason: e.to_string(),
            })?;
        }

        tx.commit()
            .map_err(|e: rusqlite::Error| TickgateError::DatabaseQuery {
                reason: e.to_string(),
            })
    }

    pub fn insert_ticks(&self, code: &str, ticks: &[TickSnapshot]) -> Result<(), TickgateError> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e: rusqlite::Error| TickgateError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        for tick in ticks {
            tx.execute(
                "INSERT OR REPLACE INTO ticks (code, date, time, cum_volume)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    code,
                    tick.date.format(DATE_FMT).to_string(),
                    tick.time.format(TIME_FMT).to_string(),
                    tick.cum_volume
                ],
            )
            .map_err(|e: rusqlite::Error| TickgateError::DatabaseQuery {
                reason: e.to_string(),
            })?;
        }

        tx.commit()
            .map_err(|e: rusqlite::Error| TickgateError::DatabaseQuery {
                reason: e.to_string(),
            })
    }

    /// Daily coverage for a code: (first date, last date, bar count).
    pub fn daily_range(
        &self,
        code: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TickgateError> {
        let conn = self.conn()?;

        let result: (Option<String>, Option<String>, i64) = conn
            .query_row(
                "SELECT MIN(date), MAX(date), COUNT(*) FROM daily_bars WHERE code = ?1",
                params![code],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(|e: rusqlite::Error| TickgateError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        match result {
            (Some(min_str), Some(max_str), count) if count > 0 => {
                let min = parse_date(&min_str)?;
                let max = parse_date(&max_str)?;
                Ok(Some((min, max, count as usize)))
            }
            _ => Ok(None),
        }
    }
}

impl MarketDataPort for SqliteAdapter {
    fn latest_trading_date(
        &self,
        now: NaiveDateTime,
    ) -> Result<Option<NaiveDate>, TickgateError> {
        let conn = self.conn()?;
        let today = now.date().format(DATE_FMT).to_string();

        if now.time() >= session_open() {
            let open_today: Option<i64> = conn
                .query_row(
                    "SELECT is_open FROM calendar WHERE date = ?1",
                    params![today],
                    |row| row.get(0),
                )
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(TickgateError::DatabaseQuery {
                        reason: other.to_string(),
                    }),
                })?;
            if open_today == Some(1) {
                return Ok(Some(now.date()));
            }
        }

        let prior: Option<String> = conn
            .query_row(
                "SELECT MAX(date) FROM calendar WHERE is_open = 1 AND date < ?1",
                params![today],
                |row| row.get(0),
            )
            .map_err(|e: rusqlite::Error| TickgateError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        prior.map(|s| parse_date(&s)).transpose()
    }

    fn tick_at_or_before(
        &self,
        code: &str,
        date: NaiveDate,
        cutoff: NaiveTime,
    ) -> Result<Option<TickSnapshot>, TickgateError> {
        let conn = self.conn()?;

        let row: Option<(String, f64)> = conn
            .query_row(
                "SELECT time, cum_volume FROM ticks
                 WHERE code = ?1 AND date = ?2 AND time <= ?3
                 ORDER BY time DESC LIMIT 1",
                params![
                    code,
                    date.format(DATE_FMT).to_string(),
                    cutoff.format(TIME_FMT).to_string()
                ],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(TickgateError::DatabaseQuery {
                    reason: other.to_string(),
                }),
            })?;

        row.map(|(time_str, cum_volume)| {
            Ok(TickSnapshot {
                date,
                time: parse_time(&time_str)?,
                cum_volume,
            })
        })
        .transpose()
    }

    fn latest_finer_bar_date_before(
        &self,
        code: &str,
        date: NaiveDate,
    ) -> Result<Option<NaiveDate>, TickgateError> {
        let conn = self.conn()?;

        let prior: Option<String> = conn
            .query_row(
                "SELECT MAX(date) FROM bars_5min WHERE code = ?1 AND date < ?2",
                params![code, date.format(DATE_FMT).to_string()],
                |row| row.get(0),
            )
            .map_err(|e: rusqlite::Error| TickgateError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        prior.map(|s| parse_date(&s)).transpose()
    }

    fn earliest_finer_bar_time_at_or_after(
        &self,
        code: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<Option<NaiveTime>, TickgateError> {
        let conn = self.conn()?;

        let found: Option<String> = conn
            .query_row(
                "SELECT MIN(time) FROM bars_5min
                 WHERE code = ?1 AND date = ?2 AND time >= ?3",
                params![
                    code,
                    date.format(DATE_FMT).to_string(),
                    time.format(TIME_FMT).to_string()
                ],
                |row| row.get(0),
            )
            .map_err(|e: rusqlite::Error| TickgateError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        found.map(|s| parse_time(&s)).transpose()
    }

    fn latest_finer_bar_time(
        &self,
        code: &str,
        date: NaiveDate,
    ) -> Result<Option<NaiveTime>, TickgateError> {
        let conn = self.conn()?;

        let found: Option<String> = conn
            .query_row(
                "SELECT MAX(time) FROM bars_5min WHERE code = ?1 AND date = ?2",
                params![code, date.format(DATE_FMT).to_string()],
                |row| row.get(0),
            )
            .map_err(|e: rusqlite::Error| TickgateError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        found.map(|s| parse_time(&s)).transpose()
    }

    fn sum_finer_volume_up_to(
        &self,
        code: &str,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<f64, TickgateError> {
        let conn = self.conn()?;

        conn.query_row(
            "SELECT COALESCE(SUM(volume), 0) FROM bars_5min
             WHERE code = ?1 AND date = ?2 AND time <= ?3",
            params![
                code,
                date.format(DATE_FMT).to_string(),
                time.format(TIME_FMT).to_string()
            ],
            |row| row.get(0),
        )
        .map_err(|e: rusqlite::Error| TickgateError::DatabaseQuery {
            reason: e.to_string(),
        })
    }

    fn recent_daily_bars(&self, code: &str, n: usize) -> Result<Vec<Bar>, TickgateError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(
                "SELECT date, open, close, volume FROM daily_bars
                 WHERE code = ?1 ORDER BY date DESC LIMIT ?2",
            )
            .map_err(|e: rusqlite::Error| TickgateError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let rows = stmt
            .query_map(params![code, n as i64], |row| {
                let date_str: String = row.get(0)?;
                Ok((date_str, row.get::<_, f64>(1)?, row.get::<_, f64>(2)?, row.get::<_, i64>(3)?))
            })
            .map_err(|e: rusqlite::Error| TickgateError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut bars = Vec::new();
        for row in rows {
            let (date_str, open, close, volume) =
                row.map_err(|e: rusqlite::Error| TickgateError::DatabaseQuery {
                    reason: e.to_string(),
                })?;
            bars.push(Bar {
                date: parse_date(&date_str)?,
                time: None,
                open,
                close,
                volume,
            });
        }

        // Query ran newest-first to bound the window; callers want ascending.
        bars.reverse();
        Ok(bars)
    }
}
