//! CLI definition and dispatch.

use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::TickgateError;
use crate::domain::runner::CriteriaRunner;
use crate::domain::watchlist::{parse_watchlist, WatchEntry};
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "tickgate", about = "Technical entry criteria evaluator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate entry criteria for the configured watchlist
    Evaluate {
        #[arg(short, long)]
        config: PathBuf,
        /// Evaluate a single code instead of the configured watchlist
        #[arg(long)]
        code: Option<String>,
        /// Evaluation instant as "YYYY-MM-DD HH:MM:SS" (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
    /// List the registered criteria
    ListCriteria,
    /// Show daily data coverage for a code
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: String,
    },
    /// Load CSV market data into the SQLite store
    Load {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        daily: Option<PathBuf>,
        #[arg(long)]
        intraday: Option<PathBuf>,
        #[arg(long)]
        ticks: Option<PathBuf>,
        #[arg(long)]
        calendar: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Evaluate { config, code, at } => {
            run_evaluate(&config, code.as_deref(), at.as_deref())
        }
        Command::ListCriteria => run_list_criteria(),
        Command::Info { config, code } => run_info(&config, &code),
        Command::Load {
            config,
            daily,
            intraday,
            ticks,
            calendar,
        } => run_load(
            &config,
            daily.as_deref(),
            intraday.as_deref(),
            ticks.as_deref(),
            calendar.as_deref(),
        ),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

pub fn parse_at(at: Option<&str>) -> Result<NaiveDateTime, ExitCode> {
    match at {
        Some(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map_err(|e| {
            eprintln!("error: invalid --at value {s:?}: {e} (expected YYYY-MM-DD HH:MM:SS)");
            ExitCode::from(2)
        }),
        None => Ok(Local::now().naive_local()),
    }
}

pub fn resolve_watchlist(
    code_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<WatchEntry>, ExitCode> {
    let input = match code_override {
        Some(code) => code.to_string(),
        None => match config.get_string("evaluate", "codes") {
            Some(codes) => codes,
            None => {
                let err = TickgateError::ConfigMissing {
                    section: "evaluate".into(),
                    key: "codes".into(),
                };
                eprintln!("error: {err}");
                return Err(ExitCode::from(&err));
            }
        },
    };

    parse_watchlist(&input).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(2)
    })
}

fn run_evaluate(config_path: &PathBuf, code_override: Option<&str>, at: Option<&str>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let now = match parse_at(at) {
        Ok(t) => t,
        Err(code) => return code,
    };

    let watchlist = match resolve_watchlist(code_override, &adapter) {
        Ok(w) => w,
        Err(code) => return code,
    };

    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_adapter::SqliteAdapter;
        use crate::domain::context::EvaluationContext;

        let data_port = match SqliteAdapter::from_config(&adapter) {
            Ok(a) => a,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };

        let runner = CriteriaRunner::standard();
        eprintln!(
            "Evaluating {} criteria for {} stocks at {}",
            runner.names().len(),
            watchlist.len(),
            now,
        );

        let mut passed_all = 0;
        for entry in &watchlist {
            let ctx =
                EvaluationContext::new(entry.code.as_str(), entry.name.as_str(), now, &data_port);
            let results = runner.run(&ctx);

            println!("{} ({})", entry.code, entry.name);
            let mut names: Vec<&String> = results.keys().collect();
            names.sort();
            for name in names {
                let result = &results[name];
                let verdict = if result.passed { "PASS" } else { "FAIL" };
                println!("  [{verdict}] {name}: {}", result.reason);
                let mut metrics: Vec<_> = result.metrics.iter().collect();
                metrics.sort_by(|a, b| a.0.cmp(b.0));
                for (key, value) in metrics {
                    println!("         {key} = {value}");
                }
            }
            if results.values().all(|r| r.passed) {
                passed_all += 1;
            }
        }

        eprintln!(
            "Done: {}/{} stocks passed every criterion",
            passed_all,
            watchlist.len()
        );
        ExitCode::SUCCESS
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = (&watchlist, now);
        eprintln!("error: sqlite feature is required for evaluate");
        ExitCode::from(1)
    }
}

fn run_list_criteria() -> ExitCode {
    for name in CriteriaRunner::standard().names() {
        println!("{name}");
    }
    ExitCode::SUCCESS
}

fn run_info(config_path: &PathBuf, code: &str) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(exit) => return exit,
    };

    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_adapter::SqliteAdapter;

        let data_port = match SqliteAdapter::from_config(&adapter) {
            Ok(a) => a,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };

        match data_port.daily_range(code) {
            Ok(Some((min, max, count))) => {
                println!("{code}: {min} to {max} ({count} daily bars)");
                ExitCode::SUCCESS
            }
            Ok(None) => {
                println!("{code}: no daily data");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                (&e).into()
            }
        }
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = (&adapter, code);
        eprintln!("error: sqlite feature is required for info");
        ExitCode::from(1)
    }
}

fn run_load(
    config_path: &PathBuf,
    daily: Option<&std::path::Path>,
    intraday: Option<&std::path::Path>,
    ticks: Option<&std::path::Path>,
    calendar: Option<&std::path::Path>,
) -> ExitCode {
    if daily.is_none() && intraday.is_none() && ticks.is_none() && calendar.is_none() {
        eprintln!("error: nothing to load (pass --daily, --intraday, --ticks or --calendar)");
        return ExitCode::from(2);
    }

    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(exit) => return exit,
    };

    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::csv_loader;
        use crate::adapters::sqlite_adapter::SqliteAdapter;

        let data_port = match SqliteAdapter::from_config(&adapter) {
            Ok(a) => a,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };
        if let Err(e) = data_port.initialize_schema() {
            eprintln!("error: {e}");
            return (&e).into();
        }

        let jobs: [(&str, Option<&std::path::Path>, fn(&SqliteAdapter, &std::path::Path) -> Result<usize, TickgateError>); 4] = [
            ("daily bars", daily, csv_loader::load_daily),
            ("intraday bars", intraday, csv_loader::load_intraday),
            ("ticks", ticks, csv_loader::load_ticks),
            ("calendar days", calendar, csv_loader::load_calendar),
        ];

        for (what, path, loader) in jobs {
            let Some(path) = path else { continue };
            match loader(&data_port, path) {
                Ok(count) => eprintln!("Loaded {count} {what} from {}", path.display()),
                Err(e) => {
                    eprintln!("error: {e}");
                    return (&e).into();
                }
            }
        }

        ExitCode::SUCCESS
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = (&adapter, daily, intraday, ticks, calendar);
        eprintln!("error: sqlite feature is required for load");
        ExitCode::from(1)
    }
}
