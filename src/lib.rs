pub mod app;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod contacts;
pub mod env_manager;
pub mod error;
pub mod lunar;
pub mod pipeline;
pub mod records;
pub mod recurrence;

use anyhow::Result;
use log::*;

/// Run the command-line application
pub fn run(cli: cli::Cli) -> Result<()> {
    let app = app::Application::new(cli.config.clone())?;
    debug!("Using config file {}", app.config_path().display());
    app.run(cli)
}

/// Initialize logging, honouring `RUST_LOG`, then `BIRTHDAYS_LOG_LEVEL`, then verbosity.
pub fn init_logger(verbosity: u8) {
    let default_level = env_manager::log_level_override().unwrap_or_else(|| {
        match verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
        .to_string()
    });
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            use chrono::Local;
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

// Re-export commonly used types
pub use calendar::{CalendarDocument, CalendarEvent, EventOptions, TimeRepresentation};
pub use config::Config;
pub use error::BirthdayError;
pub use lunar::{IcuLunarConverter, LeapMonthTable, LunarConverter, LunarResolver};
pub use pipeline::{build_calendar, CalendarBuild, PipelineOptions, SubjectFailure};
pub use records::{DateRecord, DatedPerson, EventKind, PersonRecord, RecordDate};
pub use recurrence::{ResolvedOccurrence, YearRange};
