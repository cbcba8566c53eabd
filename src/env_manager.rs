use crate::config::Config;
use log::{debug, warn};
use std::env;
use std::path::PathBuf;

pub const CONFIG_PATH_VAR: &str = "BIRTHDAYS_CONFIG_PATH";
pub const LOG_LEVEL_VAR: &str = "BIRTHDAYS_LOG_LEVEL";
pub const TIMEZONE_VAR: &str = "BIRTHDAYS_TIMEZONE";
pub const YEARS_VAR: &str = "BIRTHDAYS_YEARS_TO_CREATE";

/// Load a `.env` file from the working directory if one exists.
///
/// Runs before the logger is up, so the outcome is returned rather than logged.
pub fn load_env_file() -> Result<PathBuf, dotenvy::Error> {
    dotenvy::dotenv()
}

fn non_empty<F>(lookup: F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn process_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

/// Config path from the environment, if set
pub fn config_path_override() -> Option<PathBuf> {
    non_empty(process_env, CONFIG_PATH_VAR).map(PathBuf::from)
}

/// Log level from the environment, if set
pub fn log_level_override() -> Option<String> {
    non_empty(process_env, LOG_LEVEL_VAR)
}

/// Apply environment overrides on top of a loaded config
pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides_from(config, process_env);
}

/// Apply overrides looked up through `lookup` rather than the process environment.
pub fn apply_overrides_from<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(tz) = non_empty(&lookup, TIMEZONE_VAR) {
        debug!("Using timezone {} from {}", tz, TIMEZONE_VAR);
        config.calendar.timezone = Some(tz);
    }
    if let Some(years) = non_empty(&lookup, YEARS_VAR) {
        match years.parse::<u32>() {
            Ok(years) => config.calendar.years_to_create = years,
            Err(_) => warn!("Ignoring {}={}: not a number", YEARS_VAR, years),
        }
    }
}
