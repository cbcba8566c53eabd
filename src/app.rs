use crate::cli::{Cli, Commands, ConfigActions, GenerateArgs};
use crate::config::{get_config_path, Config};
use crate::contacts::{ContactSource, JsonFileSource};
use crate::env_manager;
use crate::lunar::{IcuLunarConverter, LeapMonthTable, LunarResolver};
use crate::pipeline::{build_calendar, CalendarBuild};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub struct Application {
    config_path: PathBuf,
}

impl Application {
    /// Resolve the config location: `--config`, then the environment, then the platform default.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_path.or_else(env_manager::config_path_override) {
            Some(path) => path,
            None => get_config_path()?,
        };
        Ok(Self { config_path })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn run(&self, cli: Cli) -> Result<()> {
        match cli.command {
            Commands::Generate(args) => self.generate(&args).map(|_| ()),
            Commands::LeapMonths { input, output } => export_leap_months(&input, output.as_deref()),
            Commands::Config { action } => self.handle_config(action),
        }
    }

    /// Effective configuration: file, then environment, then command-line flags.
    pub fn effective_config(&self, args: &GenerateArgs) -> Result<Config> {
        let mut config = Config::load_from(&self.config_path)?;
        env_manager::apply_env_overrides(&mut config);

        if let Some(contacts) = &args.contacts {
            config.paths.contacts = contacts.clone();
        }
        if let Some(output) = &args.output {
            config.paths.output = output.clone();
        }
        if let Some(leap_months) = &args.leap_months {
            config.paths.leap_months = Some(leap_months.clone());
        }
        if args.year.is_some() {
            config.calendar.current_year = args.year;
        }
        if let Some(years) = args.years {
            config.calendar.years_to_create = years;
        }
        if let Some(tz) = &args.timezone {
            config.calendar.timezone = Some(tz.clone());
        }
        if let Some(namespace) = &args.namespace {
            config.calendar.namespace = namespace.clone();
        }
        if args.no_alarm {
            config.reminder.enabled = false;
        }
        Ok(config)
    }

    /// Generate and write the calendar file.
    pub fn generate(&self, args: &GenerateArgs) -> Result<CalendarBuild> {
        let config = self.effective_config(args)?;
        let options = config.pipeline_options(Utc::now())?;

        let table = load_leap_month_table(config.paths.leap_months.as_deref())?;
        if let Some(year) = options.years.years().find(|year| !table.covers(*year)) {
            warn!(
                "Leap month table covers {:?}; lunar dates in {} and other uncovered years will fail",
                table.coverage(),
                year
            );
        }
        let resolver = LunarResolver::new(table, IcuLunarConverter::new());

        let contacts = JsonFileSource::new(&config.paths.contacts).fetch_dated_contacts()?;
        let build = build_calendar(&contacts, &resolver, &options);

        for failure in &build.failures {
            error!("Could not generate events for {}: {}", failure.subject, failure.error);
        }
        if args.strict && !build.is_complete() {
            return Err(anyhow!(
                "{} contact(s) failed; not writing {}",
                build.failures.len(),
                config.paths.output.display()
            ));
        }

        fs::write(&config.paths.output, build.document.to_ics())
            .with_context(|| format!("Failed to write calendar to {}", config.paths.output.display()))?;
        info!("Calendar file saved to {} ({} events)", config.paths.output.display(), build.document.len());

        if build.is_complete() {
            Ok(build)
        } else {
            Err(anyhow!("{} contact(s) could not be processed", build.failures.len()))
        }
    }

    fn handle_config(&self, action: ConfigActions) -> Result<()> {
        match action {
            ConfigActions::Show => {
                let mut config = Config::load_from(&self.config_path)?;
                env_manager::apply_env_overrides(&mut config);
                println!("# {}", self.config_path.display());
                println!("{}", toml::to_string_pretty(&config)?);
            }
            ConfigActions::Init => {
                if self.config_path.exists() {
                    println!("Config already exists at {}", self.config_path.display());
                    return Ok(());
                }
                Config::default().save_to(&self.config_path)?;
                println!("Wrote default config to {}", self.config_path.display());
            }
        }
        Ok(())
    }
}

/// Read a leap-month table from `path`, or use the bundled one.
pub fn load_leap_month_table(path: Option<&Path>) -> Result<LeapMonthTable> {
    let table = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read leap month table {}", path.display()))?;
            LeapMonthTable::parse(&text)?
        }
        None => LeapMonthTable::bundled()?,
    };
    info!("Leap month table covers {} leap years", table.leap_year_count());
    Ok(table)
}

fn export_leap_months(input: &Path, output: Option<&Path>) -> Result<()> {
    let table = load_leap_month_table(Some(input))?;
    let json = table.to_json()?;
    match output {
        Some(path) => {
            fs::write(path, &json).with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Leap month data saved to {}", path.display());
        }
        None => println!("{}", json),
    }
    println!("{} leap years in total", table.leap_year_count());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_flags_override_config_file() -> Result<()> {
        let dir = tempdir()?;
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[calendar]\nyears_to_create = 2\nnamespace = \"file\"\n")?;
        let app = Application::new(Some(config_path))?;

        let args = GenerateArgs { years: Some(7), no_alarm: true, ..Default::default() };
        let config = app.effective_config(&args)?;
        assert_eq!(config.calendar.years_to_create, 7);
        assert_eq!(config.calendar.namespace, "file");
        assert!(!config.reminder.enabled);
        Ok(())
    }

    #[test]
    fn test_load_custom_leap_month_table() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("leap.txt");
        fs::write(&path, "2023年 闰二月，2025年 闰六月\n")?;
        let table = load_leap_month_table(Some(&path))?;
        assert_eq!(table.leap_year_count(), 2);
        Ok(())
    }

    #[test]
    fn test_malformed_leap_month_table_aborts() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("leap.txt");
        fs::write(&path, "2023年 闰十三月\n")?;
        assert!(load_leap_month_table(Some(&path)).is_err());
        Ok(())
    }
}
