use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// birthday-calendar - birthdays, lunar birthdays and anniversaries as an iCalendar feed
#[derive(Debug, Parser)]
#[command(name = "birthday-calendar")]
#[command(about = "Generate a multi-year birthday and anniversary calendar (.ics)", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate the calendar file from a contacts export
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// Convert a leap-month text table to JSON
    LeapMonths {
        /// Text file with "<year>年 闰<month>" entries
        #[arg(long, short)]
        input: PathBuf,

        /// Write JSON here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// View or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigActions,
    },
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct GenerateArgs {
    /// Contacts JSON export (People API connections)
    #[arg(long)]
    pub contacts: Option<PathBuf>,

    /// Output .ics file
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// First year to generate (defaults to the current year)
    #[arg(long)]
    pub year: Option<i32>,

    /// Number of years to generate
    #[arg(long)]
    pub years: Option<u32>,

    /// IANA timezone for timed events; omit for all-day events
    #[arg(long)]
    pub timezone: Option<String>,

    /// Do not attach reminders
    #[arg(long)]
    pub no_alarm: bool,

    /// Namespace used in event UIDs
    #[arg(long)]
    pub namespace: Option<String>,

    /// Leap-month table overriding the bundled one
    #[arg(long)]
    pub leap_months: Option<PathBuf>,

    /// Refuse to write the calendar if any contact fails
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Subcommand)]
pub enum ConfigActions {
    /// Show the effective configuration
    Show,
    /// Write the default configuration file
    Init,
}
