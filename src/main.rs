use anyhow::Result;
use birthday_calendar::cli::Cli;
use birthday_calendar::{env_manager, init_logger, run};
use clap::Parser;
use log::{debug, info};

fn main() -> Result<()> {
    let env_file = env_manager::load_env_file();
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match env_file {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => debug!("No .env file loaded: {}", e),
    }

    info!("Starting birthday-calendar {}", env!("CARGO_PKG_VERSION"));
    run(cli)
}
