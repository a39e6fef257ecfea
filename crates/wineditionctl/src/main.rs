//! wineditionctl - identify the Windows edition of this machine or a saved snapshot.

use clap::Parser;
use wineditionctl::cli::Cli;
use wineditionctl::{commands, errors, logging};

fn main() {
    let cli = Cli::parse();

    let config = match commands::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logging::init("warn");
            eprintln!("Error: {:#}", e);
            std::process::exit(errors::EXIT_USAGE_ERROR);
        }
    };
    logging::init(&config.log.level);

    let code = match commands::run(cli, &config) {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!("command failed: {:?}", e);
            eprintln!("Error: {:#}", e);
            errors::exit_code_for(&e)
        }
    };
    std::process::exit(code);
}
