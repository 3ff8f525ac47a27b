mod adapters;
mod cli;
mod config;
mod error;
mod exit_codes;
mod interrupt;
mod upgrade;
mod utils;
mod version;
mod workflow;

use clap::Parser;
use cli::Cli;
use interrupt::Interrupt;
use std::process;
use utils::logger;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version come through here as well
            let code = if e.use_stderr() {
                exit_codes::BAD_ARGUMENT
            } else {
                exit_codes::OK
            };
            let _ = e.print();
            process::exit(code);
        }
    };

    if cli.verbose {
        unsafe {
            std::env::set_var(logger::VERBOSE_ENV, "1");
        }
    }

    let interrupt = Interrupt::listen_for_ctrl_c();
    let (manager, args) = cli.command.split();

    let result = workflow::execute_upgrade(manager, args, cli.config.as_deref(), interrupt);

    if let Err(e) = result {
        logger::failure(&e.to_string());
        process::exit(e.exit_code());
    }
}
