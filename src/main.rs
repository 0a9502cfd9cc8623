use std::process::ExitCode;

use clap::Parser;
use pixelforge::cli::{self, CliArgs};
use pixelforge::{log_info, logger};

fn main() -> ExitCode {
    logger::init();
    log_info!("Args: {:?}", std::env::args().skip(1).collect::<Vec<_>>());

    let args = CliArgs::parse();
    let code = cli::run(args);

    log_info!("Exiting with {:?}", code);
    code
}
