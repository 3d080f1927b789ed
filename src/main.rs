use azure_nsg_audit::cli::{self, Cli};
use azure_nsg_audit::logging;
use clap::Parser;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    logging::init(logging::LOG_CONFIG_FILE);
    log::info!("#Start main()");

    let cli = Cli::parse();
    cli::run(cli)
}
