// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use clap::Parser;
use cli::{Cli, Commands};

mod cli;
mod logging;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    logging::init()?;

    let args = Cli::parse();

    match &args.command {
        Commands::Auth { command } => cli::auth(command).await?,
        Commands::Catalog { command } => cli::catalog(command).await?,
        Commands::Admin { command } => cli::admin(command).await?,
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
