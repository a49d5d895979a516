//! Consultant binary.

use anyhow::Result;
use clap::Parser;
use consultant::{load_config, run_bot, run_sweep, seed_products, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => run_bot(load_config(token)?).await,
        Commands::Sweep => {
            let report = run_sweep(load_config(None)?).await?;
            println!(
                "scanned={} evicted={} compacted={} failed={}",
                report.scanned, report.evicted, report.compacted, report.failed
            );
            Ok(())
        }
        Commands::SeedProducts { file } => {
            let count = seed_products(load_config(None)?, &file).await?;
            println!("Seeded {} products", count);
            Ok(())
        }
    }
}
