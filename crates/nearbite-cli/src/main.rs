mod check;
mod seed;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "nearbite-cli")]
#[command(about = "nearbite service-availability command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check merchant availability for a position.
    Check(check::CheckArgs),
    /// Seed merchants from the YAML seed file.
    Seed(seed::SeedArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Check(args) => check::run(args).await,
        Commands::Seed(args) => seed::run(args).await,
    }
}
