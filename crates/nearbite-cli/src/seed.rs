use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

#[derive(Debug, Args)]
pub struct SeedArgs {
    /// Path to the merchants YAML file; defaults to the configured path.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

pub async fn run(args: SeedArgs) -> anyhow::Result<()> {
    let config = nearbite_core::load_app_config()?;
    let path = args.file.unwrap_or_else(|| config.merchants_path.clone());

    let merchants_file = nearbite_core::merchants::load_merchants(&path)
        .with_context(|| format!("loading merchants from {}", path.display()))?;

    let pool = nearbite_db::connect_pool(
        &config.database_url,
        nearbite_db::PoolConfig::from_app_config(&config),
    )
    .await
    .context("connecting to database")?;
    nearbite_db::run_migrations(&pool).await?;

    let count = nearbite_db::seed_merchants(&pool, &merchants_file.merchants).await?;
    tracing::info!(count, path = %path.display(), "seeded merchants");
    println!("seeded {count} merchants from {}", path.display());
    Ok(())
}
