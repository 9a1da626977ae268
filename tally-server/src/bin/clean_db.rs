use clap::Parser;
use tracing::info;

use tally_persistence::{ClearOptions, ResultRepository, connect_and_migrate};

/// Wipe stored Wordle results so summaries can be re-ingested from scratch
#[derive(Parser, Debug)]
#[command(name = "clean-db")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database to clean
    #[arg(long, env = "DATABASE_URL", default_value = tally_persistence::connection::DEFAULT_DATABASE_URL)]
    database_url: String,

    /// Keep player rows and their display names
    #[arg(long)]
    keep_players: bool,

    /// Also delete the alias table
    #[arg(long)]
    drop_aliases: bool,

    /// Run VACUUM afterwards
    #[arg(long)]
    vacuum: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let db = connect_and_migrate(&cli.database_url).await?;
    let repository = ResultRepository::new(db);

    let (before, after) = repository
        .clear(ClearOptions {
            keep_players: cli.keep_players,
            drop_aliases: cli.drop_aliases,
        })
        .await?;

    info!(
        "results {} -> {}, games {} -> {}, players {} -> {}, aliases {} -> {}",
        before.results,
        after.results,
        before.games,
        after.games,
        before.players,
        after.players,
        before.aliases,
        after.aliases
    );

    if cli.vacuum {
        repository.vacuum().await?;
        info!("Database vacuumed");
    }

    Ok(())
}
