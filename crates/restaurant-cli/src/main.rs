//! Restaurants CLI - browse restaurants and write reviews from the terminal
//!
//! Reviews written while the API is down are kept locally and sent with
//! `restaurants sync`.

mod cli;
mod commands;
mod error;
#[cfg(test)]
mod tests;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::common::{open_directory, resolve_config};
use crate::commands::completions::run_completions;
use crate::commands::favorite::{run_favorite, run_favorites};
use crate::commands::list::{run_cuisines, run_list, run_neighborhoods};
use crate::commands::review::{run_pending, run_review};
use crate::commands::show::{run_reviews, run_show};
use crate::commands::sync::run_sync;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("restaurant_cli=info,restaurant_core=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Commands::Completions { shell, output } = &cli.command {
        return run_completions(*shell, output.as_deref());
    }

    let config = resolve_config(cli.api_url, cli.data_dir)?;
    let directory = open_directory(&config, cli.no_local_store).await?;

    match cli.command {
        Commands::List {
            cuisine,
            neighborhood,
            json,
        } => run_list(&directory, &cuisine, &neighborhood, json).await?,
        Commands::Show { id, json } => run_show(&directory, id, json).await?,
        Commands::Neighborhoods => run_neighborhoods(&directory).await?,
        Commands::Cuisines => run_cuisines(&directory).await?,
        Commands::Reviews {
            restaurant_id,
            json,
        } => run_reviews(&directory, restaurant_id, json).await?,
        Commands::Review {
            restaurant_id,
            name,
            rating,
            comments,
        } => run_review(&directory, restaurant_id, &name, rating, &comments).await?,
        Commands::Favorite { restaurant_id } => run_favorite(&directory, restaurant_id)?,
        Commands::Favorites => run_favorites(&directory).await?,
        Commands::Pending { json } => run_pending(&directory, json).await?,
        Commands::Sync => run_sync(&directory).await?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
