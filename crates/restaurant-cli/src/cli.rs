use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "restaurants")]
#[command(about = "Browse restaurants and reviews, online or off")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Restaurant API base URL (overrides RESTAURANTS_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Directory for the local store and favorites (overrides RESTAURANTS_DATA_DIR)
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Run without a persistent local store
    #[arg(long, global = true)]
    pub no_local_store: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List restaurants, optionally filtered
    List {
        /// Cuisine to show ("all" for any)
        #[arg(long, default_value = "all")]
        cuisine: String,
        /// Neighborhood to show ("all" for any)
        #[arg(long, default_value = "all")]
        neighborhood: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one restaurant with its reviews
    Show {
        /// Restaurant id
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List neighborhoods
    Neighborhoods,
    /// List cuisines
    Cuisines,
    /// List reviews of a restaurant
    Reviews {
        /// Restaurant id
        restaurant_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a review
    Review {
        /// Restaurant id
        restaurant_id: i64,
        /// Reviewer name
        #[arg(long)]
        name: String,
        /// Rating from 1 to 5
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,
        /// Review text
        #[arg(long)]
        comments: String,
    },
    /// Add or remove a favorite restaurant
    Favorite {
        /// Restaurant id
        restaurant_id: i64,
    },
    /// List favorite restaurants
    Favorites,
    /// List reviews waiting to be synced
    Pending {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Send pending reviews to the API
    Sync,
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
