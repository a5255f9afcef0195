mod apply;
mod browse;
mod pending;
mod reviews;

use std::path::PathBuf;

use bizdir_core::AppConfig;
use bizdir_directory::{Directory, LocalDataset, LocalKv, PendingQueue};
use bizdir_store::{BusinessStore, StoreClient};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::pending::PendingCommands;
use crate::reviews::ReviewCommands;

#[derive(Debug, Parser)]
#[command(name = "bizdir")]
#[command(about = "Local business directory command line interface")]
struct Cli {
    /// Print records as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search businesses by keyword, name, or category
    Search {
        /// Search term; omit to list everything
        term: Option<String>,
    },
    /// List businesses in one category (exact, case-insensitive)
    Category { category: String },
    /// Show one business with its reviews
    Show {
        /// Store id, or the encoded name of a local record
        id: String,
    },
    /// List every business
    List,
    /// Submit a business application; queued locally if the store refuses it
    Apply {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
        /// Search keyword; repeat or comma-separate for several
        #[arg(long = "keyword")]
        keywords: Vec<String>,
        /// Primary address
        #[arg(long)]
        address: String,
        /// Additional location; repeat for several
        #[arg(long = "extra-address")]
        extra_addresses: Vec<String>,
        #[arg(long)]
        description: Option<String>,
        /// Already-hosted image URL
        #[arg(long)]
        image_url: Option<String>,
        /// Image file to upload with the application
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Review commands
    Review {
        #[command(subcommand)]
        command: ReviewCommands,
    },
    /// Locally queued applications
    Pending {
        #[command(subcommand)]
        command: PendingCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = bizdir_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(env = %config.env, config = ?config, "configuration loaded");

    let Some(command) = cli.command else {
        println!("bizdir ready; run `bizdir --help` for commands");
        return Ok(());
    };

    let directory = build_directory(&config)?;
    let mut queue = PendingQueue::new(LocalKv::new(&config.pending_store_path));

    let explicit_flush = matches!(
        command,
        Commands::Pending {
            command: PendingCommands::Flush
        }
    );
    if !explicit_flush {
        pending::flush_at_startup(&directory, &mut queue).await;
    }

    match command {
        Commands::Search { term } => {
            browse::run_search(&directory, term.as_deref().unwrap_or_default(), cli.json).await?;
        }
        Commands::Category { category } => {
            browse::run_category(&directory, &category, cli.json).await?;
        }
        Commands::Show { id } => browse::run_show(&directory, &id, cli.json).await?,
        Commands::List => browse::run_list(&directory, cli.json).await?,
        Commands::Apply {
            name,
            category,
            keywords,
            address,
            extra_addresses,
            description,
            image_url,
            image,
        } => {
            let form = apply::ApplicationForm {
                name,
                category,
                keywords,
                address,
                extra_addresses,
                description,
                image_url,
                image,
            };
            apply::run_apply(&directory, &queue, form).await?;
        }
        Commands::Review { command } => reviews::run(&directory, command, cli.json).await?,
        Commands::Pending { command } => {
            pending::run(&directory, &mut queue, command, cli.json).await?;
        }
    }

    Ok(())
}

/// Wires the store client (when credentials are set) and the local dataset
/// into one [`Directory`].
fn build_directory(config: &AppConfig) -> anyhow::Result<Directory> {
    let remote = StoreClient::from_config(config)?
        .map(|client| BusinessStore::new(client).with_limit(config.query_limit));
    if remote.is_none() {
        tracing::info!("object store credentials not set; using the local dataset only");
    }
    Ok(Directory::new(
        remote,
        LocalDataset::new(&config.local_dataset),
    ))
}

#[cfg(test)]
mod tests;
