//! `review` commands. Reviews live only in the remote store.

use bizdir_directory::Directory;
use bizdir_store::{BusinessStore, ReviewDraft, ReviewStore, StoreClient};
use clap::Subcommand;

use crate::browse::truncate;

#[derive(Debug, Subcommand)]
pub enum ReviewCommands {
    /// Leave a review on a business
    Add {
        /// Business id
        #[arg(long)]
        business: String,
        /// Rating, e.g. 4 or 4.5
        #[arg(long)]
        rating: String,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        author: Option<String>,
    },
    /// List reviews for a business, newest first; every review without one
    List {
        #[arg(long)]
        business: Option<String>,
    },
}

fn require_store(directory: &Directory) -> anyhow::Result<&StoreClient> {
    directory.remote().map(BusinessStore::client).ok_or_else(|| {
        anyhow::anyhow!(
            "reviews need the object store; set BIZDIR_PARSE_APP_ID and BIZDIR_PARSE_REST_KEY"
        )
    })
}

pub(crate) async fn run(
    directory: &Directory,
    command: ReviewCommands,
    json: bool,
) -> anyhow::Result<()> {
    let client = require_store(directory)?;
    let reviews = ReviewStore::new(client);

    match command {
        ReviewCommands::Add {
            business,
            rating,
            text,
            author,
        } => {
            let draft = ReviewDraft {
                business_id: business,
                rating: Some(rating),
                text,
                author_name: author,
            };
            let created = reviews.create_review(&draft).await?;
            println!("review saved as {}", created.object_id);
        }
        ReviewCommands::List { business } => {
            let found = match &business {
                Some(business) => reviews.find_reviews_by_business(business).await?,
                None => reviews.fetch_all_reviews().await?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else if found.is_empty() {
                match &business {
                    Some(business) => println!("no reviews for {business}"),
                    None => println!("no reviews"),
                }
            } else {
                println!("{:<8}{:<18}{:<26}REVIEW", "RATING", "AUTHOR", "CREATED");
                for review in &found {
                    println!(
                        "{:<8}{:<18}{:<26}{}",
                        review.rating.map_or_else(|| "-".to_owned(), |r| r.to_string()),
                        truncate(review.author_name.as_deref().unwrap_or("anonymous"), 16),
                        review.created_at.as_deref().unwrap_or("-"),
                        review.text.as_deref().unwrap_or_default()
                    );
                }
            }
        }
    }
    Ok(())
}
