//! Read-only directory commands: search, category, show, list.

use bizdir_core::BusinessRecord;
use bizdir_directory::Directory;
use bizdir_store::ReviewStore;

const ID_WIDTH: usize = 30;
const NAME_WIDTH: usize = 30;
const CATEGORY_WIDTH: usize = 22;

/// Cuts `text` to `max` characters, marking the cut with `...`.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        text.to_owned()
    }
}

pub(crate) fn print_records(records: &[BusinessRecord], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("no businesses found");
        return Ok(());
    }

    println!("{:<32}{:<32}{:<24}ADDRESS", "ID", "NAME", "CATEGORY");
    for record in records {
        println!("{}", record_row(record));
    }
    println!("{} business(es)", records.len());
    Ok(())
}

/// One table row; every column but the last is cut to fit its width.
pub(crate) fn record_row(record: &BusinessRecord) -> String {
    format!(
        "{:<32}{:<32}{:<24}{}",
        truncate(record.id.as_deref().unwrap_or("-"), ID_WIDTH),
        truncate(record.name.as_deref().unwrap_or("-"), NAME_WIDTH),
        truncate(record.category.as_deref().unwrap_or("-"), CATEGORY_WIDTH),
        record.locations().first().copied().unwrap_or("-"),
    )
}

pub(crate) async fn run_search(directory: &Directory, term: &str, json: bool) -> anyhow::Result<()> {
    let records = directory.search(term).await;
    print_records(&records, json)
}

pub(crate) async fn run_category(
    directory: &Directory,
    category: &str,
    json: bool,
) -> anyhow::Result<()> {
    let records = directory.get_by_category(category).await;
    print_records(&records, json)
}

pub(crate) async fn run_list(directory: &Directory, json: bool) -> anyhow::Result<()> {
    let records = directory.fetch_all().await;
    print_records(&records, json)
}

/// Prints one business. Reviews are listed when the store is configured;
/// a failed review lookup is logged and the business is still shown.
///
/// # Errors
///
/// Returns an error if no business matches `id`.
pub(crate) async fn run_show(directory: &Directory, id: &str, json: bool) -> anyhow::Result<()> {
    let record = directory
        .get_by_id(id)
        .await
        .ok_or_else(|| anyhow::anyhow!("business '{id}' not found"))?;

    let reviews = match directory.remote() {
        Some(store) => {
            let lookup_id = record.id.as_deref().unwrap_or(id);
            match ReviewStore::new(store.client())
                .find_reviews_by_business(lookup_id)
                .await
            {
                Ok(reviews) => reviews,
                Err(e) => {
                    tracing::warn!(error = %e, id = lookup_id, "could not load reviews");
                    Vec::new()
                }
            }
        }
        None => Vec::new(),
    };

    if json {
        let output = serde_json::json!({"business": record, "reviews": reviews});
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", record.name.as_deref().unwrap_or("(unnamed)"));
    if let Some(category) = &record.category {
        println!("Category:    {category}");
    }
    if let Some(keywords) = &record.keywords {
        println!("Keywords:    {}", keywords.display());
    }
    for (i, location) in record.locations().iter().enumerate() {
        let label = if i == 0 { "Address:" } else { "" };
        println!("{label:<13}{location}");
    }
    if let Some(description) = &record.description {
        println!("Description: {description}");
    }
    if let Some(image) = &record.image_url {
        println!("Image:       {image}");
    }
    if let Some(id) = &record.id {
        println!("ID:          {id}");
    }

    if !reviews.is_empty() {
        println!();
        println!("{:<8}{:<18}REVIEW", "RATING", "AUTHOR");
        for review in &reviews {
            let rating = review
                .rating
                .map_or_else(|| "-".to_owned(), |r| r.to_string());
            println!(
                "{:<8}{:<18}{}",
                rating,
                truncate(review.author_name.as_deref().unwrap_or("anonymous"), 16),
                review.text.as_deref().unwrap_or_default()
            );
        }
    }
    Ok(())
}
