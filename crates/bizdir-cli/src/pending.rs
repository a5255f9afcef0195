//! `pending` commands and the startup replay of queued applications.

use bizdir_directory::{Directory, PendingQueue};
use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum PendingCommands {
    /// Show applications waiting to be submitted
    List,
    /// Retry every queued application now
    Flush,
}

/// Replays the queue once before the command runs. Failures are logged and
/// never stop the command.
pub(crate) async fn flush_at_startup(directory: &Directory, queue: &mut PendingQueue) {
    let Some(store) = directory.remote() else {
        return;
    };
    match queue.flush(store).await {
        Ok(report) if report.flushed > 0 || report.remaining > 0 => {
            tracing::info!(
                flushed = report.flushed,
                remaining = report.remaining,
                "replayed pending submissions"
            );
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "could not update the pending queue"),
    }
}

pub(crate) async fn run(
    directory: &Directory,
    queue: &mut PendingQueue,
    command: PendingCommands,
    json: bool,
) -> anyhow::Result<()> {
    match command {
        PendingCommands::List => {
            let entries = queue.list();
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("no pending applications");
            } else {
                println!("{:<28}{:<32}IMAGE", "QUEUED", "NAME");
                for entry in &entries {
                    println!(
                        "{:<28}{:<32}{}",
                        entry.queued_at.map_or_else(
                            || "-".to_owned(),
                            |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string()
                        ),
                        entry.name().unwrap_or("-"),
                        entry
                            .image
                            .as_ref()
                            .map_or("-", |i| i.original_filename.as_str())
                    );
                }
            }
        }
        PendingCommands::Flush => {
            let store = directory.remote().ok_or_else(|| {
                anyhow::anyhow!(
                    "cannot flush without the object store; set BIZDIR_PARSE_APP_ID and BIZDIR_PARSE_REST_KEY"
                )
            })?;
            let report = queue.flush(store).await?;
            println!(
                "flushed {} application(s), {} still pending",
                report.flushed, report.remaining
            );
        }
    }
    Ok(())
}
