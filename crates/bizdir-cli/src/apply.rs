//! `apply`: submit a business application from the command line.

use std::path::{Path, PathBuf};

use bizdir_directory::{Directory, PendingQueue, SubmitOutcome};
use bizdir_store::{BusinessApplication, ImageUpload};

/// Raw `apply` arguments before the image file is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ApplicationForm {
    pub name: String,
    pub category: String,
    pub keywords: Vec<String>,
    pub address: String,
    pub extra_addresses: Vec<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub image: Option<PathBuf>,
}

/// Content type for an image upload, from the file extension.
pub(crate) fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

impl ApplicationForm {
    /// Builds the application, reading the image file if one was given.
    /// Each `--keyword` may itself be a comma-separated list.
    pub(crate) async fn into_application(self) -> anyhow::Result<BusinessApplication> {
        let image = match &self.image {
            Some(path) => {
                let bytes = tokio::fs::read(path).await.map_err(|e| {
                    anyhow::anyhow!("cannot read image {}: {e}", path.display())
                })?;
                let filename = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("image")
                    .to_owned();
                Some(ImageUpload {
                    filename,
                    content_type: content_type_for(path).to_owned(),
                    bytes,
                })
            }
            None => None,
        };

        Ok(BusinessApplication {
            name: self.name.trim().to_owned(),
            category: self.category.trim().to_owned(),
            keywords: self
                .keywords
                .iter()
                .flat_map(|raw| BusinessApplication::parse_keywords(raw))
                .collect(),
            address: self.address.trim().to_owned(),
            additional_addresses: self
                .extra_addresses
                .iter()
                .map(|a| a.trim().to_owned())
                .filter(|a| !a.is_empty())
                .collect(),
            description: self.description.filter(|d| !d.trim().is_empty()),
            image_url: self.image_url.filter(|u| !u.trim().is_empty()),
            image,
        })
    }
}

/// # Errors
///
/// Returns an error if required fields are blank, the image cannot be read,
/// or the application could neither be saved nor queued.
pub(crate) async fn run_apply(
    directory: &Directory,
    queue: &PendingQueue,
    form: ApplicationForm,
) -> anyhow::Result<()> {
    let application = form.into_application().await?;
    for (field, value) in [
        ("--name", &application.name),
        ("--category", &application.category),
        ("--address", &application.address),
    ] {
        if value.is_empty() {
            anyhow::bail!("{field} must not be blank");
        }
    }

    match directory.submit_application(&application, queue).await? {
        SubmitOutcome::Saved { id } => println!("application saved as {id}"),
        SubmitOutcome::Queued { error } => {
            println!("could not save the application ({error}); it is queued and will be retried");
        }
    }
    Ok(())
}
