//! The single translation boundary from upstream record shapes to
//! [`BusinessRecord`].
//!
//! Records arrive either as live store objects (which know how to resolve
//! their own file references) or as plain JSON from the local dataset. Both
//! implement [`FieldSource`]; nothing outside this module inspects the raw
//! shape.

use serde_json::{Map, Value};

use crate::record::{local_id_for_name, BusinessRecord, Keywords};

/// Field names that map onto canonical [`BusinessRecord`] fields. Upstream
/// values under these keys never reach `extra`.
const CANONICAL_FIELDS: &[&str] = &[
    "objectId",
    "Name",
    "Category",
    "Keywords",
    "Address",
    "Addresses",
    "Description",
    "Image",
];

/// Read access to one upstream record.
pub trait FieldSource {
    /// Raw value stored under `name`, if any.
    fn field(&self, name: &str) -> Option<&Value>;

    /// Every upstream field, used for pass-through.
    fn fields(&self) -> Map<String, Value>;

    /// URL of a file-valued field.
    ///
    /// The default reads a plain `{"url": ...}` or pre-resolved
    /// `{"_url": ...}` object. Live store objects override this with their
    /// own file accessor.
    fn file_url(&self, name: &str) -> Option<String> {
        let Value::Object(file) = self.field(name)? else {
            return None;
        };
        file.get("url")
            .or_else(|| file.get("_url"))
            .and_then(non_empty_str)
    }
}

impl FieldSource for Map<String, Value> {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }

    fn fields(&self) -> Map<String, Value> {
        self.clone()
    }
}

/// Converts any upstream record into a [`BusinessRecord`].
///
/// Missing or wrong-typed fields become `None` or empty; this never fails.
pub fn normalize<S>(source: &S) -> BusinessRecord
where
    S: FieldSource + ?Sized,
{
    let text = |name: &str| source.field(name).and_then(value_as_text);

    let name = text("Name");
    let id = source
        .field("objectId")
        .or_else(|| source.field("id"))
        .and_then(value_as_text)
        .filter(|id| !id.is_empty())
        .or_else(|| name.as_deref().map(local_id_for_name));

    let mut extra = source.fields();
    for key in CANONICAL_FIELDS {
        extra.remove(*key);
    }

    BusinessRecord {
        id,
        category: text("Category"),
        keywords: source.field("Keywords").and_then(Keywords::from_value),
        address: text("Address"),
        addresses: source.field("Addresses").map(string_list).unwrap_or_default(),
        description: text("Description"),
        image_url: resolve_image_url(source),
        name,
        extra,
    }
}

/// Normalizes a raw JSON value. `null` and non-object values yield `None`.
#[must_use]
pub fn normalize_value(value: &Value) -> Option<BusinessRecord> {
    match value {
        Value::Object(map) => Some(normalize(map)),
        _ => None,
    }
}

/// Picks one displayable image URL.
///
/// Order: pre-resolved `imageUrl`, CDN `ImageURL`, the store file behind
/// `Image`/`image`, then a plain string in `Image`/`image`.
fn resolve_image_url<S>(source: &S) -> Option<String>
where
    S: FieldSource + ?Sized,
{
    source
        .field("imageUrl")
        .and_then(non_empty_str)
        .or_else(|| source.field("ImageURL").and_then(non_empty_str))
        .or_else(|| source.file_url("Image"))
        .or_else(|| source.file_url("image"))
        .or_else(|| source.field("Image").and_then(non_empty_str))
        .or_else(|| source.field("image").and_then(non_empty_str))
}

fn non_empty_str(value: &Value) -> Option<String> {
    value.as_str().filter(|s| !s.is_empty()).map(str::to_owned)
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(value_as_text).collect(),
        Value::String(s) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
