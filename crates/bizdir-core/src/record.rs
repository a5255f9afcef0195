use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::keywords::KeywordForms;

/// Characters left as-is by a browser's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Derives the link identifier for a record that has no store-assigned id.
///
/// Detail links for local dataset records carry the percent-encoded
/// business name, e.g. `"Joe's Cafe"` becomes `"Joe's%20Cafe"`.
#[must_use]
pub fn local_id_for_name(name: &str) -> String {
    utf8_percent_encode(name, URI_COMPONENT).to_string()
}

/// The `Keywords` field is stored either as an array or as one string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Keywords {
    Many(Vec<String>),
    One(String),
}

impl Keywords {
    /// Reads either shape from a raw JSON value.
    ///
    /// Non-string array entries are kept as their JSON text; nulls are
    /// dropped. Any other value type yields `None`.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::One(s.clone())),
            Value::Array(items) => Some(Self::Many(
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::Null => None,
                        Value::String(s) => Some(s.clone()),
                        other => Some(other.to_string()),
                    })
                    .collect(),
            )),
            _ => None,
        }
    }

    /// Case-insensitive, singular/plural tolerant keyword match.
    #[must_use]
    pub fn matches(&self, forms: &KeywordForms) -> bool {
        match self {
            Self::Many(entries) => entries.iter().any(|entry| forms.matches_entry(entry)),
            Self::One(text) => forms.matches_text(text),
        }
    }

    /// Joins the keywords for single-line display.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Many(entries) => entries.join(", "),
            Self::One(text) => text.clone(),
        }
    }
}

/// The canonical business shape every consumer reads, whatever the source.
///
/// Serialized field names follow the object store schema so records can be
/// printed, cached, or re-normalized without a separate mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BusinessRecord {
    /// Store `objectId`, or the encoded name for local records.
    #[serde(rename = "objectId")]
    pub id: Option<String>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Category")]
    pub category: Option<String>,
    #[serde(rename = "Keywords")]
    pub keywords: Option<Keywords>,
    #[serde(rename = "Address")]
    pub address: Option<String>,
    #[serde(rename = "Addresses")]
    pub addresses: Vec<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    /// The single resolved image URL.
    #[serde(rename = "Image")]
    pub image_url: Option<String>,
    /// Upstream fields with no canonical counterpart, passed through as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BusinessRecord {
    /// All known locations: `addresses` when present, else the primary
    /// `address` alone.
    #[must_use]
    pub fn locations(&self) -> Vec<&str> {
        if self.addresses.is_empty() {
            self.address.iter().map(String::as_str).collect()
        } else {
            self.addresses.iter().map(String::as_str).collect()
        }
    }

    #[must_use]
    pub fn matches_keyword(&self, forms: &KeywordForms) -> bool {
        self.keywords.as_ref().is_some_and(|k| k.matches(forms))
    }

    /// Exact, case-insensitive category equality. A missing category
    /// compares as the empty string.
    #[must_use]
    pub fn matches_category(&self, category: &str) -> bool {
        self.category.as_deref().unwrap_or_default().to_lowercase() == category.to_lowercase()
    }
}
