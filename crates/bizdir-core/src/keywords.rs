//! Singular/plural keyword expansion and the case-insensitive predicates
//! used when filtering records in-process.

/// Returns `true` when a search term should be treated as "fetch all".
#[must_use]
pub fn is_blank(term: &str) -> bool {
    term.trim().is_empty()
}

/// The lowercased forms of a search term.
///
/// `singular` drops one trailing `s`, `plural` adds one when missing. Both
/// are derived from `lower`, so `"Cafes"` expands to
/// `{ lower: "cafes", singular: "cafe", plural: "cafes" }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordForms {
    pub lower: String,
    pub singular: String,
    pub plural: String,
}

impl KeywordForms {
    /// Expands `term` into its lowercase, singular, and plural forms.
    ///
    /// Total over all strings: `""` yields `{ "", "", "s" }`.
    #[must_use]
    pub fn expand(term: &str) -> Self {
        let lower = term.to_lowercase();
        let singular = lower.strip_suffix('s').unwrap_or(&lower).to_owned();
        let plural = if lower.ends_with('s') {
            lower.clone()
        } else {
            format!("{lower}s")
        };
        Self {
            lower,
            singular,
            plural,
        }
    }

    /// Matches one element of an array-valued keyword field.
    ///
    /// The entry matches when it equals any of the three forms, or when it
    /// contains the lowercased term.
    #[must_use]
    pub fn matches_entry(&self, entry: &str) -> bool {
        let entry = entry.to_lowercase();
        entry == self.lower
            || entry == self.singular
            || entry == self.plural
            || (!self.lower.is_empty() && entry.contains(&self.lower))
    }

    /// Matches a single-string keyword field (often a comma-separated list)
    /// by substring against any of the three forms.
    #[must_use]
    pub fn matches_text(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        [&self.lower, &self.singular, &self.plural]
            .into_iter()
            .any(|form| !form.is_empty() && text.contains(form.as_str()))
    }
}
