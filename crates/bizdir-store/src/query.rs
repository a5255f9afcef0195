//! A small builder for the store's JSON `where` clauses.
//!
//! Patterns go to the store's PCRE engine. [`regex::escape`] only ever emits
//! a backslash before non-alphanumeric characters, which PCRE reads as the
//! literal character, so escaped text is always matched verbatim.

use serde_json::{Map, Value};

/// Anchored, fully escaped pattern matching exactly `text`.
#[must_use]
pub fn exact_pattern(text: &str) -> String {
    format!("^{}$", regex::escape(text))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    constraints: Map<String, Value>,
    limit: Option<u32>,
    order: Option<String>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Field equals `value`. For array fields the store matches any element.
    #[must_use]
    pub fn equal_to(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.constraints.insert(field.to_owned(), value.into());
        self
    }

    /// Field matches the raw `pattern`.
    #[must_use]
    pub fn matches(mut self, field: &str, pattern: &str, case_insensitive: bool) -> Self {
        let mut clause = Map::new();
        clause.insert("$regex".to_owned(), Value::String(pattern.to_owned()));
        if case_insensitive {
            clause.insert("$options".to_owned(), Value::String("i".to_owned()));
        }
        self.constraints
            .insert(field.to_owned(), Value::Object(clause));
        self
    }

    /// Case-insensitive substring match of literal `text`.
    #[must_use]
    pub fn contains(self, field: &str, text: &str) -> Self {
        self.matches(field, &regex::escape(text), true)
    }

    /// Case-insensitive whole-value match of literal `text`.
    #[must_use]
    pub fn matches_exactly(self, field: &str, text: &str) -> Self {
        self.matches(field, &exact_pattern(text), true)
    }

    /// Matches anything any of `queries` matches. Limits and ordering of the
    /// sub-queries are ignored; set them on the result.
    #[must_use]
    pub fn or(queries: impl IntoIterator<Item = Query>) -> Self {
        let clauses: Vec<Value> = queries
            .into_iter()
            .map(|q| Value::Object(q.constraints))
            .collect();
        let mut constraints = Map::new();
        constraints.insert("$or".to_owned(), Value::Array(clauses));
        Self {
            constraints,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn descending(mut self, field: &str) -> Self {
        self.order = Some(format!("-{field}"));
        self
    }

    /// The `where` clause as JSON; `{}` when unconstrained.
    #[must_use]
    pub fn where_clause(&self) -> Value {
        Value::Object(self.constraints.clone())
    }

    /// Query-string pairs for a find request.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(3);
        if !self.constraints.is_empty() {
            params.push(("where", self.where_clause().to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(order) = &self.order {
            params.push(("order", order.clone()));
        }
        params
    }
}
