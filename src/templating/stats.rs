//! Parameter usage statistics.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Counts how often each parameter path was successfully resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    counts: BTreeMap<String, usize>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successful lookup of `parameter`.
    pub fn record(&mut self, parameter: &str) {
        *self.counts.entry(parameter.to_string()).or_insert(0) += 1;
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    /// Number of successful lookups of `parameter`, zero if it was never used.
    #[must_use]
    pub fn count(&self, parameter: &str) -> usize {
        self.counts.get(parameter).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Render the counters as a JSON object sorted by parameter name.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.counts
                .iter()
                .map(|(name, count)| (name.clone(), Value::from(*count)))
                .collect::<Map<String, Value>>(),
        )
    }
}
