//! Utility functions for the templating system.

use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use strsim::levenshtein;

/// Maximum edit distance, as a percentage of the target length, for a name to be
/// offered as a "did you mean" suggestion
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Parameters that are assigned by more than one binding source, keyed by their
/// fully-qualified dotted name.
pub type DuplicateReport = BTreeMap<String, Vec<Value>>;

/// Remove escape characters from a string.
///
/// Every `\x` pair collapses to `x`; a trailing lone backslash is dropped.
///
/// # Examples
///
/// ```rust
/// use jsonteng::templating::unescape_str;
///
/// assert_eq!(unescape_str(r"\${x\}"), "${x}");
/// assert_eq!(unescape_str(r"a\\b"), r"a\b");
/// ```
pub fn unescape_str(input: &str) -> Cow<'_, str> {
    if !input.contains('\\') {
        return Cow::Borrowed(input);
    }
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                output.push(escaped);
            }
        } else {
            output.push(c);
        }
    }
    Cow::Owned(output)
}

/// Remove escape characters from every string in a JSON value, object keys
/// included.
pub fn unescape_value(value: Value) -> Value {
    match value {
        Value::String(s) => match unescape_str(&s) {
            Cow::Borrowed(_) => Value::String(s),
            Cow::Owned(unescaped) => Value::String(unescaped),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(unescape_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (unescape_str(&key).into_owned(), unescape_value(value)))
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}

/// Collect the leaf (non-object) fields of every binding source.
///
/// Nested objects are flattened into dotted names; arrays are leaves.
fn collect_leaves<'a>(
    prefix: Option<&str>,
    object: &'a Map<String, Value>,
    leaves: &mut Vec<(String, &'a Value)>,
) {
    for (key, value) in object {
        let name = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => collect_leaves(Some(&name), nested, leaves),
            _ => leaves.push((name, value)),
        }
    }
}

/// Find parameters assigned more than once across the binding sources.
///
/// Every assignment counts, even when the values are equal. Binding sources that
/// are not objects contribute nothing.
///
/// # Examples
///
/// ```rust
/// use jsonteng::templating::find_duplicated_parameters;
/// use serde_json::json;
///
/// let first = json!({"net": {"cidr": "10.0.0.0/16"}, "name": "a"});
/// let second = json!({"net": {"cidr": "10.1.0.0/16"}});
/// let report = find_duplicated_parameters(&[&first, &second]);
///
/// assert_eq!(report.len(), 1);
/// assert_eq!(report["net.cidr"], vec![json!("10.0.0.0/16"), json!("10.1.0.0/16")]);
/// ```
pub fn find_duplicated_parameters(bindings: &[&Value]) -> DuplicateReport {
    let mut leaves = Vec::new();
    for binding in bindings {
        if let Value::Object(object) = binding {
            collect_leaves(None, object, &mut leaves);
        }
    }

    let mut assignments: DuplicateReport = BTreeMap::new();
    for (name, value) in leaves {
        assignments.entry(name).or_default().push(value.clone());
    }
    assignments.retain(|_, values| values.len() > 1);
    assignments
}

/// All dotted leaf parameter names defined by the binding sources, deduplicated.
pub fn parameter_names(bindings: &[&Value]) -> Vec<String> {
    let mut leaves = Vec::new();
    for binding in bindings {
        if let Value::Object(object) = binding {
            collect_leaves(None, object, &mut leaves);
        }
    }
    let mut names: Vec<String> = leaves.into_iter().map(|(name, _)| name).collect();
    names.sort();
    names.dedup();
    names
}

/// Find names similar to `target` using Levenshtein distance.
///
/// Returns at most three candidates, closest first.
pub fn find_similar_names(target: &str, available: &[String]) -> Vec<String> {
    let mut scored: Vec<_> =
        available.iter().map(|name| (name.clone(), levenshtein(target, name))).collect();

    scored.sort_by_key(|(_, dist)| *dist);

    scored
        .into_iter()
        .filter(|(name, dist)| {
            *dist > 0 && *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100 && name != target
        })
        .take(3)
        .map(|(name, _)| name)
        .collect()
}
