//! `${...}` interpolation inside string values.

use super::element::Resolver;
use super::path::find_param;
use super::utils::find_similar_names;
use crate::core::{Result, TemplateError};
use serde_json::Value;
use tracing::trace;

impl Resolver<'_> {
    /// Resolve the parameters referenced by a string.
    ///
    /// A string that consists of exactly one `${...}` reference resolves to the
    /// referenced value with its type preserved. Otherwise every reference is
    /// rendered into the string (strings verbatim, anything else as compact JSON).
    /// A backslash escapes the following character; escapes are kept in the
    /// output and removed by the engine once resolution is complete.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::MalformedTemplate`] for a `${` without a closing `}`
    /// - [`TemplateError::UnresolvableParameter`] when no binding source has a
    ///   referenced parameter
    pub fn resolve_string(&mut self, input: &str, bindings: &[&Value]) -> Result<Option<Value>> {
        let mut text = input.to_string();
        let mut open = Vec::new();
        let mut i = 0;

        // Markers are ASCII, so every recorded position is a char boundary
        while i < text.len() {
            match text.as_bytes()[i] {
                b'\\' => i += 2,
                b'$' if text.as_bytes().get(i + 1) == Some(&b'{') => {
                    open.push(i);
                    i += 2;
                }
                b'}' => {
                    i += 1;
                    let Some(start) = open.pop() else {
                        continue;
                    };
                    let path = text[start + 2..i - 1].to_string();
                    let found = self.resolve_param(&path, bindings)?;
                    let Some(value) = self.resolve(&found, bindings)? else {
                        return Ok(None);
                    };
                    if start == 0 && i == text.len() {
                        return Ok(Some(value));
                    }
                    let rendered = match value {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    text.replace_range(start..i, &rendered);
                    i = start;
                }
                _ => i += 1,
            }
        }

        if !open.is_empty() {
            return Err(TemplateError::malformed(format!(
                "Unmatched \"${{\" in parameterized string \"{text}\""
            )));
        }
        Ok(Some(Value::String(text)))
    }

    /// Look up a parameter path in the binding sources, first match wins.
    pub fn resolve_param(&mut self, path: &str, bindings: &[&Value]) -> Result<Value> {
        for (index, binding) in bindings.iter().enumerate() {
            if let Some(value) = find_param(path, binding) {
                trace!("Parameter \"{path}\" found in binding source {index}");
                self.stats.record(path);
                return Ok(value.clone());
            }
        }
        Err(TemplateError::UnresolvableParameter {
            parameter: path.to_string(),
            suggestions: find_similar_names(path, self.known_parameters),
        })
    }
}
