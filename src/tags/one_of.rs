//! The `one-of` tag: conditional selection.

use super::{Tag, arity_error};
use crate::core::{Result, TemplateError};
use crate::templating::{Resolver, evaluate_condition};
use serde_json::Value;
use tracing::debug;

/// `["#one-of", [condition, value], ..., default]`
///
/// Conditions are resolved and evaluated in order; the value paired with the
/// first true condition is resolved and returned. A final token that is not an
/// array is the default. With no match and no default the tag produces nothing.
pub struct OneOfTag;

impl Tag for OneOfTag {
    fn name(&self) -> &'static str {
        "one-of"
    }

    fn process(
        &self,
        tokens: &[Value],
        bindings: &[&Value],
        resolver: &mut Resolver<'_>,
    ) -> Result<Option<Value>> {
        if tokens.is_empty() {
            return Err(arity_error(self.name(), tokens, "at least 1 parameter"));
        }

        let last = tokens.len() - 1;
        for (index, token) in tokens.iter().enumerate() {
            match token {
                Value::Array(pair) if pair.len() == 2 => {
                    let Some(condition) = resolver.resolve(&pair[0], bindings)? else {
                        return Err(TemplateError::malformed(format!(
                            "Tag \"one-of\" condition {} resolved to nothing",
                            pair[0]
                        )));
                    };
                    if evaluate_condition(&condition)? {
                        debug!("one-of matched condition {index}");
                        return resolver.resolve(&pair[1], bindings);
                    }
                }
                Value::Array(_) => {
                    return Err(TemplateError::malformed(format!(
                        "Tag \"one-of\" contains an invalid parameter {token}"
                    )));
                }
                _ if index == last => return resolver.resolve(token, bindings),
                _ => {
                    return Err(TemplateError::malformed(format!(
                        "Tag \"one-of\" default {token} must be the last parameter"
                    )));
                }
            }
        }
        Ok(None)
    }
}
