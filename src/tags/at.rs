//! The `at` tag: element of an array by index or of an object by key.

use super::{Tag, check_arity, resolve_required};
use crate::core::{Result, TemplateError};
use crate::templating::Resolver;
use serde_json::Value;

/// `["#at", collection, index-or-key]`
///
/// An array is indexed by an integer (a numeric string is accepted), an object
/// is keyed by a string. Any other collection produces nothing.
pub struct AtTag;

impl Tag for AtTag {
    fn name(&self) -> &'static str {
        "at"
    }

    fn process(
        &self,
        tokens: &[Value],
        bindings: &[&Value],
        resolver: &mut Resolver<'_>,
    ) -> Result<Option<Value>> {
        check_arity(self.name(), tokens, 2)?;
        let Some(collection) = resolver.resolve(&tokens[0], bindings)? else {
            return Ok(None);
        };
        let selector = resolve_required(self.name(), &tokens[1], bindings, resolver)?;

        match collection {
            Value::Array(mut items) => {
                let index = match &selector {
                    Value::Number(n) => n.as_u64(),
                    Value::String(s) => s.trim().parse::<u64>().ok(),
                    _ => None,
                }
                .and_then(|i| usize::try_from(i).ok())
                .filter(|i| *i < items.len())
                .ok_or_else(|| {
                    TemplateError::malformed(format!(
                        "Tag \"at\" index {selector} is out of range for an array of {} element(s)",
                        items.len()
                    ))
                })?;
                Ok(Some(items.swap_remove(index)))
            }
            Value::Object(mut map) => {
                let Value::String(key) = &selector else {
                    return Err(TemplateError::malformed(format!(
                        "Tag \"at\" requires a string key for an object, found {selector}"
                    )));
                };
                map.remove(key).map(Some).ok_or_else(|| {
                    TemplateError::malformed(format!("Tag \"at\" key \"{key}\" not found"))
                })
            }
            _ => Ok(None),
        }
    }
}
