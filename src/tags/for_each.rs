//! The `for-each` tag: render a sub-template once per element of a list.

use super::{Tag, arity_error, resolve_required};
use crate::core::{Result, TemplateError};
use crate::templating::{Resolver, evaluate_condition};
use serde_json::{Value, json};
use tracing::debug;

/// Binding key holding the zero-based position of the current element
pub const INDEX_KEY: &str = "_index_";

/// `["#for-each", data-list, template, condition?]`
///
/// The template is a resource identifier handed to the loader (a file name or
/// inline JSON). For each element of the data list the template is resolved
/// against `[{"_index_": i}, element, ...outer bindings]`. If a condition is
/// given, it is resolved against the same bindings and elements for which it is
/// false are skipped.
pub struct ForEachTag;

impl ForEachTag {
    /// Only a string token names a template and may contain references; an inline
    /// array or object is the template itself and is resolved per element.
    ///
    /// A name that depends on loop bindings cannot be resolved yet, in which case
    /// the raw token is used.
    fn template_identifier(
        token: &Value,
        bindings: &[&Value],
        resolver: &mut Resolver<'_>,
    ) -> Result<String> {
        let Value::String(raw) = token else {
            return Ok(token.to_string());
        };
        let resolved = match resolver.resolve(token, bindings) {
            Ok(Some(value)) => value,
            Ok(None) => token.clone(),
            Err(e @ TemplateError::LoaderScopeViolation { .. }) => return Err(e),
            Err(e) => {
                debug!("Using unresolved for-each template {raw:?}: {e}");
                token.clone()
            }
        };
        Ok(match resolved {
            Value::String(s) => s,
            other => other.to_string(),
        })
    }

    fn render(
        template: &Value,
        tokens: &[Value],
        bindings: &[&Value],
        resolver: &mut Resolver<'_>,
    ) -> Result<Vec<Value>> {
        let elements = match resolve_required("for-each", &tokens[0], bindings, resolver)? {
            Value::Array(elements) => elements,
            other => {
                return Err(TemplateError::malformed(format!(
                    "Tag \"for-each\" data list must be an array, found {other}"
                )));
            }
        };

        let mut rendered = Vec::with_capacity(elements.len());
        for (index, element) in elements.iter().enumerate() {
            let position = json!({ INDEX_KEY: index });
            let mut scoped: Vec<&Value> = Vec::with_capacity(bindings.len() + 2);
            scoped.push(&position);
            scoped.push(element);
            scoped.extend_from_slice(bindings);

            if let Some(condition) = tokens.get(2) {
                let Some(condition) = resolver.resolve(condition, &scoped)? else {
                    return Err(TemplateError::malformed(format!(
                        "Tag \"for-each\" condition {condition} resolved to nothing"
                    )));
                };
                if !evaluate_condition(&condition)? {
                    continue;
                }
            }

            if let Some(value) = resolver.resolve(template, &scoped)? {
                rendered.push(value);
            }
        }
        Ok(rendered)
    }
}

impl Tag for ForEachTag {
    fn name(&self) -> &'static str {
        "for-each"
    }

    fn process(
        &self,
        tokens: &[Value],
        bindings: &[&Value],
        resolver: &mut Resolver<'_>,
    ) -> Result<Option<Value>> {
        if !(2..=3).contains(&tokens.len()) {
            return Err(arity_error(self.name(), tokens, "2 or 3 parameters"));
        }

        let identifier = Self::template_identifier(&tokens[1], bindings, resolver)?;
        let template = resolver.loader().load(&identifier)?;
        debug!("for-each with template {identifier:?}");

        // The template scope is released on every exit path
        let rendered = Self::render(&template, tokens, bindings, resolver);
        let unloaded = resolver.loader().unload(&identifier);
        let rendered = rendered?;
        unloaded?;
        Ok(Some(Value::Array(rendered)))
    }
}
