//! Recursive element resolution.
//!
//! [`Resolver`] is the per-run context shared by every part of a resolution: the
//! element walk below, the string scanner in [`super::string`], and the tags,
//! which receive it so they can resolve their own arguments and load
//! sub-templates.
//!
//! Resolution results are `Result<Option<Value>>`. `Ok(None)` means the element
//! produced nothing: the enclosing array drops the element, the enclosing object
//! drops the key.

use super::stats::Stats;
use crate::core::{Result, TemplateError};
use crate::loader::JsonLoader;
use crate::tags::{TagRegistry, tag_name};
use serde_json::{Map, Value};
use tracing::debug;

/// Mutable state lent to one resolution run.
pub struct Resolver<'a> {
    pub(super) tags: &'a TagRegistry,
    pub(super) loader: &'a mut dyn JsonLoader,
    pub(super) stats: &'a mut Stats,
    /// Parameter names offered as suggestions for unresolvable parameters
    pub(super) known_parameters: &'a [String],
}

impl<'a> Resolver<'a> {
    pub fn new(
        tags: &'a TagRegistry,
        loader: &'a mut dyn JsonLoader,
        stats: &'a mut Stats,
        known_parameters: &'a [String],
    ) -> Self {
        Self {
            tags,
            loader,
            stats,
            known_parameters,
        }
    }

    /// The loader used for template includes.
    pub fn loader(&mut self) -> &mut (dyn JsonLoader + 'a) {
        &mut *self.loader
    }

    /// Resolve one template element against the binding list.
    ///
    /// # Errors
    ///
    /// Propagates every error raised by string interpolation, tags and the loader.
    pub fn resolve(&mut self, value: &Value, bindings: &[&Value]) -> Result<Option<Value>> {
        match value {
            Value::Null | Value::Bool(_) | Value::Number(_) => Ok(Some(value.clone())),
            Value::String(s) => self.resolve_string(s, bindings),
            Value::Array(items) => {
                if items.first().and_then(Value::as_str).and_then(tag_name).is_some() {
                    return self.resolve_tag(items, bindings);
                }
                let mut resolved = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(value) = self.resolve(item, bindings)? {
                        resolved.push(value);
                    }
                }
                Ok(Some(Value::Array(resolved)))
            }
            Value::Object(map) => self.resolve_object(map, bindings).map(|m| Some(Value::Object(m))),
        }
    }

    fn resolve_object(
        &mut self,
        map: &Map<String, Value>,
        bindings: &[&Value],
    ) -> Result<Map<String, Value>> {
        let mut resolved = Map::with_capacity(map.len());
        for (key, value) in map {
            if tag_name(key).is_some() {
                let Value::Array(arguments) = value else {
                    return Err(TemplateError::malformed(format!(
                        "Tag key \"{key}\" must map to an array, found {value}"
                    )));
                };
                let mut invocation = Vec::with_capacity(arguments.len() + 1);
                invocation.push(Value::String(key.clone()));
                invocation.extend(arguments.iter().cloned());

                match self.resolve_tag(&invocation, bindings)? {
                    Some(Value::Object(merged)) => resolved.extend(merged),
                    Some(other) => {
                        return Err(TemplateError::malformed(format!(
                            "Tag key \"{key}\" must produce an object, produced {other}"
                        )));
                    }
                    None => {}
                }
                continue;
            }

            let Some(Value::String(resolved_key)) = self.resolve_string(key, bindings)? else {
                debug!("Dropping key {key:?} that does not resolve to a string");
                continue;
            };
            if let Some(resolved_value) = self.resolve(value, bindings)? {
                resolved.insert(resolved_key, resolved_value);
            }
        }
        Ok(resolved)
    }

    /// Dispatch a tag-shaped array to its registered handler.
    fn resolve_tag(&mut self, invocation: &[Value], bindings: &[&Value]) -> Result<Option<Value>> {
        let marker = invocation.first().and_then(Value::as_str).unwrap_or_default();
        let Some(name) = tag_name(marker) else {
            return Err(TemplateError::malformed(format!("\"{marker}\" is not a tag")));
        };

        let tags: &'a TagRegistry = self.tags;
        let Some(tag) = tags.get(name) else {
            return Err(TemplateError::UnknownTag {
                name: name.to_string(),
                suggestions: tags.similar_names(name),
            });
        };

        debug!("Processing tag \"{name}\" with {} argument(s)", invocation.len() - 1);
        tag.process(&invocation[1..], bindings, self)
    }
}
