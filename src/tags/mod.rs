//! Tags: directives embedded in templates.
//!
//! A tag is an array whose first element is a string starting with `#`:
//!
//! ```json
//! ["#for-each", "${interfaces}", "interface.json"]
//! ```
//!
//! or an object key starting with `#` whose value is the argument array:
//!
//! ```json
//! {"#one-of": [["${public}", {"address": "${ip}"}]]}
//! ```
//!
//! Anything after a `:` in the tag name is a label that is ignored for dispatch,
//! which lets one object carry several keys for the same tag
//! (`"#one-of:mtu"`, `"#one-of:vlan"`).
//!
//! Arguments are passed to the tag unresolved; each tag decides which of them to
//! resolve and against which bindings.
//!
//! # Built-in Tags
//!
//! | Tag | Arguments |
//! |-----|-----------|
//! | `at` | collection, index or key |
//! | `exists` | value |
//! | `for-each` | data list, template, optional condition |
//! | `len` | value |
//! | `one-of` | `[condition, value]` pairs, optional default |
//! | `to-bool`, `to-int`, `to-float`, `to-null` | string |
//!
//! The IPv4 address tags in [`net`] are registered by [`TagRegistry::default`]
//! but not by [`TagRegistry::core`].
//!
//! # Custom Tags
//!
//! ```rust
//! use jsonteng::core::Result;
//! use jsonteng::tags::{Tag, TagRegistry, check_arity};
//! use jsonteng::templating::Resolver;
//! use serde_json::Value;
//!
//! struct UpperTag;
//!
//! impl Tag for UpperTag {
//!     fn name(&self) -> &'static str {
//!         "upper"
//!     }
//!
//!     fn process(
//!         &self,
//!         tokens: &[Value],
//!         bindings: &[&Value],
//!         resolver: &mut Resolver<'_>,
//!     ) -> Result<Option<Value>> {
//!         check_arity(self.name(), tokens, 1)?;
//!         Ok(resolver
//!             .resolve(&tokens[0], bindings)?
//!             .map(|v| Value::String(v.as_str().unwrap_or_default().to_uppercase())))
//!     }
//! }
//!
//! let mut registry = TagRegistry::core();
//! registry.register(Box::new(UpperTag));
//! assert!(registry.contains("upper"));
//! ```

mod at;
mod convert;
mod exists;
mod for_each;
mod len;
pub mod net;
mod one_of;

pub use at::AtTag;
pub use convert::{ToBoolTag, ToFloatTag, ToIntTag, ToNullTag};
pub use exists::ExistsTag;
pub use for_each::ForEachTag;
pub use len::LenTag;
pub use one_of::OneOfTag;

use crate::core::{Result, TemplateError};
use crate::templating::{Resolver, find_similar_names};
use serde_json::Value;
use std::collections::BTreeMap;

/// Marker that starts a tag name
pub const TAG_MARKER: char = '#';

/// Separator between a tag name and its label
pub const LABEL_SEPARATOR: char = ':';

/// A template directive.
pub trait Tag: Send + Sync {
    /// Name the tag is registered under, without the `#` marker.
    fn name(&self) -> &'static str;

    /// Evaluate the tag.
    ///
    /// `tokens` are the unresolved arguments. Returning `Ok(None)` omits the
    /// tag's position from the enclosing array or object.
    ///
    /// # Errors
    ///
    /// Any [`TemplateError`]; all of them except
    /// [`TemplateError::UnresolvableParameter`] abort the resolution.
    fn process(
        &self,
        tokens: &[Value],
        bindings: &[&Value],
        resolver: &mut Resolver<'_>,
    ) -> Result<Option<Value>>;
}

/// Extract the tag name from a marker string such as `#one-of:label`.
///
/// Returns `None` if the string is not a tag marker. A lone `#` is not a tag.
///
/// # Examples
///
/// ```rust
/// use jsonteng::tags::tag_name;
///
/// assert_eq!(tag_name("#len"), Some("len"));
/// assert_eq!(tag_name("#one-of:mtu"), Some("one-of"));
/// assert_eq!(tag_name("#"), None);
/// assert_eq!(tag_name("len"), None);
/// ```
pub fn tag_name(marker: &str) -> Option<&str> {
    let name = marker.strip_prefix(TAG_MARKER).filter(|rest| !rest.is_empty())?;
    Some(name.split_once(LABEL_SEPARATOR).map_or(name, |(name, _)| name))
}

/// Fail with [`TemplateError::TagArity`] unless exactly `expected` tokens were given.
pub fn check_arity(tag: &str, tokens: &[Value], expected: usize) -> Result<()> {
    if tokens.len() == expected {
        return Ok(());
    }
    Err(arity_error(tag, tokens, &describe_count(expected)))
}

pub(crate) fn describe_count(count: usize) -> String {
    if count == 1 { "1 parameter".to_string() } else { format!("{count} parameters") }
}

pub(crate) fn arity_error(tag: &str, tokens: &[Value], expected: &str) -> TemplateError {
    TemplateError::TagArity {
        tag: tag.to_string(),
        expected: expected.to_string(),
        tokens: Value::Array(tokens.to_vec()).to_string(),
    }
}

/// Resolve an argument that must produce a value.
pub(crate) fn resolve_required(
    tag: &str,
    token: &Value,
    bindings: &[&Value],
    resolver: &mut Resolver<'_>,
) -> Result<Value> {
    resolver.resolve(token, bindings)?.ok_or_else(|| {
        TemplateError::malformed(format!("Tag \"{tag}\" argument {token} resolved to nothing"))
    })
}

/// Resolve an argument that must produce a string.
pub(crate) fn resolve_string_arg(
    tag: &str,
    token: &Value,
    bindings: &[&Value],
    resolver: &mut Resolver<'_>,
) -> Result<String> {
    match resolve_required(tag, token, bindings, resolver)? {
        Value::String(s) => Ok(s),
        other => Err(TemplateError::malformed(format!(
            "Tag \"{tag}\" parameter is not a string: {other}"
        ))),
    }
}

/// Tag handlers keyed by name.
pub struct TagRegistry {
    tags: BTreeMap<&'static str, Box<dyn Tag>>,
}

impl std::fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagRegistry").field("tags", &self.names()).finish()
    }
}

impl Default for TagRegistry {
    /// All built-in tags, IPv4 tags included.
    fn default() -> Self {
        let mut registry = Self::core();
        net::register(&mut registry);
        registry
    }
}

impl TagRegistry {
    /// A registry with no tags.
    pub fn empty() -> Self {
        Self {
            tags: BTreeMap::new(),
        }
    }

    /// The general-purpose built-in tags.
    pub fn core() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(AtTag));
        registry.register(Box::new(ExistsTag));
        registry.register(Box::new(ForEachTag));
        registry.register(Box::new(LenTag));
        registry.register(Box::new(OneOfTag));
        registry.register(Box::new(ToBoolTag));
        registry.register(Box::new(ToIntTag));
        registry.register(Box::new(ToFloatTag));
        registry.register(Box::new(ToNullTag));
        registry
    }

    /// Register a tag, returning the handler it replaced, if any.
    pub fn register(&mut self, tag: Box<dyn Tag>) -> Option<Box<dyn Tag>> {
        self.tags.insert(tag.name(), tag)
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tag> {
        self.tags.get(name).map(|tag| &**tag)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// Registered tag names in sorted order.
    pub fn names(&self) -> Vec<&'static str> {
        self.tags.keys().copied().collect()
    }

    pub(crate) fn similar_names(&self, name: &str) -> Vec<String> {
        let names: Vec<String> = self.tags.keys().map(|n| (*n).to_string()).collect();
        find_similar_names(name, &names)
    }
}
