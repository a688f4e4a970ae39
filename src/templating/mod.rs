//! JSON template resolution.
//!
//! A template is an ordinary JSON document. Strings may reference parameters with
//! `${path}`, and arrays or object keys starting with `#` invoke tags. Resolving a
//! template substitutes every parameter from an ordered list of binding sources
//! and evaluates every tag, producing a plain JSON document.
//!
//! # Overview
//!
//! ```text
//! TemplateEngine::resolve
//!   -> JsonLoader::load(main template)
//!   -> Resolver::resolve            (recursive walk)
//!        strings  -> Resolver::resolve_string -> find_param per binding source
//!        tags     -> TagRegistry -> Tag::process -> Resolver / JsonLoader
//!   -> unescape_value               (final pass)
//! ```
//!
//! # Parameters
//!
//! - `${net.cidr}` walks nested objects; `${nics[0].name}` indexes arrays
//! - A reference that makes up the whole string keeps the referenced value's
//!   type: `"${nics}"` resolves to an array
//! - Embedded references are rendered into the string: `"eth${index}"`
//! - References nest: `"${sizes.${size}}"`
//! - `\$`, `\{`, `\}` and `\\` are escapes; they are removed after resolution
//!
//! Binding sources are searched in order and the first one that has the
//! parameter wins. The environment binding configured on the engine is always
//! searched last.
//!
//! # Tags
//!
//! See [`crate::tags`] for the built-in tags and how to add new ones.
//!
//! # Omission
//!
//! A tag may produce nothing, for example `one-of` without a matching condition.
//! The enclosing array then drops the element and the enclosing object drops the
//! key. A string containing a reference to such a value is dropped as a whole.
//!
//! # Examples
//!
//! ```rust,no_run
//! use jsonteng::templating::TemplateEngine;
//! use serde_json::json;
//!
//! # fn example() -> jsonteng::core::Result<()> {
//! let mut engine = TemplateEngine::builder().with_template_home("templates").build();
//! let bindings = [json!({"nics": [{"name": "eth0"}, {"name": "eth1"}]})];
//! let document = engine.resolve("vm.json", &bindings)?;
//! println!("{}", serde_json::to_string_pretty(&document).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

mod element;
mod engine;
mod expression;
mod path;
mod stats;
mod string;
mod utils;

pub use element::Resolver;
pub use engine::{TemplateEngine, TemplateEngineBuilder};
pub use expression::{evaluate, evaluate_condition};
pub use path::find_param;
pub use stats::Stats;
pub use utils::{
    DuplicateReport, find_duplicated_parameters, find_similar_names, parameter_names,
    unescape_str, unescape_value,
};
