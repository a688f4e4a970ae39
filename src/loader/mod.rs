//! Resource loading for templates and binding data
//!
//! Templates refer to other templates (for example the sub-template of a
//! `for-each` tag) by resource identifier. The [`JsonLoader`] trait turns such an
//! identifier into a JSON value and keeps track of the nesting of loads, so that a
//! template loaded from `nets/template.json` can refer to its siblings by relative
//! path.
//!
//! # Scope Stack
//!
//! [`DefaultJsonLoader`] keeps a stack of scopes. The bottom scope is named `root`
//! and carries the configured template home. Every successful [`JsonLoader::load`]
//! pushes one scope, and every [`JsonLoader::unload`] must pop the scope of the
//! identifier it names:
//!
//! ```text
//! load("main.json")          root > main.json
//!   load("nets/sub.json")    root > main.json > nets/sub.json
//!   unload("nets/sub.json")  root > main.json
//! unload("main.json")        root
//! ```
//!
//! Unloading anything else is a [`TemplateError::LoaderScopeViolation`].
//!
//! # Identifier Classification
//!
//! An identifier that does not name a readable JSON file is classified, in order,
//! as an inline JSON literal, an integer literal, a decimal literal, and finally an
//! opaque string. This is what lets a binding list mix file names with inline JSON
//! such as `{"region": "us-west-2"}`.

use crate::core::{Result, TemplateError};
use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

static INTEGER_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+$").expect("valid integer regex"));

static DECIMAL_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+\.[0-9]+$").expect("valid decimal regex"));

const FILE_SCHEME: &str = "file://";

/// Name of the bottom scope of every [`DefaultJsonLoader`].
pub const ROOT_SCOPE: &str = "root";

/// Turns resource identifiers into JSON values.
///
/// Implementations may keep state between a `load` and its matching `unload`; the
/// engine guarantees that calls nest properly.
pub trait JsonLoader {
    /// Load the resource named by `identifier`.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier cannot be turned into a value at all.
    fn load(&mut self, identifier: &str) -> Result<Value>;

    /// Release the state recorded by the matching `load`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::LoaderScopeViolation`] if `identifier` is not the
    /// most recently loaded resource.
    fn unload(&mut self, identifier: &str) -> Result<()>;

    /// Drop every scope left behind by an aborted run.
    ///
    /// Called by the engine before each run. Stateless loaders need not
    /// override it.
    fn reset(&mut self) {}
}

#[derive(Debug, Clone)]
struct LoaderScope {
    resource: String,
    /// Directory relative identifiers resolve against; `None` for values that
    /// did not come from a file
    base: Option<PathBuf>,
}

/// File-system backed loader with inline-literal fallbacks.
#[derive(Debug, Clone)]
pub struct DefaultJsonLoader {
    scopes: Vec<LoaderScope>,
}

impl Default for DefaultJsonLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

impl DefaultJsonLoader {
    /// Create a loader whose root scope resolves relative paths against
    /// `template_home`, or against the working directory when `None`.
    pub fn new(template_home: Option<PathBuf>) -> Self {
        Self {
            scopes: vec![LoaderScope {
                resource: ROOT_SCOPE.to_string(),
                base: template_home,
            }],
        }
    }

    /// Number of scopes above the root scope.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    /// The nearest base directory recorded by a file-backed scope.
    fn current_base(&self) -> Option<&Path> {
        self.scopes.iter().rev().find_map(|scope| scope.base.as_deref())
    }

    fn effective_path(&self, identifier: &str) -> PathBuf {
        let stripped = identifier.strip_prefix(FILE_SCHEME).unwrap_or(identifier);
        let path = Path::new(stripped);
        match self.current_base() {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Try to read `path` as a JSON document.
    fn load_file(path: &Path) -> Option<Value> {
        if !path.is_file() {
            return None;
        }
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Failed to parse {} as JSON, treating identifier as a value: {}", path.display(), e);
                None
            }
        }
    }

    /// Classify an identifier that does not name a JSON file.
    fn classify(identifier: &str) -> Value {
        if let Ok(value) = serde_json::from_str::<Value>(identifier) {
            return value;
        }
        if INTEGER_LITERAL.is_match(identifier)
            && let Ok(number) = identifier.parse::<i64>()
        {
            return Value::from(number);
        }
        if DECIMAL_LITERAL.is_match(identifier)
            && let Ok(number) = identifier.parse::<f64>()
            && let Some(number) = serde_json::Number::from_f64(number)
        {
            return Value::Number(number);
        }
        Value::String(identifier.to_string())
    }
}

impl JsonLoader for DefaultJsonLoader {
    fn load(&mut self, identifier: &str) -> Result<Value> {
        let path = self.effective_path(identifier);

        if let Some(value) = Self::load_file(&path) {
            let base = path.parent().map(Path::to_path_buf).filter(|p| !p.as_os_str().is_empty());
            debug!("Loaded {} (depth {})", path.display(), self.scopes.len());
            self.scopes.push(LoaderScope {
                resource: identifier.to_string(),
                // A file in the working directory still anchors its relatives
                base: Some(base.unwrap_or_else(|| PathBuf::from("."))),
            });
            return Ok(value);
        }

        debug!("Treating {identifier:?} as a JSON value");
        let value = Self::classify(identifier);
        self.scopes.push(LoaderScope {
            resource: identifier.to_string(),
            base: None,
        });
        Ok(value)
    }

    fn unload(&mut self, identifier: &str) -> Result<()> {
        if self.scopes.len() <= 1 {
            return Err(TemplateError::LoaderScopeViolation {
                expected: identifier.to_string(),
                found: ROOT_SCOPE.to_string(),
            });
        }
        let found = &self.scopes[self.scopes.len() - 1].resource;
        if found != identifier {
            return Err(TemplateError::LoaderScopeViolation {
                expected: identifier.to_string(),
                found: found.clone(),
            });
        }
        self.scopes.pop();
        debug!("Unloaded {identifier:?} (depth {})", self.scopes.len() - 1);
        Ok(())
    }

    fn reset(&mut self) {
        if self.scopes.len() > 1 {
            debug!("Dropping {} stale loader scope(s)", self.scopes.len() - 1);
            self.scopes.truncate(1);
        }
    }
}
