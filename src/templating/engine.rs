//! The template engine: one resolution from main template to final document.

use super::element::Resolver;
use super::stats::Stats;
use super::utils::{DuplicateReport, find_duplicated_parameters, parameter_names, unescape_value};
use crate::core::{Result, TemplateError};
use crate::loader::{DefaultJsonLoader, JsonLoader};
use crate::tags::{Tag, TagRegistry};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::{debug, info};

/// Resolves templates against binding data.
///
/// The engine owns the loader, the tag registry and the statistics of the last
/// run. A run is single-threaded and synchronous.
///
/// # Examples
///
/// ```rust
/// use jsonteng::templating::TemplateEngine;
/// use serde_json::json;
///
/// let mut engine = TemplateEngine::builder()
///     .with_env(json!({"region": "us-west-2"}))
///     .build();
///
/// let bindings = [json!({"name": "web"})];
/// let result = engine
///     .resolve(r##"{"host": "${name}.${region}", "count": ["#len", "${name}"]}"##, &bindings)
///     .unwrap();
///
/// assert_eq!(result, json!({"host": "web.us-west-2", "count": 3}));
/// assert_eq!(engine.stats().count("name"), 2);
/// ```
pub struct TemplateEngine {
    env: Value,
    loader: Box<dyn JsonLoader>,
    tags: TagRegistry,
    stats: Stats,
    duplicates: DuplicateReport,
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("env", &self.env)
            .field("tags", &self.tags)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl TemplateEngine {
    pub fn builder() -> TemplateEngineBuilder {
        TemplateEngineBuilder::default()
    }

    /// Resolve `main_template` against `bindings`.
    ///
    /// The main template is any identifier the loader accepts, typically a file
    /// path. Binding sources are searched in order, then the environment binding.
    /// Statistics and the duplicate report are reset at the start of each run.
    ///
    /// # Errors
    ///
    /// Returns the first fatal [`TemplateError`]; an unresolvable parameter that
    /// no tag recovers from is fatal here. A template that produces nothing at the
    /// top level is [`TemplateError::MalformedTemplate`].
    pub fn resolve(&mut self, main_template: &str, bindings: &[Value]) -> Result<Value> {
        self.stats.clear();
        self.loader.reset();
        let template = self.loader.load(main_template)?;

        let mut effective: Vec<&Value> = bindings.iter().collect();
        effective.push(&self.env);

        self.duplicates = find_duplicated_parameters(&effective);
        for (name, values) in &self.duplicates {
            debug!("Parameter \"{name}\" is assigned {} times", values.len());
        }
        let known = parameter_names(&effective);

        let resolved = {
            let mut resolver =
                Resolver::new(&self.tags, &mut *self.loader, &mut self.stats, &known);
            resolver.resolve(&template, &effective)
        };
        let unloaded = self.loader.unload(main_template);
        let resolved = resolved?;
        unloaded?;

        let Some(resolved) = resolved else {
            return Err(TemplateError::malformed(format!(
                "Template \"{main_template}\" resolved to nothing"
            )));
        };
        info!("Resolved {main_template} using {} parameter(s)", self.stats.iter().count());
        Ok(unescape_value(resolved))
    }

    /// Parameters assigned by more than one binding source in the last run.
    pub fn duplicated_parameters(&self) -> &DuplicateReport {
        &self.duplicates
    }

    /// Parameter usage counts of the last run.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn tag_names(&self) -> Vec<&'static str> {
        self.tags.names()
    }

    /// Register an additional tag, replacing any tag of the same name.
    pub fn register_tag(&mut self, tag: impl Tag + 'static) {
        self.tags.register(Box::new(tag));
    }
}

/// Builder for [`TemplateEngine`].
///
/// Defaults: an empty environment binding, a [`DefaultJsonLoader`] rooted at the
/// working directory, and [`TagRegistry::default`].
#[derive(Default)]
pub struct TemplateEngineBuilder {
    env: Option<Value>,
    template_home: Option<PathBuf>,
    loader: Option<Box<dyn JsonLoader>>,
    tags: Option<TagRegistry>,
    extra_tags: Vec<Box<dyn Tag>>,
}

impl TemplateEngineBuilder {
    /// Set the environment binding, searched after all other binding sources
    pub fn with_env(mut self, env: Value) -> Self {
        self.env = Some(env);
        self
    }

    /// Resolve relative template paths against `template_home`
    ///
    /// Ignored when a custom loader is supplied.
    pub fn with_template_home(mut self, template_home: impl Into<PathBuf>) -> Self {
        self.template_home = Some(template_home.into());
        self
    }

    /// Use a custom loader
    pub fn with_loader(mut self, loader: impl JsonLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Replace the tag registry
    pub fn with_tags(mut self, tags: TagRegistry) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Add a tag on top of the registry
    pub fn with_tag(mut self, tag: impl Tag + 'static) -> Self {
        self.extra_tags.push(Box::new(tag));
        self
    }

    pub fn build(self) -> TemplateEngine {
        let loader = self
            .loader
            .unwrap_or_else(|| Box::new(DefaultJsonLoader::new(self.template_home)));
        let mut tags = self.tags.unwrap_or_default();
        for tag in self.extra_tags {
            tags.register(tag);
        }

        TemplateEngine {
            env: self.env.unwrap_or_else(|| Value::Object(Map::new())),
            loader,
            tags,
            stats: Stats::new(),
            duplicates: DuplicateReport::new(),
        }
    }
}
