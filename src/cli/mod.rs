//! Command-line interface for jsonteng.
//!
//! The command resolves one main template against a list of binding data
//! resources and prints the result as JSON:
//!
//! ```bash
//! # Binding data from files and inline JSON, separated by ';'
//! jsonteng -b 'site.json;{"replicas": 3}' vm.json
//!
//! # Environment binding, compact output, usage statistics
//! jsonteng -b site.json -e '{"region": "us-west-2"}' --raw --stats vm.json
//!
//! # Show the registered tags
//! jsonteng --list-tags
//! ```
//!
//! Each binding resource is loaded like a template: a file path, or failing
//! that, inline JSON, a number, or a plain string.
//!
//! # Logging
//!
//! Diagnostics go to stderr through `tracing`. `--verbose` enables debug
//! output, `--quiet` limits output to errors, and `RUST_LOG` takes precedence
//! over both.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::config::EngineConfig;
use crate::loader::{DefaultJsonLoader, JsonLoader};
use crate::templating::TemplateEngine;

/// Separator between binding data resources in `--bindings`
pub const BINDING_SEPARATOR: char = ';';

#[derive(Parser, Debug)]
#[command(
    name = "jsonteng",
    about = "JSON template engine - resolve parameterized JSON templates",
    version,
    long_about = "Resolves a JSON template containing ${parameter} references and #tag directives \
                  against an ordered list of binding data documents."
)]
pub struct Cli {
    /// Main template: a file path (relative to the template home) or inline JSON
    #[arg(required_unless_present = "list_tags")]
    main_template: Option<String>,

    /// Binding data resources separated by ';', highest priority first
    #[arg(short, long, value_name = "RESOURCES")]
    bindings: Option<String>,

    /// Environment binding as a JSON object, searched after all binding data
    #[arg(short, long, value_name = "JSON")]
    env: Option<String>,

    /// Path to the configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print parameter usage statistics after the result
    #[arg(short, long)]
    stats: bool,

    /// Print compact JSON
    #[arg(short, long)]
    raw: bool,

    /// Enable debug output
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors
    #[arg(short, long)]
    quiet: bool,

    /// List the registered tags and exit
    #[arg(long)]
    list_tags: bool,
}

impl Cli {
    /// Log level implied by `--verbose`/`--quiet`.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }

    /// Install the stderr log subscriber. `RUST_LOG` overrides the flag level.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.log_level()));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Run the command, writing results to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or binding data cannot be loaded, or if
    /// resolution fails.
    pub async fn execute(self) -> Result<()> {
        self.init_logging();
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.run(&mut out).await
    }

    /// Run the command, writing results to `out`.
    ///
    /// # Errors
    ///
    /// See [`Cli::execute`].
    pub async fn run<W: Write>(self, out: &mut W) -> Result<()> {
        let config = EngineConfig::load(self.config.as_deref()).await?;
        let mut engine = self.build_engine(&config)?;

        if self.list_tags {
            for name in engine.tag_names() {
                writeln!(out, "{name}")?;
            }
            return Ok(());
        }
        let Some(main_template) = self.main_template.as_deref() else {
            anyhow::bail!("No main template given");
        };

        let bindings = self.load_bindings()?;
        debug!("Resolving {main_template} with {} binding source(s)", bindings.len());

        let resolved = engine
            .resolve(main_template, &bindings)
            .with_context(|| format!("Failed to resolve template {main_template}"))?;

        for (name, values) in engine.duplicated_parameters() {
            let values: Vec<String> = values.iter().map(Value::to_string).collect();
            warn!("Parameter \"{name}\" has duplicated values: {}", values.join(", "));
        }

        let rendered = if self.raw || config.raw {
            serde_json::to_string(&resolved)?
        } else {
            serde_json::to_string_pretty(&resolved)?
        };
        writeln!(out, "{rendered}")?;

        if self.stats || config.stats {
            writeln!(out, "{}", "Parameter usage".bold())?;
            writeln!(out, "{}", serde_json::to_string_pretty(&engine.stats().to_json())?)?;
        }
        Ok(())
    }

    fn build_engine(&self, config: &EngineConfig) -> Result<TemplateEngine> {
        let mut env = config.env.clone();
        if let Some(text) = &self.env {
            let cli_env: Value =
                serde_json::from_str(text).context("Failed to parse --env as JSON")?;
            let Value::Object(cli_env) = cli_env else {
                anyhow::bail!("--env must be a JSON object, got {cli_env}");
            };
            env.extend(cli_env);
        }

        let mut builder = TemplateEngine::builder().with_env(Value::Object(env));
        if let Some(home) = config.template_home() {
            debug!("Template home: {}", home.display());
            builder = builder.with_template_home(home);
        }
        Ok(builder.build())
    }

    /// Load every `--bindings` resource in order.
    fn load_bindings(&self) -> Result<Vec<Value>> {
        let Some(resources) = &self.bindings else {
            return Ok(Vec::new());
        };

        let mut loader = DefaultJsonLoader::default();
        let mut bindings = Vec::new();
        for resource in resources.split(BINDING_SEPARATOR).filter(|r| !r.trim().is_empty()) {
            let binding = loader
                .load(resource)
                .with_context(|| format!("Failed to load binding data {resource}"))?;
            loader.unload(resource)?;
            if !binding.is_object() {
                warn!("Binding data {resource} is not a JSON object and provides no parameters");
            }
            bindings.push(binding);
        }
        Ok(bindings)
    }
}
