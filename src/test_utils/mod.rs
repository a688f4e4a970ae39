//! Test utilities for jsonteng
//!
//! Helpers shared by unit tests and the integration suite: one-time logging
//! setup and a scratch directory for template files.
//!
//! # Example
//!
//! ```rust,no_run
//! use jsonteng::test_utils::{TemplateDir, init_test_logging};
//!
//! init_test_logging(None);
//! let dir = TemplateDir::new().unwrap();
//! dir.write("nic.json", r#"{"name": "${name}"}"#).unwrap();
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `level` set, that level is used;
/// otherwise `RUST_LOG` is honoured, and without it logging stays off.
///
/// ```bash
/// RUST_LOG=jsonteng=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// A temporary directory holding template and binding files.
///
/// The directory is removed when the value is dropped.
pub struct TemplateDir {
    temp: TempDir,
}

impl TemplateDir {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            temp: TempDir::new()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Write `content` to `relative`, creating parent directories, and return
    /// the full path.
    pub fn write(&self, relative: &str, content: &str) -> io::Result<PathBuf> {
        let path = self.temp.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }
}
