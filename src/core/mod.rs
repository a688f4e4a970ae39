//! Core types shared by every part of jsonteng
//!
//! This module holds the error model of the engine. Everything that can fail during
//! resolution returns [`Result`], whose error type [`TemplateError`] distinguishes the
//! one recoverable failure (an unresolvable parameter) from the fatal ones.
//!
//! User-facing reporting goes through [`ErrorContext`], which pairs an error with
//! optional details and an actionable suggestion, and [`user_friendly_error`], which
//! turns any `anyhow::Error` produced by the CLI layer into such a context.
//!
//! # Examples
//!
//! ```rust
//! use jsonteng::core::{TemplateError, user_friendly_error};
//!
//! fn resolve_something() -> anyhow::Result<()> {
//!     Err(TemplateError::malformed("unmatched \"${\"").into())
//! }
//!
//! if let Err(e) = resolve_something() {
//!     let friendly = user_friendly_error(e);
//!     assert!(friendly.suggestion.is_some());
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, Result, TemplateError, user_friendly_error};
