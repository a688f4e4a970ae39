//! Error handling for jsonteng
//!
//! This module provides the error type shared by every part of the resolution engine
//! and the user-facing error reporting used by the CLI. The error system is designed
//! around two core principles:
//! 1. **Strongly-typed errors** so tags can recover from exactly the failures they
//!    are allowed to recover from (e.g. `exists` catching an unresolvable parameter)
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`TemplateError`] - Enumerated error types for all failure cases in resolution
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! # Error Categories
//!
//! - **Malformed templates**: [`TemplateError::MalformedTemplate`],
//!   [`TemplateError::UnknownTag`], [`TemplateError::TagArity`]
//! - **Missing data**: [`TemplateError::UnresolvableParameter`]
//! - **Conditions**: [`TemplateError::Expression`]
//! - **Internal defects**: [`TemplateError::LoaderScopeViolation`]
//!
//! Omission (a tag producing nothing) is not an error; resolvers report it as
//! `Ok(None)`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use jsonteng::core::{TemplateError, user_friendly_error};
//!
//! let error = TemplateError::UnresolvableParameter {
//!     parameter: "net.cidr".to_string(),
//!     suggestions: vec!["net.cdir".to_string()],
//! };
//! let context = user_friendly_error(anyhow::Error::from(error));
//! context.display(); // Shows the error with a "did you mean" hint
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Result alias used throughout the resolution engine.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// The error type for template resolution.
///
/// Every variant except [`UnresolvableParameter`] aborts the whole resolution.
/// [`UnresolvableParameter`] is fatal only if it escapes to the top; the `exists`
/// tag catches it to mean "absent".
///
/// [`UnresolvableParameter`]: TemplateError::UnresolvableParameter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    /// The template is structurally invalid
    ///
    /// Raised for unmatched interpolation braces, tag keys bound to non-array
    /// values, tag results of the wrong shape and invalid tag arguments.
    #[error("Malformed template: {message}")]
    MalformedTemplate {
        /// Description of what is wrong with the template
        message: String,
    },

    /// A tag-shaped array names a tag that is not registered
    #[error("Unknown tag \"{name}\"")]
    UnknownTag {
        /// The tag name with marker and label stripped
        name: String,
        /// Registered tag names close to `name`
        suggestions: Vec<String>,
    },

    /// A tag received the wrong number of argument tokens
    #[error("Tag \"{tag}\" requires {expected}. Parameters given {tokens}")]
    TagArity {
        /// Tag name
        tag: String,
        /// Human readable arity, e.g. "2 parameters"
        expected: String,
        /// The raw tokens rendered as compact JSON
        tokens: String,
    },

    /// No binding source contains the referenced parameter
    #[error("Unable to resolve parameter \"{parameter}\"")]
    UnresolvableParameter {
        /// The parameter path as written inside `${...}`
        parameter: String,
        /// Known parameter names close to `parameter`
        suggestions: Vec<String>,
    },

    /// A condition expression could not be evaluated to a boolean
    #[error("Invalid expression \"{expression}\": {reason}")]
    Expression {
        /// The expression text after parameter substitution
        expression: String,
        /// Why evaluation failed
        reason: String,
    },

    /// Resources were unloaded out of order
    ///
    /// This indicates a defect in tag or template logic that lost track of its own
    /// nesting; it is never recoverable.
    #[error("JSON resource loading is out of order: expected to unload \"{expected}\", found \"{found}\"")]
    LoaderScopeViolation {
        /// The identifier passed to `unload`
        expected: String,
        /// The identifier recorded on top of the scope stack
        found: String,
    },

    /// Any other failure
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

impl TemplateError {
    /// Shorthand for [`TemplateError::MalformedTemplate`].
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedTemplate {
            message: message.into(),
        }
    }

    /// Returns `true` for the one error kind tags are allowed to recover from.
    #[must_use]
    pub fn is_unresolvable(&self) -> bool {
        matches!(self, Self::UnresolvableParameter { .. })
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// `ErrorContext` wraps a [`TemplateError`] and adds optional user-friendly
/// suggestions and details. This is the primary way errors are presented to CLI
/// users.
///
/// # Display Format
///
/// When displayed, errors show:
/// 1. The main error message (in red)
/// 2. Additional details explaining the error (in yellow, optional)
/// 3. Actionable suggestions for resolution (in green, optional)
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: TemplateError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: TemplateError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`TemplateError`] variants (with tailored suggestions),
/// [`serde_json::Error`], [`std::io::Error`] and [`toml::de::Error`]. Anything else
/// is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(template_error) = error.downcast_ref::<TemplateError>() {
        return create_error_context(template_error.clone());
    }

    if let Some(json_error) = error.downcast_ref::<serde_json::Error>() {
        return ErrorContext::new(TemplateError::Other {
            message: format!("JSON error: {json_error}"),
        })
        .with_suggestion("Check the JSON syntax of the template and binding data")
        .with_details(format!(
            "Parsing stopped at line {}, column {}",
            json_error.line(),
            json_error.column()
        ));
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        return ErrorContext::new(TemplateError::Other {
            message: format!("I/O error: {io_error}"),
        })
        .with_suggestion("Check that the file exists and is readable");
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(TemplateError::Other {
            message: format!("Invalid configuration file: {toml_error}"),
        })
        .with_suggestion(
            "Check the TOML syntax of the configuration file. Verify quotes, brackets, and table headers",
        );
    }

    // Errors wrapped with anyhow context still carry the engine error further down the chain
    for cause in error.chain().skip(1) {
        if let Some(template_error) = cause.downcast_ref::<TemplateError>() {
            let mut context = create_error_context(template_error.clone());
            context.details = Some(match context.details.take() {
                Some(details) => format!("{error}\n{details}"),
                None => error.to_string(),
            });
            return context;
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(TemplateError::Other {
        message,
    })
}

/// Map each [`TemplateError`] variant to an [`ErrorContext`] with suggestions.
fn create_error_context(error: TemplateError) -> ErrorContext {
    match &error {
        TemplateError::MalformedTemplate { .. } => ErrorContext::new(error)
            .with_suggestion(
                "Check that every \"${\" has a matching \"}\", that tag keys map to arrays, \
                 and escape literal characters with a backslash (\\$, \\{, \\})",
            ),

        TemplateError::UnknownTag { suggestions, .. } => {
            let suggestion = did_you_mean(suggestions).unwrap_or_else(|| {
                "Run with --list-tags to see the registered tags".to_string()
            });
            ErrorContext::new(error.clone())
                .with_suggestion(suggestion)
                .with_details("Arrays whose first element starts with '#' are dispatched as tags")
        }

        TemplateError::TagArity { .. } => ErrorContext::new(error)
            .with_details("Tag arguments are the array elements that follow the tag name"),

        TemplateError::UnresolvableParameter { suggestions, .. } => {
            let suggestion = did_you_mean(suggestions).unwrap_or_else(|| {
                "Add the parameter to one of the binding data sources or to the environment binding"
                    .to_string()
            });
            ErrorContext::new(error.clone())
                .with_suggestion(suggestion)
                .with_details("Binding sources are searched in order; the environment binding is searched last")
        }

        TemplateError::Expression { .. } => ErrorContext::new(error)
            .with_suggestion(
                "Conditions support True/False, numbers, quoted strings, comparisons \
                 (== != < <= > >=) and the logical operators and/or/not",
            ),

        TemplateError::LoaderScopeViolation { .. } => ErrorContext::new(error)
            .with_details("Every loaded resource must be unloaded in reverse order of loading")
            .with_suggestion("This indicates a defect in a tag implementation; please report it"),

        TemplateError::Other { .. } => ErrorContext::new(error),
    }
}

fn did_you_mean(suggestions: &[String]) -> Option<String> {
    if suggestions.is_empty() {
        None
    } else {
        Some(format!("Did you mean: {}?", suggestions.join(", ")))
    }
}
