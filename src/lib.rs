//! jsonteng - JSON template engine
//!
//! Resolves parameterized JSON templates against an ordered list of binding data
//! documents. Templates are plain JSON: strings reference parameters with
//! `${path}`, and arrays or object keys beginning with `#` invoke tags that
//! compute values, include other templates, or drop content conditionally.
//!
//! # Architecture Overview
//!
//! - A [`loader::JsonLoader`] turns identifiers (file paths or inline JSON) into
//!   JSON values and tracks a scope stack so nested templates resolve relative
//!   paths against their own directory
//! - The [`templating::TemplateEngine`] loads the main template, walks it with a
//!   [`templating::Resolver`], substitutes parameters from the binding sources and
//!   dispatches tags through a [`tags::TagRegistry`]
//! - Tags implement [`tags::Tag`]; the built-in set covers element access,
//!   conditional selection, iteration over lists with template includes, type
//!   conversion and IPv4 arithmetic
//!
//! # Core Modules
//!
//! - [`core`] - Error types and user-facing error rendering
//! - [`loader`] - Template and binding data loading
//! - [`templating`] - Parameter substitution and the resolution engine
//! - [`tags`] - The tag contract, registry, and built-in tags
//! - [`config`] - Configuration file for the command-line tool
//! - [`cli`] - Command-line interface
//!
//! # Template Example
//!
//! ```json
//! {
//!   "name": "${vm.name}",
//!   "nics": ["#for-each", "${vm.nics}", "nic.json", "${_index_} < 2"],
//!   "gateway": ["#ipv4-host-gateway", "${net.cidr}"],
//!   "tier": ["#one-of", ["'${size}' == 'large'", "gold"], "silver"]
//! }
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Resolve vm.json with binding data from a file and inline JSON
//! jsonteng -b 'site.json;{"size": "large"}' vm.json
//!
//! # Compact output and parameter usage statistics
//! jsonteng -b site.json --raw --stats vm.json
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod loader;
pub mod tags;
pub mod templating;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
