//! Integration test suite for jsonteng
//!
//! End-to-end tests of the public library API and the `jsonteng` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **engine**: Full resolutions with template files, includes and omission
//! - **loader**: Scope stack and identifier classification of the default loader
//! - **tags**: Built-in tags and custom tag registration through the engine
//! - **cli**: The command-line binary

mod cli;
mod engine;
mod loader;
mod tags;
