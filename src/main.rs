//! jsonteng CLI entry point
//!
//! Resolves one template and prints the resulting JSON to stdout. Logs and
//! errors go to stderr so the output can be piped into other tools.
//!
//! Exit status:
//! - `0` when the template resolved and was printed
//! - `1` for any failure (configuration, binding data, or resolution), reported
//!   with details and a suggestion where one is known
//! - `2` for invalid arguments, as reported by clap

use clap::Parser;
use jsonteng::cli::Cli;
use jsonteng::core::user_friendly_error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(e) = cli.execute().await {
        user_friendly_error(e).display();
        std::process::exit(1);
    }
}
