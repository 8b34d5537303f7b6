//! KEXP to Spotify playlist synchronization.
//!
//! Fetches the songs KEXP broadcast during a window of hours, looks each one
//! up in the Spotify catalog and appends the matches to a playlist, creating
//! the playlist when it does not exist yet.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints for the local OAuth callback server
//! - `cli` - Command-line command implementations
//! - `config` - Configuration from the environment and `.env`
//! - `error` - Error taxonomy and exit codes
//! - `kexp` - KEXP playlist source variants
//! - `management` - Token cache
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client and authorization
//! - `sync` - The synchronization run
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//! - `window` - Time window computation

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod kexp;
pub mod management;
pub mod server;
pub mod spotify;
pub mod sync;
pub mod types;
pub mod utils;
pub mod window;

/// Boxed-error result used by glue code such as the callback server.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints a status line with a blue "o" bullet.
///
/// ```
/// info!("FETCHING KEXP PLAYLIST FOR {}", window.label());
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success line with a green checkmark, e.g. for a matched track.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Terminates with exit code 1. Use [`fatal!`] when another exit code applies.
///
/// # Example
///
/// ```
/// error!("Missing required argument: {}", "--username");
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    $crate::fatal!(1, $($arg)*)
  })
}

/// Prints an error message with a red exclamation mark and exits with `code`.
///
/// # Example
///
/// ```
/// fatal!(err.exit_code(), "{}", err);
/// ```
#[macro_export]
macro_rules! fatal {
  ($code:expr, $($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit($code);
  })
}

/// Prints a warning line with a yellow "!" for recoverable problems, such
/// as a track that could not be matched.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
