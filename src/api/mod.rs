//! # API Module
//!
//! HTTP endpoints served by the short-lived local server that runs during the
//! Spotify authorization flow.
//!
//! - [`callback`] - receives the OAuth redirect and exchanges the authorization
//!   code for a token (PKCE, no client secret).
//! - [`health`] - reports that the server is up, with name and version.

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
