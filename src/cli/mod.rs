//! # CLI Module
//!
//! User-facing command implementations. Each command wires the configured
//! collaborators together, prints progress with the console macros, and turns
//! a failure into the matching process exit code.
//!
//! - [`sync`] - match a KEXP window against Spotify and fill a playlist
//! - [`auth`] - run the Spotify authorization flow to cache a token
//!
//! ## Usage
//!
//! ```bash
//! kexplist auth --username alice
//! kexplist --username alice --playlist "KEXP Morning" --mdyh "01/31/2017T06" --hours 4
//! kexplist --username alice --playlist "KEXP Now" --always_create_new_playlist
//! ```

mod auth;
mod sync;

pub use auth::auth;
pub use sync::sync;
