// src/config/mod.rs
//! Settings for a migration run
//!
//! The migration reads the same JSON settings document the server does.
//! Nothing here is global. Callers load a [`Settings`] and pass it on.

pub use app::{PassphraseSource, Settings};
pub use connection::{parse_connection_string, ConnectionSettings};

mod app;
mod connection;
mod defaults;
