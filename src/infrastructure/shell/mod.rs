//! Shell Helpers
//!
//! Quoting for command lines that are shown to people or handed to `sh -c`.

mod escaping;

pub use escaping::{quote, quote_command};
