//! Scrape posts from a subreddit and save them to JSON or CSV.
//!
//! The `scrape` binary drives the full pipeline; `trends` fetches the
//! current r/popular hot titles. Both are thin wrappers over this library.

pub mod reddit;
pub use reddit::*;

pub mod output;
pub use output::*;
