//! Fallback source: the unauthenticated eRail route-status service.
//!
//! Used only when the primary source fails at the transport level. The
//! response is a single `~`-delimited text blob; see `parse.rs`.

mod client;
mod parse;

pub use client::{DEFAULT_BASE_URL, ErailClient, ErailConfig};
pub use parse::RouteStatusParser;
