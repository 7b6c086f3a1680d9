//! Primary source: the session-authenticated NTES running-status service.
//!
//! Key characteristics:
//! - Every query needs an anti-forgery token obtained through a two-step
//!   handshake, and the token is only honoured together with the cookies
//!   set during that handshake.
//! - Responses are loosely structured markup; one event per line in the
//!   form "Departed from NAME (CODE) at HH:MM DD-Mon Delay: HH:MM".

mod client;
mod parse;
mod session;

pub use client::{DEFAULT_BASE_URL, NtesClient, NtesConfig, format_ref_date};
pub use parse::RunningStatusParser;
pub use session::Session;
