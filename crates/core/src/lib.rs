//! Domain types for AI-led interview call sessions.
//!
//! This crate holds the pure, I/O-free vocabulary shared by the call
//! session controller and its collaborators: the call status machine,
//! the transcript log, interview plans, navigation routes, and the
//! fatal-error taxonomy shown to the user.

pub mod error;
pub mod interview;
pub mod route;
pub mod status;
pub mod transcript;
