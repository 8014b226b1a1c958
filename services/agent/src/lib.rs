//! Prepcall Agent Library Crate
//!
//! This library contains the call-session controller that drives an
//! AI-led voice interview: the gateway client and its process-wide
//! accessor, the session state machine, the feedback collaborator, the
//! view model, and environment configuration. The `prepcall` binary is
//! a thin wrapper around this library.

pub mod client;
pub mod config;
pub mod feedback;
pub mod session;
pub mod view;
