//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Completion (Gemini over HTTPS, offline mock)
//! - Storage (in-memory message store)
//! - Surfaces (terminal UI, HTTP front door, command routing)

pub mod adapter;
pub mod api;
pub mod tui;

pub use adapter::*;
pub use api::*;
