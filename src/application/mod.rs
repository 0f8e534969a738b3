//! # Application Layer
//!
//! Session orchestration and use cases coordinating domain and connector layers.

pub mod interfaces;
mod session;
pub mod use_cases;

pub use interfaces::*;
pub use session::*;
pub use use_cases::*;
