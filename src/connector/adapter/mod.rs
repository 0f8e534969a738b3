mod gemini_client;
pub mod http;
mod in_memory_message_repository;
mod mock_completion_client;

pub use gemini_client::*;
pub use http::ChatHttpServer;
pub use in_memory_message_repository::*;
pub use mock_completion_client::*;
