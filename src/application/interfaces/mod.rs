mod completion_client;
mod message_repository;

pub use completion_client::*;
pub use message_repository::*;
