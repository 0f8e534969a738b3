mod dismiss_landing;
mod submit_message;

pub use dismiss_landing::*;
pub use submit_message::*;
