//! Users Service Common Types
//!
//! Wire types shared by the backend and its HTTP clients.

pub mod messages;
pub mod user;

pub use user::{MessageResponse, PingResponse, UserPayload, UserResponse};
