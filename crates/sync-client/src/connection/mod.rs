//! Supervised event-stream connection
//!
//! One duplex connection per ticket: the supervisor owns the lifecycle
//! (connect guard, reconnect timer, intentional shutdown) and the stream
//! client turns inbound frames into typed events.

mod stream;
mod supervisor;

pub use stream::{EventStreamClient, WsConnection};
pub use supervisor::ConnectionSupervisor;
