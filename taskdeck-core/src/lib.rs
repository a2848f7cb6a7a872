//! Taskdeck Core - Session, authorization, and presence domain types
//!
//! This crate holds the pure state-machine parts of Taskdeck: the session
//! data contract, the server-epoch lifecycle guard, and the online-presence
//! tracker. Everything here is I/O-free; the web crate supplies cookies,
//! storage, and HTTP.

pub mod logging;
pub mod presence;
pub mod session;
pub mod types;

pub use logging::*;
pub use presence::*;
pub use session::*;
pub use types::*;

// Re-export commonly used external types
pub use tracing;
