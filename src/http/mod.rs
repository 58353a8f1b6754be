//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, peer address, handler)
//!     → inspection pipeline (allow / 429 / 403)
//!     → forward.rs (relay to upstream, stream response back)
//!     → response.rs (bodies for responses the proxy writes itself)
//!     → Send to client
//! ```

pub mod forward;
pub mod response;
pub mod server;

pub use forward::{ForwardError, Forwarder};
pub use server::{AppState, WafServer};
