//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → axum::serve (accept loop, one task per connection)
//!     → ConnectInfo<SocketAddr> attached to every request
//!     → client.rs (peer address → ClientId)
//!     → Hand off to the inspection pipeline
//! ```

pub mod client;

pub use client::ClientId;
