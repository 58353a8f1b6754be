//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (per-client token bucket)
//!     → inspector.rs (classify fragments against signatures.rs)
//! ```
//!
//! # Design Decisions
//! - Signature table is compiled in and compiled once at startup
//! - Rate-limit state is process-local and never pruned
//! - No allow-list or bypass: every request passes both checks

pub mod inspector;
pub mod rate_limit;
pub mod signatures;

pub use inspector::{ContentInspector, SignatureMatch};
pub use rate_limit::{ClientBucket, RateLimiter};
pub use signatures::{Category, SignatureRule, BUILTIN_RULES};
