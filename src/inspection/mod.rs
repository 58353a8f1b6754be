//! Inspection subsystem.
//!
//! # Data Flow
//! ```text
//! Request<Body>
//!     → pipeline.rs (rate limit, query check, decides whether to read the body)
//!     → body.rs (buffer the body once into owned bytes)
//!     → extractor.rs (raw body, form fields, JSON string leaves)
//!     → json.rs (iterative parse when nesting exceeds serde_json's limit)
//!     → fragment.rs (location-labelled text handed to the inspector)
//!     → body.rs (re-attach the same bytes for forwarding)
//! ```
//!
//! # Design Decisions
//! - The body is read once; fragments are derived copies of the buffer
//! - Form and JSON decoding failures never block, they only narrow inspection
//! - First matching fragment decides; later fragments are not examined

pub mod body;
pub mod extractor;
pub mod fragment;
pub mod json;
pub mod pipeline;

pub use body::{BodyError, BufferedRequest};
pub use extractor::BodyExtractor;
pub use fragment::{InspectableFragment, Location};
pub use pipeline::{Decision, Evaluation, InspectionPipeline, Violation};
