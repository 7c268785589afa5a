//! Remote object tracking.
//!
//! Every successful ingest/transform/research call materializes an object on
//! the analysis service. The registry remembers those names, in creation
//! order, so they can be torn down deterministically later.

mod types;

pub use types::*;
