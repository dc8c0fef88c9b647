//! Growth model implementations.
//!
//! Models are pure functions of their parameters plus a small value type that
//! caches the solved curve, so front ends can create one per request and drop
//! it afterwards.

pub mod growth;
pub mod sweep;

pub use growth::*;
pub use sweep::*;
