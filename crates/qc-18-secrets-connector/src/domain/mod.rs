//! # Domain Layer
//!
//! Wire formats, signing and request schemas. No I/O lives here; the only
//! async code is the cancellation plumbing in `context`.

pub mod address;
pub mod context;
pub mod envelope;
pub mod errors;
pub mod lifecycle;
pub mod methods;
pub mod secrets;
pub mod signer;
