//! # Transaction Envelopes
//!
//! Everything the relay knows about a submission comes from its envelope.
//!
//! ```text
//! codec.rs    — base64 XDR decoding into EnvelopeInfo
//! hash.rs     — network id derivation and transaction hashing
//! variant.rs  — v0 / v1 / fee-bump classification for metrics
//! fixtures.rs — deterministic sample envelopes (tests only)
//! ```
//!
//! The envelope is never validated beyond well-formedness. Signatures,
//! sequence numbers, and fees are the node's business.

pub mod codec;
pub mod hash;
pub mod variant;

#[cfg(any(test, feature = "test-utils"))]
pub mod fixtures;

pub use codec::{decode_envelope, EnvelopeError, EnvelopeInfo};
pub use hash::{HashError, NetworkId};
pub use variant::EnvelopeVariant;
