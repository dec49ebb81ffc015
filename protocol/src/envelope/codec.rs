//! Envelope decoding.
//!
//! [`decode_envelope`] is the first thing that happens to every submission.
//! It turns the client's base64 text into a structured envelope and derives
//! the hashes the rest of the relay reports. It is a pure function: same
//! input, same output, no I/O.

use stellar_xdr::curr::{Limits, ReadXdr, TransactionEnvelope};
use thiserror::Error;

use super::hash::{hash_envelope, hash_inner_transaction, HashError, NetworkId};
use super::variant::EnvelopeVariant;
use crate::config::{MAX_ENVELOPE_BYTES, MAX_XDR_DEPTH};

/// Errors that can occur while decoding an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The text is not base64, not a `TransactionEnvelope`, exceeds the decode
    /// limits, or carries trailing bytes.
    #[error("invalid envelope xdr: {0}")]
    Decode(String),

    /// The envelope decoded but could not be hashed.
    #[error("could not hash envelope: {0}")]
    Hash(#[from] HashError),
}

/// A decoded envelope and the identifiers derived from it.
///
/// Owned by the request that produced it.
#[derive(Debug, Clone)]
pub struct EnvelopeInfo {
    /// The base64 text exactly as the client sent it.
    pub raw: String,
    /// Structured form of `raw`.
    pub parsed: TransactionEnvelope,
    /// Network-keyed hash of the outer transaction.
    pub hash: [u8; 32],
    /// Hash of the wrapped transaction. Only set for fee bumps.
    pub inner_hash: Option<[u8; 32]>,
}

impl EnvelopeInfo {
    /// Lowercase hex of [`EnvelopeInfo::hash`]. This is the public identifier.
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Lowercase hex of [`EnvelopeInfo::inner_hash`].
    pub fn inner_hash_hex(&self) -> Option<String> {
        self.inner_hash.map(hex::encode)
    }

    pub fn variant(&self) -> EnvelopeVariant {
        EnvelopeVariant::of(&self.parsed)
    }
}

fn decode_limits() -> Limits {
    Limits {
        depth: MAX_XDR_DEPTH,
        len: MAX_ENVELOPE_BYTES,
    }
}

/// Decode a base64 XDR envelope and hash it for the given network.
///
/// # Errors
///
/// Returns [`EnvelopeError::Decode`] when `raw` is not a well-formed envelope
/// and [`EnvelopeError::Hash`] when the hash cannot be computed (for example
/// with an empty passphrase).
pub fn decode_envelope(raw: &str, passphrase: &str) -> Result<EnvelopeInfo, EnvelopeError> {
    let parsed = TransactionEnvelope::from_xdr_base64(raw, decode_limits())
        .map_err(|e| EnvelopeError::Decode(e.to_string()))?;

    let network = NetworkId::from_passphrase(passphrase)?;
    let hash = hash_envelope(&parsed, &network)?;
    let inner_hash = hash_inner_transaction(&parsed, &network)?;

    Ok(EnvelopeInfo {
        raw: raw.to_string(),
        parsed,
        hash,
        inner_hash,
    })
}
