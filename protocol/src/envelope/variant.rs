//! Envelope variants and their metric labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use stellar_xdr::curr::TransactionEnvelope;

/// Which envelope shape a client submitted.
///
/// Used as the `envelope_type` dimension on submission metrics, so operators
/// can see how much legacy v0 traffic is still arriving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeVariant {
    /// Legacy `ENVELOPE_TYPE_TX_V0`.
    Basic,
    /// `ENVELOPE_TYPE_TX`.
    Versioned,
    /// `ENVELOPE_TYPE_TX_FEE_BUMP`.
    FeeBump,
}

impl EnvelopeVariant {
    /// Every variant, in wire-tag order.
    pub const ALL: [EnvelopeVariant; 3] = [Self::Basic, Self::Versioned, Self::FeeBump];

    /// Derive the variant from a decoded envelope.
    pub fn of(envelope: &TransactionEnvelope) -> Self {
        match envelope {
            TransactionEnvelope::TxV0(_) => Self::Basic,
            TransactionEnvelope::Tx(_) => Self::Versioned,
            TransactionEnvelope::TxFeeBump(_) => Self::FeeBump,
        }
    }

    /// Metric label value.
    pub fn label(self) -> &'static str {
        match self {
            Self::Basic => "v0",
            Self::Versioned => "v1",
            Self::FeeBump => "fee_bump",
        }
    }
}

impl fmt::Display for EnvelopeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
