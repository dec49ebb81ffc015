//! # Network-Keyed Transaction Hashing
//!
//! A transaction hash is not a hash of the envelope bytes. It is the SHA-256
//! of a `TransactionSignaturePayload`: the network id (itself the SHA-256 of
//! the network passphrase) followed by the tagged transaction body. The same
//! transaction therefore hashes differently on every network, which is what
//! keeps signatures from being replayed across networks.
//!
//! Signatures are not part of the payload, so re-signing an envelope does not
//! change its hash.
//!
//! Legacy v0 envelopes are hashed as the equivalent v1 `Transaction`. The node
//! does the same, so the hash we return is the one the node indexes.

use sha2::{Digest, Sha256};
use stellar_xdr::curr::{
    FeeBumpTransaction, FeeBumpTransactionInnerTx, Hash, Limits, MuxedAccount, Preconditions,
    Transaction, TransactionEnvelope, TransactionExt, TransactionSignaturePayload,
    TransactionSignaturePayloadTaggedTransaction, TransactionV0, WriteXdr,
};
use thiserror::Error;

/// Errors that can occur while computing a transaction hash.
#[derive(Debug, Error)]
pub enum HashError {
    /// Every network has a passphrase. An empty one is a configuration bug.
    #[error("empty network passphrase")]
    EmptyPassphrase,

    /// The signature payload could not be re-encoded as XDR.
    #[error("failed to encode signature payload: {0}")]
    Encode(#[from] stellar_xdr::curr::Error),
}

/// Compute the SHA-256 hash and return a fixed-size array.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// The 32-byte identifier of a network, derived from its passphrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkId([u8; 32]);

impl NetworkId {
    /// Derive the network id from a passphrase.
    pub fn from_passphrase(passphrase: &str) -> Result<Self, HashError> {
        if passphrase.is_empty() {
            return Err(HashError::EmptyPassphrase);
        }
        Ok(Self(sha256_array(passphrase.as_bytes())))
    }

    /// Raw bytes of the network id.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Convert a legacy v0 transaction into the v1 shape used for hashing.
///
/// The source account becomes an ed25519 muxed account and the optional
/// time bounds become a time precondition (or no precondition at all).
pub fn transaction_from_v0(tx: &TransactionV0) -> Transaction {
    let cond = match &tx.time_bounds {
        Some(bounds) => Preconditions::Time(bounds.clone()),
        None => Preconditions::None,
    };

    Transaction {
        source_account: MuxedAccount::Ed25519(tx.source_account_ed25519.clone()),
        fee: tx.fee,
        seq_num: tx.seq_num.clone(),
        cond,
        memo: tx.memo.clone(),
        operations: tx.operations.clone(),
        ext: TransactionExt::V0,
    }
}

fn hash_payload(
    tagged_transaction: TransactionSignaturePayloadTaggedTransaction,
    network: &NetworkId,
) -> Result<[u8; 32], HashError> {
    let payload = TransactionSignaturePayload {
        network_id: Hash(*network.as_bytes()),
        tagged_transaction,
    };
    let bytes = payload.to_xdr(Limits::none())?;
    Ok(sha256_array(&bytes))
}

/// Hash a v1 transaction body on the given network.
pub fn hash_transaction(tx: &Transaction, network: &NetworkId) -> Result<[u8; 32], HashError> {
    hash_payload(
        TransactionSignaturePayloadTaggedTransaction::Tx(tx.clone()),
        network,
    )
}

/// Hash a fee-bump wrapper on the given network.
pub fn hash_fee_bump(tx: &FeeBumpTransaction, network: &NetworkId) -> Result<[u8; 32], HashError> {
    hash_payload(
        TransactionSignaturePayloadTaggedTransaction::TxFeeBump(tx.clone()),
        network,
    )
}

/// Hash the outer transaction of an envelope, whatever its variant.
pub fn hash_envelope(
    envelope: &TransactionEnvelope,
    network: &NetworkId,
) -> Result<[u8; 32], HashError> {
    match envelope {
        TransactionEnvelope::TxV0(env) => hash_transaction(&transaction_from_v0(&env.tx), network),
        TransactionEnvelope::Tx(env) => hash_transaction(&env.tx, network),
        TransactionEnvelope::TxFeeBump(env) => hash_fee_bump(&env.tx, network),
    }
}

/// Hash the transaction wrapped inside a fee-bump envelope.
///
/// Returns `None` for envelopes that are not fee bumps.
pub fn hash_inner_transaction(
    envelope: &TransactionEnvelope,
    network: &NetworkId,
) -> Result<Option<[u8; 32]>, HashError> {
    match envelope {
        TransactionEnvelope::TxFeeBump(env) => match &env.tx.inner_tx {
            FeeBumpTransactionInnerTx::Tx(inner) => hash_transaction(&inner.tx, network).map(Some),
        },
        TransactionEnvelope::TxV0(_) | TransactionEnvelope::Tx(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PUBLIC_NETWORK_PASSPHRASE, TESTNET_PASSPHRASE};
    use crate::envelope::fixtures;

    #[test]
    fn sha256_known_vector() {
        let hash = sha256_array(b"");
        assert_eq!(
            hex::encode(hash),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn network_id_is_sha256_of_passphrase() {
        let id = NetworkId::from_passphrase(PUBLIC_NETWORK_PASSPHRASE).unwrap();
        assert_eq!(
            id.as_bytes(),
            &sha256_array(PUBLIC_NETWORK_PASSPHRASE.as_bytes())
        );
    }

    #[test]
    fn empty_passphrase_is_rejected() {
        assert!(matches!(
            NetworkId::from_passphrase(""),
            Err(HashError::EmptyPassphrase)
        ));
    }

    #[test]
    fn network_separates_hashes() {
        let tx = fixtures::sample_transaction(1);
        let pubnet = NetworkId::from_passphrase(PUBLIC_NETWORK_PASSPHRASE).unwrap();
        let testnet = NetworkId::from_passphrase(TESTNET_PASSPHRASE).unwrap();
        assert_ne!(
            hash_transaction(&tx, &pubnet).unwrap(),
            hash_transaction(&tx, &testnet).unwrap()
        );
    }

    #[test]
    fn v0_hashes_like_its_v1_equivalent() {
        let network = NetworkId::from_passphrase(PUBLIC_NETWORK_PASSPHRASE).unwrap();
        let v0 = fixtures::sample_transaction_v0(3);
        let converted = transaction_from_v0(&v0);

        assert!(matches!(converted.source_account, MuxedAccount::Ed25519(_)));
        assert_eq!(converted.cond, Preconditions::None);

        let envelope = fixtures::v0_envelope(3);
        assert_eq!(
            hash_envelope(&envelope, &network).unwrap(),
            hash_transaction(&converted, &network).unwrap()
        );
    }

    #[test]
    fn inner_hash_only_for_fee_bumps() {
        let network = NetworkId::from_passphrase(PUBLIC_NETWORK_PASSPHRASE).unwrap();

        let v1 = fixtures::v1_envelope(4);
        assert!(hash_inner_transaction(&v1, &network).unwrap().is_none());

        let bump = fixtures::fee_bump_envelope(4);
        let inner = hash_inner_transaction(&bump, &network)
            .unwrap()
            .expect("fee bump has an inner hash");
        // The inner hash is the hash of the wrapped v1 transaction.
        assert_eq!(inner, hash_envelope(&v1, &network).unwrap());
        assert_ne!(inner, hash_envelope(&bump, &network).unwrap());
    }
}
