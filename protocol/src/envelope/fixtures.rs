//! Deterministic sample envelopes for tests.
//!
//! Signatures are left empty: the relay never verifies them, and they are not
//! part of the hash.

use stellar_xdr::curr::{
    FeeBumpTransaction, FeeBumpTransactionEnvelope, FeeBumpTransactionExt,
    FeeBumpTransactionInnerTx, Limits, Memo, MuxedAccount, Preconditions, SequenceNumber,
    Transaction, TransactionEnvelope, TransactionExt, TransactionV0, TransactionV0Envelope,
    TransactionV0Ext, TransactionV1Envelope, Uint256, VecM, WriteXdr,
};

/// A real public-network v0 envelope (payment with a "hello world" memo).
pub const PUBNET_TX_V0_XDR: &str = "AAAAAAGUcmKO5465JxTSLQOQljwk2SfqAJmZSG6JH6wtqpwhAAABLAAAAAAAAAABAAAAAAAAAAEAAAALaGVsbG8gd29ybGQAAAAAAwAAAAAAAAAAAAAAABbxCy3mLg3hiTqX4VUEEp60pFOrJNxYM1JtxXTwXhY2AAAAAAvrwgAAAAAAAAAAAQAAAAAW8Qst5i4N4Yk6l+FVBBKetKRTqyTcWDNSbcV08F4WNgAAAAAN4Lazj4x61AAAAAAAAAAFAAAAAAAAAAAAAAAAAAAAAQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAABLaqcIQAAAEBKwqWy3TaOxoGnfm9eUjfTRBvPf34dvDA0Nf+B8z4zBob90UXtuCqmQqwMCyH+okOI3c05br3khkH0yP4kCwcE";

/// Hash of [`PUBNET_TX_V0_XDR`] on the public network.
pub const PUBNET_TX_V0_HASH: &str =
    "3389e9f0f1a65f19736cacf544c2e825313e8447f569233bb8db39aa607c8889";

/// A v1 transaction with no operations, distinguished by `seed`.
pub fn sample_transaction(seed: u8) -> Transaction {
    Transaction {
        source_account: MuxedAccount::Ed25519(Uint256([seed; 32])),
        fee: 100,
        seq_num: SequenceNumber(i64::from(seed) + 1),
        cond: Preconditions::None,
        memo: Memo::None,
        operations: VecM::default(),
        ext: TransactionExt::V0,
    }
}

/// A legacy v0 transaction with no operations, distinguished by `seed`.
pub fn sample_transaction_v0(seed: u8) -> TransactionV0 {
    TransactionV0 {
        source_account_ed25519: Uint256([seed; 32]),
        fee: 100,
        seq_num: SequenceNumber(i64::from(seed) + 1),
        time_bounds: None,
        memo: Memo::None,
        operations: VecM::default(),
        ext: TransactionV0Ext::V0,
    }
}

pub fn v0_envelope(seed: u8) -> TransactionEnvelope {
    TransactionEnvelope::TxV0(TransactionV0Envelope {
        tx: sample_transaction_v0(seed),
        signatures: VecM::default(),
    })
}

pub fn v1_envelope(seed: u8) -> TransactionEnvelope {
    TransactionEnvelope::Tx(TransactionV1Envelope {
        tx: sample_transaction(seed),
        signatures: VecM::default(),
    })
}

/// A fee bump wrapping exactly [`v1_envelope`] with the same seed.
pub fn fee_bump_envelope(seed: u8) -> TransactionEnvelope {
    let inner = TransactionV1Envelope {
        tx: sample_transaction(seed),
        signatures: VecM::default(),
    };
    TransactionEnvelope::TxFeeBump(FeeBumpTransactionEnvelope {
        tx: FeeBumpTransaction {
            fee_source: MuxedAccount::Ed25519(Uint256([seed.wrapping_add(1); 32])),
            fee: 400,
            inner_tx: FeeBumpTransactionInnerTx::Tx(inner),
            ext: FeeBumpTransactionExt::V0,
        },
        signatures: VecM::default(),
    })
}

/// Base64 XDR encoding of an envelope, as a client would submit it.
pub fn encode(envelope: &TransactionEnvelope) -> String {
    envelope
        .to_xdr_base64(Limits::none())
        .expect("fixture envelopes always encode")
}

pub fn v0_envelope_xdr(seed: u8) -> String {
    encode(&v0_envelope(seed))
}

pub fn v1_envelope_xdr(seed: u8) -> String {
    encode(&v1_envelope(seed))
}

pub fn fee_bump_envelope_xdr(seed: u8) -> String {
    encode(&fee_bump_envelope(seed))
}
