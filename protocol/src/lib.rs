// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # txsub Protocol — Core Library
//!
//! The submission relay sits between wallets and a consensus node. A client
//! hands us a signed, base64 XDR transaction envelope; we decode it, hash it,
//! check that the node is synced, forward it, and translate the node's
//! immediate acknowledgment into a stable HTTP contract.
//!
//! We only ever report the node's *admission* decision. Whether the
//! transaction eventually lands in a ledger is somebody else's problem.
//!
//! ## Architecture
//!
//! - **envelope** — XDR decoding, network-keyed hashing, variant tagging.
//! - **client** — The node client: wire types, request context, HTTP transport.
//! - **metrics** — Prometheus instrumentation wrapped around the node client.
//! - **status** — The acknowledgment → HTTP status table.
//! - **readiness** — The read-only "is the node synced" flag.
//! - **service** — The orchestrator that strings the above together.
//! - **config** — Relay configuration and protocol constants.
//! - **error** — The caller-visible error taxonomy.
//!
//! ## Design Philosophy
//!
//! 1. The hash is the public identity of a submission. It is a pure function
//!    of the envelope bytes and the network passphrase, nothing else.
//! 2. The status table is exhaustive. A new node status is a compile error
//!    here, not a silent fallthrough.
//! 3. Metrics are recorded exactly once per outbound call, success or not.
//! 4. We never retry. Retry policy belongs to the caller.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod metrics;
pub mod readiness;
pub mod service;
pub mod status;

pub use client::{CoreClient, RequestContext, SubmissionAcknowledgment, TxStatus};
pub use config::RelayConfig;
pub use envelope::{decode_envelope, EnvelopeInfo, EnvelopeVariant};
pub use error::SubmitError;
pub use metrics::{InstrumentedCoreClient, SubmissionMetrics};
pub use readiness::{Readiness, ReadinessProvider, SyncState};
pub use service::SubmissionService;
pub use status::{map_acknowledgment, SubmissionResponse};
