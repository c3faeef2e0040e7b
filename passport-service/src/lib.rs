//! Sui Passport claim verification service
//!
//! Hosts the claim verification flow: policy lookup, time-window and code
//! evaluation, and signature issuance over the canonical claim message. The
//! claim ledger tracks redeemed claims with store-level atomicity.

pub mod config;
pub mod grpc;
pub mod ledger;
pub mod server;
pub mod service;
pub mod signer;
pub mod store;

#[cfg(feature = "test-util")]
pub mod testutil;

pub use config::ServiceConfig;
pub use ledger::{ClaimLedger, LedgerError};
pub use server::PassportServer;
pub use service::{ClaimVerifier, RecordOutcome, ServiceError};
pub use signer::{ClaimSigner, Signer, SignerError};
pub use store::{PolicyStore, StoreError};
