//! Core types and protocol definitions for the Sui Passport claim service
//!
//! This crate defines the claim policy model, the ephemeral request/verdict
//! types, and the canonical message encoding shared between the off-chain
//! signer and the on-chain verifier.

pub mod error;
pub mod messages;
pub mod policy;
pub mod primitives;

pub use error::{Error, Result};
pub use messages::{
    canonical_claim_message, claim_digest, ClaimRequest, ClaimVerdict, CANONICAL_MESSAGE_LEN,
};
pub use policy::{ClaimPolicy, UserStampRecord};
pub use primitives::{PublicKey, Signature, SuiAddress, Timestamp};
