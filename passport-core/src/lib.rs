//! Core claim verification logic for Sui Passport
//!
//! This crate provides:
//! - Time-window predicate evaluation over claim policies
//! - Claim signature verification
//!
//! Everything here is pure: the evaluation time is caller-supplied and no
//! function performs I/O, so each branch is independently testable.

pub mod verify;
pub mod window;

pub use verify::{verify_claim_signature, VerificationError};
pub use window::{evaluate_policy, ClaimWindow};
