//! Claim verification orchestration
//!
//! Ties the policy store, the ledger, and the signer together. Verification
//! performs no mutation: counting and user-record updates happen in
//! [`ClaimVerifier::record_claim`], invoked only after the signature has been
//! redeemed on-chain (two-phase verify-then-redeem).

use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::ledger::{ClaimLedger, LedgerError};
use crate::signer::Signer;
use crate::store::{PolicyStore, StoreError};
use passport_core::evaluate_policy;
use passport_types::{canonical_claim_message, claim_digest, ClaimRequest, ClaimVerdict, PublicKey, Timestamp};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Policy store error: {0}")]
    Store(#[from] StoreError),

    #[error("Claim ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Outcome of recording a redeemed claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    /// Aggregate successful claims for the stamp after this call
    pub claim_count: u64,
    /// True if the user already held the stamp; nothing was recorded
    pub already_claimed: bool,
}

/// The claim verification service.
pub struct ClaimVerifier {
    store: PolicyStore,
    ledger: ClaimLedger,
    signer: Arc<dyn Signer>,
}

impl ClaimVerifier {
    pub fn new(store: PolicyStore, ledger: ClaimLedger, signer: Arc<dyn Signer>) -> Self {
        Self {
            store,
            ledger,
            signer,
        }
    }

    /// Verify a claim attempt at evaluation time `now`.
    ///
    /// An unknown stamp and a failed policy check both return a plain
    /// rejection; the caller cannot distinguish them, so the response channel
    /// leaks nothing about which policies exist. Store failures propagate as
    /// request-level errors. The signer is only invoked for valid claims, and
    /// an approval always carries a signature.
    pub fn verify_claim(
        &self,
        request: &ClaimRequest,
        now: Timestamp,
    ) -> Result<ClaimVerdict, ServiceError> {
        let Some(mut policy) = self.store.get(&request.stamp_id)? else {
            debug!(stamp_id = %request.stamp_id, "claim for unknown stamp rejected");
            return Ok(ClaimVerdict::rejected());
        };

        // The counts tree is authoritative; the row's stored count is stale
        // the moment any claim is recorded.
        policy.claim_count = self.ledger.claim_count(&request.stamp_id)?;

        if !evaluate_policy(&policy, &request.claim_code, now) {
            debug!(stamp_id = %request.stamp_id, "claim rejected by policy");
            return Ok(ClaimVerdict::rejected());
        }

        let message = canonical_claim_message(&request.recipient, request.last_claim_time);
        let digest = claim_digest(&message);
        let signature = self.signer.sign_digest(&digest);

        debug!(stamp_id = %request.stamp_id, recipient = %request.recipient, "claim approved");
        Ok(ClaimVerdict::approved(signature))
    }

    /// Record a redeemed claim: insert the user's claim record and increment
    /// the stamp's count.
    ///
    /// A duplicate claim (including a lost race between concurrent
    /// redemptions) reports `already_claimed` without touching the count.
    pub fn record_claim(
        &self,
        user_id: &str,
        stamp_id: &str,
        now: Timestamp,
    ) -> Result<RecordOutcome, ServiceError> {
        match self.ledger.record_user_claim(user_id, stamp_id, now) {
            Ok(()) => {
                let claim_count = self.ledger.increment_claim_count(stamp_id)?;
                Ok(RecordOutcome {
                    claim_count,
                    already_claimed: false,
                })
            }
            Err(LedgerError::AlreadyClaimed { .. }) => Ok(RecordOutcome {
                claim_count: self.ledger.claim_count(stamp_id)?,
                already_claimed: true,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// The signature verification key.
    pub fn public_key(&self) -> &PublicKey {
        self.signer.public_key()
    }
}
