//! Claim signature verification
//!
//! The off-chain counterpart of the on-chain redemption check: recompute the
//! canonical message digest and verify the service's detached Ed25519
//! signature over it. Signatures may be produced by a randomized scheme, so
//! verifiers must verify, never byte-compare.

use ed25519_dalek::{Signature as Ed25519Signature, Verifier, VerifyingKey};
use thiserror::Error;
use passport_types::{canonical_claim_message, claim_digest, PublicKey, Signature, SuiAddress};

#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Signature verification failed")]
    InvalidSignature,

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
}

/// Verify a claim signature issued for `(recipient, last_claim_time)`.
pub fn verify_claim_signature(
    public_key: &PublicKey,
    signature: &Signature,
    recipient: &SuiAddress,
    last_claim_time: u64,
) -> Result<(), VerificationError> {
    let message = canonical_claim_message(recipient, last_claim_time);
    let digest = claim_digest(&message);

    let verifying_key = VerifyingKey::from_bytes(public_key.as_bytes())
        .map_err(|e| VerificationError::InvalidPublicKey(e.to_string()))?;

    let sig = Ed25519Signature::from_bytes(signature.as_bytes());

    verifying_key
        .verify(&digest, &sig)
        .map_err(|_| VerificationError::InvalidSignature)?;

    Ok(())
}
