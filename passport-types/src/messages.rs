//! Claim request/verdict types and the canonical signing message
//!
//! The canonical encoding must stay byte-exact with the on-chain Move
//! verifier: 32 bytes of recipient address followed by the u64 claim time in
//! little-endian (BCS layout). Any change in field order or width breaks
//! redemption on-chain.

use crate::primitives::{Signature, SuiAddress};
use serde::{Deserialize, Serialize};
use sha3::{Digest as _, Keccak256};

/// A single claim verification attempt. Ephemeral; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRequest {
    /// Stamp being claimed
    pub stamp_id: String,
    /// Code submitted by the user; empty string for public claims
    pub claim_code: String,
    /// Address the redeemed stamp will be minted to
    pub recipient: SuiAddress,
    /// Caller-supplied anti-replay state, bound into the signed message
    pub last_claim_time: u64,
}

/// Outcome of a claim verification attempt.
///
/// `valid: true` always carries a signature; callers must never see a
/// signatureless approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimVerdict {
    pub valid: bool,
    pub signature: Option<Signature>,
}

impl ClaimVerdict {
    pub fn approved(signature: Signature) -> Self {
        Self {
            valid: true,
            signature: Some(signature),
        }
    }

    pub fn rejected() -> Self {
        Self {
            valid: false,
            signature: None,
        }
    }
}

/// Length of the canonical signing message: address || u64
pub const CANONICAL_MESSAGE_LEN: usize = SuiAddress::LEN + 8;

/// Build the canonical message bound by a claim signature.
///
/// Layout: 32-byte recipient address, then `last_claim_time` as 8 bytes
/// little-endian.
pub fn canonical_claim_message(recipient: &SuiAddress, last_claim_time: u64) -> Vec<u8> {
    let mut msg = Vec::with_capacity(CANONICAL_MESSAGE_LEN);
    msg.extend_from_slice(recipient.as_bytes());
    msg.extend_from_slice(&last_claim_time.to_le_bytes());
    msg
}

/// Keccak-256 digest of the canonical message; this is what gets signed,
/// matching the on-chain verifier's expectation.
pub fn claim_digest(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(message);
    hasher.finalize().into()
}

/// Decode a canonical message back into its fields.
///
/// Used by tests and auditing tools; the on-chain consumer performs the
/// equivalent decoding in Move.
pub fn decode_claim_message(message: &[u8]) -> crate::Result<(SuiAddress, u64)> {
    if message.len() != CANONICAL_MESSAGE_LEN {
        return Err(crate::Error::InvalidRequest(format!(
            "canonical message must be {} bytes, got {}",
            CANONICAL_MESSAGE_LEN,
            message.len()
        )));
    }
    let recipient = SuiAddress::from_slice(&message[..SuiAddress::LEN])?;
    let mut time_bytes = [0u8; 8];
    time_bytes.copy_from_slice(&message[SuiAddress::LEN..]);
    Ok((recipient, u64::from_le_bytes(time_bytes)))
}
