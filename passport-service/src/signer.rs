//! Process-wide claim signer
//!
//! The signing key is loaded once at startup from a secret seed; a missing or
//! malformed seed fails process startup rather than failing every request.
//! The seed and signing key never appear in logs or `Debug` output.

use ed25519_dalek::{Signer as _, SigningKey};
use std::fmt;
use thiserror::Error;
use passport_types::{PublicKey, Signature};

#[derive(Error, Debug)]
pub enum SignerError {
    #[error("Signing key not configured; set PASSPORT_SIGNER_SEED")]
    MissingSeed,

    #[error("Malformed signing key seed: {0}")]
    MalformedSeed(String),
}

/// Signing backend for claim digests.
///
/// The production implementation is [`ClaimSigner`]; tests substitute doubles
/// to observe invocation without real key material.
pub trait Signer: Send + Sync {
    /// Sign a 32-byte claim digest
    fn sign_digest(&self, digest: &[u8; 32]) -> Signature;

    /// The verification key registered with the on-chain module
    fn public_key(&self) -> &PublicKey;
}

/// Ed25519 claim signer holding the process-wide keypair.
pub struct ClaimSigner {
    signing_key: SigningKey,
    public_key: PublicKey,
}

impl ClaimSigner {
    /// Build a signer from a 32-byte hex seed, with or without a `0x` prefix.
    pub fn from_hex_seed(seed: &str) -> Result<Self, SignerError> {
        let seed = seed.trim();
        let seed = seed.strip_prefix("0x").unwrap_or(seed);

        let bytes = hex::decode(seed)
            .map_err(|e| SignerError::MalformedSeed(e.to_string()))?;

        let seed_bytes: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            SignerError::MalformedSeed(format!("seed must be 32 bytes, got {}", b.len()))
        })?;

        Ok(Self::from_seed_bytes(seed_bytes))
    }

    fn from_seed_bytes(seed: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        let public_key = PublicKey::new(signing_key.verifying_key().to_bytes());
        Self {
            signing_key,
            public_key,
        }
    }

    /// Generate a fresh random signer. Used by tests and the test server.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        let public_key = PublicKey::new(signing_key.verifying_key().to_bytes());
        Self {
            signing_key,
            public_key,
        }
    }
}

impl Signer for ClaimSigner {
    fn sign_digest(&self, digest: &[u8; 32]) -> Signature {
        Signature::new(self.signing_key.sign(digest).to_bytes())
    }

    fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

// Manual Debug: only the public half is printable.
impl fmt::Debug for ClaimSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimSigner")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}
