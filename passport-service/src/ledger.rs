//! Claim ledger
//!
//! Tracks per-stamp claim counts and per-user claimed-stamp records. Both
//! mutations are atomic at the store layer: the count uses sled's
//! read-modify-write loop (no lost updates under concurrent increments), and
//! the user record uses compare-and-swap keyed on `(user_id, stamp_id)`, so a
//! duplicate-claim race resolves to "already claimed" rather than a double
//! record.

use sled::{Db, Tree};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;
use passport_types::{Timestamp, UserStampRecord};

const COUNTS_TREE: &str = "claim_counts";
const USER_CLAIMS_TREE: &str = "user_claims";
const POLICIES_TREE: &str = "policies";

/// Separator between user and stamp in `user_claims` keys. NUL cannot occur
/// in either identifier.
const KEY_SEP: u8 = 0;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Storage backend error: {0}")]
    Backend(#[from] sled::Error),

    #[error("No claim policy for stamp '{stamp_id}'")]
    NotFound { stamp_id: String },

    #[error("User '{user_id}' has already claimed stamp '{stamp_id}'")]
    AlreadyClaimed { user_id: String, stamp_id: String },
}

/// Ledger of successful claims, backed by two sled trees.
#[derive(Clone)]
pub struct ClaimLedger {
    counts: Tree,
    user_claims: Tree,
    policies: Tree,
}

fn decode_count(bytes: &[u8]) -> u64 {
    bytes
        .try_into()
        .map(u64::from_be_bytes)
        .unwrap_or_default()
}

fn user_claim_key(user_id: &str, stamp_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(user_id.len() + 1 + stamp_id.len());
    key.extend_from_slice(user_id.as_bytes());
    key.push(KEY_SEP);
    key.extend_from_slice(stamp_id.as_bytes());
    key
}

impl ClaimLedger {
    pub fn open(db: &Db) -> Result<Self, LedgerError> {
        Ok(Self {
            counts: db.open_tree(COUNTS_TREE)?,
            user_claims: db.open_tree(USER_CLAIMS_TREE)?,
            policies: db.open_tree(POLICIES_TREE)?,
        })
    }

    /// Atomically increment the successful-claim count for a stamp and return
    /// the updated count.
    ///
    /// Fails with [`LedgerError::NotFound`] for a stamp with no policy; the
    /// ledger state is untouched in that case.
    pub fn increment_claim_count(&self, stamp_id: &str) -> Result<u64, LedgerError> {
        if !self.policies.contains_key(stamp_id.as_bytes())? {
            return Err(LedgerError::NotFound {
                stamp_id: stamp_id.to_string(),
            });
        }

        let updated = self.counts.update_and_fetch(stamp_id.as_bytes(), |old| {
            let current = old.map(decode_count).unwrap_or(0);
            Some(current.saturating_add(1).to_be_bytes().to_vec())
        })?;

        // update_and_fetch with a Some-returning closure always yields a value
        let count = updated.as_deref().map(decode_count).unwrap_or(0);
        debug!(stamp_id, count, "claim count incremented");
        Ok(count)
    }

    /// Current successful-claim count for a stamp; 0 if none recorded.
    pub fn claim_count(&self, stamp_id: &str) -> Result<u64, LedgerError> {
        Ok(self
            .counts
            .get(stamp_id.as_bytes())?
            .as_deref()
            .map(decode_count)
            .unwrap_or(0))
    }

    /// Record that `user_id` has claimed `stamp_id`, atomically.
    ///
    /// The insert is a compare-and-swap against an absent key: of two racing
    /// claims for the same `(user_id, stamp_id)` exactly one succeeds and the
    /// other observes [`LedgerError::AlreadyClaimed`].
    pub fn record_user_claim(
        &self,
        user_id: &str,
        stamp_id: &str,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        if !self.policies.contains_key(stamp_id.as_bytes())? {
            return Err(LedgerError::NotFound {
                stamp_id: stamp_id.to_string(),
            });
        }

        let key = user_claim_key(user_id, stamp_id);
        let claimed_at = now.as_millis().to_be_bytes().to_vec();

        let swap = self
            .user_claims
            .compare_and_swap(key, None as Option<&[u8]>, Some(claimed_at))?;

        match swap {
            Ok(()) => {
                debug!(user_id, stamp_id, "user claim recorded");
                Ok(())
            }
            Err(_) => Err(LedgerError::AlreadyClaimed {
                user_id: user_id.to_string(),
                stamp_id: stamp_id.to_string(),
            }),
        }
    }

    /// True if the user already holds the stamp.
    pub fn has_claimed(&self, user_id: &str, stamp_id: &str) -> Result<bool, LedgerError> {
        Ok(self
            .user_claims
            .contains_key(user_claim_key(user_id, stamp_id))?)
    }

    /// The set of stamps a user has claimed.
    pub fn owned_stamps(&self, user_id: &str) -> Result<BTreeSet<String>, LedgerError> {
        let mut prefix = user_id.as_bytes().to_vec();
        prefix.push(KEY_SEP);

        let mut stamps = BTreeSet::new();
        for item in self.user_claims.scan_prefix(&prefix) {
            let (key, _) = item?;
            let stamp = String::from_utf8_lossy(&key[prefix.len()..]).into_owned();
            stamps.insert(stamp);
        }
        Ok(stamps)
    }

    /// A user's persisted claim state.
    pub fn user_record(&self, user_id: &str) -> Result<UserStampRecord, LedgerError> {
        Ok(UserStampRecord {
            user_id: user_id.to_string(),
            owned_stamp_ids: self.owned_stamps(user_id)?,
        })
    }
}
