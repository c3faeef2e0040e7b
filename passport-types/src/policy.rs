//! Claim policy and user claim-state rows
//!
//! These are the persisted shapes stored by the policy store. Rows are
//! schema-validated on decode at the store boundary; a malformed row is a
//! typed error, never a panic at field access.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::primitives::Timestamp;

/// The claim policy for a single stamp definition.
///
/// `claim_code` absent means the stamp is not claimable by code at all,
/// unless `public_claim` is set. Window bounds are Unix milliseconds and
/// either, both, or neither may be present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimPolicy {
    /// Unique stamp identifier
    pub stamp_id: String,

    /// Shared secret gating the claim; compared exactly, case-sensitive
    #[serde(default)]
    pub claim_code: Option<String>,

    /// Claims are invalid before this instant
    #[serde(default)]
    pub valid_from: Option<Timestamp>,

    /// Claims are invalid after this instant
    #[serde(default)]
    pub valid_until: Option<Timestamp>,

    /// Cap on aggregate successful claims; `None` or 0 means unlimited
    #[serde(default)]
    pub total_count_limit: Option<u64>,

    /// Cap on claims per individual user
    #[serde(default)]
    pub user_count_limit: Option<u64>,

    /// Successful claims so far; mutated only by the claim ledger
    #[serde(default)]
    pub claim_count: u64,

    /// When true the stamp may be claimed without a code
    #[serde(default)]
    pub public_claim: bool,
}

impl ClaimPolicy {
    /// A minimal code-gated policy with no window or count limits
    pub fn code_gated(stamp_id: impl Into<String>, claim_code: impl Into<String>) -> Self {
        Self {
            stamp_id: stamp_id.into(),
            claim_code: Some(claim_code.into()),
            valid_from: None,
            valid_until: None,
            total_count_limit: None,
            user_count_limit: None,
            claim_count: 0,
            public_claim: false,
        }
    }

    /// True if the aggregate claim cap has been reached.
    ///
    /// A limit of 0 (or none) means unlimited.
    pub fn total_limit_reached(&self) -> bool {
        match self.total_count_limit {
            Some(limit) if limit > 0 => self.claim_count >= limit,
            _ => false,
        }
    }
}

/// The subset of a user's persisted state the claim flow reads:
/// the set of stamps this user has already claimed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStampRecord {
    pub user_id: String,
    pub owned_stamp_ids: BTreeSet<String>,
}

impl UserStampRecord {
    pub fn has_claimed(&self, stamp_id: &str) -> bool {
        self.owned_stamp_ids.contains(stamp_id)
    }
}
