//! Time-window predicate evaluation
//!
//! A policy's optional `valid_from`/`valid_until` bounds are lowered once
//! into a tagged [`ClaimWindow`], making the four cases exhaustive instead of
//! a chain of optional-field checks.

use passport_types::{ClaimPolicy, Timestamp};

/// Validity window of a claim policy, derived from its optional bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimWindow {
    /// No bounds; always claimable
    Unbounded,
    /// Claimable from this instant onward
    LowerOnly(Timestamp),
    /// Claimable up to and including this instant
    UpperOnly(Timestamp),
    /// Claimable within [from, until], inclusive at both ends.
    /// An inverted pair (from > until) contains no instant.
    Bounded { from: Timestamp, until: Timestamp },
}

impl ClaimWindow {
    /// Derive the window from a policy's optional bounds.
    pub fn from_bounds(valid_from: Option<Timestamp>, valid_until: Option<Timestamp>) -> Self {
        match (valid_from, valid_until) {
            (None, None) => Self::Unbounded,
            (Some(from), None) => Self::LowerOnly(from),
            (None, Some(until)) => Self::UpperOnly(until),
            (Some(from), Some(until)) => Self::Bounded { from, until },
        }
    }

    pub fn from_policy(policy: &ClaimPolicy) -> Self {
        Self::from_bounds(policy.valid_from, policy.valid_until)
    }

    /// Window membership, inclusive at both boundaries.
    pub fn contains(&self, now: Timestamp) -> bool {
        match *self {
            Self::Unbounded => true,
            Self::LowerOnly(from) => now >= from,
            Self::UpperOnly(until) => now <= until,
            Self::Bounded { from, until } => from <= now && now <= until,
        }
    }
}

/// Evaluate whether a claim attempt against `policy` is currently valid.
///
/// Fails closed: unless the policy is a public claim, the submitted code must
/// exactly match the policy's code (case-sensitive), `now` must fall inside
/// the validity window, and the aggregate claim cap must not be reached.
///
/// `now` is supplied by the caller so the predicate stays pure. No side
/// effects.
pub fn evaluate_policy(policy: &ClaimPolicy, submitted_code: &str, now: Timestamp) -> bool {
    // Public stamps are claimable without a code.
    if policy.public_claim {
        return true;
    }

    let code_matches = match &policy.claim_code {
        Some(code) => code == submitted_code,
        None => false,
    };
    if !code_matches {
        return false;
    }

    if !ClaimWindow::from_policy(policy).contains(now) {
        return false;
    }

    !policy.total_limit_reached()
}
