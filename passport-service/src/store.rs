//! Policy store
//!
//! One row per stamp in the `policies` tree, serialized as JSON and
//! schema-validated on decode. A row that fails to decode surfaces a typed
//! corrupt-row error instead of panicking at field access.

use sled::{Db, Tree};
use thiserror::Error;
use passport_types::ClaimPolicy;

const POLICIES_TREE: &str = "policies";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(#[from] sled::Error),

    #[error("Corrupt policy row for stamp '{stamp_id}': {source}")]
    CorruptRow {
        stamp_id: String,
        source: serde_json::Error,
    },

    #[error("Failed to serialize policy for stamp '{stamp_id}': {source}")]
    Encode {
        stamp_id: String,
        source: serde_json::Error,
    },
}

/// Store of claim policies, keyed by `stamp_id`.
#[derive(Clone)]
pub struct PolicyStore {
    tree: Tree,
}

impl PolicyStore {
    pub fn open(db: &Db) -> Result<Self, StoreError> {
        Ok(Self {
            tree: db.open_tree(POLICIES_TREE)?,
        })
    }

    /// Look up the claim policy for a stamp, if one is defined.
    pub fn get(&self, stamp_id: &str) -> Result<Option<ClaimPolicy>, StoreError> {
        match self.tree.get(stamp_id.as_bytes())? {
            Some(bytes) => {
                let policy =
                    serde_json::from_slice(&bytes).map_err(|source| StoreError::CorruptRow {
                        stamp_id: stamp_id.to_string(),
                        source,
                    })?;
                Ok(Some(policy))
            }
            None => Ok(None),
        }
    }

    /// Create or replace a stamp's claim policy. Administrative operation.
    pub fn put(&self, policy: &ClaimPolicy) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(policy).map_err(|source| StoreError::Encode {
            stamp_id: policy.stamp_id.clone(),
            source,
        })?;
        self.tree.insert(policy.stamp_id.as_bytes(), bytes)?;
        self.tree.flush()?;
        Ok(())
    }

    /// Remove a stamp's claim policy.
    pub fn remove(&self, stamp_id: &str) -> Result<(), StoreError> {
        self.tree.remove(stamp_id.as_bytes())?;
        self.tree.flush()?;
        Ok(())
    }

    pub fn contains(&self, stamp_id: &str) -> Result<bool, StoreError> {
        Ok(self.tree.contains_key(stamp_id.as_bytes())?)
    }
}
