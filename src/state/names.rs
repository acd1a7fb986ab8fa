use std::time::SystemTime;

use dashmap::{DashMap, mapref::entry::Entry};
use thiserror::Error;

/// Longest nickname a participant may claim, in characters.
pub const MAX_NAME_CHARS: usize = 13;

/// Reasons a nickname cannot be claimed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// The name is empty or whitespace only.
    #[error("name must not be empty")]
    Empty,
    /// The name exceeds [`MAX_NAME_CHARS`].
    #[error("name is too long ({len} characters, at most {max} allowed)")]
    TooLong {
        /// Length of the rejected name in characters.
        len: usize,
        /// Maximum accepted length.
        max: usize,
    },
    /// Someone else currently holds the name.
    #[error("name `{0}` is already taken")]
    Taken(String),
}

/// Check the shape of a nickname. Runs before, and independently of, the uniqueness check.
pub fn validate_name(name: &str) -> Result<(), NameError> {
    if name.trim().is_empty() {
        return Err(NameError::Empty);
    }
    let len = name.chars().count();
    if len > MAX_NAME_CHARS {
        return Err(NameError::TooLong {
            len,
            max: MAX_NAME_CHARS,
        });
    }
    Ok(())
}

/// Metadata kept for each live claim.
#[derive(Debug, Clone)]
pub struct Claim {
    /// When the claim was granted.
    pub claimed_at: SystemTime,
}

/// Process-wide set of nicknames currently held by participants.
///
/// Claims are keyed by the exact string (case and byte sensitive). The map is sharded, so
/// claims of different names proceed without contending on a single lock while claims of the
/// same name serialize on the shard entry.
#[derive(Debug, Default)]
pub struct NameRegistry {
    claims: DashMap<String, Claim>,
}

impl NameRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and atomically insert `name` if nobody holds it yet.
    pub fn try_claim(&self, name: &str) -> Result<(), NameError> {
        validate_name(name)?;

        match self.claims.entry(name.to_owned()) {
            Entry::Occupied(_) => Err(NameError::Taken(name.to_owned())),
            Entry::Vacant(slot) => {
                slot.insert(Claim {
                    claimed_at: SystemTime::now(),
                });
                Ok(())
            }
        }
    }

    /// Drop a claim. Releasing a name nobody holds is a no-op; returns whether a claim existed.
    pub fn release(&self, name: &str) -> bool {
        self.claims.remove(name).is_some()
    }

    /// Whether `name` is currently held. Only a hint: never gate [`Self::try_claim`] on it.
    pub fn is_claimed(&self, name: &str) -> bool {
        self.claims.contains_key(name)
    }

    /// Drop every claim.
    pub fn clear(&self) {
        self.claims.clear();
    }

    /// Number of live claims.
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Whether no claim is held.
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}
