//! Core types for the tracker.

use serde::{Deserialize, Deserializer, Serialize};

/// A trackable goal: a target quantity, the progress toward it, and the
/// reservations claimers hold on the remainder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique within a collection. Matched case-sensitively.
    pub name: String,

    pub target: i64,

    /// Always within `0..=target` after a mutation.
    pub gathered: i64,

    /// At most one claim per claimer, in the order they were first made.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub claims: Vec<Claim>,
}

impl Item {
    /// Create an item with no progress and no claims.
    pub fn new(name: impl Into<String>, target: i64) -> Self {
        Self {
            name: name.into(),
            target,
            gathered: 0,
            claims: Vec::new(),
        }
    }

    /// Quantity not yet gathered, never negative.
    pub fn remaining(&self) -> i64 {
        self.target.saturating_sub(self.gathered).max(0)
    }

    /// The claim held by `claimer`, if any.
    pub fn claim_of(&self, claimer: &str) -> Option<&Claim> {
        self.claims.iter().find(|c| c.claimer == claimer)
    }
}

/// A reservation of the half-open range `[claim_start, claim_end)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub claimer: String,
    pub claim_start: i64,
    pub claim_end: i64,
}

impl Claim {
    /// Reserved quantity.
    pub fn quantity(&self) -> i64 {
        self.claim_end - self.claim_start
    }
}

/// The whole item collection, in insertion order.
pub type Collection = Vec<Item>;

/// Request to set an item's gathered amount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatherUpdate {
    pub name: String,
    pub gathered: i64,
}

/// Request to set a claimer's reserved quantity on an item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimUpdate {
    pub name: String,
    pub claimed: i64,
    pub claimer: String,
}

/// Request against the shared secret set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordRequest {
    pub password: String,
    /// `"add"` or `"remove"`, case-insensitive.
    pub action: String,
}

/// Event sent down every live stream.
///
/// Always carries the full collection; receivers re-render from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Update { items: Collection },
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Claim>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Claim>>::deserialize(deserializer)?.unwrap_or_default())
}
