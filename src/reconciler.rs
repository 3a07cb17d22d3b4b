//! Claim reconciliation.
//!
//! Pure functions that take one request and the current state of one item
//! and produce the next valid state. Out-of-range quantities are clamped,
//! never rejected; only an empty claimer or an unknown item is an error.

use crate::error::{Result, TrackerError};
use crate::types::{Claim, ClaimUpdate, GatherUpdate, Item};

/// Set the gathered amount, clamped to `0..=target`.
///
/// Claims are left untouched: progress does not release reservations.
pub fn apply_gather(item: &Item, requested: i64) -> Item {
    let mut next = item.clone();
    next.gathered = requested.clamp(0, item.target.max(0));
    next
}

/// Set `claimer`'s reservation to the next `requested` units from the
/// current gathered amount.
///
/// The quantity is clamped to what remains. Zero removes the claimer's
/// claim, if any. Otherwise the claim is re-anchored at `gathered`,
/// replacing any previous window held by the same claimer.
pub fn apply_claim(item: &Item, claimer: &str, requested: i64) -> Result<Item> {
    let claimer = claimer.trim();
    if claimer.is_empty() {
        return Err(TrackerError::InvalidClaimer);
    }

    let quantity = requested.clamp(0, item.remaining());
    let mut next = item.clone();

    if quantity == 0 {
        next.claims.retain(|c| c.claimer != claimer);
        return Ok(next);
    }

    let start = next.gathered;
    let end = start.saturating_add(quantity);
    match next.claims.iter_mut().find(|c| c.claimer == claimer) {
        Some(existing) => {
            existing.claim_start = start;
            existing.claim_end = end;
        }
        None => next.claims.push(Claim {
            claimer: claimer.to_string(),
            claim_start: start,
            claim_end: end,
        }),
    }

    Ok(next)
}

/// Position of the item named `name` (exact, case-sensitive).
pub fn find_item(items: &[Item], name: &str) -> Result<usize> {
    items
        .iter()
        .position(|item| item.name == name)
        .ok_or_else(|| TrackerError::ItemNotFound(name.to_string()))
}

/// Apply a gather update to the matching item in `items`. Returns the
/// gathered amount actually stored.
pub fn reconcile_gather(items: &mut [Item], update: &GatherUpdate) -> Result<i64> {
    let idx = find_item(items, &update.name)?;
    items[idx] = apply_gather(&items[idx], update.gathered);
    Ok(items[idx].gathered)
}

/// Apply a claim update to the matching item in `items`.
///
/// The claimer is validated before the lookup, so an empty claimer on an
/// unknown item reports `InvalidClaimer`.
pub fn reconcile_claim(items: &mut [Item], update: &ClaimUpdate) -> Result<()> {
    if update.claimer.trim().is_empty() {
        return Err(TrackerError::InvalidClaimer);
    }
    let idx = find_item(items, &update.name)?;
    items[idx] = apply_claim(&items[idx], &update.claimer, update.claimed)?;
    Ok(())
}
