//! Mention boundary resolution for a single document.
//!
//! Several annotation records usually mark overlapping spans in the same
//! document ("the vaccine" inside "the new mRNA vaccine"). Before chains are
//! built, nested spans are folded into their outermost container so that one
//! stretch of text carries one mention.
//!
//! Only full containment merges. Partial overlaps are distinct mentions that
//! happen to share characters and are left alone.
//!
//! ```rust
//! use cdcr::export::boundary::{resolve_boundaries, Bound};
//!
//! let bounds = [Bound::new(0, 10, 1), Bound::new(2, 5, 2), Bound::new(2, 5, 3)];
//! let resolution = resolve_boundaries(&bounds);
//!
//! assert_eq!(resolution.survivors().len(), 1);
//! assert_eq!(resolution.resolve(2), 1);
//! assert_eq!(resolution.resolve(3), 1);
//! ```

use log::{debug, warn};
use std::collections::HashMap;

/// Identifier of the record a span came from.
pub type OwnerId = u64;

/// A character span `[start, end)` owned by one annotation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bound {
    /// Start character offset (inclusive).
    pub start: usize,
    /// End character offset (exclusive).
    pub end: usize,
    /// Owning record.
    pub owner: OwnerId,
}

impl Bound {
    /// Create a bound. Offsets are not validated here; see [`resolve_boundaries`].
    #[must_use]
    pub fn new(start: usize, end: usize, owner: OwnerId) -> Self {
        Self { start, end, owner }
    }

    /// Length in characters (zero for malformed bounds).
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True for malformed bounds with `end <= start`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True if `other` lies entirely inside this bound (equal spans included).
    #[must_use]
    pub fn contains(&self, other: &Bound) -> bool {
        self.start <= other.start && self.end >= other.end
    }
}

/// Outcome of resolving one document's bounds.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Subsumed owner -> owner of the span it was folded into.
    merged: HashMap<OwnerId, OwnerId>,
    /// Bounds that were not subsumed, in input order.
    survivors: Vec<Bound>,
}

impl Resolution {
    /// Owner a record's mention resolves to after merging.
    ///
    /// Follows merges transitively, so an owner folded into a span that was
    /// itself folded resolves to the outermost surviving owner. Owners that
    /// were never seen resolve to themselves.
    #[must_use]
    pub fn resolve(&self, owner: OwnerId) -> OwnerId {
        let mut current = owner;
        // Bounded walk: a merge map can never be longer than its entry count.
        for _ in 0..=self.merged.len() {
            match self.merged.get(&current) {
                Some(&next) if next != current => current = next,
                _ => break,
            }
        }
        current
    }

    /// True if the owner's span was folded into another span.
    #[must_use]
    pub fn is_subsumed(&self, owner: OwnerId) -> bool {
        self.merged.contains_key(&owner)
    }

    /// Subsumed owners with the survivor each resolves to, sorted by owner.
    #[must_use]
    pub fn subsumed(&self) -> Vec<(OwnerId, OwnerId)> {
        let mut pairs: Vec<(OwnerId, OwnerId)> = self
            .merged
            .keys()
            .map(|&owner| (owner, self.resolve(owner)))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Number of merges performed.
    #[must_use]
    pub fn merge_count(&self) -> usize {
        self.merged.len()
    }

    /// Outermost spans, one per overlapping-by-containment group.
    #[must_use]
    pub fn survivors(&self) -> &[Bound] {
        &self.survivors
    }
}

/// Fold nested spans into their outermost container.
///
/// Spans are visited largest first (stable for equal lengths). Each span that
/// has not already been folded claims every other span it contains. A span
/// keeps the first container that claimed it, so equal duplicates land on the
/// same outer span rather than on each other. Malformed bounds are logged and
/// dropped.
#[must_use]
pub fn resolve_boundaries(bounds: &[Bound]) -> Resolution {
    let valid: Vec<Bound> = bounds
        .iter()
        .filter(|b| {
            if b.is_empty() {
                warn!(
                    "skipping mention of record {} with malformed offsets {}..{}",
                    b.owner, b.start, b.end
                );
                false
            } else {
                true
            }
        })
        .copied()
        .collect();

    let mut order: Vec<usize> = (0..valid.len()).collect();
    order.sort_by(|&a, &b| valid[b].len().cmp(&valid[a].len()));

    let mut merged: HashMap<OwnerId, OwnerId> = HashMap::new();

    for &outer_idx in &order {
        let outer = valid[outer_idx];
        if merged.contains_key(&outer.owner) {
            continue;
        }

        for (inner_idx, inner) in valid.iter().enumerate() {
            if inner_idx == outer_idx || inner.owner == outer.owner {
                continue;
            }
            if outer.contains(inner) && !merged.contains_key(&inner.owner) {
                debug!(
                    "merge {} ({}..{}) -> {} ({}..{})",
                    inner.owner, inner.start, inner.end, outer.owner, outer.start, outer.end
                );
                merged.insert(inner.owner, outer.owner);
            }
        }
    }

    let survivors = valid
        .into_iter()
        .filter(|b| !merged.contains_key(&b.owner))
        .collect();

    Resolution { merged, survivors }
}
