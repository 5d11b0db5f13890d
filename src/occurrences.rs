//! Occurrence snapshot cache
//!
//! An `Occurrence` binds one method region to the tier its current size
//! qualifies for. The full set is rebuilt wholesale on every analysis pass
//! and published with a single atomic pointer swap: readers on the edit
//! path always observe either the fully-old or fully-new set, never a
//! partially rebuilt one. Overlapping passes are allowed; the last one to
//! complete wins.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::region::{LimitTier, MethodRegion, TierList};

/// Region-to-tier binding.
#[derive(Debug, Clone)]
pub struct Occurrence {
    pub region: MethodRegion,
    pub tier: LimitTier,
}

/// Immutable set of occurrences for one snapshot. Method and constructor
/// bodies do not nest in the covered grammars, so spans never overlap and
/// point lookup has at most one hit.
#[derive(Debug, Default)]
pub struct OccurrenceSet {
    occurrences: Vec<Occurrence>,
}

impl OccurrenceSet {
    /// Resolve every region against the tier list, keeping only regions
    /// that qualify for some tier.
    pub fn build(regions: Vec<MethodRegion>, tiers: &TierList) -> Self {
        let occurrences = regions
            .into_iter()
            .filter_map(|region| {
                tiers.resolve(region.line_count).map(|tier| Occurrence {
                    region,
                    tier: tier.clone(),
                })
            })
            .collect();
        OccurrenceSet { occurrences }
    }

    /// The occurrence whose region span contains the given caret position.
    pub fn at(&self, position: usize) -> Option<&Occurrence> {
        self.occurrences
            .iter()
            .find(|o| o.region.span.contains_position(position))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Occurrence> {
        self.occurrences.iter()
    }

    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }
}

/// The latest published snapshot. The analysis pass is the sole writer.
pub struct OccurrenceCache {
    snap: ArcSwap<OccurrenceSet>,
}

impl OccurrenceCache {
    pub fn new() -> Self {
        OccurrenceCache {
            snap: ArcSwap::from_pointee(OccurrenceSet::default()),
        }
    }

    /// Current snapshot. May lag an edit that raced a rebuild; accepted.
    pub fn load(&self) -> Arc<OccurrenceSet> {
        self.snap.load_full()
    }

    /// Atomically replace the previous snapshot.
    pub fn publish(&self, set: Arc<OccurrenceSet>) {
        self.snap.store(set);
    }
}

impl Default for OccurrenceCache {
    fn default() -> Self {
        Self::new()
    }
}
