//! Core data model: spans, method regions, limit tiers
//!
//! A `MethodRegion` has no identity across snapshots - every analysis pass
//! recomputes the full set from scratch, nothing is diffed or matched by
//! name. Tier resolution lives here too since it is a pure function over
//! these types.

use serde::{Deserialize, Serialize};

/// A contiguous byte range in a buffer snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Whether a caret position falls inside this span. The end boundary
    /// counts: typing right before a body's closing brace is still typing
    /// inside the body.
    pub fn contains_position(&self, position: usize) -> bool {
        position >= self.start && position <= self.end
    }

    pub fn intersects(&self, other: Span) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Declaration kinds the scanner cares about. Closed set, dispatched by
/// exhaustive match - never by runtime kind-string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclarationKind {
    Method,
    Constructor,
}

/// A method or constructor body found in one buffer snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRegion {
    pub kind: DeclarationKind,
    /// Full span of the declaration.
    pub span: Span,
    /// Span of the body block only.
    pub body: Span,
    /// Line count of the body text with leading/trailing blank lines stripped.
    pub line_count: usize,
    /// Start offsets of the body's immediate children, for the child-minimum
    /// overlay anchor strategy.
    pub child_offsets: Vec<usize>,
}

/// Count the lines of a body's text, ignoring blank lines at either end.
pub fn trimmed_line_count(body_text: &str) -> usize {
    let lines: Vec<&str> = body_text.lines().collect();
    let leading = lines
        .iter()
        .take_while(|l| l.trim().is_empty())
        .count();
    let trailing = lines
        .iter()
        .rev()
        .take_while(|l| l.trim().is_empty())
        .count();
    lines.len().saturating_sub(leading + trailing)
}

/// Policy for corrective text injection once a tier is hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrictionMode {
    /// Visual marking only, never injects.
    Silent,
    /// Insert a single marker glyph after every `noise_distance` contiguous
    /// qualifying keystrokes.
    ForcedMarker { noise_distance: u32, marker: char },
    /// Insert `count_per_keystroke` characters drawn uniformly from
    /// `alphabet` on every qualifying keystroke.
    RandomCorruption {
        alphabet: Vec<char>,
        count_per_keystroke: usize,
    },
}

impl FrictionMode {
    /// Cadence threshold at which the mode fires. Modes with no explicit
    /// cadence fire on every qualifying keystroke.
    pub fn noise_distance(&self) -> u32 {
        match self {
            FrictionMode::ForcedMarker { noise_distance, .. } => *noise_distance,
            FrictionMode::Silent | FrictionMode::RandomCorruption { .. } => 1,
        }
    }
}

/// One configured severity step: bodies at or above `line_threshold` lines
/// qualify for this tier unless a later tier's threshold also fits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitTier {
    pub line_threshold: usize,
    /// Display-only RGB fill for the overlay.
    pub color: [u8; 3],
    pub mode: FrictionMode,
}

/// Ordered tier list. Construction sorts ascending by threshold so
/// resolution can scan once and exit early.
#[derive(Debug, Clone, Default)]
pub struct TierList {
    tiers: Vec<LimitTier>,
}

impl TierList {
    pub fn new(mut tiers: Vec<LimitTier>) -> Self {
        tiers.sort_by_key(|t| t.line_threshold);
        TierList { tiers }
    }

    /// The tier with the greatest threshold not exceeding `line_count`, or
    /// `None` when the count is below every threshold. Monotonic in
    /// `line_count` for a fixed list; the threshold itself is an inclusive
    /// lower bound.
    pub fn resolve(&self, line_count: usize) -> Option<&LimitTier> {
        let mut hit = None;
        for tier in &self.tiers {
            if tier.line_threshold > line_count {
                break;
            }
            hit = Some(tier);
        }
        hit
    }
}
