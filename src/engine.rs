//! Friction engine: the synchronous edit-path component
//!
//! Consumes the live edit stream plus the current occurrence snapshot and
//! decides, synchronously with each keystroke, whether to corrupt the text
//! stream. Every synthetic edit it emits is tagged `SyntheticFriction` and
//! is ignored on re-entry, so the engine can never feed itself.
//!
//! At most one corrective edit is emitted per qualifying keystroke.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::FrictionError;
use crate::occurrences::OccurrenceSet;
use crate::region::FrictionMode;

/// Who produced a buffer mutation. Carried on every edit so synthetic
/// insertions are never reclassified as typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOrigin {
    User,
    SyntheticFriction,
}

/// One buffer mutation, delivered in commit order.
#[derive(Debug, Clone)]
pub struct BufferEdit {
    pub origin: EditOrigin,
    /// Byte offset where the insertion starts.
    pub start: usize,
    /// The inserted text. Empty for pure deletions.
    pub inserted: String,
}

impl BufferEdit {
    pub fn user(start: usize, inserted: impl Into<String>) -> Self {
        BufferEdit {
            origin: EditOrigin::User,
            start,
            inserted: inserted.into(),
        }
    }

    /// Byte offset just past the inserted text - the caret position after
    /// this edit commits.
    pub fn end(&self) -> usize {
        self.start + self.inserted.len()
    }
}

/// Scoped exclusive edit access. Dropping the session releases the buffer's
/// edit gate on every exit path, applied or not.
pub trait EditSession {
    /// Stage an insertion. Returns false if the sink rejects it.
    fn insert(&mut self, position: usize, text: &str) -> bool;
    /// Commit the staged insertion.
    fn apply(self: Box<Self>) -> Result<(), FrictionError>;
}

pub trait EditSink {
    /// Acquire exclusive edit access. Fails if the gate cannot be obtained.
    fn begin_edit(
        &mut self,
        origin: EditOrigin,
    ) -> Result<Box<dyn EditSession + '_>, FrictionError>;
}

/// The "interesting character" filter. The two deployed variants disagreed
/// on whether punctuation and whitespace count, so the symbol set is a
/// configuration parameter; letters and digits always qualify when
/// `alphanumeric` is set.
#[derive(Debug, Clone)]
pub struct InterestingSet {
    alphanumeric: bool,
    symbols: Vec<char>,
}

/// Punctuation and whitespace the permissive variant treats as typing.
pub const DEFAULT_INTERESTING_SYMBOLS: &str = "(){}[]<>;,.=+-*/\"'_: ";

impl InterestingSet {
    pub fn new(alphanumeric: bool, symbols: impl IntoIterator<Item = char>) -> Self {
        InterestingSet {
            alphanumeric,
            symbols: symbols.into_iter().collect(),
        }
    }

    pub fn contains(&self, c: char) -> bool {
        (self.alphanumeric && c.is_alphanumeric()) || self.symbols.contains(&c)
    }
}

impl Default for InterestingSet {
    fn default() -> Self {
        InterestingSet::new(true, DEFAULT_INTERESTING_SYMBOLS.chars())
    }
}

/// Typing-cadence accumulator. One instance per engine; mutated only from
/// the synchronous edit path.
#[derive(Debug, Clone, Copy, Default)]
pub struct CadenceState {
    last_edit_end: Option<usize>,
    consecutive_keystrokes: u32,
}

/// What the engine did with one edit. Returned for status display and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrictionOutcome {
    /// Self-tagged, empty, uninteresting, or outside every occurrence.
    Ignored,
    /// A line break reset the cadence.
    CadenceReset,
    /// Inside an occurrence, cadence updated, nothing injected.
    Observed,
    /// A synthetic edit was applied.
    Injected { position: usize, text: String },
}

enum EditClass {
    Ignored,
    LineBreak,
    Keystroke,
}

pub struct FrictionEngine {
    interesting: InterestingSet,
    cadence: CadenceState,
    // One process-lifetime generator, seeded once.
    rng: StdRng,
}

impl FrictionEngine {
    pub fn new(interesting: InterestingSet, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        FrictionEngine {
            interesting,
            cadence: CadenceState::default(),
            rng,
        }
    }

    pub fn consecutive_keystrokes(&self) -> u32 {
        self.cadence.consecutive_keystrokes
    }

    /// Handle one committed edit against the current occurrence snapshot.
    /// Synchronous; called once per buffer mutation in commit order.
    pub fn handle_edit(
        &mut self,
        edit: &BufferEdit,
        occurrences: &OccurrenceSet,
        sink: &mut dyn EditSink,
    ) -> Result<FrictionOutcome, FrictionError> {
        match self.classify(edit) {
            EditClass::Ignored => return Ok(FrictionOutcome::Ignored),
            EditClass::LineBreak => {
                // Line breaks reset cadence wherever they land and never
                // themselves trigger friction.
                self.cadence.consecutive_keystrokes = 0;
                self.cadence.last_edit_end = Some(edit.end());
                return Ok(FrictionOutcome::CadenceReset);
            }
            EditClass::Keystroke => {}
        }

        // The snapshot may lag the edit that triggered the current analysis
        // pass; evaluating against slightly stale occurrences is accepted.
        let Some(occurrence) = occurrences.at(edit.start) else {
            // Outside every occurrence: cadence is left untouched.
            return Ok(FrictionOutcome::Ignored);
        };

        let contiguous = self.cadence.last_edit_end == Some(edit.start);
        self.cadence.consecutive_keystrokes = if contiguous {
            self.cadence.consecutive_keystrokes + 1
        } else {
            1
        };
        self.cadence.last_edit_end = Some(edit.end());

        match &occurrence.tier.mode {
            FrictionMode::Silent => Ok(FrictionOutcome::Observed),
            FrictionMode::ForcedMarker {
                noise_distance,
                marker,
            } => {
                if self.cadence.consecutive_keystrokes < *noise_distance {
                    return Ok(FrictionOutcome::Observed);
                }
                let position = edit.end();
                let text = marker.to_string();
                Self::inject(sink, position, &text)?;
                self.cadence.consecutive_keystrokes = 0;
                Ok(FrictionOutcome::Injected { position, text })
            }
            FrictionMode::RandomCorruption {
                alphabet,
                count_per_keystroke,
            } => {
                // Implicit noise distance of 1: fires every qualifying
                // keystroke, and cadence is left running.
                if alphabet.is_empty() {
                    return Err(FrictionError::InvalidInput("corruption alphabet is empty"));
                }
                let mut text = String::with_capacity(*count_per_keystroke);
                for _ in 0..*count_per_keystroke {
                    text.push(alphabet[self.rng.gen_range(0..alphabet.len())]);
                }
                let position = edit.end();
                Self::inject(sink, position, &text)?;
                Ok(FrictionOutcome::Injected { position, text })
            }
        }
    }

    fn classify(&self, edit: &BufferEdit) -> EditClass {
        if edit.origin == EditOrigin::SyntheticFriction || edit.inserted.is_empty() {
            return EditClass::Ignored;
        }

        let text = edit.inserted.as_str();
        let single = text.chars().count() == 1;
        // Auto-indentation arrives bundled with the newline that caused it;
        // trim the indent so the burst classifies as a line break.
        let candidate = if single {
            text
        } else {
            text.trim_matches([' ', '\t'])
        };

        if candidate == "\n" || candidate == "\r\n" {
            return EditClass::LineBreak;
        }

        let mut chars = candidate.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if self.interesting.contains(c) => EditClass::Keystroke,
            _ => EditClass::Ignored,
        }
    }

    fn inject(sink: &mut dyn EditSink, position: usize, text: &str) -> Result<(), FrictionError> {
        let mut session = sink.begin_edit(EditOrigin::SyntheticFriction)?;
        if !session.insert(position, text) {
            // Session drops here, releasing the edit gate before the error
            // propagates.
            return Err(FrictionError::edit(format!(
                "sink rejected insertion at {position}"
            )));
        }
        session.apply()
    }
}
