//! Bit-parallel filters
//!
//! Shift-Or automata that stream over a chord sequence and propose candidate
//! windows. Each filter compiles its transition table from the pattern once
//! and can then scan any number of sequences.
//!
//! State bits are hypotheses anchored at successive start positions. A clear
//! bit is alive; a window is proposed when the bit for the last pattern
//! position is clear after a step.
//!
//! The interval filters only check that every required interval occurs
//! somewhere across each boundary, so their candidates still need
//! [`verify`](fn@crate::verify) to confirm a connected note path. The exact
//! filter is exact on its own.

use crate::bits::{low_mask, Word, PITCH_CLASSES, WORD_BITS};
use crate::boundary::{check_boundaries, BoundaryMask};
use crate::pattern::pattern_intervals;
use crate::score::{
    check_chords, check_pattern, pitch_class, Chord, Interval, Match, MatchError, Pitch, MAX_PITCH,
};
use crate::verify::{verify_window, Equivalence};

/// Longest pattern accepted by [`BoundaryFilter`].
pub const MAX_BOUNDARY_PATTERN: usize = PITCH_CLASSES;

/// Longest pattern accepted by [`IntervalFilter`] and [`ExactFilter`].
pub const MAX_WORD_PATTERN: usize = WORD_BITS;

/// One entry per possible boundary mask.
const BOUNDARY_TABLE_SIZE: usize = 1 << PITCH_CLASSES;

/// One entry per literal interval in -127..=127.
const LITERAL_TABLE_SIZE: usize = 2 * MAX_PITCH as usize + 1;

/// One entry per pitch.
const PITCH_TABLE_SIZE: usize = MAX_PITCH as usize + 1;

#[derive(Debug, Copy, Clone)]
struct ShiftOr {
    state: Word,
    valid: Word,
    accept: Word,
}

impl ShiftOr {
    /// `width` must be in 1..=WORD_BITS; the filters check this on construction.
    fn new(width: usize) -> Self {
        let valid = low_mask(width);
        ShiftOr {
            state: valid,
            valid,
            accept: 1 << (width - 1),
        }
    }

    /// Feed one symbol; true when a full pattern has just been matched.
    #[inline]
    fn step(&mut self, symbol: Word) -> bool {
        self.state = ((self.state << 1) | symbol) & self.valid;
        self.state & self.accept == 0
    }
}

/// Table with, per slot, bit `k` clear iff pattern interval `k` falls in that slot.
fn interval_table(
    intervals: &[Interval],
    slots: usize,
    slot: impl Fn(Interval) -> Option<usize>,
) -> Vec<Word> {
    let mut table = vec![low_mask(intervals.len()); slots];
    for (k, &interval) in intervals.iter().enumerate() {
        if let Some(entry) = slot(interval).and_then(|s| table.get_mut(s)) {
            *entry &= !(1 << k);
        }
    }
    table
}

/// Transposition- and octave-invariant filter over preprocessed boundary masks.
#[derive(Debug, Clone)]
pub struct BoundaryFilter {
    intervals: Vec<Interval>,
    table: Vec<Word>,
}

impl BoundaryFilter {
    /// Compile the 4096-entry table for `pattern`.
    ///
    /// Returns `Err(InvalidPattern)` for fewer than 2 notes and
    /// `Err(WidthOverflow)` for more than [`MAX_BOUNDARY_PATTERN`].
    pub fn new(pattern: &[Pitch]) -> Result<Self, MatchError> {
        check_pattern(pattern, 2, MAX_BOUNDARY_PATTERN)?;
        let intervals = pattern_intervals(pattern)?;
        let width = intervals.len();

        let by_class = interval_table(&intervals, PITCH_CLASSES, |i| Some(pitch_class(i)));
        let table = (0..BOUNDARY_TABLE_SIZE)
            .map(|mask| {
                (0..PITCH_CLASSES)
                    .filter(|&k| mask & (1 << k) == 0)
                    .fold(low_mask(width), |acc, k| acc & by_class[k])
            })
            .collect();

        log::debug!("compiled boundary table for a {}-note pattern", pattern.len());
        Ok(BoundaryFilter { intervals, table })
    }

    /// The pattern's literal intervals.
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Start indices of candidate windows. Bits above the twelfth are ignored.
    pub fn candidates(&self, boundaries: &[BoundaryMask]) -> Vec<usize> {
        let width = self.intervals.len();
        let mut automaton = ShiftOr::new(width);
        let mut starts = Vec::new();
        for (j, &mask) in boundaries.iter().enumerate() {
            let symbol = self.table[usize::from(mask) & (BOUNDARY_TABLE_SIZE - 1)];
            if automaton.step(symbol) {
                starts.push(j + 1 - width);
            }
        }
        starts
    }
}

/// How note-pair differences are keyed in an [`IntervalFilter`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum IntervalKind {
    /// Signed semitone differences: transposition invariant, octave sensitive.
    Literal,
    /// Differences mod 12: transposition invariant and octave equivalent.
    Reduced,
}

impl IntervalKind {
    fn slots(self) -> usize {
        match self {
            IntervalKind::Literal => LITERAL_TABLE_SIZE,
            IntervalKind::Reduced => PITCH_CLASSES,
        }
    }

    #[inline]
    fn slot(self, interval: Interval) -> Option<usize> {
        match self {
            IntervalKind::Literal => usize::try_from(interval + Interval::from(MAX_PITCH)).ok(),
            IntervalKind::Reduced => Some(pitch_class(interval)),
        }
    }

    /// Note comparison that confirms this filter's candidates.
    pub fn equivalence(self) -> Equivalence {
        match self {
            IntervalKind::Literal => Equivalence::Literal,
            IntervalKind::Reduced => Equivalence::Octave,
        }
    }
}

/// Filter on the differences between every note pair across each boundary.
#[derive(Debug, Clone)]
pub struct IntervalFilter {
    kind: IntervalKind,
    intervals: Vec<Interval>,
    table: Vec<Word>,
}

impl IntervalFilter {
    /// Compile the interval table for `pattern`.
    ///
    /// Returns `Err(InvalidPattern)` for fewer than 2 notes and
    /// `Err(WidthOverflow)` for more than [`MAX_WORD_PATTERN`].
    pub fn new(pattern: &[Pitch], kind: IntervalKind) -> Result<Self, MatchError> {
        check_pattern(pattern, 2, MAX_WORD_PATTERN)?;
        let intervals = pattern_intervals(pattern)?;
        let table = interval_table(&intervals, kind.slots(), |i| kind.slot(i));
        log::debug!("compiled {kind:?} interval table for a {}-note pattern", pattern.len());
        Ok(IntervalFilter {
            kind,
            intervals,
            table,
        })
    }

    /// Literal or reduced differences.
    pub fn kind(&self) -> IntervalKind {
        self.kind
    }

    /// The pattern's literal intervals.
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Start indices of candidate windows.
    pub fn candidates(&self, chords: &[Chord]) -> Vec<usize> {
        let width = self.intervals.len();
        let mut automaton = ShiftOr::new(width);
        let mut starts = Vec::new();
        for (j, pair) in chords.windows(2).enumerate() {
            let mut symbol = Word::MAX;
            for &next in &pair[1] {
                for &prev in &pair[0] {
                    symbol &= self.entry(Interval::from(next) - Interval::from(prev));
                }
            }
            if automaton.step(symbol) {
                starts.push(j + 1 - width);
            }
        }
        starts
    }

    #[inline]
    fn entry(&self, interval: Interval) -> Word {
        self.kind
            .slot(interval)
            .and_then(|s| self.table.get(s))
            .copied()
            .unwrap_or(Word::MAX)
    }
}

/// Exact matching without invariance; a chord matches a position when any
/// of its notes equals the pattern pitch.
#[derive(Debug, Clone)]
pub struct ExactFilter {
    len: usize,
    table: Vec<Word>,
}

impl ExactFilter {
    /// Compile the per-pitch table for `pattern`.
    ///
    /// Returns `Err(InvalidPattern)` for an empty pattern and
    /// `Err(WidthOverflow)` for more than [`MAX_WORD_PATTERN`] notes.
    pub fn new(pattern: &[Pitch]) -> Result<Self, MatchError> {
        check_pattern(pattern, 1, MAX_WORD_PATTERN)?;
        let mut table = vec![low_mask(pattern.len()); PITCH_TABLE_SIZE];
        for (k, &pitch) in pattern.iter().enumerate() {
            table[usize::from(pitch)] &= !(1 << k);
        }
        log::debug!("compiled exact table for a {}-note pattern", pattern.len());
        Ok(ExactFilter {
            len: pattern.len(),
            table,
        })
    }

    /// Notes in the pattern.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; empty patterns are rejected on construction.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Start indices of matching windows.
    pub fn candidates(&self, chords: &[Chord]) -> Vec<usize> {
        let mut automaton = ShiftOr::new(self.len);
        let mut starts = Vec::new();
        for (j, chord) in chords.iter().enumerate() {
            let symbol = chord.iter().fold(Word::MAX, |acc, &note| {
                acc & self.table.get(usize::from(note)).copied().unwrap_or(Word::MAX)
            });
            if automaton.step(symbol) {
                starts.push(j + 1 - self.len);
            }
        }
        starts
    }
}

/// Verify every candidate window, collecting confirmed matches.
pub(crate) fn confirm(
    chords: &[Chord],
    starts: &[usize],
    intervals: &[Interval],
    equivalence: Equivalence,
) -> Vec<Match> {
    let mut found = Vec::new();
    for &start in starts {
        log::trace!("verifying candidate window at chord {start}");
        verify_window(chords, start, intervals, equivalence, &mut found);
    }
    log::debug!(
        "{} candidate windows, {} verified matches",
        starts.len(),
        found.len()
    );
    found
}

/// Transposition- and octave-invariant search using preprocessed masks.
pub fn boundary_search(
    chords: &[Chord],
    boundaries: &[BoundaryMask],
    pattern: &[Pitch],
) -> Result<Vec<Match>, MatchError> {
    check_chords(chords)?;
    check_boundaries(chords.len(), boundaries)?;
    let filter = BoundaryFilter::new(pattern)?;
    let starts = filter.candidates(boundaries);
    Ok(confirm(chords, &starts, filter.intervals(), Equivalence::Octave))
}

/// Transposition-invariant, octave-sensitive search on literal intervals.
pub fn literal_search(chords: &[Chord], pattern: &[Pitch]) -> Result<Vec<Match>, MatchError> {
    interval_search(chords, pattern, IntervalKind::Literal)
}

/// Transposition- and octave-invariant search on intervals mod 12.
pub fn reduced_search(chords: &[Chord], pattern: &[Pitch]) -> Result<Vec<Match>, MatchError> {
    interval_search(chords, pattern, IntervalKind::Reduced)
}

fn interval_search(
    chords: &[Chord],
    pattern: &[Pitch],
    kind: IntervalKind,
) -> Result<Vec<Match>, MatchError> {
    check_chords(chords)?;
    let filter = IntervalFilter::new(pattern, kind)?;
    let starts = filter.candidates(chords);
    Ok(confirm(chords, &starts, filter.intervals(), kind.equivalence()))
}

/// Exact search; windows only, without note detail.
pub fn exact_search(chords: &[Chord], pattern: &[Pitch]) -> Result<Vec<Match>, MatchError> {
    check_chords(chords)?;
    let filter = ExactFilter::new(pattern)?;
    Ok(filter
        .candidates(chords)
        .into_iter()
        .map(|start| Match::window(start, start + filter.len() - 1))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::preprocess;

    fn starts(found: &[Match]) -> Vec<usize> {
        found.iter().map(|m| m.start).collect()
    }

    #[test]
    fn shift_or_needs_width_steps() {
        let mut automaton = ShiftOr::new(3);
        assert!(!automaton.step(0));
        assert!(!automaton.step(0));
        assert!(automaton.step(0));
        assert!(automaton.step(0));
        assert!(!automaton.step(Word::MAX));
    }

    #[test]
    fn exact_match_scenario() {
        let chords = vec![vec![60], vec![64], vec![67]];
        let found = exact_search(&chords, &[60, 64, 67]).unwrap();
        assert_eq!(found, vec![Match::window(0, 2)]);

        let masks = preprocess(&chords).unwrap();
        let verified = boundary_search(&chords, &masks, &[60, 64, 67]).unwrap();
        assert_eq!(verified, vec![Match::with_notes(0, vec![60, 64, 67])]);
    }

    #[test]
    fn transposed_scenario() {
        let chords = vec![vec![60], vec![65], vec![69]];
        let pattern = [62, 67, 71];
        let masks = preprocess(&chords).unwrap();
        let found = boundary_search(&chords, &masks, &pattern).unwrap();
        assert_eq!(found, vec![Match::with_notes(0, vec![60, 65, 69])]);
        assert!(exact_search(&chords, &pattern).unwrap().is_empty());
    }

    #[test]
    fn octave_scenario() {
        let chords = vec![vec![60], vec![76]];
        let pattern = [60, 64];
        assert_eq!(starts(&reduced_search(&chords, &pattern).unwrap()), vec![0]);
        assert!(literal_search(&chords, &pattern).unwrap().is_empty());
        let filter = IntervalFilter::new(&pattern, IntervalKind::Literal).unwrap();
        assert!(filter.candidates(&chords).is_empty());
    }

    #[test]
    fn exact_filter_matches_any_chord_note() {
        let chords = vec![vec![48, 60], vec![55, 64, 72], vec![60], vec![64, 67], vec![67]];
        let filter = ExactFilter::new(&[60, 64]).unwrap();
        assert_eq!(filter.candidates(&chords), vec![0, 2]);
        let single = ExactFilter::new(&[67]).unwrap();
        assert_eq!(single.candidates(&chords), vec![3, 4]);
    }

    #[test]
    fn boundary_and_reduced_filters_agree() {
        let chords = vec![
            vec![60, 64, 67],
            vec![62, 65, 69],
            vec![59, 62, 67],
            vec![60, 64, 67],
            vec![57, 60, 64],
            vec![53, 57, 60],
            vec![55, 59, 62],
        ];
        let masks = preprocess(&chords).unwrap();
        for pattern in [&[64, 65, 67][..], &[67, 69, 67, 64], &[60, 62, 59, 60, 57]] {
            let boundary = BoundaryFilter::new(pattern).unwrap();
            let reduced = IntervalFilter::new(pattern, IntervalKind::Reduced).unwrap();
            assert_eq!(boundary.candidates(&masks), reduced.candidates(&chords));
        }
    }

    #[test]
    fn candidates_are_supersets_of_matches() {
        // every boundary offers a major third, but no single voice climbs twice
        let chords = vec![vec![60], vec![64, 50], vec![54]];
        let filter = IntervalFilter::new(&[60, 64, 68], IntervalKind::Literal).unwrap();
        assert_eq!(filter.candidates(&chords), vec![0]);
        assert!(literal_search(&chords, &[60, 64, 68]).unwrap().is_empty());
    }

    #[test]
    fn widest_patterns_fit() {
        let pattern: Vec<Pitch> = (0..MAX_BOUNDARY_PATTERN)
            .map(|i| 60 + (i * 7 % 12) as Pitch)
            .collect();
        let chords: Vec<Chord> = pattern.iter().map(|&p| vec![p]).collect();
        let masks = preprocess(&chords).unwrap();
        assert_eq!(starts(&boundary_search(&chords, &masks, &pattern).unwrap()), vec![0]);

        let pattern: Vec<Pitch> = (0..MAX_WORD_PATTERN)
            .map(|i| 40 + (i * 5 % 31) as Pitch)
            .collect();
        let chords: Vec<Chord> = pattern.iter().map(|&p| vec![p]).collect();
        assert_eq!(starts(&exact_search(&chords, &pattern).unwrap()), vec![0]);
        assert_eq!(starts(&literal_search(&chords, &pattern).unwrap()), vec![0]);
        assert_eq!(starts(&reduced_search(&chords, &pattern).unwrap()), vec![0]);
    }

    #[test]
    fn one_past_the_width_is_rejected() {
        let long = vec![60; MAX_BOUNDARY_PATTERN + 1];
        assert_eq!(
            BoundaryFilter::new(&long).unwrap_err(),
            MatchError::WidthOverflow { len: 13, max: 12 }
        );
        let longer = vec![60; MAX_WORD_PATTERN + 1];
        assert_eq!(
            ExactFilter::new(&longer).unwrap_err(),
            MatchError::WidthOverflow { len: 65, max: 64 }
        );
        assert_eq!(
            IntervalFilter::new(&longer, IntervalKind::Reduced).unwrap_err(),
            MatchError::WidthOverflow { len: 65, max: 64 }
        );
    }

    #[test]
    fn short_patterns_are_rejected() {
        assert_eq!(
            BoundaryFilter::new(&[60]).unwrap_err(),
            MatchError::InvalidPattern { len: 1, min: 2 }
        );
        assert_eq!(
            ExactFilter::new(&[]).unwrap_err(),
            MatchError::InvalidPattern { len: 0, min: 1 }
        );
    }

    #[test]
    fn searches_check_their_inputs() {
        let chords = vec![vec![60], vec![64]];
        assert_eq!(
            boundary_search(&chords, &[], &[60, 64]),
            Err(MatchError::BoundaryCountMismatch { expected: 1, got: 0 })
        );
        assert_eq!(
            reduced_search(&[vec![60], vec![]], &[60, 64]),
            Err(MatchError::EmptyChord { index: 1 })
        );
    }
}
