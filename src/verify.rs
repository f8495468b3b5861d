//! Verification
//!
//! Note-level walks that confirm candidate windows and recover the matched
//! pitches, and the brute-force matchers built on the same walk.
//!
//! A walk starts from one anchor note and advances a running pitch by each
//! literal pattern interval, so octave placement is carried along the path.
//! At every step the first note of the next chord equivalent to the running
//! pitch is recorded; chord note order therefore decides which pitches are
//! reported when a chord holds the same class in several octaves.

use crate::boundary::{check_boundaries, BoundaryMask};
use crate::pattern::pattern_intervals;
use crate::score::{
    check_chords, check_pattern, pitch_class, Chord, Interval, Match, MatchError, Pitch,
};

/// How a chord note is compared to the running pitch of a walk.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Equivalence {
    /// Same pitch class (octave equivalence).
    #[default]
    Octave,
    /// Same pitch.
    Literal,
}

impl Equivalence {
    #[inline]
    fn accepts(self, note: Pitch, running: Interval) -> bool {
        match self {
            Equivalence::Octave => pitch_class(Interval::from(note)) == pitch_class(running),
            Equivalence::Literal => Interval::from(note) == running,
        }
    }
}

/// Confirm the window starting at `start` under octave equivalence.
///
/// Every note of `chords[start]` is tried as an anchor; each anchor that
/// completes the walk gives one [`Match`] carrying the matched pitches.
/// Windows running past the end of the sequence give no matches.
pub fn verify(chords: &[Chord], start: usize, pattern: &[Pitch]) -> Result<Vec<Match>, MatchError> {
    verify_with(chords, start, pattern, Equivalence::Octave)
}

/// [`verify`] with an explicit note comparison.
pub fn verify_with(
    chords: &[Chord],
    start: usize,
    pattern: &[Pitch],
    equivalence: Equivalence,
) -> Result<Vec<Match>, MatchError> {
    check_chords(chords)?;
    check_pattern(pattern, 2, usize::MAX)?;
    let intervals = pattern_intervals(pattern)?;
    let mut found = Vec::new();
    verify_window(chords, start, &intervals, equivalence, &mut found);
    Ok(found)
}

/// Walk every anchor of one window, appending confirmed matches to `out`.
pub(crate) fn verify_window(
    chords: &[Chord],
    start: usize,
    intervals: &[Interval],
    equivalence: Equivalence,
    out: &mut Vec<Match>,
) {
    let Some(window) = window(chords, start, intervals.len() + 1) else {
        return;
    };
    for &anchor in &window[0] {
        if let Some(notes) = walk(anchor, &window[1..], intervals, equivalence, |_, _| true) {
            out.push(Match::with_notes(start, notes));
        }
    }
}

/// Brute-force reference matcher under transposition and octave invariance.
///
/// Scans every boundary and every pair of notes across it, so overlapping
/// occurrences are all reported, one per starting note pair.
pub fn direct_match(chords: &[Chord], pattern: &[Pitch]) -> Result<Vec<Match>, MatchError> {
    direct_match_with(chords, pattern, Equivalence::Octave)
}

/// [`direct_match`] with an explicit note comparison.
pub fn direct_match_with(
    chords: &[Chord],
    pattern: &[Pitch],
    equivalence: Equivalence,
) -> Result<Vec<Match>, MatchError> {
    check_chords(chords)?;
    check_pattern(pattern, 2, usize::MAX)?;
    let intervals = pattern_intervals(pattern)?;
    let (&first, rest) = intervals
        .split_first()
        .ok_or(MatchError::InvalidPattern { len: pattern.len(), min: 2 })?;

    let mut found = Vec::new();
    for start in window_starts(chords.len(), pattern.len()) {
        let window = &chords[start..start + pattern.len()];
        for &current in &window[1] {
            for &previous in &window[0] {
                if !equivalence.accepts(current, Interval::from(previous) + first) {
                    continue;
                }
                if let Some(tail) = walk(current, &window[2..], rest, equivalence, |_, _| true) {
                    let mut notes = Vec::with_capacity(pattern.len());
                    notes.push(previous);
                    notes.extend(tail);
                    found.push(Match::with_notes(start, notes));
                }
            }
        }
    }
    log::debug!("direct match over {} chords: {} matches", chords.len(), found.len());
    Ok(found)
}

/// Anchor walk that also consults the boundary masks.
///
/// A step is abandoned as soon as the boundary mask marks its interval class
/// as impossible; otherwise the next chord must still hold a note of the
/// running pitch class. The masks are trusted as given, so stale or foreign
/// masks change the result. [`direct_match`] stays the reference matcher.
pub fn direct_match_accelerated(
    chords: &[Chord],
    boundaries: &[BoundaryMask],
    pattern: &[Pitch],
) -> Result<Vec<Match>, MatchError> {
    check_chords(chords)?;
    check_pattern(pattern, 2, usize::MAX)?;
    check_boundaries(chords.len(), boundaries)?;
    let intervals = pattern_intervals(pattern)?;

    let mut found = Vec::new();
    for start in window_starts(chords.len(), pattern.len()) {
        let window = &chords[start..start + pattern.len()];
        let open = |step: usize, interval: Interval| {
            boundaries[start + step] & (1 << pitch_class(interval)) == 0
        };
        for &anchor in &window[0] {
            if let Some(notes) = walk(anchor, &window[1..], &intervals, Equivalence::Octave, open) {
                found.push(Match::with_notes(start, notes));
            }
        }
    }
    log::debug!(
        "accelerated direct match over {} chords: {} matches",
        chords.len(),
        found.len()
    );
    Ok(found)
}

/// Follow `intervals` from `anchor` through `chords`, one chord per step.
///
/// `open(step, interval)` may veto a step before the chord is searched.
fn walk(
    anchor: Pitch,
    chords: &[Chord],
    intervals: &[Interval],
    equivalence: Equivalence,
    open: impl Fn(usize, Interval) -> bool,
) -> Option<Vec<Pitch>> {
    let mut notes = Vec::with_capacity(intervals.len() + 1);
    notes.push(anchor);
    let mut running = Interval::from(anchor);
    for (step, (chord, &interval)) in chords.iter().zip(intervals).enumerate() {
        if !open(step, interval) {
            return None;
        }
        running += interval;
        let &note = chord.iter().find(|&&n| equivalence.accepts(n, running))?;
        notes.push(note);
    }
    Some(notes)
}

fn window(chords: &[Chord], start: usize, len: usize) -> Option<&[Chord]> {
    chords.get(start..start.checked_add(len)?)
}

/// Every start index whose window of `len` chords fits in the sequence.
fn window_starts(chords: usize, len: usize) -> std::ops::Range<usize> {
    0..(chords + 1).saturating_sub(len)
}
