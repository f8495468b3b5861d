//! Score model
//!
//! Pitches, chords and match records shared by every matcher, plus the
//! error type and the input checks run before any table is built.

use thiserror::Error;

use crate::bits::PITCH_CLASSES;

/// A note identity, 0..=127.
pub type Pitch = u8;

/// Literal difference between two pitches.
pub type Interval = i32;

/// Notes sounding at one time step. Element 0 is the base note.
pub type Chord = Vec<Pitch>;

/// Highest accepted pitch value.
pub const MAX_PITCH: Pitch = 127;

/// Pitch class of a (possibly out-of-range) running pitch.
#[inline]
pub fn pitch_class(pitch: Interval) -> usize {
    pitch.rem_euclid(PITCH_CLASSES as Interval) as usize
}

/// An occurrence of the pattern in a chord sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Match {
    /// Index of the first chord of the window.
    pub start: usize,
    /// Index of the last chord of the window (inclusive).
    pub end: usize,
    /// Matched pitches, one per chord of the window, when the match was
    /// confirmed note by note.
    pub notes: Option<Vec<Pitch>>,
}

impl Match {
    /// A bare window with no note detail.
    pub fn window(start: usize, end: usize) -> Self {
        Match {
            start,
            end,
            notes: None,
        }
    }

    /// A window with its matched pitches.
    pub fn with_notes(start: usize, notes: Vec<Pitch>) -> Self {
        Match {
            start,
            end: start + notes.len().saturating_sub(1),
            notes: Some(notes),
        }
    }
}

/// Errors raised when a query cannot be run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// The pattern has fewer notes than the algorithm needs.
    #[error("pattern too short: {len} notes, at least {min} required")]
    InvalidPattern {
        /// Notes in the pattern.
        len: usize,
        /// Minimum accepted length.
        min: usize,
    },

    /// The pattern does not fit in the automaton word.
    #[error("pattern of {len} notes exceeds the automaton limit of {max}")]
    WidthOverflow {
        /// Notes in the pattern.
        len: usize,
        /// Longest accepted pattern.
        max: usize,
    },

    /// The chord sequence has no chords.
    #[error("chord sequence is empty")]
    EmptySequence,

    /// A chord has no notes.
    #[error("chord {index} has no notes")]
    EmptyChord {
        /// Position of the chord in the sequence.
        index: usize,
    },

    /// A pitch lies above 127.
    #[error("pitch {pitch} outside 0..=127")]
    PitchOutOfRange {
        /// The offending pitch.
        pitch: Pitch,
    },

    /// Preprocessed data does not belong to this chord sequence.
    #[error("expected {expected} boundary masks, got {got}")]
    BoundaryCountMismatch {
        /// One mask per adjacent chord pair.
        expected: usize,
        /// Masks supplied.
        got: usize,
    },

    /// A boundary mask has bits above the twelve pitch classes.
    #[error("boundary mask {mask:#x} at boundary {index} exceeds 12 bits")]
    InvalidBoundaryMask {
        /// Boundary position.
        index: usize,
        /// The offending mask.
        mask: u16,
    },
}

/// Reject empty sequences, empty chords and out-of-range pitches.
pub(crate) fn check_chords(chords: &[Chord]) -> Result<(), MatchError> {
    if chords.is_empty() {
        return Err(MatchError::EmptySequence);
    }
    for (index, chord) in chords.iter().enumerate() {
        if chord.is_empty() {
            return Err(MatchError::EmptyChord { index });
        }
        check_pitches(chord)?;
    }
    Ok(())
}

/// Reject patterns outside `min..=max` notes or with out-of-range pitches.
pub(crate) fn check_pattern(pattern: &[Pitch], min: usize, max: usize) -> Result<(), MatchError> {
    if pattern.len() < min {
        return Err(MatchError::InvalidPattern {
            len: pattern.len(),
            min,
        });
    }
    if pattern.len() > max {
        return Err(MatchError::WidthOverflow {
            len: pattern.len(),
            max,
        });
    }
    check_pitches(pattern)
}

fn check_pitches(pitches: &[Pitch]) -> Result<(), MatchError> {
    match pitches.iter().find(|&&p| p > MAX_PITCH) {
        Some(&pitch) => Err(MatchError::PitchOutOfRange { pitch }),
        None => Ok(()),
    }
}
