//! Boundary preprocessing
//!
//! Summarises each pair of adjacent chords as a 12-bit mask of the
//! pitch-class intervals that can join them. A set bit `i` means no note of
//! the left chord reaches a note of the right chord by moving `i` semitones
//! (mod 12). The masks depend on the chord sequence alone, so they can be
//! computed once and cached next to it.

use crate::bits::{circular_shift, Word, ONES, PITCH_CLASSES};
use crate::score::{check_chords, pitch_class, Chord, Interval, MatchError, Pitch};

/// Interval mask for one chord boundary. Only the low 12 bits are used.
pub type BoundaryMask = u16;

/// Compute the mask for every adjacent chord pair.
///
/// Returns `chords.len() - 1` masks, so a single chord yields none.
pub fn preprocess(chords: &[Chord]) -> Result<Vec<BoundaryMask>, MatchError> {
    check_chords(chords)?;
    let masks: Vec<BoundaryMask> = chords
        .windows(2)
        .map(|pair| boundary_mask(&pair[0], &pair[1]))
        .collect();
    log::debug!("preprocessed {} chord boundaries", masks.len());
    Ok(masks)
}

/// Mask for the boundary between `left` and `right`.
///
/// Intervals are first taken from `left[0]`, the base note, to every note of
/// `right`. Rotating that mask by each other left note's offset from the base
/// re-expresses it relative to that note; the AND of all rotations leaves a
/// bit set only where no left note reaches the right chord. An empty chord
/// yields [`ONES`].
pub fn boundary_mask(left: &[Pitch], right: &[Pitch]) -> BoundaryMask {
    let Some((&base, others)) = left.split_first() else {
        return ONES as BoundaryMask;
    };

    let mut reach: Word = ONES;
    for &note in right {
        reach &= !(1 << offset(base, note));
    }

    let mut shifts: Word = ONES;
    for &note in others {
        shifts &= circular_shift(reach, PITCH_CLASSES, offset(base, note));
    }

    (reach & shifts) as BoundaryMask
}

/// Check that cached masks belong to a sequence of `chords` chords.
pub(crate) fn check_boundaries(chords: usize, masks: &[BoundaryMask]) -> Result<(), MatchError> {
    let expected = chords.saturating_sub(1);
    if masks.len() != expected {
        return Err(MatchError::BoundaryCountMismatch {
            expected,
            got: masks.len(),
        });
    }
    match masks.iter().position(|&m| Word::from(m) > ONES) {
        Some(index) => Err(MatchError::InvalidBoundaryMask {
            index,
            mask: masks[index],
        }),
        None => Ok(()),
    }
}

#[inline]
fn offset(base: Pitch, note: Pitch) -> usize {
    pitch_class(Interval::from(note) - Interval::from(base))
}
