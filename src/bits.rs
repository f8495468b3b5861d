//! Bit-vector primitives
//!
//! Word-sized constants and the circular shift used by boundary preprocessing.

/// Machine word holding one automaton state.
pub type Word = u64;

/// Width of [`Word`] in bits.
pub const WORD_BITS: usize = Word::BITS as usize;

/// Size of the pitch-class space (notes per octave).
pub const PITCH_CLASSES: usize = 12;

/// All twelve pitch-class bits set.
pub const ONES: Word = (1 << PITCH_CLASSES) - 1;

/// Mask with the low `width` bits set. `width` may be anything in `0..=WORD_BITS`.
#[inline]
pub const fn low_mask(width: usize) -> Word {
    if width >= WORD_BITS {
        Word::MAX
    } else {
        (1 << width) - 1
    }
}

/// Rotate the low `width` bits of `value` right by `amount`.
///
/// Bits leaving the low end re-enter at bit `width - 1`. Bits of `value` above
/// `width` are discarded.
///
/// # Panics
/// If `width` is zero or larger than [`WORD_BITS`], or if `amount >= width`.
#[inline]
pub fn circular_shift(value: Word, width: usize, amount: usize) -> Word {
    assert!(
        (1..=WORD_BITS).contains(&width),
        "rotation width {width} outside 1..={WORD_BITS}"
    );
    assert!(amount < width, "rotation by {amount} over a {width}-bit word");

    let value = value & low_mask(width);
    if amount == 0 {
        return value;
    }
    ((value << (width - amount)) & low_mask(width)) | (value >> amount)
}
