//! # chord_search
//!
//! Find a monophonic melody inside a polyphonic score with bit-parallel
//! filters, optionally allowing transposition and octave equivalence.
//!
//! A score is a sequence of chords (pitches sounding together, base note
//! first). Filters stream over it with one machine word of automaton state
//! and propose candidate windows; verification walks the notes of each
//! candidate and reports the matched pitches.
//!
//! ## Example
//! ```rust
//! use chord_search::{Algorithm, Search};
//!
//! fn run() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1) Chords from a score, base note first
//!     let chords = vec![vec![48, 60], vec![53, 65], vec![57, 69]];
//!
//!     // 2) Compile the query once
//!     let search = Search::builder()
//!         .pattern(&[62, 67, 71])
//!         .algorithm(Algorithm::BoundaryMask)
//!         .build()?;
//!
//!     // 3) Run it against any number of scores
//!     for hit in search.find(&chords)? {
//!         println!("chords {}..={}: {:?}", hit.start, hit.end, hit.notes);
//!     }
//!
//!     Ok(())
//! }
//! # run().unwrap();
//! ```
//!
//! ## Features
//! - `serde`: `Serialize`/`Deserialize` for [`Match`]

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rust_2018_idioms)]
#![deny(clippy::all)]

/// Bit-vector primitives.
pub use bits::{circular_shift, Word, ONES, PITCH_CLASSES, WORD_BITS};

/// Boundary preprocessing.
pub use boundary::{boundary_mask, preprocess, BoundaryMask};

/// Bit-parallel filters and their search entry points.
pub use filter::{
    boundary_search, exact_search, literal_search, reduced_search, BoundaryFilter, ExactFilter,
    IntervalFilter, IntervalKind, MAX_BOUNDARY_PATTERN, MAX_WORD_PATTERN,
};

/// Pattern interval extraction.
pub use pattern::pattern_intervals;

/// Score model and errors.
pub use score::{pitch_class, Chord, Interval, Match, MatchError, Pitch, MAX_PITCH};

/// Configured, reusable queries.
pub use search::{Algorithm, Search, SearchBuilder};

/// Note-level verification and brute-force matchers.
pub use verify::{
    direct_match, direct_match_accelerated, direct_match_with, verify, verify_with, Equivalence,
};

/// Word constants and circular shift.
pub mod bits;

/// Chord boundary masks.
pub mod boundary;

/// Shift-Or filters.
pub mod filter;

/// Pattern intervals.
pub mod pattern;

/// Pitches, chords, matches and errors.
pub mod score;

/// Builder-configured search.
pub mod search;

/// Verification walks and direct matchers.
pub mod verify;
