//! Configured search
//!
//! Compile a pattern once for a chosen algorithm and run it against any
//! number of chord sequences.

use std::fmt::Display;

use crate::boundary::{check_boundaries, preprocess, BoundaryMask};
use crate::filter::{confirm, BoundaryFilter, ExactFilter, IntervalFilter, IntervalKind};
use crate::score::{check_chords, Chord, Match, MatchError, Pitch};
use crate::verify::Equivalence;

/// Matching algorithms, by the invariances they provide.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    /// Transposition and octave invariant, driven by boundary masks.
    #[default]
    BoundaryMask,
    /// Transposition and octave invariant, intervals mod 12.
    ReducedInterval,
    /// Transposition invariant, octave sensitive.
    LiteralInterval,
    /// No invariance.
    Exact,
}

impl Algorithm {
    /// Whether the algorithm reads preprocessed boundary masks.
    pub fn needs_boundaries(self) -> bool {
        matches!(self, Algorithm::BoundaryMask)
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Builder for [`Search`].
#[derive(Debug, Clone)]
pub struct SearchBuilder {
    pattern: Vec<Pitch>,
    algorithm: Algorithm,
    verify: bool,
}

impl SearchBuilder {
    /// Empty pattern, [`Algorithm::BoundaryMask`], verification on.
    pub fn new() -> Self {
        SearchBuilder {
            pattern: Vec::new(),
            algorithm: Algorithm::default(),
            verify: true,
        }
    }

    /// Set the query melody, in onset order.
    pub fn pattern(mut self, pattern: &[Pitch]) -> Self {
        self.pattern = pattern.to_vec();
        self
    }

    /// Choose the matching algorithm.
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Confirm candidates note by note (default). When off, the interval
    /// algorithms return their raw candidate windows without notes.
    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Validate the pattern and compile the filter.
    pub fn build(self) -> Result<Search, MatchError> {
        let filter = match self.algorithm {
            Algorithm::BoundaryMask => Compiled::Boundary(BoundaryFilter::new(&self.pattern)?),
            Algorithm::ReducedInterval => {
                Compiled::Interval(IntervalFilter::new(&self.pattern, IntervalKind::Reduced)?)
            }
            Algorithm::LiteralInterval => {
                Compiled::Interval(IntervalFilter::new(&self.pattern, IntervalKind::Literal)?)
            }
            Algorithm::Exact => Compiled::Exact(ExactFilter::new(&self.pattern)?),
        };
        log::debug!(
            "built {} search for {} notes (verify: {})",
            self.algorithm,
            self.pattern.len(),
            self.verify
        );
        Ok(Search {
            algorithm: self.algorithm,
            pattern: self.pattern,
            verify: self.verify,
            filter,
        })
    }
}

impl Default for SearchBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
enum Compiled {
    Boundary(BoundaryFilter),
    Interval(IntervalFilter),
    Exact(ExactFilter),
}

/// A compiled query.
#[derive(Debug, Clone)]
pub struct Search {
    algorithm: Algorithm,
    pattern: Vec<Pitch>,
    verify: bool,
    filter: Compiled,
}

impl Search {
    /// Start configuring a search.
    pub fn builder() -> SearchBuilder {
        SearchBuilder::new()
    }

    /// The configured algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The query melody.
    pub fn pattern(&self) -> &[Pitch] {
        &self.pattern
    }

    /// Search `chords`, computing boundary masks first when the algorithm
    /// needs them.
    pub fn find(&self, chords: &[Chord]) -> Result<Vec<Match>, MatchError> {
        if self.algorithm.needs_boundaries() {
            let boundaries = preprocess(chords)?;
            self.find_with_boundaries(chords, &boundaries)
        } else {
            self.find_with_boundaries(chords, &[])
        }
    }

    /// Search `chords` with cached boundary masks. The masks are only read,
    /// and only checked, by [`Algorithm::BoundaryMask`].
    pub fn find_with_boundaries(
        &self,
        chords: &[Chord],
        boundaries: &[BoundaryMask],
    ) -> Result<Vec<Match>, MatchError> {
        check_chords(chords)?;
        let (starts, intervals, equivalence) = match &self.filter {
            Compiled::Boundary(filter) => {
                check_boundaries(chords.len(), boundaries)?;
                (filter.candidates(boundaries), filter.intervals(), Equivalence::Octave)
            }
            Compiled::Interval(filter) => (
                filter.candidates(chords),
                filter.intervals(),
                filter.kind().equivalence(),
            ),
            Compiled::Exact(filter) => {
                let len = filter.len();
                return Ok(filter
                    .candidates(chords)
                    .into_iter()
                    .map(|start| Match::window(start, start + len - 1))
                    .collect());
            }
        };

        if self.verify {
            Ok(confirm(chords, &starts, intervals, equivalence))
        } else {
            let span = intervals.len();
            Ok(starts
                .into_iter()
                .map(|start| Match::window(start, start + span))
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let search = Search::builder().pattern(&[60, 64, 67]).build().unwrap();
        assert_eq!(search.algorithm(), Algorithm::BoundaryMask);
        assert_eq!(search.pattern(), &[60, 64, 67]);
        assert!(search.verify);
    }

    #[test]
    fn missing_pattern_is_rejected() {
        assert_eq!(
            Search::builder().build().unwrap_err(),
            MatchError::InvalidPattern { len: 0, min: 2 }
        );
        assert_eq!(
            Search::builder().algorithm(Algorithm::Exact).build().unwrap_err(),
            MatchError::InvalidPattern { len: 0, min: 1 }
        );
    }

    #[test]
    fn computes_masks_on_demand() {
        let chords = vec![vec![55, 62], vec![60, 67], vec![64]];
        let search = Search::builder().pattern(&[50, 55, 59]).build().unwrap();
        let masks = preprocess(&chords).unwrap();
        assert_eq!(
            search.find(&chords).unwrap(),
            search.find_with_boundaries(&chords, &masks).unwrap()
        );
        assert_eq!(
            search.find(&chords).unwrap(),
            vec![Match::with_notes(0, vec![55, 60, 64])]
        );
    }

    #[test]
    fn raw_candidates_without_verification() {
        let chords = vec![vec![60], vec![64, 50], vec![54]];
        let raw = Search::builder()
            .pattern(&[60, 64, 68])
            .algorithm(Algorithm::LiteralInterval)
            .verify(false)
            .build()
            .unwrap();
        assert_eq!(raw.find(&chords).unwrap(), vec![Match::window(0, 2)]);

        let verified = Search::builder()
            .pattern(&[60, 64, 68])
            .algorithm(Algorithm::LiteralInterval)
            .build()
            .unwrap();
        assert!(verified.find(&chords).unwrap().is_empty());
    }

    #[test]
    fn exact_ignores_boundaries() {
        let chords = vec![vec![60], vec![64], vec![67]];
        let search = Search::builder()
            .pattern(&[64, 67])
            .algorithm(Algorithm::Exact)
            .build()
            .unwrap();
        assert_eq!(
            search.find_with_boundaries(&chords, &[]).unwrap(),
            vec![Match::window(1, 2)]
        );
    }
}
