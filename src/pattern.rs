//! Pattern intervals

use crate::score::{Interval, MatchError, Pitch};

/// Consecutive literal differences between the pattern's pitches.
///
/// A pattern of `m` notes yields `m - 1` intervals. Patterns shorter than two
/// notes have no intervals and are rejected with [`MatchError::InvalidPattern`].
pub fn pattern_intervals(pattern: &[Pitch]) -> Result<Vec<Interval>, MatchError> {
    if pattern.len() < 2 {
        return Err(MatchError::InvalidPattern {
            len: pattern.len(),
            min: 2,
        });
    }
    Ok(pattern
        .windows(2)
        .map(|w| Interval::from(w[1]) - Interval::from(w[0]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_interval_per_step() {
        assert_eq!(pattern_intervals(&[60, 65, 69]).unwrap(), vec![5, 4]);
        assert_eq!(pattern_intervals(&[72, 60]).unwrap(), vec![-12]);
        assert_eq!(pattern_intervals(&[0, 127, 0, 64]).unwrap().len(), 3);
    }

    #[test]
    fn short_patterns_fail() {
        assert_eq!(
            pattern_intervals(&[60]),
            Err(MatchError::InvalidPattern { len: 1, min: 2 })
        );
        assert!(pattern_intervals(&[]).is_err());
    }
}
