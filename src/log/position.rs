//! Positional arithmetic shared by log queries and mutations.
//!
//! Every positional operation names a reference entry at `index` and a
//! `relative_position`; the resolved target is their sum. Each operation
//! accepts a different inclusive range of targets.

use crate::error::LogError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A positional operation on the log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Before,
    After,
    Truncate,
    Rollback,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Before => "before",
            Operation::After => "after",
            Operation::Truncate => "truncate",
            Operation::Rollback => "rollback",
        }
    }

    /// Inclusive `(min, max)` targets for a reference entry at `index` in a
    /// log of `len` entries.
    pub fn valid_targets(self, index: usize, len: usize) -> (isize, isize) {
        let index = to_isize(index);
        let len = to_isize(len);
        match self {
            // Looks backward from (or exactly at) the reference entry.
            Operation::Before => (0, index),
            Operation::After | Operation::Rollback => (-1, len - 1),
            Operation::Truncate => (0, len),
        }
    }

    /// Resolve `index + relative_position` and check it against this
    /// operation's valid range.
    pub fn resolve<T>(
        self,
        index: usize,
        relative_position: isize,
        len: usize,
    ) -> Result<isize, LogError<T>> {
        let target = to_isize(index).saturating_add(relative_position);
        let (min, max) = self.valid_targets(index, len);

        if target < min || target > max {
            return Err(LogError::PositionOutOfRange {
                operation: self,
                relative_position,
                target,
                min,
                max,
            });
        }

        Ok(target)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn to_isize(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    type Res = Result<isize, LogError<()>>;

    #[test]
    fn test_before_only_looks_backward() {
        let ok: Res = Operation::Before.resolve(2, 0, 3);
        assert_eq!(ok, Ok(2));
        let ok: Res = Operation::Before.resolve(2, -2, 3);
        assert_eq!(ok, Ok(0));

        let low: Res = Operation::Before.resolve(2, -3, 3);
        assert!(low.unwrap_err().is_too_low());
        let high: Res = Operation::Before.resolve(0, 1, 3);
        assert!(high.unwrap_err().is_too_high());
    }

    #[test]
    fn test_after_and_rollback_allow_one_before_start() {
        for op in [Operation::After, Operation::Rollback] {
            let ok: Res = op.resolve(0, -1, 3);
            assert_eq!(ok, Ok(-1));
            let ok: Res = op.resolve(0, 2, 3);
            assert_eq!(ok, Ok(2));

            let low: Res = op.resolve(0, -2, 3);
            assert!(low.unwrap_err().is_too_low());
            let high: Res = op.resolve(2, 1, 3);
            assert!(high.unwrap_err().is_too_high());
        }
    }

    #[test]
    fn test_truncate_allows_one_past_end() {
        let ok: Res = Operation::Truncate.resolve(2, 1, 3);
        assert_eq!(ok, Ok(3));

        let low: Res = Operation::Truncate.resolve(0, -1, 3);
        assert!(low.unwrap_err().is_too_low());
        let high: Res = Operation::Truncate.resolve(2, 2, 3);
        assert!(high.unwrap_err().is_too_high());
    }

    #[test]
    fn test_extreme_relative_positions_do_not_overflow() {
        let high: Res = Operation::After.resolve(2, isize::MAX, 3);
        assert!(high.unwrap_err().is_too_high());
        let low: Res = Operation::Rollback.resolve(0, isize::MIN, 3);
        assert!(low.unwrap_err().is_too_low());
    }

    #[test]
    fn test_display_names() {
        let names: Vec<String> = [
            Operation::Before,
            Operation::After,
            Operation::Truncate,
            Operation::Rollback,
        ]
        .iter()
        .map(|op| op.to_string())
        .collect();
        assert_eq!(names, vec!["before", "after", "truncate", "rollback"]);
        assert_eq!(
            serde_json::to_string(&Operation::Rollback).unwrap(),
            "\"rollback\""
        );
    }

    #[test]
    fn test_error_reports_bounds() {
        let err: LogError<()> = Operation::Truncate.resolve(1, 5, 3).unwrap_err();
        assert_eq!(
            err,
            LogError::PositionOutOfRange {
                operation: Operation::Truncate,
                relative_position: 5,
                target: 6,
                min: 0,
                max: 3,
            }
        );
        assert_eq!(
            err.to_string(),
            "Relative position 5 out of range for truncate: target 6 not in [0, 3]"
        );
    }
}
