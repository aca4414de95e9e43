// ABOUTME: Step milestone detection between two consecutive daily step counts
// ABOUTME: A milestone is reported when the previous count was below it and the new one reaches it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::walking::STEP_MILESTONES;

/// Milestones reached by going from `previous` to `current` steps, ascending
#[must_use]
pub fn crossed_milestones(previous: i64, current: i64) -> Vec<i64> {
    STEP_MILESTONES
        .iter()
        .copied()
        .filter(|&milestone| previous < milestone && current >= milestone)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_crossing() {
        assert_eq!(crossed_milestones(900, 1_000), vec![1_000]);
        assert_eq!(crossed_milestones(4_999, 5_200), vec![5_000]);
    }

    #[test]
    fn test_multiple_crossings_in_one_update() {
        assert_eq!(
            crossed_milestones(0, 20_000),
            vec![1_000, 5_000, 10_000, 20_000]
        );
    }

    #[test]
    fn test_already_passed_is_not_repeated() {
        assert!(crossed_milestones(1_000, 1_500).is_empty());
        assert!(crossed_milestones(12_000, 12_000).is_empty());
    }

    #[test]
    fn test_going_backwards_reports_nothing() {
        assert!(crossed_milestones(6_000, 0).is_empty());
    }
}
