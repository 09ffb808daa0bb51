// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! This module provides the options of the merge-and-shrink algorithm. They
//! are gathered in one struct built with `MergeAndShrinkOptionsBuilder`;
//! every option has a default so that only the relevant ones need to be set.
//!
//! ```
//! # use mascp::*;
//! let options = MergeAndShrinkOptionsBuilder::default()
//!     .max_states(1000_usize)
//!     .target_num_snapshots(3_usize)
//!     .build()
//!     .unwrap();
//! let limits = options.normalize().unwrap();
//! assert_eq!(1000, limits.max_states);
//! assert_eq!(1000, limits.max_states_before_merge);
//! ```

use derive_builder::Builder;
use tracing::warn;

use crate::{Error, Verbosity};

/// The size limits used when no limit at all is given
pub const DEFAULT_MAX_STATES: usize = 50_000;

/// The point of an iteration of the main loop at which the snapshots are
/// taken.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum SnapshotMoment {
    AfterLabelReduction,
    AfterShrinking,
    AfterMerging,
    #[default]
    AfterPruning,
}

/// The options of the merge-and-shrink algorithm
#[derive(Debug, Clone, Builder)]
pub struct MergeAndShrinkOptions {
    /// The maximum size of a factor (product included)
    #[builder(default, setter(strip_option))]
    pub max_states: Option<usize>,
    /// The maximum size of a factor about to be merged
    #[builder(default, setter(strip_option))]
    pub max_states_before_merge: Option<usize>,
    /// A factor above this size is shrunk before being merged even when the
    /// product would fit in `max_states`
    #[builder(default, setter(strip_option))]
    pub threshold_before_merge: Option<usize>,

    /// Prune the states that cannot be reached from the initial state
    #[builder(default="true")]
    pub prune_unreachable_states: bool,
    /// Prune the states from which no goal state can be reached
    #[builder(default="true")]
    pub prune_irrelevant_states: bool,

    /// The time (in seconds) the main loop may spend transforming factors
    #[builder(default="f64::INFINITY")]
    pub main_loop_max_time: f64,

    /// Take a snapshot of the atomic factored transition system
    #[builder(default="true")]
    pub compute_atomic_snapshot: bool,
    /// Take a snapshot of the factored transition system the main loop ends with
    #[builder(default="true")]
    pub compute_final_snapshot: bool,
    /// The number of snapshots spread over the main loop
    #[builder(default="0")]
    pub target_num_snapshots: usize,
    /// Take a snapshot every that many iterations
    #[builder(default="0")]
    pub snapshot_each_iteration: usize,
    #[builder(default)]
    pub snapshot_moment: SnapshotMoment,

    /// How many variables may be cloned over the whole run (negative means
    /// no limit)
    #[builder(default="-1")]
    pub tokens: i64,
    /// A factor representing more than this fraction of the task variables
    /// is never cloned (negative means no limit)
    #[builder(default="-1.0")]
    pub max_clone_size_factor: f64,

    /// Leave the factors whose heuristic is zero everywhere out of snapshots
    #[builder(default="false")]
    pub filter_trivial_factors: bool,
    /// Collect the abstractions of every snapshot and compute one single cost
    /// partitioning over all of them at the end of the main loop
    #[builder(default="false")]
    pub offline_cps: bool,
    /// Log the cost partitioning heuristic of the initial state after each
    /// transformation of the main loop
    #[builder(default="false")]
    pub statistics_only: bool,
    /// Reduce the labels of the atomic factored transition system
    #[builder(default="true")]
    pub atomic_label_reduction: bool,

    #[builder(default)]
    pub verbosity: Verbosity,
}

impl Default for MergeAndShrinkOptions {
    fn default() -> Self {
        MergeAndShrinkOptions {
            max_states: None,
            max_states_before_merge: None,
            threshold_before_merge: None,
            prune_unreachable_states: true,
            prune_irrelevant_states: true,
            main_loop_max_time: f64::INFINITY,
            compute_atomic_snapshot: true,
            compute_final_snapshot: true,
            target_num_snapshots: 0,
            snapshot_each_iteration: 0,
            snapshot_moment: SnapshotMoment::AfterPruning,
            tokens: -1,
            max_clone_size_factor: -1.0,
            filter_trivial_factors: false,
            offline_cps: false,
            statistics_only: false,
            atomic_label_reduction: true,
            verbosity: Verbosity::Normal,
        }
    }
}

/// The size limits once the defaults are resolved
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ShrinkLimits {
    pub max_states: usize,
    pub max_states_before_merge: usize,
    pub threshold_before_merge: usize,
}

impl MergeAndShrinkOptions {
    /// Resolves the size limits and checks that the options are consistent.
    ///
    /// * When no size limit is set, `max_states` defaults to 50000.
    /// * An unset `max_states` (resp. `max_states_before_merge`) mirrors the
    ///   other one (squared, resp. identical).
    /// * `max_states_before_merge` and `threshold_before_merge` are clamped
    ///   (with a warning) to `max_states` and `max_states_before_merge`.
    ///
    /// Limits below one, a negative time budget, and snapshot options that
    /// request no snapshot at all or mix the count and period modes are
    /// rejected.
    pub fn normalize(&self) -> Result<ShrinkLimits, Error> {
        self.validate_snapshot_options()?;
        if self.main_loop_max_time.is_nan() || self.main_loop_max_time < 0.0 {
            return Err(Error::InvalidOptions(format!(
                "main_loop_max_time must be non negative (got {})", self.main_loop_max_time)));
        }
        for (name, limit) in [
            ("max_states", self.max_states),
            ("max_states_before_merge", self.max_states_before_merge),
            ("threshold_before_merge", self.threshold_before_merge),
        ] {
            if limit == Some(0) {
                return Err(Error::InvalidOptions(format!("{name} must be at least 1")));
            }
        }

        let (mut max_states, mut max_states_before_merge) = match (self.max_states, self.max_states_before_merge) {
            (None, None) => (DEFAULT_MAX_STATES, DEFAULT_MAX_STATES),
            (Some(max), None) => (max, max),
            (None, Some(before)) => (before.saturating_mul(before), before),
            (Some(max), Some(before)) => (max, before),
        };
        if max_states_before_merge > max_states {
            if self.verbosity.is_at_least_normal() {
                warn!(max_states_before_merge, max_states, "max_states_before_merge exceeds max_states, clamped");
            }
            max_states_before_merge = max_states;
        }
        max_states = max_states.max(1);

        let threshold_before_merge = match self.threshold_before_merge {
            None => max_states_before_merge,
            Some(threshold) if threshold > max_states_before_merge => {
                if self.verbosity.is_at_least_normal() {
                    warn!(threshold, max_states_before_merge,
                        "threshold_before_merge exceeds max_states_before_merge, clamped");
                }
                max_states_before_merge
            }
            Some(threshold) => threshold,
        };

        Ok(ShrinkLimits { max_states, max_states_before_merge, threshold_before_merge })
    }

    fn validate_snapshot_options(&self) -> Result<(), Error> {
        if !self.compute_atomic_snapshot
            && !self.compute_final_snapshot
            && self.target_num_snapshots == 0
            && self.snapshot_each_iteration == 0
        {
            return Err(Error::InvalidOptions(
                "at least one snapshot must be requested (atomic, final, count or period)".to_string()));
        }
        if self.target_num_snapshots > 0 && self.snapshot_each_iteration > 0 {
            return Err(Error::InvalidOptions(
                "target_num_snapshots and snapshot_each_iteration cannot be combined".to_string()));
        }
        Ok(())
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_options {
    use crate::*;

    #[test]
    fn builder_defaults_match_the_default_options() {
        let built = MergeAndShrinkOptionsBuilder::default().build().unwrap();
        let default = MergeAndShrinkOptions::default();
        assert_eq!(default.max_states, built.max_states);
        assert_eq!(default.prune_irrelevant_states, built.prune_irrelevant_states);
        assert_eq!(default.compute_atomic_snapshot, built.compute_atomic_snapshot);
        assert_eq!(default.snapshot_moment, built.snapshot_moment);
        assert_eq!(default.tokens, built.tokens);
        assert_eq!(default.verbosity, built.verbosity);
        assert!(built.main_loop_max_time.is_infinite());
    }
    #[test]
    fn no_limit_means_fifty_thousand_states() {
        let limits = MergeAndShrinkOptions::default().normalize().unwrap();
        assert_eq!(ShrinkLimits { max_states: 50_000, max_states_before_merge: 50_000, threshold_before_merge: 50_000 }, limits);
    }
    #[test]
    fn max_states_is_mirrored_when_alone() {
        let options = MergeAndShrinkOptionsBuilder::default().max_states(100_usize).build().unwrap();
        let limits = options.normalize().unwrap();
        assert_eq!(100, limits.max_states_before_merge);
        assert_eq!(100, limits.threshold_before_merge);
    }
    #[test]
    fn before_merge_is_squared_when_alone() {
        let options = MergeAndShrinkOptionsBuilder::default().max_states_before_merge(10_usize).build().unwrap();
        let limits = options.normalize().unwrap();
        assert_eq!(100, limits.max_states);
        assert_eq!(10, limits.max_states_before_merge);
    }
    #[test]
    fn inconsistent_limits_are_clamped() {
        let options = MergeAndShrinkOptionsBuilder::default()
            .max_states(10_usize)
            .max_states_before_merge(20_usize)
            .threshold_before_merge(30_usize)
            .verbosity(Verbosity::Silent)
            .build().unwrap();
        let limits = options.normalize().unwrap();
        assert_eq!(ShrinkLimits { max_states: 10, max_states_before_merge: 10, threshold_before_merge: 10 }, limits);
    }
    #[test]
    fn zero_limits_are_rejected() {
        let options = MergeAndShrinkOptionsBuilder::default().threshold_before_merge(0_usize).build().unwrap();
        assert!(matches!(options.normalize(), Err(Error::InvalidOptions(_))));
    }
    #[test]
    fn negative_time_is_rejected() {
        let options = MergeAndShrinkOptionsBuilder::default().main_loop_max_time(-1.0).build().unwrap();
        assert!(matches!(options.normalize(), Err(Error::InvalidOptions(_))));
    }
    #[test]
    fn at_least_one_snapshot_is_required() {
        let options = MergeAndShrinkOptionsBuilder::default()
            .compute_atomic_snapshot(false)
            .compute_final_snapshot(false)
            .build().unwrap();
        assert!(matches!(options.normalize(), Err(Error::InvalidOptions(_))));
    }
    #[test]
    fn count_and_period_snapshots_are_exclusive() {
        let options = MergeAndShrinkOptionsBuilder::default()
            .target_num_snapshots(2_usize)
            .snapshot_each_iteration(3_usize)
            .build().unwrap();
        assert!(matches!(options.normalize(), Err(Error::InvalidOptions(_))));
    }
}
