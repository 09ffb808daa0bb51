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

//! This module provides the transformations the main loop applies to the
//! factors around a merge: shrinking both operands so that their product
//! respects the size limits, and pruning the states of a factor which are
//! unreachable or irrelevant.

use tracing::debug;

use crate::{FactoredTransitionSystem, ShrinkLimits, ShrinkStrategy, Verbosity, INF};

/// Computes the sizes the two operands of a merge must be shrunk to. Both
/// are first capped by `max_states_before_merge`. When their product still
/// exceeds `max_states`, a factor smaller than the balanced size
/// `sqrt(max_states)` keeps its size and the other one gets the quotient;
/// otherwise both get the balanced size.
pub fn compute_shrink_sizes(
    size1: usize,
    size2: usize,
    max_states_before_merge: usize,
    max_states: usize,
) -> (usize, usize) {
    let mut new_size1 = size1.min(max_states_before_merge);
    let mut new_size2 = size2.min(max_states_before_merge);

    if new_size1.saturating_mul(new_size2) > max_states {
        let balanced = ((max_states as f64).sqrt() as usize).max(1);
        if new_size1 <= balanced {
            new_size2 = max_states / new_size1;
        } else if new_size2 <= balanced {
            new_size1 = max_states / new_size2;
        } else {
            new_size1 = balanced;
            new_size2 = balanced;
        }
    }
    debug_assert!(new_size1.saturating_mul(new_size2) <= max_states);
    (new_size1, new_size2)
}

/// Shrinks the factor at `index` to at most `new_size` states when it has
/// more than `min(new_size, shrink_threshold)` states. Returns true iff the
/// factor changed.
pub fn shrink_factor(
    fts: &mut FactoredTransitionSystem,
    index: usize,
    new_size: usize,
    shrink_threshold: usize,
    shrink_strategy: &mut dyn ShrinkStrategy,
    verbosity: Verbosity,
) -> bool {
    let size = fts.transition_system(index).num_states();
    if size <= new_size.min(shrink_threshold) {
        return false;
    }
    if verbosity.is_at_least_verbose() {
        debug!(factor = index, size, target = new_size, strategy = shrink_strategy.name(), "shrink");
    }
    let costs = fts.cost_vector();
    let factor = fts.factor(index);
    let equivalence = shrink_strategy.compute_equivalence_relation(&factor.ts, &factor.distances, &costs, new_size);
    fts.apply_abstraction(index, &equivalence)
}

/// Shrinks the factors `i` and `j` before they get merged. Returns which of
/// the two factors changed.
pub fn shrink_before_merge_step(
    fts: &mut FactoredTransitionSystem,
    i: usize,
    j: usize,
    limits: &ShrinkLimits,
    shrink_strategy: &mut dyn ShrinkStrategy,
    verbosity: Verbosity,
) -> (bool, bool) {
    let size_i = fts.transition_system(i).num_states();
    let size_j = fts.transition_system(j).num_states();
    let (new_size_i, new_size_j) =
        compute_shrink_sizes(size_i, size_j, limits.max_states_before_merge, limits.max_states);

    let shrunk_i = shrink_factor(fts, i, new_size_i, limits.threshold_before_merge, shrink_strategy, verbosity);
    let shrunk_j = shrink_factor(fts, j, new_size_j, limits.threshold_before_merge, shrink_strategy, verbosity);
    (shrunk_i, shrunk_j)
}

/// Removes the states of the factor at `index` which cannot be reached from
/// the initial state (`prune_unreachable_states`) or from which no goal can
/// be reached (`prune_irrelevant_states`). The corresponding distances must
/// be available. Returns true iff the factor changed.
pub fn prune_step(
    fts: &mut FactoredTransitionSystem,
    index: usize,
    prune_unreachable_states: bool,
    prune_irrelevant_states: bool,
    verbosity: Verbosity,
) -> bool {
    if !prune_unreachable_states && !prune_irrelevant_states {
        return false;
    }
    let distances = fts.distances(index);
    debug_assert!(!prune_unreachable_states || distances.are_init_distances_computed());
    debug_assert!(!prune_irrelevant_states || distances.are_goal_distances_computed());

    let num_states = fts.transition_system(index).num_states();
    let mut unreachable = 0;
    let mut irrelevant = 0;
    let mut equivalence = vec![];
    for state in 0..num_states {
        let is_unreachable = prune_unreachable_states && distances.init_distance(state) == INF;
        let is_irrelevant = prune_irrelevant_states && distances.goal_distance(state) == INF;
        unreachable += is_unreachable as usize;
        irrelevant += is_irrelevant as usize;
        if !is_unreachable && !is_irrelevant {
            equivalence.push(vec![state]);
        }
    }
    if equivalence.len() == num_states {
        return false;
    }
    if verbosity.is_at_least_verbose() {
        debug!(factor = index, unreachable, irrelevant, kept = equivalence.len(), "prune");
    }
    fts.apply_abstraction(index, &equivalence)
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
