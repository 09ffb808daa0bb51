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
//! This module provides the score based merge selector: a pipeline of
//! scoring functions is applied to the candidate pairs, each one keeping only
//! the candidates with the lowest score, until a single candidate remains.

use tracing::trace;

use crate::{FactoredTransitionSystem, MergeScoringFunction, Task, Verbosity};

/// All pairs `(i, j)` of active factors with `i` before `j`. When a subset is
/// given, only the pairs of factors from that subset are considered (in the
/// order of the subset).
pub fn compute_merge_candidates(fts: &FactoredTransitionSystem, subset: Option<&[usize]>) -> Vec<(usize, usize)> {
    let indices = match subset {
        Some(subset) => subset.iter().copied().filter(|i| fts.is_active(*i)).collect::<Vec<_>>(),
        None => fts.active_indices().collect::<Vec<_>>(),
    };
    let mut candidates = vec![];
    for (k, i) in indices.iter().copied().enumerate() {
        for j in indices[k + 1..].iter().copied() {
            candidates.push((i, j));
        }
    }
    candidates
}

/// The candidates whose score is minimal
fn remaining_candidates(candidates: &[(usize, usize)], scores: &[f64]) -> Vec<(usize, usize)> {
    debug_assert_eq!(candidates.len(), scores.len());
    let best = scores.iter().copied().fold(f64::INFINITY, f64::min);
    candidates.iter()
        .copied()
        .zip(scores.iter().copied())
        .filter(|(_, score)| *score == best)
        .map(|(candidate, _)| candidate)
        .collect()
}

pub struct MergeSelector {
    scoring_functions: Vec<Box<dyn MergeScoringFunction>>,
    /// Applied when the pipeline leaves more than one candidate
    tiebreaking_function: Option<Box<dyn MergeScoringFunction>>,
}

impl MergeSelector {
    pub fn new(scoring_functions: Vec<Box<dyn MergeScoringFunction>>) -> Self {
        MergeSelector { scoring_functions, tiebreaking_function: None }
    }
    pub fn with_tiebreaking(mut self, tiebreaking_function: Box<dyn MergeScoringFunction>) -> Self {
        self.tiebreaking_function = Some(tiebreaking_function);
        self
    }
    pub fn initialize(&mut self, task: &dyn Task) {
        for function in self.scoring_functions.iter_mut() {
            function.initialize(task);
        }
        if let Some(function) = self.tiebreaking_function.as_mut() {
            function.initialize(task);
        }
    }
    /// True iff the selector always ends up with a single candidate
    pub fn is_tie_breaking(&self) -> bool {
        self.scoring_functions.iter().any(|f| f.is_tie_breaking())
            || self.tiebreaking_function.as_ref().map_or(false, |f| f.is_tie_breaking())
    }
    pub fn requires_init_distances(&self) -> bool {
        self.scoring_functions.iter().chain(self.tiebreaking_function.iter()).any(|f| f.requires_init_distances())
    }
    pub fn requires_goal_distances(&self) -> bool {
        self.scoring_functions.iter().chain(self.tiebreaking_function.iter()).any(|f| f.requires_goal_distances())
    }
    pub fn describe(&self) -> String {
        let mut names = self.scoring_functions.iter().map(|f| f.name()).collect::<Vec<_>>().join(", ");
        if let Some(f) = self.tiebreaking_function.as_ref() {
            names = format!("{names}; ties broken by {}", f.name());
        }
        names
    }

    /// The candidate pairs that survive the scoring pipeline. The result is
    /// empty only when there is no candidate at all.
    pub fn select_merges(
        &mut self,
        fts: &FactoredTransitionSystem,
        subset: Option<&[usize]>,
        verbosity: Verbosity,
    ) -> Vec<(usize, usize)> {
        let mut candidates = compute_merge_candidates(fts, subset);
        if candidates.len() <= 1 {
            return candidates;
        }
        for function in self.scoring_functions.iter_mut() {
            let scores = function.compute_scores(fts, &candidates);
            candidates = remaining_candidates(&candidates, &scores);
            if verbosity.is_at_least_debug() {
                trace!(function = function.name(), remaining = candidates.len(), "merge candidates");
            }
            if candidates.len() == 1 {
                return candidates;
            }
        }
        if let Some(function) = self.tiebreaking_function.as_mut() {
            let scores = function.compute_scores(fts, &candidates);
            candidates = remaining_candidates(&candidates, &scores);
        }
        candidates
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
