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
//! This module defines the merge strategy abstractions. A merge strategy
//! tells the main loop which pair of factors to combine next. Strategies are
//! built by a one-shot factory once the atomic factored transition system is
//! known; score based strategies rely on a pipeline of scoring functions.

use crate::{Error, FactoredTransitionSystem, Task};

/// The decision of a merge strategy
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NextMerge {
    /// The indices of the two factors to merge
    pub pair: (usize, usize),
    /// Requests that the first (resp. second) operand survives the merge
    pub clone: (bool, bool),
    /// No more merge should be performed
    pub stop: bool,
}
impl NextMerge {
    /// An ordinary merge of `i` and `j`
    pub fn merge(i: usize, j: usize) -> Self {
        NextMerge { pair: (i, j), clone: (false, false), stop: false }
    }
    /// A merge of `i` and `j` which keeps the flagged operands alive
    pub fn cloning(i: usize, j: usize, clone_i: bool, clone_j: bool) -> Self {
        NextMerge { pair: (i, j), clone: (clone_i, clone_j), stop: false }
    }
    /// The end of the merge sequence
    pub fn stop() -> Self {
        NextMerge { pair: (0, 0), clone: (false, false), stop: true }
    }
}

/// The runtime part of a merge strategy
pub trait MergeStrategy {
    /// Returns the next pair of active factors to merge
    fn get_next(&mut self, fts: &FactoredTransitionSystem) -> NextMerge;
}

/// Creates the merge strategy used by one run of the algorithm
pub trait MergeStrategyFactory {
    /// A short human readable name (used in the logs)
    fn name(&self) -> &str;
    /// Builds the strategy for the given task and its atomic factored
    /// transition system.
    fn compute_merge_strategy(
        &mut self,
        task: &dyn Task,
        fts: &FactoredTransitionSystem,
    ) -> Result<Box<dyn MergeStrategy>, Error>;
    fn requires_init_distances(&self) -> bool;
    fn requires_goal_distances(&self) -> bool;
}

/// Scores the candidate merges; the lower the score, the better the merge.
pub trait MergeScoringFunction {
    /// A short human readable name (used in the logs)
    fn name(&self) -> &str;
    /// Called once, before the first merge is selected
    fn initialize(&mut self, _task: &dyn Task) {}
    /// Computes one score per candidate pair
    fn compute_scores(&mut self, fts: &FactoredTransitionSystem, candidates: &[(usize, usize)]) -> Vec<f64>;
    /// True iff no two candidates ever get the same score
    fn is_tie_breaking(&self) -> bool {
        false
    }
    fn requires_init_distances(&self) -> bool {
        false
    }
    fn requires_goal_distances(&self) -> bool {
        false
    }
}
