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
//! This module provides the goal relevance scoring function: a candidate is
//! preferred (score 0) when one of its factors has a non goal state.

use crate::{FactoredTransitionSystem, MergeScoringFunction};

#[derive(Debug, Default, Clone, Copy)]
pub struct GoalRelevance;

fn is_goal_relevant(fts: &FactoredTransitionSystem, index: usize) -> bool {
    let ts = fts.transition_system(index);
    (0..ts.num_states()).any(|s| !ts.is_goal_state(s))
}

impl MergeScoringFunction for GoalRelevance {
    fn name(&self) -> &str {
        "goal relevance"
    }
    fn compute_scores(&mut self, fts: &FactoredTransitionSystem, candidates: &[(usize, usize)]) -> Vec<f64> {
        candidates.iter()
            .map(|(i, j)| if is_goal_relevant(fts, *i) || is_goal_relevant(fts, *j) { 0.0 } else { f64::INFINITY })
            .collect()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_goal_relevance {
    use crate::*;

    #[test]
    fn pairs_without_goal_variable_are_discarded() {
        let task = ExplicitTask::new(vec![2, 2, 2], vec![], vec![0, 0, 0], vec![Fact::new(1, 1)]);
        let fts = FactoredTransitionSystem::atomic(&task, false, false);
        let scores = GoalRelevance.compute_scores(&fts, &[(0, 1), (0, 2), (1, 2)]);
        assert_eq!(vec![0.0, f64::INFINITY, 0.0], scores);
    }
}
