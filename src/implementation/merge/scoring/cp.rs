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

//! This module provides a scoring function which measures how much a merge
//! improves over leaving the two factors to a cost partitioning. The score
//! of a candidate is the cost partitioning heuristic of the initial state
//! computed over both factors minus the goal distance of the initial state in
//! their (shrunk) product. It is never positive; the lower it is, the more
//! the product captures interactions the cost partitioning misses.

use crate::{compute_abstractions_for_factors, compute_goal_distances, shrink_before_merge_step,
    CostPartitioningFactory, ExplicitTask, FactoredTransitionSystem, MergeScoringFunction, ShrinkLimits,
    ShrinkStrategy, Task, TransitionSystem, Verbosity, INF};

pub struct CostPartitioningGain {
    shrink_strategy: Box<dyn ShrinkStrategy>,
    limits: ShrinkLimits,
    cp_factory: Box<dyn CostPartitioningFactory>,
    filter_trivial_factors: bool,
    task: Option<ExplicitTask>,
}

impl CostPartitioningGain {
    /// The shrink strategy and limits should be the ones the main loop uses
    /// so that the product is the one the merge would actually produce.
    pub fn new(
        shrink_strategy: Box<dyn ShrinkStrategy>,
        limits: ShrinkLimits,
        cp_factory: Box<dyn CostPartitioningFactory>,
        filter_trivial_factors: bool,
    ) -> Self {
        CostPartitioningGain { shrink_strategy, limits, cp_factory, filter_trivial_factors, task: None }
    }

    /// The goal distance of the initial state of the product of `i` and `j`
    /// once both have been shrunk.
    fn product_init_h(&mut self, fts: &FactoredTransitionSystem, i: usize, j: usize) -> i32 {
        let mut copy = fts.clone();
        shrink_before_merge_step(&mut copy, i, j, &self.limits, self.shrink_strategy.as_mut(), Verbosity::Silent);
        let product = TransitionSystem::merge(copy.labels(), copy.transition_system(i), copy.transition_system(j));
        let goal_distances = compute_goal_distances(&product, &copy.cost_vector());
        product.init_state().map_or(INF, |s| goal_distances[s])
    }
}

impl MergeScoringFunction for CostPartitioningGain {
    fn name(&self) -> &str {
        "cp gain"
    }
    fn initialize(&mut self, task: &dyn Task) {
        self.task = Some(ExplicitTask::from_task(task));
        self.cp_factory.initialize(task);
    }
    fn compute_scores(&mut self, fts: &FactoredTransitionSystem, candidates: &[(usize, usize)]) -> Vec<f64> {
        let Some(task) = self.task.take() else {
            return vec![0.0; candidates.len()];
        };
        let mut trivial: Vec<Option<bool>> = vec![None; fts.size()];
        let mut scores = Vec::with_capacity(candidates.len());
        for (i, j) in candidates.iter().copied() {
            if self.filter_trivial_factors {
                let trivial_i = *trivial[i].get_or_insert_with(|| fts.is_factor_trivial(i));
                let trivial_j = *trivial[j].get_or_insert_with(|| fts.is_factor_trivial(j));
                if trivial_i || trivial_j {
                    scores.push(0.0);
                    continue;
                }
            }
            let product_h = self.product_init_h(fts, i, j);
            let cp = self.cp_factory.generate(
                &task,
                fts.cost_vector(),
                compute_abstractions_for_factors(fts, &[i, j]),
                Verbosity::Silent,
            );
            let cp_h = cp.compute_value(task.initial_state());
            scores.push(cp_h as f64 - product_h as f64);
        }
        self.task = Some(task);
        scores
    }
    fn requires_init_distances(&self) -> bool {
        self.shrink_strategy.requires_init_distances()
    }
    fn requires_goal_distances(&self) -> bool {
        self.shrink_strategy.requires_goal_distances()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_cost_partitioning_gain {
    use crate::*;

    fn op(name: &str, pre: Vec<Fact>, eff: Fact) -> Operator {
        Operator { name: name.to_string(), cost: 1, preconditions: pre, effects: vec![eff] }
    }
    /// a: x := 1 (pre y = 0) ; b: y := 1 (pre x = 0) ; c: z := 1 ;
    /// goal x = y = z = 1 (the goal is unreachable)
    fn deadlock() -> ExplicitTask {
        ExplicitTask::new(
            vec![2, 2, 2],
            vec![
                op("a", vec![Fact::new(1, 0)], Fact::new(0, 1)),
                op("b", vec![Fact::new(0, 0)], Fact::new(1, 1)),
                op("c", vec![], Fact::new(2, 1)),
            ],
            vec![0, 0, 0],
            vec![Fact::new(0, 1), Fact::new(1, 1), Fact::new(2, 1)],
        )
    }
    fn gain(filter_trivial_factors: bool) -> CostPartitioningGain {
        let limits = ShrinkLimits { max_states: 1000, max_states_before_merge: 1000, threshold_before_merge: 1000 };
        let scp = SaturatedCostPartitioningFactory::new(Box::new(RandomOrders::new(false, 0)));
        CostPartitioningGain::new(Box::new(ShrinkBisimulation::default()), limits, Box::new(scp), filter_trivial_factors)
    }

    #[test]
    fn interacting_factors_get_the_lowest_score() {
        let task = deadlock();
        let fts = FactoredTransitionSystem::atomic(&task, true, true);
        let mut function = gain(false);
        function.initialize(&task);
        let scores = function.compute_scores(&fts, &[(0, 1), (0, 2)]);
        assert_eq!(0.0, scores[1]);
        assert!(scores[0] < scores[1]);
    }
    #[test]
    fn scores_are_never_positive() {
        let task = deadlock();
        let fts = FactoredTransitionSystem::atomic(&task, true, true);
        let mut function = gain(false);
        function.initialize(&task);
        let scores = function.compute_scores(&fts, &[(0, 1), (0, 2), (1, 2)]);
        assert!(scores.iter().all(|s| *s <= 0.0));
    }
    #[test]
    fn trivial_factors_are_skipped_when_filtered() {
        // y has no goal: its factor is trivial
        let task = ExplicitTask::new(
            vec![2, 2],
            vec![op("a", vec![Fact::new(1, 0)], Fact::new(0, 1))],
            vec![0, 0],
            vec![Fact::new(0, 1)],
        );
        let fts = FactoredTransitionSystem::atomic(&task, true, true);
        let mut function = gain(true);
        function.initialize(&task);
        assert!(fts.is_factor_trivial(1));
        assert_eq!(vec![0.0], function.compute_scores(&fts, &[(0, 1)]));
    }
    #[test]
    fn requirements_follow_the_shrink_strategy() {
        let function = gain(false);
        assert!(function.requires_goal_distances());
    }
}
