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
//! This module provides the dynamic greedy order generator. Contrary to the
//! static variant, the scores are recomputed after each pick under the costs
//! the abstractions already in the order left over.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{compute_all_surplus_costs, compute_costs_stolen_by_heuristic, compute_goal_distances_for_abstraction,
    compute_saturated_costs_for_abstraction, compute_score, reduce_costs, Abstraction, Cost, Order, OrderGenerator,
    ScoringFunction, Verbosity, INF};

pub struct DynamicGreedyOrders {
    scoring: ScoringFunction,
    rng: StdRng,
}
impl DynamicGreedyOrders {
    pub fn new(scoring: ScoringFunction, seed: u64) -> Self {
        DynamicGreedyOrders { scoring, rng: StdRng::seed_from_u64(seed) }
    }
}
impl Default for DynamicGreedyOrders {
    fn default() -> Self {
        Self::new(ScoringFunction::default(), 0)
    }
}

impl OrderGenerator for DynamicGreedyOrders {
    fn compute_order(
        &mut self,
        abstractions: &[Abstraction],
        costs: &[Cost],
        abstract_states: Option<&[Option<usize>]>,
        _verbosity: Verbosity,
    ) -> Order {
        let mut remaining_costs = costs.to_vec();
        let mut candidates = (0..abstractions.len()).collect::<Vec<_>>();
        let mut order = Vec::with_capacity(abstractions.len());

        while !candidates.is_empty() {
            candidates.shuffle(&mut self.rng);

            let mut h_values = Vec::with_capacity(candidates.len());
            let mut saturated = Vec::with_capacity(candidates.len());
            for pos in candidates.iter().copied() {
                let abstraction = &abstractions[pos];
                let h = compute_goal_distances_for_abstraction(abstraction, &remaining_costs);
                let state = match abstract_states {
                    Some(states) => states[pos],
                    None => abstraction.init_state(),
                };
                h_values.push(state.map_or(INF, |s| h[s]));
                saturated.push(compute_saturated_costs_for_abstraction(abstraction, &h, remaining_costs.len()));
            }
            let surplus = compute_all_surplus_costs(&remaining_costs, &saturated);

            let mut best = 0;
            let mut best_score = f64::NEG_INFINITY;
            for k in 0..candidates.len() {
                let stolen = compute_costs_stolen_by_heuristic(&saturated[k], &surplus);
                let score = compute_score(h_values[k], stolen, self.scoring);
                if score > best_score {
                    best = k;
                    best_score = score;
                }
            }

            reduce_costs(&mut remaining_costs, &saturated[best]);
            order.push(candidates.swap_remove(best));
        }
        order
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_dynamic_greedy_orders {
    use crate::*;

    /// x, y, z in {0, 1}; a: x := 1 (cost 1) ; b: y := 1 (cost 3) ;
    /// c: z := 1 (cost 2) ; goal x = y = z = 1
    fn three_switches() -> ExplicitTask {
        ExplicitTask::new(
            vec![2, 2, 2],
            vec![
                Operator { name: "a".into(), cost: 1, preconditions: vec![], effects: vec![Fact::new(0, 1)] },
                Operator { name: "b".into(), cost: 3, preconditions: vec![], effects: vec![Fact::new(1, 1)] },
                Operator { name: "c".into(), cost: 2, preconditions: vec![], effects: vec![Fact::new(2, 1)] },
            ],
            vec![0, 0, 0],
            (0..3).map(|v| Fact::new(v, 1)).collect(),
        )
    }

    #[test]
    fn max_heuristic_picks_abstractions_by_decreasing_value() {
        let task = three_switches();
        let fts = FactoredTransitionSystem::atomic(&task, true, true);
        let abs = compute_abstractions_for_factors(&fts, &[0, 1, 2]);
        let mut gen = DynamicGreedyOrders::new(ScoringFunction::MaxHeuristic, 3);
        assert_eq!(vec![1, 2, 0], gen.compute_order(&abs, &[1, 3, 2], None, Verbosity::Silent));
    }
    #[test]
    fn every_abstraction_is_ordered_once() {
        let task = three_switches();
        let fts = FactoredTransitionSystem::atomic(&task, true, true);
        let abs = compute_abstractions_for_factors(&fts, &[0, 1, 2]);
        let mut gen = DynamicGreedyOrders::default();
        let states = compute_abstract_states(&abs, &[1, 0, 1]);
        let mut order = gen.compute_order(&abs, &[1, 3, 2], Some(&states), Verbosity::Silent);
        assert_eq!(1, order[0]);
        order.sort_unstable();
        assert_eq!(vec![0, 1, 2], order);
    }
}
