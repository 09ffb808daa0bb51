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
//! This module provides the static greedy order generator. Every abstraction
//! is scored once under the full costs: it is worth its heuristic value for
//! the state the order is computed for, and it costs whatever it steals from
//! the other abstractions. The order sorts abstractions by decreasing score.

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::trace;

use crate::{compute_all_surplus_costs, compute_costs_stolen_by_heuristic, compute_goal_distances_for_abstraction,
    compute_saturated_costs_for_abstraction, compute_score, Abstraction, Cost, Order, OrderGenerator, ScoringFunction,
    Verbosity, INF};

pub struct GreedyOrders {
    scoring: ScoringFunction,
    /// Goal distances of each abstraction under the full costs
    h_values: Vec<Vec<Cost>>,
    /// Costs stolen by each abstraction
    stolen_costs: Vec<Cost>,
    rng: StdRng,
}
impl GreedyOrders {
    pub fn new(scoring: ScoringFunction, seed: u64) -> Self {
        GreedyOrders { scoring, h_values: vec![], stolen_costs: vec![], rng: StdRng::seed_from_u64(seed) }
    }

    fn precompute(&mut self, abstractions: &[Abstraction], costs: &[Cost]) {
        let mut saturated = Vec::with_capacity(abstractions.len());
        self.h_values.clear();
        for abstraction in abstractions {
            let h = compute_goal_distances_for_abstraction(abstraction, costs);
            saturated.push(compute_saturated_costs_for_abstraction(abstraction, &h, costs.len()));
            self.h_values.push(h);
        }
        let surplus = compute_all_surplus_costs(costs, &saturated);
        self.stolen_costs = saturated.iter()
            .map(|sat| compute_costs_stolen_by_heuristic(sat, &surplus))
            .collect();
    }
}
impl Default for GreedyOrders {
    fn default() -> Self {
        Self::new(ScoringFunction::default(), 0)
    }
}

impl OrderGenerator for GreedyOrders {
    fn clear_internal_state(&mut self) {
        self.h_values.clear();
        self.stolen_costs.clear();
    }
    fn compute_order(
        &mut self,
        abstractions: &[Abstraction],
        costs: &[Cost],
        abstract_states: Option<&[Option<usize>]>,
        verbosity: Verbosity,
    ) -> Order {
        if self.h_values.len() != abstractions.len() {
            self.precompute(abstractions, costs);
        }
        let scores = abstractions.iter()
            .enumerate()
            .map(|(pos, abstraction)| {
                let state = match abstract_states {
                    Some(states) => states[pos],
                    None => abstraction.init_state(),
                };
                let h = state.map_or(INF, |s| self.h_values[pos][s]);
                compute_score(h, self.stolen_costs[pos], self.scoring)
            })
            .collect::<Vec<_>>();

        let mut order = (0..abstractions.len()).collect::<Order>();
        order.shuffle(&mut self.rng);
        order.sort_by_key(|pos| Reverse(OrderedFloat(scores[*pos])));
        if verbosity.is_at_least_debug() {
            trace!(?scores, ?order, "greedy order");
        }
        order
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_greedy_orders {
    use crate::*;

    /// x, y in {0, 1}; a: x := 1 (cost 1) ; b: y := 1 (cost 3) ;
    /// c: x := 1, y := 1 (cost 5) ; goal x = 1 & y = 1
    fn shared_label_task() -> ExplicitTask {
        ExplicitTask::new(
            vec![2, 2],
            vec![
                Operator { name: "a".into(), cost: 1, preconditions: vec![], effects: vec![Fact::new(0, 1)] },
                Operator { name: "b".into(), cost: 3, preconditions: vec![], effects: vec![Fact::new(1, 1)] },
                Operator { name: "c".into(), cost: 5, preconditions: vec![], effects: vec![Fact::new(0, 1), Fact::new(1, 1)] },
            ],
            vec![0, 0],
            vec![Fact::new(0, 1), Fact::new(1, 1)],
        )
    }
    fn abstractions(task: &ExplicitTask) -> Vec<Abstraction> {
        let fts = FactoredTransitionSystem::atomic(task, true, true);
        compute_abstractions_for_factors(&fts, &[0, 1])
    }

    #[test]
    fn max_heuristic_puts_the_most_informed_abstraction_first() {
        let task = shared_label_task();
        let abs = abstractions(&task);
        let mut gen = GreedyOrders::new(ScoringFunction::MaxHeuristic, 0);
        // h_x(init) = 1 and h_y(init) = 3
        assert_eq!(vec![1, 0], gen.compute_order(&abs, &[1, 3, 5], None, Verbosity::Silent));
    }
    #[test]
    fn goal_states_score_lowest() {
        let task = shared_label_task();
        let abs = abstractions(&task);
        let mut gen = GreedyOrders::new(ScoringFunction::MaxHeuristic, 0);
        // x is satisfied in the queried state, y is not
        let states = vec![Some(1), Some(0)];
        assert_eq!(vec![1, 0], gen.compute_order(&abs, &[1, 3, 5], Some(&states), Verbosity::Silent));
        let states = vec![Some(0), Some(1)];
        assert_eq!(vec![0, 1], gen.compute_order(&abs, &[1, 3, 5], Some(&states), Verbosity::Silent));
    }
    #[test]
    fn the_cache_is_dropped_when_asked_to() {
        let task = shared_label_task();
        let abs = abstractions(&task);
        let mut gen = GreedyOrders::new(ScoringFunction::MaxHeuristic, 0);
        assert_eq!(vec![1, 0], gen.compute_order(&abs, &[1, 3, 5], None, Verbosity::Silent));
        gen.clear_internal_state();
        // with b expensive, x becomes the most informed one
        let order = gen.compute_order(&abs, &[10, 3, 5], None, Verbosity::Silent);
        assert_eq!(vec![0, 1], order);
    }
}
