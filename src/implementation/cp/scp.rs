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
//! This module provides the saturated cost partitioning over a single order
//! of the abstractions. Once computed, each abstraction function is turned
//! into a distance function (the abstract states are replaced by their goal
//! distances under the costs the abstraction was granted) so that only the
//! representations are kept for evaluation.

use tracing::debug;

use crate::{compute_goal_distances_for_abstraction, compute_saturated_costs_for_abstraction, path_addition,
    reduce_costs, Abstraction, Cost, CostPartitioning, CostPartitioningFactory, MasRepresentation, OrderGenerator,
    Task, Verbosity, INF, PRUNED_STATE};

/// A saturated cost partitioning over one order
#[derive(Debug, Clone)]
pub struct SaturatedCostPartitioning {
    /// Representations mapping concrete states onto goal distances
    distance_functions: Vec<MasRepresentation>,
}
impl SaturatedCostPartitioning {
    pub fn new(distance_functions: Vec<MasRepresentation>) -> Self {
        SaturatedCostPartitioning { distance_functions }
    }
}
impl CostPartitioning for SaturatedCostPartitioning {
    fn compute_value(&self, state: &[usize]) -> Cost {
        let mut h = 0;
        for function in self.distance_functions.iter() {
            let value = function.get_value(state);
            if value == PRUNED_STATE || value == INF {
                return INF;
            }
            h = path_addition(h, value);
        }
        h
    }
    fn nb_abstractions(&self) -> usize {
        self.distance_functions.len()
    }
}

/// Computes one saturated cost partitioning per snapshot, in the order
/// given by its order generator.
pub struct SaturatedCostPartitioningFactory {
    order_generator: Box<dyn OrderGenerator>,
}
impl SaturatedCostPartitioningFactory {
    pub fn new(order_generator: Box<dyn OrderGenerator>) -> Self {
        SaturatedCostPartitioningFactory { order_generator }
    }
}

impl CostPartitioningFactory for SaturatedCostPartitioningFactory {
    fn name(&self) -> &str {
        "saturated cost partitioning"
    }
    fn initialize(&mut self, task: &dyn Task) {
        self.order_generator.initialize(task);
    }
    fn generate(
        &mut self,
        _task: &dyn Task,
        costs: Vec<Cost>,
        abstractions: Vec<Abstraction>,
        verbosity: Verbosity,
    ) -> Box<dyn CostPartitioning> {
        let order = self.order_generator.compute_order(&abstractions, &costs, None, verbosity);
        self.order_generator.clear_internal_state();
        if verbosity.is_at_least_verbose() {
            debug!(nb_abstractions = abstractions.len(), ?order, "saturated cost partitioning");
        }

        let mut remaining = costs;
        let mut tables = Vec::with_capacity(order.len());
        for (k, pos) in order.iter().copied().enumerate() {
            let abstraction = &abstractions[pos];
            let h_values = compute_goal_distances_for_abstraction(abstraction, &remaining);
            if k + 1 < order.len() {
                let saturated = compute_saturated_costs_for_abstraction(abstraction, &h_values, remaining.len());
                reduce_costs(&mut remaining, &saturated);
            }
            tables.push((pos, h_values));
        }

        let mut slots = abstractions.into_iter().map(Some).collect::<Vec<_>>();
        let mut distance_functions = Vec::with_capacity(tables.len());
        for (pos, h_values) in tables {
            if let Some(abstraction) = slots[pos].take() {
                let mut function = abstraction.into_representation();
                function.set_distances(&h_values);
                distance_functions.push(function);
            }
        }
        Box::new(SaturatedCostPartitioning::new(distance_functions))
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_saturated_cost_partitioning {
    use crate::*;

    /// x, y in {0, 1}; a: x := 1 (cost 1) ; b: y := 1 (cost 3)
    fn two_switches() -> ExplicitTask {
        ExplicitTask::new(
            vec![2, 2],
            vec![
                Operator { name: "a".into(), cost: 1, preconditions: vec![], effects: vec![Fact::new(0, 1)] },
                Operator { name: "b".into(), cost: 3, preconditions: vec![], effects: vec![Fact::new(1, 1)] },
            ],
            vec![0, 0],
            vec![Fact::new(0, 1), Fact::new(1, 1)],
        )
    }
    fn generate(task: &ExplicitTask, factory: &mut SaturatedCostPartitioningFactory) -> Box<dyn CostPartitioning> {
        let fts = FactoredTransitionSystem::atomic(task, true, true);
        let all = fts.active_indices().collect::<Vec<_>>();
        factory.initialize(task);
        factory.generate(task, fts.cost_vector(), compute_abstractions_for_factors(&fts, &all), Verbosity::Silent)
    }

    #[test]
    fn the_value_sums_the_distance_functions() {
        let task = two_switches();
        let mut factory = SaturatedCostPartitioningFactory::new(Box::new(RandomOrders::new(false, 0)));
        let cp = generate(&task, &mut factory);
        assert_eq!(2, cp.nb_abstractions());
        assert_eq!(4, cp.compute_value(&[0, 0]));
        assert_eq!(3, cp.compute_value(&[1, 0]));
        assert_eq!(1, cp.compute_value(&[0, 1]));
        assert_eq!(0, cp.compute_value(&[1, 1]));
    }
    #[test]
    fn greedy_orders_yield_the_same_values_on_independent_factors() {
        let task = two_switches();
        let mut factory = SaturatedCostPartitioningFactory::new(Box::new(GreedyOrders::default()));
        let cp = generate(&task, &mut factory);
        assert_eq!(4, cp.compute_value(&[0, 0]));
    }
    #[test]
    fn an_empty_list_of_abstractions_yields_zero() {
        let task = two_switches();
        let mut factory = SaturatedCostPartitioningFactory::new(Box::new(RandomOrders::new(false, 0)));
        let cp = factory.generate(&task, vec![1, 3], vec![], Verbosity::Silent);
        assert_eq!(0, cp.nb_abstractions());
        assert_eq!(0, cp.compute_value(&[0, 0]));
    }
    #[test]
    fn pruned_states_are_dead_ends() {
        let mut function = MasRepresentation::leaf(0, 2);
        function.apply_abstraction_to_lookup_table(&[Some(0), None]);
        function.set_distances(&[2]);
        let cp = SaturatedCostPartitioning::new(vec![function]);
        assert_eq!(2, cp.compute_value(&[0]));
        assert_eq!(INF, cp.compute_value(&[1]));
    }
}
