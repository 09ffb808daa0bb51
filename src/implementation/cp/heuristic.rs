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
//! This module provides the heuristic resulting from one saturated cost
//! partitioning: a list of lookup tables, one per useful abstraction, giving
//! the goal distance of each abstract state under the costs the abstraction
//! was granted. The value of a state is the sum of its entries.

use crate::{compute_goal_distances_for_abstraction, compute_saturated_costs_for_abstraction, path_addition,
    reduce_costs, Abstraction, Cost, INF};

#[derive(Debug, Clone, PartialEq, Eq)]
struct LookupTable {
    abstraction_id: usize,
    h_values: Vec<Cost>,
}

/// The lookup tables of one saturated cost partitioning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostPartitioningHeuristic {
    lookup_tables: Vec<LookupTable>,
}

impl CostPartitioningHeuristic {
    pub fn new() -> Self {
        Self::default()
    }
    /// Registers the goal distances of an abstraction. The table of an
    /// abstraction which prunes no state (`total_abstraction`) and whose
    /// values are all zero is not stored: it never contributes.
    pub fn add_h_values(&mut self, abstraction_id: usize, h_values: Vec<Cost>, total_abstraction: bool) {
        if !total_abstraction || h_values.iter().any(|h| *h != 0) {
            self.lookup_tables.push(LookupTable { abstraction_id, h_values });
        }
    }
    /// The heuristic value of the state whose abstract states are given
    /// (indexed by abstraction id, `None` meaning pruned).
    pub fn compute_heuristic(&self, abstract_states: &[Option<usize>]) -> Cost {
        let mut sum = 0;
        for table in self.lookup_tables.iter() {
            match abstract_states[table.abstraction_id] {
                None => return INF,
                Some(state) => {
                    sum = path_addition(sum, table.h_values[state]);
                    if sum == INF {
                        return INF;
                    }
                }
            }
        }
        sum
    }
    pub fn nb_lookup_tables(&self) -> usize {
        self.lookup_tables.len()
    }
    /// The total number of values stored in the lookup tables
    pub fn nb_heuristic_values(&self) -> usize {
        self.lookup_tables.iter().map(|t| t.h_values.len()).sum()
    }
    /// Flags the abstractions this heuristic has a table for
    pub fn mark_useful_abstractions(&self, useful: &mut [bool]) {
        for table in self.lookup_tables.iter() {
            useful[table.abstraction_id] = true;
        }
    }
}

/// Computes the saturated cost partitioning of the abstractions in the given
/// order, starting from the given costs.
pub fn compute_scp(abstractions: &[Abstraction], order: &[usize], costs: &[Cost]) -> CostPartitioningHeuristic {
    debug_assert_eq!(abstractions.len(), order.len());
    let mut heuristic = CostPartitioningHeuristic::new();
    let mut remaining = costs.to_vec();
    for (k, pos) in order.iter().copied().enumerate() {
        let abstraction = &abstractions[pos];
        let h_values = compute_goal_distances_for_abstraction(abstraction, &remaining);
        let last = k + 1 == order.len();
        if !last {
            let saturated = compute_saturated_costs_for_abstraction(abstraction, &h_values, remaining.len());
            reduce_costs(&mut remaining, &saturated);
        }
        heuristic.add_h_values(pos, h_values, abstraction.representation().is_total());
    }
    heuristic
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_cost_partitioning_heuristic {
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
    fn atomic_abstractions(task: &ExplicitTask) -> Vec<Abstraction> {
        let fts = FactoredTransitionSystem::atomic(task, true, true);
        let all = fts.active_indices().collect::<Vec<_>>();
        compute_abstractions_for_factors(&fts, &all)
    }

    #[test]
    fn tables_of_useless_total_abstractions_are_dropped() {
        let mut h = CostPartitioningHeuristic::new();
        h.add_h_values(0, vec![0, 0], true);
        assert_eq!(0, h.nb_lookup_tables());
        h.add_h_values(1, vec![0, 0], false);
        h.add_h_values(2, vec![0, 4], true);
        assert_eq!(2, h.nb_lookup_tables());
        assert_eq!(4, h.nb_heuristic_values());
        let mut useful = vec![false; 3];
        h.mark_useful_abstractions(&mut useful);
        assert_eq!(vec![false, true, true], useful);
    }
    #[test]
    fn pruned_states_and_infinite_values_are_dead_ends() {
        let mut h = CostPartitioningHeuristic::new();
        h.add_h_values(0, vec![1, INF], false);
        h.add_h_values(1, vec![2, 3], false);
        assert_eq!(4, h.compute_heuristic(&[Some(0), Some(1)]));
        assert_eq!(INF, h.compute_heuristic(&[Some(1), Some(1)]));
        assert_eq!(INF, h.compute_heuristic(&[Some(0), None]));
    }
    #[test]
    fn the_first_abstraction_takes_what_it_needs() {
        let task = shared_label_task();
        let abstractions = atomic_abstractions(&task);
        let init = compute_abstract_states(&abstractions, task.initial_state());
        // x first: x needs a (1), y gets b (3) and what is left of c (4)
        let h = compute_scp(&abstractions, &[0, 1], &[1, 3, 5]);
        assert_eq!(1 + 3, h.compute_heuristic(&init));
        // y first: y needs b (3), x gets a (1)
        let h = compute_scp(&abstractions, &[1, 0], &[1, 3, 5]);
        assert_eq!(3 + 1, h.compute_heuristic(&init));
    }
    #[test]
    fn scp_is_admissible_on_every_state() {
        let task = shared_label_task();
        let abstractions = atomic_abstractions(&task);
        let h = compute_scp(&abstractions, &[0, 1], &[1, 3, 5]);
        // optimal costs: (0,0) -> 4 ; (1,0) -> 3 ; (0,1) -> 1 ; (1,1) -> 0
        for (state, optimal) in [([0, 0], 4), ([1, 0], 3), ([0, 1], 1), ([1, 1], 0)] {
            let ids = compute_abstract_states(&abstractions, &state);
            assert!(h.compute_heuristic(&ids) <= optimal);
        }
    }
}
