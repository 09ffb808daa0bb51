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
//! This module provides the hill climbing search which improves an order for
//! one given state by swapping pairs of abstractions.

use tracing::trace;

use crate::{compute_scp, Abstraction, Cost, CostPartitioningHeuristic, CountdownTimer, Order, Verbosity};

/// Improves `order` (whose heuristic is `incumbent` and evaluates to
/// `incumbent_h` on the given abstract states) by swapping two of its
/// positions as long as this strictly increases the heuristic value.
/// An improving swap is kept and the pass goes on from the next pair. The
/// search stops after a pass without improvement or when the timer expires. It returns the number of
/// improving swaps.
#[allow(clippy::too_many_arguments)]
pub fn optimize_order_with_hill_climbing(
    abstractions: &[Abstraction],
    costs: &[Cost],
    abstract_states: &[Option<usize>],
    order: &mut Order,
    incumbent: &mut CostPartitioningHeuristic,
    incumbent_h: &mut Cost,
    timer: &CountdownTimer,
    verbosity: Verbosity,
) -> usize {
    let mut improvements = 0;
    let mut improved = true;
    while improved && !timer.is_expired() {
        improved = false;
        'pass: for i in 0..order.len() {
            for j in i + 1..order.len() {
                if timer.is_expired() {
                    break 'pass;
                }
                order.swap(i, j);
                let candidate = compute_scp(abstractions, order, costs);
                let h = candidate.compute_heuristic(abstract_states);
                if h > *incumbent_h {
                    if verbosity.is_at_least_debug() {
                        trace!(from = *incumbent_h, to = h, i, j, "improving swap");
                    }
                    *incumbent = candidate;
                    *incumbent_h = h;
                    improvements += 1;
                    improved = true;
                } else {
                    order.swap(i, j);
                }
            }
        }
    }
    improvements
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_order_optimizer {
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
    fn setup(task: &ExplicitTask) -> (Vec<Abstraction>, Vec<Cost>, Vec<Option<usize>>) {
        let fts = FactoredTransitionSystem::atomic(task, true, true);
        let abs = compute_abstractions_for_factors(&fts, &[0, 1]);
        let states = compute_abstract_states(&abs, task.initial_state());
        (abs, fts.cost_vector(), states)
    }

    #[test]
    fn ties_do_not_change_the_order() {
        let task = shared_label_task();
        let (abs, costs, states) = setup(&task);
        let mut order = vec![1, 0];
        let mut incumbent = compute_scp(&abs, &order, &costs);
        let mut h = incumbent.compute_heuristic(&states);
        assert_eq!(4, h);
        let n = optimize_order_with_hill_climbing(&abs, &costs, &states, &mut order, &mut incumbent, &mut h,
            &CountdownTimer::unlimited(), Verbosity::Silent);
        assert_eq!(0, n);
        assert_eq!(vec![1, 0], order);
        assert_eq!(4, h);
    }
    #[test]
    fn improving_swaps_replace_the_incumbent() {
        let task = shared_label_task();
        let (abs, costs, states) = setup(&task);
        let mut order = vec![1, 0];
        let mut incumbent = CostPartitioningHeuristic::new();
        let mut h = -1;
        let n = optimize_order_with_hill_climbing(&abs, &costs, &states, &mut order, &mut incumbent, &mut h,
            &CountdownTimer::unlimited(), Verbosity::Silent);
        assert_eq!(1, n);
        assert_eq!(vec![0, 1], order);
        assert_eq!(4, h);
        assert_eq!(4, incumbent.compute_heuristic(&states));
    }
    #[test]
    fn nothing_happens_once_the_timer_expired() {
        let task = shared_label_task();
        let (abs, costs, states) = setup(&task);
        let mut order = vec![1, 0];
        let mut incumbent = CostPartitioningHeuristic::new();
        let mut h = -1;
        let n = optimize_order_with_hill_climbing(&abs, &costs, &states, &mut order, &mut incumbent, &mut h,
            &CountdownTimer::new(0.0), Verbosity::Silent);
        assert_eq!(0, n);
        assert_eq!(vec![1, 0], order);
        assert_eq!(-1, h);
    }

    /// x, y, z in {0, 1}; a: x := 1 (cost 1) ; u: x = 1 -> x := 0, y := 1
    /// (cost 1) ; d: z := 1 (cost 1) ; goal x = 1 & y = 1 & z = 1.
    /// Putting x before y yields 4 since u gives one unit back, else 3.
    fn give_back_task() -> ExplicitTask {
        ExplicitTask::new(
            vec![2, 2, 2],
            vec![
                Operator { name: "a".into(), cost: 1, preconditions: vec![], effects: vec![Fact::new(0, 1)] },
                Operator { name: "u".into(), cost: 1, preconditions: vec![Fact::new(0, 1)], effects: vec![Fact::new(0, 0), Fact::new(1, 1)] },
                Operator { name: "d".into(), cost: 1, preconditions: vec![], effects: vec![Fact::new(2, 1)] },
            ],
            vec![0, 0, 0],
            vec![Fact::new(0, 1), Fact::new(1, 1), Fact::new(2, 1)],
        )
    }
    #[test]
    fn the_pass_goes_on_after_an_improving_swap() {
        let task = give_back_task();
        let fts = FactoredTransitionSystem::atomic(&task, true, true);
        let abs = compute_abstractions_for_factors(&fts, &[0, 1, 2]);
        let costs = fts.cost_vector();
        let states = compute_abstract_states(&abs, task.initial_state());
        assert_eq!(4, compute_scp(&abs, &[0, 1, 2], &costs).compute_heuristic(&states));
        assert_eq!(3, compute_scp(&abs, &[1, 0, 2], &costs).compute_heuristic(&states));

        let mut order = vec![0, 1, 2];
        let mut incumbent = CostPartitioningHeuristic::new();
        let mut h = -1;
        let n = optimize_order_with_hill_climbing(&abs, &costs, &states, &mut order, &mut incumbent, &mut h,
            &CountdownTimer::unlimited(), Verbosity::Silent);
        // [1, 0, 2] (h = 3) then [2, 0, 1] (h = 4) within the first pass
        assert_eq!(2, n);
        assert_eq!(vec![2, 0, 1], order);
        assert_eq!(4, h);
        assert_eq!(4, incumbent.compute_heuristic(&states));
    }
}
