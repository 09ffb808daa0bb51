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
//! This module provides the building blocks of saturated cost partitioning:
//! goal distances of an abstraction under a cost vector, the saturated cost
//! of every label (the part of its cost the abstraction actually needs to
//! preserve its goal distances) and the reduction of the remaining costs.
//! It also hosts the quantities the greedy order generators rank abstractions
//! with: surplus costs and costs stolen by one abstraction.

use crate::{compute_goal_distances, left_subtraction, Abstraction, Cost, LabelId, Order, INF, MINUS_INF};

/// The identity order over `n` abstractions
pub fn default_order(n: usize) -> Order {
    (0..n).collect()
}

/// Goal distances of the abstraction under the given costs. When the
/// abstraction carries a label mapping, a label of its transition system
/// costs as much as the cheapest original label it stands for.
pub fn compute_goal_distances_for_abstraction(abstraction: &Abstraction, costs: &[Cost]) -> Vec<Cost> {
    match abstraction.label_mapping() {
        None => compute_goal_distances(abstraction.transition_system(), costs),
        Some(mapping) => {
            let size = mapping.iter().max().map_or(0, |m| m + 1);
            let mut abstract_costs = vec![-1; size];
            for (label, cost) in mapping.iter().copied().zip(costs.iter().copied()) {
                let entry = &mut abstract_costs[label];
                *entry = if *entry == -1 { cost } else { (*entry).min(cost) };
            }
            compute_goal_distances(abstraction.transition_system(), &abstract_costs)
        }
    }
}

/// For each label of the transition system, the original labels it stands
/// for.
fn inverse_label_mapping(mapping: &[LabelId]) -> Vec<Vec<LabelId>> {
    let size = mapping.iter().max().map_or(0, |m| m + 1);
    let mut inverse = vec![vec![]; size];
    for (original, label) in mapping.iter().copied().enumerate() {
        inverse[label].push(original);
    }
    inverse
}

/// The saturated cost of each of the `num_labels` labels: the maximum of
/// `h(src) - h(target)` over the transitions of its group that lead to a
/// state with finite goal distance (`MINUS_INF` when there is none).
/// Labels the abstraction does not know about keep the value `-1`.
pub fn compute_saturated_costs_for_abstraction(
    abstraction: &Abstraction,
    goal_distances: &[Cost],
    num_labels: usize,
) -> Vec<Cost> {
    let inverse = abstraction.label_mapping().map(inverse_label_mapping);
    let mut saturated = vec![-1; num_labels];
    for group in abstraction.transition_system().groups() {
        let mut group_cost = MINUS_INF;
        for t in group.transitions() {
            let h_target = goal_distances[t.target];
            if h_target == INF {
                continue;
            }
            // h(src) is infinite when all labels of the group cost INF
            let h_src = goal_distances[t.src];
            let diff = if h_src == INF { INF } else { h_src - h_target };
            group_cost = group_cost.max(diff);
        }
        for label in group.labels().iter().copied() {
            match &inverse {
                None => saturated[label] = group_cost,
                Some(inverse) => {
                    for original in inverse.get(label).into_iter().flatten().copied() {
                        saturated[original] = group_cost;
                    }
                }
            }
        }
    }
    saturated
}

/// Subtracts the saturated costs from the remaining ones. Labels that are no
/// longer in use (`-1`) are skipped, infinite costs remain infinite and a
/// label whose saturated cost is `MINUS_INF` becomes unusable.
pub fn reduce_costs(remaining: &mut [Cost], saturated: &[Cost]) {
    for (r, s) in remaining.iter_mut().zip(saturated.iter().copied()) {
        if *r == -1 {
            continue;
        }
        if s == MINUS_INF {
            *r = INF;
        } else if *r != INF {
            *r -= s;
            debug_assert!(*r >= 0);
        }
    }
}

/// The costs left once every abstraction took its saturated costs
pub fn compute_all_surplus_costs(costs: &[Cost], saturated_by_abstraction: &[Vec<Cost>]) -> Vec<Cost> {
    let mut surplus = costs.to_vec();
    for saturated in saturated_by_abstraction.iter() {
        for (s, sat) in surplus.iter_mut().zip(saturated.iter().copied()) {
            *s = left_subtraction(*s, sat);
        }
    }
    surplus
}

fn compute_stolen_costs(wanted: Cost, surplus: Cost) -> Cost {
    if wanted == MINUS_INF || surplus == INF {
        0
    } else if surplus == MINUS_INF {
        wanted.max(0)
    } else {
        wanted.min(-surplus).max(0)
    }
}

/// The amount of the scarce costs an abstraction takes for itself: the part
/// of its saturated costs which other abstractions also want.
pub fn compute_costs_stolen_by_heuristic(saturated: &[Cost], surplus: &[Cost]) -> Cost {
    saturated.iter().copied()
        .zip(surplus.iter().copied())
        .map(|(wanted, surplus)| compute_stolen_costs(wanted, surplus))
        .fold(0, Cost::saturating_add)
}

/// How the greedy order generators rank the abstractions
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ScoringFunction {
    MaxHeuristic,
    MinStolenCosts,
    #[default]
    MaxHeuristicPerStolenCosts,
}

/// The score of an abstraction whose heuristic value is `h` and which steals
/// `stolen` costs. Higher scores come first.
pub fn compute_score(h: Cost, stolen: Cost, scoring: ScoringFunction) -> f64 {
    let stolen = stolen.max(1);
    match scoring {
        ScoringFunction::MaxHeuristic => h as f64,
        ScoringFunction::MinStolenCosts => -(stolen as f64),
        ScoringFunction::MaxHeuristicPerStolenCosts => h as f64 / stolen as f64,
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_scp_utils {
    use crate::*;

    /// x in {0, 1, 2}; a: 0 -> 1 (cost 1) ; b: 1 -> 2 (cost 2) ; c: 0 -> 2 (cost 5)
    /// goal x = 2
    fn chain() -> ExplicitTask {
        ExplicitTask::new(
            vec![3],
            vec![
                Operator { name: "a".into(), cost: 1, preconditions: vec![Fact::new(0, 0)], effects: vec![Fact::new(0, 1)] },
                Operator { name: "b".into(), cost: 2, preconditions: vec![Fact::new(0, 1)], effects: vec![Fact::new(0, 2)] },
                Operator { name: "c".into(), cost: 5, preconditions: vec![Fact::new(0, 0)], effects: vec![Fact::new(0, 2)] },
            ],
            vec![0],
            vec![Fact::new(0, 2)],
        )
    }
    fn abstraction(task: &ExplicitTask) -> Abstraction {
        let fts = FactoredTransitionSystem::atomic(task, true, true);
        compute_abstractions_for_factors(&fts, &[0]).remove(0)
    }

    #[test]
    fn goal_distances_use_the_given_costs() {
        let task = chain();
        let abs = abstraction(&task);
        assert_eq!(vec![3, 2, 0], compute_goal_distances_for_abstraction(&abs, &[1, 2, 5]));
        assert_eq!(vec![5, INF, 0], compute_goal_distances_for_abstraction(&abs, &[1, INF, 5]));
    }
    #[test]
    fn goal_distances_follow_the_label_mapping() {
        let task = chain();
        // the identity mapping changes nothing
        let abs = abstraction(&task).with_label_mapping(vec![0, 1, 2]);
        assert_eq!(vec![3, 2, 0], compute_goal_distances_for_abstraction(&abs, &[1, 2, 5]));
    }
    #[test]
    fn saturated_costs_are_the_largest_needed_differences() {
        let task = chain();
        let abs = abstraction(&task);
        let h = compute_goal_distances_for_abstraction(&abs, &[1, 2, 5]);
        let sat = compute_saturated_costs_for_abstraction(&abs, &h, 3);
        assert_eq!(vec![1, 2, 3], sat);
    }
    #[test]
    fn reduce_costs_keeps_infinity_and_skips_unused_labels() {
        let mut remaining = vec![4, INF, -1, 3];
        reduce_costs(&mut remaining, &[1, 2, -1, MINUS_INF]);
        assert_eq!(vec![3, INF, -1, INF], remaining);
    }
    #[test]
    fn negative_saturated_costs_give_costs_back() {
        let mut remaining = vec![2];
        reduce_costs(&mut remaining, &[-3]);
        assert_eq!(vec![5], remaining);
    }
    #[test]
    fn surplus_costs_subtract_every_saturated_cost() {
        let surplus = compute_all_surplus_costs(&[5, 5], &[vec![3, MINUS_INF], vec![4, 1]]);
        assert_eq!(vec![-2, INF], surplus);
    }
    #[test]
    fn stolen_costs_are_bounded_by_the_deficit() {
        assert_eq!(2, compute_costs_stolen_by_heuristic(&[3, MINUS_INF], &[-2, INF]));
        assert_eq!(0, compute_costs_stolen_by_heuristic(&[3], &[1]));
        assert_eq!(1, compute_costs_stolen_by_heuristic(&[1], &[-2]));
    }
    #[test]
    fn scores_rank_abstractions() {
        assert_eq!(6.0, compute_score(6, 0, ScoringFunction::MaxHeuristic));
        assert_eq!(-1.0, compute_score(6, 0, ScoringFunction::MinStolenCosts));
        assert_eq!(-4.0, compute_score(6, 4, ScoringFunction::MinStolenCosts));
        assert_eq!(1.5, compute_score(6, 4, ScoringFunction::MaxHeuristicPerStolenCosts));
    }
}
