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

//! This module provides the shortest path computations over one transition
//! system: the distance from the initial state to every state and the distance
//! from every state to the closest goal state. Both are computed with
//! Dijkstra's algorithm under a vector of label costs; a label group costs as
//! much as its cheapest label and labels with an infinite cost are unusable.

use std::cmp::Ordering;

use binary_heap_plus::BinaryHeap;
use compare::Compare;

use crate::{path_addition, Cost, StateEquivalenceRelation, TransitionSystem, INF};

/// The cached init and goal distances of one factor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Distances {
    init_distances: Vec<Cost>,
    goal_distances: Vec<Cost>,
    init_computed: bool,
    goal_computed: bool,
}

impl Distances {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn are_init_distances_computed(&self) -> bool {
        self.init_computed
    }
    pub fn are_goal_distances_computed(&self) -> bool {
        self.goal_computed
    }
    pub fn init_distance(&self, state: usize) -> Cost {
        debug_assert!(self.init_computed);
        self.init_distances[state]
    }
    pub fn goal_distance(&self, state: usize) -> Cost {
        debug_assert!(self.goal_computed);
        self.goal_distances[state]
    }
    pub fn init_distances(&self) -> &[Cost] {
        &self.init_distances
    }
    pub fn goal_distances(&self) -> &[Cost] {
        &self.goal_distances
    }

    /// (Re)computes the requested distances of `ts` under the given costs
    pub fn compute_distances(&mut self, ts: &TransitionSystem, costs: &[Cost], compute_init: bool, compute_goal: bool) {
        if compute_init {
            self.init_distances = compute_init_distances(ts, costs);
            self.init_computed = true;
        }
        if compute_goal {
            self.goal_distances = compute_goal_distances(ts, costs);
            self.goal_computed = true;
        }
    }

    /// Updates the distances after `ts` has been abstracted with the given
    /// equivalence relation (`ts` is the *abstracted* system). When each class
    /// only gathers states with equal distances, those values are kept;
    /// otherwise the distances are recomputed. Distances that had not been
    /// computed before are left unset.
    pub fn apply_abstraction(&mut self, ts: &TransitionSystem, costs: &[Cost], equivalence: &StateEquivalenceRelation) {
        let init = self.init_computed;
        let goal = self.goal_computed;
        let mut must_recompute = false;
        let mut new_init = vec![INF; equivalence.len()];
        let mut new_goal = vec![INF; equivalence.len()];
        for (class, states) in equivalence.iter().enumerate() {
            let Some(first) = states.first().copied() else { continue };
            if init {
                let d = self.init_distances[first];
                must_recompute |= states.iter().any(|s| self.init_distances[*s] != d);
                new_init[class] = d;
            }
            if goal {
                let d = self.goal_distances[first];
                must_recompute |= states.iter().any(|s| self.goal_distances[*s] != d);
                new_goal[class] = d;
            }
        }
        if must_recompute {
            self.compute_distances(ts, costs, init, goal);
        } else {
            if init {
                self.init_distances = new_init;
            }
            if goal {
                self.goal_distances = new_goal;
            }
        }
    }
}

/// Orders the dijkstra queue so that the closest state pops first
#[derive(Debug, Default, Copy, Clone)]
struct ClosestFirst;
impl Compare<(Cost, usize)> for ClosestFirst {
    fn compare(&self, l: &(Cost, usize), r: &(Cost, usize)) -> Ordering {
        r.0.cmp(&l.0).then_with(|| r.1.cmp(&l.1))
    }
}

/// Runs Dijkstra over the given adjacency lists from the given sources
fn dijkstra(adjacency: &[Vec<(usize, Cost)>], sources: impl Iterator<Item = usize>) -> Vec<Cost> {
    let mut distances = vec![INF; adjacency.len()];
    let mut queue = BinaryHeap::from_vec_cmp(vec![], ClosestFirst);
    for s in sources {
        distances[s] = 0;
        queue.push((0, s));
    }
    while let Some((d, s)) = queue.pop() {
        if d > distances[s] {
            continue;
        }
        for (succ, cost) in adjacency[s].iter().copied() {
            let alt = path_addition(d, cost);
            if alt < distances[succ] {
                distances[succ] = alt;
                queue.push((alt, succ));
            }
        }
    }
    distances
}

fn adjacency(ts: &TransitionSystem, costs: &[Cost], backward: bool) -> Vec<Vec<(usize, Cost)>> {
    let mut adjacency = vec![vec![]; ts.num_states()];
    for group in ts.groups() {
        let cost = group.cost(costs);
        if cost == INF {
            continue;
        }
        for t in group.transitions().iter().filter(|t| !t.is_self_loop()) {
            if backward {
                adjacency[t.target].push((t.src, cost));
            } else {
                adjacency[t.src].push((t.target, cost));
            }
        }
    }
    adjacency
}

/// Distances from the initial state of `ts` to each of its states
pub fn compute_init_distances(ts: &TransitionSystem, costs: &[Cost]) -> Vec<Cost> {
    let adjacency = adjacency(ts, costs, false);
    dijkstra(&adjacency, ts.init_state().into_iter())
}

/// Distances from each state of `ts` to its closest goal state
pub fn compute_goal_distances(ts: &TransitionSystem, costs: &[Cost]) -> Vec<Cost> {
    let adjacency = adjacency(ts, costs, true);
    dijkstra(&adjacency, ts.goal_states())
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_distances {
    use crate::*;

    /// x in {0,1,2}: a: 0 -> 1 (cost 1), b: 1 -> 2 (cost 5), c: 0 -> 2 (cost 7)
    fn chain() -> TransitionSystem {
        TransitionSystem::new(
            vec![0], 3, vec![false, false, true], Some(0),
            vec![
                LabelGroup::new(vec![0], vec![Transition::new(0, 1)]),
                LabelGroup::new(vec![1], vec![Transition::new(1, 2)]),
                LabelGroup::new(vec![2], vec![Transition::new(0, 2)]),
            ])
    }

    #[test]
    fn init_distances_follow_the_cheapest_path() {
        let ts = chain();
        assert_eq!(vec![0, 1, 6], compute_init_distances(&ts, &[1, 5, 7]));
        assert_eq!(vec![0, 1, 3], compute_init_distances(&ts, &[1, 5, 3]));
    }
    #[test]
    fn goal_distances_follow_the_cheapest_path() {
        let ts = chain();
        assert_eq!(vec![6, 5, 0], compute_goal_distances(&ts, &[1, 5, 7]));
    }
    #[test]
    fn infinite_labels_are_unusable() {
        let ts = chain();
        assert_eq!(vec![INF, 5, 0], compute_goal_distances(&ts, &[INF, 5, INF]));
        assert_eq!(vec![0, INF, INF], compute_init_distances(&ts, &[INF, 5, INF]));
    }
    #[test]
    fn homogeneous_abstraction_keeps_the_distances() {
        // same as chain, with an extra unreachable state 3 -> 2
        let mut ts = TransitionSystem::new(
            vec![0], 4, vec![false, false, true, false], Some(0),
            vec![
                LabelGroup::new(vec![0], vec![Transition::new(0, 1), Transition::new(3, 2)]),
                LabelGroup::new(vec![1], vec![Transition::new(1, 2)]),
                LabelGroup::new(vec![2], vec![Transition::new(0, 2)]),
            ]);
        let costs = [1, 5, 7];
        let mut distances = Distances::new();
        distances.compute_distances(&ts, &costs, true, true);
        assert_eq!(&[0, 1, 6, INF], distances.init_distances());
        // drop the unreachable state
        let equivalence = vec![vec![0], vec![1], vec![2]];
        ts.apply_abstraction(&equivalence, &[Some(0), Some(1), Some(2), None]);
        distances.apply_abstraction(&ts, &costs, &equivalence);
        assert_eq!(&[0, 1, 6], distances.init_distances());
        assert_eq!(&[6, 5, 0], distances.goal_distances());
    }
    #[test]
    fn heterogeneous_abstraction_recomputes_the_distances() {
        let mut ts = chain();
        let costs = [1, 5, 7];
        let mut distances = Distances::new();
        distances.compute_distances(&ts, &costs, false, true);
        let equivalence = vec![vec![0, 1], vec![2]];
        ts.apply_abstraction(&equivalence, &[Some(0), Some(0), Some(1)]);
        distances.apply_abstraction(&ts, &costs, &equivalence);
        assert!(!distances.are_init_distances_computed());
        assert_eq!(&[5, 0], distances.goal_distances());
    }
}
