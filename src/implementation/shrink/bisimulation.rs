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

//! This module provides the bisimulation shrink strategy. It starts from the
//! partition of the states by goal distance and refines it until the states
//! of each class have the same successor classes for every label group (or
//! until the size limit forbids any further split).
//!
//! The greedy variant only looks at the transitions which lie on an optimal
//! path to the goal, which yields coarser abstractions that still preserve
//! the goal distances.

use fxhash::FxHashMap;

use crate::{Cost, Distances, ShrinkStrategy, StateEquivalenceRelation, TransitionSystem, INF};

/// What to do when a split would exceed the size limit
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AtLimit {
    /// Stop refining altogether
    Return,
    /// Skip that split and keep on refining the other classes
    UseUp,
}

#[derive(Debug, Copy, Clone)]
pub struct ShrinkBisimulation {
    greedy: bool,
    at_limit: AtLimit,
}
impl ShrinkBisimulation {
    pub fn new(greedy: bool, at_limit: AtLimit) -> Self {
        ShrinkBisimulation { greedy, at_limit }
    }

    /// Groups the states by (goal distance, goal flag). When there are more
    /// such groups than allowed, the ones farthest from the goal share one
    /// group.
    fn initial_groups(ts: &TransitionSystem, distances: &Distances, target_size: usize) -> (Vec<usize>, usize) {
        let mut keys = (0..ts.num_states())
            .map(|s| (distances.goal_distance(s), !ts.is_goal_state(s)))
            .collect::<Vec<_>>();
        let mut distinct = keys.clone();
        distinct.sort_unstable();
        distinct.dedup();
        let limit = target_size.max(1);
        if distinct.len() > limit {
            let cap = distinct[limit - 1];
            for k in keys.iter_mut() {
                if *k > cap {
                    *k = cap;
                }
            }
            distinct.truncate(limit);
        }
        let index = distinct.iter().enumerate().map(|(i, k)| (*k, i)).collect::<FxHashMap<_, _>>();
        let groups = keys.iter().map(|k| index[k]).collect();
        (groups, distinct.len())
    }

    /// The (label group, successor class) pairs of every state
    fn successors(&self, ts: &TransitionSystem, distances: &Distances, costs: &[Cost]) -> Vec<Vec<(usize, usize)>> {
        let mut succ = vec![vec![]; ts.num_states()];
        for (gid, group) in ts.groups().iter().enumerate() {
            let cost = group.cost(costs);
            for t in group.transitions() {
                if self.greedy {
                    let h_src = distances.goal_distance(t.src);
                    let h_tgt = distances.goal_distance(t.target);
                    if h_tgt == INF || cost == INF || h_tgt + cost != h_src {
                        continue;
                    }
                }
                succ[t.src].push((gid, t.target));
            }
        }
        succ
    }
}

impl Default for ShrinkBisimulation {
    fn default() -> Self {
        Self::new(false, AtLimit::Return)
    }
}

impl ShrinkStrategy for ShrinkBisimulation {
    fn name(&self) -> &str {
        "bisimulation"
    }
    fn requires_init_distances(&self) -> bool {
        false
    }
    fn requires_goal_distances(&self) -> bool {
        true
    }
    fn compute_equivalence_relation(
        &mut self,
        ts: &TransitionSystem,
        distances: &Distances,
        costs: &[Cost],
        target_size: usize,
    ) -> StateEquivalenceRelation {
        let num_states = ts.num_states();
        let (mut group_of, mut num_groups) = Self::initial_groups(ts, distances, target_size);
        let successors = self.successors(ts, distances, costs);

        let mut stable = false;
        while !stable {
            stable = true;
            let mut signatures = (0..num_states)
                .map(|s| {
                    let mut sig = successors[s].iter()
                        .map(|(g, t)| (*g, group_of[*t]))
                        .collect::<Vec<_>>();
                    sig.sort_unstable();
                    sig.dedup();
                    (group_of[s], sig, s)
                })
                .collect::<Vec<_>>();
            signatures.sort_unstable();

            let mut start = 0;
            'blocks: while start < signatures.len() {
                let group = signatures[start].0;
                let end = start + signatures[start..].iter().take_while(|(g, _, _)| *g == group).count();
                let block = &signatures[start..end];
                let nb_new = 1 + block.windows(2).filter(|w| w[0].1 != w[1].1).count();

                if nb_new > 1 {
                    if num_groups + nb_new - 1 > target_size {
                        match self.at_limit {
                            AtLimit::Return => break 'blocks,
                            AtLimit::UseUp => {
                                start = end;
                                continue 'blocks;
                            },
                        }
                    }
                    let mut current = group;
                    for (k, (_, sig, s)) in block.iter().enumerate() {
                        if k > 0 && *sig != block[k - 1].1 {
                            current = num_groups;
                            num_groups += 1;
                        }
                        group_of[*s] = current;
                    }
                    stable = false;
                }
                start = end;
            }
            if self.at_limit == AtLimit::Return && num_groups >= target_size {
                break;
            }
        }

        let mut relation = vec![vec![]; num_groups];
        for (s, g) in group_of.iter().copied().enumerate() {
            relation[g].push(s);
        }
        relation.retain(|c| !c.is_empty());
        relation
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
