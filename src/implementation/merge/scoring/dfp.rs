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
//! This module provides the DFP scoring function. Each label gets a rank in
//! every factor: the lowest goal distance of a state it leads to. Factors
//! which both have a low ranked label in common are likely to interact close
//! to the goal, which makes their product informative.

use crate::{FactoredTransitionSystem, MergeScoringFunction, INF};

#[derive(Debug, Default, Clone, Copy)]
pub struct Dfp;

/// The rank of every label in the factor at `index` (`-1` when the factor
/// does not know about the label)
fn compute_label_ranks(fts: &FactoredTransitionSystem, index: usize) -> Vec<i32> {
    let ts = fts.transition_system(index);
    let distances = fts.distances(index);
    let mut ranks = vec![-1; fts.labels().max_size()];
    for group in ts.groups() {
        let rank = group.transitions().iter()
            .map(|t| distances.goal_distance(t.target))
            .min()
            .unwrap_or(INF);
        for label in group.labels().iter().copied() {
            ranks[label] = rank;
        }
    }
    ranks
}

impl MergeScoringFunction for Dfp {
    fn name(&self) -> &str {
        "dfp"
    }
    fn compute_scores(&mut self, fts: &FactoredTransitionSystem, candidates: &[(usize, usize)]) -> Vec<f64> {
        let mut ranks: Vec<Option<Vec<i32>>> = vec![None; fts.size()];
        let mut scores = Vec::with_capacity(candidates.len());
        for (i, j) in candidates.iter().copied() {
            for index in [i, j] {
                if ranks[index].is_none() {
                    ranks[index] = Some(compute_label_ranks(fts, index));
                }
            }
            let mut weight = INF;
            if let (Some(ranks_i), Some(ranks_j)) = (ranks[i].as_ref(), ranks[j].as_ref()) {
                for (ri, rj) in ranks_i.iter().copied().zip(ranks_j.iter().copied()) {
                    if ri != -1 && rj != -1 {
                        weight = weight.min(ri.max(rj));
                    }
                }
            }
            scores.push(weight as f64);
        }
        scores
    }
    fn requires_goal_distances(&self) -> bool {
        true
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
