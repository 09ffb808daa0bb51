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

//! This module provides the f-preserving shrink strategy. States are put in
//! buckets according to their `(f, h)` values where `f = g + h`. The buckets
//! with high f and low h are the first ones to be combined; the dead states
//! (infinite g or h) are combined before anything else.

use rand::{rngs::StdRng, SeedableRng};

use crate::{compute_bucket_based_equivalence, Cost, Distances, ShrinkStrategy,
    StateEquivalenceRelation, TransitionSystem, INF};

/// Which end of a value range gets combined first
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HighLow {
    High,
    Low,
}

#[derive(Debug, Clone)]
pub struct ShrinkFH {
    f_start: HighLow,
    h_start: HighLow,
    rng: StdRng,
}

impl ShrinkFH {
    pub fn new(f_start: HighLow, h_start: HighLow, seed: u64) -> Self {
        ShrinkFH { f_start, h_start, rng: StdRng::seed_from_u64(seed) }
    }

    fn partition_into_buckets(&self, ts: &TransitionSystem, distances: &Distances) -> Vec<Vec<usize>> {
        let mut dead = vec![];
        let mut by_f_and_h: Vec<((Cost, Cost), Vec<usize>)> = vec![];
        for state in 0..ts.num_states() {
            let g = distances.init_distance(state);
            let h = distances.goal_distance(state);
            if g == INF || h == INF {
                dead.push(state);
                continue;
            }
            let key = (g + h, h);
            match by_f_and_h.iter_mut().find(|(k, _)| *k == key) {
                Some((_, bucket)) => bucket.push(state),
                None => by_f_and_h.push((key, vec![state])),
            }
        }
        let f_sign = if self.f_start == HighLow::High { -1 } else { 1 };
        let h_sign = if self.h_start == HighLow::High { -1 } else { 1 };
        by_f_and_h.sort_unstable_by_key(|((f, h), _)| (f_sign * *f as i64, h_sign * *h as i64));

        let mut buckets = Vec::with_capacity(by_f_and_h.len() + 1);
        if !dead.is_empty() {
            buckets.push(dead);
        }
        buckets.extend(by_f_and_h.into_iter().map(|(_, b)| b));
        buckets
    }
}

impl Default for ShrinkFH {
    fn default() -> Self {
        Self::new(HighLow::High, HighLow::Low, 0)
    }
}

impl ShrinkStrategy for ShrinkFH {
    fn name(&self) -> &str {
        "f-preserving"
    }
    fn requires_init_distances(&self) -> bool {
        true
    }
    fn requires_goal_distances(&self) -> bool {
        true
    }
    fn compute_equivalence_relation(
        &mut self,
        ts: &TransitionSystem,
        distances: &Distances,
        _costs: &[Cost],
        target_size: usize,
    ) -> StateEquivalenceRelation {
        let buckets = self.partition_into_buckets(ts, distances);
        compute_bucket_based_equivalence(&buckets, target_size, &mut self.rng)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
