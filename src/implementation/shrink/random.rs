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

//! This module provides the random shrink strategy: all states sit in one
//! bucket and random pairs of classes are combined until the target size is
//! met.

use rand::{rngs::StdRng, SeedableRng};

use crate::{compute_bucket_based_equivalence, Cost, Distances, ShrinkStrategy,
    StateEquivalenceRelation, TransitionSystem};

#[derive(Debug, Clone)]
pub struct ShrinkRandom {
    rng: StdRng,
}
impl ShrinkRandom {
    pub fn new(seed: u64) -> Self {
        ShrinkRandom { rng: StdRng::seed_from_u64(seed) }
    }
}

impl ShrinkStrategy for ShrinkRandom {
    fn name(&self) -> &str {
        "random"
    }
    fn requires_init_distances(&self) -> bool {
        false
    }
    fn requires_goal_distances(&self) -> bool {
        false
    }
    fn compute_equivalence_relation(
        &mut self,
        ts: &TransitionSystem,
        _distances: &Distances,
        _costs: &[Cost],
        target_size: usize,
    ) -> StateEquivalenceRelation {
        let bucket = (0..ts.num_states()).collect::<Vec<_>>();
        compute_bucket_based_equivalence(&[bucket], target_size, &mut self.rng)
    }
}

#[cfg(test)]
mod test_shrink_random {
    use crate::*;

    #[test]
    fn it_meets_the_target_and_keeps_every_state() {
        let ts = TransitionSystem::new(vec![0], 6, vec![true; 6], Some(0), vec![]);
        let mut random = ShrinkRandom::new(3);
        let relation = random.compute_equivalence_relation(&ts, &Distances::new(), &[], 2);
        assert_eq!(2, relation.len());
        let mut states = relation.into_iter().flatten().collect::<Vec<_>>();
        states.sort_unstable();
        assert_eq!(vec![0, 1, 2, 3, 4, 5], states);
    }
    #[test]
    fn same_seed_same_relation() {
        let ts = TransitionSystem::new(vec![0], 6, vec![true; 6], Some(0), vec![]);
        let a = ShrinkRandom::new(3).compute_equivalence_relation(&ts, &Distances::new(), &[], 3);
        let b = ShrinkRandom::new(3).compute_equivalence_relation(&ts, &Distances::new(), &[], 3);
        assert_eq!(a, b);
    }
}
