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
//! This module provides a scoring function which singles out one candidate
//! at random.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{FactoredTransitionSystem, MergeScoringFunction};

pub struct SingleRandom {
    rng: StdRng,
}
impl SingleRandom {
    pub fn new(seed: u64) -> Self {
        SingleRandom { rng: StdRng::seed_from_u64(seed) }
    }
}

impl MergeScoringFunction for SingleRandom {
    fn name(&self) -> &str {
        "single random"
    }
    fn compute_scores(&mut self, _fts: &FactoredTransitionSystem, candidates: &[(usize, usize)]) -> Vec<f64> {
        let mut scores = vec![f64::INFINITY; candidates.len()];
        if !candidates.is_empty() {
            let chosen = self.rng.gen_range(0..candidates.len());
            scores[chosen] = 0.0;
        }
        scores
    }
    fn is_tie_breaking(&self) -> bool {
        true
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
