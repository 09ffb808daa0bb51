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
//! This module provides the diversifier: it remembers, for a fixed set of
//! sample states, the best heuristic value any of the cost partitionings
//! accepted so far assigns to them. A new cost partitioning is only worth
//! keeping if it beats that portfolio on at least one sample.

use crate::{compute_abstract_states, Abstraction, CostPartitioningHeuristic, Cost};

pub struct Diversifier {
    /// The abstract states of each sample
    abstract_states: Vec<Vec<Option<usize>>>,
    /// The best value found so far for each sample
    portfolio_h: Vec<Cost>,
}

impl Diversifier {
    pub fn new(abstractions: &[Abstraction], samples: &[Vec<usize>]) -> Self {
        let abstract_states = samples.iter()
            .map(|sample| compute_abstract_states(abstractions, sample))
            .collect::<Vec<_>>();
        let portfolio_h = vec![-1; abstract_states.len()];
        Diversifier { abstract_states, portfolio_h }
    }
    pub fn nb_samples(&self) -> usize {
        self.abstract_states.len()
    }
    /// True iff the heuristic improves the portfolio on some sample. The
    /// portfolio is updated accordingly.
    pub fn is_diverse(&mut self, heuristic: &CostPartitioningHeuristic) -> bool {
        let mut diverse = false;
        for (states, best) in self.abstract_states.iter().zip(self.portfolio_h.iter_mut()) {
            let h = heuristic.compute_heuristic(states);
            if h > *best {
                *best = h;
                diverse = true;
            }
        }
        diverse
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
