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
//! This module provides an order generator which returns random orders. It
//! either draws a fresh permutation for every call or sticks to one random
//! permutation of the factor indices drawn once per task.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{Abstraction, Cost, Order, OrderGenerator, Task, Verbosity};

pub struct RandomOrders {
    /// When set, the same permutation of factor indices is used every time
    fixed_order: bool,
    /// The permutation of factor indices drawn on initialization
    factor_order: Vec<usize>,
    rng: StdRng,
}
impl RandomOrders {
    pub fn new(fixed_order: bool, seed: u64) -> Self {
        RandomOrders { fixed_order, factor_order: vec![], rng: StdRng::seed_from_u64(seed) }
    }
}
impl Default for RandomOrders {
    fn default() -> Self {
        Self::new(false, 0)
    }
}

impl OrderGenerator for RandomOrders {
    fn initialize(&mut self, task: &dyn Task) {
        if self.fixed_order {
            // a run without cloning never creates more than 2n - 1 factors
            let nb_factors = (2 * task.nb_variables()).saturating_sub(1);
            self.factor_order = (0..nb_factors).collect();
            self.factor_order.shuffle(&mut self.rng);
        }
    }
    fn compute_order(
        &mut self,
        abstractions: &[Abstraction],
        _costs: &[Cost],
        _abstract_states: Option<&[Option<usize>]>,
        _verbosity: Verbosity,
    ) -> Order {
        if !self.fixed_order {
            let mut order = (0..abstractions.len()).collect::<Order>();
            order.shuffle(&mut self.rng);
            return order;
        }
        let mut taken = vec![false; abstractions.len()];
        let mut order = Vec::with_capacity(abstractions.len());
        for factor in self.factor_order.iter().copied() {
            for (pos, abstraction) in abstractions.iter().enumerate() {
                if !taken[pos] && abstraction.fts_index() == factor {
                    taken[pos] = true;
                    order.push(pos);
                }
            }
        }
        // clones may live beyond the last index of the permutation
        order.extend((0..abstractions.len()).filter(|pos| !taken[*pos]));
        order
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
