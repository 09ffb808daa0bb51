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

//! This module provides the precomputed linear merge strategy: the variables
//! are sorted once and for all, the first two atomic factors are merged, then
//! the product is merged with the next atomic factor until the order is
//! exhausted.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{Error, FactoredTransitionSystem, MergeStrategy, MergeStrategyFactory, NextMerge, Task};

/// The order in which the variables enter the linear merge tree
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum LinearOrder {
    /// From the last variable to the first one
    Level,
    /// From the first variable to the last one
    #[default]
    ReverseLevel,
    /// A random order
    Random,
}

#[derive(Debug, Clone)]
pub struct MergeStrategyFactoryPrecomputed {
    order: LinearOrder,
    rng: StdRng,
}
impl MergeStrategyFactoryPrecomputed {
    pub fn new(order: LinearOrder, seed: u64) -> Self {
        MergeStrategyFactoryPrecomputed { order, rng: StdRng::seed_from_u64(seed) }
    }
}
impl Default for MergeStrategyFactoryPrecomputed {
    fn default() -> Self {
        Self::new(LinearOrder::default(), 0)
    }
}

impl MergeStrategyFactory for MergeStrategyFactoryPrecomputed {
    fn name(&self) -> &str {
        "precomputed linear"
    }
    fn compute_merge_strategy(
        &mut self,
        task: &dyn Task,
        _fts: &FactoredTransitionSystem,
    ) -> Result<Box<dyn MergeStrategy>, Error> {
        let mut order = (0..task.nb_variables()).collect::<Vec<_>>();
        match self.order {
            LinearOrder::ReverseLevel => {}
            LinearOrder::Level => order.reverse(),
            LinearOrder::Random => order.shuffle(&mut self.rng),
        }
        Ok(Box::new(LinearMergeStrategy { order, next: 0 }))
    }
    fn requires_init_distances(&self) -> bool {
        false
    }
    fn requires_goal_distances(&self) -> bool {
        false
    }
}

struct LinearMergeStrategy {
    order: Vec<usize>,
    /// Position of the next variable to enter the tree
    next: usize,
}

impl MergeStrategy for LinearMergeStrategy {
    fn get_next(&mut self, fts: &FactoredTransitionSystem) -> NextMerge {
        let pair = if self.next == 0 {
            if self.order.len() < 2 {
                return NextMerge::stop();
            }
            self.next = 2;
            (self.order[0], self.order[1])
        } else {
            let Some(var) = self.order.get(self.next).copied() else {
                return NextMerge::stop();
            };
            self.next += 1;
            (fts.size() - 1, var)
        };
        if fts.is_active(pair.0) && fts.is_active(pair.1) {
            NextMerge::merge(pair.0, pair.1)
        } else {
            NextMerge::stop()
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
