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
//! This module provides an order generator based on the way the factors were
//! built: atomic factors and product factors are each ordered by their index
//! in the factored transition system.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{Abstraction, Cost, Order, OrderGenerator, Task, Verbosity};

/// How atomic factors are ordered among themselves
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum AtomicOrder {
    /// Variables of the highest level (i.e. of the lowest index) first
    #[default]
    ReverseLevel,
    Level,
    Random,
}

/// How product factors are ordered among themselves
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ProductOrder {
    #[default]
    OldToNew,
    NewToOld,
    Random,
}

pub struct MasOrders {
    atomic_order: AtomicOrder,
    product_order: ProductOrder,
    atomic_before_product: bool,
    nb_variables: usize,
    rng: StdRng,
}
impl MasOrders {
    pub fn new(atomic_order: AtomicOrder, product_order: ProductOrder, atomic_before_product: bool, seed: u64) -> Self {
        MasOrders { atomic_order, product_order, atomic_before_product, nb_variables: 0, rng: StdRng::seed_from_u64(seed) }
    }
}
impl Default for MasOrders {
    fn default() -> Self {
        Self::new(AtomicOrder::default(), ProductOrder::default(), false, 0)
    }
}

impl OrderGenerator for MasOrders {
    fn initialize(&mut self, task: &dyn Task) {
        self.nb_variables = task.nb_variables();
    }
    fn compute_order(
        &mut self,
        abstractions: &[Abstraction],
        _costs: &[Cost],
        _abstract_states: Option<&[Option<usize>]>,
        _verbosity: Verbosity,
    ) -> Order {
        let mut atomic = vec![];
        let mut product = vec![];
        for (pos, abstraction) in abstractions.iter().enumerate() {
            if abstraction.fts_index() < self.nb_variables {
                atomic.push(pos);
            } else {
                product.push(pos);
            }
        }
        atomic.sort_by_key(|pos| abstractions[*pos].fts_index());
        product.sort_by_key(|pos| abstractions[*pos].fts_index());

        match self.atomic_order {
            AtomicOrder::ReverseLevel => {},
            AtomicOrder::Level => atomic.reverse(),
            AtomicOrder::Random => atomic.shuffle(&mut self.rng),
        }
        match self.product_order {
            ProductOrder::OldToNew => {},
            ProductOrder::NewToOld => product.reverse(),
            ProductOrder::Random => product.shuffle(&mut self.rng),
        }

        if self.atomic_before_product {
            atomic.extend(product);
            atomic
        } else {
            product.extend(atomic);
            product
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_mas_orders {
    use crate::*;

    fn three_switches() -> ExplicitTask {
        let ops = (0..3)
            .map(|v| Operator { name: format!("o{v}"), cost: 1, preconditions: vec![], effects: vec![Fact::new(v, 1)] })
            .collect();
        ExplicitTask::new(vec![2, 2, 2], ops, vec![0, 0, 0], (0..3).map(|v| Fact::new(v, 1)).collect())
    }
    /// Factor 2 stays atomic, factor 3 is the product of 0 and 1
    fn abstractions(task: &ExplicitTask) -> Vec<Abstraction> {
        let mut fts = FactoredTransitionSystem::atomic(task, true, true);
        let merged = fts.merge(0, 1);
        compute_abstractions_for_factors(&fts, &[2, merged])
    }

    #[test]
    fn products_come_first_by_default() {
        let task = three_switches();
        let abs = abstractions(&task);
        let mut gen = MasOrders::default();
        gen.initialize(&task);
        assert_eq!(vec![1, 0], gen.compute_order(&abs, &[1, 1, 1], None, Verbosity::Silent));
    }
    #[test]
    fn atomic_factors_can_come_first() {
        let task = three_switches();
        let abs = abstractions(&task);
        let mut gen = MasOrders::new(AtomicOrder::ReverseLevel, ProductOrder::OldToNew, true, 0);
        gen.initialize(&task);
        assert_eq!(vec![0, 1], gen.compute_order(&abs, &[1, 1, 1], None, Verbosity::Silent));
    }
    #[test]
    fn level_reverses_the_atomic_factors() {
        let task = three_switches();
        let fts = FactoredTransitionSystem::atomic(&task, true, true);
        let abs = compute_abstractions_for_factors(&fts, &[0, 1, 2]);
        let mut gen = MasOrders::new(AtomicOrder::Level, ProductOrder::OldToNew, true, 0);
        gen.initialize(&task);
        assert_eq!(vec![2, 1, 0], gen.compute_order(&abs, &[1, 1, 1], None, Verbosity::Silent));
    }
}
