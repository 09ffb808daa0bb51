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
//! This module provides the heuristic combining all the cost partitionings
//! computed by one run of the algorithm: it takes their maximum.

use crate::{Cost, CostPartitioning, INF};

pub struct MaxCostPartitioningHeuristic {
    cost_partitionings: Vec<Box<dyn CostPartitioning>>,
}
impl MaxCostPartitioningHeuristic {
    pub fn new(cost_partitionings: Vec<Box<dyn CostPartitioning>>) -> Self {
        MaxCostPartitioningHeuristic { cost_partitionings }
    }
    pub fn nb_cost_partitionings(&self) -> usize {
        self.cost_partitionings.len()
    }
    /// The maximum value of the cost partitionings (`INF` as soon as one of
    /// them detects a dead end)
    pub fn compute_heuristic(&self, state: &[usize]) -> Cost {
        let mut max_h = 0;
        for cp in self.cost_partitionings.iter() {
            let h = cp.compute_value(state);
            if h == INF {
                return INF;
            }
            max_h = max_h.max(h);
        }
        max_h
    }
}
impl CostPartitioning for MaxCostPartitioningHeuristic {
    fn compute_value(&self, state: &[usize]) -> Cost {
        self.compute_heuristic(state)
    }
    fn nb_abstractions(&self) -> usize {
        self.cost_partitionings.iter().map(|cp| cp.nb_abstractions()).sum()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_max_heuristic {
    use crate::*;

    struct Constant(Cost);
    impl CostPartitioning for Constant {
        fn compute_value(&self, _state: &[usize]) -> Cost {
            self.0
        }
        fn nb_abstractions(&self) -> usize {
            1
        }
    }

    #[test]
    fn the_maximum_is_taken() {
        let h = MaxCostPartitioningHeuristic::new(vec![Box::new(Constant(2)), Box::new(Constant(5)), Box::new(Constant(3))]);
        assert_eq!(3, h.nb_cost_partitionings());
        assert_eq!(3, h.nb_abstractions());
        assert_eq!(5, h.compute_heuristic(&[0]));
    }
    #[test]
    fn dead_ends_win() {
        let h = MaxCostPartitioningHeuristic::new(vec![Box::new(Constant(2)), Box::new(Constant(INF))]);
        assert_eq!(INF, h.compute_value(&[0]));
    }
    #[test]
    fn no_cost_partitioning_means_zero() {
        let h = MaxCostPartitioningHeuristic::new(vec![]);
        assert_eq!(0, h.compute_heuristic(&[0]));
    }
}
