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
//! This module provides the total order scoring function. It ranks all pairs
//! of factor indices once and for all so that no two candidates ever tie:
//! the factor indices are ordered (atomic factors and product factors each
//! in their own way), and pairs are ranked lexicographically in that order.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{AtomicOrder, FactoredTransitionSystem, MergeScoringFunction, ProductOrder, Task};

pub struct TotalOrder {
    atomic_order: AtomicOrder,
    product_order: ProductOrder,
    atomic_before_product: bool,
    nb_variables: usize,
    /// `rank[i]` is the position of factor `i` in the order
    rank: Vec<usize>,
    rng: StdRng,
}

impl TotalOrder {
    pub fn new(atomic_order: AtomicOrder, product_order: ProductOrder, atomic_before_product: bool, seed: u64) -> Self {
        TotalOrder {
            atomic_order,
            product_order,
            atomic_before_product,
            nb_variables: 0,
            rank: vec![],
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Orders the factor indices `0..nb_factors`
    fn compute_ranks(&mut self, nb_factors: usize) {
        let mut atomic = (0..self.nb_variables.min(nb_factors)).collect::<Vec<_>>();
        match self.atomic_order {
            AtomicOrder::ReverseLevel => {},
            AtomicOrder::Level => atomic.reverse(),
            AtomicOrder::Random => atomic.shuffle(&mut self.rng),
        }
        let mut product = (self.nb_variables..nb_factors).collect::<Vec<_>>();
        match self.product_order {
            ProductOrder::OldToNew => {},
            ProductOrder::NewToOld => product.reverse(),
            ProductOrder::Random => product.shuffle(&mut self.rng),
        }
        let order = if self.atomic_before_product {
            atomic.into_iter().chain(product).collect::<Vec<_>>()
        } else {
            product.into_iter().chain(atomic).collect::<Vec<_>>()
        };
        self.rank = vec![0; nb_factors];
        for (position, factor) in order.into_iter().enumerate() {
            self.rank[factor] = position;
        }
    }

    /// The position of the pair in the lexicographic enumeration of the
    /// pairs `(p, q)` with `p < q < n`.
    fn pair_rank(&self, a: usize, b: usize) -> usize {
        let n = self.rank.len();
        let (p, q) = {
            let (ra, rb) = (self.rank[a], self.rank[b]);
            if ra < rb { (ra, rb) } else { (rb, ra) }
        };
        p * (2 * n - p - 1) / 2 + (q - p - 1)
    }
}
impl Default for TotalOrder {
    fn default() -> Self {
        Self::new(AtomicOrder::ReverseLevel, ProductOrder::NewToOld, false, 0)
    }
}

impl MergeScoringFunction for TotalOrder {
    fn name(&self) -> &str {
        "total order"
    }
    fn initialize(&mut self, task: &dyn Task) {
        self.nb_variables = task.nb_variables();
        self.compute_ranks((2 * self.nb_variables).saturating_sub(1));
    }
    fn compute_scores(&mut self, fts: &FactoredTransitionSystem, candidates: &[(usize, usize)]) -> Vec<f64> {
        // cloning creates more factors than an orthogonal run would
        if fts.size() > self.rank.len() {
            self.compute_ranks(fts.size());
        }
        candidates.iter().map(|(a, b)| self.pair_rank(*a, *b) as f64).collect()
    }
    fn is_tie_breaking(&self) -> bool {
        true
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_total_order {
    use crate::*;

    fn switches(n: usize) -> ExplicitTask {
        let ops = (0..n)
            .map(|v| Operator { name: format!("o{v}"), cost: 1, preconditions: vec![], effects: vec![Fact::new(v, 1)] })
            .collect();
        ExplicitTask::new(vec![2; n], ops, vec![0; n], (0..n).map(|v| Fact::new(v, 1)).collect())
    }

    #[test]
    fn all_pairs_get_distinct_scores() {
        let task = switches(3);
        let fts = FactoredTransitionSystem::atomic(&task, true, true);
        let mut function = TotalOrder::default();
        function.initialize(&task);
        let candidates = compute_merge_candidates(&fts, None);
        let mut scores = function.compute_scores(&fts, &candidates);
        scores.sort_by(|a, b| a.total_cmp(b));
        scores.dedup();
        assert_eq!(3, scores.len());
    }
    #[test]
    fn products_come_first_by_default() {
        let task = switches(4);
        let mut fts = FactoredTransitionSystem::atomic(&task, true, true);
        fts.merge(0, 1);
        let mut function = TotalOrder::default();
        function.initialize(&task);
        let scores = function.compute_scores(&fts, &[(2, 3), (2, 4), (3, 4)]);
        assert!(scores[1] < scores[0]);
        assert!(scores[1] < scores[2]);
    }
    #[test]
    fn atomic_pairs_follow_the_variable_order() {
        let task = switches(3);
        let fts = FactoredTransitionSystem::atomic(&task, true, true);
        let mut function = TotalOrder::new(AtomicOrder::ReverseLevel, ProductOrder::OldToNew, true, 0);
        function.initialize(&task);
        assert_eq!(vec![0.0, 1.0, 4.0], function.compute_scores(&fts, &[(0, 1), (2, 0), (1, 2)]));
        assert!(function.is_tie_breaking());
    }
}
