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

//! This module provides the label container of a factored transition system.
//! Labels start out as the operators of the task and are progressively
//! reduced: a set of equivalent labels is replaced by one fresh label whose
//! cost is the minimum cost of the set.

use crate::{Cost, LabelId};

/// The set of labels of a factored transition system along with the
/// bookkeeping that relates the current labels to the original ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    /// `costs[l]` is `Some(cost)` iff `l` is a current label
    costs: Vec<Option<Cost>>,
    /// For each original label, the current label that represents it
    original_to_current: Vec<LabelId>,
    /// For each current label, the original labels it stands for
    reduced_to_originals: Vec<Vec<LabelId>>,
    /// Upper bound on the number of label ids that will ever be allocated
    max_size: usize,
}

impl Labels {
    /// Creates the label set of a task whose operators have the given costs.
    pub fn new(original_costs: &[Cost]) -> Self {
        let n = original_costs.len();
        let max_size = if n == 0 { 0 } else { 2 * n - 1 };
        let mut costs = Vec::with_capacity(max_size);
        costs.extend(original_costs.iter().copied().map(Some));
        let mut reduced_to_originals = Vec::with_capacity(max_size);
        reduced_to_originals.extend((0..n).map(|l| vec![l]));
        Labels {
            costs,
            original_to_current: (0..n).collect(),
            reduced_to_originals,
            max_size,
        }
    }

    /// The number of label ids allocated so far (current and reduced labels)
    pub fn size(&self) -> usize {
        self.costs.len()
    }
    /// The maximum number of label ids this container may ever allocate
    pub fn max_size(&self) -> usize {
        self.max_size
    }
    /// The number of original labels (operators)
    pub fn nb_original_labels(&self) -> usize {
        self.original_to_current.len()
    }
    /// True iff the label has not been reduced
    pub fn is_current(&self, label: LabelId) -> bool {
        matches!(self.costs.get(label), Some(Some(_)))
    }
    /// The cost of a label. Reduced labels have no cost.
    pub fn cost(&self, label: LabelId) -> Option<Cost> {
        self.costs.get(label).copied().flatten()
    }
    /// Iterates over the current labels in increasing id order
    pub fn current_labels(&self) -> impl Iterator<Item = LabelId> + '_ {
        self.costs
            .iter()
            .enumerate()
            .filter_map(|(l, c)| c.map(|_| l))
    }
    /// The number of current labels
    pub fn nb_current_labels(&self) -> usize {
        self.costs.iter().filter(|c| c.is_some()).count()
    }
    /// The current label standing for the given original label
    pub fn current_of(&self, original: LabelId) -> LabelId {
        self.original_to_current[original]
    }
    /// The whole original-to-current mapping
    pub fn original_to_current(&self) -> &[LabelId] {
        &self.original_to_current
    }
    /// The original labels aggregated by the given current label
    pub fn originals_of(&self, label: LabelId) -> &[LabelId] {
        &self.reduced_to_originals[label]
    }
    /// The cost vector indexed by label id; reduced labels are marked with -1.
    pub fn cost_vector(&self) -> Vec<Cost> {
        self.costs.iter().map(|c| c.unwrap_or(-1)).collect()
    }

    /// Replaces all the given (current) labels by one fresh label and returns
    /// its id. The new label costs the cheapest of the old ones.
    ///
    /// # Note:
    /// The caller is responsible for passing a set of labels that is an
    /// equivalence class of the label reduction: this is not verified.
    pub fn reduce(&mut self, old_labels: &[LabelId]) -> LabelId {
        debug_assert!(old_labels.len() > 1);
        debug_assert!(self.size() < self.max_size);
        debug_assert!(old_labels.iter().all(|l| self.is_current(*l)));

        let new_label = self.costs.len();
        let mut new_cost = Cost::MAX;
        let mut originals = vec![];
        for old in old_labels.iter().copied() {
            if let Some(cost) = self.costs[old].take() {
                new_cost = new_cost.min(cost);
            }
            originals.append(&mut self.reduced_to_originals[old]);
        }
        for original in originals.iter().copied() {
            self.original_to_current[original] = new_label;
        }
        originals.sort_unstable();
        self.costs.push(Some(new_cost));
        self.reduced_to_originals.push(originals);
        new_label
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_labels {
    use crate::Labels;

    #[test]
    fn fresh_labels_are_all_current() {
        let labels = Labels::new(&[1, 2, 3]);
        assert_eq!(3, labels.size());
        assert_eq!(5, labels.max_size());
        assert_eq!(vec![0, 1, 2], labels.current_labels().collect::<Vec<_>>());
        assert_eq!(Some(2), labels.cost(1));
    }
    #[test]
    fn reduce_allocates_a_new_label_with_min_cost() {
        let mut labels = Labels::new(&[4, 2, 3]);
        let new = labels.reduce(&[0, 1]);
        assert_eq!(3, new);
        assert_eq!(Some(2), labels.cost(new));
        assert!(!labels.is_current(0));
        assert!(!labels.is_current(1));
        assert!(labels.is_current(2));
        assert_eq!(None, labels.cost(0));
        assert_eq!(&[0, 1], labels.originals_of(new));
    }
    #[test]
    fn every_original_maps_to_a_current_label_containing_it() {
        let mut labels = Labels::new(&[1, 1, 1, 1]);
        let a = labels.reduce(&[0, 1]);
        let b = labels.reduce(&[a, 3]);
        for o in 0..4 {
            let c = labels.current_of(o);
            assert!(labels.is_current(c));
            assert!(labels.originals_of(c).contains(&o));
        }
        assert_eq!(&[0, 1, 3], labels.originals_of(b));
        assert_eq!(vec![-1, -1, 1, -1, -1, 1], labels.cost_vector());
    }
    #[test]
    fn empty_task_has_no_label() {
        let labels = Labels::new(&[]);
        assert_eq!(0, labels.size());
        assert_eq!(0, labels.max_size());
        assert_eq!(0, labels.nb_current_labels());
    }
}
