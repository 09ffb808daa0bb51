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

//! This module provides the exact label reduction. Two labels may be replaced
//! by a single one as soon as they cost the same and are locally equivalent
//! (they belong to the same label group) in every factor but one: the
//! *combinable* factor, whose transitions for the new label are the union of
//! the transitions of the reduced labels.

use fxhash::FxHashMap;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::debug;

use crate::{FactoredTransitionSystem, LabelId, Verbosity};

/// Which factors are used as combinable factor
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LabelReductionMethod {
    /// Only the two factors about to be merged
    TwoTransitionSystems,
    /// Every factor, once
    AllTransitionSystems,
    /// Every factor, until no more labels can be reduced
    AllTransitionSystemsWithFixpoint,
}

/// The order in which the factors are considered by the methods that use
/// all of them
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LabelReductionSystemOrder {
    Regular,
    Reverse,
    Random,
}

#[derive(Debug, Clone)]
pub struct LabelReduction {
    before_shrinking: bool,
    before_merging: bool,
    method: LabelReductionMethod,
    system_order: LabelReductionSystemOrder,
    rng: StdRng,
}

impl LabelReduction {
    pub fn new(
        before_shrinking: bool,
        before_merging: bool,
        method: LabelReductionMethod,
        system_order: LabelReductionSystemOrder,
        seed: u64,
    ) -> Self {
        LabelReduction { before_shrinking, before_merging, method, system_order, rng: StdRng::seed_from_u64(seed) }
    }

    pub fn reduce_before_shrinking(&self) -> bool {
        self.before_shrinking
    }
    pub fn reduce_before_merging(&self) -> bool {
        self.before_merging
    }
    pub fn method(&self) -> LabelReductionMethod {
        self.method
    }

    /// Reduces the labels of the factored transition system. When a merge
    /// pair is given and the method is `TwoTransitionSystems`, only the two
    /// factors of the pair serve as combinable factors. Without a merge pair,
    /// the fixpoint method is used regardless of the configured one.
    ///
    /// Returns true iff at least one label was reduced.
    pub fn reduce(
        &mut self,
        merge_pair: Option<(usize, usize)>,
        fts: &mut FactoredTransitionSystem,
        verbosity: Verbosity,
    ) -> bool {
        let method = match merge_pair {
            None => LabelReductionMethod::AllTransitionSystemsWithFixpoint,
            Some(_) => self.method,
        };

        if let (LabelReductionMethod::TwoTransitionSystems, Some((i, j))) = (method, merge_pair) {
            let mut reduced = false;
            for index in [i, j] {
                reduced |= self.reduce_for(index, fts, verbosity);
            }
            return reduced;
        }

        let order = self.system_order(fts);
        let mut reduced = false;
        let mut unsuccessful = 0;
        let mut position = 0;
        let nb_active = fts.num_active();
        let max_iterations = match method {
            LabelReductionMethod::AllTransitionSystems => order.len(),
            _ => usize::MAX,
        };
        for _ in 0..max_iterations {
            if order.is_empty() || unsuccessful >= nb_active {
                break;
            }
            let index = order[position];
            if self.reduce_for(index, fts, verbosity) {
                reduced = true;
                unsuccessful = 0;
            } else {
                unsuccessful += 1;
            }
            position = (position + 1) % order.len();
        }
        reduced
    }

    /// Computes the label mapping with `combinable` as combinable factor and
    /// applies it (if it reduces anything).
    fn reduce_for(&mut self, combinable: usize, fts: &mut FactoredTransitionSystem, verbosity: Verbosity) -> bool {
        let mapping = compute_label_mapping(combinable, fts);
        if mapping.is_empty() {
            return false;
        }
        if verbosity.is_at_least_verbose() {
            let nb_reduced = mapping.iter().map(|(_, olds)| olds.len()).sum::<usize>();
            debug!(combinable, nb_reduced, nb_new = mapping.len(), "label reduction");
        }
        fts.apply_label_mapping(&mapping, Some(combinable));
        true
    }

    fn system_order(&mut self, fts: &FactoredTransitionSystem) -> Vec<usize> {
        let mut order = fts.active_indices().collect::<Vec<_>>();
        match self.system_order {
            LabelReductionSystemOrder::Regular => {},
            LabelReductionSystemOrder::Reverse => order.reverse(),
            LabelReductionSystemOrder::Random => order.shuffle(&mut self.rng),
        }
        order
    }
}

impl Default for LabelReduction {
    fn default() -> Self {
        Self::new(true, false,
            LabelReductionMethod::AllTransitionSystemsWithFixpoint,
            LabelReductionSystemOrder::Random, 0)
    }
}

/// Computes the classes of current labels which cost the same and belong to
/// the same group in every active factor but `combinable`. Each class of more
/// than one label is paired with the id `Labels::reduce` will allocate for it.
pub fn compute_label_mapping(combinable: usize, fts: &FactoredTransitionSystem) -> Vec<(LabelId, Vec<LabelId>)> {
    let labels = fts.labels();
    let current = labels.current_labels().collect::<Vec<_>>();
    let mut class_of = vec![0_usize; labels.size()];

    let mut index: FxHashMap<(usize, Option<usize>), usize> = FxHashMap::default();
    for l in current.iter().copied() {
        let key = (labels.cost(l).unwrap_or(-1) as usize, None);
        let next = index.len();
        class_of[l] = *index.entry(key).or_insert(next);
    }
    for ts_index in fts.active_indices().filter(|i| *i != combinable) {
        let ts = fts.transition_system(ts_index);
        index.clear();
        for l in current.iter().copied() {
            let key = (class_of[l], ts.group_of(l));
            let next = index.len();
            class_of[l] = *index.entry(key).or_insert(next);
        }
    }

    let mut classes: FxHashMap<usize, Vec<LabelId>> = FxHashMap::default();
    for l in current.iter().copied() {
        classes.entry(class_of[l]).or_default().push(l);
    }
    let mut classes = classes.into_values().filter(|c| c.len() > 1).collect::<Vec<_>>();
    classes.sort_unstable();

    let first_new = labels.size();
    classes.into_iter()
        .enumerate()
        .map(|(k, olds)| (first_new + k, olds))
        .collect()
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_label_reduction {
    use crate::*;

    /// a: x := 1 ; b: x := 0 ; c: y := 1 (cost 2) ; d: y := 1 (cost 1)
    fn task() -> ExplicitTask {
        ExplicitTask::new(
            vec![2, 2],
            vec![
                Operator { name: "a".into(), cost: 1, preconditions: vec![], effects: vec![Fact::new(0, 1)] },
                Operator { name: "b".into(), cost: 1, preconditions: vec![], effects: vec![Fact::new(0, 0)] },
                Operator { name: "c".into(), cost: 2, preconditions: vec![], effects: vec![Fact::new(1, 1)] },
                Operator { name: "d".into(), cost: 1, preconditions: vec![], effects: vec![Fact::new(1, 1)] },
            ],
            vec![0, 0],
            vec![Fact::new(0, 1), Fact::new(1, 1)],
        )
    }

    #[test]
    fn labels_are_reduced_when_only_the_combinable_factor_distinguishes_them() {
        let fts = FactoredTransitionSystem::atomic(&task(), true, true);
        // a and b only differ in x
        assert_eq!(vec![(4, vec![0, 1])], compute_label_mapping(0, &fts));
    }
    #[test]
    fn labels_with_different_costs_are_never_reduced() {
        let fts = FactoredTransitionSystem::atomic(&task(), true, true);
        // c and d act alike in y but do not cost the same
        assert!(compute_label_mapping(1, &fts).is_empty());
    }
    #[test]
    fn two_transition_systems_method_uses_the_merge_pair() {
        let mut fts = FactoredTransitionSystem::atomic(&task(), true, true);
        let mut lr = LabelReduction::new(true, false,
            LabelReductionMethod::TwoTransitionSystems, LabelReductionSystemOrder::Regular, 0);
        assert!(lr.reduce(Some((0, 1)), &mut fts, Verbosity::Silent));
        assert_eq!(3, fts.labels().nb_current_labels());
        assert_eq!(4, fts.labels().current_of(0));
        assert_eq!(4, fts.labels().current_of(1));
    }
    #[test]
    fn fixpoint_stops_when_nothing_changes() {
        let mut fts = FactoredTransitionSystem::atomic(&task(), true, true);
        let mut lr = LabelReduction::default();
        assert!(lr.reduce(None, &mut fts, Verbosity::Silent));
        assert!(!lr.reduce(None, &mut fts, Verbosity::Silent));
        assert_eq!(3, fts.labels().nb_current_labels());
    }
    #[test]
    fn reduction_preserves_goal_distances() {
        let mut fts = FactoredTransitionSystem::atomic(&task(), true, true);
        let before = fts.active_indices().map(|i| fts.distances(i).clone()).collect::<Vec<_>>();
        let mut lr = LabelReduction::default();
        lr.reduce(None, &mut fts, Verbosity::Silent);
        let costs = fts.cost_vector();
        for (i, d) in fts.active_indices().zip(before) {
            let recomputed = compute_goal_distances(fts.transition_system(i), &costs);
            assert_eq!(d.goal_distances(), &recomputed[..]);
        }
    }
}
