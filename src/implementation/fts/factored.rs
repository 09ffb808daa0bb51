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

//! This module provides the factored transition system: the collection of
//! factors the merge-and-shrink algorithm transforms, along with the labels
//! they share. A factor is a transition system together with the function
//! mapping concrete states onto its abstract states and the cached distances
//! of its states.

use std::rc::Rc;

use crate::{compute_goal_distances, Cost, Distances, LabelId, Labels, MasRepresentation,
    StateEquivalenceRelation, Task, TransitionSystem, INF};

/// One factor of the factored transition system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Factor {
    pub ts: TransitionSystem,
    pub representation: MasRepresentation,
    pub distances: Distances,
}

/// The factored transition system. Factors live in slots; a slot is *active*
/// as long as it holds a factor. Merging, removing or extracting a factor
/// empties its slot; slots are never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoredTransitionSystem {
    labels: Labels,
    factors: Vec<Option<Factor>>,
    num_active: usize,
    compute_init_distances: bool,
    compute_goal_distances: bool,
}

impl FactoredTransitionSystem {
    /// Creates the atomic factored transition system of the task: one factor
    /// per variable, with the requested distances computed.
    pub fn atomic(task: &dyn Task, compute_init_distances: bool, compute_goal_distances: bool) -> Self {
        let costs = task.operators().iter().map(|o| o.cost).collect::<Vec<_>>();
        let labels = Labels::new(&costs);
        let factors = (0..task.nb_variables())
            .map(|var| {
                let ts = TransitionSystem::atomic(task, var);
                let representation = MasRepresentation::leaf(var, task.domain_size(var));
                let mut distances = Distances::new();
                distances.compute_distances(&ts, &costs, compute_init_distances, compute_goal_distances);
                Some(Factor { ts, representation, distances })
            })
            .collect::<Vec<_>>();
        let num_active = factors.len();
        FactoredTransitionSystem { labels, factors, num_active, compute_init_distances, compute_goal_distances }
    }

    // --- ACCESSORS ----------------------------------------------------------
    pub fn labels(&self) -> &Labels {
        &self.labels
    }
    /// The number of slots (including the inactive ones)
    pub fn size(&self) -> usize {
        self.factors.len()
    }
    pub fn num_active(&self) -> usize {
        self.num_active
    }
    pub fn is_active(&self, index: usize) -> bool {
        matches!(self.factors.get(index), Some(Some(_)))
    }
    /// The indices of the active factors, in ascending order
    pub fn active_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.factors.iter().enumerate().filter_map(|(i, f)| f.as_ref().map(|_| i))
    }
    /// The factor at `index`. Panics when the slot is inactive.
    pub fn factor(&self, index: usize) -> &Factor {
        match &self.factors[index] {
            Some(factor) => factor,
            None => panic!("factor {index} is not active"),
        }
    }
    pub fn transition_system(&self, index: usize) -> &TransitionSystem {
        &self.factor(index).ts
    }
    pub fn representation(&self, index: usize) -> &MasRepresentation {
        &self.factor(index).representation
    }
    pub fn distances(&self, index: usize) -> &Distances {
        &self.factor(index).distances
    }
    pub fn computes_init_distances(&self) -> bool {
        self.compute_init_distances
    }
    pub fn computes_goal_distances(&self) -> bool {
        self.compute_goal_distances
    }
    /// The cost of each label id (`-1` for reduced labels)
    pub fn cost_vector(&self) -> Vec<Cost> {
        self.labels.cost_vector()
    }
    /// The number of task variables represented by the given factor, counted
    /// with multiplicity.
    pub fn leaf_count(&self, index: usize) -> usize {
        self.representation(index).leaf_count()
    }
    /// The sum of the leaf counts of all active factors
    pub fn total_leaf_count(&self) -> usize {
        self.active_indices().map(|i| self.leaf_count(i)).sum()
    }

    /// The goal of the factor can be reached from its initial state
    pub fn is_factor_solvable(&self, index: usize) -> bool {
        let factor = self.factor(index);
        if factor.distances.are_goal_distances_computed() {
            factor.ts.is_solvable(&factor.distances)
        } else {
            let costs = self.cost_vector();
            let goal = compute_goal_distances(&factor.ts, &costs);
            factor.ts.init_state().map_or(false, |s| goal[s] != INF)
        }
    }
    /// A factor is trivial when it prunes no concrete state and all its
    /// abstract states are goal states: its heuristic is zero everywhere.
    pub fn is_factor_trivial(&self, index: usize) -> bool {
        let factor = self.factor(index);
        factor.ts.is_trivial() && factor.representation.is_total()
    }

    // --- TRANSFORMATIONS ----------------------------------------------------
    /// Reduces the labels according to the given mapping. The new label ids
    /// must be the ones `Labels::reduce` allocates, in order. Only the system
    /// at `combinable_index` may distinguish the reduced labels; its groups
    /// are recomputed.
    pub fn apply_label_mapping(&mut self, mapping: &[(LabelId, Vec<LabelId>)], combinable_index: Option<usize>) {
        for (new_label, old_labels) in mapping.iter() {
            let allocated = self.labels.reduce(old_labels);
            debug_assert_eq!(*new_label, allocated);
        }
        for (i, factor) in self.factors.iter_mut().enumerate() {
            if let Some(factor) = factor {
                factor.ts.apply_label_reduction(mapping, Some(i) != combinable_index);
            }
        }
    }

    /// Shrinks the factor at `index` according to the given equivalence
    /// relation. States which belong to no class are pruned. Returns false
    /// (and does nothing) when the relation keeps every state distinct.
    pub fn apply_abstraction(&mut self, index: usize, equivalence: &StateEquivalenceRelation) -> bool {
        let costs = self.labels.cost_vector();
        let Some(factor) = self.factors[index].as_mut() else { return false };
        let num_states = factor.ts.num_states();
        if equivalence.len() == num_states {
            return false;
        }
        let mut mapping = vec![None; num_states];
        for (class, states) in equivalence.iter().enumerate() {
            for s in states.iter().copied() {
                mapping[s] = Some(class);
            }
        }
        factor.ts.apply_abstraction(equivalence, &mapping);
        factor.representation.apply_abstraction_to_lookup_table(&mapping);
        factor.distances.apply_abstraction(&factor.ts, &costs, equivalence);
        true
    }

    /// Replaces the factors `i` and `j` with their synchronized product.
    /// Returns the index of the product.
    pub fn merge(&mut self, i: usize, j: usize) -> usize {
        self.cloning_merge(i, j, false, false)
    }

    /// Like `merge`, except that the operand `i` (resp. `j`) stays in its slot
    /// when `keep_i` (resp. `keep_j`) is set. A kept operand can then
    /// participate in further merges.
    pub fn cloning_merge(&mut self, i: usize, j: usize, keep_i: bool, keep_j: bool) -> usize {
        debug_assert_ne!(i, j);
        let ts = TransitionSystem::merge(&self.labels, self.transition_system(i), self.transition_system(j));
        let left = self.operand_representation(i, keep_i);
        let right = self.operand_representation(j, keep_j);
        let representation = MasRepresentation::merge(left, right);
        debug_assert_eq!(ts.num_states(), representation.domain_size());

        let mut distances = Distances::new();
        distances.compute_distances(&ts, &self.labels.cost_vector(),
            self.compute_init_distances, self.compute_goal_distances);

        self.factors.push(Some(Factor { ts, representation, distances }));
        self.num_active += 1;
        self.size() - 1
    }

    /// Appends a copy of the factor at `index`. Returns the index of the copy.
    pub fn clone_factor(&mut self, index: usize) -> usize {
        let copy = self.factor(index).clone();
        self.factors.push(Some(copy));
        self.num_active += 1;
        self.size() - 1
    }
    /// Drops the factor at `index`
    pub fn remove_factor(&mut self, index: usize) {
        if self.factors[index].take().is_some() {
            self.num_active -= 1;
        }
    }
    /// Moves the factor at `index` out of the factored transition system
    pub fn extract_factor(&mut self, index: usize) -> Option<Factor> {
        let factor = self.factors.get_mut(index).and_then(|f| f.take());
        if factor.is_some() {
            self.num_active -= 1;
        }
        factor
    }
    /// Moves the transition system and representation of the factor at
    /// `index` out of the factored transition system
    pub fn extract_ts_and_representation(&mut self, index: usize) -> Option<(TransitionSystem, MasRepresentation)> {
        self.extract_factor(index).map(|f| (f.ts, f.representation))
    }

    /// The representation of an operand of a merge, either moved out of its
    /// slot or copied when the operand is kept.
    fn operand_representation(&mut self, index: usize, keep: bool) -> Rc<MasRepresentation> {
        if keep {
            Rc::new(self.representation(index).clone())
        } else {
            match self.extract_factor(index) {
                Some(factor) => Rc::new(factor.representation),
                None => panic!("factor {index} is not active"),
            }
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_factored_transition_system {
    use crate::*;

    /// x, y, z in {0, 1}; a: x := 1 ; b: y := 1 ; c: z := 1 (cost 2)
    fn three_switches() -> ExplicitTask {
        ExplicitTask::new(
            vec![2, 2, 2],
            vec![
                Operator { name: "a".into(), cost: 1, preconditions: vec![], effects: vec![Fact::new(0, 1)] },
                Operator { name: "b".into(), cost: 1, preconditions: vec![], effects: vec![Fact::new(1, 1)] },
                Operator { name: "c".into(), cost: 2, preconditions: vec![], effects: vec![Fact::new(2, 1)] },
            ],
            vec![0, 0, 0],
            vec![Fact::new(0, 1), Fact::new(1, 1), Fact::new(2, 1)],
        )
    }

    #[test]
    fn atomic_fts_has_one_factor_per_variable() {
        let fts = FactoredTransitionSystem::atomic(&three_switches(), true, true);
        assert_eq!(3, fts.size());
        assert_eq!(3, fts.num_active());
        assert_eq!(vec![0, 1, 2], fts.active_indices().collect::<Vec<_>>());
        assert_eq!(2, fts.distances(2).goal_distance(0));
        assert_eq!(1, fts.distances(0).init_distance(1));
        assert!(fts.is_factor_solvable(0));
        assert!(!fts.is_factor_trivial(0));
    }
    #[test]
    fn merge_empties_both_operands() {
        let mut fts = FactoredTransitionSystem::atomic(&three_switches(), true, true);
        let k = fts.merge(0, 2);
        assert_eq!(3, k);
        assert_eq!(2, fts.num_active());
        assert_eq!(vec![1, 3], fts.active_indices().collect::<Vec<_>>());
        assert!(!fts.is_active(0));
        assert_eq!(4, fts.transition_system(k).num_states());
        assert_eq!(fts.transition_system(k).num_states(), fts.representation(k).domain_size());
        assert_eq!(3, fts.distances(k).goal_distance(0));
        assert_eq!(2, fts.leaf_count(k));
        assert_eq!(3, fts.total_leaf_count());
    }
    #[test]
    fn cloning_merge_keeps_the_requested_operand() {
        let mut fts = FactoredTransitionSystem::atomic(&three_switches(), true, true);
        let k = fts.cloning_merge(0, 1, true, false);
        assert_eq!(3, fts.num_active());
        assert_eq!(vec![0, 2, 3], fts.active_indices().collect::<Vec<_>>());
        assert_eq!(4, fts.total_leaf_count());
        let l = fts.merge(0, 2);
        assert_eq!(2, fts.num_active());
        assert_eq!(vec![k, l], fts.active_indices().collect::<Vec<_>>());
    }
    #[test]
    fn clone_factor_appends_a_copy() {
        let mut fts = FactoredTransitionSystem::atomic(&three_switches(), true, true);
        let c = fts.clone_factor(1);
        assert_eq!(4, fts.num_active());
        assert_eq!(fts.transition_system(1), fts.transition_system(c));
        assert_eq!(fts.representation(1), fts.representation(c));
    }
    #[test]
    fn identity_abstraction_is_a_noop() {
        let mut fts = FactoredTransitionSystem::atomic(&three_switches(), true, true);
        assert!(!fts.apply_abstraction(0, &vec![vec![0], vec![1]]));
        assert_eq!(2, fts.transition_system(0).num_states());
    }
    #[test]
    fn abstraction_updates_all_components() {
        let mut fts = FactoredTransitionSystem::atomic(&three_switches(), true, true);
        let k = fts.merge(0, 1);
        // collapse (0,1) with (1,0)
        assert!(fts.apply_abstraction(k, &vec![vec![0], vec![1, 2], vec![3]]));
        assert_eq!(3, fts.transition_system(k).num_states());
        assert_eq!(3, fts.representation(k).domain_size());
        assert_eq!(1, fts.representation(k).get_value(&[1, 0, 0]));
        assert_eq!(vec![2, 1, 0], fts.distances(k).goal_distances().to_vec());
    }
    #[test]
    fn removing_and_extracting_factors() {
        let mut fts = FactoredTransitionSystem::atomic(&three_switches(), true, true);
        fts.remove_factor(0);
        assert_eq!(2, fts.num_active());
        let (ts, rep) = fts.extract_ts_and_representation(2).unwrap();
        assert_eq!(2, ts.num_states());
        assert_eq!(2, rep.domain_size());
        assert_eq!(1, fts.num_active());
        assert!(fts.extract_factor(2).is_none());
    }
    #[test]
    fn unsolvable_factor_is_detected() {
        let task = ExplicitTask::new(vec![2], vec![], vec![0], vec![Fact::new(0, 1)]);
        let fts = FactoredTransitionSystem::atomic(&task, false, false);
        assert!(!fts.is_factor_solvable(0));
    }
    #[test]
    fn label_mapping_is_forwarded_to_every_factor() {
        let task = ExplicitTask::new(
            vec![2, 2],
            vec![
                Operator { name: "a".into(), cost: 1, preconditions: vec![], effects: vec![Fact::new(0, 1)] },
                Operator { name: "b".into(), cost: 1, preconditions: vec![], effects: vec![Fact::new(0, 0)] },
            ],
            vec![0, 0],
            vec![Fact::new(0, 1)],
        );
        let mut fts = FactoredTransitionSystem::atomic(&task, true, true);
        fts.apply_label_mapping(&[(2, vec![0, 1])], Some(0));
        assert!(!fts.labels().is_current(0));
        assert_eq!(Some(1), fts.labels().cost(2));
        assert_eq!(Some(0), fts.transition_system(0).group_of(2));
        assert_eq!(&[2], fts.transition_system(1).groups()[0].labels());
    }
}
