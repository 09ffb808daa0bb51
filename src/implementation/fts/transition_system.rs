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

//! This module provides the transition system of one factor: a labelled
//! directed graph over abstract states. The labels of the system are grouped:
//! two labels belong to the same group iff they induce the very same set of
//! transitions in this system. Transitions are stored once per group.

use std::fmt;

use fxhash::FxHashMap;

use crate::{Cost, Distances, LabelId, Labels, StateEquivalenceRelation, Task, INF};

/// A transition between two abstract states
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Transition {
    pub src: usize,
    pub target: usize,
}
impl Transition {
    pub fn new(src: usize, target: usize) -> Self {
        Self { src, target }
    }
    /// True iff this transition does not change the abstract state
    pub fn is_self_loop(&self) -> bool {
        self.src == self.target
    }
}

/// A group of labels that are locally equivalent, along with the sorted and
/// deduplicated transitions they induce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelGroup {
    labels: Vec<LabelId>,
    transitions: Vec<Transition>,
}
impl LabelGroup {
    pub fn new(mut labels: Vec<LabelId>, mut transitions: Vec<Transition>) -> Self {
        labels.sort_unstable();
        transitions.sort_unstable();
        transitions.dedup();
        Self { labels, transitions }
    }
    /// The labels of this group in increasing order
    pub fn labels(&self) -> &[LabelId] {
        &self.labels
    }
    /// The transitions shared by all the labels of the group
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
    /// The cost of using this group under the given label costs: the cheapest
    /// of its labels. Labels with a negative (reduced) or infinite cost are
    /// ignored; `INF` is returned when no label is usable.
    pub fn cost(&self, costs: &[Cost]) -> Cost {
        self.labels
            .iter()
            .map(|l| costs.get(*l).copied().unwrap_or(INF))
            .filter(|c| *c >= 0)
            .min()
            .unwrap_or(INF)
    }
}

/// The transition system of one factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionSystem {
    /// The task variables this factor accounts for (sorted)
    incorporated_variables: Vec<usize>,
    /// The number of abstract states
    num_states: usize,
    /// `goal_states[s]` is true iff `s` is an abstract goal state
    goal_states: Vec<bool>,
    /// The abstract initial state. It is `None` when it has been pruned.
    init_state: Option<usize>,
    /// The label groups of this system
    groups: Vec<LabelGroup>,
    /// Maps each label id onto the index of its group
    label_to_group: Vec<Option<usize>>,
}

impl TransitionSystem {
    /// Creates a transition system from its raw parts. The groups are
    /// normalized: groups with identical transition sets are fused.
    pub fn new(
        mut incorporated_variables: Vec<usize>,
        num_states: usize,
        goal_states: Vec<bool>,
        init_state: Option<usize>,
        groups: Vec<LabelGroup>,
    ) -> Self {
        debug_assert_eq!(num_states, goal_states.len());
        incorporated_variables.sort_unstable();
        incorporated_variables.dedup();
        let mut ts = TransitionSystem {
            incorporated_variables,
            num_states,
            goal_states,
            init_state,
            groups,
            label_to_group: vec![],
        };
        ts.regroup();
        ts
    }

    /// Creates the atomic transition system of one task variable: one state
    /// per value, and for each operator the transitions it induces on that
    /// variable (self loops when it does not mention the variable).
    pub fn atomic(task: &dyn Task, var: usize) -> Self {
        let n = task.domain_size(var);
        let goal_states = match task.goal().iter().find(|f| f.var == var) {
            Some(fact) => (0..n).map(|v| v == fact.value).collect(),
            None => vec![true; n],
        };
        let init_state = Some(task.initial_state()[var]);

        let groups = task.operators().iter().enumerate()
            .map(|(label, op)| {
                let transitions = match (op.precondition_on(var), op.effect_on(var)) {
                    (Some(pre), Some(eff)) => vec![Transition::new(pre, eff)],
                    (None, Some(eff))      => (0..n).map(|v| Transition::new(v, eff)).collect(),
                    (Some(pre), None)      => vec![Transition::new(pre, pre)],
                    (None, None)           => (0..n).map(|v| Transition::new(v, v)).collect(),
                };
                LabelGroup::new(vec![label], transitions)
            })
            .collect();

        Self::new(vec![var], n, goal_states, init_state, groups)
    }

    /// Computes the synchronized product of two transition systems. Product
    /// states `(s1, s2)` are numbered `s1 * |ts2| + s2`.
    pub fn merge(labels: &Labels, ts1: &TransitionSystem, ts2: &TransitionSystem) -> Self {
        let n2 = ts2.num_states;
        let num_states = ts1.num_states * n2;

        let mut vars = ts1.incorporated_variables.clone();
        vars.extend_from_slice(&ts2.incorporated_variables);

        let mut goal_states = vec![false; num_states];
        for s1 in (0..ts1.num_states).filter(|s| ts1.goal_states[*s]) {
            for s2 in (0..n2).filter(|s| ts2.goal_states[*s]) {
                goal_states[s1 * n2 + s2] = true;
            }
        }
        let init_state = match (ts1.init_state, ts2.init_state) {
            (Some(i1), Some(i2)) => Some(i1 * n2 + i2),
            _ => None,
        };

        // bucket the labels by pair of local groups: all labels of one bucket
        // induce the same product transitions.
        let mut bucket_of: FxHashMap<(usize, usize), usize> = FxHashMap::default();
        let mut buckets: Vec<((usize, usize), Vec<LabelId>)> = vec![];
        for label in labels.current_labels() {
            if let (Some(g1), Some(g2)) = (ts1.group_of(label), ts2.group_of(label)) {
                let idx = *bucket_of.entry((g1, g2)).or_insert_with(|| {
                    buckets.push(((g1, g2), vec![]));
                    buckets.len() - 1
                });
                buckets[idx].1.push(label);
            }
        }

        let groups = buckets.into_iter()
            .map(|((g1, g2), labels)| {
                let trs1 = ts1.groups[g1].transitions();
                let trs2 = ts2.groups[g2].transitions();
                let mut transitions = Vec::with_capacity(trs1.len() * trs2.len());
                for t1 in trs1 {
                    for t2 in trs2 {
                        transitions.push(Transition::new(t1.src * n2 + t2.src, t1.target * n2 + t2.target));
                    }
                }
                LabelGroup::new(labels, transitions)
            })
            .collect();

        Self::new(vars, num_states, goal_states, init_state, groups)
    }

    // --- ACCESSORS ----------------------------------------------------------
    pub fn num_states(&self) -> usize {
        self.num_states
    }
    pub fn init_state(&self) -> Option<usize> {
        self.init_state
    }
    pub fn is_goal_state(&self, state: usize) -> bool {
        self.goal_states[state]
    }
    pub fn goal_states(&self) -> impl Iterator<Item = usize> + '_ {
        self.goal_states.iter().enumerate().filter_map(|(s, g)| if *g { Some(s) } else { None })
    }
    pub fn incorporated_variables(&self) -> &[usize] {
        &self.incorporated_variables
    }
    pub fn groups(&self) -> &[LabelGroup] {
        &self.groups
    }
    /// The index of the group holding the given label (if the label is known)
    pub fn group_of(&self, label: LabelId) -> Option<usize> {
        self.label_to_group.get(label).copied().flatten()
    }
    /// The transitions induced by one label
    pub fn transitions_of(&self, label: LabelId) -> &[Transition] {
        match self.group_of(label) {
            Some(g) => self.groups[g].transitions(),
            None => &[],
        }
    }
    pub fn num_transitions(&self) -> usize {
        self.groups.iter().map(|g| g.transitions.len()).sum()
    }
    /// Every abstract state is a goal state
    pub fn is_trivial(&self) -> bool {
        self.goal_states.iter().all(|g| *g)
    }
    /// The goal can be reached from the initial state
    pub fn is_solvable(&self, distances: &Distances) -> bool {
        match self.init_state {
            Some(init) => distances.goal_distance(init) != INF,
            None => false,
        }
    }

    // --- TRANSFORMATIONS ----------------------------------------------------
    /// Substitutes labels according to a label reduction `(new, olds)`.
    ///
    /// When `only_equivalent_labels` is set, the old labels of each entry are
    /// known to be equivalent in this system: the new label simply takes
    /// their place in their group. Otherwise, the new label receives the union
    /// of the transitions of the old labels and the groups are recomputed.
    pub fn apply_label_reduction(&mut self, mapping: &[(LabelId, Vec<LabelId>)], only_equivalent_labels: bool) {
        for (new_label, old_labels) in mapping.iter() {
            if only_equivalent_labels {
                let mut target = None;
                for old in old_labels.iter().copied() {
                    let Some(g) = self.group_of(old) else { continue };
                    self.groups[g].labels.retain(|l| *l != old);
                    self.label_to_group[old] = None;
                    match target {
                        None => target = Some(g),
                        Some(t) if t != g => {
                            let moved = std::mem::take(&mut self.groups[g].labels);
                            for l in moved.iter().copied() {
                                self.label_to_group[l] = Some(t);
                            }
                            self.groups[t].labels.extend(moved);
                            let trs = std::mem::take(&mut self.groups[g].transitions);
                            self.groups[t].transitions.extend(trs);
                        },
                        _ => {},
                    }
                }
                if let Some(t) = target {
                    self.groups[t].labels.push(*new_label);
                    self.set_group(*new_label, t);
                }
            } else {
                let mut transitions = vec![];
                for old in old_labels.iter().copied() {
                    if let Some(g) = self.group_of(old) {
                        self.groups[g].labels.retain(|l| *l != old);
                        transitions.extend_from_slice(&self.groups[g].transitions);
                        self.label_to_group[old] = None;
                    }
                }
                self.groups.push(LabelGroup::new(vec![*new_label], transitions));
                let g = self.groups.len() - 1;
                self.set_group(*new_label, g);
            }
        }
        if only_equivalent_labels {
            self.compact();
        } else {
            self.regroup();
        }
    }

    /// Applies an abstraction to this system: `mapping[s]` gives the class of
    /// the old state `s` (`None` for the states that are dropped altogether).
    pub fn apply_abstraction(&mut self, equivalence: &StateEquivalenceRelation, mapping: &[Option<usize>]) {
        let new_size = equivalence.len();
        let mut goal_states = vec![false; new_size];
        for (class, states) in equivalence.iter().enumerate() {
            goal_states[class] = states.iter().any(|s| self.goal_states[*s]);
        }
        for group in self.groups.iter_mut() {
            let transitions = group.transitions.iter()
                .filter_map(|t| match (mapping[t.src], mapping[t.target]) {
                    (Some(src), Some(target)) => Some(Transition::new(src, target)),
                    _ => None,
                })
                .collect::<Vec<_>>();
            group.transitions = transitions;
            group.transitions.sort_unstable();
            group.transitions.dedup();
        }
        self.init_state = self.init_state.and_then(|i| mapping[i]);
        self.goal_states = goal_states;
        self.num_states = new_size;
        self.regroup();
    }

    // --- PRIVATE ------------------------------------------------------------
    fn set_group(&mut self, label: LabelId, group: usize) {
        if self.label_to_group.len() <= label {
            self.label_to_group.resize(label + 1, None);
        }
        self.label_to_group[label] = Some(group);
    }
    /// Fuses all groups having identical transitions, drops the empty ones
    /// and rebuilds the label index.
    fn regroup(&mut self) {
        let mut index: FxHashMap<Vec<Transition>, usize> = FxHashMap::default();
        let mut fused: Vec<LabelGroup> = vec![];
        for mut group in std::mem::take(&mut self.groups) {
            if group.labels.is_empty() {
                continue;
            }
            group.transitions.sort_unstable();
            group.transitions.dedup();
            match index.get(&group.transitions) {
                Some(g) => fused[*g].labels.append(&mut group.labels),
                None => {
                    index.insert(group.transitions.clone(), fused.len());
                    fused.push(group);
                },
            }
        }
        self.groups = fused;
        self.rebuild_label_index();
    }
    /// Drops the empty groups and rebuilds the label index
    fn compact(&mut self) {
        self.groups.retain(|g| !g.labels.is_empty());
        for g in self.groups.iter_mut() {
            g.transitions.sort_unstable();
            g.transitions.dedup();
        }
        self.rebuild_label_index();
    }
    fn rebuild_label_index(&mut self) {
        let max_label = self.groups.iter()
            .flat_map(|g| g.labels.iter().copied())
            .max();
        self.label_to_group = vec![None; max_label.map_or(0, |m| m + 1)];
        for (gid, group) in self.groups.iter_mut().enumerate() {
            group.labels.sort_unstable();
            for l in group.labels.iter().copied() {
                self.label_to_group[l] = Some(gid);
            }
        }
    }
}

impl fmt::Display for TransitionSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.incorporated_variables.len() == 1 {
            write!(f, "atomic transition system #{}", self.incorporated_variables[0])?;
        } else {
            write!(f, "transition system {:?}", self.incorporated_variables)?;
        }
        write!(f, ": {} states, {} arcs, {} label groups",
            self.num_states, self.num_transitions(), self.groups.len())
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
