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
//! This module provides the abstractions cost partitionings are computed
//! over: a copy of the transition system and representation of a factor
//! taken at the time of a snapshot. An abstraction taken out of the main loop
//! may carry a label mapping, in which case its transition system speaks
//! about reduced labels while costs are given for the original ones.

use crate::{FactoredTransitionSystem, LabelId, MasRepresentation, TransitionSystem};

#[derive(Debug, Clone)]
pub struct Abstraction {
    ts: TransitionSystem,
    representation: MasRepresentation,
    /// `label_mapping[o]` is the label of `ts` standing for original label `o`
    label_mapping: Option<Vec<LabelId>>,
    /// The index of the factor this abstraction was taken from
    fts_index: usize,
}

impl Abstraction {
    pub fn new(ts: TransitionSystem, representation: MasRepresentation, fts_index: usize) -> Self {
        Abstraction { ts, representation, label_mapping: None, fts_index }
    }
    /// Attaches the mapping from original labels to the labels of the system
    pub fn with_label_mapping(mut self, label_mapping: Vec<LabelId>) -> Self {
        self.label_mapping = Some(label_mapping);
        self
    }

    pub fn transition_system(&self) -> &TransitionSystem {
        &self.ts
    }
    pub fn representation(&self) -> &MasRepresentation {
        &self.representation
    }
    pub fn label_mapping(&self) -> Option<&[LabelId]> {
        self.label_mapping.as_deref()
    }
    pub fn fts_index(&self) -> usize {
        self.fts_index
    }
    /// True iff the abstraction accounts for one single task variable
    pub fn is_atomic(&self) -> bool {
        self.ts.incorporated_variables().len() == 1
    }
    /// The abstract state of a concrete state (`None` when it is pruned)
    pub fn abstract_state(&self, state: &[usize]) -> Option<usize> {
        self.representation.get_abstract_state(state)
    }
    /// The abstract state of the initial state of the task
    pub fn init_state(&self) -> Option<usize> {
        self.ts.init_state()
    }
    /// Drops the transition system and keeps the abstraction function
    pub fn into_representation(self) -> MasRepresentation {
        self.representation
    }
}

/// Copies the given active factors into abstractions
pub fn compute_abstractions_for_factors(fts: &FactoredTransitionSystem, factors: &[usize]) -> Vec<Abstraction> {
    factors.iter()
        .copied()
        .map(|i| Abstraction::new(fts.transition_system(i).clone(), fts.representation(i).clone(), i))
        .collect()
}

/// The abstract state of a concrete state in each of the abstractions
pub fn compute_abstract_states(abstractions: &[Abstraction], state: &[usize]) -> Vec<Option<usize>> {
    abstractions.iter().map(|a| a.abstract_state(state)).collect()
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
