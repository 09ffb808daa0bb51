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

//! This module defines the planning task the engine abstracts. A task is a
//! set of finite domain variables, a set of operators (the original labels),
//! an initial state and a conjunctive goal. Anything implementing the `Task`
//! trait can be fed to the merge-and-shrink algorithm.

use serde::{Deserialize, Serialize};

use crate::Cost;

/// A fact is the assignment `var = value`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fact {
    pub var: usize,
    pub value: usize,
}
impl Fact {
    pub fn new(var: usize, value: usize) -> Self {
        Self { var, value }
    }
}

/// An operator of the task. Its index in `Task::operators()` is the id of the
/// original label it induces. Preconditions are a partial assignment and
/// effects assign a value to a subset of the variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    #[serde(default)]
    pub name: String,
    pub cost: Cost,
    #[serde(default)]
    pub preconditions: Vec<Fact>,
    pub effects: Vec<Fact>,
}
impl Operator {
    /// Returns the precondition value of `var` (if any)
    pub fn precondition_on(&self, var: usize) -> Option<usize> {
        self.preconditions.iter().find(|f| f.var == var).map(|f| f.value)
    }
    /// Returns the value assigned to `var` by this operator (if any)
    pub fn effect_on(&self, var: usize) -> Option<usize> {
        self.effects.iter().find(|f| f.var == var).map(|f| f.value)
    }
    /// True iff the operator can be applied in the given concrete state
    pub fn is_applicable(&self, state: &[usize]) -> bool {
        self.preconditions.iter().all(|f| state[f.var] == f.value)
    }
    /// Returns the state reached when applying this operator in `state`
    pub fn apply(&self, state: &[usize]) -> Vec<usize> {
        let mut next = state.to_vec();
        for eff in self.effects.iter() {
            next[eff.var] = eff.value;
        }
        next
    }
}

/// This trait defines the "contract" of a factored planning task as it is
/// consumed by the engine.
pub trait Task {
    /// The number of state variables of the task
    fn nb_variables(&self) -> usize;
    /// The size of the (finite) domain of the given variable
    fn domain_size(&self, var: usize) -> usize;
    /// The operators of the task; the position of an operator is its label id
    fn operators(&self) -> &[Operator];
    /// A full assignment giving the value of each variable in the initial state
    fn initial_state(&self) -> &[usize];
    /// The goal, as a partial assignment
    fn goal(&self) -> &[Fact];
    /// Whether the task uses axioms (derived variables). The engine does not
    /// support them.
    fn has_axioms(&self) -> bool {
        false
    }

    /// The number of operators (hence of original labels)
    fn nb_operators(&self) -> usize {
        self.operators().len()
    }
    /// True iff the given state satisfies all goal facts
    fn is_goal_state(&self, state: &[usize]) -> bool {
        self.goal().iter().all(|f| state[f.var] == f.value)
    }
    /// The average cost of the task operators (0 when there are none)
    fn average_operator_cost(&self) -> f64 {
        let ops = self.operators();
        if ops.is_empty() {
            0.0
        } else {
            ops.iter().map(|o| o.cost as f64).sum::<f64>() / ops.len() as f64
        }
    }
}
