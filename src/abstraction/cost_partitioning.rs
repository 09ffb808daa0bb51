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
//! This module defines the abstractions of the cost partitioning layer. A
//! cost partitioning distributes the cost of every label among a collection
//! of abstractions so that the sum of their goal distances stays admissible.
//! Factories turn a snapshot of the factored transition system into such a
//! heuristic; order generators decide in which order the abstractions get to
//! consume the costs of a saturated cost partitioning.

use crate::{Abstraction, Cost, Task, Verbosity};

/// The order in which abstractions are considered: `order[k]` is the position
/// of the k-th abstraction in the list it was computed for.
pub type Order = Vec<usize>;

/// A heuristic compiled from a list of abstractions.
pub trait CostPartitioning {
    /// The heuristic value of a concrete state. It is `INF` when the state
    /// is recognized as a dead end.
    fn compute_value(&self, state: &[usize]) -> Cost;
    /// The number of abstractions this heuristic was computed over
    fn nb_abstractions(&self) -> usize;
}

/// A factory computes one cost partitioning over the abstractions of a
/// snapshot.
pub trait CostPartitioningFactory {
    /// A short human readable name (used in the logs)
    fn name(&self) -> &str;
    /// Gives the factory a chance to prepare itself before the first snapshot
    fn initialize(&mut self, _task: &dyn Task) {}
    /// Computes a cost partitioning over the given abstractions. The vector
    /// `costs` is indexed by the labels the abstractions are expressed over
    /// (or by the original labels when the abstractions carry a label
    /// mapping); `-1` marks a label id that is no longer in use.
    fn generate(
        &mut self,
        task: &dyn Task,
        costs: Vec<Cost>,
        abstractions: Vec<Abstraction>,
        verbosity: Verbosity,
    ) -> Box<dyn CostPartitioning>;
}

/// Computes the order in which a saturated cost partitioning considers the
/// abstractions.
pub trait OrderGenerator {
    /// Called once before the first order is computed for a task
    fn initialize(&mut self, _task: &dyn Task) {}
    /// Forgets anything cached about the abstractions of the last snapshot
    fn clear_internal_state(&mut self) {}
    /// Computes an order of the given abstractions. When `abstract_states`
    /// is given, the order is tailored for the concrete state whose abstract
    /// states they are (`None` meaning pruned); otherwise it is tailored for
    /// the initial states of the abstractions.
    fn compute_order(
        &mut self,
        abstractions: &[Abstraction],
        costs: &[Cost],
        abstract_states: Option<&[Option<usize>]>,
        verbosity: Verbosity,
    ) -> Order;
}
