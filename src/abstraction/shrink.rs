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

//! This module defines the shrink strategy abstraction: the policy deciding
//! which abstract states of a factor get collapsed when the factor must be
//! made smaller.

use crate::{Cost, Distances, TransitionSystem};

/// An equivalence relation over the states of a transition system. Each
/// inner vector is a class; states that belong to no class are pruned.
pub type StateEquivalenceRelation = Vec<Vec<usize>>;

/// A shrink strategy computes an equivalence relation over the states of a
/// factor with at most `target_size` classes.
pub trait ShrinkStrategy {
    /// A short human readable name (used in the logs)
    fn name(&self) -> &str;
    /// Whether the strategy reads the init distances of the factor
    fn requires_init_distances(&self) -> bool;
    /// Whether the strategy reads the goal distances of the factor
    fn requires_goal_distances(&self) -> bool;
    /// Computes the classes of states that should be collapsed, `costs` being
    /// the current label costs. The returned relation has at most
    /// `target_size` classes and the class of the initial state (when it is
    /// not pruned) is never empty.
    fn compute_equivalence_relation(
        &mut self,
        ts: &TransitionSystem,
        distances: &Distances,
        costs: &[Cost],
        target_size: usize,
    ) -> StateEquivalenceRelation;
}
