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

//! This module provides the merge-and-shrink representation of a factor: the
//! function mapping a concrete task state onto the abstract state of the
//! factor. It is a tree whose leaves look the value of one variable up and
//! whose inner nodes look the pair of values of their children up in a
//! two dimensional table.
//!
//! Inner nodes hold their children behind an `Rc`. Cloning a representation
//! therefore copies its own table but shares the subtrees, which is what lets
//! a cloned factor and its original participate in distinct merges.

use std::rc::Rc;

use crate::{Cost, PRUNED_STATE};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Leaf {
        var: usize,
        lookup: Vec<i32>,
    },
    Merge {
        left: Rc<MasRepresentation>,
        right: Rc<MasRepresentation>,
        lookup: Vec<Vec<i32>>,
    },
}

/// Maps concrete states to abstract states (or to `PRUNED_STATE`). Once
/// `set_distances` has been called, it maps concrete states to goal distances
/// instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasRepresentation {
    domain_size: usize,
    node: Node,
}

impl MasRepresentation {
    /// The identity over the values of the given variable
    pub fn leaf(var: usize, domain_size: usize) -> Self {
        MasRepresentation {
            domain_size,
            node: Node::Leaf { var, lookup: (0..domain_size as i32).collect() },
        }
    }
    /// Combines the representations of the two operands of a merge. The pair
    /// `(a, b)` is mapped onto `a * |right| + b`.
    pub fn merge(left: Rc<MasRepresentation>, right: Rc<MasRepresentation>) -> Self {
        let n1 = left.domain_size;
        let n2 = right.domain_size;
        let lookup = (0..n1)
            .map(|a| (0..n2).map(|b| (a * n2 + b) as i32).collect())
            .collect();
        MasRepresentation {
            domain_size: n1 * n2,
            node: Node::Merge { left, right, lookup },
        }
    }

    /// The number of abstract states this function maps onto
    pub fn domain_size(&self) -> usize {
        self.domain_size
    }

    /// The value stored for the given concrete state
    pub fn get_value(&self, state: &[usize]) -> i32 {
        match &self.node {
            Node::Leaf { var, lookup } => lookup[state[*var]],
            Node::Merge { left, right, lookup } => {
                let a = left.get_value(state);
                if a == PRUNED_STATE {
                    return PRUNED_STATE;
                }
                let b = right.get_value(state);
                if b == PRUNED_STATE {
                    return PRUNED_STATE;
                }
                lookup[a as usize][b as usize]
            }
        }
    }
    /// The abstract state of the given concrete state, `None` if pruned
    pub fn get_abstract_state(&self, state: &[usize]) -> Option<usize> {
        let value = self.get_value(state);
        if value == PRUNED_STATE {
            None
        } else {
            Some(value as usize)
        }
    }

    /// Renames every abstract state `s` into `mapping[s]` (pruning the ones
    /// mapped onto `None`) and shrinks the domain accordingly.
    pub fn apply_abstraction_to_lookup_table(&mut self, mapping: &[Option<usize>]) {
        let mut new_domain_size = 0;
        let mut remap = |v: &mut i32| {
            if *v != PRUNED_STATE {
                *v = match mapping[*v as usize] {
                    Some(s) => {
                        new_domain_size = new_domain_size.max(s + 1);
                        s as i32
                    },
                    None => PRUNED_STATE,
                };
            }
        };
        match &mut self.node {
            Node::Leaf { lookup, .. } => lookup.iter_mut().for_each(&mut remap),
            Node::Merge { lookup, .. } => lookup.iter_mut().flatten().for_each(&mut remap),
        }
        self.domain_size = new_domain_size;
    }

    /// Substitutes every abstract state by its goal distance. From then on,
    /// `get_value` returns heuristic values.
    pub fn set_distances(&mut self, goal_distances: &[Cost]) {
        let set = |v: &mut i32| {
            if *v != PRUNED_STATE {
                *v = goal_distances[*v as usize];
            }
        };
        match &mut self.node {
            Node::Leaf { lookup, .. } => lookup.iter_mut().for_each(set),
            Node::Merge { lookup, .. } => lookup.iter_mut().flatten().for_each(set),
        }
    }

    /// True iff no concrete state is pruned by this function
    pub fn is_total(&self) -> bool {
        match &self.node {
            Node::Leaf { lookup, .. } => lookup.iter().all(|v| *v != PRUNED_STATE),
            Node::Merge { left, right, lookup } =>
                left.is_total() && right.is_total() && lookup.iter().flatten().all(|v| *v != PRUNED_STATE),
        }
    }
    /// The number of leaves (i.e. of task variables, counted with
    /// multiplicity when factors were cloned)
    pub fn leaf_count(&self) -> usize {
        match &self.node {
            Node::Leaf { .. } => 1,
            Node::Merge { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_representation {
    use std::rc::Rc;

    use crate::*;

    #[test]
    fn leaf_is_the_identity() {
        let r = MasRepresentation::leaf(1, 3);
        assert_eq!(3, r.domain_size());
        assert_eq!(2, r.get_value(&[0, 2]));
        assert!(r.is_total());
        assert_eq!(1, r.leaf_count());
    }
    #[test]
    fn merge_numbers_pairs_row_major() {
        let r = MasRepresentation::merge(
            Rc::new(MasRepresentation::leaf(0, 2)),
            Rc::new(MasRepresentation::leaf(1, 3)));
        assert_eq!(6, r.domain_size());
        assert_eq!(5, r.get_value(&[1, 2]));
        assert_eq!(1, r.get_value(&[0, 1]));
        assert_eq!(2, r.leaf_count());
    }
    #[test]
    fn merge_is_pruned_when_a_child_is_pruned() {
        let mut x = MasRepresentation::leaf(0, 2);
        x.apply_abstraction_to_lookup_table(&[None, Some(0)]);
        assert_eq!(1, x.domain_size());
        assert!(!x.is_total());
        let r = MasRepresentation::merge(Rc::new(x), Rc::new(MasRepresentation::leaf(1, 2)));
        assert_eq!(PRUNED_STATE, r.get_value(&[0, 1]));
        assert_eq!(None, r.get_abstract_state(&[0, 0]));
        assert_eq!(Some(1), r.get_abstract_state(&[1, 1]));
        assert!(!r.is_total());
    }
    #[test]
    fn abstraction_renames_states() {
        let mut r = MasRepresentation::merge(
            Rc::new(MasRepresentation::leaf(0, 2)),
            Rc::new(MasRepresentation::leaf(1, 2)));
        r.apply_abstraction_to_lookup_table(&[Some(0), Some(0), Some(1), None]);
        assert_eq!(2, r.domain_size());
        assert_eq!(0, r.get_value(&[0, 1]));
        assert_eq!(1, r.get_value(&[1, 0]));
        assert_eq!(PRUNED_STATE, r.get_value(&[1, 1]));
    }
    #[test]
    fn set_distances_turns_the_function_into_a_heuristic() {
        let mut r = MasRepresentation::leaf(0, 3);
        r.set_distances(&[2, 1, 0]);
        assert_eq!(2, r.get_value(&[0]));
        assert_eq!(0, r.get_value(&[2]));
    }
    #[test]
    fn clones_share_children_but_not_tables() {
        let left = Rc::new(MasRepresentation::leaf(0, 2));
        let r = MasRepresentation::merge(left.clone(), Rc::new(MasRepresentation::leaf(1, 2)));
        let mut copy = r.clone();
        copy.apply_abstraction_to_lookup_table(&[Some(0), Some(0), Some(0), Some(0)]);
        assert_eq!(4, r.domain_size());
        assert_eq!(1, copy.domain_size());
        assert_eq!(3, Rc::strong_count(&left));
    }
}
