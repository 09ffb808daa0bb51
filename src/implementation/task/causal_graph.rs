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

//! This module provides the causal graph of a task. There is an arc from `u`
//! to `v` whenever some operator has a precondition on `u` and an effect on
//! `v`, or effects on both `u` and `v` (with `u != v`).

use crate::Task;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CausalGraph {
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
}

impl CausalGraph {
    pub fn new(task: &dyn Task) -> Self {
        let n = task.nb_variables();
        let mut successors = vec![vec![]; n];
        let mut predecessors = vec![vec![]; n];
        for op in task.operators() {
            for eff in op.effects.iter() {
                let sources = op.preconditions.iter().chain(op.effects.iter());
                for src in sources.filter(|f| f.var != eff.var) {
                    successors[src.var].push(eff.var);
                    predecessors[eff.var].push(src.var);
                }
            }
        }
        for arcs in successors.iter_mut().chain(predecessors.iter_mut()) {
            arcs.sort_unstable();
            arcs.dedup();
        }
        CausalGraph { successors, predecessors }
    }
    pub fn nb_variables(&self) -> usize {
        self.successors.len()
    }
    pub fn successors(&self, var: usize) -> &[usize] {
        &self.successors[var]
    }
    pub fn predecessors(&self, var: usize) -> &[usize] {
        &self.predecessors[var]
    }
}

#[cfg(test)]
mod test_causal_graph {
    use crate::*;

    #[test]
    fn arcs_go_from_preconditions_and_effects_to_effects() {
        let task = ExplicitTask::new(
            vec![2, 2, 2],
            vec![
                Operator { name: "a".into(), cost: 1, preconditions: vec![Fact::new(0, 1)], effects: vec![Fact::new(1, 1)] },
                Operator { name: "b".into(), cost: 1, preconditions: vec![], effects: vec![Fact::new(1, 0), Fact::new(2, 1)] },
            ],
            vec![0, 0, 0],
            vec![Fact::new(2, 1)],
        );
        let cg = CausalGraph::new(&task);
        assert_eq!(3, cg.nb_variables());
        assert_eq!(&[1], cg.successors(0));
        assert_eq!(&[2], cg.successors(1));
        assert_eq!(&[1], cg.successors(2));
        assert_eq!(&[0, 2], cg.predecessors(1));
        assert!(cg.predecessors(0).is_empty());
    }
}
