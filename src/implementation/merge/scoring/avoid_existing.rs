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
//! This module provides a scoring function which discards the candidates
//! whose product would cover exactly the variables of an existing factor.
//! Such products can only appear once factors are cloned.

use crate::{FactoredTransitionSystem, MergeScoringFunction};

#[derive(Debug, Default, Clone, Copy)]
pub struct AvoidExisting;

impl MergeScoringFunction for AvoidExisting {
    fn name(&self) -> &str {
        "avoid existing"
    }
    fn compute_scores(&mut self, fts: &FactoredTransitionSystem, candidates: &[(usize, usize)]) -> Vec<f64> {
        let existing = fts.active_indices()
            .map(|i| fts.transition_system(i).incorporated_variables().to_vec())
            .collect::<Vec<_>>();
        candidates.iter()
            .map(|(i, j)| {
                let mut vars = fts.transition_system(*i).incorporated_variables().to_vec();
                vars.extend_from_slice(fts.transition_system(*j).incorporated_variables());
                vars.sort_unstable();
                vars.dedup();
                if existing.contains(&vars) { f64::INFINITY } else { 0.0 }
            })
            .collect()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
