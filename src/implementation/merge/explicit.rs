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

//! This module provides a merge strategy replaying a merge sequence fixed in
//! advance. Each step may request the operands to be cloned.

use crate::{Error, FactoredTransitionSystem, MergeStrategy, MergeStrategyFactory, NextMerge, Task};

#[derive(Debug, Clone)]
pub struct MergeStrategyFactoryExplicit {
    merges: Vec<NextMerge>,
}
impl MergeStrategyFactoryExplicit {
    pub fn new(merges: Vec<NextMerge>) -> Self {
        MergeStrategyFactoryExplicit { merges }
    }
}

impl MergeStrategyFactory for MergeStrategyFactoryExplicit {
    fn name(&self) -> &str {
        "explicit"
    }
    fn compute_merge_strategy(
        &mut self,
        _task: &dyn Task,
        _fts: &FactoredTransitionSystem,
    ) -> Result<Box<dyn MergeStrategy>, Error> {
        let mut merges = self.merges.clone();
        merges.reverse();
        Ok(Box::new(ExplicitMergeStrategy { merges }))
    }
    fn requires_init_distances(&self) -> bool {
        false
    }
    fn requires_goal_distances(&self) -> bool {
        false
    }
}

struct ExplicitMergeStrategy {
    /// The merges still to come, the next one last
    merges: Vec<NextMerge>,
}
impl MergeStrategy for ExplicitMergeStrategy {
    fn get_next(&mut self, _fts: &FactoredTransitionSystem) -> NextMerge {
        self.merges.pop().unwrap_or_else(NextMerge::stop)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
