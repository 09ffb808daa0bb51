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

//! This module provides the stateless merge strategy: the next merge is the
//! one the merge selector picks on the current factored transition system.

use crate::{Error, FactoredTransitionSystem, MergeSelector, MergeStrategy, MergeStrategyFactory, NextMerge,
    Task, Verbosity};

pub struct MergeStrategyFactoryStateless {
    /// Moved into the strategy, hence the factory can only be used once
    selector: Option<MergeSelector>,
    requires_init_distances: bool,
    requires_goal_distances: bool,
}
impl MergeStrategyFactoryStateless {
    pub fn new(selector: MergeSelector) -> Self {
        MergeStrategyFactoryStateless {
            requires_init_distances: selector.requires_init_distances(),
            requires_goal_distances: selector.requires_goal_distances(),
            selector: Some(selector),
        }
    }
}

impl MergeStrategyFactory for MergeStrategyFactoryStateless {
    fn name(&self) -> &str {
        "stateless"
    }
    fn compute_merge_strategy(
        &mut self,
        task: &dyn Task,
        _fts: &FactoredTransitionSystem,
    ) -> Result<Box<dyn MergeStrategy>, Error> {
        let mut selector = self.selector.take()
            .ok_or(Error::FactoryReused("stateless merge strategy factory"))?;
        if !selector.is_tie_breaking() {
            return Err(Error::InvalidOptions(format!(
                "the merge selector [{}] must end with a tie-breaking scoring function", selector.describe())));
        }
        selector.initialize(task);
        Ok(Box::new(StatelessMergeStrategy { selector }))
    }
    fn requires_init_distances(&self) -> bool {
        self.requires_init_distances
    }
    fn requires_goal_distances(&self) -> bool {
        self.requires_goal_distances
    }
}

struct StatelessMergeStrategy {
    selector: MergeSelector,
}
impl MergeStrategy for StatelessMergeStrategy {
    fn get_next(&mut self, fts: &FactoredTransitionSystem) -> NextMerge {
        match self.selector.select_merges(fts, None, Verbosity::Silent).first() {
            Some((i, j)) => NextMerge::merge(*i, *j),
            None => NextMerge::stop(),
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_stateless_merge_strategy {
    use crate::*;

    fn task() -> ExplicitTask {
        ExplicitTask::new(vec![2, 2, 2], vec![], vec![0, 0, 0], vec![])
    }

    #[test]
    fn it_merges_until_a_single_factor_is_left() {
        let task = task();
        let mut fts = FactoredTransitionSystem::atomic(&task, false, false);
        let selector = MergeSelector::new(vec![]).with_tiebreaking(Box::new(TotalOrder::default()));
        let mut factory = MergeStrategyFactoryStateless::new(selector);
        let mut strategy = factory.compute_merge_strategy(&task, &fts).unwrap();
        let mut nb_merges = 0;
        loop {
            let next = strategy.get_next(&fts);
            if next.stop {
                break;
            }
            assert_eq!((false, false), next.clone);
            fts.merge(next.pair.0, next.pair.1);
            nb_merges += 1;
        }
        assert_eq!(2, nb_merges);
        assert_eq!(1, fts.num_active());
    }
    #[test]
    fn the_factory_is_one_shot() {
        let task = task();
        let fts = FactoredTransitionSystem::atomic(&task, false, false);
        let selector = MergeSelector::new(vec![Box::new(SingleRandom::new(0))]);
        let mut factory = MergeStrategyFactoryStateless::new(selector);
        assert!(factory.compute_merge_strategy(&task, &fts).is_ok());
        assert!(matches!(factory.compute_merge_strategy(&task, &fts), Err(Error::FactoryReused(_))));
    }
    #[test]
    fn a_selector_without_tie_breaking_is_rejected() {
        let task = task();
        let fts = FactoredTransitionSystem::atomic(&task, false, false);
        let mut factory = MergeStrategyFactoryStateless::new(MergeSelector::new(vec![Box::new(GoalRelevance)]));
        assert!(matches!(factory.compute_merge_strategy(&task, &fts), Err(Error::InvalidOptions(_))));
    }
}
