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

//! This module provides the stateless non-orthogonal merge strategy. Rather
//! than keeping one of the best candidates, the strategy stores all of them
//! and replays them in a random order. A factor occurring in several of the
//! stored pairs is cloned when it is merged, so that it remains available for
//! the other pairs; this makes the resulting abstractions share variables.
//! Clones are only requested while the strategy holds enough tokens for a
//! whole round of stored pairs, and never again once a round of merges failed
//! to lower the number of active factors.

use fxhash::FxHashMap;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::debug;

use crate::{Error, FactoredTransitionSystem, MergeSelector, MergeStrategy, MergeStrategyFactory, NextMerge,
    Task, Verbosity};

pub struct MergeStrategyFactoryStatelessNonOrthogonal {
    selector: Option<MergeSelector>,
    tokens: i64,
    seed: u64,
    requires_init_distances: bool,
    requires_goal_distances: bool,
}
impl MergeStrategyFactoryStatelessNonOrthogonal {
    /// `tokens` bounds the number of clones the strategy asks for. A negative
    /// count is never enough to clone.
    pub fn new(selector: MergeSelector, tokens: i64, seed: u64) -> Self {
        MergeStrategyFactoryStatelessNonOrthogonal {
            requires_init_distances: selector.requires_init_distances(),
            requires_goal_distances: selector.requires_goal_distances(),
            selector: Some(selector),
            tokens,
            seed,
        }
    }
}

impl MergeStrategyFactory for MergeStrategyFactoryStatelessNonOrthogonal {
    fn name(&self) -> &str {
        "stateless non-orthogonal"
    }
    fn compute_merge_strategy(
        &mut self,
        task: &dyn Task,
        _fts: &FactoredTransitionSystem,
    ) -> Result<Box<dyn MergeStrategy>, Error> {
        let mut selector = self.selector.take()
            .ok_or(Error::FactoryReused("stateless non-orthogonal merge strategy factory"))?;
        selector.initialize(task);
        Ok(Box::new(NonOrthogonalMergeStrategy {
            selector,
            tokens: self.tokens,
            rng: StdRng::seed_from_u64(self.seed),
            stored_merges: vec![],
            var_count: FxHashMap::default(),
            times_to_clone: 0,
            round_start: None,
            stalled: false,
        }))
    }
    fn requires_init_distances(&self) -> bool {
        self.requires_init_distances
    }
    fn requires_goal_distances(&self) -> bool {
        self.requires_goal_distances
    }
}

struct NonOrthogonalMergeStrategy {
    selector: MergeSelector,
    tokens: i64,
    rng: StdRng,
    /// The best candidates of the last selection, the next one last
    stored_merges: Vec<(usize, usize)>,
    /// How many stored pairs each factor still occurs in
    var_count: FxHashMap<usize, usize>,
    /// How many clones replaying all stored pairs would require
    times_to_clone: usize,
    /// The number of active factors when the current round was stored
    round_start: Option<usize>,
    /// A round of merges left the number of active factors unchanged
    stalled: bool,
}

impl NonOrthogonalMergeStrategy {
    fn store_merges(&mut self, fts: &FactoredTransitionSystem) {
        let num_active = fts.num_active();
        if self.round_start.is_some_and(|start| num_active >= start) {
            if !self.stalled {
                debug!(num_active, "a round of non-orthogonal merges made no progress, cloning stops");
            }
            self.stalled = true;
        }
        self.round_start = Some(num_active);
        self.stored_merges = self.selector.select_merges(fts, None, Verbosity::Silent);
        self.stored_merges.shuffle(&mut self.rng);
        self.var_count.clear();
        for (i, j) in self.stored_merges.iter().copied() {
            *self.var_count.entry(i).or_insert(0) += 1;
            *self.var_count.entry(j).or_insert(0) += 1;
        }
        self.times_to_clone = self.var_count.values().map(|c| c - 1).sum();
        debug!(stored = self.stored_merges.len(), clones = self.times_to_clone, "non-orthogonal merges");
    }

    fn can_clone_all(&self) -> bool {
        !self.stalled && self.times_to_clone as i64 <= self.tokens
    }

    /// Flags the operand for cloning when it occurs in another stored pair
    fn clone_operand(&mut self, index: usize) -> bool {
        match self.var_count.get_mut(&index) {
            Some(count) if *count > 1 => {
                *count -= 1;
                self.tokens -= 1;
                self.times_to_clone -= 1;
                true
            }
            _ => false,
        }
    }
}

impl MergeStrategy for NonOrthogonalMergeStrategy {
    fn get_next(&mut self, fts: &FactoredTransitionSystem) -> NextMerge {
        self.stored_merges.retain(|(i, j)| fts.is_active(*i) && fts.is_active(*j));
        if self.stored_merges.is_empty() {
            self.store_merges(fts);
        }
        let Some((i, j)) = self.stored_merges.pop() else {
            return NextMerge::stop();
        };
        if self.stored_merges.is_empty() || !self.can_clone_all() {
            self.stored_merges.clear();
            return NextMerge::merge(i, j);
        }
        let clone_i = self.clone_operand(i);
        let clone_j = self.clone_operand(j);
        NextMerge::cloning(i, j, clone_i, clone_j)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_non_orthogonal_merge_strategy {
    use crate::*;

    /// a: x := 1 ; b: y := 1 ; c: z := 1 ; the goal only mentions x
    fn task() -> ExplicitTask {
        let ops = (0..3)
            .map(|v| Operator { name: format!("o{v}"), cost: 1, preconditions: vec![], effects: vec![Fact::new(v, 1)] })
            .collect();
        ExplicitTask::new(vec![2, 2, 2], ops, vec![0, 0, 0], vec![Fact::new(0, 1)])
    }
    /// Goal relevance ties (0, 1) and (0, 2): both pairs are stored
    fn factory(tokens: i64) -> MergeStrategyFactoryStatelessNonOrthogonal {
        MergeStrategyFactoryStatelessNonOrthogonal::new(MergeSelector::new(vec![Box::new(GoalRelevance)]), tokens, 0)
    }

    #[test]
    fn the_shared_factor_is_cloned() {
        let task = task();
        let mut fts = FactoredTransitionSystem::atomic(&task, false, false);
        let mut strategy = factory(10).compute_merge_strategy(&task, &fts).unwrap();

        let first = strategy.get_next(&fts);
        assert!(!first.stop);
        assert_eq!(0, first.pair.0);
        assert_eq!((true, false), first.clone);
        fts.cloning_merge(first.pair.0, first.pair.1, first.clone.0, first.clone.1);
        assert_eq!(3, fts.num_active());

        let second = strategy.get_next(&fts);
        assert_eq!(0, second.pair.0);
        assert_ne!(first.pair.1, second.pair.1);
        assert_eq!((false, false), second.clone);
    }
    #[test]
    fn without_tokens_nothing_is_cloned() {
        let task = task();
        let fts = FactoredTransitionSystem::atomic(&task, false, false);
        let mut strategy = factory(0).compute_merge_strategy(&task, &fts).unwrap();
        let next = strategy.get_next(&fts);
        assert!(!next.stop);
        assert_eq!((false, false), next.clone);
    }
    #[test]
    fn negative_tokens_never_clone() {
        let task = task();
        let fts = FactoredTransitionSystem::atomic(&task, false, false);
        let mut strategy = factory(-1).compute_merge_strategy(&task, &fts).unwrap();
        assert_eq!((false, false), strategy.get_next(&fts).clone);
    }

    /// Replays the strategy the way the main loop does, granting every clone.
    /// Returns the number of merges and the leaf count of the last factor.
    fn run_to_completion(task: &ExplicitTask, tokens: i64) -> (usize, usize) {
        let mut fts = FactoredTransitionSystem::atomic(task, false, false);
        let mut strategy = factory(tokens).compute_merge_strategy(task, &fts).unwrap();
        let mut merges = 0;
        while fts.num_active() > 1 {
            let next = strategy.get_next(&fts);
            if next.stop {
                break;
            }
            fts.cloning_merge(next.pair.0, next.pair.1, next.clone.0, next.clone.1);
            merges += 1;
            assert!(merges <= 50, "the merge sequence does not terminate");
        }
        let last = fts.active_indices().last().unwrap();
        (merges, fts.leaf_count(last))
    }
    /// Three switches which all are goals: every pair of factors ties
    fn all_goals() -> ExplicitTask {
        let ops = (0..3)
            .map(|v| Operator { name: format!("o{v}"), cost: 1, preconditions: vec![], effects: vec![Fact::new(v, 1)] })
            .collect();
        ExplicitTask::new(vec![2, 2, 2], ops, vec![0, 0, 0], (0..3).map(|v| Fact::new(v, 1)).collect())
    }
    #[test]
    fn merges_terminate_when_every_pair_ties() {
        assert_eq!((2, 3), run_to_completion(&all_goals(), -1));
        assert_eq!((2, 3), run_to_completion(&all_goals(), 0));
    }
    #[test]
    fn cloning_stops_once_a_round_makes_no_progress() {
        let (merges, leaves) = run_to_completion(&all_goals(), 1_000);
        assert!(merges > 2);
        assert!(leaves < 16);
    }
    #[test]
    fn it_stops_when_no_pair_is_left() {
        let task = ExplicitTask::new(vec![2], vec![], vec![0], vec![]);
        let fts = FactoredTransitionSystem::atomic(&task, false, false);
        let mut strategy = factory(10).compute_merge_strategy(&task, &fts).unwrap();
        assert!(strategy.get_next(&fts).stop);
    }
    #[test]
    fn the_factory_is_one_shot() {
        let task = task();
        let fts = FactoredTransitionSystem::atomic(&task, false, false);
        let mut factory = factory(-1);
        assert!(factory.compute_merge_strategy(&task, &fts).is_ok());
        assert!(matches!(factory.compute_merge_strategy(&task, &fts), Err(Error::FactoryReused(_))));
    }
}
