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

//! This module provides the cluster based non-orthogonal merge strategy.
//! Every variable defines a cluster made of itself and of its neighbours in
//! the causal graph. The clusters are merged one after the other, each into a
//! single factor, with the merge selector restricted to the factors of the
//! cluster. A variable belonging to several clusters is cloned so that every
//! cluster it belongs to can use it.

use std::collections::VecDeque;

use tracing::debug;

use crate::{CausalGraph, Error, FactoredTransitionSystem, MergeSelector, MergeStrategy, MergeStrategyFactory,
    NextMerge, Task, Verbosity};

/// Which neighbours of a variable make up its cluster
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ClusterStrategy {
    /// The variables it depends on
    #[default]
    Predecessors,
    /// The variables depending on it
    Successors,
    Both,
}

/// Computes the clusters of the task (each sorted, without duplicates, with
/// at least two variables)
pub fn compute_clusters(task: &dyn Task, strategy: ClusterStrategy) -> Vec<Vec<usize>> {
    let cg = CausalGraph::new(task);
    let mut clusters: Vec<Vec<usize>> = vec![];
    for var in 0..task.nb_variables() {
        let mut cluster = match strategy {
            ClusterStrategy::Predecessors => cg.predecessors(var).to_vec(),
            ClusterStrategy::Successors => cg.successors(var).to_vec(),
            ClusterStrategy::Both => cg.predecessors(var).iter().chain(cg.successors(var).iter()).copied().collect(),
        };
        cluster.push(var);
        cluster.sort_unstable();
        cluster.dedup();
        if cluster.len() >= 2 && !clusters.contains(&cluster) {
            clusters.push(cluster);
        }
    }
    clusters
}

pub struct MergeStrategyFactoryClusters {
    selector: Option<MergeSelector>,
    cluster_strategy: ClusterStrategy,
    tokens: i64,
    requires_init_distances: bool,
    requires_goal_distances: bool,
}
impl MergeStrategyFactoryClusters {
    /// `tokens` bounds the number of clones the strategy asks for (negative
    /// means no limit).
    pub fn new(selector: MergeSelector, cluster_strategy: ClusterStrategy, tokens: i64) -> Self {
        MergeStrategyFactoryClusters {
            requires_init_distances: selector.requires_init_distances(),
            requires_goal_distances: selector.requires_goal_distances(),
            selector: Some(selector),
            cluster_strategy,
            tokens,
        }
    }
}

impl MergeStrategyFactory for MergeStrategyFactoryClusters {
    fn name(&self) -> &str {
        "clusters"
    }
    fn compute_merge_strategy(
        &mut self,
        task: &dyn Task,
        _fts: &FactoredTransitionSystem,
    ) -> Result<Box<dyn MergeStrategy>, Error> {
        let mut selector = self.selector.take()
            .ok_or(Error::FactoryReused("clusters merge strategy factory"))?;
        selector.initialize(task);

        let clusters = compute_clusters(task, self.cluster_strategy);
        let mut var_count = vec![0_usize; task.nb_variables()];
        for var in clusters.iter().flatten().copied() {
            var_count[var] += 1;
        }
        for count in var_count.iter_mut() {
            *count = count.saturating_sub(1);
        }
        debug!(clusters = clusters.len(), clones = var_count.iter().sum::<usize>(), "merge clusters");

        Ok(Box::new(ClusterMergeStrategy {
            selector,
            clusters: clusters.into(),
            current: vec![],
            var_count,
            tokens: self.tokens,
        }))
    }
    fn requires_init_distances(&self) -> bool {
        self.requires_init_distances
    }
    fn requires_goal_distances(&self) -> bool {
        self.requires_goal_distances
    }
}

struct ClusterMergeStrategy {
    selector: MergeSelector,
    clusters: VecDeque<Vec<usize>>,
    /// The factors of the cluster being merged
    current: Vec<usize>,
    /// How many more times each atomic factor should be cloned
    var_count: Vec<usize>,
    tokens: i64,
}

impl ClusterMergeStrategy {
    fn clone_operand(&mut self, index: usize) -> bool {
        match self.var_count.get_mut(index) {
            Some(count) if *count > 0 && self.tokens != 0 => {
                *count -= 1;
                if self.tokens > 0 {
                    self.tokens -= 1;
                }
                true
            }
            _ => false,
        }
    }
}

impl MergeStrategy for ClusterMergeStrategy {
    fn get_next(&mut self, fts: &FactoredTransitionSystem) -> NextMerge {
        if !self.current.is_empty() {
            let product = fts.size() - 1;
            if fts.is_active(product) {
                self.current.push(product);
            }
        }
        loop {
            self.current.retain(|i| fts.is_active(*i));
            if self.current.len() < 2 {
                self.current.clear();
                match self.clusters.pop_front() {
                    Some(cluster) => self.current = cluster,
                    None => return NextMerge::stop(),
                }
                continue;
            }
            let selected = self.selector.select_merges(fts, Some(&self.current), Verbosity::Silent);
            let Some((i, j)) = selected.first().copied() else {
                self.current.clear();
                continue;
            };
            self.current.retain(|k| *k != i && *k != j);
            let clone_i = self.clone_operand(i);
            let clone_j = self.clone_operand(j);
            return NextMerge::cloning(i, j, clone_i, clone_j);
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
