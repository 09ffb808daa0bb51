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

//! This module provides the merge-and-shrink algorithm interleaved with the
//! computation of cost partitionings. The algorithm starts from the atomic
//! factored transition system and repeatedly merges two factors (after
//! shrinking them so that their product respects the size limits) until a
//! single factor remains, the merge strategy stops or the time budget is
//! exhausted. Along the way, *snapshots* of the factored transition system
//! are taken; each snapshot yields a cost partitioning over the factors it
//! holds. In offline mode, the abstractions of all snapshots are collected
//! instead and one single cost partitioning is computed over all of them
//! once the main loop is over.

use bit_set::BitSet;
use tracing::{debug, info, trace, warn};

use crate::{compute_abstractions_for_factors, compute_goal_distances, prune_step, shrink_before_merge_step,
    Abstraction, Cost, CostPartitioning, CostPartitioningFactory, CountdownTimer, Error, FactoredTransitionSystem,
    LabelReduction, MergeAndShrinkOptions, MergeStrategy, MergeStrategyFactory, NextSnapshot, ShrinkLimits,
    ShrinkStrategy, SnapshotMoment, Task, Verbosity, INF};

/// What a run of the algorithm has collected so far
struct Collected {
    cost_partitionings: Vec<Box<dyn CostPartitioning>>,
    /// The abstractions of the snapshots (offline mode only)
    abstractions: Vec<Abstraction>,
    /// The factors transformed since the last snapshot (label reductions
    /// aside)
    modified: BitSet,
    unsolvable: bool,
}

/// The clone statistics of the main loop
#[derive(Debug, Default)]
struct CloneStatistics {
    times_cloned: usize,
    largest_clone: usize,
    total_cloned: usize,
}

/// The merge-and-shrink algorithm computing cost partitionings over its
/// intermediate factored transition systems.
///
/// # Example
/// ```
/// # use mascp::*;
/// let task = ExplicitTask::new(
///     vec![2, 2],
///     vec![
///         Operator { name: "a".into(), cost: 1, preconditions: vec![], effects: vec![Fact::new(0, 1)] },
///         Operator { name: "b".into(), cost: 3, preconditions: vec![], effects: vec![Fact::new(1, 1)] },
///     ],
///     vec![0, 0],
///     vec![Fact::new(0, 1), Fact::new(1, 1)],
/// );
/// let options = MergeAndShrinkOptionsBuilder::default()
///     .verbosity(Verbosity::Silent)
///     .build()
///     .unwrap();
/// let mut algorithm = MergeAndShrinkAlgorithm::new(
///     options,
///     Box::new(ShrinkBisimulation::default()),
///     Box::new(MergeStrategyFactoryPrecomputed::default()),
///     None,
///     Box::new(SaturatedCostPartitioningFactory::new(Box::new(GreedyOrders::default()))),
/// ).unwrap();
/// let cps = algorithm.compute_cps(&task).unwrap();
/// let heuristic = MaxCostPartitioningHeuristic::new(cps);
/// assert_eq!(4, heuristic.compute_heuristic(task.initial_state()));
/// ```
pub struct MergeAndShrinkAlgorithm {
    options: MergeAndShrinkOptions,
    limits: ShrinkLimits,
    shrink_strategy: Box<dyn ShrinkStrategy>,
    merge_strategy_factory: Box<dyn MergeStrategyFactory>,
    label_reduction: Option<LabelReduction>,
    cp_factory: Box<dyn CostPartitioningFactory>,
    used: bool,
}

impl MergeAndShrinkAlgorithm {
    /// Creates the algorithm. Fails when the options are inconsistent.
    pub fn new(
        options: MergeAndShrinkOptions,
        shrink_strategy: Box<dyn ShrinkStrategy>,
        merge_strategy_factory: Box<dyn MergeStrategyFactory>,
        label_reduction: Option<LabelReduction>,
        cp_factory: Box<dyn CostPartitioningFactory>,
    ) -> Result<Self, Error> {
        let limits = options.normalize()?;
        Ok(MergeAndShrinkAlgorithm {
            options,
            limits,
            shrink_strategy,
            merge_strategy_factory,
            label_reduction,
            cp_factory,
            used: false,
        })
    }

    /// The size limits after normalization
    pub fn limits(&self) -> ShrinkLimits {
        self.limits
    }

    fn verbosity(&self) -> Verbosity {
        self.options.verbosity
    }

    /// Runs the algorithm on the given task and returns the cost
    /// partitionings computed over its snapshots. When an unsolvable factor
    /// shows up, the result is a single cost partitioning over that factor
    /// (which is infinite on the initial state). The algorithm can only be
    /// run once.
    pub fn compute_cps(&mut self, task: &dyn Task) -> Result<Vec<Box<dyn CostPartitioning>>, Error> {
        if self.used {
            return Err(Error::FactoryReused("merge-and-shrink algorithm"));
        }
        self.used = true;
        if task.has_axioms() {
            return Err(Error::AxiomsNotSupported);
        }

        let timer = CountdownTimer::unlimited();
        let verbosity = self.verbosity();
        if verbosity.is_at_least_normal() {
            info!("running merge-and-shrink algorithm");
            self.dump_options();
            self.warn_on_unusual_options();
        }

        let compute_init_distances = self.shrink_strategy.requires_init_distances()
            || self.merge_strategy_factory.requires_init_distances()
            || self.options.prune_unreachable_states;
        let compute_goal_distances = self.shrink_strategy.requires_goal_distances()
            || self.merge_strategy_factory.requires_goal_distances()
            || self.options.prune_irrelevant_states;
        let mut fts = FactoredTransitionSystem::atomic(task, compute_init_distances, compute_goal_distances);
        if verbosity.is_at_least_normal() {
            info!(elapsed = timer.elapsed(), factors = fts.size(), "after computation of atomic factors");
        }

        self.cp_factory.initialize(task);

        let mut collected = Collected {
            cost_partitionings: vec![],
            abstractions: vec![],
            modified: BitSet::with_capacity((2 * fts.size()).max(1)),
            unsolvable: false,
        };

        let mut pruned = false;
        for index in 0..fts.size() {
            pruned |= prune_step(&mut fts, index,
                self.options.prune_unreachable_states, self.options.prune_irrelevant_states, verbosity);
            if !fts.is_factor_solvable(index) {
                if verbosity.is_at_least_normal() {
                    info!(factor = index, "atomic factored transition system is unsolvable, stopping computation");
                }
                self.handle_unsolvable_snapshot(task, &mut fts, index, &mut collected);
                break;
            }
        }
        if pruned && verbosity.is_at_least_normal() {
            info!(elapsed = timer.elapsed(), "after pruning atomic factors");
        }

        if !collected.unsolvable {
            if self.options.statistics_only {
                self.log_statistics(task, &fts, 0);
            }
            if self.options.atomic_label_reduction {
                if let Some(label_reduction) = self.label_reduction.as_mut() {
                    if label_reduction.reduce(None, &mut fts, verbosity) && verbosity.is_at_least_normal() {
                        info!(elapsed = timer.elapsed(), "after label reduction on atomic factors");
                    }
                }
            }

            for index in 0..fts.size() {
                collected.modified.insert(index);
            }
            if self.options.compute_atomic_snapshot {
                self.handle_snapshot(task, &fts, &mut collected);
                if verbosity.is_at_least_normal() {
                    info!(elapsed = timer.elapsed(), "after handling atomic snapshot");
                }
            }

            if self.options.main_loop_max_time > 0.0 {
                self.main_loop(task, &mut fts, &mut collected)?;
            }

            let nothing_collected = if self.options.offline_cps {
                collected.abstractions.is_empty()
            } else {
                collected.cost_partitionings.is_empty()
            };
            let pending = !collected.modified.is_empty();
            if !collected.unsolvable && ((self.options.compute_final_snapshot && pending) || nothing_collected) {
                self.handle_snapshot(task, &fts, &mut collected);
                if verbosity.is_at_least_normal() {
                    info!(elapsed = timer.elapsed(), "after handling final snapshot");
                }
            }
        }

        if self.options.offline_cps && !collected.unsolvable {
            let costs = task.operators().iter().map(|op| op.cost).collect::<Vec<_>>();
            let abstractions = std::mem::take(&mut collected.abstractions);
            collected.cost_partitionings = vec![self.cp_factory.generate(task, costs, abstractions, verbosity)];
        }

        let cost_partitionings = collected.cost_partitionings;
        if verbosity.is_at_least_normal() {
            let nb_abstractions = cost_partitionings.iter().map(|cp| cp.nb_abstractions()).sum::<usize>();
            info!(
                cost_partitionings = cost_partitionings.len(),
                average_abstractions = nb_abstractions as f64 / cost_partitionings.len().max(1) as f64,
                runtime = timer.elapsed(),
                "merge-and-shrink algorithm done"
            );
        }
        if cost_partitionings.is_empty() {
            return Err(Error::NoCostPartitioning);
        }
        Ok(cost_partitionings)
    }

    fn main_loop(
        &mut self,
        task: &dyn Task,
        fts: &mut FactoredTransitionSystem,
        collected: &mut Collected,
    ) -> Result<(), Error> {
        let verbosity = self.verbosity();
        let timer = CountdownTimer::new(self.options.main_loop_max_time);
        if verbosity.is_at_least_normal() {
            info!(max_time = self.options.main_loop_max_time, "starting main loop");
        }
        let mut maximum_intermediate_size = fts.active_indices()
            .map(|i| fts.transition_system(i).num_states())
            .max()
            .unwrap_or(0);

        let mut merge_strategy: Box<dyn MergeStrategy> = self.merge_strategy_factory.compute_merge_strategy(task, fts)?;

        let mut clone_tokens = self.options.tokens;
        let max_clone_size = if self.options.max_clone_size_factor < 0.0 {
            f64::INFINITY
        } else {
            self.options.max_clone_size_factor * task.nb_variables() as f64
        };
        let mut clones = CloneStatistics::default();

        let mut next_snapshot = if self.options.target_num_snapshots > 0 || self.options.snapshot_each_iteration > 0 {
            Some(NextSnapshot::new(
                self.options.main_loop_max_time,
                fts.num_active().saturating_sub(1),
                self.options.target_num_snapshots,
                self.options.snapshot_each_iteration,
            ))
        } else {
            None
        };

        let mut iteration = 0;
        let mut transformations = 1;
        while fts.num_active() > 1 {
            iteration += 1;
            let next = merge_strategy.get_next(fts);
            if self.ran_out_of_time(&timer) || next.stop {
                break;
            }
            let (i, j) = next.pair;
            if i == j || !fts.is_active(i) || !fts.is_active(j) {
                warn!(i, j, "merge strategy asked for an invalid pair, stopping the main loop");
                break;
            }

            let clone_i = next.clone.0 && allow_clone(fts, i, &mut clone_tokens, max_clone_size, &mut clones);
            let clone_j = next.clone.1 && allow_clone(fts, j, &mut clone_tokens, max_clone_size, &mut clones);
            if verbosity.is_at_least_normal() {
                info!(iteration, i, j, clone_i, clone_j, elapsed = timer.elapsed(), "next pair of indices");
                if verbosity.is_at_least_verbose() {
                    log_factor(fts, i);
                    log_factor(fts, j);
                }
            }

            // Label reduction (before shrinking)
            let reduced = match self.label_reduction.as_mut() {
                Some(lr) if lr.reduce_before_shrinking() => lr.reduce(Some((i, j)), fts, verbosity),
                _ => false,
            };
            if reduced {
                if verbosity.is_at_least_normal() {
                    info!(elapsed = timer.elapsed(), "after label reduction");
                }
                if self.options.statistics_only {
                    self.log_statistics(task, fts, transformations);
                    transformations += 1;
                }
            }
            if self.ran_out_of_time(&timer) {
                break;
            }
            self.snapshot_hook(SnapshotMoment::AfterLabelReduction, &mut next_snapshot, &timer, iteration, task, fts, collected);
            if self.ran_out_of_time(&timer) {
                break;
            }

            // Shrinking
            let (shrunk_i, shrunk_j) =
                shrink_before_merge_step(fts, i, j, &self.limits, self.shrink_strategy.as_mut(), verbosity);
            if shrunk_i {
                collected.modified.insert(i);
            }
            if shrunk_j {
                collected.modified.insert(j);
            }
            if shrunk_i || shrunk_j {
                if verbosity.is_at_least_normal() {
                    info!(elapsed = timer.elapsed(), "after shrinking");
                }
                if self.options.statistics_only {
                    self.log_statistics(task, fts, transformations);
                    transformations += 1;
                }
            }
            if self.ran_out_of_time(&timer) {
                break;
            }
            self.snapshot_hook(SnapshotMoment::AfterShrinking, &mut next_snapshot, &timer, iteration, task, fts, collected);
            if self.ran_out_of_time(&timer) {
                break;
            }

            // Label reduction (before merging)
            let reduced = match self.label_reduction.as_mut() {
                Some(lr) if lr.reduce_before_merging() => lr.reduce(Some((i, j)), fts, verbosity),
                _ => false,
            };
            if reduced && verbosity.is_at_least_normal() {
                info!(elapsed = timer.elapsed(), "after label reduction");
            }
            if self.ran_out_of_time(&timer) {
                break;
            }

            // Merging
            let merged = fts.cloning_merge(i, j, clone_i, clone_j);
            maximum_intermediate_size = maximum_intermediate_size.max(fts.transition_system(merged).num_states());
            if verbosity.is_at_least_normal() {
                if verbosity.is_at_least_verbose() {
                    log_factor(fts, merged);
                }
                info!(elapsed = timer.elapsed(), "after merging");
            }
            collected.modified.remove(i);
            collected.modified.remove(j);
            collected.modified.insert(merged);
            if self.ran_out_of_time(&timer) {
                break;
            }
            self.snapshot_hook(SnapshotMoment::AfterMerging, &mut next_snapshot, &timer, iteration, task, fts, collected);
            if self.ran_out_of_time(&timer) {
                break;
            }

            // Pruning
            if prune_step(fts, merged, self.options.prune_unreachable_states, self.options.prune_irrelevant_states, verbosity) {
                collected.modified.insert(merged);
                if verbosity.is_at_least_normal() {
                    if verbosity.is_at_least_verbose() {
                        log_factor(fts, merged);
                    }
                    info!(elapsed = timer.elapsed(), "after pruning");
                }
            }
            if !fts.is_factor_solvable(merged) {
                if verbosity.is_at_least_normal() {
                    info!(factor = merged, "abstract problem is unsolvable, stopping computation");
                }
                self.handle_unsolvable_snapshot(task, fts, merged, collected);
                break;
            }
            if self.options.statistics_only {
                self.log_statistics(task, fts, transformations);
                transformations += 1;
            }
            if self.ran_out_of_time(&timer) {
                break;
            }
            self.snapshot_hook(SnapshotMoment::AfterPruning, &mut next_snapshot, &timer, iteration, task, fts, collected);
            if self.ran_out_of_time(&timer) {
                break;
            }
        }

        if verbosity.is_at_least_normal() {
            let variables = task.nb_variables().max(1) as f64;
            let non_orthogonality = (fts.total_leaf_count() as f64 - task.nb_variables() as f64) / variables;
            let average_clone = clones.total_cloned as f64 / clones.times_cloned.max(1) as f64;
            info!(
                runtime = timer.elapsed(),
                maximum_intermediate_size,
                times_cloned = clones.times_cloned,
                average_clone,
                largest_clone = clones.largest_clone,
                non_orthogonality,
                snapshots = next_snapshot.as_ref().map_or(0, |n| n.num_snapshots()),
                "end of main loop"
            );
        }
        Ok(())
    }

    /// Takes a snapshot if `moment` is the configured snapshot moment and the
    /// scheduler says one is due.
    #[allow(clippy::too_many_arguments)]
    fn snapshot_hook(
        &mut self,
        moment: SnapshotMoment,
        next_snapshot: &mut Option<NextSnapshot>,
        timer: &CountdownTimer,
        iteration: usize,
        task: &dyn Task,
        fts: &FactoredTransitionSystem,
        collected: &mut Collected,
    ) {
        if self.options.snapshot_moment != moment {
            return;
        }
        let Some(next) = next_snapshot.as_mut() else { return };
        if next.is_due(timer.elapsed(), iteration) {
            self.handle_snapshot(task, fts, collected);
            if self.verbosity().is_at_least_normal() {
                info!(elapsed = timer.elapsed(), snapshot = next.num_snapshots(), "after handling main loop snapshot");
            }
        }
    }

    /// Records the current factored transition system: either a cost
    /// partitioning over its (non trivial) factors, or in offline mode the
    /// abstractions of the factors modified since the last snapshot. Online,
    /// every call yields a cost partitioning, even when no factor changed
    /// since the previous snapshot.
    fn handle_snapshot(&mut self, task: &dyn Task, fts: &FactoredTransitionSystem, collected: &mut Collected) {
        let verbosity = self.verbosity();
        if self.options.offline_cps {
            let original_to_current = fts.labels().original_to_current().to_vec();
            let considered = fts.active_indices()
                .filter(|i| collected.modified.contains(*i))
                .filter(|i| !self.options.filter_trivial_factors || !fts.is_factor_trivial(*i))
                .collect::<Vec<_>>();
            if considered.is_empty() && verbosity.is_at_least_debug() {
                trace!("all factors modified since the last snapshot are trivial");
            }
            collected.abstractions.extend(
                compute_abstractions_for_factors(fts, &considered)
                    .into_iter()
                    .map(|a| a.with_label_mapping(original_to_current.clone())));
            if verbosity.is_at_least_verbose() {
                debug!(abstractions = collected.abstractions.len(), "offline snapshot");
            }
        } else {
            let factors = self.non_trivial_factors(fts);
            let cp = self.cp_factory.generate(
                task,
                fts.cost_vector(),
                compute_abstractions_for_factors(fts, &factors),
                verbosity,
            );
            collected.cost_partitionings.push(cp);
            if verbosity.is_at_least_verbose() {
                debug!(factors = factors.len(), cost_partitionings = collected.cost_partitionings.len(), "snapshot");
            }
        }
        collected.modified.clear();
    }

    /// Replaces everything collected so far with one cost partitioning over
    /// the unsolvable factor.
    fn handle_unsolvable_snapshot(
        &mut self,
        task: &dyn Task,
        fts: &mut FactoredTransitionSystem,
        index: usize,
        collected: &mut Collected,
    ) {
        let costs = fts.cost_vector();
        collected.abstractions.clear();
        collected.cost_partitionings.clear();
        collected.modified.clear();
        collected.unsolvable = true;
        if let Some((ts, representation)) = fts.extract_ts_and_representation(index) {
            let abstraction = Abstraction::new(ts, representation, index);
            let cp = self.cp_factory.generate(task, costs, vec![abstraction], self.verbosity());
            collected.cost_partitionings.push(cp);
        }
    }

    fn non_trivial_factors(&self, fts: &FactoredTransitionSystem) -> Vec<usize> {
        fts.active_indices()
            .filter(|i| !self.options.filter_trivial_factors || !fts.is_factor_trivial(*i))
            .collect()
    }

    /// Logs the cost partitioning heuristic of the initial state over the
    /// current factors, along with the best heuristic of a single factor.
    fn log_statistics(&mut self, task: &dyn Task, fts: &FactoredTransitionSystem, transformation: usize) {
        let factors = self.non_trivial_factors(fts);
        let cp = self.cp_factory.generate(
            task,
            fts.cost_vector(),
            compute_abstractions_for_factors(fts, &factors),
            Verbosity::Silent,
        );
        let cp_value = cp.compute_value(task.initial_state());
        let max_value = fts.active_indices().map(|i| init_h(fts, i)).max().unwrap_or(0);
        info!(transformation, cp_value, max_value, "statistics");
    }

    fn ran_out_of_time(&self, timer: &CountdownTimer) -> bool {
        let expired = timer.is_expired();
        if expired && self.verbosity().is_at_least_normal() {
            info!("ran out of time, stopping computation");
        }
        expired
    }

    fn dump_options(&self) {
        info!(
            merge_strategy = self.merge_strategy_factory.name(),
            shrink_strategy = self.shrink_strategy.name(),
            cost_partitioning = self.cp_factory.name(),
            max_states = self.limits.max_states,
            max_states_before_merge = self.limits.max_states_before_merge,
            threshold_before_merge = self.limits.threshold_before_merge,
            prune_unreachable_states = self.options.prune_unreachable_states,
            prune_irrelevant_states = self.options.prune_irrelevant_states,
            main_loop_max_time = self.options.main_loop_max_time,
            "options"
        );
        match self.label_reduction.as_ref() {
            Some(lr) => info!(method = ?lr.method(),
                before_shrinking = lr.reduce_before_shrinking(),
                before_merging = lr.reduce_before_merging(),
                "label reduction"),
            None => info!("label reduction disabled"),
        }
    }

    fn warn_on_unusual_options(&self) {
        match self.label_reduction.as_ref() {
            None => warn!("label reduction is disabled, this may drastically reduce the performance of merge-and-shrink"),
            Some(lr) if lr.reduce_before_shrinking() && lr.reduce_before_merging() => {
                warn!("label reduction is applied both before shrinking and before merging, this rarely pays off")
            }
            Some(lr) => {
                let shrink = self.shrink_strategy.name();
                if lr.reduce_before_shrinking() && (shrink == "f-preserving" || shrink == "random") {
                    warn!(shrink, "bucket based shrink strategies perform best with label reduction before merging");
                }
                if lr.reduce_before_merging() && shrink == "bisimulation" {
                    warn!(shrink, "bisimulation performs best with label reduction before shrinking");
                }
            }
        }
        if !self.options.prune_unreachable_states || !self.options.prune_irrelevant_states {
            warn!("pruning is (partially) turned off, this may drastically reduce the performance of merge-and-shrink");
        }
    }
}

/// Grants a clone of the factor at `index` when a token is left and the
/// factor does not represent too many variables.
fn allow_clone(
    fts: &FactoredTransitionSystem,
    index: usize,
    tokens: &mut i64,
    max_clone_size: f64,
    statistics: &mut CloneStatistics,
) -> bool {
    if *tokens == 0 {
        return false;
    }
    let variables = fts.leaf_count(index);
    if variables as f64 > max_clone_size {
        return false;
    }
    if *tokens > 0 {
        *tokens -= 1;
    }
    statistics.times_cloned += 1;
    statistics.total_cloned += variables;
    statistics.largest_clone = statistics.largest_clone.max(variables);
    true
}

/// The goal distance of the initial state of a factor
fn init_h(fts: &FactoredTransitionSystem, index: usize) -> Cost {
    let ts = fts.transition_system(index);
    let Some(init) = ts.init_state() else { return INF };
    let distances = fts.distances(index);
    if distances.are_goal_distances_computed() {
        distances.goal_distance(init)
    } else {
        compute_goal_distances(ts, &fts.cost_vector())[init]
    }
}

fn log_factor(fts: &FactoredTransitionSystem, index: usize) {
    let ts = fts.transition_system(index);
    debug!(
        factor = index,
        variables = ?ts.incorporated_variables(),
        states = ts.num_states(),
        transitions = ts.num_transitions(),
        init_h = init_h(fts, index),
        "factor"
    );
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
