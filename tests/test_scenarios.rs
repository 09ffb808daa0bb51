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

//! This module checks the behavior of the whole engine on small hand crafted
//! tasks whose heuristic values are known in advance.
#![cfg(test)]

use std::path::PathBuf;

use mascp::*;

/// This method simply loads a task from the resources folder
fn instance(id: &str) -> ExplicitTask {
    let location = PathBuf::new()
        .join(env!("CARGO_MANIFEST_DIR"))
        .join("tests/resources/tasks/")
        .join(id);

    ExplicitTask::from_file(location).expect("task not found")
}

fn costs(task: &ExplicitTask) -> Vec<Cost> {
    task.operators().iter().map(|op| op.cost).collect()
}

fn atomic_abstractions(task: &ExplicitTask) -> Vec<Abstraction> {
    let fts = FactoredTransitionSystem::atomic(task, true, true);
    let factors = fts.active_indices().collect::<Vec<_>>();
    compute_abstractions_for_factors(&fts, &factors)
}

/// Value of the saturated cost partitioning computed along `order` on the
/// initial state of the task.
fn scp_in_order(task: &ExplicitTask, order: &[usize]) -> Cost {
    let abstractions = atomic_abstractions(task);
    let abstract_states = compute_abstract_states(&abstractions, task.initial_state());
    compute_scp(&abstractions, order, &costs(task)).compute_heuristic(&abstract_states)
}

fn ocp(task: &ExplicitTask) -> Cost {
    OptimalCostPartitioning::new(atomic_abstractions(task), costs(task), false)
        .compute_value(task.initial_state())
}

fn scp_factory() -> Box<dyn CostPartitioningFactory> {
    Box::new(SaturatedCostPartitioningFactory::new(Box::new(GreedyOrders::default())))
}

/// Runs the whole algorithm with a bisimulation shrink strategy and a
/// precomputed linear merge order.
fn solve(task: &ExplicitTask, options: &mut MergeAndShrinkOptionsBuilder) -> Vec<Box<dyn CostPartitioning>> {
    solve_with(task, options, Box::new(MergeStrategyFactoryPrecomputed::default()))
}

fn solve_with(
    task: &ExplicitTask,
    options: &mut MergeAndShrinkOptionsBuilder,
    merge: Box<dyn MergeStrategyFactory>,
) -> Vec<Box<dyn CostPartitioning>> {
    let options = options.verbosity(Verbosity::Silent).build().unwrap();
    let mut algorithm = MergeAndShrinkAlgorithm::new(
        options,
        Box::new(ShrinkBisimulation::default()),
        merge,
        None,
        scp_factory(),
    ).unwrap();
    algorithm.compute_cps(task).unwrap()
}

fn h(cps: Vec<Box<dyn CostPartitioning>>, state: &[usize]) -> Cost {
    MaxCostPartitioningHeuristic::new(cps).compute_heuristic(state)
}

fn switches(n: usize) -> ExplicitTask {
    let ops = (0..n)
        .map(|v| Operator { name: format!("on{v}"), cost: 1, preconditions: vec![], effects: vec![Fact::new(v, 1)] })
        .collect();
    ExplicitTask::new(vec![2; n], ops, vec![0; n], (0..n).map(|v| Fact::new(v, 1)).collect())
}

// --- independent switches ---------------------------------------------------
#[test]
fn scp_of_two_switches_on_atomic_factors() {
    let task = instance("two_switches.json");
    assert_eq!(2, scp_in_order(&task, &[0, 1]));
}
#[test]
fn scp_of_two_switches_after_merging() {
    let task = instance("two_switches.json");
    let cps = solve(&task, MergeAndShrinkOptionsBuilder::default().compute_atomic_snapshot(false));
    assert_eq!(1, cps.len());
    assert_eq!(1, cps[0].nb_abstractions());
    assert_eq!(2, h(cps, task.initial_state()));
}
#[test]
fn ocp_of_two_switches() {
    let task = instance("two_switches.json");
    assert_eq!(2, ocp(&task));
}
#[test]
fn scp_of_unbalanced_switches_does_not_depend_on_the_order() {
    let task = instance("unbalanced_switches.json");
    assert_eq!(4, scp_in_order(&task, &[0, 1]));
    assert_eq!(4, scp_in_order(&task, &[1, 0]));
}
#[test]
fn ocp_of_unbalanced_switches() {
    let task = instance("unbalanced_switches.json");
    assert_eq!(4, ocp(&task));
}

// --- unsolvable tasks --------------------------------------------------------
#[test]
fn unsolvable_task_yields_exactly_one_dead_end_snapshot() {
    let task = instance("unsolvable.json");
    let cps = solve(&task, &mut MergeAndShrinkOptionsBuilder::default());
    assert_eq!(1, cps.len());
    assert_eq!(INF, h(cps, task.initial_state()));
}

// --- snapshots ---------------------------------------------------------------
#[test]
fn three_evenly_spaced_snapshots_over_ten_iterations() {
    let task = switches(11);
    let cps = solve(&task, MergeAndShrinkOptionsBuilder::default()
        .compute_atomic_snapshot(false)
        .compute_final_snapshot(false)
        .target_num_snapshots(3_usize));
    assert_eq!(3, cps.len());
    assert_eq!(11, h(cps, task.initial_state()));
}
#[test]
fn atomic_snapshot_comes_on_top_of_the_scheduled_ones() {
    let task = switches(11);
    let cps = solve(&task, MergeAndShrinkOptionsBuilder::default()
        .compute_final_snapshot(false)
        .target_num_snapshots(3_usize));
    assert_eq!(4, cps.len());
    assert_eq!(11, cps[0].nb_abstractions());
}
#[test]
fn exact_heuristic_on_logistics_without_shrinking() {
    let task = instance("logistics.json");
    let cps = solve(&task, &mut MergeAndShrinkOptionsBuilder::default());
    assert_eq!(9, h(cps, task.initial_state()));
}

// --- non orthogonal merges ---------------------------------------------------
fn cloning_sequence() -> Box<dyn MergeStrategyFactory> {
    Box::new(MergeStrategyFactoryExplicit::new(vec![
        NextMerge::cloning(0, 1, true, false),
        NextMerge::merge(0, 2),
        NextMerge::merge(3, 4),
    ]))
}
#[test]
fn a_cloned_factor_survives_its_first_merge() {
    let task = switches(3);
    let cps = solve_with(&task, MergeAndShrinkOptionsBuilder::default()
        .tokens(1_i64)
        .snapshot_each_iteration(1_usize), cloning_sequence());
    let sizes = cps.iter().map(|cp| cp.nb_abstractions()).collect::<Vec<_>>();
    // atomic, then after each of the three iterations
    assert_eq!(vec![3, 3, 2, 1], sizes);
    assert_eq!(3, h(cps, task.initial_state()));
}
#[test]
fn without_tokens_the_cloning_request_is_ignored() {
    let task = switches(3);
    let cps = solve_with(&task, MergeAndShrinkOptionsBuilder::default().tokens(0_i64), cloning_sequence());
    // factor 0 is consumed by the first merge: the second one cannot happen
    assert_eq!(2, cps.len());
    assert_eq!(2, cps[1].nb_abstractions());
    assert_eq!(3, h(cps, task.initial_state()));
}
#[test]
fn cloning_merges_at_the_fts_level() {
    let task = switches(3);
    let mut fts = FactoredTransitionSystem::atomic(&task, true, true);
    let merged = fts.cloning_merge(0, 1, true, false);
    assert_eq!(3, merged);
    assert_eq!(3, fts.num_active());
    assert!(fts.is_active(0));
    assert!(!fts.is_active(1));
    fts.merge(0, 2);
    assert_eq!(2, fts.num_active());
    fts.merge(3, 4);
    assert_eq!(1, fts.num_active());
    // variable 0 is represented twice in the last product
    assert_eq!(4, fts.leaf_count(5));
}

// --- label reduction ---------------------------------------------------------
#[test]
fn labels_distinguished_outside_the_combinable_factor_are_kept_apart() {
    let task = instance("shared_toggle.json");
    let fts = FactoredTransitionSystem::atomic(&task, true, true);
    // a and b only act alike in y
    assert!(compute_label_mapping(1, &fts).is_empty());
    assert_eq!(vec![(3, vec![0, 1])], compute_label_mapping(0, &fts));
}
#[test]
fn reduced_labels_keep_the_transitions_of_their_operators() {
    let task = instance("shared_toggle.json");
    let mut fts = FactoredTransitionSystem::atomic(&task, true, true);
    let mut lr = LabelReduction::default();
    assert!(lr.reduce(None, &mut fts, Verbosity::Silent));

    let labels = fts.labels();
    assert_eq!(2, labels.nb_current_labels());
    let c = labels.current_of(0);
    assert_eq!(c, labels.current_of(1));
    assert_ne!(c, labels.current_of(2));

    let y = fts.transition_system(1);
    assert_eq!(2, y.transitions_of(c).len());
    assert!(y.transitions_of(c).iter().all(|t| t.is_self_loop()));

    let x = fts.transition_system(0);
    assert_eq!(4, x.transitions_of(c).len());
    assert_eq!(1, fts.distances(0).goal_distance(0));
}
