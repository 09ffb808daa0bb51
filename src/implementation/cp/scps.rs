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
//! This module provides the multi-order saturated cost partitioning. Several
//! orders of the same abstractions are computed (each optionally refined by
//! hill climbing for the state it was computed for) and the resulting
//! heuristics are combined by maximization. With diversification turned on,
//! an order is only kept when it improves the heuristic value of at least one
//! sample state.

use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info};

use crate::{compute_abstract_states, compute_scp, default_order, optimize_order_with_hill_climbing, sample_states,
    Abstraction, Cost, CostPartitioning, CostPartitioningFactory, CostPartitioningHeuristic, CountdownTimer,
    Diversifier, MasRepresentation, OrderGenerator, RandomWalkSampler, SamplingWithDeadEnds, Task, Verbosity, INF};

/// The maximum over a collection of saturated cost partitionings of the same
/// abstractions
#[derive(Debug, Clone)]
pub struct SaturatedCostPartitionings {
    /// The abstraction functions; the ones no heuristic refers to are dropped
    abstraction_functions: Vec<Option<MasRepresentation>>,
    heuristics: Vec<CostPartitioningHeuristic>,
}
impl SaturatedCostPartitionings {
    pub fn new(abstraction_functions: Vec<Option<MasRepresentation>>, heuristics: Vec<CostPartitioningHeuristic>) -> Self {
        SaturatedCostPartitionings { abstraction_functions, heuristics }
    }
    /// Keeps only the abstraction functions some heuristic has a table for
    pub fn from_abstractions(abstractions: Vec<Abstraction>, heuristics: Vec<CostPartitioningHeuristic>) -> Self {
        let mut useful = vec![false; abstractions.len()];
        for h in heuristics.iter() {
            h.mark_useful_abstractions(&mut useful);
        }
        let abstraction_functions = abstractions.into_iter()
            .zip(useful)
            .map(|(abstraction, useful)| useful.then(|| abstraction.into_representation()))
            .collect();
        Self::new(abstraction_functions, heuristics)
    }
    pub fn nb_heuristics(&self) -> usize {
        self.heuristics.len()
    }
}
impl CostPartitioning for SaturatedCostPartitionings {
    fn compute_value(&self, state: &[usize]) -> Cost {
        let abstract_states = self.abstraction_functions.iter()
            .map(|f| f.as_ref().and_then(|f| f.get_abstract_state(state)))
            .collect::<Vec<_>>();
        let mut max_h = 0;
        for heuristic in self.heuristics.iter() {
            let h = heuristic.compute_heuristic(&abstract_states);
            if h == INF {
                return INF;
            }
            max_h = max_h.max(h);
        }
        max_h
    }
    fn nb_abstractions(&self) -> usize {
        self.abstraction_functions.iter().filter(|f| f.is_some()).count()
    }
}

/// The parameters of the multi-order saturated cost partitioning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiOrderOptions {
    /// Maximum number of orders to keep
    pub max_orders: usize,
    /// Time budget (in seconds) for all orders of one snapshot
    pub max_time: f64,
    /// Only keep the orders improving the value of some sample
    pub diversify: bool,
    /// Number of samples the diversification is based on
    pub num_samples: usize,
    /// Time budget (in seconds) of the hill climbing of each order
    pub max_optimization_time: f64,
    pub sampling_with_dead_ends: SamplingWithDeadEnds,
}
impl Default for MultiOrderOptions {
    fn default() -> Self {
        MultiOrderOptions {
            max_orders: usize::MAX,
            max_time: 200.0,
            diversify: true,
            num_samples: 1000,
            max_optimization_time: 2.0,
            sampling_with_dead_ends: SamplingWithDeadEnds::DivAndOpt,
        }
    }
}

pub struct SaturatedCostPartitioningsFactory {
    order_generator: Box<dyn OrderGenerator>,
    options: MultiOrderOptions,
    rng: StdRng,
}
impl SaturatedCostPartitioningsFactory {
    pub fn new(order_generator: Box<dyn OrderGenerator>, options: MultiOrderOptions, seed: u64) -> Self {
        SaturatedCostPartitioningsFactory { order_generator, options, rng: StdRng::seed_from_u64(seed) }
    }
}

/// One saturated cost partitioning in the identity order
fn single_cp(abstractions: Vec<Abstraction>, costs: &[Cost]) -> Box<dyn CostPartitioning> {
    let order = default_order(abstractions.len());
    let heuristic = compute_scp(&abstractions, &order, costs);
    Box::new(SaturatedCostPartitionings::from_abstractions(abstractions, vec![heuristic]))
}

/// True iff some abstraction prunes the given state
fn is_pruned(abstractions: &[Abstraction], state: &[usize]) -> bool {
    abstractions.iter().any(|a| a.abstract_state(state).is_none())
}

impl CostPartitioningFactory for SaturatedCostPartitioningsFactory {
    fn name(&self) -> &str {
        "multiple saturated cost partitionings"
    }
    fn initialize(&mut self, task: &dyn Task) {
        self.order_generator.initialize(task);
    }
    fn generate(
        &mut self,
        task: &dyn Task,
        costs: Vec<Cost>,
        abstractions: Vec<Abstraction>,
        verbosity: Verbosity,
    ) -> Box<dyn CostPartitioning> {
        let timer = CountdownTimer::new(self.options.max_time);
        if abstractions.len() <= 1 {
            return single_cp(abstractions, &costs);
        }
        let init_states = compute_abstract_states(&abstractions, task.initial_state());
        if init_states.iter().any(Option::is_none) {
            if verbosity.is_at_least_normal() {
                info!("the initial state is a dead end");
            }
            return single_cp(abstractions, &costs);
        }

        let init_order = self.order_generator.compute_order(&abstractions, &costs, Some(&init_states), verbosity);
        let init_cp = compute_scp(&abstractions, &init_order, &costs);
        let init_h = init_cp.compute_heuristic(&init_states);
        if init_h == INF {
            self.order_generator.clear_internal_state();
            return single_cp(abstractions, &costs);
        }

        let sampling = self.options.sampling_with_dead_ends;
        let sampler = RandomWalkSampler::new(task);
        let pruned = |state: &[usize]| is_pruned(&abstractions, state);
        let never = |_: &[usize]| false;
        let div_dead_ends: &dyn Fn(&[usize]) -> bool = if sampling.for_diversification() { &pruned } else { &never };
        let opt_dead_ends: &dyn Fn(&[usize]) -> bool = if sampling.for_optimization() { &pruned } else { &never };

        let mut diversifier = if self.options.diversify {
            let samples = sample_states(&sampler, init_h, self.options.num_samples, div_dead_ends, &timer, &mut self.rng);
            if verbosity.is_at_least_verbose() {
                debug!(nb_samples = samples.len(), "diversification samples");
            }
            Some(Diversifier::new(&abstractions, &samples))
        } else {
            None
        };

        let mut heuristics: Vec<CostPartitioningHeuristic> = vec![];
        let mut nb_evaluated_orders = 0_usize;
        let mut first_round = Some((init_states, init_order, init_cp, init_h));
        while heuristics.len() < self.options.max_orders && (!timer.is_expired() || heuristics.is_empty()) {
            let (states, mut order, mut cp, mut h) = match first_round.take() {
                Some(round) => round,
                None => {
                    let sample = sampler.sample_state(init_h, opt_dead_ends, &mut self.rng);
                    let states = compute_abstract_states(&abstractions, &sample);
                    let order = self.order_generator.compute_order(&abstractions, &costs, Some(&states), verbosity);
                    let cp = compute_scp(&abstractions, &order, &costs);
                    let h = cp.compute_heuristic(&states);
                    (states, order, cp, h)
                }
            };
            nb_evaluated_orders += 1;

            let optimization_time = timer.remaining().min(self.options.max_optimization_time);
            if optimization_time > 0.0 && h != INF {
                let optimization_timer = CountdownTimer::new(optimization_time);
                optimize_order_with_hill_climbing(&abstractions, &costs, &states, &mut order, &mut cp, &mut h,
                    &optimization_timer, verbosity);
            }

            let keep = diversifier.as_mut().map_or(true, |d| d.is_diverse(&cp));
            if keep {
                heuristics.push(cp);
            }
        }
        self.order_generator.clear_internal_state();

        if verbosity.is_at_least_normal() {
            info!(
                nb_evaluated_orders,
                nb_orders = heuristics.len(),
                nb_lookup_tables = heuristics.iter().map(|h| h.nb_lookup_tables()).sum::<usize>(),
                nb_stored_values = heuristics.iter().map(|h| h.nb_heuristic_values()).sum::<usize>(),
                time = timer.elapsed(),
                "multiple saturated cost partitionings"
            );
        }
        Box::new(SaturatedCostPartitionings::from_abstractions(abstractions, heuristics))
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_saturated_cost_partitionings {
    use crate::*;

    /// x, y in {0, 1}; a: x := 1 (cost 1) ; b: y := 1 (cost 3) ;
    /// c: x := 1, y := 1 (cost 5) ; goal x = 1 & y = 1
    fn shared_label_task() -> ExplicitTask {
        ExplicitTask::new(
            vec![2, 2],
            vec![
                Operator { name: "a".into(), cost: 1, preconditions: vec![], effects: vec![Fact::new(0, 1)] },
                Operator { name: "b".into(), cost: 3, preconditions: vec![], effects: vec![Fact::new(1, 1)] },
                Operator { name: "c".into(), cost: 5, preconditions: vec![], effects: vec![Fact::new(0, 1), Fact::new(1, 1)] },
            ],
            vec![0, 0],
            vec![Fact::new(0, 1), Fact::new(1, 1)],
        )
    }
    fn options(max_orders: usize) -> MultiOrderOptions {
        MultiOrderOptions { max_orders, max_time: 5.0, num_samples: 10, max_optimization_time: 0.5, ..Default::default() }
    }
    fn generate(task: &ExplicitTask, factory: &mut dyn CostPartitioningFactory) -> Box<dyn CostPartitioning> {
        let fts = FactoredTransitionSystem::atomic(task, true, true);
        let all = fts.active_indices().collect::<Vec<_>>();
        factory.initialize(task);
        factory.generate(task, fts.cost_vector(), compute_abstractions_for_factors(&fts, &all), Verbosity::Silent)
    }

    #[test]
    fn the_maximum_is_admissible_and_informed() {
        let task = shared_label_task();
        let mut factory = SaturatedCostPartitioningsFactory::new(Box::new(GreedyOrders::default()), options(3), 1);
        let cp = generate(&task, &mut factory);
        assert_eq!(4, cp.compute_value(&[0, 0]));
        assert_eq!(3, cp.compute_value(&[1, 0]));
        assert_eq!(1, cp.compute_value(&[0, 1]));
        assert_eq!(0, cp.compute_value(&[1, 1]));
    }
    #[test]
    fn at_most_max_orders_are_kept() {
        let task = shared_label_task();
        let mut factory = SaturatedCostPartitioningsFactory::new(
            Box::new(RandomOrders::new(false, 0)),
            MultiOrderOptions { diversify: false, ..options(2) },
            1);
        let fts = FactoredTransitionSystem::atomic(&task, true, true);
        factory.initialize(&task);
        let abstractions = compute_abstractions_for_factors(&fts, &[0, 1]);
        let cp = factory.generate(&task, fts.cost_vector(), abstractions, Verbosity::Silent);
        assert!(cp.nb_abstractions() <= 2);
        assert_eq!(4, cp.compute_value(&[0, 0]));
    }
    #[test]
    fn a_single_abstraction_needs_a_single_order() {
        let task = shared_label_task();
        let fts = FactoredTransitionSystem::atomic(&task, true, true);
        let mut factory = SaturatedCostPartitioningsFactory::new(Box::new(GreedyOrders::default()), options(3), 1);
        let cp = factory.generate(&task, fts.cost_vector(), compute_abstractions_for_factors(&fts, &[1]), Verbosity::Silent);
        assert_eq!(1, cp.nb_abstractions());
        assert_eq!(3, cp.compute_value(&[0, 0]));
    }
    #[test]
    fn a_dead_end_anywhere_makes_the_maximum_infinite() {
        let mut x = MasRepresentation::leaf(0, 2);
        x.apply_abstraction_to_lookup_table(&[Some(0), None]);
        let mut pruning = CostPartitioningHeuristic::new();
        pruning.add_h_values(0, vec![0], false);
        let mut informed = CostPartitioningHeuristic::new();
        informed.add_h_values(0, vec![7], false);
        let cps = SaturatedCostPartitionings::new(vec![Some(x)], vec![informed, pruning]);
        assert_eq!(2, cps.nb_heuristics());
        assert_eq!(7, cps.compute_value(&[0]));
        assert_eq!(INF, cps.compute_value(&[1]));
    }
    #[test]
    fn useless_abstractions_are_not_kept() {
        let y = MasRepresentation::leaf(1, 2);
        let mut heuristic = CostPartitioningHeuristic::new();
        heuristic.add_h_values(1, vec![3, 0], true);
        let cps = SaturatedCostPartitionings::new(vec![None, Some(y)], vec![heuristic]);
        assert_eq!(1, cps.nb_abstractions());
        assert_eq!(3, cps.compute_value(&[1, 0]));
    }
}
