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

//! # MASCP
//! MASCP computes admissible heuristics for classical planning tasks by
//! combining merge-and-shrink abstractions through cost partitioning. The
//! merge-and-shrink algorithm starts from one abstraction per variable of the
//! task (the atomic factors) and repeatedly shrinks two of them and replaces
//! them with their synchronized product. Instead of only keeping the single
//! abstraction the algorithm ends with, MASCP takes *snapshots* of the
//! intermediate collections of factors and distributes the cost of the
//! operators among the factors of each snapshot, so that the sum of their
//! goal distances remains a lower bound on the true cost to the goal.
//!
//! ## Building blocks
//! * A `Task` describes the planning problem: finite domain variables,
//!   operators with preconditions, effects and a cost, an initial state and a
//!   goal. `ExplicitTask` implements it and can be read from json.
//! * A `ShrinkStrategy` decides which abstract states get collapsed when a
//!   factor must be made smaller (`ShrinkBisimulation`, `ShrinkFH`,
//!   `ShrinkRandom`).
//! * A `MergeStrategyFactory` decides which factors get merged
//!   (`MergeStrategyFactoryPrecomputed`, `MergeStrategyFactoryStateless`,
//!   the non-orthogonal variants which may clone factors, ..).
//! * A `LabelReduction` optionally merges the operators that have become
//!   indistinguishable.
//! * A `CostPartitioningFactory` turns a snapshot into a heuristic
//!   (`SaturatedCostPartitioningFactory`, `SaturatedCostPartitioningsFactory`
//!   over several orders, `OptimalCostPartitioningFactory` solving a linear
//!   program).
//!
//! All of them are handed to a `MergeAndShrinkAlgorithm` configured through
//! `MergeAndShrinkOptions`.
//!
//! ## Quick Example
//! The following computes the maximum over the saturated cost partitionings
//! of the atomic and final snapshots for a task made of two independent
//! switches.
//! ```
//! use mascp::*;
//!
//! let task = ExplicitTask::from_json(r#"{
//!     "domains": [2, 2],
//!     "operators": [
//!         {"name": "x-on", "cost": 1, "effects": [{"var": 0, "value": 1}]},
//!         {"name": "y-on", "cost": 3, "effects": [{"var": 1, "value": 1}]}
//!     ],
//!     "initial_state": [0, 0],
//!     "goal": [{"var": 0, "value": 1}, {"var": 1, "value": 1}]
//! }"#).unwrap();
//!
//! let options = MergeAndShrinkOptionsBuilder::default()
//!     .max_states(50_000_usize)
//!     .threshold_before_merge(1_usize)
//!     .verbosity(Verbosity::Silent)
//!     .build()
//!     .unwrap();
//! let label_reduction = LabelReduction::new(
//!     true,
//!     false,
//!     LabelReductionMethod::AllTransitionSystemsWithFixpoint,
//!     LabelReductionSystemOrder::Random,
//!     42);
//! let merge = MergeStrategyFactoryStateless::new(
//!     MergeSelector::new(vec![Box::new(GoalRelevance), Box::new(Dfp)])
//!         .with_tiebreaking(Box::new(TotalOrder::default())));
//! let scp = SaturatedCostPartitioningFactory::new(Box::new(GreedyOrders::default()));
//!
//! let mut algorithm = MergeAndShrinkAlgorithm::new(
//!     options,
//!     Box::new(ShrinkBisimulation::default()),
//!     Box::new(merge),
//!     Some(label_reduction),
//!     Box::new(scp),
//! ).unwrap();
//!
//! let heuristic = MaxCostPartitioningHeuristic::new(algorithm.compute_cps(&task).unwrap());
//! assert_eq!(4, heuristic.compute_heuristic(task.initial_state()));
//! ```

mod common;
mod abstraction;
mod implementation;

pub use common::*;
pub use abstraction::*;
pub use implementation::*;
