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

//! This example reads a planning task from a json file, runs the
//! merge-and-shrink algorithm on it and prints the value of the resulting
//! heuristic on the initial state.
//!
//! ```text
//! cargo run --release --example mascp -- -f tests/resources/tasks/logistics.json --cp scp --snapshots 3
//! ```

use std::time::Instant;

use clap::{Parser, ValueEnum};
use mascp::*;

/// How the abstractions of a snapshot get combined
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CpKind {
    /// saturated cost partitioning over one greedy order
    Scp,
    /// saturated cost partitionings over diverse orders
    Scps,
    /// optimal cost partitioning
    Ocp,
}

/// Which factors get merged
#[derive(Debug, Clone, Copy, ValueEnum)]
enum MergeKind {
    /// a precomputed linear order of the variables
    Linear,
    /// goal relevance, then dfp
    Dfp,
    /// like dfp but may clone the variables several clusters share
    Clusters,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Level {
    Silent,
    Normal,
    Verbose,
    Debug,
}
impl From<Level> for Verbosity {
    fn from(level: Level) -> Self {
        match level {
            Level::Silent  => Verbosity::Silent,
            Level::Normal  => Verbosity::Normal,
            Level::Verbose => Verbosity::Verbose,
            Level::Debug   => Verbosity::Debug,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Params {
    /// the task file (json)
    #[arg(short, long)]
    file: String,
    /// the cost partitioning computed for each snapshot
    #[arg(long, value_enum, default_value_t = CpKind::Scp)]
    cp: CpKind,
    /// the merge strategy
    #[arg(short, long, value_enum, default_value_t = MergeKind::Dfp)]
    merge: MergeKind,
    /// maximum number of abstract states of any factor
    #[arg(short = 's', long)]
    max_states: Option<usize>,
    /// number of snapshots taken during the main loop
    #[arg(long, default_value_t = 0)]
    snapshots: usize,
    /// number of factors which may be cloned (negative means unlimited)
    #[arg(long, default_value_t = 0)]
    tokens: i64,
    /// max time (in seconds) of the main loop
    #[arg(short, long)]
    timeout: Option<f64>,
    /// do not reduce the labels
    #[arg(long)]
    no_label_reduction: bool,
    /// seed of every random choice
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// how much gets logged
    #[arg(short, long, value_enum, default_value_t = Level::Normal)]
    verbosity: Level,
}

fn main() {
    tracing_subscriber::fmt::init();

    let params = Params::parse();
    if let Err(error) = run(params) {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn run(params: Params) -> Result<(), Error> {
    let task = ExplicitTask::from_file(&params.file)?;

    let mut options = MergeAndShrinkOptionsBuilder::default();
    options
        .target_num_snapshots(params.snapshots)
        .tokens(params.tokens)
        .verbosity(Verbosity::from(params.verbosity));
    if let Some(max_states) = params.max_states {
        options.max_states(max_states).threshold_before_merge(1_usize);
    }
    if let Some(timeout) = params.timeout {
        options.main_loop_max_time(timeout);
    }
    let options = options.build()
        .map_err(|e| Error::InvalidOptions(e.to_string()))?;

    let label_reduction = if params.no_label_reduction {
        None
    } else {
        Some(LabelReduction::new(true, false,
            LabelReductionMethod::AllTransitionSystemsWithFixpoint,
            LabelReductionSystemOrder::Random,
            params.seed))
    };

    let mut algorithm = MergeAndShrinkAlgorithm::new(
        options,
        Box::new(ShrinkBisimulation::default()),
        merge_strategy(params.merge, params.tokens, params.seed),
        label_reduction,
        cost_partitioning(params.cp, params.seed),
    )?;

    let start = Instant::now();
    let cps = algorithm.compute_cps(&task)?;
    let duration = start.elapsed();

    let nb_cps = cps.len();
    let heuristic = MaxCostPartitioningHeuristic::new(cps);
    let value = heuristic.compute_heuristic(task.initial_state());

    println!("Duration:   {:.3} seconds", duration.as_secs_f32());
    println!("Snapshots:  {}", nb_cps);
    if value == INF {
        println!("h(init):    infinity");
    } else {
        println!("h(init):    {}", value);
    }
    Ok(())
}

fn selector() -> MergeSelector {
    MergeSelector::new(vec![Box::new(GoalRelevance), Box::new(Dfp)])
        .with_tiebreaking(Box::new(TotalOrder::default()))
}

fn merge_strategy(kind: MergeKind, tokens: i64, seed: u64) -> Box<dyn MergeStrategyFactory> {
    match kind {
        MergeKind::Linear   => Box::new(MergeStrategyFactoryPrecomputed::new(LinearOrder::ReverseLevel, seed)),
        MergeKind::Dfp      => Box::new(MergeStrategyFactoryStateless::new(selector())),
        MergeKind::Clusters => Box::new(MergeStrategyFactoryClusters::new(selector(), ClusterStrategy::Predecessors, tokens)),
    }
}

fn cost_partitioning(kind: CpKind, seed: u64) -> Box<dyn CostPartitioningFactory> {
    match kind {
        CpKind::Scp  => Box::new(SaturatedCostPartitioningFactory::new(Box::new(GreedyOrders::default()))),
        CpKind::Scps => Box::new(SaturatedCostPartitioningsFactory::new(
            Box::new(GreedyOrders::new(ScoringFunction::MaxHeuristicPerStolenCosts, seed)),
            MultiOrderOptions { max_time: 10.0, ..MultiOrderOptions::default() },
            seed)),
        CpKind::Ocp  => Box::new(OptimalCostPartitioningFactory::new(false)),
    }
}
