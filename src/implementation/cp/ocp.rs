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
//! This module provides the optimal cost partitioning of a list of
//! abstractions. The heuristic value of a state is the optimum of a linear
//! program whose variables are the cost each abstraction gets for each label
//! along with the goal distance of each abstract state. The variables and
//! constraints are built once; a query only provides its objective (the sum
//! of the goal distances of the abstract states of the queried state). The
//! program is solved with the default `good_lp` backend.

use fxhash::FxHashMap;
use good_lp::{constraint, default_solver, variable, Constraint, Expression, ProblemVariables, Solution,
    SolverModel, Variable};
use tracing::info;

use crate::{Abstraction, Cost, CostPartitioning, CostPartitioningFactory, LabelId, Task, Verbosity, INF};

/// Tolerance used when rounding the optimum of the linear program
const EPSILON: f64 = 0.01;

pub struct OptimalCostPartitioning {
    abstractions: Vec<Abstraction>,
    /// The variables of the program
    variables: ProblemVariables,
    /// The goal distance variable of each abstract state, per abstraction
    state_vars: Vec<Vec<Variable>>,
    /// Everything but the objective
    constraints: Vec<Constraint>,
}

impl OptimalCostPartitioning {
    pub fn new(abstractions: Vec<Abstraction>, costs: Vec<Cost>, allow_negative_costs: bool) -> Self {
        let mut variables = ProblemVariables::new();
        let mut label_vars: Vec<FxHashMap<LabelId, Variable>> = Vec::with_capacity(abstractions.len());
        let mut state_vars: Vec<Vec<Variable>> = Vec::with_capacity(abstractions.len());

        for abstraction in abstractions.iter() {
            let ts = abstraction.transition_system();
            let mut label_costs = FxHashMap::default();
            for group in ts.groups() {
                for label in group.labels().iter().copied() {
                    let definition = if allow_negative_costs { variable() } else { variable().min(0.0) };
                    label_costs.insert(label, variables.add(definition));
                }
            }
            let states = (0..ts.num_states())
                .map(|s| if ts.is_goal_state(s) { variables.add(variable().max(0.0)) } else { variables.add(variable()) })
                .collect::<Vec<_>>();
            label_vars.push(label_costs);
            state_vars.push(states);
        }

        let mut constraints = vec![];
        for (k, abstraction) in abstractions.iter().enumerate() {
            let states = &state_vars[k];
            for group in abstraction.transition_system().groups() {
                let has_self_loop = group.transitions().iter().any(|t| t.is_self_loop());
                for label in group.labels() {
                    let cost = label_vars[k][label];
                    for t in group.transitions().iter().filter(|t| !t.is_self_loop()) {
                        constraints.push(constraint!(states[t.src] <= states[t.target] + cost));
                    }
                    if has_self_loop && allow_negative_costs {
                        constraints.push(constraint!(cost >= 0));
                    }
                }
            }
        }

        for (original, cost) in costs.iter().copied().enumerate() {
            if cost < 0 || cost == INF {
                continue;
            }
            let shares = abstractions.iter()
                .zip(label_vars.iter())
                .filter_map(|(abstraction, vars)| {
                    let label = abstraction.label_mapping().map_or(original, |mapping| mapping[original]);
                    vars.get(&label).copied()
                })
                .collect::<Vec<_>>();
            if !shares.is_empty() {
                let total: Expression = shares.into_iter().sum();
                constraints.push(constraint!(total <= cost));
            }
        }

        OptimalCostPartitioning { abstractions, variables, state_vars, constraints }
    }

    /// The number of constraints of the program
    pub fn nb_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// The optimal value of the linear program for the given abstract
    /// states, `INF` if it has no finite optimum.
    fn solve(&self, abstract_states: &[usize]) -> Cost {
        let queried = self.state_vars.iter()
            .zip(abstract_states.iter().copied())
            .map(|(states, s)| states[s])
            .collect::<Vec<_>>();
        let objective: Expression = queried.iter().copied().sum();
        let model = self.variables.clone()
            .maximise(objective)
            .using(default_solver)
            .with_all(self.constraints.iter().cloned());

        match model.solve() {
            Ok(solution) => {
                let optimum: f64 = queried.iter().map(|v| solution.value(*v)).sum();
                let value = (optimum - EPSILON).ceil();
                if value >= INF as f64 {
                    INF
                } else {
                    (value as Cost).max(0)
                }
            },
            Err(_) => INF,
        }
    }
}

impl CostPartitioning for OptimalCostPartitioning {
    fn compute_value(&self, state: &[usize]) -> Cost {
        let mut abstract_states = Vec::with_capacity(self.abstractions.len());
        for abstraction in self.abstractions.iter() {
            match abstraction.abstract_state(state) {
                Some(s) => abstract_states.push(s),
                None => return INF,
            }
        }
        if abstract_states.is_empty() {
            return 0;
        }
        self.solve(&abstract_states)
    }
    fn nb_abstractions(&self) -> usize {
        self.abstractions.len()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OptimalCostPartitioningFactory {
    allow_negative_costs: bool,
}
impl OptimalCostPartitioningFactory {
    pub fn new(allow_negative_costs: bool) -> Self {
        OptimalCostPartitioningFactory { allow_negative_costs }
    }
}
impl CostPartitioningFactory for OptimalCostPartitioningFactory {
    fn name(&self) -> &str {
        "optimal cost partitioning"
    }
    fn generate(
        &mut self,
        _task: &dyn Task,
        costs: Vec<Cost>,
        abstractions: Vec<Abstraction>,
        verbosity: Verbosity,
    ) -> Box<dyn CostPartitioning> {
        if verbosity.is_at_least_normal() {
            let nb_states = abstractions.iter().map(|a| a.transition_system().num_states()).sum::<usize>();
            info!(nb_abstractions = abstractions.len(), nb_states, "optimal cost partitioning");
        }
        Box::new(OptimalCostPartitioning::new(abstractions, costs, self.allow_negative_costs))
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
