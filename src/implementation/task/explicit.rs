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

//! This module provides a task whose variables, operators, initial state and
//! goal are all listed explicitly. It can be built programmatically or read
//! from a json document such as:
//!
//! ```json
//! {
//!   "domains": [2, 2],
//!   "operators": [
//!     {"name": "a", "cost": 1, "effects": [{"var": 0, "value": 1}]},
//!     {"name": "b", "cost": 1, "preconditions": [{"var": 0, "value": 1}],
//!      "effects": [{"var": 1, "value": 1}]}
//!   ],
//!   "initial_state": [0, 0],
//!   "goal": [{"var": 1, "value": 1}]
//! }
//! ```

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Error, Fact, Operator, Task};

/// A planning task given in extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitTask {
    domains: Vec<usize>,
    operators: Vec<Operator>,
    initial_state: Vec<usize>,
    goal: Vec<Fact>,
    #[serde(default)]
    axioms: bool,
}

impl ExplicitTask {
    pub fn new(domains: Vec<usize>, operators: Vec<Operator>, initial_state: Vec<usize>, goal: Vec<Fact>) -> Self {
        ExplicitTask { domains, operators, initial_state, goal, axioms: false }
    }
    /// Copies any task into an explicit one
    pub fn from_task(task: &dyn Task) -> Self {
        ExplicitTask {
            domains: (0..task.nb_variables()).map(|v| task.domain_size(v)).collect(),
            operators: task.operators().to_vec(),
            initial_state: task.initial_state().to_vec(),
            goal: task.goal().to_vec(),
            axioms: task.has_axioms(),
        }
    }
    /// Flags the task as one that relies on axioms
    pub fn with_axioms(mut self, axioms: bool) -> Self {
        self.axioms = axioms;
        self
    }
    /// Parses and validates a task from its json text
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let task: ExplicitTask = serde_json::from_str(text)?;
        task.validate()?;
        Ok(task)
    }
    /// Reads and validates a task from a json file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path.as_ref())
            .map_err(|e| Error::InvalidTask(format!("{}: {e}", path.as_ref().display())))?;
        let task: ExplicitTask = serde_json::from_reader(BufReader::new(file))?;
        task.validate()?;
        Ok(task)
    }

    /// Checks that every fact mentions an existing variable and a value of
    /// its domain, that the initial state is a full assignment and that no
    /// operator has a negative cost.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(var) = self.domains.iter().position(|d| *d == 0) {
            return Err(Error::InvalidTask(format!("variable {var} has an empty domain")));
        }
        if self.initial_state.len() != self.domains.len() {
            return Err(Error::InvalidTask(format!(
                "initial state assigns {} variables, the task has {}",
                self.initial_state.len(), self.domains.len())));
        }
        for (var, value) in self.initial_state.iter().copied().enumerate() {
            self.check_fact(Fact::new(var, value), "initial state")?;
        }
        for fact in self.goal.iter().copied() {
            self.check_fact(fact, "goal")?;
        }
        for op in self.operators.iter() {
            if op.cost < 0 {
                return Err(Error::InvalidTask(format!("operator '{}' has a negative cost", op.name)));
            }
            for fact in op.preconditions.iter().chain(op.effects.iter()).copied() {
                self.check_fact(fact, &op.name)?;
            }
        }
        Ok(())
    }

    fn check_fact(&self, fact: Fact, context: &str) -> Result<(), Error> {
        match self.domains.get(fact.var) {
            Some(size) if fact.value < *size => Ok(()),
            Some(_) => Err(Error::InvalidTask(format!(
                "{context}: value {} out of the domain of variable {}", fact.value, fact.var))),
            None => Err(Error::InvalidTask(format!(
                "{context}: unknown variable {}", fact.var))),
        }
    }
}

impl Task for ExplicitTask {
    fn nb_variables(&self) -> usize {
        self.domains.len()
    }
    fn domain_size(&self, var: usize) -> usize {
        self.domains[var]
    }
    fn operators(&self) -> &[Operator] {
        &self.operators
    }
    fn initial_state(&self) -> &[usize] {
        &self.initial_state
    }
    fn goal(&self) -> &[Fact] {
        &self.goal
    }
    fn has_axioms(&self) -> bool {
        self.axioms
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_explicit_task {
    use crate::*;

    const LOGISTICS: &str = r#"{
        "domains": [2, 2],
        "operators": [
            {"name": "a", "cost": 1, "effects": [{"var": 0, "value": 1}]},
            {"name": "b", "cost": 3, "preconditions": [{"var": 0, "value": 1}],
             "effects": [{"var": 1, "value": 1}]}
        ],
        "initial_state": [0, 0],
        "goal": [{"var": 1, "value": 1}]
    }"#;

    #[test]
    fn it_parses_json_tasks() {
        let task = ExplicitTask::from_json(LOGISTICS).unwrap();
        assert_eq!(2, task.nb_variables());
        assert_eq!(2, task.nb_operators());
        assert_eq!(Some(0), task.operators()[1].precondition_on(0));
        assert_eq!(&[0, 0], task.initial_state());
        assert!(!task.has_axioms());
        assert!(task.is_goal_state(&[0, 1]));
        assert!((task.average_operator_cost() - 2.0).abs() < 1e-9);
    }
    #[test]
    fn malformed_json_is_a_format_error() {
        assert!(matches!(ExplicitTask::from_json("{ nope"), Err(Error::TaskFormat(_))));
    }
    #[test]
    fn out_of_domain_values_are_rejected() {
        let task = ExplicitTask::new(vec![2], vec![], vec![0], vec![Fact::new(0, 2)]);
        assert!(matches!(task.validate(), Err(Error::InvalidTask(_))));
    }
    #[test]
    fn partial_initial_states_are_rejected() {
        let task = ExplicitTask::new(vec![2, 2], vec![], vec![0], vec![]);
        assert!(matches!(task.validate(), Err(Error::InvalidTask(_))));
    }
    #[test]
    fn negative_costs_are_rejected() {
        let op = Operator { name: "a".into(), cost: -1, preconditions: vec![], effects: vec![Fact::new(0, 1)] };
        let task = ExplicitTask::new(vec![2], vec![op], vec![0], vec![]);
        assert!(matches!(task.validate(), Err(Error::InvalidTask(_))));
    }
    #[test]
    fn applying_an_operator_only_changes_its_effects() {
        let task = ExplicitTask::from_json(LOGISTICS).unwrap();
        let op = &task.operators()[1];
        assert!(!op.is_applicable(&[0, 0]));
        assert!(op.is_applicable(&[1, 0]));
        assert_eq!(vec![1, 1], op.apply(&[1, 0]));
    }
}
