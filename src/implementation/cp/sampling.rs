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
//! This module provides the random walk sampler used to pick the states
//! multi-order cost partitionings are diversified and optimized for. Walks
//! start in the initial state; their expected length grows with the
//! estimated number of steps to the goal.

use rand::{rngs::StdRng, seq::SliceRandom, Rng};

use crate::{CountdownTimer, Cost, Task, INF};

/// Where states recognized as dead ends (pruned by some abstraction) are
/// avoided while sampling
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum SamplingWithDeadEnds {
    /// Never check for dead ends
    None,
    /// Only when sampling the states the diversifier compares orders on
    Div,
    /// Only when sampling the states orders are optimized for
    Opt,
    /// Always
    #[default]
    DivAndOpt,
}
impl SamplingWithDeadEnds {
    pub fn for_diversification(self) -> bool {
        matches!(self, SamplingWithDeadEnds::Div | SamplingWithDeadEnds::DivAndOpt)
    }
    pub fn for_optimization(self) -> bool {
        matches!(self, SamplingWithDeadEnds::Opt | SamplingWithDeadEnds::DivAndOpt)
    }
}

pub struct RandomWalkSampler<'a> {
    task: &'a dyn Task,
    average_operator_cost: f64,
}
impl<'a> RandomWalkSampler<'a> {
    pub fn new(task: &'a dyn Task) -> Self {
        RandomWalkSampler { task, average_operator_cost: task.average_operator_cost() }
    }

    /// The number of coin flips deciding the length of a walk
    fn nb_trials(&self, init_h: Cost) -> usize {
        if init_h == 0 || init_h == INF || self.average_operator_cost <= 0.0 {
            10
        } else {
            let steps = (init_h as f64 / self.average_operator_cost + 0.5) as usize;
            4 * steps
        }
    }

    /// Draws a state at the end of a random walk from the initial state. The
    /// walk length follows a binomial distribution centered on twice the
    /// estimated solution length. Stepping into a dead end restarts the walk
    /// from the initial state.
    pub fn sample_state(&self, init_h: Cost, is_dead_end: &dyn Fn(&[usize]) -> bool, rng: &mut StdRng) -> Vec<usize> {
        let init = self.task.initial_state();
        let length = (0..self.nb_trials(init_h)).filter(|_| rng.gen_bool(0.5)).count();

        let mut current = init.to_vec();
        for _ in 0..length {
            let applicable = self.task.operators().iter()
                .filter(|op| op.is_applicable(&current))
                .collect::<Vec<_>>();
            let Some(op) = applicable.choose(rng) else {
                break;
            };
            current = op.apply(&current);
            if is_dead_end(&current) {
                current = init.to_vec();
            }
        }
        current
    }
}

/// The initial state followed by random walk samples, up to `nb_samples`
/// states or until the timer expires
pub fn sample_states(
    sampler: &RandomWalkSampler,
    init_h: Cost,
    nb_samples: usize,
    is_dead_end: &dyn Fn(&[usize]) -> bool,
    timer: &CountdownTimer,
    rng: &mut StdRng,
) -> Vec<Vec<usize>> {
    let mut samples = vec![sampler.task.initial_state().to_vec()];
    while samples.len() < nb_samples && !timer.is_expired() {
        samples.push(sampler.sample_state(init_h, is_dead_end, rng));
    }
    samples
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_random_walk_sampler {
    use rand::{rngs::StdRng, SeedableRng};

    use crate::*;

    /// x in {0, 1, 2}; up: 0 -> 1 ; jump: 1 -> 2 ; goal x = 2
    fn ladder() -> ExplicitTask {
        ExplicitTask::new(
            vec![3],
            vec![
                Operator { name: "up".into(), cost: 1, preconditions: vec![Fact::new(0, 0)], effects: vec![Fact::new(0, 1)] },
                Operator { name: "jump".into(), cost: 1, preconditions: vec![Fact::new(0, 1)], effects: vec![Fact::new(0, 2)] },
            ],
            vec![0],
            vec![Fact::new(0, 2)],
        )
    }

    #[test]
    fn the_initial_state_is_the_first_sample() {
        let task = ladder();
        let sampler = RandomWalkSampler::new(&task);
        let mut rng = StdRng::seed_from_u64(1);
        let samples = sample_states(&sampler, 2, 5, &|_| false, &CountdownTimer::unlimited(), &mut rng);
        assert_eq!(5, samples.len());
        assert_eq!(vec![0], samples[0]);
    }
    #[test]
    fn samples_are_reachable_states() {
        let task = ladder();
        let sampler = RandomWalkSampler::new(&task);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let state = sampler.sample_state(2, &|_| false, &mut rng);
            assert!(state[0] <= 2);
        }
    }
    #[test]
    fn dead_ends_are_never_returned() {
        let task = ladder();
        let sampler = RandomWalkSampler::new(&task);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let state = sampler.sample_state(2, &|s: &[usize]| s[0] == 2, &mut rng);
            assert_ne!(vec![2], state);
        }
    }
    #[test]
    fn an_expired_timer_only_yields_the_initial_state() {
        let task = ladder();
        let sampler = RandomWalkSampler::new(&task);
        let mut rng = StdRng::seed_from_u64(5);
        let samples = sample_states(&sampler, 2, 100, &|_| false, &CountdownTimer::new(0.0), &mut rng);
        assert_eq!(vec![vec![0]], samples);
    }
    #[test]
    fn dead_end_detection_is_selected_per_use() {
        assert!(SamplingWithDeadEnds::DivAndOpt.for_diversification());
        assert!(SamplingWithDeadEnds::DivAndOpt.for_optimization());
        assert!(!SamplingWithDeadEnds::Opt.for_diversification());
        assert!(!SamplingWithDeadEnds::None.for_optimization());
    }
}
