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

//! This module provides the scheduler deciding when the main loop takes a
//! snapshot. In the count mode, the requested number of snapshots is spread
//! evenly over the time budget and over the iterations which remain; the
//! schedule is recomputed after each snapshot. In the period mode, a snapshot
//! is taken every `k` iterations.

/// Tells when the next snapshot is due
#[derive(Debug, Clone)]
pub struct NextSnapshot {
    max_time: f64,
    max_iterations: usize,
    target_num_snapshots: usize,
    snapshot_each_iteration: usize,
    next_time: f64,
    next_iteration: usize,
    num_snapshots: usize,
}

impl NextSnapshot {
    /// Creates the scheduler of a main loop which may run for `max_time`
    /// seconds and `max_iterations` iterations. At most one of
    /// `target_num_snapshots` and `snapshot_each_iteration` may be non zero;
    /// when both are zero no snapshot is ever due.
    pub fn new(max_time: f64, max_iterations: usize, target_num_snapshots: usize, snapshot_each_iteration: usize) -> Self {
        debug_assert!(target_num_snapshots == 0 || snapshot_each_iteration == 0);
        let mut next = NextSnapshot {
            max_time,
            max_iterations,
            target_num_snapshots,
            snapshot_each_iteration,
            next_time: f64::INFINITY,
            next_iteration: usize::MAX,
            num_snapshots: 0,
        };
        next.compute_next(0.0, 0);
        next
    }

    pub fn next_time(&self) -> f64 {
        self.next_time
    }
    pub fn next_iteration(&self) -> usize {
        self.next_iteration
    }
    /// The number of snapshots that were due so far
    pub fn num_snapshots(&self) -> usize {
        self.num_snapshots
    }

    /// Returns true iff a snapshot must be taken at the given time and
    /// iteration. In that case, the snapshot is accounted for and the next
    /// one is scheduled.
    pub fn is_due(&mut self, current_time: f64, current_iteration: usize) -> bool {
        if current_time >= self.next_time || current_iteration >= self.next_iteration {
            self.num_snapshots += 1;
            self.compute_next(current_time, current_iteration);
            true
        } else {
            false
        }
    }

    fn compute_next(&mut self, current_time: f64, current_iteration: usize) {
        if self.target_num_snapshots > 0 {
            let remaining = self.target_num_snapshots.saturating_sub(self.num_snapshots);
            if remaining == 0 {
                self.next_time = self.max_time + 1.0;
                self.next_iteration = self.max_iterations.saturating_add(1);
                return;
            }
            let remaining_time = self.max_time - current_time;
            self.next_time = if remaining_time <= 0.0 {
                current_time
            } else {
                current_time + remaining_time / remaining as f64
            };

            let remaining_iterations = self.max_iterations.saturating_sub(current_iteration);
            self.next_iteration = if remaining_iterations == 0 || remaining >= remaining_iterations {
                current_iteration + 1
            } else {
                current_iteration + remaining_iterations / remaining
            };
        } else if self.snapshot_each_iteration > 0 {
            self.next_time = f64::INFINITY;
            self.next_iteration = current_iteration + self.snapshot_each_iteration;
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_next_snapshot {
    use crate::*;

    fn due_iterations(next: &mut NextSnapshot, max_iterations: usize) -> Vec<usize> {
        (1..=max_iterations).filter(|it| next.is_due(0.0, *it)).collect()
    }

    #[test]
    fn count_mode_spreads_snapshots_over_iterations() {
        let mut next = NextSnapshot::new(f64::INFINITY, 10, 3, 0);
        assert_eq!(vec![3, 6, 10], due_iterations(&mut next, 10));
        assert_eq!(3, next.num_snapshots());
    }
    #[test]
    fn count_mode_never_exceeds_the_number_of_iterations() {
        let mut next = NextSnapshot::new(f64::INFINITY, 2, 5, 0);
        assert_eq!(vec![1, 2], due_iterations(&mut next, 2));
    }
    #[test]
    fn count_mode_stops_once_the_target_is_reached() {
        let mut next = NextSnapshot::new(f64::INFINITY, 10, 1, 0);
        assert_eq!(vec![10], due_iterations(&mut next, 10));
        assert_eq!(11, next.next_iteration());
        assert!(next.next_time().is_infinite());
    }
    #[test]
    fn count_mode_spreads_snapshots_over_time() {
        let next = NextSnapshot::new(10.0, 1000, 4, 0);
        assert!((next.next_time() - 2.5).abs() < 1e-9);
        let mut next = next;
        assert!(next.is_due(2.5, 1));
        assert!((next.next_time() - 5.0).abs() < 1e-9);
    }
    #[test]
    fn period_mode_takes_a_snapshot_every_k_iterations() {
        let mut next = NextSnapshot::new(f64::INFINITY, 10, 0, 4);
        assert_eq!(vec![4, 8], due_iterations(&mut next, 10));
    }
    #[test]
    fn without_any_mode_nothing_is_ever_due() {
        let mut next = NextSnapshot::new(1.0, 10, 0, 0);
        assert!(due_iterations(&mut next, 10).is_empty());
        assert!(!next.is_due(100.0, 10));
    }
}
