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
//! This module provides the countdown timer which bounds the time spent in
//! the main loop of the algorithm and in the computation of the cost
//! partitionings. Budgets are expressed in seconds; an infinite budget never
//! expires.

use std::time::Instant;

/// A wall-clock budget started upon creation
#[derive(Debug, Copy, Clone)]
pub struct CountdownTimer {
    start: Instant,
    max_time: f64,
}
impl CountdownTimer {
    pub fn new(max_time: f64) -> Self {
        CountdownTimer { start: Instant::now(), max_time }
    }
    /// A timer which never expires
    pub fn unlimited() -> Self {
        Self::new(f64::INFINITY)
    }
    /// The budget of this timer (in seconds)
    pub fn max_time(&self) -> f64 {
        self.max_time
    }
    /// Seconds elapsed since the timer was created
    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
    /// Seconds left before the timer expires (never negative)
    pub fn remaining(&self) -> f64 {
        (self.max_time - self.elapsed()).max(0.0)
    }
    pub fn is_expired(&self) -> bool {
        self.elapsed() >= self.max_time
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_countdown_timer {
    use crate::*;

    #[test]
    fn an_unlimited_timer_never_expires() {
        let timer = CountdownTimer::unlimited();
        assert!(!timer.is_expired());
        assert_eq!(f64::INFINITY, timer.remaining());
    }
    #[test]
    fn a_zero_budget_is_expired_right_away() {
        let timer = CountdownTimer::new(0.0);
        assert!(timer.is_expired());
        assert_eq!(0.0, timer.remaining());
    }
    #[test]
    fn remaining_time_never_exceeds_the_budget() {
        let timer = CountdownTimer::new(100.0);
        assert!(timer.remaining() <= 100.0);
        assert!(!timer.is_expired());
    }
}
