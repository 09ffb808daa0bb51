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

//! This module defines the most basic data types that are used throughout all
//! the code of our library (both at the abstraction and implementation levels).
//! It holds the extended integer arithmetic used for distances and costs, the
//! verbosity levels and the error type returned by fallible operations.

use thiserror::Error;

// ----------------------------------------------------------------------------
// --- COSTS ------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// Costs and distances live in the extended integer domain ℤ ∪ {−∞, +∞}.
/// Both infinities are encoded with the extreme values of an `i32`.
pub type Cost = i32;
/// The positive infinity: an unreachable goal, an unusable label.
pub const INF: Cost = i32::MAX;
/// The negative infinity: e.g. the saturated cost of a label that never leads
/// to a state with a finite goal distance.
pub const MINUS_INF: Cost = i32::MIN;
/// The value stored in a representation table for a state that was pruned.
pub const PRUNED_STATE: i32 = -1;

/// Labels are identified by a plain index in the label space of the FTS.
pub type LabelId = usize;

/// Adds two path costs. Infinity absorbs any finite value.
#[inline]
pub fn path_addition(a: Cost, b: Cost) -> Cost {
    if a == INF || b == INF {
        INF
    } else {
        a.saturating_add(b)
    }
}

/// Subtracts `b` from `a` in the extended domain. An infinite `a` wins over
/// anything; otherwise subtracting −∞ (resp. +∞) yields +∞ (resp. −∞).
#[inline]
pub fn left_subtraction(a: Cost, b: Cost) -> Cost {
    if a == INF || a == MINUS_INF {
        a
    } else if b == MINUS_INF {
        INF
    } else if b == INF {
        MINUS_INF
    } else {
        a.saturating_sub(b)
    }
}

// ----------------------------------------------------------------------------
// --- VERBOSITY --------------------------------------------------------------
// ----------------------------------------------------------------------------
/// How chatty the engine is. Every level includes the records of the levels
/// before it. Records are emitted through `tracing`: `Normal` maps to `info`,
/// `Verbose` to `debug` and `Debug` to `trace`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verbosity {
    Silent,
    #[default]
    Normal,
    Verbose,
    Debug,
}
impl Verbosity {
    #[inline]
    pub fn is_at_least_normal(self) -> bool {
        self >= Verbosity::Normal
    }
    #[inline]
    pub fn is_at_least_verbose(self) -> bool {
        self >= Verbosity::Verbose
    }
    #[inline]
    pub fn is_at_least_debug(self) -> bool {
        self >= Verbosity::Debug
    }
}

// ----------------------------------------------------------------------------
// --- ERRORS -----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The kinds of failures that can reach the boundary of the engine. Dead ends
/// and LP failures are *not* errors: they are reported as an infinite
/// heuristic value.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration is inconsistent (bad bounds, bad snapshot options..)
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    /// Axioms (derived variables) are not supported by the engine
    #[error("tasks with axioms are not supported")]
    AxiomsNotSupported,
    /// A one-shot factory was asked to produce its result a second time
    #[error("{0} cannot be used twice")]
    FactoryReused(&'static str),
    /// The task is malformed (out of range facts, negative costs, ..)
    #[error("invalid task: {0}")]
    InvalidTask(String),
    /// The task file could not be decoded
    #[error("cannot decode task: {0}")]
    TaskFormat(#[from] serde_json::Error),
    /// The algorithm terminated without a single cost partitioning
    #[error("no cost partitioning was computed")]
    NoCostPartitioning,
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
