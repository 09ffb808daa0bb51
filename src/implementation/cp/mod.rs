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
//! This module provides the cost partitioning layer: the abstractions taken
//! out of the factored transition system, saturated cost partitioning over
//! one or several orders, optimal cost partitioning and the heuristic taking
//! the maximum of several cost partitionings.

mod abstraction;
mod utils;
mod heuristic;
mod orders;
mod scp;
mod sampling;
mod diversifier;
mod optimizer;
mod scps;
mod ocp;
mod max_heuristic;

pub use abstraction::*;
pub use utils::*;
pub use heuristic::*;
pub use orders::*;
pub use scp::*;
pub use sampling::*;
pub use diversifier::*;
pub use optimizer::*;
pub use scps::*;
pub use ocp::*;
pub use max_heuristic::*;
