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

//! This module provides the routine shared by the bucket based shrink
//! strategies. Such a strategy partitions the states into an ordered list of
//! buckets; the states of the buckets coming first are the ones that get
//! combined when the budget does not allow to keep every state apart.

use rand::{rngs::StdRng, Rng};
use tracing::warn;

use crate::StateEquivalenceRelation;

/// Turns the ordered buckets into an equivalence relation of at most
/// `target_size` classes. The last buckets get singleton classes as long as
/// the budget allows it; a bucket which cannot be kept apart is split in as
/// many classes as its budget permits by combining random pairs of classes.
/// When even that is not possible, several buckets share one class.
pub fn compute_bucket_based_equivalence(
    buckets: &[Vec<usize>],
    target_size: usize,
    rng: &mut StdRng,
) -> StateEquivalenceRelation {
    let mut relation: StateEquivalenceRelation = Vec::with_capacity(target_size);
    let mut states_to_go = buckets.iter().map(|b| b.len()).sum::<usize>() as isize;
    let mut warned = false;

    for (bucket_no, bucket) in buckets.iter().enumerate() {
        let remaining_budget = target_size as isize - relation.len() as isize;
        states_to_go -= bucket.len() as isize;
        let budget_for_bucket = remaining_budget - states_to_go;

        if budget_for_bucket >= bucket.len() as isize {
            relation.extend(bucket.iter().map(|s| vec![*s]));
        } else if budget_for_bucket <= 1 {
            // the whole bucket forms one class
            let remaining_buckets = (buckets.len() - bucket_no) as isize;
            if remaining_budget >= remaining_buckets || relation.is_empty() {
                relation.push(vec![]);
            } else if !warned {
                warn!(target_size, "shrink budget exhausted, combining buckets");
                warned = true;
            }
            if let Some(class) = relation.last_mut() {
                class.extend_from_slice(bucket);
            }
        } else {
            let budget = budget_for_bucket as usize;
            let mut classes = bucket.iter().map(|s| vec![*s]).collect::<Vec<_>>();
            while classes.len() > budget {
                let i = rng.gen_range(0..classes.len());
                let mut j = rng.gen_range(0..classes.len() - 1);
                if j >= i {
                    j += 1;
                }
                let moved = std::mem::take(&mut classes[j]);
                classes[i].extend(moved);
                classes.swap_remove(j);
            }
            relation.extend(classes);
        }
    }
    relation
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
