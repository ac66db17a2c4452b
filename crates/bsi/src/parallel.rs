//! Shard fan-out for bulk operations.
//!
//! A candidate bitmap is split into contiguous, disjoint runs of row IDs; each
//! run is processed by its own rayon task reading the source index, and the
//! partial results are folded with an associative, commutative reduction.

use crate::Bitmap;
use rayon::prelude::*;
use tracing::trace;

/// Split `candidates` into at most `parallelism` disjoint shards of roughly
/// equal cardinality, in ascending row order.
///
/// Shard boundaries are found by rank with `select` and each shard is cut out
/// with range removal, so the cost depends on the number of containers rather
/// than the number of rows.
pub(crate) fn split(candidates: Bitmap, parallelism: usize) -> Vec<Bitmap> {
    let total = candidates.len();
    if parallelism <= 1 || total < 2 {
        return vec![candidates];
    }

    let per_shard = total.div_ceil(parallelism as u64);
    let starts: Vec<u64> = (1..parallelism as u64)
        .map(|k| k * per_shard)
        .take_while(|&rank| rank < total)
        .filter_map(|rank| candidates.select(rank))
        .collect();

    // Peel shards off the high end; `rest` keeps everything below `start`.
    let mut shards = Vec::with_capacity(starts.len() + 1);
    let mut rest = candidates;
    for &start in starts.iter().rev() {
        let mut shard = rest.clone();
        shard.remove_range(..start);
        rest.remove_range(start..);
        shards.push(shard);
    }
    shards.push(rest);
    shards.reverse();

    shards
}

/// Run `map` over the shards of `candidates` and fold the results with
/// `reduce`.
///
/// A `parallelism` of 0 or 1 runs `map` once, inline, on the whole candidate
/// set.
pub(crate) fn fan_out<T, M, R>(candidates: Bitmap, parallelism: usize, map: M, reduce: R) -> T
where
    T: Send,
    M: Fn(Bitmap) -> T + Sync + Send,
    R: Fn(T, T) -> T + Sync + Send,
{
    if parallelism <= 1 {
        return map(candidates);
    }

    let shards = split(candidates, parallelism);
    trace!(
        "fanning out over {} shards (parallelism={})",
        shards.len(),
        parallelism
    );

    shards
        .into_par_iter()
        .map(&map)
        .reduce_with(&reduce)
        .unwrap_or_else(|| map(Bitmap::new()))
}
