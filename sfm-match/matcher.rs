use rayon::prelude::*;
use sfm_core::{BinaryDescriptor, Correspondence, DescriptorSet};

use crate::error::{MatchError, MatchingResult};

/// Hamming distance between two fixed-size byte descriptors.
#[inline]
pub fn hamming_distance(a: &BinaryDescriptor, b: &BinaryDescriptor) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x ^ y).count_ones())
        .sum()
}

/// Euclidean (L2) distance between two float descriptors of equal dimension.
#[inline]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

/// Brute-force nearest-neighbor matching between two descriptor sets.
///
/// Produces exactly one candidate per query descriptor (its single nearest
/// neighbor in the train set), in query order, ties kept first-found. No
/// distance threshold or ratio test is applied here: outlier rejection is
/// entirely the geometric filter's job.
///
/// Both sets must use the same representation; a non-empty query against an
/// empty train set has no defined nearest neighbor and is an error.
pub fn match_descriptors(
    query: &DescriptorSet,
    train: &DescriptorSet,
) -> MatchingResult<Vec<Correspondence>> {
    if query.is_empty() {
        return Ok(Vec::new());
    }

    match (query, train) {
        (DescriptorSet::Binary(q), DescriptorSet::Binary(t)) => {
            if t.is_empty() {
                return Err(MatchError::EmptyTrainSet);
            }
            Ok(q.par_iter()
                .enumerate()
                .map(|(qi, qd)| {
                    let mut best_j = 0usize;
                    let mut best_dist = u32::MAX;
                    for (j, td) in t.iter().enumerate() {
                        let dist = hamming_distance(qd, td);
                        if dist < best_dist {
                            best_dist = dist;
                            best_j = j;
                        }
                    }
                    Correspondence {
                        query_idx: qi,
                        train_idx: best_j,
                        distance: best_dist as f32,
                    }
                })
                .collect())
        }
        (DescriptorSet::Float(q), DescriptorSet::Float(t)) => {
            if t.is_empty() {
                return Err(MatchError::EmptyTrainSet);
            }
            let query_dim = q[0].len();
            let train_dim = t[0].len();
            if query_dim != train_dim {
                return Err(MatchError::DimensionMismatch { query_dim, train_dim });
            }
            Ok(q.par_iter()
                .enumerate()
                .map(|(qi, qd)| {
                    let mut best_j = 0usize;
                    let mut best_dist = f32::INFINITY;
                    for (j, td) in t.iter().enumerate() {
                        let dist = euclidean_distance(qd, td);
                        if dist < best_dist {
                            best_dist = dist;
                            best_j = j;
                        }
                    }
                    Correspondence {
                        query_idx: qi,
                        train_idx: best_j,
                        distance: best_dist,
                    }
                })
                .collect())
        }
        _ => Err(MatchError::DescriptorMismatch {
            query: query.kind_name(),
            train: train.kind_name(),
        }),
    }
}
