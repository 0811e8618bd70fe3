use nalgebra::Matrix3;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use sfm_core::{Correspondence, Keypoint, MatchResult, RansacConfig};

use crate::error::{MatchError, MatchingResult};
use crate::homography::{estimate_homography, reprojection_error, MIN_CORRESPONDENCES};

/// Filter candidate correspondences with a RANSAC-estimated homography.
///
/// Returns the geometrically consistent subset of `candidates` along with the
/// refit homography and a per-candidate inlier mask. The mask and the
/// surviving matches are in the same order as the input. Fails with
/// [`MatchError::InsufficientCorrespondences`] when fewer than four candidates
/// are available and with [`MatchError::NoConsensus`] when no sampled model
/// explains at least a minimal sample's worth of candidates.
pub fn filter_matches(
    candidates: &[Correspondence],
    query_keypoints: &[Keypoint],
    train_keypoints: &[Keypoint],
    config: &RansacConfig,
) -> MatchingResult<MatchResult> {
    if candidates.len() < MIN_CORRESPONDENCES {
        return Err(MatchError::InsufficientCorrespondences {
            required: MIN_CORRESPONDENCES,
            actual: candidates.len(),
        });
    }

    let (src, dst) = correspondence_points(candidates, query_keypoints, train_keypoints)?;

    let mut rng = match config.random_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let n = candidates.len();
    let mut indices: Vec<usize> = (0..n).collect();

    let mut best_inliers = 0usize;
    let mut best_mask: Vec<bool> = Vec::new();
    let mut best_model: Option<Matrix3<f64>> = None;

    let mut max_iterations = config.max_iterations;
    let mut iteration = 0usize;
    while iteration < max_iterations {
        iteration += 1;

        indices.shuffle(&mut rng);
        let sample: Vec<usize> = indices[..MIN_CORRESPONDENCES].to_vec();

        let sample_src: Vec<[f64; 2]> = sample.iter().map(|&i| src[i]).collect();
        let sample_dst: Vec<[f64; 2]> = sample.iter().map(|&i| dst[i]).collect();

        // Degenerate samples happen; draw again
        let model = match estimate_homography(&sample_src, &sample_dst) {
            Ok(h) => h,
            Err(_) => continue,
        };

        let mut mask = vec![false; n];
        let mut inliers = 0usize;
        for i in 0..n {
            if reprojection_error(&model, &src[i], &dst[i]) < config.reproj_threshold {
                mask[i] = true;
                inliers += 1;
            }
        }

        if inliers > best_inliers {
            best_inliers = inliers;
            best_mask = mask;
            best_model = Some(model);

            // Shrink the iteration budget as the inlier ratio firms up
            let w = inliers as f64 / n as f64;
            let denom = (1.0 - w.powi(MIN_CORRESPONDENCES as i32)).max(f64::EPSILON).ln();
            if denom < 0.0 {
                let needed = ((1.0 - config.confidence).ln() / denom).ceil();
                if needed.is_finite() && needed >= 0.0 {
                    max_iterations = max_iterations.min(needed as usize);
                }
            }
        }
    }

    let model = match best_model {
        Some(m) if best_inliers >= MIN_CORRESPONDENCES => m,
        _ => return Err(MatchError::NoConsensus { iterations: iteration }),
    };

    // Refit on the full consensus set; fall back to the minimal-sample model
    // if the refit turns out degenerate.
    let inlier_src: Vec<[f64; 2]> = mask_select(&src, &best_mask);
    let inlier_dst: Vec<[f64; 2]> = mask_select(&dst, &best_mask);
    let refined = estimate_homography(&inlier_src, &inlier_dst).unwrap_or(model);

    // Reclassify against the refined model so mask and matches stay coherent
    let mut inlier_mask = vec![false; n];
    let mut matches = Vec::with_capacity(best_inliers);
    for i in 0..n {
        if reprojection_error(&refined, &src[i], &dst[i]) < config.reproj_threshold {
            inlier_mask[i] = true;
            matches.push(candidates[i]);
        }
    }

    if matches.len() < MIN_CORRESPONDENCES {
        // The refit drifted away from its own consensus set; keep the
        // minimal-sample model and its mask instead.
        matches = candidates
            .iter()
            .zip(&best_mask)
            .filter(|(_, &keep)| keep)
            .map(|(&c, _)| c)
            .collect();
        return Ok(MatchResult {
            matches,
            homography: model,
            inlier_mask: best_mask,
        });
    }

    Ok(MatchResult {
        matches,
        homography: refined,
        inlier_mask,
    })
}

/// Resolve correspondence indices into f64 pixel coordinates.
fn correspondence_points(
    candidates: &[Correspondence],
    query_keypoints: &[Keypoint],
    train_keypoints: &[Keypoint],
) -> MatchingResult<(Vec<[f64; 2]>, Vec<[f64; 2]>)> {
    let mut src = Vec::with_capacity(candidates.len());
    let mut dst = Vec::with_capacity(candidates.len());
    for c in candidates {
        let q = query_keypoints
            .get(c.query_idx)
            .ok_or(MatchError::CorrespondenceOutOfRange {
                index: c.query_idx,
                len: query_keypoints.len(),
            })?;
        let t = train_keypoints
            .get(c.train_idx)
            .ok_or(MatchError::CorrespondenceOutOfRange {
                index: c.train_idx,
                len: train_keypoints.len(),
            })?;
        src.push([q.x as f64, q.y as f64]);
        dst.push([t.x as f64, t.y as f64]);
    }
    Ok((src, dst))
}

fn mask_select(points: &[[f64; 2]], mask: &[bool]) -> Vec<[f64; 2]> {
    points
        .iter()
        .zip(mask)
        .filter(|(_, &keep)| keep)
        .map(|(&p, _)| p)
        .collect()
}
