use rayon::prelude::*;
use sfm_core::{BinaryDescriptor, Keypoint};

use crate::sampling::bilinear_sample;

const DESCRIPTOR_SIZE: usize = 32;
const NUM_PAIRS: usize = DESCRIPTOR_SIZE * 8;

/// Sampling offsets stay within this radius of the keypoint center.
const PATTERN_RADIUS: i32 = 12;

/// Fixed seed for the sampling pattern; the pattern must be identical across
/// runs and processes or descriptors stop being comparable.
const PATTERN_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Rotation-steered BRIEF: 256 pairwise intensity tests around each keypoint,
/// packed into a 32-byte descriptor.
pub(crate) struct BriefDescriptor {
    pairs: Vec<(i32, i32, i32, i32)>,
}

impl BriefDescriptor {
    pub fn new() -> Self {
        Self { pairs: sampling_pattern() }
    }

    pub fn describe(&self, img: &[u8], w: usize, h: usize, kps: &[Keypoint]) -> Vec<BinaryDescriptor> {
        kps.par_iter()
            .map(|kp| {
                let (s, c) = kp.angle.sin_cos();
                let (cx, cy) = (kp.x, kp.y);
                let mut d = [0u8; DESCRIPTOR_SIZE];

                for (i, &(dx1, dy1, dx2, dy2)) in self.pairs.iter().enumerate() {
                    // Steer the test pair by the keypoint orientation
                    let (rx1, ry1) = (
                        cx + c * dx1 as f32 - s * dy1 as f32,
                        cy + s * dx1 as f32 + c * dy1 as f32,
                    );
                    let (rx2, ry2) = (
                        cx + c * dx2 as f32 - s * dy2 as f32,
                        cy + s * dx2 as f32 + c * dy2 as f32,
                    );

                    let val1 = bilinear_sample(img, w, h, rx1, ry1);
                    let val2 = bilinear_sample(img, w, h, rx2, ry2);

                    let bit = (val1 < val2) as u8;
                    d[i / 8] |= bit << (i % 8);
                }
                d
            })
            .collect()
    }
}

/// Deterministic 256-pair test pattern drawn from a fixed-seed LCG.
///
/// Learned patterns (see the BRIEF paper) discriminate a little better, but a
/// fixed pseudo-random pattern keeps the descriptor self-contained.
fn sampling_pattern() -> Vec<(i32, i32, i32, i32)> {
    let span = (2 * PATTERN_RADIUS + 1) as u64;
    let mut state = PATTERN_SEED;
    let mut next = || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((state >> 33) % span) as i32 - PATTERN_RADIUS
    };

    let mut pairs = Vec::with_capacity(NUM_PAIRS);
    while pairs.len() < NUM_PAIRS {
        let pair = (next(), next(), next(), next());
        // A test comparing a point against itself carries no information
        if (pair.0, pair.1) != (pair.2, pair.3) {
            pairs.push(pair);
        }
    }
    pairs
}
