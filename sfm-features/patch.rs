use rayon::prelude::*;
use sfm_core::Keypoint;

use crate::sampling::bilinear_sample;

const GRID: usize = 8;
const SPACING: f32 = 2.0;

/// Dimension of the float descriptor: an 8x8 intensity grid.
pub(crate) const PATCH_DESCRIPTOR_DIM: usize = GRID * GRID;

/// Rotation-steered normalized intensity patch, the float-metric counterpart
/// to the binary BRIEF descriptor. Samples an 8x8 grid around the keypoint,
/// steered by its orientation, then normalizes to zero mean and unit length
/// for illumination invariance.
pub(crate) struct PatchDescriptor;

impl PatchDescriptor {
    pub fn new() -> Self {
        Self
    }

    pub fn describe(&self, img: &[u8], w: usize, h: usize, kps: &[Keypoint]) -> Vec<Vec<f32>> {
        kps.par_iter()
            .map(|kp| {
                let (s, c) = kp.angle.sin_cos();
                let mut v = Vec::with_capacity(PATCH_DESCRIPTOR_DIM);
                let center = (GRID as f32 - 1.0) / 2.0;

                for gy in 0..GRID {
                    for gx in 0..GRID {
                        let dx = (gx as f32 - center) * SPACING;
                        let dy = (gy as f32 - center) * SPACING;
                        let rx = kp.x + c * dx - s * dy;
                        let ry = kp.y + s * dx + c * dy;
                        v.push(bilinear_sample(img, w, h, rx, ry));
                    }
                }

                normalize(&mut v);
                v
            })
            .collect()
    }
}

fn normalize(v: &mut [f32]) {
    let mean = v.iter().sum::<f32>() / v.len() as f32;
    for x in v.iter_mut() {
        *x -= mean;
    }
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    // Flat patches stay all-zero rather than dividing by ~0
    if norm > 1e-6 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured_image(width: usize, height: usize) -> Vec<u8> {
        let mut img = vec![0u8; width * height];
        for y in 0..height {
            for x in 0..width {
                img[y * width + x] = ((x * 11 + y * 17) % 253) as u8;
            }
        }
        img
    }

    #[test]
    fn test_descriptor_dimension() {
        let patch = PatchDescriptor::new();
        let img = textured_image(64, 64);
        let kps = vec![Keypoint { x: 32.0, y: 32.0, angle: 0.3 }];
        let desc = patch.describe(&img, 64, 64, &kps);
        assert_eq!(desc.len(), 1);
        assert_eq!(desc[0].len(), PATCH_DESCRIPTOR_DIM);
    }

    #[test]
    fn test_descriptor_is_zero_mean_unit_norm() {
        let patch = PatchDescriptor::new();
        let img = textured_image(64, 64);
        let desc = patch.describe(&img, 64, 64, &[Keypoint { x: 30.0, y: 30.0, angle: 0.0 }]);
        let mean: f32 = desc[0].iter().sum::<f32>() / desc[0].len() as f32;
        let norm: f32 = desc[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!(mean.abs() < 1e-4);
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_flat_patch_stays_zero() {
        let patch = PatchDescriptor::new();
        let img = vec![128u8; 64 * 64];
        let desc = patch.describe(&img, 64, 64, &[Keypoint { x: 32.0, y: 32.0, angle: 0.0 }]);
        assert!(desc[0].iter().all(|&x| x == 0.0));
    }
}
