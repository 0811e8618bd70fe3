use rayon::prelude::*;
use sfm_core::{CoreError, DetectorConfig, Keypoint};

use crate::error::{FeatureError, FeatureResult};

/// FAST requires a 3-pixel ring border on each side.
const MIN_IMAGE_SIZE: usize = 7;

/// Minimum center distance between surviving keypoints.
const NMS_DISTANCE: f32 = 3.0;

/// Keypoint with corner response score, kept only through suppression.
#[derive(Debug, Clone, Copy)]
struct ScoredKeypoint {
    keypoint: Keypoint,
    response: f32,
}

/// 16-point segment-test FAST corner detector with orientation assignment.
///
/// Unlike a per-image detector bound to fixed dimensions, this one is built
/// once from the configuration and handed buffers of any size, so a batch of
/// differently sized images can share it.
pub(crate) struct FastCornerDetector {
    threshold: u8,
    patch_size: usize,
}

impl FastCornerDetector {
    pub fn new(cfg: &DetectorConfig) -> FeatureResult<Self> {
        if cfg.threshold == 0 || cfg.threshold > 127 {
            return Err(CoreError::InvalidThreshold(cfg.threshold).into());
        }
        if cfg.patch_size < 3 || cfg.patch_size % 2 == 0 {
            return Err(CoreError::InvalidPatchSize { patch_size: cfg.patch_size }.into());
        }
        Ok(Self {
            threshold: cfg.threshold,
            patch_size: cfg.patch_size,
        })
    }

    /// Detect corners on a luma plane, suppress near-duplicates and assign
    /// orientations. Output order is deterministic for identical input.
    pub fn detect(&self, img: &[u8], w: usize, h: usize) -> FeatureResult<Vec<Keypoint>> {
        self.validate(img, w, h)?;

        let scored = self.scan(img, w, h);
        let suppressed = non_maximum_suppression(&scored, NMS_DISTANCE);

        let keypoints = suppressed
            .into_iter()
            .map(|sk| {
                let angle = self.compute_orientation(
                    img,
                    w,
                    h,
                    sk.keypoint.x as usize,
                    sk.keypoint.y as usize,
                );
                Keypoint { angle, ..sk.keypoint }
            })
            .collect();

        Ok(keypoints)
    }

    fn validate(&self, img: &[u8], w: usize, h: usize) -> FeatureResult<()> {
        if w < MIN_IMAGE_SIZE || h < MIN_IMAGE_SIZE {
            return Err(FeatureError::ImageTooSmall {
                width: w,
                height: h,
                min_size: MIN_IMAGE_SIZE,
            });
        }
        let expected_len = w * h;
        if img.len() != expected_len {
            return Err(CoreError::InvalidImageData {
                expected_len,
                actual_len: img.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Segment test over the 16-pixel Bresenham ring, one row per task.
    fn scan(&self, img: &[u8], w: usize, h: usize) -> Vec<ScoredKeypoint> {
        const OFF: [(i32, i32); 16] = [
            (-3, 0), (-3, 1), (-2, 2), (-1, 3),
            (0, 3), (1, 3), (2, 2), (3, 1),
            (3, 0), (3, -1), (2, -2), (1, -3),
            (0, -3), (-1, -3), (-2, -2), (-3, -1),
        ];

        let threshold = self.threshold;
        (3..h - 3)
            .into_par_iter()
            .flat_map_iter(|y| {
                let mut v = Vec::new();
                for x in 3..w - 3 {
                    let p = img[y * w + x];
                    let mut bri = 0u32;
                    let mut drk = 0u32;
                    let mut bri_sum = 0i32;
                    let mut drk_sum = 0i32;

                    for &(dx, dy) in &OFF {
                        let xx = (x as i32 + dx) as usize;
                        let yy = (y as i32 + dy) as usize;
                        let q = img[yy * w + xx];

                        if q >= p.saturating_add(threshold) {
                            bri += 1;
                            bri_sum += q as i32 - p as i32;
                        } else if q.saturating_add(threshold) <= p {
                            drk += 1;
                            drk_sum += p as i32 - q as i32;
                        }
                    }

                    if bri >= 12 || drk >= 12 {
                        let response = if bri >= 12 {
                            bri_sum as f32 / bri as f32
                        } else {
                            drk_sum as f32 / drk as f32
                        };
                        v.push(ScoredKeypoint {
                            keypoint: Keypoint { x: x as f32, y: y as f32, angle: 0.0 },
                            response: response.abs(),
                        });
                    }
                }
                v
            })
            .collect()
    }

    /// Intensity-centroid orientation over the configured patch.
    ///
    /// Patches that do not fit inside the image get a zero angle.
    fn compute_orientation(&self, img: &[u8], w: usize, h: usize, x: usize, y: usize) -> f32 {
        let half = (self.patch_size / 2) as i32;
        let (cx, cy) = (x as i32, y as i32);

        if cx - half < 0 || cy - half < 0 || cx + half >= w as i32 || cy + half >= h as i32 {
            return 0.0;
        }

        let mut m10 = 0i64;
        let mut m01 = 0i64;
        for dy in -half..=half {
            let yy = (cy + dy) as usize;
            for dx in -half..=half {
                let xx = (cx + dx) as usize;
                let val = img[yy * w + xx] as i64;
                m10 += dx as i64 * val;
                m01 += dy as i64 * val;
            }
        }

        (m01 as f32).atan2(m10 as f32)
    }
}

/// Greedy non-maximum suppression: strongest responses first, drop anything
/// within `min_distance` of an already accepted keypoint.
fn non_maximum_suppression(keypoints: &[ScoredKeypoint], min_distance: f32) -> Vec<ScoredKeypoint> {
    if keypoints.is_empty() {
        return Vec::new();
    }

    let mut sorted = keypoints.to_vec();
    sorted.sort_by(|a, b| b.response.partial_cmp(&a.response).unwrap_or(std::cmp::Ordering::Equal));

    let min_distance_sq = min_distance * min_distance;
    let mut suppressed: Vec<ScoredKeypoint> = Vec::new();

    for candidate in sorted {
        let accepted = suppressed.iter().all(|kept| {
            let dx = candidate.keypoint.x - kept.keypoint.x;
            let dy = candidate.keypoint.y - kept.keypoint.y;
            dx * dx + dy * dy >= min_distance_sq
        });
        if accepted {
            suppressed.push(candidate);
        }
    }

    suppressed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> DetectorConfig {
        DetectorConfig {
            threshold: 20,
            patch_size: 5,
            n_threads: 1,
        }
    }

    fn uniform_image(width: usize, height: usize) -> Vec<u8> {
        vec![128; width * height]
    }

    fn corner_image(width: usize, height: usize) -> Vec<u8> {
        let mut img = vec![50; width * height];
        let cx = width / 2;
        let cy = height / 2;
        for dy in -2i32..=2 {
            for dx in -2i32..=2 {
                let x = (cx as i32 + dx) as usize;
                let y = (cy as i32 + dy) as usize;
                img[y * width + x] = 255;
            }
        }
        img
    }

    #[test]
    fn test_invalid_threshold() {
        let mut cfg = test_config();
        cfg.threshold = 0;
        assert!(FastCornerDetector::new(&cfg).is_err());
        cfg.threshold = 200;
        assert!(FastCornerDetector::new(&cfg).is_err());
    }

    #[test]
    fn test_even_patch_size() {
        let mut cfg = test_config();
        cfg.patch_size = 8;
        assert!(FastCornerDetector::new(&cfg).is_err());
    }

    #[test]
    fn test_too_small_image() {
        let det = FastCornerDetector::new(&test_config()).unwrap();
        let result = det.detect(&uniform_image(6, 6), 6, 6);
        assert!(matches!(result, Err(FeatureError::ImageTooSmall { .. })));
    }

    #[test]
    fn test_data_length_mismatch() {
        let det = FastCornerDetector::new(&test_config()).unwrap();
        let result = det.detect(&vec![0u8; 50], 10, 10);
        assert!(matches!(
            result,
            Err(FeatureError::Core(CoreError::InvalidImageData { .. }))
        ));
    }

    #[test]
    fn test_uniform_image_has_no_corners() {
        let det = FastCornerDetector::new(&test_config()).unwrap();
        let kps = det.detect(&uniform_image(20, 20), 20, 20).unwrap();
        assert!(kps.is_empty());
    }

    #[test]
    fn test_bright_square_is_detected() {
        let det = FastCornerDetector::new(&test_config()).unwrap();
        let kps = det.detect(&corner_image(20, 20), 20, 20).unwrap();
        assert!(!kps.is_empty());
    }

    #[test]
    fn test_detection_is_deterministic() {
        let det = FastCornerDetector::new(&test_config()).unwrap();
        let img = corner_image(40, 40);
        let a = det.detect(&img, 40, 40).unwrap();
        let b = det.detect(&img, 40, 40).unwrap();
        assert_eq!(a.len(), b.len());
        for (ka, kb) in a.iter().zip(b.iter()) {
            assert_eq!((ka.x, ka.y, ka.angle), (kb.x, kb.y, kb.angle));
        }
    }

    #[test]
    fn test_suppression_enforces_min_distance() {
        let det = FastCornerDetector::new(&test_config()).unwrap();
        let kps = det.detect(&corner_image(30, 30), 30, 30).unwrap();
        for i in 0..kps.len() {
            for j in (i + 1)..kps.len() {
                let dx = kps[i].x - kps[j].x;
                let dy = kps[i].y - kps[j].y;
                assert!((dx * dx + dy * dy).sqrt() >= NMS_DISTANCE);
            }
        }
    }

    #[test]
    fn test_orientation_is_finite() {
        let det = FastCornerDetector::new(&test_config()).unwrap();
        let kps = det.detect(&corner_image(20, 20), 20, 20).unwrap();
        for kp in &kps {
            assert!(kp.angle.is_finite());
        }
    }
}
