mod brief;
mod color;
mod corners;
mod error;
mod patch;
mod sampling;

pub use color::sample_colors;
pub use error::{FeatureError, FeatureResult};

use brief::BriefDescriptor;
use corners::FastCornerDetector;
use patch::PatchDescriptor;
use sfm_core::{DescriptorSet, DetectorConfig, ImageBuffer, ImageFeatureSet, Keypoint};

/// A keypoint detector paired with its descriptor, behind one seam so the
/// pipeline is agnostic to the descriptor representation (binary vs. float).
///
/// Implementations must be deterministic for identical pixels and config, and
/// must return exactly one descriptor per keypoint, in keypoint order.
pub trait KeypointDetector: Send + Sync {
    fn detect(&self, image: &ImageBuffer) -> FeatureResult<(Vec<Keypoint>, DescriptorSet)>;
}

/// FAST corners + rotated BRIEF: 32-byte binary descriptors, Hamming metric.
pub struct OrbDetector {
    corners: FastCornerDetector,
    brief: BriefDescriptor,
}

impl OrbDetector {
    pub fn new(cfg: &DetectorConfig) -> FeatureResult<Self> {
        Ok(Self {
            corners: FastCornerDetector::new(cfg)?,
            brief: BriefDescriptor::new(),
        })
    }
}

impl KeypointDetector for OrbDetector {
    fn detect(&self, image: &ImageBuffer) -> FeatureResult<(Vec<Keypoint>, DescriptorSet)> {
        // Detection always runs on the canonical buffer, never the original
        let bgr = image.to_bgr()?;
        let luma = bgr.to_luma()?;
        let kps = self.corners.detect(&luma, bgr.width(), bgr.height())?;
        let desc = self.brief.describe(&luma, bgr.width(), bgr.height(), &kps);
        Ok((kps, DescriptorSet::Binary(desc)))
    }
}

/// FAST corners + normalized intensity patch: 64-dim float descriptors,
/// Euclidean metric.
pub struct PatchDetector {
    corners: FastCornerDetector,
    patch: PatchDescriptor,
}

impl PatchDetector {
    pub fn new(cfg: &DetectorConfig) -> FeatureResult<Self> {
        Ok(Self {
            corners: FastCornerDetector::new(cfg)?,
            patch: PatchDescriptor::new(),
        })
    }
}

impl KeypointDetector for PatchDetector {
    fn detect(&self, image: &ImageBuffer) -> FeatureResult<(Vec<Keypoint>, DescriptorSet)> {
        let bgr = image.to_bgr()?;
        let luma = bgr.to_luma()?;
        let kps = self.corners.detect(&luma, bgr.width(), bgr.height())?;
        let desc = self.patch.describe(&luma, bgr.width(), bgr.height(), &kps);
        Ok((kps, DescriptorSet::Float(desc)))
    }
}

/// Run detection and color sampling for one image and assemble the aligned
/// feature set. Colors come from the untouched original buffer.
pub fn extract<D: KeypointDetector + ?Sized>(
    detector: &D,
    image: &ImageBuffer,
) -> FeatureResult<ImageFeatureSet> {
    let (keypoints, descriptors) = detector.detect(image)?;
    let colors = sample_colors(&keypoints, image)?;
    Ok(ImageFeatureSet::new(keypoints, descriptors, colors)?)
}
