use nalgebra::Matrix3;

use crate::error::{CoreError, CoreResult};

/// Key-point = corner location (pixel precision) + orientation (radians)
#[derive(Debug, Clone, Copy)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

/// 256-bit binary descriptor = 32 bytes
pub type BinaryDescriptor = [u8; 32];

/// Normalized color sample at a keypoint, one entry per source channel
pub type Color = Vec<f32>;

/// Distance metric implied by the descriptor representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    Hamming,
    Euclidean,
}

/// Descriptors of one image, in keypoint order.
///
/// Binary descriptors are compared by Hamming distance, float descriptors by
/// Euclidean distance. The two representations never mix within one image.
#[derive(Debug, Clone)]
pub enum DescriptorSet {
    Binary(Vec<BinaryDescriptor>),
    Float(Vec<Vec<f32>>),
}

impl DescriptorSet {
    pub fn len(&self) -> usize {
        match self {
            DescriptorSet::Binary(d) => d.len(),
            DescriptorSet::Float(d) => d.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn metric(&self) -> DistanceMetric {
        match self {
            DescriptorSet::Binary(_) => DistanceMetric::Hamming,
            DescriptorSet::Float(_) => DistanceMetric::Euclidean,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            DescriptorSet::Binary(_) => "binary",
            DescriptorSet::Float(_) => "float",
        }
    }
}

/// Per-image bundle of keypoints, descriptors and colors, joined by index.
///
/// The three sequences are aligned: entry `i` of each belongs to keypoint `i`.
/// The constructor enforces this, and the set is never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ImageFeatureSet {
    keypoints: Vec<Keypoint>,
    descriptors: DescriptorSet,
    colors: Vec<Color>,
}

impl ImageFeatureSet {
    pub fn new(
        keypoints: Vec<Keypoint>,
        descriptors: DescriptorSet,
        colors: Vec<Color>,
    ) -> CoreResult<Self> {
        if keypoints.len() != descriptors.len() || keypoints.len() != colors.len() {
            return Err(CoreError::MisalignedFeatureSet {
                keypoints: keypoints.len(),
                descriptors: descriptors.len(),
                colors: colors.len(),
            });
        }
        Ok(Self { keypoints, descriptors, colors })
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    pub fn descriptors(&self) -> &DescriptorSet {
        &self.descriptors
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}

/// Candidate or surviving correspondence between two images.
///
/// `query_idx` indexes the first image's keypoints, `train_idx` the second's.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correspondence {
    pub query_idx: usize,
    pub train_idx: usize,
    pub distance: f32,
}

/// Outcome of robust geometric filtering for one image pair.
///
/// `matches` holds only inlier correspondences, in their original relative
/// order. `inlier_mask` is aligned with the candidate list the filter was
/// given. Created once per pair, immutable thereafter.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub matches: Vec<Correspondence>,
    pub homography: Matrix3<f64>,
    pub inlier_mask: Vec<bool>,
}
