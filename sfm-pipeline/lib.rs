//! Batch orchestration: extract features from many images in parallel, then
//! match image pairs and keep only geometrically consistent correspondences.

use rayon::prelude::*;

use sfm_core::{
    init_thread_pool, CoreError, ImageBuffer, ImageFeatureSet, MatchResult, PipelineConfig,
};
use sfm_features::{extract, FeatureError, KeypointDetector, OrbDetector};
use sfm_match::{filter_matches, match_descriptors, MatchError};

pub use sfm_core;
pub use sfm_features;
pub use sfm_match;

#[derive(Debug)]
pub enum PipelineError {
    Core(CoreError),
    Feature(FeatureError),
    Match(MatchError),
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Core(e) => write!(f, "Core error: {}", e),
            PipelineError::Feature(e) => write!(f, "Feature extraction error: {}", e),
            PipelineError::Match(e) => write!(f, "Matching error: {}", e),
            PipelineError::ThreadPool(e) => write!(f, "Thread pool error: {}", e),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Core(e) => Some(e),
            PipelineError::Feature(e) => Some(e),
            PipelineError::Match(e) => Some(e),
            PipelineError::ThreadPool(e) => Some(e),
        }
    }
}

impl From<CoreError> for PipelineError {
    fn from(err: CoreError) -> Self {
        PipelineError::Core(err)
    }
}

impl From<FeatureError> for PipelineError {
    fn from(err: FeatureError) -> Self {
        PipelineError::Feature(err)
    }
}

impl From<MatchError> for PipelineError {
    fn from(err: MatchError) -> Self {
        PipelineError::Match(err)
    }
}

impl From<rayon::ThreadPoolBuildError> for PipelineError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        PipelineError::ThreadPool(err)
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// High-level front end combining detection, color sampling, matching and
/// robust filtering behind one configuration.
pub struct FeaturePipeline {
    detector: Box<dyn KeypointDetector>,
    config: PipelineConfig,
}

impl FeaturePipeline {
    /// Build a pipeline with the default ORB-style detector.
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        let detector = Box::new(OrbDetector::new(&config.detector)?);
        Self::with_detector(config, detector)
    }

    /// Build a pipeline around a caller-supplied detector.
    pub fn with_detector(
        config: PipelineConfig,
        detector: Box<dyn KeypointDetector>,
    ) -> PipelineResult<Self> {
        config.validate()?;
        // The global pool can only be configured once per process; later
        // pipelines keep whatever pool is already in place.
        if init_thread_pool(config.detector.n_threads).is_err() {
            log::debug!("thread pool already initialized, keeping existing configuration");
        }
        Ok(Self { detector, config })
    }

    /// Extract feature sets for a batch of images in parallel.
    ///
    /// Images that fail extraction or yield fewer than the configured minimum
    /// number of keypoints are dropped; the surviving sets keep the input
    /// order. A failure on one image never aborts the batch.
    pub fn extract_all(&self, images: &[ImageBuffer]) -> Vec<ImageFeatureSet> {
        images
            .par_iter()
            .enumerate()
            .filter_map(|(idx, image)| match extract(self.detector.as_ref(), image) {
                Ok(set) => {
                    if set.len() < self.config.min_keypoints {
                        log::debug!(
                            "image {}: {} keypoints below minimum {}, discarded",
                            idx,
                            set.len(),
                            self.config.min_keypoints
                        );
                        None
                    } else {
                        Some(set)
                    }
                }
                Err(e) => {
                    log::warn!("image {}: extraction failed: {}", idx, e);
                    None
                }
            })
            .collect()
    }

    /// Match two feature sets and filter the correspondences with RANSAC.
    pub fn match_pair(
        &self,
        query: &ImageFeatureSet,
        train: &ImageFeatureSet,
    ) -> PipelineResult<MatchResult> {
        let candidates = match_descriptors(query.descriptors(), train.descriptors())?;
        let result = filter_matches(
            &candidates,
            query.keypoints(),
            train.keypoints(),
            &self.config.ransac,
        )?;
        log::debug!(
            "matched pair: {} candidates, {} inliers",
            candidates.len(),
            result.matches.len()
        );
        Ok(result)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfm_core::DetectorConfig;

    fn test_config() -> PipelineConfig {
        PipelineConfig {
            detector: DetectorConfig {
                threshold: 20,
                patch_size: 5,
                n_threads: 1,
            },
            ..PipelineConfig::new()
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut cfg = test_config();
        cfg.ransac.confidence = 2.0;
        assert!(FeaturePipeline::new(cfg).is_err());
    }

    #[test]
    fn test_empty_batch() {
        let pipeline = FeaturePipeline::new(test_config()).unwrap();
        assert!(pipeline.extract_all(&[]).is_empty());
    }
}
