use crate::error::{CoreError, CoreResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// FAST corner detector settings shared by both descriptor variants.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectorConfig {
    /// FAST intensity threshold (1-127)
    pub threshold: u8,
    /// Side length of the orientation patch, odd
    pub patch_size: usize,
    pub n_threads: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: 20,
            patch_size: 15,
            n_threads: num_cpus::get().max(1),
        }
    }
}

/// Robust homography fitting settings.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RansacConfig {
    /// Pixel reprojection error below which a correspondence is an inlier
    pub reproj_threshold: f64,
    /// Desired probability of having sampled at least one all-inlier subset
    pub confidence: f64,
    /// Hard cap on sampling iterations
    pub max_iterations: usize,
    /// Fixed seed for reproducible sampling; `None` draws from entropy
    pub random_seed: Option<u64>,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            reproj_threshold: 3.0,
            confidence: 0.99,
            max_iterations: 1000,
            random_seed: None,
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PipelineConfig {
    pub detector: DetectorConfig,
    /// Images with fewer detected keypoints than this are discarded
    pub min_keypoints: usize,
    pub ransac: RansacConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self {
            detector: DetectorConfig::default(),
            min_keypoints: 10,
            ransac: RansacConfig::default(),
        }
    }

    /// Preset optimized for throughput: stricter corners, fewer RANSAC rounds.
    pub fn fast_preset() -> Self {
        Self {
            detector: DetectorConfig {
                threshold: 30,
                patch_size: 15,
                n_threads: num_cpus::get().max(1),
            },
            min_keypoints: 10,
            ransac: RansacConfig {
                max_iterations: 250,
                ..RansacConfig::default()
            },
        }
    }

    /// Preset optimized for match quality: permissive corners, deeper search.
    pub fn quality_preset() -> Self {
        Self {
            detector: DetectorConfig {
                threshold: 12,
                patch_size: 31,
                n_threads: num_cpus::get().max(1),
            },
            min_keypoints: 10,
            ransac: RansacConfig {
                max_iterations: 2000,
                ..RansacConfig::default()
            },
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> CoreResult<()> {
        if self.detector.threshold == 0 || self.detector.threshold > 127 {
            return Err(CoreError::InvalidThreshold(self.detector.threshold));
        }
        if self.detector.patch_size < 3 || self.detector.patch_size % 2 == 0 {
            return Err(CoreError::InvalidPatchSize { patch_size: self.detector.patch_size });
        }
        if !(self.ransac.reproj_threshold > 0.0) {
            return Err(CoreError::InvalidRansacParameter {
                name: "reproj_threshold",
                value: self.ransac.reproj_threshold,
            });
        }
        if !(self.ransac.confidence > 0.0 && self.ransac.confidence < 1.0) {
            return Err(CoreError::InvalidRansacParameter {
                name: "confidence",
                value: self.ransac.confidence,
            });
        }
        if self.ransac.max_iterations == 0 {
            return Err(CoreError::InvalidRansacParameter {
                name: "max_iterations",
                value: 0.0,
            });
        }
        Ok(())
    }

    /// Save configuration to JSON file
    #[cfg(feature = "serde")]
    pub fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load configuration from JSON file
    #[cfg(feature = "serde")]
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    #[cfg(feature = "serde")]
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Load configuration from TOML file
    #[cfg(feature = "serde")]
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PipelineConfig::new().validate().is_ok());
        assert!(PipelineConfig::fast_preset().validate().is_ok());
        assert!(PipelineConfig::quality_preset().validate().is_ok());
    }

    #[test]
    fn test_default_admission_threshold() {
        assert_eq!(PipelineConfig::new().min_keypoints, 10);
    }

    #[test]
    fn test_default_ransac_parameters() {
        let cfg = RansacConfig::default();
        assert_eq!(cfg.reproj_threshold, 3.0);
        assert_eq!(cfg.confidence, 0.99);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let mut cfg = PipelineConfig::new();
        cfg.detector.threshold = 0;
        assert!(matches!(cfg.validate(), Err(CoreError::InvalidThreshold(0))));
    }

    #[test]
    fn test_invalid_confidence_rejected() {
        let mut cfg = PipelineConfig::new();
        cfg.ransac.confidence = 1.5;
        assert!(matches!(
            cfg.validate(),
            Err(CoreError::InvalidRansacParameter { name: "confidence", .. })
        ));
    }

    #[test]
    fn test_even_patch_size_rejected() {
        let mut cfg = PipelineConfig::new();
        cfg.detector.patch_size = 16;
        assert!(matches!(cfg.validate(), Err(CoreError::InvalidPatchSize { .. })));
    }
}
