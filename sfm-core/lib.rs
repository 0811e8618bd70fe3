mod config;
mod error;
mod features;
mod image;

pub use config::{DetectorConfig, PipelineConfig, RansacConfig};
pub use error::{CoreError, CoreResult};
pub use features::{
    BinaryDescriptor, Color, Correspondence, DescriptorSet, DistanceMetric, ImageFeatureSet,
    Keypoint, MatchResult,
};
pub use image::ImageBuffer;

/// Initialize Rayon thread pool with the specified number of threads
pub fn init_thread_pool(n_threads: usize) -> Result<(), rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
}
