#[derive(Debug, Clone)]
pub enum CoreError {
    InvalidImageSize { width: usize, height: usize },
    InvalidImageData { expected_len: usize, actual_len: usize },
    UnsupportedChannels(usize),
    MisalignedFeatureSet { keypoints: usize, descriptors: usize, colors: usize },
    InvalidThreshold(u8),
    InvalidPatchSize { patch_size: usize },
    InvalidRansacParameter { name: &'static str, value: f64 },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreError::InvalidImageSize { width, height } => {
                write!(f, "Invalid image dimensions: {}x{} (must be > 0)", width, height)
            }
            CoreError::InvalidImageData { expected_len, actual_len } => {
                write!(f, "Image data length mismatch: expected {}, got {}", expected_len, actual_len)
            }
            CoreError::UnsupportedChannels(c) => {
                write!(f, "Unsupported channel count: {} (must be 3 or 4)", c)
            }
            CoreError::MisalignedFeatureSet { keypoints, descriptors, colors } => {
                write!(
                    f,
                    "Feature set misaligned: {} keypoints, {} descriptors, {} colors",
                    keypoints, descriptors, colors
                )
            }
            CoreError::InvalidThreshold(t) => {
                write!(f, "Invalid corner threshold: {} (must be 1-127)", t)
            }
            CoreError::InvalidPatchSize { patch_size } => {
                write!(f, "Invalid patch size: {} (must be odd and > 1)", patch_size)
            }
            CoreError::InvalidRansacParameter { name, value } => {
                write!(f, "Invalid RANSAC parameter {}: {}", name, value)
            }
        }
    }
}

impl std::error::Error for CoreError {}

pub type CoreResult<T> = Result<T, CoreError>;
