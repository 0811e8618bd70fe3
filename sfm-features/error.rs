use sfm_core::CoreError;

#[derive(Debug, Clone)]
pub enum FeatureError {
    Core(CoreError),
    ImageTooSmall { width: usize, height: usize, min_size: usize },
}

impl std::fmt::Display for FeatureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureError::Core(e) => write!(f, "{}", e),
            FeatureError::ImageTooSmall { width, height, min_size } => {
                write!(f, "Image {}x{} too small (minimum {}x{})", width, height, min_size, min_size)
            }
        }
    }
}

impl std::error::Error for FeatureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FeatureError::Core(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CoreError> for FeatureError {
    fn from(err: CoreError) -> Self {
        FeatureError::Core(err)
    }
}

pub type FeatureResult<T> = Result<T, FeatureError>;
