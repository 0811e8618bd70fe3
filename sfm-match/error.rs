#[derive(Debug, Clone)]
pub enum MatchError {
    DescriptorMismatch { query: &'static str, train: &'static str },
    DimensionMismatch { query_dim: usize, train_dim: usize },
    EmptyTrainSet,
    InsufficientCorrespondences { required: usize, actual: usize },
    DegenerateConfiguration,
    NoConsensus { iterations: usize },
    CorrespondenceOutOfRange { index: usize, len: usize },
}

impl std::fmt::Display for MatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchError::DescriptorMismatch { query, train } => {
                write!(f, "Cannot match {} descriptors against {} descriptors", query, train)
            }
            MatchError::DimensionMismatch { query_dim, train_dim } => {
                write!(f, "Float descriptor dimensions differ: query {}, train {}", query_dim, train_dim)
            }
            MatchError::EmptyTrainSet => {
                write!(f, "Train descriptor set is empty, no nearest neighbor exists")
            }
            MatchError::InsufficientCorrespondences { required, actual } => {
                write!(f, "Insufficient correspondences: need {}, got {}", required, actual)
            }
            MatchError::DegenerateConfiguration => {
                write!(f, "Point configuration is degenerate, homography is not defined")
            }
            MatchError::NoConsensus { iterations } => {
                write!(f, "RANSAC found no consensus after {} iterations", iterations)
            }
            MatchError::CorrespondenceOutOfRange { index, len } => {
                write!(f, "Correspondence index {} out of range for {} keypoints", index, len)
            }
        }
    }
}

impl std::error::Error for MatchError {}

pub type MatchingResult<T> = Result<T, MatchError>;
