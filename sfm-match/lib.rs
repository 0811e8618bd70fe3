//! Descriptor matching and robust geometric filtering.
//!
//! Brute-force nearest-neighbour matching over binary (Hamming) or float
//! (Euclidean) descriptor sets, followed by RANSAC homography estimation to
//! discard geometrically inconsistent correspondences.

pub mod error;
pub mod homography;
pub mod matcher;
pub mod ransac;

pub use error::{MatchError, MatchingResult};
pub use homography::{estimate_homography, reprojection_error, MIN_CORRESPONDENCES};
pub use matcher::{euclidean_distance, hamming_distance, match_descriptors};
pub use ransac::filter_matches;
