use sfm_core::{Color, CoreError, ImageBuffer, Keypoint};

use crate::error::FeatureResult;

/// OpenCV-compatible normalization factor; channel values land in [0, 255/256].
const SCALE: f32 = 1.0 / 256.0;

/// Sample the normalized color under each keypoint from the *original* image
/// (never the canonicalized detection buffer), at its rounded pixel location.
///
/// The output has one entry per keypoint with the source's channel count.
/// Channel counts outside {3, 4} are a reported failure, not a silent skip.
pub fn sample_colors(keypoints: &[Keypoint], image: &ImageBuffer) -> FeatureResult<Vec<Color>> {
    let channels = image.channels();
    if channels != 3 && channels != 4 {
        return Err(CoreError::UnsupportedChannels(channels).into());
    }

    let max_x = (image.width() - 1) as f32;
    let max_y = (image.height() - 1) as f32;

    let colors = keypoints
        .iter()
        .map(|kp| {
            let x = kp.x.round().clamp(0.0, max_x) as usize;
            let y = kp.y.round().clamp(0.0, max_y) as usize;
            image.pixel(x, y).iter().map(|&v| v as f32 * SCALE).collect()
        })
        .collect();

    Ok(colors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeatureError;
    use proptest::prelude::*;

    fn kp(x: f32, y: f32) -> Keypoint {
        Keypoint { x, y, angle: 0.0 }
    }

    #[test]
    fn test_one_color_per_keypoint_with_source_channel_count() {
        let img = ImageBuffer::new(vec![128; 4 * 4 * 4], 4, 4, 4).unwrap();
        let colors = sample_colors(&[kp(1.0, 1.0), kp(2.0, 3.0)], &img).unwrap();
        assert_eq!(colors.len(), 2);
        assert!(colors.iter().all(|c| c.len() == 4));
    }

    #[test]
    fn test_values_are_scaled_by_256() {
        let img = ImageBuffer::new(vec![64, 128, 255], 1, 1, 3).unwrap();
        let colors = sample_colors(&[kp(0.0, 0.0)], &img).unwrap();
        assert_eq!(colors[0], vec![64.0 / 256.0, 128.0 / 256.0, 255.0 / 256.0]);
    }

    #[test]
    fn test_location_is_rounded() {
        // 2x1 image: pixel 0 is black, pixel 1 is white
        let img = ImageBuffer::new(vec![0, 0, 0, 255, 255, 255], 2, 1, 3).unwrap();
        let colors = sample_colors(&[kp(0.6, 0.0)], &img).unwrap();
        assert_eq!(colors[0], vec![255.0 / 256.0; 3]);
    }

    #[test]
    fn test_out_of_range_keypoints_clamp() {
        let img = ImageBuffer::new(vec![10; 2 * 2 * 3], 2, 2, 3).unwrap();
        let colors = sample_colors(&[kp(-3.0, 9.0)], &img).unwrap();
        assert_eq!(colors.len(), 1);
    }

    #[test]
    fn test_unsupported_channel_count_is_reported() {
        let img = ImageBuffer::new(vec![0; 4 * 4 * 2], 4, 4, 2).unwrap();
        let result = sample_colors(&[kp(1.0, 1.0)], &img);
        assert!(matches!(
            result,
            Err(FeatureError::Core(CoreError::UnsupportedChannels(2)))
        ));
    }

    proptest! {
        #[test]
        fn prop_colors_always_normalized(data in proptest::collection::vec(any::<u8>(), 48), x in 0.0f32..4.0, y in 0.0f32..4.0) {
            let img = ImageBuffer::new(data, 4, 4, 3).unwrap();
            let colors = sample_colors(&[kp(x, y)], &img).unwrap();
            for &v in &colors[0] {
                prop_assert!((0.0..1.0).contains(&v));
            }
        }
    }
}
