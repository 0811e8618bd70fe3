/// Bilinear interpolation for subpixel sampling of a luma plane.
pub(crate) fn bilinear_sample(img: &[u8], w: usize, h: usize, x: f32, y: f32) -> f32 {
    let x0 = x.floor();
    let y0 = y.floor();
    let x1 = x0 + 1.0;
    let y1 = y0 + 1.0;

    // Clamp to image bounds for boundary samples
    if x0 < 0.0 || y0 < 0.0 || x1 >= w as f32 || y1 >= h as f32 {
        let cx = x.round().clamp(0.0, (w - 1) as f32) as usize;
        let cy = y.round().clamp(0.0, (h - 1) as f32) as usize;
        return img[cy * w + cx] as f32;
    }

    let dx = x - x0;
    let dy = y - y0;

    let x0_idx = x0 as usize;
    let y0_idx = y0 as usize;
    let x1_idx = (x1 as usize).min(w - 1);
    let y1_idx = (y1 as usize).min(h - 1);

    let p00 = img[y0_idx * w + x0_idx] as f32;
    let p10 = img[y0_idx * w + x1_idx] as f32;
    let p01 = img[y1_idx * w + x0_idx] as f32;
    let p11 = img[y1_idx * w + x1_idx] as f32;

    let top = p00 * (1.0 - dx) + p10 * dx;
    let bottom = p01 * (1.0 - dx) + p11 * dx;

    top * (1.0 - dy) + bottom * dy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_coordinates_return_pixel_values() {
        let img = vec![0, 50, 100, 150];
        assert_eq!(bilinear_sample(&img, 2, 2, 0.0, 0.0), 0.0);
        assert_eq!(bilinear_sample(&img, 2, 2, 1.0, 1.0), 150.0);
    }

    #[test]
    fn test_midpoint_interpolates() {
        let img = vec![0, 100, 0, 100];
        let v = bilinear_sample(&img, 2, 2, 0.5, 0.5);
        assert!((v - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_out_of_bounds_clamps() {
        let img = vec![10, 20, 30, 40];
        let v = bilinear_sample(&img, 2, 2, -5.0, -5.0);
        assert_eq!(v, 10.0);
    }
}
