use nalgebra::{DMatrix, Matrix3, Vector3};

use crate::error::{MatchError, MatchingResult};

/// A homography has 8 degrees of freedom; 4 point pairs pin it down.
pub const MIN_CORRESPONDENCES: usize = 4;

/// Estimate the homography mapping `src` points onto `dst` points with the
/// normalized direct linear transform.
///
/// Works for the minimal 4-point sample and, in the overdetermined case,
/// returns the least-squares fit. Collinear or otherwise degenerate
/// configurations are a reported error, never a garbage matrix.
pub fn estimate_homography(src: &[[f64; 2]], dst: &[[f64; 2]]) -> MatchingResult<Matrix3<f64>> {
    let n = src.len().min(dst.len());
    if n < MIN_CORRESPONDENCES {
        return Err(MatchError::InsufficientCorrespondences {
            required: MIN_CORRESPONDENCES,
            actual: n,
        });
    }

    // Hartley normalization keeps the linear system well conditioned
    let (src_n, t1) = normalize_points(&src[..n])?;
    let (dst_n, t2) = normalize_points(&dst[..n])?;

    // Two rows per correspondence. Padding with zero rows up to 9 keeps the
    // null-space singular vector in the thin SVD for the minimal sample.
    let rows = (2 * n).max(9);
    let mut a = DMatrix::<f64>::zeros(rows, 9);
    for i in 0..n {
        let [x, y] = src_n[i];
        let [u, v] = dst_n[i];
        let r0 = 2 * i;
        let r1 = r0 + 1;

        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -u * x;
        a[(r0, 7)] = -u * y;
        a[(r0, 8)] = -u;

        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -v * x;
        a[(r1, 7)] = -v * y;
        a[(r1, 8)] = -v;
    }

    let svd = a.svd(true, true);
    let v_t = svd.v_t.ok_or(MatchError::DegenerateConfiguration)?;
    let hv = v_t.row(v_t.nrows() - 1);

    let h_norm = Matrix3::new(
        hv[(0, 0)], hv[(0, 1)], hv[(0, 2)],
        hv[(0, 3)], hv[(0, 4)], hv[(0, 5)],
        hv[(0, 6)], hv[(0, 7)], hv[(0, 8)],
    );

    let t2_inv = t2.try_inverse().ok_or(MatchError::DegenerateConfiguration)?;
    let mut h = t2_inv * h_norm * t1;

    // Fix the projective scale
    if h[(2, 2)].abs() > 1e-12 {
        h /= h[(2, 2)];
    } else {
        h /= h.norm();
    }

    if h.determinant().abs() < 1e-10 {
        return Err(MatchError::DegenerateConfiguration);
    }

    Ok(h)
}

/// Euclidean distance between `H * src` and `dst` in pixel units.
///
/// Points mapped to infinity (vanishing homogeneous coordinate) report an
/// infinite error and therefore never classify as inliers.
pub fn reprojection_error(h: &Matrix3<f64>, src: &[f64; 2], dst: &[f64; 2]) -> f64 {
    let p = h * Vector3::new(src[0], src[1], 1.0);
    if p[2].abs() <= 1e-12 {
        return f64::INFINITY;
    }
    let du = p[0] / p[2] - dst[0];
    let dv = p[1] / p[2] - dst[1];
    (du * du + dv * dv).sqrt()
}

/// Translate-to-centroid, scale-to-mean-distance-√2 normalization (Hartley).
fn normalize_points(pts: &[[f64; 2]]) -> MatchingResult<(Vec<[f64; 2]>, Matrix3<f64>)> {
    let n = pts.len() as f64;
    let mx = pts.iter().map(|p| p[0]).sum::<f64>() / n;
    let my = pts.iter().map(|p| p[1]).sum::<f64>() / n;
    let mean_dist = pts
        .iter()
        .map(|p| ((p[0] - mx).powi(2) + (p[1] - my).powi(2)).sqrt())
        .sum::<f64>()
        / n;

    // All points coincident: no homography can be determined
    if mean_dist <= 1e-12 {
        return Err(MatchError::DegenerateConfiguration);
    }

    let s = std::f64::consts::SQRT_2 / mean_dist;
    let t = Matrix3::new(s, 0.0, -s * mx, 0.0, s, -s * my, 0.0, 0.0, 1.0);
    let out = pts.iter().map(|p| [s * (p[0] - mx), s * (p[1] - my)]).collect();
    Ok((out, t))
}
