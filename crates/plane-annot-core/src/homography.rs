//! Planar homography estimation from four point correspondences.

use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};

use crate::frame::{sample_bilinear_u8, GrayFrame, GrayFrameView};

/// 3x3 projective transform acting on 2D pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        Point2::new((v[0] / v[2]) as f32, (v[1] / v[2]) as f32)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }
}

/// Similarity that moves `pts` to their centroid and scales the mean distance
/// to sqrt(2) (Hartley conditioning).
fn conditioning_transform(pts: &[Point2<f32>; 4]) -> Matrix3<f64> {
    let mut cx = 0.0_f64;
    let mut cy = 0.0_f64;
    for p in pts {
        cx += p.x as f64;
        cy += p.y as f64;
    }
    cx /= 4.0;
    cy /= 4.0;

    let mut mean_dist = 0.0_f64;
    for p in pts {
        mean_dist += ((p.x as f64 - cx).hypot(p.y as f64 - cy)) / 4.0;
    }

    let s = if mean_dist > 1e-12 {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };
    Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0)
}

fn condition(pts: &[Point2<f32>; 4], t: &Matrix3<f64>) -> [Point2<f64>; 4] {
    let mut out = [Point2::new(0.0_f64, 0.0); 4];
    for (o, p) in out.iter_mut().zip(pts) {
        let v = t * Vector3::new(p.x as f64, p.y as f64, 1.0);
        *o = Point2::new(v[0], v[1]);
    }
    out
}

/// Compute H such that `dst ~ H * src` from four point correspondences.
///
/// Corner order must be consistent between `src` and `dst`. Returns `None`
/// when the correspondences are degenerate (collinear or coincident points
/// leave the 8x8 system singular).
pub fn homography_from_corners(
    src: &[Point2<f32>; 4],
    dst: &[Point2<f32>; 4],
) -> Option<Homography> {
    let t_src = conditioning_transform(src);
    let t_dst = conditioning_transform(dst);
    let s = condition(src, &t_src);
    let d = condition(dst, &t_dst);

    // Fix h33 = 1 and solve the remaining 8 unknowns; each correspondence
    // (x,y) -> (u,v) contributes
    //   h11 x + h12 y + h13 - u h31 x - u h32 y = u
    //   h21 x + h22 y + h23 - v h31 x - v h32 y = v
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();
    for k in 0..4 {
        let (x, y) = (s[k].x, s[k].y);
        let (u, v) = (d[k].x, d[k].y);

        a[(2 * k, 0)] = x;
        a[(2 * k, 1)] = y;
        a[(2 * k, 2)] = 1.0;
        a[(2 * k, 6)] = -u * x;
        a[(2 * k, 7)] = -u * y;
        b[2 * k] = u;

        a[(2 * k + 1, 3)] = x;
        a[(2 * k + 1, 4)] = y;
        a[(2 * k + 1, 5)] = 1.0;
        a[(2 * k + 1, 6)] = -v * x;
        a[(2 * k + 1, 7)] = -v * y;
        b[2 * k + 1] = v;
    }

    let x = a.lu().solve(&b)?;
    let hn = Matrix3::new(x[0], x[1], x[2], x[3], x[4], x[5], x[6], x[7], 1.0);

    // Undo conditioning: H = T_dst^-1 * Hn * T_src, scaled so h33 = 1.
    let h = t_dst.try_inverse()? * hn * t_src;
    let scale = h[(2, 2)];
    if scale.abs() < 1e-12 {
        return None;
    }
    Some(Homography::new(h / scale))
}

/// Resample `src` through `h_img_from_rect`: every output pixel `(x, y)` is
/// read from the source at `H * (x, y)` with bilinear interpolation.
pub fn warp_perspective(
    src: &GrayFrameView<'_>,
    h_img_from_rect: &Homography,
    out_w: usize,
    out_h: usize,
) -> GrayFrame {
    let mut out = GrayFrame::new(out_w, out_h);
    for y in 0..out_h {
        for x in 0..out_w {
            let p = h_img_from_rect.apply(Point2::new(x as f32, y as f32));
            out.data[y * out_w + x] = sample_bilinear_u8(src, p.x, p.y);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_close(a: Point2<f32>, b: Point2<f32>, tol: f32) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = tol);
        assert_abs_diff_eq!(a.y, b.y, epsilon = tol);
    }

    #[test]
    fn maps_the_four_correspondences_exactly() {
        let src = [
            Point2::new(100.0_f32, 50.0),
            Point2::new(500.0, 60.0),
            Point2::new(480.0, 400.0),
            Point2::new(90.0, 380.0),
        ];
        let dst = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(399.0, 0.0),
            Point2::new(399.0, 339.0),
            Point2::new(0.0, 339.0),
        ];
        let h = homography_from_corners(&src, &dst).expect("solvable");
        for (s, d) in src.iter().zip(&dst) {
            assert_close(h.apply(*s), *d, 1e-2);
        }
    }

    #[test]
    fn inverse_round_trips_points() {
        let h = Homography::new(Matrix3::new(
            1.1, 0.05, 12.0, //
            -0.03, 0.95, 4.0, //
            0.0008, 0.0003, 1.0,
        ));
        let inv = h.inverse().expect("invertible");
        for p in [
            Point2::new(0.0_f32, 0.0),
            Point2::new(240.0, 130.0),
            Point2::new(-30.0, 80.0),
        ] {
            assert_close(inv.apply(h.apply(p)), p, 1e-3);
        }
    }

    #[test]
    fn warp_identity_preserves_pixels() {
        let mut frame = GrayFrame::new(4, 3);
        for (i, px) in frame.data.iter_mut().enumerate() {
            *px = (i * 17 % 251) as u8;
        }
        let id = Homography::new(Matrix3::identity());
        let out = warp_perspective(&frame.view(), &id, 4, 3);
        assert_eq!(out.data, frame.data);
    }
}
