use super::*;

/// Rotates the coordinate axes by `theta`, returning the coordinates of `r`
/// in the rotated frame. (Equivalently, rotates `r` by `-theta`.)
#[inline]
#[must_use]
pub fn rotate(r: &Vec2, theta: Float) -> Vec2 {
    let (s, c) = theta.sin_cos();
    rotate_sc(r, s, c)
}

/// Like [`rotate`], for when `sin(theta)` and `cos(theta)` are already known.
#[inline]
#[must_use]
pub fn rotate_sc(r: &Vec2, sin: Float, cos: Float) -> Vec2 {
    Vec2::new(cos * r.x + sin * r.y, -sin * r.x + cos * r.y)
}

/// Absolute comparison between `a` and `b`.
#[inline]
#[must_use]
pub fn is_close(a: Float, b: Float, atol: Float) -> bool {
    (a - b).abs() < atol
}

/// Like [`is_close`], component-wise.
#[inline]
#[must_use]
pub fn is_close_vec(a: &Vec2, b: &Vec2, atol: Float) -> bool {
    is_close(a.x, b.x, atol) && is_close(a.y, b.y, atol)
}

/// Pulls `v`'s norm back towards `1`.
///
/// Uses the first order expansion of `1/sqrt(x)` around `x = 1`, so `v`
/// must already be close to unit length. A direction that has drifted by
/// `e` ends up `O(e^2)` away from unit length.
#[inline]
pub fn renorm_unit_vec(v: &mut Vec2) {
    let x = v.norm_squared() - 1.0;
    *v *= 1.0 - x / 2.0;
}

/// `v` rotated by a quarter turn counter-clockwise.
#[inline]
#[must_use]
pub fn perp(v: &Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// The z coordinate of the 3D cross product of `a` and `b`.
#[inline]
#[must_use]
pub fn cross(a: &Vec2, b: &Vec2) -> Float {
    a.x * b.y - a.y * b.x
}

/// The unit vector making an angle `angle` (counter-clockwise) with the x axis.
#[inline]
#[must_use]
pub fn unit_vec(angle: Float) -> Vec2 {
    let (s, c) = angle.sin_cos();
    Vec2::new(c, s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn test_rotate_axes() {
        // rotating the axes by 90° puts the old x axis on the new -y axis
        let r = rotate(&Vec2::x(), FRAC_PI_2);
        assert!(is_close_vec(&r, &Vec2::new(0.0, -1.0), 1e-15));

        let r = rotate(&Vec2::new(1.0, 1.0), FRAC_PI_4);
        assert!(is_close_vec(&r, &Vec2::new(2.0f64.sqrt(), 0.0), 1e-15));
    }

    #[test]
    fn test_rotate_round_trip() {
        let p = Vec2::new(3.2, -1.7);
        let back = rotate(&rotate(&p, 0.83), -0.83);

        assert!(is_close_vec(&p, &back, 1e-14));
    }

    #[test]
    fn test_is_close() {
        assert!(is_close(1.0, 1.0 + 1e-9, 1e-8));
        assert!(!is_close(1.0, 1.0 + 1e-7, 1e-8));
        assert!(!is_close(0.0, 1e-8, 1e-8));
    }

    #[test]
    fn test_renorm_unit_vec() {
        let mut v = unit_vec(0.4) * (1.0 + 1e-6);
        renorm_unit_vec(&mut v);

        assert!((v.norm() - 1.0).abs() < 1e-11);
        assert!(is_close_vec(&v.normalize(), &unit_vec(0.4), 1e-14));

        let mut u = unit_vec(2.0);
        renorm_unit_vec(&mut u);
        assert!(is_close_vec(&u, &unit_vec(2.0), 1e-15));
    }

    #[test]
    fn test_renorm_counters_drift() {
        let mut v = unit_vec(1.1);

        // many reflections, each introducing a tiny relative error
        for _ in 0..10_000 {
            v *= 1.0 + 1e-10;
            renorm_unit_vec(&mut v);
        }

        assert!((v.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_perp_and_cross() {
        let a = Vec2::new(2.0, 1.0);

        assert_eq!(perp(&a), Vec2::new(-1.0, 2.0));
        assert_eq!(a.dot(&perp(&a)), 0.0);
        assert_eq!(cross(&Vec2::x(), &Vec2::y()), 1.0);
        assert_eq!(cross(&a, &a), 0.0);
    }
}
