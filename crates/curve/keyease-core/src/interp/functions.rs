//! Interpolation helpers:
//! - lerp (linear segments)
//! - cubic_bezier / cubic_bezier_derivative (basis and slope)
//! - solve_bezier_parameter (Newton inversion of the time axis)
//! - bezier_segment (influence/speed eased segment)

use crate::ease::Ease;

/// Fixed Newton step count for inverting the bezier time axis.
pub const NEWTON_ITERATIONS: usize = 5;

/// Linear interpolation of scalars.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Cubic Bezier basis function
#[inline]
pub fn cubic_bezier(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

#[inline]
pub fn cubic_bezier_derivative(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    3.0 * u * u * (p1 - p0) + 6.0 * u * t * (p2 - p1) + 3.0 * t * t * (p3 - p2)
}

/// Find the curve parameter `u` whose x coordinate on the bezier
/// `(0, x1, x2, 1)` equals `x`.
///
/// Newton's method seeded at `u = x`, clamped to `[0, 1]` after every step.
/// A zero slope stops the iteration and keeps the current estimate.
pub fn solve_bezier_parameter(x1: f64, x2: f64, x: f64) -> f64 {
    let mut u = x;
    for _ in 0..NEWTON_ITERATIONS {
        let bx = cubic_bezier(0.0, x1, x2, 1.0, u);
        let dx = cubic_bezier_derivative(0.0, x1, x2, 1.0, u);
        if dx == 0.0 {
            break;
        }
        u -= (bx - x) / dx;
        u = u.clamp(0.0, 1.0);
    }
    u
}

/// Value of an eased bezier segment at absolute time `t`.
///
/// The handles come from `out_ease` of the left key and `in_ease` of the right
/// key. A non-positive segment duration returns `v0`.
pub fn bezier_segment(
    t0: f64,
    v0: f64,
    out_ease: &Ease,
    t1: f64,
    v1: f64,
    in_ease: &Ease,
    t: f64,
) -> f64 {
    let dt = t1 - t0;
    if dt <= 0.0 {
        return v0;
    }
    let local_t = (t - t0) / dt;

    let f_out = out_ease.fraction();
    let f_in = in_ease.fraction();

    let p1x = f_out;
    let p2x = 1.0 - f_in;

    // speed is value-per-second, so the handle height scales with dt
    let p1y = v0 + out_ease.speed * dt * f_out;
    let p2y = v1 - in_ease.speed * dt * f_in;

    let u = solve_bezier_parameter(p1x, p2x, local_t);
    cubic_bezier(v0, p1y, p2y, v1, u)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    #[test]
    fn basis_hits_endpoints() {
        approx(cubic_bezier(2.0, 5.0, -1.0, 7.0, 0.0), 2.0, 1e-12);
        approx(cubic_bezier(2.0, 5.0, -1.0, 7.0, 1.0), 7.0, 1e-12);
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let (p0, p1, p2, p3) = (0.0, 0.2, 0.9, 1.0);
        let h = 1e-6;
        for &t in &[0.1, 0.4, 0.75] {
            let fd = (cubic_bezier(p0, p1, p2, p3, t + h) - cubic_bezier(p0, p1, p2, p3, t - h))
                / (2.0 * h);
            approx(cubic_bezier_derivative(p0, p1, p2, p3, t), fd, 1e-6);
        }
    }

    #[test]
    fn newton_inverts_x_axis() {
        let (x1, x2) = (0.33, 0.67);
        for &x in &[0.1, 0.25, 0.5, 0.8] {
            let u = solve_bezier_parameter(x1, x2, x);
            approx(cubic_bezier(0.0, x1, x2, 1.0, u), x, 1e-6);
        }
    }

    #[test]
    fn newton_stays_in_unit_interval_for_degenerate_handles() {
        for &x in &[0.0, 0.01, 0.5, 0.99, 1.0] {
            let u = solve_bezier_parameter(0.0, 1.0, x);
            assert!((0.0..=1.0).contains(&u), "u={u}");
        }
    }

    #[test]
    fn zero_duration_segment_returns_left_value() {
        let e = Ease::DEFAULT;
        assert_eq!(bezier_segment(1.0, 3.0, &e, 1.0, 9.0, &e, 1.0), 3.0);
    }
}
