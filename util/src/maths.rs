//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp a value between a minimum and maximum.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float,
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Get the signed angular distance from `a` to `b`, wrapped into the range [-pi, pi].
///
/// This is the shortest rotation which takes `a` onto `b`.
pub fn get_ang_dist_pi<T>(a: T, b: T) -> T
where
    T: Float,
{
    let pi_t = T::from(std::f64::consts::PI).unwrap();
    let tau_t = T::from(std::f64::consts::TAU).unwrap();

    let d = rem_euclid(b - a + pi_t, tau_t) - pi_t;

    // rem_euclid may round up to tau, which would give +pi, keep that rather than -pi
    if d < -pi_t {
        d + tau_t
    } else {
        d
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Wrap a signed index onto a circular sequence of length `len`.
///
/// Negative indices count back from the end, so `-1` maps to `len - 1` and `len` maps to `0`.
///
/// # Panics
/// - If `len` is zero.
pub fn wrap_index(index: isize, len: usize) -> usize {
    assert!(len > 0, "Cannot wrap an index onto an empty sequence");

    let len = len as isize;
    let mut i = index % len;
    if i < 0 {
        i += len;
    }

    i as usize
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_ang_dist_pi() {
        const TAU: f64 = std::f64::consts::TAU;
        const PI: f64 = std::f64::consts::PI;

        assert_eq!(get_ang_dist_pi(1f64, 2f64), 1f64);
        assert_eq!(get_ang_dist_pi(2f64, 1f64), -1f64);
        assert!(get_ang_dist_pi(0f64, TAU).abs() < 1e-12);
        assert!((get_ang_dist_pi(0.1f64, TAU - 0.1) + 0.2).abs() < 1e-12);
        assert!((get_ang_dist_pi(-PI + 0.1, PI - 0.1) + 0.2).abs() < 1e-12);
        assert!((get_ang_dist_pi(0f64, 3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_rem_euclid() {
        assert_eq!(rem_euclid(7.0f64, 5.0), 2.0);
        assert_eq!(rem_euclid(-1.0f64, 5.0), 4.0);
        assert_eq!(rem_euclid(5.0f64, 5.0), 0.0);
    }

    #[test]
    fn test_wrap_index() {
        assert_eq!(wrap_index(0, 10), 0);
        assert_eq!(wrap_index(10, 10), 0);
        assert_eq!(wrap_index(11, 10), 1);
        assert_eq!(wrap_index(-1, 10), 9);
        assert_eq!(wrap_index(-5, 10), 5);
        assert_eq!(wrap_index(-10, 10), 0);
        assert_eq!(wrap_index(-21, 10), 9);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&5.0f64, &0.0, &1.0), 1.0);
        assert_eq!(clamp(&-5.0f64, &0.0, &1.0), 0.0);
        assert_eq!(clamp(&0.5f64, &0.0, &1.0), 0.5);
    }
}
