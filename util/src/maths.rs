//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Map a value from one range into another.
///
/// A degenerate source range maps every value onto the start of the target
/// range.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    if source_range.1 == source_range.0 {
        return target_range.0;
    }

    target_range.0
        + ((value - source_range.0) * (target_range.1 - target_range.0)
            / (source_range.1 - source_range.0))
}

/// Evaluate a polynomial at `value`.
///
/// Coefficients are given lowest order first, so `[a, b, c, d]` evaluates
/// `a + b*x + c*x^2 + d*x^3`.
pub fn poly_val<T>(value: T, coeffs: &[T]) -> T
where
    T: Float,
{
    coeffs
        .iter()
        .rev()
        .fold(T::zero(), |acc, &c| acc * value + c)
}

/// Evaluate the first derivative of a polynomial at `value`.
///
/// Coefficients are given lowest order first, as in [`poly_val`].
pub fn poly_deriv_val<T>(value: T, coeffs: &[T]) -> T
where
    T: Float,
{
    let mut res = T::zero();
    let mut power = T::one();

    for (i, &c) in coeffs.iter().enumerate().skip(1) {
        res = res + T::from(i).unwrap_or_else(T::zero) * c * power;
        power = power * value;
    }

    res
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in
/// magnitude and `lhs < 0.0`.
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

/// Wrap an angle into the range (-pi, pi].
pub fn wrap_pi<T>(value: T) -> T
where
    T: Float,
{
    let pi_t = T::from(std::f64::consts::PI).unwrap_or_else(T::zero);
    let tau_t = pi_t + pi_t;

    // rem_euclid gives [0, 2pi), shifting by pi first gives [-pi, pi)
    let wrapped = rem_euclid(value + pi_t, tau_t) - pi_t;

    if wrapped <= -pi_t {
        wrapped + tau_t
    } else {
        wrapped
    }
}

/// Get the signed angular distance from `a` to `b`, in the range (-pi, pi].
pub fn get_ang_dist_pi<T>(a: T, b: T) -> T
where
    T: Float,
{
    wrap_pi(b - a)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
