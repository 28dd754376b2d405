//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// This function is taken from the std library as num is missing it.
///
/// Due to floating point round-off the result can equal `rhs.abs()` when `lhs` is a very small
/// negative number.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Wrap an angle in degrees into the range [0, 360).
pub fn wrap_deg_360<T>(angle_deg: T) -> T
where
    T: Float
{
    let full: T = T::from(360.0).unwrap();
    let r = rem_euclid(angle_deg, full);

    // Round-off can land exactly on 360
    if r >= full { T::zero() } else { r }
}

/// Get the signed shortest angular distance in degrees to travel from `from_deg` to `to_deg`.
///
/// The result is in the range (-180, 180], so a half turn is always reported as positive.
pub fn get_ang_dist_deg<T>(from_deg: T, to_deg: T) -> T
where
    T: Float
{
    let half: T = T::from(180.0).unwrap();
    let full: T = T::from(360.0).unwrap();

    let d = rem_euclid(to_deg - from_deg + half, full) - half;

    if d <= -half { d + full } else { d }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_ang_dist_deg() {
        assert_eq!(get_ang_dist_deg(0f64, 90f64), 90f64);
        assert_eq!(get_ang_dist_deg(90f64, 0f64), -90f64);
        assert_eq!(get_ang_dist_deg(350f64, 10f64), 20f64);
        assert_eq!(get_ang_dist_deg(10f64, 350f64), -20f64);
        assert_eq!(get_ang_dist_deg(0f64, 360f64), 0f64);
        assert_eq!(get_ang_dist_deg(0f64, 180f64), 180f64);
        assert_eq!(get_ang_dist_deg(180f64, 0f64), 180f64);
        assert_eq!(get_ang_dist_deg(0f64, -180f64), 180f64);
    }

    #[test]
    fn test_wrap_deg_360() {
        assert_eq!(wrap_deg_360(370f64), 10f64);
        assert_eq!(wrap_deg_360(-90f64), 270f64);
        assert_eq!(wrap_deg_360(360f64), 0f64);
        assert_eq!(wrap_deg_360(0f64), 0f64);
    }
}
