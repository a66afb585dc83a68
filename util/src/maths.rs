//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use num_traits::Float;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Substitute magnitude used in [`angle_between_deg`] when one of the vectors
/// has zero length. Keeps the division defined; the resulting angle is
/// unreliable and callers must tolerate it.
const ZERO_MAGN_EPSILON: f64 = 0.01;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Clamp a value into the range `[min, max]`.
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

/// Get the signed angle between two vectors in degrees, in the range
/// [-180, 180].
///
/// The angle is computed from the dot product/magnitude cosine formula. The
/// sign follows the image-plane convention used by the seek controller: the
/// angle is negated when `v1`'s x component is less than `v2`'s, so that with
/// `v2` pointing "up" the image a target left of centre produces a negative
/// angle and a target right of centre a positive one.
///
/// If either vector has zero magnitude the denominator is substituted with a
/// small epsilon rather than dividing by zero. The returned angle is not
/// meaningful in that case (90 degrees for an exactly-zero `v1`) and callers
/// must tolerate it.
pub fn angle_between_deg(v1: &Vector2<f64>, v2: &Vector2<f64>) -> f64 {
    let dot = v1.dot(v2);

    let mut magn_product = v1.norm() * v2.norm();
    if magn_product == 0.0 {
        magn_product = ZERO_MAGN_EPSILON;
    }

    // Float error can push the quotient just outside acos's domain
    let cos_angle = clamp(&(dot / magn_product), &-1.0, &1.0);

    let angle_deg = cos_angle.acos().to_degrees();

    if v1[0] < v2[0] {
        -angle_deg
    } else {
        angle_deg
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&0.7, &-0.5, &0.5), 0.5);
        assert_eq!(clamp(&-0.7, &-0.5, &0.5), -0.5);
        assert_eq!(clamp(&0.2, &-0.5, &0.5), 0.2);
        assert_eq!(clamp(&-1.0, &-1.0, &1.0), -1.0);
    }

    #[test]
    fn test_angle_between_deg() {
        // Identical vectors have zero separation
        assert_eq!(
            angle_between_deg(&Vector2::new(3.0, 4.0), &Vector2::new(3.0, 4.0)),
            0.0
        );

        // Opposing vectors are a half turn apart, negated since v1.x < v2.x
        let angle = angle_between_deg(&Vector2::new(-1.0, 0.0), &Vector2::new(1.0, 0.0));
        assert!((angle + 180.0).abs() < 1e-9);

        // Target up-and-left of centre, forward pointing up: -45 degrees
        let angle = angle_between_deg(&Vector2::new(-50.0, -50.0), &Vector2::new(0.0, -100.0));
        assert!((angle + 45.0).abs() < 1e-9);

        // Mirrored to up-and-right: +45 degrees
        let angle = angle_between_deg(&Vector2::new(50.0, -50.0), &Vector2::new(0.0, -100.0));
        assert!((angle - 45.0).abs() < 1e-9);

        // Degenerate zero-magnitude input doesn't divide by zero
        let angle = angle_between_deg(&Vector2::new(0.0, 0.0), &Vector2::new(0.0, -100.0));
        assert!((angle - 90.0).abs() < 1e-9);
    }
}
