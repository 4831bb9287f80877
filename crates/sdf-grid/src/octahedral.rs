//! Octahedral packing of unit-length normals.
//!
//! A unit vector is projected onto the octahedron `|x| + |y| + |z| = 1`, the
//! lower hemisphere is folded onto the upper one, and the resulting square is
//! quantized to two bytes. This keeps the bulk normal array at 2 bytes per
//! voxel instead of 12.

use nalgebra::Vector3;

/// A unit-length direction packed into two bytes.
///
/// # Example
///
/// ```
/// use sdf_grid::Octahedron;
/// use nalgebra::Vector3;
///
/// let packed = Octahedron::encode(Vector3::new(0.0, 0.0, 1.0));
/// let normal = packed.decode();
/// assert!((normal.z - 1.0).abs() < 1e-2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Octahedron {
    /// Quantized octahedral U coordinate.
    pub x: u8,
    /// Quantized octahedral V coordinate.
    pub y: u8,
}

impl Octahedron {
    /// Sentinel for an unresolved (zero) normal.
    ///
    /// `(0, 0)` is unreachable by [`Octahedron::encode`] for any non-zero
    /// input: it would require both folded coordinates to be exactly -1,
    /// which the fold never produces.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Pack a direction. The input does not need to be unit length; a zero
    /// vector packs to [`Octahedron::ZERO`].
    #[must_use]
    pub fn encode(direction: Vector3<f32>) -> Self {
        let sum = direction.x.abs() + direction.y.abs() + direction.z.abs();
        if sum <= f32::EPSILON {
            return Self::ZERO;
        }

        let mut u = direction.x / sum;
        let mut v = direction.y / sum;
        if direction.z < 0.0 {
            // Fold the lower hemisphere across the diagonals
            let folded_u = (1.0 - v.abs()) * sign_not_zero(u);
            let folded_v = (1.0 - u.abs()) * sign_not_zero(v);
            u = folded_u;
            v = folded_v;
        }

        Self {
            x: quantize(u),
            y: quantize(v),
        }
    }

    /// Unpack to a unit vector. [`Octahedron::ZERO`] decodes to the zero
    /// vector.
    #[must_use]
    pub fn decode(self) -> Vector3<f32> {
        if self == Self::ZERO {
            return Vector3::zeros();
        }

        let u = f32::from(self.x) / 255.0 * 2.0 - 1.0;
        let v = f32::from(self.y) / 255.0 * 2.0 - 1.0;
        let z = 1.0 - u.abs() - v.abs();

        let (x, y) = if z < 0.0 {
            (
                (1.0 - v.abs()) * sign_not_zero(u),
                (1.0 - u.abs()) * sign_not_zero(v),
            )
        } else {
            (u, v)
        };

        Vector3::new(x, y, z)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }
}

fn sign_not_zero(value: f32) -> f32 {
    if value >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantize(value: f32) -> u8 {
    ((value * 0.5 + 0.5) * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn roundtrip(v: Vector3<f32>) -> Vector3<f32> {
        Octahedron::encode(v).decode()
    }

    #[test]
    fn axes_roundtrip() {
        for axis in [
            Vector3::x(),
            Vector3::y(),
            Vector3::z(),
            -Vector3::x(),
            -Vector3::y(),
            -Vector3::z(),
        ] {
            let decoded = roundtrip(axis);
            assert_relative_eq!(decoded.dot(&axis), 1.0, epsilon = 1e-2);
        }
    }

    #[test]
    fn diagonal_roundtrip() {
        let v = Vector3::new(1.0, 1.0, 1.0).normalize();
        let decoded = roundtrip(v);
        assert!(decoded.dot(&v) > 0.999);
    }

    #[test]
    fn lower_hemisphere_roundtrip() {
        let v = Vector3::new(0.3, -0.5, -0.8).normalize();
        let decoded = roundtrip(v);
        assert!(decoded.dot(&v) > 0.999);
    }

    #[test]
    fn zero_is_sentinel() {
        assert_eq!(Octahedron::encode(Vector3::zeros()), Octahedron::ZERO);
        assert_eq!(Octahedron::ZERO.decode(), Vector3::zeros());
    }

    #[test]
    fn non_unit_input_is_normalized() {
        let decoded = roundtrip(Vector3::new(0.0, 0.0, 10.0));
        assert_relative_eq!(decoded.norm(), 1.0, epsilon = 1e-5);
        assert!(decoded.z > 0.99);
    }

    #[test]
    fn decoded_is_unit_length() {
        let v = Vector3::new(-0.7, 0.2, 0.4).normalize();
        assert_relative_eq!(roundtrip(v).norm(), 1.0, epsilon = 1e-5);
    }
}
