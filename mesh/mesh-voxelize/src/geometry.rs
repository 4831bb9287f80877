//! Robust geometric primitives used by the scan-conversion voxelizer.
//!
//! The 2D predicates run in `f64` with a simulation-of-simplicity tie-break
//! so that a lattice point exactly on a shared triangle edge is claimed by
//! exactly one of the two triangles. Without this, intersection parity breaks
//! and entire voxel columns flip sign.

use nalgebra::{Point3, Vector2};

/// Orientation of the triangle `(origin, a, b)`.
///
/// Returns the sign (`1`, `-1`, or `0` only for exactly coincident points)
/// and twice the signed area. Zero-area configurations are perturbed to a
/// consistent non-zero sign based on lexicographic order, so two triangles
/// sharing an edge never both claim a point on that edge.
#[must_use]
pub fn orientation_2d(a: Vector2<f64>, b: Vector2<f64>) -> (i8, f64) {
    let twice_area = a.y * b.x - a.x * b.y;
    if twice_area > 0.0 {
        return (1, twice_area);
    }
    if twice_area < 0.0 {
        return (-1, twice_area);
    }
    if b.y > a.y {
        return (1, twice_area);
    }
    if b.y < a.y {
        return (-1, twice_area);
    }
    if a.x > b.x {
        return (1, twice_area);
    }
    if a.x < b.x {
        return (-1, twice_area);
    }
    // Points are exactly coincident
    (0, twice_area)
}

/// Robust 2D point-in-triangle test.
///
/// Returns the barycentric weights of `p` with respect to `(a, b, c)` if `p`
/// is inside the triangle under the perturbed orientation predicate, `None`
/// otherwise. Boundary points land inside exactly one of the triangles
/// sharing that boundary.
#[must_use]
pub fn point_in_triangle_2d(
    p: Vector2<f64>,
    a: Vector2<f64>,
    b: Vector2<f64>,
    c: Vector2<f64>,
) -> Option<[f64; 3]> {
    let a = a - p;
    let b = b - p;
    let c = c - p;

    let (sign_a, area_a) = orientation_2d(b, c);
    if sign_a == 0 {
        return None;
    }
    let (sign_b, area_b) = orientation_2d(c, a);
    if sign_b != sign_a {
        return None;
    }
    let (sign_c, area_c) = orientation_2d(a, b);
    if sign_c != sign_a {
        return None;
    }

    // Signs agree and are non-zero, so the sum cannot vanish
    let sum = area_a + area_b + area_c;
    Some([area_a / sum, area_b / sum, area_c / sum])
}

/// Barycentric weights of `p` with respect to triangle `(a, b, c)`.
///
/// Solves the 2x2 Gram system on the edges from `c`. Degenerate triangles
/// produce clamped but finite weights.
#[must_use]
pub fn triangle_barycentrics(
    p: Point3<f32>,
    a: Point3<f32>,
    b: Point3<f32>,
    c: Point3<f32>,
) -> [f32; 3] {
    let ca = a - c;
    let cb = b - c;
    let cp = p - c;

    let d00 = ca.norm_squared();
    let d01 = ca.dot(&cb);
    let d11 = cb.norm_squared();
    let d20 = cp.dot(&ca);
    let d21 = cp.dot(&cb);

    let inv_det = 1.0 / (d00 * d11 - d01 * d01).max(1e-30);
    let wa = inv_det * (d11 * d20 - d01 * d21);
    let wb = inv_det * (d00 * d21 - d01 * d20);
    [wa, wb, 1.0 - wa - wb]
}

/// Squared distance from `p` to segment `(a, b)`.
///
/// Also returns the barycentric weight of `a` at the closest point, clamped
/// to `[0, 1]`.
#[must_use]
pub fn point_segment_distance_squared(
    p: Point3<f32>,
    a: Point3<f32>,
    b: Point3<f32>,
) -> (f32, f32) {
    let ab = b - a;
    let length_squared = ab.norm_squared();
    if length_squared <= f32::EPSILON {
        return ((p - a).norm_squared(), 1.0);
    }

    let alpha = ((b - p).dot(&ab) / length_squared).clamp(0.0, 1.0);
    let closest = a * alpha + (b * (1.0 - alpha)).coords;
    ((p - closest).norm_squared(), alpha)
}

/// Squared distance from `p` to triangle `(a, b, c)`.
///
/// Also returns the barycentric weights of the closest point, usable to
/// interpolate per-vertex attributes at the projection.
#[must_use]
pub fn point_triangle_distance_squared(
    p: Point3<f32>,
    a: Point3<f32>,
    b: Point3<f32>,
    c: Point3<f32>,
) -> (f32, [f32; 3]) {
    let [wa, wb, wc] = triangle_barycentrics(p, a, b, c);

    if wa >= 0.0 && wb >= 0.0 && wc >= 0.0 {
        // Projection lands on the face
        let closest = Point3::from(a.coords * wa + b.coords * wb + c.coords * wc);
        return ((p - closest).norm_squared(), [wa, wb, wc]);
    }

    // Outside the face: the positive weight's vertex survives, leaving two
    // candidate edges through that vertex
    if wa > 0.0 {
        let (d_ab, t_ab) = point_segment_distance_squared(p, a, b);
        let (d_ac, t_ac) = point_segment_distance_squared(p, a, c);
        if d_ab < d_ac {
            (d_ab, [t_ab, 1.0 - t_ab, 0.0])
        } else {
            (d_ac, [t_ac, 0.0, 1.0 - t_ac])
        }
    } else if wb > 0.0 {
        let (d_ab, t_ab) = point_segment_distance_squared(p, a, b);
        let (d_bc, t_bc) = point_segment_distance_squared(p, b, c);
        if d_ab < d_bc {
            (d_ab, [t_ab, 1.0 - t_ab, 0.0])
        } else {
            (d_bc, [0.0, t_bc, 1.0 - t_bc])
        }
    } else {
        let (d_ac, t_ac) = point_segment_distance_squared(p, a, c);
        let (d_bc, t_bc) = point_segment_distance_squared(p, b, c);
        if d_ac < d_bc {
            (d_ac, [t_ac, 0.0, 1.0 - t_ac])
        } else {
            (d_bc, [0.0, t_bc, 1.0 - t_bc])
        }
    }
}
