//! Property-based tests for the geometric primitives.

use mesh_voxelize::geometry::{
    point_in_triangle_2d, point_segment_distance_squared, point_triangle_distance_squared,
};
use nalgebra::{Point3, Vector2};
use proptest::prelude::*;

fn arbitrary_point() -> impl Strategy<Value = Point3<f32>> {
    (-10.0_f32..10.0, -10.0_f32..10.0, -10.0_f32..10.0)
        .prop_map(|(x, y, z)| Point3::new(x, y, z))
}

fn arbitrary_point_2d() -> impl Strategy<Value = Vector2<f64>> {
    (-10.0_f64..10.0, -10.0_f64..10.0).prop_map(|(x, y)| Vector2::new(x, y))
}

proptest! {
    #[test]
    fn triangle_distance_never_exceeds_vertex_distance(
        p in arbitrary_point(),
        a in arbitrary_point(),
        b in arbitrary_point(),
        c in arbitrary_point(),
    ) {
        let (distance_squared, _) = point_triangle_distance_squared(p, a, b, c);
        let nearest_vertex = (p - a)
            .norm_squared()
            .min((p - b).norm_squared())
            .min((p - c).norm_squared());
        prop_assert!(distance_squared <= nearest_vertex + 1e-3);
    }

    #[test]
    fn closest_point_weights_reconstruct_the_distance(
        p in arbitrary_point(),
        a in arbitrary_point(),
        b in arbitrary_point(),
        c in arbitrary_point(),
    ) {
        let (distance_squared, weights) = point_triangle_distance_squared(p, a, b, c);
        prop_assert!((weights[0] + weights[1] + weights[2] - 1.0).abs() < 1e-3);

        let closest = Point3::from(
            a.coords * weights[0] + b.coords * weights[1] + c.coords * weights[2],
        );
        let reconstructed = (p - closest).norm_squared();
        let tolerance = 1e-2 * (1.0 + distance_squared);
        prop_assert!((reconstructed - distance_squared).abs() <= tolerance);
    }

    #[test]
    fn segment_distance_matches_brute_force(
        p in arbitrary_point(),
        a in arbitrary_point(),
        b in arbitrary_point(),
    ) {
        let (distance_squared, _) = point_segment_distance_squared(p, a, b);
        // Dense sampling along the segment can only be farther
        let mut best = f32::INFINITY;
        for step in 0..=64 {
            let t = step as f32 / 64.0;
            let sample = Point3::from(a.coords * (1.0 - t) + b.coords * t);
            best = best.min((p - sample).norm_squared());
        }
        prop_assert!(distance_squared <= best + 1e-3);
    }

    #[test]
    fn triangle_centroid_is_inside(
        a in arbitrary_point_2d(),
        b in arbitrary_point_2d(),
        c in arbitrary_point_2d(),
    ) {
        let area = (b - a).x * (c - a).y - (b - a).y * (c - a).x;
        prop_assume!(area.abs() > 1e-6);

        let centroid = (a + b + c) / 3.0;
        let weights = point_in_triangle_2d(centroid, a, b, c);
        prop_assert!(weights.is_some());
        let weights = weights.unwrap();
        prop_assert!((weights[0] + weights[1] + weights[2] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn points_far_outside_are_rejected(
        a in arbitrary_point_2d(),
        b in arbitrary_point_2d(),
        c in arbitrary_point_2d(),
    ) {
        // A point beyond the triangle's bounding box cannot be inside
        let max_x = a.x.max(b.x).max(c.x);
        let outside = Vector2::new(max_x + 1.0, 0.0);
        prop_assert!(point_in_triangle_2d(outside, a, b, c).is_none());
    }
}
