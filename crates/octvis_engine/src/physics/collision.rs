//! Narrow-phase intersection predicates
//!
//! Pure functions over primitive shape data. Every test is axis-aligned:
//! rotation on the owning transform is not reflected in collider bounds.

use crate::foundation::math::Vec3;

/// Spheres overlap when their centres are closer than the sum of the radii
pub fn sphere_intersects_sphere(centre0: Vec3, radius0: f32, centre1: Vec3, radius1: f32) -> bool {
    (centre0 - centre1).magnitude() < radius0 + radius1
}

/// Point of the box `[min, max]` nearest to `point`
pub fn closest_point_on_box(min: Vec3, max: Vec3, point: Vec3) -> Vec3 {
    point.sup(&min).inf(&max)
}

/// Squared distance from `centre` to the box, clamped per axis, within `radius²`
pub fn box_intersects_sphere(min: Vec3, max: Vec3, centre: Vec3, radius: f32) -> bool {
    let mut distance_squared = 0.0;
    for axis in 0..3 {
        let v = centre[axis];
        if v < min[axis] {
            let delta = min[axis] - v;
            distance_squared += delta * delta;
        } else if v > max[axis] {
            let delta = v - max[axis];
            distance_squared += delta * delta;
        }
    }
    distance_squared <= radius * radius
}

/// Separating-axis test on closed intervals; touching faces intersect
pub fn box_intersects_box(min0: Vec3, max0: Vec3, min1: Vec3, max1: Vec3) -> bool {
    (0..3).all(|axis| max0[axis] >= min1[axis] && min0[axis] <= max1[axis])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn test_sphere_sphere_is_symmetric() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..256 {
            let a = Vec3::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0));
            let b = Vec3::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0));
            let ra = rng.gen_range(0.0..6.0);
            let rb = rng.gen_range(0.0..6.0);
            assert_eq!(
                sphere_intersects_sphere(a, ra, b, rb),
                sphere_intersects_sphere(b, rb, a, ra)
            );
        }
    }

    #[test]
    fn test_sphere_sphere_touching_is_not_overlap() {
        let a = Vec3::zeros();
        let b = Vec3::new(2.0, 0.0, 0.0);
        assert!(!sphere_intersects_sphere(a, 1.0, b, 1.0));
        assert!(sphere_intersects_sphere(a, 1.0, b, 1.5));
    }

    #[test]
    fn test_box_box_touching_faces_intersect() {
        let min0 = Vec3::zeros();
        let max0 = Vec3::new(1.0, 1.0, 1.0);
        let min1 = Vec3::new(1.0, 0.0, 0.0);
        let max1 = Vec3::new(2.0, 1.0, 1.0);
        assert!(box_intersects_box(min0, max0, min1, max1));
        assert!(box_intersects_box(min1, max1, min0, max0));

        let far = Vec3::new(1.001, 0.0, 0.0);
        assert!(!box_intersects_box(min0, max0, far, far + Vec3::repeat(1.0)));
    }

    #[test]
    fn test_box_sphere_uses_closest_point() {
        let min = Vec3::repeat(-1.0);
        let max = Vec3::repeat(1.0);

        // Corner region: distance to (1, 1, 1) is sqrt(3) * 0.5
        let centre = Vec3::repeat(1.5);
        assert!(!box_intersects_sphere(min, max, centre, 0.8));
        assert!(box_intersects_sphere(min, max, centre, 0.9));

        // Face contact at exactly the radius
        assert!(box_intersects_sphere(min, max, Vec3::new(3.0, 0.0, 0.0), 2.0));

        // Centre inside the box
        assert!(box_intersects_sphere(min, max, Vec3::zeros(), 0.0));
        assert_eq!(closest_point_on_box(min, max, Vec3::new(0.5, 4.0, -4.0)), Vec3::new(0.5, 1.0, -1.0));
    }
}
