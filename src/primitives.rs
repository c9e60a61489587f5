use bevy_math::{Dir3, Ray3d, Vec3};

#[non_exhaustive]
#[derive(Debug, Clone, Copy)]
pub enum Primitive3d {
    /// An infinite plane through `point`, facing `normal`.
    Plane { point: Vec3, normal: Vec3 },
}

/// Builds a ray, returning `None` when `direction` cannot be normalized.
pub fn ray_towards(origin: Vec3, direction: Vec3) -> Option<Ray3d> {
    Dir3::new(direction)
        .ok()
        .map(|direction| Ray3d { origin, direction })
}

/// Projects `point` onto the infinite line of `ray`.
///
/// Returns the signed distance along the ray and the projected position. The distance is negative
/// when the point lies behind the ray origin.
#[inline]
pub fn closest_point_on_ray(ray: Ray3d, point: Vec3) -> (f32, Vec3) {
    let t = (point - ray.origin).dot(*ray.direction);
    (t, ray.origin + *ray.direction * t)
}

/// Intersects `ray` with `shape`, returning the distance along the ray and the hit position.
pub fn intersect_primitive(ray: Ray3d, shape: Primitive3d) -> Option<(f32, Vec3)> {
    match shape {
        Primitive3d::Plane {
            point: plane_origin,
            normal: plane_normal,
        } => {
            let plane_normal = plane_normal.try_normalize()?;
            let denominator = ray.direction.dot(plane_normal);
            if denominator.abs() > f32::EPSILON {
                let point_to_point = plane_origin - ray.origin;
                let intersect_dist = plane_normal.dot(point_to_point) / denominator;
                if intersect_dist < 0.0 {
                    return None;
                }
                Some((intersect_dist, ray.get_point(intersect_dist)))
            } else {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_direction_has_no_ray() {
        assert!(ray_towards(Vec3::ONE, Vec3::ZERO).is_none());
    }

    #[test]
    fn projects_onto_ray_line() {
        let ray = ray_towards(Vec3::ZERO, Vec3::NEG_Z).unwrap();
        let (t, projected) = closest_point_on_ray(ray, Vec3::new(0.3, -0.2, -2.0));
        assert!((t - 2.0).abs() < 1e-6);
        assert!(projected.distance(Vec3::new(0.0, 0.0, -2.0)) < 1e-6);

        let (t, _) = closest_point_on_ray(ray, Vec3::new(0.0, 0.0, 1.0));
        assert!(t < 0.0);
    }

    #[test]
    fn plane_hit_in_front() {
        let ray = ray_towards(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z).unwrap();
        let plane = Primitive3d::Plane {
            point: Vec3::ZERO,
            normal: Vec3::Z,
        };
        let (distance, position) = intersect_primitive(ray, plane).unwrap();
        assert!((distance - 5.0).abs() < 1e-6);
        assert!(position.length() < 1e-6);
    }

    #[test]
    fn plane_behind_or_parallel_misses() {
        let plane = Primitive3d::Plane {
            point: Vec3::ZERO,
            normal: Vec3::Z,
        };
        let away = ray_towards(Vec3::new(0.0, 0.0, 5.0), Vec3::Z).unwrap();
        assert!(intersect_primitive(away, plane).is_none());
        let parallel = ray_towards(Vec3::new(0.0, 0.0, 5.0), Vec3::X).unwrap();
        assert!(intersect_primitive(parallel, plane).is_none());
    }
}
