//! Ray intersection tests against pickable primitives
//!
//! - Sphere (centered at the origin of its frame)
//! - Box (axis-aligned in its frame)
//! - Triangle (Möller-Trumbore algorithm)
//!
//! None of these assume a unit ray direction; the returned parameter is in
//! units of the ray direction.

use crate::ray::Ray;
use glam::Vec3;

/// Result of a ray-triangle intersection
#[derive(Clone, Copy, Debug)]
pub struct TriangleHit {
    /// Parameter along ray to hit point
    pub distance: f32,
    /// Barycentric coordinates [w, u, v] where w = 1 - u - v
    pub barycentric: [f32; 3],
}

/// Ray-box intersection using the slab method
///
/// Returns the ray parameter of the first positive crossing, or None.
pub fn ray_aabb(ray: &Ray, min: Vec3, max: Vec3) -> Option<f32> {
    let inv_dir = ray.inverse_direction();

    let t1 = (min - ray.origin) * inv_dir;
    let t2 = (max - ray.origin) * inv_dir;

    let tmin = t1.min(t2).max_element();
    let tmax = t1.max(t2).min_element();

    if tmax < 0.0 || tmin > tmax || tmin.is_nan() || tmax.is_nan() {
        None
    } else {
        Some(if tmin < 0.0 { tmax } else { tmin })
    }
}

/// Ray-box intersection with the outward normal of the face hit
pub fn ray_aabb_with_normal(ray: &Ray, min: Vec3, max: Vec3) -> Option<(f32, Vec3)> {
    let t = ray_aabb(ray, min, max)?;
    let point = ray.at(t);

    // Pick the face the hit point is closest to, relative to the box size.
    let extent = (max - min).max(Vec3::splat(f32::EPSILON));
    let to_min = ((point - min) / extent).abs();
    let to_max = ((max - point) / extent).abs();

    let candidates = [
        (to_min.x, Vec3::NEG_X),
        (to_max.x, Vec3::X),
        (to_min.y, Vec3::NEG_Y),
        (to_max.y, Vec3::Y),
        (to_min.z, Vec3::NEG_Z),
        (to_max.z, Vec3::Z),
    ];
    let normal = candidates
        .iter()
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, n)| *n)
        .unwrap_or(Vec3::Z);

    Some((t, normal))
}

/// Ray-sphere intersection with center and radius
///
/// Returns the nearest positive parameter; from inside the sphere that is the
/// exit point.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let a = ray.direction.dot(ray.direction);
    if a <= 0.0 {
        return None;
    }
    let b = 2.0 * oc.dot(ray.direction);
    let c = oc.dot(oc) - radius * radius;
    let discriminant = b * b - 4.0 * a * c;

    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let t1 = (-b - sqrt_d) / (2.0 * a);
    let t2 = (-b + sqrt_d) / (2.0 * a);

    if t1 > 0.0 {
        Some(t1)
    } else if t2 > 0.0 {
        Some(t2)
    } else {
        None
    }
}

/// Ray-sphere intersection with normal
pub fn ray_sphere_with_normal(ray: &Ray, center: Vec3, radius: f32) -> Option<(f32, Vec3)> {
    let t = ray_sphere(ray, center, radius)?;
    let normal = (ray.at(t) - center).normalize_or_zero();
    Some((t, normal))
}

/// Ray-triangle intersection using Möller-Trumbore algorithm
///
/// # Arguments
/// * `ray` - The ray to test
/// * `v0`, `v1`, `v2` - Triangle vertices
/// * `cull_backface` - If true, only front-facing triangles are hit
pub fn ray_triangle(
    ray: &Ray,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    cull_backface: bool,
) -> Option<TriangleHit> {
    const EPSILON: f32 = 0.0000001;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Parallel to the triangle plane
    if a.abs() < EPSILON {
        return None;
    }

    if cull_backface && a < 0.0 {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    if t > EPSILON {
        Some(TriangleHit {
            distance: t,
            barycentric: [1.0 - u - v, u, v],
        })
    } else {
        None
    }
}
