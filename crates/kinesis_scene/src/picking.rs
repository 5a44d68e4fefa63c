//! Pointer picking
//!
//! Rays are cast against the visual proxies, not the physics bodies: the
//! player clicks what they see. The nearest hit is resolved through the
//! bindings to a body, which receives a one-shot impulse at the hit point
//! pushing into the surface.
//!
//! # Example
//!
//! ```ignore
//! use kinesis_scene::picking::*;
//!
//! let ray = camera.ray_from_ndc(pointer_ndc);
//! if let Some(hit) = raycast_proxies(&ray, &scene) {
//!     println!("Hit proxy {:?} at {:?}", hit.proxy, hit.point);
//! }
//! ```

use crate::binding::ProxyBindings;
use crate::camera::PerspectiveCamera;
use crate::error::Result;
use crate::intersect::{ray_aabb_with_normal, ray_sphere_with_normal, ray_triangle};
use crate::proxy::{ProxyGeometry, ProxyHandle, ProxyHost, ProxyTransform, TriMesh, VisualProxy};
use crate::ray::Ray;
use glam::{Vec2, Vec3};
use kinesis_physics::{BodyHandle, PhysicsWorld};
use serde::{Deserialize, Serialize};

/// Interaction tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Impulse magnitude applied on a hit (N·s)
    pub impulse_strength: f32,
    /// Hits farther than this are ignored
    pub max_distance: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            impulse_strength: 8.0,
            max_distance: f32::MAX,
        }
    }
}

impl InteractionConfig {
    pub fn with_impulse_strength(mut self, strength: f32) -> Self {
        self.impulse_strength = strength;
        self
    }
}

/// Nearest proxy surface along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProxyHit {
    pub proxy: ProxyHandle,
    /// Distance from the ray origin
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
    /// World-space surface normal, facing the ray
    pub normal: Vec3,
}

/// What a successful pick did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickOutcome {
    pub hit: ProxyHit,
    pub body: BodyHandle,
    /// Impulse applied at `hit.point`
    pub impulse: Vec3,
}

/// Hit a single proxy geometry, returning (parameter, world normal)
fn raycast_geometry(
    ray: &Ray,
    transform: &ProxyTransform,
    geometry: &ProxyGeometry,
) -> Option<(f32, Vec3)> {
    let local = ray.to_local(transform.position, transform.rotation, transform.scale)?;

    let (t, local_normal) = match geometry {
        ProxyGeometry::Sphere { radius } => ray_sphere_with_normal(&local, Vec3::ZERO, *radius)?,
        ProxyGeometry::Cuboid { half_extents } => {
            ray_aabb_with_normal(&local, -*half_extents, *half_extents)?
        }
        ProxyGeometry::Mesh(mesh) => raycast_mesh(&local, mesh)?,
    };

    // Normals transform by the inverse transpose: divide by scale, then rotate.
    let normal = (transform.rotation * (local_normal / transform.scale)).normalize_or_zero();
    let normal = if normal.dot(ray.direction) > 0.0 {
        -normal
    } else {
        normal
    };
    Some((t, normal))
}

/// Closest triangle hit, either side
fn raycast_mesh(ray: &Ray, mesh: &TriMesh) -> Option<(f32, Vec3)> {
    let mut closest: Option<(f32, Vec3)> = None;

    for [v0, v1, v2] in mesh.triangles() {
        if let Some(hit) = ray_triangle(ray, v0, v1, v2, false) {
            if closest.map_or(true, |(t, _)| hit.distance < t) {
                let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
                closest = Some((hit.distance, normal));
            }
        }
    }

    closest
}

/// Find the nearest pickable proxy along a ray
pub fn raycast_proxies(ray: &Ray, host: &dyn ProxyHost) -> Option<ProxyHit> {
    raycast_proxies_within(ray, host, f32::MAX)
}

/// Find the nearest pickable proxy no farther than `max_distance`
pub fn raycast_proxies_within(ray: &Ray, host: &dyn ProxyHost, max_distance: f32) -> Option<ProxyHit> {
    if !ray.is_valid() {
        return None;
    }
    // Distances below are in world units only for a unit direction.
    let ray = Ray::new(ray.origin, ray.direction);
    let mut closest: Option<ProxyHit> = None;

    host.visit_proxies(&mut |handle: ProxyHandle, proxy: &VisualProxy| {
        if !proxy.pickable {
            return;
        }
        let Some((t, normal)) = raycast_geometry(&ray, &proxy.transform, &proxy.geometry) else {
            return;
        };
        if t > max_distance || closest.is_some_and(|c| t >= c.distance) {
            return;
        }
        closest = Some(ProxyHit {
            proxy: handle,
            distance: t,
            point: ray.at(t),
            normal,
        });
    });

    closest
}

/// Cast a pointer ray and push the body behind the nearest proxy
///
/// Returns `Ok(None)` when nothing pickable is under the pointer or the proxy
/// hit is not bound to a body. A binding to a removed body is an
/// `InvalidHandle` error.
pub fn pick_and_impulse(
    pointer_ndc: Vec2,
    camera: &PerspectiveCamera,
    host: &dyn ProxyHost,
    bindings: &ProxyBindings,
    world: &mut PhysicsWorld,
    config: &InteractionConfig,
) -> Result<Option<PickOutcome>> {
    let ray = camera.ray_from_ndc(pointer_ndc);
    let Some(hit) = raycast_proxies_within(&ray, host, config.max_distance) else {
        log::trace!("Pick at {:?} hit nothing", pointer_ndc);
        return Ok(None);
    };
    let Some(body) = bindings.body_for(hit.proxy) else {
        log::debug!("Picked proxy {:?} has no body", hit.proxy);
        return Ok(None);
    };

    let impulse = -hit.normal * config.impulse_strength;
    world.apply_impulse(body, impulse, hit.point)?;
    log::debug!(
        "Picked {:?} (body {:?}) at {:?}, impulse {:?}",
        hit.proxy,
        body,
        hit.point,
        impulse
    );

    Ok(Some(PickOutcome { hit, body, impulse }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::ProxyScene;
    use approx::assert_relative_eq;
    use glam::Quat;
    use std::sync::Arc;

    fn down_z() -> Ray {
        Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z)
    }

    #[test]
    fn test_nearest_proxy_wins() {
        let mut scene = ProxyScene::new();
        let far = scene.insert(VisualProxy::sphere(1.0).with_position(Vec3::new(0.0, 0.0, -5.0)));
        let near = scene.insert(VisualProxy::cuboid(Vec3::splat(0.5)).with_position(Vec3::new(0.0, 0.0, 2.0)));

        let hit = raycast_proxies(&down_z(), &scene).unwrap();
        assert_eq!(hit.proxy, near);
        assert_relative_eq!(hit.distance, 7.5, epsilon = 1e-4);
        assert_eq!(hit.normal, Vec3::Z);
        assert_ne!(hit.proxy, far);
    }

    #[test]
    fn test_unpickable_proxies_are_skipped() {
        let mut scene = ProxyScene::new();
        scene.insert(VisualProxy::sphere(1.0).with_pickable(false));
        assert!(raycast_proxies(&down_z(), &scene).is_none());
    }

    #[test]
    fn test_scaled_sphere() {
        let mut scene = ProxyScene::new();
        let handle = scene.insert(
            VisualProxy::sphere(1.0)
                .with_transform(ProxyTransform::IDENTITY.with_scale(Vec3::new(1.0, 1.0, 3.0))),
        );

        let hit = raycast_proxies(&down_z(), &scene).unwrap();
        assert_eq!(hit.proxy, handle);
        assert_relative_eq!(hit.point.z, 3.0, epsilon = 1e-4);
        assert_relative_eq!(hit.normal.z, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_rotated_box_normal() {
        let mut scene = ProxyScene::new();
        scene.insert(
            VisualProxy::cuboid(Vec3::splat(1.0)).with_transform(
                ProxyTransform::IDENTITY.with_rotation(Quat::from_rotation_x(std::f32::consts::FRAC_PI_2)),
            ),
        );

        let hit = raycast_proxies(&down_z(), &scene).unwrap();
        assert_relative_eq!(hit.distance, 9.0, epsilon = 1e-4);
        assert_relative_eq!(hit.normal.z, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_mesh_hit_from_behind() {
        let mesh = TriMesh::new(
            vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let mut scene = ProxyScene::new();
        scene.insert(VisualProxy::mesh(Arc::new(mesh)));

        // The triangle faces +Z; cast from -Z so the back face is hit.
        let ray = Ray::new(Vec3::new(0.0, 0.0, -4.0), Vec3::Z);
        let hit = raycast_proxies(&ray, &scene).unwrap();
        assert_relative_eq!(hit.distance, 4.0, epsilon = 1e-4);
        assert_relative_eq!(hit.normal.z, -1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_max_distance() {
        let mut scene = ProxyScene::new();
        scene.insert(VisualProxy::sphere(1.0));
        assert!(raycast_proxies_within(&down_z(), &scene, 5.0).is_none());
        assert!(raycast_proxies_within(&down_z(), &scene, 10.0).is_some());
    }
}
