//! Visual proxies
//!
//! A proxy is the renderer-side counterpart of a body: a transform plus the
//! geometry the pointer can hit. The renderer owns proxies; the core only
//! writes transforms into them through [`ProxyHost`] and reads their
//! geometry for picking.

use crate::error::{Result, SceneError};
use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Handle to a visual proxy owned by a [`ProxyHost`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProxyHandle(pub u64);

/// Proxy transform (translation, rotation, non-uniform scale)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProxyTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl ProxyTransform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Local-to-world matrix
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for ProxyTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Indexed triangle mesh in proxy-local space
#[derive(Debug, Clone, PartialEq)]
pub struct TriMesh {
    positions: Vec<Vec3>,
    indices: Vec<[u32; 3]>,
}

impl TriMesh {
    /// Build a mesh, rejecting out-of-range indices and non-finite vertices
    pub fn new(positions: Vec<Vec3>, indices: Vec<[u32; 3]>) -> Result<Self> {
        if positions.iter().any(|p| !p.is_finite()) {
            return Err(SceneError::InvalidMesh("non-finite vertex".into()));
        }
        let count = positions.len();
        if let Some(tri) = indices
            .iter()
            .find(|tri| tri.iter().any(|&i| i as usize >= count))
        {
            return Err(SceneError::InvalidMesh(format!(
                "triangle {:?} indexes past {} vertices",
                tri, count
            )));
        }
        Ok(Self { positions, indices })
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    /// Iterate triangles as vertex triples
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.iter().map(|tri| {
            [
                self.positions[tri[0] as usize],
                self.positions[tri[1] as usize],
                self.positions[tri[2] as usize],
            ]
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }
}

/// Geometry the pointer ray is tested against, in proxy-local space
#[derive(Debug, Clone, PartialEq)]
pub enum ProxyGeometry {
    /// Sphere centered at the origin
    Sphere { radius: f32 },
    /// Box centered at the origin
    Cuboid { half_extents: Vec3 },
    /// Arbitrary triangles, hit from either side
    Mesh(Arc<TriMesh>),
}

/// Render-side object whose transform mirrors a body
#[derive(Debug, Clone, PartialEq)]
pub struct VisualProxy {
    pub transform: ProxyTransform,
    pub geometry: ProxyGeometry,
    /// Whether pointer rays consider this proxy
    pub pickable: bool,
}

impl VisualProxy {
    pub fn new(geometry: ProxyGeometry) -> Self {
        Self {
            transform: ProxyTransform::IDENTITY,
            geometry,
            pickable: true,
        }
    }

    pub fn sphere(radius: f32) -> Self {
        Self::new(ProxyGeometry::Sphere { radius })
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::new(ProxyGeometry::Cuboid { half_extents })
    }

    pub fn mesh(mesh: Arc<TriMesh>) -> Self {
        Self::new(ProxyGeometry::Mesh(mesh))
    }

    pub fn with_transform(mut self, transform: ProxyTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_pickable(mut self, pickable: bool) -> Self {
        self.pickable = pickable;
        self
    }
}

/// The renderer's side of the contract
///
/// The sync layer writes poses through `apply_transform`; picking walks the
/// proxies through `visit_proxies`. Scale is never touched by the core.
pub trait ProxyHost {
    /// Write a body pose onto a proxy; `false` if the proxy no longer exists
    fn apply_transform(&mut self, proxy: ProxyHandle, position: Vec3, rotation: Quat) -> bool;

    /// Visit every live proxy
    fn visit_proxies(&self, visitor: &mut dyn FnMut(ProxyHandle, &VisualProxy));

    /// Whether a proxy exists
    fn contains(&self, proxy: ProxyHandle) -> bool;
}

/// In-memory proxy host
///
/// Stands in for a renderer scene graph in headless runs and tests.
#[derive(Debug, Default)]
pub struct ProxyScene {
    proxies: BTreeMap<ProxyHandle, VisualProxy>,
    next_id: u64,
}

impl ProxyScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a proxy and return its handle
    pub fn insert(&mut self, proxy: VisualProxy) -> ProxyHandle {
        let handle = ProxyHandle(self.next_id);
        self.next_id += 1;
        self.proxies.insert(handle, proxy);
        handle
    }

    /// Remove a proxy; bindings to it become stale
    pub fn remove(&mut self, handle: ProxyHandle) -> Option<VisualProxy> {
        self.proxies.remove(&handle)
    }

    pub fn get(&self, handle: ProxyHandle) -> Result<&VisualProxy> {
        self.proxies
            .get(&handle)
            .ok_or(SceneError::UnknownProxy(handle))
    }

    pub fn get_mut(&mut self, handle: ProxyHandle) -> Result<&mut VisualProxy> {
        self.proxies
            .get_mut(&handle)
            .ok_or(SceneError::UnknownProxy(handle))
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProxyHandle, &VisualProxy)> {
        self.proxies.iter().map(|(h, p)| (*h, p))
    }

    pub fn clear(&mut self) {
        self.proxies.clear();
    }
}

impl ProxyHost for ProxyScene {
    fn apply_transform(&mut self, proxy: ProxyHandle, position: Vec3, rotation: Quat) -> bool {
        match self.proxies.get_mut(&proxy) {
            Some(p) => {
                p.transform.position = position;
                p.transform.rotation = rotation;
                true
            }
            None => false,
        }
    }

    fn visit_proxies(&self, visitor: &mut dyn FnMut(ProxyHandle, &VisualProxy)) {
        for (handle, proxy) in &self.proxies {
            visitor(*handle, proxy);
        }
    }

    fn contains(&self, proxy: ProxyHandle) -> bool {
        self.proxies.contains_key(&proxy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_rejects_bad_indices() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        assert!(TriMesh::new(positions.clone(), vec![[0, 1, 2]]).is_ok());
        assert!(matches!(
            TriMesh::new(positions, vec![[0, 1, 3]]),
            Err(SceneError::InvalidMesh(_))
        ));
    }

    #[test]
    fn test_apply_transform_keeps_scale() {
        let mut scene = ProxyScene::new();
        let handle = scene.insert(
            VisualProxy::cuboid(Vec3::splat(0.5))
                .with_transform(ProxyTransform::IDENTITY.with_scale(Vec3::splat(2.0))),
        );

        assert!(scene.apply_transform(handle, Vec3::Y, Quat::from_rotation_x(1.0)));
        let proxy = scene.get(handle).unwrap();
        assert_eq!(proxy.transform.position, Vec3::Y);
        assert_eq!(proxy.transform.scale, Vec3::splat(2.0));
    }

    #[test]
    fn test_removed_proxy_is_gone() {
        let mut scene = ProxyScene::new();
        let handle = scene.insert(VisualProxy::sphere(1.0));
        scene.remove(handle);

        assert!(!scene.contains(handle));
        assert!(!scene.apply_transform(handle, Vec3::ZERO, Quat::IDENTITY));
        assert!(matches!(scene.get(handle), Err(SceneError::UnknownProxy(_))));
    }
}
