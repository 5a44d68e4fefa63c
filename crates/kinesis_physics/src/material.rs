//! Surface materials and pairwise contact coefficients
//!
//! A body carries a [`MaterialId`]. When two bodies touch, the solver looks up
//! the [`ContactMaterial`] registered for that unordered pair of ids and falls
//! back to the registry default otherwise.

use crate::error::{PhysicsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifier of a surface material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(pub(crate) u32);

impl MaterialId {
    /// The material every registry starts with
    pub const DEFAULT: Self = Self(0);

    /// Raw index
    pub fn index(self) -> u32 {
        self.0
    }

    pub(crate) fn from_user_data(data: u128) -> Self {
        Self(data as u32)
    }

    pub(crate) fn to_user_data(self) -> u128 {
        self.0 as u128
    }
}

/// Friction and restitution used when two materials touch
///
/// Restitution outside `[0, 1]` is accepted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactMaterial {
    /// Friction coefficient (0 = frictionless)
    pub friction: f32,
    /// Restitution/bounciness (0 = no bounce, 1 = perfect bounce)
    pub restitution: f32,
}

impl Default for ContactMaterial {
    fn default() -> Self {
        Self {
            friction: 0.3,
            restitution: 0.3,
        }
    }
}

impl ContactMaterial {
    /// Create a new contact material
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction,
            restitution,
        }
    }

    /// Nearly frictionless, no bounce
    pub fn ice() -> Self {
        Self::new(0.05, 0.0)
    }

    /// Grippy and bouncy
    pub fn rubber() -> Self {
        Self::new(0.8, 0.8)
    }

    /// Metal on metal
    pub fn metal() -> Self {
        Self::new(0.3, 0.2)
    }

    /// Wood on wood
    pub fn wood() -> Self {
        Self::new(0.5, 0.3)
    }

    /// Set friction
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Set restitution
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    fn is_finite(&self) -> bool {
        self.friction.is_finite() && self.restitution.is_finite()
    }
}

/// Named materials plus the table of pairwise contact coefficients
#[derive(Debug, Clone)]
pub struct MaterialRegistry {
    names: Vec<String>,
    pairs: HashMap<(MaterialId, MaterialId), ContactMaterial>,
    default_contact: ContactMaterial,
}

impl MaterialRegistry {
    /// Create a registry holding only the `"default"` material
    pub fn new(default_contact: ContactMaterial) -> Self {
        Self {
            names: vec!["default".to_string()],
            pairs: HashMap::new(),
            default_contact,
        }
    }

    /// Define a material by name, returning the existing id if the name is known
    pub fn define_material(&mut self, name: &str) -> MaterialId {
        if let Some(index) = self.names.iter().position(|n| n == name) {
            return MaterialId(index as u32);
        }
        self.names.push(name.to_string());
        MaterialId((self.names.len() - 1) as u32)
    }

    /// Look up a material by name
    pub fn material(&self, name: &str) -> Option<MaterialId> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|index| MaterialId(index as u32))
    }

    /// Name of a material
    pub fn name(&self, id: MaterialId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    /// Whether the id was issued by this registry
    pub fn contains(&self, id: MaterialId) -> bool {
        (id.0 as usize) < self.names.len()
    }

    /// Register the coefficients for an unordered pair, replacing any earlier pairing
    pub fn define_contact(
        &mut self,
        a: MaterialId,
        b: MaterialId,
        contact: ContactMaterial,
    ) -> Result<()> {
        for id in [a, b] {
            if !self.contains(id) {
                return Err(PhysicsError::UnknownMaterial(id));
            }
        }
        if !contact.is_finite() {
            return Err(PhysicsError::NonFinite("contact material coefficient"));
        }
        if self.pairs.insert(pair_key(a, b), contact).is_some() {
            log::debug!("Replaced contact material for {:?}/{:?}", a, b);
        }
        Ok(())
    }

    /// Coefficients for a pair, or the default when none is registered
    pub fn contact_material(&self, a: MaterialId, b: MaterialId) -> ContactMaterial {
        self.pairs
            .get(&pair_key(a, b))
            .copied()
            .unwrap_or(self.default_contact)
    }

    /// The fallback coefficients
    pub fn default_contact(&self) -> ContactMaterial {
        self.default_contact
    }

    /// Number of defined materials (including the default one)
    pub fn material_count(&self) -> usize {
        self.names.len()
    }
}

impl Default for MaterialRegistry {
    fn default() -> Self {
        Self::new(ContactMaterial::default())
    }
}

fn pair_key(a: MaterialId, b: MaterialId) -> (MaterialId, MaterialId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
