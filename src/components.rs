//! Entity-facing data types consumed by the physics service.
//! Includes identifiers, mobility state, collision shapes and water samples.
use std::fmt;

use bevy::prelude::Component;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Stable identifier of an externally owned entity.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Component,
)]
#[serde(transparent)]
pub struct EntityId(pub i64);

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl EntityId {
    /// Raw identifier value.
    #[must_use]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How an entity interacts with the collision grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionType {
    /// Occupies no collision volume of its own.
    #[default]
    None,
    /// Small items; may slip through ladders and be pushed out of platforms.
    Tiny,
    /// Creature-sized bodies.
    Humanoid,
    /// Debris destroyed rather than moved when stuck.
    Clutter,
    /// Large bodies that only follow the general standability rules.
    Bulky,
}

impl CollisionType {
    /// Whether the small-object support rules apply to this type.
    #[must_use]
    pub const fn is_small(self) -> bool {
        matches!(self, Self::Tiny | Self::Humanoid)
    }
}

/// Mobility state of an entity that physics may move.
///
/// Entities without a [`Mob`] are never stuck.
#[derive(Component, Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Mob {
    /// Collision behaviour.
    pub collision_type: CollisionType,
    /// Hovering or fixed entities; never classified as stuck.
    pub ignore_gravity: bool,
    /// Set while the integrator owns the entity.
    pub in_free_motion: bool,
    /// Climbers and walkers that can hold on to ladders.
    pub has_free_will: bool,
    /// Cells per tick.
    pub velocity: Vec3,
}

impl Mob {
    /// Resting mob of the given collision type.
    #[must_use]
    pub fn new(collision_type: CollisionType) -> Self {
        Self {
            collision_type,
            ..Self::default()
        }
    }

    /// Small objects without free will may drop through ladders.
    #[must_use]
    pub const fn falls_through_ladders(&self) -> bool {
        self.collision_type.is_small() && !self.has_free_will
    }
}

/// Kind of static collision volume an entity contributes to its cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Contributes nothing to the grid.
    #[default]
    Open,
    /// Blocks its cells for other entities.
    Solid,
    /// Supports the cell above; small items caught inside are pushed out.
    Platform,
    /// Supports climbers; small objects drop through.
    Ladder,
}

/// Static region-collision shape of an entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionShape {
    /// Kind of volume.
    pub kind: ShapeKind,
    /// Number of grid cells covered by the shape's footprint.
    pub footprint_area: u32,
}

impl Default for RegionShape {
    fn default() -> Self {
        Self {
            kind: ShapeKind::Open,
            footprint_area: 1,
        }
    }
}

impl RegionShape {
    /// Whether the shape blocks other entities.
    #[must_use]
    pub const fn is_solid(&self) -> bool {
        matches!(self.kind, ShapeKind::Solid)
    }
}

/// Layer selector for collision backend queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionLayer {
    /// Terrain and solid shapes.
    Solid,
    /// Ladder rungs.
    Ladder,
    /// Platform-shaped entities.
    Platform,
}

/// Identifier of a hydrology water body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaterBodyId(pub u32);

/// Water present in a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterSample {
    /// Body the water belongs to.
    pub body: WaterBodyId,
    /// Absolute surface elevation of the body.
    pub level: f32,
}

