//! Narrow interfaces onto the systems the physics service does not own.
//!
//! Entity storage, the navigation/collision grid, terrain and water data all
//! live elsewhere. The service reaches them only through these traits, and
//! every operation receives the backend explicitly rather than through a
//! global. [`PhysicsWorld`] is implemented for any type providing all four,
//! so a single backend value can be threaded through a tick.

use glam::{IVec3, Vec3};

use crate::components::{CollisionLayer, EntityId, Mob, RegionShape, WaterBodyId, WaterSample};

/// Point and region queries against the collision grid.
#[cfg_attr(test, mockall::automock)]
pub trait CollisionQuery {
    /// Nearest cell from `cell` where `entity` could stand.
    fn standable_point(&self, entity: EntityId, cell: IVec3) -> IVec3;
    /// Whether `entity` could stand in `cell`.
    fn is_standable(&self, entity: EntityId, cell: IVec3) -> bool;
    /// Whether `cell` is filled by blocking geometry.
    fn is_blocked(&self, cell: IVec3) -> bool;
    /// Whether `cell` is supported from below by the given layer.
    fn is_support(&self, cell: IVec3, layer: CollisionLayer) -> bool;
    /// Entities contributing a shape on `layer` to `cell`.
    fn physics_entities_in_tile(&self, cell: IVec3, layer: CollisionLayer) -> Vec<EntityId>;
}

/// Terrain, bounds and water lookups.
pub trait TerrainQuery {
    /// Entities whose grid location is `cell`.
    fn entities_at(&self, cell: IVec3) -> Vec<EntityId>;
    /// Whether `cell` lies inside the world volume.
    fn in_bounds(&self, cell: IVec3) -> bool;
    /// Elevation an entity stands at on the terrain surface of a column.
    fn surface_height(&self, x: i32, z: i32) -> i32;
    /// Water body filling `cell`, if any.
    fn water_at(&self, cell: IVec3) -> Option<WaterSample>;

    /// Inflates `cell` by one step along X and Z, excluding diagonals.
    fn inflate_xz(&self, cell: IVec3) -> Vec<IVec3> {
        vec![
            cell,
            cell + IVec3::X,
            cell - IVec3::X,
            cell + IVec3::Z,
            cell - IVec3::Z,
        ]
    }
}

/// Notifications sent to the hydrology simulation when floating bodies
/// displace water.
pub trait Hydrology {
    /// Fold the volume displaced at `cell` into `body`'s region.
    fn fuse_displacement(&mut self, body: WaterBodyId, cell: IVec3);
    /// Register a channel link between a cell and the floating entity.
    fn link_channel(&mut self, cell: IVec3, entity: EntityId);
}

/// Access to externally owned entities.
///
/// Capability lookups return `None` when the entity lacks the component.
pub trait EntityStore {
    /// Whether `entity` exists and is placed in the world.
    fn is_in_world(&self, entity: EntityId) -> bool;
    /// The scene-graph root every placed entity descends from.
    fn world_root(&self) -> EntityId;
    /// Scene-graph parent, if any.
    fn parent(&self, entity: EntityId) -> Option<EntityId>;
    /// Mobility component.
    fn mob(&self, entity: EntityId) -> Option<&Mob>;
    /// Mutable mobility component.
    fn mob_mut(&mut self, entity: EntityId) -> Option<&mut Mob>;
    /// Static collision shape.
    fn region_shape(&self, entity: EntityId) -> Option<RegionShape>;
    /// Static data flag marking entities able to float.
    fn can_float(&self, entity: EntityId) -> bool;
    /// Continuous world position.
    fn position(&self, entity: EntityId) -> Option<Vec3>;
    /// Grid cell of the entity, or `None` when it has no world placement.
    fn location(&self, entity: EntityId) -> Option<IVec3>;
    /// Move as part of continuous motion.
    fn set_position(&mut self, entity: EntityId, position: Vec3);
    /// Relocate without animation.
    fn teleport(&mut self, entity: EntityId, position: Vec3);
    /// Detach from the current parent and attach to the world root at `cell`.
    fn reparent_to_root(&mut self, entity: EntityId, cell: IVec3);
    /// Remove the entity from the world for good.
    fn destroy(&mut self, entity: EntityId);

    /// Whether the entity hangs off something other than the world root.
    fn has_non_root_parent(&self, entity: EntityId) -> bool {
        self.parent(entity)
            .is_some_and(|parent| parent != self.world_root())
    }
}

/// Everything a physics tick needs from the outside world.
pub trait PhysicsWorld: CollisionQuery + TerrainQuery + Hydrology + EntityStore {}

impl<T> PhysicsWorld for T where T: CollisionQuery + TerrainQuery + Hydrology + EntityStore {}
