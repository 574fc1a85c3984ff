//! In-memory voxel world implementing every backend trait.
//!
//! `GridWorld` stands in for the game's navigation grid, terrain, hydrology
//! and entity storage. The CLI runs scenarios against it and the test suites
//! use it as a fixture. It records destructive and hydrology side effects so
//! callers can inspect what a tick did.

use bevy::prelude::Resource;
use glam::{IVec3, Vec3};
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::backend::{CollisionQuery, EntityStore, Hydrology, TerrainQuery};
use crate::components::{
    CollisionLayer, CollisionType, EntityId, Mob, RegionShape, ShapeKind, WaterBodyId, WaterSample,
};
use crate::config::PhysicsConfig;
use crate::numeric::{cell_to_world, snap_to_grid};

/// Inclusive cell bounds of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldBounds {
    /// Lowest cell on every axis.
    pub min: IVec3,
    /// Highest cell on every axis.
    pub max: IVec3,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            min: IVec3::ZERO,
            max: IVec3::new(63, 31, 63),
        }
    }
}

impl WorldBounds {
    /// Whether `cell` lies inside the bounds.
    #[must_use]
    pub fn contains(&self, cell: IVec3) -> bool {
        cell.cmpge(self.min).all() && cell.cmple(self.max).all()
    }
}

/// Everything the world knows about one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityRecord {
    /// Identifier the service knows the entity by.
    pub id: EntityId,
    /// Continuous world position.
    pub position: Vec3,
    /// Mobility component, absent for static entities.
    pub mob: Option<Mob>,
    /// Static collision shape, if the entity contributes one.
    pub shape: Option<RegionShape>,
    /// Static flag marking the entity as able to float.
    pub can_float: bool,
    /// Scene-graph parent.
    pub parent: Option<EntityId>,
    /// `false` for entities that exist but have no world placement, such as
    /// items held in an inventory.
    pub placed: bool,
}

impl Default for EntityRecord {
    fn default() -> Self {
        Self {
            id: EntityId::default(),
            position: Vec3::ZERO,
            mob: None,
            shape: None,
            can_float: false,
            parent: None,
            placed: true,
        }
    }
}

impl EntityRecord {
    /// A movable entity of the given collision type.
    #[must_use]
    pub fn mob(id: i64, position: Vec3, collision_type: CollisionType) -> Self {
        Self {
            id: EntityId(id),
            position,
            mob: Some(Mob::new(collision_type)),
            ..Self::default()
        }
    }

    /// A static entity contributing a collision shape.
    #[must_use]
    pub fn fixture(id: i64, cell: IVec3, kind: ShapeKind) -> Self {
        Self {
            id: EntityId(id),
            position: cell_to_world(cell),
            shape: Some(RegionShape {
                kind,
                footprint_area: 1,
            }),
            ..Self::default()
        }
    }

    /// Replaces the collision shape.
    #[must_use]
    pub const fn with_shape(mut self, kind: ShapeKind, footprint_area: u32) -> Self {
        self.shape = Some(RegionShape {
            kind,
            footprint_area,
        });
        self
    }

    /// Marks the entity as able to float.
    #[must_use]
    pub const fn floating(mut self) -> Self {
        self.can_float = true;
        self
    }

    /// Attaches the entity to `parent`.
    #[must_use]
    pub const fn with_parent(mut self, parent: EntityId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Lets the entity hold on to ladders.
    #[must_use]
    pub const fn with_free_will(mut self) -> Self {
        if let Some(mob) = &mut self.mob {
            mob.has_free_will = true;
        }
        self
    }

    /// Exempts the entity from gravity and stuck checks.
    #[must_use]
    pub const fn ignoring_gravity(mut self) -> Self {
        if let Some(mob) = &mut self.mob {
            mob.ignore_gravity = true;
        }
        self
    }

    /// Removes the entity's world placement.
    #[must_use]
    pub const fn unplaced(mut self) -> Self {
        self.placed = false;
        self
    }
}

/// Water filling a single cell in a scenario description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterSpec {
    /// Cell holding the water.
    pub cell: IVec3,
    /// Body the water belongs to.
    pub body: WaterBodyId,
    /// Absolute surface elevation.
    pub level: f32,
}

/// Serialisable description of a world and its entities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Overrides for the physics configuration.
    pub config: Option<PhysicsConfig>,
    /// World volume.
    pub bounds: WorldBounds,
    /// Scene-graph root entity.
    pub root: EntityId,
    /// Blocking terrain cells.
    pub solid: Vec<IVec3>,
    /// Ladder cells.
    pub ladders: Vec<IVec3>,
    /// Water-filled cells.
    pub water: Vec<WaterSpec>,
    /// Entities to spawn, in order.
    pub entities: Vec<EntityRecord>,
}

#[derive(Resource, Debug, Clone, Default)]
/// Voxel world snapshot backing the physics service.
pub struct GridWorld {
    bounds: WorldBounds,
    root: EntityId,
    /// Terrain cells that block movement.
    solid: HashSet<IVec3>,
    /// Ladder cells; climbable, not blocking, and supporting the cell above.
    ladders: HashSet<IVec3>,
    water: HashMap<IVec3, WaterSample>,
    entities: HashMap<EntityId, EntityRecord>,
    /// Entities removed through [`EntityStore::destroy`].
    pub destroyed: Vec<EntityId>,
    /// Displacement notifications in arrival order.
    pub fused: Vec<(WaterBodyId, IVec3)>,
    /// Channel link notifications in arrival order.
    pub channel_links: Vec<(IVec3, EntityId)>,
    /// Non-animated relocations in arrival order.
    pub teleports: Vec<(EntityId, Vec3)>,
}

impl GridWorld {
    /// Empty world with the given bounds.
    #[must_use]
    pub fn new(bounds: WorldBounds) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    /// Builds a world from a scenario, ignoring its configuration block.
    #[must_use]
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let mut world = Self::new(scenario.bounds);
        world.root = scenario.root;
        world.solid.extend(scenario.solid.iter().copied());
        world.ladders.extend(scenario.ladders.iter().copied());
        for spec in &scenario.water {
            world.add_water(spec.cell, spec.body, spec.level);
        }
        for record in &scenario.entities {
            world.spawn(record.clone());
        }
        world
    }

    /// World volume.
    #[must_use]
    pub const fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// Sets the scene-graph root entity.
    pub const fn set_root(&mut self, root: EntityId) {
        self.root = root;
    }

    /// Fills `cell` with blocking terrain.
    pub fn add_solid(&mut self, cell: IVec3) {
        self.solid.insert(cell);
    }

    /// Clears terrain from `cell`, reporting whether any was there.
    pub fn remove_solid(&mut self, cell: IVec3) -> bool {
        self.solid.remove(&cell)
    }

    /// Lays a solid floor spanning the inclusive `x` and `z` ranges at `y`.
    pub fn add_floor(&mut self, y: i32, xs: (i32, i32), zs: (i32, i32)) {
        for x in xs.0..=xs.1 {
            for z in zs.0..=zs.1 {
                self.solid.insert(IVec3::new(x, y, z));
            }
        }
    }

    /// Places a ladder in `cell`.
    pub fn add_ladder(&mut self, cell: IVec3) {
        self.ladders.insert(cell);
    }

    /// Fills `cell` with water from `body` up to `level`.
    pub fn add_water(&mut self, cell: IVec3, body: WaterBodyId, level: f32) {
        self.water.insert(cell, WaterSample { body, level });
    }

    /// Drains every cell.
    pub fn clear_water(&mut self) {
        self.water.clear();
    }

    /// Inserts or replaces an entity, returning its identifier.
    pub fn spawn(&mut self, record: EntityRecord) -> EntityId {
        let id = record.id;
        self.entities.insert(id, record);
        id
    }

    /// Stored record for `entity`.
    #[must_use]
    pub fn record(&self, entity: EntityId) -> Option<&EntityRecord> {
        self.entities.get(&entity)
    }

    /// Mutable record for `entity`.
    pub fn record_mut(&mut self, entity: EntityId) -> Option<&mut EntityRecord> {
        self.entities.get_mut(&entity)
    }

    /// Identifiers of every stored entity, ascending.
    #[must_use]
    pub fn entity_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.entities.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn shaped_entities_at(
        &self,
        cell: IVec3,
        kind: ShapeKind,
    ) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.values().filter_map(move |record| {
            let shaped = record.shape.is_some_and(|shape| shape.kind == kind);
            (shaped && record.placed && snap_to_grid(record.position) == cell).then_some(record.id)
        })
    }

    fn blocked_for(&self, entity: Option<EntityId>, cell: IVec3) -> bool {
        self.solid.contains(&cell)
            || self
                .shaped_entities_at(cell, ShapeKind::Solid)
                .any(|other| Some(other) != entity)
    }

    fn supported(&self, cell: IVec3) -> bool {
        let below = cell - IVec3::Y;
        self.solid.contains(&below)
            || self.ladders.contains(&below)
            || self.shaped_entities_at(below, ShapeKind::Platform).next().is_some()
    }

    fn standable_for(&self, entity: Option<EntityId>, cell: IVec3) -> bool {
        self.bounds.contains(cell) && !self.blocked_for(entity, cell) && self.supported(cell)
    }
}

impl CollisionQuery for GridWorld {
    fn standable_point(&self, entity: EntityId, cell: IVec3) -> IVec3 {
        if self.standable_for(Some(entity), cell) {
            return cell;
        }
        let span = self.bounds.max.y - self.bounds.min.y + 1;
        for distance in 1..=span {
            let step = IVec3::Y * distance;
            for probe in [cell + step, cell - step] {
                if self.standable_for(Some(entity), probe) {
                    return probe;
                }
            }
        }
        cell
    }

    fn is_standable(&self, entity: EntityId, cell: IVec3) -> bool {
        self.standable_for(Some(entity), cell)
    }

    fn is_blocked(&self, cell: IVec3) -> bool {
        self.blocked_for(None, cell)
    }

    fn is_support(&self, cell: IVec3, layer: CollisionLayer) -> bool {
        let below = cell - IVec3::Y;
        match layer {
            CollisionLayer::Solid => self.solid.contains(&below),
            CollisionLayer::Ladder => self.ladders.contains(&below),
            CollisionLayer::Platform => self
                .shaped_entities_at(below, ShapeKind::Platform)
                .next()
                .is_some(),
        }
    }

    fn physics_entities_in_tile(&self, cell: IVec3, layer: CollisionLayer) -> Vec<EntityId> {
        let kind = match layer {
            CollisionLayer::Solid => ShapeKind::Solid,
            CollisionLayer::Ladder => ShapeKind::Ladder,
            CollisionLayer::Platform => ShapeKind::Platform,
        };
        let mut ids: Vec<EntityId> = self.shaped_entities_at(cell, kind).collect();
        ids.sort_unstable();
        ids
    }
}

impl TerrainQuery for GridWorld {
    fn entities_at(&self, cell: IVec3) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .entities
            .values()
            .filter(|record| record.placed && snap_to_grid(record.position) == cell)
            .map(|record| record.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    fn in_bounds(&self, cell: IVec3) -> bool {
        self.bounds.contains(cell)
    }

    fn surface_height(&self, x: i32, z: i32) -> i32 {
        self.solid
            .iter()
            .filter(|cell| cell.x == x && cell.z == z)
            .map(|cell| cell.y + 1)
            .max()
            .unwrap_or(self.bounds.min.y)
    }

    fn water_at(&self, cell: IVec3) -> Option<WaterSample> {
        self.water.get(&cell).copied()
    }
}

impl Hydrology for GridWorld {
    fn fuse_displacement(&mut self, body: WaterBodyId, cell: IVec3) {
        self.fused.push((body, cell));
    }

    fn link_channel(&mut self, cell: IVec3, entity: EntityId) {
        self.channel_links.push((cell, entity));
    }
}

impl EntityStore for GridWorld {
    fn is_in_world(&self, entity: EntityId) -> bool {
        self.entities.get(&entity).is_some_and(|record| record.placed)
    }

    fn world_root(&self) -> EntityId {
        self.root
    }

    fn parent(&self, entity: EntityId) -> Option<EntityId> {
        self.entities.get(&entity).and_then(|record| record.parent)
    }

    fn mob(&self, entity: EntityId) -> Option<&Mob> {
        self.entities.get(&entity).and_then(|record| record.mob.as_ref())
    }

    fn mob_mut(&mut self, entity: EntityId) -> Option<&mut Mob> {
        self.entities
            .get_mut(&entity)
            .and_then(|record| record.mob.as_mut())
    }

    fn region_shape(&self, entity: EntityId) -> Option<RegionShape> {
        self.entities.get(&entity).and_then(|record| record.shape)
    }

    fn can_float(&self, entity: EntityId) -> bool {
        self.entities
            .get(&entity)
            .is_some_and(|record| record.can_float)
    }

    fn position(&self, entity: EntityId) -> Option<Vec3> {
        self.entities.get(&entity).map(|record| record.position)
    }

    fn location(&self, entity: EntityId) -> Option<IVec3> {
        self.entities
            .get(&entity)
            .filter(|record| record.placed)
            .map(|record| snap_to_grid(record.position))
    }

    fn set_position(&mut self, entity: EntityId, position: Vec3) {
        if let Some(record) = self.entities.get_mut(&entity) {
            record.position = position;
        }
    }

    fn teleport(&mut self, entity: EntityId, position: Vec3) {
        if let Some(record) = self.entities.get_mut(&entity) {
            record.position = position;
            self.teleports.push((entity, position));
        }
    }

    fn reparent_to_root(&mut self, entity: EntityId, cell: IVec3) {
        let root = self.root;
        if let Some(record) = self.entities.get_mut(&entity) {
            record.parent = Some(root);
            record.position = cell_to_world(cell);
            record.placed = true;
        }
    }

    fn destroy(&mut self, entity: EntityId) {
        if self.entities.remove(&entity).is_some() {
            self.destroyed.push(entity);
        }
    }
}
