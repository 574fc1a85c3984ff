//! Shared fixtures for physics service integration tests.

use glam::{IVec3, Vec3};
use settle::{
    CollisionType, EntityId, EntityRecord, EntityStore, GridWorld, PhysicsConfig, PhysicsService,
    WorldBounds,
};

/// World with a solid floor at `y = 0` covering `0..=extent` on X and Z.
#[must_use]
pub fn floor_world(extent: i32) -> GridWorld {
    let mut world = GridWorld::new(WorldBounds::default());
    world.add_floor(0, (0, extent), (0, extent));
    world
}

/// Service using the default configuration.
#[must_use]
pub fn service() -> PhysicsService {
    PhysicsService::new(PhysicsConfig::default())
        .unwrap_or_else(|err| panic!("default configuration rejected: {err}"))
}

/// Spawns a mob at `cell` without notifying the service.
pub fn spawn_at(world: &mut GridWorld, id: i64, cell: IVec3, kind: CollisionType) -> EntityId {
    world.spawn(EntityRecord::mob(id, cell.as_vec3(), kind))
}

/// Current position of `entity`, failing the test if it is gone.
#[must_use]
pub fn position_of(world: &GridWorld, entity: EntityId) -> Vec3 {
    world
        .position(entity)
        .unwrap_or_else(|| panic!("entity {entity} missing from world"))
}
