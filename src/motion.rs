//! Free-motion integration: gravity, landing and buoyancy.
//!
//! Entities enter free motion when the classifier decides they must fall or
//! float. Each tick [`advance`] moves them one step and reports whether they
//! are still moving; the caller drops settled entities from its motion set.

use glam::{IVec3, Vec3};
use log::{debug, error};

use crate::backend::{EntityStore, PhysicsWorld};
use crate::components::EntityId;
use crate::config::PhysicsConfig;
use crate::float::{engulfing_water, should_float};
use crate::numeric::{cell_elevation, floor_to_i32, round_to_i32, snap_to_grid};

/// Puts `entity` into free motion with zero velocity.
///
/// Entities attached below something other than the world root are detached
/// and re-attached to the root at their current cell first. Returns `false`
/// when the entity has no mobility component and so cannot move.
pub fn enter_free_motion<W>(world: &mut W, entity: EntityId) -> bool
where
    W: EntityStore + ?Sized,
{
    let Some(mob) = world.mob_mut(entity) else {
        return false;
    };
    mob.in_free_motion = true;
    mob.velocity = Vec3::ZERO;
    if world.has_non_root_parent(entity) {
        if let Some(cell) = world.location(entity) {
            world.reparent_to_root(entity, cell);
        }
    }
    true
}

/// Clamps a vertical velocity to the configured terminal speed.
const fn clamp_terminal_velocity(vy: f32, config: &PhysicsConfig) -> f32 {
    vy.max(-config.terminal_velocity)
}

/// Lifts a floating entity one cell and reports the water it displaces.
fn float_step<W>(
    world: &mut W,
    config: &PhysicsConfig,
    entity: EntityId,
    location: IVec3,
    position: Vec3,
) where
    W: PhysicsWorld + ?Sized,
{
    let lifted = cell_elevation(location.y + 1);
    world.set_position(entity, Vec3::new(position.x, lifted, position.z));
    if let Some(mob) = world.mob_mut(entity) {
        mob.velocity = Vec3::ZERO;
    }
    if let Some(water) = engulfing_water(&*world, config, location) {
        world.fuse_displacement(water.body, location);
        world.link_channel(location, entity);
    }
    debug!("entity {entity} floats up from {location}");
}

/// Advances `entity` by one tick of free motion.
///
/// Returns whether the entity is still in free motion afterwards. The
/// returned value always matches the entity's `in_free_motion` flag.
pub fn advance<W>(world: &mut W, config: &PhysicsConfig, entity: EntityId) -> bool
where
    W: PhysicsWorld + ?Sized,
{
    let Some(mob) = world.mob(entity).cloned() else {
        return false;
    };
    let (Some(location), Some(position)) = (world.location(entity), world.position(entity))
    else {
        return false;
    };
    if !mob.in_free_motion {
        return false;
    }

    if should_float(&*world, config, entity) {
        float_step(world, config, entity, location, position);
        return true;
    }

    let mut velocity = mob.velocity;
    velocity.y = clamp_terminal_velocity(velocity.y - config.gravity_step(), config);

    let mut next = position + velocity;
    // The backend rounds to the nearest cell; probing half a cell lower tests
    // the cell the entity is falling into.
    let probe = snap_to_grid(next - Vec3::Y * config.landing_probe_offset);
    let through_ladders = mob.falls_through_ladders();
    let landed = if through_ladders {
        world.is_blocked(probe)
    } else {
        world.is_standable(entity, probe)
    };

    let mut in_free_motion = true;
    if landed {
        velocity = Vec3::ZERO;
        next.y = if through_ladders {
            cell_elevation(floor_to_i32(position.y))
        } else {
            // Snap to the cell that passed the standable test. Flooring the
            // probe's continuous Y can name the cell below it, since `probe`
            // was rounded.
            cell_elevation(probe.y)
        };
        in_free_motion = false;
        debug!("entity {entity} landed at {next}");
    } else if !world.in_bounds(snap_to_grid(next)) {
        let (x, z) = (round_to_i32(next.x), round_to_i32(next.z));
        let surface = world.surface_height(x, z);
        error!(
            "entity {entity} left the world at {next}; placing it on the terrain surface at height {surface}"
        );
        next = Vec3::new(next.x, cell_elevation(surface), next.z);
        velocity = Vec3::ZERO;
        in_free_motion = false;
    }

    if let Some(state) = world.mob_mut(entity) {
        state.velocity = velocity;
        state.in_free_motion = in_free_motion;
    }
    world.set_position(entity, next);
    in_free_motion
}
