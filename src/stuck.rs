//! Stuck classification and resolution dispatch.
//!
//! [`PhysicsService::classify`] decides whether an entity's placement is
//! invalid and which corrective motion applies. [`PhysicsService::unstick`]
//! runs the classifier and carries the motion out.

use hashbrown::HashMap;
use log::{debug, error, info};

use crate::backend::{CollisionQuery, EntityStore, PhysicsWorld};
use crate::bump::find_destination;
use crate::components::{CollisionLayer, CollisionType, EntityId};
use crate::float::should_float;
use crate::motion::enter_free_motion;
use crate::numeric::cell_to_world;
use crate::service::PhysicsService;

/// Outcome of classifying an entity's placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StuckState {
    /// Placement is valid.
    #[default]
    NotStuck,
    /// Remove the entity from the world.
    Destroy,
    /// Relocate to a nearby standable cell.
    Bump,
    /// Start falling.
    Fall,
    /// Start floating.
    Float,
}

impl StuckState {
    /// Whether a corrective motion is needed.
    #[must_use]
    pub const fn is_stuck(self) -> bool {
        !matches!(self, Self::NotStuck)
    }
}

/// Memo of entities whose classification can never be stuck.
///
/// A missing entry means "unknown": the classifier re-derives the answer.
/// Entries are dropped when a physics-relevant property of the entity
/// changes.
#[derive(Debug, Default, Clone)]
pub struct NeverStuckCache {
    entries: HashMap<EntityId, bool>,
}

impl NeverStuckCache {
    /// Remember that `entity` can never be stuck.
    pub fn insert(&mut self, entity: EntityId) {
        self.entries.insert(entity, true);
    }

    /// Whether `entity` is known never to be stuck.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.entries.get(&entity).copied().unwrap_or(false)
    }

    /// Forget a memoised answer. Returns whether one was present.
    pub fn invalidate(&mut self, entity: EntityId) -> bool {
        self.entries.remove(&entity).is_some()
    }

    /// Number of memoised entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is memoised.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every memoised answer.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Rules for small objects without free will that a plain standability test
/// misses: resting on a ladder top, or sitting inside another entity's
/// platform.
fn small_object_rule<W>(world: &W, entity: EntityId, collision: CollisionType) -> StuckState
where
    W: CollisionQuery + EntityStore + ?Sized,
{
    let Some(location) = world.location(entity) else {
        return StuckState::NotStuck;
    };
    let ladder_only = world.is_support(location, CollisionLayer::Ladder)
        && !world.is_support(location, CollisionLayer::Solid)
        && !world.is_support(location, CollisionLayer::Platform);
    if ladder_only {
        return StuckState::Fall;
    }
    if collision == CollisionType::Tiny
        && world
            .physics_entities_in_tile(location, CollisionLayer::Platform)
            .into_iter()
            .any(|other| other != entity)
    {
        return StuckState::Bump;
    }
    StuckState::NotStuck
}

impl PhysicsService {
    /// Decides how, if at all, `entity` must move to reach a valid placement.
    ///
    /// The first matching rule wins. Entities that can never be stuck are
    /// memoised in the never-stuck cache until a property change invalidates
    /// them.
    pub fn classify<W>(&mut self, world: &W, entity: EntityId) -> StuckState
    where
        W: PhysicsWorld + ?Sized,
    {
        if !world.is_in_world(entity) {
            return StuckState::NotStuck;
        }
        if self.never_stuck.contains(entity) {
            return StuckState::NotStuck;
        }
        let Some(mob) = world.mob(entity) else {
            self.never_stuck.insert(entity);
            return StuckState::NotStuck;
        };
        if mob.ignore_gravity {
            self.never_stuck.insert(entity);
            return StuckState::NotStuck;
        }
        if mob.in_free_motion {
            return StuckState::NotStuck;
        }
        let collision = mob.collision_type;
        let has_free_will = mob.has_free_will;
        let solid_shape = world
            .region_shape(entity)
            .is_some_and(|shape| shape.is_solid());
        if collision == CollisionType::None && !solid_shape {
            self.never_stuck.insert(entity);
            return StuckState::NotStuck;
        }
        let Some(location) = world.location(entity) else {
            return StuckState::NotStuck;
        };
        if should_float(world, &self.config, entity) {
            return StuckState::Float;
        }

        let valid = world.standable_point(entity, location);
        if valid != location {
            return if valid.y > location.y {
                StuckState::Bump
            } else {
                StuckState::Fall
            };
        }

        if !has_free_will && collision.is_small() {
            return small_object_rule(world, entity, collision);
        }
        StuckState::NotStuck
    }

    /// Classifies `entity` and applies the corrective motion.
    ///
    /// Stuck clutter is destroyed rather than moved. Calling this on an
    /// entity that is already settled does nothing.
    pub fn unstick<W>(&mut self, world: &mut W, entity: EntityId) -> StuckState
    where
        W: PhysicsWorld + ?Sized,
    {
        let mut state = self.classify(&*world, entity);
        if !state.is_stuck() {
            return state;
        }
        if world
            .mob(entity)
            .is_some_and(|mob| mob.collision_type == CollisionType::Clutter)
        {
            state = StuckState::Destroy;
        }

        match state {
            StuckState::NotStuck => {}
            StuckState::Destroy => {
                world.destroy(entity);
                self.forget(entity);
            }
            StuckState::Bump => self.bump(world, entity),
            StuckState::Fall | StuckState::Float => {
                if enter_free_motion(world, entity) {
                    self.in_motion_entities.insert(entity);
                }
            }
        }
        debug!("unstick {entity}: {state:?}");
        state
    }

    fn bump<W>(&self, world: &mut W, entity: EntityId)
    where
        W: PhysicsWorld + ?Sized,
    {
        let (Some(position), Some(current)) = (world.position(entity), world.location(entity))
        else {
            return;
        };
        match find_destination(&*world, entity, position, current, self.config.bump_radius) {
            Ok(candidate) => {
                let destination = cell_to_world(candidate.cell);
                if self.blink() {
                    info!("blink {entity}: {position} -> {destination}");
                }
                world.teleport(entity, destination);
            }
            Err(err) => error!("{err}; leaving entity in place"),
        }
    }
}
