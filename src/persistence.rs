//! Save and restore of the physics entity pools.
//!
//! Only the three pools survive a restart. Dirty tiles and the never-stuck
//! cache are rebuilt from notifications and classification.

use std::collections::BTreeSet;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::backend::EntityStore;
use crate::components::EntityId;
use crate::error::PhysicsError;
use crate::service::PhysicsService;

/// Serialisable snapshot of the service's pools, each sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedPools {
    /// Entities not yet checked.
    pub new_entities: Vec<EntityId>,
    /// Entities able to float.
    pub floatable_entities: Vec<EntityId>,
    /// Entities falling or floating.
    pub in_motion_entities: Vec<EntityId>,
}

impl PersistedPools {
    /// Encodes the snapshot as JSON.
    ///
    /// # Errors
    /// Returns [`PhysicsError::Persistence`] if encoding fails.
    pub fn to_json(&self) -> Result<String, PhysicsError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes a snapshot written by [`PersistedPools::to_json`].
    ///
    /// # Errors
    /// Returns [`PhysicsError::Persistence`] if `json` is not a valid
    /// snapshot.
    pub fn from_json(json: &str) -> Result<Self, PhysicsError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Keeps the ids that still exist in `world`, warning about the rest.
fn surviving<W>(world: &W, pool: &'static str, ids: Vec<EntityId>) -> BTreeSet<EntityId>
where
    W: EntityStore + ?Sized,
{
    ids.into_iter()
        .filter(|&entity| {
            let alive = world.is_in_world(entity);
            if !alive {
                warn!("dropping {entity} from restored {pool} pool: not in the world");
            }
            alive
        })
        .collect()
}

impl PhysicsService {
    /// Snapshot of the three entity pools.
    #[must_use]
    pub fn save_pools(&self) -> PersistedPools {
        PersistedPools {
            new_entities: self.new_entities.iter().copied().collect(),
            floatable_entities: self.floatable_entities.iter().copied().collect(),
            in_motion_entities: self.in_motion_entities.iter().copied().collect(),
        }
    }

    /// Replaces the pools with `saved`, keeping only entities present in
    /// `world`.
    ///
    /// Entities restored into the motion pool get their free-motion flag set
    /// again so the integrator picks them up; entities no longer able to move
    /// are dropped from it.
    pub fn restore_pools<W>(&mut self, saved: PersistedPools, world: &mut W)
    where
        W: EntityStore + ?Sized,
    {
        self.new_entities = surviving(&*world, "new", saved.new_entities);
        self.floatable_entities = surviving(&*world, "floatable", saved.floatable_entities);
        let mut in_motion = surviving(&*world, "in-motion", saved.in_motion_entities);
        in_motion.retain(|&entity| {
            world.mob_mut(entity).map_or_else(
                || {
                    warn!("dropping {entity} from restored in-motion pool: it cannot move");
                    false
                },
                |mob| {
                    mob.in_free_motion = true;
                    true
                },
            )
        });
        self.in_motion_entities = in_motion;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{CollisionType, ShapeKind};
    use crate::config::PhysicsConfig;
    use crate::grid_world::{EntityRecord, GridWorld, WorldBounds};
    use glam::{IVec3, Vec3};
    use rstest::rstest;

    #[rstest]
    fn pools_survive_a_restart() {
        let mut world = GridWorld::new(WorldBounds::default());
        world.add_floor(0, (0, 8), (0, 8));
        let faller = world.spawn(EntityRecord::mob(
            1,
            Vec3::new(2.0, 7.0, 2.0),
            CollisionType::Bulky,
        ));
        let floater = world.spawn(
            EntityRecord::mob(2, Vec3::new(4.0, 1.0, 4.0), CollisionType::Tiny).floating(),
        );
        let mut service =
            PhysicsService::new(PhysicsConfig::default()).expect("default config is valid");
        service.notify_created(faller);
        service.notify_created(floater);
        service.update(&mut world, 1.0);

        let json = service.save_pools().to_json().expect("pools encode");
        let mut restored = PhysicsService::default();
        let saved = PersistedPools::from_json(&json).expect("pools decode");
        restored.restore_pools(saved, &mut world);

        assert_eq!(restored.save_pools(), service.save_pools());
        assert!(restored.in_motion_entities().contains(&faller));
        assert!(restored.floatable_entities().contains(&floater));
    }

    #[rstest]
    fn restore_drops_missing_and_immobile_entities() {
        let mut world = GridWorld::new(WorldBounds::default());
        let wall = world.spawn(EntityRecord::fixture(5, IVec3::new(1, 1, 1), ShapeKind::Solid));
        let mob = world.spawn(EntityRecord::mob(
            6,
            Vec3::new(2.0, 5.0, 2.0),
            CollisionType::Tiny,
        ));
        let saved = PersistedPools {
            new_entities: vec![EntityId(99)],
            floatable_entities: vec![],
            in_motion_entities: vec![wall, mob, EntityId(100)],
        };
        let mut service = PhysicsService::default();
        service.restore_pools(saved, &mut world);
        assert!(service.new_entities().is_empty());
        assert_eq!(
            service.in_motion_entities().iter().copied().collect::<Vec<_>>(),
            vec![mob]
        );
        assert!(world.mob(mob).is_some_and(|state| state.in_free_motion));
    }

    #[rstest]
    fn malformed_json_is_reported() {
        assert!(matches!(
            PersistedPools::from_json("{\"new_entities\": 3}"),
            Err(PhysicsError::Persistence(_))
        ));
    }
}
