//! Buoyancy checks for entities able to float.
//!
//! Two triggers lift an entity at cell `L`:
//!
//! - water filling the cell directly below `L` rises more than the sink depth
//!   above `L.y`, so an entity already resting on the surface is inundated;
//! - water beside `L`, or in `L` itself, rises more than one cell plus the
//!   float depth above `L.y`, so adjacent water is deep enough to engulf it.
//!
//! The second threshold is deliberately deeper so splash and edge cells do not
//! lift entities sitting next to shallow water.

use glam::IVec3;

use crate::backend::{EntityStore, TerrainQuery};
use crate::components::{EntityId, WaterSample};
use crate::config::PhysicsConfig;
use crate::constants::MAX_FLOAT_FOOTPRINT;
use crate::numeric::cell_elevation;

/// Whether an entity's static data lets it take part in floating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatEligibility {
    /// The entity never floats.
    Incapable,
    /// The entity floats when water reaches it.
    Capable,
    /// The entity is flagged as floating but covers more than one cell.
    OversizedFootprint(u32),
}

/// Classifies an entity's float capability from its static data.
#[must_use]
pub fn float_eligibility<W>(world: &W, entity: EntityId) -> FloatEligibility
where
    W: EntityStore + ?Sized,
{
    if !world.can_float(entity) {
        return FloatEligibility::Incapable;
    }
    let footprint = world
        .region_shape(entity)
        .map_or(1, |shape| shape.footprint_area);
    if footprint > MAX_FLOAT_FOOTPRINT {
        FloatEligibility::OversizedFootprint(footprint)
    } else {
        FloatEligibility::Capable
    }
}

/// Water in or beside `location` deep enough to engulf an entity there.
///
/// Neighbours are visited in the order returned by
/// [`TerrainQuery::inflate_xz`]; the first qualifying sample wins.
#[must_use]
pub fn engulfing_water<W>(world: &W, config: &PhysicsConfig, location: IVec3) -> Option<WaterSample>
where
    W: TerrainQuery + ?Sized,
{
    let threshold = cell_elevation(location.y) + 1.0 + config.float_depth;
    world
        .inflate_xz(location)
        .into_iter()
        .filter_map(|cell| world.water_at(cell))
        .find(|sample| sample.level > threshold)
}

/// Whether water currently lifts `entity`.
///
/// Entities that cannot float, have no grid placement, or whose footprint is
/// too large never float.
#[must_use]
pub fn should_float<W>(world: &W, config: &PhysicsConfig, entity: EntityId) -> bool
where
    W: TerrainQuery + EntityStore + ?Sized,
{
    if float_eligibility(world, entity) != FloatEligibility::Capable {
        return false;
    }
    let Some(location) = world.location(entity) else {
        return false;
    };
    let sunk = world
        .water_at(location - IVec3::Y)
        .is_some_and(|below| below.level > cell_elevation(location.y) + config.sink_depth);
    sunk || engulfing_water(world, config, location).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{CollisionType, ShapeKind, WaterBodyId};
    use crate::grid_world::{EntityRecord, GridWorld, WorldBounds};
    use glam::Vec3;
    use rstest::{fixture, rstest};

    const BODY: WaterBodyId = WaterBodyId(9);

    #[fixture]
    fn pond() -> (GridWorld, EntityId) {
        let mut world = GridWorld::new(WorldBounds::default());
        let id = world.spawn(
            EntityRecord::mob(1, Vec3::new(4.0, 5.0, 4.0), CollisionType::Tiny).floating(),
        );
        (world, id)
    }

    #[rstest]
    #[case::adjacent_deep(IVec3::new(4, 5, 4), 6.2, true)]
    #[case::adjacent_neighbour(IVec3::new(5, 5, 4), 6.2, true)]
    #[case::adjacent_shallow(IVec3::new(4, 5, 4), 6.1, false)]
    #[case::diagonal_ignored(IVec3::new(5, 5, 5), 6.2, false)]
    #[case::below_sinks(IVec3::new(4, 4, 4), 5.11, true)]
    #[case::below_shallow(IVec3::new(4, 4, 4), 5.1, false)]
    #[case::below_deep_enough(IVec3::new(4, 4, 4), 6.1, true)]
    fn water_triggers(
        pond: (GridWorld, EntityId),
        #[case] cell: IVec3,
        #[case] level: f32,
        #[case] expected: bool,
    ) {
        let (mut world, id) = pond;
        world.add_water(cell, BODY, level);
        let config = PhysicsConfig::default();
        assert_eq!(should_float(&world, &config, id), expected);
        assert_eq!(should_float(&world, &config, id), expected);
    }

    #[rstest]
    fn incapable_entities_never_float(pond: (GridWorld, EntityId)) {
        let (mut world, id) = pond;
        world.add_water(IVec3::new(4, 5, 4), BODY, 9.0);
        if let Some(record) = world.record_mut(id) {
            record.can_float = false;
        }
        assert!(!should_float(&world, &PhysicsConfig::default(), id));
    }

    #[rstest]
    fn oversized_footprint_is_excluded(pond: (GridWorld, EntityId)) {
        let (mut world, id) = pond;
        world.add_water(IVec3::new(4, 5, 4), BODY, 9.0);
        if let Some(record) = world.record_mut(id) {
            record.shape = Some(crate::components::RegionShape {
                kind: ShapeKind::Open,
                footprint_area: 4,
            });
        }
        assert_eq!(
            float_eligibility(&world, id),
            FloatEligibility::OversizedFootprint(4)
        );
        assert!(!should_float(&world, &PhysicsConfig::default(), id));
    }

    #[rstest]
    fn engulfing_water_reports_the_body(pond: (GridWorld, EntityId)) {
        let (mut world, _) = pond;
        world.add_water(IVec3::new(4, 5, 3), BODY, 7.0);
        let sample = engulfing_water(&world, &PhysicsConfig::default(), IVec3::new(4, 5, 4));
        assert_eq!(sample.map(|s| s.body), Some(BODY));
    }
}
