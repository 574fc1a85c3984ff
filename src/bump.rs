//! Lateral relocation of stuck entities to a nearby standable cell.
//!
//! The resolver probes every column of a square window centred on the
//! entity, asks the collision grid for the nearest standable cell from each
//! probe, and scores the answers by distance from the entity's continuous
//! position plus an elevation penalty. The lowest score wins; ties go to the
//! candidate generated first.

use std::cmp::Ordering;

use glam::{IVec3, Vec3};
use ordered_float::OrderedFloat;

use crate::backend::CollisionQuery;
use crate::components::EntityId;
use crate::constants::{BUMP_PENALTY_ABOVE, BUMP_PENALTY_BELOW};
use crate::error::PhysicsError;
use crate::numeric::cell_to_world;

/// A standable destination and its score. Lower scores are better.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Standable cell offered by the collision grid.
    pub cell: IVec3,
    /// Distance plus elevation penalty.
    pub score: OrderedFloat<f32>,
}

/// Penalty for moving an entity from elevation `level` to `candidate_y`.
#[must_use]
pub fn elevation_penalty(candidate_y: i32, level: i32) -> f32 {
    match candidate_y.cmp(&level) {
        Ordering::Equal => 0.0,
        Ordering::Less => BUMP_PENALTY_BELOW,
        Ordering::Greater => BUMP_PENALTY_ABOVE,
    }
}

/// Where the search starts from `current`.
///
/// An entity whose own cell is already standable was asked to move anyway
/// (it is embedded in something). The probes then start one cell higher and
/// elevation penalties are taken against that raised level, so the search
/// prefers ways up and out.
#[must_use]
pub fn search_origin<C>(collision: &C, entity: EntityId, current: IVec3) -> IVec3
where
    C: CollisionQuery + ?Sized,
{
    if collision.is_standable(entity, current) {
        current + IVec3::Y
    } else {
        current
    }
}

/// Scores every probe in the window around `origin`, penalising changes of
/// elevation relative to `level`.
///
/// Candidates are generated row by row: the outer loop walks `z` offsets,
/// the inner loop `x` offsets, both ascending. Callers relying on tie-break
/// parity depend on this order.
#[must_use]
pub fn candidates<C>(
    collision: &C,
    entity: EntityId,
    position: Vec3,
    origin: IVec3,
    level: i32,
    radius: i32,
) -> Vec<Candidate>
where
    C: CollisionQuery + ?Sized,
{
    let side = usize::try_from(2 * radius + 1).unwrap_or(0);
    let mut found = Vec::with_capacity(side * side);
    for j in -radius..=radius {
        for i in -radius..=radius {
            let probe = origin + IVec3::new(i, 0, j);
            let cell = collision.standable_point(entity, probe);
            let distance = position.distance(cell_to_world(cell));
            let penalty = elevation_penalty(cell.y, level);
            found.push(Candidate {
                cell,
                score: OrderedFloat(distance + penalty),
            });
        }
    }
    found
}

/// Picks the best destination for `entity`, currently at `position`.
///
/// # Errors
/// Returns [`PhysicsError::NoBumpCandidate`] if the window produced no
/// candidates, which only happens with a negative radius.
pub fn find_destination<C>(
    collision: &C,
    entity: EntityId,
    position: Vec3,
    current: IVec3,
    radius: i32,
) -> Result<Candidate, PhysicsError>
where
    C: CollisionQuery + ?Sized,
{
    let origin = search_origin(collision, entity, current);
    candidates(collision, entity, position, origin, origin.y, radius)
        .into_iter()
        // `min_by_key` keeps the first of equal minima.
        .min_by_key(|candidate| candidate.score)
        .ok_or(PhysicsError::NoBumpCandidate { entity })
}
