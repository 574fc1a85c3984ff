//! Physics service state and the per-tick orchestrator.
//!
//! [`PhysicsService`] owns the entity pools, the dirty-tile buffer and the
//! never-stuck cache. Notifications from the rest of the game are buffered
//! through its `notify_*` methods and processed by [`PhysicsService::update`]
//! in a fixed phase order: ingest new entities, resolve dirty tiles, re-check
//! floaters, then advance moving entities.

use std::collections::BTreeSet;
use std::mem;

use bevy::prelude::Resource;
use glam::IVec3;
use log::{debug, error};
use serde::Serialize;

use crate::backend::{EntityStore, PhysicsWorld};
use crate::components::EntityId;
use crate::config::PhysicsConfig;
use crate::dirty::{affected_entities, DirtyTiles};
use crate::error::PhysicsError;
use crate::float::{float_eligibility, FloatEligibility};
use crate::motion::advance;
use crate::stuck::{NeverStuckCache, StuckState};

/// Counts describing what one call to [`PhysicsService::update`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Newly created entities processed this tick.
    pub ingested: usize,
    /// Dirty cells drained this tick.
    pub dirty_tiles: usize,
    /// Entities destroyed as stuck clutter.
    pub destroyed: usize,
    /// Entities relocated by the bump resolver.
    pub bumped: usize,
    /// Entities that started falling.
    pub fell: usize,
    /// Entities that started floating.
    pub floated: usize,
    /// Entities that left free motion this tick.
    pub settled: usize,
    /// `true` when no time elapsed and the float and motion passes were
    /// skipped.
    pub skipped_motion: bool,
}

impl TickReport {
    const fn record(&mut self, state: StuckState) {
        match state {
            StuckState::NotStuck => {}
            StuckState::Destroy => self.destroyed += 1,
            StuckState::Bump => self.bumped += 1,
            StuckState::Fall => self.fell += 1,
            StuckState::Float => self.floated += 1,
        }
    }
}

/// Resource holding all physics bookkeeping between ticks.
#[derive(Resource, Debug, Clone, Default)]
pub struct PhysicsService {
    pub(crate) config: PhysicsConfig,
    /// Entities created since the last tick.
    pub(crate) new_entities: BTreeSet<EntityId>,
    /// Entities able to float, re-checked every tick that time advances.
    pub(crate) floatable_entities: BTreeSet<EntityId>,
    /// Entities currently falling or floating.
    pub(crate) in_motion_entities: BTreeSet<EntityId>,
    pub(crate) dirty_tiles: DirtyTiles,
    pub(crate) never_stuck: NeverStuckCache,
    /// Timestamp passed to the previous [`PhysicsService::update`].
    pub(crate) last_update: f64,
    blink: bool,
}

impl PhysicsService {
    /// Creates an empty service using `config`.
    ///
    /// # Errors
    /// Returns [`PhysicsError::InvalidConfig`] when `config` fails
    /// [`PhysicsConfig::validate`].
    pub fn new(config: PhysicsConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Queues an entity created in the world for its first check.
    pub fn notify_created(&mut self, entity: EntityId) {
        self.new_entities.insert(entity);
    }

    /// Queues an entity attached to the scene graph after creation.
    ///
    /// The entity is processed in the same phase as new entities, so it is
    /// resolved before existing entities react to it.
    pub fn notify_child_added(&mut self, child: EntityId) {
        self.new_entities.insert(child);
    }

    /// Drops the memoised classification of `entity` after a
    /// physics-relevant property changed.
    pub fn notify_physics_changed(&mut self, entity: EntityId) {
        if self.never_stuck.invalidate(entity) {
            debug!("never-stuck cache invalidated for {entity}");
        }
    }

    /// Records a grid cell whose geometry or occupancy changed.
    pub fn mark_dirty(&mut self, cell: IVec3) {
        self.dirty_tiles.mark(cell);
    }

    /// Forgets an entity that left the world.
    pub fn notify_removed(&mut self, entity: EntityId) {
        self.forget(entity);
    }

    pub(crate) fn forget(&mut self, entity: EntityId) {
        self.new_entities.remove(&entity);
        self.floatable_entities.remove(&entity);
        self.in_motion_entities.remove(&entity);
        self.never_stuck.invalidate(entity);
    }

    /// Entities waiting for their first check.
    #[must_use]
    pub const fn new_entities(&self) -> &BTreeSet<EntityId> {
        &self.new_entities
    }

    /// Entities re-checked for floating every tick.
    #[must_use]
    pub const fn floatable_entities(&self) -> &BTreeSet<EntityId> {
        &self.floatable_entities
    }

    /// Entities the integrator is moving.
    #[must_use]
    pub const fn in_motion_entities(&self) -> &BTreeSet<EntityId> {
        &self.in_motion_entities
    }

    /// Dirty cells waiting for the next tick.
    #[must_use]
    pub fn pending_dirty_tiles(&self) -> usize {
        self.dirty_tiles.len()
    }

    /// Timestamp of the previous tick.
    #[must_use]
    pub const fn last_update(&self) -> f64 {
        self.last_update
    }

    /// Whether relocations are traced at info level.
    #[must_use]
    pub const fn blink(&self) -> bool {
        self.blink
    }

    /// Turns relocation tracing on or off.
    pub const fn set_blink(&mut self, enabled: bool) {
        self.blink = enabled;
    }

    /// Sets the blink flag from user input.
    ///
    /// ```
    /// use settle::PhysicsService;
    /// let mut service = PhysicsService::default();
    /// service.set_blink_from_str("true").expect("boolean input");
    /// assert!(service.blink());
    /// assert!(service.set_blink_from_str("yes").is_err());
    /// ```
    ///
    /// # Errors
    /// Returns [`PhysicsError::InvalidFlag`] unless `value` is `true` or
    /// `false`. The flag is left unchanged on error.
    pub fn set_blink_from_str(&mut self, value: &str) -> Result<(), PhysicsError> {
        let enabled = value
            .trim()
            .parse::<bool>()
            .map_err(|_| PhysicsError::InvalidFlag {
                name: "blink",
                value: value.to_owned(),
            })?;
        self.set_blink(enabled);
        Ok(())
    }

    /// Runs one physics tick at timestamp `now`.
    ///
    /// Newly created entities and dirty tiles are always processed. The float
    /// and motion passes run only when `now` is later than the previous
    /// update, so a repeated timestamp never advances motion twice.
    pub fn update<W>(&mut self, world: &mut W, now: f64) -> TickReport
    where
        W: PhysicsWorld + ?Sized,
    {
        let dt = now - self.last_update;
        let mut report = TickReport::default();

        self.ingest(world, &mut report);
        self.resolve_dirty_tiles(world, &mut report);

        if dt > 0.0 {
            self.recheck_floaters(world, &mut report);
            self.advance_motion(world, &mut report);
        } else {
            report.skipped_motion = true;
        }

        self.last_update = now;
        debug!("physics tick at {now}: {report:?}");
        report
    }

    fn ingest<W>(&mut self, world: &mut W, report: &mut TickReport)
    where
        W: PhysicsWorld + ?Sized,
    {
        let created = mem::take(&mut self.new_entities);
        for entity in created {
            if !world.is_in_world(entity) {
                continue;
            }
            report.ingested += 1;
            match float_eligibility(&*world, entity) {
                FloatEligibility::Capable => {
                    self.floatable_entities.insert(entity);
                    continue;
                }
                FloatEligibility::OversizedFootprint(area) => {
                    error!(
                        "entity {entity} is flagged to float but covers {area} cells; leaving it alone"
                    );
                    continue;
                }
                FloatEligibility::Incapable => {}
            }
            if world.has_non_root_parent(entity) {
                debug!("skipping {entity}: attached to a composite structure");
                continue;
            }
            let state = self.unstick(world, entity);
            report.record(state);
        }
    }

    fn resolve_dirty_tiles<W>(&mut self, world: &mut W, report: &mut TickReport)
    where
        W: PhysicsWorld + ?Sized,
    {
        let cells = self.dirty_tiles.take();
        report.dirty_tiles = cells.len();
        for cell in cells {
            for entity in affected_entities(&*world, cell) {
                let state = self.unstick(world, entity);
                report.record(state);
            }
        }
    }

    fn recheck_floaters<W>(&mut self, world: &mut W, report: &mut TickReport)
    where
        W: PhysicsWorld + ?Sized,
    {
        let floaters: Vec<EntityId> = self.floatable_entities.iter().copied().collect();
        for entity in floaters {
            if !world.is_in_world(entity) {
                self.floatable_entities.remove(&entity);
                continue;
            }
            let state = self.unstick(world, entity);
            report.record(state);
        }
    }

    fn advance_motion<W>(&mut self, world: &mut W, report: &mut TickReport)
    where
        W: PhysicsWorld + ?Sized,
    {
        let config = self.config.clone();
        self.in_motion_entities.retain(|&entity| {
            if advance(world, &config, entity) {
                return true;
            }
            if world.is_in_world(entity) {
                report.settled += 1;
            }
            false
        });
    }
}
