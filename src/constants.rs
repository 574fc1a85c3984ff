//! Physical constants shared by the classifier, resolver and integrator.
//!
//! These are the defaults behind [`crate::PhysicsConfig`]; scenarios may
//! override them at load time.

/// Submersion an entity already resting on water tolerates before it floats.
pub const SINK_DEPTH: f32 = 0.10;
/// Submersion required before water rising beside an entity lifts it.
///
/// Must exceed [`SINK_DEPTH`] and the hydrology merge-elevation threshold.
pub const FLOAT_DEPTH: f32 = 0.15;
/// Half-width of the horizontal bump search window, in cells.
pub const BUMP_RADIUS: i32 = 2;
/// Gravitational acceleration before per-tick scaling.
pub const GRAVITY: f32 = 9.8;
/// Simulation seconds represented by one tick.
pub const SECONDS_PER_TICK: f32 = 98.0;
/// Maximum downward speed: exactly one cell per tick.
pub const TERMINAL_VELOCITY: f32 = 1.0;
/// Downward offset applied to the landing probe.
///
/// The collision backend rounds to the nearest cell, so probing half a cell
/// lower tests the cell the entity is about to enter.
pub const LANDING_PROBE_OFFSET: f32 = 0.5;
/// Elevation penalty for bump candidates below the search origin.
pub const BUMP_PENALTY_BELOW: f32 = 0.5;
/// Elevation penalty for bump candidates above the search origin.
pub const BUMP_PENALTY_ABOVE: f32 = 1.0;
/// Largest footprint, in cells, an entity may have and still float.
pub const MAX_FLOAT_FOOTPRINT: u32 = 1;
