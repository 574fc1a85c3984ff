//! Runtime tuning for the physics service.

use serde::{Deserialize, Serialize};

use crate::constants::{
    BUMP_RADIUS, FLOAT_DEPTH, GRAVITY, LANDING_PROBE_OFFSET, SECONDS_PER_TICK, SINK_DEPTH,
    TERMINAL_VELOCITY,
};
use crate::error::PhysicsError;

/// Physical parameters used by every stage of a tick.
///
/// Missing fields in serialised form fall back to the values in
/// [`crate::constants`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Half-width of the bump search window, in cells.
    pub bump_radius: i32,
    /// Submersion tolerated by an entity resting on water.
    pub sink_depth: f32,
    /// Submersion at which rising water lifts an entity.
    pub float_depth: f32,
    /// Gravitational acceleration.
    pub gravity: f32,
    /// Seconds represented by one tick; divides `gravity`.
    pub seconds_per_tick: f32,
    /// Fastest downward speed, in cells per tick.
    pub terminal_velocity: f32,
    /// How far below a falling entity landing is tested.
    pub landing_probe_offset: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            bump_radius: BUMP_RADIUS,
            sink_depth: SINK_DEPTH,
            float_depth: FLOAT_DEPTH,
            gravity: GRAVITY,
            seconds_per_tick: SECONDS_PER_TICK,
            terminal_velocity: TERMINAL_VELOCITY,
            landing_probe_offset: LANDING_PROBE_OFFSET,
        }
    }
}

impl PhysicsConfig {
    /// Velocity lost to gravity each tick.
    ///
    /// ```
    /// use settle::PhysicsConfig;
    /// let step = PhysicsConfig::default().gravity_step();
    /// assert!((step - 0.1).abs() < 1e-6);
    /// ```
    #[must_use]
    pub const fn gravity_step(&self) -> f32 {
        self.gravity / self.seconds_per_tick
    }

    /// Checks the invariants the classifier and integrator rely on.
    ///
    /// # Errors
    /// Returns [`PhysicsError::InvalidConfig`] describing the first violated
    /// invariant.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if self.sink_depth >= self.float_depth {
            return Err(PhysicsError::InvalidConfig(format!(
                "sink depth {} must be below float depth {}",
                self.sink_depth, self.float_depth
            )));
        }
        if self.bump_radius < 0 {
            return Err(PhysicsError::InvalidConfig(format!(
                "bump radius {} must not be negative",
                self.bump_radius
            )));
        }
        if self.seconds_per_tick <= 0.0 || !self.seconds_per_tick.is_finite() {
            return Err(PhysicsError::InvalidConfig(format!(
                "seconds per tick {} must be positive",
                self.seconds_per_tick
            )));
        }
        if self.terminal_velocity <= 0.0 {
            return Err(PhysicsError::InvalidConfig(format!(
                "terminal velocity {} must be positive",
                self.terminal_velocity
            )));
        }
        Ok(())
    }
}
