//! Error types surfaced by the physics service.
//!
//! None of these cross [`crate::PhysicsService::update`]; the tick loop logs
//! them and degrades to a "not stuck" or "settled" outcome instead.

use thiserror::Error;

use crate::components::EntityId;

/// Failures raised by configuration, persistence and resolver paths.
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// A debug flag was given a value that is not a boolean.
    #[error("flag `{name}` expects `true` or `false`, got `{value}`")]
    InvalidFlag {
        /// Flag being toggled.
        name: &'static str,
        /// Rejected input.
        value: String,
    },
    /// The bump search produced no candidates. The window is never empty, so
    /// this indicates a resolver defect.
    #[error("bump search for entity {entity} produced no candidates")]
    NoBumpCandidate {
        /// Entity being relocated.
        entity: EntityId,
    },
    /// A configuration value violates a physical invariant.
    #[error("invalid physics configuration: {0}")]
    InvalidConfig(String),
    /// Saved pool state could not be encoded or decoded.
    #[error("persisted pool state is malformed: {0}")]
    Persistence(#[from] serde_json::Error),
}
