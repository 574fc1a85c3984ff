#![cfg_attr(docsrs, feature(doc_cfg))]
//! Stuck-entity reconciliation and free-motion physics for voxel-grid worlds.
//!
//! [`PhysicsService`] detects entities whose placement is invalid against
//! the collision grid and resolves them by destroying, bumping, dropping or
//! floating them, then integrates falling and floating entities until they
//! settle. Collaborating systems are reached through the traits in
//! [`backend`]; [`GridWorld`] implements all of them in memory.
pub mod backend;
pub mod bump;
pub mod components;
pub mod config;
pub mod constants;
pub mod dirty;
pub mod error;
pub mod float;
pub mod grid_world;
pub mod logging;
pub mod motion;
pub mod numeric;
pub mod persistence;
pub mod plugin;
pub mod service;
pub mod stuck;
pub use constants::*;

// Re-export commonly used items
pub use backend::{CollisionQuery, EntityStore, Hydrology, PhysicsWorld, TerrainQuery};
pub use components::{
    CollisionLayer, CollisionType, EntityId, Mob, RegionShape, ShapeKind, WaterBodyId, WaterSample,
};
pub use config::PhysicsConfig;
pub use error::PhysicsError;
pub use grid_world::{EntityRecord, GridWorld, Scenario, WorldBounds};
pub use logging::init as init_logging;
pub use persistence::PersistedPools;
pub use plugin::{physics_tick_system, LastTickReport, SettlePlugin};
pub use service::{PhysicsService, TickReport};
pub use stuck::{NeverStuckCache, StuckState};

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust,no_run
    //! use settle::prelude::*;
    //! ```

    pub use crate::EntityId;
    pub use crate::GridWorld;
    pub use crate::PhysicsConfig;
    pub use crate::PhysicsService;
    pub use crate::PhysicsWorld;
    pub use crate::SettlePlugin;
    pub use crate::StuckState;
}
