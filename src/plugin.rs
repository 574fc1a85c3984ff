//! Bevy plugin driving the physics service from the app clock.

use std::marker::PhantomData;

use bevy::prelude::*;
use log::error;

use crate::backend::PhysicsWorld;
use crate::config::PhysicsConfig;
use crate::service::{PhysicsService, TickReport};

/// Report produced by the most recent physics tick.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LastTickReport(pub TickReport);

/// Installs [`PhysicsService`] and runs it every `Update` against the
/// backend resource `W`.
///
/// The backend resource must be inserted by the app; the plugin only owns
/// the service.
pub struct SettlePlugin<W> {
    config: PhysicsConfig,
    _world: PhantomData<fn() -> W>,
}

impl<W> SettlePlugin<W> {
    /// Plugin whose service uses `config`.
    #[must_use]
    pub const fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            _world: PhantomData,
        }
    }
}

impl<W> Default for SettlePlugin<W> {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl<W> Plugin for SettlePlugin<W>
where
    W: PhysicsWorld + Resource,
{
    fn build(&self, app: &mut App) {
        let service = PhysicsService::new(self.config.clone()).unwrap_or_else(|err| {
            error!("{err}; falling back to default physics configuration");
            PhysicsService::default()
        });
        app.insert_resource(service)
            .init_resource::<LastTickReport>()
            .add_systems(Update, physics_tick_system::<W>);
    }
}

/// Runs one physics tick stamped with the app's elapsed time.
///
/// Paused or unchanged time yields `dt == 0`, so only ingestion and dirty
/// tiles are processed on such frames.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn physics_tick_system<W>(
    mut service: ResMut<PhysicsService>,
    mut world: ResMut<W>,
    mut last: ResMut<LastTickReport>,
    time: Res<Time>,
) where
    W: PhysicsWorld + Resource,
{
    last.0 = service.update(&mut *world, time.elapsed_secs_f64());
}
