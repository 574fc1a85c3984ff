//! Tick-level tests for stuck resolution and free motion.

mod common;

use approx::assert_relative_eq;
use glam::{IVec3, Vec3};
use rstest::{fixture, rstest};
use settle::bump::find_destination;
use settle::{
    CollisionType, EntityId, EntityRecord, EntityStore, GridWorld, PhysicsService, ShapeKind,
    StuckState, WorldBounds,
};

#[fixture]
fn world() -> GridWorld {
    common::floor_world(12)
}

#[fixture]
fn service() -> PhysicsService {
    common::service()
}

fn velocity_y(world: &GridWorld, entity: EntityId) -> f32 {
    world.mob(entity).map_or(f32::NAN, |mob| mob.velocity.y)
}

#[rstest]
fn velocity_decreases_until_terminal(mut service: PhysicsService) {
    let mut world = GridWorld::new(WorldBounds {
        min: IVec3::new(0, -100, 0),
        max: IVec3::new(8, 100, 8),
    });
    world.add_floor(-99, (0, 8), (0, 8));
    let id = common::spawn_at(&mut world, 1, IVec3::new(4, 90, 4), CollisionType::Humanoid);
    service.notify_created(id);

    let step = service.config().gravity_step();
    let mut previous = 0.0_f32;
    for tick in 1..=10 {
        service.update(&mut world, f64::from(tick));
        let vy = velocity_y(&world, id);
        assert!(vy < previous, "tick {tick}: {vy} did not drop below {previous}");
        assert_relative_eq!(vy, (previous - step).max(-1.0), epsilon = 1e-4);
        previous = vy;
    }
    for tick in 11..=20 {
        service.update(&mut world, f64::from(tick));
        assert_relative_eq!(velocity_y(&world, id), -1.0);
    }
}

#[rstest]
fn landing_clears_motion_in_the_same_step(mut world: GridWorld, mut service: PhysicsService) {
    let id = world.spawn(EntityRecord::mob(
        1,
        Vec3::new(6.0, 2.2, 6.0),
        CollisionType::Bulky,
    ));
    service.notify_created(id);
    let mut tick = 0;
    loop {
        tick += 1;
        let report = service.update(&mut world, f64::from(tick));
        let mob = world.mob(id).cloned().unwrap_or_default();
        if report.settled == 1 {
            assert!(!mob.in_free_motion);
            assert_eq!(mob.velocity, Vec3::ZERO);
            break;
        }
        assert!(mob.in_free_motion, "tick {tick}: left motion without settling");
        assert!(tick < 30, "entity never landed");
    }
    assert_eq!(common::position_of(&world, id), Vec3::new(6.0, 1.0, 6.0));
    assert!(service.in_motion_entities().is_empty());
}

#[rstest]
fn gravity_ignoring_entities_are_never_stuck(mut world: GridWorld, mut service: PhysicsService) {
    let id = world.spawn(
        EntityRecord::mob(1, Vec3::new(5.0, 9.0, 5.0), CollisionType::Bulky).ignoring_gravity(),
    );
    service.notify_created(id);
    service.update(&mut world, 1.0);
    assert_eq!(service.classify(&world, id), StuckState::NotStuck);
    assert!(service.in_motion_entities().is_empty());
    assert_eq!(common::position_of(&world, id).y, 9.0);
}

#[rstest]
#[case::bulky(CollisionType::Bulky, false)]
#[case::clutter(CollisionType::Clutter, true)]
fn buried_entities_are_bumped_or_destroyed(
    mut world: GridWorld,
    mut service: PhysicsService,
    #[case] kind: CollisionType,
    #[case] destroyed: bool,
) {
    world.add_solid(IVec3::new(4, 1, 4));
    let id = common::spawn_at(&mut world, 1, IVec3::new(4, 1, 4), kind);
    service.notify_created(id);
    let report = service.update(&mut world, 1.0);
    assert_eq!(report.destroyed == 1, destroyed);
    assert_eq!(report.bumped == 1, !destroyed);
    assert_eq!(world.destroyed.contains(&id), destroyed);
    if !destroyed {
        assert_eq!(common::position_of(&world, id), Vec3::new(4.0, 1.0, 3.0));
    }
}

#[rstest]
fn open_floor_bump_keeps_the_entity_in_place(world: GridWorld) {
    let id = EntityId(1);
    let position = Vec3::new(6.0, 1.0, 6.0);
    let chosen = find_destination(&world, id, position, IVec3::new(6, 1, 6), 2)
        .expect("window is never empty");
    assert_eq!(chosen.cell, IVec3::new(6, 1, 6));
    // Probes start a cell up, so staying put is scored as a half-cell drop.
    assert_relative_eq!(chosen.score.into_inner(), 0.5);
}

#[rstest]
fn platform_occupants_are_pushed_out(mut world: GridWorld, mut service: PhysicsService) {
    world.spawn(EntityRecord::fixture(20, IVec3::new(8, 1, 8), ShapeKind::Platform));
    let item = common::spawn_at(&mut world, 1, IVec3::new(8, 1, 8), CollisionType::Tiny);
    service.notify_created(item);
    let report = service.update(&mut world, 1.0);
    assert_eq!(report.bumped, 1);
    assert_eq!(common::position_of(&world, item), Vec3::new(8.0, 2.0, 8.0));
    assert_eq!(service.classify(&world, item), StuckState::NotStuck);
}

#[rstest]
fn covered_platform_occupants_step_off_sideways(
    mut world: GridWorld,
    mut service: PhysicsService,
) {
    world.spawn(EntityRecord::fixture(20, IVec3::new(8, 1, 8), ShapeKind::Platform));
    world.add_solid(IVec3::new(8, 2, 8));
    let item = common::spawn_at(&mut world, 1, IVec3::new(8, 1, 8), CollisionType::Tiny);
    service.notify_created(item);
    let report = service.update(&mut world, 1.0);
    assert_eq!(report.bumped, 1);
    // Climbing over the cover costs more than dropping to a neighbour.
    assert_eq!(common::position_of(&world, item), Vec3::new(8.0, 1.0, 7.0));
}

#[rstest]
fn bump_tracing_follows_the_blink_flag(mut world: GridWorld, mut service: PhysicsService) {
    settle::init_logging(true);
    service
        .set_blink_from_str("true")
        .expect("boolean input is accepted");
    world.add_solid(IVec3::new(2, 1, 2));
    let id = common::spawn_at(&mut world, 1, IVec3::new(2, 1, 2), CollisionType::Humanoid);
    assert_eq!(service.unstick(&mut world, id), StuckState::Bump);
    assert_eq!(world.teleports.len(), 1);
}
