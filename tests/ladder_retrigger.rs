//! Small-object special cases can relocate an item onto a cell the same
//! rules consider stuck. Such an item is only looked at again once its tile
//! is reported dirty; these tests pin that behaviour.

mod common;

use glam::{IVec3, Vec3};
use rstest::{fixture, rstest};
use settle::{
    CollisionType, EntityId, EntityRecord, EntityStore, GridWorld, PhysicsService, ShapeKind,
    StuckState,
};

const ITEM: EntityId = EntityId(1);
const LADDER_TOP: IVec3 = IVec3::new(4, 1, 3);

/// A tiny item sitting inside a covered platform next to a ladder shaft.
/// The cover makes climbing out dearer than stepping down, and the ladder
/// top is the first of the equally cheap neighbours.
#[fixture]
fn bumped_onto_ladder() -> (GridWorld, PhysicsService) {
    let mut world = common::floor_world(12);
    world.remove_solid(IVec3::new(4, 0, 3));
    world.add_ladder(IVec3::new(4, 0, 3));
    world.spawn(EntityRecord::fixture(30, IVec3::new(4, 1, 4), ShapeKind::Platform));
    world.add_solid(IVec3::new(4, 2, 4));
    common::spawn_at(&mut world, 1, IVec3::new(4, 1, 4), CollisionType::Tiny);

    let mut service = common::service();
    service.notify_created(ITEM);
    let report = service.update(&mut world, 1.0);
    assert_eq!(report.bumped, 1);
    (world, service)
}

#[rstest]
fn item_comes_to_rest_on_a_ladder_top(bumped_onto_ladder: (GridWorld, PhysicsService)) {
    let (world, mut service) = bumped_onto_ladder;
    assert_eq!(world.location(ITEM), Some(LADDER_TOP));
    // The rules would drop it through the ladder, but nothing asks yet.
    assert_eq!(service.classify(&world, ITEM), StuckState::Fall);
    assert!(service.in_motion_entities().is_empty());
}

#[rstest]
fn item_is_not_revisited_without_a_dirty_tile(bumped_onto_ladder: (GridWorld, PhysicsService)) {
    let (mut world, mut service) = bumped_onto_ladder;
    for tick in 2..=10 {
        let report = service.update(&mut world, f64::from(tick));
        assert_eq!(report.fell, 0);
    }
    assert_eq!(
        world.position(ITEM),
        Some(Vec3::new(4.0, 1.0, 3.0)),
        "item should still rest on the ladder top"
    );
}

#[rstest]
fn dirty_ladder_tile_drops_the_item(bumped_onto_ladder: (GridWorld, PhysicsService)) {
    let (mut world, mut service) = bumped_onto_ladder;
    service.mark_dirty(LADDER_TOP);
    let report = service.update(&mut world, 2.0);
    assert_eq!(report.fell, 1);
    assert!(world
        .position(ITEM)
        .is_some_and(|position| position.y < 1.0));
}
