//! Numeric conversion helpers between continuous and grid space.
//!
//! The collision backend resolves a continuous point to the nearest cell by
//! rounding each component. These helpers centralise that convention and
//! clamp into the `i32` domain so the casts stay well defined.

use glam::{IVec3, Vec3};

#[expect(
    clippy::cast_possible_truncation,
    reason = "The value is clamped to the i32 bounds before casting."
)]
const fn clamp_to_i32(value: f32) -> i32 {
    if value.is_nan() {
        return 0;
    }
    // i32::MAX is not representable in f32; `as` saturates the rounded bound.
    value.clamp(i32::MIN as f32, i32::MAX as f32) as i32
}

/// Floor a coordinate and clamp it into the `i32` domain.
///
/// ```
/// use settle::numeric::floor_to_i32;
/// assert_eq!(floor_to_i32(3.8), 3);
/// assert_eq!(floor_to_i32(-0.2), -1);
/// ```
#[must_use]
pub fn floor_to_i32(value: f32) -> i32 {
    clamp_to_i32(value.floor())
}

/// Round a coordinate to the nearest integer, halves away from zero.
#[must_use]
pub fn round_to_i32(value: f32) -> i32 {
    clamp_to_i32(value.round())
}

/// Resolve a continuous point to the grid cell the collision backend uses.
///
/// ```
/// use glam::{IVec3, Vec3};
/// use settle::numeric::snap_to_grid;
/// assert_eq!(snap_to_grid(Vec3::new(1.4, 3.5, -2.6)), IVec3::new(1, 4, -3));
/// ```
#[must_use]
pub fn snap_to_grid(point: Vec3) -> IVec3 {
    IVec3::new(
        round_to_i32(point.x),
        round_to_i32(point.y),
        round_to_i32(point.z),
    )
}

/// Elevation of a cell's floor as a continuous coordinate.
#[expect(
    clippy::cast_precision_loss,
    reason = "Grid elevations stay far below 2^24."
)]
#[must_use]
pub const fn cell_elevation(y: i32) -> f32 {
    y as f32
}

/// World-space position of a grid cell.
#[must_use]
pub fn cell_to_world(cell: IVec3) -> Vec3 {
    cell.as_vec3()
}
