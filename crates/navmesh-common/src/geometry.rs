//! 2D geometry operations on the XZ plane
//!
//! Navigation queries project onto the XZ plane (Y-up coordinate system); the
//! helpers here ignore the Y component unless stated otherwise.

use glam::Vec3;

/// Calculate twice the signed area of a 2D triangle on the XZ plane.
///
/// Positive for triangles wound clockwise when looking down the Y axis,
/// negative for counter-clockwise, zero for collinear points.
#[inline]
pub fn tri_area_2d(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    let abx = b.x - a.x;
    let abz = b.z - a.z;
    let acx = c.x - a.x;
    let acz = c.z - a.z;
    acx * abz - abx * acz
}

/// Dot product of two vectors on the XZ plane
#[inline]
pub fn dot_2d(u: Vec3, v: Vec3) -> f32 {
    u.x * v.x + u.z * v.z
}

/// Squared distance between two points on the XZ plane
#[inline]
pub fn dist_sqr_2d(a: Vec3, b: Vec3) -> f32 {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    dx * dx + dz * dz
}

/// Squared XZ distance from `p` to segment `a..b`, with the clamped segment
/// parameter of the closest point.
///
/// A zero-length segment yields `t = 0` and the distance to `a`.
pub fn dist_point_segment_sqr_2d(p: Vec3, a: Vec3, b: Vec3) -> (f32, f32) {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    let dpx = p.x - a.x;
    let dpz = p.z - a.z;

    let d = dx * dx + dz * dz;
    let mut t = if d > 0.0 { (dpx * dx + dpz * dz) / d } else { 0.0 };
    t = t.clamp(0.0, 1.0);

    let qx = a.x + t * dx - p.x;
    let qz = a.z + t * dz - p.z;

    (qx * qx + qz * qz, t)
}
