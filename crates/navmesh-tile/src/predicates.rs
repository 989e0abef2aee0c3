//! Geometric predicates for navigation mesh point location
//!
//! These are pure functions over vertex slices; they never look at tiles.
//! Containment and distances are evaluated on the XZ plane.

use navmesh_common::{dist_point_segment_sqr_2d, dot_2d, tri_area_2d, Error, Result, Vec3};

/// Tolerance applied to barycentric coordinates when testing triangle containment
pub const HEIGHT_EPS: f32 = 1e-4;

/// Smallest weight a fan triangle gets when sampling random points
pub const MIN_TRI_AREA: f32 = 0.001;

/// Determines if two axis-aligned boxes overlap
///
/// The boxes overlap unless they are disjoint along at least one axis.
/// Touching boxes overlap.
#[inline]
pub fn overlap_quant_bounds(amin: Vec3, amax: Vec3, bmin: Vec3, bmax: Vec3) -> bool {
    !(amin.x > bmax.x
        || amax.x < bmin.x
        || amin.y > bmax.y
        || amax.y < bmin.y
        || amin.z > bmax.z
        || amax.z < bmin.z)
}

/// Tests `pt` against a polygon and measures its distance to every edge
///
/// Returns whether the XZ projection of `pt` lies inside the polygon
/// (crossing-number test, any winding). For each edge `j`, running from
/// `verts[j]` to `verts[(j + 1) % n]`, `edge_dist[j]` receives the squared XZ
/// distance from `pt` and `edge_t[j]` the clamped parameter of the closest
/// point along the edge.
///
/// Both output slices must hold at least `verts.len()` values.
pub fn distance_pt_poly_edges_sqr(
    pt: Vec3,
    verts: &[Vec3],
    edge_dist: &mut [f32],
    edge_t: &mut [f32],
) -> Result<bool> {
    let nverts = verts.len();
    if edge_dist.len() < nverts || edge_t.len() < nverts {
        return Err(Error::InvalidInput(format!(
            "edge buffers hold {}/{} values, polygon has {} edges",
            edge_dist.len(),
            edge_t.len(),
            nverts
        )));
    }

    let mut inside = false;
    for i in 0..nverts {
        let j = if i == 0 { nverts - 1 } else { i - 1 };
        let vi = verts[i];
        let vj = verts[j];

        // The division only runs when the edge straddles pt.z, so vi.z != vj.z
        if ((vi.z > pt.z) != (vj.z > pt.z))
            && (pt.x < (vj.x - vi.x) * (pt.z - vi.z) / (vj.z - vi.z) + vi.x)
        {
            inside = !inside;
        }

        let (dist, t) = dist_point_segment_sqr_2d(pt, vj, vi);
        edge_dist[j] = dist;
        edge_t[j] = t;
    }

    Ok(inside)
}

/// Interpolates the height of triangle `(a, b, c)` below or above `p`
///
/// Returns `Ok(Some(height))` when the XZ projection of `p` lies inside the
/// triangle (within [`HEIGHT_EPS`] in barycentric space) and `Ok(None)` when
/// it lies outside. A triangle whose XZ projection is degenerate is reported
/// as [`Error::DegenerateGeometry`].
pub fn closest_height_point_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Result<Option<f32>> {
    let v0 = c - a;
    let v1 = b - a;
    let v2 = p - a;

    let dot00 = dot_2d(v0, v0);
    let dot01 = dot_2d(v0, v1);
    let dot02 = dot_2d(v0, v2);
    let dot11 = dot_2d(v1, v1);
    let dot12 = dot_2d(v1, v2);

    // denom = |v0|^2 |v1|^2 sin^2(angle), compare against the unsigned scale
    let denom = dot00 * dot11 - dot01 * dot01;
    if !(denom.abs() > f32::EPSILON * dot00 * dot11) || !denom.is_finite() {
        return Err(Error::DegenerateGeometry(format!(
            "triangle {a} {b} {c} has no area on the xz-plane"
        )));
    }

    let inv_denom = 1.0 / denom;
    let u = (dot11 * dot02 - dot01 * dot12) * inv_denom;
    let v = (dot00 * dot12 - dot01 * dot02) * inv_denom;

    if u >= -HEIGHT_EPS && v >= -HEIGHT_EPS && (u + v) <= 1.0 + HEIGHT_EPS {
        Ok(Some(a.y + v0.y * u + v1.y * v))
    } else {
        Ok(None)
    }
}

/// Maps two uniform samples `s, t` in `[0, 1)` to a point inside a convex polygon
///
/// The polygon is fan-triangulated from `pts[0]`. Each triangle is weighted by
/// its signed XZ area, clamped to at least [`MIN_TRI_AREA`]; `s` picks the
/// triangle by cumulative weight and, together with `t`, the barycentric
/// position inside it. Uniform `s, t` give points uniformly distributed over
/// the polygon's area.
///
/// `areas` is scratch space receiving the clamped weight of the triangle
/// ending at vertex `i` in `areas[i]`; it must hold at least `pts.len()`
/// values.
pub fn random_point_in_convex_poly(pts: &[Vec3], areas: &mut [f32], s: f32, t: f32) -> Result<Vec3> {
    let npts = pts.len();
    if npts < 3 {
        return Err(Error::InvalidInput(format!(
            "random sampling needs at least 3 vertices, got {npts}"
        )));
    }
    if areas.len() < npts {
        return Err(Error::InvalidInput(format!(
            "area buffer holds {} values, polygon has {npts} vertices",
            areas.len()
        )));
    }

    let mut area_sum = 0.0;
    for i in 2..npts {
        let area = tri_area_2d(pts[0], pts[i - 1], pts[i]).max(MIN_TRI_AREA);
        areas[i] = area;
        area_sum += area;
    }

    // Rounding can leave the threshold past the last bucket; fall back to
    // the far edge of the last triangle
    let thr = s * area_sum;
    let mut acc = 0.0;
    let mut u = 1.0;
    let mut tri = npts - 1;
    for (i, &dacc) in areas.iter().enumerate().take(npts).skip(2) {
        if thr >= acc && thr < acc + dacc {
            u = (thr - acc) / dacc;
            tri = i;
            break;
        }
        acc += dacc;
    }

    let v = t.sqrt();

    let a = 1.0 - v;
    let b = (1.0 - u) * v;
    let c = u * v;
    let pa = pts[0];
    let pb = pts[tri - 1];
    let pc = pts[tri];

    Ok(pa * a + pb * b + pc * c)
}
