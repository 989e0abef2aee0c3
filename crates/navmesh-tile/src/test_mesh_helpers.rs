//! Small hand-built tiles shared by the unit tests
//!
//! Tiles are assembled directly from polygon data instead of going through a
//! mesh builder, so every index, link and bounding volume is known up front.

use crate::{
    BBox3, BVNode, DetailTriangle, MeshHeader, MeshTile, NavMeshParams, OffMeshConnection, Poly,
    PolyDetail, PolyFlags, PolyType, Vec3, EXT_LINK, OFFMESH_CON_BIDIR,
};

/// Two adjacent 10x10 quads and one off-mesh connection polygon
///
/// ```text
///  z=10  1 ---- 2 ---- 4
///        | p0   |  p1  |
///  z=0   0 ---- 3 ---- 5
///       x=0   x=10   x=20
/// ```
///
/// Polygon 0 is flat at y = 0. Polygon 1 has a detail vertex at
/// (15, 2, 5) so its surface rises to 2 at the center. Polygon 2 is an
/// off-mesh connection from (5, 0, 5) to (15, 1, 5). The east edge of
/// polygon 1 faces the +x neighbour tile.
pub fn two_poly_tile() -> MeshTile {
    let verts = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 10.0),
        Vec3::new(10.0, 0.0, 10.0),
        Vec3::new(10.0, 0.0, 0.0),
        Vec3::new(20.0, 0.0, 10.0),
        Vec3::new(20.0, 0.0, 0.0),
        Vec3::new(5.0, 0.0, 5.0),
        Vec3::new(15.0, 1.0, 5.0),
    ];

    let mut p0 = Poly::new(&[0, 1, 2, 3], 1, PolyType::Ground, PolyFlags::WALK).unwrap();
    p0.neis[2] = 2;

    let mut p1 = Poly::new(&[3, 2, 4, 5], 2, PolyType::Ground, PolyFlags::WALK).unwrap();
    p1.neis[0] = 1;
    p1.neis[2] = EXT_LINK;

    let p2 = Poly::new(&[6, 7], 0, PolyType::OffMeshConnection, PolyFlags::JUMP).unwrap();

    let detail_meshes = vec![
        PolyDetail {
            vert_base: 0,
            tri_base: 0,
            vert_count: 0,
            tri_count: 2,
        },
        PolyDetail {
            vert_base: 0,
            tri_base: 2,
            vert_count: 1,
            tri_count: 4,
        },
    ];
    let detail_verts = vec![Vec3::new(15.0, 2.0, 5.0)];
    let tri = |a, b, c| DetailTriangle {
        verts: [a, b, c],
        flags: 0,
    };
    let detail_tris = vec![
        tri(0, 1, 2),
        tri(0, 2, 3),
        tri(0, 1, 4),
        tri(1, 2, 4),
        tri(2, 3, 4),
        tri(3, 0, 4),
    ];

    let bv_tree = vec![
        BVNode {
            bounds: BBox3::new(Vec3::ZERO, Vec3::new(20.0, 2.0, 10.0)),
            index: -3,
        },
        BVNode {
            bounds: BBox3::new(Vec3::ZERO, Vec3::new(10.0, 0.0, 10.0)),
            index: 0,
        },
        BVNode {
            bounds: BBox3::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(20.0, 0.0, 10.0)),
            index: 1,
        },
    ];

    let off_mesh_cons = vec![OffMeshConnection {
        pos: [Vec3::new(5.0, 0.0, 5.0), Vec3::new(15.0, 1.0, 5.0)],
        radius: 0.5,
        poly: 2,
        flags: OFFMESH_CON_BIDIR,
        side: 0xff,
        user_id: 42,
    }];

    let header = MeshHeader {
        poly_count: 3,
        vert_count: verts.len(),
        max_link_count: 8,
        detail_mesh_count: detail_meshes.len(),
        detail_vert_count: detail_verts.len(),
        detail_tri_count: detail_tris.len(),
        bv_node_count: bv_tree.len(),
        off_mesh_con_count: 1,
        off_mesh_base: 2,
        walkable_height: 2.0,
        walkable_radius: 0.6,
        walkable_climb: 0.9,
        bounds: BBox3::new(Vec3::ZERO, Vec3::new(20.0, 2.0, 10.0)),
        bv_quant_factor: 1.0,
        ..MeshHeader::new(0, 0, 0)
    };

    MeshTile {
        polys: vec![p0, p1, p2],
        verts,
        detail_meshes,
        detail_verts,
        detail_tris,
        bv_tree,
        off_mesh_cons,
        ..MeshTile::new(header)
    }
}

/// Parameters whose tile size matches [`grid_tile`] with the same layout
pub fn grid_params(cols: usize, rows: usize, cell: f32) -> NavMeshParams {
    NavMeshParams {
        origin: Vec3::ZERO,
        tile_width: cols as f32 * cell,
        tile_height: rows as f32 * cell,
        max_tiles: 16,
        max_polys: 64,
    }
}

/// Flat tile of `cols x rows` square cells at grid location `(tx, ty)`
///
/// Cell `(c, r)` becomes polygon `r * cols + c`. Edges are wound
/// west, north, east, south; edges on the tile border are marked as
/// external on sides 4, 2, 0 and 6 respectively. The tile carries a
/// bounding-volume tree but no detail mesh.
pub fn grid_tile(tx: i32, ty: i32, cols: usize, rows: usize, cell: f32) -> MeshTile {
    let origin = Vec3::new(
        tx as f32 * cols as f32 * cell,
        0.0,
        ty as f32 * rows as f32 * cell,
    );

    let mut verts = Vec::with_capacity((cols + 1) * (rows + 1));
    for k in 0..=rows {
        for i in 0..=cols {
            verts.push(origin + Vec3::new(i as f32 * cell, 0.0, k as f32 * cell));
        }
    }
    let v = |i: usize, k: usize| (k * (cols + 1) + i) as u16;

    let mut polys = Vec::with_capacity(cols * rows);
    for r in 0..rows {
        for c in 0..cols {
            let p = r * cols + c;
            let quad = [v(c, r), v(c, r + 1), v(c + 1, r + 1), v(c + 1, r)];
            let mut poly = Poly::new(&quad, 0, PolyType::Ground, PolyFlags::WALK).unwrap();

            poly.neis[0] = if c > 0 { p as u16 } else { EXT_LINK | 4 };
            poly.neis[1] = if r + 1 < rows {
                (p + cols + 1) as u16
            } else {
                EXT_LINK | 2
            };
            poly.neis[2] = if c + 1 < cols {
                (p + 2) as u16
            } else {
                EXT_LINK
            };
            poly.neis[3] = if r > 0 {
                (p - cols + 1) as u16
            } else {
                EXT_LINK | 6
            };
            polys.push(poly);
        }
    }

    let bounds = BBox3::new(
        origin,
        origin + Vec3::new(cols as f32 * cell, 1.0, rows as f32 * cell),
    );
    let header = MeshHeader {
        poly_count: polys.len(),
        vert_count: verts.len(),
        max_link_count: polys.len() * 4 + 8,
        bounds,
        bv_quant_factor: 1.0,
        ..MeshHeader::new(tx, ty, 0)
    };

    let mut tile = MeshTile {
        polys,
        verts,
        ..MeshTile::new(header)
    };
    tile.bv_tree = build_bv_tree(&tile);
    tile.header.bv_node_count = tile.bv_tree.len();
    tile
}

/// Builds a depth-first bounding-volume tree with escape indices
fn build_bv_tree(tile: &MeshTile) -> Vec<BVNode> {
    let tb = tile.header.bounds;
    let qf = tile.header.bv_quant_factor;

    let mut items: Vec<BVNode> = (0..tile.polys.len())
        .filter(|&i| !tile.polys[i].is_off_mesh_connection())
        .map(|i| {
            let b = tile.poly_bounds(i).unwrap();
            BVNode {
                bounds: BBox3::new(
                    ((b.min - tb.min) * qf).floor(),
                    ((b.max - tb.min) * qf).ceil(),
                ),
                index: i as i32,
            }
        })
        .collect();

    let mut nodes = Vec::with_capacity(items.len() * 2);
    subdivide(&mut items, &mut nodes);
    nodes
}

fn subdivide(items: &mut [BVNode], nodes: &mut Vec<BVNode>) {
    if items.len() == 1 {
        nodes.push(items[0]);
        return;
    }

    let mut bounds = BBox3::empty();
    for item in items.iter() {
        bounds.expand(&item.bounds);
    }

    let start = nodes.len();
    nodes.push(BVNode { bounds, index: 0 });

    // Split along the longest axis
    let size = bounds.size();
    let axis = if size.x >= size.y && size.x >= size.z {
        0
    } else if size.y >= size.z {
        1
    } else {
        2
    };
    items.sort_by(|a, b| a.bounds.center()[axis].total_cmp(&b.bounds.center()[axis]));

    let mid = items.len() / 2;
    let (left, right) = items.split_at_mut(mid);
    subdivide(left, nodes);
    subdivide(right, nodes);

    nodes[start].index = -((nodes.len() - start) as i32);
}

#[cfg(test)]
mod tests {
    use super::*;
    use navmesh_common::tri_area_2d;

    #[test]
    fn test_grid_tile_winding() {
        let tile = grid_tile(1, 2, 3, 2, 4.0);
        for i in 0..tile.polys.len() {
            let verts = tile.poly_vertices(i).unwrap();
            for k in 2..verts.len() {
                assert!(tri_area_2d(verts[0], verts[k - 1], verts[k]) > 0.0);
            }
        }
        assert_eq!(tile.header.bounds.min, Vec3::new(12.0, 0.0, 16.0));
    }

    #[test]
    fn test_grid_bv_tree_shape() {
        let tile = grid_tile(0, 0, 4, 3, 1.0);
        // n leaves and n - 1 internal nodes
        assert_eq!(tile.bv_tree.len(), 23);
        assert_eq!(tile.bv_tree[0].index, -23);
        let leaves = tile.bv_tree.iter().filter(|n| n.is_leaf()).count();
        assert_eq!(leaves, 12);
    }
}
