//! Tile container of the navigation mesh
//!
//! [`NavMesh`] owns a fixed number of tile slots. Each slot carries a salt
//! (generation counter) that is baked into every reference handed out for
//! the tile in it. Removing a tile bumps the salt, so references formed
//! against the old tile no longer resolve.

use std::collections::HashMap;

use navmesh_common::{BBox3, Error, Vec3};

use crate::predicates::{distance_pt_poly_edges_sqr, random_point_in_convex_poly};
use crate::status::{Result, Status};
use crate::{MeshTile, NavMeshParams, Poly, PolyRef, RefEncoding, TileRef, VERTS_PER_POLYGON};

/// Tile slot with its current generation
#[derive(Debug, Clone)]
struct TileSlot {
    salt: u32,
    tile: Option<MeshTile>,
}

/// Navigation mesh made of tiles on a 2D grid
#[derive(Debug, Clone)]
pub struct NavMesh {
    params: NavMeshParams,
    encoding: RefEncoding,
    slots: Vec<TileSlot>,
    /// Unused slots; the last entry is handed out next
    free_slots: Vec<usize>,
    /// Occupied slots per grid cell, one entry per layer
    buckets: HashMap<(i32, i32), Vec<usize>>,
}

impl NavMesh {
    /// Creates an empty navigation mesh
    pub fn new(params: NavMeshParams) -> Result<Self> {
        params.validate()?;
        let encoding = RefEncoding::from_params(&params)?;

        let max_tiles = params.max_tiles as usize;
        let slots = vec![
            TileSlot {
                salt: 1,
                tile: None,
            };
            max_tiles
        ];
        // Reversed so slot 0 is used first
        let free_slots = (0..max_tiles).rev().collect();

        Ok(Self {
            params,
            encoding,
            slots,
            free_slots,
            buckets: HashMap::new(),
        })
    }

    /// Gets the tiling configuration
    pub fn params(&self) -> &NavMeshParams {
        &self.params
    }

    /// Gets the reference bit layout
    pub fn encoding(&self) -> &RefEncoding {
        &self.encoding
    }

    /// Maximum number of tiles the mesh can hold
    pub fn max_tiles(&self) -> usize {
        self.slots.len()
    }

    /// Number of attached tiles
    pub fn tile_count(&self) -> usize {
        self.slots.len() - self.free_slots.len()
    }

    /// Attaches a tile to a free slot
    ///
    /// The tile's link pool is reset and its internal links are built.
    /// Fails with [`Status::AlreadyExists`] when a tile already occupies the
    /// same `(x, y, layer)`, [`Status::OutOfMemory`] when all slots are in
    /// use and [`Status::InvalidParam`] when the tile data is inconsistent.
    pub fn add_tile(&mut self, mut tile: MeshTile) -> Result<TileRef> {
        let (x, y, layer) = (tile.header.x, tile.header.y, tile.header.layer);

        if tile.header.poly_count > self.params.max_polys as usize {
            log::warn!(
                "Tile ({}, {}, {}) has {} polygons, mesh allows {}",
                x,
                y,
                layer,
                tile.header.poly_count,
                self.params.max_polys
            );
            return Err(Status::InvalidParam);
        }
        tile.validate().map_err(|_| Status::InvalidParam)?;

        if self.tile_ref_at(x, y, layer).is_some() {
            return Err(Status::AlreadyExists);
        }

        let slot_idx = *self.free_slots.last().ok_or(Status::OutOfMemory)?;
        let salt = self.slots[slot_idx].salt;

        tile.salt = salt;
        tile.init_link_free_list();
        let base = self.encoding.encode_poly_ref(salt, slot_idx as u32, 0);
        tile.connect_int_links(base)?;

        self.free_slots.pop();
        self.buckets.entry((x, y)).or_default().push(slot_idx);

        log::debug!(
            "Added tile ({}, {}, {}) to slot {} with {} polygons",
            x,
            y,
            layer,
            slot_idx,
            tile.polys.len()
        );
        self.slots[slot_idx].tile = Some(tile);

        Ok(self.encoding.encode_tile_ref(salt, slot_idx as u32))
    }

    /// Detaches a tile and hands its data back
    ///
    /// Links in neighbouring tiles that point into the removed tile are
    /// released, and the slot's salt is bumped so every reference into the
    /// old tile becomes stale.
    pub fn remove_tile(&mut self, tile_ref: TileRef) -> Result<MeshTile> {
        if tile_ref.is_null() {
            return Err(Status::InvalidParam);
        }

        let (salt, slot_idx) = self.encoding.decode_tile_ref(tile_ref);
        let slot_idx = slot_idx as usize;
        let slot = self.slots.get_mut(slot_idx).ok_or(Status::InvalidParam)?;
        if slot.salt != salt {
            return Err(Status::StaleReference);
        }
        let tile = slot.tile.take().ok_or(Status::NotFound)?;
        slot.salt = self.encoding.next_salt(slot.salt);
        self.free_slots.push(slot_idx);

        let (x, y) = (tile.header.x, tile.header.y);
        if let Some(bucket) = self.buckets.get_mut(&(x, y)) {
            bucket.retain(|&s| s != slot_idx);
            if bucket.is_empty() {
                self.buckets.remove(&(x, y));
            }
        }

        let mut neighbours = Vec::new();
        for dy in -1..=1 {
            for dx in -1..=1 {
                // Cells past the i32 grid edge cannot hold tiles
                let (Some(nx), Some(ny)) = (x.checked_add(dx), y.checked_add(dy)) else {
                    continue;
                };
                if let Some(bucket) = self.buckets.get(&(nx, ny)) {
                    neighbours.extend_from_slice(bucket);
                }
            }
        }

        let encoding = self.encoding;
        let mut released = 0;
        for idx in neighbours {
            if let Some(neighbour) = self.slots[idx].tile.as_mut() {
                released += neighbour.disconnect_links(|link| {
                    let (_, link_tile, _) = encoding.decode_poly_ref(link.reference);
                    link_tile as usize == slot_idx
                });
            }
        }

        log::debug!(
            "Removed tile ({}, {}, {}) from slot {}, released {} neighbour links",
            x,
            y,
            tile.header.layer,
            slot_idx,
            released
        );

        Ok(tile)
    }

    /// Gets the tile a reference points to, if the reference is current
    pub fn tile_by_ref(&self, tile_ref: TileRef) -> Option<&MeshTile> {
        let (salt, slot_idx) = self.encoding.decode_tile_ref(tile_ref);
        let slot = self.slots.get(slot_idx as usize)?;
        if tile_ref.is_null() || slot.salt != salt {
            return None;
        }
        slot.tile.as_ref()
    }

    /// Gets mutable access to the tile a reference points to
    pub fn tile_by_ref_mut(&mut self, tile_ref: TileRef) -> Option<&mut MeshTile> {
        let (salt, slot_idx) = self.encoding.decode_tile_ref(tile_ref);
        let slot = self.slots.get_mut(slot_idx as usize)?;
        if tile_ref.is_null() || slot.salt != salt {
            return None;
        }
        slot.tile.as_mut()
    }

    /// Resolves a polygon reference into its tile and polygon
    pub fn tile_and_poly_by_ref(&self, poly_ref: PolyRef) -> Result<(&MeshTile, &Poly)> {
        let (tile, poly_idx) = self.resolve(poly_ref)?;
        Ok((tile, &tile.polys[poly_idx]))
    }

    /// Checks if a polygon reference points at a live polygon
    pub fn is_valid_poly_ref(&self, poly_ref: PolyRef) -> bool {
        self.resolve(poly_ref).is_ok()
    }

    /// Reference of polygon 0 of a tile; OR a polygon index into it to
    /// address any polygon of the tile
    pub fn poly_ref_base(&self, tile_ref: TileRef) -> Result<PolyRef> {
        if self.tile_by_ref(tile_ref).is_none() {
            return Err(Status::InvalidParam);
        }
        Ok(PolyRef::new(tile_ref.id()))
    }

    /// Gets the reference of the tile at a grid location and layer
    pub fn tile_ref_at(&self, x: i32, y: i32, layer: i32) -> Option<TileRef> {
        self.buckets.get(&(x, y))?.iter().find_map(|&idx| {
            let slot = &self.slots[idx];
            slot.tile
                .as_ref()
                .filter(|tile| tile.header.layer == layer)
                .map(|_| self.encoding.encode_tile_ref(slot.salt, idx as u32))
        })
    }

    /// Gets the tile at a grid location and layer
    pub fn tile_at(&self, x: i32, y: i32, layer: i32) -> Option<&MeshTile> {
        self.tile_ref_at(x, y, layer)
            .and_then(|tile_ref| self.tile_by_ref(tile_ref))
    }

    /// Gets every layer attached at a grid location
    pub fn tiles_at(&self, x: i32, y: i32) -> Vec<&MeshTile> {
        self.buckets
            .get(&(x, y))
            .map(|bucket| {
                bucket
                    .iter()
                    .filter_map(|&idx| self.slots[idx].tile.as_ref())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Calculates the grid location of the tile containing `pos`
    pub fn calc_tile_loc(&self, pos: Vec3) -> (i32, i32) {
        let tx = ((pos.x - self.params.origin.x) / self.params.tile_width).floor() as i32;
        let ty = ((pos.z - self.params.origin.z) / self.params.tile_height).floor() as i32;
        (tx, ty)
    }

    /// Iterates all attached tiles with their references
    pub fn tiles(&self) -> impl Iterator<Item = (TileRef, &MeshTile)> + '_ {
        self.slots.iter().enumerate().filter_map(move |(idx, slot)| {
            slot.tile
                .as_ref()
                .map(|tile| (self.encoding.encode_tile_ref(slot.salt, idx as u32), tile))
        })
    }

    /// Finds the ground polygons whose bounds overlap `bounds`
    pub fn query_polygons(&self, bounds: &BBox3) -> Vec<PolyRef> {
        let (minx, miny) = self.calc_tile_loc(bounds.min);
        let (maxx, maxy) = self.calc_tile_loc(bounds.max);

        // Occupied cells in range, row by row
        let mut cells: Vec<(&(i32, i32), &Vec<usize>)> = self
            .buckets
            .iter()
            .filter(|((x, y), _)| (minx..=maxx).contains(x) && (miny..=maxy).contains(y))
            .collect();
        cells.sort_unstable_by_key(|&(&(x, y), _)| (y, x));

        let mut result = Vec::new();
        for (_, bucket) in cells {
            for &idx in bucket {
                let slot = &self.slots[idx];
                let Some(tile) = slot.tile.as_ref() else {
                    continue;
                };
                result.extend(tile.query_polygons(bounds).into_iter().map(|poly| {
                    self.encoding
                        .encode_poly_ref(slot.salt, idx as u32, poly as u32)
                }));
            }
        }
        result
    }

    /// Samples the surface height of a polygon at the XZ location of `pos`
    ///
    /// Returns `Ok(None)` when `pos` is outside the polygon.
    pub fn poly_height(&self, poly_ref: PolyRef, pos: Vec3) -> navmesh_common::Result<Option<f32>> {
        let (tile, poly_idx) = self.resolve(poly_ref)?;
        tile.poly_height(poly_idx, pos)
    }

    /// Finds the point on a polygon's boundary closest to `pos`
    ///
    /// Positions inside the polygon are returned unchanged.
    pub fn closest_point_on_poly_boundary(
        &self,
        poly_ref: PolyRef,
        pos: Vec3,
    ) -> navmesh_common::Result<Vec3> {
        let (tile, poly_idx) = self.resolve(poly_ref)?;
        let verts = tile.poly_vertices(poly_idx)?;

        let mut edge_dist = [0.0; VERTS_PER_POLYGON];
        let mut edge_t = [0.0; VERTS_PER_POLYGON];
        let inside = distance_pt_poly_edges_sqr(pos, &verts, &mut edge_dist, &mut edge_t)?;
        if inside {
            return Ok(pos);
        }

        let nverts = verts.len();
        let imin = (0..nverts)
            .min_by(|&a, &b| edge_dist[a].total_cmp(&edge_dist[b]))
            .ok_or_else(|| Error::InvalidInput(format!("polygon {poly_ref} has no edges")))?;

        let va = verts[imin];
        let vb = verts[(imin + 1) % nverts];
        Ok(va.lerp(vb, edge_t[imin]))
    }

    /// Maps two uniform samples in `[0, 1]` to a point on a polygon
    ///
    /// The point's height is snapped to the polygon's detail surface.
    pub fn random_point_in_poly(
        &self,
        poly_ref: PolyRef,
        s: f32,
        t: f32,
    ) -> navmesh_common::Result<Vec3> {
        if !(0.0..=1.0).contains(&s) || !(0.0..=1.0).contains(&t) {
            return Err(Error::InvalidInput(format!(
                "random samples must lie in [0, 1], got ({s}, {t})"
            )));
        }

        let (tile, poly_idx) = self.resolve(poly_ref)?;
        let verts = tile.poly_vertices(poly_idx)?;

        let mut areas = [0.0; VERTS_PER_POLYGON];
        let mut pt = random_point_in_convex_poly(&verts, &mut areas, s, t)?;
        if let Some(h) = tile.poly_height(poly_idx, pt)? {
            pt.y = h;
        }
        Ok(pt)
    }

    /// Resolves a polygon reference into its tile and polygon index
    fn resolve(&self, poly_ref: PolyRef) -> Result<(&MeshTile, usize)> {
        if poly_ref.is_null() {
            return Err(Status::InvalidParam);
        }

        let (salt, slot_idx, poly_idx) = self.encoding.decode_poly_ref(poly_ref);
        let slot = self
            .slots
            .get(slot_idx as usize)
            .ok_or(Status::InvalidParam)?;
        if slot.salt != salt {
            return Err(Status::StaleReference);
        }

        let tile = slot.tile.as_ref().ok_or(Status::NotFound)?;
        let poly_idx = poly_idx as usize;
        if poly_idx >= tile.polys.len() {
            return Err(Status::InvalidParam);
        }
        Ok((tile, poly_idx))
    }
}
