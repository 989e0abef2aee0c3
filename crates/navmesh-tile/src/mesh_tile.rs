//! Tile data model of the navigation mesh
//!
//! A [`MeshTile`] is one spatial partition of the mesh. It exclusively owns
//! its polygon, vertex, link, detail, bounding-volume and off-mesh arrays.
//! Everything except the link pool is populated by an external builder and is
//! read-only once the tile is attached to a [`crate::NavMesh`].

use navmesh_common::{BBox3, Error, Vec3};

use crate::predicates::{closest_height_point_triangle, overlap_quant_bounds};
use crate::status::{Result, Status};
use crate::{PolyFlags, PolyRef, PolyType, EXT_LINK, NULL_LINK, OFFMESH_CON_BIDIR, VERTS_PER_POLYGON};

/// Mask of the area id inside the packed area/type byte
const AREA_MASK: u8 = 0x3f;

/// Checks a polygon's vertex count against what its type allows
fn vert_count_allowed(poly_type: PolyType, n: usize) -> bool {
    match poly_type {
        PolyType::OffMeshConnection => n == 2,
        _ => (3..=VERTS_PER_POLYGON).contains(&n),
    }
}

/// Link between two polygons, or a node of the tile's free list
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Link {
    /// Reference to the polygon on the other side of the edge
    pub reference: PolyRef,
    /// Index of the next link in the chain, [`NULL_LINK`] if last
    pub next: u32,
    /// Index of the polygon edge that owns this link
    pub edge: u8,
    /// Tile side the link crosses, `0xff` for links inside the tile
    pub side: u8,
    /// Start of the shared edge portion, quantized to `0..=255`
    pub bmin: u8,
    /// End of the shared edge portion, quantized to `0..=255`
    pub bmax: u8,
}

impl Default for Link {
    fn default() -> Self {
        Self {
            reference: PolyRef::NULL,
            next: NULL_LINK,
            edge: 0,
            side: 0xff,
            bmin: 0,
            bmax: 0,
        }
    }
}

impl Link {
    /// Creates a new unchained link
    pub fn new(reference: PolyRef, edge: u8, side: u8, bmin: u8, bmax: u8) -> Self {
        Self {
            reference,
            next: NULL_LINK,
            edge,
            side,
            bmin,
            bmax,
        }
    }

    /// Checks if the link crosses a tile boundary
    pub fn is_boundary(&self) -> bool {
        self.side != 0xff
    }
}

/// Polygon in the navigation mesh
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Poly {
    /// Index of the first link of this polygon, [`NULL_LINK`] if none
    pub first_link: u32,
    /// Indices into the tile vertex array
    pub verts: [u16; VERTS_PER_POLYGON],
    /// Per-edge neighbour data: 0 = none, `EXT_LINK | side` = other tile,
    /// otherwise the neighbour polygon index plus one
    pub neis: [u16; VERTS_PER_POLYGON],
    /// User defined polygon flags
    pub flags: PolyFlags,
    vert_count: u8,
    area: u8,
    poly_type: PolyType,
}

impl Poly {
    /// Creates a polygon over the given vertex indices
    ///
    /// Off-mesh connection polygons have exactly 2 vertices; every other
    /// type needs 3 to [`VERTS_PER_POLYGON`].
    pub fn new(verts: &[u16], area: u8, poly_type: PolyType, flags: PolyFlags) -> Result<Self> {
        if !vert_count_allowed(poly_type, verts.len()) {
            return Err(Status::InvalidParam);
        }

        let mut poly = Self {
            first_link: NULL_LINK,
            verts: [0; VERTS_PER_POLYGON],
            neis: [0; VERTS_PER_POLYGON],
            flags,
            vert_count: verts.len() as u8,
            area: 0,
            poly_type,
        };
        poly.verts[..verts.len()].copy_from_slice(verts);
        poly.set_area(area);
        Ok(poly)
    }

    /// Number of vertices in the polygon
    pub fn vert_count(&self) -> usize {
        self.vert_count as usize
    }

    /// Vertex indices actually used by the polygon
    pub fn vertex_indices(&self) -> &[u16] {
        &self.verts[..self.vert_count()]
    }

    /// Sets the user area id; only the low 6 bits are kept
    pub fn set_area(&mut self, area: u8) {
        self.area = area & AREA_MASK;
    }

    /// Gets the user area id
    pub fn area(&self) -> u8 {
        self.area
    }

    /// Sets the polygon type
    pub fn set_poly_type(&mut self, poly_type: PolyType) {
        self.poly_type = poly_type;
    }

    /// Gets the polygon type
    pub fn poly_type(&self) -> PolyType {
        self.poly_type
    }

    /// Checks if the polygon stands in for an off-mesh connection
    pub fn is_off_mesh_connection(&self) -> bool {
        self.poly_type == PolyType::OffMeshConnection
    }

    /// Packs area id (low 6 bits) and type (high 2 bits) into one byte
    pub fn area_and_type(&self) -> u8 {
        (self.area & AREA_MASK) | (self.poly_type.bits() << 6)
    }

    /// Unpacks a byte produced by [`Poly::area_and_type`]
    pub fn set_area_and_type(&mut self, packed: u8) {
        self.poly_type = PolyType::from_bits(packed >> 6);
        self.set_area(packed);
    }

    /// Index of the neighbouring polygon in the same tile across `edge`
    pub fn neighbour(&self, edge: usize) -> Option<usize> {
        match self.neis.get(edge).copied() {
            Some(nei) if edge < self.vert_count() && nei != 0 && nei & EXT_LINK == 0 => {
                Some(nei as usize - 1)
            }
            _ => None,
        }
    }

    /// Checks if `edge` leads into a neighbouring tile
    pub fn is_external_edge(&self, edge: usize) -> bool {
        self.external_side(edge).is_some()
    }

    /// Tile side crossed by `edge` when it leads into another tile
    pub fn external_side(&self, edge: usize) -> Option<u8> {
        match self.neis.get(edge).copied() {
            Some(nei) if edge < self.vert_count() && nei & EXT_LINK != 0 => Some((nei & 0xff) as u8),
            _ => None,
        }
    }
}

/// Range of a polygon's refinement data inside the tile detail arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PolyDetail {
    /// Offset of the first detail vertex
    pub vert_base: u32,
    /// Offset of the first detail triangle
    pub tri_base: u32,
    /// Number of detail vertices
    pub vert_count: u8,
    /// Number of detail triangles
    pub tri_count: u8,
}

/// Triangle of a polygon's detail mesh
///
/// Vertex indices below the polygon's vertex count address polygon
/// vertices; larger indices address the polygon's detail vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct DetailTriangle {
    pub verts: [u8; 3],
    /// Per-edge flags marking edges that lie on the polygon boundary
    pub flags: u8,
}

/// Node of the tile's bounding-volume tree
///
/// Nodes are stored depth-first. A leaf holds a polygon index
/// (`index >= 0`); an internal node holds the negated number of nodes in
/// its subtree, so a query can skip the whole subtree at once.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct BVNode {
    /// Bounds quantized into the tile's bounding-volume space
    pub bounds: BBox3,
    /// Polygon index or negative escape offset
    pub index: i32,
}

impl BVNode {
    /// Checks if the node references a polygon
    pub fn is_leaf(&self) -> bool {
        self.index >= 0
    }
}

/// Connection between two points that does not follow the polygon surface
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct OffMeshConnection {
    /// Start and end positions
    pub pos: [Vec3; 2],
    /// Endpoint radius
    pub radius: f32,
    /// Index of the polygon that represents the connection
    pub poly: u16,
    /// Connection flags, see [`OFFMESH_CON_BIDIR`]
    pub flags: u8,
    /// Tile side the end point lies on, `0xff` when inside the tile
    pub side: u8,
    /// User assigned id
    pub user_id: u32,
}

impl OffMeshConnection {
    /// Gets the start position
    pub fn start(&self) -> Vec3 {
        self.pos[0]
    }

    /// Gets the end position
    pub fn end(&self) -> Vec3 {
        self.pos[1]
    }

    /// Checks if the connection can be traversed in both directions
    pub fn is_bidirectional(&self) -> bool {
        self.flags & OFFMESH_CON_BIDIR != 0
    }
}

/// Per-tile metadata
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct MeshHeader {
    /// Tile grid x coordinate
    pub x: i32,
    /// Tile grid y coordinate
    pub y: i32,
    /// Layer of the tile within its grid cell
    pub layer: i32,
    /// User defined id
    pub user_id: u32,
    pub poly_count: usize,
    pub vert_count: usize,
    /// Capacity of the link pool
    pub max_link_count: usize,
    pub detail_mesh_count: usize,
    pub detail_vert_count: usize,
    pub detail_tri_count: usize,
    pub bv_node_count: usize,
    pub off_mesh_con_count: usize,
    /// Index of the first off-mesh connection polygon
    pub off_mesh_base: usize,
    pub walkable_height: f32,
    pub walkable_radius: f32,
    pub walkable_climb: f32,
    /// World-space bounds of the tile
    pub bounds: BBox3,
    /// Scale from tile-local coordinates into bounding-volume space
    pub bv_quant_factor: f32,
}

impl MeshHeader {
    /// Creates a header for the tile at the given grid location
    pub fn new(x: i32, y: i32, layer: i32) -> Self {
        Self {
            x,
            y,
            layer,
            ..Default::default()
        }
    }
}

/// One spatial partition of the navigation mesh
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct MeshTile {
    /// Generation of the slot this tile occupies
    pub salt: u32,
    /// Head of the free link list, [`NULL_LINK`] when exhausted
    pub links_free_list: u32,
    pub header: MeshHeader,
    pub polys: Vec<Poly>,
    pub verts: Vec<Vec3>,
    pub links: Vec<Link>,
    pub detail_meshes: Vec<PolyDetail>,
    pub detail_verts: Vec<Vec3>,
    pub detail_tris: Vec<DetailTriangle>,
    pub bv_tree: Vec<BVNode>,
    pub off_mesh_cons: Vec<OffMeshConnection>,
}

impl MeshTile {
    /// Creates an empty tile with the given header
    pub fn new(header: MeshHeader) -> Self {
        Self {
            salt: 0,
            links_free_list: NULL_LINK,
            header,
            ..Default::default()
        }
    }

    /// Checks the structural invariants of the tile data
    ///
    /// Header counts must match array lengths and every index stored in the
    /// tile must point inside the array it addresses.
    pub fn validate(&self) -> Result<()> {
        let h = &self.header;
        let counts = [
            ("polys", h.poly_count, self.polys.len()),
            ("verts", h.vert_count, self.verts.len()),
            ("detail meshes", h.detail_mesh_count, self.detail_meshes.len()),
            ("detail verts", h.detail_vert_count, self.detail_verts.len()),
            ("detail tris", h.detail_tri_count, self.detail_tris.len()),
            ("bv nodes", h.bv_node_count, self.bv_tree.len()),
            ("off-mesh connections", h.off_mesh_con_count, self.off_mesh_cons.len()),
        ];
        for (name, expected, actual) in counts {
            if expected != actual {
                log::warn!(
                    "tile ({}, {}, {}): header declares {} {}, found {}",
                    h.x,
                    h.y,
                    h.layer,
                    expected,
                    name,
                    actual
                );
                return Err(Status::DataCorrupted);
            }
        }

        if self.detail_meshes.len() > self.polys.len()
            || h.off_mesh_base + h.off_mesh_con_count > self.polys.len()
        {
            return Err(Status::DataCorrupted);
        }

        for poly in &self.polys {
            let n = poly.vert_count();
            if !vert_count_allowed(poly.poly_type(), n) || poly.vertex_indices().iter().any(|&v| v as usize >= self.verts.len()) {
                return Err(Status::DataCorrupted);
            }
            if (0..n).any(|j| poly.neighbour(j).is_some_and(|nei| nei >= self.polys.len())) {
                return Err(Status::DataCorrupted);
            }
        }

        for (detail, poly) in self.detail_meshes.iter().zip(&self.polys) {
            let verts_end = detail.vert_base as usize + detail.vert_count as usize;
            let tris_end = detail.tri_base as usize + detail.tri_count as usize;
            if verts_end > self.detail_verts.len() || tris_end > self.detail_tris.len() {
                return Err(Status::DataCorrupted);
            }

            // Triangle corners stay within the polygon's own vertices
            let corner_limit = poly.vert_count() + detail.vert_count as usize;
            let tris = &self.detail_tris[detail.tri_base as usize..tris_end];
            if tris
                .iter()
                .any(|t| t.verts.iter().any(|&v| v as usize >= corner_limit))
            {
                return Err(Status::DataCorrupted);
            }
        }

        for (i, node) in self.bv_tree.iter().enumerate() {
            let in_range = if node.is_leaf() {
                (node.index as usize) < self.polys.len()
            } else {
                i + node.index.unsigned_abs() as usize <= self.bv_tree.len()
            };
            if !in_range {
                return Err(Status::DataCorrupted);
            }
        }

        for con in &self.off_mesh_cons {
            match self.polys.get(con.poly as usize) {
                Some(poly) if poly.is_off_mesh_connection() => {}
                _ => return Err(Status::DataCorrupted),
            }
        }

        Ok(())
    }

    /// Sizes the link pool to `header.max_link_count` and threads every link
    /// onto the free list
    ///
    /// All polygon link chains are cleared.
    pub fn init_link_free_list(&mut self) {
        let count = self.header.max_link_count;
        self.links.clear();
        self.links.resize(count, Link::default());
        for (i, link) in self.links.iter_mut().enumerate() {
            link.next = if i + 1 < count { (i + 1) as u32 } else { NULL_LINK };
        }
        self.links_free_list = if count > 0 { 0 } else { NULL_LINK };

        for poly in &mut self.polys {
            poly.first_link = NULL_LINK;
        }
    }

    /// Takes a link from the free list
    ///
    /// Returns `None` when the pool is exhausted.
    pub fn alloc_link(&mut self) -> Option<u32> {
        let idx = self.links_free_list;
        let link = self.links.get_mut(idx as usize)?;
        self.links_free_list = link.next;
        *link = Link::default();
        Some(idx)
    }

    /// Returns a link to the free list
    pub fn free_link(&mut self, idx: u32) -> Result<()> {
        let link = self.links.get_mut(idx as usize).ok_or(Status::InvalidParam)?;
        *link = Link {
            next: self.links_free_list,
            ..Link::default()
        };
        self.links_free_list = idx;
        Ok(())
    }

    /// Number of links currently on the free list
    pub fn free_link_count(&self) -> usize {
        let mut count = 0;
        let mut idx = self.links_free_list;
        while let Some(link) = self.links.get(idx as usize) {
            count += 1;
            if count > self.links.len() {
                // cycle
                break;
            }
            idx = link.next;
        }
        count
    }

    /// Prepends an allocated link to a polygon's link chain
    pub fn connect_link(&mut self, poly_idx: usize, link_idx: u32) -> Result<()> {
        let poly = self.polys.get_mut(poly_idx).ok_or(Status::InvalidParam)?;
        let link = self.links.get_mut(link_idx as usize).ok_or(Status::InvalidParam)?;
        link.next = poly.first_link;
        poly.first_link = link_idx;
        Ok(())
    }

    /// Iterates the links of a polygon in chain order
    pub fn poly_links(&self, poly_idx: usize) -> PolyLinks<'_> {
        let next = self
            .polys
            .get(poly_idx)
            .map_or(NULL_LINK, |poly| poly.first_link);
        PolyLinks {
            links: &self.links,
            next,
            remaining: self.links.len(),
        }
    }

    /// Finds the link leaving a polygon through `edge`
    pub fn find_link(&self, poly_idx: usize, edge: u8) -> Option<&Link> {
        self.poly_links(poly_idx)
            .map(|(_, link)| link)
            .find(|link| link.edge == edge)
    }

    /// Unhooks every link for which `pred` holds and returns it to the free
    /// list; returns the number of links released
    pub fn disconnect_links<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&Link) -> bool,
    {
        let mut released = 0;

        for poly_idx in 0..self.polys.len() {
            let mut prev = NULL_LINK;
            let mut cur = self.polys[poly_idx].first_link;
            while let Some(slot) = self.links.get_mut(cur as usize) {
                let link = *slot;
                if pred(&link) {
                    // Push onto the free list in place
                    *slot = Link {
                        next: self.links_free_list,
                        ..Link::default()
                    };
                    self.links_free_list = cur;
                    released += 1;

                    if prev == NULL_LINK {
                        self.polys[poly_idx].first_link = link.next;
                    } else if let Some(prev_link) = self.links.get_mut(prev as usize) {
                        prev_link.next = link.next;
                    }
                } else {
                    prev = cur;
                }
                cur = link.next;
            }
        }

        released
    }

    /// Creates links between polygons of this tile that share an edge
    ///
    /// `base` is the reference of polygon 0 of this tile. Links are created
    /// in increasing edge order and point at `base | neighbour`. Fails with
    /// [`Status::OutOfMemory`] if the link pool runs dry.
    pub fn connect_int_links(&mut self, base: PolyRef) -> Result<()> {
        for i in 0..self.polys.len() {
            if self.polys[i].is_off_mesh_connection() {
                continue;
            }

            // Walk edges backwards so the chain ends up in edge order
            for j in (0..self.polys[i].vert_count()).rev() {
                let Some(nei) = self.polys[i].neighbour(j) else {
                    continue;
                };

                let Some(idx) = self.alloc_link() else {
                    log::warn!(
                        "tile ({}, {}, {}): link pool of {} exhausted",
                        self.header.x,
                        self.header.y,
                        self.header.layer,
                        self.links.len()
                    );
                    return Err(Status::OutOfMemory);
                };

                self.links[idx as usize] =
                    Link::new(PolyRef::new(base.id() | nei as u32), j as u8, 0xff, 0, 0);
                self.connect_link(i, idx)?;
            }
        }

        Ok(())
    }

    /// Gets the world-space vertices of a polygon
    pub fn poly_vertices(&self, poly_idx: usize) -> Result<Vec<Vec3>> {
        let poly = self.polys.get(poly_idx).ok_or(Status::InvalidParam)?;
        poly.vertex_indices()
            .iter()
            .map(|&v| self.verts.get(v as usize).copied().ok_or(Status::DataCorrupted))
            .collect()
    }

    /// Gets the world-space bounds of a polygon
    pub fn poly_bounds(&self, poly_idx: usize) -> Result<BBox3> {
        let verts = self.poly_vertices(poly_idx)?;
        Ok(BBox3::from_points(&verts))
    }

    /// Finds the ground polygons whose bounds overlap `query`
    ///
    /// Uses the bounding-volume tree when the tile has one and falls back to
    /// testing each polygon's bounds otherwise. Off-mesh connection polygons
    /// are never returned.
    pub fn query_polygons(&self, query: &BBox3) -> Vec<usize> {
        let mut result = Vec::new();
        if !self.header.bounds.overlaps(query) {
            return result;
        }

        if self.bv_tree.is_empty() {
            for (i, poly) in self.polys.iter().enumerate() {
                if poly.is_off_mesh_connection() {
                    continue;
                }
                if let Ok(bounds) = self.poly_bounds(i) {
                    if overlap_quant_bounds(query.min, query.max, bounds.min, bounds.max) {
                        result.push(i);
                    }
                }
            }
            return result;
        }

        let (qmin, qmax) = self.quantize_query(query);
        let mut node = 0;
        while let Some(n) = self.bv_tree.get(node) {
            let overlap = overlap_quant_bounds(qmin, qmax, n.bounds.min, n.bounds.max);
            let is_leaf = n.is_leaf();

            if is_leaf && overlap {
                let idx = n.index as usize;
                if self.polys.get(idx).is_some_and(|p| !p.is_off_mesh_connection()) {
                    result.push(idx);
                }
            }

            if overlap || is_leaf {
                node += 1;
            } else {
                node += n.index.unsigned_abs() as usize;
            }
        }

        result
    }

    /// Converts world-space query bounds into bounding-volume space
    ///
    /// Minimums round down to even and maximums up to odd values so that
    /// leaves touching the query are always included.
    fn quantize_query(&self, query: &BBox3) -> (Vec3, Vec3) {
        let tb = &self.header.bounds;
        let qfac = self.header.bv_quant_factor;

        let lo = query.min.clamp(tb.min, tb.max) - tb.min;
        let hi = query.max.clamp(tb.min, tb.max) - tb.min;

        let quant_min = |v: f32| ((qfac * v) as u32 & 0xfffe) as f32;
        let quant_max = |v: f32| ((qfac * v + 1.0) as u32 | 1) as f32;

        (
            Vec3::new(quant_min(lo.x), quant_min(lo.y), quant_min(lo.z)),
            Vec3::new(quant_max(hi.x), quant_max(hi.y), quant_max(hi.z)),
        )
    }

    /// Samples the surface height of a polygon at the XZ location of `pos`
    ///
    /// Uses the polygon's detail triangles, or a fan of the polygon itself
    /// when the tile carries no detail mesh for it. Returns `Ok(None)` when
    /// `pos` lies outside the polygon or the polygon is an off-mesh
    /// connection. Detail triangles that are degenerate on the xz-plane are
    /// skipped.
    pub fn poly_height(&self, poly_idx: usize, pos: Vec3) -> navmesh_common::Result<Option<f32>> {
        let poly = self.polys.get(poly_idx).ok_or(Status::InvalidParam)?;
        if poly.is_off_mesh_connection() {
            return Ok(None);
        }

        let verts = self.poly_vertices(poly_idx)?;
        let triangles = match self.detail_meshes.get(poly_idx) {
            Some(detail) => self.detail_triangles(poly, detail, &verts)?,
            None => (2..verts.len())
                .map(|i| [verts[0], verts[i - 1], verts[i]])
                .collect(),
        };

        for [a, b, c] in triangles {
            match closest_height_point_triangle(pos, a, b, c) {
                Ok(Some(h)) => return Ok(Some(h)),
                Ok(None) => {}
                Err(Error::DegenerateGeometry(reason)) => {
                    log::debug!("poly {}: skipping detail triangle, {}", poly_idx, reason);
                }
                Err(err) => return Err(err),
            }
        }

        Ok(None)
    }

    /// Resolves the detail triangles of a polygon into world-space corners
    fn detail_triangles(
        &self,
        poly: &Poly,
        detail: &PolyDetail,
        poly_verts: &[Vec3],
    ) -> Result<Vec<[Vec3; 3]>> {
        let resolve = |idx: u8| -> Result<Vec3> {
            let idx = idx as usize;
            if idx < poly.vert_count() {
                poly_verts.get(idx).copied().ok_or(Status::DataCorrupted)
            } else {
                let local = idx - poly.vert_count();
                if local >= detail.vert_count as usize {
                    return Err(Status::DataCorrupted);
                }
                let detail_idx = detail.vert_base as usize + local;
                self.detail_verts
                    .get(detail_idx)
                    .copied()
                    .ok_or(Status::DataCorrupted)
            }
        };

        let start = detail.tri_base as usize;
        let end = start + detail.tri_count as usize;
        let tris = self.detail_tris.get(start..end).ok_or(Status::DataCorrupted)?;

        tris.iter()
            .map(|t| Ok([resolve(t.verts[0])?, resolve(t.verts[1])?, resolve(t.verts[2])?]))
            .collect()
    }
}

/// Iterator over a polygon's link chain, yielding `(link index, link)`
#[derive(Debug, Clone)]
pub struct PolyLinks<'a> {
    links: &'a [Link],
    next: u32,
    remaining: usize,
}

impl<'a> Iterator for PolyLinks<'a> {
    type Item = (u32, &'a Link);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.next;
        let link = self.links.get(idx as usize)?;
        self.remaining -= 1;
        self.next = link.next;
        Some((idx, link))
    }
}
