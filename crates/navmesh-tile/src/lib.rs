//! Tiled navigation mesh data model and point-location predicates
//!
//! A navigation mesh is partitioned into tiles. Each [`MeshTile`] owns its
//! polygons, vertices, adjacency links, bounding-volume tree, detail
//! triangles and off-mesh connections. [`NavMesh`] attaches tiles to
//! generational slots so that [`PolyRef`] values formed against a removed
//! tile are detected as stale.
//!
//! The [`predicates`] module holds the geometric primitives higher level
//! queries are built on. They operate on plain vertex slices, not on tiles.
//!
//! # Example
//!
//! ```rust,ignore
//! use navmesh_tile::{NavMesh, NavMeshParams};
//! use glam::Vec3;
//!
//! let mut nav_mesh = NavMesh::new(NavMeshParams::default())?;
//! let tile_ref = nav_mesh.add_tile(tile)?;
//!
//! let bounds = BBox3::new(Vec3::new(1.0, -1.0, 1.0), Vec3::new(2.0, 1.0, 2.0));
//! for poly_ref in nav_mesh.query_polygons(&bounds) {
//!     let height = nav_mesh.poly_height(poly_ref, Vec3::new(1.5, 0.0, 1.5))?;
//! }
//! ```

pub mod mesh_tile;
pub mod nav_mesh;
pub mod poly_ref;
pub mod predicates;
pub mod status;

pub use mesh_tile::*;
pub use nav_mesh::NavMesh;
pub use poly_ref::{PolyRef, RefEncoding, TileRef};
pub use status::Status;

pub use navmesh_common::{BBox3, Error, Result, Vec3};

#[cfg(test)]
mod test_mesh_helpers;



/// Maximum number of vertices per navigation polygon
pub const VERTS_PER_POLYGON: usize = 6;

/// Neighbour flag marking an edge that links to another tile
pub const EXT_LINK: u16 = 0x8000;

/// Link index that terminates a link chain or the free list
pub const NULL_LINK: u32 = 0xffff_ffff;

/// Maximum number of user defined area ids
pub const MAX_AREAS: usize = 64;

/// Off-mesh connection flag: traversable in both directions
pub const OFFMESH_CON_BIDIR: u8 = 1;

bitflags::bitflags! {
    /// User defined polygon flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(
        feature = "serialization",
        derive(serde::Serialize, serde::Deserialize)
    )]
    pub struct PolyFlags: u16 {
        /// Ground that can be walked on
        const WALK = 0x01;
        /// Water
        const SWIM = 0x02;
        /// Door that can be opened
        const DOOR = 0x04;
        /// Jump link
        const JUMP = 0x08;
        /// Temporarily disabled
        const DISABLED = 0x10;
    }
}

bitflags::bitflags! {
    /// Vertex flags returned by straight path queries
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StraightPathFlags: u8 {
        /// The vertex is the start position of the path
        const START = 0x01;
        /// The vertex is the end position of the path
        const END = 0x02;
        /// The vertex is the start of an off-mesh connection
        const OFFMESH_CONNECTION = 0x04;
    }
}

bitflags::bitflags! {
    /// Options for straight path queries
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StraightPathOptions: u8 {
        /// Add a vertex at every polygon edge crossing where the area changes
        const AREA_CROSSINGS = 0x01;
        /// Add a vertex at every polygon edge crossing
        const ALL_CROSSINGS = 0x02;
    }
}

/// Polygon type, stored in the two high bits of the packed area byte
///
/// Every 2-bit code has a variant, so packed bytes always decode. Codes 2
/// and 3 are reserved; polygons carrying them are shaped like ground
/// polygons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
#[repr(u8)]
pub enum PolyType {
    /// Regular walkable surface polygon
    #[default]
    Ground = 0,
    /// Two-vertex polygon standing in for an off-mesh connection
    OffMeshConnection = 1,
    /// Reserved type code 2
    Reserved2 = 2,
    /// Reserved type code 3
    Reserved3 = 3,
}

impl PolyType {
    /// Converts a two-bit type code back into a polygon type; bits above the
    /// low two are ignored
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => PolyType::Ground,
            1 => PolyType::OffMeshConnection,
            2 => PolyType::Reserved2,
            _ => PolyType::Reserved3,
        }
    }

    /// Gets the two-bit type code
    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// Global tiling configuration of a navigation mesh
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct NavMeshParams {
    /// World-space origin of the tile grid
    pub origin: Vec3,
    /// Width of a tile along the X axis
    pub tile_width: f32,
    /// Height of a tile along the Z axis
    pub tile_height: f32,
    /// Maximum number of tiles the mesh can hold
    pub max_tiles: u32,
    /// Maximum number of polygons in a single tile
    pub max_polys: u32,
}

impl Default for NavMeshParams {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            tile_width: 32.0,
            tile_height: 32.0,
            max_tiles: 64,
            max_polys: 1024,
        }
    }
}

impl NavMeshParams {
    /// Checks that the parameters describe a usable tile grid
    pub fn validate(&self) -> status::Result<()> {
        if !self.origin.is_finite() {
            return Err(Status::InvalidParam);
        }

        if !(self.tile_width.is_finite() && self.tile_width > 0.0)
            || !(self.tile_height.is_finite() && self.tile_height > 0.0)
        {
            return Err(Status::InvalidParam);
        }

        if self.max_tiles == 0 || self.max_polys == 0 {
            return Err(Status::InvalidParam);
        }

        Ok(())
    }
}
