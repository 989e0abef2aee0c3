//! Generational polygon and tile references
//!
//! A reference packs `(salt, tile slot, polygon index)` into 32 bits. The bit
//! widths are derived from [`NavMeshParams`]: enough tile bits for
//! `max_tiles`, enough polygon bits for `max_polys`, and the remaining bits
//! (at most 31) for the salt. The salt is the generation counter of the tile
//! slot; a reference whose salt differs from the slot's current salt is
//! stale.

use crate::status::{Result, Status};
use crate::NavMeshParams;

/// Minimum number of salt bits a reference layout must leave
const MIN_SALT_BITS: u32 = 10;

/// Reference to a polygon in a navigation mesh; zero is the null reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PolyRef(u32);

impl PolyRef {
    /// The null polygon reference
    pub const NULL: PolyRef = PolyRef(0);

    /// Wraps a raw reference value
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Gets the raw reference value
    pub const fn id(&self) -> u32 {
        self.0
    }

    /// Checks if this is the null reference
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for PolyRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PolyRef({:#010x})", self.0)
    }
}

/// Reference to a tile slot; a polygon reference with polygon index zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TileRef(u32);

impl TileRef {
    /// The null tile reference
    pub const NULL: TileRef = TileRef(0);

    /// Wraps a raw reference value
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Gets the raw reference value
    pub const fn id(&self) -> u32 {
        self.0
    }

    /// Checks if this is the null reference
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for TileRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TileRef({:#010x})", self.0)
    }
}

/// Bit layout of polygon and tile references
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct RefEncoding {
    salt_bits: u32,
    tile_bits: u32,
    poly_bits: u32,
}

impl RefEncoding {
    /// Derives the reference layout for the given tiling configuration
    pub fn from_params(params: &NavMeshParams) -> Result<Self> {
        let tile_bits = index_bits(params.max_tiles)?;
        let poly_bits = index_bits(params.max_polys)?;
        if tile_bits + poly_bits >= 32 {
            return Err(Status::InvalidParam);
        }

        let salt_bits = (32 - tile_bits - poly_bits).min(31);
        if salt_bits < MIN_SALT_BITS {
            return Err(Status::InvalidParam);
        }

        Ok(Self {
            salt_bits,
            tile_bits,
            poly_bits,
        })
    }

    /// Number of bits used for the salt
    pub fn salt_bits(&self) -> u32 {
        self.salt_bits
    }

    /// Number of bits used for the tile slot index
    pub fn tile_bits(&self) -> u32 {
        self.tile_bits
    }

    /// Number of bits used for the polygon index
    pub fn poly_bits(&self) -> u32 {
        self.poly_bits
    }

    #[inline]
    fn salt_mask(&self) -> u32 {
        (1 << self.salt_bits) - 1
    }

    #[inline]
    fn tile_mask(&self) -> u32 {
        (1 << self.tile_bits) - 1
    }

    #[inline]
    fn poly_mask(&self) -> u32 {
        (1 << self.poly_bits) - 1
    }

    /// Packs salt, tile slot and polygon index into a polygon reference
    #[inline]
    pub fn encode_poly_ref(&self, salt: u32, tile: u32, poly: u32) -> PolyRef {
        PolyRef::new(
            ((salt & self.salt_mask()) << (self.poly_bits + self.tile_bits))
                | ((tile & self.tile_mask()) << self.poly_bits)
                | (poly & self.poly_mask()),
        )
    }

    /// Unpacks a polygon reference into `(salt, tile, poly)`
    #[inline]
    pub fn decode_poly_ref(&self, reference: PolyRef) -> (u32, u32, u32) {
        let id = reference.id();
        let salt = (id >> (self.poly_bits + self.tile_bits)) & self.salt_mask();
        let tile = (id >> self.poly_bits) & self.tile_mask();
        let poly = id & self.poly_mask();
        (salt, tile, poly)
    }

    /// Packs salt and tile slot into a tile reference
    #[inline]
    pub fn encode_tile_ref(&self, salt: u32, tile: u32) -> TileRef {
        TileRef::new(self.encode_poly_ref(salt, tile, 0).id())
    }

    /// Unpacks a tile reference into `(salt, tile)`
    #[inline]
    pub fn decode_tile_ref(&self, reference: TileRef) -> (u32, u32) {
        let (salt, tile, _) = self.decode_poly_ref(PolyRef::new(reference.id()));
        (salt, tile)
    }

    /// Salt a slot takes after its current generation is retired
    ///
    /// Salts wrap within the salt bits and skip zero, so a valid reference is
    /// never the null reference.
    pub fn next_salt(&self, salt: u32) -> u32 {
        let next = salt.wrapping_add(1) & self.salt_mask();
        if next == 0 {
            1
        } else {
            next
        }
    }
}

/// Number of bits needed to index `count` items
///
/// Zero counts and counts above `2^31` have no layout.
fn index_bits(count: u32) -> Result<u32> {
    if count == 0 {
        return Err(Status::InvalidParam);
    }
    count
        .checked_next_power_of_two()
        .map(u32::ilog2)
        .ok_or(Status::InvalidParam)
}
