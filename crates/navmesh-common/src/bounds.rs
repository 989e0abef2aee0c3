//! Axis-aligned bounding boxes

use glam::Vec3;

/// Axis-aligned bounding box with component-wise min/max corners
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct BBox3 {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Default for BBox3 {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::ZERO)
    }
}

impl BBox3 {
    /// Creates a new box from its corners
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates an empty (inverted) box that any point will expand
    pub const fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
        }
    }

    /// Creates the tightest box containing all `points`
    ///
    /// Returns an empty box when `points` is empty.
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Vec3>,
    {
        let mut bounds = Self::empty();
        for p in points {
            bounds.expand_point(*p);
        }
        bounds
    }

    /// Checks if the box encloses at least one point
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// Expands this box to include a point
    pub fn expand_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Expands this box to include another box
    pub fn expand(&mut self, other: &BBox3) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Checks if this box overlaps another; touching faces count as overlap
    pub fn overlaps(&self, other: &BBox3) -> bool {
        !(self.min.x > other.max.x
            || self.max.x < other.min.x
            || self.min.y > other.max.y
            || self.max.y < other.min.y
            || self.min.z > other.max.z
            || self.max.z < other.min.z)
    }

    /// Checks if the point lies inside or on the box
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.min.cmple(point).all() && point.cmple(self.max).all()
    }

    /// Gets the center of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Gets the extent of the box along each axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}
