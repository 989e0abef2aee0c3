//! Common math and error types shared by the navigation mesh crates
//!
//! Positions are `glam::Vec3` with Y up; most navigation geometry is evaluated
//! on the XZ plane.

mod bounds;
mod geometry;

pub use bounds::*;
pub use geometry::*;

/// Represents a 3D position
pub type Vec3 = glam::Vec3;

/// Error types for the library
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("navigation mesh error: {0}")]
    NavMesh(String),
}

/// Result type for navigation mesh operations
pub type Result<T> = std::result::Result<T, Error>;
