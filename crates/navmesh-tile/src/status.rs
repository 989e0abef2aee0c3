//! Status codes for tile and reference operations

use navmesh_common::Error;

/// Result type for tile and reference operations
pub type Result<T> = std::result::Result<T, Status>;

/// Failure reasons reported by tile, link and reference operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Operation failed due to an unknown reason
    Failure,
    /// Provided parameter was invalid
    InvalidParam,
    /// A fixed-size pool (tile slots, links) is exhausted
    OutOfMemory,
    /// A tile already occupies the requested grid location
    AlreadyExists,
    /// Value does not exist or is not found
    NotFound,
    /// Reference was formed against an older generation of its tile slot
    StaleReference,
    /// Tile data breaks a structural invariant
    DataCorrupted,
}

impl std::error::Error for Status {}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Failure => write!(f, "Failure"),
            Status::InvalidParam => write!(f, "Invalid parameter"),
            Status::OutOfMemory => write!(f, "Out of memory"),
            Status::AlreadyExists => write!(f, "Value already exists"),
            Status::NotFound => write!(f, "Value not found"),
            Status::StaleReference => write!(f, "Stale reference"),
            Status::DataCorrupted => write!(f, "Data corrupted"),
        }
    }
}

impl From<Status> for Error {
    fn from(status: Status) -> Self {
        Error::NavMesh(status.to_string())
    }
}
