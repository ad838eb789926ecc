//! Error taxonomy for lattice, zone and mesh operations.
//!
//! No operation in this crate retries: every input is a deterministic
//! mathematical object, so a failure is never transient. Callers are expected to
//! report [`LatticeError::kind`] together with the offending input carried by
//! the variant.

use thiserror::Error;

/// Coarse classification of [`LatticeError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Zero-volume or malformed cell supplied by the caller
    DegenerateLattice,
    /// Zone construction invariant violated; indicates a bug, not recoverable
    DegenerateBrillouinZone,
    /// Mesh index or band index outside its valid range
    OutOfRange,
    /// Mesh construction contract violated
    InvalidMesh,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LatticeError {
    #[error("degenerate lattice: cell volume {volume:e} is negligible against |a1||a2||a3| = {norm_product:e}")]
    DegenerateLattice { volume: f64, norm_product: f64 },

    #[error("degenerate Brillouin zone: {reason}")]
    DegenerateBrillouinZone { reason: String },

    #[error("mesh index {index:?} outside mesh of dimensions {dims:?}")]
    IndexOutOfRange { index: [usize; 3], dims: [usize; 3] },

    #[error("band {band} outside [0, {num_bands})")]
    BandOutOfRange { band: usize, num_bands: usize },

    #[error("invalid mesh: {reason}")]
    InvalidMesh { reason: String },
}

impl LatticeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DegenerateLattice { .. } => ErrorKind::DegenerateLattice,
            Self::DegenerateBrillouinZone { .. } => ErrorKind::DegenerateBrillouinZone,
            Self::IndexOutOfRange { .. } | Self::BandOutOfRange { .. } => ErrorKind::OutOfRange,
            Self::InvalidMesh { .. } => ErrorKind::InvalidMesh,
        }
    }

    pub(crate) fn degenerate_zone(reason: impl Into<String>) -> Self {
        Self::DegenerateBrillouinZone {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_mesh(reason: impl Into<String>) -> Self {
        Self::InvalidMesh {
            reason: reason.into(),
        }
    }
}

/// Common result type used throughout the library
pub type Result<T> = std::result::Result<T, LatticeError>;
