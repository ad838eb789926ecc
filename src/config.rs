// Constants and tunables shared by all modules

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

// Conventions

/// Reciprocal basis scale: aᵢ·bⱼ = RECIPROCAL_SCALE·δᵢⱼ (physics 2π convention).
pub const RECIPROCAL_SCALE: f64 = TAU;

// Tolerances
pub const DEGENERACY_TOLERANCE: f64 = 1e-10; // |V| relative to |a1||a2||a3|
pub const GEOMETRY_TOLERANCE: f64 = 1e-9; // Plane tests, relative to the longest reciprocal vector
pub const FOLD_TOLERANCE: f64 = 1e-9; // Tie detection while folding, relative to |b|²
pub const SYMMETRY_KEY_RESOLUTION: f64 = 1e6; // Steps per reciprocal vector when comparing orbits
pub const VOLUME_TOLERANCE: f64 = 1e-8; // Cell volume against |det|, relative

// Brillouin zone construction
pub const DEFAULT_SHELL_RADIUS: usize = 2;
pub const MAX_SHELL_RADIUS: usize = 6;
pub const MIN_ZONE_FACES: usize = 4;
pub const MAX_REDUCTION_SWEEPS: usize = 64; // Basis reduction passes before giving up on further shortening

// Mesh resampling
pub const IDW_POWER: f64 = 2.0; // Inverse-distance weighting exponent for scattered samples

/// Settings for the Brillouin zone builder.
///
/// `shell_radius` controls the candidate-neighbor search radius: lattice
/// points `n1·c1 + n2·c2 + n3·c3` of the reduced basis with
/// `|nᵢ| ≤ shell_radius` are tested. With `adaptive` enabled the shell grows
/// until the cell volume matches the lattice volume, and reaching
/// `max_shell_radius` first is an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    pub shell_radius: usize,
    pub adaptive: bool,
    pub max_shell_radius: usize,
    /// Relative tolerance for plane classification and vertex merging
    pub tolerance: f64,
}

impl ZoneConfig {
    /// Fixed shell, no adaptive growth.
    pub fn with_fixed_shell(shell_radius: usize) -> Self {
        Self {
            shell_radius,
            adaptive: false,
            ..Self::default()
        }
    }
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            shell_radius: DEFAULT_SHELL_RADIUS,
            adaptive: true,
            max_shell_radius: MAX_SHELL_RADIUS,
            tolerance: GEOMETRY_TOLERANCE,
        }
    }
}
