//! Reciprocal lattices, first Brillouin zones and Fermi surfaces
//!
//! This library computes the reciprocal basis of a crystal lattice, builds the
//! first Brillouin zone as a convex polyhedron, folds k-points into it and
//! extracts Fermi-surface sheets from band energies sampled on a periodic
//! k-mesh.
//!
//! ```no_run
//! use fermi_lattice::fermi::{extract_fermi_surfaces, MeshField};
//! use fermi_lattice::lattice::{compute_brillouin_zone_default, reciprocal, simple_cubic};
//! use nalgebra::Vector3;
//!
//! # fn main() -> fermi_lattice::Result<()> {
//! let lattice = simple_cubic(1.0)?;
//! let recip = reciprocal(&lattice)?;
//! let zone = compute_brillouin_zone_default(&recip)?;
//!
//! let mesh = MeshField::sample(&recip, [24, 24, 24], Vector3::zeros(), |k| {
//!     vec![-(k.x.cos() + k.y.cos() + k.z.cos())]
//! })?;
//! let surfaces = extract_fermi_surfaces(&mesh, 0.0, &zone);
//! assert!(!surfaces.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod fermi;
pub mod lattice;
pub mod symmetries;

pub use error::{ErrorKind, LatticeError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
