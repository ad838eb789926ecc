//! Fermi-surface module: band energies on periodic k-meshes and their isosurfaces.
//!
//! Quick reference
//! - Data: [`MeshField`], [`IsoSurface`], [`IndexedMesh`]
//! - Extraction: [`extract_fermi_surfaces`], [`extract_band_surface`], [`march_band`]
//!
//! Surfaces are produced by marching cubes over the whole periodic mesh and
//! then stitched into the first Brillouin zone: every native triangle is
//! translated by the mesh periods that bring it near the zone and clipped to
//! the zone's face planes.

// ======================== MODULE DECLARATIONS ========================
pub mod extractor;
pub mod isosurface;
pub mod marching_cubes;
pub mod mesh_field;


// ======================== RE-EXPORTED PUBLIC API ========================
#[doc(inline)]
pub use mesh_field::MeshField;

pub use isosurface::{IndexedMesh, IsoSurface};

pub use extractor::{extract_band_surface, extract_fermi_surfaces};

pub use marching_cubes::{case_table, march_band};
