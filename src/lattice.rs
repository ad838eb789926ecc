//! Lattice module: direct and reciprocal bases, Wigner–Seitz cells / first Brillouin zones, k-point folding.
//!
//! Quick reference
//! - Types: [`LatticeVectors`], [`ReciprocalVectors`], [`Polyhedron`], [`FacePlane`], [`KPoint`], [`KSpaceFolder`]
//! - Reciprocal basis: [`reciprocal`]
//! - Construction: [`simple_cubic`], [`body_centered_cubic`], [`face_centered_cubic`], [`tetragonal`],
//!   [`orthorhombic`], [`hexagonal`], [`rhombohedral`]
//! - Voronoi/WS/BZ: [`compute_brillouin_zone`], [`compute_brillouin_zone_default`], [`compute_wigner_seitz_cell`]
//! - Folding: [`fold`], [`KSpaceFolder::fold`], [`KSpaceFolder::fold_all`]
//!
//! See submodules for full details: [`lattice_vectors`], [`lattice_construction`], [`voronoi_cells`], [`polyhedron`], [`folding`].

// ======================== MODULE DECLARATIONS ========================
pub mod folding;
pub mod lattice_construction;
pub mod lattice_vectors;
pub mod polyhedron;
pub mod voronoi_cells;

mod _tests_folding;
mod _tests_voronoi_cells;

// ======================== RE-EXPORTED PUBLIC API (curated) ========================
#[doc(inline)]
pub use lattice_vectors::{reciprocal, reduce_basis, LatticeVectors, ReciprocalVectors, ReducedBasis};

#[doc(inline)]
pub use polyhedron::{FacePlane, Polyhedron};

pub use folding::{fold, KPoint, KSpaceFolder};

pub use voronoi_cells::{
    compute_brillouin_zone, compute_brillouin_zone_default, compute_wigner_seitz_cell,
    generate_lattice_points_3d_by_shell, shell_offsets, NeighborPoint,
};

pub use lattice_construction::{
    body_centered_cubic, face_centered_cubic, hexagonal, orthorhombic, rhombohedral, simple_cubic,
    tetragonal,
};

/// A convenience prelude for importing common lattice items.
pub mod prelude {
    #[doc(no_inline)]
    pub use super::{compute_brillouin_zone_default, reciprocal, KPoint, LatticeVectors, Polyhedron};
}
