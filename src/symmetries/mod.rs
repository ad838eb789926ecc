// Symmetries module: crystallographic operations supplied by an external
// symmetry library, and the k-point reduction they enable

// ======================== MODULE DECLARATIONS ========================
pub mod irreducible_kpoints;
pub mod symmetry_operations;
pub mod symmetry_point_groups;


// ======================== SYMMETRY OPERATIONS ========================
pub use symmetry_operations::SymmetryOperation; // struct - rotation (integer, fractional basis) + translation
// SymmetryOperation impl methods:
//   new(rotation, translation) / identity() / inversion()          - constructors
//   from_cartesian(rotation, lattice, tolerance) -> Option<Self>   - converts a cartesian rotation if it preserves the lattice
//   apply(&self, point) -> Vector3<f64>                            - acts on direct fractional coordinates
//   rotate_reciprocal(&self, kappa) -> Vector3<f64>                - acts on reciprocal fractional coordinates
//   compose / determinant / is_proper / order / is_identity

// ======================== POINT GROUP GENERATORS ========================
pub use symmetry_point_groups::{
    generate_cubic_operations,       // fn() -> Vec<Matrix3<f64>> - Oh in cartesian coordinates
    generate_hexagonal_operations,   // fn() -> Vec<Matrix3<f64>> - D6h in cartesian coordinates
    generate_symmetry_operations_3d, // fn(lattice, tolerance) -> Vec<SymmetryOperation> - operations preserving the lattice
};

// ======================== K-POINT REDUCTION ========================
pub use irreducible_kpoints::{
    WeightedKPoint,      // struct - orbit representative with multiplicity
    irreducible_kpoints, // fn(points, folder, operations, time_reversal) -> Vec<WeightedKPoint>
};
