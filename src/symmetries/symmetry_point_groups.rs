use nalgebra::Matrix3;
use std::f64::consts::PI;

use crate::lattice::lattice_vectors::LatticeVectors;
use crate::symmetries::symmetry_operations::SymmetryOperation;

/// The 48 cartesian operations of Oh (all signed permutation matrices).
pub fn generate_cubic_operations() -> Vec<Matrix3<f64>> {
    const PERMUTATIONS: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];

    let mut ops = Vec::with_capacity(48);
    for permutation in PERMUTATIONS {
        for signs in 0..8 {
            let mut rotation = Matrix3::zeros();
            for (row, &column) in permutation.iter().enumerate() {
                rotation[(row, column)] = if signs & (1 << row) != 0 { -1.0 } else { 1.0 };
            }
            ops.push(rotation);
        }
    }
    ops
}

/// The 24 cartesian operations of D6h with the 6-fold axis along z.
pub fn generate_hexagonal_operations() -> Vec<Matrix3<f64>> {
    let mut proper = Vec::with_capacity(12);

    // 6-fold rotations about z
    for n in 0..6 {
        let (sin, cos) = (n as f64 * PI / 3.0).sin_cos();
        proper.push(Matrix3::new(cos, -sin, 0.0, sin, cos, 0.0, 0.0, 0.0, 1.0));
    }
    // 2-fold axes in the xy-plane, every 30°
    for m in 0..6 {
        let (sin, cos) = (m as f64 * PI / 3.0).sin_cos();
        proper.push(Matrix3::new(cos, sin, 0.0, sin, -cos, 0.0, 0.0, 0.0, -1.0));
    }

    let improper: Vec<Matrix3<f64>> = proper.iter().map(|r| -r).collect();
    proper.extend(improper);
    proper
}

/// Point-group operations of the lattice, in its fractional basis.
///
/// Candidates are the cubic and hexagonal holohedries in their standard
/// cartesian setting; those that map the lattice onto itself are kept. Lattices
/// in a non-standard orientation get only the operations that survive.
pub fn generate_symmetry_operations_3d(
    lattice: &LatticeVectors,
    tolerance: f64,
) -> Vec<SymmetryOperation> {
    let mut ops: Vec<SymmetryOperation> = Vec::new();
    for rotation in generate_cubic_operations()
        .iter()
        .chain(generate_hexagonal_operations().iter())
    {
        if let Some(op) = SymmetryOperation::from_cartesian(rotation, lattice, tolerance) {
            if !ops.contains(&op) {
                ops.push(op);
            }
        }
    }
    ops
}
