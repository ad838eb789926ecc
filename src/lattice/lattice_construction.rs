use nalgebra::Matrix3;

use crate::error::Result;
use crate::lattice::lattice_vectors::LatticeVectors;

// Standard primitive cells for common 3D Bravais lattices (columns are a₁, a₂, a₃)

/// Simple cubic lattice with lattice parameter a
pub fn simple_cubic(a: f64) -> Result<LatticeVectors> {
    LatticeVectors::from_matrix(Matrix3::new(a, 0.0, 0.0, 0.0, a, 0.0, 0.0, 0.0, a))
}

/// Body-centered cubic primitive cell, conventional cube edge a
pub fn body_centered_cubic(a: f64) -> Result<LatticeVectors> {
    let h = a / 2.0;
    LatticeVectors::from_matrix(Matrix3::new(-h, h, h, h, -h, h, h, h, -h))
}

/// Face-centered cubic primitive cell, conventional cube edge a
pub fn face_centered_cubic(a: f64) -> Result<LatticeVectors> {
    let h = a / 2.0;
    LatticeVectors::from_matrix(Matrix3::new(0.0, h, h, h, 0.0, h, h, h, 0.0))
}

pub fn tetragonal(a: f64, c: f64) -> Result<LatticeVectors> {
    LatticeVectors::from_matrix(Matrix3::new(a, 0.0, 0.0, 0.0, a, 0.0, 0.0, 0.0, c))
}

pub fn orthorhombic(a: f64, b: f64, c: f64) -> Result<LatticeVectors> {
    LatticeVectors::from_matrix(Matrix3::new(a, 0.0, 0.0, 0.0, b, 0.0, 0.0, 0.0, c))
}

/// Hexagonal lattice, γ = 120° between a₁ and a₂
pub fn hexagonal(a: f64, c: f64) -> Result<LatticeVectors> {
    LatticeVectors::from_matrix(Matrix3::new(
        a,
        -a / 2.0,
        0.0,
        0.0,
        a * 3.0_f64.sqrt() / 2.0,
        0.0,
        0.0,
        0.0,
        c,
    ))
}

/// Rhombohedral lattice with edge a and inter-axial angle alpha (radians).
///
/// a₁ along x, a₂ in the xy-plane; a₃ fixed by the equal angles to both.
pub fn rhombohedral(a: f64, alpha: f64) -> Result<LatticeVectors> {
    let cos_a = alpha.cos();
    let sin_a = alpha.sin();
    let c_x = cos_a;
    let c_y = (cos_a - cos_a * cos_a) / sin_a;
    let c_z = (1.0 - c_x * c_x - c_y * c_y).max(0.0).sqrt();

    LatticeVectors::from_matrix(Matrix3::new(
        a,
        a * cos_a,
        a * c_x,
        0.0,
        a * sin_a,
        a * c_y,
        0.0,
        0.0,
        a * c_z,
    ))
}
