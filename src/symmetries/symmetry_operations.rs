use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::lattice::lattice_vectors::LatticeVectors;

/// A single symmetry operation: rotation (integer matrix) + translation,
/// both in direct-lattice fractional coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymmetryOperation {
    /// Rotation part with determinant ±1
    pub rotation: Matrix3<i32>,
    /// Fractional translation shift
    pub translation: Vector3<f64>,
}

impl SymmetryOperation {
    /// Create a new symmetry operation
    pub fn new(rotation: Matrix3<i32>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Create identity operation
    pub fn identity() -> Self {
        Self::new(Matrix3::identity(), Vector3::zeros())
    }

    pub fn inversion() -> Self {
        Self::new(-Matrix3::identity(), Vector3::zeros())
    }

    /// Express a cartesian rotation in the fractional basis of `lattice`
    /// (A⁻¹·R·A). Returns `None` unless the result is an integer matrix, that
    /// is unless the rotation maps the lattice onto itself.
    pub fn from_cartesian(
        rotation: &Matrix3<f64>,
        lattice: &LatticeVectors,
        tolerance: f64,
    ) -> Option<Self> {
        let direct = lattice.matrix();
        let fractional = direct.try_inverse()? * rotation * direct;
        let rounded = fractional.map(f64::round);
        if (fractional - rounded).abs().max() > tolerance {
            return None;
        }
        Some(Self::new(rounded.map(|x| x as i32), Vector3::zeros()))
    }

    /// Apply symmetry operation to a point in fractional coordinates
    pub fn apply(&self, point: Vector3<f64>) -> Vector3<f64> {
        self.rotation.map(f64::from) * point + self.translation
    }

    /// Image of a reciprocal fractional coordinate. Wave vectors transform
    /// with the transpose and ignore the translation part.
    pub fn rotate_reciprocal(&self, kappa: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.transpose().map(f64::from) * kappa
    }

    /// `self ∘ other`: apply `other` first.
    pub fn compose(&self, other: &Self) -> Self {
        Self::new(
            self.rotation * other.rotation,
            self.rotation.map(f64::from) * other.translation + self.translation,
        )
    }

    pub fn determinant(&self) -> i32 {
        self.rotation.map(f64::from).determinant().round() as i32
    }

    /// Pure rotation (no inversion component)
    pub fn is_proper(&self) -> bool {
        self.determinant() == 1
    }

    /// Smallest n with Rⁿ = 1, ignoring the translation. Crystallographic
    /// rotations have order 1, 2, 3, 4 or 6.
    pub fn order(&self) -> Option<usize> {
        let mut power = self.rotation;
        for n in 1..=6 {
            if power == Matrix3::identity() {
                return Some(n);
            }
            power *= self.rotation;
        }
        None
    }

    /// Check if this is the identity operation
    pub fn is_identity(&self) -> bool {
        self.rotation == Matrix3::identity() && self.translation.norm() < 1e-10
    }
}
