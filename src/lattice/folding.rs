use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{DEFAULT_SHELL_RADIUS, FOLD_TOLERANCE};
use crate::lattice::lattice_vectors::{reduce_basis, ReciprocalVectors, ReducedBasis};
use crate::lattice::polyhedron::Polyhedron;
use crate::lattice::voronoi_cells::shell_offsets;

/// Point in reciprocal space (cartesian), optionally tagged with the
/// reciprocal-lattice translation n that was subtracted to bring it here:
/// `coords = original − (n₁b₁ + n₂b₂ + n₃b₃)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KPoint {
    pub coords: Vector3<f64>,
    pub translation: Option<Vector3<i32>>,
}

impl KPoint {
    pub fn new(coords: Vector3<f64>) -> Self {
        Self {
            coords,
            translation: None,
        }
    }

    pub fn with_translation(coords: Vector3<f64>, translation: Vector3<i32>) -> Self {
        Self {
            coords,
            translation: Some(translation),
        }
    }

    pub fn coords(&self) -> Vector3<f64> {
        self.coords
    }

    pub fn translation(&self) -> Option<Vector3<i32>> {
        self.translation
    }

    /// Undo the recorded translation.
    pub fn unfold(&self, reciprocal: &ReciprocalVectors) -> Vector3<f64> {
        match self.translation {
            Some(n) => self.coords + reciprocal.lattice_point(n),
            None => self.coords,
        }
    }
}

impl From<Vector3<f64>> for KPoint {
    fn from(coords: Vector3<f64>) -> Self {
        Self::new(coords)
    }
}

/// Maps k-points onto their equivalent image in the first Brillouin zone.
///
/// The search runs in a reduced basis of the reciprocal lattice, where the
/// nearest G lies within one index step of the rounded fractional position
/// for any cell shape. Among the G of the search shell, the one minimizing
/// |k − G| is subtracted. Near-ties (zone boundary) resolve to the
/// lexicographically smallest index tuple in the b₁, b₂, b₃ basis, which does
/// not depend on where in the lattice k started, so folding a folded point is
/// a no-op.
#[derive(Debug, Clone)]
pub struct KSpaceFolder {
    reciprocal: ReciprocalVectors,
    reduced: ReducedBasis,
    /// Cartesian to reduced-basis fractional coordinates
    to_reduced: Matrix3<f64>,
    offsets: Vec<Vector3<i32>>,
    shell_radius: usize,
    tolerance: f64,
}

impl KSpaceFolder {
    pub fn new(reciprocal: &ReciprocalVectors, shell_radius: usize) -> Self {
        let shell_radius = shell_radius.max(1);
        let reduced = reduce_basis(reciprocal.matrix());
        let to_reduced = reduced.basis.try_inverse().unwrap_or_else(Matrix3::zeros);
        let scale = reduced.max_norm();
        Self {
            reciprocal: *reciprocal,
            reduced,
            to_reduced,
            offsets: shell_offsets(shell_radius),
            shell_radius,
            tolerance: FOLD_TOLERANCE * scale * scale,
        }
    }

    /// Folder searching at least the shell the zone was built from.
    pub fn for_zone(reciprocal: &ReciprocalVectors, zone: &Polyhedron) -> Self {
        Self::new(reciprocal, zone.shell_radius().max(DEFAULT_SHELL_RADIUS))
    }

    pub fn shell_radius(&self) -> usize {
        self.shell_radius
    }

    pub fn reciprocal(&self) -> &ReciprocalVectors {
        &self.reciprocal
    }

    /// Returns the folded cartesian point and the index tuple of the
    /// subtracted lattice vector.
    pub fn reduce(&self, k: Vector3<f64>) -> (Vector3<f64>, Vector3<i32>) {
        // Start from the nearest lattice point in reduced fractional
        // coordinates, then search the shell around it for the true nearest one.
        let base = (self.to_reduced * k).map(|x| x.round() as i32);
        let shifted = k - self.reduced.basis * base.map(f64::from);

        let distances: Vec<f64> = self
            .offsets
            .iter()
            .map(|n| (shifted - self.reduced.basis * n.map(f64::from)).norm_squared())
            .collect();
        let nearest = distances.iter().copied().fold(f64::INFINITY, f64::min);

        let total = self
            .offsets
            .iter()
            .zip(&distances)
            .filter(|(_, d)| **d <= nearest + self.tolerance)
            .map(|(n, _)| self.reduced.to_input_indices(base + n))
            .min_by_key(|n| (n.x, n.y, n.z))
            .unwrap_or_else(Vector3::zeros);

        // Subtract in one step so a zero translation leaves k bit-identical
        (k - self.reciprocal.lattice_point(total), total)
    }

    /// Fold one point, composing with any translation it already carries.
    pub fn fold(&self, k: &KPoint) -> KPoint {
        let (coords, n) = self.reduce(k.coords);
        let translation = k.translation.map_or(n, |previous| previous + n);
        KPoint::with_translation(coords, translation)
    }

    pub fn fold_all(&self, points: &[KPoint]) -> Vec<KPoint> {
        #[cfg(feature = "parallel")]
        {
            points.par_iter().map(|k| self.fold(k)).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            points.iter().map(|k| self.fold(k)).collect()
        }
    }
}

/// Fold `k` into the first Brillouin zone using the default search shell.
pub fn fold(k: &KPoint, reciprocal: &ReciprocalVectors) -> KPoint {
    KSpaceFolder::new(reciprocal, DEFAULT_SHELL_RADIUS).fold(k)
}
