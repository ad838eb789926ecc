use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{DEGENERACY_TOLERANCE, IDW_POWER};
use crate::error::{LatticeError, Result};
use crate::lattice::lattice_vectors::ReciprocalVectors;

/// Band energies sampled on a regular periodic k-mesh.
///
/// Point (i, j, k) sits at `origin + i·s₁ + j·s₂ + k·s₃` where sⱼ are the
/// columns of `steps`. The field repeats with periods nⱼ·sⱼ. Energies are one
/// flat buffer holding `num_bands` values per point, points in C order (k
/// fastest).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshField {
    dims: [usize; 3],
    origin: Vector3<f64>,
    steps: Matrix3<f64>,
    num_bands: usize,
    energies: Vec<f64>,
}

impl MeshField {
    /// `energies[p]` lists the band energies at point p (C order).
    pub fn new(
        dims: [usize; 3],
        origin: Vector3<f64>,
        steps: Matrix3<f64>,
        energies: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if dims.contains(&0) {
            return Err(LatticeError::invalid_mesh(format!(
                "dimensions {dims:?} must all be positive"
            )));
        }
        let num_points = dims[0] * dims[1] * dims[2];
        if energies.len() != num_points {
            return Err(LatticeError::invalid_mesh(format!(
                "{} energy records for {} mesh points",
                energies.len(),
                num_points
            )));
        }
        let num_bands = energies[0].len();
        if num_bands == 0 {
            return Err(LatticeError::invalid_mesh("no bands supplied"));
        }
        if let Some(point) = energies.iter().position(|bands| bands.len() != num_bands) {
            return Err(LatticeError::invalid_mesh(format!(
                "point {} has {} bands, expected {}",
                point,
                energies[point].len(),
                num_bands
            )));
        }
        if !origin.iter().all(|x| x.is_finite()) {
            return Err(LatticeError::invalid_mesh("origin is not finite"));
        }

        let norm_product: f64 = (0..3).map(|i| steps.column(i).norm()).product();
        let volume = steps.determinant();
        if !volume.is_finite() || volume.abs() <= DEGENERACY_TOLERANCE * norm_product {
            return Err(LatticeError::invalid_mesh("step vectors are linearly dependent"));
        }

        let energies: Vec<f64> = energies.into_iter().flatten().collect();
        if let Some(flat) = energies.iter().position(|e| !e.is_finite()) {
            return Err(LatticeError::invalid_mesh(format!(
                "non-finite energy at point {} band {}",
                flat / num_bands,
                flat % num_bands
            )));
        }

        Ok(Self {
            dims,
            origin,
            steps,
            num_bands,
            energies,
        })
    }

    /// Γ-anchored mesh spanning one reciprocal cell: steps bⱼ/nⱼ, endpoint
    /// excluded.
    pub fn from_reciprocal(
        reciprocal: &ReciprocalVectors,
        dims: [usize; 3],
        energies: Vec<Vec<f64>>,
    ) -> Result<Self> {
        Self::new(dims, Vector3::zeros(), cell_steps(reciprocal, dims)?, energies)
    }

    /// Evaluate a band calculator at every point of a mesh spanning one
    /// reciprocal cell, starting at `origin`.
    pub fn sample<F>(
        reciprocal: &ReciprocalVectors,
        dims: [usize; 3],
        origin: Vector3<f64>,
        band_energies: F,
    ) -> Result<Self>
    where
        F: Fn(Vector3<f64>) -> Vec<f64> + Sync,
    {
        let steps = cell_steps(reciprocal, dims)?;
        let positions: Vec<Vector3<f64>> = mesh_indices(dims)
            .map(|index| origin + steps * index.map(|x| x as f64))
            .collect();

        #[cfg(feature = "parallel")]
        let energies: Vec<Vec<f64>> = positions.par_iter().map(|k| band_energies(*k)).collect();
        #[cfg(not(feature = "parallel"))]
        let energies: Vec<Vec<f64>> = positions.iter().map(|k| band_energies(*k)).collect();

        Self::new(dims, origin, steps, energies)
    }

    /// Resample scattered k-points onto a Γ-anchored mesh by inverse-distance
    /// weighting. Distances use the nearest periodic image; mesh points that
    /// coincide with a sample take its energies verbatim.
    pub fn from_scattered(
        reciprocal: &ReciprocalVectors,
        dims: [usize; 3],
        kpoints: &[Vector3<f64>],
        energies: &[Vec<f64>],
    ) -> Result<Self> {
        if kpoints.is_empty() || kpoints.len() != energies.len() {
            return Err(LatticeError::invalid_mesh(format!(
                "{} scattered k-points with {} energy records",
                kpoints.len(),
                energies.len()
            )));
        }
        let num_bands = energies[0].len();
        if energies.iter().any(|bands| bands.len() != num_bands) {
            return Err(LatticeError::invalid_mesh("scattered samples disagree on band count"));
        }

        let steps = cell_steps(reciprocal, dims)?;
        let fractions: Vec<Vector3<f64>> = kpoints.iter().map(|k| reciprocal.cart_to_frac(*k)).collect();
        let hit_radius = DEGENERACY_TOLERANCE * reciprocal.max_norm();

        let interpolate = |index: Vector3<usize>| -> Vec<f64> {
            let target = reciprocal.cart_to_frac(steps * index.map(|x| x as f64));
            let mut weighted = vec![0.0; num_bands];
            let mut total_weight = 0.0;
            for (fraction, bands) in fractions.iter().zip(energies) {
                let delta = (target - fraction).map(|x| x - x.round());
                let distance = reciprocal.frac_to_cart(delta).norm();
                if distance <= hit_radius {
                    return bands.clone();
                }
                let weight = distance.powf(-IDW_POWER);
                total_weight += weight;
                for (acc, e) in weighted.iter_mut().zip(bands) {
                    *acc += weight * e;
                }
            }
            weighted.iter().map(|acc| acc / total_weight).collect()
        };

        let indices: Vec<Vector3<usize>> = mesh_indices(dims).collect();
        #[cfg(feature = "parallel")]
        let resampled: Vec<Vec<f64>> = indices.par_iter().map(|index| interpolate(*index)).collect();
        #[cfg(not(feature = "parallel"))]
        let resampled: Vec<Vec<f64>> = indices.iter().map(|index| interpolate(*index)).collect();

        Self::new(dims, Vector3::zeros(), steps, resampled)
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn num_bands(&self) -> usize {
        self.num_bands
    }

    pub fn num_points(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    pub fn origin(&self) -> Vector3<f64> {
        self.origin
    }

    pub fn steps(&self) -> &Matrix3<f64> {
        &self.steps
    }

    /// Columns nⱼ·sⱼ, the translations the field repeats under.
    pub fn periods(&self) -> Matrix3<f64> {
        Matrix3::from_columns(&[
            self.steps.column(0) * self.dims[0] as f64,
            self.steps.column(1) * self.dims[1] as f64,
            self.steps.column(2) * self.dims[2] as f64,
        ])
    }

    /// Cartesian position of a (possibly out-of-range) mesh index; no wrapping.
    pub fn position(&self, index: [isize; 3]) -> Vector3<f64> {
        self.origin + self.steps * Vector3::new(index[0] as f64, index[1] as f64, index[2] as f64)
    }

    pub fn energy_at(&self, index: [usize; 3], band: usize) -> Result<f64> {
        Ok(self.bands_at(index)?[self.check_band(band)?])
    }

    /// Energy at an index taken modulo the mesh dimensions.
    pub fn energy_periodic(&self, index: [isize; 3], band: usize) -> Result<f64> {
        let band = self.check_band(band)?;
        let wrapped = [
            index[0].rem_euclid(self.dims[0] as isize) as usize,
            index[1].rem_euclid(self.dims[1] as isize) as usize,
            index[2].rem_euclid(self.dims[2] as isize) as usize,
        ];
        Ok(self.energies[self.flat_index(wrapped) * self.num_bands + band])
    }

    /// All band energies at one point.
    pub fn bands_at(&self, index: [usize; 3]) -> Result<&[f64]> {
        if index.iter().zip(&self.dims).any(|(i, n)| i >= n) {
            return Err(LatticeError::IndexOutOfRange {
                index,
                dims: self.dims,
            });
        }
        let start = self.flat_index(index) * self.num_bands;
        Ok(&self.energies[start..start + self.num_bands])
    }

    /// Smallest and largest sampled energy of a band.
    pub fn band_range(&self, band: usize) -> Result<(f64, f64)> {
        let band = self.check_band(band)?;
        Ok(self
            .energies
            .iter()
            .skip(band)
            .step_by(self.num_bands)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &e| {
                (lo.min(e), hi.max(e))
            }))
    }

    // Unchecked lookup for indices in [0, n] per axis (n wraps to 0); band must be valid.
    pub(crate) fn corner_energy(&self, index: [usize; 3], band: usize) -> f64 {
        let wrapped = [
            index[0] % self.dims[0],
            index[1] % self.dims[1],
            index[2] % self.dims[2],
        ];
        self.energies[self.flat_index(wrapped) * self.num_bands + band]
    }

    fn flat_index(&self, index: [usize; 3]) -> usize {
        (index[0] * self.dims[1] + index[1]) * self.dims[2] + index[2]
    }

    fn check_band(&self, band: usize) -> Result<usize> {
        if band >= self.num_bands {
            return Err(LatticeError::BandOutOfRange {
                band,
                num_bands: self.num_bands,
            });
        }
        Ok(band)
    }
}

fn cell_steps(reciprocal: &ReciprocalVectors, dims: [usize; 3]) -> Result<Matrix3<f64>> {
    if dims.contains(&0) {
        return Err(LatticeError::invalid_mesh(format!(
            "dimensions {dims:?} must all be positive"
        )));
    }
    let [b1, b2, b3] = reciprocal.vectors();
    Ok(Matrix3::from_columns(&[
        b1 / dims[0] as f64,
        b2 / dims[1] as f64,
        b3 / dims[2] as f64,
    ]))
}

// Mesh indices in C order
fn mesh_indices(dims: [usize; 3]) -> impl Iterator<Item = Vector3<usize>> {
    (0..dims[0]).flat_map(move |i| {
        (0..dims[1]).flat_map(move |j| (0..dims[2]).map(move |k| Vector3::new(i, j, k)))
    })
}
