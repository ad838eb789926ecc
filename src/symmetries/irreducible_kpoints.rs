use log::debug;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::config::SYMMETRY_KEY_RESOLUTION;
use crate::lattice::folding::{KPoint, KSpaceFolder};
use crate::symmetries::symmetry_operations::SymmetryOperation;

/// Representative of a symmetry orbit with the number of input points in it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedKPoint {
    pub point: KPoint,
    pub multiplicity: usize,
}

impl WeightedKPoint {
    /// Fraction of `total` points this orbit stands for
    pub fn weight(&self, total: usize) -> f64 {
        self.multiplicity as f64 / total as f64
    }
}

/// Fold `points` into the zone and keep one point per symmetry orbit.
///
/// `operations` must form a group (the identity is implied). With
/// `time_reversal`, k and −k are treated as equivalent as well. Orbits are
/// returned in order of first appearance, each represented by the first
/// folded point that fell into it.
pub fn irreducible_kpoints(
    points: &[KPoint],
    folder: &KSpaceFolder,
    operations: &[SymmetryOperation],
    time_reversal: bool,
) -> Vec<WeightedKPoint> {
    let folded = folder.fold_all(points);

    let mut representatives: Vec<WeightedKPoint> = Vec::new();
    let mut orbit_index: BTreeMap<[i64; 3], usize> = BTreeMap::new();
    for point in folded {
        let kappa = folder.reciprocal().cart_to_frac(point.coords);
        match orbit_index.entry(orbit_key(&kappa, operations, time_reversal)) {
            Entry::Occupied(entry) => representatives[*entry.get()].multiplicity += 1,
            Entry::Vacant(entry) => {
                entry.insert(representatives.len());
                representatives.push(WeightedKPoint {
                    point,
                    multiplicity: 1,
                });
            }
        }
    }

    debug!(
        "{} k-points reduce to {} irreducible ({} operations, time reversal {})",
        points.len(),
        representatives.len(),
        operations.len(),
        time_reversal
    );
    representatives
}

// Smallest wrapped image over the orbit; equal for all members of an orbit.
fn orbit_key(kappa: &Vector3<f64>, operations: &[SymmetryOperation], time_reversal: bool) -> [i64; 3] {
    let mut key = wrapped_key(kappa);
    if time_reversal {
        key = key.min(wrapped_key(&-kappa));
    }
    for op in operations {
        let image = op.rotate_reciprocal(kappa);
        key = key.min(wrapped_key(&image));
        if time_reversal {
            key = key.min(wrapped_key(&-image));
        }
    }
    key
}

// Fractional coordinates modulo 1, quantized
fn wrapped_key(kappa: &Vector3<f64>) -> [i64; 3] {
    let steps = SYMMETRY_KEY_RESOLUTION as i64;
    let quantize =
        |x: f64| ((x.rem_euclid(1.0) * SYMMETRY_KEY_RESOLUTION).round() as i64).rem_euclid(steps);
    [quantize(kappa.x), quantize(kappa.y), quantize(kappa.z)]
}
