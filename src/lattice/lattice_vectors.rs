use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::config::{DEGENERACY_TOLERANCE, MAX_REDUCTION_SWEEPS, RECIPROCAL_SCALE};
use crate::error::{LatticeError, Result};

/// Real-space primitive vectors a₁, a₂, a₃ (stored as matrix columns).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeVectors {
    direct: Matrix3<f64>,
}

/// Reciprocal primitive vectors b₁, b₂, b₃ (matrix columns) with aᵢ·bⱼ = 2π·δᵢⱼ.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReciprocalVectors {
    reciprocal: Matrix3<f64>,
    /// Cached inverse, maps cartesian k to fractional coordinates
    inverse: Matrix3<f64>,
}

impl LatticeVectors {
    pub fn new(a1: Vector3<f64>, a2: Vector3<f64>, a3: Vector3<f64>) -> Result<Self> {
        Self::from_matrix(Matrix3::from_columns(&[a1, a2, a3]))
    }

    /// Columns are the primitive vectors.
    pub fn from_matrix(direct: Matrix3<f64>) -> Result<Self> {
        check_volume(&direct)?;
        Ok(Self { direct })
    }

    /// Rows are the primitive vectors, the layout most structure files use.
    pub fn from_rows(rows: [[f64; 3]; 3]) -> Result<Self> {
        Self::new(
            Vector3::from(rows[0]),
            Vector3::from(rows[1]),
            Vector3::from(rows[2]),
        )
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.direct
    }

    pub fn vectors(&self) -> [Vector3<f64>; 3] {
        [
            self.direct.column(0).into(),
            self.direct.column(1).into(),
            self.direct.column(2).into(),
        ]
    }

    /// Signed cell volume a₁·(a₂×a₃).
    pub fn volume(&self) -> f64 {
        triple_product(&self.direct)
    }

    /// Metric tensor G = Aᵀ·A
    pub fn metric(&self) -> Matrix3<f64> {
        self.direct.transpose() * self.direct
    }

    pub fn frac_to_cart(&self, v_frac: Vector3<f64>) -> Vector3<f64> {
        self.direct * v_frac
    }
}

/// Compute the reciprocal basis bᵢ = 2π·(aⱼ × aₖ)/V for cyclic (i, j, k).
///
/// Fails with [`LatticeError::DegenerateLattice`] when |V| is below
/// `DEGENERACY_TOLERANCE` times the product of the vector norms. The check is
/// repeated here because deserialized lattices never went through the
/// validating constructor.
pub fn reciprocal(lattice: &LatticeVectors) -> Result<ReciprocalVectors> {
    let direct = lattice.matrix();
    let volume = check_volume(direct)?;

    let [a1, a2, a3] = lattice.vectors();
    let scale = RECIPROCAL_SCALE / volume;
    let b1 = a2.cross(&a3) * scale;
    let b2 = a3.cross(&a1) * scale;
    let b3 = a1.cross(&a2) * scale;

    let reciprocal = Matrix3::from_columns(&[b1, b2, b3]);
    // bᵢ·aⱼ = 2π·δᵢⱼ  ⇒  B⁻¹ = Aᵀ/2π
    let inverse = direct.transpose() / RECIPROCAL_SCALE;

    Ok(ReciprocalVectors {
        reciprocal,
        inverse,
    })
}

impl ReciprocalVectors {
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.reciprocal
    }

    pub fn vectors(&self) -> [Vector3<f64>; 3] {
        [
            self.reciprocal.column(0).into(),
            self.reciprocal.column(1).into(),
            self.reciprocal.column(2).into(),
        ]
    }

    /// Brillouin zone volume, (2π)³/V_cell.
    pub fn volume(&self) -> f64 {
        triple_product(&self.reciprocal).abs()
    }

    /// Longest of |b₁|, |b₂|, |b₃|; the length scale for tolerances.
    pub fn max_norm(&self) -> f64 {
        self.vectors().iter().map(|b| b.norm()).fold(0.0, f64::max)
    }

    /// G = n₁b₁ + n₂b₂ + n₃b₃
    pub fn lattice_point(&self, n: Vector3<i32>) -> Vector3<f64> {
        self.reciprocal * n.map(f64::from)
    }

    pub fn frac_to_cart(&self, k_frac: Vector3<f64>) -> Vector3<f64> {
        self.reciprocal * k_frac
    }

    pub fn cart_to_frac(&self, k_cart: Vector3<f64>) -> Vector3<f64> {
        self.inverse * k_cart
    }

    /// Real-space lattice this basis is reciprocal to.
    pub fn direct(&self) -> LatticeVectors {
        LatticeVectors {
            direct: self.inverse.transpose() * RECIPROCAL_SCALE,
        }
    }
}

/// Basis of the same lattice made of short, nearly orthogonal vectors.
///
/// `basis = input · transform`: column j of `transform` holds the input-basis
/// indices of reduced vector j.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReducedBasis {
    pub basis: Matrix3<f64>,
    pub transform: Matrix3<i32>,
}

impl ReducedBasis {
    /// Input-basis index tuple of the lattice point with reduced indices `n`.
    pub fn to_input_indices(&self, n: Vector3<i32>) -> Vector3<i32> {
        self.transform * n
    }

    /// Longest reduced vector
    pub fn max_norm(&self) -> f64 {
        (0..3).map(|i| self.basis.column(i).norm()).fold(0.0, f64::max)
    }
}

/// Greedy reduction of a 3D lattice basis (columns).
///
/// A vector is replaced whenever subtracting the nearest multiple of another
/// basis vector, or adding ±1 times both others, makes it strictly shorter.
/// At the fixed point the Voronoi-relevant vectors have indices in {-1, 0, 1},
/// and the nearest lattice point to any position lies a small index step away
/// from its rounded fractional coordinates.
pub fn reduce_basis(basis: &Matrix3<f64>) -> ReducedBasis {
    const SHRINK: f64 = 1.0 - 1e-12;

    let mut vectors: [Vector3<f64>; 3] = [
        basis.column(0).into_owned(),
        basis.column(1).into_owned(),
        basis.column(2).into_owned(),
    ];
    let mut indices: [Vector3<i32>; 3] = [Vector3::x(), Vector3::y(), Vector3::z()];
    let shorter = |candidate: &Vector3<f64>, current: &Vector3<f64>| {
        candidate.norm_squared() < current.norm_squared() * SHRINK
    };

    for _ in 0..MAX_REDUCTION_SWEEPS {
        let mut improved = false;
        for i in 0..3 {
            let (j, k) = ((i + 1) % 3, (i + 2) % 3);

            for other in [j, k] {
                let q = (vectors[i].dot(&vectors[other]) / vectors[other].norm_squared()).round();
                if q == 0.0 || !q.is_finite() {
                    continue;
                }
                let candidate = vectors[i] - vectors[other] * q;
                if shorter(&candidate, &vectors[i]) {
                    let step = indices[other] * (q as i32);
                    vectors[i] = candidate;
                    indices[i] -= step;
                    improved = true;
                }
            }

            for (cj, ck) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
                let candidate = vectors[i] + vectors[j] * f64::from(cj) + vectors[k] * f64::from(ck);
                if shorter(&candidate, &vectors[i]) {
                    let step = indices[j] * cj + indices[k] * ck;
                    vectors[i] = candidate;
                    indices[i] += step;
                    improved = true;
                }
            }
        }
        if !improved {
            break;
        }
    }

    let transform = Matrix3::from_columns(&indices);
    // Rebuilt from the integer transform so reduced vectors are exact lattice points
    ReducedBasis {
        basis: basis * transform.map(f64::from),
        transform,
    }
}

fn triple_product(m: &Matrix3<f64>) -> f64 {
    let a1 = m.column(0);
    let a2 = m.column(1);
    let a3 = m.column(2);
    a1.dot(&a2.cross(&a3))
}

fn check_volume(direct: &Matrix3<f64>) -> Result<f64> {
    let volume = triple_product(direct);
    let norm_product: f64 = (0..3).map(|i| direct.column(i).norm()).product();

    if !volume.is_finite() || volume.abs() <= DEGENERACY_TOLERANCE * norm_product {
        return Err(LatticeError::DegenerateLattice {
            volume,
            norm_product,
        });
    }
    Ok(volume)
}
