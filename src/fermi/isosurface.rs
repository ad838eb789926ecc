use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::lattice::folding::KPoint;
use crate::lattice::polyhedron::Polyhedron;

/// Fermi-surface sheet of one band: an ordered triangle soup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsoSurface {
    pub band: usize,
    pub isovalue: f64,
    pub triangles: Vec<[KPoint; 3]>,
}

/// Welded triangle mesh: shared vertices, faces as index triples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedMesh {
    pub vertices: Vec<Vector3<f64>>,
    pub faces: Vec<[usize; 3]>,
}

impl IsoSurface {
    pub fn new(band: usize, isovalue: f64, triangles: Vec<[KPoint; 3]>) -> Self {
        Self {
            band,
            isovalue,
            triangles,
        }
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn area(&self) -> f64 {
        self.triangles
            .iter()
            .map(|t| 0.5 * doubled_area(&coords(t)))
            .sum()
    }

    /// Unit normals, pointing toward increasing energy; zero for degenerate
    /// triangles.
    pub fn normals(&self) -> Vec<Vector3<f64>> {
        self.triangles
            .iter()
            .map(|t| {
                let [a, b, c] = coords(t);
                (b - a).cross(&(c - a)).try_normalize(0.0).unwrap_or_else(Vector3::zeros)
            })
            .collect()
    }

    /// Signed volume enclosed by the sheet (divergence theorem about Γ).
    /// Meaningful for closed sheets only; positive when the higher energies
    /// lie outside.
    pub fn enclosed_volume(&self) -> f64 {
        self.triangles
            .iter()
            .map(|t| {
                let [a, b, c] = coords(t);
                a.dot(&b.cross(&c))
            })
            .sum::<f64>()
            / 6.0
    }

    /// Clip every triangle to `zone`. Triangles already inside are kept
    /// verbatim, so clipping a clipped surface changes nothing.
    pub fn clip_to(&self, zone: &Polyhedron) -> IsoSurface {
        let triangles = self
            .triangles
            .iter()
            .flat_map(|triangle| {
                let translation = triangle[0].translation;
                clip_triangle(&coords(triangle), zone)
                    .into_iter()
                    .map(move |[a, b, c]| {
                        [a, b, c].map(|coords| KPoint {
                            coords,
                            translation,
                        })
                    })
            })
            .collect();
        IsoSurface::new(self.band, self.isovalue, triangles)
    }

    /// Weld coincident vertices. With `tolerance == 0` only bitwise equal
    /// coordinates merge; otherwise coordinates are snapped to a grid of that
    /// spacing first. Faces that collapse while welding are dropped.
    pub fn to_indexed_mesh(&self, tolerance: f64) -> IndexedMesh {
        let key = |p: &Vector3<f64>| -> [i64; 3] {
            if tolerance > 0.0 {
                [p.x, p.y, p.z].map(|x| (x / tolerance).round() as i64)
            } else {
                // +0.0 folds -0.0 onto 0.0
                [p.x, p.y, p.z].map(|x| (x + 0.0).to_bits() as i64)
            }
        };

        let mut vertices = Vec::new();
        let mut index_of: HashMap<[i64; 3], usize> = HashMap::new();
        let mut faces = Vec::with_capacity(self.triangles.len());
        for triangle in &self.triangles {
            let face = triangle.map(|k| {
                *index_of.entry(key(&k.coords)).or_insert_with(|| {
                    vertices.push(k.coords);
                    vertices.len() - 1
                })
            });
            if face[0] != face[1] && face[1] != face[2] && face[0] != face[2] {
                faces.push(face);
            }
        }
        IndexedMesh { vertices, faces }
    }
}

impl IndexedMesh {
    /// Undirected edges used by exactly one face, sorted.
    pub fn boundary_edges(&self) -> Vec<(usize, usize)> {
        let mut uses: HashMap<(usize, usize), usize> = HashMap::new();
        for face in &self.faces {
            for i in 0..3 {
                let (a, b) = (face[i], face[(i + 1) % 3]);
                *uses.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        let mut boundary: Vec<(usize, usize)> = uses
            .into_iter()
            .filter(|&(_, count)| count == 1)
            .map(|(edge, _)| edge)
            .collect();
        boundary.sort_unstable();
        boundary
    }

    /// No boundary edges and at least one face.
    pub fn is_closed(&self) -> bool {
        !self.faces.is_empty() && self.boundary_edges().is_empty()
    }

    /// V − E + F; 2 for every closed sheet of genus zero.
    pub fn euler_characteristic(&self) -> i64 {
        let mut edges: Vec<(usize, usize)> = self
            .faces
            .iter()
            .flat_map(|face| {
                (0..3).map(move |i| {
                    let (a, b) = (face[i], face[(i + 1) % 3]);
                    (a.min(b), a.max(b))
                })
            })
            .collect();
        edges.sort_unstable();
        edges.dedup();
        self.vertices.len() as i64 - edges.len() as i64 + self.faces.len() as i64
    }
}

pub(crate) fn coords(triangle: &[KPoint; 3]) -> [Vector3<f64>; 3] {
    triangle.map(|k| k.coords)
}

pub(crate) fn doubled_area(triangle: &[Vector3<f64>; 3]) -> f64 {
    let [a, b, c] = triangle;
    (b - a).cross(&(c - a)).norm()
}

/// Clip one triangle to the zone and fan-triangulate what is left, dropping
/// slivers whose area vanishes at the zone tolerance.
pub(crate) fn clip_triangle(triangle: &[Vector3<f64>; 3], zone: &Polyhedron) -> Vec<[Vector3<f64>; 3]> {
    let min_doubled_area = zone.tolerance() * zone.tolerance();
    let polygon = zone.clip_polygon(triangle);
    if polygon.len() < 3 {
        return Vec::new();
    }
    (1..polygon.len() - 1)
        .map(|i| [polygon[0], polygon[i], polygon[i + 1]])
        .filter(|piece| doubled_area(piece) > min_doubled_area)
        .collect()
}
