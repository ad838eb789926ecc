use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::lattice::voronoi_cells::{clip_polygon_by_halfspace, HalfSpace};

/// Bisector plane carrying one zone face: points x with `normal·x = distance`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FacePlane {
    /// Outward unit normal
    pub normal: Vector3<f64>,
    /// Distance from Γ, |G|/2
    pub distance: f64,
    /// Reciprocal-lattice vector G whose bisector this is
    pub neighbor: Vector3<f64>,
    /// Index tuple (n₁, n₂, n₃) of G
    pub miller: Vector3<i32>,
}

impl FacePlane {
    pub(crate) fn half_space(&self) -> HalfSpace {
        HalfSpace {
            normal: self.normal,
            distance: self.distance,
        }
    }
}

/// Convex polyhedron for Wigner-Seitz cells and Brillouin zones.
///
/// Vertices live in one arena; faces and edges refer to them by index. Faces
/// are counter-clockwise loops seen from outside, `planes[i]` belongs to
/// `faces[i]`. Built once by the zone builder and only read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyhedron {
    pub(crate) vertices: Vec<Vector3<f64>>,
    pub(crate) edges: Vec<(usize, usize)>,
    pub(crate) faces: Vec<Vec<usize>>,
    pub(crate) planes: Vec<FacePlane>,
    /// Enclosed volume
    pub(crate) volume: f64,
    /// Candidate shell the faces were derived from
    pub(crate) shell_radius: usize,
    /// Absolute plane tolerance used during construction
    pub(crate) tolerance: f64,
}

impl Polyhedron {
    pub(crate) fn from_faces(
        vertices: Vec<Vector3<f64>>,
        faces: Vec<Vec<usize>>,
        planes: Vec<FacePlane>,
        shell_radius: usize,
        tolerance: f64,
    ) -> Self {
        let edges = extract_edges_from_faces(&faces);
        let volume = enclosed_volume(&vertices, &faces);
        Self {
            vertices,
            edges,
            faces,
            planes,
            volume,
            shell_radius,
            tolerance,
        }
    }

    /// Return `true` if `point` lies inside, or on the boundary of, the
    /// polyhedron (within the construction tolerance).
    pub fn contains(&self, point: Vector3<f64>) -> bool {
        self.contains_with_tolerance(point, self.tolerance)
    }

    pub fn contains_with_tolerance(&self, point: Vector3<f64>, tolerance: f64) -> bool {
        if self.faces.is_empty() {
            return false;
        }
        self.planes
            .iter()
            .all(|plane| plane.normal.dot(&point) - plane.distance <= tolerance)
    }

    /// Clip a convex polygon to the polyhedron. Returns the input untouched
    /// when every vertex is already inside; an empty vector when nothing is left.
    pub(crate) fn clip_polygon(&self, polygon: &[Vector3<f64>]) -> Vec<Vector3<f64>> {
        if polygon.iter().all(|p| self.contains(*p)) {
            return polygon.to_vec();
        }

        let mut clipped = polygon.to_vec();
        for plane in &self.planes {
            clipped = clip_polygon_by_halfspace(&clipped, &plane.half_space(), self.tolerance, None);
            if clipped.is_empty() {
                break;
            }
        }
        clipped
    }

    /// Get the enclosed volume
    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn vertices(&self) -> &[Vector3<f64>] {
        &self.vertices
    }

    /// Edges as sorted vertex-index pairs (smaller index first)
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    pub fn planes(&self) -> &[FacePlane] {
        &self.planes
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn shell_radius(&self) -> usize {
        self.shell_radius
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Vertex coordinates of face `index`, in loop order.
    pub fn face_polygon(&self, index: usize) -> Option<Vec<Vector3<f64>>> {
        self.faces
            .get(index)
            .map(|face| face.iter().map(|&i| self.vertices[i]).collect())
    }

    /// Largest distance from Γ to a vertex.
    pub fn circumradius(&self) -> f64 {
        self.vertices.iter().map(|v| v.norm()).fold(0.0, f64::max)
    }

    /// Smallest distance from Γ to a face plane.
    pub fn inradius(&self) -> f64 {
        self.planes
            .iter()
            .map(|p| p.distance)
            .fold(f64::INFINITY, f64::min)
    }

    /// `true` when −v is a vertex for every vertex v.
    pub fn is_centrosymmetric(&self, tolerance: f64) -> bool {
        self.vertices.iter().all(|v| {
            self.vertices
                .iter()
                .any(|w| (v + w).norm() <= tolerance)
        })
    }
}

// Extract unique edges from face definitions
fn extract_edges_from_faces(faces: &[Vec<usize>]) -> Vec<(usize, usize)> {
    let mut unique_edges: BTreeSet<(usize, usize)> = BTreeSet::new();

    for face in faces {
        for (position, &start) in face.iter().enumerate() {
            let end = face[(position + 1) % face.len()];
            unique_edges.insert((start.min(end), start.max(end)));
        }
    }

    unique_edges.into_iter().collect()
}

// Divergence theorem over fan triangles, faces oriented outward
fn enclosed_volume(vertices: &[Vector3<f64>], faces: &[Vec<usize>]) -> f64 {
    let mut volume = 0.0;
    for face in faces.iter().filter(|f| f.len() >= 3) {
        let v0 = vertices[face[0]];
        for window in face[1..].windows(2) {
            volume += v0.dot(&vertices[window[0]].cross(&vertices[window[1]]));
        }
    }
    volume / 6.0
}
