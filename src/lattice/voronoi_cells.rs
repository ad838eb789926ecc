// Wigner-Seitz cell and first Brillouin zone construction
//
// The cell of the origin is the intersection of the half-spaces "closer to the
// origin than to G" over all lattice points G of a candidate shell. It is
// obtained by clipping a bounding cube with each bisector plane in turn
// (Sutherland-Hodgman on every face, plus a new cap face on the cutting plane).
// Candidates come from a reduced basis of the same lattice and the result is
// accepted once its volume matches the lattice volume.

// ======================== IMPORTS ========================
use log::{debug, trace, warn};
use nalgebra::{Matrix3, Vector3};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{ZoneConfig, MIN_ZONE_FACES, VOLUME_TOLERANCE};
use crate::error::{LatticeError, Result};
use crate::lattice::lattice_vectors::{reduce_basis, LatticeVectors, ReciprocalVectors, ReducedBasis};
use crate::lattice::polyhedron::{FacePlane, Polyhedron};

// ======================== HALF-SPACES ========================

/// Half-space `normal·x ≤ distance` with a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct HalfSpace {
    pub normal: Vector3<f64>,
    pub distance: f64,
}

impl HalfSpace {
    /// Points closer to the origin than to `g`.
    pub fn bisector(g: &Vector3<f64>) -> Self {
        let length = g.norm();
        Self {
            normal: g / length,
            distance: 0.5 * length,
        }
    }

    pub fn signed_distance(&self, point: &Vector3<f64>) -> f64 {
        self.normal.dot(point) - self.distance
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Inside,
    On,
    Outside,
}

fn classify(signed_distance: f64, tolerance: f64) -> Side {
    if signed_distance > tolerance {
        Side::Outside
    } else if signed_distance < -tolerance {
        Side::Inside
    } else {
        Side::On
    }
}

// Intersection is always parametrized from the inside point, so the two faces
// sharing an edge produce bitwise identical points.
fn intersect(inside: Vector3<f64>, outside: Vector3<f64>, half_space: &HalfSpace) -> Vector3<f64> {
    let d_in = half_space.signed_distance(&inside);
    let d_out = half_space.signed_distance(&outside);
    let t = d_in / (d_in - d_out);
    inside + (outside - inside) * t
}

/// Sutherland-Hodgman clipping of a planar polygon against a half-space.
///
/// Points within `tolerance` of the plane count as inside and are kept
/// unchanged. Points lying on the plane afterwards (kept or created) are also
/// appended to `cap` when given.
pub(crate) fn clip_polygon_by_halfspace(
    polygon: &[Vector3<f64>],
    half_space: &HalfSpace,
    tolerance: f64,
    mut cap: Option<&mut Vec<Vector3<f64>>>,
) -> Vec<Vector3<f64>> {
    let Some(&last) = polygon.last() else {
        return Vec::new();
    };

    let mut clipped_polygon = Vec::with_capacity(polygon.len() + 1);
    let mut previous_vertex = last;
    let mut previous_side = classify(half_space.signed_distance(&previous_vertex), tolerance);

    for &current_vertex in polygon {
        let current_side = classify(half_space.signed_distance(&current_vertex), tolerance);

        // Edge crosses the boundary
        let crossing = match (previous_side, current_side) {
            (Side::Inside, Side::Outside) => {
                Some(intersect(previous_vertex, current_vertex, half_space))
            }
            (Side::Outside, Side::Inside) => {
                Some(intersect(current_vertex, previous_vertex, half_space))
            }
            _ => None,
        };
        if let Some(point) = crossing {
            clipped_polygon.push(point);
            if let Some(cap) = cap.as_mut() {
                cap.push(point);
            }
        }

        if current_side != Side::Outside {
            clipped_polygon.push(current_vertex);
            if current_side == Side::On {
                if let Some(cap) = cap.as_mut() {
                    cap.push(current_vertex);
                }
            }
        }

        previous_vertex = current_vertex;
        previous_side = current_side;
    }

    clipped_polygon
}

// ======================== LATTICE POINT GENERATION ========================

/// A lattice point together with its integer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborPoint {
    pub miller: Vector3<i32>,
    pub position: Vector3<f64>,
}

/// All index tuples with |n₁|, |n₂|, |n₃| ≤ max_shell in lexicographic order
/// (origin included).
pub fn shell_offsets(max_shell: usize) -> Vec<Vector3<i32>> {
    let shell_limit = max_shell as i32;
    let side = 2 * max_shell + 1;
    let mut offsets = Vec::with_capacity(side * side * side);
    for n in -shell_limit..=shell_limit {
        for m in -shell_limit..=shell_limit {
            for l in -shell_limit..=shell_limit {
                offsets.push(Vector3::new(n, m, l));
            }
        }
    }
    offsets
}

/// Generate 3D lattice points within specified shell index
///
/// Returns all integer linear combinations n·a₁ + m·a₂ + l·a₃ where |n|, |m|, |l| ≤ max_shell
/// (excluding the origin), in lexicographic index order
pub fn generate_lattice_points_3d_by_shell(
    basis: &Matrix3<f64>,
    max_shell: usize,
) -> Vec<NeighborPoint> {
    shell_offsets(max_shell)
        .into_iter()
        .filter(|miller| *miller != Vector3::zeros())
        .map(|miller| NeighborPoint {
            miller,
            position: basis * miller.map(f64::from),
        })
        .collect()
}

// ======================== CELL CONSTRUCTION ========================

/// Compute the first Brillouin zone (Wigner-Seitz cell of the reciprocal lattice)
pub fn compute_brillouin_zone(
    reciprocal: &ReciprocalVectors,
    config: &ZoneConfig,
) -> Result<Polyhedron> {
    compute_voronoi_cell(reciprocal.matrix(), config)
}

/// First Brillouin zone with the default [`ZoneConfig`]
pub fn compute_brillouin_zone_default(reciprocal: &ReciprocalVectors) -> Result<Polyhedron> {
    compute_brillouin_zone(reciprocal, &ZoneConfig::default())
}

/// Compute the Wigner-Seitz cell of a direct-space lattice
pub fn compute_wigner_seitz_cell(
    lattice: &LatticeVectors,
    config: &ZoneConfig,
) -> Result<Polyhedron> {
    compute_voronoi_cell(lattice.matrix(), config)
}

fn compute_voronoi_cell(basis: &Matrix3<f64>, config: &ZoneConfig) -> Result<Polyhedron> {
    let reduced = reduce_basis(basis);
    let dual = reduced
        .basis
        .try_inverse()
        .ok_or_else(|| LatticeError::degenerate_zone("lattice basis is singular"))?;
    let expected_volume = basis.determinant().abs();
    let tolerance = config.tolerance * reduced.max_norm();
    let max_shell = config.max_shell_radius.max(config.shell_radius).max(1);

    let mut shell = config.shell_radius.max(1);
    loop {
        match build_cell(&reduced, shell, tolerance) {
            Ok(cell) => {
                // Missing half-spaces only enlarge the cell
                let complete = (cell.volume() - expected_volume).abs()
                    <= VOLUME_TOLERANCE * expected_volume;
                if !config.adaptive || complete {
                    debug!(
                        "Voronoi cell: {} faces, {} vertices, volume {:.6} (shell {})",
                        cell.face_count(),
                        cell.vertices().len(),
                        cell.volume(),
                        shell
                    );
                    return Ok(cell);
                }
                if shell >= max_shell {
                    warn!(
                        "Cell volume {:.6} differs from lattice volume {:.6} at shell cap {}",
                        cell.volume(),
                        expected_volume,
                        max_shell
                    );
                    return Err(LatticeError::degenerate_zone(format!(
                        "no complete cell within shell radius {max_shell}"
                    )));
                }
                let next = required_shell(&dual, cell.circumradius(), config.tolerance)
                    .clamp(shell + 1, max_shell);
                trace!("Growing candidate shell from {} to {}", shell, next);
                shell = next;
            }
            Err(LatticeError::DegenerateBrillouinZone { reason })
                if config.adaptive && shell < max_shell =>
            {
                trace!("Shell {} insufficient ({}), growing", shell, reason);
                shell += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

// Smallest shell containing every lattice point within 2R of the origin: only
// those can carry a bisector that touches a cell of circumradius R.
fn required_shell(dual: &Matrix3<f64>, circumradius: f64, relative_tolerance: f64) -> usize {
    (0..3)
        .map(|i| {
            let reach = 2.0 * circumradius * dual.row(i).norm();
            (reach - relative_tolerance).ceil().max(1.0) as usize
        })
        .max()
        .unwrap_or(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FaceSource {
    Bound,
    Bisector(usize),
}

#[derive(Debug, Clone)]
struct WorkFace {
    points: Vec<Vector3<f64>>,
    source: FaceSource,
}

fn build_cell(reduced: &ReducedBasis, shell: usize, tolerance: f64) -> Result<Polyhedron> {
    let mut neighbors: Vec<NeighborPoint> = generate_lattice_points_3d_by_shell(&reduced.basis, shell)
        .into_iter()
        .map(|neighbor| NeighborPoint {
            miller: reduced.to_input_indices(neighbor.miller),
            position: neighbor.position,
        })
        .collect();
    // Nearest first, equal lengths in input index order
    neighbors.sort_by(|a, b| {
        a.position
            .norm()
            .total_cmp(&b.position.norm())
            .then_with(|| (a.miller.x, a.miller.y, a.miller.z).cmp(&(b.miller.x, b.miller.y, b.miller.z)))
    });

    #[cfg(feature = "parallel")]
    let half_spaces: Vec<HalfSpace> = neighbors
        .par_iter()
        .map(|neighbor| HalfSpace::bisector(&neighbor.position))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let half_spaces: Vec<HalfSpace> = neighbors
        .iter()
        .map(|neighbor| HalfSpace::bisector(&neighbor.position))
        .collect();

    // Any point is within Σ|aᵢ|/2 of a lattice point, so this cube strictly
    // contains the cell.
    let bound = 2.0 * (0..3).map(|i| reduced.basis.column(i).norm()).sum::<f64>();
    let mut faces = bounding_cube(bound);

    for (index, half_space) in half_spaces.iter().enumerate() {
        faces = clip_cell(faces, half_space, index, tolerance)?;
    }

    if faces.iter().any(|face| face.source == FaceSource::Bound) {
        return Err(LatticeError::degenerate_zone(format!(
            "cell is unbounded for candidate shell {shell}"
        )));
    }

    assemble(faces, &neighbors, &half_spaces, shell, tolerance)
}

fn clip_cell(
    faces: Vec<WorkFace>,
    half_space: &HalfSpace,
    index: usize,
    tolerance: f64,
) -> Result<Vec<WorkFace>> {
    let farthest = faces
        .iter()
        .flat_map(|face| face.points.iter())
        .map(|point| half_space.signed_distance(point))
        .fold(f64::NEG_INFINITY, f64::max);
    if farthest <= tolerance {
        // Redundant constraint
        return Ok(faces);
    }

    let mut cap_points = Vec::new();
    let mut clipped_faces = Vec::with_capacity(faces.len() + 1);
    for face in faces {
        let points = clip_polygon_by_halfspace(&face.points, half_space, tolerance, Some(&mut cap_points));
        if count_distinct(&points, tolerance) >= 3 {
            clipped_faces.push(WorkFace {
                points,
                source: face.source,
            });
        }
    }

    if clipped_faces.is_empty() {
        return Err(LatticeError::degenerate_zone("cell vanished while clipping"));
    }

    if let Some(points) = build_cap(cap_points, half_space, tolerance) {
        clipped_faces.push(WorkFace {
            points,
            source: FaceSource::Bisector(index),
        });
    }

    Ok(clipped_faces)
}

// Order the on-plane points counter-clockwise around the outward normal.
// Fewer than three distinct points, or a collinear set, means the plane only
// touches a vertex or an edge and contributes no face.
fn build_cap(
    points: Vec<Vector3<f64>>,
    half_space: &HalfSpace,
    tolerance: f64,
) -> Option<Vec<Vector3<f64>>> {
    let mut unique: Vec<Vector3<f64>> = Vec::with_capacity(points.len());
    for point in points {
        if !unique.iter().any(|existing| (existing - point).norm() <= tolerance) {
            unique.push(point);
        }
    }
    if unique.len() < 3 {
        return None;
    }

    let normal = half_space.normal;
    let axis = if normal.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = (axis - normal * normal.dot(&axis)).normalize();
    let v = normal.cross(&u);
    let centroid = unique.iter().fold(Vector3::zeros(), |acc, p| acc + p) / unique.len() as f64;

    let mut ordered: Vec<(f64, Vector3<f64>)> = unique
        .into_iter()
        .map(|p| {
            let offset = p - centroid;
            (offset.dot(&v).atan2(offset.dot(&u)), p)
        })
        .collect();
    ordered.sort_by(|a, b| a.0.total_cmp(&b.0));
    let ordered: Vec<Vector3<f64>> = ordered.into_iter().map(|(_, p)| p).collect();

    let doubled_area: f64 = (0..ordered.len())
        .map(|i| {
            let a = ordered[i] - centroid;
            let b = ordered[(i + 1) % ordered.len()] - centroid;
            a.cross(&b).dot(&normal)
        })
        .sum();
    if doubled_area <= tolerance * tolerance {
        return None;
    }

    Some(ordered)
}

fn assemble(
    faces: Vec<WorkFace>,
    neighbors: &[NeighborPoint],
    half_spaces: &[HalfSpace],
    shell: usize,
    tolerance: f64,
) -> Result<Polyhedron> {
    let mut vertices: Vec<Vector3<f64>> = Vec::new();
    let mut loops: Vec<Vec<usize>> = Vec::with_capacity(faces.len());
    let mut planes: Vec<FacePlane> = Vec::with_capacity(faces.len());

    for face in faces {
        let FaceSource::Bisector(index) = face.source else {
            continue;
        };

        let mut indices: Vec<usize> = Vec::with_capacity(face.points.len());
        for point in &face.points {
            let id = vertex_id(&mut vertices, *point, tolerance);
            if indices.last() != Some(&id) {
                indices.push(id);
            }
        }
        while indices.len() > 1 && indices.first() == indices.last() {
            indices.pop();
        }
        if indices.len() < 3 {
            continue;
        }

        let half_space = half_spaces[index];
        loops.push(indices);
        planes.push(FacePlane {
            normal: half_space.normal,
            distance: half_space.distance,
            neighbor: neighbors[index].position,
            miller: neighbors[index].miller,
        });
    }

    if loops.len() < MIN_ZONE_FACES {
        return Err(LatticeError::degenerate_zone(format!(
            "only {} faces survived clipping",
            loops.len()
        )));
    }

    let cell = Polyhedron::from_faces(vertices, loops, planes, shell, tolerance);
    check_closed(&cell)?;
    Ok(cell)
}

// Every edge of a closed convex polyhedron borders exactly two faces
fn check_closed(cell: &Polyhedron) -> Result<()> {
    for &(a, b) in cell.edges() {
        let bordering = cell
            .faces()
            .iter()
            .filter(|face| {
                (0..face.len()).any(|i| {
                    let (p, q) = (face[i], face[(i + 1) % face.len()]);
                    (p, q) == (a, b) || (q, p) == (a, b)
                })
            })
            .count();
        if bordering != 2 {
            return Err(LatticeError::degenerate_zone(format!(
                "edge ({a}, {b}) borders {bordering} faces"
            )));
        }
    }
    Ok(())
}

fn vertex_id(vertices: &mut Vec<Vector3<f64>>, point: Vector3<f64>, tolerance: f64) -> usize {
    if let Some(id) = vertices
        .iter()
        .position(|existing| (existing - point).norm() <= tolerance)
    {
        return id;
    }
    vertices.push(point);
    vertices.len() - 1
}

fn count_distinct(points: &[Vector3<f64>], tolerance: f64) -> usize {
    let mut unique: Vec<Vector3<f64>> = Vec::with_capacity(points.len());
    for point in points {
        if !unique.iter().any(|existing| (existing - point).norm() <= tolerance) {
            unique.push(*point);
        }
    }
    unique.len()
}

// Axis-aligned cube [-half, half]³ with outward counter-clockwise faces.
// Corner c sits at (±half, ±half, ±half) with bit 0/1/2 selecting +x/+y/+z.
fn bounding_cube(half: f64) -> Vec<WorkFace> {
    let corner = |c: usize| {
        let coordinate = |bit: usize| if c & bit != 0 { half } else { -half };
        Vector3::new(coordinate(1), coordinate(2), coordinate(4))
    };
    const LOOPS: [[usize; 4]; 6] = [
        [0, 4, 6, 2], // -x
        [1, 3, 7, 5], // +x
        [0, 1, 5, 4], // -y
        [2, 6, 7, 3], // +y
        [0, 2, 3, 1], // -z
        [4, 5, 7, 6], // +z
    ];
    LOOPS
        .iter()
        .map(|face| WorkFace {
            points: face.iter().map(|&c| corner(c)).collect(),
            source: FaceSource::Bound,
        })
        .collect()
}
