// Marching cubes over a periodic mesh
//
// The case table is derived once by tracing the contour on the six faces of
// the cube instead of being spelled out by hand. On a face whose diagonal
// corners are both below the level (ambiguous face), the two below-level
// corners are kept apart. The rule only depends on the face itself, so the two
// cells sharing a face always connect their crossings the same way and the
// surface has no holes.

use nalgebra::Vector3;
use std::sync::OnceLock;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{LatticeError, Result};
use crate::fermi::mesh_field::MeshField;

/// Corner c of a cell sits at offset (c & 1, (c >> 1) & 1, (c >> 2) & 1).
pub const CORNER_OFFSETS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [0, 1, 0],
    [1, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [0, 1, 1],
    [1, 1, 1],
];

/// Cell edges as (lower corner, higher corner): four along x, four along y,
/// four along z.
pub const EDGE_CORNERS: [[usize; 2]; 12] = [
    [0, 1],
    [2, 3],
    [4, 5],
    [6, 7],
    [0, 2],
    [1, 3],
    [4, 6],
    [5, 7],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

// Counter-clockwise seen from outside the cell
const FACE_CORNERS: [[usize; 4]; 6] = [
    [0, 4, 6, 2], // x = 0
    [1, 3, 7, 5], // x = 1
    [0, 1, 5, 4], // y = 0
    [2, 6, 7, 3], // y = 1
    [0, 2, 3, 1], // z = 0
    [4, 5, 7, 6], // z = 1
];

/// Triangles (as edge-index triples) for every corner configuration.
/// Bit c of the configuration is set when corner c lies below the level.
pub type CaseTable = [Vec<[usize; 3]>; 256];

static CASE_TABLE: OnceLock<CaseTable> = OnceLock::new();

pub fn case_table() -> &'static CaseTable {
    CASE_TABLE.get_or_init(|| std::array::from_fn(|config| triangulate_case(config as u8)))
}

fn edge_between(a: usize, b: usize) -> Option<usize> {
    EDGE_CORNERS
        .iter()
        .position(|&[p, q]| (p, q) == (a, b) || (q, p) == (a, b))
}

fn triangulate_case(config: u8) -> Vec<[usize; 3]> {
    let below = |corner: usize| config & (1 << corner) != 0;

    // next[e] = edge the contour continues to after crossing edge e. On every
    // face the contour runs from an entering crossing (outside -> below, in
    // counter-clockwise order) to an exiting one. Each exit pairs with the
    // crossing right before it, which keeps below-level corners separate.
    let mut next: [Option<usize>; 12] = [None; 12];
    for face in FACE_CORNERS {
        let crossings: Vec<(usize, bool)> = (0..4)
            .filter_map(|i| {
                let (a, b) = (face[i], face[(i + 1) % 4]);
                if below(a) == below(b) {
                    return None;
                }
                edge_between(a, b).map(|edge| (edge, below(a)))
            })
            .collect();

        for (i, &(edge, exits)) in crossings.iter().enumerate() {
            if exits {
                let previous = crossings[(i + crossings.len() - 1) % crossings.len()].0;
                next[previous] = Some(edge);
            }
        }
    }

    let mut triangles = Vec::new();
    let mut visited = [false; 12];
    for start in 0..12 {
        if visited[start] || next[start].is_none() {
            continue;
        }
        let mut contour = Vec::new();
        let mut edge = start;
        while !visited[edge] {
            visited[edge] = true;
            contour.push(edge);
            match next[edge] {
                Some(following) => edge = following,
                None => break,
            }
        }
        // Loop order makes the fan normals point away from the below-level side
        for i in 1..contour.len().saturating_sub(1) {
            triangles.push([contour[0], contour[i], contour[i + 1]]);
        }
    }
    triangles
}

/// Triangles of the isosurface `band = level` in native mesh coordinates.
///
/// Every cell of the periodic mesh is visited (the last layer wraps around to
/// the first for energies, positions are not wrapped). Triangles are ordered
/// by cell (i, then j, then k), normals point toward increasing energy.
pub fn march_band(mesh: &MeshField, band: usize, level: f64) -> Result<Vec<[Vector3<f64>; 3]>> {
    if band >= mesh.num_bands() {
        return Err(LatticeError::BandOutOfRange {
            band,
            num_bands: mesh.num_bands(),
        });
    }

    let slabs = 0..mesh.dims()[0];
    #[cfg(feature = "parallel")]
    let triangles: Vec<Vec<[Vector3<f64>; 3]>> = slabs
        .into_par_iter()
        .map(|i| march_slab(mesh, band, level, i))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let triangles: Vec<Vec<[Vector3<f64>; 3]>> = slabs.map(|i| march_slab(mesh, band, level, i)).collect();

    Ok(triangles.into_iter().flatten().collect())
}

/// Triangles of all cells with first index `i`.
pub(crate) fn march_slab(mesh: &MeshField, band: usize, level: f64, i: usize) -> Vec<[Vector3<f64>; 3]> {
    let table = case_table();
    let [_, n2, n3] = mesh.dims();
    let mut triangles = Vec::new();

    for j in 0..n2 {
        for k in 0..n3 {
            let corners: [[usize; 3]; 8] = std::array::from_fn(|c| {
                let [dx, dy, dz] = CORNER_OFFSETS[c];
                [i + dx, j + dy, k + dz]
            });
            let energies: [f64; 8] = std::array::from_fn(|c| mesh.corner_energy(corners[c], band));

            let config = energies
                .iter()
                .enumerate()
                .filter(|(_, e)| **e < level)
                .fold(0usize, |acc, (c, _)| acc | (1 << c));
            let cases = &table[config];
            if cases.is_empty() {
                continue;
            }

            let crossing = |edge: usize| -> Vector3<f64> {
                let [a, b] = EDGE_CORNERS[edge];
                let position = |c: usize| {
                    let [x, y, z] = corners[c];
                    mesh.position([x as isize, y as isize, z as isize])
                };
                let t = (level - energies[a]) / (energies[b] - energies[a]);
                let (pa, pb) = (position(a), position(b));
                pa + (pb - pa) * t
            };

            for &[e0, e1, e2] in cases {
                triangles.push([crossing(e0), crossing(e1), crossing(e2)]);
            }
        }
    }
    triangles
}
