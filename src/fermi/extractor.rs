use log::{debug, trace};
use nalgebra::{Matrix3, Vector3};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{LatticeError, Result};
use crate::fermi::isosurface::{clip_triangle, IsoSurface};
use crate::fermi::marching_cubes::march_slab;
use crate::fermi::mesh_field::MeshField;
use crate::lattice::folding::KPoint;
use crate::lattice::polyhedron::Polyhedron;

/// Fermi surface of every band crossing `fermi_level`, in band order.
///
/// Bands whose samples all lie on one side of the level are skipped. A band
/// that does cross always yields a sheet, even if nothing of it is left
/// inside the zone.
pub fn extract_fermi_surfaces(mesh: &MeshField, fermi_level: f64, zone: &Polyhedron) -> Vec<IsoSurface> {
    let bands = 0..mesh.num_bands();

    #[cfg(feature = "parallel")]
    let surfaces: Vec<IsoSurface> = bands
        .into_par_iter()
        .filter_map(|band| band_surface(mesh, band, fermi_level, zone))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let surfaces: Vec<IsoSurface> = bands
        .filter_map(|band| band_surface(mesh, band, fermi_level, zone))
        .collect();

    debug!(
        "Fermi level {:.6}: {} of {} bands cross, {} triangles",
        fermi_level,
        surfaces.len(),
        mesh.num_bands(),
        surfaces.iter().map(IsoSurface::len).sum::<usize>()
    );
    surfaces
}

/// Sheet of one band at `level`, stitched into `zone`; `None` when the band
/// does not cross the level.
pub fn extract_band_surface(
    mesh: &MeshField,
    band: usize,
    level: f64,
    zone: &Polyhedron,
) -> Result<Option<IsoSurface>> {
    if band >= mesh.num_bands() {
        return Err(LatticeError::BandOutOfRange {
            band,
            num_bands: mesh.num_bands(),
        });
    }
    Ok(band_surface(mesh, band, level, zone))
}

fn band_surface(mesh: &MeshField, band: usize, level: f64, zone: &Polyhedron) -> Option<IsoSurface> {
    let (lowest, highest) = mesh.band_range(band).ok()?;
    // A sample exactly at the level counts as not below
    if !(lowest < level && highest >= level) {
        trace!("band {} [{:.6}, {:.6}] misses level {:.6}", band, lowest, highest, level);
        return None;
    }

    let stitcher = Stitcher::new(mesh, zone);
    let slabs = 0..mesh.dims()[0];
    let slab_surface = |i: usize| -> (usize, Vec<[KPoint; 3]>) {
        let native = march_slab(mesh, band, level, i);
        let stitched = native.iter().flat_map(|t| stitcher.stitch(t)).collect();
        (native.len(), stitched)
    };

    #[cfg(feature = "parallel")]
    let pieces: Vec<(usize, Vec<[KPoint; 3]>)> = slabs.into_par_iter().map(slab_surface).collect();
    #[cfg(not(feature = "parallel"))]
    let pieces: Vec<(usize, Vec<[KPoint; 3]>)> = slabs.map(slab_surface).collect();

    let native_count: usize = pieces.iter().map(|(count, _)| count).sum();
    let triangles: Vec<[KPoint; 3]> = pieces.into_iter().flat_map(|(_, t)| t).collect();
    debug!(
        "band {}: {} native triangles, {} after stitching into the zone",
        band,
        native_count,
        triangles.len()
    );

    Some(IsoSurface::new(band, level, triangles))
}

/// Places native triangles into the zone.
///
/// A triangle may reach the zone through several periodic images. Each image
/// p + P·m (P = mesh periods) whose bounding sphere meets the zone's
/// circumsphere is clipped to the zone; the pieces carry the tag −m, i.e. the
/// translation in units of the mesh periods (the reciprocal vectors when the
/// mesh spans one reciprocal cell).
struct Stitcher<'a> {
    zone: &'a Polyhedron,
    periods: Matrix3<f64>,
    dual: Matrix3<f64>,
    circumradius: f64,
}

impl<'a> Stitcher<'a> {
    fn new(mesh: &MeshField, zone: &'a Polyhedron) -> Self {
        let periods = mesh.periods();
        // Mesh steps were validated as independent
        let dual = periods.try_inverse().unwrap_or_else(Matrix3::zeros);
        Self {
            zone,
            periods,
            dual,
            circumradius: zone.circumradius(),
        }
    }

    fn stitch(&self, triangle: &[Vector3<f64>; 3]) -> Vec<[KPoint; 3]> {
        let centroid = (triangle[0] + triangle[1] + triangle[2]) / 3.0;
        let radius = triangle
            .iter()
            .map(|p| (p - centroid).norm())
            .fold(0.0, f64::max);
        let reach = self.circumradius + radius + self.zone.tolerance();

        // |(D·x)ᵢ| ≤ |Dᵢ|·|x| bounds every period index that can bring the
        // centroid within `reach` of Γ
        let fraction = self.dual * centroid;
        let range = |axis: usize| {
            let width = self.dual.row(axis).norm() * reach;
            let low = (-fraction[axis] - width).ceil() as i32;
            let high = (-fraction[axis] + width).floor() as i32;
            low..=high
        };

        let mut pieces = Vec::new();
        for m1 in range(0) {
            for m2 in range(1) {
                for m3 in range(2) {
                    let m = Vector3::new(m1, m2, m3);
                    let shift = self.periods * m.map(f64::from);
                    if (centroid + shift).norm() > reach {
                        continue;
                    }
                    let image = triangle.map(|p| p + shift);
                    let tag = -m;
                    pieces.extend(
                        clip_triangle(&image, self.zone)
                            .into_iter()
                            .map(|piece| piece.map(|coords| KPoint::with_translation(coords, tag))),
                    );
                }
            }
        }
        pieces
    }
}
