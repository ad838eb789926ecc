use anyhow::Result;
use fermi_lattice::config::ZoneConfig;
use fermi_lattice::lattice::{
    body_centered_cubic, compute_brillouin_zone, compute_brillouin_zone_default, face_centered_cubic, fold,
    hexagonal, reciprocal, simple_cubic, tetragonal, KPoint, KSpaceFolder, LatticeVectors,
};
use fermi_lattice::symmetries::{generate_symmetry_operations_3d, irreducible_kpoints};
use fermi_lattice::{ErrorKind, LatticeError};
use nalgebra::Vector3;
use std::f64::consts::TAU;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn zone_volume_matches_reciprocal_cell() -> Result<()> {
    init_logger();
    let cells: Vec<LatticeVectors> = vec![
        simple_cubic(3.0)?,
        body_centered_cubic(2.87)?,
        face_centered_cubic(3.61)?,
        hexagonal(2.95, 4.68)?,
        tetragonal(1.0, 2.5)?,
    ];
    for lattice in &cells {
        let recip = reciprocal(lattice)?;
        let zone = compute_brillouin_zone_default(&recip)?;
        let expected = TAU.powi(3) / lattice.volume().abs();
        assert!((zone.volume() - expected).abs() < 1e-8 * expected);
        assert!((recip.volume() - expected).abs() < 1e-8 * expected);
        assert!(zone.is_centrosymmetric(1e-8 * recip.max_norm()));
    }
    Ok(())
}

#[test]
fn face_counts_of_standard_zones() -> Result<()> {
    init_logger();
    let expectations = [
        (simple_cubic(1.0)?, 6),
        (face_centered_cubic(1.0)?, 14),
        (body_centered_cubic(1.0)?, 12),
        (hexagonal(1.0, 1.6)?, 8),
        (tetragonal(1.0, 2.5)?, 6),
    ];
    for (lattice, faces) in &expectations {
        let zone = compute_brillouin_zone_default(&reciprocal(lattice)?)?;
        assert_eq!(zone.face_count(), *faces);
        assert_eq!(zone.vertices().len() + zone.face_count(), zone.edges().len() + 2);
    }
    Ok(())
}

#[test]
fn folding_respects_zone_of_same_shell() -> Result<()> {
    init_logger();
    let recip = reciprocal(&face_centered_cubic(1.0)?)?;
    let zone = compute_brillouin_zone(&recip, &ZoneConfig::with_fixed_shell(3))?;
    let folder = KSpaceFolder::for_zone(&recip, &zone);
    assert_eq!(folder.shell_radius(), 3);

    let k = KPoint::new(Vector3::new(17.3, -41.0, 8.25));
    let folded = folder.fold(&k);
    assert!(zone.contains(folded.coords));
    assert_eq!(folded, fold(&folded, &recip));
    Ok(())
}

#[test]
fn degenerate_input_is_reported() {
    let flat = LatticeVectors::new(
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(2.0, -3.0, 0.0),
    );
    match flat {
        Err(err @ LatticeError::DegenerateLattice { .. }) => {
            assert_eq!(err.kind(), ErrorKind::DegenerateLattice);
            assert!(err.to_string().starts_with("degenerate lattice"));
        }
        other => panic!("expected a degenerate lattice, got {other:?}"),
    }
}

#[test]
fn symmetry_reduction_of_fcc_mesh() -> Result<()> {
    init_logger();
    let lattice = face_centered_cubic(1.0)?;
    let recip = reciprocal(&lattice)?;
    let zone = compute_brillouin_zone_default(&recip)?;
    let folder = KSpaceFolder::for_zone(&recip, &zone);
    let ops = generate_symmetry_operations_3d(&lattice, 1e-6);

    let n = 6;
    let mut points = Vec::new();
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                let kappa = Vector3::new(i as f64, j as f64, k as f64) / n as f64;
                points.push(KPoint::new(recip.frac_to_cart(kappa)));
            }
        }
    }

    let reduced = irreducible_kpoints(&points, &folder, &ops, true);
    assert_eq!(reduced.iter().map(|w| w.multiplicity).sum::<usize>(), n * n * n);
    assert!(reduced.len() < points.len() / 10);
    for weighted in &reduced {
        assert!(zone.contains(weighted.point.coords));
    }
    Ok(())
}
