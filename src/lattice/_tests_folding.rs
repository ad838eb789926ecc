#[cfg(test)]
mod _tests_folding {
    use super::super::folding::*;
    use super::super::lattice_construction::*;
    use super::super::lattice_vectors::*;
    use super::super::voronoi_cells::compute_brillouin_zone_default;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use std::f64::consts::{PI, TAU};

    // Deterministic spread of test points without pulling in a RNG
    fn scattered_points(count: usize, scale: f64) -> Vec<KPoint> {
        (0..count)
            .map(|i| {
                let t = i as f64;
                KPoint::new(Vector3::new(
                    scale * (1.7 * t).sin() + 0.37 * t,
                    scale * (2.3 * t + 0.5).cos() - 0.21 * t,
                    scale * (0.9 * t + 1.1).sin(),
                ))
            })
            .collect()
    }

    #[test]
    fn test_fold_cubic_shifts_by_lattice_vector() {
        let recip = reciprocal(&simple_cubic(1.0).unwrap()).unwrap();
        let k = KPoint::new(Vector3::new(TAU + 0.5, -TAU - 0.25, 0.1));
        let folded = fold(&k, &recip);

        assert_relative_eq!(folded.coords, Vector3::new(0.5, -0.25, 0.1), epsilon = 1e-12);
        assert_eq!(folded.translation, Some(Vector3::new(1, -1, 0)));
        assert_relative_eq!(folded.unfold(&recip), k.coords, epsilon = 1e-12);
    }

    #[test]
    fn test_fold_is_idempotent() {
        for lattice in [
            simple_cubic(1.0).unwrap(),
            face_centered_cubic(1.0).unwrap(),
            body_centered_cubic(1.0).unwrap(),
            hexagonal(1.0, 1.6).unwrap(),
        ] {
            let recip = reciprocal(&lattice).unwrap();
            let folder = KSpaceFolder::new(&recip, 2);
            for k in scattered_points(200, 3.0 * recip.max_norm()) {
                let once = folder.fold(&k);
                let twice = folder.fold(&once);
                assert_eq!(once, twice);
            }
        }
    }

    #[test]
    fn test_folded_points_lie_in_zone() {
        for lattice in [
            face_centered_cubic(1.0).unwrap(),
            body_centered_cubic(2.0).unwrap(),
            rhombohedral(1.0, 1.2).unwrap(),
        ] {
            let recip = reciprocal(&lattice).unwrap();
            let zone = compute_brillouin_zone_default(&recip).unwrap();
            let folder = KSpaceFolder::for_zone(&recip, &zone);

            for folded in folder.fold_all(&scattered_points(300, 2.0 * recip.max_norm())) {
                assert!(zone.contains(folded.coords), "{:?} outside the zone", folded.coords);
            }
        }
    }

    #[test]
    fn test_fold_preserves_equivalence() {
        let recip = reciprocal(&face_centered_cubic(1.0).unwrap()).unwrap();
        let folder = KSpaceFolder::new(&recip, 2);
        for k in scattered_points(100, 20.0) {
            let folded = folder.fold(&k);
            let difference = recip.cart_to_frac(k.coords - folded.coords);
            assert_relative_eq!(difference, difference.map(f64::round), epsilon = 1e-9);
            assert_relative_eq!(folded.unfold(&recip), k.coords, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_zone_boundary_tie_break_is_lexicographic() {
        let recip = reciprocal(&simple_cubic(1.0).unwrap()).unwrap();
        // Equidistant from Γ and b₁: the smaller index tuple (Γ) wins
        let on_face = KPoint::new(Vector3::new(PI, 0.0, 0.0));
        let folded = fold(&on_face, &recip);
        assert_relative_eq!(folded.coords, Vector3::new(PI, 0.0, 0.0), epsilon = 1e-12);

        // The opposite face maps onto the same representative
        let opposite = fold(&KPoint::new(Vector3::new(-PI, 0.0, 0.0)), &recip);
        assert_relative_eq!(opposite.coords, Vector3::new(PI, 0.0, 0.0), epsilon = 1e-12);
        assert_eq!(opposite.translation, Some(Vector3::new(-1, 0, 0)));
    }

    #[test]
    fn test_existing_translation_is_composed() {
        let recip = reciprocal(&simple_cubic(1.0).unwrap()).unwrap();
        let original = Vector3::new(2.0 * TAU + 0.3, 0.0, 0.0);
        let partial = KPoint::with_translation(original - Vector3::new(TAU, 0.0, 0.0), Vector3::new(1, 0, 0));

        let folded = fold(&partial, &recip);
        assert_eq!(folded.translation, Some(Vector3::new(2, 0, 0)));
        assert_relative_eq!(folded.unfold(&recip), original, epsilon = 1e-12);
    }

    #[test]
    fn test_fold_sheared_basis_lands_in_zone() {
        for shear in [5.0, 8.0] {
            let lattice = LatticeVectors::new(
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(shear, 1.0, 0.0),
                Vector3::new(0.0, shear, 1.0),
            )
            .unwrap();
            let recip = reciprocal(&lattice).unwrap();
            let zone = compute_brillouin_zone_default(&recip).unwrap();

            for k in scattered_points(400, 35.0) {
                let folded = fold(&k, &recip);
                assert!(zone.contains(folded.coords), "{:?} outside the zone", folded.coords);
                assert_eq!(fold(&folded, &recip), folded);
                assert_relative_eq!(folded.unfold(&recip), k.coords, epsilon = 1e-9);
            }
        }
    }
}
