#[cfg(test)]
mod _tests_voronoi_cells {
    use super::super::lattice_construction::*;
    use super::super::lattice_vectors::*;
    use super::super::voronoi_cells::*;
    use crate::config::ZoneConfig;
    use crate::error::ErrorKind;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, Vector3};
    use std::f64::consts::{PI, TAU};

    const TEST_TOLERANCE: f64 = 1e-9;

    fn zone_of(lattice: &LatticeVectors) -> crate::lattice::Polyhedron {
        let recip = reciprocal(lattice).unwrap();
        compute_brillouin_zone_default(&recip).unwrap()
    }

    fn face_sizes(zone: &crate::lattice::Polyhedron) -> Vec<usize> {
        let mut sizes: Vec<usize> = zone.faces().iter().map(Vec::len).collect();
        sizes.sort_unstable();
        sizes
    }

    // ======================== HALF-SPACE CLIPPING ========================

    #[test]
    fn test_clip_polygon_by_halfspace_square() {
        let square = vec![
            Vector3::new(-1.0, -1.0, 0.0),
            Vector3::new(1.0, -1.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(-1.0, 1.0, 0.0),
        ];
        let half_space = HalfSpace::bisector(&Vector3::new(1.0, 0.0, 0.0));
        let mut cap = Vec::new();
        let clipped = clip_polygon_by_halfspace(&square, &half_space, TEST_TOLERANCE, Some(&mut cap));

        assert_eq!(clipped.len(), 4);
        assert!(clipped.iter().all(|p| p.x <= 0.5 + TEST_TOLERANCE));
        assert_eq!(cap.len(), 2);
        assert!(cap.iter().all(|p| (p.x - 0.5).abs() < TEST_TOLERANCE));
    }

    #[test]
    fn test_clip_polygon_keeps_inside_and_drops_outside() {
        let triangle = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.1, 0.0, 0.0),
            Vector3::new(0.0, 0.1, 0.0),
        ];
        let inside = HalfSpace::bisector(&Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(clip_polygon_by_halfspace(&triangle, &inside, TEST_TOLERANCE, None), triangle);

        let far: Vec<Vector3<f64>> = triangle.iter().map(|p| p + Vector3::new(5.0, 0.0, 0.0)).collect();
        assert!(clip_polygon_by_halfspace(&far, &inside, TEST_TOLERANCE, None).is_empty());
        assert!(clip_polygon_by_halfspace(&[], &inside, TEST_TOLERANCE, None).is_empty());
    }

    #[test]
    fn test_clip_polygon_vertex_on_plane_is_kept() {
        let triangle = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.5, 0.0, 0.0),
            Vector3::new(0.0, 0.5, 0.0),
        ];
        let half_space = HalfSpace::bisector(&Vector3::new(1.0, 0.0, 0.0));
        let mut cap = Vec::new();
        let clipped = clip_polygon_by_halfspace(&triangle, &half_space, TEST_TOLERANCE, Some(&mut cap));
        assert_eq!(clipped, triangle);
        assert_eq!(cap, vec![Vector3::new(0.5, 0.0, 0.0)]);
    }

    // ======================== LATTICE POINT GENERATION ========================

    #[test]
    fn test_generate_lattice_points_3d_by_shell() {
        let basis = Matrix3::identity();
        let points = generate_lattice_points_3d_by_shell(&basis, 1);
        assert_eq!(points.len(), 26);
        assert!(points.iter().all(|p| p.miller != Vector3::zeros()));
        assert_eq!(points[0].miller, Vector3::new(-1, -1, -1));
        assert_eq!(points[25].miller, Vector3::new(1, 1, 1));

        let offsets = shell_offsets(2);
        assert_eq!(offsets.len(), 125);
        assert!(offsets.windows(2).all(|w| (w[0].x, w[0].y, w[0].z) < (w[1].x, w[1].y, w[1].z)));
    }

    // ======================== BRILLOUIN ZONES ========================

    #[test]
    fn test_simple_cubic_zone() {
        let zone = zone_of(&simple_cubic(1.0).unwrap());

        assert_eq!(zone.face_count(), 6);
        assert_eq!(zone.vertices().len(), 8);
        assert_eq!(zone.edges().len(), 12);
        assert_eq!(face_sizes(&zone), vec![4; 6]);
        assert_relative_eq!(zone.volume(), TAU.powi(3), max_relative = 1e-9);

        for vertex in zone.vertices() {
            for axis in 0..3 {
                assert_relative_eq!(vertex[axis].abs(), PI, epsilon = 1e-9);
            }
        }
        // Square faces of side 2π
        for (start, end) in zone.edges() {
            assert_relative_eq!((zone.vertices()[*start] - zone.vertices()[*end]).norm(), TAU, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_fcc_lattice_zone_is_truncated_octahedron() {
        let zone = zone_of(&face_centered_cubic(1.0).unwrap());

        assert_eq!(zone.face_count(), 14);
        assert_eq!(zone.vertices().len(), 24);
        assert_eq!(zone.edges().len(), 36);
        let sizes = face_sizes(&zone);
        assert_eq!(sizes.iter().filter(|&&n| n == 4).count(), 6);
        assert_eq!(sizes.iter().filter(|&&n| n == 6).count(), 8);
        assert_relative_eq!(zone.volume(), TAU.powi(3) / 0.25, max_relative = 1e-9);
    }

    #[test]
    fn test_bcc_lattice_zone_is_rhombic_dodecahedron() {
        let zone = zone_of(&body_centered_cubic(1.0).unwrap());

        assert_eq!(zone.face_count(), 12);
        assert_eq!(zone.vertices().len(), 14);
        assert_eq!(face_sizes(&zone), vec![4; 12]);
        assert_relative_eq!(zone.volume(), TAU.powi(3) / 0.5, max_relative = 1e-9);
    }

    #[test]
    fn test_hexagonal_zone_is_prism() {
        let zone = zone_of(&hexagonal(1.0, 1.6).unwrap());

        assert_eq!(zone.face_count(), 8);
        assert_eq!(zone.vertices().len(), 12);
        let sizes = face_sizes(&zone);
        assert_eq!(sizes, vec![4, 4, 4, 4, 4, 4, 6, 6]);
    }

    #[test]
    fn test_zone_volume_for_low_symmetry_cells() {
        let cells = [
            orthorhombic(1.0, 1.7, 2.9).unwrap(),
            rhombohedral(1.3, 1.1).unwrap(),
            LatticeVectors::new(
                Vector3::new(1.0, 0.2, -0.1),
                Vector3::new(0.3, 1.4, 0.0),
                Vector3::new(-0.2, 0.5, 0.9),
            )
            .unwrap(),
        ];
        for lattice in &cells {
            let zone = zone_of(lattice);
            let expected = TAU.powi(3) / lattice.volume().abs();
            assert_relative_eq!(zone.volume(), expected, max_relative = 1e-8);
            assert!(zone.is_centrosymmetric(1e-8));
        }
    }

    #[test]
    fn test_every_edge_borders_two_faces() {
        let zone = zone_of(&face_centered_cubic(1.0).unwrap());
        for &(a, b) in zone.edges() {
            let count = zone
                .faces()
                .iter()
                .filter(|face| {
                    (0..face.len()).any(|i| {
                        let (p, q) = (face[i], face[(i + 1) % face.len()]);
                        (p, q) == (a, b) || (q, p) == (a, b)
                    })
                })
                .count();
            assert_eq!(count, 2);
        }
    }

    #[test]
    fn test_faces_are_counter_clockwise_from_outside() {
        let zone = zone_of(&body_centered_cubic(1.0).unwrap());
        for (index, plane) in zone.planes().iter().enumerate() {
            let polygon = zone.face_polygon(index).unwrap();
            let normal = (polygon[1] - polygon[0]).cross(&(polygon[2] - polygon[0]));
            assert!(normal.dot(&plane.normal) > 0.0);
            for vertex in &polygon {
                assert_relative_eq!(plane.normal.dot(vertex), plane.distance, epsilon = 1e-9);
            }
            assert_relative_eq!(plane.distance, plane.neighbor.norm() / 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_fixed_small_shell_still_finds_cubic_faces() {
        let recip = reciprocal(&simple_cubic(1.0).unwrap()).unwrap();
        let zone = compute_brillouin_zone(&recip, &ZoneConfig::with_fixed_shell(1)).unwrap();
        assert_eq!(zone.face_count(), 6);
        assert_eq!(zone.shell_radius(), 1);
    }

    #[test]
    fn test_elongated_cell_complete_from_smallest_shell() {
        // Strongly sheared cell: in the input basis some zone faces come from
        // neighbours with index |nᵢ| > 1
        let lattice = LatticeVectors::new(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.9, 0.2, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        )
        .unwrap();
        let recip = reciprocal(&lattice).unwrap();

        let smallest = ZoneConfig {
            shell_radius: 1,
            ..ZoneConfig::default()
        };
        let zone = compute_brillouin_zone(&recip, &smallest).unwrap();
        let generous = compute_brillouin_zone(&recip, &ZoneConfig::with_fixed_shell(6)).unwrap();

        assert_eq!(zone.face_count(), generous.face_count());
        assert_relative_eq!(zone.volume(), generous.volume(), max_relative = 1e-9);
        assert_relative_eq!(zone.volume(), TAU.powi(3) / lattice.volume().abs(), max_relative = 1e-8);
        assert_eq!(zone.shell_radius(), 1);
    }

    fn sheared_cubic(shear: f64) -> LatticeVectors {
        LatticeVectors::new(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(shear, 1.0, 0.0),
            Vector3::new(0.0, shear, 1.0),
        )
        .unwrap()
    }

    #[test]
    fn test_sheared_cubic_basis_gives_cubic_zone() {
        for shear in [5.0, 8.0] {
            let recip = reciprocal(&sheared_cubic(shear)).unwrap();
            let zone = compute_brillouin_zone_default(&recip).unwrap();

            assert_eq!(zone.face_count(), 6);
            assert_eq!(face_sizes(&zone), vec![4; 6]);
            assert_relative_eq!(zone.volume(), TAU.powi(3), max_relative = 1e-9);
            assert!(zone.shell_radius() <= 2);

            // Face indices refer to b₁, b₂, b₃ of the sheared basis
            for plane in zone.planes() {
                assert_relative_eq!(recip.lattice_point(plane.miller), plane.neighbor, epsilon = 1e-9);
                assert_relative_eq!(plane.neighbor.norm(), TAU, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_sheared_cubic_wigner_seitz_cell() {
        let cell = compute_wigner_seitz_cell(&sheared_cubic(8.0), &ZoneConfig::default()).unwrap();
        assert_eq!(cell.face_count(), 6);
        assert_relative_eq!(cell.volume(), 1.0, max_relative = 1e-9);
        assert_relative_eq!(cell.circumradius(), 3.0_f64.sqrt() / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_wigner_seitz_cell_of_direct_lattice() {
        let lattice = face_centered_cubic(2.0).unwrap();
        let cell = compute_wigner_seitz_cell(&lattice, &ZoneConfig::default()).unwrap();
        // Wigner-Seitz cell of FCC is the rhombic dodecahedron
        assert_eq!(cell.face_count(), 12);
        assert_relative_eq!(cell.volume(), lattice.volume().abs(), max_relative = 1e-9);
    }

    #[test]
    fn test_singular_basis_is_degenerate_zone() {
        let recip = reciprocal(&simple_cubic(1.0).unwrap()).unwrap();
        // Serialized form lets us smuggle in a singular basis
        let mut json = serde_json::to_value(recip).unwrap();
        json["reciprocal"] = serde_json::json!([0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        let broken: ReciprocalVectors = serde_json::from_value(json).unwrap();

        let err = compute_brillouin_zone_default(&broken).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateBrillouinZone);
    }
}
