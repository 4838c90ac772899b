mod common;

use glam::Vec3;
use model_viewer::bounds::compute_bounds;
use model_viewer::camera::PerspectiveCamera;
use model_viewer::error::ViewerError;
use model_viewer::fit::{fit_camera, fit_distance, FitSettings};
use model_viewer::normalize::{normalize, CANONICAL_SIZE};
use model_viewer::scene::{Mesh, Primitive, SceneGraph, Transform};

#[cfg(test)]
mod framing_tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_normalize_then_fit_end_to_end() {
        let (mut scene, root) = common::box_model(Vec3::new(-3.0, -1.0, -2.0), Vec3::new(1.0, 3.0, 4.0));

        let result = normalize(&mut scene, root, CANONICAL_SIZE).unwrap();
        assert!((result.scale_factor - 1.0 / 3.0).abs() < EPSILON);

        let bounds = compute_bounds(&scene, root);
        let size = bounds.size();
        assert!((size - Vec3::new(4.0 / 3.0, 4.0 / 3.0, 2.0)).length() < EPSILON);
        assert!(bounds.center().length() < EPSILON);

        let mut camera = PerspectiveCamera::default();
        let fit = fit_camera(&scene, root, &mut camera, &FitSettings::default());
        assert!((fit.fit_extent - 4.0 / 3.0).abs() < EPSILON);
        assert!((fit.vertical_fov_radians - 45f32.to_radians()).abs() < EPSILON);
        assert!((fit.fitted_distance - 2.0922).abs() < 1e-3, "distance {}", fit.fitted_distance);
        assert_eq!(fit.target_point, Vec3::ZERO);
        assert!((camera.position - Vec3::new(0.0, 0.0, fit.fitted_distance)).length() < EPSILON);
    }

    #[test]
    fn test_largest_dimension_becomes_canonical() {
        for (min, max) in [
            (Vec3::ZERO, Vec3::new(100.0, 20.0, 5.0)),
            (Vec3::splat(-0.001), Vec3::splat(0.002)),
            (Vec3::new(5.0, 5.0, 5.0), Vec3::new(6.0, 9.0, 5.5)),
        ] {
            let (mut scene, root) = common::box_model(min, max);
            normalize(&mut scene, root, CANONICAL_SIZE).unwrap();

            let bounds = compute_bounds(&scene, root);
            assert!((bounds.max_dimension() - CANONICAL_SIZE).abs() < EPSILON);
            assert!(bounds.center().length() < EPSILON);
        }
    }

    #[test]
    fn test_custom_canonical_size() {
        let (mut scene, root) = common::box_model(Vec3::ZERO, Vec3::new(1.0, 4.0, 2.0));
        normalize(&mut scene, root, 10.0).unwrap();
        assert!((compute_bounds(&scene, root).size().y - 10.0).abs() < EPSILON);
    }

    #[test]
    fn test_point_model_is_degenerate() {
        let mut scene = SceneGraph::new();
        let root = scene.add_node(None, Transform::IDENTITY);
        let mesh = scene.add_mesh(Mesh {
            name: None,
            primitives: vec![Primitive {
                positions: vec![Vec3::ONE, Vec3::ONE],
                ..Default::default()
            }],
        });
        scene.node_mut(root).mesh = Some(mesh);

        let err = normalize(&mut scene, root, CANONICAL_SIZE).unwrap_err();
        assert!(matches!(err, ViewerError::DegenerateGeometry { max_dimension } if max_dimension == 0.0));
        assert_eq!(scene.node(root).transform, Transform::IDENTITY);
    }

    #[test]
    fn test_depth_only_model_uses_safe_distance() {
        let (mut scene, root) = common::box_model(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 1.0));
        normalize(&mut scene, root, CANONICAL_SIZE).unwrap();

        let mut camera = PerspectiveCamera::default();
        let settings = FitSettings::default();
        let fit = fit_camera(&scene, root, &mut camera, &settings);
        assert_eq!(fit.fit_extent, 0.0);
        assert_eq!(fit.fitted_distance, settings.min_safe_distance);
    }

    #[test]
    fn test_distance_grows_with_extent_and_shrinks_with_fov() {
        let fov = 45f32.to_radians();
        let mut last = 0.0;
        for extent in [0.5, 1.0, 2.0, 4.0] {
            let d = fit_distance(extent, fov, 1.3);
            assert!(d > last);
            last = d;
        }

        let mut last = f32::INFINITY;
        for degrees in [20.0f32, 45.0, 60.0, 90.0] {
            let d = fit_distance(1.0, degrees.to_radians(), 1.3);
            assert!(d < last);
            last = d;
        }
    }

    #[test]
    fn test_wider_fov_moves_camera_closer() {
        let (mut scene, root) = common::box_model(Vec3::splat(-1.0), Vec3::splat(1.0));
        normalize(&mut scene, root, CANONICAL_SIZE).unwrap();

        let mut narrow = PerspectiveCamera::new(30.0, 1.0, 0.1, 1000.0);
        let mut wide = PerspectiveCamera::new(75.0, 1.0, 0.1, 1000.0);
        let near_fit = fit_camera(&scene, root, &mut narrow, &FitSettings::default());
        let wide_fit = fit_camera(&scene, root, &mut wide, &FitSettings::default());
        assert!(wide_fit.fitted_distance < near_fit.fitted_distance);
    }
}
