use glam::Vec3;

use crate::bounds::compute_bounds;
use crate::camera::PerspectiveCamera;
use crate::scene::{NodeId, SceneGraph};

/// Default breathing room around the framed silhouette
pub const DEFAULT_MARGIN_FACTOR: f32 = 1.3;

/// Camera distance used when the silhouette has no extent
pub const DEFAULT_MIN_SAFE_DISTANCE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSettings {
    pub margin_factor: f32,
    pub min_safe_distance: f32,
    /// Unit direction from the target towards the camera
    pub view_axis: Vec3,
    /// Range the orbit controls keep the camera in
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            margin_factor: DEFAULT_MARGIN_FACTOR,
            min_safe_distance: DEFAULT_MIN_SAFE_DISTANCE,
            view_axis: Vec3::Z,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
        }
    }
}

/// Parameters chosen by [`fit_camera`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFit {
    pub vertical_fov_radians: f32,
    pub viewport_aspect: f32,
    /// Larger of the silhouette width and height
    pub fit_extent: f32,
    pub fitted_distance: f32,
    pub target_point: Vec3,
}

/// Distance at which a camera with `vertical_fov_radians` frames `fit_extent`,
/// inflated by `margin_factor`
pub fn fit_distance(fit_extent: f32, vertical_fov_radians: f32, margin_factor: f32) -> f32 {
    (fit_extent / 2.0) / (vertical_fov_radians / 2.0).tan() * margin_factor
}

/// Place `camera` on the view axis so the already-normalized `model` fills the view
///
/// Depth is ignored: only the silhouette facing the default view axis is framed.
/// The target is the world origin, where normalization put the model's center.
pub fn fit_camera(
    scene: &SceneGraph,
    model: NodeId,
    camera: &mut PerspectiveCamera,
    settings: &FitSettings,
) -> CameraFit {
    let bounds = compute_bounds(scene, model);
    let size = bounds.size();
    let fit_extent = size.x.max(size.y);
    let fov = camera.fov_radians();

    let mut distance = fit_distance(fit_extent, fov, settings.margin_factor);
    if !distance.is_finite() || distance <= 0.0 {
        log::warn!(
            "fit distance {distance} for extent {fit_extent} replaced by {}",
            settings.min_safe_distance
        );
        distance = settings.min_safe_distance;
    }
    let reachable = distance.clamp(settings.min_distance, settings.max_distance);
    if reachable != distance {
        log::debug!("fit distance {distance} clamped to orbit range {reachable}");
        distance = reachable;
    }

    let target = Vec3::ZERO;
    camera.target = target;
    camera.position = target + settings.view_axis.normalize_or_zero() * distance;

    CameraFit {
        vertical_fov_radians: fov,
        viewport_aspect: camera.aspect,
        fit_extent,
        fitted_distance: distance,
        target_point: target,
    }
}
