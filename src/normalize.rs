use glam::Vec3;

use crate::bounds::compute_bounds;
use crate::error::ViewerError;
use crate::scene::{NodeId, SceneGraph};

/// Default edge length of the largest model dimension after normalization
pub const CANONICAL_SIZE: f32 = 2.0;

/// What [`normalize`] applied to the model root
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationResult {
    pub scale_factor: f32,
    /// Translation subtracted from the root after scaling
    pub applied_center_offset: Vec3,
}

/// Uniformly rescale `model` so its largest extent equals `canonical_size`, then
/// move its visual center to the world origin
///
/// Mutates the root node's scale and translation. Call exactly once per load.
pub fn normalize(
    scene: &mut SceneGraph,
    model: NodeId,
    canonical_size: f32,
) -> Result<NormalizationResult, ViewerError> {
    let original = compute_bounds(scene, model);
    let max_dimension = original.max_dimension();
    if !max_dimension.is_finite() || max_dimension <= 0.0 {
        return Err(ViewerError::DegenerateGeometry { max_dimension });
    }

    let scale_factor = canonical_size / max_dimension;
    scene.node_mut(model).transform.scale = Vec3::splat(scale_factor);

    // extents changed with the scale, so the center must come from fresh bounds
    let scaled = compute_bounds(scene, model);
    let center = scaled.center();
    scene.node_mut(model).transform.translation -= center;

    log::debug!(
        "normalized model: max dimension {max_dimension:.4} -> {canonical_size}, scale {scale_factor:.4}, offset {center:?}"
    );

    Ok(NormalizationResult {
        scale_factor,
        applied_center_offset: center,
    })
}
