//! World-space bounds of scene subtrees.

use glam::Mat4;

use crate::math::BoundingBox;
use crate::scene::{NodeId, SceneGraph};

/// Axis-aligned world-space bounds of every primitive under `node`
///
/// World transforms are derived from the graph on every call, so the result always
/// reflects the latest transform writes. A subtree without geometry yields a
/// zero-extent box at the node's world position. Any non-finite vertex makes the
/// whole box non-finite.
pub fn compute_bounds(scene: &SceneGraph, node: NodeId) -> BoundingBox {
    let world = scene.world_transforms();
    compute_bounds_with(scene, node, &world)
}

/// Same as [`compute_bounds`] with caller-provided world transforms
pub fn compute_bounds_with(scene: &SceneGraph, node: NodeId, world: &[Mat4]) -> BoundingBox {
    let mut bounds = BoundingBox::empty();

    for id in scene.descendants(node) {
        let Some(mesh) = scene.node(id).mesh.and_then(|m| scene.meshes.get(m)) else {
            continue;
        };
        for primitive in &mesh.primitives {
            let posed = scene.pose_primitive(id, primitive, world, false);
            if let Some(bad) = posed.positions.iter().find(|p| !p.is_finite()) {
                log::warn!("non-finite vertex {bad} under node {}", id.0);
                return BoundingBox::invalid();
            }
            bounds = bounds.union(&BoundingBox::from_points(posed.positions));
        }
    }

    if bounds.is_empty() {
        return BoundingBox::from_point(world[node.0].transform_point3(glam::Vec3::ZERO));
    }
    bounds
}
