use glam::{Mat3, Mat4, Quat, Vec3};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SCENE_UID: AtomicU64 = AtomicU64::new(1);

/// Index of a node inside a [`SceneGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Local translation / rotation / scale of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: Option<String>,
    pub transform: Transform,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
}

/// Triangle list with optional skinning attributes
#[derive(Debug, Clone, Default)]
pub struct Primitive {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub joints: Vec<[u16; 4]>,
    pub weights: Vec<[f32; 4]>,
    pub material: Option<usize>,
}

impl Primitive {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Joint and weight streams cover every vertex
    pub fn has_skin_attributes(&self) -> bool {
        !self.positions.is_empty()
            && self.joints.len() == self.positions.len()
            && self.weights.len() == self.positions.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

#[derive(Debug, Clone)]
pub struct Skin {
    pub joints: Vec<NodeId>,
    pub inverse_bind_matrices: Vec<Mat4>,
}

#[derive(Debug, Clone)]
pub struct Material {
    pub name: Option<String>,
    pub base_color_factor: [f32; 4],
    pub base_color_texture: Option<usize>,
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            base_color_factor: [0.7, 0.7, 0.7, 1.0],
            base_color_texture: None,
            double_sided: false,
        }
    }
}

/// Decoded RGBA8 image
#[derive(Debug, Clone)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Primitive geometry evaluated in world space for the current pose
#[derive(Debug, Clone, Default)]
pub struct PosedGeometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
}

/// Arena-backed scene graph
///
/// Nodes reference meshes, skins, materials and textures by index. World transforms
/// are never cached: every query derives them from the current local transforms.
#[derive(Debug)]
pub struct SceneGraph {
    uid: u64,
    nodes: Vec<Node>,
    pub meshes: Vec<Mesh>,
    pub skins: Vec<Skin>,
    pub materials: Vec<Material>,
    pub textures: Vec<TextureImage>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            uid: NEXT_SCENE_UID.fetch_add(1, Ordering::Relaxed),
            nodes: Vec::new(),
            meshes: Vec::new(),
            skins: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
        }
    }

    /// Process-unique identity, used by renderers to notice a replaced scene
    pub fn uid(&self) -> u64 {
        self.uid
    }

    pub fn add_node(&mut self, name: Option<String>, transform: Transform) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name,
            transform,
            parent: None,
            children: Vec::new(),
            mesh: None,
            skin: None,
        });
        id
    }

    /// Parent `child` under `parent`, detaching it from any previous parent
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old) = self.nodes[child.0].parent.take() {
            self.nodes[old.0].children.retain(|c| *c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    pub fn add_skin(&mut self, skin: Skin) -> usize {
        self.skins.push(skin);
        self.skins.len() - 1
    }

    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn add_texture(&mut self, texture: TextureImage) -> usize {
        self.textures.push(texture);
        self.textures.len() - 1
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// `root` and every node below it, depth first
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    pub fn is_in_subtree(&self, root: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == root {
                return true;
            }
            current = self.nodes.get(id.0).and_then(|n| n.parent);
        }
        false
    }

    /// World matrix of every node, indexed by `NodeId`
    pub fn world_transforms(&self) -> Vec<Mat4> {
        let mut world = vec![Mat4::IDENTITY; self.nodes.len()];
        let mut stack: Vec<(NodeId, Mat4)> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(i, _)| (NodeId(i), Mat4::IDENTITY))
            .collect();

        while let Some((id, parent_world)) = stack.pop() {
            let node = &self.nodes[id.0];
            let node_world = parent_world * node.transform.matrix();
            world[id.0] = node_world;
            stack.extend(node.children.iter().map(|c| (*c, node_world)));
        }
        world
    }

    /// Joint matrices (`joint world * inverse bind`) for a skin
    pub fn skin_matrices(&self, skin: &Skin, world: &[Mat4]) -> Vec<Mat4> {
        skin.joints
            .iter()
            .enumerate()
            .map(|(i, joint)| {
                let inverse_bind = skin
                    .inverse_bind_matrices
                    .get(i)
                    .copied()
                    .unwrap_or(Mat4::IDENTITY);
                world[joint.0] * inverse_bind
            })
            .collect()
    }

    /// Evaluate a primitive of `node` in world space
    ///
    /// Skinned primitives use linear blend skinning; their node transform is ignored,
    /// as joints already carry the full world placement.
    pub fn pose_primitive(
        &self,
        node: NodeId,
        primitive: &Primitive,
        world: &[Mat4],
        with_normals: bool,
    ) -> PosedGeometry {
        let node_world = world[node.0];
        let skin_matrices = self.nodes[node.0]
            .skin
            .and_then(|s| self.skins.get(s))
            .filter(|_| primitive.has_skin_attributes())
            .map(|skin| self.skin_matrices(skin, world));

        let mut posed = PosedGeometry {
            positions: Vec::with_capacity(primitive.vertex_count()),
            normals: Vec::new(),
        };
        let has_normals = with_normals && primitive.normals.len() == primitive.vertex_count();
        if has_normals {
            posed.normals.reserve(primitive.vertex_count());
        }

        let static_normal = Mat3::from_mat4(node_world).inverse().transpose();

        for (i, position) in primitive.positions.iter().enumerate() {
            let blended = skin_matrices
                .as_ref()
                .and_then(|mats| blend_joint_matrices(mats, primitive.joints[i], primitive.weights[i]));

            match blended {
                Some(m) => {
                    posed.positions.push(m.transform_point3(*position));
                    if has_normals {
                        posed
                            .normals
                            .push(m.transform_vector3(primitive.normals[i]).normalize_or_zero());
                    }
                }
                None => {
                    posed.positions.push(node_world.transform_point3(*position));
                    if has_normals {
                        posed
                            .normals
                            .push((static_normal * primitive.normals[i]).normalize_or_zero());
                    }
                }
            }
        }
        posed
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn blend_joint_matrices(matrices: &[Mat4], joints: [u16; 4], weights: [f32; 4]) -> Option<Mat4> {
    let total: f32 = weights.iter().sum();
    if total <= f32::EPSILON {
        return None;
    }
    let mut blended = Mat4::ZERO;
    for (joint, weight) in joints.iter().zip(weights) {
        if weight == 0.0 {
            continue;
        }
        let m = matrices.get(*joint as usize).copied().unwrap_or(Mat4::IDENTITY);
        blended += m * (weight / total);
    }
    Some(blended)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Primitive {
        Primitive {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            normals: vec![Vec3::Z; 3],
            indices: vec![0, 1, 2],
            ..Default::default()
        }
    }

    #[test]
    fn test_world_transforms_compose_parent_first() {
        let mut scene = SceneGraph::new();
        let root = scene.add_node(None, Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        let child = scene.add_node(None, Transform::from_translation(Vec3::new(0.0, 2.0, 0.0)));
        scene.attach(root, child);

        let world = scene.world_transforms();
        assert_eq!(world[child.0].transform_point3(Vec3::ZERO), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_attach_moves_child() {
        let mut scene = SceneGraph::new();
        let a = scene.add_node(None, Transform::IDENTITY);
        let b = scene.add_node(None, Transform::IDENTITY);
        let c = scene.add_node(None, Transform::IDENTITY);
        scene.attach(a, c);
        scene.attach(b, c);

        assert!(scene.node(a).children.is_empty());
        assert_eq!(scene.node(b).children, vec![c]);
        assert_eq!(scene.node(c).parent, Some(b));
    }

    #[test]
    fn test_descendants_and_subtree() {
        let mut scene = SceneGraph::new();
        let root = scene.add_node(None, Transform::IDENTITY);
        let a = scene.add_node(None, Transform::IDENTITY);
        let b = scene.add_node(None, Transform::IDENTITY);
        let other = scene.add_node(None, Transform::IDENTITY);
        scene.attach(root, a);
        scene.attach(a, b);

        assert_eq!(scene.descendants(root), vec![root, a, b]);
        assert!(scene.is_in_subtree(root, b));
        assert!(!scene.is_in_subtree(root, other));
    }

    #[test]
    fn test_pose_static_primitive() {
        let mut scene = SceneGraph::new();
        let node = scene.add_node(
            None,
            Transform {
                scale: Vec3::splat(2.0),
                ..Transform::from_translation(Vec3::new(0.0, 0.0, 1.0))
            },
        );
        let world = scene.world_transforms();
        let posed = scene.pose_primitive(node, &triangle(), &world, true);

        assert_eq!(posed.positions[1], Vec3::new(2.0, 0.0, 1.0));
        assert!((posed.normals[0] - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_pose_skinned_primitive_follows_joint() {
        let mut scene = SceneGraph::new();
        let mesh_node = scene.add_node(None, Transform::from_translation(Vec3::new(100.0, 0.0, 0.0)));
        let joint = scene.add_node(None, Transform::from_translation(Vec3::new(0.0, 5.0, 0.0)));
        let skin = scene.add_skin(Skin {
            joints: vec![joint],
            inverse_bind_matrices: vec![Mat4::IDENTITY],
        });
        scene.node_mut(mesh_node).skin = Some(skin);

        let mut primitive = triangle();
        primitive.joints = vec![[0, 0, 0, 0]; 3];
        primitive.weights = vec![[1.0, 0.0, 0.0, 0.0]; 3];

        let world = scene.world_transforms();
        let posed = scene.pose_primitive(mesh_node, &primitive, &world, false);

        // mesh node translation is ignored for skinned geometry
        assert_eq!(posed.positions[0], Vec3::new(0.0, 5.0, 0.0));
        assert!(posed.normals.is_empty());
    }

    #[test]
    fn test_zero_weights_fall_back_to_node() {
        let matrices = [Mat4::from_translation(Vec3::X)];
        assert!(blend_joint_matrices(&matrices, [0; 4], [0.0; 4]).is_none());
        let m = blend_joint_matrices(&matrices, [0; 4], [0.5, 0.5, 0.0, 0.0]).unwrap();
        assert_eq!(m.transform_point3(Vec3::ZERO), Vec3::X);
    }

    #[test]
    fn test_scene_uids_are_unique() {
        assert_ne!(SceneGraph::new().uid(), SceneGraph::new().uid());
    }
}
