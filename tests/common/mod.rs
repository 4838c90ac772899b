#![allow(dead_code)]

use glam::Vec3;
use model_viewer::camera::PerspectiveCamera;
use model_viewer::display::{OutputSettings, RenderSurface};
use model_viewer::lighting::LightingRig;
use model_viewer::scene::{Mesh, NodeId, Primitive, SceneGraph, Transform};
use serde_json::json;

/// Corners of an axis-aligned box, min corner first
pub fn box_corners(min: Vec3, max: Vec3) -> Vec<Vec3> {
    (0..8)
        .map(|i| {
            Vec3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            )
        })
        .collect()
}

/// Twelve triangles over [`box_corners`]
pub fn box_indices() -> Vec<u32> {
    vec![
        0, 2, 1, 1, 2, 3, // -z
        4, 5, 6, 5, 7, 6, // +z
        0, 1, 4, 1, 5, 4, // -y
        2, 6, 3, 3, 6, 7, // +y
        0, 4, 2, 2, 4, 6, // -x
        1, 3, 5, 3, 7, 5, // +x
    ]
}

pub fn box_mesh(min: Vec3, max: Vec3) -> Mesh {
    Mesh {
        name: Some("box".to_string()),
        primitives: vec![Primitive {
            positions: box_corners(min, max),
            indices: box_indices(),
            ..Default::default()
        }],
    }
}

/// Scene with a "model" root holding one box mesh node
pub fn box_model(min: Vec3, max: Vec3) -> (SceneGraph, NodeId) {
    let mut scene = SceneGraph::new();
    let root = scene.add_node(Some("model".to_string()), Transform::IDENTITY);
    let mesh = scene.add_mesh(box_mesh(min, max));
    let body = scene.add_node(Some("body".to_string()), Transform::IDENTITY);
    scene.node_mut(body).mesh = Some(mesh);
    scene.attach(root, body);
    (scene, root)
}

/// Assemble a binary glTF container from a JSON document and one BIN chunk
pub fn glb(document: &serde_json::Value, bin: &[u8]) -> Vec<u8> {
    let mut json_chunk = serde_json::to_vec(document).unwrap();
    while json_chunk.len() % 4 != 0 {
        json_chunk.push(b' ');
    }
    let mut bin_chunk = bin.to_vec();
    while bin_chunk.len() % 4 != 0 {
        bin_chunk.push(0);
    }

    let total = 12 + 8 + json_chunk.len() + 8 + bin_chunk.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json_chunk.len() as u32).to_le_bytes());
    out.extend_from_slice(&0x4E4F_534Au32.to_le_bytes());
    out.extend_from_slice(&json_chunk);
    out.extend_from_slice(&(bin_chunk.len() as u32).to_le_bytes());
    out.extend_from_slice(&0x004E_4942u32.to_le_bytes());
    out.extend_from_slice(&bin_chunk);
    out
}

fn push_f32s(bin: &mut Vec<u8>, values: impl IntoIterator<Item = f32>) {
    for v in values {
        bin.extend_from_slice(&v.to_le_bytes());
    }
}

/// GLB with one box node and one translation clip per name
///
/// Every clip moves the box from its rest position up by one unit over one second.
pub fn box_glb(min: Vec3, max: Vec3, clip_names: &[&str]) -> Vec<u8> {
    let corners = box_corners(min, max);
    let indices = box_indices();

    let mut bin = Vec::new();
    push_f32s(&mut bin, corners.iter().flat_map(|c| c.to_array()));
    let index_offset = bin.len();
    for i in &indices {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    let times_offset = bin.len();
    push_f32s(&mut bin, [0.0, 1.0]);
    let translations_offset = bin.len();
    push_f32s(&mut bin, [0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);

    let animations: Vec<serde_json::Value> = clip_names
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "channels": [{ "sampler": 0, "target": { "node": 0, "path": "translation" } }],
                "samplers": [{ "input": 2, "output": 3, "interpolation": "LINEAR" }]
            })
        })
        .collect();

    let mut document = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "name": "body", "mesh": 0 }],
        "meshes": [{
            "name": "box",
            "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }]
        }],
        "buffers": [{ "byteLength": bin.len() }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": index_offset, "target": 34962 },
            { "buffer": 0, "byteOffset": index_offset, "byteLength": times_offset - index_offset, "target": 34963 },
            { "buffer": 0, "byteOffset": times_offset, "byteLength": translations_offset - times_offset },
            { "buffer": 0, "byteOffset": translations_offset, "byteLength": bin.len() - translations_offset }
        ],
        "accessors": [
            {
                "bufferView": 0, "componentType": 5126, "count": 8, "type": "VEC3",
                "min": min.to_array(), "max": max.to_array()
            },
            { "bufferView": 1, "componentType": 5125, "count": indices.len(), "type": "SCALAR" },
            { "bufferView": 2, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0.0], "max": [1.0] },
            { "bufferView": 3, "componentType": 5126, "count": 2, "type": "VEC3" }
        ]
    });
    if !animations.is_empty() {
        document["animations"] = serde_json::Value::Array(animations);
    }

    glb(&document, &bin)
}

/// What a [`MockSurface`] saw during one `render` call
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRecord {
    pub scene_uid: u64,
    pub camera_position: Vec3,
    pub camera_aspect: f32,
}

/// Render surface that records every call instead of drawing
#[derive(Debug, Default)]
pub struct MockSurface {
    pub size: Option<(u32, u32)>,
    pub pixel_ratio: Option<f64>,
    pub output: Option<OutputSettings>,
    pub lighting: Option<LightingRig>,
    pub overlays: Vec<Option<String>>,
    pub renders: Vec<RenderRecord>,
    pub fail_renders: bool,
}

impl MockSurface {
    pub fn overlay(&self) -> Option<&str> {
        self.overlays.last().and_then(|o| o.as_deref())
    }
}

impl RenderSurface for MockSurface {
    fn set_size(&mut self, width: u32, height: u32) {
        self.size = Some((width, height));
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = Some(ratio);
    }

    fn configure_output(&mut self, settings: &OutputSettings) {
        self.output = Some(*settings);
    }

    fn set_lighting(&mut self, rig: &LightingRig) {
        self.lighting = Some(*rig);
    }

    fn set_overlay(&mut self, text: Option<String>) {
        self.overlays.push(text);
    }

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> anyhow::Result<()> {
        if self.fail_renders {
            anyhow::bail!("surface lost");
        }
        self.renders.push(RenderRecord {
            scene_uid: scene.uid(),
            camera_position: camera.position,
            camera_aspect: camera.aspect,
        });
        Ok(())
    }
}
