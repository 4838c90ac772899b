use anyhow::{bail, Context, Result};
use glam::{Mat4, Quat, Vec3};
use std::path::Path;

use crate::animation::{AnimationClip, Channel, ChannelValues, Interpolation};
use crate::error::LoadError;
use crate::scene::{Material, Mesh, NodeId, Primitive, SceneGraph, Skin, TextureImage, Transform};

/// CPU-side result of a successful load, ready to hand to the viewer
#[derive(Debug)]
pub struct LoadedAsset {
    pub scene: SceneGraph,
    /// Synthetic node parenting every root of the glTF scene
    pub root: NodeId,
    pub clips: Vec<AnimationClip>,
}

/// Parse a glTF / GLB document
///
/// External buffers and images are resolved relative to `base`.
pub fn load_gltf_from_slice(bytes: &[u8], base: Option<&Path>) -> Result<LoadedAsset, LoadError> {
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;
    let buffers = gltf::import_buffers(&document, base, blob)?;
    let images = match gltf::import_images(&document, base, &buffers) {
        Ok(images) => images,
        Err(e) => {
            log::warn!("could not decode textures, rendering untextured: {e}");
            Vec::new()
        }
    };

    build_asset(&document, &buffers, &images).map_err(|e| LoadError::InvalidAsset(format!("{e:#}")))
}

fn build_asset(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
) -> Result<LoadedAsset> {
    let gltf_scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .context("document has no scenes")?;

    log::info!(
        "glTF: {} nodes, {} meshes, {} materials, {} images, {} skins, {} animations",
        document.nodes().count(),
        document.meshes().count(),
        document.materials().count(),
        images.len(),
        document.skins().count(),
        document.animations().count()
    );

    let mut scene = SceneGraph::new();
    for image in images {
        scene.add_texture(convert_image(image));
    }
    for material in document.materials() {
        scene.add_material(convert_material(&material, images.len()));
    }
    for mesh in document.meshes() {
        let converted = convert_mesh(&mesh, buffers)
            .with_context(|| format!("mesh {} ({:?})", mesh.index(), mesh.name()))?;
        scene.add_mesh(converted);
    }

    let root = scene.add_node(Some("model".to_string()), Transform::IDENTITY);
    let mut node_map: Vec<Option<NodeId>> = vec![None; document.nodes().count()];
    for node in gltf_scene.nodes() {
        add_node(&mut scene, &mut node_map, &node, root)?;
    }

    let mut skin_map: Vec<Option<usize>> = vec![None; document.skins().count()];
    for skin in document.skins() {
        skin_map[skin.index()] = Some(scene.add_skin(convert_skin(&skin, buffers, &node_map)?));
    }

    for node in document.nodes() {
        let Some(id) = node_map[node.index()] else {
            continue;
        };
        scene.node_mut(id).mesh = node.mesh().map(|m| m.index());
        scene.node_mut(id).skin = node.skin().and_then(|s| skin_map[s.index()]);
    }

    let mut clips = Vec::new();
    for animation in document.animations() {
        clips.push(convert_animation(&animation, buffers, &node_map)?);
    }

    let vertex_count: usize = scene
        .meshes
        .iter()
        .flat_map(|m| &m.primitives)
        .map(Primitive::vertex_count)
        .sum();
    log::info!(
        "loaded model: {} scene nodes, {vertex_count} vertices, clips {:?}",
        scene.node_count() - 1,
        clips.iter().map(|c| c.name.as_str()).collect::<Vec<_>>()
    );

    Ok(LoadedAsset { scene, root, clips })
}

fn add_node(
    scene: &mut SceneGraph,
    node_map: &mut [Option<NodeId>],
    node: &gltf::Node,
    parent: NodeId,
) -> Result<()> {
    if node_map[node.index()].is_some() {
        bail!("node {} appears twice in the scene hierarchy", node.index());
    }
    let (translation, rotation, scale) = node.transform().decomposed();
    let id = scene.add_node(
        node.name().map(str::to_string),
        Transform {
            translation: Vec3::from_array(translation),
            rotation: Quat::from_array(rotation),
            scale: Vec3::from_array(scale),
        },
    );
    scene.attach(parent, id);
    node_map[node.index()] = Some(id);

    for child in node.children() {
        add_node(scene, node_map, &child, id)?;
    }
    Ok(())
}

fn convert_mesh(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> Result<Mesh> {
    let mut primitives = Vec::new();
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!("skipping {:?} primitive in mesh {:?}", primitive.mode(), mesh.name());
            continue;
        }
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .context("primitive has no positions")?
            .map(Vec3::from_array)
            .collect();
        let count = positions.len();

        let normals: Vec<Vec3> = reader
            .read_normals()
            .map(|it| it.map(Vec3::from_array).collect())
            .unwrap_or_default();
        let uvs: Vec<[f32; 2]> = reader
            .read_tex_coords(0)
            .map(|it| it.into_f32().collect())
            .unwrap_or_default();
        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..count as u32).collect(),
        };
        if let Some(bad) = indices.iter().find(|i| **i as usize >= count) {
            bail!("index {bad} out of range for {count} vertices");
        }
        let joints: Vec<[u16; 4]> = reader
            .read_joints(0)
            .map(|it| it.into_u16().collect())
            .unwrap_or_default();
        let weights: Vec<[f32; 4]> = reader
            .read_weights(0)
            .map(|it| it.into_f32().collect())
            .unwrap_or_default();

        if primitive.morph_targets().next().is_some() {
            log::warn!("mesh {:?} has morph targets, which are ignored", mesh.name());
        }

        primitives.push(Primitive {
            positions,
            normals,
            uvs,
            indices,
            joints,
            weights,
            material: primitive.material().index(),
        });
    }

    Ok(Mesh {
        name: mesh.name().map(str::to_string),
        primitives,
    })
}

fn convert_material(material: &gltf::Material, image_count: usize) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let base_color_texture = pbr
        .base_color_texture()
        .map(|info| info.texture().source().index())
        .filter(|index| *index < image_count);

    Material {
        name: material.name().map(str::to_string),
        base_color_factor: pbr.base_color_factor(),
        base_color_texture,
        double_sided: material.double_sided(),
    }
}

/// Expand any 8-bit image to RGBA8
fn convert_image(image: &gltf::image::Data) -> TextureImage {
    use gltf::image::Format;

    let rgba = match image.format {
        Format::R8G8B8A8 => image.pixels.clone(),
        Format::R8G8B8 => image
            .pixels
            .chunks_exact(3)
            .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
            .collect(),
        Format::R8G8 => image
            .pixels
            .chunks_exact(2)
            .flat_map(|rg| [rg[0], rg[1], 0, 255])
            .collect(),
        Format::R8 => image.pixels.iter().flat_map(|r| [*r, *r, *r, 255]).collect(),
        other => {
            log::warn!("unsupported texture format {other:?}, using white");
            vec![255; (image.width * image.height * 4) as usize]
        }
    };

    TextureImage {
        width: image.width,
        height: image.height,
        rgba,
    }
}

fn convert_skin(skin: &gltf::Skin, buffers: &[gltf::buffer::Data], node_map: &[Option<NodeId>]) -> Result<Skin> {
    let joints = skin
        .joints()
        .map(|joint| {
            node_map[joint.index()]
                .with_context(|| format!("skin joint {} is not part of the scene", joint.index()))
        })
        .collect::<Result<Vec<_>>>()?;

    let reader = skin.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));
    let inverse_bind_matrices = reader
        .read_inverse_bind_matrices()
        .map(|it| it.map(|m| Mat4::from_cols_array_2d(&m)).collect())
        .unwrap_or_else(|| vec![Mat4::IDENTITY; joints.len()]);

    Ok(Skin {
        joints,
        inverse_bind_matrices,
    })
}

fn convert_animation(
    animation: &gltf::Animation,
    buffers: &[gltf::buffer::Data],
    node_map: &[Option<NodeId>],
) -> Result<AnimationClip> {
    use gltf::animation::util::ReadOutputs;

    let name = animation
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("animation_{}", animation.index()));

    let mut channels = Vec::new();
    for channel in animation.channels() {
        let Some(target) = node_map[channel.target().node().index()] else {
            log::warn!("clip '{name}': channel targets a node outside the scene");
            continue;
        };
        let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));
        let times: Vec<f32> = reader
            .read_inputs()
            .with_context(|| format!("clip '{name}': channel has no keyframe times"))?
            .collect();
        let values = match reader
            .read_outputs()
            .with_context(|| format!("clip '{name}': channel has no keyframe values"))?
        {
            ReadOutputs::Translations(it) => ChannelValues::Translation(it.map(Vec3::from_array).collect()),
            ReadOutputs::Rotations(it) => {
                ChannelValues::Rotation(it.into_f32().map(Quat::from_array).collect())
            }
            ReadOutputs::Scales(it) => ChannelValues::Scale(it.map(Vec3::from_array).collect()),
            ReadOutputs::MorphTargetWeights(_) => {
                log::warn!("clip '{name}': morph target weights are ignored");
                continue;
            }
        };
        let interpolation = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Step => Interpolation::Step,
            gltf::animation::Interpolation::Linear => Interpolation::Linear,
            gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
        };

        channels.push(Channel {
            target,
            interpolation,
            times,
            values,
        });
    }

    Ok(AnimationClip::new(name, channels))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(format: gltf::image::Format, pixels: Vec<u8>) -> gltf::image::Data {
        gltf::image::Data {
            pixels,
            format,
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn test_rgb_expands_to_rgba() {
        let texture = convert_image(&image(gltf::image::Format::R8G8B8, vec![10, 20, 30]));
        assert_eq!(texture.rgba, vec![10, 20, 30, 255]);
    }

    #[test]
    fn test_grey_expands_to_rgba() {
        let texture = convert_image(&image(gltf::image::Format::R8, vec![7]));
        assert_eq!(texture.rgba, vec![7, 7, 7, 255]);
    }

    #[test]
    fn test_garbage_is_gltf_error() {
        let err = load_gltf_from_slice(b"definitely not a model", None).unwrap_err();
        assert!(matches!(err, LoadError::Gltf(_)));
    }
}
