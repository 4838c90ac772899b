use anyhow::{anyhow, bail, Result};
use glam::Vec3;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

use super::gpu_context::GpuContext;
use crate::camera::PerspectiveCamera;
use crate::display::{OutputColorSpace, OutputSettings, RenderSurface, ToneMapping};
use crate::lighting::LightingRig;
use crate::math::hex_to_linear_rgb;
use crate::scene::{Material, NodeId, SceneGraph, TextureImage};
use crate::types::{FrameUniform, LightingUniform, MaterialUniform, MeshVertex};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// One primitive of one node, with its per-frame vertex buffer
struct DrawItem {
    node: NodeId,
    mesh: usize,
    primitive: usize,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    material: usize,
    double_sided: bool,
}

/// GPU resources for the scene graph with a given uid
struct GpuScene {
    uid: u64,
    draws: Vec<DrawItem>,
    materials: Vec<wgpu::BindGroup>,
}

struct Overlay {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

struct Pipelines {
    culled: wgpu::RenderPipeline,
    double_sided: wgpu::RenderPipeline,
}

/// Rasterizes the posed scene to a window surface, with an egui status overlay
///
/// Vertices are posed on the CPU every frame (skinning included) and rewritten
/// into per-primitive vertex buffers; topology and materials are uploaded once
/// per scene.
pub struct SurfaceRenderer {
    gpu: GpuContext,
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    output: OutputSettings,
    sample_count: u32,
    pixel_ratio: f64,
    lighting: LightingUniform,
    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: Pipelines,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    material_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
    scene: Option<GpuScene>,
    overlay: Option<Overlay>,
    overlay_text: Option<String>,
}

impl SurfaceRenderer {
    /// Build a renderer with default output settings; `with_overlay` enables egui
    pub fn new(
        window: Arc<Window>,
        gpu: GpuContext,
        surface: wgpu::Surface<'static>,
        with_overlay: bool,
    ) -> Result<Self> {
        let output = OutputSettings::default();
        let size = window.inner_size();
        let config = Self::create_surface_config(&gpu, &surface, &output, size.width, size.height)?;
        surface.configure(gpu.device(), &config);
        let sample_count = Self::supported_samples(&gpu, config.format, output.msaa_samples);

        let device = gpu.device();
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../mesh.wgsl").into()),
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &material_layout],
            push_constant_ranges: &[],
        });
        let pipelines = Self::create_pipelines(device, &pipeline_layout, &shader, config.format, sample_count);

        let lighting = LightingRig::default().to_uniform();
        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Base Color Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let white = TextureImage {
            width: 1,
            height: 1,
            rgba: vec![255; 4],
        };
        let white_view = Self::upload_texture(&gpu, &white, "White Texture")
            .create_view(&wgpu::TextureViewDescriptor::default());

        let (depth_view, msaa_view) = Self::create_targets(device, &config, sample_count);

        let pixel_ratio = window.scale_factor();
        let overlay = with_overlay.then(|| {
            let ctx = egui::Context::default();
            let state = egui_winit::State::new(
                ctx.clone(),
                egui::ViewportId::ROOT,
                &window,
                Some(pixel_ratio as f32),
                None,
                None,
            );
            Overlay {
                ctx,
                state,
                renderer: egui_wgpu::Renderer::new(device, config.format, egui_wgpu::RendererOptions::default()),
            }
        });

        log::info!(
            "surface {}x{} {:?}, {}x MSAA",
            config.width,
            config.height,
            config.format,
            sample_count
        );

        Ok(Self {
            gpu,
            window,
            surface,
            config,
            output,
            sample_count,
            pixel_ratio,
            lighting,
            shader,
            pipeline_layout,
            pipelines,
            frame_buffer,
            frame_bind_group,
            material_layout,
            sampler,
            white_view,
            depth_view,
            msaa_view,
            scene: None,
            overlay,
            overlay_text: None,
        })
    }

    /// Forward a window event to the overlay; true when egui consumed it
    pub fn handle_window_event(&mut self, event: &winit::event::WindowEvent) -> bool {
        match self.overlay.as_mut() {
            Some(overlay) => overlay.state.on_window_event(&self.window, event).consumed,
            None => false,
        }
    }

    fn create_surface_config(
        gpu: &GpuContext,
        surface: &wgpu::Surface,
        output: &OutputSettings,
        width: u32,
        height: u32,
    ) -> Result<wgpu::SurfaceConfiguration> {
        let caps = surface.get_capabilities(gpu.adapter());
        let Some(first) = caps.formats.first().copied() else {
            bail!("surface reports no supported formats");
        };
        let want_srgb = output.color_space == OutputColorSpace::Srgb;
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb() == want_srgb)
            .unwrap_or(first);

        Ok(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        })
    }

    fn supported_samples(gpu: &GpuContext, format: wgpu::TextureFormat, requested: u32) -> u32 {
        if requested <= 1 {
            return 1;
        }
        let flags = gpu.adapter().get_texture_format_features(format).flags;
        if flags.sample_count_supported(requested) {
            requested
        } else {
            log::warn!("{requested}x MSAA unsupported for {format:?}, rendering without it");
            1
        }
    }

    fn create_pipelines(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Pipelines {
        let build = |cull_mode: Option<wgpu::Face>, label: &str| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: &[MeshVertex::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: sample_count,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            })
        };

        Pipelines {
            culled: build(Some(wgpu::Face::Back), "Mesh Pipeline"),
            double_sided: build(None, "Double Sided Mesh Pipeline"),
        }
    }

    fn create_targets(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
    ) -> (wgpu::TextureView, Option<wgpu::TextureView>) {
        let size = wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        };
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let msaa = (sample_count > 1).then(|| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some("MSAA Color Texture"),
                    size,
                    mip_level_count: 1,
                    sample_count,
                    dimension: wgpu::TextureDimension::D2,
                    format: config.format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        });
        (depth.create_view(&wgpu::TextureViewDescriptor::default()), msaa)
    }

    fn upload_texture(gpu: &GpuContext, image: &TextureImage, label: &str) -> wgpu::Texture {
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        gpu.queue().write_texture(
            texture.as_image_copy(),
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );
        texture
    }

    fn material_bind_group(&self, material: &Material, texture: Option<&wgpu::TextureView>) -> wgpu::BindGroup {
        let device = self.gpu.device();
        let uniform = MaterialUniform {
            base_color: material.base_color_factor,
        };
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Bind Group"),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(texture.unwrap_or(&self.white_view)),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    /// Upload topology, materials and textures when a different scene arrives
    fn ensure_scene(&mut self, scene: &SceneGraph) {
        if self.scene.as_ref().is_some_and(|s| s.uid == scene.uid()) {
            return;
        }

        let texture_views: Vec<Option<wgpu::TextureView>> = scene
            .textures
            .iter()
            .enumerate()
            .map(|(i, image)| {
                if image.width == 0
                    || image.height == 0
                    || image.rgba.len() != (image.width * image.height * 4) as usize
                {
                    log::warn!("texture {i} has inconsistent size, using white");
                    return None;
                }
                let texture = Self::upload_texture(&self.gpu, image, "Base Color Texture");
                Some(texture.create_view(&wgpu::TextureViewDescriptor::default()))
            })
            .collect();

        let mut materials: Vec<wgpu::BindGroup> = scene
            .materials
            .iter()
            .map(|m| {
                let view = m
                    .base_color_texture
                    .and_then(|t| texture_views.get(t))
                    .and_then(Option::as_ref);
                self.material_bind_group(m, view)
            })
            .collect();
        let default_material = materials.len();
        materials.push(self.material_bind_group(&Material::default(), None));

        let device = self.gpu.device();
        let mut draws = Vec::new();
        for (index, node) in scene.nodes().iter().enumerate() {
            let Some(mesh_index) = node.mesh else {
                continue;
            };
            let Some(mesh) = scene.meshes.get(mesh_index) else {
                continue;
            };
            for (primitive_index, primitive) in mesh.primitives.iter().enumerate() {
                let index_count = primitive.indices.len() / 3 * 3;
                if primitive.positions.is_empty() || index_count == 0 {
                    continue;
                }
                let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("Posed Vertex Buffer"),
                    size: (primitive.vertex_count() * std::mem::size_of::<MeshVertex>()) as wgpu::BufferAddress,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Index Buffer"),
                    contents: bytemuck::cast_slice(&primitive.indices[..index_count]),
                    usage: wgpu::BufferUsages::INDEX,
                });
                let material = primitive
                    .material
                    .filter(|m| *m < default_material)
                    .unwrap_or(default_material);
                let double_sided = scene
                    .materials
                    .get(material)
                    .is_some_and(|m| m.double_sided);

                draws.push(DrawItem {
                    node: NodeId(index),
                    mesh: mesh_index,
                    primitive: primitive_index,
                    vertex_buffer,
                    index_buffer,
                    index_count: index_count as u32,
                    material,
                    double_sided,
                });
            }
        }

        log::debug!(
            "uploaded scene {}: {} draws, {} materials",
            scene.uid(),
            draws.len(),
            materials.len()
        );
        self.scene = Some(GpuScene {
            uid: scene.uid(),
            draws,
            materials,
        });
    }

    /// Pose every primitive for the current transforms and rewrite its vertices
    fn write_vertices(&self, scene: &SceneGraph) {
        let Some(gpu_scene) = &self.scene else {
            return;
        };
        let world = scene.world_transforms();
        for draw in &gpu_scene.draws {
            let Some(primitive) = scene
                .meshes
                .get(draw.mesh)
                .and_then(|m| m.primitives.get(draw.primitive))
            else {
                continue;
            };
            let posed = scene.pose_primitive(draw.node, primitive, &world, true);
            let normals = if posed.normals.len() == posed.positions.len() {
                posed.normals
            } else {
                compute_vertex_normals(&posed.positions, &primitive.indices)
            };
            let vertices: Vec<MeshVertex> = posed
                .positions
                .iter()
                .zip(&normals)
                .enumerate()
                .map(|(i, (position, normal))| MeshVertex {
                    position: position.to_array(),
                    normal: normal.to_array(),
                    uv: primitive.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
                })
                .collect();
            self.gpu
                .queue()
                .write_buffer(&draw.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
        }
    }

    fn frame_uniform(&self, camera: &PerspectiveCamera) -> FrameUniform {
        let aces = if self.output.tone_mapping == ToneMapping::AcesFilmic {
            1.0
        } else {
            0.0
        };
        FrameUniform {
            camera: camera.to_uniform(),
            lighting: self.lighting,
            output: [self.output.exposure, aces, 0.0, 0.0],
        }
    }

    fn clear_color(&self) -> wgpu::Color {
        let [r, g, b] = hex_to_linear_rgb(self.output.background);
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }

    fn draw_overlay(&mut self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) -> Vec<wgpu::CommandBuffer> {
        let (Some(overlay), Some(text)) = (self.overlay.as_mut(), self.overlay_text.clone()) else {
            return Vec::new();
        };

        let raw_input = overlay.state.take_egui_input(&self.window);
        let full_output = overlay.ctx.run(raw_input, |ctx| {
            egui::Area::new(egui::Id::new("status"))
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        if !text.starts_with("Error") {
                            ui.add(egui::Spinner::new().size(40.0));
                        }
                        ui.label(
                            egui::RichText::new(&text)
                                .size(16.0)
                                .color(egui::Color32::from_rgb(0xe0, 0xe0, 0xe0)),
                        );
                    });
                });
        });
        overlay
            .state
            .handle_platform_output(&self.window, full_output.platform_output);

        let pixels_per_point = self.pixel_ratio as f32;
        let tris = overlay.ctx.tessellate(full_output.shapes, pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            overlay
                .renderer
                .update_texture(self.gpu.device(), self.gpu.queue(), *id, image_delta);
        }
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point,
        };
        let commands = overlay.renderer.update_buffers(
            self.gpu.device(),
            self.gpu.queue(),
            encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Overlay Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();
            overlay.renderer.render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            overlay.renderer.free_texture(id);
        }
        commands
    }
}

impl RenderSurface for SurfaceRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(self.gpu.device(), &self.config);
        let (depth_view, msaa_view) = Self::create_targets(self.gpu.device(), &self.config, self.sample_count);
        self.depth_view = depth_view;
        self.msaa_view = msaa_view;
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
    }

    fn configure_output(&mut self, settings: &OutputSettings) {
        self.output = *settings;
        let config = match Self::create_surface_config(
            &self.gpu,
            &self.surface,
            settings,
            self.config.width,
            self.config.height,
        ) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("keeping previous surface configuration: {e:#}");
                self.config.clone()
            }
        };
        let sample_count = Self::supported_samples(&self.gpu, config.format, settings.msaa_samples);

        if config.format != self.config.format || sample_count != self.sample_count {
            self.config = config;
            self.sample_count = sample_count;
            self.surface.configure(self.gpu.device(), &self.config);
            self.pipelines = Self::create_pipelines(
                self.gpu.device(),
                &self.pipeline_layout,
                &self.shader,
                self.config.format,
                sample_count,
            );
            let (depth_view, msaa_view) = Self::create_targets(self.gpu.device(), &self.config, sample_count);
            self.depth_view = depth_view;
            self.msaa_view = msaa_view;
            if let Some(overlay) = self.overlay.as_mut() {
                overlay.renderer = egui_wgpu::Renderer::new(
                    self.gpu.device(),
                    self.config.format,
                    egui_wgpu::RendererOptions::default(),
                );
            }
        }
        log::info!(
            "output: {:?}, exposure {}, {:?}, {}x MSAA",
            settings.tone_mapping,
            settings.exposure,
            self.config.format,
            self.sample_count
        );
    }

    fn set_lighting(&mut self, rig: &LightingRig) {
        self.lighting = rig.to_uniform();
    }

    fn set_overlay(&mut self, text: Option<String>) {
        self.overlay_text = text;
    }

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> Result<()> {
        self.ensure_scene(scene);
        self.write_vertices(scene);
        self.gpu
            .queue()
            .write_buffer(&self.frame_buffer, 0, bytemuck::cast_slice(&[self.frame_uniform(camera)]));

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(self.gpu.device(), &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(anyhow!("failed to acquire surface texture: {e}")),
        };
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let (target, resolve_target) = match &self.msaa_view {
                Some(msaa) => (msaa, Some(&view)),
                None => (&view, None),
            };
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Mesh Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
            if let Some(gpu_scene) = &self.scene {
                for draw in &gpu_scene.draws {
                    let pipeline = if draw.double_sided {
                        &self.pipelines.double_sided
                    } else {
                        &self.pipelines.culled
                    };
                    render_pass.set_pipeline(pipeline);
                    render_pass.set_bind_group(1, &gpu_scene.materials[draw.material], &[]);
                    render_pass.set_vertex_buffer(0, draw.vertex_buffer.slice(..));
                    render_pass.set_index_buffer(draw.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..draw.index_count, 0, 0..1);
                }
            }
        }

        let mut commands = self.draw_overlay(&mut encoder, &view);
        commands.push(encoder.finish());
        self.gpu.queue().submit(commands);
        frame.present();
        Ok(())
    }
}

/// Area-weighted vertex normals for primitives that ship without them
pub fn compute_vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals.into_iter().map(|n| n.normalize_or(Vec3::Y)).collect()
}
