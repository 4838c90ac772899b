//! The viewer context: one owner for the scene, camera, controls, playback and
//! render surface, driven one tick at a time by the host.

use crate::animation::{select_and_play, AnimationPlayer};
use crate::camera::PerspectiveCamera;
use crate::config::ViewerConfig;
use crate::core::{FrameInputs, ViewportSize};
use crate::display::RenderSurface;
use crate::error::ViewerError;
use crate::fit::{fit_camera, CameraFit};
use crate::frame::FrameInfo;
use crate::loaders::{LoadEvent, LoadedAsset};
use crate::normalize::{normalize, NormalizationResult};
use crate::orbit::OrbitController;
use crate::scene::{NodeId, SceneGraph};
use crate::status::ViewerStatus;

/// What happened when a loaded model replaced the displayed one
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInstall {
    pub normalization: NormalizationResult,
    pub fit: CameraFit,
    /// Clip now playing, if the model has any
    pub clip: Option<String>,
}

pub struct Viewer<S: RenderSurface> {
    config: ViewerConfig,
    surface: S,
    viewport: ViewportSize,
    scene: SceneGraph,
    model: Option<NodeId>,
    camera: PerspectiveCamera,
    orbit: OrbitController,
    player: Option<AnimationPlayer>,
    status: ViewerStatus,
}

impl<S: RenderSurface> Viewer<S> {
    /// Apply one-time output and lighting setup to `surface` and start in the loading state
    pub fn new(config: ViewerConfig, mut surface: S, viewport: ViewportSize, pixel_ratio: f64) -> Self {
        surface.set_pixel_ratio(pixel_ratio);
        if !viewport.is_empty() {
            surface.set_size(viewport.width, viewport.height);
        }
        surface.configure_output(&config.render.output_settings());
        surface.set_lighting(&config.lighting);

        let camera = config.camera.build(viewport.aspect().unwrap_or(1.0));
        let mut orbit = OrbitController::new(config.orbit.settings());
        orbit.sync_to_camera(&camera);

        let status = ViewerStatus::Loading;
        surface.set_overlay(status.overlay_text());

        Self {
            config,
            surface,
            viewport,
            scene: SceneGraph::new(),
            model: None,
            camera,
            orbit,
            player: None,
            status,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Root of the displayed model, once one is installed
    pub fn model(&self) -> Option<NodeId> {
        self.model
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn orbit(&self) -> &OrbitController {
        &self.orbit
    }

    pub fn player(&self) -> Option<&AnimationPlayer> {
        self.player.as_ref()
    }

    pub fn status(&self) -> &ViewerStatus {
        &self.status
    }

    /// Normalize and frame `asset`, then swap it in as the displayed model
    ///
    /// Nothing visible changes on error; the previous scene, camera and
    /// controls stay as they were.
    pub fn install_model(&mut self, asset: LoadedAsset) -> Result<ModelInstall, ViewerError> {
        let LoadedAsset {
            mut scene,
            root,
            clips,
        } = asset;

        let normalization = normalize(&mut scene, root, self.config.framing.canonical_size)?;
        let mut camera = self.camera.clone();
        let fit = fit_camera(&scene, root, &mut camera, &self.config.fit_settings());
        let player = select_and_play(&clips, &scene, root, &self.config.animation.preferred_clip);

        self.scene = scene;
        self.model = Some(root);
        self.camera = camera;
        self.orbit = OrbitController::new(self.config.orbit.settings());
        self.orbit.sync_to_camera(&self.camera);
        self.player = player;

        log::info!(
            "model installed: scale {:.4}, camera distance {:.3}",
            normalization.scale_factor,
            fit.fitted_distance
        );
        Ok(ModelInstall {
            normalization,
            fit,
            clip: self.player.as_ref().map(|p| p.clip_name().to_string()),
        })
    }

    /// Fold one loader event into the viewer status, installing the model when it arrives
    pub fn handle_load_event(&mut self, event: LoadEvent) -> Result<Option<ModelInstall>, ViewerError> {
        match event {
            LoadEvent::Progress(progress) => {
                self.set_status(ViewerStatus::Progress(progress.percent()));
                Ok(None)
            }
            LoadEvent::Loaded(asset) => match self.install_model(asset) {
                Ok(install) => {
                    self.set_status(ViewerStatus::Ready);
                    Ok(Some(install))
                }
                Err(e) => Err(self.fail(e)),
            },
            LoadEvent::Failed(e) => Err(self.fail(ViewerError::Load(e))),
        }
    }

    /// Resize the render target and camera; empty sizes (minimized windows) are ignored
    pub fn resize(&mut self, size: ViewportSize) {
        let Some(aspect) = size.aspect() else {
            return;
        };
        self.viewport = size;
        self.surface.set_size(size.width, size.height);
        self.camera.set_aspect(aspect);
    }

    pub fn set_pixel_ratio(&mut self, ratio: f64) {
        self.surface.set_pixel_ratio(ratio);
    }

    /// One frame: buffered resize, orbit input, playback, damping, render
    pub fn tick(&mut self, frame: &FrameInfo, inputs: FrameInputs) -> anyhow::Result<()> {
        self.apply_inputs(inputs);
        self.advance(frame.delta);
        self.surface.render(&self.scene, &self.camera)
    }

    /// Inputs sampled at the start of a tick; a resize lands before the drag is
    /// scaled by the viewport height
    pub fn apply_inputs(&mut self, inputs: FrameInputs) {
        if let Some(size) = inputs.resize {
            self.resize(size);
        }
        self.orbit.apply_input(&inputs.orbit, self.viewport.height as f32);
    }

    /// Playback and one damping step
    pub fn advance(&mut self, delta_seconds: f32) {
        if let Some(player) = self.player.as_mut() {
            player.advance(delta_seconds, &mut self.scene);
        }
        self.orbit.update(delta_seconds, &mut self.camera);
    }

    fn set_status(&mut self, status: ViewerStatus) {
        if status != self.status {
            self.surface.set_overlay(status.overlay_text());
            self.status = status;
        }
    }

    fn fail(&mut self, error: ViewerError) -> ViewerError {
        log::error!("Error: {error}");
        self.set_status(ViewerStatus::Failed(error.to_string()));
        error
    }
}
