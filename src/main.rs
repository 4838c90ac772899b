use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use model_viewer::cli::Cli;
use model_viewer::config::ViewerConfig;
use model_viewer::core::{
    CancelToken, FpsCounter, GpuContext, InputSource, SurfaceRenderer, Throttled, ViewportSize,
    WinitController,
};
use model_viewer::error::ViewerError;
use model_viewer::frame::FrameLoop;
use model_viewer::loaders::{AssetLoader, LoadEvent, LoadHandle};
use model_viewer::Viewer;

const FPS_UPDATE_INTERVAL: f32 = 1.0;
const PROGRESS_LOG_INTERVAL: f32 = 0.25;
const INITIAL_WINDOW_WIDTH: u32 = 800;
const INITIAL_WINDOW_HEIGHT: u32 = 600;

struct App {
    cli: Cli,
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    viewer: Option<Viewer<SurfaceRenderer>>,
    loader: Option<LoadHandle>,
    frames: FrameLoop,
    input: WinitController,
    fps: FpsCounter,
    progress_log: Throttled,
    setup_error: Option<ViewerError>,
}

impl App {
    fn new(cli: Cli, config: ViewerConfig) -> Self {
        Self {
            cli,
            config,
            window: None,
            viewer: None,
            loader: None,
            frames: FrameLoop::new(CancelToken::new()),
            input: WinitController::new(),
            fps: FpsCounter::new(FPS_UPDATE_INTERVAL),
            progress_log: Throttled::new(PROGRESS_LOG_INTERVAL),
            setup_error: None,
        }
    }

    fn setup(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title("Model Viewer")
                    .with_inner_size(winit::dpi::LogicalSize::new(
                        INITIAL_WINDOW_WIDTH,
                        INITIAL_WINDOW_HEIGHT,
                    )),
            )
            .map(Arc::new)
            .map_err(|e| ViewerError::Setup(format!("failed to create window: {e}")))?;

        let (gpu, surface) = pollster::block_on(GpuContext::for_window(window.clone()))
            .map_err(|e| ViewerError::Setup(format!("{e:#}")))?;
        let renderer = SurfaceRenderer::new(window.clone(), gpu, surface, !self.cli.no_ui)
            .map_err(|e| ViewerError::Setup(format!("{e:#}")))?;

        let viewport = ViewportSize::from(window.inner_size());
        self.viewer = Some(Viewer::new(
            self.config.clone(),
            renderer,
            viewport,
            window.scale_factor(),
        ));
        self.loader = Some(AssetLoader::spawn(&self.cli.model));
        self.window = Some(window);
        Ok(())
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.frames.cancel();
        if let Some(loader) = self.loader.take() {
            loader.cancel();
        }
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(frame) = self.frames.next_frame() else {
            event_loop.exit();
            return;
        };
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };

        if let Some(loader) = self.loader.as_mut() {
            let log_progress = self.progress_log.try_tick(frame.delta);
            for event in loader.poll() {
                if let LoadEvent::Progress(progress) = &event {
                    if log_progress {
                        log::debug!("loaded {} of {:?} bytes", progress.loaded_bytes, progress.total_bytes);
                    }
                }
                // failures are logged and shown by the viewer; nothing is retried
                let _ = viewer.handle_load_event(event);
            }
            if loader.is_finished() {
                self.loader = None;
            }
        }

        if let Err(e) = viewer.tick(&frame, self.input.drain()) {
            log::error!("Render error: {e:#}");
        }

        if let Some(fps) = self.fps.tick(frame.delta) {
            log::debug!("FPS: {fps:.1}");
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.setup_error.is_some() {
            return;
        }
        if let Err(e) = self.setup(event_loop) {
            log::error!("Error: {e}");
            self.setup_error = Some(e);
            self.frames.cancel();
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(viewer) = self.viewer.as_mut() {
            if viewer.surface_mut().handle_window_event(&event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.shutdown(event_loop),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(viewer) = self.viewer.as_mut() {
                    viewer.set_pixel_ratio(scale_factor);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            other => self.input.process_event(&other),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.frames.is_cancelled() {
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = ViewerConfig::from_cli(&cli).inspect_err(|e| log::error!("Error: {e}"))?;

    let event_loop = EventLoop::new().map_err(|e| ViewerError::Setup(e.to_string()))?;
    let mut app = App::new(cli, config);

    log::info!("Model Viewer - drag to orbit, scroll or pinch to zoom, Escape to quit");
    event_loop.run_app(&mut app)?;

    if let Some(e) = app.setup_error.take() {
        return Err(e.into());
    }
    Ok(())
}
