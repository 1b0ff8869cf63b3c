//! Sonosphere - a wireframe sphere that dances to music
//!
//! Every vertex rides the spectrum; every lock window the loudest and
//! quietest points freeze for good and grow a marker shape.

use clap::Parser;
use glam::Vec3;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use sonosphere::audio::{AudioSystem, SourceSpec};
use sonosphere::camera::Camera;
use sonosphere::cli::Args;
use sonosphere::config::Config;
use sonosphere::controls::{command_for_key, ControlHandle, Controller};
use sonosphere::params::{FFTConfig, RenderConfig, VisualizerParams};
use sonosphere::rendering::{marker_vertices, RenderSystem, Uniforms};
use sonosphere::sphere::{FrameStats, MarkerPlacement, SphereMesh, SphereSystem};
use sonosphere::{Error, Result};

/// Stats are logged at this cadence
const STATS_INTERVAL: Duration = Duration::from_millis(100);

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,
    camera: Camera,
    render_config: RenderConfig,

    // Simulation
    sphere: SphereSystem,
    params: VisualizerParams,
    controller: Controller,
    controls: ControlHandle,

    // Audio (started once the window exists)
    audio: Option<AudioSystem>,
    source: SourceSpec,
    fft_config: FFTConfig,

    last_stats: Instant,
    startup_error: Option<Error>,
}

impl App {
    fn new(args: &Args, config: &Config) -> Self {
        let mut params = VisualizerParams::default();
        config.apply_to(&mut params);

        let shape = config.sphere_shape();
        let markers = match args.seed {
            Some(seed) => MarkerPlacement::with_seed(Vec3::ZERO, seed),
            None => MarkerPlacement::new(Vec3::ZERO),
        };
        let sphere = SphereSystem::from_mesh(SphereMesh::new(&shape), &params, markers);
        info!(
            "Sphere: radius {}, {}x{} segments, {} vertices",
            shape.radius,
            shape.width_segments,
            shape.height_segments,
            sphere.mesh.vertex_count()
        );

        let render_config = RenderConfig::default();
        let (controls, controller) = Controller::channel();

        Self {
            window: None,
            render_system: None,
            camera: Camera::new(&render_config),
            render_config,
            sphere,
            params,
            controller,
            controls,
            audio: None,
            source: args.source(),
            fft_config: config.fft_config(),
            last_stats: Instant::now(),
            startup_error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("Sonosphere")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .map_err(|e| Error::Render(format!("Failed to create window: {}", e)))?,
        );

        let render_system = pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            &self.sphere.mesh,
            &self.render_config,
        ))?;
        let (width, height) = render_system.size();
        self.camera.resize(width, height);

        let audio = AudioSystem::new(self.fft_config.clone(), &self.source)?;

        info!("Keys: space play/pause, [ ] sensitivity, 1-4 features, c/s/t shapes, -/= size, Esc quit");

        self.window = Some(window);
        self.render_system = Some(render_system);
        self.audio = Some(audio);
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.startup_error.is_some() {
            return; // Already initialized
        }

        if let Err(e) = self.init(event_loop) {
            self.startup_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(key),
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(command) = command_for_key(key) {
                    self.controls.send(command);
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(render_system) = self.render_system.as_mut() {
                    render_system.resize(size.width, size.height);
                }
                self.camera.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => self.frame(event_loop),
            _ => {}
        }
    }
}

impl App {
    /// Apply controls, advance the sphere and draw
    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let outcome = self.controller.apply_pending(&mut self.params);
        if outcome.quit {
            event_loop.exit();
            return;
        }

        let (Some(render_system), Some(audio)) =
            (self.render_system.as_mut(), self.audio.as_ref())
        else {
            return;
        };

        if outcome.toggle_playback {
            audio.toggle();
        }

        // No snapshot while paused: the sphere holds its last frame
        if let Some(spectrum) = audio.spectrum() {
            let clock_s = audio.playback_time_s();
            self.sphere.update(&spectrum, clock_s, &self.params);

            if self.last_stats.elapsed() >= STATS_INTERVAL {
                self.last_stats = Instant::now();
                let stats = FrameStats::compute(
                    &spectrum,
                    audio.bin_width_hz(),
                    self.sphere.engine.locked_count(),
                    self.sphere.markers.len(),
                );
                debug!(
                    "t={:.2}s avg={:.3} peak={:.0}Hz locked={} markers={}",
                    clock_s,
                    stats.average_amplitude,
                    stats.peak_frequency_hz,
                    stats.locked_vertices,
                    stats.markers
                );
            }
        }

        render_system.update_sphere(
            self.sphere.engine.position_buffer(),
            self.sphere.engine.color_buffer(),
        );
        let markers = marker_vertices(&self.sphere.markers, &self.params.markers);
        render_system.update_markers(&markers);
        render_system.update_uniforms(&Uniforms::new(
            self.camera.view_proj(),
            self.sphere.model_matrix(),
        ));

        match render_system.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost, reconfiguring");
                let (width, height) = render_system.size();
                render_system.resize(width, height);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => warn!("Render error: {:?}", e),
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load_or_default(args.config.as_deref());
    args.apply_to(&mut config);

    let mut app = App::new(&args, &config);
    let event_loop =
        EventLoop::new().map_err(|e| Error::Render(format!("Failed to create event loop: {}", e)))?;
    event_loop
        .run_app(&mut app)
        .map_err(|e| Error::Render(format!("Event loop failed: {}", e)))?;

    match app.startup_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}
