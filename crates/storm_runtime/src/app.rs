//! Windowed frame loop
//!
//! winit drives the loop. Each redraw is one frame: dt from the clock,
//! update, then draw. Input is handled between frames as winit delivers it.

use crate::frame;
use anyhow::{Context, Result};
use std::sync::Arc;
use storm_asset::AssetSet;
use storm_core::glam::Vec2;
use storm_core::{Renderer, RotationStrategy, SpritePopulation};
use storm_metrics::{time_scope, FrameClock, PhaseProfiler, DEFAULT_FPS_WINDOW};
use storm_render::winit::application::ApplicationHandler;
use storm_render::winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use storm_render::winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use storm_render::winit::keyboard::{Key, NamedKey};
use storm_render::winit::window::{Window, WindowId};
use storm_render::{
    parse_backends, window_attributes, wgpu, GpuRenderer, GpuSettings, WindowConfig, WindowedSoftwareRenderer,
};
use storm_services::{input, BackendKind, InputEvent, InputOutcome, PointerButton, Settings};
use tracing::{error, info};

/// Open the window and run until quit. Returns the first fatal error.
pub fn run(settings: Settings, batches: usize) -> Result<()> {
    let event_loop = EventLoop::new().context("cannot create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(settings, batches);
    event_loop.run_app(&mut app).context("event loop failed")?;
    app.finish()
}

/// Everything that exists once the window is up.
struct Scene {
    window: Arc<Window>,
    renderer: Box<dyn Renderer>,
    strategy: RotationStrategy,
    population: SpritePopulation,
    assets: AssetSet,
}

struct App {
    settings: Settings,
    batches: usize,
    scene: Option<Scene>,
    clock: FrameClock,
    profiler: PhaseProfiler,
    /// Last cursor position in simulation coordinates.
    cursor: Vec2,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(settings: Settings, batches: usize) -> Self {
        let cursor = settings.simulation.center();
        Self {
            settings,
            batches,
            scene: None,
            clock: FrameClock::new(DEFAULT_FPS_WINDOW),
            profiler: PhaseProfiler::new(),
            cursor,
            error: None,
        }
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> Result<Scene> {
        let sim = &self.settings.simulation;

        let window_config = WindowConfig {
            title: self.settings.title.clone(),
            width: sim.window_width as u32,
            height: sim.window_height as u32,
            resizable: false,
        };
        let window = Arc::new(
            event_loop
                .create_window(window_attributes(&window_config))
                .context("cannot create window")?,
        );

        let backends = match &self.settings.gpu_backends {
            Some(list) => parse_backends(list)?,
            None => wgpu::Backends::all(),
        };
        let gpu_settings = GpuSettings {
            backends,
            vsync: self.settings.vsync,
            view_size: sim.bounds(),
            title: self.settings.title.clone(),
        };

        let mut renderer: Box<dyn Renderer> = match self.settings.backend {
            BackendKind::Gpu => {
                let gpu = GpuRenderer::new(window.clone(), &gpu_settings).context("renderer failed")?;
                info!(adapter = gpu.adapter_label(), "sprites rotate in the vertex shader");
                Box::new(gpu)
            }
            BackendKind::Software => Box::new(
                WindowedSoftwareRenderer::new(window.clone(), &gpu_settings).context("renderer failed")?,
            ),
        };

        let assets = AssetSet::load(&self.settings.assets_dir, renderer.as_mut()).context("asset loading failed")?;
        let strategy = RotationStrategy::prepare(
            self.settings.rotation,
            renderer.as_mut(),
            assets.images(),
            sim.angle_resolution()?,
        )
        .context("rotation cache build failed")?;

        let mut population =
            SpritePopulation::new(sim.clone(), assets.count()).context("invalid simulation settings")?;
        let center = sim.center();
        for _ in 0..self.batches {
            population.add_batch(center.x, center.y);
        }

        info!(
            renderer = renderer.name(),
            images = assets.count().get(),
            sprites = population.len(),
            "scene ready"
        );

        Ok(Scene {
            window,
            renderer,
            strategy,
            population,
            assets,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{err:#}");
        if self.error.is_none() {
            self.error = Some(err);
        }
        event_loop.exit();
    }

    /// Map a physical cursor position onto the simulation area.
    fn track_cursor(&mut self, x: f64, y: f64) {
        let Some(scene) = &self.scene else { return };
        let size = scene.window.inner_size();
        if size.width == 0 || size.height == 0 {
            return;
        }
        let bounds = self.settings.simulation.bounds();
        self.cursor = Vec2::new(
            x as f32 * bounds.x / size.width as f32,
            y as f32 * bounds.y / size.height as f32,
        );
    }

    fn handle_input(&mut self, event_loop: &ActiveEventLoop, event: InputEvent) {
        let Some(scene) = self.scene.as_mut() else { return };
        if input::apply(event, &mut scene.population) == InputOutcome::Quit {
            event_loop.exit();
        }
    }

    fn redraw(&mut self) -> Result<()> {
        let Some(scene) = self.scene.as_mut() else { return Ok(()) };

        let dt = self.clock.tick();
        let fps = self.clock.fps();
        time_scope!(self.profiler, "update", { scene.population.update(dt) });
        time_scope!(self.profiler, "draw", {
            frame::render(scene.renderer.as_mut(), &scene.population, &scene.strategy, fps)
        })
        .context("renderer failed")?;
        self.profiler.end_frame();

        scene.window.request_redraw();
        Ok(())
    }

    fn finish(self) -> Result<()> {
        if let Some(scene) = &self.scene {
            info!(
                frames = self.clock.frames(),
                sprites = scene.population.len(),
                images = scene.assets.count().get(),
                fps = format!("{:.1}", self.clock.fps()),
                update_ms = format!("{:.3}", self.profiler.average_ms("update")),
                draw_ms = format!("{:.3}", self.profiler.average_ms("draw")),
                "run finished"
            );
        }
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.scene.is_some() || self.error.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(scene) => {
                scene.window.request_redraw();
                self.scene = Some(scene);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.handle_input(event_loop, InputEvent::Quit),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => self.handle_input(event_loop, InputEvent::Quit),
            WindowEvent::CursorMoved { position, .. } => self.track_cursor(position.x, position.y),
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button,
                ..
            } => {
                let button = match button {
                    MouseButton::Left => PointerButton::Primary,
                    MouseButton::Right => PointerButton::Secondary,
                    _ => PointerButton::Other,
                };
                let event = InputEvent::PointerPressed {
                    button,
                    x: self.cursor.x,
                    y: self.cursor.y,
                };
                self.handle_input(event_loop, event);
            }
            WindowEvent::Resized(size) => {
                if let Some(scene) = self.scene.as_mut() {
                    if let Err(err) = scene.renderer.resize(size.width, size.height) {
                        self.fail(event_loop, anyhow::Error::new(err).context("renderer failed"));
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw() {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }
}
