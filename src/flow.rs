//! Flow control and the application event loop.
//!
//! A [`GraphicsFlow`] builds the [`Scene`] once at start-up and may animate it
//! every frame. [`run`] owns everything else: the window, the GPU context,
//! the renderer and the fly-through camera controller.
//!
//! # Frame
//!
//! 1. Measure the time since the previous frame
//! 2. Move the camera from held keys (Escape requests close)
//! 3. Call [`GraphicsFlow::on_update`]
//! 4. On resize, reconfigure the surface and rebuild the projection
//! 5. Rebuild the camera's view matrix
//! 6. Clear, draw every entity, present

use std::sync::Arc;

use anyhow::Context as _;
use instant::Duration;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    camera::{Camera, FlyCameraController},
    config::EngineConfig,
    context::Context,
    data_structures::{entity::Entity, light::DirectionalLight},
    render::{Frame, Renderer},
    resources,
    surface::Surface,
};

/// Everything drawn in a frame: one camera, one light, any number of entities.
#[derive(Debug)]
pub struct Scene {
    pub camera: Camera,
    pub light: DirectionalLight,
    pub entities: Vec<Entity>,
}

impl Scene {
    pub fn new(camera: Camera, light: DirectionalLight) -> Self {
        Self {
            camera,
            light,
            entities: Vec::new(),
        }
    }

    /// Camera placed and shaped as `config` says, for a target of `ctx`'s size.
    pub fn default_camera(ctx: &Context, config: &EngineConfig) -> Camera {
        Camera::new(config.camera_position, ctx.aspect_ratio(), config.fov)
    }

    pub fn add(&mut self, entity: Entity) -> &mut Entity {
        self.entities.push(entity);
        let last = self.entities.len() - 1;
        &mut self.entities[last]
    }

    /// Clears the next frame and draws every entity into it. The caller presents it.
    pub fn render(&self, renderer: &mut Renderer, ctx: &Context) -> Result<Frame, wgpu::SurfaceError> {
        let frame = renderer.begin_frame(ctx)?;
        for entity in &self.entities {
            renderer.render(ctx, &frame, &self.camera, entity, &self.light);
        }
        Ok(frame)
    }
}

/// A scene and its per-frame behaviour.
///
/// # Lifecycle
///
/// 1. `on_init()` is awaited once after the GPU is ready and builds the scene.
///    Returning an error aborts start-up.
/// 2. `on_update()` is called every frame before anything is drawn.
#[allow(async_fn_in_trait)]
pub trait GraphicsFlow {
    async fn on_init(&mut self, ctx: &Context, config: &EngineConfig) -> anyhow::Result<Scene>;

    fn on_update(&mut self, _scene: &mut Scene, _surface: &Surface, _dt: Duration) {}
}

pub(crate) struct AppState {
    ctx: Context,
    surface: Surface,
    renderer: Renderer,
    controller: FlyCameraController,
    scene: Scene,
}

impl AppState {
    fn frame<F: GraphicsFlow>(&mut self, flow: &mut F) {
        let dt = self.surface.tick();

        if self
            .controller
            .update(&mut self.scene.camera, self.surface.input(), dt)
        {
            self.surface.request_close();
        }
        flow.on_update(&mut self.scene, &self.surface, dt);

        if self.surface.take_resized() {
            self.ctx.resize(self.surface.width(), self.surface.height());
            let fov = self.scene.camera.fov();
            self.scene.camera.set_projection(self.surface.aspect_ratio(), fov);
        }
        self.scene.camera.update();

        match self.scene.render(&mut self.renderer, &self.ctx) {
            Ok(frame) => self.renderer.end_frame(frame),
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => self.ctx.reconfigure(),
            Err(e) => log::error!("Unable to render {}", e),
        }
    }
}

pub struct App<F: GraphicsFlow> {
    async_runtime: tokio::runtime::Runtime,
    config: EngineConfig,
    flow: F,
    state: Option<AppState>,
    error: Option<anyhow::Error>,
}

impl<F: GraphicsFlow> App<F> {
    fn new(config: EngineConfig, flow: F) -> anyhow::Result<Self> {
        let async_runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
        Ok(Self {
            async_runtime,
            config,
            flow,
            state: None,
            error: None,
        })
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<AppState> {
        let window_attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("Failed to create the window")?,
        );

        let config = &self.config;
        let flow = &mut self.flow;
        let init = async {
            let ctx = Context::new(window.clone(), config).await?;
            let source = resources::load_shader(&config.shader)
                .await
                .with_context(|| format!("Failed to load shader {}", config.shader))?;
            let renderer = Renderer::new(&ctx, &source, config.clear_color)
                .await
                .with_context(|| format!("Failed to build shader {}", config.shader))?;
            let scene = flow.on_init(&ctx, config).await.context("Scene set-up failed")?;
            anyhow::Ok((ctx, renderer, scene))
        };
        let (ctx, renderer, scene) = self.async_runtime.block_on(init)?;

        log::info!("Scene ready with {} entities", scene.entities.len());
        let surface = Surface::new(window);
        surface.request_redraw();
        Ok(AppState {
            ctx,
            surface,
            renderer,
            controller: FlyCameraController::new(self.config.camera_speed),
            scene,
        })
    }
}

impl<F: GraphicsFlow> ApplicationHandler for App<F> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(state) => self.state = Some(state),
            Err(e) => {
                log::error!("Start-up failed: {:#}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };
        state.surface.handle_window_event(&event);

        if let WindowEvent::RedrawRequested = event {
            state.frame(&mut self.flow);
            state.surface.request_redraw();
        }
        if state.surface.close_requested() {
            event_loop.exit();
        }
    }
}

/// Opens a window and runs `flow` until the window closes.
///
/// Errors raised while setting up the GPU, loading the shader or building the
/// scene end the loop and are returned here.
pub fn run<F: GraphicsFlow>(config: EngineConfig, flow: F) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new().context("Failed to create an event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, flow)?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
