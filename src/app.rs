use std::sync::Arc;

use anyhow::{anyhow, Context};
use cgmath::Vector3;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes},
};

use crate::{
    config::AppConfig,
    gfx::{
        camera::{CameraManager, OrbitCamera},
        picking::{ItemPicker, Ray},
        rendering::{RenderEngine, RenderError},
    },
    interaction::{PointerAction, SceneController, Shortcut},
    ui::{furnish_panel, PanelState, UiManager},
};

/// Height the camera orbits around, roughly the middle of most furniture
const CAMERA_TARGET_HEIGHT: f32 = 0.5;

pub struct FurnishApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: AppConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    controller: SceneController,
    camera_manager: CameraManager,
    panel: PanelState,
    cursor: Option<PhysicalPosition<f64>>,
    fatal: Option<anyhow::Error>,
}

impl FurnishApp {
    /// Creates the event loop and a running scene controller for `config`
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;

        let aspect = config.window.width as f32 / config.window.height.max(1) as f32;
        let camera_manager = CameraManager::from_config(
            &config.camera,
            Vector3::new(0.0, CAMERA_TARGET_HEIGHT, 0.0),
            aspect,
        );

        let mut controller = SceneController::from_config(&config);
        controller.start()?;

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                ui_manager: None,
                controller,
                camera_manager,
                panel: PanelState::new(),
                cursor: None,
                fatal: None,
            },
        })
    }

    /// Access to the scene before the window opens, e.g. to place a starting layout
    pub fn controller_mut(&mut self) -> &mut SceneController {
        &mut self.app_state.controller
    }

    /// Runs the event loop until the window closes
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .ok_or_else(|| anyhow!("event loop already consumed"))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .context("event loop terminated with an error")?;

        match self.app_state.fatal.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.fatal = Some(error);
        event_loop.exit();
    }

    fn cursor_ray(&self, window: &Window) -> Option<Ray> {
        let cursor = self.cursor?;
        Some(cursor_ray(
            &self.camera_manager.camera,
            cursor,
            window.inner_size(),
        ))
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if let PhysicalKey::Code(key_code) = event.physical_key {
            if event.state == ElementState::Pressed && !event.repeat {
                if key_code == KeyCode::Escape {
                    event_loop.exit();
                    return;
                }
                if let Some(shortcut) = Shortcut::from_key(key_code) {
                    self.controller.handle_shortcut(shortcut);
                }
            }
        }
        self.camera_manager.process_keyboard_event(event);
    }

    fn handle_mouse_button(&mut self, window: &Window, state: ElementState) {
        match state {
            ElementState::Pressed => {
                let Some(ray) = self.cursor_ray(window) else {
                    return;
                };
                match self.controller.pointer_down(&ray) {
                    PointerAction::DragStarted(handle) => log::debug!("Dragging {:?}", handle),
                    PointerAction::Selected(id) => log::debug!("Selected {}", id),
                    PointerAction::Cleared | PointerAction::Ignored => {}
                }
            }
            ElementState::Released => {
                if self.controller.pointer_up() {
                    // The press belonged to the gizmo, not the orbit controls
                    self.camera_manager.controls.release();
                }
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let AppState {
            window: Some(window),
            render_engine: Some(render_engine),
            ui_manager: Some(ui_manager),
            controller,
            camera_manager,
            panel,
            ..
        } = self
        else {
            return;
        };

        controller.update();

        camera_manager.camera.update_view_proj();
        render_engine.update(camera_manager.camera.uniform);
        render_engine.prepare(controller.scene_mut());

        let selection = controller.selection_view();
        let stats = controller.scene().get_statistics();
        let room = *controller.room();
        let mut commands = Vec::new();

        let result = render_engine.render_frame(
            controller.scene(),
            controller.gizmo(),
            |device, queue, encoder, color_attachment| {
                ui_manager.draw(device, queue, encoder, window, color_attachment, |ui| {
                    commands = furnish_panel(ui, panel, selection.as_ref(), &room, &stats);
                });
            },
        );

        for command in commands {
            controller.apply(command);
        }

        match result {
            Ok(()) => {}
            Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                let error = anyhow!("GPU is out of memory");
                self.fail(event_loop, error);
            }
            Err(e) => log::error!("Frame dropped: {}", e),
        }
    }
}

/// Ray from the camera through the cursor position
fn cursor_ray(
    camera: &OrbitCamera,
    cursor: PhysicalPosition<f64>,
    size: PhysicalSize<u32>,
) -> Ray {
    ItemPicker::screen_to_ray(
        (cursor.x as f32, cursor.y as f32),
        (size.width as f32, size.height as f32),
        camera,
    )
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, anyhow::Error::new(e).context("failed to create window"));
                return;
            }
        };

        let (width, height) = window.inner_size().into();
        let window_clone = window.clone();
        let room = *self.controller.room();
        let vsync = self.config.window.vsync;
        let rendering = self.config.rendering.clone();
        let renderer = pollster::block_on(async move {
            RenderEngine::new(window_clone, width, height, vsync, room, &rendering).await
        });
        let mut renderer = match renderer {
            Ok(renderer) => renderer,
            Err(e) => {
                self.fail(event_loop, anyhow::Error::new(e).context("failed to start renderer"));
                return;
            }
        };

        renderer.prepare(self.controller.scene_mut());
        self.camera_manager.camera.resize_projection(width, height);

        let ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window,
        );

        log::info!(
            "Window ready ({}x{}), room {} x {} x {} m",
            width,
            height,
            room.width,
            room.depth,
            room.height
        );

        self.ui_manager = Some(ui_manager);
        self.render_engine = Some(renderer);
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // UI input first; an active gizmo drag keeps the pointer even over the panel
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            if ui_manager.handle_input(&window, &ui_event) && !self.controller.is_dragging() {
                if let WindowEvent::CursorMoved { position, .. } = event {
                    self.cursor = Some(position);
                }
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &event),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some(position);
                if self.controller.is_dragging() {
                    if let Some(ray) = self.cursor_ray(&window) {
                        self.controller.pointer_move(&ray);
                    }
                    window.request_redraw();
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.handle_mouse_button(&window, state),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.camera_manager.camera.resize_projection(width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    ui_manager.update_display_size(width, height);
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: winit::event::DeviceEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };

        // Camera input pauses while the UI has focus or the gizmo owns the pointer
        if let Some(ui_manager) = self.ui_manager.as_ref() {
            if ui_manager.wants_mouse() || ui_manager.wants_keyboard() {
                return;
            }
        }
        if self.controller.is_dragging() {
            return;
        }

        self.camera_manager.process_event(&event, window);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Err(e) = self.controller.stop() {
            log::debug!("{}", e);
        }
        let pending = self.controller.pending_loads();
        if pending > 0 {
            log::info!("Exiting with {} model load(s) still in flight", pending);
        }
    }
}
