use crate::config::{AppConfig, AppConfigOverrides};
use crate::editor::SceneEditor;
use crate::events::EditorEvent;
use crate::input::{Input, InputEvent};
use crate::intake::SpawnForm;
use crate::mesh_registry::MeshRegistry;
use crate::renderer::{EguiPaint, Renderer, SceneFrame};
use crate::time::Time;
use crate::viewport::Viewport;

mod editor_shell;
mod editor_ui;

use editor_shell::EditorShell;
use editor_ui::{EditorUiOutput, UiActions};

use anyhow::{Context, Result};
use std::collections::VecDeque;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};

const RECENT_EVENT_CAPACITY: usize = 16;

pub async fn run() -> Result<()> {
    run_with_overrides(AppConfigOverrides::default()).await
}

pub async fn run_with_overrides(overrides: AppConfigOverrides) -> Result<()> {
    let mut config = AppConfig::load_or_default(overrides.config_path());
    if !overrides.is_empty() {
        log::info!("[config] command line overrides: {:?}", overrides.applied_fields());
    }
    config.apply_overrides(&overrides);
    let event_loop = EventLoop::new().context("Failed to create winit event loop")?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app).context("Event loop execution failed")?;
    Ok(())
}

pub struct App {
    config: AppConfig,
    renderer: Renderer,
    registry: MeshRegistry,
    editor: SceneEditor,
    viewport: Viewport,
    input: Input,
    time: Time,
    shell: EditorShell,
    form: SpawnForm,
    status: Option<String>,
    recent_events: VecDeque<EditorEvent>,
    should_close: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let size = PhysicalSize::new(config.window.width, config.window.height);
        let editor = SceneEditor::new(&config.viewport, &config.spawn);
        let viewport = Viewport::new(&config.viewport, size);
        let form = SpawnForm::new(config.spawn.default_scale.to_string());
        Self {
            renderer: Renderer::new(&config.window),
            registry: MeshRegistry::new(),
            editor,
            viewport,
            input: Input::new(),
            time: Time::new(),
            shell: EditorShell::new(),
            form,
            status: None,
            recent_events: VecDeque::with_capacity(RECENT_EVENT_CAPACITY),
            should_close: false,
            config,
        }
    }

    pub fn editor(&self) -> &SceneEditor {
        &self.editor
    }

    pub fn recent_events(&self) -> impl Iterator<Item = &EditorEvent> {
        self.recent_events.iter()
    }

    fn apply_ui_actions(&mut self, actions: UiActions) {
        if actions.spawn_requested {
            // Rejections surface through the event bus.
            let _ = self.editor.submit(&mut self.form);
        }
        for id in actions.delete {
            if let Err(err) = self.editor.delete(id) {
                self.status = Some(err.to_string());
            }
        }
        if actions.clear_all {
            let removed = self.editor.clear();
            log::info!("[editor] cleared {removed} meshes");
        }
        if let Some(enabled) = actions.vsync_toggle {
            match self.renderer.set_vsync(enabled) {
                Ok(()) => self.config.window.vsync = enabled,
                Err(err) => log::error!("[renderer] vsync toggle failed: {err:?}"),
            }
        }
    }

    fn process_editor_events(&mut self) {
        for event in self.editor.drain_events() {
            log::debug!("[events] {event}");
            self.status = Some(match &event {
                EditorEvent::SpawnRejected { reason } => format!("Cannot create mesh: {reason}"),
                EditorEvent::MeshSpawned { id, shape, .. } => format!("Created {} {id}", shape.label()),
                EditorEvent::MeshDeleted { id, shape } => format!("Deleted {} {id}", shape.label()),
            });
            if self.recent_events.len() == RECENT_EVENT_CAPACITY {
                self.recent_events.pop_front();
            }
            self.recent_events.push_back(event);
        }
    }

    fn update_viewport(&mut self) {
        if let Some(delta) = self.input.take_rotate_delta() {
            self.viewport.rotate(delta);
        }
        if let Some(delta) = self.input.take_pan_delta() {
            self.viewport.pan(delta);
        }
        if let Some(steps) = self.input.consume_wheel_delta() {
            self.viewport.zoom(steps);
        }
        self.viewport.update(self.editor.graph_mut());
        self.editor.graph_mut().update();
    }

    fn frame(&mut self) -> Result<()> {
        if self.renderer.window().is_none() {
            return Ok(());
        }
        if !self.shell.is_ready() {
            let scene = SceneFrame::capture(self.editor.graph(), &self.viewport);
            return self.renderer.render_frame(&mut self.registry, &scene, None);
        }

        let raw_input = {
            let (Some(window), Some(state)) = (self.renderer.window(), self.shell.egui_winit.as_mut()) else {
                return Ok(());
            };
            state.take_egui_input(window)
        };
        let EditorUiOutput { full_output, actions } = self.render_editor_ui(raw_input);
        let egui::FullOutput { platform_output, textures_delta, shapes, pixels_per_point, .. } = full_output;
        if let (Some(window), Some(state)) = (self.renderer.window(), self.shell.egui_winit.as_mut()) {
            state.handle_platform_output(window, platform_output);
        }

        self.apply_ui_actions(actions);
        self.process_editor_events();

        let scene = SceneFrame::capture(self.editor.graph(), &self.viewport);
        let paint_jobs = self.shell.egui_ctx.tessellate(shapes, pixels_per_point);
        let (Some(painter), Some(screen)) = (self.shell.egui_renderer.as_mut(), self.shell.egui_screen.as_mut())
        else {
            return Ok(());
        };
        screen.pixels_per_point = pixels_per_point;
        if let (Ok(device), Ok(queue)) = (self.renderer.device(), self.renderer.queue()) {
            for (id, delta) in &textures_delta.set {
                painter.update_texture(device, queue, *id, delta);
            }
        }
        let result = self.renderer.render_frame(
            &mut self.registry,
            &scene,
            Some(EguiPaint { painter: &mut *painter, paint_jobs: &paint_jobs, screen: &*screen }),
        );
        for id in &textures_delta.free {
            painter.free_texture(id);
        }
        result
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(err) = self.renderer.ensure_window(event_loop) {
            log::error!("[renderer] initialization failed: {err:?}");
            self.should_close = true;
            event_loop.exit();
            return;
        }
        let size = self.renderer.size();
        self.viewport.resize(size);
        match (self.renderer.window(), self.renderer.device(), self.renderer.surface_format()) {
            (Some(window), Ok(device), Ok(format)) => self.shell.attach(window, device, format),
            (_, Err(err), _) | (_, _, Err(err)) => {
                log::error!("[renderer] unable to initialize egui: {err:?}");
                self.should_close = true;
            }
            (None, _, _) => {
                log::error!("[renderer] window missing after initialization");
                self.should_close = true;
            }
        }
    }

    fn window_event(&mut self, _el: &ActiveEventLoop, id: winit::window::WindowId, event: WindowEvent) {
        let input_event = InputEvent::from_window_event(&event);
        // Pointer motion and releases always reach the viewport so drags never stick.
        let passthrough = matches!(input_event, InputEvent::CursorPos { .. } | InputEvent::CursorLeft)
            || input_event.is_button_release();
        let mut consumed = false;
        if let (Some(window), Some(state)) = (self.renderer.window(), self.shell.egui_winit.as_mut()) {
            if id == window.id() {
                consumed = state.on_window_event(window, &event).consumed;
            }
        }
        if !consumed || passthrough {
            self.input.push(input_event);
        }

        match &event {
            WindowEvent::CloseRequested => self.should_close = true,
            WindowEvent::Resized(size) => {
                self.renderer.resize(*size);
                self.viewport.resize(*size);
                self.shell.resize(*size);
            }
            WindowEvent::Focused(false) => self.input.release_buttons(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.input.take_escape_pressed() {
            self.should_close = true;
        }
        if self.should_close {
            event_loop.exit();
            return;
        }
        self.time.tick();
        self.update_viewport();
        if let Err(err) = self.frame() {
            log::warn!("[renderer] frame skipped: {err:#}");
        }
        if let Some(window) = self.renderer.window() {
            window.request_redraw();
        }
        self.input.clear_frame();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::ShapeSelection;
    use crate::shape::ShapeKind;

    fn seeded_app() -> App {
        let mut config = AppConfig::default();
        config.spawn.seed = Some(11);
        App::new(config)
    }

    #[test]
    fn create_action_spawns_from_form() {
        let mut app = seeded_app();
        app.form.select(ShapeSelection::Shape(ShapeKind::Dodecahedron));
        app.apply_ui_actions(UiActions { spawn_requested: true, ..UiActions::default() });
        app.process_editor_events();
        assert_eq!(app.editor().len(), 1);
        assert!(app.status.as_deref().is_some_and(|s| s.starts_with("Created Dodecahedron")));
        assert_eq!(app.recent_events().count(), 1);
    }

    #[test]
    fn rejected_create_reports_reason_and_flags_field() {
        let mut app = seeded_app();
        app.apply_ui_actions(UiActions { spawn_requested: true, ..UiActions::default() });
        app.process_editor_events();
        assert!(app.editor().is_empty());
        assert!(app.form.shape_invalid());
        assert_eq!(app.status.as_deref(), Some("Cannot create mesh: choose a geometry"));
    }

    #[test]
    fn delete_and_clear_actions_update_editor() {
        let mut app = seeded_app();
        let a = app.editor.spawn(ShapeKind::Box, 1.0).unwrap();
        let b = app.editor.spawn(ShapeKind::Ring, 1.0).unwrap();
        app.editor.spawn(ShapeKind::Cone, 1.0).unwrap();
        app.apply_ui_actions(UiActions { delete: vec![a], ..UiActions::default() });
        assert!(!app.editor().contains(a));
        assert!(app.editor().contains(b));

        let missing = uuid::Uuid::new_v4();
        app.apply_ui_actions(UiActions { delete: vec![missing], ..UiActions::default() });
        assert_eq!(app.editor().len(), 2);
        assert!(app.status.as_deref().is_some_and(|s| s.contains(&missing.to_string())));

        app.apply_ui_actions(UiActions { clear_all: true, ..UiActions::default() });
        assert!(app.editor().is_empty());
    }

    #[test]
    fn recent_events_are_bounded() {
        let mut app = seeded_app();
        for _ in 0..RECENT_EVENT_CAPACITY + 4 {
            app.editor.spawn(ShapeKind::Sphere, 1.0).unwrap();
        }
        app.process_editor_events();
        assert_eq!(app.recent_events().count(), RECENT_EVENT_CAPACITY);
    }

    #[test]
    fn idle_ui_pass_requests_nothing() {
        let mut app = seeded_app();
        let output = app.render_editor_ui(egui::RawInput::default());
        assert!(output.actions.is_empty());
    }

    #[test]
    fn form_starts_with_configured_scale() {
        let app = seeded_app();
        assert_eq!(app.form.scale_text, "1");
        assert_eq!(app.form.selection, ShapeSelection::Placeholder);
    }
}
