//! The run loop hosting the active plugin.

use crate::config::Config;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::factory::Factory;
use crate::input::{Event, MouseButton, MouseButtonAction};
use crate::overlay::{Overlay, OverlayFrame, OverlayView, Response, TitleOverlay};
use crate::plugin::{PluginRegistry, RenderPlugin};
use crate::surface::Surface;
use glam::Vec2;
use std::collections::BTreeSet;
use std::{mem, path};

/// Outcome of one iteration of the run loop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Frame {
    Continue,
    Quit,
}

struct Active {
    name: String,
    plugin: Box<dyn RenderPlugin>,
}

/// Path of the screenshot for `frame`: `<parent>/<stem>_<frame:05>.png`.
pub fn screenshot_path(base: &path::Path, frame: u64) -> path::PathBuf {
    let stem = base
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "screenshot".to_owned());
    let name = format!("{}_{:05}.png", stem, frame);
    match base.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(name),
        _ => path::PathBuf::from(name),
    }
}

/// Owns the window, the registry and the active plugin.
pub struct Core<S: Surface> {
    ctx: Context,
    registry: PluginRegistry,
    overlay: Box<dyn Overlay>,
    active: Option<Active>,
    initial: Option<String>,
    screenshots: BTreeSet<u64>,
    screenshot_base: path::PathBuf,
    auto_quit: bool,
    pending_switch: Option<String>,
    events: Vec<Event>,

    // Dropped last: the overlay and plugins release GL objects on drop.
    surface: S,
}

impl<S: Surface> Core<S> {
    /// Constructor. The surface's GL context must be current.
    pub fn new(surface: S, registry: PluginRegistry, config: &Config) -> Self {
        let factory = Factory::new(|symbol| surface.proc_address(symbol));
        let (width, height) = surface.size();
        let ctx = Context::new(factory, width, height, config.resources.clone());
        Core {
            ctx,
            registry,
            overlay: Box::new(TitleOverlay::default()),
            active: None,
            initial: config.plugin.clone(),
            screenshots: config.screenshot.iter().copied().collect(),
            screenshot_base: config.filename.clone(),
            auto_quit: config.quit,
            pending_switch: None,
            events: Vec::new(),
            surface,
        }
    }

    /// Replaces the default [`TitleOverlay`].
    pub fn with_overlay<O: Overlay + 'static>(mut self, overlay: O) -> Self {
        self.overlay = Box::new(overlay);
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Name of the active plugin.
    pub fn active_plugin(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.name.as_str())
    }

    /// Activates the configured plugin, or the first one listed.
    pub fn start(&mut self) -> Result<()> {
        let name = match self.initial.clone() {
            Some(name) => name,
            None => self
                .registry
                .all()
                .first()
                .map(|descriptor| descriptor.name().to_owned())
                .ok_or(Error::NoPlugins)?,
        };
        self.switch_plugin(&name)
    }

    /// Runs frames until the window closes or the screenshot script ends.
    pub fn run(&mut self) -> Result<()> {
        self.start()?;
        while self.run_frame()? == Frame::Continue {}
        info!("shutting down after {} frames", self.ctx.frame());
        self.shutdown();
        Ok(())
    }

    /// Drops the active plugin and deletes its GPU objects.
    pub fn shutdown(&mut self) {
        self.active = None;
        self.ctx.clear_camera();
        self.ctx.factory().collect();
    }

    /// Replaces the active plugin.
    ///
    /// An unknown name leaves the current plugin running.
    pub fn switch_plugin(&mut self, name: &str) -> Result<()> {
        let path = self.registry.lookup(name)?.path().to_owned();
        if let Some(old) = self.active.take() {
            info!("deactivating plugin {}", old.name);
        }
        self.ctx.clear_camera();
        self.ctx.factory().collect();
        self.ctx.select_plugin(&path);
        self.ctx.reset_cursor_delta();
        let (width, height) = self.surface.size();
        self.ctx.set_size(width, height);

        info!("activating plugin {}", name);
        let mut plugin = self.registry.create(name, &mut self.ctx)?;
        plugin.resize(&mut self.ctx, width, height)?;
        self.active = Some(Active { name: name.to_owned(), plugin });
        Ok(())
    }

    /// One iteration of the run loop: input, render, capture, present.
    pub fn run_frame(&mut self) -> Result<Frame> {
        let mut events = mem::take(&mut self.events);
        events.clear();
        self.surface.poll_events(&mut events);
        let mut close = false;
        for event in &events {
            if *event == Event::CloseRequested {
                close = true;
                continue;
            }
            self.dispatch(event)?;
        }
        self.events = events;
        if close {
            info!("close requested at frame {}", self.ctx.frame());
            return Ok(Frame::Quit);
        }

        if let Some(name) = self.pending_switch.take() {
            self.switch_plugin(&name)?;
        }

        if let Some(active) = self.active.as_mut() {
            active.plugin.render(&mut self.ctx)?;
        }
        self.ctx.factory().restore_default_state();

        let frame = self.ctx.frame();
        if self.screenshots.contains(&frame) {
            self.screenshot(frame)?;
        }

        let plugins = self.registry.all();
        let camera_dolly = self.ctx.camera().map(|camera| camera.borrow().dolly());
        let (active, plugin) = match self.active.as_mut() {
            Some(active) => (Some(active.name.as_str()), Some(active.plugin.as_mut() as &mut dyn RenderPlugin)),
            None => (None, None),
        };
        let view = OverlayView { plugins: &plugins, active, camera_dolly, frame };
        let response = self.overlay.draw(OverlayFrame {
            surface: &mut self.surface,
            view,
            ctx: &mut self.ctx,
            plugin,
        })?;
        self.apply(response);
        self.ctx.factory().restore_default_state();
        self.surface.swap_buffers()?;

        self.ctx.advance_frame();
        if self.auto_quit && self.screenshots.range(self.ctx.frame()..).next().is_none() {
            info!("screenshot script finished");
            return Ok(Frame::Quit);
        }
        Ok(Frame::Continue)
    }

    fn screenshot(&mut self, frame: u64) -> Result<()> {
        let (width, height) = self.surface.size();
        if width == 0 || height == 0 {
            warn!("skipping screenshot of frame {}: window is {}x{}", frame, width, height);
            return Ok(());
        }
        let path = screenshot_path(&self.screenshot_base, frame);
        let pixels = self.surface.capture(self.ctx.factory())?;
        pixels.save_png(&path)?;
        info!("saved screenshot {}", path.display());
        Ok(())
    }

    fn dispatch(&mut self, event: &Event) -> Result<()> {
        let drag_from = self.ctx.cursor();
        match *event {
            Event::Key { mods, .. } => self.ctx.set_mods(mods),
            Event::MouseButton { button, action, mods } => {
                self.ctx.set_mods(mods);
                self.ctx.set_button(button, action == MouseButtonAction::Press);
            }
            Event::CursorMoved { x, y } => self.ctx.move_cursor(x, y),
            Event::Resized { width, height } => self.ctx.set_size(width, height),
            Event::CloseRequested => {}
        }

        let plugins = self.registry.all();
        let view = OverlayView {
            plugins: &plugins,
            active: self.active.as_ref().map(|active| active.name.as_str()),
            camera_dolly: self.ctx.camera().map(|camera| camera.borrow().dolly()),
            frame: self.ctx.frame(),
        };
        let response = self.overlay.handle_event(event, &view);
        if response != Response::Ignored {
            self.apply(response);
            return Ok(());
        }

        if let Event::CursorMoved { .. } = *event {
            self.drag_camera(drag_from);
        }

        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        let ctx = &mut self.ctx;
        match *event {
            Event::Key { key, action, mods } => active.plugin.keyboard(ctx, key, action, mods),
            Event::MouseButton { button, action, mods } => active.plugin.mouse_button(ctx, button, action, mods),
            Event::CursorMoved { x, y } => active.plugin.mouse_move(ctx, x, y),
            Event::Resized { width, height } => active.plugin.resize(ctx, width, height),
            Event::CloseRequested => Ok(()),
        }
    }

    fn apply(&mut self, response: Response) {
        match response {
            Response::Ignored | Response::Consumed => {}
            Response::SwitchPlugin(name) => self.pending_switch = Some(name),
            Response::ResetCamera => {
                if let Some(camera) = self.ctx.camera() {
                    camera.borrow_mut().reset();
                }
            }
        }
    }

    /// Unmodified drags steer the registered camera: left rotates, right
    /// dollies and middle pans.
    fn drag_camera(&mut self, from: (f64, f64)) {
        if !self.ctx.mods().is_empty() {
            return;
        }
        let Some(camera) = self.ctx.camera() else {
            return;
        };
        let from = self.to_ndc(from);
        let to = self.to_ndc(self.ctx.cursor());
        let mut camera = camera.borrow_mut();
        if self.ctx.is_mouse_button_pressed(MouseButton::Left) {
            camera.rotate(from, to);
        } else if self.ctx.is_mouse_button_pressed(MouseButton::Right) {
            let scale = camera.dolly();
            camera.dolly_by((from.y - to.y) * scale);
        } else if self.ctx.is_mouse_button_pressed(MouseButton::Middle) {
            let delta = (to - from) * camera.dolly() * 0.5;
            camera.pan_by(delta.x, delta.y);
        }
    }

    fn to_ndc(&self, (x, y): (f64, f64)) -> Vec2 {
        let (width, height) = self.ctx.size();
        let width = width.max(1) as f32;
        let height = height.max(1) as f32;
        Vec2::new(2.0 * x as f32 / width - 1.0, 1.0 - 2.0 * y as f32 / height)
    }
}
