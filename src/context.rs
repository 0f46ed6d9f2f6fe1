//! State the core shares with the active plugin.

use crate::camera::OrbitCamera;
use crate::error::{Error, Result};
use crate::factory::Factory;
use crate::framebuffer::Framebuffer;
use crate::input::{MouseButton, Mods};
use crate::pixels::Pixels;
use crate::program::Program;
use crate::resources::Resources;
use crate::texture::{Sampler, Texture2};
use std::cell::RefCell;
use std::path;
use std::rc::{Rc, Weak};

/// Window, input and resource state handed to every plugin callback.
pub struct Context {
    factory: Factory,
    resources: Resources,
    width: u32,
    height: u32,
    buttons: [bool; 3],
    mods: Mods,
    cursor: (f64, f64),
    prev_cursor: (f64, f64),
    camera: Option<Weak<RefCell<OrbitCamera>>>,
    frame: u64,
}

impl Context {
    /// Constructor.
    pub fn new<P: Into<path::PathBuf>>(factory: Factory, width: u32, height: u32, resource_root: P) -> Self {
        Context {
            factory,
            resources: Resources::new(resource_root),
            width,
            height,
            buttons: [false; 3],
            mods: Mods::empty(),
            cursor: (0.0, 0.0),
            prev_cursor: (0.0, 0.0),
            camera: None,
            frame: 0,
        }
    }

    /// A context without a GL context, see [`Factory::headless`].
    pub fn headless<P: Into<path::PathBuf>>(width: u32, height: u32, resource_root: P) -> Self {
        Self::new(Factory::headless(), width, height, resource_root)
    }

    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// The window framebuffer at the current size.
    pub fn default_framebuffer(&self) -> Framebuffer {
        self.factory.default_framebuffer(self.width, self.height)
    }

    /// Window size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Width over height, 1 while the window is minimized.
    pub fn aspect(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Index of the frame being produced, starting at 0.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons[button_index(button)]
    }

    /// Modifiers held during the last input event.
    pub fn mods(&self) -> Mods {
        self.mods
    }

    /// Cursor position in window pixels, origin top-left.
    pub fn cursor(&self) -> (f64, f64) {
        self.cursor
    }

    /// Movement of the cursor with the last move event.
    pub fn cursor_delta(&self) -> (f64, f64) {
        (self.cursor.0 - self.prev_cursor.0, self.cursor.1 - self.prev_cursor.1)
    }

    /// Hands a camera to the core so mouse drags and the overlay can drive it.
    ///
    /// Only a weak reference is kept. A second camera can be registered only
    /// after the first has been dropped.
    pub fn register_camera(&mut self, camera: &Rc<RefCell<OrbitCamera>>) -> Result<()> {
        if self.camera().is_some() {
            return Err(Error::CameraAlreadyRegistered);
        }
        self.camera = Some(Rc::downgrade(camera));
        Ok(())
    }

    /// The registered camera, if it is still alive.
    pub fn camera(&self) -> Option<Rc<RefCell<OrbitCamera>>> {
        self.camera.as_ref().and_then(Weak::upgrade)
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// See [`Resources::path`].
    pub fn resource_path(&self, name: &str) -> Result<path::PathBuf> {
        self.resources.path(name)
    }

    /// See [`Resources::load_text`].
    pub fn load_text(&self, name: &str) -> Result<String> {
        self.resources.load_text(name)
    }

    /// See [`Resources::load_image`].
    pub fn load_image(&self, name: &str) -> Result<Pixels> {
        self.resources.load_image(name)
    }

    /// Loads an image resource into a mipmapped RGBA8 texture.
    pub fn load_texture(&self, name: &str, sampler: Sampler) -> Result<Texture2> {
        let pixels = self.resources.load_image(name)?;
        Ok(self.factory.texture2_from_pixels(&pixels, sampler, true))
    }

    /// Compiles a program from two shader resources.
    pub fn load_program(&self, vertex: &str, fragment: &str) -> Result<Program> {
        let vertex = self.resources.load_text(vertex)?;
        let fragment = self.resources.load_text(fragment)?;
        self.factory.program(&vertex, &fragment)
    }

    pub(crate) fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub(crate) fn set_button(&mut self, button: MouseButton, pressed: bool) {
        self.buttons[button_index(button)] = pressed;
    }

    pub(crate) fn set_mods(&mut self, mods: Mods) {
        self.mods = mods;
    }

    pub(crate) fn move_cursor(&mut self, x: f64, y: f64) {
        self.prev_cursor = self.cursor;
        self.cursor = (x, y);
    }

    pub(crate) fn reset_cursor_delta(&mut self) {
        self.prev_cursor = self.cursor;
    }

    pub(crate) fn clear_camera(&mut self) {
        self.camera = None;
    }

    pub(crate) fn select_plugin(&mut self, plugin_path: &str) {
        self.resources.select_plugin(plugin_path);
    }

    pub(crate) fn advance_frame(&mut self) {
        self.frame += 1;
    }
}

fn button_index(button: MouseButton) -> usize {
    match button {
        MouseButton::Left => 0,
        MouseButton::Right => 1,
        MouseButton::Middle => 2,
    }
}
