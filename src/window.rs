//! Native window with an OpenGL 3.3 core context.
//!
//! The event loop runs in pump mode so the core keeps control of the frame
//! loop: every `poll_events` drains whatever the platform queued since the
//! previous frame and returns immediately.

use crate::error::{Error, Result};
use crate::factory::Factory;
use crate::input::{Event, Key, KeyAction, Mods, MouseButton, MouseButtonAction};
use crate::pixels::Pixels;
use crate::surface::Surface;
use glutin::config::{ConfigTemplateBuilder, GlConfig};
use glutin::context::{ContextApi, ContextAttributesBuilder, NotCurrentGlContext, PossiblyCurrentContext, Version};
use glutin::display::{Display, DisplayApiPreference, GlDisplay};
use glutin::prelude::GlSurface;
use glutin::surface::{Surface as GlutinSurface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawWindowHandle};
use std::num::NonZeroU32;
use std::time::Duration;
use std::{ffi, os, ptr};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

/// Window, GL surface and the context current on it.
struct Gl {
    // Field order is drop order: the context goes before its surface and
    // the surface before its window.
    context: PossiblyCurrentContext,
    surface: GlutinSurface<WindowSurface>,
    display: Display,
    window: Window,
}

/// Receives winit callbacks and translates them into [`Event`]s.
struct Handler {
    attributes: Option<WindowAttributes>,
    gl: Option<Gl>,
    events: Vec<Event>,
    mods: Mods,
    error: Option<Error>,
}

impl Handler {
    fn create(&mut self, event_loop: &ActiveEventLoop, attributes: WindowAttributes) -> Result<Gl> {
        let mut template = ConfigTemplateBuilder::new().with_depth_size(24);

        // WGL lists configs for an existing window. Elsewhere the chosen
        // config decides the visual of the window created afterwards.
        let early = if cfg!(windows) {
            Some(event_loop.create_window(attributes.clone()).map_err(window_error)?)
        } else {
            None
        };
        let early_raw = match early.as_ref() {
            Some(window) => Some(window.window_handle().map_err(window_error)?.as_raw()),
            None => None,
        };
        if let Some(raw) = early_raw {
            template = template.compatible_with_native_window(raw);
        }

        let raw_display = event_loop.display_handle().map_err(window_error)?.as_raw();
        let display = unsafe { Display::new(raw_display, display_preference(early_raw)) }.map_err(window_error)?;
        let configs = unsafe { display.find_configs(template.build()) }.map_err(window_error)?;
        let config = pick_config(configs, |config| config.num_samples())?;
        let window = match early {
            Some(window) => window,
            None => glutin_winit::finalize_window(event_loop, attributes, &config).map_err(window_error)?,
        };

        let raw = window.window_handle().map_err(window_error)?.as_raw();
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(Some(raw));
        let not_current = unsafe { display.create_context(&config, &context_attributes) }.map_err(window_error)?;

        let size = window.inner_size();
        let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            raw,
            NonZeroU32::new(size.width).unwrap_or(NonZeroU32::MIN),
            NonZeroU32::new(size.height).unwrap_or(NonZeroU32::MIN),
        );
        let surface = unsafe { display.create_window_surface(&config, &surface_attributes) }.map_err(window_error)?;
        let context = not_current.make_current(&surface).map_err(window_error)?;
        if let Err(err) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN)) {
            warn!("vsync unavailable: {}", err);
        }
        info!("created {}x{} window with {} samples", size.width, size.height, config.num_samples());

        Ok(Gl { context, surface, display, window })
    }
}

fn window_error<E: std::fmt::Display>(err: E) -> Error {
    Error::Window(err.to_string())
}

/// The platform's GL API, with the fallback glutin-winit would pick.
#[allow(unused_variables)]
fn display_preference(window: Option<RawWindowHandle>) -> DisplayApiPreference {
    #[cfg(windows)]
    return DisplayApiPreference::WglThenEgl(window);
    #[cfg(target_os = "macos")]
    return DisplayApiPreference::Cgl;
    #[cfg(target_os = "android")]
    return DisplayApiPreference::Egl;
    #[cfg(all(unix, not(any(target_os = "macos", target_os = "android"))))]
    return DisplayApiPreference::EglThenGlx(Box::new(winit::platform::x11::register_xlib_error_hook));
}

/// The config with the most samples. Fails if the driver offered none.
fn pick_config<C>(configs: impl Iterator<Item = C>, samples: impl Fn(&C) -> u8) -> Result<C> {
    configs
        .max_by_key(|config| samples(config))
        .ok_or_else(|| Error::Window("no OpenGL config with a 24-bit depth buffer".to_owned()))
}

impl ApplicationHandler for Handler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(attributes) = self.attributes.take() else {
            return;
        };
        match self.create(event_loop, attributes) {
            Ok(gl) => self.gl = Some(gl),
            Err(err) => {
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.events.push(Event::CloseRequested),
            WindowEvent::Resized(size) => {
                if let (Some(gl), Some(w), Some(h)) =
                    (self.gl.as_ref(), NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                {
                    gl.surface.resize(&gl.context, w, h);
                }
                self.events.push(Event::Resized { width: size.width, height: size.height });
            }
            WindowEvent::ModifiersChanged(modifiers) => self.mods = map_mods(modifiers.state()),
            WindowEvent::KeyboardInput { event, .. } => {
                let key = match event.physical_key {
                    PhysicalKey::Code(code) => map_key(code),
                    PhysicalKey::Unidentified(_) => Key::Unknown,
                };
                let action = match (event.state, event.repeat) {
                    (ElementState::Pressed, false) => KeyAction::Press,
                    (ElementState::Pressed, true) => KeyAction::Repeat,
                    (ElementState::Released, _) => KeyAction::Release,
                };
                self.events.push(Event::Key { key, action, mods: self.mods });
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(button) = map_button(button) else {
                    return;
                };
                let action = match state {
                    ElementState::Pressed => MouseButtonAction::Press,
                    ElementState::Released => MouseButtonAction::Release,
                };
                self.events.push(Event::MouseButton { button, action, mods: self.mods });
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.events.push(Event::CursorMoved { x: position.x, y: position.y });
            }
            _ => {}
        }
    }
}

/// A winit window driving a glutin OpenGL context.
pub struct GlWindow {
    event_loop: EventLoop<()>,
    handler: Handler,
}

impl GlWindow {
    /// Opens a window and makes its GL context current on this thread.
    pub fn open(title: &str, width: u32, height: u32) -> Result<Self> {
        let event_loop = EventLoop::new().map_err(window_error)?;
        let attributes = Window::default_attributes()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(width.max(1), height.max(1)));
        let mut window = GlWindow {
            event_loop,
            handler: Handler {
                attributes: Some(attributes),
                gl: None,
                events: Vec::new(),
                mods: Mods::empty(),
                error: None,
            },
        };
        // Window creation happens in `resumed`, which needs the loop running.
        while window.handler.gl.is_none() {
            let status = window
                .event_loop
                .pump_app_events(Some(Duration::from_millis(10)), &mut window.handler);
            if let Some(err) = window.handler.error.take() {
                return Err(err);
            }
            if let PumpStatus::Exit(code) = status {
                return Err(Error::Window(format!("event loop exited with code {} before the window opened", code)));
            }
        }
        Ok(window)
    }

    fn gl(&self) -> Option<&Gl> {
        self.handler.gl.as_ref()
    }
}

impl Surface for GlWindow {
    fn proc_address(&self, symbol: &str) -> *const os::raw::c_void {
        match (self.gl(), ffi::CString::new(symbol)) {
            (Some(gl), Ok(symbol)) => gl.display.get_proc_address(&symbol) as *const _,
            _ => ptr::null(),
        }
    }

    fn size(&self) -> (u32, u32) {
        self.gl()
            .map(|gl| {
                let size = gl.window.inner_size();
                (size.width, size.height)
            })
            .unwrap_or((0, 0))
    }

    fn poll_events(&mut self, events: &mut Vec<Event>) {
        let status = self.event_loop.pump_app_events(Some(Duration::ZERO), &mut self.handler);
        events.append(&mut self.handler.events);
        if let PumpStatus::Exit(_) = status {
            events.push(Event::CloseRequested);
        }
    }

    fn swap_buffers(&mut self) -> Result<()> {
        let gl = self.gl().ok_or_else(|| Error::Window("window is closed".to_owned()))?;
        gl.surface
            .swap_buffers(&gl.context)
            .map_err(window_error)
    }

    fn capture(&mut self, factory: &Factory) -> Result<Pixels> {
        let (width, height) = self.size();
        let framebuffer = factory.default_framebuffer(width, height);
        factory.read_pixels(&framebuffer, 0, 0, 0, width, height)
    }

    fn set_title(&mut self, title: &str) {
        if let Some(gl) = self.gl() {
            gl.window.set_title(title);
        }
    }
}

fn map_mods(state: ModifiersState) -> Mods {
    let mut mods = Mods::empty();
    mods.set(Mods::SHIFT, state.shift_key());
    mods.set(Mods::CONTROL, state.control_key());
    mods.set(Mods::ALT, state.alt_key());
    mods.set(Mods::SUPER, state.super_key());
    mods
}

fn map_button(button: winit::event::MouseButton) -> Option<MouseButton> {
    match button {
        winit::event::MouseButton::Left => Some(MouseButton::Left),
        winit::event::MouseButton::Right => Some(MouseButton::Right),
        winit::event::MouseButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}

fn map_key(code: KeyCode) -> Key {
    match code {
        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,
        KeyCode::Digit0 | KeyCode::Numpad0 => Key::Key0,
        KeyCode::Digit1 | KeyCode::Numpad1 => Key::Key1,
        KeyCode::Digit2 | KeyCode::Numpad2 => Key::Key2,
        KeyCode::Digit3 | KeyCode::Numpad3 => Key::Key3,
        KeyCode::Digit4 | KeyCode::Numpad4 => Key::Key4,
        KeyCode::Digit5 | KeyCode::Numpad5 => Key::Key5,
        KeyCode::Digit6 | KeyCode::Numpad6 => Key::Key6,
        KeyCode::Digit7 | KeyCode::Numpad7 => Key::Key7,
        KeyCode::Digit8 | KeyCode::Numpad8 => Key::Key8,
        KeyCode::Digit9 | KeyCode::Numpad9 => Key::Key9,
        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        KeyCode::F3 => Key::F3,
        KeyCode::F4 => Key::F4,
        KeyCode::F5 => Key::F5,
        KeyCode::F6 => Key::F6,
        KeyCode::F7 => Key::F7,
        KeyCode::F8 => Key::F8,
        KeyCode::F9 => Key::F9,
        KeyCode::F10 => Key::F10,
        KeyCode::F11 => Key::F11,
        KeyCode::F12 => Key::F12,
        KeyCode::Space => Key::Space,
        KeyCode::Tab => Key::Tab,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        KeyCode::Escape => Key::Escape,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        _ => Key::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_and_digits() {
        assert_eq!(map_key(KeyCode::KeyW), Key::W);
        assert_eq!(map_key(KeyCode::Numpad3), Key::Key3);
        assert_eq!(map_key(KeyCode::ArrowUp), Key::Up);
        assert_eq!(map_key(KeyCode::CapsLock), Key::Unknown);
    }

    #[test]
    fn modifiers() {
        let mods = map_mods(ModifiersState::CONTROL | ModifiersState::SHIFT);
        assert_eq!(mods, Mods::CONTROL | Mods::SHIFT);
        assert_eq!(map_mods(ModifiersState::empty()), Mods::empty());
    }

    #[test]
    fn config_choice_prefers_samples() {
        let configs = [("plain", 0u8), ("msaa4", 4), ("msaa2", 2)];
        let chosen = pick_config(configs.into_iter(), |config| config.1).unwrap();
        assert_eq!(chosen.0, "msaa4");
    }

    #[test]
    fn no_configs_is_a_window_error() {
        match pick_config(std::iter::empty::<(&str, u8)>(), |config| config.1) {
            Err(Error::Window(message)) => assert!(message.contains("OpenGL config")),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn extra_mouse_buttons_are_dropped() {
        assert_eq!(map_button(winit::event::MouseButton::Middle), Some(MouseButton::Middle));
        assert_eq!(map_button(winit::event::MouseButton::Back), None);
    }
}
