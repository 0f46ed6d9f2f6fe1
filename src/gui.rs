//! egui panel drawn over the active plugin.

use crate::error::{Error, Result};
use crate::input::{Event, Key, KeyAction, Mods, MouseButton, MouseButtonAction};
use crate::overlay::{self, Overlay, OverlayFrame, OverlayView, Response, TitleOverlay};
use crate::surface::Surface;
use egui_glow::{glow, Painter};
use std::mem;
use std::sync::Arc;

/// Hosts a floating egui window with the plugin selector, camera controls
/// and the active plugin's own widgets.
///
/// Input reaches egui first. Pointer events over the panel and key presses
/// while a text field has focus are consumed; the rest go on to the camera
/// and the plugin. The window title is kept up to date as with
/// [`TitleOverlay`], and its hotkeys keep working.
pub struct EguiOverlay {
    egui: egui::Context,
    title: TitleOverlay,
    painter: Option<Painter>,
    events: Vec<egui::Event>,
    pointer: egui::Pos2,
    modifiers: egui::Modifiers,
}

impl EguiOverlay {
    /// Constructor. The surface's GL context must be current.
    pub fn new(surface: &dyn Surface) -> Result<Self> {
        let gl = unsafe { glow::Context::from_loader_function(|symbol| surface.proc_address(symbol)) };
        let painter = Painter::new(Arc::new(gl), "", None, false)
            .map_err(|err| Error::Window(format!("egui painter: {}", err)))?;
        info!("egui overlay ready");
        let mut overlay = Self::headless();
        overlay.painter = Some(painter);
        Ok(overlay)
    }

    /// Lays out the panel and runs plugin widgets without painting anything.
    pub fn headless() -> Self {
        EguiOverlay {
            egui: egui::Context::default(),
            title: TitleOverlay::default(),
            painter: None,
            events: Vec::new(),
            pointer: egui::Pos2::ZERO,
            modifiers: egui::Modifiers::default(),
        }
    }

    /// Queues `event` for the next egui frame and reports whether egui
    /// claims it.
    fn feed(&mut self, event: &Event) -> bool {
        match *event {
            Event::Key { key, action, mods } => {
                self.modifiers = modifiers(mods);
                if let Some(key) = egui_key(key) {
                    self.events.push(egui::Event::Key {
                        key,
                        physical_key: None,
                        pressed: action != KeyAction::Release,
                        repeat: action == KeyAction::Repeat,
                        modifiers: self.modifiers,
                    });
                }
                self.egui.wants_keyboard_input()
            }
            Event::MouseButton { button, action, mods } => {
                self.modifiers = modifiers(mods);
                self.events.push(egui::Event::PointerButton {
                    pos: self.pointer,
                    button: pointer_button(button),
                    pressed: action == MouseButtonAction::Press,
                    modifiers: self.modifiers,
                });
                self.egui.wants_pointer_input()
            }
            Event::CursorMoved { x, y } => {
                self.pointer = egui::pos2(x as f32, y as f32);
                self.events.push(egui::Event::PointerMoved(self.pointer));
                self.egui.is_using_pointer()
            }
            Event::Resized { .. } | Event::CloseRequested => false,
        }
    }
}

impl Overlay for EguiOverlay {
    fn handle_event(&mut self, event: &Event, view: &OverlayView) -> Response {
        match overlay::hotkeys(event, view) {
            Response::Ignored if self.feed(event) => Response::Consumed,
            response => response,
        }
    }

    fn draw(&mut self, frame: OverlayFrame) -> Result<Response> {
        let OverlayFrame { surface, view, ctx, mut plugin } = frame;
        self.title.show(surface, &view);

        let (width, height) = surface.size();
        if width == 0 || height == 0 {
            self.events.clear();
            return Ok(Response::Ignored);
        }
        let input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(width as f32, height as f32),
            )),
            modifiers: self.modifiers,
            events: mem::take(&mut self.events),
            ..Default::default()
        };

        let mut response = Response::Ignored;
        let mut outcome = Ok(());
        let output = self.egui.run(input, |gui| {
            egui::Window::new("OGL4Core2")
                .id(egui::Id::new("ogl4core-panel"))
                .default_pos([8.0, 8.0])
                .resizable(false)
                .show(gui, |ui| {
                    response = selector(ui, &view);
                    if let Some(plugin) = plugin.as_deref_mut() {
                        ui.separator();
                        outcome = plugin.gui(&mut *ctx, ui);
                    }
                });
        });
        outcome?;

        if let Some(painter) = self.painter.as_mut() {
            let primitives = self.egui.tessellate(output.shapes, output.pixels_per_point);
            painter.paint_and_update_textures(
                [width, height],
                output.pixels_per_point,
                &primitives,
                &output.textures_delta,
            );
        }
        Ok(response)
    }
}

impl Drop for EguiOverlay {
    fn drop(&mut self) {
        if let Some(mut painter) = self.painter.take() {
            painter.destroy();
        }
    }
}

/// Plugin combo box, frame counter and camera controls.
fn selector(ui: &mut egui::Ui, view: &OverlayView) -> Response {
    let mut response = Response::Ignored;
    let selected = view.active.unwrap_or("none");
    egui::ComboBox::from_label("Plugin")
        .selected_text(selected)
        .show_ui(ui, |ui| {
            for descriptor in view.plugins {
                let name = descriptor.name();
                let is_active = view.active == Some(name);
                if ui.selectable_label(is_active, name).clicked() && !is_active {
                    response = Response::SwitchPlugin(name.to_owned());
                }
            }
        });
    ui.label(format!("Frame {}", view.frame));
    if let Some(dolly) = view.camera_dolly {
        ui.horizontal(|ui| {
            ui.label(format!("Camera distance {:.2}", dolly));
            if ui.button("Reset camera").clicked() {
                response = Response::ResetCamera;
            }
        });
    }
    response
}

fn modifiers(mods: Mods) -> egui::Modifiers {
    egui::Modifiers {
        alt: mods.alt(),
        ctrl: mods.control(),
        shift: mods.shift(),
        mac_cmd: false,
        command: mods.control(),
    }
}

fn pointer_button(button: MouseButton) -> egui::PointerButton {
    match button {
        MouseButton::Left => egui::PointerButton::Primary,
        MouseButton::Right => egui::PointerButton::Secondary,
        MouseButton::Middle => egui::PointerButton::Middle,
    }
}

fn egui_key(key: Key) -> Option<egui::Key> {
    use egui::Key as E;
    let key = match key {
        Key::A => E::A,
        Key::B => E::B,
        Key::C => E::C,
        Key::D => E::D,
        Key::E => E::E,
        Key::F => E::F,
        Key::G => E::G,
        Key::H => E::H,
        Key::I => E::I,
        Key::J => E::J,
        Key::K => E::K,
        Key::L => E::L,
        Key::M => E::M,
        Key::N => E::N,
        Key::O => E::O,
        Key::P => E::P,
        Key::Q => E::Q,
        Key::R => E::R,
        Key::S => E::S,
        Key::T => E::T,
        Key::U => E::U,
        Key::V => E::V,
        Key::W => E::W,
        Key::X => E::X,
        Key::Y => E::Y,
        Key::Z => E::Z,
        Key::Key0 => E::Num0,
        Key::Key1 => E::Num1,
        Key::Key2 => E::Num2,
        Key::Key3 => E::Num3,
        Key::Key4 => E::Num4,
        Key::Key5 => E::Num5,
        Key::Key6 => E::Num6,
        Key::Key7 => E::Num7,
        Key::Key8 => E::Num8,
        Key::Key9 => E::Num9,
        Key::F1 => E::F1,
        Key::F2 => E::F2,
        Key::F3 => E::F3,
        Key::F4 => E::F4,
        Key::F5 => E::F5,
        Key::F6 => E::F6,
        Key::F7 => E::F7,
        Key::F8 => E::F8,
        Key::F9 => E::F9,
        Key::F10 => E::F10,
        Key::F11 => E::F11,
        Key::F12 => E::F12,
        Key::Space => E::Space,
        Key::Tab => E::Tab,
        Key::Enter => E::Enter,
        Key::Escape => E::Escape,
        Key::Backspace => E::Backspace,
        Key::Left => E::ArrowLeft,
        Key::Right => E::ArrowRight,
        Key::Up => E::ArrowUp,
        Key::Down => E::ArrowDown,
        Key::PageUp => E::PageUp,
        Key::PageDown => E::PageDown,
        Key::Home => E::Home,
        Key::End => E::End,
        Key::Unknown => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::factory::Factory;
    use crate::pixels::Pixels;
    use crate::plugin::{PluginRegistry, RenderPlugin};
    use std::{os, ptr};

    struct Screen;

    impl Surface for Screen {
        fn proc_address(&self, _symbol: &str) -> *const os::raw::c_void {
            ptr::null()
        }

        fn size(&self) -> (u32, u32) {
            (400, 300)
        }

        fn poll_events(&mut self, _events: &mut Vec<Event>) {}

        fn swap_buffers(&mut self) -> Result<()> {
            Ok(())
        }

        fn capture(&mut self, _factory: &Factory) -> Result<Pixels> {
            Ok(Pixels::filled(1, 1, [0; 4]))
        }

        fn set_title(&mut self, _title: &str) {}
    }

    struct Nothing;

    impl RenderPlugin for Nothing {
        fn render(&mut self, _ctx: &mut Context) -> Result<()> {
            Ok(())
        }

        fn resize(&mut self, _ctx: &mut Context, _width: u32, _height: u32) -> Result<()> {
            Ok(())
        }
    }

    fn registry() -> PluginRegistry {
        let mut registry = PluginRegistry::new();
        for (name, idx) in [("First", 1), ("Second", 2)] {
            registry
                .register(name, "Test", idx, |_| Ok(Box::new(Nothing) as Box<dyn RenderPlugin>))
                .unwrap();
        }
        registry
    }

    fn draw(overlay: &mut EguiOverlay, view: OverlayView, ctx: &mut Context) -> Response {
        let mut surface = Screen;
        let frame = OverlayFrame { surface: &mut surface, view, ctx, plugin: None };
        overlay.draw(frame).unwrap()
    }

    fn press(action: MouseButtonAction) -> Event {
        Event::MouseButton { button: MouseButton::Left, action, mods: Mods::empty() }
    }

    #[test]
    fn hotkeys_still_switch_plugins() {
        let registry = registry();
        let plugins = registry.all();
        let view = OverlayView { plugins: &plugins, active: Some("First"), camera_dolly: None, frame: 0 };
        let mut overlay = EguiOverlay::headless();

        let tab = Event::Key { key: Key::Tab, action: KeyAction::Press, mods: Mods::CONTROL };
        assert_eq!(overlay.handle_event(&tab, &view), Response::SwitchPlugin("Second".to_owned()));
        let plain = Event::Key { key: Key::W, action: KeyAction::Press, mods: Mods::empty() };
        assert_eq!(overlay.handle_event(&plain, &view), Response::Ignored);
    }

    #[test]
    fn clicks_on_the_panel_are_consumed() {
        let registry = registry();
        let plugins = registry.all();
        let view = OverlayView { plugins: &plugins, active: Some("First"), camera_dolly: Some(5.0), frame: 0 };
        let mut ctx = Context::headless(400, 300, "resources");
        let mut overlay = EguiOverlay::headless();

        overlay.handle_event(&Event::CursorMoved { x: 390.0, y: 290.0 }, &view);
        draw(&mut overlay, view, &mut ctx);
        draw(&mut overlay, view, &mut ctx);
        assert_eq!(overlay.handle_event(&press(MouseButtonAction::Press), &view), Response::Ignored);
        assert_eq!(overlay.handle_event(&press(MouseButtonAction::Release), &view), Response::Ignored);

        overlay.handle_event(&Event::CursorMoved { x: 20.0, y: 20.0 }, &view);
        draw(&mut overlay, view, &mut ctx);
        assert_eq!(overlay.handle_event(&press(MouseButtonAction::Press), &view), Response::Consumed);
    }

    #[test]
    fn input_translation() {
        assert_eq!(egui_key(Key::Key3), Some(egui::Key::Num3));
        assert_eq!(egui_key(Key::Up), Some(egui::Key::ArrowUp));
        assert_eq!(egui_key(Key::Unknown), None);
        assert_eq!(pointer_button(MouseButton::Right), egui::PointerButton::Secondary);

        let mods = modifiers(Mods::CONTROL | Mods::SHIFT);
        assert!(mods.ctrl && mods.command && mods.shift);
        assert!(!mods.alt);
    }
}
