//! Plugin selector drawn over the active plugin.

use crate::context::Context;
use crate::error::Result;
use crate::input::{Event, Key, KeyAction};
use crate::plugin::{PluginDescriptor, RenderPlugin};
use crate::surface::Surface;

/// What the core shows the overlay each frame.
#[derive(Clone, Copy, Debug)]
pub struct OverlayView<'a> {
    /// Registered plugins ordered by `(idx, name)`.
    pub plugins: &'a [&'a PluginDescriptor],

    /// Name of the active plugin.
    pub active: Option<&'a str>,

    /// Distance of the registered camera, if any.
    pub camera_dolly: Option<f32>,

    /// Current frame index.
    pub frame: u64,
}

impl<'a> OverlayView<'a> {
    fn active_position(&self) -> Option<usize> {
        let active = self.active?;
        self.plugins.iter().position(|d| d.name() == active)
    }

    /// Name of the plugin `step` places after (or before) the active one.
    fn neighbour(&self, step: isize) -> Option<&'a str> {
        let len = self.plugins.len() as isize;
        if len == 0 {
            return None;
        }
        let next = match self.active_position() {
            Some(pos) => (pos as isize + step).rem_euclid(len),
            None => 0,
        };
        Some(self.plugins[next as usize].name())
    }
}

/// The overlay's verdict on an input event.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Response {
    /// Forward the event to the plugin.
    Ignored,

    /// Swallow the event.
    Consumed,

    /// Swallow the event and activate the named plugin before rendering.
    SwitchPlugin(String),

    /// Swallow the event and reset the registered camera.
    ResetCamera,
}

/// Everything an overlay may touch while drawing.
pub struct OverlayFrame<'a> {
    pub surface: &'a mut dyn Surface,
    pub view: OverlayView<'a>,
    pub ctx: &'a mut Context,

    /// The active plugin, for its [`RenderPlugin::gui`] panel.
    pub plugin: Option<&'a mut dyn RenderPlugin>,
}

/// A user interface layer that sees input before the plugin and draws after it.
pub trait Overlay {
    fn handle_event(&mut self, event: &Event, view: &OverlayView) -> Response;

    /// Called after the plugin rendered, before the buffers are swapped.
    ///
    /// A `SwitchPlugin` response takes effect at the start of the next frame.
    fn draw(&mut self, frame: OverlayFrame) -> Result<Response>;
}

/// `Ctrl+Tab` / `Ctrl+Shift+Tab` cycle through the plugins and `Ctrl+R`
/// resets the camera. Other `Ctrl` chords are left alone.
pub fn hotkeys(event: &Event, view: &OverlayView) -> Response {
    let (key, action, mods) = match *event {
        Event::Key { key, action, mods } if mods.control() => (key, action, mods),
        _ => return Response::Ignored,
    };
    match key {
        Key::Tab if action == KeyAction::Press => {
            let step = if mods.shift() { -1 } else { 1 };
            match view.neighbour(step) {
                Some(name) if Some(name) != view.active => Response::SwitchPlugin(name.to_owned()),
                _ => Response::Consumed,
            }
        }
        Key::R if action == KeyAction::Press => Response::ResetCamera,
        Key::Tab | Key::R => Response::Consumed,
        _ => Response::Ignored,
    }
}

/// Shows the plugin selection in the window title.
///
/// `Ctrl+Tab` and `Ctrl+Shift+Tab` cycle through the plugins, `Ctrl+R` resets
/// the camera.
#[derive(Clone, Debug)]
pub struct TitleOverlay {
    base: String,
    shown: Option<String>,
}

impl TitleOverlay {
    /// Constructor.
    pub fn new<S: Into<String>>(base: S) -> Self {
        TitleOverlay { base: base.into(), shown: None }
    }

    /// The title for the given view.
    pub fn title(&self, view: &OverlayView) -> String {
        let mut title = self.base.clone();
        if let (Some(active), Some(pos)) = (view.active, view.active_position()) {
            title += &format!(" - {} [{}/{}]", active, pos + 1, view.plugins.len());
        }
        if let Some(dolly) = view.camera_dolly {
            title += &format!(" | camera {:.2}", dolly);
        }
        title
    }

    /// Sets the window title if it changed since the last call.
    pub fn show(&mut self, surface: &mut dyn Surface, view: &OverlayView) {
        let title = self.title(view);
        if self.shown.as_deref() != Some(title.as_str()) {
            surface.set_title(&title);
            self.shown = Some(title);
        }
    }
}

impl Default for TitleOverlay {
    fn default() -> Self {
        TitleOverlay::new("OGL4Core2")
    }
}

impl Overlay for TitleOverlay {
    fn handle_event(&mut self, event: &Event, view: &OverlayView) -> Response {
        hotkeys(event, view)
    }

    fn draw(&mut self, frame: OverlayFrame) -> Result<Response> {
        self.show(frame.surface, &frame.view);
        Ok(Response::Ignored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::Factory;
    use crate::input::Mods;
    use crate::pixels::Pixels;
    use crate::plugin::PluginRegistry;
    use std::os;

    #[derive(Default)]
    struct TitleRecorder {
        titles: Vec<String>,
    }

    impl Surface for TitleRecorder {
        fn proc_address(&self, _symbol: &str) -> *const os::raw::c_void {
            std::ptr::null()
        }

        fn size(&self) -> (u32, u32) {
            (1, 1)
        }

        fn poll_events(&mut self, _events: &mut Vec<Event>) {}

        fn swap_buffers(&mut self) -> Result<()> {
            Ok(())
        }

        fn capture(&mut self, _factory: &Factory) -> Result<Pixels> {
            Ok(Pixels::filled(1, 1, [0; 4]))
        }

        fn set_title(&mut self, title: &str) {
            self.titles.push(title.to_owned());
        }
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
        for (name, idx) in [("First", 1), ("Second", 2), ("Third", 3)] {
            registry
                .register(name, "Test", idx, |_| Ok(Box::new(Nothing) as Box<dyn RenderPlugin>))
                .unwrap();
        }
        registry
    }

    fn key(key: Key, mods: Mods) -> Event {
        Event::Key { key, action: KeyAction::Press, mods }
    }

    #[test]
    fn ctrl_tab_cycles_forward_and_back() {
        let registry = registry();
        let plugins = registry.all();
        let view = OverlayView { plugins: &plugins, active: Some("Third"), camera_dolly: None, frame: 0 };
        let mut overlay = TitleOverlay::default();

        assert_eq!(
            overlay.handle_event(&key(Key::Tab, Mods::CONTROL), &view),
            Response::SwitchPlugin("First".to_owned()),
        );
        assert_eq!(
            overlay.handle_event(&key(Key::Tab, Mods::CONTROL | Mods::SHIFT), &view),
            Response::SwitchPlugin("Second".to_owned()),
        );
    }

    #[test]
    fn plain_keys_reach_the_plugin() {
        let registry = registry();
        let plugins = registry.all();
        let view = OverlayView { plugins: &plugins, active: Some("First"), camera_dolly: None, frame: 0 };
        let mut overlay = TitleOverlay::default();

        assert_eq!(overlay.handle_event(&key(Key::Tab, Mods::empty()), &view), Response::Ignored);
        assert_eq!(overlay.handle_event(&key(Key::R, Mods::empty()), &view), Response::Ignored);
        assert_eq!(
            overlay.handle_event(&Event::CursorMoved { x: 1.0, y: 2.0 }, &view),
            Response::Ignored,
        );
        assert_eq!(overlay.handle_event(&key(Key::R, Mods::CONTROL), &view), Response::ResetCamera);
        let release = Event::Key { key: Key::Tab, action: KeyAction::Release, mods: Mods::CONTROL };
        assert_eq!(overlay.handle_event(&release, &view), Response::Consumed);
    }

    #[test]
    fn single_plugin_does_not_switch_to_itself() {
        let mut registry = PluginRegistry::new();
        registry
            .register("Only", "Test", 0, |_| Ok(Box::new(Nothing) as Box<dyn RenderPlugin>))
            .unwrap();
        let plugins = registry.all();
        let view = OverlayView { plugins: &plugins, active: Some("Only"), camera_dolly: None, frame: 0 };
        let mut overlay = TitleOverlay::default();
        assert_eq!(overlay.handle_event(&key(Key::Tab, Mods::CONTROL), &view), Response::Consumed);
    }

    #[test]
    fn title_is_only_set_when_it_changes() {
        let registry = registry();
        let plugins = registry.all();
        let mut surface = TitleRecorder::default();
        let mut overlay = TitleOverlay::new("Demo");

        let mut ctx = Context::headless(1, 1, "resources");
        let view = OverlayView { plugins: &plugins, active: Some("Second"), camera_dolly: Some(5.0), frame: 0 };
        let views = [view, OverlayView { frame: 1, ..view }, OverlayView { camera_dolly: None, ..view }];
        for view in views {
            let frame = OverlayFrame { surface: &mut surface, view, ctx: &mut ctx, plugin: None };
            assert_eq!(overlay.draw(frame).unwrap(), Response::Ignored);
        }

        assert_eq!(surface.titles, ["Demo - Second [2/3] | camera 5.00", "Demo - Second [2/3]"]);
    }
}
