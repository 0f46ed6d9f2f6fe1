//! The window the core renders into.

use crate::error::Result;
use crate::factory::Factory;
use crate::input::Event;
use crate::pixels::Pixels;
use std::os;

/// A window with a current OpenGL context.
///
/// [`GlWindow`](crate::window::GlWindow) is the real implementation; tests
/// drive the core through a scripted one.
pub trait Surface {
    /// Resolves an OpenGL entry point.
    fn proc_address(&self, symbol: &str) -> *const os::raw::c_void;

    /// Drawable size in pixels.
    fn size(&self) -> (u32, u32);

    /// Appends the events received since the last call to `events`.
    fn poll_events(&mut self, events: &mut Vec<Event>);

    /// Presents the back buffer.
    fn swap_buffers(&mut self) -> Result<()>;

    /// Reads the back buffer, bottom row first.
    fn capture(&mut self, factory: &Factory) -> Result<Pixels>;

    fn set_title(&mut self, title: &str);
}
