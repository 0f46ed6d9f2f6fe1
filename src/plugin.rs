//! Render plugins and the registry they are selected from.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::input::{Key, KeyAction, MouseButton, MouseButtonAction, Mods};
use std::{cmp, collections, fmt};

/// A rendering demo hosted by the core.
///
/// Exactly one plugin is active at a time. It is created by its descriptor's
/// factory, receives one `resize` before its first `render`, and is dropped
/// when another plugin is selected or the core shuts down. GPU handles it
/// owns are deleted by the core after the drop.
pub trait RenderPlugin {
    /// Draws one frame into the default framebuffer.
    fn render(&mut self, ctx: &mut Context) -> Result<()>;

    /// The window size changed. Also sent once right after construction.
    fn resize(&mut self, ctx: &mut Context, width: u32, height: u32) -> Result<()>;

    fn keyboard(&mut self, _ctx: &mut Context, _key: Key, _action: KeyAction, _mods: Mods) -> Result<()> {
        Ok(())
    }

    fn mouse_button(
        &mut self,
        _ctx: &mut Context,
        _button: MouseButton,
        _action: MouseButtonAction,
        _mods: Mods,
    ) -> Result<()> {
        Ok(())
    }

    /// Cursor moved to `(x, y)` in window pixels, origin top-left.
    fn mouse_move(&mut self, _ctx: &mut Context, _x: f64, _y: f64) -> Result<()> {
        Ok(())
    }

    /// Adds the plugin's widgets to the overlay panel. Called once per frame
    /// after `render` when the overlay has a panel.
    fn gui(&mut self, _ctx: &mut Context, _ui: &mut egui::Ui) -> Result<()> {
        Ok(())
    }
}

/// Static metadata and constructor of a plugin type.
pub trait Plugin: RenderPlugin + Sized + 'static {
    /// Unique name, used on the command line.
    const NAME: &'static str;

    /// Category path; also the plugin's resource sub-directory.
    const PATH: &'static str;

    /// Ordering id for listings.
    const IDX: u32;

    fn create(ctx: &mut Context) -> Result<Self>;
}

/// Constructs a plugin instance for the current context.
pub type PluginFactory = Box<dyn Fn(&mut Context) -> Result<Box<dyn RenderPlugin>>>;

/// Describes a registered plugin.
pub struct PluginDescriptor {
    name: String,
    path: String,
    idx: u32,
    factory: PluginFactory,
}

impl PluginDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn idx(&self) -> u32 {
        self.idx
    }

    fn sort_key(&self) -> (u32, &str) {
        (self.idx, &self.name)
    }
}

impl cmp::PartialEq for PluginDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.path == other.path && self.idx == other.idx
    }
}

impl cmp::Eq for PluginDescriptor {}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        #[derive(Debug)]
        struct PluginDescriptor<'a> {
            name: &'a str,
            path: &'a str,
            idx: u32,
        }

        PluginDescriptor {
            name: &self.name,
            path: &self.path,
            idx: self.idx,
        }.fmt(f)
    }
}

/// All plugins known to the application, keyed by name.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: collections::HashMap<String, PluginDescriptor>,
}

impl PluginRegistry {
    /// Constructor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a plugin. Names must be unique.
    pub fn register<F>(&mut self, name: &str, path: &str, idx: u32, factory: F) -> Result<()>
        where F: Fn(&mut Context) -> Result<Box<dyn RenderPlugin>> + 'static
    {
        if self.plugins.contains_key(name) {
            return Err(Error::DuplicatePlugin(name.to_owned()));
        }
        trace!("registered plugin {} ({}, {})", name, path, idx);
        self.plugins.insert(
            name.to_owned(),
            PluginDescriptor {
                name: name.to_owned(),
                path: path.to_owned(),
                idx,
                factory: Box::new(factory),
            },
        );
        Ok(())
    }

    /// Adds a plugin type using its associated metadata.
    pub fn register_plugin<P: Plugin>(&mut self) -> Result<()> {
        self.register(P::NAME, P::PATH, P::IDX, |ctx| {
            let plugin = P::create(ctx)?;
            Ok(Box::new(plugin) as Box<dyn RenderPlugin>)
        })
    }

    pub fn lookup(&self, name: &str) -> Result<&PluginDescriptor> {
        self.plugins
            .get(name)
            .ok_or_else(|| Error::UnknownPlugin(name.to_owned()))
    }

    /// Runs the factory of the named plugin.
    pub fn create(&self, name: &str, ctx: &mut Context) -> Result<Box<dyn RenderPlugin>> {
        let descriptor = self.lookup(name)?;
        (descriptor.factory)(ctx).map_err(|source| Error::PluginConstruction {
            name: name.to_owned(),
            source: Box::new(source),
        })
    }

    /// Every descriptor ordered by `(idx, name)`.
    pub fn all(&self) -> Vec<&PluginDescriptor> {
        let mut all: Vec<_> = self.plugins.values().collect();
        all.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        all
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.all()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Blank;

    impl RenderPlugin for Blank {
        fn render(&mut self, _ctx: &mut Context) -> Result<()> {
            Ok(())
        }

        fn resize(&mut self, _ctx: &mut Context, _width: u32, _height: u32) -> Result<()> {
            Ok(())
        }
    }

    impl Plugin for Blank {
        const NAME: &'static str = "Blank";
        const PATH: &'static str = "Test/Blank";
        const IDX: u32 = 7;

        fn create(_ctx: &mut Context) -> Result<Self> {
            Ok(Blank)
        }
    }

    fn blank(_ctx: &mut Context) -> Result<Box<dyn RenderPlugin>> {
        Ok(Box::new(Blank))
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = PluginRegistry::new();
        registry.register("A", "x", 1, blank).unwrap();
        match registry.register("A", "y", 2, blank) {
            Err(Error::DuplicatePlugin(name)) => assert_eq!(name, "A"),
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("A").unwrap().path(), "x");
    }

    #[test]
    fn listing_is_ordered_by_idx_then_name() {
        let mut registry = PluginRegistry::new();
        registry.register("Zeta", "p", 2, blank).unwrap();
        registry.register("Beta", "p", 5, blank).unwrap();
        registry.register("Alpha", "p", 2, blank).unwrap();
        registry.register("Gamma", "p", 1, blank).unwrap();
        let names: Vec<_> = registry.all().iter().map(|d| d.name()).collect();
        assert_eq!(names, ["Gamma", "Alpha", "Zeta", "Beta"]);
    }

    #[test]
    fn lookup_returns_registered_metadata() {
        let mut registry = PluginRegistry::new();
        registry.register_plugin::<Blank>().unwrap();
        let descriptor = registry.lookup("Blank").unwrap();
        assert_eq!(descriptor.name(), "Blank");
        assert_eq!(descriptor.path(), "Test/Blank");
        assert_eq!(descriptor.idx(), 7);
        assert!(!registry.is_empty());
    }

    #[test]
    fn unknown_names_fail_lookup() {
        let registry = PluginRegistry::new();
        assert!(registry.is_empty());
        match registry.lookup("Missing") {
            Err(Error::UnknownPlugin(name)) => assert_eq!(name, "Missing"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn construction_failures_are_wrapped() {
        let mut registry = PluginRegistry::new();
        registry
            .register("Broken", "p", 0, |_| Err(Error::NoPlugins))
            .unwrap();
        let mut ctx = Context::headless(64, 64, "resources");
        match registry.create("Broken", &mut ctx) {
            Err(Error::PluginConstruction { name, source }) => {
                assert_eq!(name, "Broken");
                assert!(matches!(*source, Error::NoPlugins));
            }
            Err(other) => panic!("unexpected error {:?}", other),
            Ok(_) => panic!("construction should fail"),
        }
    }
}
