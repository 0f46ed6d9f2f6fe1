//! Per-plugin resource lookup.

use crate::error::{Error, Result};
use crate::pixels::Pixels;
use std::{fs, path};

/// Resolves resource names inside the active plugin's directory,
/// `<root>/<plugin path>/<name>`.
#[derive(Clone, Debug)]
pub struct Resources {
    root: path::PathBuf,
    plugin_dir: path::PathBuf,
}

impl Resources {
    /// Constructor. Until a plugin is selected names resolve against `root`.
    pub fn new<P: Into<path::PathBuf>>(root: P) -> Self {
        let root = root.into();
        Resources { plugin_dir: root.clone(), root }
    }

    /// Points lookups at the directory of the plugin with the given path.
    pub fn select_plugin(&mut self, plugin_path: &str) {
        self.plugin_dir = self.root.join(plugin_path);
        debug!("resource directory is now {}", self.plugin_dir.display());
    }

    /// The resource root shared by all plugins.
    pub fn root(&self) -> &path::Path {
        &self.root
    }

    /// The active plugin's resource directory.
    pub fn dir(&self) -> &path::Path {
        &self.plugin_dir
    }

    /// Absolute path of an existing resource.
    pub fn path(&self, name: &str) -> Result<path::PathBuf> {
        let path = self.plugin_dir.join(name);
        fs::canonicalize(&path).map_err(|_| Error::ResourceNotFound(path))
    }

    /// Reads a resource as bytes.
    pub fn load_bytes(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path(name)?;
        fs::read(&path).map_err(|err| Error::io(path, err))
    }

    /// Reads a resource as UTF-8 text.
    pub fn load_text(&self, name: &str) -> Result<String> {
        let path = self.path(name)?;
        fs::read_to_string(&path).map_err(|err| Error::io(path, err))
    }

    /// Decodes an image resource, bottom row first.
    pub fn load_image(&self, name: &str) -> Result<Pixels> {
        Pixels::load(self.path(name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let plugin = dir.path().join("PCVC/Demo");
        fs::create_dir_all(&plugin).unwrap();
        fs::write(plugin.join("shader.vert"), "void main() {}\n").unwrap();
        Pixels::filled(2, 3, [10, 20, 30, 255]).save_png(plugin.join("tex.png")).unwrap();
        dir
    }

    #[test]
    fn resolves_inside_plugin_directory() {
        let dir = tree();
        let mut resources = Resources::new(dir.path());
        resources.select_plugin("PCVC/Demo");
        let path = resources.path("shader.vert").unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("PCVC/Demo/shader.vert"));
        assert_eq!(resources.load_text("shader.vert").unwrap(), "void main() {}\n");
    }

    #[test]
    fn missing_resource_names_the_path() {
        let dir = tree();
        let mut resources = Resources::new(dir.path());
        resources.select_plugin("PCVC/Demo");
        match resources.load_text("nope.frag") {
            Err(Error::ResourceNotFound(path)) => assert!(path.ends_with("PCVC/Demo/nope.frag")),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn loads_images() {
        let dir = tree();
        let mut resources = Resources::new(dir.path());
        resources.select_plugin("PCVC/Demo");
        let image = resources.load_image("tex.png").unwrap();
        assert_eq!((image.width(), image.height()), (2, 3));
        assert_eq!(image.get(1, 2), Some([10, 20, 30, 255]));
    }

    #[test]
    fn other_plugins_do_not_see_each_others_files() {
        let dir = tree();
        let mut resources = Resources::new(dir.path());
        resources.select_plugin("PCVC/Other");
        assert!(resources.path("shader.vert").is_err());
    }
}
