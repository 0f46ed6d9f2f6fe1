//! Error type shared by the whole crate.

use std::{io, path};

/// Result alias using the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Which shader stage failed to compile.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Stage::Vertex => f.write_str("vertex"),
            Stage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown plugin `{0}`")]
    UnknownPlugin(String),

    #[error("plugin `{0}` is already registered")]
    DuplicatePlugin(String),

    #[error("no plugins are registered")]
    NoPlugins,

    #[error("failed to construct plugin `{name}`")]
    PluginConstruction {
        name: String,
        #[source]
        source: Box<Error>,
    },

    #[error("a camera is already registered for the active plugin")]
    CameraAlreadyRegistered,

    #[error("resource not found: {}", .0.display())]
    ResourceNotFound(path::PathBuf),

    #[error("I/O error on {}", path.display())]
    Io {
        path: path::PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("image error on {}", path.display())]
    Image {
        path: path::PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image codec error")]
    Codec(#[from] image::ImageError),

    #[error("pixel buffer of {len} bytes does not match {width}x{height} RGBA")]
    InvalidImageSize { width: u32, height: u32, len: usize },

    #[error("{stage} shader failed to compile:\n{log}")]
    ShaderCompile { stage: Stage, log: String },

    #[error("program failed to link:\n{log}")]
    ProgramLink { log: String },

    #[error("framebuffer incomplete (status 0x{0:x})")]
    IncompleteFramebuffer(u32),

    #[error("window error: {0}")]
    Window(String),
}

impl Error {
    /// Wraps an I/O failure with the path it happened on.
    pub fn io<P: Into<path::PathBuf>>(path: P, source: io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }
}
