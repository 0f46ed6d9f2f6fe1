//! GPU-visible pixel containers and their sampling properties.

use crate::gl;
use crate::queue::{self, Destructor};
use std::{cmp, fmt, hash, sync};

/// OpenGL texture ID type.
pub(crate) type Id = u32;

/// Internal storage format of a texture.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Format {
    /// Corresponds to `GL_RGBA8`.
    Rgba8,

    /// Corresponds to `GL_R32F`. Used for object ids.
    R32F,

    /// Corresponds to `GL_RGB32F`.
    Rgb32F,

    /// Corresponds to `GL_DEPTH_COMPONENT32F`.
    Depth32F,
}

impl Format {
    pub(crate) fn as_gl_enum(self) -> u32 {
        match self {
            Format::Rgba8 => gl::RGBA8,
            Format::R32F => gl::R32F,
            Format::Rgb32F => gl::RGB32F,
            Format::Depth32F => gl::DEPTH_COMPONENT32F,
        }
    }

    /// Pixel transfer `(format, type)` compatible with the storage format.
    pub(crate) fn transfer_enums(self) -> (u32, u32) {
        match self {
            Format::Rgba8 => (gl::RGBA, gl::UNSIGNED_BYTE),
            Format::R32F => (gl::RED, gl::FLOAT),
            Format::Rgb32F => (gl::RGB, gl::FLOAT),
            Format::Depth32F => (gl::DEPTH_COMPONENT, gl::FLOAT),
        }
    }

    /// Returns `true` for depth formats.
    pub fn is_depth(self) -> bool {
        self == Format::Depth32F
    }
}

/// Texture filtering mode.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Filter {
    /// Nearest texel.
    Nearest,

    /// Linear filter.
    Linear,
}

impl Filter {
    pub(crate) fn as_gl_enum(self, mipmap: bool) -> u32 {
        match (self, mipmap) {
            (Filter::Nearest, false) => gl::NEAREST,
            (Filter::Linear, false) => gl::LINEAR,
            (Filter::Nearest, true) => gl::NEAREST_MIPMAP_NEAREST,
            (Filter::Linear, true) => gl::LINEAR_MIPMAP_LINEAR,
        }
    }
}

/// Texture co-ordinate wrapping mode.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Wrap {
    /// Repeat.
    Repeat,

    /// Clamp to the border texel.
    ClampToEdge,
}

impl Wrap {
    pub(crate) fn as_gl_enum(self) -> u32 {
        match self {
            Wrap::Repeat => gl::REPEAT,
            Wrap::ClampToEdge => gl::CLAMP_TO_EDGE,
        }
    }
}

/// Sampling properties for a 2D texture.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Sampler {
    /// Specifies the magnification filter.
    ///
    /// Default: `Linear`.
    pub mag_filter: Filter,

    /// Specifies the minification filter.
    ///
    /// Default: `Linear`.
    pub min_filter: Filter,

    /// Specifies the wrapping mode for the S axis.
    ///
    /// Default: `Repeat`.
    pub wrap_s: Wrap,

    /// Specifies the wrapping mode for the T axis.
    ///
    /// Default: `Repeat`.
    pub wrap_t: Wrap,
}

impl Sampler {
    /// Nearest filtering and edge clamping, for render target attachments.
    pub fn nearest_clamped() -> Self {
        Sampler {
            mag_filter: Filter::Nearest,
            min_filter: Filter::Nearest,
            wrap_s: Wrap::ClampToEdge,
            wrap_t: Wrap::ClampToEdge,
        }
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self {
            mag_filter: Filter::Linear,
            min_filter: Filter::Linear,
            wrap_s: Wrap::Repeat,
            wrap_t: Wrap::Repeat,
        }
    }
}

/// GPU-visible 2D texture.
#[derive(Clone)]
pub struct Texture2 {
    /// The OpenGL texture ID.
    id: Id,

    width: u32,
    height: u32,
    format: Format,
    mipmap: bool,
    sampler: Sampler,

    /// Queues the texture for deletion once the last clone is dropped.
    _destructor: sync::Arc<Destructor>,
}

impl Texture2 {
    pub(crate) fn new(
        id: Id,
        width: u32,
        height: u32,
        format: Format,
        mipmap: bool,
        sampler: Sampler,
        tx: queue::Sender<queue::Object>,
    ) -> Self {
        Texture2 {
            id,
            width,
            height,
            format,
            mipmap,
            sampler,
            _destructor: sync::Arc::new(Destructor::new(queue::Object::Texture(id), tx)),
        }
    }

    /// Returns the OpenGL texture ID.
    pub(crate) fn id(&self) -> Id {
        self.id
    }

    /// Returns the internal pixel format.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Returns the sampling properties applied when the texture is bound.
    pub fn sampler(&self) -> Sampler {
        self.sampler
    }

    /// Returns the width of the texture in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the texture in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `true` if this texture has mipmaps.
    pub fn mipmap(&self) -> bool {
        self.mipmap
    }
}

impl cmp::Eq for Texture2 {}

impl cmp::PartialEq<Self> for Texture2 {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for Texture2 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        #[derive(Debug)]
        struct Texture2 {
            id: u32,
            width: u32,
            height: u32,
            format: Format,
        }

        Texture2 {
            id: self.id,
            width: self.width,
            height: self.height,
            format: self.format,
        }.fmt(f)
    }
}

impl hash::Hash for Texture2 {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
