//! Render targets.

use crate::queue::{self, Destructor};
use crate::texture::Texture2;
use arrayvec::ArrayVec;
use std::{cmp, fmt, hash, sync};

/// The maximum number of color attachments a framebuffer may carry.
pub const MAX_COLOR_ATTACHMENTS: usize = 4;

pub(crate) type Id = u32;

/// Color attachments of an off-screen framebuffer.
pub type ColorAttachments = ArrayVec<Texture2, MAX_COLOR_ATTACHMENTS>;

/// Specifies whether the color buffer is cleared.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClearColor {
    /// Clear to the given color.
    Yes { r: f32, g: f32, b: f32, a: f32 },

    /// Leave the color buffer untouched.
    No,
}

/// Specifies whether the depth buffer is cleared.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClearDepth {
    /// Clear to the given depth.
    Yes { z: f64 },

    /// Leave the depth buffer untouched.
    No,
}

/// A clear operation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClearOp {
    pub color: ClearColor,
    pub depth: ClearDepth,
}

impl ClearOp {
    /// Clears color to `rgb` (opaque) and depth to `1.0`.
    pub fn color_depth(rgb: [f32; 3]) -> Self {
        ClearOp {
            color: ClearColor::Yes { r: rgb[0], g: rgb[1], b: rgb[2], a: 1.0 },
            depth: ClearDepth::Yes { z: 1.0 },
        }
    }
}

impl Default for ClearOp {
    fn default() -> Self {
        ClearOp::color_depth([0.0, 0.0, 0.0])
    }
}

/// A framebuffer object.
///
/// The default framebuffer (id 0) owns no attachments and is never deleted.
#[derive(Clone)]
pub struct Framebuffer {
    /// The OpenGL framebuffer ID.
    id: Id,

    width: u32,
    height: u32,

    /// Color attachments, in `GL_COLOR_ATTACHMENTi` order.
    colors: ColorAttachments,

    /// Optional depth attachment.
    depth: Option<Texture2>,

    /// `None` for the default framebuffer.
    _destructor: Option<sync::Arc<Destructor>>,
}

impl Framebuffer {
    /// Constructor.
    ///
    /// The caller is responsible for setting up the framebuffer.
    pub(crate) fn new(
        id: Id,
        width: u32,
        height: u32,
        colors: ColorAttachments,
        depth: Option<Texture2>,
        tx: queue::Sender<queue::Object>,
    ) -> Self {
        Self {
            id,
            width,
            height,
            colors,
            depth,
            _destructor: Some(sync::Arc::new(Destructor::new(queue::Object::Framebuffer(id), tx))),
        }
    }

    /// Returns the window's implicit framebuffer.
    pub(crate) fn implicit(width: u32, height: u32) -> Self {
        Self {
            id: 0,
            width,
            height,
            colors: ArrayVec::new(),
            depth: None,
            _destructor: None,
        }
    }

    /// Returns the OpenGL framebuffer ID.
    pub(crate) fn id(&self) -> Id {
        self.id
    }

    /// Returns `true` for the window's implicit framebuffer.
    pub fn is_default(&self) -> bool {
        self.id == 0
    }

    /// Returns `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the color attachment texture at `index`.
    pub fn color(&self, index: usize) -> Option<&Texture2> {
        self.colors.get(index)
    }

    /// Returns every color attachment.
    pub fn colors(&self) -> &[Texture2] {
        &self.colors
    }

    /// Returns the depth attachment texture.
    pub fn depth(&self) -> Option<&Texture2> {
        self.depth.as_ref()
    }
}

impl fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        #[derive(Debug)]
        struct Framebuffer<'a> {
            id: Id,
            width: u32,
            height: u32,
            colors: &'a [Texture2],
            depth: Option<&'a Texture2>,
        }

        Framebuffer {
            id: self.id,
            width: self.width,
            height: self.height,
            colors: &self.colors,
            depth: self.depth.as_ref(),
        }.fmt(f)
    }
}

impl cmp::PartialEq<Self> for Framebuffer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl cmp::Eq for Framebuffer {}

impl hash::Hash for Framebuffer {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
