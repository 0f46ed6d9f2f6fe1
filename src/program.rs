//! GLSL programs and the values bound to them at draw time.

use crate::queue::{self, Destructor};
use crate::texture::Texture2;
use std::{cmp, fmt, hash, sync};

/// The maximum number of textures an invocation may bind.
pub const MAX_TEXTURES: usize = 8;

/// A uniform value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Uniform {
    Int(i32),
    Float(f32),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    /// Column-major 4x4 matrix.
    Mat4([f32; 16]),
}

impl From<i32> for Uniform {
    fn from(value: i32) -> Self {
        Uniform::Int(value)
    }
}

impl From<f32> for Uniform {
    fn from(value: f32) -> Self {
        Uniform::Float(value)
    }
}

impl From<bool> for Uniform {
    fn from(value: bool) -> Self {
        Uniform::Int(value as i32)
    }
}

impl From<glam::Vec3> for Uniform {
    fn from(value: glam::Vec3) -> Self {
        Uniform::Vec3(value.to_array())
    }
}

impl From<glam::Vec4> for Uniform {
    fn from(value: glam::Vec4) -> Self {
        Uniform::Vec4(value.to_array())
    }
}

impl From<glam::Mat4> for Uniform {
    fn from(value: glam::Mat4) -> Self {
        Uniform::Mat4(value.to_cols_array())
    }
}

/// An invocation of a shader program.
///
/// Uniform and sampler names that the program does not use are skipped.
#[derive(Clone, Copy, Debug)]
pub struct Invocation<'a> {
    /// The program to bind at draw time.
    pub program: &'a Program,

    /// Named uniform values set before drawing.
    pub uniforms: &'a [(&'a str, Uniform)],

    /// Named sampler uniforms; the texture at position `i` is bound to unit `i`.
    pub textures: &'a [(&'a str, &'a Texture2)],
}

impl<'a> Invocation<'a> {
    /// An invocation with no uniforms or textures.
    pub fn new(program: &'a Program) -> Self {
        Invocation { program, uniforms: &[], textures: &[] }
    }
}

/// A compiled and linked shader program.
#[derive(Clone)]
pub struct Program {
    /// The OpenGL program ID.
    id: u32,

    /// Queues the program for deletion once the last clone is dropped.
    _destructor: sync::Arc<Destructor>,
}

impl Program {
    /// Constructor.
    pub(crate) fn new(id: u32, tx: queue::Sender<queue::Object>) -> Self {
        Self {
            id,
            _destructor: sync::Arc::new(Destructor::new(queue::Object::Program(id), tx)),
        }
    }

    /// Returns the GLSL program ID.
    pub(crate) fn id(&self) -> u32 {
        self.id
    }
}

impl cmp::Eq for Program {}

impl cmp::PartialEq<Self> for Program {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        #[derive(Debug)]
        struct Program(u32);

        Program(self.id).fmt(f)
    }
}

impl hash::Hash for Program {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}
