//! Draw call dispatch.

use crate::gl;

/// Primitive topology.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Primitive {
    /// List of triangle points.
    Triangles,

    /// Strip of triangles sharing edges.
    TriangleStrip,

    /// List of line segments.
    Lines,
}

impl Primitive {
    pub(crate) fn as_gl_enum(self) -> u32 {
        match self {
            Primitive::Triangles => gl::TRIANGLES,
            Primitive::TriangleStrip => gl::TRIANGLE_STRIP,
            Primitive::Lines => gl::LINES,
        }
    }
}

/// Draw call kind.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Kind {
    /// Draw consecutive vertices.
    Arrays,

    /// Draw through the mesh index buffer.
    Elements,
}

/// A draw call command.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct DrawCall {
    /// Where the vertices/elements begin.
    pub offset: usize,

    /// Number of vertices/elements to draw.
    pub count: usize,

    /// The primitive topology.
    pub primitive: Primitive,

    /// Draw call kind.
    pub kind: Kind,
}

impl DrawCall {
    /// Indexed triangle list over `count` indices.
    pub fn elements(primitive: Primitive, count: usize) -> Self {
        DrawCall { offset: 0, count, primitive, kind: Kind::Elements }
    }

    /// Non-indexed draw over `count` vertices.
    pub fn arrays(primitive: Primitive, count: usize) -> Self {
        DrawCall { offset: 0, count, primitive, kind: Kind::Arrays }
    }
}
