//! GPU buffer management.

use crate::gl;
use crate::queue::{self, Destructor};
use std::{cmp, fmt, hash, sync};

/// OpenGL buffer ID type.
pub(crate) type Id = u32;

/// Determines what the buffer may be used for.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Kind {
    /// Corresponds to `GL_ARRAY_BUFFER`.
    Array,

    /// Corresponds to `GL_ELEMENT_ARRAY_BUFFER`.
    Index,
}

impl Kind {
    /// Returns the equivalent OpenGL target enumeration constant.
    pub(crate) fn as_gl_enum(self) -> u32 {
        match self {
            Kind::Array => gl::ARRAY_BUFFER,
            Kind::Index => gl::ELEMENT_ARRAY_BUFFER,
        }
    }
}

/// A contiguous region of GPU memory, filled once at creation.
#[derive(Clone)]
pub struct Buffer {
    /// The OpenGL buffer ID.
    id: Id,

    /// The type of buffer, e.g. a vertex buffer.
    kind: Kind,

    /// The number of bytes held by the buffer.
    size: usize,

    /// Queues the buffer for deletion once the last clone is dropped.
    _destructor: sync::Arc<Destructor>,
}

impl Buffer {
    /// Constructor.
    pub(crate) fn new(id: Id, kind: Kind, size: usize, tx: queue::Sender<queue::Object>) -> Self {
        Self {
            _destructor: sync::Arc::new(Destructor::new(queue::Object::Buffer(id), tx)),
            id,
            kind,
            size,
        }
    }

    /// Returns the OpenGL buffer ID.
    pub(crate) fn id(&self) -> Id {
        self.id
    }

    /// Returns the buffer kind.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns the number of bytes this buffer contains.
    pub fn size(&self) -> usize {
        self.size
    }
}

impl cmp::PartialEq<Self> for Buffer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl cmp::Eq for Buffer {}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        #[derive(Debug)]
        struct Buffer {
            id: Id,
            kind: Kind,
            size: usize,
        }

        Buffer {
            id: self.id,
            kind: self.kind,
            size: self.size,
        }.fmt(f)
    }
}

impl hash::Hash for Buffer {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Describes the data format of one element read by an [`Accessor`].
///
/// The payload is the component count, 1 to 4.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Format {
    /// 32-bit floating point number.
    F32(u8),

    /// Unsigned normalized 8-bit rational.
    U8Norm(u8),

    /// Unsigned 16-bit integer.
    U16(u8),

    /// Unsigned 32-bit integer.
    U32(u8),
}

impl Format {
    /// Returns the corresponding GL data type enumeration constant.
    pub(crate) fn gl_data_type(self) -> u32 {
        match self {
            Format::F32(_) => gl::FLOAT,
            Format::U8Norm(_) => gl::UNSIGNED_BYTE,
            Format::U16(_) => gl::UNSIGNED_SHORT,
            Format::U32(_) => gl::UNSIGNED_INT,
        }
    }

    /// Returns true if this is a normalized type.
    pub fn norm(self) -> bool {
        matches!(self, Format::U8Norm(_))
    }

    /// Returns the number of components, clamped to 1..=4.
    pub fn size(self) -> usize {
        let size = match self {
            Format::F32(size) | Format::U8Norm(size) | Format::U16(size) | Format::U32(size) => size,
        };
        size.clamp(1, 4) as usize
    }
}

/// A formatted view into a [`Buffer`].
#[derive(Clone, Debug)]
pub struct Accessor {
    /// The buffer the accessor reads from.
    buffer: Buffer,

    /// The accessor data format.
    format: Format,

    /// The number of bytes into the buffer the accessor reads from.
    offset: usize,

    /// The number of bytes between each element.
    stride: usize,
}

impl Accessor {
    /// Constructor.
    pub fn new(buffer: Buffer, format: Format, offset: usize, stride: usize) -> Self {
        Self { buffer, format, offset, stride }
    }

    /// Returns the parent buffer.
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Returns the accessor data format.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Returns the accessor byte offset into the parent buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the accessor byte stride between consecutive elements.
    pub fn stride(&self) -> usize {
        self.stride
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::Queue;

    #[test]
    fn buffers_compare_by_name() {
        let queue = Queue::new();
        let a = Buffer::new(1, Kind::Array, 16, queue.tx());
        let b = Buffer::new(2, Kind::Array, 16, queue.tx());
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.kind().as_gl_enum(), gl::ARRAY_BUFFER);
        assert_eq!(a.size(), 16);
    }

    #[test]
    fn dropping_last_clone_queues_name() {
        let queue = Queue::new();
        let buffer = Buffer::new(3, Kind::Index, 0, queue.tx());
        let clone = buffer.clone();
        drop(buffer);
        assert!(queue.is_empty());
        drop(clone);
        assert_eq!(queue.next(), Some(queue::Object::Buffer(3)));
    }
}
