//! Vertex array objects bundled with the draw call that renders them.

use crate::buffer::Accessor;
use crate::draw_call::DrawCall;
use crate::queue::{self, Destructor};
use std::{cmp, fmt, hash, sync};

/// The maximum number of vertex attributes a mesh may bind.
pub const MAX_ATTRIBUTES: usize = 8;

/// The OpenGL VAO ID type.
pub(crate) type Id = u32;

/// Vertex attribute.
pub type Attribute = Accessor;

/// Index data.
pub type Indices = Accessor;

/// Geometry ready to draw: a VAO, the buffers it reads and a default draw call.
#[derive(Clone)]
pub struct Mesh {
    /// The OpenGL VAO ID.
    id: Id,

    /// Draw sequence indices to bind at draw time.
    indices: Option<Indices>,

    /// Vertex attributes, indexed by shader location.
    attributes: [Option<Attribute>; MAX_ATTRIBUTES],

    /// How the mesh is drawn when no override is given.
    draw_call: DrawCall,

    /// Queues the VAO for deletion once the last clone is dropped.
    _destructor: sync::Arc<Destructor>,
}

impl Mesh {
    /// Constructor.
    pub(crate) fn new(
        id: Id,
        attributes: [Option<Attribute>; MAX_ATTRIBUTES],
        indices: Option<Indices>,
        draw_call: DrawCall,
        tx: queue::Sender<queue::Object>,
    ) -> Self {
        Self {
            id,
            indices,
            attributes,
            draw_call,
            _destructor: sync::Arc::new(Destructor::new(queue::Object::VertexArray(id), tx)),
        }
    }

    pub(crate) fn id(&self) -> Id {
        self.id
    }

    /// Returns the accessor bound as the element array buffer.
    pub fn indices(&self) -> Option<&Indices> {
        self.indices.as_ref()
    }

    /// Returns the accessor bound to the given attribute location.
    pub fn attribute(&self, location: u8) -> Option<&Attribute> {
        self.attributes.get(location as usize).and_then(Option::as_ref)
    }

    /// Returns the default draw call.
    pub fn draw_call(&self) -> DrawCall {
        self.draw_call
    }
}

impl cmp::Eq for Mesh {}

impl cmp::PartialEq<Self> for Mesh {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        #[derive(Debug)]
        struct Mesh<'a> {
            id: u32,
            draw_call: DrawCall,
            indices: Option<&'a Indices>,
        }

        Mesh {
            id: self.id,
            draw_call: self.draw_call,
            indices: self.indices.as_ref(),
        }.fmt(f)
    }
}

impl hash::Hash for Mesh {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}
