//! Deferred deletion of GL objects.

use crossbeam_channel as chan;

/// Send half of a [`Queue`].
pub type Sender<T> = chan::Sender<T>;

/// Receive half of a [`Queue`].
pub type Receiver<T> = chan::Receiver<T>;

/// A GL object name waiting to be deleted.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Object {
    Buffer(u32),
    VertexArray(u32),
    Texture(u32),
    Framebuffer(u32),
    Program(u32),
}

/// Pushes the object name onto the factory queue when dropped.
///
/// Handles share one destructor through an `Arc`, so the name is queued
/// exactly once, when the last clone goes away.
pub(crate) struct Destructor {
    object: Object,
    tx: Sender<Object>,
}

impl Destructor {
    /// Constructor.
    pub(crate) fn new(object: Object, tx: Sender<Object>) -> Self {
        Destructor { object, tx }
    }
}

impl Drop for Destructor {
    fn drop(&mut self) {
        // The receiver lives in the factory; if it is gone the context is too.
        let _ = self.tx.send(self.object);
    }
}

/// An unbounded queue of objects awaiting deletion.
#[derive(Clone)]
pub struct Queue<T> {
    /// Send half of the queue.
    tx: Sender<T>,

    /// Receive half of the queue.
    rx: Receiver<T>,
}

impl<T> Queue<T> {
    /// Constructor.
    pub fn new() -> Self {
        let (tx, rx) = chan::unbounded();
        Self { tx, rx }
    }

    /// Clone the send half of the queue.
    pub fn tx(&self) -> Sender<T> {
        self.tx.clone()
    }

    /// Remove the item from the front of the queue.
    pub fn next(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Number of items waiting.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Returns `true` if nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn name_is_queued_once_after_last_clone() {
        let queue = Queue::new();
        let first = Arc::new(Destructor::new(Object::Texture(7), queue.tx()));
        let second = first.clone();
        drop(first);
        assert!(queue.is_empty());
        drop(second);
        assert_eq!(queue.next(), Some(Object::Texture(7)));
        assert_eq!(queue.next(), None);
    }
}
