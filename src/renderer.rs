use crate::types::{GlobalId, TypeCode};

/// Opaque handle into the external renderer. The renderer owns the drawable
/// and its lifetime; the registry only stores and hands back the handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DrawableHandle(u64);

impl DrawableHandle {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Boundary with the external rendering pipeline. The sync core calls these
/// and owns none of the renderer's internal state.
pub trait Renderer {
    /// Builds a drawable for a newly created object.
    fn create_drawable(&mut self, object_id: GlobalId, type_code: TypeCode) -> DrawableHandle;

    /// Releases the drawable of a killed object.
    fn release_drawable(&mut self, handle: DrawableHandle);

    /// Shows or hides a drawable without destroying it (orphans are hidden,
    /// not removed).
    fn set_visible(&mut self, handle: DrawableHandle, visible: bool);

    /// Tells the renderer the object's transform (or drawable parent)
    /// changed.
    fn mark_moved(&mut self, handle: DrawableHandle);
}
