use crate::app::{EntityHandle, PointerDevice, Vec2, Vec3};

/// Record of the one in-progress drag. Only the controller creates or mutates it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub(crate) draggable: EntityHandle,
    pub(crate) target: Option<EntityHandle>,
    pub(crate) device: PointerDevice,
    pub(crate) start_input_position: Vec2,
    pub(crate) start_entity_position: Vec3,
    pub(crate) last_input_position: Vec2,
    pub(crate) last_entity_position: Vec3,
}

impl DragSession {
    pub(crate) fn new(
        draggable: EntityHandle,
        device: PointerDevice,
        start_input_position: Vec2,
        start_entity_position: Vec3,
    ) -> Self {
        Self {
            draggable,
            target: None,
            device,
            start_input_position,
            start_entity_position,
            last_input_position: start_input_position,
            last_entity_position: start_entity_position,
        }
    }

    pub fn draggable(&self) -> EntityHandle {
        self.draggable
    }

    pub fn target(&self) -> Option<EntityHandle> {
        self.target
    }

    pub fn device(&self) -> PointerDevice {
        self.device
    }

    pub fn start_input_position(&self) -> Vec2 {
        self.start_input_position
    }

    pub fn start_entity_position(&self) -> Vec3 {
        self.start_entity_position
    }

    pub fn last_input_position(&self) -> Vec2 {
        self.last_input_position
    }

    pub fn last_entity_position(&self) -> Vec3 {
        self.last_entity_position
    }

    /// Screen-space distance between drag start and `input_position`.
    pub fn input_distance(&self, input_position: Vec2) -> f32 {
        self.start_input_position.distance(input_position)
    }
}
