use std::any::Any;

use crate::app::{Appearance, AppearanceStyle, EntityHandle, SceneEntity, Vec2, Vec3};
use crate::interaction::{CallbackResult, DragSubject, DropTarget};

/// Accepted-kind value matching every item.
pub const ANY_ITEM_KIND: &str = "*";

/// Reference drop target: a station holding up to `capacity` items of one kind.
#[derive(Debug, Clone)]
pub struct DropSlot {
    name: String,
    target_type: String,
    accepts: String,
    position: Vec3,
    half_extents: Vec2,
    color: [u8; 4],
    capacity: usize,
    occupants: Vec<EntityHandle>,
    hovered: bool,
}

impl DropSlot {
    pub fn new(
        name: impl Into<String>,
        target_type: impl Into<String>,
        position: Vec3,
        half_extents: Vec2,
    ) -> Self {
        Self {
            name: name.into(),
            target_type: target_type.into(),
            accepts: ANY_ITEM_KIND.to_string(),
            position,
            half_extents,
            color: [120, 120, 120, 255],
            capacity: 1,
            occupants: Vec::new(),
            hovered: false,
        }
    }

    pub fn accepting(mut self, item_kind: impl Into<String>) -> Self {
        self.accepts = item_kind.into();
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_color(mut self, color: [u8; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn accepts(&self) -> &str {
        &self.accepts
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn occupants(&self) -> &[EntityHandle] {
        &self.occupants
    }

    pub fn is_full(&self) -> bool {
        self.occupants.len() >= self.capacity
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn holds(&self, handle: EntityHandle) -> bool {
        self.occupants.contains(&handle)
    }

    /// Frees `handle`'s place. Returns false when it was not an occupant.
    pub fn release(&mut self, handle: EntityHandle) -> bool {
        let before = self.occupants.len();
        self.occupants.retain(|occupant| *occupant != handle);
        self.occupants.len() != before
    }

    pub fn clear_occupants(&mut self) {
        self.occupants.clear();
    }

    /// Where an occupant sits: occupants are spread evenly across the slot's width.
    pub fn anchor_for(&self, handle: EntityHandle) -> Option<Vec3> {
        let index = self.occupants.iter().position(|occupant| *occupant == handle)?;
        let lanes = self.capacity.max(1) as f32;
        let lane_width = self.half_extents.x * 2.0 / lanes;
        let x = self.position.x - self.half_extents.x + lane_width * (index as f32 + 0.5);
        Some(Vec3::new(x, self.position.y, self.position.z))
    }

    fn kind_matches(&self, subject: &DragSubject) -> bool {
        self.accepts == ANY_ITEM_KIND || subject.item_kind.as_deref() == Some(self.accepts.as_str())
    }
}

impl DropTarget for DropSlot {
    fn target_type(&self) -> &str {
        &self.target_type
    }

    fn can_accept(&self, subject: &DragSubject) -> CallbackResult<bool> {
        Ok(self.kind_matches(subject) && !self.is_full() && !self.holds(subject.handle))
    }

    fn accept(&mut self, subject: &DragSubject) -> CallbackResult<bool> {
        if !self.can_accept(subject)? {
            return Ok(false);
        }
        self.occupants.push(subject.handle);
        Ok(true)
    }

    fn on_drag_enter(&mut self, _subject: &DragSubject) -> CallbackResult {
        self.hovered = true;
        Ok(())
    }

    fn on_drag_exit(&mut self, _subject: &DragSubject) -> CallbackResult {
        self.hovered = false;
        Ok(())
    }
}

impl SceneEntity for DropSlot {
    fn debug_name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn half_extents(&self) -> Vec2 {
        self.half_extents
    }

    fn sorting_order(&self) -> i32 {
        -1
    }

    fn appearance(&self) -> Appearance {
        Appearance {
            color: self.color,
            style: AppearanceStyle::Outline,
            highlighted: self.hovered,
        }
    }

    fn as_drop_target(&self) -> Option<&dyn DropTarget> {
        Some(self)
    }

    fn as_drop_target_mut(&mut self) -> Option<&mut dyn DropTarget> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::EntityRegistry;
    use crate::items::DraggableItem;

    fn spawn_subject(
        registry: &mut EntityRegistry,
        name: &str,
        kind: Option<&str>,
    ) -> DragSubject {
        let mut item = DraggableItem::new(name, Vec3::ZERO, Vec2::new(0.5, 0.5));
        if let Some(kind) = kind {
            item = item.with_kind(kind);
        }
        let handle = registry.spawn(Box::new(item));
        DragSubject::capture(handle, registry.get(handle).expect("item")).expect("draggable")
    }

    fn board() -> DropSlot {
        DropSlot::new("cutting_board", "station", Vec3::new(4.0, 0.0, 0.0), Vec2::new(2.0, 1.0))
            .accepting("vegetable")
    }

    #[test]
    fn accepts_matching_kind_until_full() {
        let mut registry = EntityRegistry::default();
        let carrot = spawn_subject(&mut registry, "carrot", Some("vegetable"));
        let leek = spawn_subject(&mut registry, "leek", Some("vegetable"));
        let mut slot = board();

        assert_eq!(slot.can_accept(&carrot), Ok(true));
        assert_eq!(slot.accept(&carrot), Ok(true));
        assert!(slot.is_full());
        assert_eq!(slot.can_accept(&leek), Ok(false));
        assert_eq!(slot.accept(&leek), Ok(false));
        assert_eq!(slot.occupants(), &[carrot.handle]);
    }

    #[test]
    fn rejects_other_kinds_and_untagged_items() {
        let mut registry = EntityRegistry::default();
        let fish = spawn_subject(&mut registry, "fish", Some("protein"));
        let mystery = spawn_subject(&mut registry, "mystery", None);
        let slot = board();

        assert_eq!(slot.can_accept(&fish), Ok(false));
        assert_eq!(slot.can_accept(&mystery), Ok(false));
    }

    #[test]
    fn wildcard_slot_takes_anything_once() {
        let mut registry = EntityRegistry::default();
        let mystery = spawn_subject(&mut registry, "mystery", None);
        let mut trash = DropSlot::new("trash", "bin", Vec3::ZERO, Vec2::new(1.0, 1.0))
            .with_capacity(4);

        assert_eq!(trash.accepts(), ANY_ITEM_KIND);
        assert_eq!(trash.accept(&mystery), Ok(true));
        assert_eq!(trash.can_accept(&mystery), Ok(false));
    }

    #[test]
    fn release_frees_capacity() {
        let mut registry = EntityRegistry::default();
        let carrot = spawn_subject(&mut registry, "carrot", Some("vegetable"));
        let mut slot = board();
        slot.accept(&carrot).expect("accept");

        assert!(slot.release(carrot.handle));
        assert!(!slot.release(carrot.handle));
        assert!(!slot.is_full());
    }

    #[test]
    fn hover_toggles_highlight() {
        let mut registry = EntityRegistry::default();
        let carrot = spawn_subject(&mut registry, "carrot", Some("vegetable"));
        let mut slot = board();

        slot.on_drag_enter(&carrot).expect("enter");
        assert!(slot.appearance().highlighted);
        slot.on_drag_exit(&carrot).expect("exit");
        assert!(!slot.is_hovered());
    }

    #[test]
    fn anchors_spread_occupants_across_width() {
        let mut registry = EntityRegistry::default();
        let a = spawn_subject(&mut registry, "a", Some("vegetable"));
        let b = spawn_subject(&mut registry, "b", Some("vegetable"));
        let mut pot = DropSlot::new("pot", "station", Vec3::new(0.0, 3.0, 1.0), Vec2::new(2.0, 1.0))
            .with_capacity(2);
        pot.accept(&a).expect("a");
        pot.accept(&b).expect("b");

        assert_eq!(pot.anchor_for(a.handle), Some(Vec3::new(-1.0, 3.0, 1.0)));
        assert_eq!(pot.anchor_for(b.handle), Some(Vec3::new(1.0, 3.0, 1.0)));
    }
}
