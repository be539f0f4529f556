use std::any::Any;

use crate::app::{Appearance, AppearanceStyle, SceneEntity, Vec2, Vec3};
use crate::interaction::{CallbackResult, Draggable};

use super::follow::{move_towards, smooth_damp};

/// Sorting order a raised item gets while dragged, before adding its drag layer.
pub const DRAGGED_SORTING_ORDER: i32 = 1000;

/// A settling item closer than this to its target snaps onto it and rests.
const SETTLE_SNAP_DISTANCE: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothFollow {
    pub smooth_time: f32,
    /// World units per second.
    pub max_speed: f32,
    /// No motion while the item is within this distance of its target.
    pub dead_zone: f32,
    /// World units per second when sliding back after a failed drag.
    pub return_speed: f32,
}

impl Default for SmoothFollow {
    fn default() -> Self {
        Self {
            smooth_time: 0.08,
            max_speed: 60.0,
            dead_zone: 0.05,
            return_speed: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FollowMode {
    Snap,
    Smoothed(SmoothFollow),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemMotion {
    Resting,
    Following,
    /// Released successfully; easing onto the last commanded target.
    Settling,
    Returning,
}

/// Reference draggable: follows the pointer, returns to where it was picked up when the
/// drag fails.
#[derive(Debug, Clone)]
pub struct DraggableItem {
    name: String,
    kind: Option<String>,
    position: Vec3,
    half_extents: Vec2,
    color: [u8; 4],
    base_sorting_order: i32,
    sorting_order: i32,
    drag_layer: i32,
    raise_while_dragged: bool,
    can_drag: bool,
    follow: FollowMode,
    restore_point: Vec3,
    follow_target: Vec3,
    velocity: Vec2,
    motion: ItemMotion,
}

impl DraggableItem {
    pub fn new(name: impl Into<String>, position: Vec3, half_extents: Vec2) -> Self {
        Self {
            name: name.into(),
            kind: None,
            position,
            half_extents,
            color: [230, 230, 230, 255],
            base_sorting_order: 0,
            sorting_order: 0,
            drag_layer: 0,
            raise_while_dragged: true,
            can_drag: true,
            follow: FollowMode::Snap,
            restore_point: position,
            follow_target: position,
            velocity: Vec2::ZERO,
            motion: ItemMotion::Resting,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_color(mut self, color: [u8; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn with_follow(mut self, follow: FollowMode) -> Self {
        self.follow = follow;
        self
    }

    pub fn with_drag_layer(mut self, drag_layer: i32) -> Self {
        self.drag_layer = drag_layer;
        self
    }

    pub fn with_sorting_order(mut self, sorting_order: i32) -> Self {
        self.base_sorting_order = sorting_order;
        self.sorting_order = sorting_order;
        self
    }

    pub fn with_raise_while_dragged(mut self, raise: bool) -> Self {
        self.raise_while_dragged = raise;
        self
    }

    pub fn locked(mut self) -> Self {
        self.can_drag = false;
        self
    }

    pub fn set_can_drag(&mut self, can_drag: bool) {
        self.can_drag = can_drag;
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn follow(&self) -> FollowMode {
        self.follow
    }

    pub fn motion(&self) -> ItemMotion {
        self.motion
    }

    pub fn restore_point(&self) -> Vec3 {
        self.restore_point
    }

    pub fn set_restore_point(&mut self, restore_point: Vec3) {
        self.restore_point = restore_point;
    }

    /// Last position commanded by the drag, which a smoothed item may still be chasing.
    pub fn follow_target(&self) -> Vec3 {
        self.follow_target
    }

    /// Sends the item back to its restore point: instantly when snapping, at
    /// `return_speed` when smoothed.
    pub fn return_to_restore_point(&mut self) {
        self.velocity = Vec2::ZERO;
        self.follow_target = self.restore_point;
        match self.follow {
            FollowMode::Snap => {
                self.position = self.restore_point;
                self.motion = ItemMotion::Resting;
            }
            FollowMode::Smoothed(_) => self.motion = ItemMotion::Returning,
        }
    }

    pub fn place_at(&mut self, position: Vec3) {
        self.position = position;
        self.follow_target = position;
        self.velocity = Vec2::ZERO;
        self.motion = ItemMotion::Resting;
    }
}

impl Draggable for DraggableItem {
    fn can_drag(&self) -> bool {
        self.can_drag
    }

    fn drag_layer(&self) -> i32 {
        self.drag_layer
    }

    fn item_kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    fn on_begin_drag(&mut self, _input_position: Vec2) -> CallbackResult {
        self.restore_point = self.position;
        self.follow_target = self.position;
        self.velocity = Vec2::ZERO;
        self.motion = ItemMotion::Following;
        if self.raise_while_dragged {
            self.sorting_order = DRAGGED_SORTING_ORDER + self.drag_layer;
        }
        Ok(())
    }

    fn on_drag(
        &mut self,
        _input_position: Vec2,
        new_position: Vec3,
        _offset: Vec3,
    ) -> CallbackResult {
        self.follow_target = self.position.with_planar(new_position.planar());
        if self.follow == FollowMode::Snap {
            self.position = self.follow_target;
        }
        Ok(())
    }

    fn on_end_drag(
        &mut self,
        _input_position: Vec2,
        _position: Vec3,
        succeeded: bool,
    ) -> CallbackResult {
        self.sorting_order = self.base_sorting_order;
        if succeeded {
            match self.follow {
                FollowMode::Snap => {
                    let settled = self.follow_target;
                    self.place_at(settled);
                }
                FollowMode::Smoothed(_) => self.motion = ItemMotion::Settling,
            }
        } else {
            self.return_to_restore_point();
        }
        Ok(())
    }
}

impl SceneEntity for DraggableItem {
    fn debug_name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.place_at(position);
    }

    fn half_extents(&self) -> Vec2 {
        self.half_extents
    }

    fn sorting_order(&self) -> i32 {
        self.sorting_order
    }

    fn appearance(&self) -> Appearance {
        Appearance {
            color: self.color,
            style: AppearanceStyle::Filled,
            highlighted: self.motion == ItemMotion::Following,
        }
    }

    fn tick(&mut self, fixed_dt_seconds: f32) {
        let FollowMode::Smoothed(smooth) = self.follow else {
            return;
        };
        let current = self.position.planar();
        match self.motion {
            ItemMotion::Resting => {}
            ItemMotion::Following => {
                let target = self.follow_target.planar();
                if current.distance(target) <= smooth.dead_zone {
                    self.velocity = Vec2::ZERO;
                    return;
                }
                let next = smooth_damp(
                    current,
                    target,
                    &mut self.velocity,
                    smooth.smooth_time,
                    smooth.max_speed,
                    fixed_dt_seconds,
                );
                self.position = self.position.with_planar(next);
            }
            ItemMotion::Settling => {
                let target = self.follow_target.planar();
                let next = smooth_damp(
                    current,
                    target,
                    &mut self.velocity,
                    smooth.smooth_time,
                    smooth.max_speed,
                    fixed_dt_seconds,
                );
                if next.distance(target) <= SETTLE_SNAP_DISTANCE {
                    let settled = self.follow_target;
                    self.place_at(settled);
                } else {
                    self.position = self.position.with_planar(next);
                }
            }
            ItemMotion::Returning => {
                let target = self.restore_point.planar();
                let next = move_towards(current, target, smooth.return_speed * fixed_dt_seconds);
                self.position = self.position.with_planar(next);
                if next == target {
                    self.motion = ItemMotion::Resting;
                }
            }
        }
    }

    fn as_draggable(&self) -> Option<&dyn Draggable> {
        Some(self)
    }

    fn as_draggable_mut(&mut self) -> Option<&mut dyn Draggable> {
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

    const DT: f32 = 1.0 / 60.0;

    fn item(follow: FollowMode) -> DraggableItem {
        DraggableItem::new("tomato", Vec3::new(1.0, 2.0, 5.0), Vec2::new(0.5, 0.5))
            .with_follow(follow)
            .with_drag_layer(3)
    }

    fn smoothed() -> SmoothFollow {
        SmoothFollow {
            smooth_time: 0.05,
            max_speed: 100.0,
            dead_zone: 0.05,
            return_speed: 10.0,
        }
    }

    #[test]
    fn snap_follows_in_plane_and_keeps_depth() {
        let mut tomato = item(FollowMode::Snap);
        tomato.on_begin_drag(Vec2::ZERO).expect("begin");
        tomato
            .on_drag(Vec2::ZERO, Vec3::new(4.0, 6.0, -9.0), Vec3::new(3.0, 4.0, 0.0))
            .expect("drag");

        assert_eq!(tomato.position(), Vec3::new(4.0, 6.0, 5.0));
    }

    #[test]
    fn dragging_raises_sorting_order_until_release() {
        let mut tomato = item(FollowMode::Snap).with_sorting_order(2);
        tomato.on_begin_drag(Vec2::ZERO).expect("begin");
        assert_eq!(tomato.sorting_order(), DRAGGED_SORTING_ORDER + 3);
        assert!(tomato.appearance().highlighted);

        tomato.on_end_drag(Vec2::ZERO, tomato.position(), true).expect("end");
        assert_eq!(tomato.sorting_order(), 2);
        assert!(!tomato.appearance().highlighted);
    }

    #[test]
    fn failed_snap_drag_returns_to_restore_point() {
        let mut tomato = item(FollowMode::Snap);
        tomato.on_begin_drag(Vec2::ZERO).expect("begin");
        tomato
            .on_drag(Vec2::ZERO, Vec3::new(1.2, 2.1, 5.0), Vec3::ZERO)
            .expect("drag");
        tomato.on_end_drag(Vec2::ZERO, tomato.position(), false).expect("end");

        assert_eq!(tomato.position(), Vec3::new(1.0, 2.0, 5.0));
        assert_eq!(tomato.motion(), ItemMotion::Resting);
    }

    #[test]
    fn smoothed_item_converges_on_commanded_target() {
        let mut tomato = item(FollowMode::Smoothed(smoothed()));
        tomato.on_begin_drag(Vec2::ZERO).expect("begin");
        tomato
            .on_drag(Vec2::ZERO, Vec3::new(6.0, 2.0, 5.0), Vec3::ZERO)
            .expect("drag");
        assert_eq!(tomato.position(), Vec3::new(1.0, 2.0, 5.0));

        for _ in 0..120 {
            tomato.tick(DT);
        }
        let gap = tomato.position().planar().distance(Vec2::new(6.0, 2.0));
        assert!(gap <= smoothed().dead_zone);
    }

    #[test]
    fn smoothed_item_ignores_moves_inside_dead_zone() {
        let mut tomato = item(FollowMode::Smoothed(smoothed()));
        tomato.on_begin_drag(Vec2::ZERO).expect("begin");
        tomato
            .on_drag(Vec2::ZERO, Vec3::new(1.03, 2.0, 5.0), Vec3::ZERO)
            .expect("drag");
        tomato.tick(DT);

        assert_eq!(tomato.position(), Vec3::new(1.0, 2.0, 5.0));
    }

    #[test]
    fn successful_smoothed_release_eases_onto_target() {
        let mut tomato = item(FollowMode::Smoothed(smoothed()));
        tomato.on_begin_drag(Vec2::ZERO).expect("begin");
        tomato
            .on_drag(Vec2::ZERO, Vec3::new(3.0, 3.0, 5.0), Vec3::ZERO)
            .expect("drag");
        tomato.tick(DT);
        let released_at = tomato.position();
        tomato.on_end_drag(Vec2::ZERO, released_at, true).expect("end");

        assert_eq!(tomato.motion(), ItemMotion::Settling);
        assert_eq!(tomato.position(), released_at);
        assert_eq!(tomato.sorting_order(), 0);

        tomato.tick(DT);
        let after_one_tick = tomato.position();
        assert_ne!(after_one_tick, Vec3::new(3.0, 3.0, 5.0));
        assert!(
            after_one_tick.planar().distance(Vec2::new(3.0, 3.0))
                < released_at.planar().distance(Vec2::new(3.0, 3.0))
        );

        for _ in 0..240 {
            tomato.tick(DT);
        }
        assert_eq!(tomato.position(), Vec3::new(3.0, 3.0, 5.0));
        assert_eq!(tomato.motion(), ItemMotion::Resting);
    }

    #[test]
    fn successful_snap_release_rests_immediately() {
        let mut tomato = item(FollowMode::Snap);
        tomato.on_begin_drag(Vec2::ZERO).expect("begin");
        tomato
            .on_drag(Vec2::ZERO, Vec3::new(3.0, 3.0, 5.0), Vec3::ZERO)
            .expect("drag");
        tomato.on_end_drag(Vec2::ZERO, tomato.position(), true).expect("end");

        assert_eq!(tomato.position(), Vec3::new(3.0, 3.0, 5.0));
        assert_eq!(tomato.motion(), ItemMotion::Resting);
    }

    #[test]
    fn failed_smoothed_release_returns_at_constant_speed() {
        let mut tomato = item(FollowMode::Smoothed(smoothed()));
        tomato.on_begin_drag(Vec2::ZERO).expect("begin");
        tomato.place_at(Vec3::new(6.0, 2.0, 5.0));
        tomato.on_end_drag(Vec2::ZERO, tomato.position(), false).expect("end");
        assert_eq!(tomato.motion(), ItemMotion::Returning);

        tomato.tick(0.1);
        assert!((tomato.position().x - 5.0).abs() < 1e-4);
        for _ in 0..10 {
            tomato.tick(0.1);
        }
        assert_eq!(tomato.position(), Vec3::new(1.0, 2.0, 5.0));
        assert_eq!(tomato.motion(), ItemMotion::Resting);
    }

    #[test]
    fn locked_item_reports_not_draggable() {
        let crate_lid = DraggableItem::new("lid", Vec3::ZERO, Vec2::new(1.0, 1.0)).locked();
        assert!(!crate_lid.can_drag());
    }
}
