use std::any::Any;
use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::interaction::{DragEvent, Draggable, DropTarget};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }

    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// World-space point. `z` is the draw depth; dragging only moves `x`/`y`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn planar(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn with_planar(self, planar: Vec2) -> Self {
        Self {
            x: planar.x,
            y: planar.y,
            z: self.z,
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

pub const CAMERA_ZOOM_DEFAULT: f32 = 1.0;
pub const CAMERA_ZOOM_MIN: f32 = 0.5;
pub const CAMERA_ZOOM_MAX: f32 = 2.0;

#[derive(Debug, Clone, Copy)]
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            position: Vec2::default(),
            zoom: CAMERA_ZOOM_DEFAULT,
        }
    }
}

impl Camera2D {
    pub fn effective_zoom(&self) -> f32 {
        clamp_camera_zoom(self.zoom)
    }

    pub fn set_zoom_clamped(&mut self, zoom: f32) {
        self.zoom = clamp_camera_zoom(zoom);
    }
}

fn clamp_camera_zoom(zoom: f32) -> f32 {
    if !zoom.is_finite() {
        return CAMERA_ZOOM_DEFAULT;
    }
    zoom.clamp(CAMERA_ZOOM_MIN, CAMERA_ZOOM_MAX)
}

/// Handle into an [`EntityRegistry`]. A handle outlives its entity safely: once the slot
/// is freed (and possibly reused) the old handle resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityHandle {
    index: u32,
    generation: u32,
}

impl EntityHandle {
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppearanceStyle {
    Filled,
    Outline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appearance {
    pub color: [u8; 4],
    pub style: AppearanceStyle,
    pub highlighted: bool,
}

/// Anything living in the scene. Drag capabilities are opt-in through the `as_*`
/// accessors; the defaults mean "not draggable, not a drop target".
pub trait SceneEntity: Any {
    fn debug_name(&self) -> &str;
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    /// Half size of the axis-aligned bounds in world units.
    fn half_extents(&self) -> Vec2;
    fn sorting_order(&self) -> i32 {
        0
    }
    fn appearance(&self) -> Appearance;
    fn tick(&mut self, _fixed_dt_seconds: f32) {}
    fn as_draggable(&self) -> Option<&dyn Draggable> {
        None
    }
    fn as_draggable_mut(&mut self) -> Option<&mut dyn Draggable> {
        None
    }
    fn as_drop_target(&self) -> Option<&dyn DropTarget> {
        None
    }
    fn as_drop_target_mut(&mut self) -> Option<&mut dyn DropTarget> {
        None
    }
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct Occupant {
    entity: Box<dyn SceneEntity>,
    spawn_order: u64,
}

struct EntitySlot {
    generation: u32,
    occupant: Option<Occupant>,
}

#[derive(Default)]
pub struct EntityRegistry {
    slots: Vec<EntitySlot>,
    free_indices: Vec<u32>,
    next_spawn_order: u64,
    live_count: usize,
}

impl fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("slots", &self.slots.len())
            .field("live_count", &self.live_count)
            .finish()
    }
}

impl EntityRegistry {
    pub fn spawn(&mut self, entity: Box<dyn SceneEntity>) -> EntityHandle {
        let spawn_order = self.next_spawn_order;
        self.next_spawn_order = self.next_spawn_order.saturating_add(1);
        self.live_count += 1;

        if let Some(index) = self.free_indices.pop() {
            let slot = &mut self.slots[index as usize];
            slot.occupant = Some(Occupant {
                entity,
                spawn_order,
            });
            return EntityHandle {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(EntitySlot {
            generation: 0,
            occupant: Some(Occupant {
                entity,
                spawn_order,
            }),
        });
        EntityHandle {
            index,
            generation: 0,
        }
    }

    pub fn despawn(&mut self, handle: EntityHandle) -> Option<Box<dyn SceneEntity>> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let occupant = slot.occupant.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_indices.push(handle.index);
        self.live_count -= 1;
        Some(occupant.entity)
    }

    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.occupant(handle).is_some()
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&(dyn SceneEntity + 'static)> {
        self.occupant(handle).map(|occupant| occupant.entity.as_ref())
    }

    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut (dyn SceneEntity + 'static)> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.occupant
            .as_mut()
            .map(|occupant| occupant.entity.as_mut())
    }

    pub fn get_typed<T: SceneEntity>(&self, handle: EntityHandle) -> Option<&T> {
        self.get(handle)?.as_any().downcast_ref::<T>()
    }

    pub fn get_typed_mut<T: SceneEntity>(&mut self, handle: EntityHandle) -> Option<&mut T> {
        self.get_mut(handle)?.as_any_mut().downcast_mut::<T>()
    }

    pub fn spawn_order(&self, handle: EntityHandle) -> Option<u64> {
        self.occupant(handle).map(|occupant| occupant.spawn_order)
    }

    pub fn len(&self) -> usize {
        self.live_count
    }

    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityHandle, &(dyn SceneEntity + 'static))> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.occupant.as_ref().map(|occupant| {
                (
                    EntityHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    occupant.entity.as_ref(),
                )
            })
        })
    }

    pub fn tick_all(&mut self, fixed_dt_seconds: f32) {
        for slot in &mut self.slots {
            if let Some(occupant) = slot.occupant.as_mut() {
                occupant.entity.tick(fixed_dt_seconds);
            }
        }
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.occupant.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        self.free_indices = (0..self.slots.len() as u32).rev().collect();
        self.live_count = 0;
    }

    fn occupant(&self, handle: EntityHandle) -> Option<&Occupant> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.occupant.as_ref()
    }
}

#[derive(Debug, Default)]
pub struct SceneWorld {
    entities: EntityRegistry,
    camera: Camera2D,
}

impl SceneWorld {
    pub fn spawn(&mut self, entity: Box<dyn SceneEntity>) -> EntityHandle {
        self.entities.spawn(entity)
    }

    pub fn despawn(&mut self, handle: EntityHandle) -> bool {
        self.entities.despawn(handle).is_some()
    }

    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut EntityRegistry {
        &mut self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    pub fn tick(&mut self, fixed_dt_seconds: f32) {
        self.entities.tick_all(fixed_dt_seconds);
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.camera = Camera2D::default();
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    /// Called after each pointer sample with the events that sample posted, before the
    /// next sample reaches the controller. Several samples can land in one tick, so
    /// state that a later sample depends on belongs here rather than in `update`.
    fn on_drag_events(&mut self, _events: &[DragEvent], _world: &mut SceneWorld) {}
    /// `events` holds every drag event posted during this tick, in posting order.
    fn update(&mut self, fixed_dt_seconds: f32, events: &[DragEvent], world: &mut SceneWorld);
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
}
