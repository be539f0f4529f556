use std::fmt;

use thiserror::Error;

use crate::app::{EntityHandle, SceneEntity, Vec2, Vec3};

/// Failure raised by an entity callback. The controller logs it and carries on with the
/// neutral value for that callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CallbackFault {
    message: String,
}

impl CallbackFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type CallbackResult<T = ()> = Result<T, CallbackFault>;

/// Which collaborator callback was running when something went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    BeginDrag,
    Drag,
    EndDrag,
    DragEnter,
    DragExit,
    CanAccept,
    Accept,
}

impl DragPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BeginDrag => "begin_drag",
            Self::Drag => "drag",
            Self::EndDrag => "end_drag",
            Self::DragEnter => "drag_enter",
            Self::DragExit => "drag_exit",
            Self::CanAccept => "can_accept",
            Self::Accept => "accept",
        }
    }
}

impl fmt::Display for DragPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait Draggable {
    fn can_drag(&self) -> bool;
    /// Ordering hint only; the controller never branches on it.
    fn drag_layer(&self) -> i32 {
        0
    }
    /// Tag drop targets match against, e.g. `"vegetable"`.
    fn item_kind(&self) -> Option<&str> {
        None
    }
    fn on_begin_drag(&mut self, input_position: Vec2) -> CallbackResult;
    fn on_drag(
        &mut self,
        input_position: Vec2,
        new_position: Vec3,
        offset: Vec3,
    ) -> CallbackResult;
    fn on_end_drag(
        &mut self,
        input_position: Vec2,
        position: Vec3,
        succeeded: bool,
    ) -> CallbackResult;
}

pub trait DropTarget {
    fn target_type(&self) -> &str;
    fn can_accept(&self, _subject: &DragSubject) -> CallbackResult<bool> {
        Ok(true)
    }
    /// May return `Ok(false)` even after `can_accept` said yes.
    fn accept(&mut self, subject: &DragSubject) -> CallbackResult<bool>;
    fn on_drag_enter(&mut self, _subject: &DragSubject) -> CallbackResult {
        Ok(())
    }
    fn on_drag_exit(&mut self, _subject: &DragSubject) -> CallbackResult {
        Ok(())
    }
}

/// Snapshot of the dragged entity handed to drop targets.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSubject {
    pub handle: EntityHandle,
    pub debug_name: String,
    pub item_kind: Option<String>,
    pub drag_layer: i32,
    pub position: Vec3,
}

impl DragSubject {
    pub fn capture(handle: EntityHandle, entity: &dyn SceneEntity) -> Option<Self> {
        let draggable = entity.as_draggable()?;
        Some(Self {
            handle,
            debug_name: entity.debug_name().to_string(),
            item_kind: draggable.item_kind().map(ToString::to_string),
            drag_layer: draggable.drag_layer(),
            position: entity.position(),
        })
    }

    /// Stand-in for a dragged entity that no longer exists.
    pub fn detached(handle: EntityHandle, position: Vec3) -> Self {
        Self {
            handle,
            debug_name: String::from("<despawned>"),
            item_kind: None,
            drag_layer: 0,
            position,
        }
    }
}
