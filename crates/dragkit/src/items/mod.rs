mod draggable_item;
mod drop_slot;
mod follow;

pub use draggable_item::{DraggableItem, FollowMode, ItemMotion, SmoothFollow, DRAGGED_SORTING_ORDER};
pub use drop_slot::{DropSlot, ANY_ITEM_KIND};
pub use follow::{move_towards, smooth_damp};
