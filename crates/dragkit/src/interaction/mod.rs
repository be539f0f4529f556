mod capability;
mod config;
mod controller;
mod events;
mod session;

pub use capability::{CallbackFault, CallbackResult, DragPhase, DragSubject, Draggable, DropTarget};
pub use config::{
    load_drag_config, ConfigError, DragConfig, DEFAULT_DRAG_THRESHOLD_PX, DETAILED_LOG_ENV_VAR,
    DRAG_THRESHOLD_ENV_VAR,
};
pub use controller::{
    BeginOutcome, Collaborator, DragController, DragError, DragServices, DropOutcome, EndReport,
    ResolutionMiss, SampleOutcome, UpdateOutcome,
};
pub use events::{
    DragEvent, DragEventBus, DragEventCounts, DragEventKind, EventChannel, SubscriptionId,
};
pub use hit_test::{HitFilter, HitTester, ScreenProjection};
pub use session::DragSession;
