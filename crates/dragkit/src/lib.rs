//! Pointer-driven drag and drop for 2D scenes.
//!
//! `interaction` holds the drag state machine and the capability traits entities opt
//! into. `items` provides ready-made draggable items and drop slots. `app` owns the
//! scene world, pointer collection, rendering and the fixed-step loop.

pub mod app;
pub mod interaction;
pub mod items;

pub use app::{
    run_app, AppError, Camera2D, CameraView, EntityHandle, EntityRegistry, LoopConfig,
    PointerCollector, PointerDevice, PointerPhase, PointerSample, Renderer, Scene, SceneEntity,
    SceneWorld, TickDriver, Vec2, Vec3, Viewport, PIXELS_PER_WORLD,
};
pub use interaction::{
    load_drag_config, BeginOutcome, CallbackFault, CallbackResult, ConfigError, DragConfig,
    DragController, DragError, DragEvent, DragEventBus, DragEventKind, DragPhase, DragServices,
    DragSubject, Draggable, DropOutcome, DropTarget, EndReport, EventChannel, HitFilter,
    HitTester, SampleOutcome, ScreenProjection, UpdateOutcome,
};
pub use items::{DraggableItem, DropSlot, FollowMode, SmoothFollow};
