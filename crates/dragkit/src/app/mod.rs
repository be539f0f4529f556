mod driver;
mod input;
mod loop_runner;
mod rendering;
mod scene;

pub use driver::TickDriver;
pub use input::{PointerCollector, PointerDevice, PointerPhase, PointerSample};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::{
    camera_pixels_per_world, screen_to_world, world_to_screen, world_to_screen_px, CameraView,
    Renderer, Viewport, PIXELS_PER_WORLD,
};
pub use scene::{
    Appearance, AppearanceStyle, Camera2D, EntityHandle, EntityRegistry, Scene, SceneEntity,
    SceneWorld, Vec2, Vec3, CAMERA_ZOOM_DEFAULT, CAMERA_ZOOM_MAX, CAMERA_ZOOM_MIN,
};
