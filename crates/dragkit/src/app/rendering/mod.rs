mod renderer;
mod transform;

pub use renderer::Renderer;
pub use transform::{
    camera_pixels_per_world, screen_to_world, world_to_screen, world_to_screen_px, CameraView,
    Viewport, PIXELS_PER_WORLD,
};
