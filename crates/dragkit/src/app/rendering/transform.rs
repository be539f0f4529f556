use crate::app::{Camera2D, Vec2, Vec3};
use crate::interaction::ScreenProjection;

pub const PIXELS_PER_WORLD: f32 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

pub fn camera_pixels_per_world(camera: &Camera2D) -> f32 {
    PIXELS_PER_WORLD * camera.effective_zoom()
}

pub fn world_to_screen(world: Vec2, camera: &Camera2D, viewport: Viewport) -> Vec2 {
    let pixels_per_world = camera_pixels_per_world(camera);
    Vec2 {
        x: (world.x - camera.position.x) * pixels_per_world + viewport.width as f32 * 0.5,
        y: viewport.height as f32 * 0.5 - (world.y - camera.position.y) * pixels_per_world,
    }
}

pub fn world_to_screen_px(world: Vec2, camera: &Camera2D, viewport: Viewport) -> (i32, i32) {
    let screen = world_to_screen(world, camera, viewport);
    (screen.x.round() as i32, screen.y.round() as i32)
}

/// Orthographic inverse of [`world_to_screen`]; the result lies on the plane at `depth`.
pub fn screen_to_world(screen: Vec2, depth: f32, camera: &Camera2D, viewport: Viewport) -> Vec3 {
    let pixels_per_world = camera_pixels_per_world(camera);
    Vec3 {
        x: (screen.x - viewport.width as f32 * 0.5) / pixels_per_world + camera.position.x,
        y: (viewport.height as f32 * 0.5 - screen.y) / pixels_per_world + camera.position.y,
        z: depth,
    }
}

/// Camera state frozen for one tick. Serves as both projection and hit tester.
#[derive(Debug, Clone, Copy)]
pub struct CameraView {
    pub camera: Camera2D,
    pub viewport: Viewport,
}

impl CameraView {
    pub fn new(camera: Camera2D, viewport: Viewport) -> Self {
        Self { camera, viewport }
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world_to_screen(world, &self.camera, self.viewport)
    }

    pub fn pixels_per_world(&self) -> f32 {
        camera_pixels_per_world(&self.camera)
    }
}

impl ScreenProjection for CameraView {
    fn screen_to_world(&self, screen: Vec2, reference_depth: f32) -> Vec3 {
        screen_to_world(screen, reference_depth, &self.camera, self.viewport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 800,
        height: 600,
    };

    #[test]
    fn origin_maps_to_viewport_center() {
        let (x, y) = world_to_screen_px(Vec2::ZERO, &Camera2D::default(), VIEWPORT);
        assert_eq!(x, 400);
        assert_eq!(y, 300);
    }

    #[test]
    fn camera_offset_and_zoom_shift_screen_position() {
        let camera = Camera2D {
            position: Vec2 { x: 10.0, y: -5.0 },
            zoom: 2.0,
        };
        let (x, y) = world_to_screen_px(Vec2 { x: 11.0, y: -4.0 }, &camera, VIEWPORT);
        assert_eq!(x, 464);
        assert_eq!(y, 236);
    }

    #[test]
    fn screen_to_world_keeps_reference_depth() {
        let view = CameraView::new(Camera2D::default(), VIEWPORT);
        let world = view.screen_to_world(Vec2::new(432.0, 268.0), -3.5);

        assert!((world.x - 1.0).abs() < 0.0001);
        assert!((world.y - 1.0).abs() < 0.0001);
        assert_eq!(world.z, -3.5);
    }

    #[test]
    fn screen_delta_maps_to_world_delta_scaled_by_zoom() {
        let camera = Camera2D {
            position: Vec2 { x: 3.0, y: 3.0 },
            zoom: 0.5,
        };
        let view = CameraView::new(camera, VIEWPORT);
        let start = view.screen_to_world(Vec2::new(100.0, 100.0), 0.0);
        let end = view.screen_to_world(Vec2::new(132.0, 100.0), 0.0);

        assert!((end.x - start.x - 2.0).abs() < 0.0001);
        assert!((end.y - start.y).abs() < 0.0001);
    }
}
