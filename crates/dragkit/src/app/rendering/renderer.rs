use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::{AppearanceStyle, Camera2D, EntityHandle, EntityRegistry, SceneWorld, Vec2};

use super::transform::camera_pixels_per_world;
use super::{world_to_screen_px, Viewport};

const CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];
const GRID_CELL_WORLD: f32 = 1.0;
const GRID_MAJOR_EVERY: i32 = 5;
const GRID_MINOR_COLOR: [u8; 4] = [35, 39, 46, 255];
const GRID_MAJOR_COLOR: [u8; 4] = [52, 58, 70, 255];
const HOVER_HIGHLIGHT_COLOR: [u8; 4] = [255, 210, 70, 255];
const HIGHLIGHT_PADDING_PX: i32 = 3;

type DrawEntry = (i32, u64, EntityHandle);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScreenRectPx {
    left: i32,
    right: i32,
    top: i32,
    bottom: i32,
}

impl ScreenRectPx {
    fn padded(self, padding: i32) -> Self {
        Self {
            left: self.left - padding,
            right: self.right + padding,
            top: self.top - padding,
            bottom: self.bottom + padding,
        }
    }
}

/// Placeholder renderer: grid, then every entity as a flat rectangle in draw order.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    draw_order: Vec<DrawEntry>,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            draw_order: Vec::new(),
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }

        let viewport = self.viewport;
        let draw_order = &mut self.draw_order;
        let frame = self.pixels.frame_mut();
        for chunk in frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&CLEAR_COLOR);
        }
        draw_world_grid(frame, viewport, world.camera());
        draw_entities(frame, viewport, world, draw_order);

        self.pixels.render()
    }
}

fn draw_entities(
    frame: &mut [u8],
    viewport: Viewport,
    world: &SceneWorld,
    draw_order: &mut Vec<DrawEntry>,
) {
    let entities = world.entities();
    collect_draw_order(entities, draw_order);
    let pixels_per_world = camera_pixels_per_world(world.camera());

    for &(_, _, handle) in draw_order.iter() {
        let Some(entity) = entities.get(handle) else {
            continue;
        };
        let (cx, cy) = world_to_screen_px(entity.position().planar(), world.camera(), viewport);
        let half = entity.half_extents().scale(pixels_per_world);
        let rect = screen_rect(cx, cy, half);
        let appearance = entity.appearance();

        match appearance.style {
            AppearanceStyle::Filled => draw_rect(frame, viewport, rect, appearance.color),
            AppearanceStyle::Outline => draw_rect_outline(frame, viewport, rect, appearance.color),
        }
        if appearance.highlighted {
            draw_rect_outline(
                frame,
                viewport,
                rect.padded(HIGHLIGHT_PADDING_PX),
                HOVER_HIGHLIGHT_COLOR,
            );
        }
    }
}

/// Back to front: lower sorting order first, then older spawns.
fn collect_draw_order(entities: &EntityRegistry, out: &mut Vec<DrawEntry>) {
    out.clear();
    for (handle, entity) in entities.iter() {
        let spawn_order = entities.spawn_order(handle).unwrap_or_default();
        out.push((entity.sorting_order(), spawn_order, handle));
    }
    out.sort_unstable_by_key(|(sorting_order, spawn_order, _)| (*sorting_order, *spawn_order));
}

fn screen_rect(cx: i32, cy: i32, half_px: Vec2) -> ScreenRectPx {
    let half_w = half_px.x.round() as i32;
    let half_h = half_px.y.round() as i32;
    ScreenRectPx {
        left: cx - half_w,
        right: cx + half_w,
        top: cy - half_h,
        bottom: cy + half_h,
    }
}

fn draw_world_grid(frame: &mut [u8], viewport: Viewport, camera: &Camera2D) {
    let pixels_per_world = camera_pixels_per_world(camera);
    let half_w_world = viewport.width as f32 / (2.0 * pixels_per_world);
    let half_h_world = viewport.height as f32 / (2.0 * pixels_per_world);
    let ix_start = ((camera.position.x - half_w_world) / GRID_CELL_WORLD).floor() as i32 - 1;
    let ix_end = ((camera.position.x + half_w_world) / GRID_CELL_WORLD).ceil() as i32 + 1;
    let iy_start = ((camera.position.y - half_h_world) / GRID_CELL_WORLD).floor() as i32 - 1;
    let iy_end = ((camera.position.y + half_h_world) / GRID_CELL_WORLD).ceil() as i32 + 1;

    for ix in ix_start..=ix_end {
        let world = Vec2::new(ix as f32 * GRID_CELL_WORLD, camera.position.y);
        let (screen_x, _) = world_to_screen_px(world, camera, viewport);
        draw_vertical_line_clipped(frame, viewport, screen_x, grid_color(ix));
    }
    for iy in iy_start..=iy_end {
        let world = Vec2::new(camera.position.x, iy as f32 * GRID_CELL_WORLD);
        let (_, screen_y) = world_to_screen_px(world, camera, viewport);
        draw_horizontal_line_clipped(frame, viewport, screen_y, grid_color(iy));
    }
}

fn grid_color(index: i32) -> [u8; 4] {
    if index.rem_euclid(GRID_MAJOR_EVERY) == 0 {
        GRID_MAJOR_COLOR
    } else {
        GRID_MINOR_COLOR
    }
}

fn draw_vertical_line_clipped(frame: &mut [u8], viewport: Viewport, x: i32, color: [u8; 4]) {
    if x < 0 || x >= viewport.width as i32 {
        return;
    }
    for y in 0..viewport.height as i32 {
        write_pixel_rgba_clipped(frame, viewport, x, y, color);
    }
}

fn draw_horizontal_line_clipped(frame: &mut [u8], viewport: Viewport, y: i32, color: [u8; 4]) {
    if y < 0 || y >= viewport.height as i32 {
        return;
    }
    for x in 0..viewport.width as i32 {
        write_pixel_rgba_clipped(frame, viewport, x, y, color);
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], viewport: Viewport, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x >= viewport.width as i32 || y >= viewport.height as i32 {
        return;
    }
    let width = viewport.width as usize;
    let Some(pixel_offset) = (y as usize)
        .checked_mul(width)
        .and_then(|row| row.checked_add(x as usize))
    else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}

fn draw_rect(frame: &mut [u8], viewport: Viewport, rect: ScreenRectPx, color: [u8; 4]) {
    let left = rect.left.max(0);
    let right = rect.right.min(viewport.width as i32 - 1);
    let top = rect.top.max(0);
    let bottom = rect.bottom.min(viewport.height as i32 - 1);
    for y in top..=bottom {
        for x in left..=right {
            write_pixel_rgba_clipped(frame, viewport, x, y, color);
        }
    }
}

fn draw_rect_outline(frame: &mut [u8], viewport: Viewport, rect: ScreenRectPx, color: [u8; 4]) {
    for x in rect.left..=rect.right {
        write_pixel_rgba_clipped(frame, viewport, x, rect.top, color);
        write_pixel_rgba_clipped(frame, viewport, x, rect.bottom, color);
    }
    for y in rect.top..=rect.bottom {
        write_pixel_rgba_clipped(frame, viewport, rect.left, y, color);
        write_pixel_rgba_clipped(frame, viewport, rect.right, y, color);
    }
}
