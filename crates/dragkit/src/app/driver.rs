use tracing::{debug, info};

use crate::interaction::{DragConfig, DragController, DragEventBus, DragServices, SampleOutcome};

use super::{CameraView, PointerSample, Scene, SceneWorld, Viewport};

/// Owns everything one scene needs and runs it one fixed tick at a time. The windowed
/// loop and the headless replay both drive the scene through this type.
pub struct TickDriver {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    controller: DragController,
    bus: DragEventBus,
    viewport: Viewport,
    tick_count: u64,
    loaded: bool,
}

impl TickDriver {
    pub fn new(scene: Box<dyn Scene>, config: DragConfig, viewport: Viewport) -> Self {
        Self {
            scene,
            world: SceneWorld::default(),
            controller: DragController::new(config),
            bus: DragEventBus::default(),
            viewport,
            tick_count: 0,
            loaded: false,
        }
    }

    pub fn load(&mut self) {
        if self.loaded {
            return;
        }
        self.scene.load(&mut self.world);
        self.loaded = true;
        info!(entity_count = self.world.entity_count(), "scene_loaded");
    }

    /// Feeds `samples` to the drag controller one at a time, handing each sample's
    /// events to the scene before the next runs. Then advances entities and lets the
    /// scene see every event posted during the tick.
    pub fn run_tick(&mut self, fixed_dt_seconds: f32, samples: &[PointerSample]) -> Vec<SampleOutcome> {
        let mut outcomes = Vec::with_capacity(samples.len());
        for sample in samples {
            let first_event = self.bus.current_tick_events().len();
            let view = CameraView::new(*self.world.camera(), self.viewport);
            {
                let mut services =
                    DragServices::new(self.world.entities_mut(), &view, &view, &mut self.bus);
                outcomes.push(self.controller.handle_sample(&mut services, *sample));
            }
            self.notify_scene(first_event);
        }

        self.world.tick(fixed_dt_seconds);
        self.scene
            .update(fixed_dt_seconds, self.bus.current_tick_events(), &mut self.world);
        self.bus.finish_tick_rollover();
        self.tick_count = self.tick_count.saturating_add(1);

        let counts = self.bus.last_tick_counts();
        if counts.total > 0 {
            debug!(
                tick = self.tick_count,
                events = counts.total,
                started = counts.started,
                ended = counts.ended,
                dropped = counts.dropped,
                "drag_events_flushed"
            );
        }
        outcomes
    }

    /// Cancels any drag still in progress and unloads the scene.
    pub fn shutdown(&mut self) {
        if !self.loaded {
            return;
        }
        let view = CameraView::new(*self.world.camera(), self.viewport);
        let first_event = self.bus.current_tick_events().len();
        let cancelled = {
            let mut services =
                DragServices::new(self.world.entities_mut(), &view, &view, &mut self.bus);
            self.controller.cancel_drag(&mut services)
        };
        if let Some(report) = cancelled {
            info!(draggable = %report.draggable, "drag_cancelled_on_shutdown");
            self.notify_scene(first_event);
            self.scene.update(0.0, self.bus.current_tick_events(), &mut self.world);
        }
        self.bus.finish_tick_rollover();

        self.scene.unload(&mut self.world);
        self.world.clear();
        self.loaded = false;
        info!(ticks = self.tick_count, "scene_unloaded");
    }

    fn notify_scene(&mut self, first_event: usize) {
        let posted = self.bus.current_tick_events().get(first_event..).unwrap_or_default();
        if !posted.is_empty() {
            self.scene.on_drag_events(posted, &mut self.world);
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_drag_config(&mut self, config: DragConfig) {
        self.controller.set_config(config);
    }

    pub fn world(&self) -> &SceneWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut SceneWorld {
        &mut self.world
    }

    pub fn controller(&self) -> &DragController {
        &self.controller
    }

    pub fn bus(&self) -> &DragEventBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut DragEventBus {
        &mut self.bus
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn debug_title(&self) -> Option<String> {
        self.scene.debug_title(&self.world)
    }
}
