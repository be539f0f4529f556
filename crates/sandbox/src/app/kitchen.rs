use dragkit::app::{EntityHandle, Scene, SceneEntity, SceneWorld, Vec2, Vec3};
use dragkit::interaction::DragEvent;
use dragkit::items::{DraggableItem, DropSlot, FollowMode, SmoothFollow, ANY_ITEM_KIND};
use tracing::{debug, info};

const VEGETABLE: &str = "vegetable";
const ITEM_HALF_EXTENTS: Vec2 = Vec2::new(0.5, 0.5);
/// Above the stations, so a click on a placed item picks up the item.
const INGREDIENT_SORTING_ORDER: i32 = 1;

pub(crate) const TOMATO_HOME: Vec3 = Vec3::new(-6.0, -4.0, 0.0);
pub(crate) const CARROT_HOME: Vec3 = Vec3::new(-4.0, -4.0, 0.0);
pub(crate) const ONION_HOME: Vec3 = Vec3::new(-2.0, -4.0, 0.0);
pub(crate) const SALT_HOME: Vec3 = Vec3::new(0.0, -4.0, 0.0);
pub(crate) const CUTTING_BOARD_CENTER: Vec3 = Vec3::new(-4.0, 3.0, 0.0);
pub(crate) const POT_CENTER: Vec3 = Vec3::new(2.0, 3.0, 0.0);
pub(crate) const TRASH_CENTER: Vec3 = Vec3::new(6.0, -4.0, 0.0);

struct Ingredient {
    handle: EntityHandle,
    home: Vec3,
}

#[derive(Debug, Clone, Copy)]
struct Stations {
    cutting_board: EntityHandle,
    pot: EntityHandle,
    trash: EntityHandle,
}

impl Stations {
    fn all(self) -> [EntityHandle; 3] {
        [self.cutting_board, self.pot, self.trash]
    }
}

/// Ingredients along the bottom, stations above. Accepted items snap onto their
/// station, anything dropped elsewhere goes home, and the trash discards.
#[derive(Default)]
pub(crate) struct KitchenScene {
    ingredients: Vec<Ingredient>,
    stations: Option<Stations>,
    discarded: u32,
}

impl KitchenScene {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn home_of(&self, handle: EntityHandle) -> Option<Vec3> {
        self.ingredients
            .iter()
            .find(|ingredient| ingredient.handle == handle)
            .map(|ingredient| ingredient.home)
    }

    fn pick_up(&self, world: &mut SceneWorld, stations: Stations, item: EntityHandle) {
        for station in stations.all() {
            if let Some(slot) = world.entities_mut().get_typed_mut::<DropSlot>(station) {
                if slot.release(item) {
                    debug!(item = %item, station = %station, "item_left_station");
                }
            }
        }
        if let Some(home) = self.home_of(item) {
            if let Some(ingredient) = world.entities_mut().get_typed_mut::<DraggableItem>(item) {
                ingredient.set_restore_point(home);
            }
        }
    }

    fn place(
        &mut self,
        world: &mut SceneWorld,
        stations: Stations,
        item: EntityHandle,
        station: EntityHandle,
    ) {
        if station == stations.trash {
            world.despawn(item);
            if let Some(trash) = world.entities_mut().get_typed_mut::<DropSlot>(station) {
                trash.clear_occupants();
            }
            self.ingredients.retain(|ingredient| ingredient.handle != item);
            self.discarded = self.discarded.saturating_add(1);
            info!(item = %item, discarded = self.discarded, "item_discarded");
            return;
        }

        let anchor = world
            .entities()
            .get_typed::<DropSlot>(station)
            .and_then(|slot| slot.anchor_for(item));
        if let (Some(anchor), Some(ingredient)) = (
            anchor,
            world.entities_mut().get_typed_mut::<DraggableItem>(item),
        ) {
            ingredient.place_at(anchor);
            info!(item = %item, station = %station, "item_placed");
        }
    }

    fn occupancy(world: &SceneWorld, station: EntityHandle) -> (usize, usize) {
        world
            .entities()
            .get_typed::<DropSlot>(station)
            .map(|slot| (slot.occupants().len(), slot.capacity()))
            .unwrap_or((0, 0))
    }
}

impl Scene for KitchenScene {
    fn load(&mut self, world: &mut SceneWorld) {
        let smoothed = FollowMode::Smoothed(SmoothFollow::default());
        let ingredients = [
            DraggableItem::new("tomato", TOMATO_HOME, ITEM_HALF_EXTENTS)
                .with_kind(VEGETABLE)
                .with_color([220, 60, 50, 255])
                .with_sorting_order(INGREDIENT_SORTING_ORDER),
            DraggableItem::new("carrot", CARROT_HOME, ITEM_HALF_EXTENTS)
                .with_kind(VEGETABLE)
                .with_color([240, 140, 40, 255])
                .with_sorting_order(INGREDIENT_SORTING_ORDER)
                .with_follow(smoothed),
            DraggableItem::new("onion", ONION_HOME, ITEM_HALF_EXTENTS)
                .with_kind(VEGETABLE)
                .with_color([200, 180, 220, 255])
                .with_sorting_order(INGREDIENT_SORTING_ORDER)
                .with_drag_layer(1),
        ];
        for item in ingredients {
            let home = item.position();
            let handle = world.spawn(Box::new(item));
            self.ingredients.push(Ingredient { handle, home });
        }
        world.spawn(Box::new(
            DraggableItem::new("salt", SALT_HOME, ITEM_HALF_EXTENTS)
                .with_kind("seasoning")
                .with_color([245, 245, 245, 255])
                .with_sorting_order(INGREDIENT_SORTING_ORDER)
                .locked(),
        ));

        let cutting_board = world.spawn(Box::new(
            DropSlot::new("cutting_board", "station", CUTTING_BOARD_CENTER, Vec2::new(1.5, 1.0))
                .accepting(VEGETABLE)
                .with_color([150, 110, 70, 255]),
        ));
        let pot = world.spawn(Box::new(
            DropSlot::new("pot", "station", POT_CENTER, Vec2::new(2.0, 1.0))
                .accepting(VEGETABLE)
                .with_capacity(3)
                .with_color([90, 90, 110, 255]),
        ));
        let trash = world.spawn(Box::new(
            DropSlot::new("trash", "bin", TRASH_CENTER, Vec2::new(1.0, 1.0))
                .accepting(ANY_ITEM_KIND)
                .with_color([70, 120, 70, 255]),
        ));
        self.stations = Some(Stations {
            cutting_board,
            pot,
            trash,
        });
        info!(ingredients = self.ingredients.len(), "kitchen_loaded");
    }

    fn on_drag_events(&mut self, events: &[DragEvent], world: &mut SceneWorld) {
        let Some(stations) = self.stations else {
            return;
        };
        let mut placed = Vec::new();

        for event in events {
            match *event {
                DragEvent::Started { draggable, .. } => {
                    self.pick_up(world, stations, draggable);
                }
                DragEvent::Dropped {
                    draggable,
                    target,
                    succeeded: true,
                    ..
                } => {
                    self.place(world, stations, draggable, target);
                    placed.push(draggable);
                }
                DragEvent::Ended {
                    draggable,
                    succeeded: true,
                    ..
                } if !placed.contains(&draggable) => {
                    // A real drag that found no station: the item goes home.
                    let item = world
                        .entities_mut()
                        .get_typed_mut::<DraggableItem>(draggable);
                    if let Some(item) = item {
                        item.return_to_restore_point();
                    }
                }
                _ => {}
            }
        }
    }

    fn update(&mut self, _fixed_dt_seconds: f32, _events: &[DragEvent], _world: &mut SceneWorld) {}

    fn unload(&mut self, world: &mut SceneWorld) {
        info!(discarded = self.discarded, "kitchen_unloaded");
        self.ingredients.clear();
        self.stations = None;
        world.clear();
    }

    fn debug_title(&self, world: &SceneWorld) -> Option<String> {
        let stations = self.stations?;
        let (board, board_capacity) = Self::occupancy(world, stations.cutting_board);
        let (pot, pot_capacity) = Self::occupancy(world, stations.pot);
        Some(format!(
            "dragkit kitchen | board {board}/{board_capacity} | pot {pot}/{pot_capacity} | discarded {}",
            self.discarded
        ))
    }
}

#[cfg(test)]
mod tests {
    use dragkit::app::{PointerPhase, PointerSample, TickDriver, Viewport};
    use dragkit::interaction::DragConfig;

    use super::*;

    fn loaded() -> (KitchenScene, SceneWorld) {
        let mut scene = KitchenScene::new();
        let mut world = SceneWorld::default();
        scene.load(&mut world);
        (scene, world)
    }

    fn handle_named(world: &SceneWorld, name: &str) -> EntityHandle {
        world
            .entities()
            .iter()
            .find(|(_, entity)| entity.debug_name() == name)
            .map(|(handle, _)| handle)
            .expect("entity present")
    }

    #[test]
    fn load_spawns_ingredients_and_stations() {
        let (scene, world) = loaded();
        assert_eq!(world.entity_count(), 7);
        assert_eq!(scene.ingredients.len(), 3);
        assert_eq!(
            scene.debug_title(&world).as_deref(),
            Some("dragkit kitchen | board 0/1 | pot 0/3 | discarded 0")
        );
    }

    #[test]
    fn ended_without_accepted_drop_sends_item_home() {
        let (mut scene, mut world) = loaded();
        let tomato = handle_named(&world, "tomato");
        world
            .entities_mut()
            .get_mut(tomato)
            .expect("tomato")
            .set_position(Vec3::new(3.0, 3.0, 0.0));

        scene.on_drag_events(
            &[DragEvent::Ended {
                draggable: tomato,
                start_position: TOMATO_HOME,
                end_position: Vec3::new(3.0, 3.0, 0.0),
                end_input: Vec2::ZERO,
                distance: 200.0,
                succeeded: true,
            }],
            &mut world,
        );

        let item = world.entities().get(tomato).expect("tomato");
        assert_eq!(item.position(), TOMATO_HOME);
    }

    fn kitchen_driver() -> TickDriver {
        let mut driver = TickDriver::new(
            Box::new(KitchenScene::new()),
            DragConfig::default(),
            Viewport {
                width: 640,
                height: 480,
            },
        );
        driver.load();
        driver
    }

    fn mouse(phase: PointerPhase, x: f32, y: f32) -> PointerSample {
        PointerSample::mouse(phase, Vec2::new(x, y))
    }

    fn occupants(driver: &TickDriver, station: &str) -> Vec<EntityHandle> {
        let station = handle_named(driver.world(), station);
        driver
            .world()
            .entities()
            .get_typed::<DropSlot>(station)
            .map(|slot| slot.occupants().to_vec())
            .expect("station present")
    }

    fn position_of(driver: &TickDriver, name: &str) -> Vec3 {
        let handle = handle_named(driver.world(), name);
        driver.world().entities().get(handle).expect("entity").position()
    }

    // Tomato home is (128, 368) on screen, cutting board center (192, 144), pot center (384, 144).
    fn carry_tomato_to_board_in_one_tick(driver: &mut TickDriver) {
        driver.run_tick(
            1.0 / 60.0,
            &[
                mouse(PointerPhase::Down, 128.0, 368.0),
                mouse(PointerPhase::Move, 192.0, 144.0),
                mouse(PointerPhase::Up, 192.0, 144.0),
            ],
        );
    }

    #[test]
    fn whole_drag_inside_one_tick_keeps_station_occupancy() {
        let mut driver = kitchen_driver();
        let tomato = handle_named(driver.world(), "tomato");

        carry_tomato_to_board_in_one_tick(&mut driver);

        assert_eq!(occupants(&driver, "cutting_board"), vec![tomato]);
        assert_eq!(position_of(&driver, "tomato"), CUTTING_BOARD_CENTER);
        assert_eq!(
            driver.debug_title().as_deref(),
            Some("dragkit kitchen | board 1/1 | pot 0/3 | discarded 0")
        );
    }

    #[test]
    fn one_tick_click_on_placed_item_sends_it_home() {
        let mut driver = kitchen_driver();
        carry_tomato_to_board_in_one_tick(&mut driver);

        driver.run_tick(
            1.0 / 60.0,
            &[
                mouse(PointerPhase::Down, 192.0, 144.0),
                mouse(PointerPhase::Up, 192.0, 144.0),
            ],
        );

        assert!(occupants(&driver, "cutting_board").is_empty());
        assert_eq!(position_of(&driver, "tomato"), TOMATO_HOME);
        assert_eq!(
            driver.debug_title().as_deref(),
            Some("dragkit kitchen | board 0/1 | pot 0/3 | discarded 0")
        );
    }

    #[test]
    fn one_tick_move_between_stations_frees_the_first() {
        let mut driver = kitchen_driver();
        let tomato = handle_named(driver.world(), "tomato");
        carry_tomato_to_board_in_one_tick(&mut driver);

        driver.run_tick(
            1.0 / 60.0,
            &[
                mouse(PointerPhase::Down, 192.0, 144.0),
                mouse(PointerPhase::Move, 384.0, 144.0),
                mouse(PointerPhase::Up, 384.0, 144.0),
            ],
        );

        assert!(occupants(&driver, "cutting_board").is_empty());
        assert_eq!(occupants(&driver, "pot"), vec![tomato]);
        assert_eq!(position_of(&driver, "tomato"), Vec3::new(2.0 / 3.0, 3.0, 0.0));
    }

    #[test]
    fn unload_clears_world() {
        let (mut scene, mut world) = loaded();
        scene.unload(&mut world);
        assert_eq!(world.entity_count(), 0);
        assert!(scene.debug_title(&world).is_none());
    }
}
