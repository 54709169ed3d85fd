use cgmath::Vector3;
use rand::Rng;
use thiserror::Error;

use super::shortcuts::Shortcut;
use crate::{
    assets::{AssetLoader, CompletedLoad},
    color::Color,
    config::AppConfig,
    furniture::{self, FurnitureKind},
    gfx::{
        gizmos::{wrap_degrees, GizmoHandle, TransformGizmo, TransformMode},
        picking::{ItemPicker, Ray},
        scene::{ItemId, ModelSource, PlacedItem, Room, Scene, Transform},
    },
    ui::panel::{PanelCommand, SelectionView},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("scene controller is already running")]
    AlreadyRunning,
    #[error("scene controller is not running")]
    NotRunning,
}

/// What a primary pointer press did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    /// A gizmo handle was grabbed; camera input should pause until release
    DragStarted(GizmoHandle),
    Selected(ItemId),
    Cleared,
    /// Controller not running
    Ignored,
}

/// Selection, placement and transform logic for the room.
///
/// Direct operations (`attach`, `delete`, `add_furniture_at`, ...) always
/// apply. Event entry points (`pointer_*`, `handle_shortcut`, `apply`,
/// `update`) are ignored until [`start`](Self::start) is called.
pub struct SceneController {
    scene: Scene,
    gizmo: TransformGizmo,
    picker: ItemPicker,
    loader: AssetLoader,
    spawn_radius: f32,
    running: bool,
}

impl SceneController {
    pub fn new(room: Room, loader: AssetLoader) -> Self {
        Self {
            scene: Scene::new(room),
            gizmo: TransformGizmo::new(),
            picker: ItemPicker::new(),
            loader,
            spawn_radius: 2.0,
            running: false,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.room, AssetLoader::from_directory(&config.assets.model_dir))
            .with_spawn_radius(config.assets.spawn_radius)
    }

    pub fn with_spawn_radius(mut self, radius: f32) -> Self {
        self.spawn_radius = radius.max(0.0);
        self
    }

    pub fn start(&mut self) -> Result<(), ControllerError> {
        if self.running {
            return Err(ControllerError::AlreadyRunning);
        }
        self.running = true;
        log::info!("Scene controller started");
        Ok(())
    }

    /// Stops handling events; any drag in progress is abandoned
    pub fn stop(&mut self) -> Result<(), ControllerError> {
        if !self.running {
            return Err(ControllerError::NotRunning);
        }
        self.gizmo.end_drag();
        self.running = false;
        log::info!("Scene controller stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable access for GPU resource setup; items must not be added or
    /// removed through it
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn gizmo(&self) -> &TransformGizmo {
        &self.gizmo
    }

    pub fn room(&self) -> &Room {
        &self.scene.room
    }

    // Selection

    /// Binds the gizmo to `id`, replacing any previous selection. Unknown
    /// ids are ignored.
    pub fn attach(&mut self, id: ItemId) -> bool {
        if !self.scene.contains(id) {
            log::debug!("Ignoring attach to unknown item {}", id);
            return false;
        }
        self.gizmo.attach(id);
        true
    }

    pub fn detach(&mut self) {
        self.gizmo.detach();
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.gizmo.attached()
    }

    pub fn selected_item(&self) -> Option<&PlacedItem> {
        self.selected().and_then(|id| self.scene.get(id))
    }

    /// Nearest item under the ray
    pub fn pick(&self, ray: &Ray) -> Option<ItemId> {
        self.picker.pick(ray, self.scene.items()).map(|hit| hit.item)
    }

    // Transform

    /// Keeps the item inside the room after its transform changed: an item
    /// larger than the room is shrunk to fit, then its position is clamped
    pub fn on_drag(&mut self, id: ItemId) {
        let room = self.scene.room;
        let Some(item) = self.scene.get_mut(id) else {
            return;
        };
        let local = item.model.local_bounds();
        item.transform.scale = room.fit_scale(&local, &item.transform, item.transform.scale);
        let bounds = item.world_bounds();
        item.transform.position = room.clamp_position(item.transform.position, &bounds);
    }

    pub fn set_mode(&mut self, mode: TransformMode) {
        if self.gizmo.mode() != mode {
            log::debug!("Transform mode: {}", mode);
        }
        self.gizmo.set_mode(mode);
    }

    pub fn mode(&self) -> TransformMode {
        self.gizmo.mode()
    }

    /// Applies a transform to an item and re-clamps it. Growth past the
    /// room's size stops at the largest scale that still fits.
    pub fn set_transform(&mut self, id: ItemId, transform: Transform) -> bool {
        let room = self.scene.room;
        let Some(item) = self.scene.get_mut(id) else {
            return false;
        };
        let previous = item.transform.scale;
        item.transform = transform;
        item.transform.scale = room.fit_scale(&item.model.local_bounds(), &transform, previous);
        self.on_drag(id);
        true
    }

    /// Turns the selection a quarter turn about the vertical axis
    pub fn rotate_selected_90(&mut self) -> bool {
        let Some(id) = self.selected() else {
            return false;
        };
        let Some(item) = self.scene.get_mut(id) else {
            return false;
        };
        item.transform.rotation.y = wrap_degrees(item.transform.rotation.y + 90.0);
        self.on_drag(id);
        true
    }

    // Collection

    /// Removes the item, detaching first when it is selected
    pub fn delete(&mut self, id: ItemId) -> bool {
        if self.selected() == Some(id) {
            self.detach();
        }
        match self.scene.remove(id) {
            Some(item) => {
                log::info!("Removed {} ({})", item.name, id);
                true
            }
            None => false,
        }
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.selected() {
            Some(id) => self.delete(id),
            None => false,
        }
    }

    /// Adds an item near the room center and selects it
    pub fn add_furniture(&mut self, kind: FurnitureKind) -> ItemId {
        let (x, z) = if self.spawn_radius > 0.0 {
            let mut rng = rand::rng();
            (
                rng.random_range(-self.spawn_radius..self.spawn_radius),
                rng.random_range(-self.spawn_radius..self.spawn_radius),
            )
        } else {
            (0.0, 0.0)
        };
        self.add_furniture_at(kind, x, z)
    }

    /// Adds an item at `(x, z)` on the floor and selects it.
    ///
    /// The item shows its placeholder until the model load reports back.
    pub fn add_furniture_at(&mut self, kind: FurnitureKind, x: f32, z: f32) -> ItemId {
        let furniture = furniture::create(kind);
        let id = self.scene.allocate_id();
        let name = self.scene.ensure_unique_name(&format!(
            "{} {}",
            furniture.display_name(),
            self.scene.len() + 1
        ));

        let mut item = PlacedItem::new(
            id,
            kind,
            name,
            furniture.placeholder_model(),
            furniture.base_color(),
        );
        item.transform = Transform::at(Vector3::new(x, 0.0, z));
        log::info!("Added {} ({}) at ({:.2}, {:.2})", item.name, id, x, z);

        self.scene.insert(item);
        self.on_drag(id);
        self.loader.request(id, kind);
        self.attach(id);
        id
    }

    // Color

    /// Parses `text` as a hex color for the selection; invalid text is ignored
    pub fn set_selected_color(&mut self, text: &str) -> bool {
        match Color::from_hex(text) {
            Ok(color) => self.set_selected_color_rgb(color),
            Err(e) => {
                log::debug!("Ignoring color input {:?}: {}", text, e);
                false
            }
        }
    }

    pub fn set_selected_color_rgb(&mut self, color: Color) -> bool {
        let Some(id) = self.selected() else {
            return false;
        };
        match self.scene.get_mut(id) {
            Some(item) => {
                item.color = color;
                true
            }
            None => false,
        }
    }

    // Events

    /// Primary press: grab a gizmo handle of the selection, otherwise pick
    pub fn pointer_down(&mut self, ray: &Ray) -> PointerAction {
        if !self.running {
            return PointerAction::Ignored;
        }

        if let Some(item) = self.selected_item() {
            let bounds = item.world_bounds();
            let transform = item.transform;
            if let Some(handle) = TransformGizmo::hit_handle(ray, &bounds) {
                if self.gizmo.begin_drag(handle, ray, transform, &bounds) {
                    return PointerAction::DragStarted(handle);
                }
            }
        }

        match self.pick(ray) {
            Some(id) => {
                self.attach(id);
                PointerAction::Selected(id)
            }
            None => {
                self.detach();
                PointerAction::Cleared
            }
        }
    }

    /// Pointer motion; returns true when a drag moved the selection
    pub fn pointer_move(&mut self, ray: &Ray) -> bool {
        if !self.running {
            return false;
        }
        let (Some(id), Some(transform)) = (self.selected(), self.gizmo.update_drag(ray)) else {
            return false;
        };
        self.set_transform(id, transform)
    }

    /// Primary release; returns true when it ended a drag
    pub fn pointer_up(&mut self) -> bool {
        self.gizmo.end_drag()
    }

    pub fn is_dragging(&self) -> bool {
        self.gizmo.is_dragging()
    }

    /// Keyboard shortcuts only act on an existing selection
    pub fn handle_shortcut(&mut self, shortcut: Shortcut) -> bool {
        if !self.running || self.selected().is_none() {
            return false;
        }
        match shortcut {
            Shortcut::SetMode(mode) => {
                self.set_mode(mode);
                true
            }
            Shortcut::DeleteSelection => self.delete_selected(),
        }
    }

    pub fn apply(&mut self, command: PanelCommand) {
        if !self.running {
            return;
        }
        match command {
            PanelCommand::AddFurniture(kind) => {
                self.add_furniture(kind);
            }
            PanelCommand::SetMode(mode) => self.set_mode(mode),
            PanelCommand::SetColorText(text) => {
                self.set_selected_color(&text);
            }
            PanelCommand::SetColor(color) => {
                self.set_selected_color_rgb(color);
            }
            PanelCommand::RotateQuarter => {
                self.rotate_selected_90();
            }
            PanelCommand::DeleteSelected => {
                self.delete_selected();
            }
            PanelCommand::Deselect => self.detach(),
        }
    }

    /// Per-frame work: applies finished model loads. Never blocks.
    pub fn update(&mut self) -> usize {
        if !self.running {
            return 0;
        }
        let completed = self.loader.poll();
        let count = completed.len();
        for load in completed {
            self.apply_load(load);
        }
        count
    }

    /// Waits for every outstanding model load and applies it
    pub fn finish_loads(&mut self) -> usize {
        let completed = self.loader.finish_all();
        let count = completed.len();
        for load in completed {
            self.apply_load(load);
        }
        count
    }

    pub fn pending_loads(&self) -> usize {
        self.loader.pending_count()
    }

    fn apply_load(&mut self, load: CompletedLoad) {
        let CompletedLoad { item: id, kind, result } = load;

        let Some(item) = self.scene.get_mut(id) else {
            log::debug!("Dropping {} model for removed item {}", kind, id);
            return;
        };

        match result {
            Ok(model) => {
                log::info!("Loaded {} model for {}", kind, item.name);
                item.replace_model(model, ModelSource::Asset);
                self.on_drag(id);
            }
            Err(e) => {
                log::warn!("Keeping placeholder for {}: {}", item.name, e);
            }
        }
    }

    pub fn selection_view(&self) -> Option<SelectionView> {
        self.selected_item().map(|item| SelectionView {
            id: item.id,
            name: item.name.clone(),
            kind: item.kind,
            color: item.color,
            transform: item.transform,
            source: item.source,
            mode: self.gizmo.mode(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, sync::Arc};

    use super::*;
    use crate::{
        assets::{LoadError, ModelProvider},
        furniture::Furniture,
        gfx::scene::Model,
    };

    struct NoAssets;

    impl ModelProvider for NoAssets {
        fn load(&self, furniture: &dyn Furniture) -> Result<Model, LoadError> {
            Err(LoadError::Empty(PathBuf::from(furniture.asset_file())))
        }
    }

    fn controller(room: Room) -> SceneController {
        let mut controller =
            SceneController::new(room, AssetLoader::new(Arc::new(NoAssets))).with_spawn_radius(0.0);
        controller.start().unwrap();
        controller
    }

    fn down_at(x: f32, z: f32) -> Ray {
        Ray::new(Vector3::new(x, 20.0, z), Vector3::new(0.0, -1.0, 0.0))
    }

    #[test]
    fn start_twice_fails() {
        let mut c = controller(Room::default());
        assert!(c.is_running());
        assert_eq!(c.start(), Err(ControllerError::AlreadyRunning));
        assert!(c.stop().is_ok());
        assert!(!c.is_running());
        assert_eq!(c.stop(), Err(ControllerError::NotRunning));
    }

    #[test]
    fn added_items_are_named_and_selected() {
        let mut c = controller(Room::default());
        let a = c.add_furniture(FurnitureKind::Chair);
        let b = c.add_furniture(FurnitureKind::Chair);

        assert_eq!(c.selected(), Some(b));
        assert_eq!(c.scene().get(a).unwrap().name, "Chair 1");
        assert_eq!(c.scene().get(b).unwrap().name, "Chair 2");
        assert_eq!(c.scene().get(a).unwrap().color.to_hex(), "#4682B4");
    }

    #[test]
    fn attach_unknown_is_ignored() {
        let mut c = controller(Room::default());
        let a = c.add_furniture_at(FurnitureKind::Lamp, 0.0, 0.0);
        assert!(!c.attach(ItemId(99)));
        assert_eq!(c.selected(), Some(a));
    }

    #[test]
    fn recolor_is_per_instance() {
        let mut c = controller(Room::default());
        let a = c.add_furniture_at(FurnitureKind::Chair, -2.0, 0.0);
        let b = c.add_furniture_at(FurnitureKind::Chair, 2.0, 0.0);

        assert!(c.set_selected_color("#102030"));
        assert_eq!(c.scene().get(b).unwrap().color, Color::rgb(0x10, 0x20, 0x30));
        assert_eq!(c.scene().get(a).unwrap().color.to_hex(), "#4682B4");

        assert!(!c.set_selected_color("not a color"));
        assert_eq!(c.scene().get(b).unwrap().color, Color::rgb(0x10, 0x20, 0x30));
    }

    #[test]
    fn color_change_without_selection_is_noop() {
        let mut c = controller(Room::default());
        c.add_furniture_at(FurnitureKind::Chair, 0.0, 0.0);
        c.detach();
        assert!(!c.set_selected_color("#000000"));
    }

    #[test]
    fn shortcuts_need_a_selection() {
        let mut c = controller(Room::default());
        assert!(!c.handle_shortcut(Shortcut::SetMode(TransformMode::Scale)));
        assert_eq!(c.mode(), TransformMode::Translate);

        c.add_furniture_at(FurnitureKind::Bed, 0.0, 0.0);
        assert!(c.handle_shortcut(Shortcut::SetMode(TransformMode::Scale)));
        assert_eq!(c.mode(), TransformMode::Scale);
    }

    #[test]
    fn pointer_selects_and_clears() {
        let mut c = controller(Room::default());
        let table = c.add_furniture_at(FurnitureKind::Table, 3.0, 3.0);
        c.detach();

        assert_eq!(c.pointer_down(&down_at(3.2, 3.1)), PointerAction::Selected(table));
        c.pointer_up();
        // Far from the table and its gizmo
        assert_eq!(c.pointer_down(&down_at(-6.0, -6.0)), PointerAction::Cleared);
        assert_eq!(c.selected(), None);
    }

    #[test]
    fn gizmo_drag_is_clamped_to_room() {
        let mut c = controller(Room::new(6.0, 3.0, 6.0));
        let chair = c.add_furniture_at(FurnitureKind::Chair, 0.0, 0.0);

        // Grab the center handle from above at an angle, past the axis handles
        let grab = Ray::new(Vector3::new(3.0, 3.5, 3.0), Vector3::new(-1.0, -1.0, -1.0));
        assert!(matches!(c.pointer_down(&grab), PointerAction::DragStarted(GizmoHandle::Center)));
        assert!(c.pointer_move(&down_at(10.0, -10.0)));
        assert!(c.pointer_up());

        let item = c.scene().get(chair).unwrap();
        assert!((item.transform.position.x - 2.7).abs() < 1e-4);
        assert!((item.transform.position.z + 2.7).abs() < 1e-4);
        assert!(c.room().bounds().contains(&item.world_bounds()));
    }

    #[test]
    fn failed_load_keeps_placeholder() {
        let mut c = controller(Room::default());
        let sofa = c.add_furniture_at(FurnitureKind::Sofa, 0.0, 0.0);
        assert_eq!(c.finish_loads(), 1);
        let item = c.scene().get(sofa).unwrap();
        assert_eq!(item.source, ModelSource::Placeholder);
        assert_eq!(c.pending_loads(), 0);
    }

    #[test]
    fn events_ignored_until_started() {
        let mut c = SceneController::new(Room::default(), AssetLoader::new(Arc::new(NoAssets)));
        c.add_furniture_at(FurnitureKind::Chair, 0.0, 0.0);
        assert_eq!(c.pointer_down(&down_at(0.0, 0.0)), PointerAction::Ignored);
        assert!(!c.handle_shortcut(Shortcut::DeleteSelection));
        c.apply(PanelCommand::DeleteSelected);
        assert_eq!(c.scene().len(), 1);
        assert_eq!(c.update(), 0);
    }

    #[test]
    fn rotate_quarter_turns() {
        let mut c = controller(Room::default());
        let bed = c.add_furniture_at(FurnitureKind::Bed, 0.0, 0.0);
        for _ in 0..5 {
            c.apply(PanelCommand::RotateQuarter);
        }
        assert_eq!(c.scene().get(bed).unwrap().transform.rotation.y, 90.0);
    }
}
