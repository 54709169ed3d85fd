use wgpu::Device;

use super::{
    item::{ItemId, PlacedItem},
    room::Room,
};

/// The room plus every item placed in it.
///
/// Items are kept in insertion order, which is also the order the panel and
/// the renderer walk them in.
pub struct Scene {
    pub room: Room,
    items: Vec<PlacedItem>,
    next_id: u64,
}

impl Scene {
    pub fn new(room: Room) -> Self {
        Self {
            room,
            items: Vec::new(),
            next_id: 1,
        }
    }

    /// Hands out the next unused item id
    pub fn allocate_id(&mut self) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, item: PlacedItem) -> ItemId {
        let id = item.id;
        debug_assert!(!self.contains(id), "item {id} inserted twice");
        self.items.push(item);
        id
    }

    /// Removes and returns the item; the caller decides when it is dropped
    pub fn remove(&mut self, id: ItemId) -> Option<PlacedItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    pub fn get(&self, id: ItemId) -> Option<&PlacedItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut PlacedItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[PlacedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends " (n)" until the name is free
    pub fn ensure_unique_name(&self, desired_name: &str) -> String {
        let mut counter = 0;
        let mut test_name = desired_name.to_string();

        while self.items.iter().any(|item| item.name == test_name) {
            counter += 1;
            test_name = format!("{} ({})", desired_name, counter);
        }

        test_name
    }

    /// Uploads meshes and uniforms for items that have none yet
    pub fn init_gpu_resources(&mut self, device: &Device, layout: &wgpu::BindGroupLayout) {
        for item in &mut self.items {
            item.init_gpu_resources(device, layout);
        }
    }

    /// Syncs every item's transform and color to the GPU
    pub fn update_all_uniforms(&self, queue: &wgpu::Queue) {
        for item in &self.items {
            item.update_gpu(queue);
        }
    }

    pub fn get_statistics(&self) -> SceneStatistics {
        SceneStatistics {
            item_count: self.items.len(),
            total_triangles: self.items.iter().map(|item| item.model.triangle_count()).sum(),
            total_vertices: self.items.iter().map(|item| item.model.vertex_count()).sum(),
            floor_area: self.room.floor_area(),
        }
    }
}

/// Scene statistics for the summary panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneStatistics {
    pub item_count: usize,
    pub total_triangles: u32,
    pub total_vertices: usize,
    pub floor_area: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        color::Color,
        furniture::FurnitureKind,
        gfx::{geometry::generate_cube, scene::model::Model},
    };

    fn add(scene: &mut Scene, name: &str) -> ItemId {
        let id = scene.allocate_id();
        let item = PlacedItem::new(
            id,
            FurnitureKind::Chair,
            name.to_string(),
            Model::from_geometry(&generate_cube()),
            Color::WHITE,
        );
        scene.insert(item)
    }

    #[test]
    fn ids_are_never_reused() {
        let mut scene = Scene::new(Room::default());
        let a = add(&mut scene, "A");
        scene.remove(a);
        let b = add(&mut scene, "B");
        assert_ne!(a, b);
        assert!(!scene.contains(a));
        assert!(scene.contains(b));
    }

    #[test]
    fn remove_takes_exactly_one() {
        let mut scene = Scene::new(Room::default());
        let a = add(&mut scene, "A");
        let _b = add(&mut scene, "B");

        assert_eq!(scene.remove(a).map(|item| item.name), Some("A".to_string()));
        assert_eq!(scene.len(), 1);
        assert!(scene.remove(a).is_none());
    }

    #[test]
    fn unique_names_get_suffixes() {
        let mut scene = Scene::new(Room::default());
        add(&mut scene, "Chair 1");
        assert_eq!(scene.ensure_unique_name("Chair 2"), "Chair 2");
        assert_eq!(scene.ensure_unique_name("Chair 1"), "Chair 1 (1)");
        add(&mut scene, "Chair 1 (1)");
        assert_eq!(scene.ensure_unique_name("Chair 1"), "Chair 1 (2)");
    }

    #[test]
    fn statistics_count_items() {
        let mut scene = Scene::new(Room::new(4.0, 3.0, 5.0));
        add(&mut scene, "A");
        add(&mut scene, "B");
        let stats = scene.get_statistics();
        assert_eq!(stats.item_count, 2);
        assert_eq!(stats.total_triangles, 24);
        assert_eq!(stats.floor_area, 20.0);
    }
}
