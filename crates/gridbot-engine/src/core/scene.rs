use glam::Vec2;

use crate::api::types::EntityId;
use crate::render::SpriteId;

/// A scene entity: the robot, a carried crate, a goal marker.
/// Single struct with optional pieces — sized for tens of entities.
#[derive(Debug, Clone)]
pub struct GridEntity {
    pub id: EntityId,
    /// String tag for finding entities by name ("robot", "item", ...).
    pub tag: String,
    /// Logical cell. Authoritative only when no transition is in flight.
    pub grid_x: i32,
    pub grid_y: i32,
    /// Current screen position (updated by transitions).
    pub screen: Vec2,
    /// Atlas frame (facing frame for the robot).
    pub frame: u32,
    /// Backend sprite, if the entity is visible.
    pub sprite: Option<SpriteId>,
}

impl GridEntity {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            tag: String::new(),
            grid_x: 0,
            grid_y: 0,
            screen: Vec2::ZERO,
            frame: 0,
            sprite: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_grid(mut self, x: i32, y: i32) -> Self {
        self.grid_x = x;
        self.grid_y = y;
        self
    }

    pub fn with_screen(mut self, screen: Vec2) -> Self {
        self.screen = screen;
        self
    }

    pub fn with_frame(mut self, frame: u32) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_sprite(mut self, sprite: SpriteId) -> Self {
        self.sprite = Some(sprite);
        self
    }
}

/// Flat-vec entity storage.
#[derive(Debug, Default)]
pub struct Scene {
    entities: Vec<GridEntity>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: Vec::with_capacity(16),
        }
    }

    pub fn spawn(&mut self, entity: GridEntity) {
        self.entities.push(entity);
    }

    /// Remove an entity by ID. Returns the removed entity if found.
    pub fn despawn(&mut self, id: EntityId) -> Option<GridEntity> {
        self.entities
            .iter()
            .position(|e| e.id == id)
            .map(|idx| self.entities.swap_remove(idx))
    }

    pub fn get(&self, id: EntityId) -> Option<&GridEntity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut GridEntity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn find_by_tag(&self, tag: &str) -> Option<&GridEntity> {
        self.entities.iter().find(|e| e.tag == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GridEntity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_and_get() {
        let mut scene = Scene::new();
        scene.spawn(GridEntity::new(EntityId(1)).with_grid(2, 3));
        let e = scene.get(EntityId(1)).unwrap();
        assert_eq!((e.grid_x, e.grid_y), (2, 3));
    }

    #[test]
    fn despawn_removes_entity() {
        let mut scene = Scene::new();
        scene.spawn(GridEntity::new(EntityId(1)));
        assert!(scene.despawn(EntityId(1)).is_some());
        assert!(scene.is_empty());
        assert!(scene.despawn(EntityId(1)).is_none());
    }

    #[test]
    fn find_by_tag() {
        let mut scene = Scene::new();
        scene.spawn(GridEntity::new(EntityId(1)).with_tag("robot"));
        scene.spawn(GridEntity::new(EntityId(2)).with_tag("item"));
        assert_eq!(scene.find_by_tag("item").unwrap().id, EntityId(2));
        assert!(scene.find_by_tag("ghost").is_none());
    }
}
