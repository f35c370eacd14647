//! Rendering capability surface.
//!
//! The simulation never talks to a concrete renderer. It depends on the
//! narrow [`SpriteBackend`] trait: spawn a sprite, move it, rank it, change
//! its frame, destroy it. Any real backend (WebGPU, canvas, terminal)
//! implements this; [`HeadlessBackend`] is the recording implementation
//! used by tests and the demos.

use glam::Vec2;
use std::collections::HashMap;

/// Handle to a backend-owned sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteId(pub u32);

/// Initial description of a sprite.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpriteDesc {
    /// Atlas frame index.
    pub frame: u32,
    /// Initial screen position.
    pub pos: Vec2,
}

/// Minimal sprite capability surface the simulation depends on.
pub trait SpriteBackend {
    fn spawn(&mut self, desc: SpriteDesc) -> SpriteId;
    fn set_screen_pos(&mut self, id: SpriteId, pos: Vec2);
    /// Assign paint-order rank; lower ranks draw first.
    fn set_depth(&mut self, id: SpriteId, rank: u32);
    fn set_frame(&mut self, id: SpriteId, frame: u32);
    fn destroy(&mut self, id: SpriteId);
}

/// Last-written state of a headless sprite.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpriteRecord {
    pub pos: Vec2,
    pub frame: u32,
    pub depth: u32,
}

/// Backend that records sprite state in memory instead of drawing.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    sprites: HashMap<SpriteId, SpriteRecord>,
    next_id: u32,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (not yet destroyed) sprites.
    pub fn live_count(&self) -> usize {
        self.sprites.len()
    }

    /// Inspect a sprite's recorded state.
    pub fn sprite(&self, id: SpriteId) -> Option<&SpriteRecord> {
        self.sprites.get(&id)
    }
}

impl SpriteBackend for HeadlessBackend {
    fn spawn(&mut self, desc: SpriteDesc) -> SpriteId {
        let id = SpriteId(self.next_id);
        self.next_id += 1;
        self.sprites.insert(
            id,
            SpriteRecord {
                pos: desc.pos,
                frame: desc.frame,
                depth: 0,
            },
        );
        id
    }

    fn set_screen_pos(&mut self, id: SpriteId, pos: Vec2) {
        if let Some(s) = self.sprites.get_mut(&id) {
            s.pos = pos;
        }
    }

    fn set_depth(&mut self, id: SpriteId, rank: u32) {
        if let Some(s) = self.sprites.get_mut(&id) {
            s.depth = rank;
        }
    }

    fn set_frame(&mut self, id: SpriteId, frame: u32) {
        if let Some(s) = self.sprites.get_mut(&id) {
            s.frame = frame;
        }
    }

    fn destroy(&mut self, id: SpriteId) {
        self.sprites.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_and_inspect() {
        let mut b = HeadlessBackend::new();
        let id = b.spawn(SpriteDesc {
            frame: 3,
            pos: Vec2::new(10.0, 20.0),
        });
        let rec = b.sprite(id).unwrap();
        assert_eq!(rec.frame, 3);
        assert_eq!(rec.pos, Vec2::new(10.0, 20.0));
        assert_eq!(b.live_count(), 1);
    }

    #[test]
    fn destroy_removes_sprite() {
        let mut b = HeadlessBackend::new();
        let id = b.spawn(SpriteDesc::default());
        b.destroy(id);
        assert_eq!(b.live_count(), 0);
        assert!(b.sprite(id).is_none());
    }

    #[test]
    fn updates_are_recorded() {
        let mut b = HeadlessBackend::new();
        let id = b.spawn(SpriteDesc::default());
        b.set_screen_pos(id, Vec2::new(5.0, 6.0));
        b.set_depth(id, 7);
        b.set_frame(id, 2);
        let rec = b.sprite(id).unwrap();
        assert_eq!(rec.pos, Vec2::new(5.0, 6.0));
        assert_eq!(rec.depth, 7);
        assert_eq!(rec.frame, 2);
    }

    #[test]
    fn operations_on_destroyed_sprites_are_ignored() {
        let mut b = HeadlessBackend::new();
        let id = b.spawn(SpriteDesc::default());
        b.destroy(id);
        b.set_screen_pos(id, Vec2::ONE);
        assert!(b.sprite(id).is_none());
    }
}
