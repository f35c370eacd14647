//! Animated entity transitions.
//!
//! A transition is a fixed-duration, non-cancellable change of an entity's
//! visual state: a [`Glide`](TransitionKind::Glide) between two screen
//! points, or a [`Settle`](TransitionKind::Settle) delay that keeps queued
//! rotations visually discrete. At most one transition per entity is in
//! flight; logical grid state commits only when a transition completes.

use std::collections::HashMap;

use glam::Vec2;

use crate::anim::easing::{ease_vec2, Easing};
use crate::api::types::EntityId;
use crate::core::scene::Scene;
use crate::render::SpriteBackend;

/// What a transition animates.
#[derive(Debug, Clone, Copy)]
pub enum TransitionKind {
    /// Move the entity's screen position from one point to another.
    Glide { from: Vec2, to: Vec2 },
    /// Hold for the duration without changing anything; used as the settle
    /// delay after a rotation frame change.
    Settle,
}

/// A single in-flight transition.
#[derive(Debug, Clone)]
pub struct Transition {
    pub kind: TransitionKind,
    pub duration: f32,
    pub elapsed: f32,
    pub easing: Easing,
}

impl Transition {
    pub fn glide(from: Vec2, to: Vec2, duration: f32, easing: Easing) -> Self {
        Self {
            kind: TransitionKind::Glide { from, to },
            duration,
            elapsed: 0.0,
            easing,
        }
    }

    pub fn settle(duration: f32) -> Self {
        Self {
            kind: TransitionKind::Settle,
            duration,
            elapsed: 0.0,
            easing: Easing::Linear,
        }
    }

    /// Normalized progress [0, 1].
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }
}

/// Tracks the in-flight transitions, at most one per entity.
#[derive(Debug, Default)]
pub struct TransitionState {
    active: HashMap<EntityId, Transition>,
}

impl TransitionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a transition. Returns false (and starts nothing) if the entity
    /// already has one in flight.
    pub fn begin(&mut self, entity: EntityId, transition: Transition) -> bool {
        if self.active.contains_key(&entity) {
            return false;
        }
        self.active.insert(entity, transition);
        true
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Drop all in-flight transitions without completing them.
    /// Used on level teardown only.
    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Advance all transitions, writing interpolated screen positions to
    /// the scene and backend. Returns the entities whose transition
    /// completed this tick, with final positions already applied.
    pub fn tick<B: SpriteBackend>(
        &mut self,
        dt: f32,
        scene: &mut Scene,
        backend: &mut B,
    ) -> Vec<EntityId> {
        let mut completed = Vec::new();

        for (&id, transition) in self.active.iter_mut() {
            transition.elapsed += dt;
            let t = transition.progress();

            if let TransitionKind::Glide { from, to } = transition.kind {
                if let Some(entity) = scene.get_mut(id) {
                    entity.screen = ease_vec2(from, to, t, transition.easing);
                    if let Some(sprite) = entity.sprite {
                        backend.set_screen_pos(sprite, entity.screen);
                    }
                }
            }

            if transition.elapsed >= transition.duration {
                completed.push(id);
            }
        }

        for id in &completed {
            self.active.remove(id);
        }
        completed
    }
}
