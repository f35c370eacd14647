//! The simulation session: one level, one robot, one action queue.
//!
//! A session owns its scene, tilemap, robot, transitions, queue, and level
//! manager — there is no global state, so independent sessions (and tests)
//! coexist freely. The host drives it with `tick(dt)` from its render loop
//! and issues commands through the public robot API; every mutating call
//! returns a completion handle settled when the effect finishes.
//!
//! The session boots lazily on the first tick. Commands issued before then
//! are held by the queue's readiness gate and drain in issue order once the
//! scene is built.

use glam::Vec2;
use log::{info, warn};

use crate::anim::easing::Easing;
use crate::anim::transition::{Transition, TransitionState};
use crate::api::types::{
    ActionError, ActionResult, Direction, EntityId, LevelOutcome, RobotState, SimEvent,
};
use crate::components::robot::Robot;
use crate::core::scene::{GridEntity, Scene};
use crate::grid::projector::IsoProjector;
use crate::grid::tilemap::LayeredTilemap;
use crate::level::config::{LevelConfig, LevelSet};
use crate::level::manager::LevelManager;
use crate::level::progress::ProgressStore;
use crate::queue::signal::CommandHandle;
use crate::queue::{ActionQueue, Command};
use crate::render::{SpriteBackend, SpriteDesc};

/// Atlas frame used for spawned items (frames 0-3 are the robot facings).
const ITEM_FRAME: u32 = 4;

/// Tunables for one session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Isometric tile footprint.
    pub tile_width: f32,
    pub tile_height: f32,
    /// Screen-Y lift per tilemap layer.
    pub elevation_step: f32,
    /// Duration of a one-cell glide, in seconds.
    pub move_duration: f32,
    /// Settle delay after a rotation, keeping queued turns discrete.
    pub rotate_settle: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tile_width: 64.0,
            tile_height: 32.0,
            elevation_step: 8.0,
            move_duration: 0.35,
            rotate_settle: 0.15,
        }
    }
}

/// Everything rebuilt on each level activation.
struct LevelRuntime {
    tilemap: LayeredTilemap,
    robot: Robot,
    config: LevelConfig,
}

/// One independent simulation session.
pub struct SimSession<B: SpriteBackend, S: ProgressStore> {
    config: SessionConfig,
    backend: B,
    scene: Scene,
    transitions: TransitionState,
    queue: ActionQueue,
    levels: LevelManager<S>,
    runtime: Option<LevelRuntime>,
    outcome: Option<LevelOutcome>,
    events: Vec<SimEvent>,
    next_id: u32,
}

impl<B: SpriteBackend, S: ProgressStore> SimSession<B, S> {
    pub fn new(levels: LevelSet, backend: B, store: S) -> Self {
        Self::with_config(levels, backend, store, SessionConfig::default())
    }

    pub fn with_config(levels: LevelSet, backend: B, store: S, config: SessionConfig) -> Self {
        Self {
            config,
            backend,
            scene: Scene::new(),
            transitions: TransitionState::new(),
            queue: ActionQueue::new(),
            levels: LevelManager::new(levels, store),
            runtime: None,
            outcome: None,
            events: Vec::new(),
            next_id: 1,
        }
    }

    // ---- Public robot API ----

    /// Settled exactly once, when the scene finishes construction.
    pub fn ready(&mut self) -> CommandHandle {
        self.queue.ready_handle()
    }

    pub fn rotate_left(&mut self) -> CommandHandle {
        self.queue.enqueue("rotate-left", Command::Rotate { delta: -1 })
    }

    pub fn rotate_right(&mut self) -> CommandHandle {
        self.queue.enqueue("rotate-right", Command::Rotate { delta: 1 })
    }

    pub fn move_forward(&mut self, steps: u32) -> CommandHandle {
        self.queue
            .enqueue("move-forward", Command::Move { steps, reverse: false })
    }

    pub fn move_backward(&mut self, steps: u32) -> CommandHandle {
        self.queue
            .enqueue("move-backward", Command::Move { steps, reverse: true })
    }

    /// Turn until facing the named compass direction. An unknown name is
    /// rejected at the call boundary with an already-settled handle.
    pub fn face(&mut self, direction: &str) -> CommandHandle {
        match Direction::from_name(direction) {
            Some(target) => self.queue.enqueue("face", Command::Face { target }),
            None => {
                warn!("unknown direction name {direction:?}");
                CommandHandle::settled(Err(ActionError::UnknownDirection(direction.to_string())))
            }
        }
    }

    pub fn set_position(&mut self, x: i32, y: i32) -> CommandHandle {
        self.queue.enqueue("set-position", Command::Teleport { x, y })
    }

    pub fn pickup_item(&mut self) -> CommandHandle {
        self.queue.enqueue("pickup", Command::Pickup)
    }

    pub fn drop_item(&mut self) -> CommandHandle {
        self.queue.enqueue("drop", Command::Drop)
    }

    pub fn reset_level(&mut self) -> CommandHandle {
        self.queue.enqueue("reset-level", Command::ResetLevel)
    }

    pub fn load_new_level(&mut self) -> CommandHandle {
        self.queue.enqueue("load-new-level", Command::LoadNextLevel)
    }

    /// Synchronous, side-effect-free snapshot. Before boot it reports the
    /// configured start pose.
    pub fn state(&self) -> RobotState {
        if let Some(rt) = &self.runtime {
            return rt.robot.state();
        }
        match self.levels.config() {
            Some(cfg) => RobotState {
                direction: Direction::from_u8(cfg.start.direction).unwrap_or_default(),
                grid_x: cfg.start.x,
                grid_y: cfg.start.y,
                in_transition: false,
            },
            None => RobotState {
                direction: Direction::default(),
                grid_x: 0,
                grid_y: 0,
                in_transition: false,
            },
        }
    }

    // ---- Host loop ----

    /// Advance the simulation. Boots on the first call, then advances
    /// transitions, commits completed ones, and drains the queue.
    pub fn tick(&mut self, dt: f32) {
        if self.runtime.is_none() && !self.queue.is_ready() {
            self.boot();
        }
        let completed = self
            .transitions
            .tick(dt, &mut self.scene, &mut self.backend);
        for id in completed {
            self.on_transition_complete(id);
        }
        self.pump();
    }

    /// Tick until nothing is queued or in flight. Returns false if
    /// `max_ticks` elapsed first.
    pub fn run_until_idle(&mut self, dt: f32, max_ticks: u32) -> bool {
        for _ in 0..max_ticks {
            self.tick(dt);
            if self.is_idle() {
                return true;
            }
        }
        false
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_ready() && self.queue.is_idle() && self.transitions.is_empty()
    }

    /// Take all events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// How the current level ended, if it has.
    pub fn outcome(&self) -> Option<LevelOutcome> {
        self.outcome
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn tilemap(&self) -> Option<&LayeredTilemap> {
        self.runtime.as_ref().map(|rt| &rt.tilemap)
    }

    pub fn levels(&self) -> &LevelManager<S> {
        &self.levels
    }

    pub fn current_level(&self) -> u32 {
        self.levels.current_level()
    }

    // ---- Internals ----

    fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    fn boot(&mut self) {
        self.build_level();
        self.queue.mark_ready();
        self.events.push(SimEvent::Ready);
    }

    /// Tear down the previous level (if any) and build the current one.
    fn build_level(&mut self) {
        if let Some(mut rt) = self.runtime.take() {
            rt.tilemap.destroy(&mut self.backend);
        }
        let ids: Vec<EntityId> = self.scene.iter().map(|e| e.id).collect();
        for id in ids {
            if let Some(entity) = self.scene.despawn(id) {
                if let Some(sprite) = entity.sprite {
                    self.backend.destroy(sprite);
                }
            }
        }
        self.transitions.clear();
        self.outcome = None;

        let cfg = match self.levels.config() {
            Some(cfg) => cfg.clone(),
            None => {
                warn!(
                    "no level {} in the level set; session stays empty",
                    self.levels.current_level()
                );
                return;
            }
        };

        let projector = IsoProjector::new(self.config.tile_width, self.config.tile_height);
        let tilemap =
            LayeredTilemap::build(&cfg.map, projector, self.config.elevation_step, &mut self.backend);

        let direction = Direction::from_u8(cfg.start.direction).unwrap_or_else(|| {
            warn!("invalid start direction {}, facing south", cfg.start.direction);
            Direction::South
        });

        // Entities ride one elevation step above the ground layer.
        let z = self.config.elevation_step;
        let start_pos = projector.grid_to_screen(cfg.start.x, cfg.start.y, z);
        let robot_id = self.next_id();
        let robot_sprite = self.backend.spawn(SpriteDesc {
            frame: direction.as_u8() as u32,
            pos: start_pos,
        });
        self.scene.spawn(
            GridEntity::new(robot_id)
                .with_tag("robot")
                .with_grid(cfg.start.x, cfg.start.y)
                .with_screen(start_pos)
                .with_frame(direction.as_u8() as u32)
                .with_sprite(robot_sprite),
        );

        for spawn in &cfg.items {
            let pos = projector.grid_to_screen(spawn.x, spawn.y, z);
            let id = self.next_id();
            let sprite = self.backend.spawn(SpriteDesc {
                frame: ITEM_FRAME,
                pos,
            });
            self.scene.spawn(
                GridEntity::new(id)
                    .with_tag("item")
                    .with_grid(spawn.x, spawn.y)
                    .with_screen(pos)
                    .with_frame(ITEM_FRAME)
                    .with_sprite(sprite),
            );
        }

        let robot = Robot::new(robot_id, cfg.start.x, cfg.start.y, direction);
        let level = self.levels.current_level();
        info!("level {level} started: {}", cfg.title);
        self.runtime = Some(LevelRuntime {
            tilemap,
            robot,
            config: cfg,
        });
        self.events.push(SimEvent::LevelStarted { level });
    }

    /// Start queued entries until one is in flight or the backlog empties.
    fn pump(&mut self) {
        loop {
            if self.queue.has_active() {
                return;
            }
            if self.queue.begin_next().is_none() {
                return;
            }
            self.start_active();
        }
    }

    fn start_active(&mut self) {
        let command = match self.queue.active_mut() {
            Some(active) => active.entry.command.clone(),
            None => return,
        };
        match command {
            Command::Rotate { delta } => {
                if let Some(active) = self.queue.active_mut() {
                    active.remaining = 1;
                    active.turn = if delta < 0 { -1 } else { 1 };
                }
                self.step_turn();
            }
            Command::Face { target } => {
                let turns = match self.runtime.as_ref() {
                    Some(rt) => rt.robot.turns_to_face(target),
                    None => {
                        let level = self.levels.current_level();
                        self.queue.finish_active(Err(ActionError::NoSuchLevel(level)));
                        return;
                    }
                };
                if turns.0 == 0 {
                    self.queue.finish_active(Ok(()));
                    return;
                }
                if let Some(active) = self.queue.active_mut() {
                    active.remaining = turns.0;
                    active.turn = turns.1;
                }
                self.step_turn();
            }
            Command::Move { steps, .. } => {
                if steps == 0 {
                    self.queue.finish_active(Ok(()));
                    return;
                }
                if let Some(active) = self.queue.active_mut() {
                    active.remaining = steps;
                }
                self.step_move();
            }
            Command::Teleport { x, y } => {
                let result = self.do_teleport(x, y);
                self.queue.finish_active(result);
            }
            Command::Pickup => {
                let result = self.do_pickup();
                self.queue.finish_active(result);
            }
            Command::Drop => {
                let result = self.do_drop();
                self.queue.finish_active(result);
            }
            Command::ResetLevel => {
                self.build_level();
                self.queue.finish_active(Ok(()));
            }
            Command::LoadNextLevel => match self.levels.next_level() {
                Ok(_) => {
                    self.build_level();
                    self.queue.finish_active(Ok(()));
                }
                Err(err) => self.queue.finish_active(Err(err)),
            },
        }
    }

    /// Begin one 90° turn of the active entry.
    fn step_turn(&mut self) {
        let turn = match self.queue.active_mut() {
            Some(active) => active.turn,
            None => return,
        };
        let rt = match self.runtime.as_mut() {
            Some(rt) => rt,
            None => {
                let level = self.levels.current_level();
                self.queue.finish_active(Err(ActionError::NoSuchLevel(level)));
                return;
            }
        };
        match rt.robot.begin_turn(turn) {
            Ok(direction) => {
                if let Some(entity) = self.scene.get_mut(rt.robot.entity) {
                    entity.frame = direction.as_u8() as u32;
                    if let Some(sprite) = entity.sprite {
                        self.backend.set_frame(sprite, entity.frame);
                    }
                }
                self.transitions
                    .begin(rt.robot.entity, Transition::settle(self.config.rotate_settle));
            }
            Err(err) => self.queue.finish_active(Err(err)),
        }
    }

    /// Begin one single-cell glide of the active entry.
    fn step_move(&mut self) {
        let reverse = match self.queue.active_mut() {
            Some(active) => matches!(active.entry.command, Command::Move { reverse: true, .. }),
            None => return,
        };
        let rt = match self.runtime.as_mut() {
            Some(rt) => rt,
            None => {
                let level = self.levels.current_level();
                self.queue.finish_active(Err(ActionError::NoSuchLevel(level)));
                return;
            }
        };
        let (tx, ty) = rt.robot.step_target(reverse);
        match rt
            .robot
            .check_move(tx, ty, &rt.tilemap, &rt.config.blocking_layers)
        {
            Ok(()) => {
                rt.robot.begin_move(tx, ty);
                let from = self
                    .scene
                    .get(rt.robot.entity)
                    .map(|e| e.screen)
                    .unwrap_or(Vec2::ZERO);
                let to = rt
                    .tilemap
                    .projector()
                    .grid_to_screen(tx, ty, self.config.elevation_step);
                self.transitions.begin(
                    rt.robot.entity,
                    Transition::glide(from, to, self.config.move_duration, Easing::QuadInOut),
                );
            }
            Err(err) => self.queue.finish_active(Err(err)),
        }
    }

    /// Commit a completed transition and advance the active entry.
    fn on_transition_complete(&mut self, id: EntityId) {
        let Some(rt) = self.runtime.as_mut() else {
            return;
        };
        if id != rt.robot.entity {
            return;
        }
        if let Some((x, y)) = rt.robot.commit_transition() {
            if let Some(entity) = self.scene.get_mut(rt.robot.entity) {
                entity.grid_x = x;
                entity.grid_y = y;
            }
            // Tow the carried item along with the robot.
            if let Some(item) = rt.robot.carrying {
                let pos = rt
                    .tilemap
                    .projector()
                    .grid_to_screen(x, y, self.config.elevation_step * 2.0);
                if let Some(entity) = self.scene.get_mut(item) {
                    entity.grid_x = x;
                    entity.grid_y = y;
                    entity.screen = pos;
                    if let Some(sprite) = entity.sprite {
                        self.backend.set_screen_pos(sprite, pos);
                    }
                }
            }
        }
        self.advance_active();
    }

    /// One unit step of the active entry finished; settle it or start the
    /// next step.
    fn advance_active(&mut self) {
        let (command, remaining) = match self.queue.active_mut() {
            Some(active) => {
                active.remaining = active.remaining.saturating_sub(1);
                (active.entry.command.clone(), active.remaining)
            }
            None => return,
        };
        if remaining == 0 {
            self.queue.finish_active(Ok(()));
            return;
        }
        match command {
            Command::Move { .. } => self.step_move(),
            Command::Rotate { .. } | Command::Face { .. } => self.step_turn(),
            _ => self.queue.finish_active(Ok(())),
        }
    }

    fn do_teleport(&mut self, x: i32, y: i32) -> ActionResult {
        let rt = match self.runtime.as_mut() {
            Some(rt) => rt,
            None => return Err(ActionError::NoSuchLevel(self.levels.current_level())),
        };
        rt.robot.check_move(x, y, &rt.tilemap, &rt.config.blocking_layers)?;
        rt.robot.grid_x = x;
        rt.robot.grid_y = y;
        let pos = rt
            .tilemap
            .projector()
            .grid_to_screen(x, y, self.config.elevation_step);
        if let Some(entity) = self.scene.get_mut(rt.robot.entity) {
            entity.grid_x = x;
            entity.grid_y = y;
            entity.screen = pos;
            if let Some(sprite) = entity.sprite {
                self.backend.set_screen_pos(sprite, pos);
            }
        }
        if let Some(item) = rt.robot.carrying {
            let carry_pos = rt
                .tilemap
                .projector()
                .grid_to_screen(x, y, self.config.elevation_step * 2.0);
            if let Some(entity) = self.scene.get_mut(item) {
                entity.grid_x = x;
                entity.grid_y = y;
                entity.screen = carry_pos;
                if let Some(sprite) = entity.sprite {
                    self.backend.set_screen_pos(sprite, carry_pos);
                }
            }
        }
        Ok(())
    }

    fn do_pickup(&mut self) -> ActionResult {
        let rt = match self.runtime.as_mut() {
            Some(rt) => rt,
            None => return Err(ActionError::NoSuchLevel(self.levels.current_level())),
        };
        if rt.robot.carrying.is_some() {
            return Err(ActionError::HandsFull);
        }
        let (rx, ry) = (rt.robot.grid_x, rt.robot.grid_y);
        // Eligible: on the robot's cell or 4-adjacent to it.
        let item = self
            .scene
            .iter()
            .find(|e| {
                e.tag == "item" && (e.grid_x - rx).abs() + (e.grid_y - ry).abs() <= 1
            })
            .map(|e| e.id);
        let Some(item) = item else {
            return Err(ActionError::NothingToPickUp);
        };
        rt.robot.carrying = Some(item);
        let pos = rt
            .tilemap
            .projector()
            .grid_to_screen(rx, ry, self.config.elevation_step * 2.0);
        if let Some(entity) = self.scene.get_mut(item) {
            entity.grid_x = rx;
            entity.grid_y = ry;
            entity.screen = pos;
            if let Some(sprite) = entity.sprite {
                self.backend.set_screen_pos(sprite, pos);
            }
        }
        self.events.push(SimEvent::ItemPickedUp { item });
        Ok(())
    }

    fn do_drop(&mut self) -> ActionResult {
        let rt = match self.runtime.as_mut() {
            Some(rt) => rt,
            None => return Err(ActionError::NoSuchLevel(self.levels.current_level())),
        };
        let Some(item) = rt.robot.carrying.take() else {
            return Err(ActionError::NotCarrying);
        };
        let (dx, dy) = rt.robot.cell_ahead();
        let pos = rt
            .tilemap
            .projector()
            .grid_to_screen(dx, dy, self.config.elevation_step);
        if let Some(entity) = self.scene.get_mut(item) {
            entity.grid_x = dx;
            entity.grid_y = dy;
            entity.screen = pos;
            if let Some(sprite) = entity.sprite {
                self.backend.set_screen_pos(sprite, pos);
            }
        }
        self.events.push(SimEvent::ItemDropped { item, x: dx, y: dy });

        let level = self.levels.current_level();
        if rt.config.is_goal(dx, dy) {
            self.levels.complete_level(level);
            self.outcome = Some(LevelOutcome::Won);
            self.events.push(SimEvent::LevelWon { level });
        } else if rt
            .config
            .conveyor_layer
            .as_deref()
            .is_some_and(|layer| rt.tilemap.has_tile_at(dx, dy, layer))
        {
            // Neutral: the item rides the conveyor; transport is the
            // level's concern, not the drop's.
        } else {
            self.outcome = Some(LevelOutcome::Failed);
            self.events.push(SimEvent::LevelFailed { level });
        }
        Ok(())
    }
}
