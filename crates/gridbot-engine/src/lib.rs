pub mod anim;
pub mod api;
pub mod components;
pub mod core;
pub mod grid;
pub mod interp;
pub mod level;
pub mod queue;
pub mod render;

// Re-export key types at crate root for convenience
pub use anim::easing::{ease_vec2, lerp, Easing};
pub use anim::transition::{Transition, TransitionKind, TransitionState};
pub use api::types::{
    ActionError, ActionResult, Direction, EntityId, LevelOutcome, RobotState, SimEvent,
};
pub use components::robot::Robot;
pub use core::scene::{GridEntity, Scene};
pub use core::session::{SessionConfig, SimSession};
pub use grid::map::{LayerKind, MapData, MapLayer};
pub use grid::projector::IsoProjector;
pub use grid::tilemap::{LayeredTilemap, TileSprite};
pub use interp::{parse_program, run_program, ProgramCommand, RawCommand};
pub use level::config::{GridCell, ItemSpawn, LevelConfig, LevelSet, StartPose};
pub use level::manager::LevelManager;
pub use level::progress::{FileStore, MemoryStore, ProgressRecord, ProgressStore};
pub use queue::signal::{completion_pair, CommandHandle, SignalSetter};
pub use queue::{ActionQueue, Command};
pub use render::{HeadlessBackend, SpriteBackend, SpriteDesc, SpriteId, SpriteRecord};
