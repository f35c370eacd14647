//! Runs a small scripted program against one level and logs what happened.
//! No renderer: the headless backend records sprite state in memory.

use gridbot_engine::{
    parse_program, run_program, HeadlessBackend, LevelSet, MemoryStore, SimSession,
};
use log::{error, info, warn};

/// One 8x8 level: pick up the crate next to the start, carry it east,
/// drop it on the goal pad at (4,6). The walls pinch the corridor so the
/// program has to stay on row 6.
const LEVELS: &str = r#"{
  "levels": [{
    "title": "First steps",
    "instructions": "Carry the crate to the glowing pad.",
    "map": {
      "width": 8,
      "height": 8,
      "layers": [
        {
          "name": "ground",
          "data": [1,1,1,1,1,1,1,1,
                   1,1,1,1,1,1,1,1,
                   1,1,1,1,1,1,1,1,
                   1,1,1,1,1,1,1,1,
                   1,1,1,1,1,1,1,1,
                   1,1,1,1,1,1,1,1,
                   1,1,1,1,1,1,1,1,
                   1,1,1,1,1,1,1,1]
        },
        {
          "name": "walls",
          "data": [0,0,0,0,0,0,0,0,
                   0,0,0,0,0,0,0,0,
                   0,0,0,0,0,0,0,0,
                   0,0,0,0,0,0,0,0,
                   0,0,0,0,0,0,0,0,
                   0,0,0,0,9,0,0,0,
                   0,0,0,0,0,0,0,0,
                   0,0,0,0,9,0,0,0]
        }
      ]
    },
    "start": { "x": 1, "y": 6, "direction": 0 },
    "items": [{ "x": 1, "y": 5, "name": "crate" }],
    "goals": [{ "x": 4, "y": 6 }],
    "blocking_layers": ["walls"]
  }]
}"#;

const PROGRAM: &str = r#"[
  { "action": "pick" },
  { "action": "move", "direction": "east", "steps": 2 },
  { "action": "release" }
]"#;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let levels = match LevelSet::from_json(LEVELS) {
        Ok(levels) => levels,
        Err(err) => {
            error!("bad level data: {err}");
            return;
        }
    };
    let mut session = SimSession::new(levels, HeadlessBackend::new(), MemoryStore::new());

    let program = parse_program(PROGRAM);
    info!("running a {}-step program", program.len());
    let handles = run_program(&mut session, &program);

    // 60 Hz ticks, generous budget.
    if !session.run_until_idle(1.0 / 60.0, 10_000) {
        warn!("program did not finish within the tick budget");
    }

    for (i, handle) in handles.iter().enumerate() {
        match handle.poll() {
            Some(Ok(())) => info!("step {i}: done"),
            Some(Err(err)) => warn!("step {i}: {err}"),
            None => warn!("step {i}: never completed"),
        }
    }
    for event in session.drain_events() {
        info!("event: {event:?}");
    }

    let state = session.state();
    info!(
        "robot finished at ({}, {}) facing {}",
        state.grid_x,
        state.grid_y,
        state.direction.name()
    );
    match session.outcome() {
        Some(outcome) => info!("level outcome: {outcome:?}"),
        None => info!("level still open"),
    }
}
