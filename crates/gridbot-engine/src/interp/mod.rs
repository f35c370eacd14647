//! Command program interpreter.
//!
//! Translates an externally-produced command list (the JSON the block
//! editor or translation service emits) into typed program commands and
//! feeds them to a session's action queue. The source is untrusted in
//! shape, not intent: malformed JSON degrades to an empty program and
//! unrecognized actions are dropped, with a diagnostic either way.

use log::warn;
use serde::Deserialize;

use crate::api::types::Direction;
use crate::core::session::SimSession;
use crate::level::progress::ProgressStore;
use crate::queue::signal::CommandHandle;
use crate::render::SpriteBackend;

/// One command object as received on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCommand {
    pub action: String,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub steps: Option<u32>,
    #[serde(default)]
    pub times: Option<u32>,
    #[serde(default)]
    pub commands: Vec<RawCommand>,
}

/// A validated, repeat-expanded program step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramCommand {
    /// Walk `steps` cells, optionally facing a compass direction first.
    Move {
        direction: Option<Direction>,
        steps: u32,
    },
    RotateLeft,
    RotateRight,
    Pick,
    Release,
}

/// Parse a JSON command list into a flat program. Repeats are expanded
/// here so the queue only ever sees primitive steps.
pub fn parse_program(json: &str) -> Vec<ProgramCommand> {
    let raw: Vec<RawCommand> = match serde_json::from_str(json) {
        Ok(raw) => raw,
        Err(err) => {
            warn!("malformed command list, running nothing: {err}");
            return Vec::new();
        }
    };
    let mut program = Vec::new();
    expand(&raw, &mut program);
    program
}

fn expand(raw: &[RawCommand], out: &mut Vec<ProgramCommand>) {
    for cmd in raw {
        match cmd.action.as_str() {
            "move" => {
                let direction = cmd.direction.as_deref().and_then(|name| {
                    let parsed = Direction::from_name(name);
                    if parsed.is_none() {
                        warn!("unknown direction {name:?} in move, keeping current facing");
                    }
                    parsed
                });
                out.push(ProgramCommand::Move {
                    direction,
                    steps: cmd.steps.unwrap_or(1),
                });
            }
            "rotate" => match cmd.direction.as_deref() {
                Some(dir) if dir.eq_ignore_ascii_case("left") => {
                    out.push(ProgramCommand::RotateLeft)
                }
                Some(dir) if dir.eq_ignore_ascii_case("right") => {
                    out.push(ProgramCommand::RotateRight)
                }
                other => warn!("rotate needs direction left/right, got {other:?}; dropping"),
            },
            "pick" => out.push(ProgramCommand::Pick),
            "release" => out.push(ProgramCommand::Release),
            "repeat" => {
                for _ in 0..cmd.times.unwrap_or(1) {
                    expand(&cmd.commands, out);
                }
            }
            other => warn!("unrecognized action {other:?}; dropping"),
        }
    }
}

/// Enqueue a program against a session. Returns the completion handles in
/// issue order; the session's tick drains them one at a time.
pub fn run_program<B, S>(
    session: &mut SimSession<B, S>,
    program: &[ProgramCommand],
) -> Vec<CommandHandle>
where
    B: SpriteBackend,
    S: ProgressStore,
{
    let mut handles = Vec::new();
    for command in program {
        match command {
            ProgramCommand::Move { direction, steps } => {
                if let Some(dir) = direction {
                    handles.push(session.face(dir.name()));
                }
                handles.push(session.move_forward(*steps));
            }
            ProgramCommand::RotateLeft => handles.push(session.rotate_left()),
            ProgramCommand::RotateRight => handles.push(session.rotate_right()),
            ProgramCommand::Pick => handles.push(session.pickup_item()),
            ProgramCommand::Release => handles.push(session.drop_item()),
        }
    }
    handles
}
