use thiserror::Error;

/// Unique identifier for an entity in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u32);

/// Compass facing of the robot.
///
/// The numeric values match the sprite sheet's row order (South, West,
/// North, East), which is why turning is expressed with explicit lookup
/// tables below rather than arithmetic on the discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Direction {
    #[default]
    South = 0,
    West = 1,
    North = 2,
    East = 3,
}

impl Direction {
    /// Convert from a u8 value. Returns None if out of range.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::South),
            1 => Some(Self::West),
            2 => Some(Self::North),
            3 => Some(Self::East),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse a compass name ("north", "East", ...). Case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "south" => Some(Self::South),
            "west" => Some(Self::West),
            "north" => Some(Self::North),
            "east" => Some(Self::East),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::South => "south",
            Self::West => "west",
            Self::North => "north",
            Self::East => "east",
        }
    }

    /// One counter-clockwise 90° turn. Fixed permutation: S→E→N→W→S.
    pub fn turned_left(self) -> Self {
        match self {
            Self::South => Self::East,
            Self::East => Self::North,
            Self::North => Self::West,
            Self::West => Self::South,
        }
    }

    /// One clockwise 90° turn. Fixed permutation: S→W→N→E→S.
    pub fn turned_right(self) -> Self {
        match self {
            Self::South => Self::West,
            Self::West => Self::North,
            Self::North => Self::East,
            Self::East => Self::South,
        }
    }

    /// Grid offset of one step in this direction.
    pub fn forward_offset(self) -> (i32, i32) {
        match self {
            Self::South => (0, 1),
            Self::West => (-1, 0),
            Self::North => (0, -1),
            Self::East => (1, 0),
        }
    }
}

/// Immutable snapshot of the robot's logical state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobotState {
    pub direction: Direction,
    pub grid_x: i32,
    pub grid_y: i32,
    pub in_transition: bool,
}

/// Why a command could not be carried out.
///
/// These are invalid-request values carried in completion results — the
/// queue keeps draining after any of them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("a transition is already in flight")]
    Busy,
    #[error("target cell ({x}, {y}) is outside the grid")]
    OutOfBounds { x: i32, y: i32 },
    #[error("cell ({x}, {y}) is blocked")]
    Blocked { x: i32, y: i32 },
    #[error("unknown direction name: {0:?}")]
    UnknownDirection(String),
    #[error("no item within reach to pick up")]
    NothingToPickUp,
    #[error("already carrying an item")]
    HandsFull,
    #[error("not carrying anything")]
    NotCarrying,
    #[error("already at the final level")]
    AtFinalLevel,
    #[error("no such level: {0}")]
    NoSuchLevel(u32),
}

/// Result carried by a command's completion signal.
pub type ActionResult = Result<(), ActionError>;

/// How the current level ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelOutcome {
    Won,
    Failed,
}

/// Events emitted by the session, drained by the host each frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    /// Scene construction finished; queued commands start draining.
    Ready,
    LevelStarted { level: u32 },
    ItemPickedUp { item: EntityId },
    ItemDropped { item: EntityId, x: i32, y: i32 },
    LevelWon { level: u32 },
    LevelFailed { level: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_turn_cycle_is_south_east_north_west() {
        let mut d = Direction::South;
        let expected = [
            Direction::East,
            Direction::North,
            Direction::West,
            Direction::South,
        ];
        for want in expected {
            d = d.turned_left();
            assert_eq!(d, want);
        }
    }

    #[test]
    fn right_turn_cycle_is_south_west_north_east() {
        let mut d = Direction::South;
        let expected = [
            Direction::West,
            Direction::North,
            Direction::East,
            Direction::South,
        ];
        for want in expected {
            d = d.turned_right();
            assert_eq!(d, want);
        }
    }

    #[test]
    fn right_turn_undoes_left_turn() {
        for v in 0..4u8 {
            let d = Direction::from_u8(v).unwrap();
            assert_eq!(d.turned_left().turned_right(), d);
            assert_eq!(d.turned_right().turned_left(), d);
        }
    }

    #[test]
    fn round_trip_u8() {
        for v in 0..4u8 {
            assert_eq!(Direction::from_u8(v).unwrap().as_u8(), v);
        }
        assert!(Direction::from_u8(4).is_none());
    }

    #[test]
    fn name_round_trip() {
        for v in 0..4u8 {
            let d = Direction::from_u8(v).unwrap();
            assert_eq!(Direction::from_name(d.name()), Some(d));
        }
        assert_eq!(Direction::from_name("NORTH"), Some(Direction::North));
        assert!(Direction::from_name("up").is_none());
    }

    #[test]
    fn forward_offsets() {
        assert_eq!(Direction::East.forward_offset(), (1, 0));
        assert_eq!(Direction::West.forward_offset(), (-1, 0));
        assert_eq!(Direction::North.forward_offset(), (0, -1));
        assert_eq!(Direction::South.forward_offset(), (0, 1));
    }
}
