//! The robot's logical state machine: grid pose, facing, carry flag.
//!
//! Idle ⇄ Transitioning, with Idle the only resting state. The grid
//! position changes only through [`Robot::commit_transition`], which the session
//! calls when the movement transition completes — never mid-flight.

use crate::api::types::{ActionError, Direction, EntityId, RobotState};
use crate::grid::tilemap::LayeredTilemap;

#[derive(Debug, Clone)]
pub struct Robot {
    /// Scene entity animated on the robot's behalf.
    pub entity: EntityId,
    pub grid_x: i32,
    pub grid_y: i32,
    pub direction: Direction,
    pub in_transition: bool,
    /// Item entity being towed, if any.
    pub carrying: Option<EntityId>,
    /// Target cell of the in-flight move, committed on completion.
    pending_cell: Option<(i32, i32)>,
}

impl Robot {
    pub fn new(entity: EntityId, x: i32, y: i32, direction: Direction) -> Self {
        Self {
            entity,
            grid_x: x,
            grid_y: y,
            direction,
            in_transition: false,
            carrying: None,
            pending_cell: None,
        }
    }

    /// Immutable snapshot — never a live reference.
    pub fn state(&self) -> RobotState {
        RobotState {
            direction: self.direction,
            grid_x: self.grid_x,
            grid_y: self.grid_y,
            in_transition: self.in_transition,
        }
    }

    /// Atlas frame showing the current facing.
    pub fn face_frame(&self) -> u32 {
        self.direction.as_u8() as u32
    }

    /// The cell directly in front of the robot.
    pub fn cell_ahead(&self) -> (i32, i32) {
        let (dx, dy) = self.direction.forward_offset();
        (self.grid_x + dx, self.grid_y + dy)
    }

    /// The cell one step away, forward or backward.
    pub fn step_target(&self, reverse: bool) -> (i32, i32) {
        let (dx, dy) = self.direction.forward_offset();
        if reverse {
            (self.grid_x - dx, self.grid_y - dy)
        } else {
            (self.grid_x + dx, self.grid_y + dy)
        }
    }

    /// Validate a single-cell move. Rejects while a transition is in
    /// flight (defensive re-check — the queue already prevents overlap),
    /// out of bounds, or when any designated blocking layer has a tile at
    /// the target.
    pub fn check_move(
        &self,
        x: i32,
        y: i32,
        tilemap: &LayeredTilemap,
        blocking_layers: &[String],
    ) -> Result<(), ActionError> {
        if self.in_transition {
            return Err(ActionError::Busy);
        }
        if !tilemap.in_bounds(x, y) {
            return Err(ActionError::OutOfBounds { x, y });
        }
        for layer in blocking_layers {
            if tilemap.has_tile_at(x, y, layer) {
                return Err(ActionError::Blocked { x, y });
            }
        }
        Ok(())
    }

    /// Mark the move in flight. `check_move` must have passed.
    pub fn begin_move(&mut self, x: i32, y: i32) {
        self.in_transition = true;
        self.pending_cell = Some((x, y));
    }

    /// Mark a rotation settle in flight and return the new facing.
    /// Negative delta turns counter-clockwise, positive clockwise, one
    /// 90° step per call. The visible frame updates immediately; the
    /// settle delay only holds the queue.
    pub fn begin_turn(&mut self, delta: i8) -> Result<Direction, ActionError> {
        if self.in_transition {
            return Err(ActionError::Busy);
        }
        self.direction = if delta < 0 {
            self.direction.turned_left()
        } else {
            self.direction.turned_right()
        };
        self.in_transition = true;
        Ok(self.direction)
    }

    /// Commit the completed transition. For moves this is the one place
    /// the grid position changes; returns the committed cell.
    pub fn commit_transition(&mut self) -> Option<(i32, i32)> {
        self.in_transition = false;
        let cell = self.pending_cell.take();
        if let Some((x, y)) = cell {
            self.grid_x = x;
            self.grid_y = y;
        }
        cell
    }

    /// Turns needed to reach `target`, as (count, per-step delta). The
    /// shorter way around wins; ties turn left. Both cycles are walked
    /// explicitly since left and right follow different permutations.
    pub fn turns_to_face(&self, target: Direction) -> (u32, i8) {
        let mut left = 0u32;
        let mut d = self.direction;
        while d != target {
            d = d.turned_left();
            left += 1;
        }
        let mut right = 0u32;
        let mut d = self.direction;
        while d != target {
            d = d.turned_right();
            right += 1;
        }
        if left <= right {
            (left, -1)
        } else {
            (right, 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::map::MapData;
    use crate::grid::projector::IsoProjector;
    use crate::render::HeadlessBackend;

    fn walled_map() -> LayeredTilemap {
        let map = MapData::from_json(
            r#"{
                "width": 4, "height": 4,
                "layers": [
                    { "name": "ground", "data": [1,1,1,1, 1,1,1,1, 1,1,1,1, 1,1,1,1] },
                    { "name": "walls",  "data": [0,0,0,0, 0,0,9,0, 0,0,0,0, 0,0,0,0] }
                ]
            }"#,
        )
        .unwrap();
        let mut backend = HeadlessBackend::new();
        LayeredTilemap::build(&map, IsoProjector::new(64.0, 32.0), 8.0, &mut backend)
    }

    #[test]
    fn snapshot_is_detached() {
        let mut robot = Robot::new(EntityId(1), 2, 3, Direction::East);
        let snap = robot.state();
        robot.grid_x = 9;
        assert_eq!(snap.grid_x, 2);
        assert_eq!(snap.direction, Direction::East);
    }

    #[test]
    fn move_guards() {
        let tm = walled_map();
        let blocking = vec!["walls".to_string()];
        let robot = Robot::new(EntityId(1), 1, 1, Direction::East);

        assert_eq!(
            robot.check_move(4, 1, &tm, &blocking),
            Err(ActionError::OutOfBounds { x: 4, y: 1 })
        );
        assert_eq!(
            robot.check_move(2, 1, &tm, &blocking),
            Err(ActionError::Blocked { x: 2, y: 1 })
        );
        assert!(robot.check_move(1, 2, &tm, &blocking).is_ok());
    }

    #[test]
    fn busy_rejects_moves_and_turns() {
        let tm = walled_map();
        let mut robot = Robot::new(EntityId(1), 0, 0, Direction::South);
        robot.begin_move(0, 1);
        assert_eq!(
            robot.check_move(1, 0, &tm, &[]),
            Err(ActionError::Busy)
        );
        assert_eq!(robot.begin_turn(1), Err(ActionError::Busy));
    }

    #[test]
    fn grid_position_commits_only_on_completion() {
        let mut robot = Robot::new(EntityId(1), 0, 0, Direction::South);
        robot.begin_move(0, 1);
        assert_eq!((robot.grid_x, robot.grid_y), (0, 0));
        assert!(robot.in_transition);

        assert_eq!(robot.commit_transition(), Some((0, 1)));
        assert_eq!((robot.grid_x, robot.grid_y), (0, 1));
        assert!(!robot.in_transition);
    }

    #[test]
    fn turn_updates_facing_immediately() {
        let mut robot = Robot::new(EntityId(1), 0, 0, Direction::South);
        assert_eq!(robot.begin_turn(-1), Ok(Direction::East));
        assert_eq!(robot.direction, Direction::East);
        assert!(robot.in_transition);
        robot.commit_transition();
        assert_eq!(robot.begin_turn(1), Ok(Direction::South));
    }

    #[test]
    fn turns_to_face_picks_the_short_way() {
        let robot = Robot::new(EntityId(1), 0, 0, Direction::South);
        assert_eq!(robot.turns_to_face(Direction::South), (0, -1));
        // One left turn reaches East.
        assert_eq!(robot.turns_to_face(Direction::East), (1, -1));
        // One right turn reaches West.
        assert_eq!(robot.turns_to_face(Direction::West), (1, 1));
        // Opposite facing: two turns either way, left wins the tie.
        assert_eq!(robot.turns_to_face(Direction::North), (2, -1));
    }

    #[test]
    fn cell_ahead_follows_facing() {
        let robot = Robot::new(EntityId(1), 2, 2, Direction::North);
        assert_eq!(robot.cell_ahead(), (2, 1));
        assert_eq!(robot.step_target(true), (2, 3));
    }
}
