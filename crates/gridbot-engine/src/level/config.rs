//! Static per-level configuration. Loaded once per level activation and
//! immutable from then on.

use serde::{Deserialize, Serialize};

use crate::grid::map::MapData;

/// A grid cell reference in level data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

/// Where the player starts, and facing which way (0=S, 1=W, 2=N, 3=E).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StartPose {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub direction: u8,
}

/// An item placed into the level at spawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSpawn {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub name: String,
}

/// One level's static description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelConfig {
    pub title: String,
    #[serde(default)]
    pub instructions: String,
    pub map: MapData,
    pub start: StartPose,
    #[serde(default)]
    pub items: Vec<ItemSpawn>,
    #[serde(default)]
    pub goals: Vec<GridCell>,
    #[serde(default)]
    pub conveyor_layer: Option<String>,
    #[serde(default)]
    pub blocking_layers: Vec<String>,
}

impl LevelConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_goal(&self, x: i32, y: i32) -> bool {
        self.goals.iter().any(|g| g.x == x && g.y == y)
    }
}

/// Ordered set of levels; level numbers are 1-based.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSet {
    pub levels: Vec<LevelConfig>,
}

impl LevelSet {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level by 1-based number.
    pub fn get(&self, number: u32) -> Option<&LevelConfig> {
        if number == 0 {
            return None;
        }
        self.levels.get(number as usize - 1)
    }
}
