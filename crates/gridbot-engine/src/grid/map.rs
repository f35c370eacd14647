//! Level asset contract — the tile-layer description produced by the
//! map-loading collaborator, parsed from JSON.

use serde::{Deserialize, Serialize};

/// Kind of a map layer. Only tile layers produce sprites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    #[default]
    #[serde(rename = "tilelayer")]
    TileLayer,
    #[serde(rename = "objectgroup")]
    ObjectGroup,
}

/// One named layer: a flat per-cell tile-id array in row-major order.
/// 0 means empty; ids are 1-based otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapLayer {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: LayerKind,
    pub data: Vec<u32>,
}

/// A complete map description with named layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapData {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub layers: Vec<MapLayer>,
}

impl MapData {
    /// Parse a map from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Number of cells the declared dimensions imply. Computed in usize so
    /// absurd declared dimensions stay a mismatch diagnostic, not a fault.
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_two_layer_map() {
        let json = r#"{
            "width": 2,
            "height": 2,
            "layers": [
                { "name": "ground", "type": "tilelayer", "data": [1, 1, 1, 1] },
                { "name": "walls", "type": "tilelayer", "data": [0, 2, 0, 0] }
            ]
        }"#;
        let map = MapData::from_json(json).unwrap();
        assert_eq!(map.cell_count(), 4);
        assert_eq!(map.layers.len(), 2);
        assert_eq!(map.layers[1].name, "walls");
        assert_eq!(map.layers[1].data[1], 2);
    }

    #[test]
    fn layer_kind_defaults_to_tilelayer() {
        let json = r#"{
            "width": 1,
            "height": 1,
            "layers": [{ "name": "ground", "data": [1] }]
        }"#;
        let map = MapData::from_json(json).unwrap();
        assert_eq!(map.layers[0].kind, LayerKind::TileLayer);
    }

    #[test]
    fn missing_layers_parses_as_empty() {
        let map = MapData::from_json(r#"{ "width": 3, "height": 3 }"#).unwrap();
        assert!(map.layers.is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(MapData::from_json("not json").is_err());
    }

    #[test]
    fn absurd_dimensions_do_not_overflow() {
        let map = MapData {
            width: u32::MAX,
            height: u32::MAX,
            layers: Vec::new(),
        };
        assert_eq!(map.cell_count(), u32::MAX as usize * u32::MAX as usize);
    }
}
