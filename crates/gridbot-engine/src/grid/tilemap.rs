//! Layered isometric tilemap.
//!
//! Built once from a [`MapData`] description: every non-zero cell of every
//! tile layer becomes a backend sprite at its projected screen point, with
//! an elevation offset that grows with the layer index. The tilemap keeps
//! the raw per-layer grids for presence/lookup queries and owns the paint
//! order of its sprites.

use log::warn;

use crate::grid::map::{LayerKind, MapData};
use crate::grid::projector::IsoProjector;
use crate::render::{SpriteBackend, SpriteDesc, SpriteId};

/// One placed tile sprite, keyed by layer index and grid coordinate.
#[derive(Debug, Clone, Copy)]
pub struct TileSprite {
    pub layer: usize,
    pub x: u32,
    pub y: u32,
    pub tile_id: u32,
    pub sprite: SpriteId,
    /// Paint-order rank assigned by `update_depth`.
    pub depth: u32,
}

#[derive(Debug, Clone)]
struct LayerData {
    name: String,
    tiles: Vec<u32>,
}

/// Per-layer tile grids plus the sprites placed from them.
#[derive(Debug)]
pub struct LayeredTilemap {
    width: u32,
    height: u32,
    projector: IsoProjector,
    layers: Vec<LayerData>,
    sprites: Vec<TileSprite>,
}

impl LayeredTilemap {
    /// Build the tilemap, registering one sprite per non-zero cell.
    ///
    /// An empty or malformed map is not fatal: it logs and yields an empty
    /// tilemap. Layers whose data length does not match width×height are
    /// skipped. Object layers carry no tiles and are skipped silently.
    pub fn build<B: SpriteBackend>(
        map: &MapData,
        projector: IsoProjector,
        elevation_step: f32,
        backend: &mut B,
    ) -> Self {
        let mut tilemap = Self {
            width: map.width,
            height: map.height,
            projector,
            layers: Vec::new(),
            sprites: Vec::new(),
        };

        if map.layers.is_empty() {
            warn!("map has no layers; building an empty tilemap");
            return tilemap;
        }

        for layer in &map.layers {
            if layer.kind != LayerKind::TileLayer {
                continue;
            }
            if layer.data.len() != map.cell_count() {
                warn!(
                    "layer {:?} has {} cells, expected {}; skipping",
                    layer.name,
                    layer.data.len(),
                    map.cell_count()
                );
                continue;
            }

            let layer_index = tilemap.layers.len();
            let z = layer_index as f32 * elevation_step;
            for y in 0..map.height {
                for x in 0..map.width {
                    let tile_id = layer.data[(y * map.width + x) as usize];
                    if tile_id == 0 {
                        continue;
                    }
                    let pos = projector.grid_to_screen(x as i32, y as i32, z);
                    let sprite = backend.spawn(SpriteDesc {
                        frame: tile_id - 1,
                        pos,
                    });
                    tilemap.sprites.push(TileSprite {
                        layer: layer_index,
                        x,
                        y,
                        tile_id,
                        sprite,
                        depth: 0,
                    });
                }
            }
            tilemap.layers.push(LayerData {
                name: layer.name.clone(),
                tiles: layer.data.clone(),
            });
        }

        tilemap.update_depth(backend);
        tilemap
    }

    /// Recompute paint order over all tile sprites.
    ///
    /// Total order: layer index ascending, then grid Y, then grid X. Lower
    /// layers always paint first regardless of grid position; within a
    /// layer, cells further down/right occlude cells further up/left.
    pub fn update_depth<B: SpriteBackend>(&mut self, backend: &mut B) {
        self.sprites
            .sort_by_key(|t| (t.layer, t.y, t.x));
        for (rank, tile) in self.sprites.iter_mut().enumerate() {
            tile.depth = rank as u32;
            backend.set_depth(tile.sprite, tile.depth);
        }
    }

    fn layer_index(&self, name: &str) -> Option<usize> {
        let idx = self.layers.iter().position(|l| l.name == name);
        if idx.is_none() {
            warn!("unknown tile layer {name:?}");
        }
        idx
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Whether the named layer has a tile at (x, y).
    /// Unknown layer names are non-fatal: logged, reported as absent.
    pub fn has_tile_at(&self, x: i32, y: i32, layer: &str) -> bool {
        self.tile_at(x, y, layer).is_some()
    }

    /// Tile id at (x, y) on the named layer, if any.
    pub fn tile_at(&self, x: i32, y: i32, layer: &str) -> Option<u32> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let idx = self.layer_index(layer)?;
        let id = self.layers[idx].tiles[(y as u32 * self.width + x as u32) as usize];
        (id != 0).then_some(id)
    }

    /// All (layer name, tile id) pairs present at (x, y), bottom-up.
    pub fn tiles_at(&self, x: i32, y: i32) -> Vec<(&str, u32)> {
        if !self.in_bounds(x, y) {
            return Vec::new();
        }
        let cell = (y as u32 * self.width + x as u32) as usize;
        self.layers
            .iter()
            .filter_map(|l| {
                let id = l.tiles[cell];
                (id != 0).then_some((l.name.as_str(), id))
            })
            .collect()
    }

    /// Iterate the placed tile sprites in paint order.
    pub fn sprites(&self) -> impl Iterator<Item = &TileSprite> {
        self.sprites.iter()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn projector(&self) -> IsoProjector {
        self.projector
    }

    /// Release all owned sprites. The instance must be discarded afterwards.
    pub fn destroy<B: SpriteBackend>(&mut self, backend: &mut B) {
        for tile in self.sprites.drain(..) {
            backend.destroy(tile.sprite);
        }
        self.layers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessBackend;

    fn projector() -> IsoProjector {
        IsoProjector::new(64.0, 32.0)
    }

    fn two_layer_map() -> MapData {
        MapData::from_json(
            r#"{
                "width": 3,
                "height": 3,
                "layers": [
                    { "name": "ground", "data": [1,1,1, 1,1,1, 1,1,1] },
                    { "name": "props", "data": [0,0,0, 0,5,0, 0,0,2] }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn build_places_one_sprite_per_nonzero_cell() {
        let mut backend = HeadlessBackend::new();
        let map = two_layer_map();
        let tm = LayeredTilemap::build(&map, projector(), 8.0, &mut backend);
        // 9 ground tiles + 2 props
        assert_eq!(tm.sprites().count(), 11);
        assert_eq!(backend.live_count(), 11);
    }

    #[test]
    fn empty_map_builds_empty_tilemap() {
        let mut backend = HeadlessBackend::new();
        let map = MapData::from_json(r#"{ "width": 4, "height": 4 }"#).unwrap();
        let tm = LayeredTilemap::build(&map, projector(), 8.0, &mut backend);
        assert_eq!(tm.sprites().count(), 0);
        assert_eq!(backend.live_count(), 0);
    }

    #[test]
    fn mismatched_layer_is_skipped() {
        let mut backend = HeadlessBackend::new();
        let map = MapData::from_json(
            r#"{
                "width": 2, "height": 2,
                "layers": [{ "name": "bad", "data": [1, 1, 1] }]
            }"#,
        )
        .unwrap();
        let tm = LayeredTilemap::build(&map, projector(), 8.0, &mut backend);
        assert_eq!(tm.sprites().count(), 0);
        assert!(!tm.has_tile_at(0, 0, "bad"));
    }

    #[test]
    fn absurd_declared_dimensions_fail_soft() {
        use crate::grid::map::MapLayer;

        let mut backend = HeadlessBackend::new();
        let map = MapData {
            width: u32::MAX,
            height: u32::MAX,
            layers: vec![MapLayer {
                name: "ground".to_string(),
                kind: LayerKind::TileLayer,
                data: vec![1],
            }],
        };
        // Every layer mismatches the declared cell count, so the build
        // yields an empty tilemap instead of faulting.
        let tm = LayeredTilemap::build(&map, projector(), 8.0, &mut backend);
        assert_eq!(tm.sprites().count(), 0);
        assert_eq!(backend.live_count(), 0);
    }

    #[test]
    fn lookups() {
        let mut backend = HeadlessBackend::new();
        let tm = LayeredTilemap::build(&two_layer_map(), projector(), 8.0, &mut backend);

        assert!(tm.has_tile_at(1, 1, "props"));
        assert!(!tm.has_tile_at(0, 0, "props"));
        assert_eq!(tm.tile_at(2, 2, "props"), Some(2));
        assert_eq!(tm.tile_at(2, 2, "nope"), None);
        assert!(!tm.has_tile_at(-1, 0, "ground"));

        let stack = tm.tiles_at(1, 1);
        assert_eq!(stack, vec![("ground", 1), ("props", 5)]);
    }

    #[test]
    fn depth_ranks_layers_then_rows() {
        let mut backend = HeadlessBackend::new();
        let tm = LayeredTilemap::build(&two_layer_map(), projector(), 8.0, &mut backend);

        let find = |layer: usize, x: u32, y: u32| {
            tm.sprites()
                .find(|t| t.layer == layer && t.x == x && t.y == y)
                .unwrap()
                .depth
        };

        // Same layer: smaller y paints first; same row: smaller x first.
        assert!(find(0, 0, 0) < find(0, 0, 1));
        assert!(find(0, 0, 1) < find(0, 1, 1));
        // Any ground tile paints before any props tile, even the far corner.
        assert!(find(0, 2, 2) < find(1, 1, 1));

        // Ranks are the positions of the sorted sequence.
        let mut ranks: Vec<u32> = tm.sprites().map(|t| t.depth).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, (0..11).collect::<Vec<u32>>());
    }

    #[test]
    fn higher_layers_are_elevated() {
        let mut backend = HeadlessBackend::new();
        let tm = LayeredTilemap::build(&two_layer_map(), projector(), 8.0, &mut backend);

        let ground = tm.sprites().find(|t| t.layer == 0 && t.x == 1 && t.y == 1).unwrap();
        let props = tm.sprites().find(|t| t.layer == 1 && t.x == 1 && t.y == 1).unwrap();
        let g = backend.sprite(ground.sprite).unwrap().pos;
        let p = backend.sprite(props.sprite).unwrap().pos;
        assert_eq!(p.x, g.x);
        assert_eq!(p.y, g.y - 8.0);
    }

    #[test]
    fn destroy_releases_every_sprite() {
        let mut backend = HeadlessBackend::new();
        let mut tm = LayeredTilemap::build(&two_layer_map(), projector(), 8.0, &mut backend);
        assert!(backend.live_count() > 0);
        tm.destroy(&mut backend);
        assert_eq!(backend.live_count(), 0);
    }
}
