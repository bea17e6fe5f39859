//! Tile descriptors and the layered tile grid.

use std::error::Error;
use std::fs;
use std::path::Path;

use hashbrown::HashMap;
use serde::Deserialize;

use crate::{OVERWORLD_HEIGHT, OVERWORLD_WIDTH, TILE_SIZE};

#[derive(Clone, Debug, Deserialize)]
struct TileDef {
    id: u16,
    name: String,
    #[serde(default)]
    walkable: bool,
}

#[derive(Clone, Debug, Deserialize)]
struct TilesConfig {
    #[serde(default)]
    tiles: Vec<TileDef>,
}

/// Immutable id -> descriptor table for tiles, loaded from TOML.
#[derive(Clone, Debug, Default)]
pub struct TileSet {
    by_id: HashMap<u16, (String, bool)>,
}

/// View of one tile cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileRef<'a> {
    pub id: u16,
    pub name: &'a str,
    pub walkable: bool,
}

impl TileSet {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: TilesConfig = toml::from_str(s)?;
        let mut by_id = HashMap::with_capacity(cfg.tiles.len());
        for t in cfg.tiles {
            by_id.insert(t.id, (t.name, t.walkable));
        }
        Ok(Self { by_id })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    pub fn get(&self, id: u16) -> Option<TileRef<'_>> {
        self.by_id.get(&id).map(|(name, walkable)| TileRef {
            id,
            name,
            walkable: *walkable,
        })
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// The static world: z-layered tile grid plus the heightmap derived from it.
/// Tile data never changes at runtime, so both are built once.
pub struct TileWorld {
    tileset: TileSet,
    /// layers[z][row][col]; id 0 means "no tile here".
    layers: Vec<Vec<Vec<u16>>>,
    /// Terrain altitude per (row, col): 16 per occupied layer.
    heights: Vec<Vec<i32>>,
    rows: usize,
    cols: usize,
}

impl TileWorld {
    pub fn new(tileset: TileSet, layers: Vec<Vec<Vec<u16>>>) -> Self {
        let rows = layers.first().map(|l| l.len()).unwrap_or(0);
        let cols = layers
            .first()
            .and_then(|l| l.first())
            .map(|r| r.len())
            .unwrap_or(0);
        let mut heights = vec![vec![0i32; cols]; rows];
        for layer in &layers {
            for (gy, row) in layer.iter().enumerate().take(rows) {
                for (gx, &id) in row.iter().enumerate().take(cols) {
                    if id != 0 {
                        heights[gy][gx] += TILE_SIZE as i32;
                    }
                }
            }
        }
        Self {
            tileset,
            layers,
            heights,
            rows,
            cols,
        }
    }

    pub fn tileset(&self) -> &TileSet {
        &self.tileset
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Tile at grid coordinates, or `None` off-grid and for empty cells.
    pub fn tile_at(&self, gx: i32, gy: i32, gz: i32) -> Option<TileRef<'_>> {
        if gx < 0 || gy < 0 || gz < 0 {
            return None;
        }
        let id = *self
            .layers
            .get(gz as usize)?
            .get(gy as usize)?
            .get(gx as usize)?;
        if id == 0 {
            return None;
        }
        self.tileset.get(id)
    }

    /// Grid cell for a world position.
    #[inline]
    pub fn grid_xy(x: f32, y: f32) -> (i32, i32) {
        ((x / TILE_SIZE).floor() as i32, (y / TILE_SIZE).floor() as i32)
    }

    /// Terrain altitude at a world position; off-map defaults to 0.
    pub fn world_z(&self, x: f32, y: f32) -> f32 {
        if x < 0.0 || y < 0.0 || x > OVERWORLD_WIDTH || y > OVERWORLD_HEIGHT {
            return 0.0;
        }
        let (gx, gy) = Self::grid_xy(x, y);
        self.heights
            .get(gy as usize)
            .and_then(|row| row.get(gx as usize))
            .copied()
            .unwrap_or(0) as f32
    }

    /// Whether an actor can stand at a world position: every occupied layer
    /// at the cell must be walkable. Off-grid positions are void and block.
    pub fn walkable_at(&self, x: f32, y: f32) -> bool {
        let (gx, gy) = Self::grid_xy(x, y);
        if gx < 0 || gy < 0 || gx as usize >= self.cols || gy as usize >= self.rows {
            return false;
        }
        for gz in 0..self.layers.len() {
            if let Some(tile) = self.tile_at(gx, gy, gz as i32) {
                if !tile.walkable {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TILES: &str = r#"
        [[tiles]]
        id = 82
        name = "ow_ground"
        walkable = true

        [[tiles]]
        id = 16
        name = "ow_rock"

        [[tiles]]
        id = 11
        name = "ow_path"
        walkable = true
    "#;

    fn world() -> TileWorld {
        let ts = TileSet::from_toml_str(TILES).unwrap();
        // Two layers: flat ground plus one rock in the middle.
        let ground = vec![vec![82u16; 4]; 3];
        let mut raised = vec![vec![0u16; 4]; 3];
        raised[1][2] = 16;
        TileWorld::new(ts, vec![ground, raised])
    }

    #[test]
    fn unknown_ids_and_empty_cells_are_none() {
        let w = world();
        assert!(w.tile_at(0, 0, 1).is_none());
        assert!(w.tile_at(-1, 0, 0).is_none());
        assert!(w.tile_at(99, 0, 0).is_none());
        assert_eq!(w.tile_at(0, 0, 0).unwrap().name, "ow_ground");
    }

    #[test]
    fn heights_stack_per_occupied_layer() {
        let w = world();
        assert_eq!(w.world_z(8.0, 8.0), 16.0);
        assert_eq!(w.world_z(2.5 * 16.0, 1.5 * 16.0), 32.0);
        // Off-map defaults to zero.
        assert_eq!(w.world_z(-5.0, 8.0), 0.0);
        assert_eq!(w.world_z(9000.0, 8.0), 0.0);
    }

    #[test]
    fn rocks_block_walking() {
        let w = world();
        assert!(w.walkable_at(8.0, 8.0));
        assert!(!w.walkable_at(2.5 * 16.0, 1.5 * 16.0));
        assert!(!w.walkable_at(-1.0, 8.0));
    }
}
