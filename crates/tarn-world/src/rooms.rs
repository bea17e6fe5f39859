//! Room identity, lazy construction, and the process-lifetime room cache.

use std::collections::BTreeMap;

use hashbrown::{HashMap, HashSet};
use serde::Deserialize;
use tarn_geom::{Facing, Vec3};

use crate::tiles::TileWorld;
use crate::{ROOM_TILE_H, ROOM_TILE_W, TILE_SIZE, UNDERWORLD_Z_THRESHOLD, room_coord};

/// A per-actor spawn setting. Settings come from the per-room override table
/// and are copied onto freshly spawned actors.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

pub type Settings = BTreeMap<String, SettingValue>;

/// Recorded state of a room exit. Only open and bombable exits are
/// traversable; locked and walled exits block until something else changes
/// the record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExitState {
    Open,
    Locked,
    Walled,
    Bombable,
}

/// A template for one actor the room wants to exist — not a live entity.
/// `actor_count_number` is the stable manifest position used to persist
/// "already defeated/collected" state across re-entry.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnRecord {
    pub type_name: String,
    pub x: f32,
    pub y: f32,
    pub actor_count_number: u32,
    pub settings: Settings,
}

/// A fixed-size region of the world with a cached, deterministic actor
/// manifest and per-region camera/exit metadata. The manifest is immutable
/// after first construction; live actors are built from it on every entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Room {
    pub x: i32,
    pub y: i32,
    pub dungeon_name: Option<String>,
    pub song: Option<String>,
    pub is_in_underworld: bool,
    pub actors: Vec<SpawnRecord>,
    pub camera_eye_offset: Option<Vec3>,
    pub camera_target_offset: Option<Vec3>,
    pub exit_by_facing: BTreeMap<Facing, ExitState>,
}

impl Room {
    #[inline]
    pub fn coords(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// Builds rooms lazily from the tile map and caches them for the process
/// lifetime — overworld geometry never changes at runtime, so identity is
/// stable across repeated visits.
pub struct RoomDirectory {
    cache: HashMap<(i32, i32), Room>,
    /// Tile names that spawn an actor when scanned.
    spawnable: HashSet<String>,
    /// Per-room, per-actor-type spawn settings.
    overrides: HashMap<(i32, i32), BTreeMap<String, Settings>>,
    /// Rooms belonging to a named dungeon (underworld namespacing).
    dungeons: HashMap<(i32, i32), String>,
}

impl RoomDirectory {
    pub fn new(spawnable: impl IntoIterator<Item = String>) -> Self {
        Self {
            cache: HashMap::new(),
            spawnable: spawnable.into_iter().collect(),
            overrides: HashMap::new(),
            dungeons: HashMap::new(),
        }
    }

    pub fn set_override(&mut self, rx: i32, ry: i32, actor_type: &str, settings: Settings) {
        self.overrides
            .entry((rx, ry))
            .or_default()
            .insert(actor_type.to_string(), settings);
    }

    pub fn set_dungeon(&mut self, rx: i32, ry: i32, name: &str) {
        self.dungeons.insert((rx, ry), name.to_string());
    }

    /// The room containing a world position, building and caching it on
    /// first sight.
    pub fn room_at(&mut self, world: &TileWorld, x: f32, y: f32, z: f32) -> &Room {
        let key = room_coord(x, y);
        if !self.cache.contains_key(&key) {
            let room = self.build_room(world, key, z);
            self.cache.insert(key, room);
        }
        &self.cache[&key]
    }

    /// Unique persistence key: `"{dungeon||Overworld},{x},{y}"`.
    pub fn unique_name(room: &Room) -> String {
        let dungeon = room.dungeon_name.as_deref().unwrap_or("Overworld");
        format!("{},{},{}", dungeon, room.x, room.y)
    }

    /// Whether an actor may leave the room through `facing`.
    pub fn can_exit(room: &Room, facing: Facing) -> bool {
        if room.exit_by_facing.is_empty() {
            return true;
        }
        matches!(
            room.exit_by_facing.get(&facing),
            Some(ExitState::Open) | Some(ExitState::Bombable)
        )
    }

    /// Unique names of every room built so far (used when the overworld is
    /// reset and all persisted hidden flags are dropped).
    pub fn cached_unique_names(&self) -> Vec<String> {
        self.cache.values().map(Self::unique_name).collect()
    }

    fn build_room(&self, world: &TileWorld, (rx, ry): (i32, i32), z: f32) -> Room {
        let is_in_underworld = z <= UNDERWORLD_Z_THRESHOLD;
        let song = if is_in_underworld {
            "underworld"
        } else {
            "overworld"
        };
        let mut room = Room {
            x: rx,
            y: ry,
            dungeon_name: self.dungeons.get(&(rx, ry)).cloned(),
            song: Some(song.to_string()),
            is_in_underworld,
            actors: Vec::new(),
            camera_eye_offset: None,
            camera_target_offset: None,
            exit_by_facing: BTreeMap::new(),
        };

        let overrides = self
            .overrides
            .get(&(rx, ry))
            .cloned()
            .unwrap_or_default();
        let mut used_overrides: HashSet<String> = HashSet::new();

        // Underworld rooms have no overworld tile footprint; their manifest
        // comes entirely from the override table.
        if !is_in_underworld {
            let base_gx = rx * ROOM_TILE_W as i32;
            let base_gy = ry * ROOM_TILE_H as i32;
            for gx in 0..ROOM_TILE_W as i32 {
                for gy in 0..ROOM_TILE_H as i32 {
                    let Some(tile) = world.tile_at(base_gx + gx, base_gy + gy, 0) else {
                        continue;
                    };
                    if self.spawnable.contains(tile.name) {
                        let name = tile.name.to_string();
                        let settings = overrides.get(tile.name).cloned().unwrap_or_default();
                        if overrides.contains_key(tile.name) {
                            used_overrides.insert(name.clone());
                        }
                        let count = room.actors.len() as u32;
                        room.actors.push(SpawnRecord {
                            type_name: name,
                            x: (base_gx + gx) as f32 * TILE_SIZE + 8.0,
                            y: (base_gy + gy) as f32 * TILE_SIZE + 8.0,
                            actor_count_number: count,
                            settings,
                        });
                    } else if !tile.name.contains('_') {
                        // Underscore-named tiles are terrain variants; the
                        // rest look like actor types we do not know.
                        log::warn!("could not find actor: {}", tile.name);
                    }
                }
            }
        }

        // Override entries with no tile on the floor still spawn, at (0,0),
        // expecting their settings to carry a position.
        for (name, settings) in overrides.iter() {
            if used_overrides.contains(name) {
                continue;
            }
            let count = room.actors.len() as u32;
            room.actors.push(SpawnRecord {
                type_name: name.clone(),
                x: 0.0,
                y: 0.0,
                actor_count_number: count,
                settings: settings.clone(),
            });
        }

        room
    }
}
