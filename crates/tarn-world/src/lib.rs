//! Tile world, heightmap, and room identity/caching.
#![forbid(unsafe_code)]

pub mod rooms;
pub mod tiles;

pub use rooms::{ExitState, Room, RoomDirectory, SettingValue, Settings, SpawnRecord};
pub use tiles::{TileRef, TileSet, TileWorld};

use tarn_geom::Vec3;

/// Edge of one tile in world pixels (and voxels).
pub const TILE_SIZE: f32 = 16.0;
/// Room footprint in tiles.
pub const ROOM_TILE_W: usize = 16;
pub const ROOM_TILE_H: usize = 11;
/// Room footprint in world pixels.
pub const ROOM_PIXEL_W: f32 = TILE_SIZE * ROOM_TILE_W as f32;
pub const ROOM_PIXEL_H: f32 = TILE_SIZE * ROOM_TILE_H as f32;
/// Native overworld extent in world pixels.
pub const OVERWORLD_WIDTH: f32 = 4096.0;
pub const OVERWORLD_HEIGHT: f32 = 1408.0;
/// Dungeon floors sit far below the overworld plane.
pub const UNDERWORLD_FLOOR_Z: f32 = -1008.0;
/// Avatar altitude at or below this counts as "in the underworld".
pub const UNDERWORLD_Z_THRESHOLD: f32 = -1000.0;
/// Below this the shader samples the dungeon texture instead of the atlas.
pub const WORLD_BASE_Z_THRESHOLD: f32 = -100.0;

/// Fixed light directions fed to the shader per world half.
pub const OVERWORLD_LIGHT_DIRECTION: Vec3 = Vec3::new(-0.5, 0.5, 0.707);
pub const UNDERWORLD_LIGHT_DIRECTION: Vec3 = Vec3::new(0.0, 0.3, 0.954);

/// Room coordinate for a world position (floor division, so negative
/// positions land in negative rooms).
#[inline]
pub fn room_coord(x: f32, y: f32) -> (i32, i32) {
    (
        (x / ROOM_PIXEL_W).floor() as i32,
        (y / ROOM_PIXEL_H).floor() as i32,
    )
}

/// World-pixel origin of the room containing the position.
#[inline]
pub fn room_origin(x: f32, y: f32) -> (f32, f32) {
    let (rx, ry) = room_coord(x, y);
    (rx as f32 * ROOM_PIXEL_W, ry as f32 * ROOM_PIXEL_H)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_coord_floors_negative_positions() {
        assert_eq!(room_coord(0.0, 0.0), (0, 0));
        assert_eq!(room_coord(255.9, 175.9), (0, 0));
        assert_eq!(room_coord(256.0, 176.0), (1, 1));
        assert_eq!(room_coord(-1.0, -1.0), (-1, -1));
    }

    #[test]
    fn room_origin_is_a_multiple_of_room_size() {
        let (ox, oy) = room_origin(300.0, 200.0);
        assert_eq!((ox, oy), (256.0, 176.0));
    }
}
