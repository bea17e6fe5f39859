use tarn_world::rooms::{ExitState, Room, RoomDirectory, SettingValue, Settings};
use tarn_world::tiles::{TileSet, TileWorld};
use tarn_world::{ROOM_PIXEL_H, ROOM_PIXEL_W, room_coord};

use proptest::prelude::*;
use std::collections::BTreeMap;
use tarn_geom::Facing;

const TILES: &str = r#"
    [[tiles]]
    id = 82
    name = "ow_ground"
    walkable = true

    [[tiles]]
    id = 16
    name = "ow_rock"

    [[tiles]]
    id = 40
    name = "Coin"
    walkable = true
"#;

/// Two rooms wide, one room tall: flat ground with a coin tile in each room.
fn world() -> TileWorld {
    let ts = TileSet::from_toml_str(TILES).unwrap();
    let mut ground = vec![vec![82u16; 32]; 11];
    ground[4][3] = 40;
    ground[6][20] = 40;
    TileWorld::new(ts, vec![ground])
}

fn directory() -> RoomDirectory {
    RoomDirectory::new(["Coin".to_string(), "Octorok".to_string()])
}

#[test]
fn room_at_caches_and_matches_floor_coords() {
    let w = world();
    let mut dir = directory();
    let a = dir.room_at(&w, 10.0, 10.0, 0.0).clone();
    let b = dir.room_at(&w, 200.0, 100.0, 0.0).clone();
    assert_eq!(a, b, "same room coordinate must return the cached room");
    assert_eq!(a.coords(), (0, 0));
    let c = dir.room_at(&w, 300.0, 10.0, 0.0);
    assert_eq!(c.coords(), (1, 0));
}

#[test]
fn manifests_are_deterministic() {
    let w = world();
    let r1 = directory().room_at(&w, 10.0, 10.0, 0.0).clone();
    let r2 = directory().room_at(&w, 10.0, 10.0, 0.0).clone();
    assert_eq!(r1.actors, r2.actors);
    assert_eq!(r1.actors.len(), 1);
    assert_eq!(r1.actors[0].type_name, "Coin");
    assert_eq!(r1.actors[0].actor_count_number, 0);
    // Tile (3,4) spawns at the tile center.
    assert_eq!(r1.actors[0].x, 3.0 * 16.0 + 8.0);
    assert_eq!(r1.actors[0].y, 4.0 * 16.0 + 8.0);
}

#[test]
fn overrides_merge_and_append() {
    let w = world();
    let mut dir = directory();
    let mut coin_settings: Settings = BTreeMap::new();
    coin_settings.insert("bounty".into(), SettingValue::Number(5.0));
    dir.set_override(0, 0, "Coin", coin_settings);
    let mut octorok: Settings = BTreeMap::new();
    octorok.insert("x".into(), SettingValue::Number(64.0));
    dir.set_override(0, 0, "Octorok", octorok);

    let room = dir.room_at(&w, 10.0, 10.0, 0.0);
    assert_eq!(room.actors.len(), 2);
    // The coin keeps its tile position and absorbs the override settings.
    assert_eq!(room.actors[0].type_name, "Coin");
    assert!(room.actors[0].settings.contains_key("bounty"));
    // The octorok has no tile, so it appends at (0,0).
    assert_eq!(room.actors[1].type_name, "Octorok");
    assert_eq!((room.actors[1].x, room.actors[1].y), (0.0, 0.0));
    assert_eq!(room.actors[1].actor_count_number, 1);
}

#[test]
fn unique_names_distinguish_dungeons() {
    let overworld = Room {
        x: 2,
        y: 3,
        dungeon_name: None,
        song: None,
        is_in_underworld: false,
        actors: Vec::new(),
        camera_eye_offset: None,
        camera_target_offset: None,
        exit_by_facing: BTreeMap::new(),
    };
    let mut dungeon = overworld.clone();
    dungeon.dungeon_name = Some("D1".into());
    assert_eq!(RoomDirectory::unique_name(&overworld), "Overworld,2,3");
    assert_ne!(
        RoomDirectory::unique_name(&overworld),
        RoomDirectory::unique_name(&dungeon)
    );
}

#[test]
fn exits_allow_open_and_bombable_only() {
    let mut room = Room {
        x: 0,
        y: 0,
        dungeon_name: Some("D1".into()),
        song: None,
        is_in_underworld: true,
        actors: Vec::new(),
        camera_eye_offset: None,
        camera_target_offset: None,
        exit_by_facing: BTreeMap::new(),
    };
    // No exit records at all means the room is open on every side.
    assert!(RoomDirectory::can_exit(&room, Facing::Up));
    room.exit_by_facing.insert(Facing::Up, ExitState::Open);
    room.exit_by_facing.insert(Facing::Down, ExitState::Locked);
    room.exit_by_facing.insert(Facing::Left, ExitState::Walled);
    room.exit_by_facing.insert(Facing::Right, ExitState::Bombable);
    assert!(RoomDirectory::can_exit(&room, Facing::Up));
    assert!(!RoomDirectory::can_exit(&room, Facing::Down));
    assert!(!RoomDirectory::can_exit(&room, Facing::Left));
    assert!(RoomDirectory::can_exit(&room, Facing::Right));
}

#[test]
fn underworld_rooms_take_dungeon_names() {
    let w = world();
    let mut dir = directory();
    dir.set_dungeon(0, -6, "D1");
    let room = dir.room_at(&w, 10.0, -1000.0, -1008.0);
    assert!(room.is_in_underworld);
    assert_eq!(room.dungeon_name.as_deref(), Some("D1"));
    assert_eq!(room.song.as_deref(), Some("underworld"));
    assert!(room.actors.is_empty(), "no tile scan below ground");
}

proptest! {
    #[test]
    fn room_coord_is_floor_division(x in -10_000.0f32..10_000.0, y in -10_000.0f32..10_000.0) {
        let (rx, ry) = room_coord(x, y);
        prop_assert_eq!(rx, (x / ROOM_PIXEL_W).floor() as i32);
        prop_assert_eq!(ry, (y / ROOM_PIXEL_H).floor() as i32);
        // The room origin never sits past the position.
        prop_assert!(rx as f32 * ROOM_PIXEL_W <= x);
        prop_assert!(ry as f32 * ROOM_PIXEL_H <= y);
    }
}
