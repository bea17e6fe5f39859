use tarn_actors::actor::{Actor, ActorCtx, SpawnInit, SpawnRequest};
use tarn_actors::{
    ActorRegistry, Avatar, Button, GameEvent, InputState, RecordingAudio, SaveState,
    ScheduledEvents,
};
use tarn_geom::{Facing, Vec3};
use tarn_lightmap::{LightMap, LightStamps};
use tarn_sprites::DrawList;
use tarn_world::tiles::{TileSet, TileWorld};

const TILES: &str = r#"
    [[tiles]]
    id = 82
    name = "ow_ground"
    walkable = true
"#;

struct Rig {
    world: TileWorld,
    light: LightMap,
    stamps: LightStamps,
    draws: DrawList,
    audio: RecordingAudio,
    state: SaveState,
    events: ScheduledEvents,
    spawns: Vec<SpawnRequest>,
    tick: u64,
}

impl Rig {
    fn new() -> Self {
        let ts = TileSet::from_toml_str(TILES).unwrap();
        let ground = vec![vec![82u16; 32]; 22];
        Self {
            world: TileWorld::new(ts, vec![ground]),
            light: LightMap::new(),
            stamps: LightStamps::defaults(),
            draws: DrawList::new(),
            audio: RecordingAudio::new(),
            state: SaveState::new(),
            events: ScheduledEvents::new(),
            spawns: Vec::new(),
            tick: 0,
        }
    }

    fn ctx(&mut self, avatar_pos: Vec3) -> ActorCtx<'_> {
        ActorCtx {
            tick: self.tick,
            is_blink_frame: self.tick % 3 == 0,
            world: &self.world,
            light: &mut self.light,
            stamps: &self.stamps,
            draws: &mut self.draws,
            audio: &mut self.audio,
            state: &mut self.state,
            events: &mut self.events,
            avatar_pos,
            spawns: &mut self.spawns,
        }
    }
}

fn spawn(reg: &ActorRegistry, name: &str, x: f32, y: f32) -> Box<dyn Actor> {
    reg.spawn(
        name,
        SpawnInit {
            x,
            y,
            ..SpawnInit::default()
        },
    )
    .unwrap()
}

#[test]
fn take_damage_is_a_noop_while_invincible() {
    let mut rig = Rig::new();
    let mut avatar = Avatar::new();
    avatar.take_damage(1.0, &mut rig.audio);
    assert_eq!(avatar.hit_points, 2.0);
    let counter = avatar.invincible_counter;
    assert!(counter > 0);
    avatar.take_damage(1.0, &mut rig.audio);
    assert_eq!(avatar.hit_points, 2.0, "invincible damage must not apply");
    assert_eq!(avatar.invincible_counter, counter, "timer must not reset");
}

#[test]
fn change_hit_points_never_exceeds_max() {
    let mut rig = Rig::new();
    let mut avatar = Avatar::new();
    avatar.hit_points = 2.0;
    avatar.change_hit_points(5.0, &mut rig.audio);
    assert_eq!(avatar.hit_points, avatar.max_hit_points);
    avatar.change_hit_points(0.5, &mut rig.audio);
    assert_eq!(avatar.hit_points, avatar.max_hit_points);
}

#[test]
fn sword_swing_plays_hit_sound_once_for_many_targets() {
    let mut rig = Rig::new();
    let reg = ActorRegistry::standard();
    let mut avatar = Avatar::new();
    avatar.facing = Facing::Right;
    avatar.pos = Vec3::new(64.0, 64.0, 0.0);

    // Two enemies stacked on both sword test points.
    let mut others = vec![
        spawn(&reg, "Octorok", 64.0 + 33.0, 64.0),
        spawn(&reg, "Octorok", 64.0 + 16.0, 64.0),
    ];
    let pos = avatar.pos;
    let mut ctx = rig.ctx(pos);
    let hit = avatar.hit_with_sword(&mut ctx, &mut others);
    assert!(hit);
    assert_eq!(rig.audio.count_played("hit"), 1);
}

#[test]
fn sword_swing_collects_pickups_without_hit_sound() {
    let mut rig = Rig::new();
    let reg = ActorRegistry::standard();
    let mut avatar = Avatar::new();
    avatar.facing = Facing::Right;
    avatar.pos = Vec3::new(64.0, 64.0, 0.0);

    let mut others = vec![spawn(&reg, "Coin", 64.0 + 33.0, 64.0)];
    let pos = avatar.pos;
    let mut ctx = rig.ctx(pos);
    let hit = avatar.hit_with_sword(&mut ctx, &mut others);
    assert!(!hit, "pickups never count as a damaging hit");
    assert_eq!(rig.state.coins, 1);
    assert!(others[0].is_hidden());
    assert_eq!(rig.audio.count_played("hit"), 0);
}

#[test]
fn full_health_swing_without_hit_launches_one_beam() {
    let mut rig = Rig::new();
    let mut avatar = Avatar::new();
    rig.state.add_item("itemwoodensword");
    let mut others: Vec<Box<dyn Actor>> = Vec::new();

    let mut input = InputState::new();
    input.press(Button::Attack);
    let pos = avatar.pos;
    let mut ctx = rig.ctx(pos);
    avatar.tick(&mut ctx, &input, &mut others);
    assert_eq!(
        rig.spawns
            .iter()
            .filter(|s| s.type_name == "FlyingSword")
            .count(),
        1
    );
    assert_eq!(rig.audio.count_played("swordshoot"), 1);
}

#[test]
fn wounded_swing_never_launches_a_beam() {
    let mut rig = Rig::new();
    let mut avatar = Avatar::new();
    rig.state.add_item("itemwoodensword");
    avatar.hit_points = 2.0;
    let mut others: Vec<Box<dyn Actor>> = Vec::new();

    let mut input = InputState::new();
    input.press(Button::Attack);
    let pos = avatar.pos;
    let mut ctx = rig.ctx(pos);
    avatar.tick(&mut ctx, &input, &mut others);
    assert!(rig.spawns.is_empty());
    assert_eq!(rig.audio.count_played("swordshoot"), 0);
}

#[test]
fn killing_an_enemy_hides_it_and_skips_the_beam() {
    let mut rig = Rig::new();
    let reg = ActorRegistry::standard();
    let mut avatar = Avatar::new();
    rig.state.add_item("itemwoodensword");
    avatar.facing = Facing::Right;
    avatar.pos = Vec3::new(64.0, 64.0, 0.0);

    let mut others = vec![spawn(&reg, "Octorok", 64.0 + 33.0, 64.0)];
    let mut input = InputState::new();
    input.press(Button::Attack);
    let pos = avatar.pos;
    let mut ctx = rig.ctx(pos);
    avatar.tick(&mut ctx, &input, &mut others);

    assert!(others[0].hit_points() <= 0.0);
    assert!(others[0].is_hidden());
    assert_eq!(rig.audio.count_played("hit"), 1);
    assert!(
        rig.spawns.is_empty(),
        "beam only launches when nothing was hit"
    );
}

#[test]
fn boomerang_blocked_while_one_is_in_flight() {
    let mut rig = Rig::new();
    let reg = ActorRegistry::standard();
    let mut avatar = Avatar::new();
    rig.state.add_item("boomerang");

    let mut others = vec![spawn(&reg, "FlyingBoomerang", 10.0, 10.0)];
    let mut input = InputState::new();
    input.press(Button::Item);
    let pos = avatar.pos;
    let mut ctx = rig.ctx(pos);
    avatar.tick(&mut ctx, &input, &mut others);
    assert!(rig.spawns.is_empty());

    // Once the old one returns (hidden), a new throw goes out.
    others[0].hide();
    rig.tick += 1;
    let mut input = InputState::new();
    input.press(Button::Item);
    let mut ctx = rig.ctx(pos);
    avatar.tick(&mut ctx, &input, &mut others);
    assert_eq!(rig.spawns.len(), 1);
    assert_eq!(rig.spawns[0].type_name, "FlyingBoomerang");
}

#[test]
fn bomb_throw_consumes_inventory() {
    let mut rig = Rig::new();
    let mut avatar = Avatar::new();
    avatar.current_item = "bomb".to_string();
    rig.state.bombs = 2;
    let mut others: Vec<Box<dyn Actor>> = Vec::new();

    let mut input = InputState::new();
    input.press(Button::Item);
    let pos = avatar.pos;
    let mut ctx = rig.ctx(pos);
    avatar.tick(&mut ctx, &input, &mut others);
    assert_eq!(rig.state.bombs, 1);
    assert_eq!(rig.spawns[0].type_name, "PlacedBomb");
}

#[test]
fn triforce_pickup_suspends_control_and_counts() {
    let mut rig = Rig::new();
    let mut avatar = Avatar::new();
    let mut others: Vec<Box<dyn Actor>> = Vec::new();
    let pos = avatar.pos;

    let mut ctx = rig.ctx(pos);
    avatar.pick_up(&mut ctx, "triforcepiece", None, None);
    assert_eq!(rig.state.count("triforcepiece"), 1);
    assert!(avatar.triforce_animation_count > 0);
    assert!(avatar.picking_up.is_some());
    // Both unwind continuations are queued against the sim clock.
    assert_eq!(rig.events.len(), 2);

    // Movement input is ignored while the flourish runs.
    let mut input = InputState::new();
    input.set_down(Button::Right, true);
    let before = avatar.pos;
    let mut ctx = rig.ctx(pos);
    avatar.tick(&mut ctx, &input, &mut others);
    assert_eq!(avatar.pos, before);
}

#[test]
fn death_cancels_pending_pickup_events() {
    let mut rig = Rig::new();
    let mut avatar = Avatar::new();
    let mut others: Vec<Box<dyn Actor>> = Vec::new();
    let pos = avatar.pos;

    let mut ctx = rig.ctx(pos);
    avatar.pick_up(
        &mut ctx,
        "itemwoodensword",
        Some([100, 100, 0]),
        None,
    );
    assert_eq!(rig.events.len(), 2);

    avatar.hit_points = 0.0;
    let input = InputState::new();
    let mut ctx = rig.ctx(pos);
    avatar.tick(&mut ctx, &input, &mut others);
    assert!(rig.events.is_empty(), "death must drop pickup continuations");
    assert!(avatar.picking_up.is_none());
    assert_eq!(rig.audio.count_played("gameover"), 1);
}

#[test]
fn death_overlay_fires_after_the_red_flood() {
    let mut rig = Rig::new();
    let mut avatar = Avatar::new();
    let mut others: Vec<Box<dyn Actor>> = Vec::new();
    avatar.hit_points = 0.0;
    let input = InputState::new();
    let pos = avatar.pos;
    for _ in 0..80 {
        let mut ctx = rig.ctx(pos);
        avatar.tick(&mut ctx, &input, &mut others);
    }
    assert!(avatar.game_over);
    // The game-over jingle fired exactly once across the whole sequence.
    assert_eq!(rig.audio.count_played("gameover"), 1);
}

#[test]
fn compass_pickup_marks_the_dungeon() {
    let mut rig = Rig::new();
    let mut avatar = Avatar::new();
    let pos = avatar.pos;
    let mut ctx = rig.ctx(pos);
    avatar.pick_up(&mut ctx, "compass", None, Some("D1"));
    assert_eq!(rig.state.has_compass_by_dungeon.get("D1"), Some(&true));
    assert!(avatar.picking_up.is_none(), "no flourish for map items");
}

#[test]
fn pose_end_event_is_scheduled_with_the_tail_gap() {
    let mut rig = Rig::new();
    let mut avatar = Avatar::new();
    rig.tick = 100;
    let pos = avatar.pos;
    let mut ctx = rig.ctx(pos);
    avatar.pick_up(&mut ctx, "itemwoodensword", None, None);
    assert_eq!(rig.events.pop_due(140), Some(GameEvent::PickupPoseEnd));
    assert_eq!(rig.events.pop_due(143), None);
    assert_eq!(
        rig.events.pop_due(144),
        Some(GameEvent::PickupEnd { teleport: None })
    );
}
