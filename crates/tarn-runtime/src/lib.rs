//! The game loop core: fixed-step ticking, actor lifecycle across room
//! transitions, the visible-tile window, and pause/scroll modes.
//!
//! [`Session`] owns every piece of mutable sim state and hands slices of it
//! to actors through `ActorCtx`. Rendering and input mapping stay outside:
//! the host feeds `InputState`, drains the draw list, and uploads camera
//! frames.
#![forbid(unsafe_code)]

use hashbrown::HashSet;

use tarn_actors::actor::{Actor, ActorCtx, SpawnInit, SpawnRequest, TouchResult};
use tarn_actors::{
    ActorRegistry, AudioSink, Avatar, Button, GameEvent, InputState, SaveState, ScheduledEvents,
};
use tarn_camera::{CameraFrame, CameraRig, RoomView};
use tarn_geom::{Facing, Vec3};
use tarn_lightmap::{LightMap, LightStamps};
use tarn_sprites::{DrawList, SpriteAtlas};
use tarn_world::rooms::{Room, RoomDirectory, SettingValue};
use tarn_world::tiles::TileWorld;
use tarn_world::{
    OVERWORLD_LIGHT_DIRECTION, TILE_SIZE, UNDERWORLD_FLOOR_Z, UNDERWORLD_LIGHT_DIRECTION,
};

/// Nominal simulation rate.
pub const FRAME_RATE: f64 = 20.0;
/// Blink cadence: one frame in three reads as a flicker at 20 fps.
const TICKS_PER_ANIMATION_FRAME: u64 = 3;
/// Delay before a new room's song starts.
const SONG_START_DELAY_TICKS: u64 = 30;
/// Default session start position.
const START_POS: Vec3 = Vec3::new(64.0, 64.0, 0.0);

/// Wall-clock gate for the fixed virtual frame rate. A tick fires only once
/// the elapsed time passes the ideal frame length; excess time is discarded,
/// so stalls drop frames instead of batching catch-up ticks.
pub struct FramePacer {
    ideal_ms: f64,
    last_ms: f64,
}

impl FramePacer {
    pub fn new(frame_rate: f64) -> Self {
        Self {
            ideal_ms: 1000.0 / frame_rate,
            last_ms: f64::NEG_INFINITY,
        }
    }

    /// True when a simulation step is due at `now_ms`.
    pub fn should_tick(&mut self, now_ms: f64) -> bool {
        if now_ms - self.last_ms >= self.ideal_ms {
            self.last_ms = now_ms;
            return true;
        }
        false
    }
}

/// Top-level loop state.
pub enum Mode {
    Running,
    /// Menu overlay: input handled, no simulation advance.
    Paused,
    /// Viewport pans between rooms; only the scroll offsets converge.
    Scrolling {
        current: (f32, f32),
        target: (f32, f32),
        step: (f32, f32),
    },
}

/// What the host needs after one frame call.
#[derive(Default)]
pub struct FrameOutput {
    /// Simulation advanced this call.
    pub ticked: bool,
    /// Camera parameters to upload, when the rig committed an update.
    pub camera: Option<CameraFrame>,
    /// The death animation finished; show the game-over overlay.
    pub game_over: bool,
    /// Light direction changed (underworld crossing).
    pub light_direction: Option<Vec3>,
}

/// Items the pause menu cycles through, in grid order (2 rows of 4).
const SELECTABLE_ITEMS: [&str; 8] = [
    "boomerang", "bomb", "whistle", "candle", "arrow", "potion", "raft", "wand",
];

pub struct Session {
    pub world: TileWorld,
    pub rooms: RoomDirectory,
    pub registry: ActorRegistry,
    pub atlas: SpriteAtlas,

    pub avatar: Avatar,
    pub others: Vec<Box<dyn Actor>>,

    pub state: SaveState,
    pub light: LightMap,
    pub stamps: LightStamps,
    pub draws: DrawList,
    pub events: ScheduledEvents,
    pub camera: CameraRig,
    pub input: InputState,

    pub mode: Mode,
    pub tick_count: u64,
    pub is_blink_frame: bool,
    pub is_even_frame: bool,

    current_room: Room,
    spawns: Vec<SpawnRequest>,
    whistled_rooms: HashSet<(i32, i32)>,
    viewport_ratio: f32,
    game_over_reported: bool,
}

impl Session {
    pub fn new(world: TileWorld, registry: ActorRegistry, atlas: SpriteAtlas) -> Self {
        let spawnable: Vec<String> = registry.type_names().map(str::to_string).collect();
        let mut rooms = RoomDirectory::new(spawnable);
        let avatar = Avatar::new();
        let current_room = rooms
            .room_at(&world, avatar.pos.x, avatar.pos.y, avatar.pos.z)
            .clone();
        let camera = CameraRig::new(avatar.pos);
        Self {
            world,
            rooms,
            registry,
            atlas,
            avatar,
            others: Vec::new(),
            state: SaveState::new(),
            light: LightMap::new(),
            stamps: LightStamps::defaults(),
            draws: DrawList::new(),
            events: ScheduledEvents::new(),
            camera,
            input: InputState::new(),
            mode: Mode::Running,
            tick_count: 0,
            is_blink_frame: false,
            is_even_frame: true,
            current_room,
            spawns: Vec::new(),
            whistled_rooms: HashSet::new(),
            viewport_ratio: 1.5,
            game_over_reported: false,
        }
    }

    pub fn current_room(&self) -> &Room {
        &self.current_room
    }

    /// Host viewport changed: affects the visible-tile window and forces a
    /// camera uniform refresh.
    pub fn set_viewport_ratio(&mut self, ratio: f32) {
        self.viewport_ratio = ratio;
        self.camera.force_refresh();
    }

    /// Spawns the current room's manifest (call once after startup when the
    /// registry and atlas are ready).
    pub fn enter_start_room(&mut self, audio: &mut dyn AudioSink) {
        let room = self.current_room.clone();
        self.spawn_room_actors(&room, audio);
    }

    /// Begins an item pickup with the camera pose that frames it.
    pub fn pick_up(&mut self, item: &str, teleport: Option<[i32; 3]>, audio: &mut dyn AudioSink) {
        let dungeon = self.current_room.dungeon_name.clone();
        let mut ctx = ActorCtx {
            tick: self.tick_count,
            is_blink_frame: self.is_blink_frame,
            world: &self.world,
            light: &mut self.light,
            stamps: &self.stamps,
            draws: &mut self.draws,
            audio,
            state: &mut self.state,
            events: &mut self.events,
            avatar_pos: self.avatar.pos,
            spawns: &mut self.spawns,
        };
        self.avatar.pick_up(&mut ctx, item, teleport, dungeon.as_deref());
        if self.avatar.picking_up.is_some() {
            self.camera
                .set_pickup_override(Vec3::new(-50.0, 65.0, -190.0), Vec3::new(0.0, 0.0, 15.0));
        }
    }

    /// Resumes play from the saved overworld location (or the start
    /// position), resetting the avatar's combat state.
    pub fn continue_game(&mut self) {
        if let Some([x, y, z]) = self.state.last_overworld_location {
            self.avatar.pos = Vec3::new(x, y, z);
            self.avatar.is_leaving_cave = true;
        } else {
            self.avatar.pos = START_POS;
            self.avatar.is_leaving_cave = false;
        }
        self.avatar.hit_points = 3.0;
        self.avatar.z_offset = 0.0;
        self.avatar.facing = Facing::Down;
        self.avatar.invincible_counter = 0;
        self.avatar.max_hit_points = if self.state.max_hit_points > 0.0 {
            self.state.max_hit_points
        } else {
            3.0
        };
        self.reset_overworld();
        self.camera.set_eye(self.avatar.pos);
        self.camera.set_target(self.avatar.pos);
    }

    /// Forgets every defeated overworld actor so the world repopulates.
    pub fn reset_overworld(&mut self) {
        let names = self.rooms.cached_unique_names();
        self.state.clear_hidden_in(&names);
    }

    /// Starts a room-to-room viewport pan.
    pub fn begin_scroll(&mut self, facing: Facing) {
        let fx = facing.dx();
        let fy = facing.dy();
        let target = (256.0 * fx, 176.0 * fy);
        self.mode = Mode::Scrolling {
            current: (0.0, 0.0),
            target,
            step: (TILE_SIZE * fx, TILE_SIZE * fy),
        };
    }

    /// One frame. Advances the simulation one fixed step; the host gates
    /// calls through [`FramePacer`] (under-budget frames simply skip the
    /// call and re-request the next one).
    pub fn tick(&mut self, audio: &mut dyn AudioSink) -> FrameOutput {
        let mut out = FrameOutput {
            ticked: true,
            ..FrameOutput::default()
        };

        match self.mode {
            Mode::Paused => {
                self.tick_paused();
                return out;
            }
            Mode::Scrolling {
                current,
                target,
                step,
            } => {
                // Actor simulation is suspended; the only work is the
                // position-convergence check on the scroll offsets.
                let next = (current.0 + step.0, current.1 + step.1);
                let done_x = (next.0 - target.0).abs() < step.0.abs()
                    || step.0 == 0.0
                    || next.0 == target.0;
                let done_y = (next.1 - target.1).abs() < step.1.abs()
                    || step.1 == 0.0
                    || next.1 == target.1;
                if done_x && done_y {
                    self.mode = Mode::Running;
                } else {
                    self.mode = Mode::Scrolling {
                        current: next,
                        target,
                        step,
                    };
                }
                self.input.clear_pressed();
                return out;
            }
            Mode::Running => {}
        }

        self.tick_count += 1;
        self.is_blink_frame = self.tick_count % TICKS_PER_ANIMATION_FRAME == 0;
        self.is_even_frame = self.tick_count % 2 == 0;

        if self.input.was_pressed(Button::Pause) {
            self.mode = Mode::Paused;
            self.input.clear_pressed();
            return out;
        }

        // 1. Fresh light map for this frame's draws.
        self.light.clear(
            self.avatar.is_in_underworld(),
            self.avatar.pos.x,
            self.avatar.pos.y,
        );
        self.draws.clear();

        // 2. Update every non-hidden live actor, avatar included.
        self.tick_actors(audio);

        // 3. Contact pass, then deferred spawns join the live list.
        self.touch_pass(audio);
        self.flush_spawns(audio);

        // 4. Room transition bookkeeping.
        if let Some(direction) = self.check_room_transition(audio) {
            out.light_direction = Some(direction);
        }

        // 5. Visible-tile window draws.
        self.draw_visible_tiles();

        // 6. Camera interpolation.
        let view = RoomView {
            eye_offset: self.current_room.camera_eye_offset,
            target_offset: self.current_room.camera_target_offset,
            in_underworld: self.avatar.is_in_underworld(),
        };
        let cam = self
            .camera
            .tick(self.avatar.pos, view, self.state.has_saved_location());
        out.camera = cam.upload;
        if cam.continue_saved_game {
            self.continue_game();
        }

        // 7. Edge-triggered input is consumed.
        self.input.clear_pressed();

        // 8. Scheduled continuations due this tick.
        self.drain_events(audio);

        if self.avatar.whistled {
            self.whistled_rooms.insert(self.current_room.coords());
        }
        if self.avatar.game_over && !self.game_over_reported {
            self.game_over_reported = true;
            out.game_over = true;
        }
        out
    }

    /// Menu overlay: drive the 2x4 item-select grid off edge-triggered
    /// input; nothing simulates.
    fn tick_paused(&mut self) {
        let mut id = SELECTABLE_ITEMS
            .iter()
            .position(|n| *n == self.avatar.current_item)
            .unwrap_or(0);
        let mut row = (id / 4) as i32;
        let mut col = (id % 4) as i32;
        if self.input.was_pressed(Button::Left) {
            col -= 1;
        }
        if self.input.was_pressed(Button::Right) {
            col += 1;
        }
        if self.input.was_pressed(Button::Up) {
            row -= 1;
        }
        if self.input.was_pressed(Button::Down) {
            row += 1;
        }
        row = (row + 2) % 2;
        col = (col + 4) % 4;
        id = (row * 4 + col) as usize;
        self.avatar.current_item = SELECTABLE_ITEMS[id].to_string();

        if self.input.was_pressed(Button::Pause) {
            self.mode = Mode::Running;
        }
        self.input.clear_pressed();
    }

    fn tick_actors(&mut self, audio: &mut dyn AudioSink) {
        let avatar_pos = self.avatar.pos;
        let mut ctx = ActorCtx {
            tick: self.tick_count,
            is_blink_frame: self.is_blink_frame,
            world: &self.world,
            light: &mut self.light,
            stamps: &self.stamps,
            draws: &mut self.draws,
            audio,
            state: &mut self.state,
            events: &mut self.events,
            avatar_pos,
            spawns: &mut self.spawns,
        };
        self.avatar.tick(&mut ctx, &self.input, &mut self.others);
        for actor in self.others.iter_mut() {
            if !actor.is_hidden() {
                actor.tick(&mut ctx);
            }
        }
    }

    fn touch_pass(&mut self, audio: &mut dyn AudioSink) {
        if self.avatar.is_dead() || self.avatar.picking_up.is_some() {
            return;
        }
        let avatar_pos = self.avatar.pos;
        let mut results: Vec<TouchResult> = Vec::new();
        {
            let mut ctx = ActorCtx {
                tick: self.tick_count,
                is_blink_frame: self.is_blink_frame,
                world: &self.world,
                light: &mut self.light,
                stamps: &self.stamps,
                draws: &mut self.draws,
                audio,
                state: &mut self.state,
                events: &mut self.events,
                avatar_pos,
                spawns: &mut self.spawns,
            };
            for actor in self.others.iter_mut() {
                if actor.is_hidden() || actor.is_cloud() {
                    continue;
                }
                if self.avatar.is_touching(actor.as_ref()) {
                    results.push(actor.on_touch_avatar(&mut ctx));
                }
            }
        }
        for result in results {
            match result {
                TouchResult::Damage(d) => self.avatar.take_damage(d, audio),
                TouchResult::Heal(h) => self.avatar.change_hit_points(h, audio),
                TouchResult::None => {}
            }
        }
    }

    fn flush_spawns(&mut self, audio: &mut dyn AudioSink) {
        let requests: Vec<SpawnRequest> = self.spawns.drain(..).collect();
        for req in requests {
            let init = SpawnInit {
                x: req.x,
                y: req.y,
                z: req.z,
                facing: req.facing,
                actor_count_number: 0,
                settings: req.settings,
            };
            self.spawn_one(&req.type_name, init, audio);
        }
    }

    fn spawn_one(
        &mut self,
        type_name: &str,
        init: SpawnInit,
        audio: &mut dyn AudioSink,
    ) -> Option<usize> {
        let mut actor = self.registry.spawn(type_name, init)?;
        let avatar_pos = self.avatar.pos;
        let mut ctx = ActorCtx {
            tick: self.tick_count,
            is_blink_frame: self.is_blink_frame,
            world: &self.world,
            light: &mut self.light,
            stamps: &self.stamps,
            draws: &mut self.draws,
            audio,
            state: &mut self.state,
            events: &mut self.events,
            avatar_pos,
            spawns: &mut self.spawns,
        };
        actor.on_spawn(&mut ctx);
        self.others.push(actor);
        Some(self.others.len() - 1)
    }

    /// Instantiates a room's manifest, honoring persisted hidden flags by
    /// hiding freshly spawned actors in place (array positions survive).
    fn spawn_room_actors(&mut self, room: &Room, audio: &mut dyn AudioSink) {
        let room_name = RoomDirectory::unique_name(room);
        for record in &room.actors {
            if let Some(SettingValue::Text(item)) = record.settings.get("hideIfInventory") {
                if self.state.has(item) {
                    continue;
                }
            }
            let mut x = record.x;
            let mut y = record.y;
            if let Some(SettingValue::Number(n)) = record.settings.get("x") {
                x = *n as f32;
            }
            if let Some(SettingValue::Number(n)) = record.settings.get("y") {
                y = *n as f32;
            }
            let z = if room.is_in_underworld {
                UNDERWORLD_FLOOR_Z
            } else {
                self.world.world_z(x, y)
            };
            let init = SpawnInit {
                x,
                y,
                z,
                facing: Facing::Down,
                actor_count_number: record.actor_count_number,
                settings: record.settings.clone(),
            };
            if let Some(idx) = self.spawn_one(&record.type_name, init, audio) {
                if self.state.is_hidden(&room_name, record.actor_count_number) {
                    let actor = &mut self.others[idx];
                    actor.hide();
                    actor.set_hit_points(0.0);
                }
            }
        }
    }

    /// Detects the avatar entering a different room and rebuilds the live
    /// actor list around it. Returns a new light direction when the
    /// transition crossed the overworld/underworld boundary.
    fn check_room_transition(&mut self, audio: &mut dyn AudioSink) -> Option<Vec3> {
        let new_room = self
            .rooms
            .room_at(
                &self.world,
                self.avatar.pos.x,
                self.avatar.pos.y,
                self.avatar.pos.z,
            )
            .clone();
        if new_room.coords() == self.current_room.coords() {
            return None;
        }

        // Remember which actors are gone, keyed under the room we left.
        let prev_name = RoomDirectory::unique_name(&self.current_room);
        let mut poofs: Vec<Vec3> = Vec::new();
        for actor in self.others.iter_mut() {
            if actor.is_hidden() {
                self.state
                    .mark_hidden(&prev_name, actor.actor_count_number());
            } else if !new_room.is_in_underworld && actor.is_enemy() && !actor.is_cloud() {
                poofs.push(actor.pos());
            }
            actor.dispose();
        }
        self.others.clear();

        if new_room.song != self.current_room.song {
            audio.stop("underworld");
            audio.stop("overworld");
            if let Some(song) = new_room.song.clone() {
                self.events.schedule(
                    self.tick_count + SONG_START_DELAY_TICKS,
                    GameEvent::SongStart { name: song },
                );
            }
        }

        let mut light_direction = None;
        if new_room.is_in_underworld != self.current_room.is_in_underworld {
            if new_room.is_in_underworld {
                // Any lingering intro camera ramp ends at the door.
                self.camera.snap_speeds();
                light_direction = Some(UNDERWORLD_LIGHT_DIRECTION);
            } else {
                // Coming out of a cave repopulates the overworld.
                self.reset_overworld();
                light_direction = Some(OVERWORLD_LIGHT_DIRECTION);
            }
        }

        log::info!("entering room {},{}", new_room.x, new_room.y);
        self.current_room = new_room.clone();
        self.spawn_room_actors(&new_room, audio);

        // Poof placeholders where overworld enemies used to stand.
        for pos in poofs {
            let init = SpawnInit {
                x: pos.x,
                y: pos.y,
                z: pos.z,
                ..SpawnInit::default()
            };
            self.spawn_one("Cloud", init, audio);
        }
        light_direction
    }

    /// Submits one draw per visible, registered, non-actor-producing tile.
    /// The window widens with the viewport ratio and the avatar's altitude.
    fn draw_visible_tiles(&mut self) {
        let agx = (self.avatar.pos.x / TILE_SIZE).floor() as i32;
        let agy = (self.avatar.pos.y / TILE_SIZE).floor() as i32;

        let scale = self.viewport_ratio / 1.5;
        let altitude_correction = (self.avatar.pos.z / 15.0).ceil().max(0.0) as i32;
        let x_seek = (9.0 * scale).ceil() as i32;
        let y_seek = 8;

        for gz in 0..self.world.layer_count() as i32 {
            for gy in (agy - (y_seek - 1))..(agy + y_seek + altitude_correction) {
                for gx in (agx - x_seek)..(agx + x_seek) {
                    let Some(tile) = self.world.tile_at(gx, gy, gz) else {
                        continue;
                    };
                    if !self.atlas.has_been_registered(tile.name)
                        || self.registry.contains(tile.name)
                    {
                        continue;
                    }
                    self.draws.sprite(
                        tile.name,
                        Vec3::new(
                            gx as f32 * TILE_SIZE + 8.0,
                            gy as f32 * TILE_SIZE + 8.0,
                            gz as f32 * TILE_SIZE,
                        ),
                        0.0,
                    );
                }
            }
        }
    }

    fn drain_events(&mut self, audio: &mut dyn AudioSink) {
        while let Some(event) = self.events.pop_due(self.tick_count) {
            match event {
                GameEvent::PickupPoseEnd => {
                    self.camera.clear_pickup_override();
                    self.avatar.rot_z = 0.0;
                    self.avatar.z_offset = 0.0;
                }
                GameEvent::PickupEnd { teleport } => {
                    self.avatar.picking_up = None;
                    if let Some([x, y, z]) = teleport {
                        let pos = Vec3::new(x as f32, y as f32, z as f32);
                        self.avatar.pos = pos;
                        self.avatar.is_leaving_cave = true;
                        self.camera.set_eye(pos + Vec3::new(0.0, 0.0, 1.0));
                        self.camera.set_target(pos);
                    }
                }
                GameEvent::SongStart { name } => {
                    audio.play_looping(&name, 50.0);
                }
            }
        }
    }

    /// Whether every enemy in the room is dead or gone.
    pub fn all_enemies_are_dead(&self) -> bool {
        !self
            .others
            .iter()
            .any(|a| a.is_enemy() && !a.is_hidden() && a.hit_points() > 0.0)
    }

    /// Whether the whistle has been blown in the current room.
    pub fn whistle_blown_here(&self) -> bool {
        self.whistled_rooms.contains(&self.current_room.coords())
    }
}

#[cfg(test)]
mod pacer_tests {
    use super::*;

    #[test]
    fn under_budget_calls_do_not_tick() {
        let mut pacer = FramePacer::new(20.0);
        assert!(pacer.should_tick(0.0));
        assert!(!pacer.should_tick(10.0));
        assert!(!pacer.should_tick(49.0));
        assert!(pacer.should_tick(50.0));
    }

    #[test]
    fn stalls_drop_frames_instead_of_batching() {
        let mut pacer = FramePacer::new(20.0);
        assert!(pacer.should_tick(0.0));
        // A 500 ms stall yields exactly one tick, not ten.
        assert!(pacer.should_tick(500.0));
        assert!(!pacer.should_tick(501.0));
        assert!(!pacer.should_tick(549.0));
        assert!(pacer.should_tick(550.0));
    }
}
