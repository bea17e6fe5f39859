//! The avatar: movement, sword/shield timers, damage, pickups, death.
//!
//! The avatar is its own type and never lives in the dyn actor list; the
//! sim loop always ticks it first, which is the old "actor zero" invariant
//! made structural.

use tarn_geom::{Facing, Rect, Vec3};
use tarn_sprites::DrawCmd;
use tarn_world::UNDERWORLD_Z_THRESHOLD;

use crate::actor::{Actor, ActorCtx};
use crate::audio::AudioSink;
use crate::events::GameEvent;
use crate::input::{Button, InputState};
use crate::state::SaveState;

/// Frames of invincibility after taking a hit.
const INVINCIBLE_ON_HURT: u32 = 40;
/// Frames the sword stays out after a swing (walking is blocked).
const SHOW_SWORD_RESET: u32 = 3;
/// Frames the shield stays down after a swing.
const SHIELD_DOWN_RESET: u32 = 4;
/// Sword reach from the avatar origin to the tip test point.
const SWORD_LENGTH: f32 = 33.0;
/// Death animation length before the game-over overlay.
const DEATH_RED_FRAMES: u32 = 75;
/// Sentinel marking the death sequence as started.
const DEATH_SENTINEL: f32 = -999.0;
/// Pickup flourish duration in ticks (items / triforce pieces).
const PICKUP_TICKS: u64 = 40;
const TRIFORCE_PICKUP_TICKS: u64 = 170;
/// Gap between the pose ending and control returning.
const PICKUP_TAIL_TICKS: u64 = 4;

pub struct Avatar {
    pub pos: Vec3,
    pub facing: Facing,
    pub rot_z: f32,
    pub rot_x: f32,
    pub z_offset: f32,

    pub hit_points: f32,
    pub max_hit_points: f32,
    pub invincible_counter: u32,
    pub render_negative: bool,

    pub current_item: String,
    pub sword_damage: f32,
    pub sword_curse_counter: u32,
    show_sword_count: u32,
    shield_down_count: u32,

    pub walk_speed: f32,
    pub diagonal_walk_speed: f32,
    walk_frame: u32,

    pub picking_up: Option<String>,
    pub triforce_animation_count: u32,
    pub raft_direction: Option<Facing>,

    pub is_frozen: bool,
    pub is_leaving_cave: bool,
    /// Debug sessions floor health just above zero instead of dying.
    pub debug_no_death: bool,

    death_count: u32,
    /// Set once the death animation finishes; the host shows the overlay.
    pub game_over: bool,
    /// Set for one tick when the whistle is blown.
    pub whistled: bool,

    pub hit_width: f32,
    pub hit_height: f32,
}

impl Avatar {
    pub fn new() -> Self {
        Self {
            pos: Vec3::new(64.0, 64.0, 0.0),
            facing: Facing::Down,
            rot_z: 0.0,
            rot_x: -0.1,
            z_offset: 0.0,
            hit_points: 3.0,
            max_hit_points: 3.0,
            invincible_counter: 0,
            render_negative: false,
            current_item: "boomerang".to_string(),
            sword_damage: 1.0,
            sword_curse_counter: 0,
            show_sword_count: 0,
            shield_down_count: 0,
            walk_speed: 4.0,
            diagonal_walk_speed: 2.0,
            walk_frame: 0,
            picking_up: None,
            triforce_animation_count: 0,
            raft_direction: None,
            is_frozen: false,
            is_leaving_cave: false,
            debug_no_death: false,
            death_count: 0,
            game_over: false,
            whistled: false,
            hit_width: 10.0,
            hit_height: 10.0,
        }
    }

    pub fn is_in_underworld(&self) -> bool {
        self.pos.z <= UNDERWORLD_Z_THRESHOLD
    }

    pub fn is_dead(&self) -> bool {
        self.hit_points <= 0.0
    }

    pub fn hit_rect(&self) -> Rect {
        Rect::centered(self.pos.x, self.pos.y, self.hit_width, self.hit_height)
    }

    pub fn is_touching(&self, other: &dyn Actor) -> bool {
        self.hit_rect().overlaps(&other.hit_rect())
    }

    pub fn is_at_max_hit_points(&self) -> bool {
        self.hit_points >= self.max_hit_points
    }

    /// Applies damage. A no-op while invincible; resets the invincibility
    /// timer otherwise. Death is a state the tick loop notices, not a
    /// despawn.
    pub fn take_damage(&mut self, damage: f32, audio: &mut dyn AudioSink) {
        if self.invincible_counter > 0 {
            return;
        }
        audio.play("hurt");
        self.invincible_counter = INVINCIBLE_ON_HURT;
        self.hit_points -= damage;
        if self.debug_no_death && self.hit_points < 0.5 {
            self.hit_points = 0.5;
        }
        if damage != 0.0 {
            self.refresh_health_beeps(audio);
        }
    }

    /// Positive hit-point change, clamped to the maximum.
    pub fn change_hit_points(&mut self, points: f32, audio: &mut dyn AudioSink) {
        self.hit_points = (self.hit_points + points).min(self.max_hit_points);
        audio.play("heart");
        self.refresh_health_beeps(audio);
    }

    pub fn change_max_hit_points(
        &mut self,
        points: f32,
        state: &mut SaveState,
        audio: &mut dyn AudioSink,
    ) {
        self.max_hit_points += points;
        self.hit_points = self.max_hit_points;
        state.max_hit_points = self.max_hit_points;
        audio.play("item");
        self.refresh_health_beeps(audio);
    }

    pub fn change_coins(&mut self, coins: i32, state: &mut SaveState, audio: &mut dyn AudioSink) {
        state.coins = state.coins.saturating_add_signed(coins);
        audio.play("coin");
    }

    pub fn change_keys(&mut self, keys: i32, state: &mut SaveState, audio: &mut dyn AudioSink) {
        state.keys = state.keys.saturating_add_signed(keys);
        if keys > 0 {
            audio.play("heart");
        }
    }

    pub fn change_bombs(&mut self, bombs: i32, state: &mut SaveState, audio: &mut dyn AudioSink) {
        state.bombs = state.bombs.saturating_add_signed(bombs);
        if bombs > 0 {
            audio.play("heart");
        }
    }

    /// Critical-health beep: loops while 0 < hp <= 1.
    fn refresh_health_beeps(&self, audio: &mut dyn AudioSink) {
        audio.stop("health");
        if self.hit_points <= 1.0 && self.hit_points > 0.0 {
            audio.play_looping("health", 100.0);
        }
    }

    /// Whether the shield blocks an attack moving in `direction`.
    pub fn shield_is_up(&self, direction: Facing) -> bool {
        self.facing.is_opposite(direction) && self.shield_down_count == 0
    }

    pub fn take_raft(&mut self, direction: Facing, audio: &mut dyn AudioSink) {
        if self.raft_direction.is_none() {
            self.raft_direction = Some(direction);
            audio.play("secret");
        }
    }

    /// Begins an item pickup flourish: inventory bump, pose, camera offsets
    /// (applied by the session), and scheduled continuations to unwind it.
    /// `teleport` carries the cave-exit position for cave pickups.
    pub fn pick_up(
        &mut self,
        ctx: &mut ActorCtx,
        item: &str,
        teleport: Option<[i32; 3]>,
        dungeon: Option<&str>,
    ) {
        match item {
            "compass" => {
                if let Some(d) = dungeon {
                    ctx.state
                        .has_compass_by_dungeon
                        .insert(d.to_string(), true);
                }
                ctx.audio.play("item");
                return;
            }
            "map" => {
                if let Some(d) = dungeon {
                    ctx.state.has_map_by_dungeon.insert(d.to_string(), true);
                }
                ctx.audio.play("item");
                return;
            }
            _ => {}
        }

        let pause = if item == "triforcepiece" {
            ctx.audio.stop("underworld");
            ctx.audio.play("triforce");
            self.triforce_animation_count = 1;
            TRIFORCE_PICKUP_TICKS
        } else {
            ctx.audio.play("fanfare");
            ctx.audio.play("item");
            PICKUP_TICKS
        };

        ctx.state.add_item(item);

        self.picking_up = Some(
            if item == "magicalboomerang" {
                "boomerang_blue"
            } else {
                item
            }
            .to_string(),
        );
        self.facing = Facing::Down;
        self.rot_z = -1.0;
        self.z_offset = 0.5;
        self.walk_frame = 1;

        ctx.events.schedule(ctx.tick + pause, GameEvent::PickupPoseEnd);
        ctx.events.schedule(
            ctx.tick + pause + PICKUP_TAIL_TICKS,
            GameEvent::PickupEnd { teleport },
        );
    }

    /// One simulation step. `others` is the live non-avatar list, used for
    /// sword hits and projectile bookkeeping; the touch pass runs in the
    /// sim loop after every actor has moved.
    pub fn tick(&mut self, ctx: &mut ActorCtx, input: &InputState, others: &mut [Box<dyn Actor>]) {
        self.whistled = false;

        if self.hit_points <= 0.0 {
            self.tick_death(ctx);
            return;
        }

        if self.picking_up.is_some() {
            self.tick_pickup(ctx);
            return;
        }

        if let Some(direction) = self.raft_direction {
            self.tick_raft(ctx, direction);
            return;
        }

        self.rot_x = if self.is_in_underworld() { -0.2 } else { -0.1 };
        if self.is_in_underworld() {
            self.z_offset = 0.0;
        }

        // Invincibility blink: alternate the inverted-color flag.
        if self.invincible_counter > 0 {
            self.invincible_counter -= 1;
            self.render_negative = !self.render_negative;
        } else if self.render_negative {
            self.render_negative = false;
        }

        let sword_pos = self.sword_anchor();

        if self.show_sword_count > 0 {
            ctx.draws.push(DrawCmd {
                sprite: "woodensword".to_string(),
                offset: sword_pos,
                rot_z: self.rot_z,
                rot_x: Some(0.001),
                rot_x2: Some(0.001),
                shells: None,
                negative: false,
            });
            self.show_sword_count -= 1;
        }
        if self.shield_down_count > 0 {
            self.shield_down_count -= 1;
        }

        let mut is_walking = false;
        if !self.is_frozen {
            let mut dx = 0.0;
            let mut dy = 0.0;
            if input.is_down(Button::Left) {
                dx -= self.walk_speed;
                self.facing = Facing::Left;
                is_walking = true;
            }
            if input.is_down(Button::Right) {
                dx += self.walk_speed;
                self.facing = Facing::Right;
                is_walking = true;
            }
            if input.is_down(Button::Up) {
                dy += self.walk_speed;
                self.facing = Facing::Up;
                is_walking = true;
            }
            if input.is_down(Button::Down) {
                dy -= self.walk_speed;
                self.facing = Facing::Down;
                is_walking = true;
            }

            // The sword blocks walking; so do cave stairs (negative
            // z_offset while descending).
            if is_walking && self.show_sword_count == 0 && self.z_offset >= 0.0 {
                if dx != 0.0 && dy != 0.0 {
                    dx = (dx / self.walk_speed) * self.diagonal_walk_speed;
                    dy = (dy / self.walk_speed) * self.diagonal_walk_speed;
                }
                if !ctx.world.walkable_at(self.pos.x + dx, self.pos.y) {
                    dx = 0.0;
                }
                if !ctx.world.walkable_at(self.pos.x, self.pos.y + dy) {
                    dy = 0.0;
                }
                self.pos.x += dx;
                self.pos.y += dy;
            }

            if input.was_pressed(Button::Item) {
                self.use_item(ctx, others);
            }

            if self.sword_curse_counter > 0 {
                self.sword_curse_counter -= 1;
            }

            if input.was_pressed(Button::Attack)
                && self.sword_curse_counter == 0
                && ctx.state.has("itemwoodensword")
            {
                ctx.audio.play("sword");
                self.show_sword_count = SHOW_SWORD_RESET;
                self.shield_down_count = SHIELD_DOWN_RESET;
                let hit_something = self.hit_with_sword(ctx, others);

                // Sword beam: full health only, one instance, reused by
                // unhiding rather than respawning.
                if !hit_something && self.is_at_max_hit_points() {
                    ctx.audio.play("swordshoot");
                    self.launch_sword_beam(ctx, others, sword_pos);
                }
            }

            if !self.is_in_underworld() {
                self.pos.z = ctx.world.world_z(self.pos.x, self.pos.y);
            }

            if is_walking {
                self.walk_frame = (self.walk_frame % 8) + 1;
            }

            self.rot_z = self.facing.rot_z();
        }

        let pose = if self.show_sword_count > 0 {
            "playerstab"
        } else if is_walking {
            match self.walk_frame.div_ceil(2) {
                1 => "playerwalk1",
                2 => "playerwalk2",
                3 => "playerwalk3",
                _ => "playerwalk4",
            }
        } else {
            self.walk_frame = 0;
            "playerstand"
        };
        self.draw_self(ctx, pose);

        if self.is_in_underworld() {
            ctx.light
                .draw_light(&ctx.stamps.lantern, self.pos.x, self.pos.y, 100.0, 1.0, 0.0);
        }
    }

    fn draw_self(&self, ctx: &mut ActorCtx, sprite: &str) {
        ctx.draws.push(DrawCmd {
            sprite: sprite.to_string(),
            offset: self.pos + Vec3::new(0.0, 0.0, self.z_offset),
            rot_z: self.rot_z,
            rot_x: Some(self.rot_x),
            rot_x2: None,
            shells: None,
            negative: self.render_negative,
        });
    }

    /// Where the sword blade sits this frame: reach along the facing,
    /// nudged one pixel against the clockwise facing, slightly below feet.
    fn sword_anchor(&self) -> Vec3 {
        let mut p = Vec3::new(
            self.pos.x + 13.0 * self.facing.dx(),
            self.pos.y + 13.0 * self.facing.dy(),
            self.pos.z - 2.0,
        );
        let side = self.facing.clockwise();
        p.x -= side.dx();
        p.y -= side.dy();
        p
    }

    fn use_item(&mut self, ctx: &mut ActorCtx, others: &mut [Box<dyn Actor>]) {
        match self.current_item.as_str() {
            "boomerang" => {
                let in_flight = others
                    .iter()
                    .any(|a| a.type_name() == "FlyingBoomerang" && !a.is_hidden());
                if ctx.state.has("boomerang") && !in_flight {
                    ctx.audio.play("boomerang");
                    ctx.spawns.push(crate::actor::SpawnRequest {
                        type_name: "FlyingBoomerang".to_string(),
                        x: self.pos.x,
                        y: self.pos.y,
                        z: self.pos.z,
                        facing: self.facing,
                        settings: Default::default(),
                    });
                }
            }
            "bomb" => {
                if ctx.state.has("bomb") {
                    ctx.audio.play("bombdrop");
                    self.change_bombs(-1, ctx.state, ctx.audio);
                    ctx.spawns.push(crate::actor::SpawnRequest {
                        type_name: "PlacedBomb".to_string(),
                        x: self.pos.x + 12.0 * self.facing.dx(),
                        y: self.pos.y + 12.0 * self.facing.dy(),
                        z: self.pos.z,
                        facing: self.facing,
                        settings: Default::default(),
                    });
                }
            }
            "whistle" => {
                ctx.audio.play("flute");
                self.whistled = true;
            }
            _ => {}
        }
    }

    /// Tests every live actor against the sword's tip and hilt points.
    /// Strikeable pickups are collected; everything else takes damage. The
    /// shared hit sound fires at most once per swing.
    pub fn hit_with_sword(&mut self, ctx: &mut ActorCtx, others: &mut [Box<dyn Actor>]) -> bool {
        let (mx, my) = (self.facing.dx(), self.facing.dy());
        let tip = (self.pos.x + SWORD_LENGTH * mx, self.pos.y + SWORD_LENGTH * my);
        let hilt = (
            self.pos.x + SWORD_LENGTH / 2.0 * mx,
            self.pos.y + SWORD_LENGTH / 2.0 * my,
        );

        let mut hit_something = false;
        for actor in others.iter_mut() {
            if actor.is_hidden() {
                continue;
            }
            if !(actor.is_hit_at(tip.0, tip.1) || actor.is_hit_at(hilt.0, hilt.1)) {
                continue;
            }
            if actor.is_strikeable_pickup() {
                match actor.type_name() {
                    "Coin" => self.change_coins(1, ctx.state, ctx.audio),
                    "Heart" => self.change_hit_points(1.0, ctx.audio),
                    "Key" => self.change_keys(1, ctx.state, ctx.audio),
                    "Bomb" => self.change_bombs(1, ctx.state, ctx.audio),
                    _ => continue,
                }
                actor.hide();
            } else if actor.take_damage(self.sword_damage, self.facing) {
                hit_something = true;
            }
        }
        if hit_something {
            ctx.audio.play("hit");
        }
        hit_something
    }

    fn launch_sword_beam(
        &mut self,
        ctx: &mut ActorCtx,
        others: &mut [Box<dyn Actor>],
        sword_pos: Vec3,
    ) {
        for actor in others.iter_mut() {
            if actor.type_name() != "FlyingSword" {
                continue;
            }
            if actor.is_hidden() {
                let base = actor.base_mut();
                base.pos = self.pos;
                base.facing = self.facing;
                actor.unhide();
            }
            // A beam still in flight blocks a new launch.
            return;
        }
        ctx.spawns.push(crate::actor::SpawnRequest {
            type_name: "FlyingSword".to_string(),
            x: sword_pos.x,
            y: sword_pos.y,
            z: sword_pos.z,
            facing: self.facing,
            settings: Default::default(),
        });
    }

    fn tick_death(&mut self, ctx: &mut ActorCtx) {
        if self.hit_points > DEATH_SENTINEL {
            // First death frame: silence the world, drop any pending pickup
            // continuations so nothing teleports a dead avatar.
            ctx.audio.play("gameover");
            ctx.audio.stop("underworld");
            ctx.audio.stop("overworld");
            ctx.audio.stop("health");
            ctx.events.cancel_pickup();
            self.picking_up = None;
            self.death_count = 0;
        }
        self.hit_points = DEATH_SENTINEL;
        self.death_count += 1;
        self.rot_z = self.death_count as f32 / 2.0;
        self.draw_self(ctx, "playerstand");

        ctx.light.draw_light(
            &ctx.stamps.red,
            self.pos.x,
            self.pos.y,
            512.0,
            (self.death_count as f32 / DEATH_RED_FRAMES as f32).min(0.8),
            0.0,
        );

        if self.death_count == DEATH_RED_FRAMES {
            self.game_over = true;
        }
    }

    fn tick_pickup(&mut self, ctx: &mut ActorCtx) {
        let item = self.picking_up.clone().unwrap_or_default();
        self.rot_x = 0.0;

        let pose = if is_one_handed(&item) {
            "playerpickup"
        } else {
            "playerpickup2"
        };
        self.draw_self(ctx, pose);
        ctx.draws.sprite(
            &item,
            self.pos + Vec3::new(0.0, 0.0, 16.0 + self.z_offset),
            0.0,
        );

        // Triforce pieces animate light flashes over the whole flourish.
        if self.triforce_animation_count > 0 {
            self.z_offset = (self.triforce_animation_count as f32 / 4.0).cos().abs() * 3.0 + 1.0;
            self.triforce_animation_count += 1;
            let c = self.triforce_animation_count;
            ctx.light.draw_light(
                &ctx.stamps.star,
                self.pos.x + 70.0,
                self.pos.y + 60.0,
                200.0,
                1.0,
                c as f32 / 10.0,
            );
            if matches!(c, 1 | 30 | 32 | 40 | 42 | 50 | 52 | 70 | 72) {
                ctx.light
                    .draw_light(&ctx.stamps.lantern, self.pos.x, self.pos.y, 500.0, 1.0, 0.0);
                ctx.light
                    .draw_light(&ctx.stamps.star, self.pos.x, self.pos.y, 100.0, 1.0, 0.0);
            }
            if c > 170 {
                self.triforce_animation_count = 0;
                self.z_offset = 0.0;
            }
        }

        ctx.light
            .draw_light(&ctx.stamps.lantern, self.pos.x, self.pos.y, 100.0, 1.0, 0.0);
    }

    fn tick_raft(&mut self, ctx: &mut ActorCtx, direction: Facing) {
        self.rot_z = direction.rot_z();
        self.pos.z = -6.0;
        self.invincible_counter = 1;
        self.render_negative = false;

        self.draw_self(ctx, "playerstand");
        ctx.draws.push(DrawCmd {
            sprite: "raft".to_string(),
            offset: Vec3::new(self.pos.x, self.pos.y + 8.0, -6.0),
            rot_z: self.rot_z,
            rot_x: Some(core::f32::consts::FRAC_PI_2),
            rot_x2: None,
            shells: None,
            negative: false,
        });

        let raft_speed = 2.0;
        self.pos.x += raft_speed * direction.dx();
        self.pos.y += raft_speed * direction.dy();
        // Terrain rising back above water means we reached shore.
        if ctx.world.world_z(self.pos.x, self.pos.y) > -1.0 {
            self.raft_direction = None;
            self.invincible_counter = 0;
        }
    }
}

impl Default for Avatar {
    fn default() -> Self {
        Self::new()
    }
}

fn is_one_handed(item: &str) -> bool {
    matches!(item, "key" | "boomerang" | "boomerang_blue" | "whistle")
}
