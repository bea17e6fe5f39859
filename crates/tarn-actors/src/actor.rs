//! The actor capability interface and the type-name factory registry.

use hashbrown::HashMap;
use tarn_geom::{Facing, Rect, Vec3};
use tarn_lightmap::{LightMap, LightStamps};
use tarn_sprites::DrawList;
use tarn_world::rooms::{Settings, SettingValue};
use tarn_world::tiles::TileWorld;

use crate::audio::AudioSink;
use crate::events::ScheduledEvents;
use crate::state::SaveState;

/// Everything a ticking actor may touch. Owned by the sim loop and handed
/// down by reference; replaces the historical global game singleton.
pub struct ActorCtx<'a> {
    /// Simulation tick counter.
    pub tick: u64,
    /// Blink cadence helper: one frame out of three.
    pub is_blink_frame: bool,
    pub world: &'a TileWorld,
    pub light: &'a mut LightMap,
    pub stamps: &'a LightStamps,
    pub draws: &'a mut DrawList,
    pub audio: &'a mut dyn AudioSink,
    pub state: &'a mut SaveState,
    pub events: &'a mut ScheduledEvents,
    /// Avatar position as of the start of this tick.
    pub avatar_pos: Vec3,
    /// Spawns requested this tick; the loop instantiates them afterwards.
    pub spawns: &'a mut Vec<SpawnRequest>,
}

/// A deferred request to instantiate an actor.
#[derive(Clone, Debug)]
pub struct SpawnRequest {
    pub type_name: String,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub facing: Facing,
    pub settings: Settings,
}

/// Initial state handed to an actor factory.
#[derive(Clone, Debug, Default)]
pub struct SpawnInit {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub facing: Facing,
    pub actor_count_number: u32,
    pub settings: Settings,
}

impl SpawnInit {
    /// Numeric setting lookup, for factories reading their overrides.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.settings.get(key) {
            Some(SettingValue::Number(n)) => Some(*n),
            _ => None,
        }
    }
}

/// Identity and bookkeeping every actor carries.
#[derive(Clone, Debug)]
pub struct ActorBase {
    pub pos: Vec3,
    pub facing: Facing,
    pub hidden: bool,
    pub hit_points: f32,
    pub actor_count_number: u32,
    pub hit_width: f32,
    pub hit_height: f32,
}

impl ActorBase {
    pub fn at(init: &SpawnInit) -> Self {
        Self {
            pos: Vec3::new(init.x, init.y, init.z),
            facing: init.facing,
            hidden: false,
            hit_points: 1.0,
            actor_count_number: init.actor_count_number,
            hit_width: 10.0,
            hit_height: 10.0,
        }
    }
}

/// Common capability surface for every non-avatar actor. Implementors supply
/// `base`/`base_mut`/`type_name`/`tick`; the rest default through the base.
pub trait Actor {
    fn base(&self) -> &ActorBase;
    fn base_mut(&mut self) -> &mut ActorBase;

    /// Registry type name, e.g. `"Coin"`.
    fn type_name(&self) -> &'static str;

    fn tick(&mut self, ctx: &mut ActorCtx);

    /// One-time hook right after insertion into the live list.
    fn on_spawn(&mut self, _ctx: &mut ActorCtx) {}

    /// Hook before removal on room teardown.
    fn dispose(&mut self) {}

    /// Contact with the avatar. Returns damage to apply to the avatar, if
    /// any; pickups instead mutate the save state through `ctx`.
    fn on_touch_avatar(&mut self, _ctx: &mut ActorCtx) -> TouchResult {
        TouchResult::None
    }

    /// Applies damage; returns whether the hit registered (deflections and
    /// already-dead targets return false).
    fn take_damage(&mut self, amount: f32, _from: Facing) -> bool {
        let base = self.base_mut();
        if base.hit_points <= 0.0 {
            return false;
        }
        base.hit_points -= amount;
        if base.hit_points <= 0.0 {
            base.hidden = true;
        }
        true
    }

    fn is_hit_at(&self, x: f32, y: f32) -> bool {
        let b = self.base();
        Rect::centered(b.pos.x, b.pos.y, b.hit_width, b.hit_height).contains(x, y)
    }

    fn hit_rect(&self) -> Rect {
        let b = self.base();
        Rect::centered(b.pos.x, b.pos.y, b.hit_width, b.hit_height)
    }

    fn pos(&self) -> Vec3 {
        self.base().pos
    }

    fn is_hidden(&self) -> bool {
        self.base().hidden
    }

    fn hide(&mut self) {
        self.base_mut().hidden = true;
    }

    fn unhide(&mut self) {
        self.base_mut().hidden = false;
    }

    fn hit_points(&self) -> f32 {
        self.base().hit_points
    }

    fn set_hit_points(&mut self, hp: f32) {
        self.base_mut().hit_points = hp;
    }

    fn actor_count_number(&self) -> u32 {
        self.base().actor_count_number
    }

    /// Enemies poof into clouds when the avatar leaves the room.
    fn is_enemy(&self) -> bool {
        false
    }

    /// Clouds are visual placeholders: never touched, never persisted.
    fn is_cloud(&self) -> bool {
        false
    }

    /// Negative hit points mark a pickup lying on the ground, collectible
    /// by sword strike.
    fn is_strikeable_pickup(&self) -> bool {
        false
    }
}

/// Outcome of an avatar touch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TouchResult {
    None,
    /// Hurt the avatar.
    Damage(f32),
    /// Restore avatar hit points (clamped by the avatar).
    Heal(f32),
}

pub type ActorFactory = fn(SpawnInit) -> Box<dyn Actor>;

/// Closed registry of actor constructors keyed by type name. Replaces
/// lookup of constructors on a global namespace object.
#[derive(Default)]
pub struct ActorRegistry {
    factories: HashMap<&'static str, ActorFactory>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All built-in actor types.
    pub fn standard() -> Self {
        let mut reg = Self::new();
        reg.register("Coin", crate::items::Pickup::coin);
        reg.register("Heart", crate::items::Pickup::heart);
        reg.register("Key", crate::items::Pickup::key);
        reg.register("Bomb", crate::items::Pickup::bomb);
        reg.register("Cloud", crate::items::Cloud::spawn_boxed);
        reg.register("Octorok", crate::enemy::Octorok::spawn_boxed);
        reg.register("FlyingSword", crate::projectiles::FlyingSword::spawn_boxed);
        reg.register(
            "FlyingBoomerang",
            crate::projectiles::FlyingBoomerang::spawn_boxed,
        );
        reg.register("PlacedBomb", crate::projectiles::PlacedBomb::spawn_boxed);
        reg
    }

    pub fn register(&mut self, name: &'static str, factory: ActorFactory) {
        self.factories.insert(name, factory);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    /// Instantiates a type, or logs and returns `None` when the type is
    /// unknown (a missing actor never aborts room instantiation).
    pub fn spawn(&self, name: &str, init: SpawnInit) -> Option<Box<dyn Actor>> {
        match self.factories.get(name) {
            Some(factory) => Some(factory(init)),
            None => {
                log::warn!("missing actor type: {name}");
                None
            }
        }
    }
}
