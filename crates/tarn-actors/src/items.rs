//! Ground pickups and the despawn cloud.

use tarn_geom::Vec3;

use crate::actor::{Actor, ActorBase, ActorCtx, SpawnInit, TouchResult};

/// What a pickup grants when collected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PickupKind {
    Coin,
    Heart,
    Key,
    Bomb,
}

impl PickupKind {
    fn sprite(self) -> &'static str {
        match self {
            PickupKind::Coin => "coin",
            PickupKind::Heart => "heart",
            PickupKind::Key => "key",
            PickupKind::Bomb => "bombitem",
        }
    }

    fn type_name(self) -> &'static str {
        match self {
            PickupKind::Coin => "Coin",
            PickupKind::Heart => "Heart",
            PickupKind::Key => "Key",
            PickupKind::Bomb => "Bomb",
        }
    }
}

/// An item lying on the ground. The negative hit-point sentinel marks it
/// strikeable: a sword swing collects it instead of damaging it.
pub struct Pickup {
    base: ActorBase,
    kind: PickupKind,
}

impl Pickup {
    fn boxed(kind: PickupKind, init: SpawnInit) -> Box<dyn Actor> {
        let mut base = ActorBase::at(&init);
        base.hit_points = -1.0;
        Box::new(Self { base, kind })
    }

    pub fn coin(init: SpawnInit) -> Box<dyn Actor> {
        Self::boxed(PickupKind::Coin, init)
    }
    pub fn heart(init: SpawnInit) -> Box<dyn Actor> {
        Self::boxed(PickupKind::Heart, init)
    }
    pub fn key(init: SpawnInit) -> Box<dyn Actor> {
        Self::boxed(PickupKind::Key, init)
    }
    pub fn bomb(init: SpawnInit) -> Box<dyn Actor> {
        Self::boxed(PickupKind::Bomb, init)
    }

    /// Applies the grant. Shared between touch collection and sword strikes.
    pub fn collect(kind: PickupKind, ctx: &mut ActorCtx) {
        match kind {
            PickupKind::Coin => {
                ctx.state.coins += 1;
                ctx.audio.play("coin");
            }
            PickupKind::Heart => {
                // Hit-point gain is applied by the avatar, which owns the
                // clamp; the touch path routes through TouchResult instead.
                ctx.audio.play("heart");
            }
            PickupKind::Key => {
                ctx.state.keys += 1;
                ctx.audio.play("heart");
            }
            PickupKind::Bomb => {
                ctx.state.bombs += 1;
                ctx.audio.play("heart");
            }
        }
    }

    pub fn kind(&self) -> PickupKind {
        self.kind
    }
}

impl Actor for Pickup {
    fn base(&self) -> &ActorBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut ActorBase {
        &mut self.base
    }
    fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    fn tick(&mut self, ctx: &mut ActorCtx) {
        // A slow bob sells "collectible" at 20 fps.
        let bob = if ctx.is_blink_frame { 0.5 } else { 0.0 };
        ctx.draws.sprite(
            self.kind.sprite(),
            self.base.pos + Vec3::new(0.0, 0.0, bob),
            0.0,
        );
    }

    fn on_touch_avatar(&mut self, ctx: &mut ActorCtx) -> TouchResult {
        self.base.hidden = true;
        Self::collect(self.kind, ctx);
        if self.kind == PickupKind::Heart {
            return TouchResult::Heal(1.0);
        }
        TouchResult::None
    }

    fn take_damage(&mut self, _amount: f32, _from: tarn_geom::Facing) -> bool {
        // Pickups are collected, never damaged.
        false
    }

    fn is_strikeable_pickup(&self) -> bool {
        self.base.hit_points < 0.0
    }
}

/// The "poof" placeholder left behind when an enemy despawns on a room
/// change. Purely visual; expires on its own.
pub struct Cloud {
    base: ActorBase,
    frames: u32,
}

impl Cloud {
    const LIFETIME: u32 = 12;

    pub fn spawn_boxed(init: SpawnInit) -> Box<dyn Actor> {
        Box::new(Self {
            base: ActorBase::at(&init),
            frames: 0,
        })
    }
}

impl Actor for Cloud {
    fn base(&self) -> &ActorBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut ActorBase {
        &mut self.base
    }
    fn type_name(&self) -> &'static str {
        "Cloud"
    }
    fn is_cloud(&self) -> bool {
        true
    }

    fn tick(&mut self, ctx: &mut ActorCtx) {
        self.frames += 1;
        if self.frames > Self::LIFETIME {
            self.base.hidden = true;
            return;
        }
        // Shrinking shell count reads as dissipation.
        let shells = (Self::LIFETIME - self.frames).max(2) as u8;
        ctx.draws.push(tarn_sprites::DrawCmd {
            sprite: "cloud".to_string(),
            offset: self.base.pos,
            rot_z: 0.0,
            rot_x: None,
            rot_x2: None,
            shells: Some(shells),
            negative: false,
        });
    }

    fn take_damage(&mut self, _amount: f32, _from: tarn_geom::Facing) -> bool {
        false
    }
}
