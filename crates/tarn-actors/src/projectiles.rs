//! Projectiles the avatar launches: sword beam, boomerang, placed bomb.

use tarn_sprites::DrawCmd;
use tarn_world::room_coord;

use crate::actor::{Actor, ActorBase, ActorCtx, SpawnInit};

/// The sword beam. One persistent instance per session: it hides at the
/// room edge and is unhidden on the next full-health swing instead of being
/// respawned.
pub struct FlyingSword {
    base: ActorBase,
    home_room: (i32, i32),
}

impl FlyingSword {
    const SPEED: f32 = 8.0;

    pub fn spawn_boxed(init: SpawnInit) -> Box<dyn Actor> {
        let base = ActorBase::at(&init);
        let home_room = room_coord(base.pos.x, base.pos.y);
        Box::new(Self { base, home_room })
    }
}

impl Actor for FlyingSword {
    fn base(&self) -> &ActorBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut ActorBase {
        &mut self.base
    }
    fn type_name(&self) -> &'static str {
        "FlyingSword"
    }

    fn tick(&mut self, ctx: &mut ActorCtx) {
        self.base.pos.x += self.base.facing.dx() * Self::SPEED;
        self.base.pos.y += self.base.facing.dy() * Self::SPEED;
        if room_coord(self.base.pos.x, self.base.pos.y) != self.home_room {
            self.base.hidden = true;
            return;
        }
        ctx.draws.push(DrawCmd {
            sprite: "woodensword".to_string(),
            offset: self.base.pos,
            rot_z: self.base.facing.rot_z(),
            rot_x: Some(0.001),
            rot_x2: None,
            shells: None,
            negative: ctx.tick % 2 == 0,
        });
    }

    fn take_damage(&mut self, _amount: f32, _from: tarn_geom::Facing) -> bool {
        false
    }
}

/// The boomerang: flies out, then homes back to the avatar and hides.
/// While one is unhidden the avatar may not throw another.
pub struct FlyingBoomerang {
    base: ActorBase,
    outbound: u32,
    spin: f32,
}

impl FlyingBoomerang {
    const SPEED: f32 = 6.0;
    const OUTBOUND_FRAMES: u32 = 14;

    pub fn spawn_boxed(init: SpawnInit) -> Box<dyn Actor> {
        Box::new(Self {
            base: ActorBase::at(&init),
            outbound: Self::OUTBOUND_FRAMES,
            spin: 0.0,
        })
    }
}

impl Actor for FlyingBoomerang {
    fn base(&self) -> &ActorBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut ActorBase {
        &mut self.base
    }
    fn type_name(&self) -> &'static str {
        "FlyingBoomerang"
    }

    fn tick(&mut self, ctx: &mut ActorCtx) {
        self.spin += 0.9;
        if self.outbound > 0 {
            self.outbound -= 1;
            self.base.pos.x += self.base.facing.dx() * Self::SPEED;
            self.base.pos.y += self.base.facing.dy() * Self::SPEED;
        } else {
            let back = ctx.avatar_pos - self.base.pos;
            let dist = back.length();
            if dist < Self::SPEED {
                self.base.hidden = true;
                return;
            }
            self.base.pos += back.normalized() * Self::SPEED;
        }
        ctx.draws.sprite("boomerang", self.base.pos, self.spin);
    }

    fn take_damage(&mut self, _amount: f32, _from: tarn_geom::Facing) -> bool {
        false
    }
}

/// A bomb set on the ground: burns a fuse, then flashes the light map and
/// hides. Each throw consumed one inventory bomb.
pub struct PlacedBomb {
    base: ActorBase,
    fuse: u32,
}

impl PlacedBomb {
    const FUSE_FRAMES: u32 = 30;
    const FLASH_FRAMES: u32 = 4;

    pub fn spawn_boxed(init: SpawnInit) -> Box<dyn Actor> {
        Box::new(Self {
            base: ActorBase::at(&init),
            fuse: Self::FUSE_FRAMES + Self::FLASH_FRAMES,
        })
    }
}

impl Actor for PlacedBomb {
    fn base(&self) -> &ActorBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut ActorBase {
        &mut self.base
    }
    fn type_name(&self) -> &'static str {
        "PlacedBomb"
    }

    fn tick(&mut self, ctx: &mut ActorCtx) {
        if self.fuse == 0 {
            self.base.hidden = true;
            return;
        }
        self.fuse -= 1;
        if self.fuse == Self::FLASH_FRAMES {
            ctx.audio.play("bomb");
        }
        if self.fuse < Self::FLASH_FRAMES {
            // Explosion: white-out the surroundings for a few frames.
            ctx.light.draw_light(
                &ctx.stamps.star,
                self.base.pos.x,
                self.base.pos.y,
                160.0,
                0.9,
                self.fuse as f32,
            );
        } else {
            // Sputter while the fuse burns.
            if ctx.is_blink_frame {
                ctx.light.draw_light(
                    &ctx.stamps.lantern,
                    self.base.pos.x,
                    self.base.pos.y,
                    24.0,
                    0.6,
                    0.0,
                );
            }
            ctx.draws.sprite("bombitem", self.base.pos, 0.0);
        }
    }

    fn take_damage(&mut self, _amount: f32, _from: tarn_geom::Facing) -> bool {
        false
    }
}
