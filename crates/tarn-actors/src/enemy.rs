//! A minimal walker enemy, enough to exercise combat, despawn clouds, and
//! hidden-state persistence.

use tarn_geom::{Facing, Vec3};

use crate::actor::{Actor, ActorBase, ActorCtx, SpawnInit, TouchResult};

pub struct Octorok {
    base: ActorBase,
    walk_frame: u32,
}

impl Octorok {
    const SPEED: f32 = 1.0;
    const TOUCH_DAMAGE: f32 = 0.5;

    pub fn spawn_boxed(init: SpawnInit) -> Box<dyn Actor> {
        let mut base = ActorBase::at(&init);
        base.hit_points = init.number("hitPoints").unwrap_or(1.0) as f32;
        Box::new(Self {
            base,
            walk_frame: 0,
        })
    }

    fn turn(&mut self, ctx: &ActorCtx) {
        // Deterministic wander: turn clockwise, biased by the tick parity so
        // two octoroks do not mirror each other forever.
        self.base.facing = if ctx.tick % 2 == 0 {
            self.base.facing.clockwise()
        } else {
            self.base.facing.opposite()
        };
    }
}

impl Actor for Octorok {
    fn base(&self) -> &ActorBase {
        &self.base
    }
    fn base_mut(&mut self) -> &mut ActorBase {
        &mut self.base
    }
    fn type_name(&self) -> &'static str {
        "Octorok"
    }
    fn is_enemy(&self) -> bool {
        true
    }

    fn tick(&mut self, ctx: &mut ActorCtx) {
        let dx = self.base.facing.dx() * Self::SPEED;
        let dy = self.base.facing.dy() * Self::SPEED;
        let nx = self.base.pos.x + dx;
        let ny = self.base.pos.y + dy;
        if ctx.world.walkable_at(nx, ny) {
            self.base.pos.x = nx;
            self.base.pos.y = ny;
        } else {
            self.turn(ctx);
        }
        self.base.pos.z = ctx.world.world_z(self.base.pos.x, self.base.pos.y);

        if ctx.is_blink_frame {
            self.walk_frame = (self.walk_frame + 1) % 2;
        }
        let sprite = if self.walk_frame == 0 {
            "octorok1"
        } else {
            "octorok2"
        };
        ctx.draws
            .sprite(sprite, self.base.pos, self.base.facing.rot_z());
        ctx.light.draw_light(
            &ctx.stamps.shadow,
            self.base.pos.x,
            self.base.pos.y - 2.0,
            16.0,
            0.4,
            0.0,
        );
    }

    fn on_touch_avatar(&mut self, _ctx: &mut ActorCtx) -> TouchResult {
        TouchResult::Damage(Self::TOUCH_DAMAGE)
    }

    fn take_damage(&mut self, amount: f32, from: Facing) -> bool {
        if self.base.hit_points <= 0.0 {
            return false;
        }
        self.base.hit_points -= amount;
        // Knockback one tile away from the blow.
        let push = Vec3::new(from.dx() * 8.0, from.dy() * 8.0, 0.0);
        self.base.pos += push;
        if self.base.hit_points <= 0.0 {
            self.base.hidden = true;
        }
        true
    }
}
