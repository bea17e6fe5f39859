//! The 2D light/shadow raster sampled by the shader as a per-fragment tint.
//!
//! There is no 3D lighting model: actors composite translucent stamps into
//! this small world-relative raster every frame, the raster is re-uploaded
//! as a texture, and the fragment shader remaps it around neutral gray.
#![forbid(unsafe_code)]

mod stamps;

pub use stamps::{LightStamp, LightStamps};

use tarn_world::{ROOM_PIXEL_H, ROOM_PIXEL_W, room_origin};

/// Logical raster edge in pixels.
pub const LIGHT_MAP_SIZE: usize = 512;
/// Mid-gray: "no light change".
pub const NEUTRAL: u8 = 128;
/// Raster pixel of the avatar room's origin (canvas y grows downward).
const ROOM_ANCHOR_X: f32 = 128.0;
const ROOM_ANCHOR_Y: f32 = 384.0;
/// Width of the dimming band along underworld room edges.
const EDGE_FALLOFF: f32 = 16.0;

/// Fixed-size RGBA raster recentered on the avatar's room each frame.
/// Additive per draw call within one frame; must be cleared before each
/// frame's draws.
pub struct LightMap {
    pixels: Vec<u8>,
    room_origin: (f32, f32),
}

impl Default for LightMap {
    fn default() -> Self {
        Self::new()
    }
}

impl LightMap {
    pub fn new() -> Self {
        let mut lm = Self {
            pixels: vec![0u8; LIGHT_MAP_SIZE * LIGHT_MAP_SIZE * 4],
            room_origin: (0.0, 0.0),
        };
        lm.fill(NEUTRAL, NEUTRAL, NEUTRAL);
        lm
    }

    /// World-pixel origin of the room the raster is centered on.
    pub fn room_origin(&self) -> (f32, f32) {
        self.room_origin
    }

    fn fill(&mut self, r: u8, g: u8, b: u8) {
        for px in self.pixels.chunks_exact_mut(4) {
            px[0] = r;
            px[1] = g;
            px[2] = b;
            px[3] = 255;
        }
    }

    /// Resets the raster for a new frame and recenters it on the avatar.
    ///
    /// Overworld frames clear to flat neutral. Underworld frames clear to
    /// black with a soft-edged room rectangle whose brightness follows the
    /// avatar's distance to the nearest room edge — the torch glow dims as
    /// the avatar reaches a doorway.
    pub fn clear(&mut self, is_underworld: bool, avatar_x: f32, avatar_y: f32) {
        self.room_origin = room_origin(avatar_x, avatar_y);
        if !is_underworld {
            self.fill(NEUTRAL, NEUTRAL, NEUTRAL);
            return;
        }
        self.fill(0, 0, 0);

        let edge_x = (avatar_x - (avatar_x / ROOM_PIXEL_W).round() * ROOM_PIXEL_W).abs();
        let edge_y = (avatar_y - (avatar_y / ROOM_PIXEL_H).round() * ROOM_PIXEL_H).abs();
        let edge = edge_x.min(edge_y);
        let c = 128.0 - (EDGE_FALLOFF - edge).max(0.0) * (128.0 / EDGE_FALLOFF);

        // The current room occupies the centered 256x256 region.
        let lo = LIGHT_MAP_SIZE / 4;
        let hi = lo + LIGHT_MAP_SIZE / 2;
        for y in lo..hi {
            for x in lo..hi {
                let border = (x - lo)
                    .min(hi - 1 - x)
                    .min(y - lo)
                    .min(hi - 1 - y) as f32;
                let soft = (border / EDGE_FALLOFF).min(1.0);
                let v = (c * soft) as u8;
                let i = (y * LIGHT_MAP_SIZE + x) * 4;
                self.pixels[i] = v;
                self.pixels[i + 1] = v;
                self.pixels[i + 2] = v;
            }
        }
    }

    /// Composites a stamp at a world position. `alpha` is clamped to [0, 1];
    /// `rotation` spins the stamp about its own center.
    pub fn draw_light(
        &mut self,
        stamp: &LightStamp,
        world_x: f32,
        world_y: f32,
        size: f32,
        alpha: f32,
        rotation: f32,
    ) {
        let alpha = alpha.clamp(0.0, 1.0);
        if alpha == 0.0 || size <= 0.0 {
            return;
        }

        let (ox, oy) = self.room_origin;
        let cx = ROOM_ANCHOR_X + (world_x - ox);
        let cy = ROOM_ANCHOR_Y - (world_y - oy);

        let half = size / 2.0;
        let scale = stamp.size() as f32 / size;
        let (sin, cos) = rotation.sin_cos();

        // The rotated square stays inside the circumscribed box.
        let reach = half * core::f32::consts::SQRT_2;
        let x0 = ((cx - reach).floor().max(0.0)) as usize;
        let y0 = ((cy - reach).floor().max(0.0)) as usize;
        let x1 = ((cx + reach).ceil() as usize).min(LIGHT_MAP_SIZE);
        let y1 = ((cy + reach).ceil() as usize).min(LIGHT_MAP_SIZE);

        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                // Inverse of the canvas rotate(-rotation) about the center.
                let rx = dx * cos - dy * sin;
                let ry = dx * sin + dy * cos;
                let sx = (rx + half) * scale;
                let sy = (ry + half) * scale;
                let Some([r, g, b, a]) = stamp.sample(sx, sy) else {
                    continue;
                };
                let sa = alpha * (a as f32 / 255.0);
                if sa <= 0.0 {
                    continue;
                }
                let i = (y * LIGHT_MAP_SIZE + x) * 4;
                for (k, s) in [r, g, b].into_iter().enumerate() {
                    let d = self.pixels[i + k] as f32;
                    self.pixels[i + k] = (s as f32 * sa + d * (1.0 - sa)).round() as u8;
                }
            }
        }
    }

    /// Raw RGBA raster for per-frame GPU upload.
    pub fn as_rgba(&self) -> &[u8] {
        &self.pixels
    }

    /// RGB at a raster pixel (tests and debugging).
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * LIGHT_MAP_SIZE + x) * 4;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn overworld_clear_is_flat_neutral() {
        let mut lm = LightMap::new();
        lm.clear(false, 520.0, 90.0);
        assert_eq!(lm.pixel(0, 0), [NEUTRAL; 3]);
        assert_eq!(lm.pixel(256, 256), [NEUTRAL; 3]);
        assert_eq!(lm.room_origin(), (512.0, 0.0));
    }

    #[test]
    fn underworld_clear_darkens_outside_the_room_region() {
        let mut lm = LightMap::new();
        // Mid-room, far from every edge.
        lm.clear(true, 128.0, -1000.0 + 88.0);
        assert_eq!(lm.pixel(4, 4), [0; 3]);
        let center = lm.pixel(256, 256);
        assert!(center[0] > 100, "room center should glow, got {center:?}");
        // Band near the region border is dimmer than the middle.
        let border = lm.pixel(130, 256);
        assert!(border[0] < center[0]);
    }

    #[test]
    fn underworld_glow_dims_near_room_edges() {
        let mut lm = LightMap::new();
        lm.clear(true, 0.0, -1000.0 + 88.0);
        assert_eq!(lm.pixel(256, 256)[0], 0, "avatar at the edge kills glow");
    }

    #[test]
    fn draw_light_brightens_at_the_mapped_spot() {
        let stamps = LightStamps::defaults();
        let mut lm = LightMap::new();
        lm.clear(false, 10.0, 10.0);
        lm.draw_light(&stamps.lantern, 10.0, 10.0, 64.0, 1.0, 0.0);
        // Room origin (0,0); avatar at (10,10) maps to (138, 374).
        let lit = lm.pixel(138, 374);
        assert!(lit[0] > NEUTRAL);
    }

    #[test]
    fn alpha_is_clamped_high_and_low() {
        let stamps = LightStamps::defaults();
        let mut a = LightMap::new();
        let mut b = LightMap::new();
        a.clear(false, 10.0, 10.0);
        b.clear(false, 10.0, 10.0);
        a.draw_light(&stamps.lantern, 10.0, 10.0, 64.0, 1.5, 0.0);
        b.draw_light(&stamps.lantern, 10.0, 10.0, 64.0, 1.0, 0.0);
        assert_eq!(a.as_rgba(), b.as_rgba());

        let mut c = LightMap::new();
        c.clear(false, 10.0, 10.0);
        c.draw_light(&stamps.lantern, 10.0, 10.0, 64.0, -1.0, 0.0);
        let mut untouched = LightMap::new();
        untouched.clear(false, 10.0, 10.0);
        assert_eq!(c.as_rgba(), untouched.as_rgba());
    }

    proptest! {
        #[test]
        fn out_of_range_alpha_equals_clamped_alpha(alpha in -5.0f32..5.0) {
            let stamps = LightStamps::defaults();
            let mut a = LightMap::new();
            let mut b = LightMap::new();
            a.clear(false, 10.0, 10.0);
            b.clear(false, 10.0, 10.0);
            a.draw_light(&stamps.shadow, 40.0, 40.0, 32.0, alpha, 0.3);
            b.draw_light(&stamps.shadow, 40.0, 40.0, 32.0, alpha.clamp(0.0, 1.0), 0.3);
            prop_assert_eq!(a.as_rgba(), b.as_rgba());
        }
    }
}
