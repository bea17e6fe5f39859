//! Procedural light/shadow stamps.
//!
//! The engine needs only a handful of translucent shapes (torch glow, round
//! shadow, death flood, pickup star), so they are generated once at startup
//! instead of shipping image assets.

/// A small RGBA stamp composited into the light map.
#[derive(Clone, Debug)]
pub struct LightStamp {
    size: usize,
    pixels: Vec<u8>,
}

impl LightStamp {
    /// Soft radial disc: full color at the center, fading to transparent at
    /// the rim.
    pub fn radial(size: usize, rgb: [u8; 3]) -> Self {
        Self::shaped(size, rgb, |_r, t| 1.0 - t)
    }

    /// Radial disc with a hole-free core and a steeper rim, reading as a
    /// lantern glow.
    pub fn glow(size: usize, rgb: [u8; 3]) -> Self {
        Self::shaped(size, rgb, |_r, t| (1.0 - t).powf(1.5))
    }

    /// Four-pointed star: radial falloff modulated by spikes.
    pub fn star(size: usize, rgb: [u8; 3]) -> Self {
        Self::shaped(size, rgb, |theta, t| {
            let spike = (2.0 * theta).cos().abs().powf(3.0);
            ((1.0 - t) * (0.35 + 0.65 * spike)).clamp(0.0, 1.0)
        })
    }

    fn shaped(size: usize, rgb: [u8; 3], alpha_at: impl Fn(f32, f32) -> f32) -> Self {
        let mut pixels = vec![0u8; size * size * 4];
        let half = size as f32 / 2.0;
        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 + 0.5 - half;
                let dy = y as f32 + 0.5 - half;
                let t = (dx * dx + dy * dy).sqrt() / half;
                if t >= 1.0 {
                    continue;
                }
                let theta = dy.atan2(dx);
                let a = (alpha_at(theta, t) * 255.0).clamp(0.0, 255.0) as u8;
                let i = (y * size + x) * 4;
                pixels[i..i + 4].copy_from_slice(&[rgb[0], rgb[1], rgb[2], a]);
            }
        }
        Self { size, pixels }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Nearest sample; out-of-bounds reads are transparent.
    pub fn sample(&self, x: f32, y: f32) -> Option<[u8; 4]> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let (xi, yi) = (x as usize, y as usize);
        if xi >= self.size || yi >= self.size {
            return None;
        }
        let i = (yi * self.size + xi) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }
}

/// The stamp set the engine and actors draw with.
pub struct LightStamps {
    /// Warm torch glow around the avatar in the underworld.
    pub lantern: LightStamp,
    /// Round soft shadow under actors.
    pub shadow: LightStamp,
    /// Red flood used by the death sequence.
    pub red: LightStamp,
    /// Flash burst for the big item pickups.
    pub star: LightStamp,
}

impl LightStamps {
    pub fn defaults() -> Self {
        Self {
            lantern: LightStamp::glow(64, [255, 228, 170]),
            shadow: LightStamp::radial(64, [64, 64, 64]),
            red: LightStamp::radial(64, [222, 48, 48]),
            star: LightStamp::star(64, [255, 255, 240]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radial_is_opaque_center_transparent_rim() {
        let s = LightStamp::radial(32, [200, 100, 50]);
        let center = s.sample(16.0, 16.0).unwrap();
        assert!(center[3] > 200);
        assert_eq!(center[0], 200);
        assert!(s.sample(0.0, 0.0).map(|p| p[3]).unwrap_or(0) < 32);
        assert!(s.sample(-1.0, 5.0).is_none());
        assert!(s.sample(40.0, 5.0).is_none());
    }

    #[test]
    fn star_spikes_beat_diagonals() {
        let s = LightStamp::star(64, [255, 255, 255]);
        let on_axis = s.sample(52.0, 32.0).unwrap()[3];
        let diagonal = s.sample(46.0, 46.0).unwrap()[3];
        assert!(on_axis > diagonal);
    }
}
