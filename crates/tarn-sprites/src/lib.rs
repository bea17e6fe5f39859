//! Sprite-voxel atlas: name registry, CPU atlas surface, draw list.
#![forbid(unsafe_code)]

use std::collections::HashMap;

pub mod config;
mod drawlist;

pub use config::{SpriteDef, SpriteManifest};
pub use drawlist::{DrawCmd, DrawList};

/// Atlas surface width in pixels.
pub const ATLAS_WIDTH: usize = 4096;
/// Atlas surface height in pixels.
pub const ATLAS_HEIGHT: usize = 2048;
/// Edge length of a voxel sprite, in voxels and in texels per slice.
pub const SPRITE_SIZE: usize = 16;
/// Padding between slices inside a sprite strip. Sampling is nearest, so
/// this is a safety margin against bleeding, not a strict requirement.
pub const SPRITE_PADDING: usize = 1;
/// Native size of the overworld base texture blitted into the atlas bottom.
pub const WORLD_TEXTURE_WIDTH: usize = 4096;
pub const WORLD_TEXTURE_HEIGHT: usize = 1408;

/// Dense id for a registered sprite. Assigned in registration call order and
/// immutable once assigned; other components may hold one before the pixels
/// have arrived.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct SpriteId(pub u16);

/// Decoded RGBA pixels for one sprite sheet. Each 16 px row is one animation
/// frame holding 16 z-slices side by side (256 px wide).
#[derive(Clone, Debug)]
pub struct SpriteImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl SpriteImage {
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != width * height * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    #[inline]
    fn pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        self.pixels.get(i..i + 4)
    }
}

/// One entry for [`SpriteAtlas::register_batch`].
pub struct BatchSprite {
    pub name: String,
    pub image: Option<SpriteImage>,
    pub frame: usize,
}

/// The shared sprite atlas: a 4096x2048 RGBA surface plus the name -> id
/// registry. The bottom rows double as the overworld base texture, whose
/// alpha channel carries the shadow heightmap read back by the shader.
pub struct SpriteAtlas {
    pixels: Vec<u8>,
    ids_by_name: HashMap<String, SpriteId>,
    count: u16,
    has_world_texture: bool,
}

impl Default for SpriteAtlas {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteAtlas {
    pub fn new() -> Self {
        Self {
            pixels: vec![0u8; ATLAS_WIDTH * ATLAS_HEIGHT * 4],
            ids_by_name: HashMap::new(),
            count: 0,
            has_world_texture: false,
        }
    }

    /// Registers `name` and blits its slices into the atlas. The id is
    /// assigned immediately, in call order; a missing or undecodable image
    /// logs a warning and leaves the cell blank (draws of it become no-ops).
    pub fn register(&mut self, name: &str, image: Option<&SpriteImage>, frame: usize) -> SpriteId {
        if let Some(&id) = self.ids_by_name.get(name) {
            return id;
        }
        let id = SpriteId(self.count);
        self.count += 1;
        self.ids_by_name.insert(name.to_string(), id);

        match image {
            Some(img) => self.blit_sprite(id, img, frame),
            None => log::warn!("sprite '{name}' registered without pixels"),
        }
        id
    }

    /// Registers a whole manifest worth of sprites; returns how many had
    /// pixel data. Ids follow the slice order regardless of which images
    /// decoded.
    pub fn register_batch(&mut self, sprites: &[BatchSprite]) -> usize {
        let mut loaded = 0;
        for s in sprites {
            self.register(s.name.as_str(), s.image.as_ref(), s.frame);
            if s.image.is_some() {
                loaded += 1;
            }
        }
        loaded
    }

    pub fn has_been_registered(&self, name: &str) -> bool {
        self.ids_by_name.contains_key(name)
    }

    pub fn id_of(&self, name: &str) -> Option<SpriteId> {
        self.ids_by_name.get(name).copied()
    }

    pub fn sprite_count(&self) -> usize {
        self.count as usize
    }

    /// Upper-left pixel of the strip for `id`. Pure grid math so ids map to
    /// the same cell on every run; the shader mirrors this layout.
    pub fn cell_position(id: SpriteId) -> (usize, usize) {
        let cell_h = SPRITE_SIZE + SPRITE_PADDING;
        let cell_w = cell_h * cell_h;
        let per_row = ATLAS_WIDTH / cell_w;
        let grid_y = id.0 as usize / per_row;
        let grid_x = id.0 as usize - grid_y * per_row;
        (grid_x * cell_w, grid_y * cell_h + 1)
    }

    fn blit_sprite(&mut self, id: SpriteId, img: &SpriteImage, frame: usize) {
        let (base_x, base_y) = Self::cell_position(id);
        if base_y + SPRITE_SIZE > ATLAS_HEIGHT - WORLD_TEXTURE_HEIGHT {
            log::warn!("sprite id {} falls into the world texture region", id.0);
            return;
        }
        let src_y0 = frame * SPRITE_SIZE;
        let padded = SPRITE_SIZE + SPRITE_PADDING;
        for slice in 0..SPRITE_SIZE {
            let src_x0 = slice * SPRITE_SIZE;
            let dst_x0 = base_x + slice * padded;
            for y in 0..SPRITE_SIZE {
                for x in 0..SPRITE_SIZE {
                    let Some(px) = img.pixel(src_x0 + x, src_y0 + y) else {
                        continue;
                    };
                    let di = ((base_y + y) * ATLAS_WIDTH + dst_x0 + x) * 4;
                    self.pixels[di..di + 4].copy_from_slice(px);
                }
            }
        }
    }

    /// Places the overworld base texture in the atlas bottom rows. Its alpha
    /// channel is the shadow heightmap the shader quantizes into hard shadow
    /// cutoffs, so it must be copied verbatim.
    pub fn blit_world_texture(&mut self, img: &SpriteImage) {
        let w = img.width.min(WORLD_TEXTURE_WIDTH);
        let h = img.height.min(WORLD_TEXTURE_HEIGHT);
        let base_y = ATLAS_HEIGHT - h;
        for y in 0..h {
            for x in 0..w {
                if let Some(px) = img.pixel(x, y) {
                    let di = ((base_y + y) * ATLAS_WIDTH + x) * 4;
                    self.pixels[di..di + 4].copy_from_slice(px);
                }
            }
        }
        self.has_world_texture = true;
    }

    pub fn has_world_texture(&self) -> bool {
        self.has_world_texture
    }

    /// Raw RGBA surface for GPU upload.
    pub fn as_rgba(&self) -> &[u8] {
        &self.pixels
    }
}
