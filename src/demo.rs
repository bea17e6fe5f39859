//! The bundled demo overworld: tile layers, tile table, and generated
//! placeholder voxel sprites so the game runs from a bare checkout.

use std::path::Path;

use raylib::prelude::*;
use tarn_sprites::{BatchSprite, SpriteAtlas, SpriteImage, SpriteManifest};
use tarn_world::tiles::{TileSet, TileWorld};

const DEFAULT_TILES: &str = include_str!("../assets/tiles/tiles.toml");
const DEFAULT_MANIFEST: &str = include_str!("../assets/sprites/sprites.toml");

/// Two rooms of rocky valley, ground layer plus a raised rock layer.
#[rustfmt::skip]
fn demo_layers() -> Vec<Vec<Vec<u16>>> {
    let ground = vec![vec![82u16; 32]; 11];
    let rocks: Vec<Vec<u16>> = vec![
        vec![16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16],
        vec![16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16],
        vec![16,16,16,13, 0, 0, 0, 0,11, 0, 0, 0,28,16,16,16,16,16,16,13, 0, 0, 0, 0, 0, 0, 0, 0, 0,28,16,16],
        vec![16,16,13, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,28,16,16,16,16,13, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,16],
        vec![16,13, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,28,16,16,13, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,16],
        vec![16, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,16],
        vec![16,68, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,63,55,68, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,16],
        vec![16,16,68, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,63,16,16,16,68, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,63,55,16],
        vec![16,16,16,68, 0, 0, 0, 0, 0, 0, 0, 0, 0,63,16,16,16,16,16,68, 0, 0, 0, 0, 0, 0, 0, 0, 0,16,16,16],
        vec![16,16,16,16,55,55,55,55,55,55,55,55,55,16,16,16,16,16,16,16,55,55,55,55,55,55,55,55,55,16,16,16],
        vec![16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16,16],
    ];
    vec![ground, rocks]
}

/// Loads the tile table (falling back to the bundled copy) and builds the
/// demo tile world.
pub fn demo_world(assets_root: &Path) -> TileWorld {
    let tiles_path = crate::assets::tiles_path(assets_root);
    let tileset = match TileSet::from_path(&tiles_path) {
        Ok(ts) => ts,
        Err(e) => {
            log::warn!(
                "could not load {}: {e}; using bundled tile table",
                tiles_path.display()
            );
            TileSet::from_toml_str(DEFAULT_TILES).unwrap_or_default()
        }
    };
    TileWorld::new(tileset, demo_layers())
}

/// Registers every manifest sprite: decoded pngs when present, generated
/// placeholder voxels otherwise. Ids follow manifest order either way.
pub fn register_sprites(atlas: &mut SpriteAtlas, assets_root: &Path) {
    let manifest_path = crate::assets::sprites_manifest_path(assets_root);
    let manifest = match SpriteManifest::from_path(&manifest_path) {
        Ok(m) => m,
        Err(e) => {
            log::warn!(
                "could not load {}: {e}; using bundled manifest",
                manifest_path.display()
            );
            SpriteManifest::from_toml_str(DEFAULT_MANIFEST).unwrap_or(SpriteManifest {
                sprites: Vec::new(),
                world_texture: None,
            })
        }
    };

    let mut batch = Vec::with_capacity(manifest.sprites.len());
    for def in &manifest.sprites {
        let image = load_sprite_image(&assets_root.join(&def.path))
            .or_else(|| synth_sprite(&def.name));
        if image.is_none() {
            log::warn!("no pixels for sprite '{}'", def.name);
        }
        batch.push(BatchSprite {
            name: def.name.clone(),
            image,
            frame: def.frame,
        });
    }
    let loaded = atlas.register_batch(&batch);
    log::info!("registered {} sprites ({} with pixels)", batch.len(), loaded);

    if let Some(world_path) = &manifest.world_texture {
        if let Some(img) = load_sprite_image(&assets_root.join(world_path)) {
            atlas.blit_world_texture(&img);
        }
    }
}

fn load_sprite_image(path: &Path) -> Option<SpriteImage> {
    if !path.exists() {
        return None;
    }
    let img = match Image::load_image(path.to_string_lossy().as_ref()) {
        Ok(i) => i,
        Err(e) => {
            log::warn!("failed to decode {}: {e}", path.display());
            return None;
        }
    };
    let (w, h) = (img.width() as usize, img.height() as usize);
    let mut pixels = Vec::with_capacity(w * h * 4);
    for c in img.get_image_data().iter() {
        pixels.extend_from_slice(&[c.r, c.g, c.b, c.a]);
    }
    SpriteImage::new(w, h, pixels)
}

/// Paints a voxel sheet: `frames` rows of 16 slices, each slice 16x16.
/// The painter sees (frame, slice, x, voxel height) and returns RGBA.
fn paint_sheet(
    frames: usize,
    paint: impl Fn(usize, usize, usize, usize) -> Option<[u8; 4]>,
) -> SpriteImage {
    let w = 256;
    let h = frames * 16;
    let mut pixels = vec![0u8; w * h * 4];
    for frame in 0..frames {
        for slice in 0..16 {
            for row in 0..16 {
                let vy = 15 - row;
                for x in 0..16 {
                    if let Some(c) = paint(frame, slice, x, vy) {
                        let i = ((frame * 16 + row) * w + slice * 16 + x) * 4;
                        pixels[i..i + 4].copy_from_slice(&c);
                    }
                }
            }
        }
    }
    SpriteImage::new(w, h, pixels).expect("sheet dimensions are fixed")
}

fn shaded(base: [u8; 3], vy: usize) -> [u8; 4] {
    let f = 0.72 + 0.28 * (vy as f32 / 15.0);
    [
        (base[0] as f32 * f) as u8,
        (base[1] as f32 * f) as u8,
        (base[2] as f32 * f) as u8,
        255,
    ]
}

/// Placeholder voxel art for the demo. Solid blocks for terrain, a plate
/// for ground, simple figures for everything else.
fn synth_sprite(name: &str) -> Option<SpriteImage> {
    let rock = [146, 130, 110];
    let img = match name {
        n if n.starts_with("ow_rock") => paint_sheet(1, move |_, _, _, vy| Some(shaded(rock, vy))),
        "ow_ground" => paint_sheet(1, |_, _, _, vy| {
            (vy == 0).then_some([96, 156, 72, 255])
        }),
        "ow_path" => paint_sheet(1, |_, _, _, vy| {
            (vy == 0).then_some([196, 176, 128, 255])
        }),
        "playerstand" | "playerwalk1" | "playerwalk2" | "playerwalk3" | "playerwalk4"
        | "playerstab" | "playerpickup" | "playerpickup2" => {
            let lean = matches!(name, "playerwalk1" | "playerwalk3");
            paint_sheet(1, move |_, slice, x, vy| {
                if !(5..11).contains(&slice) {
                    return None;
                }
                let body = (4..12).contains(&x);
                if body && (9..14).contains(&vy) {
                    return Some([222, 182, 144, 255]); // head
                }
                if body && (3..9).contains(&vy) {
                    return Some([58, 132, 64, 255]); // tunic
                }
                let legs = if lean { (3..7).contains(&x) } else { (4..12).contains(&x) };
                if legs && vy < 3 {
                    return Some([104, 72, 48, 255]); // boots
                }
                None
            })
        }
        "woodensword" => paint_sheet(1, |_, slice, x, vy| {
            if !(7..9).contains(&slice) {
                return None;
            }
            if (7..9).contains(&x) && (4..15).contains(&vy) {
                return Some([210, 214, 224, 255]); // blade
            }
            if (5..11).contains(&x) && (3..5).contains(&vy) {
                return Some([122, 82, 46, 255]); // guard
            }
            None
        }),
        "coin" => disc([238, 202, 60], 3),
        "heart" => disc([206, 52, 62], 3),
        "key" => disc([226, 192, 88], 2),
        "bombitem" => disc([52, 54, 66], 4),
        "cloud" => paint_sheet(1, |_, slice, x, vy| {
            let d = dist2(slice, x, vy, 8);
            (d < 36).then_some([238, 238, 242, 200])
        }),
        "raft" => paint_sheet(1, |_, _, _, vy| {
            (vy < 2).then_some([128, 92, 52, 255])
        }),
        "boomerang" => paint_sheet(1, |_, slice, x, vy| {
            if !(7..9).contains(&slice) {
                return None;
            }
            let arm = ((4..12).contains(&x) && (7..9).contains(&vy))
                || ((7..9).contains(&x) && (4..12).contains(&vy));
            arm.then_some([182, 136, 72, 255])
        }),
        "boomerang_blue" => paint_sheet(1, |_, slice, x, vy| {
            if !(7..9).contains(&slice) {
                return None;
            }
            let arm = ((4..12).contains(&x) && (7..9).contains(&vy))
                || ((7..9).contains(&x) && (4..12).contains(&vy));
            arm.then_some([88, 112, 224, 255])
        }),
        "triforcepiece" => paint_sheet(1, |_, slice, x, vy| {
            if !(6..10).contains(&slice) || vy > 11 {
                return None;
            }
            let half_width = vy.min(11) / 2 + 1;
            let center = 8usize;
            (x >= center.saturating_sub(half_width) && x < center + half_width)
                .then_some([244, 214, 70, 255])
        }),
        "octorok1" | "octorok2" => {
            let squat = name.ends_with('2');
            paint_sheet(1, move |_, slice, x, vy| {
                let top = if squat { 7 } else { 9 };
                if (4..12).contains(&slice) && (3..13).contains(&x) && vy < top {
                    return Some([192, 84, 60, 255]);
                }
                None
            })
        }
        _ => return None,
    };
    Some(img)
}

fn dist2(slice: usize, x: usize, vy: usize, c: usize) -> usize {
    let d = |a: usize, b: usize| a.abs_diff(b) * a.abs_diff(b);
    d(slice, c) + d(x, c) + d(vy, c / 2)
}

fn disc(color: [u8; 3], r: usize) -> SpriteImage {
    paint_sheet(1, move |_, slice, x, vy| {
        let d = dist2(slice, x, vy, 8);
        (d <= r * r).then_some([color[0], color[1], color[2], 255])
    })
}
