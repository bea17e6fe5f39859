//! Sprite manifest loading (TOML).

use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Deserialize;

fn default_frame() -> usize {
    0
}

/// One manifest entry: a friendly name plus where its sheet lives.
#[derive(Clone, Debug, Deserialize)]
pub struct SpriteDef {
    pub name: String,
    pub path: String,
    /// Row inside the sheet when several frames share one png.
    #[serde(default = "default_frame")]
    pub frame: usize,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SpriteManifest {
    #[serde(default)]
    pub sprites: Vec<SpriteDef>,
    /// Optional overworld base texture (alpha channel = shadow heights).
    pub world_texture: Option<String>,
}

impl SpriteManifest {
    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_manifest_with_defaults() {
        let m = SpriteManifest::from_toml_str(
            r#"
            world_texture = "assets/textures/overworld.png"

            [[sprites]]
            name = "playerstand"
            path = "assets/sprites/player.png"

            [[sprites]]
            name = "playerwalk1"
            path = "assets/sprites/player.png"
            frame = 1
        "#,
        )
        .unwrap();
        assert_eq!(m.sprites.len(), 2);
        assert_eq!(m.sprites[0].frame, 0);
        assert_eq!(m.sprites[1].frame, 1);
        assert!(m.world_texture.is_some());
    }

    #[test]
    fn empty_manifest_is_valid() {
        let m = SpriteManifest::from_toml_str("").unwrap();
        assert!(m.sprites.is_empty());
        assert!(m.world_texture.is_none());
    }
}
