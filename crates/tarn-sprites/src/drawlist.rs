//! Per-frame sprite draw commands, produced by simulation and drained by the
//! renderer.

use tarn_geom::Vec3;

/// One voxel-sprite draw. The transform composes
/// translate -> rot_x -> rot_z -> rot_x2 -> half-voxel recenter.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCmd {
    pub sprite: String,
    pub offset: Vec3,
    pub rot_z: f32,
    pub rot_x: Option<f32>,
    pub rot_x2: Option<f32>,
    /// Fewer shells = cheaper draw; `None` draws the full onion skin.
    pub shells: Option<u8>,
    /// Inverted-color render, used for the invincibility flash.
    pub negative: bool,
}

/// Ordered draw queue for one frame. Cleared after the renderer drains it.
#[derive(Default)]
pub struct DrawList {
    cmds: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: DrawCmd) {
        self.cmds.push(cmd);
    }

    /// Plain upright sprite at `offset`.
    pub fn sprite(&mut self, name: &str, offset: Vec3, rot_z: f32) {
        self.push(DrawCmd {
            sprite: name.to_string(),
            offset,
            rot_z,
            rot_x: None,
            rot_x2: None,
            shells: None,
            negative: false,
        });
    }

    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawCmd> {
        self.cmds.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_keep_submission_order() {
        let mut list = DrawList::new();
        list.sprite("a", Vec3::ZERO, 0.0);
        list.sprite("b", Vec3::new(1.0, 0.0, 0.0), 0.5);
        let names: Vec<_> = list.iter().map(|c| c.sprite.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        list.clear();
        assert!(list.is_empty());
    }
}
