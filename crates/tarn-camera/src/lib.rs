//! Camera rig: converts avatar position plus room offsets into a smoothly
//! interpolated eye/target pair and projection parameters.
//!
//! The rig never talks to the GPU. Each tick yields an upload request only
//! when the motion beats a minimum-sensitivity threshold (or a refresh was
//! forced), so near-static frames skip redundant uniform uploads.
#![forbid(unsafe_code)]

use tarn_geom::{Rect, Vec3};

/// Default field of view above ground.
pub const OVERWORLD_FOV: f32 = 45.0;
/// Wider view in dungeon rooms.
pub const UNDERWORLD_FOV: f32 = 60.0;
/// Minimum eye-delta magnitude before a tracking update is committed.
pub const MIN_SENSITIVITY: f32 = 0.3;
/// Nominal smoothing speeds for the eye and target.
pub const EYE_SPEED: f32 = 0.2;
pub const TARGET_SPEED: f32 = 0.4;
/// The big green mountain: standing behind it forces the eye up and over.
const OCCLUSION_RECT: Rect = Rect::new(3060.0, 880.0, 3330.0, 1032.0);

#[derive(Clone, Copy, Debug, PartialEq)]
enum Mode {
    Tracking,
    /// Time-based orbit-in animation over the start of a session.
    IntroZoom { frames: u32 },
    /// After the orbit: speeds converge exponentially toward nominal until
    /// close enough, optionally continuing a saved game.
    SettleToStart,
}

/// Camera parameters the renderer should upload this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFrame {
    pub eye: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
}

/// Result of one camera tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraTick {
    /// `Some` when the GPU camera should be refreshed.
    pub upload: Option<CameraFrame>,
    /// Set once when the intro settle decides a saved game should resume.
    pub continue_saved_game: bool,
}

/// Per-room camera inputs for one tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct RoomView {
    pub eye_offset: Option<Vec3>,
    pub target_offset: Option<Vec3>,
    pub in_underworld: bool,
}

pub struct CameraRig {
    pub eye: Vec3,
    pub target: Vec3,
    eye_speed: f32,
    target_speed: f32,
    ideal_eye_speed: f32,
    ideal_target_speed: f32,
    needs_refresh: bool,
    mode: Mode,
    /// Temporary eye/target offsets during an item pickup; reverted by a
    /// scheduled event, never by mutating the cached room.
    pickup_override: Option<(Vec3, Vec3)>,
}

impl CameraRig {
    /// Rig parked high above and behind the avatar, ready to zoom in.
    pub fn new(avatar: Vec3) -> Self {
        Self {
            eye: avatar + Vec3::new(-2500.0, -1000.0, 19100.0),
            target: avatar + Vec3::new(0.0, 2000.0, 0.0),
            eye_speed: EYE_SPEED,
            target_speed: TARGET_SPEED,
            ideal_eye_speed: EYE_SPEED,
            ideal_target_speed: TARGET_SPEED,
            needs_refresh: true,
            mode: Mode::Tracking,
            pickup_override: None,
        }
    }

    pub fn set_eye(&mut self, eye: Vec3) {
        self.eye = eye;
        self.needs_refresh = true;
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        self.needs_refresh = true;
    }

    /// Forces the next tick to commit a camera upload (e.g. after resize).
    pub fn force_refresh(&mut self) {
        self.needs_refresh = true;
    }

    pub fn begin_intro_zoom(&mut self) {
        self.mode = Mode::IntroZoom { frames: 0 };
    }

    pub fn is_intro_running(&self) -> bool {
        !matches!(self.mode, Mode::Tracking)
    }

    pub fn set_pickup_override(&mut self, eye_offset: Vec3, target_offset: Vec3) {
        self.pickup_override = Some((eye_offset, target_offset));
    }

    pub fn clear_pickup_override(&mut self) {
        self.pickup_override = None;
    }

    /// Snaps smoothing speeds back to nominal (used when a room transition
    /// interrupts the intro ramp).
    pub fn snap_speeds(&mut self) {
        self.ideal_eye_speed = EYE_SPEED;
        self.ideal_target_speed = TARGET_SPEED;
        self.eye_speed = EYE_SPEED;
        self.target_speed = TARGET_SPEED;
        self.mode = Mode::Tracking;
    }

    pub fn tick(&mut self, avatar: Vec3, view: RoomView, has_saved_game: bool) -> CameraTick {
        let mut out = CameraTick::default();

        let mut eye_fix = Vec3::ZERO;
        let mut fov = OVERWORLD_FOV;
        let mut min_sensitivity = MIN_SENSITIVITY;

        if OCCLUSION_RECT.contains(avatar.x, avatar.y) {
            eye_fix = Vec3::new(0.0, 120.0, 50.0);
        }

        let quantized_z = (avatar.z / 8.0).round() * 8.0;
        let mut eye = Vec3::new(
            avatar.x,
            avatar.y - 200.0 + eye_fix.y,
            quantized_z + 220.0 + eye_fix.z,
        );
        let mut target = Vec3::new(avatar.x, avatar.y, quantized_z);

        if view.in_underworld {
            eye.z = quantized_z + 200.0 + eye_fix.z;
            eye.y += 100.0;
            fov = UNDERWORLD_FOV;
            min_sensitivity = 0.0;
            self.eye_speed = 0.4;
        }

        // A pickup pose wins over the room's own offsets.
        let (eye_offset, target_offset) = match self.pickup_override {
            Some(pair) => (Some(pair.0), Some(pair.1)),
            None => (view.eye_offset, view.target_offset),
        };
        if let Some(off) = eye_offset {
            eye += off;
        }
        if let Some(off) = target_offset {
            target += off;
        }

        let eye_delta = (eye - self.eye) * self.eye_speed;
        let target_delta = (target - self.target) * self.target_speed;

        if eye_delta.length() > min_sensitivity || self.needs_refresh {
            self.eye += eye_delta;
            self.target += target_delta;
            self.needs_refresh = false;
            out.upload = Some(CameraFrame {
                eye: self.eye,
                target: self.target,
                fov_degrees: fov,
            });
        }

        match self.mode {
            Mode::Tracking => {}
            Mode::IntroZoom { frames } => {
                let frames = frames + 1;
                let rot_z = frames as f32 / 30.0;
                let rot_x: f32 = 0.4;
                let distance = (600.0 - frames as f32) / 2.0;
                let eye = Vec3::new(
                    self.target.x + rot_z.sin() * distance * rot_x.sin(),
                    self.target.y + rot_z.cos() * distance * rot_x.sin(),
                    self.target.z + rot_x.cos() * distance,
                );
                self.eye = eye;
                out.upload = Some(CameraFrame {
                    eye,
                    target: self.target,
                    fov_degrees: fov,
                });
                if frames > 30 {
                    self.mode = Mode::SettleToStart;
                    self.ideal_eye_speed = EYE_SPEED * 3.0;
                    self.ideal_target_speed = TARGET_SPEED * 3.0;
                    self.eye_speed = 0.02;
                    self.target_speed = 0.02;
                } else {
                    self.mode = Mode::IntroZoom { frames };
                }
            }
            Mode::SettleToStart => {
                self.eye_speed = (self.eye_speed * 40.0 + self.ideal_eye_speed) / 41.0;
                self.target_speed = (self.target_speed * 40.0 + self.ideal_target_speed) / 41.0;
                if (self.eye_speed - self.ideal_eye_speed).abs() < 0.35 || has_saved_game {
                    out.continue_saved_game = has_saved_game;
                    self.snap_speeds();
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still_view() -> RoomView {
        RoomView::default()
    }

    #[test]
    fn eye_converges_toward_the_avatar_column() {
        let avatar = Vec3::new(100.0, 100.0, 0.0);
        let mut rig = CameraRig::new(avatar);
        for _ in 0..300 {
            rig.tick(avatar, still_view(), false);
        }
        assert!((rig.eye.x - avatar.x).abs() < 2.0);
        assert!((rig.eye.y - (avatar.y - 200.0)).abs() < 2.0);
        assert!((rig.eye.z - 220.0).abs() < 2.0);
        assert!((rig.target.x - avatar.x).abs() < 2.0);
    }

    #[test]
    fn near_static_frames_skip_uploads() {
        let avatar = Vec3::new(100.0, 100.0, 0.0);
        let mut rig = CameraRig::new(avatar);
        for _ in 0..400 {
            rig.tick(avatar, still_view(), false);
        }
        // Fully settled: the delta is under the sensitivity floor.
        let out = rig.tick(avatar, still_view(), false);
        assert!(out.upload.is_none());
        // A forced refresh always commits.
        rig.force_refresh();
        let out = rig.tick(avatar, still_view(), false);
        assert!(out.upload.is_some());
    }

    #[test]
    fn underworld_switches_fov_and_sensitivity() {
        let avatar = Vec3::new(100.0, -900.0, -1008.0);
        let mut rig = CameraRig::new(avatar);
        let view = RoomView {
            in_underworld: true,
            ..RoomView::default()
        };
        let mut saw_under_fov = false;
        for _ in 0..100 {
            if let Some(frame) = rig.tick(avatar, view, false).upload {
                saw_under_fov = frame.fov_degrees == UNDERWORLD_FOV;
            }
        }
        assert!(saw_under_fov);
    }

    #[test]
    fn pickup_override_beats_room_offsets() {
        let avatar = Vec3::new(100.0, 100.0, 0.0);
        let mut rig = CameraRig::new(avatar);
        for _ in 0..300 {
            rig.tick(avatar, still_view(), false);
        }
        let settled_eye = rig.eye;
        rig.set_pickup_override(Vec3::new(-50.0, 65.0, -190.0), Vec3::new(0.0, 0.0, 15.0));
        for _ in 0..300 {
            rig.tick(avatar, still_view(), false);
        }
        assert!((rig.eye.z - (settled_eye.z - 190.0)).abs() < 3.0);
        rig.clear_pickup_override();
        for _ in 0..300 {
            rig.tick(avatar, still_view(), false);
        }
        assert!((rig.eye.z - settled_eye.z).abs() < 3.0);
    }

    #[test]
    fn intro_settle_continues_a_saved_game_once() {
        let avatar = Vec3::new(100.0, 100.0, 0.0);
        let mut rig = CameraRig::new(avatar);
        rig.begin_intro_zoom();
        let mut continued = 0;
        for _ in 0..200 {
            if rig.tick(avatar, still_view(), true).continue_saved_game {
                continued += 1;
            }
        }
        assert_eq!(continued, 1);
        assert!(!rig.is_intro_running());
    }
}
