//! Raylib-backed audio adapter. The sim only fires requests through
//! `AudioSink`; this side owns the device, lazy-loads files by name, and
//! pumps music streams once per display frame.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use raylib::core::audio::{Music, RaylibAudio, Sound};
use tarn_actors::AudioSink;

/// Host-side extension: stream pumping happens outside the sim tick.
pub trait StreamAudio: AudioSink {
    fn pump(&mut self) {}
}

/// Used when no audio device is available.
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _name: &str) {}
    fn play_looping(&mut self, _name: &str, _volume: f32) {}
    fn stop(&mut self, _name: &str) {}
    fn pause(&mut self, _name: &str) {}
    fn fade(&mut self, _name: &str, _duration_ms: u32, _target_volume: f32) {}
}

impl StreamAudio for SilentAudio {}

pub struct RlAudio<'aud> {
    device: &'aud RaylibAudio,
    dir: PathBuf,
    sounds: HashMap<String, Sound<'aud>>,
    music: HashMap<String, Music<'aud>>,
    /// Names that failed to load; warned once.
    missing: HashSet<String>,
}

impl<'aud> RlAudio<'aud> {
    pub fn new(device: &'aud RaylibAudio, assets_root: &Path) -> Self {
        Self {
            device,
            dir: crate::assets::sounds_dir(assets_root),
            sounds: HashMap::new(),
            music: HashMap::new(),
            missing: HashSet::new(),
        }
    }

    fn file_for(&self, name: &str) -> Option<PathBuf> {
        for ext in ["ogg", "wav", "mp3"] {
            let p = self.dir.join(format!("{name}.{ext}"));
            if p.exists() {
                return Some(p);
            }
        }
        None
    }

    fn warn_missing(&mut self, name: &str) {
        if self.missing.insert(name.to_string()) {
            log::warn!("no sound file for '{name}'");
        }
    }

    fn ensure_sound(&mut self, name: &str) -> bool {
        if self.sounds.contains_key(name) {
            return true;
        }
        let Some(path) = self.file_for(name) else {
            self.warn_missing(name);
            return false;
        };
        match self.device.new_sound(path.to_string_lossy().as_ref()) {
            Ok(sound) => {
                self.sounds.insert(name.to_string(), sound);
                true
            }
            Err(e) => {
                log::warn!("failed to load sound '{name}': {e}");
                self.missing.insert(name.to_string());
                false
            }
        }
    }

    fn ensure_music(&mut self, name: &str) -> bool {
        if self.music.contains_key(name) {
            return true;
        }
        let Some(path) = self.file_for(name) else {
            self.warn_missing(name);
            return false;
        };
        match self.device.new_music(path.to_string_lossy().as_ref()) {
            Ok(music) => {
                self.music.insert(name.to_string(), music);
                true
            }
            Err(e) => {
                log::warn!("failed to load music '{name}': {e}");
                self.missing.insert(name.to_string());
                false
            }
        }
    }
}

impl AudioSink for RlAudio<'_> {
    fn play(&mut self, name: &str) {
        if self.ensure_sound(name) {
            self.sounds[name].play();
        }
    }

    fn play_looping(&mut self, name: &str, volume: f32) {
        if self.ensure_music(name) {
            if let Some(music) = self.music.get_mut(name) {
                music.set_volume(volume / 100.0);
                music.play_stream();
            }
        }
    }

    fn stop(&mut self, name: &str) {
        if let Some(sound) = self.sounds.get(name) {
            sound.stop();
        }
        if let Some(music) = self.music.get_mut(name) {
            music.stop_stream();
        }
    }

    fn pause(&mut self, name: &str) {
        if let Some(sound) = self.sounds.get(name) {
            sound.pause();
        }
        if let Some(music) = self.music.get_mut(name) {
            music.pause_stream();
        }
    }

    fn fade(&mut self, name: &str, duration_ms: u32, target_volume: f32) {
        // Coarse fade: jump to the target volume. The sim only fades songs
        // on transitions, where the cut is masked by the scroll.
        log::debug!("fade '{name}' to {target_volume} over {duration_ms}ms");
        if let Some(music) = self.music.get_mut(name) {
            music.set_volume(target_volume / 100.0);
        }
    }
}

impl StreamAudio for RlAudio<'_> {
    fn pump(&mut self) {
        for music in self.music.values_mut() {
            music.update_stream();
        }
    }
}
