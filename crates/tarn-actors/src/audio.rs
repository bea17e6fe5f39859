//! Audio seam. The sim fires these and never reads anything back.

/// Fire-and-forget sound control implemented by the host (raylib-backed in
/// the binary, [`NullAudio`] in tests).
pub trait AudioSink {
    fn play(&mut self, name: &str);
    fn play_looping(&mut self, name: &str, volume: f32);
    fn stop(&mut self, name: &str);
    fn pause(&mut self, name: &str);
    fn fade(&mut self, name: &str, duration_ms: u32, target_volume: f32);
}

/// Drops every request.
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _name: &str) {}
    fn play_looping(&mut self, _name: &str, _volume: f32) {}
    fn stop(&mut self, _name: &str) {}
    fn pause(&mut self, _name: &str) {}
    fn fade(&mut self, _name: &str, _duration_ms: u32, _target_volume: f32) {}
}

/// Records requests so tests can assert on them.
#[derive(Default)]
pub struct RecordingAudio {
    pub played: Vec<String>,
    pub stopped: Vec<String>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_played(&self, name: &str) -> usize {
        self.played.iter().filter(|n| n.as_str() == name).count()
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, name: &str) {
        self.played.push(name.to_string());
    }
    fn play_looping(&mut self, name: &str, _volume: f32) {
        self.played.push(name.to_string());
    }
    fn stop(&mut self, name: &str) {
        self.stopped.push(name.to_string());
    }
    fn pause(&mut self, _name: &str) {}
    fn fade(&mut self, _name: &str, _duration_ms: u32, _target_volume: f32) {}
}
