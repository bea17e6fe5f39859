//! Maps raylib keyboard state onto the sim's logical buttons.

use raylib::prelude::*;
use tarn_actors::{Button, InputState};

const BINDINGS: &[(Button, &[KeyboardKey])] = &[
    (
        Button::Up,
        &[KeyboardKey::KEY_UP, KeyboardKey::KEY_W],
    ),
    (
        Button::Down,
        &[KeyboardKey::KEY_DOWN, KeyboardKey::KEY_S],
    ),
    (
        Button::Left,
        &[KeyboardKey::KEY_LEFT, KeyboardKey::KEY_A],
    ),
    (
        Button::Right,
        &[KeyboardKey::KEY_RIGHT, KeyboardKey::KEY_D],
    ),
    (
        Button::Attack,
        &[KeyboardKey::KEY_SPACE, KeyboardKey::KEY_X, KeyboardKey::KEY_L],
    ),
    (
        Button::Item,
        &[KeyboardKey::KEY_Z, KeyboardKey::KEY_K],
    ),
    (Button::Pause, &[KeyboardKey::KEY_ENTER]),
    (Button::Save, &[KeyboardKey::KEY_F5]),
];

/// Refreshes level state and records press edges. Edges accumulate until
/// the sim clears them at the end of its tick, so a key pressed between
/// simulation frames is never lost.
pub fn poll(rl: &RaylibHandle, input: &mut InputState) {
    for (button, keys) in BINDINGS {
        input.set_down(*button, keys.iter().any(|k| rl.is_key_down(*k)));
        if keys.iter().any(|k| rl.is_key_pressed(*k)) {
            input.press(*button);
        }
    }
}
