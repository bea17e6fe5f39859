//! Logical input state fed by the host each frame.
//!
//! The sim never sees physical keys: the binary maps keyboard state onto
//! these buttons. `was_pressed` is edge-triggered and cleared every tick.

/// Logical game buttons.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    /// Sword swing.
    Attack,
    /// Use the equipped item.
    Item,
    /// Menu / inventory overlay toggle.
    Pause,
    /// Explicit save request.
    Save,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::Attack,
        Button::Item,
        Button::Pause,
        Button::Save,
    ];

    #[inline]
    fn index(self) -> usize {
        match self {
            Button::Up => 0,
            Button::Down => 1,
            Button::Left => 2,
            Button::Right => 3,
            Button::Attack => 4,
            Button::Item => 5,
            Button::Pause => 6,
            Button::Save => 7,
        }
    }
}

/// Per-frame button state: level-triggered "down" plus edge-triggered
/// "pressed since last tick reset".
#[derive(Clone, Debug, Default)]
pub struct InputState {
    down: [bool; 8],
    pressed: [bool; 8],
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host-side: record the current level state of a button.
    pub fn set_down(&mut self, b: Button, down: bool) {
        self.down[b.index()] = down;
    }

    /// Host-side: record an edge (key released/pressed event).
    pub fn press(&mut self, b: Button) {
        self.pressed[b.index()] = true;
    }

    pub fn is_down(&self, b: Button) -> bool {
        self.down[b.index()]
    }

    pub fn was_pressed(&self, b: Button) -> bool {
        self.pressed[b.index()]
    }

    /// Clears the edge-triggered set; called at the end of every tick.
    pub fn clear_pressed(&mut self) {
        self.pressed = [false; 8];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressed_is_edge_triggered() {
        let mut input = InputState::new();
        input.press(Button::Attack);
        input.set_down(Button::Up, true);
        assert!(input.was_pressed(Button::Attack));
        assert!(input.is_down(Button::Up));
        input.clear_pressed();
        assert!(!input.was_pressed(Button::Attack));
        // Level state survives the per-tick reset.
        assert!(input.is_down(Button::Up));
    }
}
