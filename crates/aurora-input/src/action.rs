//! The mouse/keyboard Action kinds the Input Queue executes.

use serde::{Deserialize, Serialize};

/// A mouse or keyboard side effect, as named in the closed Action
/// vocabulary (`mouse_click` / `mouse_move` / `keyboard_type`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputAction {
    /// Click at absolute screen coordinates with the given button.
    MouseClick {
        /// Horizontal screen coordinate.
        x: i32,
        /// Vertical screen coordinate.
        y: i32,
        /// Which button to click.
        #[serde(default)]
        button: MouseButton,
    },
    /// Move the pointer to absolute screen coordinates.
    MouseMove {
        /// Horizontal screen coordinate.
        x: i32,
        /// Vertical screen coordinate.
        y: i32,
    },
    /// Type literal text at the current focus.
    KeyboardType {
        /// The text to type.
        text: String,
    },
}

/// Which mouse button an action addresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    /// Primary (left) button.
    #[default]
    Left,
    /// Secondary (right) button.
    Right,
    /// Middle/wheel button.
    Middle,
}

/// The region the failsafe trigger watches: pointer coordinates driven
/// into a screen corner abort the action instead of executing it.
#[must_use]
pub fn is_failsafe_corner(x: i32, y: i32, screen_w: i32, screen_h: i32, margin: i32) -> bool {
    let near_left = x <= margin;
    let near_right = x >= screen_w - margin;
    let near_top = y <= margin;
    let near_bottom = y >= screen_h - margin;
    (near_left || near_right) && (near_top || near_bottom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_left_corner_is_failsafe() {
        assert!(is_failsafe_corner(0, 0, 1920, 1080, 5));
    }

    #[test]
    fn screen_center_is_not_failsafe() {
        assert!(!is_failsafe_corner(960, 540, 1920, 1080, 5));
    }

    #[test]
    fn bottom_right_corner_is_failsafe() {
        assert!(is_failsafe_corner(1919, 1079, 1920, 1080, 5));
    }
}
