//! The platform input backend, abstracted behind a trait so the queue's
//! sequencing/retry/failsafe logic can be tested without driving a real
//! pointer.
//!
//! Grounded on `enigo`, the crate the teacher's sibling example repo
//! (`pagi-bridge-ms`) uses to simulate keyboard/mouse input.

use async_trait::async_trait;
use enigo::{Button, Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};

use crate::action::MouseButton;
use crate::error::{InputError, InputResult};

/// Executes one input action against the host OS (or a test double).
#[async_trait]
pub trait InputBackend: Send + Sync {
    /// Move the pointer to absolute screen coordinates.
    async fn move_to(&self, x: i32, y: i32) -> InputResult<()>;
    /// Click at absolute screen coordinates with the given button.
    async fn click_at(&self, x: i32, y: i32, button: MouseButton) -> InputResult<()>;
    /// Type literal text at the current input focus.
    async fn type_text(&self, text: &str) -> InputResult<()>;
    /// The screen dimensions this backend drives, for failsafe checks.
    fn screen_size(&self) -> (i32, i32);
}

/// The real `enigo`-backed implementation.
pub struct EnigoBackend {
    screen_size: (i32, i32),
}

impl EnigoBackend {
    /// Build a backend reporting `screen_size` for failsafe-corner checks.
    #[must_use]
    pub fn new(screen_size: (i32, i32)) -> Self {
        Self { screen_size }
    }
}

fn to_enigo_button(button: MouseButton) -> Button {
    match button {
        MouseButton::Left => Button::Left,
        MouseButton::Right => Button::Right,
        MouseButton::Middle => Button::Middle,
    }
}

#[async_trait]
impl InputBackend for EnigoBackend {
    async fn move_to(&self, x: i32, y: i32) -> InputResult<()> {
        let mut enigo = Enigo::new(&Settings::default()).map_err(|err| InputError::Backend(err.to_string()))?;
        enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|err| InputError::Backend(err.to_string()))
    }

    async fn click_at(&self, x: i32, y: i32, button: MouseButton) -> InputResult<()> {
        let mut enigo = Enigo::new(&Settings::default()).map_err(|err| InputError::Backend(err.to_string()))?;
        enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|err| InputError::Backend(err.to_string()))?;
        enigo
            .button(to_enigo_button(button), Direction::Click)
            .map_err(|err| InputError::Backend(err.to_string()))
    }

    async fn type_text(&self, text: &str) -> InputResult<()> {
        let mut enigo = Enigo::new(&Settings::default()).map_err(|err| InputError::Backend(err.to_string()))?;
        enigo.text(text).map_err(|err| InputError::Backend(err.to_string()))
    }

    fn screen_size(&self) -> (i32, i32) {
        self.screen_size
    }
}
