//! Jump input edge detection.
//!
//! A jump fires on a fresh press, or on every eligible tick while held when
//! auto-bhop is enabled. There is no cooldown: chaining jumps with no ground
//! tick in between is the point of bunnyhopping.

use serde::{Deserialize, Serialize};

/// Remembers the previous tick's jump input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpState {
    /// Previous tick's jump input (for edge detection).
    prev_held: bool,
}

impl JumpState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed this tick's jump input.
    ///
    /// # Arguments
    ///
    /// * `held` - Whether the jump button is down this tick
    /// * `auto_bhop` - If true, holding jump counts as a request every tick
    ///
    /// # Returns
    ///
    /// Whether a jump is requested this tick. The caller still decides if
    /// the actor is allowed to jump.
    pub fn update(&mut self, held: bool, auto_bhop: bool) -> bool {
        let just_pressed = held && !self.prev_held;
        self.prev_held = held;
        just_pressed || (auto_bhop && held)
    }
}
