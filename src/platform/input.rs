//! Keyboard and analog input mapped onto game intents

use winit::keyboard::KeyCode;

use crate::sim::tick::TickInput;

/// Stick deflection (fraction of full travel) that counts as a press
pub const ANALOG_THRESHOLD: f32 = 40.0 / 128.0;

/// A logical control, independent of the physical key or button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Forward,
    Back,
    TurnLeft,
    TurnRight,
    StrafeLeft,
    StrafeRight,
    Fire,
    Confirm,
    ShowScores,
    Quit,
}

/// Default keyboard layout
pub fn intent_for_key(code: KeyCode) -> Option<Intent> {
    Some(match code {
        KeyCode::ArrowUp | KeyCode::KeyW => Intent::Forward,
        KeyCode::ArrowDown | KeyCode::KeyS => Intent::Back,
        KeyCode::ArrowLeft | KeyCode::KeyA => Intent::TurnLeft,
        KeyCode::ArrowRight | KeyCode::KeyD => Intent::TurnRight,
        KeyCode::KeyQ => Intent::StrafeLeft,
        KeyCode::KeyE => Intent::StrafeRight,
        KeyCode::Space | KeyCode::ControlLeft => Intent::Fire,
        KeyCode::Enter | KeyCode::NumpadEnter => Intent::Confirm,
        KeyCode::KeyH => Intent::ShowScores,
        KeyCode::Escape => Intent::Quit,
        _ => return None,
    })
}

/// Set or clear one intent on a held-state snapshot
pub fn apply_intent(input: &mut TickInput, intent: Intent, held: bool) {
    let slot = match intent {
        Intent::Forward => &mut input.forward,
        Intent::Back => &mut input.back,
        Intent::TurnLeft => &mut input.turn_left,
        Intent::TurnRight => &mut input.turn_right,
        Intent::StrafeLeft => &mut input.strafe_left,
        Intent::StrafeRight => &mut input.strafe_right,
        Intent::Fire => &mut input.fire,
        Intent::Confirm => &mut input.confirm,
        Intent::ShowScores => &mut input.show_scores,
        Intent::Quit => return,
    };
    *slot = held;
}

/// Directional intents from a stick position (x right, y up, both -1..1)
pub fn stick_intents(x: f32, y: f32) -> TickInput {
    TickInput {
        forward: y > ANALOG_THRESHOLD,
        back: y < -ANALOG_THRESHOLD,
        turn_left: x < -ANALOG_THRESHOLD,
        turn_right: x > ANALOG_THRESHOLD,
        ..Default::default()
    }
}

/// Any control held in either snapshot
pub fn merge(a: TickInput, b: TickInput) -> TickInput {
    TickInput {
        forward: a.forward || b.forward,
        back: a.back || b.back,
        turn_left: a.turn_left || b.turn_left,
        turn_right: a.turn_right || b.turn_right,
        strafe_left: a.strafe_left || b.strafe_left,
        strafe_right: a.strafe_right || b.strafe_right,
        fire: a.fire || b.fire,
        confirm: a.confirm || b.confirm,
        show_scores: a.show_scores || b.show_scores,
    }
}

/// Held keyboard state plus a pending quit request
#[derive(Debug, Default)]
pub struct InputState {
    keys: TickInput,
    quit_requested: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press or release
    pub fn key(&mut self, code: KeyCode, pressed: bool) {
        match intent_for_key(code) {
            Some(Intent::Quit) => self.quit_requested |= pressed,
            Some(intent) => apply_intent(&mut self.keys, intent, pressed),
            None => {}
        }
    }

    /// Release everything (focus lost)
    pub fn clear(&mut self) {
        self.keys = TickInput::default();
    }

    pub fn keys(&self) -> TickInput {
        self.keys
    }

    /// Returns and clears a pending quit request
    pub fn take_quit(&mut self) -> bool {
        std::mem::take(&mut self.quit_requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_map_to_intents() {
        let mut input = InputState::new();
        input.key(KeyCode::KeyW, true);
        input.key(KeyCode::KeyQ, true);
        input.key(KeyCode::Space, true);
        let held = input.keys();
        assert!(held.forward && held.strafe_left && held.fire);
        assert!(!held.back && !held.confirm);

        input.key(KeyCode::KeyW, false);
        assert!(!input.keys().forward);
        assert!(input.keys().fire);
    }

    #[test]
    fn test_unmapped_keys_are_ignored() {
        let mut input = InputState::new();
        input.key(KeyCode::F5, true);
        assert_eq!(input.keys(), TickInput::default());
    }

    #[test]
    fn test_quit_is_one_shot() {
        let mut input = InputState::new();
        input.key(KeyCode::Escape, true);
        input.key(KeyCode::Escape, false);
        assert!(input.take_quit());
        assert!(!input.take_quit());
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut input = InputState::new();
        input.key(KeyCode::ArrowLeft, true);
        input.key(KeyCode::Enter, true);
        input.clear();
        assert_eq!(input.keys(), TickInput::default());
    }

    #[test]
    fn test_stick_threshold() {
        assert_eq!(stick_intents(0.2, -0.2), TickInput::default());
        let pushed = stick_intents(-0.5, 0.9);
        assert!(pushed.turn_left && pushed.forward);
        assert!(!pushed.turn_right && !pushed.back);
        assert!(stick_intents(0.0, -ANALOG_THRESHOLD - 0.01).back);
    }

    #[test]
    fn test_merge_is_union() {
        let keys = TickInput {
            fire: true,
            ..Default::default()
        };
        let merged = merge(keys, stick_intents(1.0, 0.0));
        assert!(merged.fire && merged.turn_right);
        assert!(!merged.forward);
    }
}
