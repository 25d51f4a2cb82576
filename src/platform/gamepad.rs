//! Gamepad polling via gilrs

use gilrs::{Axis, Button, Gilrs};

use super::input::{merge, stick_intents};
use crate::sim::tick::TickInput;

/// First connected gamepad's held state, merged over all pads
pub struct Gamepads {
    gilrs: Gilrs,
}

impl Gamepads {
    /// None when the platform has no gamepad backend
    pub fn new() -> Option<Self> {
        match Gilrs::new() {
            Ok(gilrs) => {
                for (id, pad) in gilrs.gamepads() {
                    log::info!("Gamepad {} connected: {}", id, pad.name());
                }
                Some(Self { gilrs })
            }
            Err(e) => {
                log::warn!("Gamepad support unavailable: {}", e);
                None
            }
        }
    }

    /// Drain pending events and read every pad's held controls
    pub fn poll(&mut self) -> TickInput {
        while let Some(event) = self.gilrs.next_event() {
            match event.event {
                gilrs::EventType::Connected => log::info!("Gamepad {} connected", event.id),
                gilrs::EventType::Disconnected => {
                    log::info!("Gamepad {} disconnected", event.id)
                }
                _ => {}
            }
        }

        let mut held = TickInput::default();
        for (_, pad) in self.gilrs.gamepads() {
            let btn = |b: Button| pad.is_pressed(b);
            let buttons = TickInput {
                forward: btn(Button::DPadUp),
                back: btn(Button::DPadDown),
                turn_left: btn(Button::DPadLeft),
                turn_right: btn(Button::DPadRight),
                strafe_left: btn(Button::LeftTrigger),
                strafe_right: btn(Button::RightTrigger),
                fire: btn(Button::South) || btn(Button::West),
                confirm: btn(Button::Start),
                show_scores: btn(Button::North),
            };
            let stick = stick_intents(pad.value(Axis::LeftStickX), pad.value(Axis::LeftStickY));
            held = merge(held, merge(buttons, stick));
        }
        held
    }
}
