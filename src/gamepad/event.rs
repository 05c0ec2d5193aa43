//! Discrete gamepad events.
//!
//! "Pressed" and "released" are derived from the sign of the button delta, so
//! an analog trigger easing from 0.8 to 0.5 raises `buttonreleased` even
//! though it is still held.

use chrono::{DateTime, Local};
use std::fmt;
use std::str::FromStr;

use crate::gamepad::error::GamepadError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    ButtonPressed,
    ButtonReleased,
    AxisMoved,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [
        EventKind::ButtonPressed,
        EventKind::ButtonReleased,
        EventKind::AxisMoved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ButtonPressed => "buttonpressed",
            EventKind::ButtonReleased => "buttonreleased",
            EventKind::AxisMoved => "axismoved",
        }
    }

    /// Kind raised by a non-zero button delta.
    pub fn for_button_delta(delta: f32) -> Self {
        if delta < 0.0 {
            EventKind::ButtonReleased
        } else {
            EventKind::ButtonPressed
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = GamepadError;

    // Case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lowered)
            .ok_or_else(|| GamepadError::InvalidEventKind(s.to_string()))
    }
}

/// One change raised during a poll tick.
#[derive(Clone, Debug)]
pub struct GamepadEvent {
    pub kind: EventKind,
    /// Button or axis index
    pub id: usize,
    /// Value after the tick's state replacement
    pub current_value: f32,
    /// Signed change since the previous tick
    pub delta_value: f32,
    /// Capture time of the tick
    pub at: DateTime<Local>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_kind_case_insensitively() {
        assert_eq!(
            "buttonpressed".parse::<EventKind>().unwrap(),
            EventKind::ButtonPressed
        );
        assert_eq!(
            "ButtonReleased".parse::<EventKind>().unwrap(),
            EventKind::ButtonReleased
        );
        assert_eq!("AXISMOVED".parse::<EventKind>().unwrap(), EventKind::AxisMoved);
    }

    #[test]
    fn rejects_unknown_kind() {
        match "invalidkind".parse::<EventKind>() {
            Err(GamepadError::InvalidEventKind(name)) => assert_eq!(name, "invalidkind"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn display_matches_parse() {
        for kind in EventKind::ALL {
            assert_eq!(kind.to_string().parse::<EventKind>().unwrap(), kind);
        }
    }

    #[test]
    fn button_delta_sign_picks_kind() {
        assert_eq!(EventKind::for_button_delta(1.0), EventKind::ButtonPressed);
        assert_eq!(EventKind::for_button_delta(-0.3), EventKind::ButtonReleased);
    }
}
