//! Keyboard and drag triggers for the card cursor.

use serde::Deserialize;

const SWIPE_OFFSET: f64 = 100.0;
const SWIPE_VELOCITY: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Next,
    Previous,
    First,
    Last,
    Undo,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyPress {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
}

impl KeyPress {
    pub fn action(&self) -> Option<NavAction> {
        match self.key.as_str() {
            "ArrowLeft" | "ArrowUp" => Some(NavAction::Previous),
            "ArrowRight" | "ArrowDown" | " " | "Space" | "Spacebar" => Some(NavAction::Next),
            "Home" => Some(NavAction::First),
            "End" => Some(NavAction::Last),
            "u" | "U" if self.ctrl || self.meta => Some(NavAction::Undo),
            _ => None,
        }
    }
}

/// Offset and velocity of a finished drag, in px and px/s.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DragEnd {
    pub offset_x: f64,
    pub offset_y: f64,
    #[serde(default)]
    pub velocity_x: f64,
    #[serde(default)]
    pub velocity_y: f64,
}

impl DragEnd {
    pub fn is_swipe(&self) -> bool {
        self.offset_x.abs() > SWIPE_OFFSET
            || self.offset_y.abs() > SWIPE_OFFSET
            || self.velocity_x.abs() > SWIPE_VELOCITY
            || self.velocity_y.abs() > SWIPE_VELOCITY
    }

    /// Dominant axis wins. Left or up advances, right or down goes back.
    pub fn action(&self) -> Option<NavAction> {
        if !self.is_swipe() {
            return None;
        }
        let horizontal = self.offset_x.abs().max(self.velocity_x.abs() / 5.0)
            >= self.offset_y.abs().max(self.velocity_y.abs() / 5.0);
        let forward = if horizontal {
            dominant(self.offset_x, self.velocity_x) < 0.0
        } else {
            dominant(self.offset_y, self.velocity_y) < 0.0
        };
        Some(if forward {
            NavAction::Next
        } else {
            NavAction::Previous
        })
    }
}

// Offset decides the sign unless the drag barely moved.
fn dominant(offset: f64, velocity: f64) -> f64 {
    if offset.abs() > f64::EPSILON {
        offset
    } else {
        velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str) -> KeyPress {
        KeyPress {
            key: k.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_arrow_keys() {
        assert_eq!(key("ArrowLeft").action(), Some(NavAction::Previous));
        assert_eq!(key("ArrowUp").action(), Some(NavAction::Previous));
        assert_eq!(key("ArrowRight").action(), Some(NavAction::Next));
        assert_eq!(key("ArrowDown").action(), Some(NavAction::Next));
        assert_eq!(key(" ").action(), Some(NavAction::Next));
        assert_eq!(key("Home").action(), Some(NavAction::First));
        assert_eq!(key("End").action(), Some(NavAction::Last));
        assert_eq!(key("Enter").action(), None);
    }

    #[test]
    fn test_undo_needs_modifier() {
        assert_eq!(key("u").action(), None);
        let press = KeyPress {
            key: "U".to_string(),
            meta: true,
            ..Default::default()
        };
        assert_eq!(press.action(), Some(NavAction::Undo));
    }

    #[test]
    fn test_short_drag_is_not_a_swipe() {
        let drag = DragEnd {
            offset_x: -90.0,
            offset_y: 40.0,
            velocity_x: 300.0,
            velocity_y: 0.0,
        };
        assert_eq!(drag.action(), None);
    }

    #[test]
    fn test_swipe_left_advances() {
        let drag = DragEnd {
            offset_x: -150.0,
            offset_y: 20.0,
            ..Default::default()
        };
        assert_eq!(drag.action(), Some(NavAction::Next));
    }

    #[test]
    fn test_swipe_down_goes_back() {
        let drag = DragEnd {
            offset_x: 10.0,
            offset_y: 180.0,
            ..Default::default()
        };
        assert_eq!(drag.action(), Some(NavAction::Previous));
    }

    #[test]
    fn test_fast_flick_counts() {
        let drag = DragEnd {
            offset_x: 30.0,
            offset_y: 0.0,
            velocity_x: 900.0,
            velocity_y: 0.0,
        };
        assert_eq!(drag.action(), Some(NavAction::Previous));
    }
}
