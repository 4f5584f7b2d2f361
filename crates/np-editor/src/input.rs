//! Input abstraction layer.
//!
//! Normalizes mouse, touch, and stylus events into a unified `InputEvent`
//! consumed by stroke capture. Coordinates are in input-surface pixels.

use np_core::geometry::Point;
use serde::{Deserialize, Serialize};

/// A normalized input event from any pointing device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start, pencil contact).
    Down { x: f64, y: f64 },

    /// Pointer moved (mouse move, touch move, pencil move).
    Move { x: f64, y: f64 },

    /// Pointer released.
    Up { x: f64, y: f64 },

    /// Pointer left the surface or the gesture was interrupted.
    Cancel,
}

impl InputEvent {
    pub fn from_pointer_down(x: f64, y: f64) -> Self {
        Self::Down { x, y }
    }

    pub fn from_pointer_move(x: f64, y: f64) -> Self {
        Self::Move { x, y }
    }

    pub fn from_pointer_up(x: f64, y: f64) -> Self {
        Self::Up { x, y }
    }

    /// Extract position if this event carries one.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::Down { x, y } | Self::Move { x, y } | Self::Up { x, y } => Some(Point::new(*x, *y)),
            Self::Cancel => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_event_script() {
        let events: Vec<InputEvent> = serde_json::from_str(
            r#"[{"type":"down","x":1,"y":2},{"type":"move","x":3.5,"y":4},{"type":"cancel"}]"#,
        )
        .unwrap();
        assert_eq!(
            events,
            vec![
                InputEvent::from_pointer_down(1.0, 2.0),
                InputEvent::from_pointer_move(3.5, 4.0),
                InputEvent::Cancel,
            ]
        );
        assert_eq!(events[1].position(), Some(Point::new(3.5, 4.0)));
        assert_eq!(events[2].position(), None);
    }
}
