//! Drag activation sensors.
//!
//! A press doesn't start a drag by itself, so that plain clicks still select.
//! Mouse presses activate once the pointer has travelled far enough; touch
//! presses activate after a hold, and moving too far during the hold aborts.
//!
//! Timestamps are host-supplied milliseconds; the sensor never reads a clock.

use crate::config::EditorConfig;
use kurbo::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorState {
    /// No press in progress.
    #[default]
    Idle,
    /// Pressed, not yet a drag.
    Pending,
    /// The press became a drag. The host should call `drag_start`.
    Activated,
    /// The press can no longer become a drag.
    Aborted,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    kind: PointerKind,
    origin: Point,
    down_time: u64,
}

/// Decides when a pointer press turns into a drag.
#[derive(Debug, Clone)]
pub struct DragSensor {
    activation_distance: f64,
    touch_delay_ms: u64,
    touch_tolerance: f64,
    press: Option<Press>,
    state: SensorState,
}

impl Default for DragSensor {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl DragSensor {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            activation_distance: config.activation_distance,
            touch_delay_ms: config.touch_delay_ms,
            touch_tolerance: config.touch_tolerance,
            press: None,
            state: SensorState::Idle,
        }
    }

    pub fn state(&self) -> SensorState {
        self.state
    }

    pub fn press(&mut self, kind: PointerKind, position: Point, time_ms: u64) -> SensorState {
        self.press = Some(Press {
            kind,
            origin: position,
            down_time: time_ms,
        });
        self.state = SensorState::Pending;
        self.state
    }

    /// Pointer moved while pressed.
    pub fn motion(&mut self, position: Point, time_ms: u64) -> SensorState {
        let Some(press) = self.press else {
            return self.state;
        };
        if self.state != SensorState::Pending {
            return self.state;
        }
        let travelled = press.origin.distance(position);
        self.state = match press.kind {
            PointerKind::Mouse if travelled >= self.activation_distance => SensorState::Activated,
            PointerKind::Mouse => SensorState::Pending,
            PointerKind::Touch if travelled > self.touch_tolerance => {
                log::debug!("sensor: touch moved {travelled:.1}px during hold, aborting");
                SensorState::Aborted
            }
            PointerKind::Touch => self.touch_state_at(press, time_ms),
        };
        self.state
    }

    /// Time passed without motion. Only touch presses care.
    pub fn tick(&mut self, time_ms: u64) -> SensorState {
        if let Some(press) = self.press
            && self.state == SensorState::Pending
            && press.kind == PointerKind::Touch
        {
            self.state = self.touch_state_at(press, time_ms);
        }
        self.state
    }

    /// Pointer lifted. Returns the state the press ended in and resets to idle.
    pub fn release(&mut self) -> SensorState {
        let ended = self.state;
        self.press = None;
        self.state = SensorState::Idle;
        ended
    }

    fn touch_state_at(&self, press: Press, time_ms: u64) -> SensorState {
        if time_ms.saturating_sub(press.down_time) >= self.touch_delay_ms {
            SensorState::Activated
        } else {
            SensorState::Pending
        }
    }
}
