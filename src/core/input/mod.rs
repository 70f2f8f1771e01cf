use std::sync::mpsc::Sender;

use log::{debug, warn};

use crate::game::sensor::{AREA_COUNT, SensorArea, SensorStatus};

pub mod router;

pub use router::{GameInputEvent, InputEventRouter, ListenerId};

/* ------------------------- Raw area transitions ------------------------- */

/// One status transition as reported by the input backend.
///
/// `area_id` is the raw hardware ordinal; it may name areas the gameplay
/// path does not handle (reserved or future hardware).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawAreaEvent {
    pub area_id: u8,
    pub is_button: bool,
    pub old_status: SensorStatus,
    pub new_status: SensorStatus,
}

impl RawAreaEvent {
    #[inline(always)]
    pub const fn area(&self) -> Option<SensorArea> {
        SensorArea::from_ordinal(self.area_id)
    }
}

/// An input backend that reports every area transition to a single handler.
///
/// The backend may run on its own thread; it only holds the sending half of
/// the channel and the frame thread drains the other half.
pub trait AnyAreaFeed {
    /// Installs the handler. Returns `false` if one is already bound.
    fn bind_any_area(&mut self, sink: Sender<RawAreaEvent>) -> bool;
    /// Removes the handler. Returns `false` if none was bound.
    fn unbind_any_area(&mut self) -> bool;
}

/* ------------------------ In-process input manager ------------------------ */

/// Tracks button and sensor status and emits a transition only on change.
#[derive(Debug)]
pub struct InputManager {
    sink: Option<Sender<RawAreaEvent>>,
    button_status: [SensorStatus; AREA_COUNT],
    sensor_status: [SensorStatus; AREA_COUNT],
}

impl Default for InputManager {
    fn default() -> Self {
        Self {
            sink: None,
            button_status: [SensorStatus::Off; AREA_COUNT],
            sensor_status: [SensorStatus::Off; AREA_COUNT],
        }
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub const fn is_bound(&self) -> bool {
        self.sink.is_some()
    }

    #[inline(always)]
    pub fn button_status(&self, area: SensorArea) -> SensorStatus {
        self.button_status[area.index()]
    }

    #[inline(always)]
    pub fn sensor_status(&self, area: SensorArea) -> SensorStatus {
        self.sensor_status[area.index()]
    }

    /// Updates a button and reports whether a transition was emitted.
    pub fn set_button(&mut self, area: SensorArea, pressed: bool) -> bool {
        let new_status = SensorStatus::from_pressed(pressed);
        let old_status = std::mem::replace(&mut self.button_status[area.index()], new_status);
        if old_status == new_status {
            return false;
        }
        self.emit(RawAreaEvent {
            area_id: area.ordinal(),
            is_button: true,
            old_status,
            new_status,
        });
        true
    }

    /// Updates a touch sensor and reports whether a transition was emitted.
    pub fn set_sensor(&mut self, area: SensorArea, touched: bool) -> bool {
        let new_status = SensorStatus::from_pressed(touched);
        let old_status = std::mem::replace(&mut self.sensor_status[area.index()], new_status);
        if old_status == new_status {
            return false;
        }
        self.emit(RawAreaEvent {
            area_id: area.ordinal(),
            is_button: false,
            old_status,
            new_status,
        });
        true
    }

    /// Forwards a transition verbatim, including ids with no `SensorArea`.
    pub fn emit(&mut self, ev: RawAreaEvent) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        if sink.send(ev).is_err() {
            // Receiver is gone; behave as unbound from now on.
            debug!("Area handler disconnected; dropping sink.");
            self.sink = None;
        }
    }
}

impl AnyAreaFeed for InputManager {
    fn bind_any_area(&mut self, sink: Sender<RawAreaEvent>) -> bool {
        if self.sink.is_some() {
            warn!("An any-area handler is already bound; ignoring second bind.");
            return false;
        }
        self.sink = Some(sink);
        true
    }

    fn unbind_any_area(&mut self) -> bool {
        self.sink.take().is_some()
    }
}
