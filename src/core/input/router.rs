use std::sync::mpsc::{self, Receiver, TryRecvError};

use log::{debug, trace, warn};
use smallvec::SmallVec;

use super::{AnyAreaFeed, RawAreaEvent};
use crate::game::sensor::{SensorArea, SensorStatus};
use crate::game::usage::{UsageFlagBank, UsageSlot};

/// A gameplay input transition, enriched with its usage flag.
///
/// The flag is borrowed from the bank for the duration of one broadcast, so
/// a claim made by one listener is seen by every listener after it.
pub struct GameInputEvent<'a> {
    pub area: SensorArea,
    pub old_state: SensorStatus,
    pub state: SensorStatus,
    pub is_button: bool,
    slot: UsageSlot,
    usage: &'a mut UsageFlagBank,
}

impl GameInputEvent<'_> {
    #[inline(always)]
    pub const fn slot(&self) -> UsageSlot {
        self.slot
    }

    #[inline(always)]
    pub fn is_used(&self) -> bool {
        self.usage.get(self.slot)
    }

    #[inline(always)]
    pub fn set_used(&mut self, used: bool) {
        self.usage.set(self.slot, used);
    }

    /// Marks the area as consumed; `false` if someone else already did.
    #[inline(always)]
    pub fn claim(&mut self) -> bool {
        self.usage.claim(self.slot)
    }

    /// Off -> On.
    #[inline(always)]
    pub const fn is_press(&self) -> bool {
        !self.old_state.is_on() && self.state.is_on()
    }
}

impl std::fmt::Debug for GameInputEvent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameInputEvent")
            .field("area", &self.area)
            .field("old_state", &self.old_state)
            .field("state", &self.state)
            .field("is_button", &self.is_button)
            .field("is_used", &self.is_used())
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

type Listener = Box<dyn FnMut(&mut GameInputEvent<'_>)>;

/// Fans raw area transitions out to gameplay listeners.
pub struct InputEventRouter {
    listeners: SmallVec<[(ListenerId, Listener); 4]>,
    next_listener_id: u32,
    inbox: Option<Receiver<RawAreaEvent>>,
    dispatched: u64,
    dropped: u64,
}

impl Default for InputEventRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl InputEventRouter {
    pub fn new() -> Self {
        Self {
            listeners: SmallVec::new(),
            next_listener_id: 0,
            inbox: None,
            dispatched: 0,
            dropped: 0,
        }
    }

    #[inline(always)]
    pub const fn is_bound(&self) -> bool {
        self.inbox.is_some()
    }

    /// Subscribes to `feed`. A router holds at most one subscription.
    pub fn bind(&mut self, feed: &mut impl AnyAreaFeed) -> bool {
        if self.inbox.is_some() {
            warn!("Input router is already bound to a feed.");
            return false;
        }
        let (tx, rx) = mpsc::channel();
        if !feed.bind_any_area(tx) {
            return false;
        }
        self.inbox = Some(rx);
        true
    }

    /// Tears the subscription down. Events still queued are discarded.
    pub fn unbind(&mut self, feed: &mut impl AnyAreaFeed) -> bool {
        let Some(rx) = self.inbox.take() else {
            return false;
        };
        if !feed.unbind_any_area() {
            debug!("Input feed had already dropped its handler.");
        }
        let discarded = rx.try_iter().count();
        if discarded > 0 {
            debug!("Discarded {discarded} queued area events on unbind.");
        }
        true
    }

    pub fn add_listener(&mut self, listener: impl FnMut(&mut GameInputEvent<'_>) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id = self.next_listener_id.wrapping_add(1);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let Some(pos) = self.listeners.iter().position(|(lid, _)| *lid == id) else {
            return false;
        };
        drop(self.listeners.remove(pos));
        true
    }

    #[inline(always)]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Broadcasts this many events since construction.
    #[inline(always)]
    pub const fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Raw events rejected for being outside the gameplay range.
    #[inline(always)]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Drains every queued feed event through `dispatch`, returning how many were read.
    pub fn pump(&mut self, usage: &mut UsageFlagBank) -> usize {
        let mut read = 0;
        loop {
            let next = match self.inbox.as_ref() {
                Some(rx) => rx.try_recv(),
                None => break,
            };
            match next {
                Ok(raw) => {
                    read += 1;
                    self.dispatch(&raw, usage);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("Input feed hung up; router is now unbound.");
                    self.inbox = None;
                    break;
                }
            }
        }
        read
    }

    /// Routes one raw transition. Returns `true` if listeners were invoked.
    pub fn dispatch(&mut self, raw: &RawAreaEvent, usage: &mut UsageFlagBank) -> bool {
        let Some(area) = raw.area().filter(|a| a.is_playable()) else {
            trace!("Ignoring area id {} outside A1..E8", raw.area_id);
            self.dropped += 1;
            return false;
        };
        if self.listeners.is_empty() {
            return false;
        }
        let Some(slot) = UsageSlot::for_event(area, raw.is_button) else {
            trace!("Ignoring button event on non-button area {area}");
            self.dropped += 1;
            return false;
        };

        let mut packet = GameInputEvent {
            area,
            old_state: raw.old_status,
            state: raw.new_status,
            is_button: raw.is_button,
            slot,
            usage,
        };
        for (_, listener) in &mut self.listeners {
            listener(&mut packet);
        }
        self.dispatched += 1;
        true
    }
}
