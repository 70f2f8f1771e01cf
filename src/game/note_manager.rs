use log::{info, warn};

use crate::core::input::{AnyAreaFeed, GameInputEvent, InputEventRouter, ListenerId, RawAreaEvent};
use crate::game::judge_queue::{NoteJudgeQueue, TapQueueInfo, TouchQueueInfo};
use crate::game::orchestrator::{PhaseTimings, TickOrchestrator};
use crate::game::updater::{NoteUpdater, TickContext, UPDATER_COUNT};
use crate::game::usage::UsageFlagBank;

/// Owns the judgment queue, usage flags, input router and updater bank for
/// one play session.
///
/// Constructed explicitly and handed to whatever needs it; there is no
/// global instance.
pub struct NoteManager {
    router: InputEventRouter,
    usage: UsageFlagBank,
    queue: NoteJudgeQueue,
    orchestrator: TickOrchestrator,
}

impl NoteManager {
    pub fn new(updaters: [Box<dyn NoteUpdater>; UPDATER_COUNT]) -> Self {
        Self {
            router: InputEventRouter::new(),
            usage: UsageFlagBank::new(),
            queue: NoteJudgeQueue::new(),
            orchestrator: TickOrchestrator::new(updaters),
        }
    }

    #[must_use]
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.orchestrator.set_diagnostics(enabled);
        self
    }

    /* ----------------------------- Input side ----------------------------- */

    pub fn bind_input(&mut self, feed: &mut impl AnyAreaFeed) -> bool {
        let bound = self.router.bind(feed);
        if bound {
            info!("Note manager bound to input feed.");
        }
        bound
    }

    pub fn unbind_input(&mut self, feed: &mut impl AnyAreaFeed) -> bool {
        let unbound = self.router.unbind(feed);
        if !unbound {
            warn!("Note manager was not bound to an input feed.");
        }
        unbound
    }

    #[inline(always)]
    pub const fn is_input_bound(&self) -> bool {
        self.router.is_bound()
    }

    pub fn add_listener(&mut self, listener: impl FnMut(&mut GameInputEvent<'_>) + 'static) -> ListenerId {
        self.router.add_listener(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.router.remove_listener(id)
    }

    /// Broadcasts every transition the feed queued since the last call.
    pub fn pump_input(&mut self) -> usize {
        self.router.pump(&mut self.usage)
    }

    pub fn dispatch(&mut self, raw: &RawAreaEvent) -> bool {
        self.router.dispatch(raw, &mut self.usage)
    }

    #[inline(always)]
    pub const fn router(&self) -> &InputEventRouter {
        &self.router
    }

    #[inline(always)]
    pub const fn usage(&self) -> &UsageFlagBank {
        &self.usage
    }

    /* ---------------------------- Judgment queue ---------------------------- */

    pub fn reset_counter(&mut self) {
        self.queue.reset_counter();
    }

    #[inline(always)]
    pub fn can_judge_tap(&self, info: &TapQueueInfo) -> bool {
        self.queue.can_judge_tap(info)
    }

    #[inline(always)]
    pub fn can_judge_touch(&self, info: &TouchQueueInfo) -> bool {
        self.queue.can_judge_touch(info)
    }

    pub fn next_note(&mut self, info: &TapQueueInfo) {
        self.queue.next_note(info);
    }

    pub fn next_touch(&mut self, info: &TouchQueueInfo) {
        self.queue.next_touch(info);
    }

    #[inline(always)]
    pub const fn queue(&self) -> &NoteJudgeQueue {
        &self.queue
    }

    /* ------------------------------ Tick phases ------------------------------ */

    pub fn initialize_updater(&mut self) {
        self.orchestrator.initialize();
    }

    #[inline(always)]
    pub const fn is_updater_initialized(&self) -> bool {
        self.orchestrator.is_initialized()
    }

    pub fn update(&mut self, music_time_ms: f64) {
        let mut ctx = TickContext {
            queue: &mut self.queue,
            usage: &mut self.usage,
            music_time_ms,
        };
        self.orchestrator.update(&mut ctx);
    }

    pub fn fixed_update(&mut self, music_time_ms: f64) {
        let mut ctx = TickContext {
            queue: &mut self.queue,
            usage: &mut self.usage,
            music_time_ms,
        };
        self.orchestrator.fixed_update(&mut ctx);
    }

    pub fn late_update(&mut self, music_time_ms: f64) {
        let mut ctx = TickContext {
            queue: &mut self.queue,
            usage: &mut self.usage,
            music_time_ms,
        };
        self.orchestrator.late_update(&mut ctx);
    }

    #[inline(always)]
    pub const fn timings(&self) -> PhaseTimings {
        self.orchestrator.timings()
    }

    /// Ends the session: forgets every watermark so nothing can be judged
    /// until the next `reset_counter`.
    pub fn end_session(&mut self) {
        self.queue.clear();
        self.usage.reset_all();
    }
}

impl Drop for NoteManager {
    fn drop(&mut self) {
        if self.router.is_bound() {
            warn!("Note manager dropped while still bound to an input feed.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NoteManager;
    use crate::core::input::{InputManager, RawAreaEvent};
    use crate::game::judge_queue::TapQueueInfo;
    use crate::game::sensor::{SensorArea, SensorStatus};
    use crate::game::updater::{IdleUpdater, NoteUpdater, UPDATER_COUNT};
    use std::cell::Cell;
    use std::rc::Rc;

    fn idle_manager() -> NoteManager {
        let updaters: [Box<dyn NoteUpdater>; UPDATER_COUNT] =
            std::array::from_fn(|_| Box::new(IdleUpdater) as Box<dyn NoteUpdater>);
        NoteManager::new(updaters)
    }

    #[test]
    fn listener_claim_is_cleared_by_next_fixed_update() {
        let mut nm = idle_manager();
        nm.add_listener(|ev| {
            ev.claim();
        });
        nm.dispatch(&RawAreaEvent {
            area_id: SensorArea::B4.ordinal(),
            is_button: false,
            old_status: SensorStatus::Off,
            new_status: SensorStatus::On,
        });
        assert!(nm.usage().any_used());
        nm.fixed_update(0.0);
        assert!(!nm.usage().any_used(), "reset runs before initialization too");
        assert!(!nm.is_updater_initialized());
    }

    #[test]
    fn bind_pump_unbind_cycle() {
        let mut nm = idle_manager();
        let mut input = InputManager::new();
        assert!(nm.bind_input(&mut input));

        let hits = Rc::new(Cell::new(0u32));
        let seen = Rc::clone(&hits);
        nm.add_listener(move |_| seen.set(seen.get() + 1));
        input.set_button(SensorArea::A1, true);
        input.set_button(SensorArea::A1, false);
        assert_eq!(nm.pump_input(), 2);
        assert_eq!(hits.get(), 2);

        assert!(nm.unbind_input(&mut input));
        assert!(!nm.is_input_bound());
        input.set_button(SensorArea::A1, true);
        assert_eq!(nm.pump_input(), 0);
    }

    #[test]
    fn end_session_closes_every_lane() {
        let mut nm = idle_manager();
        nm.reset_counter();
        let info = TapQueueInfo {
            key_index: 1,
            index: 0,
        };
        assert!(nm.can_judge_tap(&info));
        nm.end_session();
        assert!(!nm.can_judge_tap(&info));
    }
}
