use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;

use log::{debug, trace};
use serde::Serialize;

use crate::core::input::GameInputEvent;
use crate::game::judge_queue::TapQueueInfo;
use crate::game::sensor::SensorArea;
use crate::game::updater::{NoteUpdater, TickContext};

pub const DEFAULT_JUDGE_WINDOW_MS: f64 = 150.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LaneStats {
    pub lane: u8,
    pub notes: u32,
    pub hits: u32,
    pub misses: u32,
    /// Presses this lane claimed that did not land on a note.
    pub empty_presses: u32,
}

pub type LaneStatsHandle = Rc<RefCell<LaneStats>>;

/// Button presses a lane listener has claimed, waiting for the next fixed tick.
type PressInbox = Rc<RefCell<VecDeque<SensorArea>>>;

/// Tap-note updater for a single lane.
///
/// Presses arrive through [`TapLaneUpdater::listener`] and are judged on the
/// following fixed tick; notes that scroll past the window are missed in the
/// variable-rate phase. Either way the lane's watermark moves one note at a time.
pub struct TapLaneUpdater {
    lane: u8,
    note_times_ms: Vec<f64>,
    cursor: usize,
    window_ms: f64,
    inbox: PressInbox,
    stats: LaneStatsHandle,
    update_elapsed_ms: f64,
    fixed_update_elapsed_ms: f64,
}

impl TapLaneUpdater {
    /// `note_times_ms` must be sorted; ordinals are positions in that list.
    pub fn new(lane: u8, note_times_ms: Vec<f64>, window_ms: f64) -> Self {
        debug_assert!(note_times_ms.windows(2).all(|w| w[0] <= w[1]));
        let stats = LaneStats {
            lane,
            notes: note_times_ms.len() as u32,
            ..LaneStats::default()
        };
        Self {
            lane,
            note_times_ms,
            cursor: 0,
            window_ms: window_ms.max(0.0),
            inbox: PressInbox::default(),
            stats: Rc::new(RefCell::new(stats)),
            update_elapsed_ms: 0.0,
            fixed_update_elapsed_ms: 0.0,
        }
    }

    #[inline(always)]
    pub const fn lane(&self) -> u8 {
        self.lane
    }

    pub fn stats_handle(&self) -> LaneStatsHandle {
        Rc::clone(&self.stats)
    }

    /// Router listener that claims presses on this lane's button.
    ///
    /// A press already claimed by an earlier listener is left alone.
    pub fn listener(&self) -> impl FnMut(&mut GameInputEvent<'_>) + 'static {
        let inbox = Rc::clone(&self.inbox);
        let lane = self.lane;
        move |ev| {
            if !ev.is_button || !ev.is_press() || ev.area.button_lane() != Some(lane) {
                return;
            }
            if ev.claim() {
                inbox.borrow_mut().push_back(ev.area);
            } else {
                trace!("Lane {lane}: press on {} already claimed", ev.area);
            }
        }
    }

    #[inline(always)]
    fn front(&self) -> Option<TapQueueInfo> {
        (self.cursor < self.note_times_ms.len()).then(|| TapQueueInfo {
            key_index: self.lane,
            index: self.cursor as u32,
        })
    }

    fn consume_front(&mut self, ctx: &mut TickContext<'_>, info: &TapQueueInfo) {
        ctx.queue.next_note(info);
        self.cursor += 1;
    }
}

impl NoteUpdater for TapLaneUpdater {
    fn initialize(&mut self) {
        self.cursor = 0;
        self.inbox.borrow_mut().clear();
        let mut stats = self.stats.borrow_mut();
        *stats = LaneStats {
            lane: self.lane,
            notes: self.note_times_ms.len() as u32,
            ..LaneStats::default()
        };
    }

    fn on_update(&mut self, ctx: &mut TickContext<'_>) {
        let started = Instant::now();
        while let Some(info) = self.front() {
            let deadline = self.note_times_ms[self.cursor] + self.window_ms;
            if ctx.music_time_ms <= deadline || !ctx.queue.can_judge_tap(&info) {
                break;
            }
            debug!("Lane {}: note {} missed", self.lane, info.index);
            self.consume_front(ctx, &info);
            self.stats.borrow_mut().misses += 1;
        }
        self.update_elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    }

    fn on_fixed_update(&mut self, ctx: &mut TickContext<'_>) {
        let started = Instant::now();
        loop {
            let Some(area) = self.inbox.borrow_mut().pop_front() else {
                break;
            };
            let hit = self.front().filter(|info| ctx.queue.can_judge_tap(info)).filter(|_| {
                (ctx.music_time_ms - self.note_times_ms[self.cursor]).abs() <= self.window_ms
            });
            match hit {
                Some(info) => {
                    trace!("Lane {}: {area} hit note {}", self.lane, info.index);
                    self.consume_front(ctx, &info);
                    self.stats.borrow_mut().hits += 1;
                }
                None => self.stats.borrow_mut().empty_presses += 1,
            }
        }
        self.fixed_update_elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    }

    // Presses stay queued until the next fixed tick judges them.
    fn on_late_update(&mut self, _ctx: &mut TickContext<'_>) {}

    fn update_elapsed_ms(&self) -> f64 {
        self.update_elapsed_ms
    }

    fn fixed_update_elapsed_ms(&self) -> f64 {
        self.fixed_update_elapsed_ms
    }
}
