use crate::config::Config;
use crate::core::clock::FixedStepClock;
use crate::core::input::{InputManager, RawAreaEvent};
use crate::game::lane_updater::{LaneStats, LaneStatsHandle, TapLaneUpdater};
use crate::game::note_manager::NoteManager;
use crate::game::orchestrator::PhaseTimings;
use crate::game::sensor::{LANE_COUNT, SensorArea, SensorStatus};
use crate::game::updater::NoteUpdater;

use log::{debug, info};
use serde::Serialize;
use std::cell::Cell;
use std::collections::VecDeque;
use std::error::Error;
use std::rc::Rc;
use std::time::Duration;

/* -------------------- demo chart constants -------------------- */
const CHART_LEAD_IN_MS: f64 = 1000.0;
const CHART_TAIL_MS: f64 = 500.0;
const NOTE_SPACING_MS: f64 = 480.0;
const LANE_STAGGER_MS: f64 = 60.0;
const AUTOPLAY_HOLD_MS: f64 = 40.0;

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub frames: u64,
    pub fixed_steps: u64,
    pub dropped_backlog_ms: f64,
    pub routed_events: u64,
    pub dropped_events: u64,
    /// Presses and touches no lane claimed.
    pub unclaimed_presses: u32,
    pub lanes: Vec<LaneStats>,
    pub timings: PhaseTimings,
}

/// Evenly spaced taps for `lane`, staggered so lanes do not share a tick.
pub fn demo_chart(lane: u8, session_ms: f64) -> Vec<f64> {
    let first = CHART_LEAD_IN_MS + f64::from(lane.saturating_sub(1)) * LANE_STAGGER_MS;
    let last = session_ms - CHART_TAIL_MS;
    let mut out = Vec::new();
    let mut t = first;
    while t <= last {
        out.push(t);
        t += NOTE_SPACING_MS;
    }
    out
}

/* -------------------- autoplay -------------------- */

/// Presses each lane's button (and the matching touch area) on its notes.
struct Autoplay {
    pending: [VecDeque<f64>; LANE_COUNT],
    release_at: [Option<f64>; LANE_COUNT],
}

impl Autoplay {
    fn new(charts: &[Vec<f64>; LANE_COUNT], offset_ms: f64) -> Self {
        Self {
            pending: std::array::from_fn(|i| charts[i].iter().map(|t| t + offset_ms).collect()),
            release_at: [None; LANE_COUNT],
        }
    }

    fn drive(&mut self, now_ms: f64, input: &mut InputManager) {
        for (i, (queue, release)) in self.pending.iter_mut().zip(self.release_at.iter_mut()).enumerate() {
            let Some(area) = SensorArea::from_ordinal(i as u8) else {
                continue;
            };
            if release.is_some_and(|at| now_ms >= at) {
                input.set_button(area, false);
                input.set_sensor(area, false);
                *release = None;
            }
            if release.is_none() && queue.front().is_some_and(|&at| now_ms >= at) {
                queue.pop_front();
                input.set_button(area, true);
                input.set_sensor(area, true);
                *release = Some(now_ms + AUTOPLAY_HOLD_MS);
            }
        }
    }
}

/* -------------------- session -------------------- */

/// Plays a generated chart with autoplay, headless, in simulated time.
pub fn run(config: &Config) -> Result<SessionSummary, Box<dyn Error>> {
    let session_ms = f64::from(config.session_seconds) * 1000.0;
    let window_ms = f64::from(config.judge_window_ms);

    let charts: [Vec<f64>; LANE_COUNT] = std::array::from_fn(|i| demo_chart(i as u8 + 1, session_ms));
    let lanes: [TapLaneUpdater; LANE_COUNT] =
        std::array::from_fn(|i| TapLaneUpdater::new(i as u8 + 1, charts[i].clone(), window_ms));
    let stats: Vec<LaneStatsHandle> = lanes.iter().map(TapLaneUpdater::stats_handle).collect();
    let listeners: Vec<_> = lanes.iter().map(TapLaneUpdater::listener).collect();
    let updaters = lanes.map(|lane| Box::new(lane) as Box<dyn NoteUpdater>);

    let mut nm = NoteManager::new(updaters).with_diagnostics(config.phase_timings);
    for listener in listeners {
        nm.add_listener(listener);
    }
    let unclaimed = Rc::new(Cell::new(0u32));
    let unclaimed_sink = Rc::clone(&unclaimed);
    nm.add_listener(move |ev| {
        if ev.is_press() && !ev.is_used() {
            unclaimed_sink.set(unclaimed_sink.get() + 1);
        }
    });

    let mut input = InputManager::new();
    if !nm.bind_input(&mut input) {
        return Err("failed to bind the input feed".into());
    }

    nm.reset_counter();
    nm.initialize_updater();

    // Operator button; reserved id, never reaches gameplay.
    input.emit(RawAreaEvent {
        area_id: SensorArea::Test.ordinal(),
        is_button: true,
        old_status: SensorStatus::Off,
        new_status: SensorStatus::On,
    });

    let frame_dt = Duration::from_secs_f64(1.0 / f64::from(config.target_fps.max(1)));
    let frame_ms = frame_dt.as_secs_f64() * 1000.0;
    let mut clock = FixedStepClock::new(config.fixed_step_hz, config.max_steps_per_frame);
    let step_ms = clock.step().as_secs_f64() * 1000.0;
    let mut autoplay = Autoplay::new(&charts, f64::from(config.autoplay_offset_ms));

    info!(
        "Session start: {:.1}s, {} fps, {} Hz fixed, window ±{:.0} ms",
        config.session_seconds, config.target_fps, config.fixed_step_hz, window_ms
    );

    let mut frames = 0u64;
    let mut now_ms = 0.0_f64;
    let mut fixed_ms = 0.0_f64;
    let mut log_timer = 0.0_f64;
    // One extra window so the last notes can resolve.
    let end_ms = session_ms + window_ms;
    while now_ms < end_ms {
        now_ms += frame_ms;
        autoplay.drive(now_ms, &mut input);
        nm.pump_input();

        let plan = clock.advance(frame_dt);
        if !plan.dropped_backlog.is_zero() {
            debug!("Dropped {:?} of fixed-step backlog", plan.dropped_backlog);
        }
        for _ in 0..plan.steps {
            fixed_ms += step_ms;
            nm.fixed_update(fixed_ms);
        }
        nm.update(now_ms);
        nm.late_update(now_ms);
        frames += 1;

        log_timer += frame_ms;
        if log_timer >= 1000.0 {
            let (hits, misses) = stats.iter().fold((0, 0), |(h, m), s| {
                let s = s.borrow();
                (h + s.hits, m + s.misses)
            });
            info!(
                "Time: {:.2}s, Fixed steps: {}, Hits: {}, Misses: {}, Watermark L1: {:?}",
                now_ms / 1000.0,
                clock.total_steps(),
                hits,
                misses,
                nm.queue().current_note_index(1)
            );
            log_timer -= 1000.0;
        }
    }

    nm.unbind_input(&mut input);

    let lanes: Vec<LaneStats> = stats.iter().map(|s| *s.borrow()).collect();
    for lane in &lanes {
        info!(
            "Lane {}: {} notes, {} hit, {} missed, {} empty presses",
            lane.lane, lane.notes, lane.hits, lane.misses, lane.empty_presses
        );
    }
    let summary = SessionSummary {
        frames,
        fixed_steps: clock.total_steps(),
        dropped_backlog_ms: clock.dropped_total().as_secs_f64() * 1000.0,
        routed_events: nm.router().dispatched(),
        dropped_events: nm.router().dropped(),
        unclaimed_presses: unclaimed.get(),
        lanes,
        timings: nm.timings(),
    };
    nm.end_session();
    Ok(summary)
}
