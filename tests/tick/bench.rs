use std::hint::black_box;
use std::time::Instant;

use notejudge::app::demo_chart;
use notejudge::core::input::RawAreaEvent;
use notejudge::game::lane_updater::{DEFAULT_JUDGE_WINDOW_MS, TapLaneUpdater};
use notejudge::game::note_manager::NoteManager;
use notejudge::game::sensor::{LANE_COUNT, SensorStatus};
use notejudge::game::updater::NoteUpdater;

const WARMUP_TICKS: u32 = 2_000;
const TICKS: u32 = 200_000;
const STEP_MS: f64 = 1000.0 / 120.0;

fn build_manager(session_ms: f64) -> NoteManager {
    let lanes: [TapLaneUpdater; LANE_COUNT] = std::array::from_fn(|i| {
        let lane = i as u8 + 1;
        TapLaneUpdater::new(lane, demo_chart(lane, session_ms), DEFAULT_JUDGE_WINDOW_MS)
    });
    let listeners: Vec<_> = lanes.iter().map(TapLaneUpdater::listener).collect();
    let mut nm = NoteManager::new(lanes.map(|lane| Box::new(lane) as Box<dyn NoteUpdater>))
        .with_diagnostics(true);
    for listener in listeners {
        nm.add_listener(listener);
    }
    nm.reset_counter();
    nm.initialize_updater();
    nm
}

fn press(tick: u32) -> RawAreaEvent {
    let lane = (tick % LANE_COUNT as u32) as u8;
    RawAreaEvent {
        area_id: lane,
        is_button: tick % 2 == 0,
        old_status: SensorStatus::Off,
        new_status: SensorStatus::On,
    }
}

fn run_ticks(nm: &mut NoteManager, start: u32, count: u32) -> f64 {
    let mut sum_fixed_ms = 0.0;
    for tick in start..start + count {
        let t = f64::from(tick) * STEP_MS;
        if tick % 3 == 0 {
            nm.dispatch(&press(tick));
        }
        nm.fixed_update(t);
        if tick % 2 == 1 {
            nm.update(t);
            nm.late_update(t);
        }
        sum_fixed_ms += nm.timings().fixed_update_ms;
    }
    sum_fixed_ms
}

fn main() {
    let session_ms = f64::from(WARMUP_TICKS + TICKS) * STEP_MS;
    let mut nm = build_manager(session_ms);

    black_box(run_ticks(&mut nm, 0, WARMUP_TICKS));
    let started = Instant::now();
    let self_reported_ms = black_box(run_ticks(&mut nm, WARMUP_TICKS, TICKS));
    let wall = started.elapsed();

    let per_tick_ns = wall.as_nanos() as f64 / f64::from(TICKS);
    println!("tick_bench: {TICKS} fixed ticks across {LANE_COUNT} lanes");
    println!("  wall:           {:.3} ms", wall.as_secs_f64() * 1000.0);
    println!("  per tick:       {per_tick_ns:.1} ns");
    println!("  updater fixed:  {self_reported_ms:.3} ms (self-reported)");
    println!(
        "  routed/dropped: {}/{}",
        nm.router().dispatched(),
        nm.router().dropped()
    );
    println!("  lane 1 mark:    {:?}", nm.queue().current_note_index(1));
}
