use crate::game::judge_queue::NoteJudgeQueue;
use crate::game::usage::UsageFlagBank;

pub const UPDATER_COUNT: usize = 8;

/// Shared state an updater may touch while one of its phases runs.
pub struct TickContext<'a> {
    pub queue: &'a mut NoteJudgeQueue,
    pub usage: &'a mut UsageFlagBank,
    /// Timeline position of this phase, in milliseconds.
    pub music_time_ms: f64,
}

/// One lane's worth of note state, driven through the three frame phases.
///
/// The orchestrator never looks inside an updater; it only calls these in
/// a fixed order and reads the self-reported costs for diagnostics.
pub trait NoteUpdater {
    fn initialize(&mut self);
    fn on_update(&mut self, ctx: &mut TickContext<'_>);
    fn on_fixed_update(&mut self, ctx: &mut TickContext<'_>);
    fn on_late_update(&mut self, ctx: &mut TickContext<'_>);

    fn update_elapsed_ms(&self) -> f64 {
        0.0
    }

    fn fixed_update_elapsed_ms(&self) -> f64 {
        0.0
    }

    fn late_update_elapsed_ms(&self) -> f64 {
        0.0
    }
}

/// An updater with no notes. Fills unused lanes.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdleUpdater;

impl NoteUpdater for IdleUpdater {
    fn initialize(&mut self) {}
    fn on_update(&mut self, _ctx: &mut TickContext<'_>) {}
    fn on_fixed_update(&mut self, _ctx: &mut TickContext<'_>) {}
    fn on_late_update(&mut self, _ctx: &mut TickContext<'_>) {}
}
