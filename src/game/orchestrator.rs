use log::info;
use serde::Serialize;

use crate::game::updater::{NoteUpdater, TickContext, UPDATER_COUNT};

/// Sum of the updaters' self-reported cost for the most recent run of each phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PhaseTimings {
    pub update_ms: f64,
    pub fixed_update_ms: f64,
    pub late_update_ms: f64,
}

/// Runs the updater bank through the variable, fixed and late phases.
pub struct TickOrchestrator {
    updaters: [Box<dyn NoteUpdater>; UPDATER_COUNT],
    is_updater_initialized: bool,
    diagnostics: bool,
    timings: PhaseTimings,
}

impl TickOrchestrator {
    pub fn new(updaters: [Box<dyn NoteUpdater>; UPDATER_COUNT]) -> Self {
        Self {
            updaters,
            is_updater_initialized: false,
            diagnostics: cfg!(debug_assertions),
            timings: PhaseTimings::default(),
        }
    }

    #[must_use]
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.set_diagnostics(enabled);
        self
    }

    pub fn set_diagnostics(&mut self, enabled: bool) {
        self.diagnostics = enabled;
        if !enabled {
            self.timings = PhaseTimings::default();
        }
    }

    #[inline(always)]
    pub const fn is_initialized(&self) -> bool {
        self.is_updater_initialized
    }

    #[inline(always)]
    pub const fn diagnostics(&self) -> bool {
        self.diagnostics
    }

    #[inline(always)]
    pub const fn timings(&self) -> PhaseTimings {
        self.timings
    }

    /// Initializes every updater once. Later calls do nothing.
    pub fn initialize(&mut self) {
        if self.is_updater_initialized {
            return;
        }
        for updater in &mut self.updaters {
            updater.initialize();
        }
        self.is_updater_initialized = true;
        info!("Initialized {UPDATER_COUNT} note updaters.");
    }

    pub fn update(&mut self, ctx: &mut TickContext<'_>) {
        if !self.is_updater_initialized {
            return;
        }
        for updater in &mut self.updaters {
            updater.on_update(ctx);
        }
        if self.diagnostics {
            self.timings.update_ms = self.updaters.iter().map(|u| u.update_elapsed_ms()).sum();
        }
    }

    /// Clears the usage flags, then runs the fixed phase if initialized.
    pub fn fixed_update(&mut self, ctx: &mut TickContext<'_>) {
        ctx.usage.reset_all();
        if self.is_updater_initialized {
            for updater in &mut self.updaters {
                updater.on_fixed_update(ctx);
            }
        }
        if self.diagnostics {
            self.timings.fixed_update_ms = self
                .updaters
                .iter()
                .map(|u| u.fixed_update_elapsed_ms())
                .sum();
        }
    }

    pub fn late_update(&mut self, ctx: &mut TickContext<'_>) {
        if !self.is_updater_initialized {
            return;
        }
        for updater in &mut self.updaters {
            updater.on_late_update(ctx);
        }
        if self.diagnostics {
            self.timings.late_update_ms = self
                .updaters
                .iter()
                .map(|u| u.late_update_elapsed_ms())
                .sum();
        }
    }
}
