pub mod judge_queue;
pub mod lane_updater;
pub mod note_manager;
pub mod orchestrator;
pub mod sensor;
pub mod updater;
pub mod usage;
