use notejudge::{app, config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install logger immediately, then set runtime max level from config after loading it.
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .try_init();
    // Startup default when config is missing or malformed.
    log::set_max_level(log::LevelFilter::Warn);

    config::load();
    let cfg = config::get();
    log::set_max_level(cfg.log_level.as_level_filter());
    log::info!(
        "notejudge {} on {}/{} ({} threads available)",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH,
        std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
    );

    let summary = app::run(&cfg)?;
    if cfg.dump_timings_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}
