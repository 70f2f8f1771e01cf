use ini::Ini;
use log::{LevelFilter, info, warn};
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

const CONFIG_PATH: &str = "notejudge.ini";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warn => "Warn",
            Self::Info => "Info",
            Self::Debug => "Debug",
            Self::Trace => "Trace",
        }
    }

    pub const fn as_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub log_level: LogLevel,
    /// Fixed (judgment) steps per second.
    pub fixed_step_hz: u32,
    /// Rendered frames per second of the headless session.
    pub target_fps: u32,
    /// Cap on fixed steps run in a single frame; extra backlog is dropped.
    pub max_steps_per_frame: u32,
    /// Simulated length of the headless session.
    pub session_seconds: f32,
    /// Half-width of the tap hit window.
    pub judge_window_ms: f32,
    /// Autoplay presses land this far from the note (negative = early).
    pub autoplay_offset_ms: f32,
    // Sum per-phase updater costs each tick. Defaults to on in debug builds.
    pub phase_timings: bool,
    pub dump_timings_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            fixed_step_hz: 120,
            target_fps: 60,
            max_steps_per_frame: 5,
            session_seconds: 30.0,
            judge_window_ms: 150.0,
            autoplay_offset_ms: 0.0,
            phase_timings: cfg!(debug_assertions),
            dump_timings_json: false,
        }
    }
}

// Global, mutable configuration instance.
static CONFIG: std::sync::LazyLock<Mutex<Config>> =
    std::sync::LazyLock::new(|| Mutex::new(Config::default()));

// --- File I/O ---

#[inline(always)]
const fn bool_str(v: bool) -> &'static str {
    if v { "1" } else { "0" }
}

fn parse_bool(v: &str) -> Option<bool> {
    let v = v.trim();
    if v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes") || v.eq_ignore_ascii_case("on") {
        Some(true)
    } else if v.eq_ignore_ascii_case("false") || v.eq_ignore_ascii_case("no") || v.eq_ignore_ascii_case("off") {
        Some(false)
    } else {
        v.parse::<u8>().ok().map(|n| n != 0)
    }
}

fn default_ini() -> Ini {
    let default = Config::default();
    let mut conf = Ini::new();
    conf.with_section(Some("Options"))
        .set("LogLevel", default.log_level.as_str())
        .set("FixedStepHz", default.fixed_step_hz.to_string())
        .set("TargetFps", default.target_fps.to_string())
        .set("MaxStepsPerFrame", default.max_steps_per_frame.to_string())
        .set("SessionSeconds", default.session_seconds.to_string())
        .set("JudgeWindowMs", default.judge_window_ms.to_string())
        .set("AutoplayOffsetMs", default.autoplay_offset_ms.to_string());
    conf.with_section(Some("Diagnostics"))
        .set("PhaseTimings", bool_str(default.phase_timings))
        .set("DumpTimingsJson", bool_str(default.dump_timings_json));
    conf
}

fn create_default_config_file() -> Result<(), std::io::Error> {
    info!("'{CONFIG_PATH}' not found, creating with default values.");
    default_ini().write_to_file(CONFIG_PATH)
}

/// Builds a config from parsed INI data, using defaults for missing or bad keys.
pub fn from_ini(conf: &Ini) -> Config {
    let default = Config::default();
    let get = |section: &str, key: &str| conf.get_from(Some(section), key);

    let positive_u32 = |key: &str, fallback: u32| {
        get("Options", key)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(fallback)
    };
    let finite_f32 = |key: &str, fallback: f32| {
        get("Options", key)
            .and_then(|v| v.trim().parse::<f32>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(fallback)
    };

    let log_level = match get("Options", "LogLevel") {
        Some(v) => LogLevel::from_str(v).unwrap_or_else(|()| {
            warn!("Unknown LogLevel '{v}', using {}.", default.log_level.as_str());
            default.log_level
        }),
        None => default.log_level,
    };

    Config {
        log_level,
        fixed_step_hz: positive_u32("FixedStepHz", default.fixed_step_hz),
        target_fps: positive_u32("TargetFps", default.target_fps),
        max_steps_per_frame: positive_u32("MaxStepsPerFrame", default.max_steps_per_frame),
        session_seconds: finite_f32("SessionSeconds", default.session_seconds).max(0.0),
        judge_window_ms: finite_f32("JudgeWindowMs", default.judge_window_ms).max(0.0),
        autoplay_offset_ms: finite_f32("AutoplayOffsetMs", default.autoplay_offset_ms),
        phase_timings: get("Diagnostics", "PhaseTimings")
            .and_then(parse_bool)
            .unwrap_or(default.phase_timings),
        dump_timings_json: get("Diagnostics", "DumpTimingsJson")
            .and_then(parse_bool)
            .unwrap_or(default.dump_timings_json),
    }
}

pub fn load() {
    if !Path::new(CONFIG_PATH).exists()
        && let Err(e) = create_default_config_file()
    {
        warn!("Failed to create default config file: {e}");
    }

    match Ini::load_from_file(CONFIG_PATH) {
        Ok(conf) => {
            *CONFIG.lock().unwrap() = from_ini(&conf);
            info!("Configuration loaded from '{CONFIG_PATH}'.");
        }
        Err(e) => {
            warn!("Failed to load '{CONFIG_PATH}': {e}. Using default values.");
        }
    }
}

pub fn get() -> Config {
    *CONFIG.lock().unwrap()
}

#[cfg(test)]
mod tests {
    use super::{Config, LogLevel, default_ini, from_ini, parse_bool};
    use ini::Ini;

    #[test]
    fn default_file_round_trips_to_defaults() {
        let conf = default_ini();
        assert_eq!(from_ini(&conf), Config::default());
    }

    #[test]
    fn bad_values_fall_back_per_key() {
        let conf = Ini::load_from_str(
            "[Options]\nLogLevel=loud\nFixedStepHz=0\nTargetFps=144\nJudgeWindowMs=NaN\n\
             [Diagnostics]\nPhaseTimings=yes\nDumpTimingsJson=maybe\n",
        )
        .expect("ini text should parse");
        let cfg = from_ini(&conf);
        let default = Config::default();
        assert_eq!(cfg.log_level, default.log_level);
        assert_eq!(cfg.fixed_step_hz, default.fixed_step_hz);
        assert_eq!(cfg.target_fps, 144);
        assert!((cfg.judge_window_ms - default.judge_window_ms).abs() < f32::EPSILON);
        assert!(cfg.phase_timings);
        assert_eq!(cfg.dump_timings_json, default.dump_timings_json);
    }

    #[test]
    fn log_level_parsing_is_case_insensitive() {
        assert_eq!(" DEBUG ".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn bool_values_accept_words_and_numbers() {
        assert_eq!(parse_bool("On"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("2"), Some(true));
        assert_eq!(parse_bool("sometimes"), None);
    }
}
