//! Robot configuration – reads/writes `~/.romi/config.toml`.
//!
//! ```toml
//! cycle_period_ms = 20
//! goal_timeout_cycles = 500
//!
//! [drive]
//! wheel_diameter_inch = 2.75
//!
//! [vision]
//! camera_name = "photonvision"
//!
//! [[autonomous]]
//! goal = "drive_distance"
//! speed = 0.5
//! inches = 10.0
//!
//! [[autonomous]]
//! goal = "turn_degrees"
//! speed = 0.5
//! degrees = 90.0
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use romi_runtime::MotionGoal;
use romi_subsystems::{DriveConfig, VisionConfig};
use romi_types::RomiError;
use serde::{Deserialize, Serialize};

/// One step of the scripted autonomous routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "goal", rename_all = "snake_case")]
pub enum AutonomousStep {
    DriveDistance { speed: f64, inches: f64 },
    TurnDegrees { speed: f64, degrees: f64 },
}

impl AutonomousStep {
    pub fn to_goal(&self) -> MotionGoal {
        match *self {
            AutonomousStep::DriveDistance { speed, inches } => {
                MotionGoal::drive_distance(speed, inches)
            }
            AutonomousStep::TurnDegrees { speed, degrees } => {
                MotionGoal::turn_degrees(speed, degrees)
            }
        }
    }
}

impl std::fmt::Display for AutonomousStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AutonomousStep::DriveDistance { speed, inches } => {
                write!(f, "drive {inches} in @ {speed}")
            }
            AutonomousStep::TurnDegrees { speed, degrees } => {
                write!(f, "turn {degrees}° @ {speed}")
            }
        }
    }
}

/// Persisted robot configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Control loop period.
    #[serde(default = "default_cycle_period_ms")]
    pub cycle_period_ms: u64,

    /// Cycle budget for each autonomous step.  `0` means unbounded.
    #[serde(default = "default_goal_timeout_cycles")]
    pub goal_timeout_cycles: u32,

    #[serde(default)]
    pub drive: DriveConfig,

    #[serde(default)]
    pub vision: VisionConfig,

    #[serde(default = "default_autonomous")]
    pub autonomous: Vec<AutonomousStep>,
}

fn default_cycle_period_ms() -> u64 {
    20
}
fn default_goal_timeout_cycles() -> u32 {
    500
}
fn default_autonomous() -> Vec<AutonomousStep> {
    vec![
        AutonomousStep::DriveDistance {
            speed: 0.5,
            inches: 10.0,
        },
        AutonomousStep::TurnDegrees {
            speed: 0.5,
            degrees: 90.0,
        },
    ]
}

impl Config {
    /// Per-goal cycle budget for the scheduler, `None` when unbounded.
    pub fn goal_budget(&self) -> Option<u32> {
        (self.goal_timeout_cycles > 0).then_some(self.goal_timeout_cycles)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cycle_period_ms: default_cycle_period_ms(),
            goal_timeout_cycles: default_goal_timeout_cycles(),
            drive: DriveConfig::default(),
            vision: VisionConfig::default(),
            autonomous: default_autonomous(),
        }
    }
}

/// `$ROMI_CONFIG` if set, otherwise `~/.romi/config.toml`.
pub fn config_path() -> PathBuf {
    if let Ok(p) = std::env::var("ROMI_CONFIG") {
        return PathBuf::from(p);
    }
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".romi").join("config.toml")
}

/// Load the config from disk.  `Ok(None)` when the file does not exist.
pub fn load() -> Result<Option<Config>, RomiError> {
    load_from(&config_path())
}

pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, RomiError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        RomiError::Config(format!("failed to read {}: {e}", path.display()))
    })?;
    let mut cfg: Config = toml::from_str(&raw)
        .map_err(|e| RomiError::Config(format!("failed to parse {}: {e}", path.display())))?;
    apply_env_overrides(&mut cfg);
    cfg.drive.validate()?;
    Ok(Some(cfg))
}

/// The loaded config, or the defaults with `ROMI_*` overrides applied when
/// the file is missing or could not be loaded.
pub fn or_defaults(loaded: Result<Option<Config>, RomiError>) -> Config {
    or_defaults_with(loaded, |key| std::env::var(key).ok())
}

fn or_defaults_with(
    loaded: Result<Option<Config>, RomiError>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Config {
    match loaded {
        Ok(Some(cfg)) => cfg,
        Ok(None) | Err(_) => {
            let mut cfg = Config::default();
            apply_overrides(&mut cfg, lookup);
            cfg
        }
    }
}

/// Apply `ROMI_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `ROMI_CYCLE_PERIOD_MS` | `cycle_period_ms` |
/// | `ROMI_WHEEL_DIAMETER_INCH` | `drive.wheel_diameter_inch` |
/// | `ROMI_CAMERA_NAME` | `vision.camera_name` |
/// | `ROMI_AMBIGUITY_THRESHOLD` | `vision.ambiguity_threshold` |
///
/// Values that fail to parse, and drive geometry that is not finite and
/// positive, are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    apply_overrides(cfg, |key| std::env::var(key).ok());
}

fn apply_overrides(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(ms) = lookup("ROMI_CYCLE_PERIOD_MS").and_then(|v| v.parse::<u64>().ok())
        && ms > 0
    {
        cfg.cycle_period_ms = ms;
    }
    if let Some(d) = lookup("ROMI_WHEEL_DIAMETER_INCH").and_then(|v| v.parse::<f64>().ok()) {
        let candidate = DriveConfig {
            wheel_diameter_inch: d,
            ..cfg.drive.clone()
        };
        if candidate.validate().is_ok() {
            cfg.drive = candidate;
        }
    }
    if let Some(name) = lookup("ROMI_CAMERA_NAME") {
        cfg.vision.camera_name = name;
    }
    if let Some(t) = lookup("ROMI_AMBIGUITY_THRESHOLD").and_then(|v| v.parse::<f64>().ok()) {
        cfg.vision.ambiguity_threshold = t;
    }
}

/// Save the config to disk, creating `~/.romi/` if necessary.
pub fn save(cfg: &Config) -> Result<(), RomiError> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), RomiError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            RomiError::Config(format!("failed to create {}: {e}", parent.display()))
        })?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| RomiError::Serialization(e.to_string()))?;
    fs::write(path, raw)
        .map_err(|e| RomiError::Config(format!("failed to write {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = Config::default();
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.drive, DriveConfig::default());
        assert_eq!(loaded.vision.camera_name, "photonvision");
        assert_eq!(loaded.autonomous, default_autonomous());
    }

    #[test]
    fn config_path_points_to_romi_dir() {
        let p = config_path_for_home("/home/operator");
        assert!(p.to_string_lossy().contains(".romi"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
cycle_period_ms = 50

[drive]
drive_inverted = false

[[autonomous]]
goal = "turn_degrees"
speed = 0.4
degrees = -45.0
"#,
        )
        .expect("write");

        let cfg = load_from(&path).expect("load ok").expect("some");
        assert_eq!(cfg.cycle_period_ms, 50);
        assert!(!cfg.drive.drive_inverted);
        assert_eq!(cfg.drive.wheel_diameter_inch, 2.75);
        assert_eq!(cfg.vision, VisionConfig::default());
        assert_eq!(cfg.goal_timeout_cycles, 500);
        assert_eq!(cfg.goal_budget(), Some(500));
        assert_eq!(
            cfg.autonomous,
            vec![AutonomousStep::TurnDegrees {
                speed: 0.4,
                degrees: -45.0
            }]
        );
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "cycle_period_ms = \"fast\"").expect("write");
        assert!(matches!(load_from(&path), Err(RomiError::Config(_))));
    }

    #[test]
    fn unbounded_timeout_survives_roundtrip() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        let cfg = Config {
            goal_timeout_cycles: 0,
            ..Config::default()
        };
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.goal_timeout_cycles, 0);
        assert_eq!(loaded.goal_budget(), None);
    }

    #[test]
    fn degenerate_drive_geometry_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[drive]\ncounts_per_revolution = 0.0\n").expect("write");
        assert!(matches!(load_from(&path), Err(RomiError::Config(_))));
    }

    #[test]
    fn unknown_goal_is_rejected() {
        let raw = r#"
[[autonomous]]
goal = "strafe"
speed = 1.0
"#;
        assert!(toml::from_str::<Config>(raw).is_err());
    }

    #[test]
    fn overrides_replace_fields() {
        let mut cfg = Config::default();
        apply_overrides(
            &mut cfg,
            env(&[
                ("ROMI_CYCLE_PERIOD_MS", "10"),
                ("ROMI_WHEEL_DIAMETER_INCH", "3.0"),
                ("ROMI_CAMERA_NAME", "front"),
                ("ROMI_AMBIGUITY_THRESHOLD", "0.1"),
            ]),
        );
        assert_eq!(cfg.cycle_period_ms, 10);
        assert_eq!(cfg.drive.wheel_diameter_inch, 3.0);
        assert_eq!(cfg.vision.camera_name, "front");
        assert_eq!(cfg.vision.ambiguity_threshold, 0.1);
    }

    #[test]
    fn overrides_ignore_unparseable_values() {
        let mut cfg = Config::default();
        apply_overrides(
            &mut cfg,
            env(&[
                ("ROMI_CYCLE_PERIOD_MS", "soon"),
                ("ROMI_WHEEL_DIAMETER_INCH", "big"),
            ]),
        );
        assert_eq!(cfg.cycle_period_ms, 20);
        assert_eq!(cfg.drive.wheel_diameter_inch, 2.75);
    }

    #[test]
    fn degenerate_wheel_diameter_override_is_ignored() {
        for bad in ["0", "-1.5", "NaN", "inf"] {
            let mut cfg = Config::default();
            apply_overrides(&mut cfg, env(&[("ROMI_WHEEL_DIAMETER_INCH", bad)]));
            assert_eq!(cfg.drive.wheel_diameter_inch, 2.75, "override {bad} accepted");
        }
    }

    #[test]
    fn zero_cycle_period_override_is_ignored() {
        let mut cfg = Config::default();
        apply_overrides(&mut cfg, env(&[("ROMI_CYCLE_PERIOD_MS", "0")]));
        assert_eq!(cfg.cycle_period_ms, 20);
    }

    #[test]
    fn defaults_keep_overrides_when_file_is_missing_or_broken() {
        let overrides = [("ROMI_CAMERA_NAME", "rear"), ("ROMI_CYCLE_PERIOD_MS", "40")];

        let missing = or_defaults_with(Ok(None), env(&overrides));
        let broken = or_defaults_with(
            Err(RomiError::Config("failed to parse".to_string())),
            env(&overrides),
        );
        for cfg in [missing, broken] {
            assert_eq!(cfg.vision.camera_name, "rear");
            assert_eq!(cfg.cycle_period_ms, 40);
        }
    }

    #[test]
    fn loaded_config_is_used_as_is() {
        let loaded = Config {
            cycle_period_ms: 15,
            ..Config::default()
        };
        let cfg = or_defaults_with(Ok(Some(loaded.clone())), env(&[("ROMI_CYCLE_PERIOD_MS", "40")]));
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn steps_become_motion_goals() {
        let goals: Vec<String> = default_autonomous()
            .iter()
            .map(|s| format!("{:?}", s.to_goal()))
            .collect();
        assert_eq!(
            goals,
            [
                "DriveDistance { speed: 0.5, inches: 10.0 }",
                "TurnDegrees { speed: 0.5, degrees: 90.0 }",
            ]
        );
    }
}
