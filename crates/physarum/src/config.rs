//! Runtime-tunable sensor parameters, refreshed from a `key=value` source.
//!
//! The source is read line by line. Two keys are recognised:
//!
//! ```text
//! angleChange=30   # sensor angular offset, degrees
//! sensorReach=6    # probe distance, grid units
//! ```
//!
//! Values are read from their leading numeric part, so `sensorReach=6.5`
//! sets 6 and `angleChange=30deg` sets 30. Keys absent from the source, and a
//! source that does not exist at all, leave the previous values in place. A
//! recognised key whose value has no leading number is skipped with a
//! warning by [`ConfigStore::reload`]; the strict [`ConfigStore::try_reload`]
//! turns it into an error instead.

use physarum_core::EngineError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default probe distance in grid units.
pub const DEFAULT_SENSOR_REACH: i32 = 6;
/// Default sensor angular offset in degrees.
pub const DEFAULT_ANGLE_CHANGE_DEG: f32 = 30.0;

const KEY_ANGLE_CHANGE: &str = "angleChange";
const KEY_SENSOR_REACH: &str = "sensorReach";

/// Where configuration text comes from.
///
/// `Ok(None)` means the source does not currently exist, which is not an
/// error: the store keeps its previous values.
pub trait ConfigSource: Send + Sync {
    fn read(&self) -> Result<Option<String>, EngineError>;
}

/// Reads configuration from a file on disk. A missing file is an absent source.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileSource {
    fn read(&self) -> Result<Option<String>, EngineError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(EngineError::Io(format!("{}: {e}", self.path.display()))),
        }
    }
}

/// Fixed in-memory configuration text. `None` behaves like a missing file.
#[derive(Debug, Clone, Default)]
pub struct StaticSource(pub Option<String>);

impl StaticSource {
    pub fn new(text: &str) -> Self {
        Self(Some(text.to_owned()))
    }

    /// A source that never exists.
    pub fn absent() -> Self {
        Self(None)
    }
}

impl ConfigSource for StaticSource {
    fn read(&self) -> Result<Option<String>, EngineError> {
        Ok(self.0.clone())
    }
}

/// The sensor settings agents read during one stepping phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorConfig {
    /// Probe distance in grid units.
    pub reach: i32,
    /// Angular offset of the left/right probes, radians.
    pub angle: f32,
}

/// A recognised key whose value failed to parse.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub key: &'static str,
    pub value: String,
    pub line: usize,
}

impl From<ConfigIssue> for EngineError {
    fn from(issue: ConfigIssue) -> Self {
        EngineError::MalformedConfig {
            key: issue.key.to_owned(),
            value: issue.value,
            line: issue.line,
        }
    }
}

/// What a reload did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReloadReport {
    /// `false` when the source did not exist (or could not be read).
    pub source_present: bool,
    /// Recognised keys that were applied, in source order.
    pub applied: Vec<&'static str>,
    /// Recognised keys whose value was rejected.
    pub rejected: Vec<ConfigIssue>,
}

#[derive(Debug, Clone, Copy)]
enum Update {
    AngleChange(f32),
    SensorReach(i32),
}

/// Optional sign followed by decimal digits, ignoring anything after them.
fn leading_i32(value: &str) -> Option<i32> {
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    let digits = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let end = value.len() - unsigned.len() + digits;
    value[..end].parse().ok()
}

/// Longest prefix that reads as a finite float.
fn leading_f32(value: &str) -> Option<f32> {
    (1..=value.len())
        .rev()
        .filter(|&end| value.is_char_boundary(end))
        .find_map(|end| value[..end].parse::<f32>().ok())
        .filter(|v| v.is_finite())
}

/// Parses every recognised line, collecting updates and issues in order.
fn parse(text: &str) -> (Vec<(&'static str, Update)>, Vec<ConfigIssue>) {
    let mut updates = Vec::new();
    let mut issues = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        let parsed = match key {
            KEY_ANGLE_CHANGE => {
                leading_f32(value).map(|v| (KEY_ANGLE_CHANGE, Update::AngleChange(v)))
            }
            KEY_SENSOR_REACH => {
                leading_i32(value).map(|v| (KEY_SENSOR_REACH, Update::SensorReach(v)))
            }
            _ => continue,
        };
        match parsed {
            Some(update) => updates.push(update),
            None => issues.push(ConfigIssue {
                key: if key == KEY_ANGLE_CHANGE {
                    KEY_ANGLE_CHANGE
                } else {
                    KEY_SENSOR_REACH
                },
                value: value.to_owned(),
                line: idx + 1,
            }),
        }
    }

    (updates, issues)
}

/// Holds the current sensor settings.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    sensor_reach: i32,
    angle_change_deg: f32,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(DEFAULT_SENSOR_REACH, DEFAULT_ANGLE_CHANGE_DEG)
    }
}

impl ConfigStore {
    pub fn new(sensor_reach: i32, angle_change_deg: f32) -> Self {
        Self {
            sensor_reach,
            angle_change_deg,
        }
    }

    pub fn sensor_reach(&self) -> i32 {
        self.sensor_reach
    }

    /// Sensor angular offset in degrees, as written in the source.
    pub fn angle_change_deg(&self) -> f32 {
        self.angle_change_deg
    }

    /// Sensor angular offset in radians.
    pub fn angle_change(&self) -> f32 {
        self.angle_change_deg.to_radians()
    }

    /// Copies the current settings for one stepping phase.
    pub fn snapshot(&self) -> SensorConfig {
        SensorConfig {
            reach: self.sensor_reach,
            angle: self.angle_change(),
        }
    }

    fn apply(&mut self, update: Update) {
        match update {
            Update::AngleChange(deg) => self.angle_change_deg = deg,
            Update::SensorReach(reach) => self.sensor_reach = reach,
        }
    }

    /// Re-reads `source`, applying every well-formed recognised key.
    ///
    /// Never fails: unreadable sources and malformed values are logged and
    /// leave the affected settings unchanged.
    pub fn reload(&mut self, source: &dyn ConfigSource) -> ReloadReport {
        let text = match source.read() {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!("config source absent, keeping current settings");
                return ReloadReport::default();
            }
            Err(e) => {
                warn!(error = %e, "config source unreadable, keeping current settings");
                return ReloadReport::default();
            }
        };

        let (updates, rejected) = parse(&text);
        for issue in &rejected {
            warn!(
                key = issue.key,
                value = %issue.value,
                line = issue.line,
                "ignoring malformed config value"
            );
        }
        let mut applied = Vec::with_capacity(updates.len());
        for (key, update) in updates {
            self.apply(update);
            applied.push(key);
        }
        debug!(
            sensor_reach = self.sensor_reach,
            angle_change_deg = self.angle_change_deg,
            "config reloaded"
        );

        ReloadReport {
            source_present: true,
            applied,
            rejected,
        }
    }

    /// Strict reload: the first malformed value aborts with
    /// `EngineError::MalformedConfig` and nothing is applied.
    ///
    /// Unlike [`ConfigStore::reload`], read failures other than a missing
    /// source are returned as errors.
    pub fn try_reload(&mut self, source: &dyn ConfigSource) -> Result<ReloadReport, EngineError> {
        let Some(text) = source.read()? else {
            return Ok(ReloadReport::default());
        };
        let (updates, mut rejected) = parse(&text);
        if !rejected.is_empty() {
            return Err(rejected.swap_remove(0).into());
        }
        let mut applied = Vec::with_capacity(updates.len());
        for (key, update) in updates {
            self.apply(update);
            applied.push(key);
        }
        Ok(ReloadReport {
            source_present: true,
            applied,
            rejected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn defaults_match_documented_values() {
        let store = ConfigStore::default();
        assert_eq!(store.sensor_reach(), 6);
        assert!((store.angle_change() - PI / 6.0).abs() < 1e-6);
    }

    #[test]
    fn reload_applies_recognised_keys() {
        let mut store = ConfigStore::default();
        let report = store.reload(&StaticSource::new("angleChange=45\nsensorReach=9\n"));
        assert_eq!(store.sensor_reach(), 9);
        assert!((store.angle_change() - PI / 4.0).abs() < 1e-6);
        assert!(report.source_present);
        assert_eq!(report.applied, vec!["angleChange", "sensorReach"]);
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn absent_source_keeps_previous_values() {
        let mut store = ConfigStore::new(11, 12.5);
        let report = store.reload(&StaticSource::absent());
        assert_eq!(store.sensor_reach(), 11);
        assert!((store.angle_change_deg() - 12.5).abs() < f32::EPSILON);
        assert!(!report.source_present);
    }

    #[test]
    fn absent_key_keeps_previous_value_across_reloads() {
        let mut store = ConfigStore::default();
        store.reload(&StaticSource::new("sensorReach=14"));
        store.reload(&StaticSource::new("angleChange=10"));
        assert_eq!(store.sensor_reach(), 14);
        assert!((store.angle_change_deg() - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn unrecognised_keys_comments_and_blank_lines_are_ignored() {
        let mut store = ConfigStore::default();
        let text = "# tuning\n\nspeed=3\nsensorReach = 8  # farther\nnot a pair\n";
        let report = store.reload(&StaticSource::new(text));
        assert_eq!(store.sensor_reach(), 8);
        assert_eq!(report.applied, vec!["sensorReach"]);
    }

    #[test]
    fn malformed_value_is_skipped_and_reported() {
        let mut store = ConfigStore::default();
        let report = store.reload(&StaticSource::new("sensorReach=six\nangleChange=20\n"));
        assert_eq!(store.sensor_reach(), DEFAULT_SENSOR_REACH);
        assert!((store.angle_change_deg() - 20.0).abs() < f32::EPSILON);
        assert_eq!(
            report.rejected,
            vec![ConfigIssue {
                key: "sensorReach",
                value: "six".into(),
                line: 1,
            }]
        );
    }

    #[test]
    fn values_are_read_from_their_leading_number() {
        let mut store = ConfigStore::default();
        let report = store.reload(&StaticSource::new("sensorReach=6.5\nangleChange=30deg\n"));
        assert!(report.rejected.is_empty());
        assert_eq!(store.sensor_reach(), 6);
        assert!((store.angle_change_deg() - 30.0).abs() < f32::EPSILON);

        store.reload(&StaticSource::new("sensorReach=-12px\nangleChange=2.5e1 degrees\n"));
        assert_eq!(store.sensor_reach(), -12);
        assert!((store.angle_change_deg() - 25.0).abs() < 1e-5);
    }

    #[test]
    fn values_without_a_leading_number_are_malformed() {
        let mut store = ConfigStore::new(7, 15.0);
        let text = "sensorReach=-\nsensorReach=99999999999\nangleChange=inf\nangleChange=deg30\n";
        let report = store.reload(&StaticSource::new(text));
        assert_eq!(report.rejected.len(), 4);
        assert_eq!(store.sensor_reach(), 7);
        assert!((store.angle_change_deg() - 15.0).abs() < f32::EPSILON);
    }

    #[test]
    fn later_lines_win() {
        let mut store = ConfigStore::default();
        store.reload(&StaticSource::new("sensorReach=3\nsensorReach=4\n"));
        assert_eq!(store.sensor_reach(), 4);
    }

    #[test]
    fn try_reload_fails_without_applying_anything() {
        let mut store = ConfigStore::default();
        let err = store
            .try_reload(&StaticSource::new("angleChange=50\nsensorReach=x\n"))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::MalformedConfig { ref key, line: 2, .. } if key == "sensorReach"
        ));
        assert!((store.angle_change_deg() - DEFAULT_ANGLE_CHANGE_DEG).abs() < f32::EPSILON);
    }

    #[test]
    fn try_reload_accepts_well_formed_source() {
        let mut store = ConfigStore::default();
        let report = store
            .try_reload(&StaticSource::new("sensorReach=2"))
            .unwrap();
        assert_eq!(store.sensor_reach(), 2);
        assert_eq!(report.applied, vec!["sensorReach"]);
    }

    #[test]
    fn file_source_reads_and_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.txt");
        let source = FileSource::new(&path);
        assert_eq!(source.read().unwrap(), None);

        std::fs::write(&path, "sensorReach=12\n").unwrap();
        let mut store = ConfigStore::default();
        store.reload(&source);
        assert_eq!(store.sensor_reach(), 12);

        std::fs::remove_file(&path).unwrap();
        store.reload(&source);
        assert_eq!(store.sensor_reach(), 12);
    }

    #[test]
    fn snapshot_converts_degrees_to_radians() {
        let store = ConfigStore::new(5, 90.0);
        let snap = store.snapshot();
        assert_eq!(snap.reach, 5);
        assert!((snap.angle - PI / 2.0).abs() < 1e-6);
    }
}
