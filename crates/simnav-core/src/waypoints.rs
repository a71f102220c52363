//! Ordered mission waypoints plus loop/dwell settings.
//!
//! The store round-trips through a small JSON document:
//!
//! ```json
//! { "version": 1, "loop": true, "dwellSeconds": 2.0,
//!   "points": [{ "x": 0, "y": 0, "z": 0 }] }
//! ```
//!
//! A bare array of points is also accepted when loading.

use crate::error::DocumentError;
use crate::models::Point3;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Highest document version this store understands.
pub const DOCUMENT_VERSION: u32 = 1;

pub const DEFAULT_DWELL_SECONDS: f64 = 2.0;

/// A stored waypoint; identity is its position in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub index: usize,
    pub position: Point3,
}

/// Mission-level settings read by the waypoint follower each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MissionSettings {
    pub loop_enabled: bool,
    pub dwell_seconds: f64,
}

impl Default for MissionSettings {
    fn default() -> Self {
        Self {
            loop_enabled: true,
            dwell_seconds: DEFAULT_DWELL_SECONDS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPoint {
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    z: Option<f64>,
}

impl RawPoint {
    fn into_point(self) -> Point3 {
        Point3::new(
            self.x.unwrap_or(0.0),
            self.y.unwrap_or(0.0),
            self.z.unwrap_or(0.0),
        )
    }
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    version: Option<u32>,
    #[serde(default, rename = "loop")]
    loop_enabled: Option<bool>,
    #[serde(default, rename = "dwellSeconds")]
    dwell_seconds: Option<f64>,
    points: Vec<RawPoint>,
}

#[derive(Serialize)]
struct DocumentOut<'a> {
    version: u32,
    #[serde(rename = "loop")]
    loop_enabled: bool,
    #[serde(rename = "dwellSeconds")]
    dwell_seconds: f64,
    points: &'a [Point3],
}

/// Parsed document, not yet applied to a store.
struct Parsed {
    points: Vec<Point3>,
    settings: MissionSettings,
}

#[derive(Debug, Clone, Default)]
pub struct WaypointStore {
    points: Vec<Point3>,
    settings: MissionSettings,
}

impl WaypointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a waypoint and return its index.
    pub fn add(&mut self, point: Point3) -> usize {
        self.points.push(point);
        self.points.len() - 1
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Waypoint> {
        self.points.get(index).map(|position| Waypoint {
            index,
            position: *position,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Waypoint> + '_ {
        self.points
            .iter()
            .enumerate()
            .map(|(index, position)| Waypoint {
                index,
                position: *position,
            })
    }

    pub fn positions(&self) -> &[Point3] {
        &self.points
    }

    pub fn settings(&self) -> MissionSettings {
        self.settings
    }

    pub fn set_loop(&mut self, enabled: bool) {
        self.settings.loop_enabled = enabled;
    }

    /// Set the per-waypoint dwell. Negative or non-finite values are refused.
    pub fn set_dwell_seconds(&mut self, seconds: f64) -> Result<(), DocumentError> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(DocumentError::InvalidDwell(seconds));
        }
        self.settings.dwell_seconds = seconds;
        Ok(())
    }

    /// Pretty-printed versioned document.
    pub fn serialize(&self) -> Result<String, DocumentError> {
        let doc = DocumentOut {
            version: DOCUMENT_VERSION,
            loop_enabled: self.settings.loop_enabled,
            dwell_seconds: self.settings.dwell_seconds,
            points: &self.points,
        };
        serde_json::to_string_pretty(&doc).map_err(DocumentError::Encode)
    }

    /// Replace the store contents from a document and return the new count.
    ///
    /// Nothing changes unless the whole document is valid.
    pub fn deserialize(&mut self, text: &str) -> Result<usize, DocumentError> {
        let parsed = match self.parse(text) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(error = %err, "rejected waypoint document");
                return Err(err);
            }
        };

        self.points = parsed.points;
        self.settings = parsed.settings;
        tracing::debug!(
            waypoints = self.points.len(),
            loop_enabled = self.settings.loop_enabled,
            dwell_seconds = self.settings.dwell_seconds,
            "loaded waypoint document"
        );
        Ok(self.points.len())
    }

    fn parse(&self, text: &str) -> Result<Parsed, DocumentError> {
        let value: Value = serde_json::from_str(text).map_err(DocumentError::Parse)?;

        match value {
            Value::Array(_) => {
                let raw: Vec<RawPoint> = serde_json::from_value(value)
                    .map_err(|err| DocumentError::Shape(format!("bad point list: {err}")))?;
                Ok(Parsed {
                    points: raw.into_iter().map(RawPoint::into_point).collect(),
                    settings: MissionSettings {
                        loop_enabled: false,
                        dwell_seconds: self.settings.dwell_seconds,
                    },
                })
            }
            Value::Object(_) => {
                let raw: RawDocument = serde_json::from_value(value)
                    .map_err(|err| DocumentError::Shape(err.to_string()))?;

                if let Some(found) = raw.version {
                    if found > DOCUMENT_VERSION {
                        return Err(DocumentError::UnsupportedVersion {
                            found,
                            supported: DOCUMENT_VERSION,
                        });
                    }
                }

                let dwell_seconds = match raw.dwell_seconds {
                    Some(d) if d < 0.0 => return Err(DocumentError::InvalidDwell(d)),
                    Some(d) if d.is_finite() && d > 0.0 => d,
                    _ => self.settings.dwell_seconds,
                };

                Ok(Parsed {
                    points: raw.points.into_iter().map(RawPoint::into_point).collect(),
                    settings: MissionSettings {
                        loop_enabled: raw.loop_enabled.unwrap_or(false),
                        dwell_seconds,
                    },
                })
            }
            other => Err(DocumentError::Shape(format!(
                "expected an object or array, found {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize, DocumentError> {
        let text = std::fs::read_to_string(path)?;
        self.deserialize(&text)
    }

    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let text = self.serialize()?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(points: &[Point3]) -> WaypointStore {
        let mut store = WaypointStore::new();
        for p in points {
            store.add(*p);
        }
        store
    }

    #[test]
    fn defaults_loop_with_two_second_dwell() {
        let store = WaypointStore::new();
        assert!(store.is_empty());
        assert_eq!(store.settings(), MissionSettings::default());
        assert!(store.settings().loop_enabled);
        assert_eq!(store.settings().dwell_seconds, 2.0);
    }

    #[test]
    fn add_returns_index_and_iter_reports_it() {
        let mut store = WaypointStore::new();
        assert_eq!(store.add(Point3::new(1.0, 0.0, 0.0)), 0);
        assert_eq!(store.add(Point3::new(2.0, 0.0, 0.0)), 1);
        let indices: Vec<usize> = store.iter().map(|wp| wp.index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(store.get(1).map(|wp| wp.position.x), Some(2.0));
        assert!(store.get(2).is_none());
    }

    #[test]
    fn versioned_document_loads_points_and_settings() {
        let mut store = WaypointStore::new();
        let count = store
            .deserialize(
                r#"{"loop":true,"dwellSeconds":3,"points":[{"x":0,"y":0,"z":0},{"x":1,"y":0,"z":0}]}"#,
            )
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(store.len(), 2);
        assert!(store.settings().loop_enabled);
        assert_eq!(store.settings().dwell_seconds, 3.0);
    }

    #[test]
    fn malformed_document_leaves_store_untouched() {
        let mut store = store_with(&[Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0)]);
        store.set_loop(false);

        let err = store.deserialize("{not valid").unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
        assert_eq!(store.len(), 2);
        assert_eq!(store.positions()[1], Point3::new(4.0, 5.0, 6.0));
        assert!(!store.settings().loop_enabled);
    }

    #[test]
    fn wrong_shapes_are_rejected_without_clearing() {
        let mut store = store_with(&[Point3::ZERO]);
        for text in [r#"42"#, r#""points""#, r#"{"loop":true}"#, r#"[{"x":"a"}]"#] {
            let err = store.deserialize(text).unwrap_err();
            assert!(matches!(err, DocumentError::Shape(_)), "{text}: {err}");
            assert_eq!(store.len(), 1);
        }
    }

    #[test]
    fn bare_array_disables_loop_and_keeps_dwell() {
        let mut store = WaypointStore::new();
        store.set_dwell_seconds(5.0).unwrap();
        store
            .deserialize(r#"[{"x":1,"y":2,"z":3},{"x":4,"z":6},{"y":null}]"#)
            .unwrap();
        assert_eq!(store.len(), 3);
        assert!(!store.settings().loop_enabled);
        assert_eq!(store.settings().dwell_seconds, 5.0);
        assert_eq!(store.positions()[1], Point3::new(4.0, 0.0, 6.0));
        assert_eq!(store.positions()[2], Point3::ZERO);
    }

    #[test]
    fn missing_or_zero_dwell_keeps_current() {
        let mut store = WaypointStore::new();
        store.set_dwell_seconds(4.0).unwrap();
        store.deserialize(r#"{"points":[]}"#).unwrap();
        assert_eq!(store.settings().dwell_seconds, 4.0);
        assert!(!store.settings().loop_enabled);

        store
            .deserialize(r#"{"loop":true,"dwellSeconds":0,"points":[]}"#)
            .unwrap();
        assert_eq!(store.settings().dwell_seconds, 4.0);
    }

    #[test]
    fn negative_dwell_and_future_version_are_errors() {
        let mut store = store_with(&[Point3::ZERO]);
        let err = store
            .deserialize(r#"{"dwellSeconds":-1,"points":[]}"#)
            .unwrap_err();
        assert!(matches!(err, DocumentError::InvalidDwell(_)));

        let err = store
            .deserialize(r#"{"version":2,"points":[]}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            DocumentError::UnsupportedVersion {
                found: 2,
                supported: 1
            }
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn serialized_document_loads_back() {
        let mut store = store_with(&[Point3::new(0.5, 1.0, -2.0), Point3::new(3.0, 1.0, 4.0)]);
        store.set_loop(false);
        store.set_dwell_seconds(1.5).unwrap();

        let text = store.serialize().unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["dwellSeconds"], 1.5);

        let mut other = WaypointStore::new();
        other.deserialize(&text).unwrap();
        assert_eq!(other.positions(), store.positions());
        assert_eq!(other.settings(), store.settings());
    }

    #[test]
    fn set_dwell_rejects_negative() {
        let mut store = WaypointStore::new();
        assert!(store.set_dwell_seconds(-0.5).is_err());
        assert!(store.set_dwell_seconds(f64::NAN).is_err());
        assert_eq!(store.settings().dwell_seconds, DEFAULT_DWELL_SECONDS);
    }

    #[test]
    fn file_round_trip() {
        let path = std::env::temp_dir().join(format!("simnav-waypoints-{}.json", std::process::id()));
        let store = store_with(&[Point3::new(1.0, 0.8, 1.0)]);
        store.save_file(&path).unwrap();

        let mut loaded = WaypointStore::new();
        assert_eq!(loaded.load_file(&path).unwrap(), 1);
        std::fs::remove_file(&path).ok();

        let missing = loaded.load_file(path.with_extension("missing"));
        assert!(matches!(missing, Err(DocumentError::Io(_))));
    }
}
