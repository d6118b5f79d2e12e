//! Dataset directory loader
//!
//! ```text
//! <root>/<case>/object_records/<id>/data.json
//! <root>/<case>/observation_records/<n>/data.json
//! ```
//!
//! Observation records are scanned by index from 1 up to a configured maximum.
//! Gaps are allowed. Unreadable or invalid records are logged and skipped.

use crate::core::{CaseData, GeodeticPoint, ObserverRecord, MAX_OBSERVATION_RECORDS};
use crate::processing::parser::{parse_object, parse_observation, IngestError};
use crate::utils::config::EngineConfig;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

const RECORD_FILE: &str = "data.json";
const OBJECT_DIR: &str = "object_records";
const OBSERVATION_DIR: &str = "observation_records";

/// Which object record provides the ground truth
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectSelector {
    Id(String),
    /// First `*/data.json` in sorted order
    Auto,
}

impl ObjectSelector {
    pub fn parse(value: &str) -> Self {
        if value == "auto" {
            ObjectSelector::Auto
        } else {
            ObjectSelector::Id(value.to_string())
        }
    }
}

/// Reads cases from a dataset root directory
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    root: PathBuf,
    object: ObjectSelector,
    max_observation_records: u32,
}

impl DatasetLoader {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            object: ObjectSelector::Id("1".to_string()),
            max_observation_records: MAX_OBSERVATION_RECORDS,
        }
    }

    pub fn from_config<P: AsRef<Path>>(root: P, config: &EngineConfig) -> Self {
        Self::new(root)
            .with_object(ObjectSelector::parse(&config.object_id))
            .with_max_observation_records(config.max_observation_records)
    }

    pub fn with_object(mut self, object: ObjectSelector) -> Self {
        self.object = object;
        self
    }

    pub fn with_max_observation_records(mut self, max: u32) -> Self {
        self.max_observation_records = max;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sorted names of the case directories under the root
    pub fn case_ids(&self) -> Result<Vec<String>, IngestError> {
        let entries = fs::read_dir(&self.root).map_err(|source| IngestError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| IngestError::Io {
                path: self.root.clone(),
                source,
            })?;
            if entry.path().is_dir() {
                ids.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        ids.sort();
        Ok(ids)
    }

    /// Load observers and ground truth of one case
    pub fn load_case(&self, case_id: &str) -> Result<CaseData, IngestError> {
        let case_path = self.root.join(case_id);
        if !case_path.is_dir() {
            return Err(IngestError::Io {
                path: case_path,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "case directory not found"),
            });
        }

        let truth = self.load_truth(&case_path);
        let observers = self.load_observers(&case_path);
        debug!(
            "case {}: {} observer records, ground truth {}",
            case_id,
            observers.len(),
            if truth.is_some() { "present" } else { "absent" }
        );

        Ok(CaseData {
            case_id: case_id.to_string(),
            observers,
            truth,
        })
    }

    /// Load every case under the root, skipping ones that fail to read
    pub fn load_all(&self) -> Result<Vec<CaseData>, IngestError> {
        let mut cases = Vec::new();
        for case_id in self.case_ids()? {
            match self.load_case(&case_id) {
                Ok(case) => cases.push(case),
                Err(e) => warn!("skipping case {}: {}", case_id, e),
            }
        }
        Ok(cases)
    }

    fn object_record_path(&self, case_path: &Path) -> Option<PathBuf> {
        let object_root = case_path.join(OBJECT_DIR);
        match &self.object {
            ObjectSelector::Id(id) => Some(object_root.join(id).join(RECORD_FILE)),
            ObjectSelector::Auto => {
                let mut candidates: Vec<PathBuf> = fs::read_dir(&object_root)
                    .ok()?
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.path().join(RECORD_FILE))
                    .filter(|path| path.is_file())
                    .collect();
                candidates.sort();
                candidates.into_iter().next()
            }
        }
    }

    fn load_truth(&self, case_path: &Path) -> Option<GeodeticPoint> {
        let path = self.object_record_path(case_path)?;
        if !path.is_file() {
            return None;
        }

        match read_record(&path).and_then(|json| parse_object(&json)) {
            Ok(truth) if truth.is_finite() && truth.in_range() => Some(truth),
            Ok(truth) => {
                warn!(
                    "ignoring object record {}: position ({}, {}) is not valid",
                    path.display(),
                    truth.lat,
                    truth.lon
                );
                None
            }
            Err(e) => {
                warn!("ignoring object record {}: {}", path.display(), e);
                None
            }
        }
    }

    fn load_observers(&self, case_path: &Path) -> Vec<ObserverRecord> {
        let observation_root = case_path.join(OBSERVATION_DIR);
        if !observation_root.is_dir() {
            return Vec::new();
        }

        let mut observers = Vec::new();
        for index in 1..=self.max_observation_records {
            let path = observation_root.join(index.to_string()).join(RECORD_FILE);
            if !path.is_file() {
                continue;
            }

            match read_record(&path).and_then(|json| parse_observation(index, &json)) {
                Ok(record) => observers.push(record),
                Err(e) => warn!("skipping observation record {}: {}", path.display(), e),
            }
        }
        observers
    }
}

fn read_record(path: &Path) -> Result<String, IngestError> {
    fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TempDataset {
        root: PathBuf,
    }

    impl TempDataset {
        fn new(name: &str) -> Self {
            let root = std::env::temp_dir().join(format!("triangulation-{}-{}", name, std::process::id()));
            let _ = fs::remove_dir_all(&root);
            fs::create_dir_all(&root).unwrap();
            Self { root }
        }

        fn write(&self, relative: &str, content: &str) {
            let path = self.root.join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
    }

    impl Drop for TempDataset {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.root);
        }
    }

    fn observation(lat: f64, lon: f64, yaw: f64) -> String {
        format!(
            r#"{{"gps": {{"latitude": {}, "longitude": {}}}, "gyro": {{"yaw_geo_north": {}}}}}"#,
            lat, lon, yaw
        )
    }

    #[test]
    fn test_case_ids_sorted() {
        let dataset = TempDataset::new("ids");
        dataset.write("b/observation_records/1/data.json", &observation(1.0, 1.0, 0.0));
        dataset.write("a/observation_records/1/data.json", &observation(1.0, 1.0, 0.0));
        dataset.write("notes.txt", "not a case");

        let ids = DatasetLoader::new(&dataset.root).case_ids().unwrap();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_load_case() {
        let dataset = TempDataset::new("case");
        dataset.write("c1/object_records/1/data.json", r#"{"gps": {"latitude": 25.0, "longitude": 55.0, "altitude": 40}}"#);
        dataset.write("c1/observation_records/1/data.json", &observation(25.001, 55.0, 180.0));
        dataset.write("c1/observation_records/3/data.json", &observation(25.0, 55.001, 270.0));
        // No GPS fix: not an observer
        dataset.write("c1/observation_records/4/data.json", r#"{"compass": {"heading": 12}}"#);
        dataset.write("c1/observation_records/5/data.json", "{broken");

        let case = DatasetLoader::new(&dataset.root).load_case("c1").unwrap();
        assert_eq!(case.case_id, "c1");
        assert_eq!(case.truth, Some(GeodeticPoint::with_height(25.0, 55.0, 40.0)));

        let ids: Vec<u32> = case.observers.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(case.observers[1].orientation.resolve_yaw(), Some(270.0));
    }

    #[test]
    fn test_object_selection() {
        let dataset = TempDataset::new("object");
        dataset.write("c/object_records/2/data.json", r#"{"latitude": 2.0, "longitude": 2.0}"#);
        dataset.write("c/object_records/10/data.json", r#"{"latitude": 10.0, "longitude": 10.0}"#);

        // Default id "1" is absent
        let case = DatasetLoader::new(&dataset.root).load_case("c").unwrap();
        assert_eq!(case.truth, None);
        assert!(case.observers.is_empty());

        let case = DatasetLoader::new(&dataset.root)
            .with_object(ObjectSelector::Id("2".to_string()))
            .load_case("c")
            .unwrap();
        assert_eq!(case.truth, Some(GeodeticPoint::new(2.0, 2.0)));

        // Sorted by path, so "10" comes before "2"
        let case = DatasetLoader::new(&dataset.root)
            .with_object(ObjectSelector::parse("auto"))
            .load_case("c")
            .unwrap();
        assert_eq!(case.truth, Some(GeodeticPoint::new(10.0, 10.0)));
    }

    #[test]
    fn test_invalid_truth_is_absent() {
        let dataset = TempDataset::new("bad-truth");
        dataset.write("nan/object_records/1/data.json", r#"{"gps": {"latitude": "NaN", "longitude": 55.0}}"#);
        dataset.write("far/object_records/1/data.json", r#"{"gps": {"latitude": 95.0, "longitude": 55.0}}"#);
        dataset.write("far/observation_records/1/data.json", &observation(25.0, 55.0, 0.0));

        let loader = DatasetLoader::new(&dataset.root);
        assert_eq!(loader.load_case("nan").unwrap().truth, None);

        let case = loader.load_case("far").unwrap();
        assert_eq!(case.truth, None);
        assert_eq!(case.observers.len(), 1);
    }

    #[test]
    fn test_observation_scan_limit() {
        let dataset = TempDataset::new("limit");
        dataset.write("c/observation_records/1/data.json", &observation(1.0, 1.0, 10.0));
        dataset.write("c/observation_records/3/data.json", &observation(1.0, 1.0, 10.0));

        let case = DatasetLoader::new(&dataset.root)
            .with_max_observation_records(2)
            .load_case("c")
            .unwrap();
        assert_eq!(case.observers.len(), 1);
    }

    #[test]
    fn test_missing_case() {
        let dataset = TempDataset::new("missing");
        let err = DatasetLoader::new(&dataset.root).load_case("nope").unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }
}
