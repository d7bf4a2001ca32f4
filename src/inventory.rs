//! Camera inventory: the load-once partition of the fleet into
//! interior and exterior cameras.

use crate::error::{Result, SentinelError};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Which part of the fleet a mask action addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSet {
    Interior,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraClass {
    Interior,
    Exterior,
}

/// One camera record. Immutable after load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Camera {
    /// Network address (host or host:port) of the camera.
    pub ip: String,
    #[serde(rename = "type")]
    pub class: CameraClass,
}

/// Read-only view of the camera fleet, loaded once at startup.
#[derive(Debug, Clone)]
pub struct CameraInventory {
    cameras: Vec<Camera>,
}

impl CameraInventory {
    /// Load the inventory from a JSON file.
    ///
    /// Any malformed entry (unknown `type`, missing field) fails the
    /// load; a valid but empty inventory is accepted with a warning.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SentinelError::Inventory(format!("cannot read {}: {e}", path.display()))
        })?;
        let cameras: Vec<Camera> = serde_json::from_str(&content).map_err(|e| {
            SentinelError::Inventory(format!("cannot parse {}: {e}", path.display()))
        })?;

        if cameras.is_empty() {
            warn!("Camera inventory {} is empty", path.display());
        }

        Ok(Self { cameras })
    }

    pub fn from_cameras(cameras: Vec<Camera>) -> Self {
        Self { cameras }
    }

    pub fn all(&self) -> &[Camera] {
        &self.cameras
    }

    pub fn interior(&self) -> impl Iterator<Item = &Camera> {
        self.cameras
            .iter()
            .filter(|c| c.class == CameraClass::Interior)
    }

    /// Resolve a target selector to the concrete camera set.
    pub fn select(&self, target: TargetSet) -> Vec<Camera> {
        match target {
            TargetSet::Interior => self.interior().cloned().collect(),
            TargetSet::All => self.cameras.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_inventory(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_partitions_fleet() {
        let file = write_inventory(
            r#"[
                {"ip": "10.0.0.1", "type": "interior"},
                {"ip": "10.0.0.2", "type": "exterior"}
            ]"#,
        );
        let inventory = CameraInventory::load(file.path()).unwrap();

        assert_eq!(inventory.len(), 2);
        let interior: Vec<_> = inventory.interior().map(|c| c.ip.as_str()).collect();
        assert_eq!(interior, vec!["10.0.0.1"]);
    }

    #[test]
    fn test_select_target_sets() {
        let inventory = CameraInventory::from_cameras(vec![
            Camera {
                ip: "10.0.0.1".to_string(),
                class: CameraClass::Interior,
            },
            Camera {
                ip: "10.0.0.2".to_string(),
                class: CameraClass::Exterior,
            },
        ]);

        let interior = inventory.select(TargetSet::Interior);
        assert_eq!(interior.len(), 1);
        assert_eq!(interior[0].ip, "10.0.0.1");

        let all = inventory.select(TargetSet::All);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_unknown_class_fails_load() {
        let file = write_inventory(r#"[{"ip": "10.0.0.1", "type": "rooftop"}]"#);
        assert!(CameraInventory::load(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_fails_load() {
        assert!(CameraInventory::load(Path::new("/nonexistent/cameras.json")).is_err());
    }
}
