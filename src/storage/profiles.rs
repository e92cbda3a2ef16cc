// src/storage/profiles.rs

use std::fs;
use std::path::PathBuf;

use crate::model::RobotProfile;

/// Read-only file store: one `<robot_model>.json` per profile.
pub struct RobotProfileRepo {
    dir: PathBuf,
}

impl RobotProfileRepo {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Absent or unparseable files read as absent.
    pub fn get(&self, robot_model: &str) -> Option<RobotProfile> {
        let path = self.dir.join(format!("{robot_model}.json"));
        let data = fs::read_to_string(path).ok()?;
        serde_json::from_str(&data).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_profile_by_model_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("chef1.json"),
            r#"{
                "robot_model": "chef1",
                "bowl_capacity_ml": 2500,
                "bowl_max_fill_ml": 2000,
                "bowl_max_mass_g": 3000,
                "attachments": ["whisk"],
                "modes": [{"mode": "HEAT", "temp_c_range": [50, 120], "max_duration_sec": 600}]
            }"#,
        )
        .unwrap();

        let repo = RobotProfileRepo::new(dir.path());
        let profile = repo.get("chef1").unwrap();
        assert_eq!(profile.robot_model, "chef1");
        assert!(profile.has_attachment("whisk"));
        assert!(repo.get("chef2").is_none());
    }

    #[test]
    fn corrupt_profile_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
        let repo = RobotProfileRepo::new(dir.path());
        assert!(repo.get("bad").is_none());
    }
}
