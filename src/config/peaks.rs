use crate::nms::SuppressionParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PeakOutputConfig {
    pub json_out: Option<PathBuf>,
}

/// Peak picking on a density map stored as an image, with optional class
/// probability maps (one image per class).
#[derive(Clone, Debug, Deserialize)]
pub struct PeakDemoConfig {
    pub input_path: PathBuf,
    #[serde(default)]
    pub class_paths: Vec<PathBuf>,
    #[serde(default)]
    pub suppression: SuppressionParams,
    #[serde(default)]
    pub output: PeakOutputConfig,
}

pub fn load_config(path: &Path) -> Result<PeakDemoConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}
