use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::payload::AnalysisResult;

pub const EXPORT_FILE_NAME: &str = "analysis_results.json";

pub fn export_result(dir: &Path, result: &AnalysisResult) -> Result<PathBuf> {
    let path = dir.join(EXPORT_FILE_NAME);
    let json = serde_json::to_string_pretty(result).context("failed to serialize analysis result")?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
