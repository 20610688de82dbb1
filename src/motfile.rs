//! Motfile export/import - `.motwork` and `.motplan` JSON files
//!
//! Row reconstruction against the exercise store (with the
//! missing-exercises report) is the caller's step; this module only moves
//! the plain payloads to and from disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::warn;

use crate::db::{PlanData, WorkoutData};

pub const WORKOUT_FILE_EXTENSION: &str = "motwork";
pub const PLAN_FILE_EXTENSION: &str = "motplan";

fn export_filepath(dir: &Path, name: &str, extension: &str, overwrite: bool) -> Result<PathBuf> {
    let filename = format!("{}.{extension}", name.replace(' ', "_").to_lowercase());
    let filepath = dir.join(filename);
    if filepath.exists() && !overwrite {
        bail!("file {} already exists", filepath.display());
    }
    Ok(filepath)
}

/// Writes a `.motwork` file into `dir` and returns its path
pub fn export_workout(dir: &Path, data: &WorkoutData, overwrite: bool) -> Result<PathBuf> {
    let filepath = export_filepath(dir, &data.name, WORKOUT_FILE_EXTENSION, overwrite)?;
    let json = serde_json::to_string_pretty(data)?;
    fs::write(&filepath, json)
        .with_context(|| format!("writing workout file {}", filepath.display()))?;
    Ok(filepath)
}

pub fn import_workout(filepath: &Path) -> Result<WorkoutData> {
    match read_json(filepath) {
        Ok(data) => Ok(data),
        Err(err) => {
            warn!(filepath = %filepath.display(), "importing workout file failed");
            Err(err)
        }
    }
}

/// Writes a `.motplan` file into `dir` and returns its path
pub fn export_plan(dir: &Path, data: &PlanData, overwrite: bool) -> Result<PathBuf> {
    if data.days.len() != 7 {
        bail!("plan {:?} must cover 7 days, has {}", data.name, data.days.len());
    }
    let filepath = export_filepath(dir, &data.name, PLAN_FILE_EXTENSION, overwrite)?;
    let json = serde_json::to_string_pretty(data)?;
    fs::write(&filepath, json)
        .with_context(|| format!("writing plan file {}", filepath.display()))?;
    Ok(filepath)
}

pub fn import_plan(filepath: &Path) -> Result<PlanData> {
    let data: PlanData = match read_json(filepath) {
        Ok(data) => data,
        Err(err) => {
            warn!(filepath = %filepath.display(), "importing plan file failed");
            return Err(err);
        }
    };
    if data.days.len() != 7 {
        bail!(
            "plan file {} must cover 7 days, has {}",
            filepath.display(),
            data.days.len()
        );
    }
    Ok(data)
}

fn read_json<T: serde::de::DeserializeOwned>(filepath: &Path) -> Result<T> {
    let content = fs::read_to_string(filepath)
        .with_context(|| format!("reading {}", filepath.display()))?;
    let data = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", filepath.display()))?;
    Ok(data)
}
