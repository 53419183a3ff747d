//! Landmark file collection and parsing.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::debug;
use passport_core::LandmarkSet;
use serde::Deserialize;
use walkdir::WalkDir;

/// A landmark file holds either one face or every face found on a frame.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LandmarkFile {
    Faces(Vec<LandmarkSet>),
    Single(LandmarkSet),
}

/// Collect all landmark JSON paths from a file or directory, sorted.
pub fn collect_landmark_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    if !path.is_dir() {
        anyhow::bail!(
            "input path is neither file nor directory: {}",
            path.display()
        );
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let is_json = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            files.push(entry.path().to_path_buf());
        } else {
            debug!("Skipping non-JSON file {}", entry.path().display());
        }
    }
    files.sort();
    Ok(files)
}

/// Read the landmark sets stored in `path`, one per detected face.
pub fn load_landmark_file(path: &Path) -> Result<Vec<LandmarkSet>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read landmark file {}", path.display()))?;
    let parsed: LandmarkFile = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse landmark JSON at {}", path.display()))?;
    Ok(match parsed {
        LandmarkFile::Faces(sets) => sets,
        LandmarkFile::Single(set) => vec![set],
    })
}
