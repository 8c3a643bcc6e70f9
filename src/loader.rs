//! Loads cluster definitions from a directory of JSON files.
//!
//! Each `<name>.json` file holds one JSON object and becomes the cluster
//! `<name>`.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::cluster::Cluster;
use crate::error::{Error, Result};
use crate::state::State;

/// Reads one cluster file, named after its file stem.
pub fn load_file(path: &Path) -> Result<(String, Cluster)> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::Load {
            path: path.to_path_buf(),
            message: "file name is not valid UTF-8".to_string(),
        })?
        .to_string();

    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content).map_err(|e| Error::Load {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let Value::Object(record) = value else {
        return Err(Error::Load {
            path: path.to_path_buf(),
            message: "top level must be a JSON object".to_string(),
        });
    };

    let (cluster, discarded) = Cluster::from_record(&record);
    if !discarded.is_empty() {
        debug!(cluster = %name, count = discarded.len(), "values discarded while loading");
    }
    Ok((name, cluster))
}

/// Files of `dir` with the given extension, sorted by name.
pub(crate) fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Registers every cluster file of `dir` into `state`, returning the
/// names loaded.
pub fn load_dir(state: &mut State, dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for path in files_with_extension(dir, "json")? {
        let (name, cluster) = load_file(&path)?;
        state.add_cluster(name.clone(), cluster);
        names.push(name);
    }
    info!(dir = %dir.display(), clusters = names.len(), "loaded clusters");
    Ok(names)
}
