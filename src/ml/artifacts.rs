use crate::error::{AppError, Result};
use crate::ml::models::ModelArtifact;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// On-disk encoding of an artifact, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// `.json`
    Json,
    /// Anything else
    Bincode,
}

impl ArtifactFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ArtifactFormat::Json,
            _ => ArtifactFormat::Bincode,
        }
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path, artifact: &str) -> Result<T> {
    let bytes = fs::read(path)
        .map_err(|e| AppError::artifact_load(artifact, format!("{}: {}", path.display(), e)))?;

    let format = ArtifactFormat::from_path(path);
    debug!(path = %path.display(), ?format, bytes = bytes.len(), "Reading {} artifact", artifact);

    match format {
        ArtifactFormat::Json => serde_json::from_slice(&bytes)
            .map_err(|e| AppError::artifact_load(artifact, format!("{}: {}", path.display(), e))),
        ArtifactFormat::Bincode => bincode::deserialize(&bytes)
            .map_err(|e| AppError::artifact_load(artifact, format!("{}: {}", path.display(), e))),
    }
}

/// Load a serialized classifier
pub fn load_model(path: &Path) -> Result<ModelArtifact> {
    read_artifact(path, "model")
}

/// Load the ordered feature-name list
pub fn load_feature_names(path: &Path) -> Result<Vec<String>> {
    read_artifact(path, "feature list")
}

/// Write an artifact in the encoding its extension selects
pub fn write_artifact<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = match ArtifactFormat::from_path(path) {
        ArtifactFormat::Json => serde_json::to_vec_pretty(value)?,
        ArtifactFormat::Bincode => bincode::serialize(value)?,
    };
    fs::write(path, bytes)?;
    Ok(())
}
