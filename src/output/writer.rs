//! JSON array writer

use crate::collector::ResultSet;
use crate::config::OutputConfig;
use crate::error::{Error, Result};
use crate::types::JsonValue;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Configuration for JSON output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonWriterConfig {
    /// Destination file
    pub path: PathBuf,
    /// Indent the array
    pub pretty: bool,
}

impl Default for JsonWriterConfig {
    fn default() -> Self {
        Self::from(&OutputConfig::default())
    }
}

impl From<&OutputConfig> for JsonWriterConfig {
    fn from(config: &OutputConfig) -> Self {
        Self {
            path: config.path.clone(),
            pretty: config.pretty,
        }
    }
}

/// Writes a result set to disk in one shot
#[derive(Debug, Clone, Default)]
pub struct JsonWriter {
    config: JsonWriterConfig,
}

impl JsonWriter {
    /// Create a writer for `path` with pretty printing
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            config: JsonWriterConfig {
                path: path.into(),
                pretty: true,
            },
        }
    }

    /// Create a writer from a config
    pub fn with_config(config: JsonWriterConfig) -> Self {
        Self { config }
    }

    /// Destination file
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Serialize records as a JSON array
    pub fn to_json(&self, records: &ResultSet) -> Result<String> {
        let array: Vec<&JsonValue> = records.records().collect();
        let contents = if self.config.pretty {
            serde_json::to_string_pretty(&array)
        } else {
            serde_json::to_string(&array)
        };
        contents.map_err(|e| Error::output(format!("Failed to serialize records: {e}")))
    }

    /// Write every record, returning how many were written
    ///
    /// The array goes to a sibling temp file first and is renamed over the
    /// destination, so readers never observe a partial file.
    pub async fn write(&self, records: &ResultSet) -> Result<usize> {
        let contents = self.to_json(records)?;
        let path = &self.config.path;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::output(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        let temp_path = path.with_extension("tmp");
        if let Err(e) = tokio::fs::write(&temp_path, &contents).await {
            discard(&temp_path).await;
            return Err(Error::output(format!("Failed to write temp file: {e}")));
        }
        if let Err(e) = tokio::fs::rename(&temp_path, path).await {
            discard(&temp_path).await;
            return Err(Error::output(format!("Failed to rename output file: {e}")));
        }

        debug!("Wrote {} records to {}", records.len(), path.display());
        Ok(records.len())
    }
}

/// Best-effort removal of a leftover temp file
async fn discard(temp_path: &Path) {
    if let Err(e) = tokio::fs::remove_file(temp_path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove {}: {e}", temp_path.display());
        }
    }
}

/// Load a persisted JSON array of records
pub async fn read_records(path: impl AsRef<Path>) -> Result<Vec<JsonValue>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let contents = tokio::fs::read_to_string(path).await?;
    match serde_json::from_str(&contents)? {
        JsonValue::Array(records) => Ok(records),
        other => Err(Error::output(format!(
            "Expected a JSON array in {}, found {}",
            path.display(),
            type_name(&other)
        ))),
    }
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
