use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::config::{EditorConfig, PendingPolicy};
use crate::model::timeline::Level;

/// Error type for editor I/O operations
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse soa.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("invalid toml in soa.toml: {0}")]
    ConfigSyntaxError(#[from] toml_edit::TomlError),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Read soa.toml, returning both the parsed config and the raw toml_edit
/// document for round-trip-safe editing. A missing file yields defaults and
/// an empty document.
pub fn read_config(dir: &Path) -> Result<(EditorConfig, toml_edit::DocumentMut), StateError> {
    let path = dir.join("soa.toml");
    if !path.exists() {
        return Ok((EditorConfig::default(), toml_edit::DocumentMut::new()));
    }
    let text = fs::read_to_string(&path).map_err(|e| StateError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let config: EditorConfig = toml::from_str(&text)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((config, doc))
}

/// Write the config document back, preserving formatting.
pub fn write_config(dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), StateError> {
    let path = dir.join("soa.toml");
    write_atomic(&path, doc.to_string().as_bytes())?;
    Ok(())
}

/// Write via a temp file in the same directory, then rename over the target,
/// so a crash mid-write cannot leave a truncated config behind.
fn write_atomic(path: &Path, content: &[u8]) -> Result<(), std::io::Error> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Update the history capacity in the config document
pub fn set_history_capacity(doc: &mut toml_edit::DocumentMut, capacity: usize) {
    if !doc.contains_key("history") {
        doc["history"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["history"]["capacity"] = toml_edit::value(capacity as i64);
}

/// Update the pending-decision policy in the config document
pub fn set_decision_policy(doc: &mut toml_edit::DocumentMut, policy: PendingPolicy) {
    let value = match policy {
        PendingPolicy::Overwrite => "overwrite",
        PendingPolicy::Queue => "queue",
    };
    if !doc.contains_key("decisions") {
        doc["decisions"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["decisions"]["policy"] = toml_edit::value(value);
}

/// Set a default-name label override for a level
pub fn set_naming_label(doc: &mut toml_edit::DocumentMut, level: Level, label: &str) {
    if !doc.contains_key("naming") {
        doc["naming"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["naming"]["labels"][level.to_string().as_str()] = toml_edit::value(label);
}
