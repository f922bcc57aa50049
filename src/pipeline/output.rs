use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::MAPPING_HEADER;
use crate::domain::ClassGroupMapping;
use crate::error::{CatalogError, Result};
use crate::observability::metrics;
use crate::pipeline::processing::catalog::Catalog;

/// Where the three artifacts go
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputPaths {
    pub items_json: PathBuf,
    pub mods_json: PathBuf,
    pub map_csv: PathBuf,
}

/// Serialized artifact bytes, rendered before anything touches disk
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedArtifacts {
    pub items: Vec<u8>,
    pub modifiers: Vec<u8>,
    pub mapping: Vec<u8>,
}

/// SHA-256 of each written artifact, hex encoded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactDigests {
    pub items: String,
    pub modifiers: String,
    pub mapping: String,
}

impl RenderedArtifacts {
    pub fn render(catalog: &Catalog) -> Result<Self> {
        Ok(Self {
            items: serde_json::to_vec_pretty(&catalog.entries)?,
            modifiers: serde_json::to_vec_pretty(&catalog.modifiers)?,
            mapping: render_mapping(&catalog.mapping)?,
        })
    }

    pub fn digests(&self) -> ArtifactDigests {
        ArtifactDigests {
            items: sha256_hex(&self.items),
            modifiers: sha256_hex(&self.modifiers),
            mapping: sha256_hex(&self.mapping),
        }
    }

    /// Write all three artifacts. Each goes to a sibling temporary file first
    /// and is renamed into place, so readers never see a half-written file.
    pub fn write(&self, paths: &OutputPaths) -> Result<ArtifactDigests> {
        write_atomic(&paths.items_json, &self.items)?;
        write_atomic(&paths.mods_json, &self.modifiers)?;
        write_atomic(&paths.map_csv, &self.mapping)?;
        Ok(self.digests())
    }
}

/// Mapping table with its header row, even when there are no rows
pub fn render_mapping(rows: &[ClassGroupMapping]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(MAPPING_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| CatalogError::Io(e.into_error()))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| CatalogError::Config(format!("output path has no file name: {}", path.display())))?;
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path)?;

    info!("💾 Wrote {} ({} bytes)", path.display(), bytes.len());
    metrics::output::artifact_written(bytes.len());
    Ok(())
}
