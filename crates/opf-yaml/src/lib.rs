#![warn(missing_docs)]
//! `opf-yaml` - reads OpenPecha `.opf` directories for `opf-core`.
//!
//! Layout:
//!
//! ```text
//! <pecha>.opf/
//! ├── index.yml                 works and their volume spans
//! ├── base/
//! │   └── v001.txt              raw volume text
//! └── layers/
//!     └── v001/
//!         ├── BookTitle.yml     one file per layer
//!         └── Pagination.yml
//! ```
//!
//! Layer files hold `annotations: [{span: {start, end}, ...}]`; every other field of a record
//! becomes payload. [`LayerDocument`] keeps the file as written for lossless re-saving.

mod error;
mod format;

pub use error::OpfError;
pub use format::{LayerDocument, layer_to_yaml, read_layer_file, write_layer_file};

use format::{IndexFile, read_yaml};
use opf_core::{BaseTextSource, IndexSource, Layer, LayerId, LayerSource, SourceError, Span, VolumeId};
use std::path::{Path, PathBuf};

/// An `.opf` directory on disk.
#[derive(Debug, Clone)]
pub struct OpfDirectory {
    root: PathBuf,
}

impl OpfDirectory {
    /// Open an `.opf` directory. Nothing is read until a source method is called.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of `index.yml`.
    pub fn index_path(&self) -> PathBuf {
        self.root.join("index.yml")
    }

    /// Path of a volume's base text.
    pub fn base_path(&self, volume: &VolumeId) -> PathBuf {
        self.root.join("base").join(format!("{volume}.txt"))
    }

    /// Directory holding a volume's layers.
    pub fn layers_dir(&self, volume: &VolumeId) -> PathBuf {
        self.root.join("layers").join(volume.as_str())
    }

    /// Path of a layer file.
    pub fn layer_path(&self, volume: &VolumeId, layer: &LayerId) -> PathBuf {
        self.layers_dir(volume).join(format!("{layer}.yml"))
    }

    /// Save a layer, e.g. after re-basing it onto a new base text.
    pub fn write_layer(&self, volume: &VolumeId, layer: &Layer) -> Result<(), OpfError> {
        let dir = self.layers_dir(volume);
        std::fs::create_dir_all(&dir).map_err(|source| OpfError::Io {
            path: dir.clone(),
            source,
        })?;
        write_layer_file(&self.layer_path(volume, &layer.id), layer)
    }
}

impl LayerSource for OpfDirectory {
    fn layer_ids(&self, volume: &VolumeId) -> Result<Vec<LayerId>, SourceError> {
        let dir = self.layers_dir(volume);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&dir).map_err(|source| OpfError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| OpfError::Io {
                    path: dir.clone(),
                    source,
                })?
                .path();
            if path.extension().is_some_and(|ext| ext == "yml")
                && let Some(stem) = path.file_stem()
            {
                ids.push(LayerId::new(stem.to_string_lossy()));
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn load_layer(&self, volume: &VolumeId, layer: &LayerId) -> Result<Layer, SourceError> {
        let path = self.layer_path(volume, layer);
        if !path.is_file() {
            return Err(SourceError::MissingLayer {
                volume: volume.clone(),
                layer: layer.clone(),
            });
        }
        let mut loaded = read_layer_file(&path)?;
        loaded.id = layer.clone();
        log::debug!(
            "loaded layer '{layer}' for '{volume}' ({} annotations)",
            loaded.annotations.len()
        );
        Ok(loaded)
    }
}

impl IndexSource for OpfDirectory {
    fn work_spans(&self, work: &str) -> Result<Vec<Span>, SourceError> {
        let index: IndexFile = read_yaml(&self.index_path())?;
        index
            .annotations
            .iter()
            .find(|entry| entry.work_id().as_deref() == Some(work))
            .map(|entry| entry.spans())
            .ok_or_else(|| SourceError::UnknownWork(work.to_string()))
    }
}

impl BaseTextSource for OpfDirectory {
    fn volume_text(&self, volume: &VolumeId) -> Result<String, SourceError> {
        let path = self.base_path(volume);
        if !path.is_file() {
            return Err(SourceError::MissingVolume(volume.clone()));
        }
        std::fs::read_to_string(&path)
            .map_err(|source| OpfError::Io { path, source }.into())
    }
}
