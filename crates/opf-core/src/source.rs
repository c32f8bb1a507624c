//! Capabilities the compositor needs from storage, plus an in-memory implementation.
//!
//! Loaders (YAML directories, databases, ...) live outside this crate and only have to provide
//! these three traits.

use crate::annotation::{Layer, LayerId};
use crate::error::SourceError;
use crate::text::{BaseText, Span, VolumeId, Work};
use std::collections::BTreeMap;

/// Provides annotation layers per volume.
pub trait LayerSource {
    /// Layers available for a volume. Order is not significant.
    fn layer_ids(&self, volume: &VolumeId) -> Result<Vec<LayerId>, SourceError>;

    /// Load a layer; annotations must come back in stable file order.
    fn load_layer(&self, volume: &VolumeId, layer: &LayerId) -> Result<Layer, SourceError>;
}

/// Maps a work to the spans making up its base layer.
pub trait IndexSource {
    /// Spans of `work`, in reading order.
    fn work_spans(&self, work: &str) -> Result<Vec<Span>, SourceError>;

    /// Resolve a work.
    fn work(&self, work: &str) -> Result<Work, SourceError> {
        Ok(Work::new(work, self.work_spans(work)?))
    }
}

/// Provides raw volume text (BOM included, if any).
pub trait BaseTextSource {
    /// Raw text of a volume.
    fn volume_text(&self, volume: &VolumeId) -> Result<String, SourceError>;

    /// Load every volume referenced by `work`.
    fn load_base_text(&self, work: &Work) -> Result<BaseText, SourceError> {
        let mut base = BaseText::new();
        for volume in work.volumes() {
            let raw = self.volume_text(volume)?;
            base.insert_volume(volume.clone(), &raw);
        }
        Ok(base)
    }
}

/// An in-memory pecha, handy for tests and for callers that already hold the data.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    volumes: BTreeMap<VolumeId, String>,
    layers: BTreeMap<VolumeId, BTreeMap<LayerId, Layer>>,
    works: BTreeMap<String, Vec<Span>>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a volume's raw text.
    pub fn with_volume(mut self, volume: impl Into<VolumeId>, raw: impl Into<String>) -> Self {
        self.volumes.insert(volume.into(), raw.into());
        self
    }

    /// Add a layer to a volume.
    pub fn with_layer(mut self, volume: impl Into<VolumeId>, layer: Layer) -> Self {
        self.layers
            .entry(volume.into())
            .or_default()
            .insert(layer.id.clone(), layer);
        self
    }

    /// Add a work to the index.
    pub fn with_work(mut self, work: impl Into<String>, spans: Vec<Span>) -> Self {
        self.works.insert(work.into(), spans);
        self
    }
}

impl LayerSource for MemorySource {
    fn layer_ids(&self, volume: &VolumeId) -> Result<Vec<LayerId>, SourceError> {
        Ok(self
            .layers
            .get(volume)
            .map(|layers| layers.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn load_layer(&self, volume: &VolumeId, layer: &LayerId) -> Result<Layer, SourceError> {
        self.layers
            .get(volume)
            .and_then(|layers| layers.get(layer))
            .cloned()
            .ok_or_else(|| SourceError::MissingLayer {
                volume: volume.clone(),
                layer: layer.clone(),
            })
    }
}

impl IndexSource for MemorySource {
    fn work_spans(&self, work: &str) -> Result<Vec<Span>, SourceError> {
        self.works
            .get(work)
            .cloned()
            .ok_or_else(|| SourceError::UnknownWork(work.to_string()))
    }
}

impl BaseTextSource for MemorySource {
    fn volume_text(&self, volume: &VolumeId) -> Result<String, SourceError> {
        self.volumes
            .get(volume)
            .cloned()
            .ok_or_else(|| SourceError::MissingVolume(volume.clone()))
    }
}
