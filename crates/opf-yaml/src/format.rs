//! On-disk YAML records.

use crate::error::OpfError;
use opf_core::{Annotation, Layer, LayerId, Payload, Span, VolumeId};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::path::Path;

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub(crate) struct RawSpan {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IndexFile {
    #[serde(default)]
    pub annotations: Vec<IndexEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IndexEntry {
    pub work: Value,
    #[serde(default)]
    pub span: Vec<VolumeSpan>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VolumeSpan {
    /// Base file reference, e.g. `base/v001`.
    pub vol: String,
    pub span: RawSpan,
}

impl IndexEntry {
    pub(crate) fn work_id(&self) -> Option<String> {
        scalar_to_string(&self.work)
    }

    pub(crate) fn spans(&self) -> Vec<Span> {
        self.span
            .iter()
            .map(|s| Span::new(volume_id_from_ref(&s.vol), s.span.start, s.span.end))
            .collect()
    }
}

/// `base/v001` and `v001` both name volume `v001`.
pub(crate) fn volume_id_from_ref(reference: &str) -> VolumeId {
    let name = reference.rsplit('/').next().unwrap_or(reference);
    VolumeId::new(name.strip_suffix(".txt").unwrap_or(name))
}

pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

pub(crate) fn read_yaml<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, OpfError> {
    let text = std::fs::read_to_string(path).map_err(|source| OpfError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&text).map_err(|source| OpfError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

fn annotation_from_mapping(map: &Mapping) -> Result<Annotation, String> {
    let mut span: Option<RawSpan> = None;
    let mut payload = Payload::new();
    for (key, value) in map {
        let Some(key) = key.as_str() else {
            continue;
        };
        if key == "span" {
            span = Some(serde_yaml::from_value(value.clone()).map_err(|e| e.to_string())?);
        } else if let Some(text) = scalar_to_string(value) {
            payload.insert(key.to_string(), text);
        } else if !value.is_null() {
            // Renderers see nested values as YAML text; the stored record is untouched.
            let text = serde_yaml::to_string(value).map_err(|e| e.to_string())?;
            payload.insert(key.to_string(), text.trim_end().to_string());
        }
    }
    let span = span.ok_or_else(|| "missing 'span'".to_string())?;
    Ok(Annotation {
        kind: None,
        start: span.start,
        end: span.end,
        payload,
    })
}

/// A layer file as stored on disk.
///
/// Keeps the file's own fields (`id`, `annotation_type`, ...) and every record as written, so a
/// re-based layer is saved back with only its span coordinates changed.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDocument {
    fields: Mapping,
    records: Vec<Mapping>,
    layer: Layer,
}

impl LayerDocument {
    /// Parse a layer file; the layer id is the file stem.
    pub fn read(path: &Path) -> Result<Self, OpfError> {
        let mut fields: Mapping = read_yaml(path)?;
        // The key stays in place; `to_yaml` puts the records back there.
        let stored = fields
            .get_mut(ANNOTATIONS)
            .map(|value| std::mem::replace(value, Value::Null));
        let records = match stored {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(items)) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::Mapping(record) => Ok(record),
                    _ => Err(OpfError::InvalidAnnotation {
                        path: path.to_path_buf(),
                        index,
                        message: "expected a mapping".to_string(),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(OpfError::InvalidLayer {
                    path: path.to_path_buf(),
                    message: "'annotations' must be a list".to_string(),
                });
            }
        };

        let id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let annotations = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                annotation_from_mapping(record).map_err(|message| OpfError::InvalidAnnotation {
                    path: path.to_path_buf(),
                    index,
                    message,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            fields,
            records,
            layer: Layer::new(LayerId::new(id), annotations),
        })
    }

    /// A new document holding `layer`; payload values are written as strings.
    pub fn from_layer(layer: &Layer) -> Result<Self, OpfError> {
        let mut records = Vec::with_capacity(layer.annotations.len());
        for annotation in &layer.annotations {
            let mut record = Mapping::new();
            record.insert(
                Value::from("span"),
                serde_yaml::to_value(RawSpan {
                    start: annotation.start,
                    end: annotation.end,
                })?,
            );
            for (key, value) in &annotation.payload {
                record.insert(Value::from(key.as_str()), Value::from(value.as_str()));
            }
            records.push(record);
        }
        Ok(Self {
            fields: Mapping::new(),
            records,
            layer: layer.clone(),
        })
    }

    /// The parsed layer.
    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    /// Consume the document, keeping the parsed layer.
    pub fn into_layer(self) -> Layer {
        self.layer
    }

    /// Move every record to the coordinates of the matching annotation of `layer`.
    ///
    /// `layer` must hold one annotation per record, in file order (e.g. the output of
    /// re-basing [`LayerDocument::layer`]). Nothing but `span.start` and `span.end` changes.
    pub fn set_spans(&mut self, layer: &Layer) -> Result<(), OpfError> {
        if layer.annotations.len() != self.records.len() {
            return Err(OpfError::RecordCountMismatch {
                expected: self.records.len(),
                found: layer.annotations.len(),
            });
        }
        let targets = self.records.iter_mut().zip(&mut self.layer.annotations);
        for ((record, current), moved) in targets.zip(&layer.annotations) {
            set_span(record, moved.start, moved.end);
            current.start = moved.start;
            current.end = moved.end;
        }
        Ok(())
    }

    /// Serialize into the layer file format.
    pub fn to_yaml(&self) -> Result<String, OpfError> {
        let mut document = self.fields.clone();
        let records = self.records.iter().cloned().map(Value::Mapping).collect();
        document.insert(Value::from(ANNOTATIONS), Value::Sequence(records));
        Ok(serde_yaml::to_string(&document)?)
    }

    /// Write the document to `path`.
    pub fn write(&self, path: &Path) -> Result<(), OpfError> {
        let text = self.to_yaml()?;
        std::fs::write(path, text).map_err(|source| OpfError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

const ANNOTATIONS: &str = "annotations";

fn set_span(record: &mut Mapping, start: usize, end: usize) {
    match record.get_mut("span") {
        Some(Value::Mapping(span)) => {
            span.insert(Value::from("start"), Value::from(start));
            span.insert(Value::from("end"), Value::from(end));
        }
        _ => {
            let mut span = Mapping::new();
            span.insert(Value::from("start"), Value::from(start));
            span.insert(Value::from("end"), Value::from(end));
            record.insert(Value::from("span"), Value::Mapping(span));
        }
    }
}

/// Parse a layer file; the layer id is the file stem.
pub fn read_layer_file(path: &Path) -> Result<Layer, OpfError> {
    LayerDocument::read(path).map(LayerDocument::into_layer)
}

/// Serialize a layer into the layer file format.
pub fn layer_to_yaml(layer: &Layer) -> Result<String, OpfError> {
    LayerDocument::from_layer(layer)?.to_yaml()
}

/// Write a layer file.
pub fn write_layer_file(path: &Path, layer: &Layer) -> Result<(), OpfError> {
    LayerDocument::from_layer(layer)?.write(path)
}
