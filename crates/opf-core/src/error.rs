use crate::annotation::LayerId;
use crate::text::VolumeId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors reported by layer, index and base-text sources.
pub enum SourceError {
    #[error("unknown work '{0}'")]
    /// The index has no entry for this work.
    UnknownWork(String),

    #[error("missing base text for volume '{0}'")]
    /// No base text exists for the volume.
    MissingVolume(VolumeId),

    #[error("missing layer '{layer}' for volume '{volume}'")]
    /// The requested layer does not exist for the volume.
    MissingLayer {
        /// Volume that was searched.
        volume: VolumeId,
        /// Layer that was requested.
        layer: LayerId,
    },

    #[error("failed to load '{path}': {message}")]
    /// Reading or parsing a stored record failed.
    Load {
        /// Path or identifier of the offending record.
        path: String,
        /// Underlying error message.
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced while composing layers into rendered text.
pub enum CompositionError {
    #[error("no rendering rule for layer '{0}'")]
    /// Configuration error: the renderer cannot handle this annotation type.
    UnsupportedLayer(LayerId),

    #[error("annotation is missing its layer type")]
    /// An annotation reached the renderer without a layer type attached.
    UntypedAnnotation,

    #[error("layer '{layer}' annotation has no '{key}' field")]
    /// A rendering template references a payload field the annotation does not carry.
    MissingPayload {
        /// Layer of the annotation.
        layer: LayerId,
        /// Missing payload key.
        key: String,
    },

    #[error("volume '{0}' is not part of the base text")]
    /// A span or insertion references a volume that was never loaded.
    UnknownVolume(VolumeId),

    #[error("span {volume}:{start}..{end} exceeds volume length {len}")]
    /// A work span lies outside its volume.
    SpanOutOfBounds {
        /// Volume of the span.
        volume: VolumeId,
        /// Span start.
        start: usize,
        /// Span end.
        end: usize,
        /// Volume length in characters.
        len: usize,
    },

    #[error("layer '{layer}' annotation {volume}:{start}..{end} does not fit volume length {len}")]
    /// Data-integrity error: an annotation range is inverted or ends past its volume.
    AnnotationOutOfBounds {
        /// Layer of the annotation.
        layer: LayerId,
        /// Volume the layer belongs to.
        volume: VolumeId,
        /// Annotation start.
        start: usize,
        /// Annotation end.
        end: usize,
        /// Volume length in characters.
        len: usize,
    },

    #[error("insertion at {volume}:{coordinate} exceeds volume length {len}")]
    /// Data-integrity error: an annotation inserted text past the end of its volume.
    InsertionOutOfBounds {
        /// Volume of the insertion.
        volume: VolumeId,
        /// Offending coordinate.
        coordinate: usize,
        /// Volume length in characters.
        len: usize,
    },

    #[error("failed to write rendered output")]
    /// The output writer rejected a write.
    Write(#[from] std::fmt::Error),

    #[error(transparent)]
    /// Loading inputs failed.
    Source(#[from] SourceError),
}
