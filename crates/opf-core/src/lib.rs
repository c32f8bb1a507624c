#![warn(missing_docs)]
//! OPF Core - layered annotation rendering over an immutable base text
//!
//! # Overview
//!
//! A pecha (an OpenPecha `.opf` text) is stored as a base text, split into volumes, plus any
//! number of independently authored annotation layers (titles, pagination, citations, ...).
//! Annotations point at **character offsets** in the base text, so the base text is never
//! modified; rendered forms (Markdown, TEI, ...) are produced on demand by splicing markup
//! around existing characters.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  LayerCompositor (compose / render)         │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  AnnotationRenderer (output format hook)    │  ← Markdown, TEI, ...
//! ├─────────────────────────────────────────────┤
//! │  InsertionMap (before/after per coordinate) │  ← Pending markup
//! ├─────────────────────────────────────────────┤
//! │  BaseText / Span / Work                     │  ← BOM-stripped text
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use opf_core::{
//!     Annotation, AnnotationRenderer, CompositionError, InsertionSink, Layer, LayerCompositor,
//!     LayerSelection, MemorySource, Placement, Span,
//! };
//!
//! struct Emphasis;
//!
//! impl AnnotationRenderer for Emphasis {
//!     fn apply_annotation(
//!         &self,
//!         annotation: &Annotation,
//!         sink: &mut InsertionSink<'_>,
//!     ) -> Result<(), CompositionError> {
//!         sink.add_chars(annotation.start, Placement::Before, "*");
//!         sink.add_chars(annotation.end - 1, Placement::After, "*");
//!         Ok(())
//!     }
//! }
//!
//! let source = MemorySource::new()
//!     .with_volume("v1", "hello world")
//!     .with_layer("v1", Layer::new("Emphasis", vec![Annotation::new(6, 11)]))
//!     .with_work("w1", vec![Span::new("v1", 0, 11)]);
//!
//! let text = LayerCompositor::compose(&source, "w1", Emphasis, &LayerSelection::All).unwrap();
//! assert_eq!(text, "hello *world*");
//! ```
//!
//! # Module Description
//!
//! - [`text`] - volumes, spans and works
//! - [`annotation`] - layers and annotations
//! - [`insertions`] - the insertion map and the sink handed to renderers
//! - [`compositor`] - layer application and rendering
//! - [`source`] - storage capabilities and an in-memory implementation

pub mod annotation;
pub mod compositor;
mod error;
pub mod insertions;
pub mod source;
pub mod text;

pub use annotation::{Annotation, Layer, LayerId, Payload};
pub use compositor::{AnnotationRenderer, LayerCompositor, LayerSelection};
pub use error::{CompositionError, SourceError};
pub use insertions::{InsertionMap, InsertionSink, Insertions, Placement};
pub use source::{BaseTextSource, IndexSource, LayerSource, MemorySource};
pub use text::{BOM, BaseText, Span, VolumeId, VolumeText, Work};
