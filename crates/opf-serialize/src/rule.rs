use opf_core::{Annotation, CompositionError, LayerId};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("valid field regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A markup string with `{field}` references to the annotation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template. Only `{[A-Za-z0-9_]+}` is treated as a field reference; any other brace
    /// is literal.
    pub fn new(text: &str) -> Self {
        let mut segments = Vec::new();
        let mut last = 0;
        for cap in FIELD_RE.captures_iter(text) {
            let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(text[last..whole.start()].to_string()));
            }
            segments.push(Segment::Field(name.as_str().to_string()));
            last = whole.end();
        }
        if last < text.len() {
            segments.push(Segment::Literal(text[last..].to_string()));
        }
        Self { segments }
    }

    /// Returns `true` if the template produces no text.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Expand the template for `annotation`, passing substituted values through `escape`.
    pub fn expand(
        &self,
        layer: &LayerId,
        annotation: &Annotation,
        escape: fn(&str) -> Cow<'_, str>,
    ) -> Result<String, CompositionError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(key) => {
                    let value =
                        annotation
                            .field(key)
                            .ok_or_else(|| CompositionError::MissingPayload {
                                layer: layer.clone(),
                                key: key.clone(),
                            })?;
                    out.push_str(&escape(value));
                }
            }
        }
        Ok(out)
    }
}

/// Opening and closing markup for one layer type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupRule {
    /// Inserted before the first character of the annotation.
    pub open: Template,
    /// Inserted after the last character of the annotation.
    pub close: Template,
}

impl MarkupRule {
    /// Create a rule from two templates.
    pub fn new(open: &str, close: &str) -> Self {
        Self {
            open: Template::new(open),
            close: Template::new(close),
        }
    }

    /// A rule that only inserts markup at the start.
    pub fn open_only(open: &str) -> Self {
        Self::new(open, "")
    }
}
