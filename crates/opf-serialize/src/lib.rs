#![warn(missing_docs)]
//! `opf-serialize` - Markdown and TEI output formats for `opf-core`.
//!
//! Both formats are rule tables: each layer type maps to an opening and a closing template.
//! The opener goes before the first character of an annotation and the closer after its last
//! character; point annotations get both, back to back, before their coordinate.

mod rule;

pub use rule::{MarkupRule, Template};

use opf_core::{Annotation, AnnotationRenderer, CompositionError, InsertionSink, LayerId, Placement};
use std::borrow::Cow;
use std::collections::HashMap;

/// Book title layer.
pub const BOOK_TITLE: &str = "BookTitle";
/// Sub title layer.
pub const SUB_TITLE: &str = "SubTitle";
/// Author layer.
pub const AUTHOR: &str = "Author";
/// Chapter title layer.
pub const CHAPTER: &str = "Chapter";
/// Citation layer.
pub const CITATION: &str = "Citation";
/// Commentary outline (sa bcad) layer.
pub const SABCHE: &str = "Sabche";
/// Root text (rtsa ba) layer.
pub const TSAWA: &str = "Tsawa";
/// Small-letter annotation (yig chung) layer.
pub const YIGCHUNG: &str = "Yigchung";
/// Page layer; annotations carry a `page_index` field.
pub const PAGINATION: &str = "Pagination";

/// A rule-table based [`AnnotationRenderer`].
#[derive(Debug, Clone)]
pub struct MarkupRenderer {
    rules: HashMap<LayerId, MarkupRule>,
    escape: fn(&str) -> Cow<'_, str>,
}

impl MarkupRenderer {
    /// Create a renderer with no rules; payload values are inserted verbatim.
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
            escape: verbatim,
        }
    }

    /// Add (or replace) the rule for a layer type.
    pub fn with_rule(mut self, layer: impl Into<LayerId>, rule: MarkupRule) -> Self {
        self.rules.insert(layer.into(), rule);
        self
    }

    /// Escape payload values before substituting them.
    pub fn with_escape(mut self, escape: fn(&str) -> Cow<'_, str>) -> Self {
        self.escape = escape;
        self
    }

    /// The rule for a layer type, if any.
    pub fn rule(&self, layer: &LayerId) -> Option<&MarkupRule> {
        self.rules.get(layer)
    }

    /// Markdown output.
    pub fn markdown() -> Self {
        Self::new()
            .with_rule(BOOK_TITLE, MarkupRule::open_only("# "))
            .with_rule(SUB_TITLE, MarkupRule::open_only("## "))
            .with_rule(CHAPTER, MarkupRule::open_only("### "))
            .with_rule(AUTHOR, MarkupRule::new("*", "*"))
            .with_rule(CITATION, MarkupRule::open_only("> "))
            .with_rule(SABCHE, MarkupRule::new("***", "***"))
            .with_rule(TSAWA, MarkupRule::new("**", "**"))
            .with_rule(YIGCHUNG, MarkupRule::new("_", "_"))
            .with_rule(PAGINATION, MarkupRule::open_only("[{page_index}] "))
    }

    /// TEI output; payload values are XML-escaped.
    pub fn tei() -> Self {
        Self::new()
            .with_escape(escape_xml)
            .with_rule(BOOK_TITLE, MarkupRule::new("<title type=\"main\">", "</title>"))
            .with_rule(SUB_TITLE, MarkupRule::new("<title type=\"sub\">", "</title>"))
            .with_rule(CHAPTER, MarkupRule::new("<head>", "</head>"))
            .with_rule(AUTHOR, MarkupRule::new("<author>", "</author>"))
            .with_rule(CITATION, MarkupRule::new("<cit>", "</cit>"))
            .with_rule(SABCHE, MarkupRule::new("<seg type=\"sabche\">", "</seg>"))
            .with_rule(TSAWA, MarkupRule::new("<quote type=\"tsawa\">", "</quote>"))
            .with_rule(YIGCHUNG, MarkupRule::new("<note type=\"yigchung\">", "</note>"))
            .with_rule(PAGINATION, MarkupRule::open_only("<pb n=\"{page_index}\"/>"))
    }
}

impl Default for MarkupRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationRenderer for MarkupRenderer {
    fn apply_annotation(
        &self,
        annotation: &Annotation,
        sink: &mut InsertionSink<'_>,
    ) -> Result<(), CompositionError> {
        let layer = annotation
            .kind
            .as_ref()
            .ok_or(CompositionError::UntypedAnnotation)?;
        let rule = self
            .rules
            .get(layer)
            .ok_or_else(|| CompositionError::UnsupportedLayer(layer.clone()))?;

        let open = rule.open.expand(layer, annotation, self.escape)?;
        let close = rule.close.expand(layer, annotation, self.escape)?;

        if annotation.is_point() {
            sink.add_chars(annotation.start, Placement::Before, open + &close);
            return Ok(());
        }
        if !open.is_empty() {
            sink.add_chars(annotation.start, Placement::Before, open);
        }
        if !close.is_empty() {
            sink.add_chars(annotation.end - 1, Placement::After, close);
        }
        Ok(())
    }
}

/// Leave payload values untouched.
pub fn verbatim(text: &str) -> Cow<'_, str> {
    Cow::Borrowed(text)
}

/// Escape the XML special characters `& < > "`.
pub fn escape_xml(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}
