//! Edit lists applied in one left-to-right pass.
//!
//! Every offset recorded for a stage refers to the buffer as it was scanned.
//! Edits are sorted by offset (stable, so discovery order breaks ties) and the
//! output is rebuilt by copying untouched text between them.

/// What a span covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// A single delimiter tag.
    Tag,
    /// A block body, or a whole block including its delimiters.
    Block,
}

/// A region of the scanned buffer to be replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementSpan {
    pub offset: usize,
    pub length: usize,
    pub key: String,
    pub kind: SpanKind,
}

impl ReplacementSpan {
    pub fn tag(offset: usize, length: usize, key: impl Into<String>) -> Self {
        Self {
            offset,
            length,
            key: key.into(),
            kind: SpanKind::Tag,
        }
    }

    pub fn block(offset: usize, length: usize, key: impl Into<String>) -> Self {
        Self {
            offset,
            length,
            key: key.into(),
            kind: SpanKind::Block,
        }
    }

    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.length)
    }
}

#[derive(Debug, Clone)]
struct Edit {
    span: ReplacementSpan,
    replacement: String,
}

/// Collected edits for one stage.
#[derive(Debug, Clone, Default)]
pub struct EditList {
    edits: Vec<Edit>,
}

impl EditList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete the span.
    pub fn remove(&mut self, span: ReplacementSpan) {
        self.replace(span, String::new());
    }

    /// Replace the span with `replacement`.
    pub fn replace(&mut self, span: ReplacementSpan, replacement: impl Into<String>) {
        self.edits.push(Edit {
            span,
            replacement: replacement.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn spans(&self) -> impl Iterator<Item = &ReplacementSpan> {
        self.edits.iter().map(|e| &e.span)
    }

    /// Rebuild `text` with every edit applied.
    ///
    /// Spans running past the end of the buffer are clamped to it. A span
    /// starting inside text an earlier span already replaced is clipped to
    /// the uncovered remainder, or dropped when nothing remains.
    pub fn apply(mut self, text: &str) -> String {
        if self.edits.is_empty() {
            return text.to_string();
        }
        self.edits.sort_by_key(|e| e.span.offset);

        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;

        for edit in self.edits {
            let start = edit.span.offset.min(text.len());
            let end = edit.span.end().min(text.len());

            if start < cursor && end <= cursor {
                continue;
            }
            let start = start.max(cursor);

            out.push_str(&text[cursor..start]);
            out.push_str(&edit.replacement);
            cursor = end;
        }

        out.push_str(&text[cursor..]);
        out
    }
}
