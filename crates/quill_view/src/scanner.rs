//! Tag scanning.
//!
//! Every tag family has one fixed pattern. A scan is a pure function of the
//! current buffer: it returns non-overlapping occurrences in document order
//! with their byte offsets, so any stage can re-scan after the buffer changed.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// The closed set of tag families a template may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagFamily {
    /// `{%inc:KEY%}`
    Include,
    /// `{%auto:FILE%}`
    Auto,
    /// `{%if:KEY%}`
    Conditional,
    /// `{%loop:KEY%}`
    Loop,
    /// `{%cfg:KEY%}`
    Config,
    /// `{%meta:KEY%}`
    Meta,
    /// `{%svr:KEY%}`
    Server,
    /// `{%sys:KEY%}`
    System,
    /// `{%cook:KEY%}`
    Cookie,
    /// `{%obj:KEY:FIELD%}` or `{%obj:FIELD%}`
    Object,
    /// `{%lang:KEY%}`
    Language,
    /// `{%app:APPKEY:FIELD%}`
    App,
}

impl TagFamily {
    pub const ALL: [TagFamily; 12] = [
        TagFamily::Include,
        TagFamily::Auto,
        TagFamily::Conditional,
        TagFamily::Loop,
        TagFamily::Config,
        TagFamily::Meta,
        TagFamily::Server,
        TagFamily::System,
        TagFamily::Cookie,
        TagFamily::Object,
        TagFamily::Language,
        TagFamily::App,
    ];

    /// The family name as spelled inside a tag.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Include => "inc",
            Self::Auto => "auto",
            Self::Conditional => "if",
            Self::Loop => "loop",
            Self::Config => "cfg",
            Self::Meta => "meta",
            Self::Server => "svr",
            Self::System => "sys",
            Self::Cookie => "cook",
            Self::Object => "obj",
            Self::Language => "lang",
            Self::App => "app",
        }
    }

    fn pattern(&self) -> &'static str {
        match self {
            Self::Include => r"\{%inc:([a-zA-Z0-9]*)%\}",
            Self::Auto => r"\{%auto:([a-zA-Z0-9_.\-]*)%\}",
            Self::Conditional => r"\{%if:([a-zA-Z0-9]*)%\}",
            Self::Loop => r"\{%loop:([a-zA-Z0-9]*)%\}",
            Self::Config => r"\{%cfg:([a-zA-Z0-9_]*)%\}",
            Self::Meta => r"\{%meta:([a-zA-Z0-9_]*)%\}",
            Self::Server => r"\{%svr:([a-zA-Z0-9_]*)%\}",
            Self::System => r"\{%sys:([a-zA-Z0-9_]*)%\}",
            Self::Cookie => r"\{%cook:([a-zA-Z0-9_]*)%\}",
            Self::Object => r"\{%obj:([a-zA-Z0-9_]*):?([a-zA-Z0-9_]*)%\}",
            Self::Language => r"\{%lang:([a-zA-Z0-9_?.]*)%\}",
            Self::App => r"\{%app:([a-zA-Z0-9_]*):([a-zA-Z0-9_]*)%\}",
        }
    }
}

impl fmt::Display for TagFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// One match of a tag pattern in the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagOccurrence {
    /// The complete tag text, e.g. `{%if:show%}`.
    pub full_text: String,
    /// First capture.
    pub key: String,
    /// Second capture for two-part families, when non-empty.
    pub field: Option<String>,
    /// Byte offset of the tag in the scanned buffer.
    pub offset: usize,
    /// Byte length of the tag.
    pub length: usize,
    /// Set by the pair matcher once this occurrence closed a block.
    #[serde(skip)]
    pub consumed: bool,
}

impl TagOccurrence {
    /// Offset one past the end of the tag.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Compiled tag patterns.
pub struct TagScanner {
    patterns: HashMap<TagFamily, Regex>,
}

impl TagScanner {
    /// Compile every family pattern.
    pub fn new() -> Self {
        let patterns = TagFamily::ALL
            .iter()
            .map(|family| {
                let rx = Regex::new(family.pattern()).expect("tag family pattern is valid");
                (*family, rx)
            })
            .collect();
        Self { patterns }
    }

    /// Process-wide scanner; patterns are compiled once.
    pub fn shared() -> &'static TagScanner {
        static SCANNER: OnceLock<TagScanner> = OnceLock::new();
        SCANNER.get_or_init(TagScanner::new)
    }

    /// The compiled pattern of a family.
    pub fn regex(&self, family: TagFamily) -> &Regex {
        &self.patterns[&family]
    }

    /// Find every occurrence of `family` in `text`, left to right.
    pub fn scan(&self, text: &str, family: TagFamily) -> Vec<TagOccurrence> {
        scan_with(self.regex(family), text)
    }

    /// Whether `text` still holds at least one tag of `family`.
    pub fn contains(&self, text: &str, family: TagFamily) -> bool {
        self.regex(family).is_match(text)
    }

    /// Every occurrence of every family, ordered by offset.
    pub fn scan_all(&self, text: &str) -> Vec<(TagFamily, TagOccurrence)> {
        let mut all: Vec<(TagFamily, TagOccurrence)> = TagFamily::ALL
            .iter()
            .flat_map(|family| {
                self.scan(text, *family)
                    .into_iter()
                    .map(move |occ| (*family, occ))
            })
            .collect();
        all.sort_by_key(|(_, occ)| occ.offset);
        all
    }
}

impl Default for TagScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Pattern for the per-element placeholders of a loop: `{%KEY:FIELD%}`.
pub fn loop_field_pattern(key: &str) -> Regex {
    let pattern = format!(r"\{{%{}:([a-zA-Z0-9_]*)%\}}", regex::escape(key));
    Regex::new(&pattern).expect("escaped loop key forms a valid pattern")
}

/// Scan `text` with an arbitrary one- or two-capture pattern.
pub fn scan_with(rx: &Regex, text: &str) -> Vec<TagOccurrence> {
    rx.captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let key = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let field = caps
                .get(2)
                .map(|m| m.as_str())
                .filter(|s| !s.is_empty())
                .map(String::from);
            Some(TagOccurrence {
                full_text: whole.as_str().to_string(),
                key: key.to_string(),
                field,
                offset: whole.start(),
                length: whole.len(),
                consumed: false,
            })
        })
        .collect()
}
