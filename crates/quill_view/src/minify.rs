//! Whitespace and comment stripping. Runs after every other stage.

use std::sync::OnceLock;

use regex::Regex;

use crate::config::MinifyLevel;

struct Patterns {
    leading: Regex,
    trailing: Regex,
    comment: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        leading: Regex::new(r"(?m)^[\t ]+").expect("valid leading whitespace pattern"),
        trailing: Regex::new(r"(?m)[\t ]+$").expect("valid trailing whitespace pattern"),
        comment: Regex::new(r"(?s)<!--.*?-->").expect("valid comment pattern"),
    })
}

/// Minify `text` at `level`.
pub fn minify(text: &str, level: MinifyLevel) -> String {
    if level == MinifyLevel::Off {
        return text.to_string();
    }

    let p = patterns();
    let out = p.leading.replace_all(text, "");
    let out = p.trailing.replace_all(&out, "");
    let out = p.comment.replace_all(&out, "").into_owned();

    match level {
        MinifyLevel::Collapse => out.replace(|c: char| c == '\n' || c == '\r', ""),
        _ => out,
    }
}
