//! Translated strings: `{%lang:KEY%}`.

use regex::Captures;

use crate::scanner::{TagFamily, TagScanner};

/// A source of translated strings.
pub trait TranslationSource: Send + Sync {
    /// Translate `key` in the active locale, retrying the fallback locale on
    /// a miss. When both miss, return [`missing_marker`] for the key.
    fn get_with_fallback(&self, key: &str) -> String;
}

/// The visible text rendered for an untranslated key.
pub fn missing_marker(key: &str) -> String {
    format!("[{} missing]", key)
}

/// Resolve every language tag.
///
/// Without a translation source all language tags render as empty text.
pub fn resolve_language(text: &str, source: Option<&dyn TranslationSource>) -> String {
    let rx = TagScanner::shared().regex(TagFamily::Language);
    if !rx.is_match(text) {
        return text.to_string();
    }

    rx.replace_all(text, |caps: &Captures| match source {
        Some(source) => source.get_with_fallback(&caps[1]),
        None => String::new(),
    })
    .into_owned()
}
