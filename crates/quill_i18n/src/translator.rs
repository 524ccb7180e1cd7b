//! Locale-aware lookup with a fallback locale and domain.

use std::path::Path;

use quill_view::{missing_marker, TranslationSource};
use tracing::{debug, warn};

use crate::catalog::{CatalogSet, Messages};
use crate::error::I18nResult;

/// Locale used when nothing better is known.
pub const DEFAULT_LOCALE: &str = "en_US";

/// Catalog domain used when none is named.
pub const DEFAULT_DOMAIN: &str = "main";

/// Translates message keys for one active locale and domain.
#[derive(Debug, Clone)]
pub struct Translator {
    catalogs: CatalogSet,
    locale: String,
    domain: String,
    fallback_locale: String,
    fallback_domain: String,
}

impl Translator {
    /// Build a translator over already loaded catalogs.
    pub fn new(catalogs: CatalogSet) -> Self {
        let mut translator = Self {
            catalogs,
            locale: DEFAULT_LOCALE.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            fallback_locale: DEFAULT_LOCALE.to_string(),
            fallback_domain: DEFAULT_DOMAIN.to_string(),
        };
        translator.set_locale(DEFAULT_LOCALE, DEFAULT_DOMAIN);
        translator
    }

    /// Load catalogs from a translation root directory.
    pub fn open(root: impl AsRef<Path>) -> I18nResult<Self> {
        Ok(Self::new(CatalogSet::load(root)?))
    }

    /// Add messages for a locale and domain.
    pub fn insert_catalog(&mut self, locale: &str, domain: &str, messages: Messages) {
        self.catalogs.insert(locale, domain, messages);
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn fallback_locale(&self) -> &str {
        &self.fallback_locale
    }

    pub fn supported_locales(&self) -> &[String] {
        self.catalogs.locales()
    }

    /// Activate `locale` and `domain`.
    ///
    /// An unsupported locale is matched on its language prefix (`es` finds
    /// `es_MX`); failing that the fallback locale is used.
    pub fn set_locale(&mut self, locale: &str, domain: &str) -> bool {
        self.locale = self.supported_locale(locale);
        self.domain = domain.to_lowercase();
        debug!("Locale set to {}/{}", self.locale, self.domain);
        true
    }

    /// Locale and domain consulted when the active ones miss a key.
    pub fn set_fallback_locale(&mut self, locale: &str, domain: &str) {
        self.fallback_locale = self.supported_locale(locale);
        self.fallback_domain = domain.to_lowercase();
    }

    /// Pick a locale from an exact preset or an `Accept-Language` header.
    ///
    /// Returns `false` and leaves the locale unchanged when neither yields a
    /// supported locale.
    pub fn set_auto_locale(&mut self, preset: Option<&str>, accept_language: Option<&str>) -> bool {
        if let Some(preset) = preset.filter(|p| !p.is_empty()) {
            if self.matched_locale(preset).as_deref() == Some(preset) {
                return self.set_locale(preset, DEFAULT_DOMAIN);
            }
        }

        let Some(header) = accept_language.filter(|h| !h.is_empty()) else {
            return false;
        };

        let languages = header.split(';').next().unwrap_or_default();
        for language in languages.split(',') {
            let candidate = language.trim().replace('-', "_");
            if let Some(locale) = self.matched_locale(&candidate) {
                return self.set_locale(&locale, DEFAULT_DOMAIN);
            }
        }

        warn!("No supported locale in Accept-Language '{}'", header);
        false
    }

    /// Translate `key`, trying the fallback locale on a miss. Returns the key
    /// itself when neither knows it.
    pub fn get(&self, key: &str) -> String {
        if let Some(text) = self.catalogs.lookup(&self.locale, &self.domain, key) {
            return text.to_string();
        }
        if self.locale != self.fallback_locale || self.domain != self.fallback_domain {
            if let Some(text) =
                self.catalogs
                    .lookup(&self.fallback_locale, &self.fallback_domain, key)
            {
                return text.to_string();
            }
        }
        key.to_string()
    }

    /// Translate `key`; on a miss return `fallback`, or a visible marker
    /// when no fallback is given. Pass `Some("")` for empty output.
    pub fn get_or(&self, key: &str, fallback: Option<&str>) -> String {
        let translated = self.get(key);
        if translated == key {
            fallback.map(String::from).unwrap_or_else(|| missing_marker(key))
        } else {
            translated
        }
    }

    /// Plural form using `key` and `key + "s"` as singular and plural keys.
    pub fn get_plural(&self, key: &str, count: i64) -> String {
        self.get_plurals(key, &format!("{}s", key), count)
    }

    /// Singular key for a count of one, plural key otherwise; `%d` in the
    /// translation is replaced by the count.
    pub fn get_plurals(&self, singular: &str, plural: &str, count: i64) -> String {
        let key = if count == 1 { singular } else { plural };
        self.get(key).replace("%d", &count.to_string())
    }

    fn supported_locale(&self, requested: &str) -> String {
        self.matched_locale(requested).unwrap_or_else(|| {
            if !requested.is_empty() && requested != self.fallback_locale {
                warn!(
                    "Locale '{}' is not supported, using {}",
                    requested, self.fallback_locale
                );
            }
            self.fallback_locale.clone()
        })
    }

    fn matched_locale(&self, requested: &str) -> Option<String> {
        if requested.is_empty() {
            return None;
        }
        let supported = self.catalogs.locales();
        if supported.iter().any(|l| l == requested) {
            return Some(requested.to_string());
        }

        let prefix: String = requested.chars().take(2).collect::<String>().to_lowercase();
        supported
            .iter()
            .find(|l| l.chars().take(2).collect::<String>() == prefix)
            .cloned()
    }
}

impl TranslationSource for Translator {
    fn get_with_fallback(&self, key: &str) -> String {
        self.get_or(key, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(pairs: &[(&str, &str)]) -> Messages {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn translator() -> Translator {
        let mut catalogs = CatalogSet::new();
        catalogs.insert(
            "en_US",
            "main",
            messages(&[
                ("hello", "Hello"),
                ("x", "Ex"),
                ("item", "%d item"),
                ("items", "%d items"),
            ]),
        );
        catalogs.insert("fr_FR", "main", messages(&[("hello", "Bonjour")]));
        catalogs.insert("es_MX", "main", messages(&[("hello", "Hola")]));
        Translator::new(catalogs)
    }

    #[test]
    fn test_defaults() {
        let t = translator();
        assert_eq!(t.locale(), "en_US");
        assert_eq!(t.domain(), "main");
        assert_eq!(t.get("hello"), "Hello");
    }

    #[test]
    fn test_fallback_locale_on_miss() {
        let mut t = translator();
        t.set_locale("fr_FR", "main");
        assert_eq!(t.get("hello"), "Bonjour");
        assert_eq!(t.get("x"), "Ex");
        assert_eq!(t.get_with_fallback("y"), "[y missing]");
        assert_eq!(t.get_or("y", Some("")), "");
    }

    #[test]
    fn test_fuzzy_and_unknown_locales() {
        let mut t = translator();
        t.set_locale("es", "main");
        assert_eq!(t.locale(), "es_MX");
        t.set_locale("ja_JP", "main");
        assert_eq!(t.locale(), "en_US");
    }

    #[test]
    fn test_auto_locale() {
        let mut t = translator();
        assert!(t.set_auto_locale(Some("fr_FR"), None));
        assert_eq!(t.locale(), "fr_FR");

        assert!(t.set_auto_locale(Some("xx"), Some("de-DE,es-AR;q=0.9")));
        assert_eq!(t.locale(), "es_MX");

        assert!(!t.set_auto_locale(None, Some("de-DE;q=1")));
        assert_eq!(t.locale(), "es_MX");
        assert!(!t.set_auto_locale(None, None));
    }

    #[test]
    fn test_plurals() {
        let t = translator();
        assert_eq!(t.get_plural("item", 1), "1 item");
        assert_eq!(t.get_plural("item", 3), "3 items");
    }
}
