//! Translation catalogs on disk.
//!
//! Layout: `<root>/<locale>/<domain>.yaml` (or `.yml` / `.json`), each file a
//! flat map of message key to translated text. Every sub-directory of the
//! root is a supported locale, even when it holds no catalog yet.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{I18nError, I18nResult};

/// Messages of one locale and domain.
pub type Messages = HashMap<String, String>;

/// All catalogs found under a translation root.
#[derive(Debug, Clone, Default)]
pub struct CatalogSet {
    locales: Vec<String>,
    catalogs: BTreeMap<(String, String), Messages>,
}

impl CatalogSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every locale directory and catalog file under `root`.
    pub fn load(root: impl AsRef<Path>) -> I18nResult<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(I18nError::NotFound(root.to_path_buf()));
        }

        let mut set = Self::new();
        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !entry.file_type().is_dir() || name.starts_with('.') {
                continue;
            }
            set.add_locale(&name);
            set.load_locale(&name, entry.path())?;
        }

        debug!(
            "Loaded {} catalog(s) for {} locale(s) from {:?}",
            set.catalogs.len(),
            set.locales.len(),
            root
        );
        Ok(set)
    }

    fn load_locale(&mut self, locale: &str, dir: &Path) -> I18nResult<()> {
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(domain) = path.file_stem().map(|s| s.to_string_lossy().to_lowercase()) else {
                continue;
            };
            match read_messages(path)? {
                Some(messages) => self.insert(locale, &domain, messages),
                None => debug!("Skipping non-catalog file {:?}", path),
            }
        }
        Ok(())
    }

    /// Register a locale without messages.
    pub fn add_locale(&mut self, locale: &str) {
        if !self.locales.iter().any(|l| l == locale) {
            self.locales.push(locale.to_string());
        }
    }

    /// Add (or extend) the catalog of `locale` / `domain`.
    pub fn insert(&mut self, locale: &str, domain: &str, messages: Messages) {
        self.add_locale(locale);
        self.catalogs
            .entry((locale.to_string(), domain.to_lowercase()))
            .or_default()
            .extend(messages);
    }

    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    /// Look up `key`; `None` when the catalog or the key is missing.
    pub fn lookup(&self, locale: &str, domain: &str, key: &str) -> Option<&str> {
        self.catalogs
            .get(&(locale.to_string(), domain.to_string()))
            .and_then(|messages| messages.get(key))
            .map(String::as_str)
    }
}

/// Parse one catalog file. `Ok(None)` for files that are not catalogs.
///
/// Numbers and booleans are kept as their text; nested maps and lists are
/// skipped.
fn read_messages(path: &Path) -> I18nResult<Option<Messages>> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let parse = |content: &str| -> I18nResult<Messages> {
        let entries: BTreeMap<String, Value> = match extension {
            "json" => serde_json::from_str(content)?,
            _ => serde_yaml::from_str(content)?,
        };
        Ok(entries
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::String(text) => Some((key, text)),
                Value::Number(n) => Some((key, n.to_string())),
                Value::Bool(b) => Some((key, b.to_string())),
                Value::Null => Some((key, String::new())),
                Value::Array(_) | Value::Object(_) => {
                    warn!("Skipping non-scalar message '{}' in {:?}", key, path);
                    None
                }
            })
            .collect())
    };

    if !matches!(extension, "yaml" | "yml" | "json") {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        warn!("Empty catalog {:?}", path);
        return Ok(Some(Messages::new()));
    }
    parse(&content).map(Some).map_err(|e| I18nError::InvalidCatalog {
        path: PathBuf::from(path),
        message: e.to_string(),
    })
}
