//! Single-tag substitution against bound records.
//!
//! Lookups never fail: an unbound object or field renders as empty text. App
//! records are the exception, their tags pass through untouched unless the
//! bound record actually carries the field.

use std::collections::{BTreeMap, HashMap};

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::record::{FieldSource, Record};
use crate::scanner::{TagFamily, TagScanner};

/// Object name used by `{%obj:FIELD%}`.
pub const DEFAULT_OBJECT_KEY: &str = "def";

/// Replace every match of `rx` with the field named by its first capture.
pub fn substitute_fields(rx: &Regex, text: &str, source: &dyn FieldSource) -> String {
    rx.replace_all(text, |caps: &Captures| {
        source.field(&caps[1]).unwrap_or_default()
    })
    .into_owned()
}

/// Resolve one `{%ns:KEY%}` family (config, server, system, cookie, meta).
pub fn resolve_namespace(text: &str, family: TagFamily, source: &dyn FieldSource) -> String {
    let scanner = TagScanner::shared();
    if !scanner.contains(text, family) {
        return text.to_string();
    }
    substitute_fields(scanner.regex(family), text, source)
}

/// Resolve `{%obj:NAME:FIELD%}` and `{%obj:FIELD%}` against named objects.
pub fn resolve_objects(text: &str, objects: &HashMap<String, Record>) -> String {
    let rx = TagScanner::shared().regex(TagFamily::Object);
    rx.replace_all(text, |caps: &Captures| {
        let (name, field) = match caps.get(2).map(|m| m.as_str()).filter(|s| !s.is_empty()) {
            Some(field) => (&caps[1], field),
            None => (DEFAULT_OBJECT_KEY, &caps[1]),
        };
        objects
            .get(name)
            .and_then(|obj| obj.field(field))
            .unwrap_or_default()
    })
    .into_owned()
}

/// Application records addressable as `{%app:KEY:FIELD%}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppCollection {
    apps: BTreeMap<String, Record>,
}

impl AppCollection {
    /// Key of the application shared by every other one.
    pub const COMMON_KEY: &'static str = "common";
    /// Key of the application serving the current request.
    pub const CURRENT_KEY: &'static str = "current";
    /// How templates spell [`Self::CURRENT_KEY`].
    pub const CURRENT_TAG_KEY: &'static str = "curr";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, app: Record) -> Self {
        self.insert(key, app);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, app: Record) {
        self.apps.insert(key.into(), app);
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.apps.get(key)
    }

    pub fn common(&self) -> Option<&Record> {
        self.get(Self::COMMON_KEY)
    }

    pub fn current(&self) -> Option<&Record> {
        self.get(Self::CURRENT_KEY)
    }

    /// Find an application by its numeric `id` field.
    pub fn get_by_id(&self, id: i64) -> Option<&Record> {
        self.apps
            .values()
            .find(|app| app.get("id").and_then(|v| v.as_i64()) == Some(id))
    }

    /// Find an application by its string `xid` field.
    pub fn get_by_xid(&self, xid: &str) -> Option<&Record> {
        self.apps
            .values()
            .find(|app| app.get("xid").and_then(|v| v.as_str()) == Some(xid))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Record)> {
        self.apps.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

/// Substitute every `{%app:KEY:FIELD%}` the bound records can satisfy.
///
/// Tags are built from the fields each record reports, so a template may
/// reference any field without it being declared up front.
pub fn resolve_apps(text: &str, apps: &AppCollection) -> String {
    if apps.is_empty() || !TagScanner::shared().contains(text, TagFamily::App) {
        return text.to_string();
    }

    let mut result = text.to_string();
    let mut replaced = 0;
    for (key, app) in apps.iter() {
        let tag_key = if key == AppCollection::CURRENT_KEY {
            AppCollection::CURRENT_TAG_KEY
        } else {
            key.as_str()
        };

        for field in app.field_names() {
            let pattern = format!("{{%app:{}:{}%}}", tag_key, field);
            if result.contains(&pattern) {
                let value = app.field(&field).unwrap_or_default();
                result = result.replace(&pattern, &value);
                replaced += 1;
            }
        }
    }

    debug!("App records: {} tag(s) substituted", replaced);
    result
}
