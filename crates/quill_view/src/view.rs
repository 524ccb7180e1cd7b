//! The view: one render's bindings and the merge pipeline.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::binder::{
    resolve_apps, resolve_namespace, resolve_objects, AppCollection, DEFAULT_OBJECT_KEY,
};
use crate::conditional::resolve_conditionals;
use crate::config::{display_path, MinifyLevel, ViewConfig, ViewDirectories};
use crate::error::{ViewError, ViewResult};
use crate::include::IncludeContext;
use crate::language::{resolve_language, TranslationSource};
use crate::looping::{resolve_loops, LoopBinding, LoopControl};
use crate::minify::minify;
use crate::record::Record;
use crate::scanner::TagFamily;
use crate::script::inject_scripts;
use crate::source::{FsTemplateSource, TemplateSource};

/// Section key the rendered page body is registered under.
pub const DEFAULT_SECTION_KEY: &str = "main1";

/// Placeholder in meta titles and descriptions replaced by the product title.
pub const TITLE_PLACEHOLDER: &str = "[title]";

/// Request-level data passed explicitly into a render.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Bindings {
    /// `{%cfg:KEY%}`
    pub config: Record,
    /// `{%svr:KEY%}`
    pub server: Record,
    /// `{%sys:KEY%}`
    pub system: Record,
    /// `{%cook:KEY%}`
    pub cookies: Record,
    /// `{%app:KEY:FIELD%}`
    pub apps: AppCollection,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: Record) -> Self {
        self.config = config;
        self
    }

    pub fn with_server(mut self, server: Record) -> Self {
        self.server = server;
        self
    }

    pub fn with_system(mut self, system: Record) -> Self {
        self.system = system;
        self
    }

    pub fn with_cookies(mut self, cookies: Record) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn with_apps(mut self, apps: AppCollection) -> Self {
        self.apps = apps;
        self
    }
}

/// Merge stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    KeyedIncludes,
    AutoIncludes,
    Conditionals,
    Loops,
    Apps,
    Objects,
    Config,
    Server,
    System,
    Cookies,
    Meta,
    Language,
    Scripts,
}

impl Stage {
    pub const ORDER: [Stage; 13] = [
        Stage::KeyedIncludes,
        Stage::AutoIncludes,
        Stage::Conditionals,
        Stage::Loops,
        Stage::Apps,
        Stage::Objects,
        Stage::Config,
        Stage::Server,
        Stage::System,
        Stage::Cookies,
        Stage::Meta,
        Stage::Language,
        Stage::Scripts,
    ];
}

/// A template view.
///
/// Holds everything one render needs: where templates live, which sections
/// are included, and the data bound to conditional, loop, object and meta
/// tags. Clones are fully independent.
#[derive(Clone)]
pub struct View {
    directories: ViewDirectories,
    main_template: String,
    debug: bool,
    minify: MinifyLevel,
    max_include_depth: usize,
    source: Arc<dyn TemplateSource>,
    translator: Option<Arc<dyn TranslationSource>>,
    product_title: String,
    scripts: Vec<String>,
    objects: HashMap<String, Record>,
    loops: HashMap<String, LoopBinding>,
    includes: HashMap<String, String>,
    conditionals: HashMap<String, bool>,
    meta: Record,
}

impl View {
    /// Create a view for `app`, reading templates from the filesystem.
    pub fn new(app: impl Into<String>, config: &ViewConfig) -> Self {
        Self {
            directories: ViewDirectories::new(app, config),
            main_template: config.main_template.clone(),
            debug: config.debug,
            minify: config.minify,
            max_include_depth: config.max_include_depth,
            source: Arc::new(FsTemplateSource),
            translator: None,
            product_title: String::new(),
            scripts: Vec::new(),
            objects: HashMap::new(),
            loops: HashMap::new(),
            includes: HashMap::new(),
            conditionals: HashMap::new(),
            meta: Record::new(),
        }
    }

    /// Replace the template source.
    pub fn with_source(mut self, source: Arc<dyn TemplateSource>) -> Self {
        self.source = source;
        self
    }

    /// A copy sharing directories, options and translations, with every
    /// binding reset and, when given, a different main template.
    pub fn derive(&self, template: Option<&str>) -> Self {
        let mut view = self.clone();
        view.scripts.clear();
        view.objects.clear();
        view.loops.clear();
        view.includes.clear();
        view.conditionals.clear();
        view.meta = Record::new();
        if let Some(template) = template {
            view.set_template_file(template);
        }
        view
    }

    // ---- translation ----

    pub fn set_translation_source(&mut self, source: Arc<dyn TranslationSource>) {
        self.translator = Some(source);
    }

    pub fn translation_source(&self) -> Option<&Arc<dyn TranslationSource>> {
        self.translator.as_ref()
    }

    pub fn is_translator_aware(&self) -> bool {
        self.translator.is_some()
    }

    // ---- directories and templates ----

    pub fn directories(&self) -> &ViewDirectories {
        &self.directories
    }

    /// Set the root view directory; the auto include root follows it.
    pub fn set_root_view_dir(&mut self, root: impl Into<PathBuf>) -> &mut Self {
        self.directories.set_view_root(root);
        self
    }

    pub fn set_root_auto_include_dir(&mut self, root: impl Into<PathBuf>) -> &mut Self {
        self.directories.set_auto_include_root(root);
        self
    }

    pub fn set_application(&mut self, app: impl Into<String>) -> &mut Self {
        self.directories.set_app(app);
        self
    }

    pub fn set_template_file(&mut self, template: impl Into<String>) -> &mut Self {
        self.main_template = template.into();
        self
    }

    pub fn main_template(&self) -> &str {
        &self.main_template
    }

    pub fn set_debug(&mut self, debug: bool) -> &mut Self {
        self.debug = debug;
        self
    }

    pub fn set_minify(&mut self, level: MinifyLevel) -> &mut Self {
        self.minify = level;
        self
    }

    // ---- metadata ----

    pub fn set_product_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.product_title = title.into();
        self
    }

    /// Set `{%meta:title%}`; `[title]` is replaced by the product title.
    pub fn set_meta_title(&mut self, title: &str) -> &mut Self {
        let value = title.replace(TITLE_PLACEHOLDER, &self.product_title);
        self.meta.set("title", value);
        self
    }

    /// Set `{%meta:description%}`; `[title]` is replaced by the product title.
    pub fn set_meta_description(&mut self, description: &str) -> &mut Self {
        let value = description.replace(TITLE_PLACEHOLDER, &self.product_title);
        self.meta.set("description", value);
        self
    }

    pub fn set_meta_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.meta.set(key, value.into());
    }

    pub fn meta(&self) -> &Record {
        &self.meta
    }

    // ---- bindings ----

    /// Register `file` as the content of `{%inc:KEY%}`.
    pub fn include_file(&mut self, key: &str, file: &str) -> ViewResult<()> {
        if key.is_empty() || file.is_empty() {
            return Err(ViewError::InvalidInclude {
                key: key.to_string(),
            });
        }
        self.includes.insert(key.to_string(), file.to_string());
        Ok(())
    }

    pub fn make_conditional(&mut self, key: impl Into<String>, condition: bool) {
        self.conditionals.insert(key.into(), condition);
    }

    /// Bind an object for `{%obj:…%}` tags; `None` binds the default object.
    pub fn insert_object(&mut self, object: Record, key: Option<&str>) {
        let key = key.filter(|k| !k.is_empty()).unwrap_or(DEFAULT_OBJECT_KEY);
        self.objects.insert(key.to_string(), object);
    }

    /// Bind a collection to `{%loop:KEY%}`.
    pub fn insert_loop(&mut self, items: Vec<Record>, key: impl Into<String>) {
        self.loops.insert(key.into(), LoopBinding::new(items));
    }

    /// Bind a collection with a per-element filter.
    pub fn insert_loop_with<F>(&mut self, items: Vec<Record>, key: impl Into<String>, filter: F)
    where
        F: Fn(&mut Record) -> LoopControl + Send + Sync + 'static,
    {
        self.loops
            .insert(key.into(), LoopBinding::new(items).with_filter(filter));
    }

    /// Register a script URL injected before `</head>`.
    pub fn add_script(&mut self, url: impl Into<String>) {
        self.scripts.push(url.into());
    }

    // ---- render ----

    /// Register `file` as the page body and present the main template.
    pub fn render(&mut self, file: &str, bindings: &Bindings) -> ViewResult<String> {
        self.include_file(DEFAULT_SECTION_KEY, file)?;
        self.present(bindings)
    }

    /// Load the main template, merge it and apply minification.
    pub fn present(&self, bindings: &Bindings) -> ViewResult<String> {
        let path = self.directories.file_name(&self.main_template);
        let template = self.source.load(&path).ok_or_else(|| ViewError::TemplateNotFound {
            path: display_path(&path, self.debug),
        })?;

        info!("Presenting {:?} for app '{}'", path, self.directories.app());
        let merged = self.merge(&template, bindings);
        Ok(minify(&merged, self.minify))
    }

    /// Run every merge stage over already loaded template text.
    pub fn merge(&self, template: &str, bindings: &Bindings) -> String {
        let includes = IncludeContext {
            source: self.source.as_ref(),
            directories: &self.directories,
            debug: self.debug,
            max_depth: self.max_include_depth,
        };
        let mut conditionals = self.conditionals.clone();
        let mut text = template.to_string();

        for stage in Stage::ORDER {
            text = match stage {
                Stage::KeyedIncludes => includes.resolve_keyed(&text, &self.includes),
                Stage::AutoIncludes => includes.resolve_auto(&text),
                Stage::Conditionals => resolve_conditionals(&text, &mut conditionals),
                Stage::Loops => resolve_loops(&text, &self.loops),
                Stage::Apps => resolve_apps(&text, &bindings.apps),
                Stage::Objects => resolve_objects(&text, &self.objects),
                Stage::Config => resolve_namespace(&text, TagFamily::Config, &bindings.config),
                Stage::Server => resolve_namespace(&text, TagFamily::Server, &bindings.server),
                Stage::System => resolve_namespace(&text, TagFamily::System, &bindings.system),
                Stage::Cookies => resolve_namespace(&text, TagFamily::Cookie, &bindings.cookies),
                Stage::Meta => resolve_namespace(&text, TagFamily::Meta, &self.meta),
                Stage::Language => resolve_language(&text, self.translator.as_deref()),
                Stage::Scripts => inject_scripts(&text, &self.scripts),
            };
            debug!("Stage {:?}: {} bytes", stage, text.len());
        }

        text
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("directories", &self.directories)
            .field("main_template", &self.main_template)
            .field("minify", &self.minify)
            .field("includes", &self.includes)
            .field("conditionals", &self.conditionals)
            .field("loops", &self.loops)
            .field("objects", &self.objects)
            .field("scripts", &self.scripts)
            .field("translator", &self.translator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryTemplateSource;

    fn view(source: MemoryTemplateSource) -> View {
        View::new("shop", &ViewConfig::new("/views")).with_source(Arc::new(source))
    }

    #[test]
    fn test_scenario_conditional_with_default_object() {
        let mut v = view(MemoryTemplateSource::new());
        v.make_conditional("show", true);
        v.insert_object(Record::new().with("name", "Ann"), None);
        let out = v.merge("<p>{%if:show%}Hello {%obj:name%}{%if:show%}</p>", &Bindings::new());
        assert_eq!(out, "<p>Hello Ann</p>");
    }

    #[test]
    fn test_meta_title_uses_product_title() {
        let mut v = view(MemoryTemplateSource::new());
        v.set_product_title("Quill").set_meta_title("Welcome to [title]");
        v.set_meta_description("[title] renders views");
        let out = v.merge("{%meta:title%} / {%meta:description%}", &Bindings::new());
        assert_eq!(out, "Welcome to Quill / Quill renders views");
    }

    #[test]
    fn test_include_file_rejects_empty() {
        let mut v = view(MemoryTemplateSource::new());
        assert!(matches!(
            v.include_file("", "x.html"),
            Err(ViewError::InvalidInclude { .. })
        ));
        assert!(v.include_file("side", "").is_err());
    }

    #[test]
    fn test_present_missing_main_is_fatal() {
        let v = view(MemoryTemplateSource::new());
        let err = v.present(&Bindings::new()).unwrap_err();
        assert_eq!(err.to_string(), "Template file: main.html not found");
    }

    #[test]
    fn test_derive_resets_bindings() {
        let mut v = view(MemoryTemplateSource::new());
        v.make_conditional("a", true);
        v.add_script("/x.js");
        v.set_meta_value("k", "v");

        let derived = v.derive(Some("other.html"));
        assert_eq!(derived.main_template(), "other.html");
        assert_eq!(v.main_template(), "main.html");
        assert!(derived.meta().is_empty());
        assert_eq!(derived.merge("{%if:a%}x{%if:a%}", &Bindings::new()), "");
        assert_eq!(v.merge("{%if:a%}x{%if:a%}", &Bindings::new()), "x");
    }
}
