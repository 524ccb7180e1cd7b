//! View configuration and directory resolution.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::binder::AppCollection;
use crate::error::{ViewError, ViewResult};

/// Default main template file name.
pub const DEFAULT_MAIN_TEMPLATE: &str = "main.html";

/// Default bound on nested include re-scans.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 32;

/// Output minification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MinifyLevel {
    #[default]
    Off,
    /// Trim horizontal whitespace per line and drop HTML comments.
    Trim,
    /// `Trim`, then remove every newline.
    Collapse,
}

impl FromStr for MinifyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" | "0" => Ok(Self::Off),
            "trim" | "1" => Ok(Self::Trim),
            "collapse" | "2" => Ok(Self::Collapse),
            other => Err(format!("invalid minify option '{}'", other)),
        }
    }
}

/// Settings shared by every view of an application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
    /// Root view directory.
    pub view_root: PathBuf,
    /// Root for `{%auto:FILE%}`; the view root when unset.
    pub auto_include_root: Option<PathBuf>,
    /// Append the app name to the view root.
    pub view_root_per_app: bool,
    /// Append the app name to the auto include root.
    pub auto_include_root_per_app: bool,
    /// Main template file name.
    pub main_template: String,
    /// Show full paths in diagnostics.
    pub debug: bool,
    pub minify: MinifyLevel,
    pub max_include_depth: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            view_root: PathBuf::new(),
            auto_include_root: None,
            view_root_per_app: true,
            auto_include_root_per_app: true,
            main_template: DEFAULT_MAIN_TEMPLATE.to_string(),
            debug: false,
            minify: MinifyLevel::Off,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }
}

impl ViewConfig {
    pub fn new(view_root: impl Into<PathBuf>) -> Self {
        Self {
            view_root: view_root.into(),
            ..Self::default()
        }
    }

    /// Load from a TOML, YAML or JSON file, chosen by extension.
    pub fn load(path: impl AsRef<Path>) -> ViewResult<Self> {
        let path = path.as_ref();
        debug!("Loading view config from {:?}", path);
        let content = fs::read_to_string(path)?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let config = match extension {
            "toml" => toml::from_str(&content)?,
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            other => {
                return Err(ViewError::InvalidConfig {
                    path: path.to_path_buf(),
                    message: format!("unsupported config format '{}'", other),
                })
            }
        };
        Ok(config)
    }

    pub fn auto_include_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.auto_include_root = Some(root.into());
        self
    }

    pub fn minify(mut self, level: MinifyLevel) -> Self {
        self.minify = level;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Resolves view and auto include directories for an application.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewDirectories {
    view_root: PathBuf,
    auto_include_root: PathBuf,
    view_root_per_app: bool,
    auto_include_root_per_app: bool,
    app: String,
}

impl ViewDirectories {
    pub fn new(app: impl Into<String>, config: &ViewConfig) -> Self {
        Self {
            view_root: config.view_root.clone(),
            auto_include_root: config
                .auto_include_root
                .clone()
                .unwrap_or_else(|| config.view_root.clone()),
            view_root_per_app: config.view_root_per_app,
            auto_include_root_per_app: config.auto_include_root_per_app,
            app: app.into(),
        }
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn set_app(&mut self, app: impl Into<String>) {
        self.app = app.into();
    }

    /// Set the view root; the auto include root follows it.
    pub fn set_view_root(&mut self, root: impl Into<PathBuf>) {
        self.view_root = root.into();
        self.auto_include_root = self.view_root.clone();
    }

    pub fn set_auto_include_root(&mut self, root: impl Into<PathBuf>) {
        self.auto_include_root = root.into();
    }

    /// View directory of `app`, or of the current app.
    pub fn view_directory(&self, app: Option<&str>) -> PathBuf {
        Self::per_app(&self.view_root, self.view_root_per_app, app, &self.app)
    }

    /// Auto include directory of `app`, or of the current app.
    pub fn auto_include_directory(&self, app: Option<&str>) -> PathBuf {
        Self::per_app(
            &self.auto_include_root,
            self.auto_include_root_per_app,
            app,
            &self.app,
        )
    }

    /// A file in the view directory of the common application.
    pub fn common_file_name(&self, file: &str) -> PathBuf {
        self.application_file_name(AppCollection::COMMON_KEY, file)
    }

    pub fn application_file_name(&self, app: &str, file: &str) -> PathBuf {
        self.view_directory(Some(app)).join(file)
    }

    pub fn current_application_file_name(&self, file: &str) -> PathBuf {
        self.application_file_name(&self.app, file)
    }

    /// Absolute names are used as given; others live in the current app.
    pub fn file_name(&self, base: &str) -> PathBuf {
        if Path::new(base).is_absolute() {
            PathBuf::from(base)
        } else {
            self.current_application_file_name(base)
        }
    }

    fn per_app(root: &Path, per_app: bool, app: Option<&str>, current: &str) -> PathBuf {
        if per_app || app.is_some() {
            root.join(app.unwrap_or(current))
        } else {
            root.to_path_buf()
        }
    }
}

/// How a path appears in inline diagnostics.
pub fn display_path(path: &Path, debug: bool) -> String {
    if debug {
        return path.display().to_string();
    }
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_directories_per_app() {
        let dirs = ViewDirectories::new("shop", &ViewConfig::new("/views"));
        assert_eq!(dirs.view_directory(None), PathBuf::from("/views/shop"));
        assert_eq!(dirs.view_directory(Some("blog")), PathBuf::from("/views/blog"));
        assert_eq!(dirs.common_file_name("nav.html"), PathBuf::from("/views/common/nav.html"));
        assert_eq!(dirs.file_name("/abs/x.html"), PathBuf::from("/abs/x.html"));
        assert_eq!(dirs.file_name("x.html"), PathBuf::from("/views/shop/x.html"));
    }

    #[test]
    fn test_directories_shared_root() {
        let mut config = ViewConfig::new("/views").auto_include_root("/auto");
        config.view_root_per_app = false;
        config.auto_include_root_per_app = false;
        let dirs = ViewDirectories::new("shop", &config);
        assert_eq!(dirs.view_directory(None), PathBuf::from("/views"));
        assert_eq!(dirs.view_directory(Some("blog")), PathBuf::from("/views/blog"));
        assert_eq!(dirs.auto_include_directory(None), PathBuf::from("/auto"));
    }

    #[test]
    fn test_display_path() {
        let path = Path::new("/secret/views/app/header.html");
        assert_eq!(display_path(path, false), "header.html");
        assert_eq!(display_path(path, true), "/secret/views/app/header.html");
    }

    #[test]
    fn test_load_toml_config() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("view.toml");
        fs::write(
            &path,
            "view_root = \"/srv/views\"\nmain_template = \"layout.html\"\nminify = \"collapse\"\n",
        )
        .unwrap();

        let config = ViewConfig::load(&path).unwrap();
        assert_eq!(config.view_root, PathBuf::from("/srv/views"));
        assert_eq!(config.main_template, "layout.html");
        assert_eq!(config.minify, MinifyLevel::Collapse);
        assert!(config.view_root_per_app);
        assert_eq!(config.max_include_depth, DEFAULT_MAX_INCLUDE_DEPTH);
    }

    #[test]
    fn test_minify_level_parse() {
        assert_eq!("Collapse".parse::<MinifyLevel>(), Ok(MinifyLevel::Collapse));
        assert_eq!("1".parse::<MinifyLevel>(), Ok(MinifyLevel::Trim));
        assert!("max".parse::<MinifyLevel>().is_err());
    }

    #[test]
    fn test_load_rejects_unknown_format() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("view.ini");
        fs::write(&path, "x=1").unwrap();
        assert!(matches!(
            ViewConfig::load(&path),
            Err(ViewError::InvalidConfig { .. })
        ));
    }
}
