//! Render command - Merge a template with bound data.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use serde::Deserialize;
use tracing::info;

use quill_i18n::{Translator, DEFAULT_DOMAIN};
use quill_view::{Bindings, MinifyLevel, Record, View, ViewConfig};

use super::context;

#[derive(Args)]
pub struct RenderArgs {
    /// Main template file
    template: PathBuf,

    /// Bindings file (YAML or JSON)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// View configuration file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Application name used for per-app view directories
    #[arg(long, default_value = "app")]
    app: String,

    /// Page body registered as {%inc:main1%}
    #[arg(long)]
    page: Option<String>,

    /// Translation catalog root
    #[arg(long)]
    translations: Option<PathBuf>,

    /// Locale to activate (requires --translations)
    #[arg(long, requires = "translations")]
    locale: Option<String>,

    /// Minification: off, trim or collapse
    #[arg(long, value_parser = parse_minify)]
    minify: Option<MinifyLevel>,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Everything a bindings file can bind.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenderData {
    pub includes: HashMap<String, String>,
    pub conditionals: HashMap<String, bool>,
    pub loops: HashMap<String, Vec<Record>>,
    pub objects: HashMap<String, Record>,
    pub meta: HashMap<String, String>,
    pub product_title: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub scripts: Vec<String>,
    #[serde(flatten)]
    pub bindings: Bindings,
}

impl RenderData {
    /// Load a YAML or JSON bindings file, chosen by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("{}: {}", context::BINDINGS_NOT_FOUND, path.display()))?;
        let data = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("{} (JSON) in {}", context::INVALID_BINDINGS, path.display()))?,
            _ => serde_yaml::from_str(&content)
                .with_context(|| format!("{} (YAML) in {}", context::INVALID_BINDINGS, path.display()))?,
        };
        Ok(data)
    }

    /// Move the per-view bindings onto `view`, returning request bindings.
    pub fn apply(self, view: &mut View) -> Result<Bindings> {
        for (key, file) in &self.includes {
            view.include_file(key, file)?;
        }
        for (key, condition) in self.conditionals {
            view.make_conditional(key, condition);
        }
        for (key, items) in self.loops {
            view.insert_loop(items, key);
        }
        for (key, object) in self.objects {
            view.insert_object(object, Some(&key));
        }
        if let Some(title) = &self.product_title {
            view.set_product_title(title.as_str());
        }
        if let Some(title) = &self.meta_title {
            view.set_meta_title(title);
        }
        if let Some(description) = &self.meta_description {
            view.set_meta_description(description);
        }
        for (key, value) in self.meta {
            view.set_meta_value(key, value);
        }
        for script in self.scripts {
            view.add_script(script);
        }
        Ok(self.bindings)
    }
}

fn parse_minify(s: &str) -> Result<MinifyLevel, String> {
    s.parse()
}

/// System variables available as `{%sys:KEY%}`.
fn system_variables() -> Record {
    let now = Local::now();
    Record::new()
        .with("date", now.format("%Y-%m-%d").to_string())
        .with("time", now.format("%H:%M:%S").to_string())
        .with("year", now.format("%Y").to_string())
        .with("version", env!("CARGO_PKG_VERSION"))
}

/// Build the view for a main template.
///
/// Without a configured view root the template's own directory serves as a
/// shared root for every app.
pub fn build_view(template: &Path, config: Option<&Path>, app: &str) -> Result<View> {
    let mut config = match config {
        Some(path) => ViewConfig::load(path)
            .with_context(|| format!("{} {}", context::INVALID_CONFIG, path.display()))?,
        None => ViewConfig::default(),
    };

    let template = if template.is_absolute() {
        template.to_path_buf()
    } else {
        std::env::current_dir()?.join(template)
    };

    if config.view_root.as_os_str().is_empty() {
        config.view_root = template
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.view_root_per_app = false;
        config.auto_include_root_per_app = false;
    }

    let mut view = View::new(app, &config);
    view.set_template_file(template.to_string_lossy());
    Ok(view)
}

pub fn execute(args: RenderArgs) -> Result<()> {
    info!("Rendering template: {}", args.template.display());

    let mut view = build_view(&args.template, args.config.as_deref(), &args.app)?;
    if let Some(level) = args.minify {
        view.set_minify(level);
    }

    if let Some(root) = &args.translations {
        let mut translator = Translator::open(root)
            .with_context(|| format!("Failed to load translations from {}", root.display()))?;
        if let Some(locale) = &args.locale {
            translator.set_locale(locale, DEFAULT_DOMAIN);
        }
        view.set_translation_source(Arc::new(translator));
    }

    let data = match &args.data {
        Some(path) => RenderData::load(path)?,
        None => RenderData::default(),
    };
    let mut bindings = data.apply(&mut view)?;
    let mut system = system_variables();
    system.extend(std::mem::take(&mut bindings.system));
    bindings.system = system;

    let output = match &args.page {
        Some(page) => view.render(page, &bindings)?,
        None => view.present(&bindings)?,
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &output)
                .with_context(|| format!("Failed to write output {}", path.display()))?;
            info!("Wrote {} bytes to {}", output.len(), path.display());
        }
        None => print!("{}", output),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_render_data_from_yaml() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("main.html"),
            "<h1>{%meta:title%}</h1>{%if:show%}{%loop:rows%}[{%rows:n%}]{%loop:rows%}{%if:show%}\
             {%obj:name%} {%obj:user:email%} {%cfg:site%} {%app:curr:key%}",
        )
        .unwrap();
        let data_path = temp.path().join("data.yaml");
        fs::write(
            &data_path,
            r#"
product_title: Quill
meta_title: "[title] home"
conditionals:
  show: true
loops:
  rows:
    - n: 1
    - n: 2
objects:
  def:
    name: Ann
  user:
    email: ann@example.com
config:
  site: example.com
apps:
  current:
    key: shop
"#,
        )
        .unwrap();

        let mut view = build_view(&temp.path().join("main.html"), None, "app").unwrap();
        let bindings = RenderData::load(&data_path).unwrap().apply(&mut view).unwrap();
        let out = view.present(&bindings).unwrap();
        assert_eq!(
            out,
            "<h1>Quill home</h1>[1][2]Ann ann@example.com example.com shop"
        );
    }

    #[test]
    fn test_build_view_uses_template_directory() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("main.html"), "{%auto:part.html%}").unwrap();
        fs::write(temp.path().join("part.html"), "part").unwrap();

        let view = build_view(&temp.path().join("main.html"), None, "app").unwrap();
        assert_eq!(view.present(&Bindings::new()).unwrap(), "part");
    }

    #[test]
    fn test_parse_minify() {
        assert_eq!(parse_minify("collapse"), Ok(MinifyLevel::Collapse));
        assert!(parse_minify("max").is_err());
    }

    #[test]
    fn test_system_variables() {
        let system = system_variables();
        assert_eq!(system.get("year").and_then(|v| v.as_str()).map(str::len), Some(4));
    }
}
