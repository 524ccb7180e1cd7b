//! Keyed (`{%inc:KEY%}`) and fixed-name (`{%auto:FILE%}`) includes.
//!
//! Included text may itself contain include tags, so each family is re-scanned
//! until none remain. A file that cannot be loaded is replaced by an inline
//! diagnostic naming it; rendering carries on.

use std::collections::HashMap;

use regex::Captures;
use tracing::{debug, warn};

use crate::config::{display_path, ViewDirectories};
use crate::scanner::{TagFamily, TagScanner};
use crate::source::TemplateSource;

/// What an include pass needs to find files.
pub struct IncludeContext<'a> {
    pub source: &'a dyn TemplateSource,
    pub directories: &'a ViewDirectories,
    pub debug: bool,
    pub max_depth: usize,
}

impl IncludeContext<'_> {
    /// Expand keyed includes registered in `includes` (section key → file).
    pub fn resolve_keyed(&self, text: &str, includes: &HashMap<String, String>) -> String {
        self.expand(text, TagFamily::Include, |key| self.keyed_file(key, includes))
    }

    /// Expand fixed-name includes from the auto include directory.
    pub fn resolve_auto(&self, text: &str) -> String {
        self.expand(text, TagFamily::Auto, |file| self.auto_file(file))
    }

    fn expand<F>(&self, text: &str, family: TagFamily, load: F) -> String
    where
        F: Fn(&str) -> String,
    {
        let scanner = TagScanner::shared();
        let rx = scanner.regex(family);
        let mut current = text.to_string();

        for pass in 0..self.max_depth {
            if !rx.is_match(&current) {
                return current;
            }
            debug!("Include pass {} for {{%{}%}}", pass + 1, family);
            current = rx
                .replace_all(&current, |caps: &Captures| load(&caps[1]))
                .into_owned();
        }

        if !rx.is_match(&current) {
            return current;
        }
        warn!(
            "Include depth {} exhausted for {{%{}%}} tags",
            self.max_depth, family
        );
        rx.replace_all(&current, |caps: &Captures| {
            format!("Include depth exceeded for [{}]", &caps[1])
        })
        .into_owned()
    }

    fn keyed_file(&self, key: &str, includes: &HashMap<String, String>) -> String {
        let Some(file) = includes.get(key).filter(|f| !f.is_empty()) else {
            warn!("No include registered for [{}]", key);
            return format!("Include file: not registered for [{}]", key);
        };

        let path = self.directories.file_name(file);
        self.source.load(&path).unwrap_or_else(|| {
            warn!("Include file {:?} not found for [{}]", path, key);
            format!(
                "Include file: {} not found for [{}]",
                display_path(&path, self.debug),
                key
            )
        })
    }

    fn auto_file(&self, file: &str) -> String {
        let path = self.directories.auto_include_directory(None).join(file);
        self.source.load(&path).unwrap_or_else(|| {
            warn!("Auto file {:?} not found", path);
            format!("Auto file: {} not found", display_path(&path, self.debug))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewConfig;
    use crate::source::MemoryTemplateSource;

    fn directories() -> ViewDirectories {
        ViewDirectories::new("shop", &ViewConfig::new("/views"))
    }

    fn includes(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_keyed_include_nests() {
        let source = MemoryTemplateSource::new()
            .with("/views/shop/body.html", "<b>{%inc:footer%}</b>")
            .with("/views/shop/footer.html", "end");
        let dirs = directories();
        let ctx = IncludeContext {
            source: &source,
            directories: &dirs,
            debug: false,
            max_depth: 8,
        };
        let map = includes(&[("main1", "body.html"), ("footer", "footer.html")]);
        assert_eq!(ctx.resolve_keyed("[{%inc:main1%}]", &map), "[<b>end</b>]");
    }

    #[test]
    fn test_missing_include_is_annotated() {
        let source = MemoryTemplateSource::new();
        let dirs = directories();
        let ctx = IncludeContext {
            source: &source,
            directories: &dirs,
            debug: false,
            max_depth: 8,
        };
        let map = includes(&[("side", "side.html")]);
        let out = ctx.resolve_keyed("a{%inc:side%}b{%inc:missingkey%}c", &map);
        assert_eq!(
            out,
            "aInclude file: side.html not found for [side]bInclude file: not registered for [missingkey]c"
        );
    }

    #[test]
    fn test_auto_include() {
        let source = MemoryTemplateSource::new().with("/views/shop/nav.html", "<nav/>");
        let dirs = directories();
        let ctx = IncludeContext {
            source: &source,
            directories: &dirs,
            debug: true,
            max_depth: 8,
        };
        assert_eq!(ctx.resolve_auto("{%auto:nav.html%}"), "<nav/>");
        assert_eq!(
            ctx.resolve_auto("{%auto:gone.html%}"),
            "Auto file: /views/shop/gone.html not found"
        );
    }

    #[test]
    fn test_self_include_is_bounded() {
        let source = MemoryTemplateSource::new().with("/views/shop/loop.html", "x{%inc:me%}");
        let dirs = directories();
        let ctx = IncludeContext {
            source: &source,
            directories: &dirs,
            debug: false,
            max_depth: 3,
        };
        let out = ctx.resolve_keyed("{%inc:me%}", &includes(&[("me", "loop.html")]));
        assert_eq!(out, "xxxInclude depth exceeded for [me]");
    }
}
