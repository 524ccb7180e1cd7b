//! # quill_i18n
//!
//! Catalog-backed translations for Quill views.
//!
//! Catalogs live under a translation root, one directory per locale and one
//! YAML or JSON file per domain:
//!
//! ```text
//! translations/
//!   en_US/main.yaml
//!   fr_FR/main.yaml
//! ```
//!
//! A [`Translator`] resolves keys in its active locale, falls back to a
//! second locale on a miss and plugs into a view as its translation source.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use quill_i18n::Translator;
//! use quill_view::{View, ViewConfig};
//!
//! let mut translator = Translator::open("translations").unwrap();
//! translator.set_auto_locale(None, Some("fr-FR,fr;q=0.9"));
//!
//! let mut view = View::new("shop", &ViewConfig::new("views"));
//! view.set_translation_source(Arc::new(translator));
//! ```

pub mod catalog;
pub mod error;
pub mod translator;

pub use catalog::{CatalogSet, Messages};
pub use error::{I18nError, I18nResult};
pub use translator::{Translator, DEFAULT_DOMAIN, DEFAULT_LOCALE};
