//! # quill_view
//!
//! Tag-merge view engine for Quill.
//!
//! A template is plain text carrying bracketed tags. Merging resolves every
//! tag against data bound to the view and returns the substituted text:
//!
//! | Tag | Meaning |
//! |---|---|
//! | `{%inc:KEY%}` | registered include file |
//! | `{%auto:FILE%}` | file from the auto include directory |
//! | `{%if:KEY%} … {%if:KEY%}` | conditional block |
//! | `{%loop:KEY%} … {%KEY:FIELD%} … {%loop:KEY%}` | loop block |
//! | `{%cfg:KEY%}` `{%svr:KEY%}` `{%sys:KEY%}` `{%cook:KEY%}` `{%meta:KEY%}` | namespace values |
//! | `{%obj:NAME:FIELD%}` / `{%obj:FIELD%}` | bound object field |
//! | `{%lang:KEY%}` | translated string |
//! | `{%app:KEY:FIELD%}` | application record field |
//!
//! No tree is built. Each stage re-scans the buffer, records byte-offset
//! edits against it and rebuilds the text in one pass.
//!
//! ## Example
//!
//! ```rust
//! use quill_view::{Bindings, Record, View, ViewConfig};
//!
//! let mut view = View::new("shop", &ViewConfig::new("views"));
//! view.make_conditional("show", true);
//! view.insert_object(Record::new().with("name", "Ann"), None);
//!
//! let out = view.merge(
//!     "<p>{%if:show%}Hello {%obj:name%}{%if:show%}</p>",
//!     &Bindings::new(),
//! );
//! assert_eq!(out, "<p>Hello Ann</p>");
//! ```

pub mod binder;
pub mod conditional;
pub mod config;
pub mod edit;
pub mod error;
pub mod include;
pub mod language;
pub mod looping;
pub mod minify;
pub mod pairing;
pub mod record;
pub mod scanner;
pub mod script;
pub mod source;
pub mod view;

pub use binder::{AppCollection, DEFAULT_OBJECT_KEY};
pub use config::{MinifyLevel, ViewConfig, ViewDirectories};
pub use edit::{EditList, ReplacementSpan, SpanKind};
pub use error::{ViewError, ViewResult};
pub use language::{missing_marker, TranslationSource};
pub use looping::{LoopBinding, LoopControl, LoopFilter};
pub use pairing::{BlockPair, Descend, PairMatcher};
pub use record::{FieldSource, Record};
pub use scanner::{TagFamily, TagOccurrence, TagScanner};
pub use source::{FsTemplateSource, MemoryTemplateSource, TemplateSource};
pub use view::{Bindings, Stage, View, DEFAULT_SECTION_KEY};
