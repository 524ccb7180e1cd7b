//! CLI command definitions.

use clap::{Parser, Subcommand};

pub mod check;
pub mod render;
pub mod tags;

/// Context prefixes the commands attach; exit codes are chosen from these.
pub mod context {
    pub const TEMPLATE_NOT_FOUND: &str = "Template file not found";
    pub const BINDINGS_NOT_FOUND: &str = "Bindings file not found";
    pub const INVALID_BINDINGS: &str = "Invalid bindings";
    pub const INVALID_CONFIG: &str = "Invalid view config";
    pub const MARKUP_INVALID: &str = "Markup validation failed";
}

/// Quill - tag-merge view renderer
#[derive(Parser)]
#[command(name = "quill")]
#[command(version, about = "Quill - tag-merge view renderer")]
#[command(long_about = r#"
Quill merges templates written with {%family:key%} tags against bound data.

COMMANDS:
  render  → Merge a main template with a YAML/JSON bindings file
  tags    → List every tag occurrence in a template
  check   → Report unmatched {%if%} / {%loop%} delimiters

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Markup validation failure
  4 - Template error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a template
    Render(render::RenderArgs),

    /// List the tags of a template
    Tags(tags::TagsArgs),

    /// Check block delimiter pairing
    Check(check::CheckArgs),
}
