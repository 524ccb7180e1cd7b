//! Check command - Validate block markup in a template.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::{info, warn};

use quill_view::{PairMatcher, TagFamily, TagScanner};

use super::context;

#[derive(Args)]
pub struct CheckArgs {
    /// Template file to validate
    file: PathBuf,
}

pub fn execute(args: CheckArgs) -> Result<()> {
    info!("Checking template: {}", args.file.display());

    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("{}: {}", context::TEMPLATE_NOT_FOUND, args.file.display()))?;
    let problems = find_problems(&text);

    if problems.is_empty() {
        println!("✅ {} is valid", args.file.display());
        return Ok(());
    }

    for problem in &problems {
        warn!("{}", problem);
        println!("❌ {}", problem);
    }
    bail!("{}: {} problem(s)", context::MARKUP_INVALID, problems.len())
}

/// Unmatched `{%if%}` and `{%loop%}` start tags, by byte offset.
fn find_problems(text: &str) -> Vec<String> {
    let scanner = TagScanner::shared();
    let mut problems = Vec::new();

    for family in [TagFamily::Conditional, TagFamily::Loop] {
        for pair in PairMatcher::new(scanner.scan(text, family)).pairs() {
            if !pair.is_matched() {
                problems.push(format!(
                    "Unmatched {} at offset {}",
                    pair.tag_text, pair.start
                ));
            }
        }
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_markup_has_no_problems() {
        let text = "{%if:a%}{%loop:rows%}x{%loop:rows%}{%if:a%}";
        assert!(find_problems(text).is_empty());
    }

    #[test]
    fn test_unmatched_tags_are_reported() {
        let text = "ok {%if:a%} {%loop:rows%}x{%loop:rows%} {%loop:other%}";
        let problems = find_problems(text);
        assert_eq!(
            problems,
            vec![
                "Unmatched {%if:a%} at offset 3".to_string(),
                "Unmatched {%loop:other%} at offset 40".to_string(),
            ]
        );
    }
}
