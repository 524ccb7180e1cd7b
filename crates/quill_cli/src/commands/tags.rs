//! Tags command - List the merge tags found in a template.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use quill_view::{TagOccurrence, TagScanner};

use super::context;

#[derive(Args)]
pub struct TagsArgs {
    /// Template file to scan
    file: PathBuf,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn execute(args: TagsArgs) -> Result<()> {
    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("{}: {}", context::TEMPLATE_NOT_FOUND, args.file.display()))?;
    let tags = TagScanner::shared().scan_all(&text);

    if args.json {
        let entries: Vec<_> = tags
            .iter()
            .map(|(family, tag)| serde_json::json!({ "family": family, "tag": tag }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if tags.is_empty() {
        println!("No tags found in {}", args.file.display());
        return Ok(());
    }

    println!("{:>8}  {:<6} KEY", "OFFSET", "FAMILY");
    for (family, tag) in &tags {
        println!("{:>8}  {:<6} {}", tag.offset, family, tag_label(tag));
    }
    println!();
    println!("{} tag(s)", tags.len());

    Ok(())
}

fn tag_label(tag: &TagOccurrence) -> String {
    match &tag.field {
        Some(field) => format!("{}:{}", tag.key, field),
        None => tag.key.clone(),
    }
}
