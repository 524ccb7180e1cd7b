//! Conditional blocks: `{%if:KEY%} … {%if:KEY%}`.

use std::collections::HashMap;

use tracing::debug;

use crate::edit::{EditList, ReplacementSpan};
use crate::pairing::{Descend, PairMatcher};
use crate::scanner::{TagFamily, TagScanner};

/// Keep or drop every conditional block in `text`.
///
/// A block whose key is bound to `true` loses only its delimiters; an unbound
/// or `false` key removes the whole block together with anything nested in
/// it. A start tag without a partner removes everything from the tag to the
/// end of the buffer and records its key as `false`.
pub fn resolve_conditionals(text: &str, conditionals: &mut HashMap<String, bool>) -> String {
    let occurrences = TagScanner::shared().scan(text, TagFamily::Conditional);
    if occurrences.is_empty() {
        return text.to_string();
    }

    let mut edits = EditList::new();
    PairMatcher::new(occurrences).walk(|pair| {
        let Some(outer) = pair.outer() else {
            conditionals.insert(pair.key.clone(), false);
            edits.remove(ReplacementSpan::block(
                pair.start,
                text.len() - pair.start,
                &pair.key,
            ));
            return Descend::Over;
        };

        if conditionals.get(&pair.key).copied().unwrap_or(false) {
            edits.remove(ReplacementSpan::tag(pair.start, pair.tag_len, &pair.key));
            edits.remove(ReplacementSpan::tag(outer.end - pair.tag_len, pair.tag_len, &pair.key));
            Descend::Into
        } else {
            edits.remove(ReplacementSpan::block(outer.start, outer.len(), &pair.key));
            Descend::Over
        }
    });

    debug!("Conditionals: {} edit(s)", edits.len());
    edits.apply(text)
}
