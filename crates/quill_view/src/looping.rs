//! Loop blocks: `{%loop:KEY%} … {%KEY:FIELD%} … {%loop:KEY%}`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::binder::substitute_fields;
use crate::edit::{EditList, ReplacementSpan};
use crate::pairing::{Descend, PairMatcher};
use crate::record::Record;
use crate::scanner::{loop_field_pattern, TagFamily, TagScanner};

/// Verdict of a loop filter for one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    /// Render the (possibly modified) element.
    Emit,
    /// Leave the element out entirely.
    Skip,
}

/// Per-element callback. It receives a copy of the element and may change it
/// before the element is rendered.
pub type LoopFilter = Arc<dyn Fn(&mut Record) -> LoopControl + Send + Sync>;

/// A collection bound to a loop key.
#[derive(Clone, Default)]
pub struct LoopBinding {
    items: Vec<Record>,
    filter: Option<LoopFilter>,
}

impl LoopBinding {
    pub fn new(items: Vec<Record>) -> Self {
        Self {
            items,
            filter: None,
        }
    }

    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&mut Record) -> LoopControl + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn items(&self) -> &[Record] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Render `fragment` once per emitted element, in collection order.
    pub fn expand(&self, key: &str, fragment: &str) -> String {
        let rx = loop_field_pattern(key);
        let mut out = String::new();

        for item in &self.items {
            let mut item = item.clone();
            if let Some(filter) = &self.filter {
                if filter(&mut item) == LoopControl::Skip {
                    continue;
                }
            }
            out.push_str(&substitute_fields(&rx, fragment, &item));
        }

        out
    }
}

impl fmt::Debug for LoopBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoopBinding")
            .field("items", &self.items)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

/// Replace every loop block in `text` with its expansion.
///
/// Unbound keys and empty collections make the block vanish. Loops of other
/// keys nested in a fragment are expanded before the fragment is repeated.
/// A start tag without a partner removes everything to the end of the buffer.
pub fn resolve_loops(text: &str, loops: &HashMap<String, LoopBinding>) -> String {
    let occurrences = TagScanner::shared().scan(text, TagFamily::Loop);
    if occurrences.is_empty() {
        return text.to_string();
    }

    let mut edits = EditList::new();
    PairMatcher::new(occurrences).walk(|pair| {
        let (Some(outer), Some(inner)) = (pair.outer(), pair.inner()) else {
            edits.remove(ReplacementSpan::block(
                pair.start,
                text.len() - pair.start,
                &pair.key,
            ));
            return Descend::Over;
        };

        let expanded = match loops.get(&pair.key).filter(|b| !b.is_empty()) {
            Some(binding) => {
                let fragment = resolve_loops(&text[inner], loops);
                binding.expand(&pair.key, &fragment)
            }
            None => String::new(),
        };

        debug!(
            "Loop '{}': {} byte block -> {} bytes",
            pair.key,
            outer.len(),
            expanded.len()
        );
        edits.replace(
            ReplacementSpan::block(outer.start, outer.len(), &pair.key),
            expanded,
        );
        Descend::Over
    });

    edits.apply(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: &[&str]) -> Vec<Record> {
        values.iter().map(|v| Record::new().with("f", *v)).collect()
    }

    fn bind(key: &str, binding: LoopBinding) -> HashMap<String, LoopBinding> {
        let mut loops = HashMap::new();
        loops.insert(key.to_string(), binding);
        loops
    }

    #[test]
    fn test_expands_per_element() {
        let loops = bind("k", LoopBinding::new(rows(&["1", "2", "3"])));
        let out = resolve_loops("[{%loop:k%}X{%k:f%}Y{%loop:k%}]", &loops);
        assert_eq!(out, "[X1YX2YX3Y]");
    }

    #[test]
    fn test_unbound_and_empty_vanish() {
        assert_eq!(
            resolve_loops("a{%loop:k%}X{%k:f%}{%loop:k%}b", &HashMap::new()),
            "ab"
        );
        let loops = bind("k", LoopBinding::new(Vec::new()));
        assert_eq!(resolve_loops("{%loop:k%}X{%loop:k%}", &loops), "");
    }

    #[test]
    fn test_missing_field_is_empty() {
        let loops = bind("k", LoopBinding::new(rows(&["1"])));
        assert_eq!(resolve_loops("{%loop:k%}<{%k:nope%}>{%loop:k%}", &loops), "<>");
    }

    #[test]
    fn test_filter_skips_every_element() {
        let binding = LoopBinding::new(rows(&["1", "2"])).with_filter(|_| LoopControl::Skip);
        let loops = bind("k", binding);
        assert_eq!(resolve_loops("{%loop:k%}X{%k:f%}{%loop:k%}", &loops), "");
    }

    #[test]
    fn test_filter_mutates_copy() {
        let binding = LoopBinding::new(rows(&["a", "b"])).with_filter(|item| {
            let upper = item.get("f").and_then(|v| v.as_str()).unwrap_or_default().to_uppercase();
            item.set("f", upper);
            LoopControl::Emit
        });
        let loops = bind("k", binding);
        assert_eq!(resolve_loops("{%loop:k%}{%k:f%}{%loop:k%}", &loops), "AB");
        assert_eq!(loops["k"].items()[0].get("f").and_then(|v| v.as_str()), Some("a"));
    }

    #[test]
    fn test_two_loops_with_different_lengths() {
        let mut loops = bind("a", LoopBinding::new(rows(&["1", "2", "3"])));
        loops.insert("b".to_string(), LoopBinding::new(rows(&["x"])));
        let text = "{%loop:b%}({%b:f%}){%loop:b%}-{%loop:a%}{%a:f%}{%loop:a%}";
        assert_eq!(resolve_loops(text, &loops), "(x)-123");
    }

    #[test]
    fn test_nested_loop_of_other_key() {
        let mut loops = bind("outer", LoopBinding::new(rows(&["1", "2"])));
        loops.insert("inner".to_string(), LoopBinding::new(rows(&["a", "b"])));
        let text = "{%loop:outer%}{%outer:f%}:{%loop:inner%}{%inner:f%}{%loop:inner%};{%loop:outer%}";
        assert_eq!(resolve_loops(text, &loops), "1:ab;2:ab;");
    }

    #[test]
    fn test_interleaved_keys_keep_the_tail() {
        let mut loops = bind("a", LoopBinding::new(rows(&["1"])));
        loops.insert("b".to_string(), LoopBinding::new(rows(&["2"])));
        let text = "<{%loop:a%}A{%a:f%}{%loop:b%}B{%b:f%}{%loop:a%}C{%loop:b%}> tail";
        assert_eq!(resolve_loops(text, &loops), "<A1B2> tail");
    }

    #[test]
    fn test_unmatched_removes_to_end() {
        let loops = bind("k", LoopBinding::new(rows(&["1"])));
        assert_eq!(resolve_loops("head{%loop:k%}{%k:f%} tail", &loops), "head");
    }
}
