//! Block delimiter pairing.
//!
//! Conditional and loop blocks open and close with the same literal tag, so a
//! start is paired with the nearest later unconsumed occurrence carrying the
//! identical text. Distinct keys interleave and nest freely. Two nested blocks
//! sharing a key cannot be told apart: `{%if:a%}{%if:a%}..{%if:a%}{%if:a%}`
//! pairs as (1st, 2nd) and (3rd, 4th). Templates must not nest a block inside
//! another block of the same key.

use std::ops::Range;

use tracing::warn;

use crate::scanner::TagOccurrence;

/// A start tag and, when the markup is well formed, its closing partner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPair {
    pub key: String,
    pub tag_text: String,
    /// Offset of the start tag.
    pub start: usize,
    /// Byte length of one delimiter tag.
    pub tag_len: usize,
    /// Offset of the end tag; `None` when no partner exists.
    pub end: Option<usize>,
}

impl BlockPair {
    pub fn is_matched(&self) -> bool {
        self.end.is_some()
    }

    /// Content strictly between the delimiters.
    pub fn inner(&self) -> Option<Range<usize>> {
        self.end.map(|end| self.start + self.tag_len..end)
    }

    /// The block including both delimiters.
    pub fn outer(&self) -> Option<Range<usize>> {
        self.end.map(|end| self.start..end + self.tag_len)
    }
}

/// How the walk continues after a matched block was visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descend {
    /// Continue with the next occurrence, which may sit inside the block.
    Into,
    /// Skip every occurrence up to and including the block's end tag.
    Over,
}

/// Pairs scanned occurrences of one block family.
#[derive(Debug, Clone)]
pub struct PairMatcher {
    occurrences: Vec<TagOccurrence>,
}

impl PairMatcher {
    pub fn new(occurrences: Vec<TagOccurrence>) -> Self {
        Self { occurrences }
    }

    /// Walk blocks left to right, letting `visit` decide whether blocks
    /// nested inside a matched block are visited or skipped with it.
    ///
    /// Pairing never depends on the visitor: every key is paired on its own,
    /// so a block of another key that starts inside a skipped block but ends
    /// after it is still visited. An unmatched start is visited once with
    /// `end == None` and ends the walk: everything after it belongs to the
    /// broken block.
    pub fn walk<F>(self, mut visit: F)
    where
        F: FnMut(&BlockPair) -> Descend,
    {
        let mut skipped_until = 0;

        for pair in self.pair_all() {
            if pair.start < skipped_until && pair.end.map_or(true, |end| end < skipped_until) {
                continue;
            }

            let Some(outer) = pair.outer() else {
                warn!(
                    "Markup error: no closing {} for tag at offset {}",
                    pair.tag_text, pair.start
                );
                visit(&pair);
                break;
            };

            if visit(&pair) == Descend::Over {
                skipped_until = skipped_until.max(outer.end);
            }
        }
    }

    /// Pair each start with the nearest later unconsumed occurrence of the
    /// same text, in document order of the starts.
    fn pair_all(mut self) -> Vec<BlockPair> {
        let count = self.occurrences.len();
        let mut pairs = Vec::new();

        for idx in 0..count {
            if self.occurrences[idx].consumed {
                continue;
            }

            let end_idx = (idx + 1..count).find(|&j| {
                !self.occurrences[j].consumed
                    && self.occurrences[j].full_text == self.occurrences[idx].full_text
            });
            if let Some(j) = end_idx {
                self.occurrences[j].consumed = true;
            }

            let start = &self.occurrences[idx];
            pairs.push(BlockPair {
                key: start.key.clone(),
                tag_text: start.full_text.clone(),
                start: start.offset,
                tag_len: start.length,
                end: end_idx.map(|j| self.occurrences[j].offset),
            });
        }

        pairs
    }

    /// Every block, pairing nested occurrences independently.
    pub fn pairs(self) -> Vec<BlockPair> {
        let mut pairs = Vec::new();
        self.walk(|pair| {
            pairs.push(pair.clone());
            Descend::Into
        });
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{TagFamily, TagScanner};

    fn matcher(text: &str) -> PairMatcher {
        PairMatcher::new(TagScanner::shared().scan(text, TagFamily::Conditional))
    }

    #[test]
    fn test_pairs_distinct_nested_keys() {
        let pairs = matcher("{%if:a%}x{%if:b%}y{%if:b%}z{%if:a%}").pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].key, "a");
        assert_eq!(pairs[0].end, Some(27));
        assert_eq!(pairs[1].key, "b");
        assert_eq!(pairs[1].inner(), Some(17..18));
    }

    #[test]
    fn test_same_key_pairs_sequentially() {
        let pairs = matcher("{%if:a%}{%if:a%}-{%if:a%}{%if:a%}").pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].outer(), Some(0..16));
        assert_eq!(pairs[1].start, 17);
    }

    #[test]
    fn test_unmatched_start_stops_walk() {
        let pairs = matcher("{%if:a%}x{%if:b%}y{%if:a%}").pairs();
        assert_eq!(pairs.len(), 2);
        assert!(pairs[0].is_matched());
        assert!(!pairs[1].is_matched());
    }

    #[test]
    fn test_interleaved_keys_pair_independently() {
        let pairs = matcher("{%if:a%}x{%if:b%}y{%if:a%}z{%if:b%}").pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].outer(), Some(0..26));
        assert_eq!(pairs[1].outer(), Some(9..35));
    }

    #[test]
    fn test_descend_over_still_visits_straddling_block() {
        let mut seen = Vec::new();
        matcher("{%if:a%}x{%if:b%}y{%if:a%}z{%if:b%}").walk(|pair| {
            seen.push((pair.key.clone(), pair.is_matched()));
            Descend::Over
        });
        assert_eq!(seen, vec![("a".to_string(), true), ("b".to_string(), true)]);
    }

    #[test]
    fn test_descend_over_drops_unmatched_inside_block() {
        let mut seen = Vec::new();
        matcher("{%if:a%}{%if:c%}{%if:a%}tail").walk(|pair| {
            seen.push(pair.key.clone());
            Descend::Over
        });
        assert_eq!(seen, vec!["a"]);
    }

    #[test]
    fn test_descend_over_skips_nested() {
        let mut seen = Vec::new();
        matcher("{%if:a%}{%if:b%}{%if:b%}{%if:a%}{%if:c%}{%if:c%}").walk(|pair| {
            seen.push(pair.key.clone());
            Descend::Over
        });
        assert_eq!(seen, vec!["a", "c"]);
    }
}
