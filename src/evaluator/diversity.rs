// src/evaluator/diversity.rs — Author diversity guard

use std::collections::HashSet;

use crate::core::types::Item;

pub fn distinct_authors(items: &[Item]) -> usize {
    items
        .iter()
        .map(|i| i.author_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// True when the evidence comes from at least `min_authors` different authors.
pub fn diversity_check(items: &[Item], min_authors: usize) -> bool {
    distinct_authors(items) >= min_authors
}
