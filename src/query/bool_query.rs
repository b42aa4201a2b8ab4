//! Boolean set algebra over sorted posting lists
//!
//! Both operations take ascending, duplicate-free document id lists from one
//! segment and return an ascending, duplicate-free list.

use std::collections::BTreeSet;

use crate::segment::DocId;

/// Intersect posting lists (AND).
///
/// Lists are processed shortest first. Each candidate is binary-searched in
/// the next list starting from the position of the previous hit, so the search
/// window only shrinks as candidates advance.
pub fn intersect(mut lists: Vec<Vec<DocId>>) -> Vec<DocId> {
    if lists.is_empty() {
        return Vec::new();
    }
    lists.sort_by_key(|list| list.len());

    let mut lists = lists.into_iter();
    let mut candidates = lists.next().unwrap_or_default();

    for list in lists {
        if candidates.is_empty() {
            break;
        }
        let mut lower = 0usize;
        let mut kept = Vec::with_capacity(candidates.len());
        for &doc in &candidates {
            match list[lower..].binary_search(&doc) {
                Ok(idx) => {
                    kept.push(doc);
                    lower += idx + 1;
                }
                Err(idx) => lower += idx,
            }
            if lower >= list.len() {
                break;
            }
        }
        candidates = kept;
    }

    candidates
}

/// Union posting lists (OR); each document appears once
pub fn union(lists: Vec<Vec<DocId>>) -> Vec<DocId> {
    let set: BTreeSet<DocId> = lists.into_iter().flatten().collect();
    set.into_iter().collect()
}
