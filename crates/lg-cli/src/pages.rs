//! # Page Cache
//!
//! Client-side store of the rows fetched for one search. Pages are keyed by
//! the canonical cache key of their [`SearchParams`](lg_core::SearchParams),
//! so switching to a different search starts from scratch while toggling
//! live mode keeps what was already loaded.
//!
//! Older pages (`next`) are appended, live pages (`prev`) are prepended, and
//! a row is kept once even if it shows up in two pages.

use lg_core::{LeadRow, LeadsResponse, Meta};
use std::collections::HashSet;

#[derive(Default)]
pub struct PageCache {
    key: Option<String>,
    rows: Vec<LeadRow>,
    ids: HashSet<String>,
    meta: Option<Meta>,
    prev_cursor: Option<i64>,
    next_cursor: Option<i64>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the cache at `key`, dropping everything if it held another one.
    /// Returns whether the cache was cleared.
    pub fn select(&mut self, key: &str) -> bool {
        if self.key.as_deref() == Some(key) {
            return false;
        }
        *self = Self {
            key: Some(key.to_string()),
            ..Self::default()
        };
        true
    }

    /// Append an older page. Returns the number of rows that were new.
    pub fn push_next(&mut self, page: LeadsResponse) -> usize {
        if self.prev_cursor.is_none() {
            self.prev_cursor = Some(page.prev_cursor);
        }
        self.next_cursor = page.next_cursor;
        self.meta = Some(page.meta);

        let before = self.rows.len();
        for row in page.data {
            if self.ids.insert(row.lead.id.clone()) {
                self.rows.push(row);
            }
        }
        self.rows.len() - before
    }

    /// Prepend a live page. An empty page leaves the live cursor alone so
    /// nothing between the old cursor and the server's clock is skipped.
    pub fn push_prev(&mut self, page: LeadsResponse) -> usize {
        if !page.data.is_empty() {
            self.prev_cursor = Some(page.prev_cursor);
        }
        self.meta = Some(page.meta);

        let fresh: Vec<LeadRow> = page
            .data
            .into_iter()
            .filter(|row| self.ids.insert(row.lead.id.clone()))
            .collect();
        let added = fresh.len();
        self.rows.splice(0..0, fresh);
        added
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn rows(&self) -> &[LeadRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Metadata of the most recent page.
    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }

    /// Cursor for the next live poll: newest row seen so far.
    pub fn prev_cursor(&self) -> Option<i64> {
        self.prev_cursor
    }

    /// Cursor for loading older rows; `None` once exhausted.
    pub fn next_cursor(&self) -> Option<i64> {
        self.next_cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lg_core::time::from_millis;
    use lg_core::Lead;

    fn page(ids: &[(&str, i64)], prev_cursor: i64) -> LeadsResponse {
        let data: Vec<LeadRow> = ids
            .iter()
            .map(|(id, ts)| LeadRow {
                lead: Lead::new(*id, from_millis(*ts).unwrap()),
                percentile: None,
            })
            .collect();
        let next_cursor = ids.last().map(|(_, ts)| *ts);
        LeadsResponse {
            data,
            meta: Meta::default(),
            prev_cursor,
            next_cursor,
        }
    }

    fn ids(cache: &PageCache) -> Vec<&str> {
        cache.rows().iter().map(|r| r.lead.id.as_str()).collect()
    }

    #[test]
    fn test_next_appends_and_prev_prepends() {
        let mut cache = PageCache::new();
        cache.select("size=2");
        cache.push_next(page(&[("c", 30), ("b", 20)], 30));
        cache.push_next(page(&[("a", 10)], 10));
        assert_eq!(ids(&cache), vec!["c", "b", "a"]);
        assert_eq!(cache.prev_cursor(), Some(30));
        assert_eq!(cache.next_cursor(), Some(10));

        assert_eq!(cache.push_prev(page(&[("e", 50), ("d", 40)], 50)), 2);
        assert_eq!(ids(&cache), vec!["e", "d", "c", "b", "a"]);
        assert_eq!(cache.prev_cursor(), Some(50));
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let mut cache = PageCache::new();
        cache.select("k");
        cache.push_next(page(&[("b", 20), ("a", 10)], 20));
        assert_eq!(cache.push_next(page(&[("a", 10), ("z", 5)], 10)), 1);
        assert_eq!(cache.push_prev(page(&[("b", 20)], 20)), 0);
        assert_eq!(ids(&cache), vec!["b", "a", "z"]);
    }

    #[test]
    fn test_empty_live_page_keeps_cursor() {
        let mut cache = PageCache::new();
        cache.select("k");
        cache.push_next(page(&[("a", 10)], 10));
        cache.push_prev(page(&[], 99_999));
        assert_eq!(cache.prev_cursor(), Some(10));
    }

    #[test]
    fn test_new_key_clears() {
        let mut cache = PageCache::new();
        assert!(cache.select("status=open"));
        cache.push_next(page(&[("a", 10)], 10));
        assert!(!cache.select("status=open"));
        assert_eq!(cache.len(), 1);
        assert!(cache.select("status=closed"));
        assert!(cache.is_empty());
        assert_eq!(cache.key(), Some("status=closed"));
        assert_eq!(cache.prev_cursor(), None);
    }
}
