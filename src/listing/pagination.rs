use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// One fetched page of rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub upper_rate: Option<String>,
    pub stats: BTreeMap<String, Value>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self { items: Vec::new(), total_count: 0, upper_rate: None, stats: BTreeMap::new() }
    }
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            upper_rate: self.upper_rate,
            stats: self.stats,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub total_count: u64,
    pub current_page: u32,
    pub total_pages: u32,
    pub page_size: u32,
}

impl Pagination {
    pub fn new(page_size: u32) -> Self {
        Self { total_count: 0, current_page: 1, total_pages: 1, page_size }
    }

    pub fn total_pages_for(total_count: u64, page_size: u32) -> u32 {
        if page_size == 0 {
            return 0;
        }
        total_count.div_ceil(u64::from(page_size)).min(u64::from(u32::MAX)) as u32
    }

    pub fn set_total(&mut self, total_count: u64) {
        self.total_count = total_count;
        self.total_pages = Self::total_pages_for(total_count, self.page_size);
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Range of page buttons to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub start: u32,
    pub end: u32,
}

impl PageWindow {
    /// Fixed blocks of ten: pages 1-10, 11-20, ...
    pub fn block(current: u32, total_pages: u32) -> Self {
        let current = current.max(1);
        let start = (current - 1) / 10 * 10 + 1;
        Self { start, end: (start + 9).min(total_pages) }
    }

    /// Five pages centred on the current one where possible
    pub fn sliding(current: u32, total_pages: u32) -> Self {
        const VISIBLE: u32 = 5;
        let mut start = current.saturating_sub(VISIBLE / 2).max(1);
        let end = total_pages.min(start + VISIBLE - 1);
        if end + 1 < start + VISIBLE {
            start = (end + 1).saturating_sub(VISIBLE).max(1);
        }
        Self { start, end }
    }

    pub fn pages(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }
}
