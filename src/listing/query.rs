use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use super::error::ListError;

/// Search form state shared by every list screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchParams {
    pub select: String,
    pub text: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Endpoint-specific selectors such as `type_select` or `pg_select`
    pub filters: BTreeMap<String, String>,
}

impl SearchParams {
    pub fn new(select: impl Into<String>) -> Self {
        Self { select: select.into(), ..Default::default() }
    }

    /// Dates are optional, but a range needs both ends in order
    pub fn validate_dates(&self) -> Result<(), ListError> {
        match (self.start_date, self.end_date) {
            (None, None) => Ok(()),
            (Some(start), Some(end)) if start > end => Err(ListError::InvertedDateRange { start, end }),
            (Some(_), Some(_)) => Ok(()),
            _ => Err(ListError::IncompleteDateRange),
        }
    }

    pub fn apply(&mut self, patch: SearchPatch) {
        if let Some(select) = patch.select {
            self.select = select;
        }
        if let Some(text) = patch.text {
            self.text = text;
        }
        if let Some(start) = patch.start_date {
            self.start_date = start;
        }
        if let Some(end) = patch.end_date {
            self.end_date = end;
        }
        for (key, value) in patch.filters {
            if value.is_empty() {
                self.filters.remove(&key);
            } else {
                self.filters.insert(key, value);
            }
        }
    }
}

/// Partial update of [`SearchParams`]; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPatch {
    pub select: Option<String>,
    pub text: Option<String>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    /// An empty value removes the filter
    pub filters: BTreeMap<String, String>,
}

impl SearchPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ..Default::default() }
    }

    pub fn select(mut self, select: impl Into<String>) -> Self {
        self.select = Some(select.into());
        self
    }

    pub fn dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }
}

/// One page request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub search: SearchParams,
}

impl ListQuery {
    pub fn new(page: u32, page_size: u32, search: SearchParams) -> Self {
        Self { page, page_size, search }
    }

    /// Query-string pairs in the backend's snake_case naming
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let date = |d: Option<NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();

        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
            ("search_select".to_string(), self.search.select.clone()),
            ("search_text".to_string(), self.search.text.clone()),
            ("start_date".to_string(), date(self.search.start_date)),
            ("end_date".to_string(), date(self.search.end_date)),
        ];
        pairs.extend(self.search.filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }
}
