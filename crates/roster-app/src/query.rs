// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::filters::DateRange;
use crate::model::{Record, SortSpec, Status, StatusCounts};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    pub search: String,
    pub status_filter: Option<Status>,
    pub date_range: DateRange,
    pub sort: SortSpec,
    /// Requested page, 1-based. The effective page is clamped by `evaluate`.
    pub page: usize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search: String::new(),
            status_filter: None,
            date_range: DateRange::default(),
            sort: SortSpec::default(),
            page: 1,
        }
    }
}

impl QueryState {
    pub fn has_filters(&self) -> bool {
        !self.search.trim().is_empty()
            || self.status_filter.is_some()
            || !self.date_range.is_empty()
            || self.sort.key.is_some()
    }

    pub fn matches(&self, record: &Record) -> bool {
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty() && !record.about.name.to_lowercase().contains(&needle) {
            return false;
        }
        if let Some(status) = self.status_filter
            && record.about.status != status
        {
            return false;
        }
        self.date_range.contains(record.details.date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub page: usize,
    pub total_pages: usize,
    pub full_count: usize,
    pub start_record: usize,
    pub end_record: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PageSummary {
    pub fn new(page: usize, total_pages: usize, full_count: usize, page_size: usize) -> Self {
        let start_record = if full_count == 0 {
            0
        } else {
            page.saturating_sub(1) * page_size + 1
        };
        Self {
            page,
            total_pages,
            full_count,
            start_record,
            end_record: (page * page_size).min(full_count),
            has_prev: page > 1,
            has_next: page < total_pages,
        }
    }

    pub fn label(&self) -> String {
        format!(
            "Showing {} - {} of {} (Page {} / {})",
            self.start_record, self.end_record, self.full_count, self.page, self.total_pages
        )
    }
}

/// Derived view of a record set under a query. Never stored as the source of
/// truth; recompute with [`evaluate`] after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub filtered: Vec<Record>,
    pub paged: Vec<Record>,
    pub summary: PageSummary,
    pub stats: StatusCounts,
}

impl ViewState {
    pub fn page(&self) -> usize {
        self.summary.page
    }

    pub fn total_pages(&self) -> usize {
        self.summary.total_pages
    }

    pub fn full_count(&self) -> usize {
        self.filtered.len()
    }
}

pub fn total_pages(filtered_len: usize, page_size: usize) -> usize {
    filtered_len.div_ceil(page_size.max(1)).max(1)
}

/// Search, status, date range, then a stable sort.
pub fn filter_and_sort(records: &[Record], query: &QueryState) -> Vec<Record> {
    let mut list: Vec<Record> = records
        .iter()
        .filter(|record| query.matches(record))
        .cloned()
        .collect();

    if let Some(key) = query.sort.key {
        let direction = query.sort.direction;
        list.sort_by(|left, right| direction.apply(key.compare(left, right)));
    }

    list
}

pub fn evaluate(records: &[Record], query: &QueryState, page_size: usize) -> ViewState {
    let page_size = page_size.max(1);
    let filtered = filter_and_sort(records, query);
    let total_pages = total_pages(filtered.len(), page_size);
    let page = query.page.clamp(1, total_pages);

    let start = ((page - 1) * page_size).min(filtered.len());
    let end = (start + page_size).min(filtered.len());
    let paged = filtered[start..end].to_vec();

    ViewState {
        summary: PageSummary::new(page, total_pages, filtered.len(), page_size),
        stats: StatusCounts::tally(records),
        filtered,
        paged,
    }
}
