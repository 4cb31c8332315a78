// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use roster_app::{
    PageSummary, QueryState, Record, SortKey, Status, StatusCounts, TableCommand, TableEvent,
    TableState, WindowRange,
};
use serde::Serialize;
use tracing::info;

/// Query flags given on the command line, applied before the first frame or
/// the headless dump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupQuery {
    pub search: Option<String>,
    pub status: Option<Status>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sort: Option<SortKey>,
    pub descending: bool,
    pub page: Option<usize>,
}

impl StartupQuery {
    pub fn apply(&self, state: &mut TableState) -> Result<()> {
        if let Some(search) = &self.search {
            state.dispatch(TableCommand::SetSearch(search.clone()));
        }
        if let Some(status) = self.status {
            state.dispatch(TableCommand::SetStatusFilter(Some(status)));
        }
        if self.start_date.is_some() || self.end_date.is_some() {
            state
                .set_date_range(self.start_date.as_deref(), self.end_date.as_deref())
                .context("apply --from/--to")?;
        }
        if let Some(key) = self.sort {
            state.dispatch(TableCommand::SortBy(key));
            if self.descending {
                state.dispatch(TableCommand::SortBy(key));
            }
        }
        if let Some(page) = self.page {
            for event in state.dispatch(TableCommand::SetPage(page)) {
                if let TableEvent::PageChanged(effective) = event
                    && effective != page
                {
                    info!(requested = page, effective, "page clamped");
                }
            }
        }
        Ok(())
    }
}

pub fn parse_status(raw: &str) -> Result<Status> {
    match Status::parse(&raw.to_ascii_uppercase()) {
        Some(status) => Ok(status),
        None => bail!("unknown status {raw:?}; use one of: active, invited, blocked"),
    }
}

pub fn parse_sort_key(raw: &str) -> Result<SortKey> {
    match SortKey::parse(raw) {
        Some(key) => Ok(key),
        None => bail!("unknown sort key {raw:?}; use one of: name, email, date, invitedBy, status"),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<'a> {
    pub label: String,
    pub summary: &'a PageSummary,
    pub stats: &'a StatusCounts,
    pub query: &'a QueryState,
    pub window: WindowRange,
    pub rows: &'a [Record],
}

impl<'a> Snapshot<'a> {
    pub fn capture(state: &'a TableState) -> Self {
        let view = state.view();
        Self {
            label: view.summary.label(),
            summary: &view.summary,
            stats: &view.stats,
            query: state.query(),
            window: state.window_range(),
            rows: state.page_rows(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serialize snapshot")
    }
}
