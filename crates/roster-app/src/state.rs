// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use std::collections::HashSet;
use tracing::debug;

use crate::filters::{validate_date_range, validate_end_edit, validate_start_edit};
use crate::ids::RecordId;
use crate::model::{Record, SortKey, Status};
use crate::query::{QueryState, ViewState, evaluate};
use crate::settings::TableSettings;
use crate::window::{VirtualWindow, WindowRange, visible_slice};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCommand {
    SetSearch(String),
    SetStatusFilter(Option<Status>),
    SetDateRange {
        start: Option<String>,
        end: Option<String>,
    },
    SetStartDate(Option<String>),
    SetEndDate(Option<String>),
    SortBy(SortKey),
    SetPage(usize),
    NextPage,
    PrevPage,
    UpdateStatus {
        id: RecordId,
        status: Status,
    },
    ClearFilters,
    Scroll(u64),
    LoadMore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    QueryChanged,
    PageChanged(usize),
    WindowReset,
    RecordUpdated(RecordId),
    Scrolled(u64),
    CeilingGrown(usize),
    ValidationFailed(String),
}

/// Owns the record set, the query, and the scroll window. Every mutation
/// recomputes the view before returning.
#[derive(Debug, Clone)]
pub struct TableState {
    records: Vec<Record>,
    query: QueryState,
    view: ViewState,
    window: VirtualWindow,
    settings: TableSettings,
    date_error: Option<String>,
}

impl TableState {
    pub fn new(records: Vec<Record>, settings: TableSettings) -> Result<Self> {
        settings.validate()?;
        ensure_unique_ids(&records)?;
        let query = QueryState::default();
        let view = evaluate(&records, &query, settings.page_size);
        Ok(Self {
            records,
            query,
            view,
            window: VirtualWindow::new(settings.window),
            settings,
            date_error: None,
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn window(&self) -> &VirtualWindow {
        &self.window
    }

    pub fn settings(&self) -> &TableSettings {
        &self.settings
    }

    pub fn date_error(&self) -> Option<&str> {
        self.date_error.as_deref()
    }

    pub fn page_rows(&self) -> &[Record] {
        &self.view.paged
    }

    pub fn window_range(&self) -> WindowRange {
        self.window
            .range(self.view.paged.len(), self.settings.window)
    }

    /// Rows the renderer must materialize, paired with their index into the
    /// revealed rows.
    pub fn visible_rows(&self) -> impl Iterator<Item = (usize, &Record)> {
        let range = self.window_range();
        visible_slice(&self.view.paged, range)
            .iter()
            .enumerate()
            .map(move |(offset, record)| (range.start_index + offset, record))
    }

    /// True while more rows of the current page can be revealed and the
    /// viewport has reached the bottom of what is revealed.
    pub fn wants_more_rows(&self) -> bool {
        let rows = self.view.paged.len();
        self.window.can_load_more(rows) && self.window.near_bottom(rows, self.settings.window)
    }

    pub fn dispatch(&mut self, command: TableCommand) -> Vec<TableEvent> {
        match command {
            TableCommand::SetSearch(search) => self.set_search(search),
            TableCommand::SetStatusFilter(status) => self.set_status_filter(status),
            TableCommand::SetDateRange { start, end } => {
                let result = self.set_date_range(start.as_deref(), end.as_deref());
                self.reject_on_error(result)
            }
            TableCommand::SetStartDate(start) => {
                let result = self.set_start_date(start.as_deref());
                self.reject_on_error(result)
            }
            TableCommand::SetEndDate(end) => {
                let result = self.set_end_date(end.as_deref());
                self.reject_on_error(result)
            }
            TableCommand::SortBy(key) => self.set_sort_by(key),
            TableCommand::SetPage(page) => self.set_page(page),
            TableCommand::NextPage => {
                let next = (self.view.page() + 1).min(self.view.total_pages());
                self.set_page(next)
            }
            TableCommand::PrevPage => {
                let prev = self.view.page().saturating_sub(1).max(1);
                self.set_page(prev)
            }
            TableCommand::UpdateStatus { id, status } => self.update_status(&id, status),
            TableCommand::ClearFilters => self.clear_filters(),
            TableCommand::Scroll(offset) => self.scroll_to(offset),
            TableCommand::LoadMore => self.load_more(),
        }
    }

    pub fn set_search(&mut self, search: impl Into<String>) -> Vec<TableEvent> {
        let mut next = self.query.clone();
        next.search = search.into();
        self.apply_query(next)
    }

    pub fn set_status_filter(&mut self, status: Option<Status>) -> Vec<TableEvent> {
        let mut next = self.query.clone();
        next.status_filter = status;
        self.apply_query(next)
    }

    pub fn set_date_range(
        &mut self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<TableEvent>> {
        let range = validate_date_range(start, end)?;
        self.date_error = None;
        let mut next = self.query.clone();
        next.date_range = range;
        Ok(self.apply_query(next))
    }

    pub fn set_start_date(&mut self, start: Option<&str>) -> Result<Vec<TableEvent>> {
        let range = validate_start_edit(self.query.date_range, start)?;
        self.date_error = None;
        let mut next = self.query.clone();
        next.date_range = range;
        Ok(self.apply_query(next))
    }

    pub fn set_end_date(&mut self, end: Option<&str>) -> Result<Vec<TableEvent>> {
        let range = validate_end_edit(self.query.date_range, end)?;
        self.date_error = None;
        let mut next = self.query.clone();
        next.date_range = range;
        Ok(self.apply_query(next))
    }

    pub fn set_sort_by(&mut self, key: SortKey) -> Vec<TableEvent> {
        let mut next = self.query.clone();
        next.sort = next.sort.clicked(key);
        self.apply_query(next)
    }

    /// Requests a page. Out-of-range values clamp silently.
    pub fn set_page(&mut self, page: usize) -> Vec<TableEvent> {
        let before = self.view.page();
        self.query.page = page;
        self.refresh();
        let after = self.view.page();
        if after == before {
            return Vec::new();
        }
        self.window.reset(self.settings.window);
        vec![TableEvent::PageChanged(after), TableEvent::WindowReset]
    }

    /// Replaces the status of the record with `id`. Unknown ids are ignored.
    pub fn update_status(&mut self, id: &RecordId, status: Status) -> Vec<TableEvent> {
        let Some(record) = self.records.iter_mut().find(|record| &record.id == id) else {
            debug!(%id, "status update for unknown record ignored");
            return Vec::new();
        };
        record.about.status = status;
        debug!(%id, status = status.as_str(), "record status updated");

        let before = self.view.page();
        self.refresh();
        let mut events = vec![TableEvent::RecordUpdated(id.clone())];
        if self.view.page() != before {
            events.push(TableEvent::PageChanged(self.view.page()));
        }
        events
    }

    pub fn clear_filters(&mut self) -> Vec<TableEvent> {
        self.query = QueryState::default();
        self.date_error = None;
        self.refresh();
        self.window.reset(self.settings.window);
        debug!("filters cleared");
        vec![TableEvent::QueryChanged, TableEvent::WindowReset]
    }

    pub fn scroll_to(&mut self, offset_px: u64) -> Vec<TableEvent> {
        let max = self
            .window
            .max_scroll_offset(self.view.paged.len(), self.settings.window);
        let offset = offset_px.min(max);
        if offset == self.window.scroll_offset_px {
            return Vec::new();
        }
        self.window.scroll_offset_px = offset;
        vec![TableEvent::Scrolled(offset)]
    }

    /// Reveals the next increment of the current page. Never advances the
    /// page.
    pub fn load_more(&mut self) -> Vec<TableEvent> {
        if !self
            .window
            .load_more(self.view.paged.len(), self.settings.window)
        {
            return Vec::new();
        }
        debug!(ceiling = self.window.visible_ceiling, "revealed more rows");
        vec![TableEvent::CeilingGrown(self.window.visible_ceiling)]
    }

    /// Swaps in a new record set, keeping the query.
    pub fn replace_records(&mut self, records: Vec<Record>) -> Result<Vec<TableEvent>> {
        ensure_unique_ids(&records)?;
        self.records = records;
        self.refresh();
        self.window.reset(self.settings.window);
        debug!(count = self.records.len(), "records replaced");
        Ok(vec![TableEvent::QueryChanged, TableEvent::WindowReset])
    }

    fn apply_query(&mut self, mut next: QueryState) -> Vec<TableEvent> {
        next.page = self.query.page;
        if next == self.query {
            return Vec::new();
        }
        next.page = 1;
        self.query = next;
        self.refresh();
        self.window.reset(self.settings.window);
        debug!(
            search = %self.query.search,
            status = self.query.status_filter.map(Status::as_str),
            sort = self.query.sort.key.map(SortKey::as_str),
            matched = self.view.full_count(),
            "query changed"
        );
        vec![TableEvent::QueryChanged, TableEvent::WindowReset]
    }

    fn refresh(&mut self) {
        self.view = evaluate(&self.records, &self.query, self.settings.page_size);
        if self.view.page() != self.query.page {
            debug!(
                requested = self.query.page,
                effective = self.view.page(),
                "page clamped"
            );
            self.query.page = self.view.page();
        }
    }

    fn reject_on_error(&mut self, result: Result<Vec<TableEvent>>) -> Vec<TableEvent> {
        match result {
            Ok(events) => events,
            Err(error) => {
                let message = error.to_string();
                debug!(%message, "date range rejected");
                self.date_error = Some(message.clone());
                vec![TableEvent::ValidationFailed(message)]
            }
        }
    }
}

fn ensure_unique_ids(records: &[Record]) -> Result<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(&record.id) {
            bail!("record id {} appears more than once", record.id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{TableCommand, TableEvent, TableState};
    use crate::{
        About, Details, Record, RecordId, SortDirection, SortKey, Status, TableSettings,
    };
    use anyhow::Result;
    use time::{Date, Duration, Month};

    fn sample_records(count: usize) -> Vec<Record> {
        let today = Date::from_calendar_date(2026, Month::October, 19).expect("valid date");
        (1..=count)
            .map(|i| Record {
                id: RecordId::new(i.to_string()),
                about: About {
                    name: format!("Demo abhi {i}"),
                    status: Status::ALL[(i - 1) % 3],
                    email: format!("samb.d{i}@gmail.com"),
                },
                details: Details {
                    date: today - Duration::days(i as i64),
                    invited_by: format!("Dem00 {}", (i - 1) % 10 + 1),
                },
            })
            .collect()
    }

    fn state(count: usize) -> Result<TableState> {
        TableState::new(sample_records(count), TableSettings::default())
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut records = sample_records(3);
        records[2].id = RecordId::from("1");
        let error = TableState::new(records, TableSettings::default())
            .expect_err("duplicate id should fail");
        assert!(error.to_string().contains("appears more than once"));
    }

    #[test]
    fn filter_change_resets_page_and_window() -> Result<()> {
        let mut state = state(100)?;
        state.dispatch(TableCommand::SetPage(3));
        state.dispatch(TableCommand::LoadMore);
        state.dispatch(TableCommand::Scroll(144));
        assert_eq!(state.view().page(), 3);

        let events = state.dispatch(TableCommand::SetStatusFilter(Some(Status::Active)));
        assert_eq!(events, vec![TableEvent::QueryChanged, TableEvent::WindowReset]);
        assert_eq!(state.query().page, 1);
        assert_eq!(state.window().visible_ceiling, 5);
        assert_eq!(state.window().scroll_offset_px, 0);
        Ok(())
    }

    #[test]
    fn every_query_change_resets_page_and_window() -> Result<()> {
        let changes = [
            TableCommand::SetSearch("demo".to_owned()),
            TableCommand::SetDateRange {
                start: Some("2026-07-01".to_owned()),
                end: Some("2026-10-31".to_owned()),
            },
            TableCommand::SetStartDate(Some("2026-07-01".to_owned())),
            TableCommand::SetEndDate(Some("2026-10-31".to_owned())),
            TableCommand::SortBy(SortKey::Name),
        ];
        for command in changes {
            let mut state = state(100)?;
            state.dispatch(TableCommand::SetPage(3));
            state.dispatch(TableCommand::LoadMore);
            state.dispatch(TableCommand::Scroll(144));
            assert_eq!(state.view().page(), 3);

            let events = state.dispatch(command.clone());
            assert_eq!(
                events,
                vec![TableEvent::QueryChanged, TableEvent::WindowReset],
                "{command:?}"
            );
            assert_eq!(state.query().page, 1, "{command:?}");
            assert_eq!(state.window().visible_ceiling, 5, "{command:?}");
            assert_eq!(state.window().scroll_offset_px, 0, "{command:?}");
        }
        Ok(())
    }

    #[test]
    fn repeating_the_same_filter_is_not_a_change() -> Result<()> {
        let mut state = state(100)?;
        state.dispatch(TableCommand::SetSearch("demo".to_owned()));
        state.dispatch(TableCommand::SetPage(2));
        let events = state.dispatch(TableCommand::SetSearch("demo".to_owned()));
        assert!(events.is_empty());
        assert_eq!(state.view().page(), 2);
        Ok(())
    }

    #[test]
    fn next_and_prev_page_stay_in_bounds() -> Result<()> {
        let mut state = state(25)?;
        assert!(state.dispatch(TableCommand::PrevPage).is_empty());
        state.dispatch(TableCommand::NextPage);
        state.dispatch(TableCommand::NextPage);
        assert_eq!(state.view().page(), 3);
        assert!(state.dispatch(TableCommand::NextPage).is_empty());
        assert_eq!(
            state.dispatch(TableCommand::PrevPage),
            vec![TableEvent::PageChanged(2), TableEvent::WindowReset]
        );
        Ok(())
    }

    #[test]
    fn status_update_keeps_window_and_filters() -> Result<()> {
        let mut state = state(30)?;
        state.dispatch(TableCommand::SetStatusFilter(Some(Status::Active)));
        state.dispatch(TableCommand::LoadMore);
        let window = *state.window();

        let events = state.dispatch(TableCommand::UpdateStatus {
            id: RecordId::from("1"),
            status: Status::Blocked,
        });
        assert_eq!(events, vec![TableEvent::RecordUpdated(RecordId::from("1"))]);
        assert_eq!(*state.window(), window);
        assert_eq!(state.query().status_filter, Some(Status::Active));
        assert!(state.view().filtered.iter().all(|r| r.id.as_str() != "1"));
        Ok(())
    }

    #[test]
    fn status_update_that_empties_last_page_clamps_it() -> Result<()> {
        let mut state = state(33)?;
        state.dispatch(TableCommand::SetStatusFilter(Some(Status::Active)));
        // 11 active records, so page 2 holds only record 31.
        state.dispatch(TableCommand::SetPage(2));
        assert_eq!(state.page_rows().len(), 1);

        let events = state.dispatch(TableCommand::UpdateStatus {
            id: RecordId::from("31"),
            status: Status::Invited,
        });
        assert_eq!(
            events,
            vec![
                TableEvent::RecordUpdated(RecordId::from("31")),
                TableEvent::PageChanged(1)
            ]
        );
        assert_eq!(state.query().page, 1);
        Ok(())
    }

    #[test]
    fn unknown_id_update_changes_nothing() -> Result<()> {
        let mut state = state(10)?;
        let before = state.records().to_vec();
        let events = state.dispatch(TableCommand::UpdateStatus {
            id: RecordId::from("missing"),
            status: Status::Blocked,
        });
        assert!(events.is_empty());
        assert_eq!(state.records(), before.as_slice());
        Ok(())
    }

    #[test]
    fn rejected_date_range_keeps_prior_range_and_records_error() -> Result<()> {
        let mut state = state(40)?;
        state.set_date_range(Some("2026-10-01"), Some("2026-10-10"))?;
        let prior = state.query().date_range;

        let events = state.dispatch(TableCommand::SetStartDate(Some("2026-10-11".to_owned())));
        assert_eq!(
            events,
            vec![TableEvent::ValidationFailed(
                "start date cannot be after end date".to_owned()
            )]
        );
        assert_eq!(state.query().date_range, prior);
        assert_eq!(state.date_error(), Some("start date cannot be after end date"));

        let events = state.dispatch(TableCommand::SetDateRange {
            start: Some("garbage".to_owned()),
            end: None,
        });
        assert!(matches!(events.as_slice(), [TableEvent::ValidationFailed(_)]));
        assert_eq!(state.query().date_range, prior);

        state.dispatch(TableCommand::SetEndDate(None));
        assert_eq!(state.date_error(), None);
        assert_eq!(state.query().date_range.end, None);
        Ok(())
    }

    #[test]
    fn clear_filters_resets_everything_at_once() -> Result<()> {
        let mut state = state(100)?;
        state.dispatch(TableCommand::SetSearch("abhi 1".to_owned()));
        state.dispatch(TableCommand::SortBy(SortKey::Email));
        state.dispatch(TableCommand::SetStatusFilter(Some(Status::Invited)));
        state.dispatch(TableCommand::SetPage(2));

        let events = state.dispatch(TableCommand::ClearFilters);
        assert_eq!(events, vec![TableEvent::QueryChanged, TableEvent::WindowReset]);
        assert!(!state.query().has_filters());
        assert_eq!(state.query().page, 1);
        assert_eq!(state.view().full_count(), 100);
        Ok(())
    }

    #[test]
    fn sort_click_toggles_direction() -> Result<()> {
        let mut state = state(5)?;
        state.dispatch(TableCommand::SortBy(SortKey::Name));
        assert_eq!(state.query().sort.direction, SortDirection::Asc);
        state.dispatch(TableCommand::SortBy(SortKey::Name));
        assert_eq!(state.query().sort.direction, SortDirection::Desc);
        Ok(())
    }

    #[test]
    fn scroll_is_clamped_to_revealed_content() -> Result<()> {
        let mut state = state(10)?;
        state.dispatch(TableCommand::LoadMore);
        let events = state.dispatch(TableCommand::Scroll(10_000));
        assert_eq!(events, vec![TableEvent::Scrolled(360)]);
        assert!(state.dispatch(TableCommand::Scroll(10_000)).is_empty());
        Ok(())
    }

    #[test]
    fn load_more_is_page_scoped() -> Result<()> {
        let mut state = state(100)?;
        assert!(state.wants_more_rows());
        assert_eq!(
            state.dispatch(TableCommand::LoadMore),
            vec![TableEvent::CeilingGrown(10)]
        );
        assert!(state.dispatch(TableCommand::LoadMore).is_empty());
        assert!(!state.wants_more_rows());
        assert_eq!(state.view().page(), 1);
        Ok(())
    }

    #[test]
    fn visible_rows_carry_revealed_indices() -> Result<()> {
        let mut state = state(10)?;
        state.dispatch(TableCommand::LoadMore);
        state.dispatch(TableCommand::Scroll(72 * 4));
        let indices: Vec<usize> = state.visible_rows().map(|(index, _)| index).collect();
        assert_eq!(indices, (2..10).collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn replacing_records_keeps_query() -> Result<()> {
        let mut state = state(10)?;
        state.dispatch(TableCommand::SetStatusFilter(Some(Status::Blocked)));
        state.replace_records(sample_records(30))?;
        assert_eq!(state.query().status_filter, Some(Status::Blocked));
        assert_eq!(state.view().full_count(), 10);
        Ok(())
    }
}
