// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use proptest::prelude::*;
use roster_app::{
    QueryState, SortDirection, SortKey, SortSpec, Status, TableCommand, TableEvent, WindowConfig,
    compute_window, evaluate, format_date, grow_ceiling, total_pages,
};
use roster_testkit::{fixture_records, fixture_state, fixture_today};
use time::Duration;

fn window_config() -> impl Strategy<Value = WindowConfig> {
    (1u32..200, 1u32..2_000, 0usize..6, 1usize..20).prop_map(
        |(row_height, container_height, buffer_rows, incremental_load)| WindowConfig {
            row_height,
            container_height,
            buffer_rows,
            incremental_load,
        },
    )
}

fn sort_key() -> impl Strategy<Value = SortKey> {
    prop::sample::select(SortKey::ALL.to_vec())
}

fn status_filter() -> impl Strategy<Value = Option<Status>> {
    prop::option::of(prop::sample::select(Status::ALL.to_vec()))
}

fn day(days_ago: i64) -> String {
    format_date(fixture_today() - Duration::days(days_ago))
}

fn query_command() -> impl Strategy<Value = TableCommand> {
    let date_range = (1i64..120, 0i64..60).prop_map(|(from, span)| TableCommand::SetDateRange {
        start: Some(day(from)),
        end: Some(day((from - span).max(0))),
    });
    prop_oneof![
        "[a-z0-9 ]{0,8}".prop_map(TableCommand::SetSearch),
        status_filter().prop_map(TableCommand::SetStatusFilter),
        date_range,
        (1i64..120).prop_map(|from| TableCommand::SetStartDate(Some(day(from)))),
        (0i64..120).prop_map(|to| TableCommand::SetEndDate(Some(day(to)))),
        sort_key().prop_map(TableCommand::SortBy),
    ]
}

proptest! {
    #[test]
    fn window_stays_inside_revealed_rows(
        config in window_config(),
        rows_len in 0usize..500,
        ceiling in 0usize..600,
        offset in 0u64..100_000,
    ) {
        let range = compute_window(rows_len, offset, ceiling, config);
        let revealed = ceiling.min(rows_len);
        prop_assert!(range.start_index <= range.end_index);
        prop_assert!(range.end_index <= revealed);
        prop_assert_eq!(
            range.content_height_px,
            revealed as u64 * u64::from(config.row_height)
        );
    }

    #[test]
    fn ceiling_growth_is_monotonic_and_saturates(
        current in 0usize..300,
        rows_len in 0usize..300,
        increment in 1usize..50,
    ) {
        let next = grow_ceiling(current, rows_len, increment);
        prop_assert!(next >= current);
        if current < rows_len {
            prop_assert!(next <= rows_len);
            prop_assert_eq!(next, (current + increment).min(rows_len));
        } else {
            prop_assert_eq!(next, current);
        }
    }

    #[test]
    fn page_count_matches_ceiling_division(len in 0usize..10_000, size in 1usize..200) {
        let pages = total_pages(len, size);
        prop_assert!(pages >= 1);
        prop_assert!(pages * size >= len);
        if len > 0 {
            prop_assert!((pages - 1) * size < len);
        }
    }

    #[test]
    fn sorting_keeps_ties_in_source_order(key in sort_key(), desc in any::<bool>()) {
        let records = fixture_records(60);
        let direction = if desc { SortDirection::Desc } else { SortDirection::Asc };
        let query = QueryState {
            sort: SortSpec::by(key, direction),
            ..QueryState::default()
        };
        let view = evaluate(&records, &query, 100);
        let position = |id: &str| records.iter().position(|record| record.id.as_str() == id);
        for pair in view.filtered.windows(2) {
            let ordering = direction.apply(key.compare(&pair[0], &pair[1]));
            prop_assert!(ordering.is_le());
            if ordering.is_eq() {
                prop_assert!(position(pair[0].id.as_str()) < position(pair[1].id.as_str()));
            }
        }
    }

    #[test]
    fn evaluate_is_pure(
        search in "[a-z0-9 ]{0,8}",
        status in status_filter(),
        page in 0usize..20,
        size in 1usize..25,
    ) {
        let records = fixture_records(80);
        let snapshot = records.clone();
        let query = QueryState {
            search,
            status_filter: status,
            page,
            ..QueryState::default()
        };
        let first = evaluate(&records, &query, size);
        prop_assert_eq!(&records, &snapshot);
        prop_assert_eq!(&first, &evaluate(&records, &query, size));
        prop_assert!(first.page() >= 1 && first.page() <= first.total_pages());
        prop_assert!(first.paged.len() <= size);
    }

    #[test]
    fn query_changes_return_to_first_page(page in 2usize..10, command in query_command()) {
        let mut state = fixture_state(100);
        state.dispatch(TableCommand::SetPage(page));
        state.dispatch(TableCommand::LoadMore);
        state.dispatch(TableCommand::Scroll(144));
        prop_assert_eq!(state.query().page, page);

        let changed = state
            .dispatch(command)
            .contains(&TableEvent::QueryChanged);
        if changed {
            prop_assert_eq!(state.query().page, 1);
            prop_assert_eq!(state.window().visible_ceiling, 5);
            prop_assert_eq!(state.window().scroll_offset_px, 0);
        }
    }
}
