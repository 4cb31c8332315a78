// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use roster_app::{About, Details, Record, RecordId, Status, TableSettings, TableState};
use time::macros::date;
use time::{Date, Duration, OffsetDateTime};

const STATUS_ROTATION: [Status; 3] = [Status::Active, Status::Invited, Status::Blocked];
const INVITER_COUNT: usize = 10;

/// Demo roster: record `i` (1-based) cycles through the statuses, is dated
/// `i` days before `today`, and rotates through ten inviters.
pub fn generate_records(count: usize, today: Date) -> Vec<Record> {
    (1..=count).map(|i| demo_record(i, today)).collect()
}

/// Record numbers start at 1; `0` is treated like `1` for the rotations.
pub fn demo_record(i: usize, today: Date) -> Record {
    let slot = i.saturating_sub(1);
    let date = today
        .checked_sub(Duration::days(i as i64))
        .unwrap_or(Date::MIN);
    Record {
        id: RecordId::new(i.to_string()),
        about: About {
            name: format!("Demo abhi {i}"),
            status: STATUS_ROTATION[slot % STATUS_ROTATION.len()],
            email: format!("samb.d{i}@gmail.com"),
        },
        details: Details {
            date,
            invited_by: format!("Dem00 {}", slot % INVITER_COUNT + 1),
        },
    }
}

/// Today in the local timezone, or UTC when the local offset is unknown.
pub fn current_date() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

pub fn fixture_today() -> Date {
    date!(2026 - 02 - 19)
}

pub fn fixture_records(count: usize) -> Vec<Record> {
    generate_records(count, fixture_today())
}

pub fn fixture_state(count: usize) -> TableState {
    TableState::new(fixture_records(count), TableSettings::default())
        .expect("generated ids are unique and default settings are valid")
}

pub fn ids(records: &[Record]) -> Vec<&str> {
    records.iter().map(|record| record.id.as_str()).collect()
}
