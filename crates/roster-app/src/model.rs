// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use time::Date;

use crate::ids::RecordId;

time::serde::format_description!(pub(crate) iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Active,
    Invited,
    Blocked,
}

impl Status {
    pub const ALL: [Self; 3] = [Self::Active, Self::Invited, Self::Blocked];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Invited => "INVITED",
            Self::Blocked => "BLOCKED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ACTIVE" => Some(Self::Active),
            "INVITED" => Some(Self::Invited),
            "BLOCKED" => Some(Self::Blocked),
            _ => None,
        }
    }

    pub const fn option(self) -> StatusOption {
        match self {
            Self::Active => STATUS_OPTIONS[0],
            Self::Invited => STATUS_OPTIONS[1],
            Self::Blocked => STATUS_OPTIONS[2],
        }
    }

    /// Next value in the status filter cycle: none, then each status in
    /// order, then none again.
    pub fn cycle_filter(current: Option<Self>) -> Option<Self> {
        match current {
            None => Some(Self::Active),
            Some(Self::Active) => Some(Self::Invited),
            Some(Self::Invited) => Some(Self::Blocked),
            Some(Self::Blocked) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusOption {
    pub status: Status,
    pub label: &'static str,
    pub color: &'static str,
}

pub const STATUS_OPTIONS: [StatusOption; 3] = [
    StatusOption {
        status: Status::Active,
        label: "ACTIVE",
        color: "#0A9A62",
    },
    StatusOption {
        status: Status::Invited,
        label: "INVITED",
        color: "#2B7EEA",
    },
    StatusOption {
        status: Status::Blocked,
        label: "BLOCKED",
        color: "#D33",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct About {
    pub name: String,
    pub status: Status,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub invited_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub about: About,
    pub details: Details,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Name,
    Email,
    Date,
    InvitedBy,
    Status,
}

impl SortKey {
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::Email,
        Self::Date,
        Self::InvitedBy,
        Self::Status,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Date => "date",
            Self::InvitedBy => "invitedBy",
            Self::Status => "status",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "date" => Some(Self::Date),
            "invitedBy" => Some(Self::InvitedBy),
            "status" => Some(Self::Status),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Date => "Date",
            Self::InvitedBy => "Invited By",
            Self::Status => "Status",
        }
    }

    /// Three-way comparison of two records under this key, ascending.
    pub fn compare(self, left: &Record, right: &Record) -> Ordering {
        match self {
            Self::Name => cmp_ignore_case(&left.about.name, &right.about.name),
            Self::Email => cmp_ignore_case(&left.about.email, &right.about.email),
            Self::Date => left.details.date.cmp(&right.details.date),
            Self::InvitedBy => cmp_ignore_case(&left.details.invited_by, &right.details.invited_by),
            Self::Status => left.about.status.as_str().cmp(right.about.status.as_str()),
        }
    }
}

fn cmp_ignore_case(left: &str, right: &str) -> Ordering {
    left.to_lowercase().cmp(&right.to_lowercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }

    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Asc => "▲",
            Self::Desc => "▼",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: Option<SortKey>,
    pub direction: SortDirection,
}

impl SortSpec {
    pub const fn by(key: SortKey, direction: SortDirection) -> Self {
        Self {
            key: Some(key),
            direction,
        }
    }

    /// Header click: the active key flips direction, any other key starts
    /// ascending.
    pub fn clicked(self, key: SortKey) -> Self {
        if self.key == Some(key) {
            Self::by(key, self.direction.toggled())
        } else {
            Self::by(key, SortDirection::Asc)
        }
    }

    pub fn indicator(self, key: SortKey) -> &'static str {
        if self.key == Some(key) {
            self.direction.arrow()
        } else {
            ""
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub total: usize,
    pub active: usize,
    pub invited: usize,
    pub blocked: usize,
    pub active_pct: u32,
    pub invited_pct: u32,
    pub blocked_pct: u32,
}

impl StatusCounts {
    pub fn tally(records: &[Record]) -> Self {
        let mut counts = Self {
            total: records.len(),
            ..Self::default()
        };
        for record in records {
            match record.about.status {
                Status::Active => counts.active += 1,
                Status::Invited => counts.invited += 1,
                Status::Blocked => counts.blocked += 1,
            }
        }
        counts.active_pct = rounded_percent(counts.active, counts.total);
        counts.invited_pct = rounded_percent(counts.invited, counts.total);
        counts.blocked_pct = rounded_percent(counts.blocked, counts.total);
        counts
    }

    pub const fn count(&self, status: Status) -> usize {
        match status {
            Status::Active => self.active,
            Status::Invited => self.invited,
            Status::Blocked => self.blocked,
        }
    }
}

// Half-up rounding of part/total as a percentage.
fn rounded_percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let scaled = (part as u64 * 200 + total as u64) / (total as u64 * 2);
    scaled as u32
}

#[cfg(test)]
mod tests {
    use super::{
        About, Details, Record, SortDirection, SortKey, SortSpec, Status, StatusCounts,
        rounded_percent,
    };
    use crate::RecordId;
    use std::cmp::Ordering;
    use time::{Date, Month};

    fn record(id: &str, name: &str, status: Status) -> Record {
        Record {
            id: RecordId::from(id),
            about: About {
                name: name.to_owned(),
                status,
                email: format!("{id}@example.com"),
            },
            details: Details {
                date: Date::from_calendar_date(2026, Month::March, 4).expect("valid date"),
                invited_by: "Dem00 1".to_owned(),
            },
        }
    }

    #[test]
    fn status_labels_parse_back() {
        for status in Status::ALL {
            assert_eq!(Status::parse(status.as_str()), Some(status));
            assert_eq!(status.option().status, status);
        }
        assert_eq!(Status::parse("active"), None);
    }

    #[test]
    fn status_filter_cycle_returns_to_none() {
        let mut current = None;
        let mut seen = Vec::new();
        for _ in 0..4 {
            current = Status::cycle_filter(current);
            seen.push(current);
        }
        assert_eq!(
            seen,
            vec![
                Some(Status::Active),
                Some(Status::Invited),
                Some(Status::Blocked),
                None
            ]
        );
    }

    #[test]
    fn clicking_same_key_flips_and_new_key_resets() {
        let spec = SortSpec::default().clicked(SortKey::Name);
        assert_eq!(spec, SortSpec::by(SortKey::Name, SortDirection::Asc));

        let spec = spec.clicked(SortKey::Name);
        assert_eq!(spec.direction, SortDirection::Desc);
        assert_eq!(spec.indicator(SortKey::Name), "▼");
        assert_eq!(spec.indicator(SortKey::Date), "");

        let spec = spec.clicked(SortKey::Date);
        assert_eq!(spec, SortSpec::by(SortKey::Date, SortDirection::Asc));
    }

    #[test]
    fn name_comparison_ignores_case() {
        let upper = record("1", "ALICE", Status::Active);
        let lower = record("2", "alice", Status::Blocked);
        let bob = record("3", "bob", Status::Invited);
        assert_eq!(SortKey::Name.compare(&upper, &lower), Ordering::Equal);
        assert_eq!(SortKey::Name.compare(&upper, &bob), Ordering::Less);
    }

    #[test]
    fn status_comparison_uses_label_text() {
        let active = record("1", "a", Status::Active);
        let blocked = record("2", "b", Status::Blocked);
        let invited = record("3", "c", Status::Invited);
        assert_eq!(SortKey::Status.compare(&active, &blocked), Ordering::Less);
        assert_eq!(SortKey::Status.compare(&blocked, &invited), Ordering::Less);
    }

    #[test]
    fn tally_counts_every_status_and_rounds_percentages() {
        let records = vec![
            record("1", "a", Status::Active),
            record("2", "b", Status::Active),
            record("3", "c", Status::Invited),
        ];
        let counts = StatusCounts::tally(&records);
        assert_eq!(counts.total, 3);
        assert_eq!(counts.count(Status::Active), 2);
        assert_eq!(counts.count(Status::Invited), 1);
        assert_eq!(counts.count(Status::Blocked), 0);
        assert_eq!(counts.active_pct, 67);
        assert_eq!(counts.invited_pct, 33);
        assert_eq!(counts.blocked_pct, 0);
    }

    #[test]
    fn percent_rounds_half_up_and_handles_empty_total() {
        assert_eq!(rounded_percent(1, 8), 13);
        assert_eq!(rounded_percent(0, 0), 0);
        assert_eq!(StatusCounts::tally(&[]), StatusCounts::default());
    }

    #[test]
    fn record_json_uses_camel_case_details_and_iso_date() -> anyhow::Result<()> {
        let json = serde_json::to_value(record("9", "Demo", Status::Invited))?;
        assert_eq!(json["details"]["date"], "2026-03-04");
        assert_eq!(json["details"]["invitedBy"], "Dem00 1");
        assert_eq!(json["about"]["status"], "INVITED");
        Ok(())
    }
}
