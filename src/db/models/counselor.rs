use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;
use validator::Validate;

use crate::db::models::hhmm;

/// Day of the recurring weekly schedule. This enum is the single source of
/// truth for availability; display labels are derived from it, never parsed
/// back out of free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "weekday", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub fn from_date(date: Date) -> Self {
        match date.weekday() {
            time::Weekday::Monday => Weekday::Monday,
            time::Weekday::Tuesday => Weekday::Tuesday,
            time::Weekday::Wednesday => Weekday::Wednesday,
            time::Weekday::Thursday => Weekday::Thursday,
            time::Weekday::Friday => Weekday::Friday,
            time::Weekday::Saturday => Weekday::Saturday,
            time::Weekday::Sunday => Weekday::Sunday,
        }
    }

    /// Indonesian label used by the public schedule listing.
    pub fn label_id(&self) -> &'static str {
        match self {
            Weekday::Monday => "Senin",
            Weekday::Tuesday => "Selasa",
            Weekday::Wednesday => "Rabu",
            Weekday::Thursday => "Kamis",
            Weekday::Friday => "Jumat",
            Weekday::Saturday => "Sabtu",
            Weekday::Sunday => "Minggu",
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Counselor {
    pub id: Uuid,
    pub name: String,
    pub specialization: String,
    pub bio: Option<String>,
    pub days: Vec<Weekday>,
    #[serde(with = "hhmm")]
    pub start_time: Time,
    #[serde(with = "hhmm")]
    pub end_time: Time,
    pub active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Counselor {
    /// Human schedule line derived from the structured availability, e.g.
    /// "Senin, Rabu 09:00 - 11:00".
    pub fn schedule_label(&self) -> String {
        let days: Vec<&str> = self.days.iter().map(|d| d.label_id()).collect();
        format!(
            "{} {} - {}",
            days.join(", "),
            hhmm::format(self.start_time),
            hhmm::format(self.end_time)
        )
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewCounselor {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Specialization is required"))]
    pub specialization: String,
    pub bio: Option<String>,
    pub days: Vec<Weekday>,
    #[serde(with = "hhmm")]
    pub start_time: Time,
    #[serde(with = "hhmm")]
    pub end_time: Time,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCounselor {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Specialization is required"))]
    pub specialization: Option<String>,
    pub bio: Option<String>,
    pub days: Option<Vec<Weekday>>,
    #[serde(default, with = "hhmm::option")]
    pub start_time: Option<Time>,
    #[serde(default, with = "hhmm::option")]
    pub end_time: Option<Time>,
    pub active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime, time};
    use uuid::Uuid;

    use super::*;

    #[test]
    fn weekday_derives_from_date() {
        assert_eq!(Weekday::from_date(date!(2026 - 03 - 09)), Weekday::Monday);
        assert_eq!(Weekday::from_date(date!(2026 - 03 - 13)), Weekday::Friday);
        assert_eq!(Weekday::from_date(date!(2026 - 03 - 15)), Weekday::Sunday);
    }

    #[test]
    fn schedule_label_is_derived_from_the_day_set() {
        let c = Counselor {
            id: Uuid::new_v4(),
            name: "Ust. Hasan".into(),
            specialization: "Fiqh Muamalah".into(),
            bio: None,
            days: vec![Weekday::Monday, Weekday::Wednesday],
            start_time: time!(09:00),
            end_time: time!(11:00),
            active: true,
            created_at: datetime!(2026-01-01 00:00 UTC),
            updated_at: datetime!(2026-01-01 00:00 UTC),
        };
        assert_eq!(c.schedule_label(), "Senin, Rabu 09:00 - 11:00");
    }
}
