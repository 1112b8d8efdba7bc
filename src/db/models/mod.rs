mod appointment;
mod counselor;

pub use appointment::*;
pub use counselor::*;

/// Serde helper for minute-granularity wall-clock times on the wire
/// (`"HH:MM"`, 24-hour).
pub mod hhmm {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Time;

    pub fn parse(raw: &str) -> Option<Time> {
        let (h, m) = raw.split_once(':')?;
        if h.len() != 2 || m.len() != 2 {
            return None;
        }
        let h: u8 = h.parse().ok()?;
        let m: u8 = m.parse().ok()?;
        Time::from_hms(h, m, 0).ok()
    }

    pub fn format(t: Time) -> String {
        format!("{:02}:{:02}", t.hour(), t.minute())
    }

    pub fn serialize<S: Serializer>(t: &Time, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(*t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Time, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid time of day (expected HH:MM): {raw}"))
        })
    }

    /// Deserialize-only: the optional fields of update payloads.
    pub mod option {
        use serde::{Deserialize, Deserializer};
        use time::Time;

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Time>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            match raw {
                None => Ok(None),
                Some(raw) => super::parse(&raw).map(Some).ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "invalid time of day (expected HH:MM): {raw}"
                    ))
                }),
            }
        }
    }
}

/// Calendar-date wire format (`"YYYY-MM-DD"`).
pub mod ymd {
    use time::format_description::BorrowedFormatItem;
    use time::macros::format_description;
    use time::Date;

    const FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

    pub fn parse(raw: &str) -> Option<Date> {
        Date::parse(raw, FORMAT).ok()
    }
}

#[cfg(test)]
mod tests {
    use time::macros::time;

    use super::hhmm;
    use super::ymd;

    #[test]
    fn hhmm_round_trip() {
        assert_eq!(hhmm::parse("09:30"), Some(time!(09:30)));
        assert_eq!(hhmm::format(time!(09:30)), "09:30");
        assert_eq!(hhmm::format(time!(00:00)), "00:00");
    }

    #[test]
    fn hhmm_rejects_malformed_input() {
        for raw in ["9:30", "09:3", "24:00", "09:60", "0930", "09:30:00", ""] {
            assert_eq!(hhmm::parse(raw), None, "accepted {raw:?}");
        }
    }

    #[test]
    fn ymd_parses_calendar_dates() {
        assert!(ymd::parse("2026-03-09").is_some());
        assert_eq!(ymd::parse("2026-02-30"), None);
        assert_eq!(ymd::parse("09-03-2026"), None);
    }
}
