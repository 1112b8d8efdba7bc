use time::{Date, Duration, Time};

use crate::db::{Counselor, Weekday};

/// Booking granularity.
pub const SLOT_INTERVAL: Duration = Duration::minutes(30);

/// Candidate consultation slots for one counselor on one calendar date,
/// minus the times in `booked` (the counselor's non-rejected bookings for
/// that date).
///
/// Empty when the date's weekday is outside the counselor's schedule;
/// otherwise every 30-minute step from `start_time` up to but excluding
/// `end_time`, ascending. Pure: same inputs, same output.
pub fn generate_slots(counselor: &Counselor, date: Date, booked: &[Time]) -> Vec<Time> {
    if !counselor.days.contains(&Weekday::from_date(date)) {
        return Vec::new();
    }

    let mut slots = Vec::new();
    let mut t = counselor.start_time;
    while t < counselor.end_time {
        if !booked.contains(&t) {
            slots.push(t);
        }
        let next = t + SLOT_INTERVAL;
        // Time addition wraps at midnight
        if next <= t {
            break;
        }
        t = next;
    }
    slots
}
