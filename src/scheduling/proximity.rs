use serde::Serialize;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::db::{Appointment, AppointmentFilter};

/// Fixed page size for appointment listings.
pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
}

/// Orders bookings by closeness to `now`: absolute distance in time,
/// whether past or future, so imminent and just-missed appointments
/// surface first. Ties break by creation time then id, keeping the order
/// stable across pages.
pub fn sort_by_proximity(mut items: Vec<Appointment>, now: OffsetDateTime) -> Vec<Appointment> {
    items.sort_by_key(|a| {
        let at = PrimitiveDateTime::new(a.date, a.time).assume_offset(now.offset());
        ((at - now).abs(), a.created_at, a.id)
    });
    items
}

/// Status and free-text filter used by both listing surfaces. The search
/// is a case-insensitive substring match over requester name and purpose.
pub fn matches_filter(appointment: &Appointment, filter: &AppointmentFilter) -> bool {
    if let Some(status) = filter.status {
        if appointment.status != status {
            return false;
        }
    }
    if let Some(query) = &filter.search {
        let query = query.to_lowercase();
        if !query.is_empty()
            && !appointment.name.to_lowercase().contains(&query)
            && !appointment.purpose.to_lowercase().contains(&query)
        {
            return false;
        }
    }
    true
}

pub fn paginate<T>(items: Vec<T>, page: usize) -> Page<T> {
    let page = page.max(1);
    let total = items.len();
    let items: Vec<T> = items
        .into_iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();
    Page {
        items,
        page,
        per_page: PAGE_SIZE,
        total,
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime, time};
    use uuid::Uuid;

    use super::*;
    use crate::db::AppointmentStatus;
    use crate::scheduling::testutil::appointment;

    #[test]
    fn closest_to_now_comes_first_regardless_of_direction() {
        let now = datetime!(2026-03-09 12:00 UTC);
        let cid = Uuid::new_v4();
        // now-3h, now+1h, now+10h
        let past = appointment(cid, date!(2026 - 03 - 09), time!(09:00));
        let soon = appointment(cid, date!(2026 - 03 - 09), time!(13:00));
        let far = appointment(cid, date!(2026 - 03 - 09), time!(22:00));

        let sorted = sort_by_proximity(vec![far.clone(), past.clone(), soon.clone()], now);
        let ids: Vec<_> = sorted.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![soon.id, past.id, far.id]);
    }

    #[test]
    fn equal_distance_ties_break_by_creation_order() {
        let now = datetime!(2026-03-09 12:00 UTC);
        let cid = Uuid::new_v4();
        let mut earlier = appointment(cid, date!(2026 - 03 - 09), time!(11:00));
        let mut later = appointment(cid, date!(2026 - 03 - 09), time!(13:00));
        earlier.created_at = datetime!(2026-03-01 08:00 UTC);
        later.created_at = datetime!(2026-03-01 09:00 UTC);

        let sorted = sort_by_proximity(vec![later.clone(), earlier.clone()], now);
        assert_eq!(sorted[0].id, earlier.id);
        assert_eq!(sorted[1].id, later.id);
    }

    #[test]
    fn filter_by_status_and_search() {
        let cid = Uuid::new_v4();
        let mut a = appointment(cid, date!(2026 - 03 - 09), time!(09:00));
        a.name = "Siti Aminah".into();
        a.purpose = "Konsultasi pernikahan".into();
        a.status = AppointmentStatus::Approved;

        let by_status = AppointmentFilter {
            status: Some(AppointmentStatus::Approved),
            search: None,
        };
        assert!(matches_filter(&a, &by_status));

        let by_name = AppointmentFilter {
            status: None,
            search: Some("aminah".into()),
        };
        assert!(matches_filter(&a, &by_name));

        let by_purpose = AppointmentFilter {
            status: None,
            search: Some("PERNIKAHAN".into()),
        };
        assert!(matches_filter(&a, &by_purpose));

        let no_match = AppointmentFilter {
            status: Some(AppointmentStatus::Pending),
            search: None,
        };
        assert!(!matches_filter(&a, &no_match));
    }

    #[test]
    fn pagination_is_fixed_size_and_stable() {
        let now = datetime!(2026-03-09 12:00 UTC);
        let cid = Uuid::new_v4();
        let items: Vec<_> = (0..25i64)
            .map(|i| {
                let mut a = appointment(cid, date!(2026 - 03 - 09), time!(12:00));
                a.created_at = datetime!(2026-03-01 00:00 UTC) + time::Duration::minutes(i);
                a
            })
            .collect();

        let sorted = sort_by_proximity(items, now);
        let expected: Vec<_> = sorted.iter().map(|a| a.id).collect();

        let first = paginate(sorted.clone(), 1);
        let third = paginate(sorted.clone(), 3);
        assert_eq!(first.items.len(), PAGE_SIZE);
        assert_eq!(first.total, 25);
        assert_eq!(third.items.len(), 5);
        let first_ids: Vec<_> = first.items.iter().map(|a| a.id).collect();
        let third_ids: Vec<_> = third.items.iter().map(|a| a.id).collect();
        assert_eq!(first_ids, expected[..10].to_vec());
        assert_eq!(third_ids, expected[20..].to_vec());
    }
}
