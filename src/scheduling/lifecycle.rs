use std::sync::Arc;

use time::{Date, Time};
use uuid::Uuid;
use validator::Validate;

use crate::clock::Clock;
use crate::db::{
    hhmm, ymd, Appointment, AppointmentFilter, AppointmentStatus, Counselor, DatabaseError,
    NewAppointment, NewCounselor, UpdateAppointment, UpdateCounselor,
};
use crate::error::{flatten_validation_errors, AppError, AppResult, FieldError};

use super::proximity::{paginate, sort_by_proximity, Page};
use super::slots::generate_slots;
use super::store::{AppointmentStore, CounselorStore};

/// Coordinates the counselor directory, slot generation and the booking
/// lifecycle over the persistence collaborators. All slot decisions funnel
/// through here; the stores only add the atomic re-check at write time.
#[derive(Clone)]
pub struct Scheduler {
    counselors: Arc<dyn CounselorStore>,
    appointments: Arc<dyn AppointmentStore>,
    clock: Arc<dyn Clock>,
}

impl Scheduler {
    pub fn new(
        counselors: Arc<dyn CounselorStore>,
        appointments: Arc<dyn AppointmentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            counselors,
            appointments,
            clock,
        }
    }

    // Counselor directory

    pub async fn create_counselor(&self, req: NewCounselor) -> AppResult<Counselor> {
        req.validate()?;
        let mut fields = Vec::new();
        if req.days.is_empty() {
            fields.push(FieldError::new("days", "At least one weekday is required"));
        }
        if req.start_time >= req.end_time {
            fields.push(FieldError::new(
                "start_time",
                "Start time must be before end time",
            ));
        }
        if !fields.is_empty() {
            return Err(AppError::Validation(fields));
        }

        let now = self.clock.now();
        let row = Counselor {
            id: Uuid::new_v4(),
            name: req.name,
            specialization: req.specialization,
            bio: req.bio,
            days: req.days,
            start_time: req.start_time,
            end_time: req.end_time,
            active: req.active,
            created_at: now,
            updated_at: now,
        };
        self.counselors.insert(&row).await?;
        tracing::info!(counselor_id = %row.id, schedule = %row.schedule_label(), "counselor created");
        Ok(row)
    }

    pub async fn get_counselor(&self, id: Uuid) -> AppResult<Counselor> {
        self.counselors
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("counselor not found".into()))
    }

    pub async fn list_counselors(&self, active_only: bool) -> AppResult<Vec<Counselor>> {
        Ok(self.counselors.list(active_only).await?)
    }

    /// Partial edit. A changed availability window only affects future slot
    /// generation; existing bookings keep their placement.
    pub async fn update_counselor(&self, id: Uuid, patch: UpdateCounselor) -> AppResult<Counselor> {
        patch.validate()?;
        let mut row = self.get_counselor(id).await?;

        if let Some(name) = patch.name {
            row.name = name;
        }
        if let Some(specialization) = patch.specialization {
            row.specialization = specialization;
        }
        if let Some(bio) = patch.bio {
            row.bio = Some(bio);
        }
        if let Some(days) = patch.days {
            row.days = days;
        }
        if let Some(start_time) = patch.start_time {
            row.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            row.end_time = end_time;
        }
        if let Some(active) = patch.active {
            row.active = active;
        }

        let mut fields = Vec::new();
        if row.days.is_empty() {
            fields.push(FieldError::new("days", "At least one weekday is required"));
        }
        if row.start_time >= row.end_time {
            fields.push(FieldError::new(
                "start_time",
                "Start time must be before end time",
            ));
        }
        if !fields.is_empty() {
            return Err(AppError::Validation(fields));
        }

        row.updated_at = self.clock.now();
        self.counselors.update(&row).await?;
        Ok(row)
    }

    /// Deletion is blocked while any non-rejected booking still references
    /// the counselor; rejected-only history does not block.
    pub async fn delete_counselor(&self, id: Uuid) -> AppResult<()> {
        self.get_counselor(id).await?;
        let blocking = self.appointments.count_blocking(id).await?;
        if blocking > 0 {
            return Err(AppError::Conflict(
                "counselor still has pending or approved appointments".into(),
            ));
        }
        self.counselors.delete(id).await?;
        tracing::info!(counselor_id = %id, "counselor deleted");
        Ok(())
    }

    // Slot generation

    /// The authoritative "available" list shown to requesters. Inactive
    /// counselors expose no slots.
    pub async fn available_slots(&self, counselor_id: Uuid, date: Date) -> AppResult<Vec<Time>> {
        let counselor = self.get_counselor(counselor_id).await?;
        if !counselor.active {
            return Ok(Vec::new());
        }
        let booked = self.appointments.booked_times(counselor_id, date).await?;
        Ok(generate_slots(&counselor, date, &booked))
    }

    // Booking lifecycle

    /// Creates a booking in `pending` status. The slot-membership check is
    /// repeated here server-side, and the guarded insert makes it atomic:
    /// of two concurrent requests for one slot exactly one succeeds, the
    /// other gets `SlotConflict`.
    pub async fn create_appointment(&self, req: NewAppointment) -> AppResult<Appointment> {
        let mut fields = Vec::new();
        if let Err(errors) = req.validate() {
            fields.extend(flatten_validation_errors(&errors));
        }

        let date = match ymd::parse(&req.date) {
            Some(date) => Some(date),
            None => {
                fields.push(FieldError::new("date", "Date must be formatted YYYY-MM-DD"));
                None
            }
        };
        let time = match hhmm::parse(&req.time) {
            Some(time) => Some(time),
            None => {
                fields.push(FieldError::new("time", "Time must be formatted HH:MM"));
                None
            }
        };
        if let Some(date) = date {
            if date < self.clock.today() {
                fields.push(FieldError::new("date", "Date must not be in the past"));
            }
        }

        let (date, time) = match (date, time) {
            (Some(date), Some(time)) if fields.is_empty() => (date, time),
            _ => return Err(AppError::Validation(fields)),
        };

        let counselor = self.get_counselor(req.counselor_id).await?;
        if !counselor.active {
            return Err(AppError::Validation(vec![FieldError::new(
                "counselor_id",
                "Counselor is not accepting appointments",
            )]));
        }
        if !generate_slots(&counselor, date, &[]).contains(&time) {
            return Err(AppError::Validation(vec![FieldError::new(
                "time",
                "Time is outside the counselor's schedule",
            )]));
        }

        let now = self.clock.now();
        let row = Appointment {
            id: Uuid::new_v4(),
            counselor_id: req.counselor_id,
            name: req.name,
            email: req.email,
            phone: req.phone,
            date,
            time,
            purpose: req.purpose,
            status: AppointmentStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        match self.appointments.insert_guarded(&row).await {
            Ok(()) => {
                tracing::info!(appointment_id = %row.id, counselor_id = %row.counselor_id, "appointment requested");
                Ok(row)
            }
            Err(DatabaseError::Duplicate) => Err(AppError::SlotConflict),
            Err(err) => Err(err.into()),
        }
    }

    /// Status-only update (approve/reject) or partial record edit, decided
    /// by which fields are present. Any edit that moves the booking to a
    /// different (counselor, date, time), and any status change that
    /// re-claims a slot, goes back through the conflict check.
    pub async fn update_appointment(
        &self,
        id: Uuid,
        patch: UpdateAppointment,
    ) -> AppResult<Appointment> {
        let mut fields = Vec::new();
        if let Err(errors) = patch.validate() {
            fields.extend(flatten_validation_errors(&errors));
        }

        let mut row = self
            .appointments
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("appointment not found".into()))?;

        let placement_edit =
            patch.counselor_id.is_some() || patch.date.is_some() || patch.time.is_some();

        let mut date = row.date;
        let mut time = row.time;
        if let Some(raw) = &patch.date {
            match ymd::parse(raw) {
                Some(parsed) => date = parsed,
                None => fields.push(FieldError::new("date", "Date must be formatted YYYY-MM-DD")),
            }
        }
        if let Some(raw) = &patch.time {
            match hhmm::parse(raw) {
                Some(parsed) => time = parsed,
                None => fields.push(FieldError::new("time", "Time must be formatted HH:MM")),
            }
        }
        if patch.date.is_some() && fields.is_empty() && date < self.clock.today() {
            fields.push(FieldError::new("date", "Date must not be in the past"));
        }
        if !fields.is_empty() {
            return Err(AppError::Validation(fields));
        }

        if let Some(counselor_id) = patch.counselor_id {
            self.get_counselor(counselor_id).await?;
            row.counselor_id = counselor_id;
        }
        row.date = date;
        row.time = time;
        if let Some(name) = patch.name {
            row.name = name;
        }
        if let Some(email) = patch.email {
            row.email = email;
        }
        if let Some(phone) = patch.phone {
            row.phone = phone;
        }
        if let Some(purpose) = patch.purpose {
            row.purpose = purpose;
        }
        if let Some(status) = patch.status {
            row.status = status;
        }

        // A moved booking must land on a slot the counselor actually offers.
        // Bookings left in place are not re-validated against a schedule
        // that may have changed since they were made.
        if placement_edit && row.status != AppointmentStatus::Rejected {
            let counselor = self.get_counselor(row.counselor_id).await?;
            if !generate_slots(&counselor, row.date, &[]).contains(&row.time) {
                return Err(AppError::Validation(vec![FieldError::new(
                    "time",
                    "Time is outside the counselor's schedule",
                )]));
            }
        }

        row.updated_at = self.clock.now();
        match self.appointments.update_guarded(&row).await {
            Ok(()) => {
                tracing::info!(appointment_id = %row.id, status = ?row.status, "appointment updated");
                Ok(row)
            }
            Err(DatabaseError::Duplicate) => Err(AppError::SlotConflict),
            Err(DatabaseError::NotFound) => {
                Err(AppError::NotFound("appointment not found".into()))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn delete_appointment(&self, id: Uuid) -> AppResult<()> {
        if !self.appointments.delete(id).await? {
            return Err(AppError::NotFound("appointment not found".into()));
        }
        tracing::info!(appointment_id = %id, "appointment deleted");
        Ok(())
    }

    // Listing

    /// Appointments ordered by closeness to now, optionally filtered,
    /// paginated at a fixed page size.
    pub async fn list_appointments(
        &self,
        filter: AppointmentFilter,
        page: usize,
    ) -> AppResult<Page<Appointment>> {
        let rows = self.appointments.list(&filter).await?;
        Ok(paginate(sort_by_proximity(rows, self.clock.now()), page))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::{datetime, time};
    use uuid::Uuid;

    use super::*;
    use crate::clock::FixedClock;
    use crate::db::Weekday;
    use crate::scheduling::store::memory::{MemoryAppointmentStore, MemoryCounselorStore};
    use crate::scheduling::testutil;

    // The fixed clock sits on Monday 2026-03-09 08:00 local time.
    fn scheduler() -> Scheduler {
        Scheduler::new(
            Arc::new(MemoryCounselorStore::default()),
            Arc::new(MemoryAppointmentStore::default()),
            Arc::new(FixedClock(datetime!(2026-03-09 08:00 UTC))),
        )
    }

    fn new_counselor() -> NewCounselor {
        NewCounselor {
            name: "Ust. Hasan".into(),
            specialization: "Fiqh Muamalah".into(),
            bio: None,
            days: vec![Weekday::Monday, Weekday::Wednesday],
            start_time: time!(09:00),
            end_time: time!(11:00),
            active: true,
        }
    }

    fn booking_request(counselor_id: Uuid, date: &str, time: &str) -> NewAppointment {
        NewAppointment {
            counselor_id,
            name: "Budi Santoso".into(),
            email: "budi@example.com".into(),
            phone: "081234567890".into(),
            date: date.into(),
            time: time.into(),
            purpose: "Konsultasi waris".into(),
        }
    }

    fn slot_strings(slots: &[time::Time]) -> Vec<String> {
        slots.iter().map(|t| hhmm::format(*t)).collect()
    }

    #[tokio::test]
    async fn booking_scenario_round_trip() {
        let s = scheduler();
        let c = s.create_counselor(new_counselor()).await.unwrap();

        let slots = s.available_slots(c.id, testutil::monday()).await.unwrap();
        assert_eq!(slot_strings(&slots), ["09:00", "09:30", "10:00", "10:30"]);

        let appt = s
            .create_appointment(booking_request(c.id, "2026-03-09", "09:30"))
            .await
            .unwrap();
        assert_eq!(appt.status, AppointmentStatus::Pending);

        let slots = s.available_slots(c.id, testutil::monday()).await.unwrap();
        assert_eq!(slot_strings(&slots), ["09:00", "10:00", "10:30"]);

        // Rejecting the booking returns its slot to the pool.
        let patch = UpdateAppointment {
            status: Some(AppointmentStatus::Rejected),
            ..Default::default()
        };
        s.update_appointment(appt.id, patch).await.unwrap();

        let slots = s.available_slots(c.id, testutil::monday()).await.unwrap();
        assert_eq!(slot_strings(&slots), ["09:00", "09:30", "10:00", "10:30"]);
    }

    #[tokio::test]
    async fn approved_bookings_also_block_their_slot() {
        let s = scheduler();
        let c = s.create_counselor(new_counselor()).await.unwrap();
        let appt = s
            .create_appointment(booking_request(c.id, "2026-03-09", "10:00"))
            .await
            .unwrap();

        let patch = UpdateAppointment {
            status: Some(AppointmentStatus::Approved),
            ..Default::default()
        };
        s.update_appointment(appt.id, patch).await.unwrap();

        let slots = s.available_slots(c.id, testutil::monday()).await.unwrap();
        assert!(!slots.contains(&time!(10:00)));
    }

    #[tokio::test]
    async fn second_booking_on_same_slot_is_a_conflict() {
        let s = scheduler();
        let c = s.create_counselor(new_counselor()).await.unwrap();
        s.create_appointment(booking_request(c.id, "2026-03-09", "09:00"))
            .await
            .unwrap();

        let err = s
            .create_appointment(booking_request(c.id, "2026-03-09", "09:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SlotConflict));
    }

    #[tokio::test]
    async fn concurrent_bookings_yield_one_success_one_conflict() {
        let s = scheduler();
        let c = s.create_counselor(new_counselor()).await.unwrap();

        let (a, b) = tokio::join!(
            s.create_appointment(booking_request(c.id, "2026-03-09", "09:30")),
            s.create_appointment(booking_request(c.id, "2026-03-09", "09:30")),
        );
        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        let conflicts = [&a, &b]
            .iter()
            .filter(|r| matches!(r, Err(AppError::SlotConflict)))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(conflicts, 1);
    }

    #[tokio::test]
    async fn past_date_is_rejected_with_field_message() {
        let s = scheduler();
        let c = s.create_counselor(new_counselor()).await.unwrap();

        let err = s
            .create_appointment(booking_request(c.id, "2026-03-02", "09:00"))
            .await
            .unwrap_err();
        let AppError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert!(fields.iter().any(|f| f.field == "date"));
    }

    #[tokio::test]
    async fn malformed_fields_are_reported_per_field() {
        let s = scheduler();
        let c = s.create_counselor(new_counselor()).await.unwrap();

        let mut req = booking_request(c.id, "09-03-2026", "9h30");
        req.email = "not-an-email".into();
        req.name = String::new();

        let err = s.create_appointment(req).await.unwrap_err();
        let AppError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        for field in ["date", "time", "email", "name"] {
            assert!(
                fields.iter().any(|f| f.field == field),
                "missing message for {field}"
            );
        }
    }

    #[tokio::test]
    async fn off_schedule_time_is_validation_not_conflict() {
        let s = scheduler();
        let c = s.create_counselor(new_counselor()).await.unwrap();

        // Tuesday is not in the schedule at all.
        let err = s
            .create_appointment(booking_request(c.id, "2026-03-10", "09:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // Monday, but off the 30-minute grid.
        let err = s
            .create_appointment(booking_request(c.id, "2026-03-09", "09:15"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_counselor_is_not_found() {
        let s = scheduler();
        let err = s
            .create_appointment(booking_request(Uuid::new_v4(), "2026-03-09", "09:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn inactive_counselor_offers_no_slots_and_accepts_no_bookings() {
        let s = scheduler();
        let mut req = new_counselor();
        req.active = false;
        let c = s.create_counselor(req).await.unwrap();

        let slots = s.available_slots(c.id, testutil::monday()).await.unwrap();
        assert!(slots.is_empty());

        let err = s
            .create_appointment(booking_request(c.id, "2026-03-09", "09:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn reapproving_a_rejected_booking_conflicts_when_slot_was_retaken() {
        let s = scheduler();
        let c = s.create_counselor(new_counselor()).await.unwrap();

        let first = s
            .create_appointment(booking_request(c.id, "2026-03-09", "09:00"))
            .await
            .unwrap();
        s.update_appointment(
            first.id,
            UpdateAppointment {
                status: Some(AppointmentStatus::Rejected),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        // Another requester takes the freed slot.
        s.create_appointment(booking_request(c.id, "2026-03-09", "09:00"))
            .await
            .unwrap();

        let err = s
            .update_appointment(
                first.id,
                UpdateAppointment {
                    status: Some(AppointmentStatus::Approved),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SlotConflict));
    }

    #[tokio::test]
    async fn full_edit_moves_booking_and_frees_old_slot() {
        let s = scheduler();
        let c = s.create_counselor(new_counselor()).await.unwrap();
        let appt = s
            .create_appointment(booking_request(c.id, "2026-03-09", "09:00"))
            .await
            .unwrap();

        let patch = UpdateAppointment {
            time: Some("10:30".into()),
            name: Some("Budi S.".into()),
            ..Default::default()
        };
        let updated = s.update_appointment(appt.id, patch).await.unwrap();
        assert_eq!(updated.time, time!(10:30));
        assert_eq!(updated.name, "Budi S.");

        let slots = s.available_slots(c.id, testutil::monday()).await.unwrap();
        assert!(slots.contains(&time!(09:00)));
        assert!(!slots.contains(&time!(10:30)));
    }

    #[tokio::test]
    async fn edit_onto_occupied_slot_is_a_conflict() {
        let s = scheduler();
        let c = s.create_counselor(new_counselor()).await.unwrap();
        s.create_appointment(booking_request(c.id, "2026-03-09", "09:00"))
            .await
            .unwrap();
        let second = s
            .create_appointment(booking_request(c.id, "2026-03-09", "09:30"))
            .await
            .unwrap();

        let err = s
            .update_appointment(
                second.id,
                UpdateAppointment {
                    time: Some("09:00".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SlotConflict));
    }

    #[tokio::test]
    async fn delete_returns_not_found_for_missing_booking() {
        let s = scheduler();
        let err = s.delete_appointment(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn counselor_with_live_bookings_cannot_be_deleted() {
        let s = scheduler();
        let c = s.create_counselor(new_counselor()).await.unwrap();
        let appt = s
            .create_appointment(booking_request(c.id, "2026-03-09", "09:00"))
            .await
            .unwrap();

        let err = s.delete_counselor(c.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Once the booking is rejected the counselor can go.
        s.update_appointment(
            appt.id,
            UpdateAppointment {
                status: Some(AppointmentStatus::Rejected),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        s.delete_counselor(c.id).await.unwrap();
    }

    #[tokio::test]
    async fn availability_change_only_affects_future_slot_generation() {
        let s = scheduler();
        let c = s.create_counselor(new_counselor()).await.unwrap();
        let appt = s
            .create_appointment(booking_request(c.id, "2026-03-09", "09:00"))
            .await
            .unwrap();

        // Shrink the window so 09:00 is no longer offered.
        s.update_counselor(
            c.id,
            UpdateCounselor {
                start_time: Some(time!(10:00)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let slots = s.available_slots(c.id, testutil::monday()).await.unwrap();
        assert_eq!(slot_strings(&slots), ["10:00", "10:30"]);

        // The existing booking is untouched and can still be approved.
        let updated = s
            .update_appointment(
                appt.id,
                UpdateAppointment {
                    status: Some(AppointmentStatus::Approved),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, AppointmentStatus::Approved);
    }

    #[tokio::test]
    async fn listing_orders_by_proximity_and_filters() {
        let s = scheduler();
        let c = s.create_counselor(new_counselor()).await.unwrap();

        // Clock is Monday 08:00; bookings land at 09:00, 10:30 (same day)
        // and Wednesday 09:00.
        let near = s
            .create_appointment(booking_request(c.id, "2026-03-09", "09:00"))
            .await
            .unwrap();
        let mid = s
            .create_appointment(booking_request(c.id, "2026-03-09", "10:30"))
            .await
            .unwrap();
        let far = s
            .create_appointment(booking_request(c.id, "2026-03-11", "09:00"))
            .await
            .unwrap();

        let page = s
            .list_appointments(AppointmentFilter::default(), 1)
            .await
            .unwrap();
        let ids: Vec<_> = page.items.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![near.id, mid.id, far.id]);

        let page = s
            .list_appointments(
                AppointmentFilter {
                    status: Some(AppointmentStatus::Pending),
                    search: Some("waris".into()),
                },
                1,
            )
            .await
            .unwrap();
        assert_eq!(page.items.len(), 3);

        let page = s
            .list_appointments(
                AppointmentFilter {
                    status: None,
                    search: Some("zakat".into()),
                },
                1,
            )
            .await
            .unwrap();
        assert!(page.items.is_empty());
    }
}
