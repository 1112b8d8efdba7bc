use async_trait::async_trait;
use time::{Date, Time};
use uuid::Uuid;

use crate::db::{Appointment, AppointmentFilter, Counselor, DatabaseError};

/// Persistence contract for the counselor directory. Rows arrive fully
/// built (ids and timestamps assigned by the caller) so implementations
/// stay deterministic.
#[async_trait]
pub trait CounselorStore: Send + Sync {
    async fn insert(&self, row: &Counselor) -> Result<(), DatabaseError>;
    async fn update(&self, row: &Counselor) -> Result<(), DatabaseError>;
    async fn get(&self, id: Uuid) -> Result<Option<Counselor>, DatabaseError>;
    async fn list(&self, active_only: bool) -> Result<Vec<Counselor>, DatabaseError>;
    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;
}

/// Persistence contract for the booking ledger.
///
/// The guarded writes are the race-safe half of slot validation: a write
/// that would leave two non-rejected bookings on the same
/// (counselor, date, time) must fail with `DatabaseError::Duplicate`, and
/// the check must be atomic with the write itself.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn insert_guarded(&self, row: &Appointment) -> Result<(), DatabaseError>;

    /// Replaces an existing booking under the same slot guard; the row's
    /// own id is excluded from the conflict check.
    async fn update_guarded(&self, row: &Appointment) -> Result<(), DatabaseError>;

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, DatabaseError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;

    /// Times already consumed on one counselor's day by non-rejected
    /// bookings, ascending.
    async fn booked_times(
        &self,
        counselor_id: Uuid,
        date: Date,
    ) -> Result<Vec<Time>, DatabaseError>;

    async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, DatabaseError>;

    /// Number of non-rejected bookings referencing a counselor; used to
    /// block counselor deletion.
    async fn count_blocking(&self, counselor_id: Uuid) -> Result<i64, DatabaseError>;
}
