use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};
use time::{Date, Time};
use uuid::Uuid;

use crate::db::{Appointment, AppointmentFilter, AppointmentStatus, DatabaseError};
use crate::scheduling::store::AppointmentStore;

const COLUMNS: &str =
    "id, counselor_id, name, email, phone, date, time, purpose, status, created_at, updated_at";

pub struct AppointmentRepository {
    pool: PgPool,
}

impl AppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentStore for AppointmentRepository {
    async fn insert_guarded(&self, row: &Appointment) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        // Lock any current holder of the slot; the partial unique index
        // still backstops the empty-slot race between two inserts.
        let holder: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM appointments \
             WHERE counselor_id = $1 AND date = $2 AND time = $3 AND status <> 'rejected' \
             FOR UPDATE",
        )
        .bind(row.counselor_id)
        .bind(row.date)
        .bind(row.time)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;
        if holder.is_some() {
            return Err(DatabaseError::Duplicate);
        }

        sqlx::query(
            "INSERT INTO appointments \
             (id, counselor_id, name, email, phone, date, time, purpose, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(row.id)
        .bind(row.counselor_id)
        .bind(&row.name)
        .bind(&row.email)
        .bind(&row.phone)
        .bind(row.date)
        .bind(row.time)
        .bind(&row.purpose)
        .bind(row.status)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        Ok(())
    }

    async fn update_guarded(&self, row: &Appointment) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        if row.status != AppointmentStatus::Rejected {
            let holder: Option<(Uuid,)> = sqlx::query_as(
                "SELECT id FROM appointments \
                 WHERE counselor_id = $1 AND date = $2 AND time = $3 \
                 AND status <> 'rejected' AND id <> $4 \
                 FOR UPDATE",
            )
            .bind(row.counselor_id)
            .bind(row.date)
            .bind(row.time)
            .bind(row.id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(DatabaseError::from_sqlx)?;
            if holder.is_some() {
                return Err(DatabaseError::Duplicate);
            }
        }

        let result = sqlx::query(
            "UPDATE appointments SET \
             counselor_id = $2, name = $3, email = $4, phone = $5, \
             date = $6, time = $7, purpose = $8, status = $9, updated_at = $10 \
             WHERE id = $1",
        )
        .bind(row.id)
        .bind(row.counselor_id)
        .bind(&row.name)
        .bind(&row.email)
        .bind(&row.phone)
        .bind(row.date)
        .bind(row.time)
        .bind(&row.purpose)
        .bind(row.status)
        .bind(row.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, DatabaseError> {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {COLUMNS} FROM appointments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn booked_times(
        &self,
        counselor_id: Uuid,
        date: Date,
    ) -> Result<Vec<Time>, DatabaseError> {
        let rows: Vec<(Time,)> = sqlx::query_as(
            "SELECT time FROM appointments \
             WHERE counselor_id = $1 AND date = $2 AND status <> 'rejected' \
             ORDER BY time",
        )
        .bind(counselor_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;
        Ok(rows.into_iter().map(|(t,)| t).collect())
    }

    async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, DatabaseError> {
        let mut query = QueryBuilder::new(format!("SELECT {COLUMNS} FROM appointments WHERE 1=1"));
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            query
                .push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR purpose ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        query
            .build_query_as::<Appointment>()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)
    }

    async fn count_blocking(&self, counselor_id: Uuid) -> Result<i64, DatabaseError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM appointments \
             WHERE counselor_id = $1 AND status <> 'rejected'",
        )
        .bind(counselor_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }
}
