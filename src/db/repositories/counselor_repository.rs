use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{Counselor, DatabaseError};
use crate::scheduling::store::CounselorStore;

const COLUMNS: &str =
    "id, name, specialization, bio, days, start_time, end_time, active, created_at, updated_at";

pub struct CounselorRepository {
    pool: PgPool,
}

impl CounselorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CounselorStore for CounselorRepository {
    async fn insert(&self, row: &Counselor) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO counselors \
             (id, name, specialization, bio, days, start_time, end_time, active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(row.id)
        .bind(&row.name)
        .bind(&row.specialization)
        .bind(&row.bio)
        .bind(&row.days)
        .bind(row.start_time)
        .bind(row.end_time)
        .bind(row.active)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;
        Ok(())
    }

    async fn update(&self, row: &Counselor) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE counselors SET \
             name = $2, specialization = $3, bio = $4, days = $5, \
             start_time = $6, end_time = $7, active = $8, updated_at = $9 \
             WHERE id = $1",
        )
        .bind(row.id)
        .bind(&row.name)
        .bind(&row.specialization)
        .bind(&row.bio)
        .bind(&row.days)
        .bind(row.start_time)
        .bind(row.end_time)
        .bind(row.active)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Counselor>, DatabaseError> {
        sqlx::query_as::<_, Counselor>(&format!(
            "SELECT {COLUMNS} FROM counselors WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Counselor>, DatabaseError> {
        let sql = if active_only {
            format!("SELECT {COLUMNS} FROM counselors WHERE active ORDER BY name")
        } else {
            format!("SELECT {COLUMNS} FROM counselors ORDER BY name")
        };
        sqlx::query_as::<_, Counselor>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM counselors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;
        Ok(result.rows_affected() > 0)
    }
}
