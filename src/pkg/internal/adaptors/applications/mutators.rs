use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    pkg::internal::adaptors::applications::spec::ApplicationEntry,
    prelude::{Error, Result},
};

pub struct ApplicationMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ApplicationMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ApplicationMutator { pool }
    }

    /// One application per (job, student), enforced by the store's unique
    /// constraint so a concurrent double-apply loses cleanly: the second
    /// writer's violation surfaces as `AlreadyApplied`.
    pub async fn create(&mut self, job_id: Uuid, student_id: Uuid) -> Result<ApplicationEntry> {
        let row = sqlx::query_as::<_, ApplicationEntry>(
            r#"
            INSERT INTO job_applications (job_id, student_id)
            VALUES ($1, $2)
            RETURNING id, job_id, student_id, applied_at
            "#,
        )
        .bind(job_id)
        .bind(student_id)
        .fetch_one(&mut *self.pool)
        .await;
        match row {
            Ok(application) => Ok(application),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(Error::AlreadyApplied)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Cascade half of job deletion; deleting zero rows is fine, which is
    /// what makes a re-run of the whole delete idempotent.
    pub async fn delete_for_job(&mut self, job_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM job_applications WHERE job_id = $1")
            .bind(job_id)
            .execute(&mut *self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
