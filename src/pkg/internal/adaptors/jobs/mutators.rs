use sqlx::PgConnection;
use uuid::Uuid;

use crate::pkg::internal::adaptors::jobs::spec::{JobEntry, JobStatus};
use crate::pkg::server::handlers::jobs::{CreateJobInput, UpdateJobInput};
use crate::prelude::Result;

const JOB_COLUMNS: &str =
    "id, title, description, location, deadline, created_at, college_id, posted_by, status";

pub struct JobMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> JobMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        JobMutator { pool }
    }

    /// College scope and poster come from the resolved admin, never the
    /// request body. New jobs start out active.
    pub async fn create(
        &mut self,
        job: &CreateJobInput,
        college_id: Uuid,
        posted_by: Uuid,
    ) -> Result<JobEntry> {
        let row = sqlx::query_as::<_, JobEntry>(&format!(
            r#"
            INSERT INTO jobs (title, description, location, deadline, college_id, posted_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.location)
        .bind(job.deadline)
        .bind(college_id)
        .bind(posted_by)
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(&mut self, id: Uuid, job: UpdateJobInput) -> Result<Option<JobEntry>> {
        let mut sets = Vec::new();
        let mut param_count = 1;

        if job.title.is_some() {
            param_count += 1;
            sets.push(format!("title = ${}", param_count));
        }
        if job.description.is_some() {
            param_count += 1;
            sets.push(format!("description = ${}", param_count));
        }
        if job.location.is_some() {
            param_count += 1;
            sets.push(format!("location = ${}", param_count));
        }
        if job.deadline.is_some() {
            param_count += 1;
            sets.push(format!("deadline = ${}", param_count));
        }

        if sets.is_empty() {
            let row = sqlx::query_as::<_, JobEntry>(&format!(
                "SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&mut *self.pool)
            .await?;
            return Ok(row);
        }

        let query = format!(
            "UPDATE jobs SET {} WHERE id = $1 RETURNING {JOB_COLUMNS}",
            sets.join(", ")
        );

        let mut q = sqlx::query_as::<_, JobEntry>(&query).bind(id);

        if let Some(title) = job.title {
            q = q.bind(title);
        }
        if let Some(description) = job.description {
            q = q.bind(description);
        }
        if let Some(location) = job.location {
            q = q.bind(location);
        }
        if let Some(deadline) = job.deadline {
            q = q.bind(deadline);
        }
        let row = q.fetch_optional(&mut *self.pool).await?;
        Ok(row)
    }

    pub async fn set_status(&mut self, id: Uuid, status: JobStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE jobs SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&mut *self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&mut self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&mut *self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
