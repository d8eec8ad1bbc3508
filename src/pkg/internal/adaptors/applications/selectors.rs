use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    pkg::internal::adaptors::applications::spec::{ApplicationWithJob, ApplicationWithStudent},
    prelude::Result,
};

const STUDENT_JOIN: &str = "SELECT a.id, a.job_id, a.student_id, a.applied_at,
        u.name AS student_name, u.email AS student_email, u.college_id AS student_college_id
     FROM job_applications a
     JOIN users u ON u.id = a.student_id";

pub struct ApplicationSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ApplicationSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ApplicationSelector { pool }
    }

    /// Every application for a job, applicant attached. Callers gate on
    /// college scope before handing this to an admin.
    pub async fn for_job(&mut self, job_id: Uuid) -> Result<Vec<ApplicationWithStudent>> {
        let rows = sqlx::query_as::<_, ApplicationWithStudent>(&format!(
            "{STUDENT_JOIN} WHERE a.job_id = $1 ORDER BY a.applied_at DESC"
        ))
        .bind(job_id)
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(rows)
    }

    /// The viewer's own rows for a job: at most one, empty when they have
    /// not applied.
    pub async fn own_for_job(
        &mut self,
        job_id: Uuid,
        student_id: Uuid,
    ) -> Result<Vec<ApplicationWithStudent>> {
        let rows = sqlx::query_as::<_, ApplicationWithStudent>(&format!(
            "{STUDENT_JOIN} WHERE a.job_id = $1 AND a.student_id = $2 ORDER BY a.applied_at DESC"
        ))
        .bind(job_id)
        .bind(student_id)
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn for_student(&mut self, student_id: Uuid) -> Result<Vec<ApplicationWithJob>> {
        let rows = sqlx::query_as::<_, ApplicationWithJob>(
            "SELECT a.id, a.job_id, a.student_id, a.applied_at,
                    j.title AS job_title, j.location AS job_location,
                    j.deadline AS job_deadline, j.status AS job_status
             FROM job_applications a
             JOIN jobs j ON j.id = a.job_id
             WHERE a.student_id = $1
             ORDER BY a.applied_at DESC",
        )
        .bind(student_id)
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(rows)
    }
}
