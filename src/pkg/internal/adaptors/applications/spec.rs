use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::pkg::internal::adaptors::jobs::spec::JobStatus;

#[derive(Serialize, FromRow, Debug, Clone)]
pub struct ApplicationEntry {
    pub id: Uuid,
    pub job_id: Uuid,
    pub student_id: Uuid,
    pub applied_at: DateTime<Utc>,
}

/// Admin review row: the application joined with its applicant.
#[derive(Serialize, FromRow, Debug)]
pub struct ApplicationWithStudent {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub application: ApplicationEntry,
    pub student_name: String,
    pub student_email: String,
    pub student_college_id: Uuid,
}

/// Student history row: the application joined with the job's public
/// fields. Rows whose job has been deleted never materialize (inner join).
#[derive(Serialize, FromRow, Debug)]
pub struct ApplicationWithJob {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub application: ApplicationEntry,
    pub job_title: String,
    pub job_location: String,
    pub job_deadline: NaiveDate,
    pub job_status: JobStatus,
}
