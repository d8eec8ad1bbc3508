use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{pkg::internal::deadline, prelude::Error};

/// Closed set: anything else coming over the wire is `InvalidStatus`,
/// never a stored string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Active,
    Inactive,
}

impl FromStr for JobStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "active" => Ok(JobStatus::Active),
            "inactive" => Ok(JobStatus::Inactive),
            other => Err(Error::InvalidStatus(other.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone)]
pub struct JobEntry {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub deadline: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub college_id: Uuid,
    pub posted_by: Uuid,
    pub status: JobStatus,
}

impl JobEntry {
    /// Effective visibility: shown to students and open for applications.
    pub fn is_open(&self, today: NaiveDate) -> bool {
        self.status == JobStatus::Active && !deadline::is_expired(self.deadline, today)
    }
}

#[derive(Serialize, FromRow, Debug)]
pub struct JobWithCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub job: JobEntry,
    pub applications_count: i64,
}

/// Landing-widget row: the newest job platform-wide.
#[derive(FromRow, Debug)]
pub struct RecentJob {
    pub title: String,
    pub company: String,
    pub deadline: NaiveDate,
    pub applicants: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(status: JobStatus, deadline: NaiveDate) -> JobEntry {
        JobEntry {
            id: Uuid::new_v4(),
            title: "Backend Intern".into(),
            description: "Build and maintain campus services".into(),
            location: "Pune".into(),
            deadline,
            created_at: Utc::now(),
            college_id: Uuid::new_v4(),
            posted_by: Uuid::new_v4(),
            status,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("active".parse::<JobStatus>().is_ok());
        assert!("inactive".parse::<JobStatus>().is_ok());
        let err = "archived".parse::<JobStatus>().unwrap_err();
        assert!(matches!(err, Error::InvalidStatus(s) if s == "archived"));
        // casing is not forgiven either
        assert!("Active".parse::<JobStatus>().is_err());
    }

    #[test]
    fn visibility_needs_active_status_and_unexpired_deadline() {
        let today = date(2025, 6, 10);
        assert!(job(JobStatus::Active, today).is_open(today));
        assert!(job(JobStatus::Active, date(2025, 7, 1)).is_open(today));
        assert!(!job(JobStatus::Inactive, date(2025, 7, 1)).is_open(today));
        assert!(!job(JobStatus::Active, date(2025, 6, 9)).is_open(today));
    }
}
