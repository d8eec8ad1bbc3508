use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    pkg::{
        internal::{
            adaptors::{
                applications::{
                    mutators::ApplicationMutator,
                    selectors::ApplicationSelector,
                    spec::{ApplicationEntry, ApplicationWithJob, ApplicationWithStudent},
                },
                jobs::{selectors::JobSelector, spec::JobEntry},
            },
            auth::{Role, User},
            deadline,
        },
        server::state::{AppState, GetTxn},
    },
    prelude::{Error, Result},
};

#[derive(Deserialize)]
pub struct ApplyInput {
    pub job_id: Uuid,
}

/// The gate a student has to pass before the insert is attempted. The
/// one-application rule itself is left to the store's unique constraint.
fn check_eligibility(job: &JobEntry, student_college: Uuid, today: NaiveDate) -> Result<()> {
    if job.college_id != student_college {
        return Err(Error::Forbidden("job belongs to another college"));
    }
    if !job.is_open(today) {
        return Err(Error::JobClosed);
    }
    Ok(())
}

pub async fn apply(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Json(input): Json<ApplyInput>,
) -> Result<(StatusCode, Json<ApplicationEntry>)> {
    if user.role != Role::Student {
        return Err(Error::Forbidden("student role required"));
    }
    let college_id = user.college()?;
    let mut tx = state.db_pool.begin_txn().await?;
    let job = JobSelector::new(&mut tx)
        .get_by_id(input.job_id)
        .await?
        .ok_or(Error::NotFound("job"))?;
    check_eligibility(&job, college_id, deadline::today_ist())?;
    let application = ApplicationMutator::new(&mut tx)
        .create(input.job_id, user.id)
        .await?;
    tx.commit().await?;
    tracing::info!("student {} applied to job {}", user.id, input.job_id);
    Ok((StatusCode::CREATED, Json(application)))
}

/// One endpoint, scope-narrowed per role: admins of the job's college see
/// every applicant, a student sees only their own row.
pub async fn list_for_job(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ApplicationWithStudent>>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let job = JobSelector::new(&mut tx)
        .get_by_id(id)
        .await?
        .ok_or(Error::NotFound("job"))?;
    let applications = match user.role {
        Role::Admin => {
            if job.college_id != user.require_admin()? {
                return Err(Error::Forbidden("job belongs to another college"));
            }
            ApplicationSelector::new(&mut tx).for_job(id).await?
        }
        Role::Student => {
            ApplicationSelector::new(&mut tx)
                .own_for_job(id, user.id)
                .await?
        }
    };
    Ok(Json(applications))
}

pub async fn list_for_student(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Path(student_id): Path<Uuid>,
) -> Result<Json<Vec<ApplicationWithJob>>> {
    if user.id != student_id {
        return Err(Error::Forbidden(
            "applications are visible to their owner only",
        ));
    }
    let mut tx = state.db_pool.begin_txn().await?;
    let applications = ApplicationSelector::new(&mut tx)
        .for_student(student_id)
        .await?;
    Ok(Json(applications))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkg::internal::adaptors::jobs::spec::JobStatus;
    use chrono::Utc;

    fn job(college_id: Uuid, status: JobStatus, deadline: NaiveDate) -> JobEntry {
        JobEntry {
            id: Uuid::new_v4(),
            title: "Campus Ambassador".into(),
            description: "Represent the placement cell on campus".into(),
            location: "Remote".into(),
            deadline,
            created_at: Utc::now(),
            college_id,
            posted_by: Uuid::new_v4(),
            status,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_college_open_job_is_eligible() {
        let college = Uuid::new_v4();
        let today = date(2025, 6, 10);
        let job = job(college, JobStatus::Active, date(2025, 6, 20));
        assert!(check_eligibility(&job, college, today).is_ok());
    }

    #[test]
    fn cross_college_apply_is_forbidden() {
        let today = date(2025, 6, 10);
        let job = job(Uuid::new_v4(), JobStatus::Active, date(2025, 6, 20));
        let err = check_eligibility(&job, Uuid::new_v4(), today).unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[test]
    fn inactive_job_is_closed() {
        let college = Uuid::new_v4();
        let today = date(2025, 6, 10);
        let job = job(college, JobStatus::Inactive, date(2025, 6, 20));
        let err = check_eligibility(&job, college, today).unwrap_err();
        assert!(matches!(err, Error::JobClosed));
    }

    #[test]
    fn expired_job_is_closed_even_when_active() {
        let college = Uuid::new_v4();
        let today = date(2025, 6, 10);
        let job = job(college, JobStatus::Active, date(2025, 6, 9));
        let err = check_eligibility(&job, college, today).unwrap_err();
        assert!(matches!(err, Error::JobClosed));
    }

    #[test]
    fn deadline_day_applications_still_go_through() {
        let college = Uuid::new_v4();
        let today = date(2025, 6, 10);
        let job = job(college, JobStatus::Active, today);
        assert!(check_eligibility(&job, college, today).is_ok());
    }

    #[test]
    fn college_mismatch_wins_over_closed_state() {
        let today = date(2025, 6, 10);
        let job = job(Uuid::new_v4(), JobStatus::Inactive, date(2025, 6, 1));
        let err = check_eligibility(&job, Uuid::new_v4(), today).unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }
}
