use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use validator::{Validate, ValidationError};

use crate::{
    pkg::{
        internal::{
            adaptors::{
                applications::mutators::ApplicationMutator,
                jobs::{
                    mutators::JobMutator,
                    selectors::{JobFilter, JobSelector},
                    spec::{JobEntry, JobStatus, JobWithCount},
                },
            },
            auth::{Role, User},
            deadline,
        },
        server::state::{AppState, GetTxn},
    },
    prelude::{Error, Result},
};

#[derive(Deserialize, Validate)]
pub struct CreateJobInput {
    #[validate(length(min = 3, message = "title must be at least 3 characters"))]
    pub title: String,
    #[validate(length(min = 10, message = "description must be at least 10 characters"))]
    pub description: String,
    #[validate(length(min = 1, message = "location is required"))]
    pub location: String,
    #[validate(custom(function = deadline_after_today, message = "deadline must be after today"))]
    pub deadline: NaiveDate,
}

#[derive(Deserialize, Validate, Default)]
pub struct UpdateJobInput {
    #[validate(length(min = 3, message = "title must be at least 3 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 10, message = "description must be at least 10 characters"))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "location is required"))]
    pub location: Option<String>,
    #[validate(custom(function = deadline_after_today, message = "deadline must be after today"))]
    pub deadline: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct SetStatusInput {
    pub status: String,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub title: Option<String>,
    pub location: Option<String>,
    pub deadline: Option<NaiveDate>,
}

fn deadline_after_today(deadline: &NaiveDate) -> std::result::Result<(), ValidationError> {
    if *deadline > deadline::today_ist() {
        Ok(())
    } else {
        Err(ValidationError::new("deadline"))
    }
}

/// Students are additionally restricted to currently-open jobs; admins see
/// everything in their college.
fn visibility_bound(user: &User) -> Option<NaiveDate> {
    match user.role {
        Role::Student => Some(deadline::today_ist()),
        Role::Admin => None,
    }
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
) -> Result<Json<Vec<JobWithCount>>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let jobs = JobSelector::new(&mut tx)
        .list_for_college(user.college()?, &JobFilter::default(), visibility_bound(&user))
        .await?;
    Ok(Json(jobs))
}

pub async fn search(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<JobWithCount>>> {
    let filter = JobFilter {
        title: params.title,
        location: params.location,
        deadline_before: params.deadline,
    };
    let mut tx = state.db_pool.begin_txn().await?;
    let jobs = JobSelector::new(&mut tx)
        .list_for_college(user.college()?, &filter, visibility_bound(&user))
        .await?;
    Ok(Json(jobs))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Json(input): Json<CreateJobInput>,
) -> Result<(StatusCode, Json<JobEntry>)> {
    let college_id = user.require_admin()?;
    input.validate()?;
    let mut tx = state.db_pool.begin_txn().await?;
    let job = JobMutator::new(&mut tx)
        .create(&input, college_id, user.id)
        .await?;
    tx.commit().await?;
    tracing::info!("job {} posted by {}", job.id, user.id);
    Ok((StatusCode::CREATED, Json(job)))
}

pub async fn retrieve(
    State(state): State<AppState>,
    Extension(_user): Extension<Arc<User>>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<JobWithCount>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let job = JobSelector::new(&mut tx)
        .get_with_count(id)
        .await?
        .ok_or(Error::NotFound("job"))?;
    Ok(Json(job))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Path(id): Path<uuid::Uuid>,
    Json(input): Json<UpdateJobInput>,
) -> Result<Json<JobEntry>> {
    let college_id = user.require_admin()?;
    input.validate()?;
    let mut tx = state.db_pool.begin_txn().await?;
    let job = JobSelector::new(&mut tx)
        .get_by_id(id)
        .await?
        .ok_or(Error::NotFound("job"))?;
    if job.college_id != college_id {
        return Err(Error::Forbidden("job belongs to another college"));
    }
    let updated = JobMutator::new(&mut tx)
        .update(id, input)
        .await?
        .ok_or(Error::NotFound("job"))?;
    tx.commit().await?;
    Ok(Json(updated))
}

pub async fn set_status(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Path(id): Path<uuid::Uuid>,
    Json(input): Json<SetStatusInput>,
) -> Result<Json<Value>> {
    let college_id = user.require_admin()?;
    let status: JobStatus = input.status.parse()?;
    let mut tx = state.db_pool.begin_txn().await?;
    let job = JobSelector::new(&mut tx)
        .get_by_id(id)
        .await?
        .ok_or(Error::NotFound("job"))?;
    if job.college_id != college_id {
        return Err(Error::Forbidden("job belongs to another college"));
    }
    JobMutator::new(&mut tx).set_status(id, status).await?;
    tx.commit().await?;
    Ok(Json(json!({"success": true})))
}

/// Applications go first, then the job, in one transaction. Re-running a
/// half-applied delete succeeds: deleting zero applications is a no-op.
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<User>>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<Value>> {
    let college_id = user.require_admin()?;
    let mut tx = state.db_pool.begin_txn().await?;
    let job = JobSelector::new(&mut tx)
        .get_by_id(id)
        .await?
        .ok_or(Error::NotFound("job"))?;
    if job.college_id != college_id {
        return Err(Error::Forbidden("job belongs to another college"));
    }
    let removed = ApplicationMutator::new(&mut tx).delete_for_job(id).await?;
    JobMutator::new(&mut tx).delete(id).await?;
    tx.commit().await?;
    tracing::info!("job {} deleted along with {} applications", id, removed);
    Ok(Json(json!({"success": true})))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn valid_input() -> CreateJobInput {
        CreateJobInput {
            title: "Backend Intern".into(),
            description: "Build and maintain campus placement services".into(),
            location: "Pune".into(),
            deadline: deadline::today_ist() + Duration::days(14),
        }
    }

    #[test]
    fn valid_posting_passes() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn short_title_is_rejected_with_a_field_message() {
        let input = CreateJobInput {
            title: "ab".into(),
            ..valid_input()
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn short_description_is_rejected() {
        let input = CreateJobInput {
            description: "too short".into(),
            ..valid_input()
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("description"));
    }

    #[test]
    fn empty_location_is_rejected() {
        let input = CreateJobInput {
            location: "".into(),
            ..valid_input()
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("location"));
    }

    #[test]
    fn deadline_must_be_strictly_after_today() {
        let today = CreateJobInput {
            deadline: deadline::today_ist(),
            ..valid_input()
        };
        assert!(today.validate().unwrap_err().field_errors().contains_key("deadline"));

        let past = CreateJobInput {
            deadline: deadline::today_ist() - Duration::days(1),
            ..valid_input()
        };
        assert!(past.validate().is_err());
    }

    #[test]
    fn update_revalidates_only_present_fields() {
        let nothing = UpdateJobInput::default();
        assert!(nothing.validate().is_ok());

        let bad_title = UpdateJobInput {
            title: Some("ab".into()),
            ..Default::default()
        };
        assert!(bad_title.validate().is_err());

        let ok_title = UpdateJobInput {
            title: Some("Data Analyst".into()),
            ..Default::default()
        };
        assert!(ok_title.validate().is_ok());
    }

    #[test]
    fn multiple_violations_report_each_field() {
        let input = CreateJobInput {
            title: "x".into(),
            description: "y".into(),
            location: "".into(),
            deadline: deadline::today_ist() - Duration::days(3),
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["title", "description", "location", "deadline"] {
            assert!(fields.contains_key(field), "missing violation for {field}");
        }
    }
}
