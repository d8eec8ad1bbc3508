use chrono::NaiveDate;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    pkg::internal::adaptors::jobs::spec::{JobEntry, JobWithCount, RecentJob},
    prelude::Result,
};

const JOB_COLUMNS: &str =
    "j.id, j.title, j.description, j.location, j.deadline, j.created_at, j.college_id, j.posted_by, j.status";

/// Optional search criteria, all AND-ed onto the college scope.
#[derive(Debug, Default)]
pub struct JobFilter {
    pub title: Option<String>,
    pub location: Option<String>,
    pub deadline_before: Option<NaiveDate>,
}

pub struct JobSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> JobSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        JobSelector { pool }
    }

    pub async fn get_by_id(&mut self, id: Uuid) -> Result<Option<JobEntry>> {
        let row = sqlx::query_as::<_, JobEntry>(
            "SELECT id, title, description, location, deadline, created_at, college_id, posted_by, status
             FROM jobs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_with_count(&mut self, id: Uuid) -> Result<Option<JobWithCount>> {
        let row = sqlx::query_as::<_, JobWithCount>(&format!(
            "SELECT {JOB_COLUMNS}, COUNT(a.id) AS applications_count
             FROM jobs j LEFT JOIN job_applications a ON a.job_id = j.id
             WHERE j.id = $1
             GROUP BY j.id"
        ))
        .bind(id)
        .fetch_optional(&mut *self.pool)
        .await?;

        Ok(row)
    }

    /// College-scoped listing, newest first, decorated with application
    /// counts. `visible_on` adds the student filter: active status and a
    /// deadline on or after that date.
    pub async fn list_for_college(
        &mut self,
        college_id: Uuid,
        filter: &JobFilter,
        visible_on: Option<NaiveDate>,
    ) -> Result<Vec<JobWithCount>> {
        let mut query = college_scoped_query(college_id, filter, visible_on);
        let rows = query
            .build_query_as::<JobWithCount>()
            .fetch_all(&mut *self.pool)
            .await?;
        Ok(rows)
    }

    /// The newest job across all colleges, for the landing widget.
    pub async fn latest(&mut self) -> Result<Option<RecentJob>> {
        let row = sqlx::query_as::<_, RecentJob>(
            "SELECT j.title, c.name AS company, j.deadline, COUNT(a.id) AS applicants
             FROM jobs j
             JOIN colleges c ON c.id = j.college_id
             LEFT JOIN job_applications a ON a.job_id = j.id
             GROUP BY j.id, c.name
             ORDER BY j.created_at DESC, j.id ASC
             LIMIT 1",
        )
        .fetch_optional(&mut *self.pool)
        .await?;

        Ok(row)
    }
}

fn college_scoped_query(
    college_id: Uuid,
    filter: &JobFilter,
    visible_on: Option<NaiveDate>,
) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!(
        "SELECT {JOB_COLUMNS}, COUNT(a.id) AS applications_count
         FROM jobs j LEFT JOIN job_applications a ON a.job_id = j.id
         WHERE j.college_id = "
    ));
    query.push_bind(college_id);
    if let Some(today) = visible_on {
        query.push(" AND j.status = 'active' AND j.deadline >= ");
        query.push_bind(today);
    }
    if let Some(title) = &filter.title {
        query.push(" AND j.title ILIKE ");
        query.push_bind(format!("%{}%", title));
    }
    if let Some(location) = &filter.location {
        query.push(" AND j.location ILIKE ");
        query.push_bind(format!("%{}%", location));
    }
    if let Some(deadline) = filter.deadline_before {
        query.push(" AND j.deadline <= ");
        query.push_bind(deadline);
    }
    query.push(" GROUP BY j.id ORDER BY j.created_at DESC, j.id ASC");
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn plain_listing_scopes_by_college_only() {
        let sql = college_scoped_query(Uuid::new_v4(), &JobFilter::default(), None).into_sql();
        assert!(sql.contains("j.college_id = $1"));
        assert!(!sql.contains("ILIKE"));
        assert!(!sql.contains("j.status"));
        assert!(sql.contains("ORDER BY j.created_at DESC, j.id ASC"));
    }

    #[test]
    fn student_listing_adds_the_visibility_bound() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let sql =
            college_scoped_query(Uuid::new_v4(), &JobFilter::default(), Some(today)).into_sql();
        assert!(sql.contains("j.status = 'active'"));
        assert!(sql.contains("j.deadline >= $2"));
    }

    #[test]
    fn search_filters_compose_in_order() {
        let filter = JobFilter {
            title: Some("engineer".into()),
            location: Some("pune".into()),
            deadline_before: NaiveDate::from_ymd_opt(2025, 7, 1),
        };
        let sql = college_scoped_query(Uuid::new_v4(), &filter, None).into_sql();
        assert!(sql.contains("j.title ILIKE $2"));
        assert!(sql.contains("j.location ILIKE $3"));
        assert!(sql.contains("j.deadline <= $4"));
    }
}
