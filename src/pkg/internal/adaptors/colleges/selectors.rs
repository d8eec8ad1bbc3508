use sqlx::PgConnection;

use crate::{pkg::internal::adaptors::colleges::spec::CollegeEntry, prelude::Result};

// Reference data, maintained out of band. No mutators.
pub struct CollegeSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> CollegeSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        CollegeSelector { pool }
    }

    pub async fn get_all(&mut self) -> Result<Vec<CollegeEntry>> {
        let rows =
            sqlx::query_as::<_, CollegeEntry>("SELECT id, name FROM colleges ORDER BY name ASC")
                .fetch_all(&mut *self.pool)
                .await?;

        Ok(rows)
    }
}
